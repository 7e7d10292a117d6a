//! Workload parser: sheet scanning, forward-fill and block grouping.

use std::collections::BTreeSet;

use calamine::Data;
use chrono::Utc;

use crate::error::ParseError;
use crate::models::{ParseResult, Stream, StreamType, SubjectSummary};

use super::extract::StreamExtractor;
use super::io::{cell_to_string, cell_to_u32, read_workbook, SheetGrid};
use super::normalize::is_valid_group_code;
use super::patterns::detect_pattern;

// Fixed column layout of a Form-1 sheet (0-based).
pub const COL_NUMBER: usize = 0;
pub const COL_SUBJECT: usize = 1;
pub const COL_SPECIALTY: usize = 3;
pub const COL_GROUP: usize = 4;
pub const COL_CREDITS: usize = 5;
pub const COL_LANGUAGE: usize = 6;
pub const COL_STUDENTS: usize = 7;
pub const COL_LECTURES: usize = 8;
pub const COL_PRACTICALS: usize = 9;
pub const COL_LABS: usize = 10;

/// The seven standard Form-1 sheets, in processing order.
pub const SHEET_NAMES: [&str; 7] = ["оод (2)", "эиб", "юр", "стр", "эл", "ттт", "нд"];

/// Column-0 markers announcing the first data row.
const DATA_START_MARKERS: [&str; 3] = ["1", "2 семестр", "2семестр"];

/// Substrings that identify a cell holding an instructor name.
const INSTRUCTOR_MARKERS: [&str; 8] = [
    "проф", "а.о.", "с.п.", "асс", "доц", "д.", "prof.", "prof",
];

/// Known instructor-column positions per sheet; the scan is the fallback.
fn known_instructor_column(sheet: &str) -> Option<usize> {
    match sheet {
        "оод (2)" | "эиб" | "юр" | "эл" | "ттт" => Some(25),
        "стр" | "нд" => Some(26),
        _ => None,
    }
}

/// One normalized data row of a sheet.
#[derive(Debug, Clone)]
pub struct WorkRow {
    pub subject: String,
    pub group: String,
    pub language: String,
    pub students: u32,
    pub lecture: u32,
    pub practical: u32,
    pub lab: u32,
    pub instructor: String,
    /// 0-based row index in the source sheet.
    pub row: usize,
}

/// Streams and diagnostics produced from one sheet.
#[derive(Debug, Default)]
pub struct SheetOutcome {
    pub subjects: Vec<SubjectSummary>,
    pub streams: Vec<Stream>,
    pub warnings: Vec<String>,
}

/// Structural probe of a workbook without full extraction.
#[derive(Debug, Default)]
pub struct ValidationReport {
    pub valid: bool,
    pub sheets_found: Vec<String>,
    pub sheets_missing: Vec<String>,
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
}

/// Parser for Form-1 workload spreadsheets.
///
/// The parser works on in-memory cell grids; [`Form1Parser::parse_workbook`]
/// is a convenience that reads the file through [`super::io::read_workbook`]
/// first.
pub struct Form1Parser {
    sheet_names: Vec<String>,
    dead_groups: BTreeSet<String>,
}

impl Default for Form1Parser {
    fn default() -> Self {
        Self::new()
    }
}

impl Form1Parser {
    pub fn new() -> Self {
        Form1Parser {
            sheet_names: SHEET_NAMES.iter().map(|s| s.to_string()).collect(),
            dead_groups: BTreeSet::new(),
        }
    }

    /// Replace the default sheet list.
    pub fn with_sheet_names(mut self, names: Vec<String>) -> Self {
        self.sheet_names = names;
        self
    }

    /// Groups whose students count as zero everywhere.
    pub fn with_dead_groups(mut self, groups: BTreeSet<String>) -> Self {
        self.dead_groups = groups;
        self
    }

    /// Parse a workbook file.
    pub fn parse_workbook(&self, path: &str) -> Result<ParseResult, ParseError> {
        let sheets = read_workbook(path)?;
        Ok(self.parse_sheets(path, &sheets))
    }

    /// Parse already-loaded sheet grids. A failed sheet logs a warning and
    /// the remaining sheets are still processed.
    pub fn parse_sheets(&self, file_path: &str, sheets: &[(String, SheetGrid)]) -> ParseResult {
        let mut result = ParseResult {
            file_path: file_path.to_string(),
            parse_date: Utc::now().to_rfc3339(),
            ..ParseResult::default()
        };

        for sheet_name in &self.sheet_names {
            let Some((_, grid)) = sheets.iter().find(|(name, _)| name == sheet_name) else {
                let available: Vec<&str> = sheets.iter().map(|(n, _)| n.as_str()).collect();
                let message = format!(
                    "{} (available: {})",
                    ParseError::SheetNotFound(sheet_name.clone()),
                    available.join(", ")
                );
                log::warn!("{message}");
                result.warnings.push(message);
                continue;
            };

            match self.parse_sheet(sheet_name, grid) {
                Ok(outcome) => {
                    result.subjects.extend(outcome.subjects);
                    result.streams.extend(outcome.streams);
                    result.warnings.extend(outcome.warnings);
                    result.sheets_processed.push(sheet_name.clone());
                }
                Err(err) => {
                    let message = format!("sheet '{sheet_name}': {err}");
                    log::warn!("{message}");
                    result.warnings.push(message);
                }
            }
        }

        log::info!(
            "parsed {} sheets: {} subjects, {} streams, {} warnings",
            result.sheets_processed.len(),
            result.total_subjects(),
            result.total_streams(),
            result.warnings.len()
        );
        result
    }

    /// Parse a single sheet grid into subject summaries and streams.
    pub fn parse_sheet(&self, sheet_name: &str, grid: &[Vec<Data>]) -> Result<SheetOutcome, ParseError> {
        let data_start = find_data_start(grid, sheet_name)?;
        let instructor_col = find_instructor_column(grid, sheet_name)?;

        let mut outcome = SheetOutcome::default();

        // Build the working rows with the subject column forward-filled:
        // a subject name appears only on the first row of its block.
        let mut rows: Vec<WorkRow> = Vec::new();
        let mut last_subject = String::new();
        for (idx, row) in grid.iter().enumerate().skip(data_start) {
            let cell = |col: usize| row.get(col).unwrap_or(&Data::Empty);

            let mut subject = cell_to_string(cell(COL_SUBJECT));
            if subject.is_empty() {
                subject = last_subject.clone();
            } else {
                last_subject = subject.clone();
            }

            let group = cell_to_string(cell(COL_GROUP));
            if !group.is_empty() && !is_valid_group_code(&group) {
                let err = ParseError::InvalidGroupCode {
                    sheet: sheet_name.to_string(),
                    row: idx,
                    code: group,
                };
                log::warn!("{err}");
                outcome.warnings.push(err.to_string());
                continue;
            }

            rows.push(WorkRow {
                subject,
                group,
                language: cell_to_string(cell(COL_LANGUAGE)),
                students: cell_to_u32(cell(COL_STUDENTS)),
                lecture: cell_to_u32(cell(COL_LECTURES)),
                practical: cell_to_u32(cell(COL_PRACTICALS)),
                lab: cell_to_u32(cell(COL_LABS)),
                instructor: cell_to_string(cell(instructor_col)),
                row: idx,
            });
        }

        // Partition contiguous rows by subject and extract per block.
        let mut stream_counter = 0u32;
        let mut block_start = 0usize;
        while block_start < rows.len() {
            let subject = rows[block_start].subject.clone();
            let mut block_end = block_start + 1;
            while block_end < rows.len() && rows[block_end].subject == subject {
                block_end += 1;
            }
            let block = &rows[block_start..block_end];
            block_start = block_end;

            if subject.is_empty() {
                continue;
            }

            let pattern = detect_pattern(block);
            let mut extractor =
                StreamExtractor::new(&subject, sheet_name, &self.dead_groups, &mut stream_counter);
            let streams = extractor.extract(pattern, block);
            outcome.warnings.append(&mut extractor.warnings);

            let summary = SubjectSummary {
                subject,
                sheet: sheet_name.to_string(),
                pattern,
                lecture_streams: by_type(&streams, StreamType::Lecture),
                practical_streams: by_type(&streams, StreamType::Practical),
                lab_streams: by_type(&streams, StreamType::Lab),
            };
            outcome.streams.extend(streams);
            outcome.subjects.push(summary);
        }

        Ok(outcome)
    }

    /// Check workbook structure without extracting streams.
    pub fn validate(&self, sheets: &[(String, SheetGrid)]) -> ValidationReport {
        let mut report = ValidationReport {
            valid: true,
            ..ValidationReport::default()
        };

        for sheet_name in &self.sheet_names {
            match sheets.iter().find(|(name, _)| name == sheet_name) {
                Some((_, grid)) => {
                    report.sheets_found.push(sheet_name.clone());
                    if let Err(err) = find_data_start(grid, sheet_name) {
                        report.warnings.push(err.to_string());
                    }
                    if let Err(err) = find_instructor_column(grid, sheet_name) {
                        report.warnings.push(err.to_string());
                    }
                }
                None => report.sheets_missing.push(sheet_name.clone()),
            }
        }

        if report.sheets_found.is_empty() {
            report.valid = false;
            report
                .errors
                .push("no expected sheets found in workbook".to_string());
        }
        report
    }
}

/// Find the first data row: the first column-0 cell matching a start
/// marker. A semester marker is followed by one more header row.
fn find_data_start(grid: &[Vec<Data>], sheet_name: &str) -> Result<usize, ParseError> {
    for (idx, row) in grid.iter().enumerate() {
        let value = cell_to_string(row.get(COL_NUMBER).unwrap_or(&Data::Empty));
        if DATA_START_MARKERS.contains(&value.as_str()) {
            if value.to_lowercase().contains("семестр") {
                return Ok(idx + 1);
            }
            return Ok(idx);
        }
    }
    Err(ParseError::DataStartNotFound(sheet_name.to_string()))
}

/// Locate the instructor column: the known position for this sheet when in
/// range, otherwise the rightmost column whose cells (rows 11..50) contain
/// an instructor marker.
fn find_instructor_column(grid: &[Vec<Data>], sheet_name: &str) -> Result<usize, ParseError> {
    let width = grid.iter().map(|r| r.len()).max().unwrap_or(0);

    if let Some(col) = known_instructor_column(sheet_name) {
        if col < width {
            return Ok(col);
        }
    }

    let row_end = grid.len().min(50);
    for col in (0..width).rev() {
        for row in grid.iter().take(row_end).skip(11) {
            let value = cell_to_string(row.get(col).unwrap_or(&Data::Empty)).to_lowercase();
            if !value.is_empty() && INSTRUCTOR_MARKERS.iter().any(|m| value.contains(m)) {
                return Ok(col);
            }
        }
    }

    Err(ParseError::InstructorColumnNotFound(sheet_name.to_string()))
}

fn by_type(streams: &[Stream], stream_type: StreamType) -> Vec<Stream> {
    streams
        .iter()
        .filter(|s| s.stream_type == stream_type)
        .cloned()
        .collect()
}
