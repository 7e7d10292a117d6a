// Data model produced by the workload parser.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::error::ParseError;
use crate::excel::patterns::Pattern;

/// Type of academic stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StreamType {
    Lecture,
    Practical,
    Lab,
}

impl StreamType {
    pub fn as_str(&self) -> &'static str {
        match self {
            StreamType::Lecture => "lecture",
            StreamType::Practical => "practical",
            StreamType::Lab => "lab",
        }
    }
}

/// Weekly hour breakdown over the 15-week semester.
///
/// Invariant: `total = 8 × odd_week + 7 × even_week` (8 odd weeks, 7 even).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WeeklyHours {
    pub total: u32,
    pub odd_week: u32,
    pub even_week: u32,
}

impl WeeklyHours {
    /// Decompose total semester hours into per-week odd/even counts.
    ///
    /// `base = total / 15`; the remainder decides which week kind gets the
    /// extra hour. Any remainder other than 0, 7 or 8 cannot satisfy the
    /// formula and is rejected.
    pub fn from_total(total: u32) -> Result<Self, ParseError> {
        if total == 0 {
            return Ok(WeeklyHours {
                total: 0,
                odd_week: 0,
                even_week: 0,
            });
        }

        let base = total / 15;
        match total % 15 {
            0 => Ok(WeeklyHours {
                total,
                odd_week: base,
                even_week: base,
            }),
            8 => Ok(WeeklyHours {
                total,
                odd_week: base + 1,
                even_week: base,
            }),
            7 => Ok(WeeklyHours {
                total,
                odd_week: base,
                even_week: base + 1,
            }),
            _ => Err(ParseError::InvalidHours(total)),
        }
    }

    /// Hours the stream needs in its heavier week.
    pub fn max_weekly(&self) -> u32 {
        self.odd_week.max(self.even_week)
    }
}

impl std::fmt::Display for WeeklyHours {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}h (odd:{}, even:{})",
            self.total, self.odd_week, self.even_week
        )
    }
}

/// A single teaching stream.
///
/// A stream is identified by subject, stream type and instructor; a row with
/// a different instructor always starts a new stream even when the subject
/// block is shared. Streams are immutable once extracted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Stream {
    pub id: String,
    pub subject: String,
    pub stream_type: StreamType,
    /// Instructor name with academic prefixes stripped.
    pub instructor: String,
    /// Language cell value (каз / орыс).
    pub language: String,
    pub hours: WeeklyHours,
    /// Group codes in file order.
    pub groups: Vec<String>,
    /// Sum of counted students; dead groups contribute 0.
    pub student_count: u32,
    /// Source sheet name.
    pub sheet: String,
    /// Source row indices (0-based).
    pub rows: Vec<usize>,
    #[serde(default)]
    pub is_subgroup: bool,
    #[serde(default)]
    pub is_implicit_subgroup: bool,
}

/// Streams extracted for one subject block, grouped by type.
#[derive(Debug, Clone, Serialize)]
pub struct SubjectSummary {
    pub subject: String,
    pub sheet: String,
    pub pattern: Pattern,
    pub lecture_streams: Vec<Stream>,
    pub practical_streams: Vec<Stream>,
    pub lab_streams: Vec<Stream>,
}

impl SubjectSummary {
    pub fn total_streams(&self) -> usize {
        self.lecture_streams.len() + self.practical_streams.len() + self.lab_streams.len()
    }

    pub fn total_hours(&self) -> u32 {
        self.all_streams().map(|s| s.hours.total).sum()
    }

    /// Unique instructors for this subject, sorted.
    pub fn instructors(&self) -> Vec<String> {
        let set: BTreeSet<&str> = self.all_streams().map(|s| s.instructor.as_str()).collect();
        set.into_iter().map(str::to_string).collect()
    }

    fn all_streams(&self) -> impl Iterator<Item = &Stream> + '_ {
        self.lecture_streams
            .iter()
            .chain(self.practical_streams.iter())
            .chain(self.lab_streams.iter())
    }
}

/// Result of parsing a Form-1 workbook.
///
/// Sheet and row failures never abort the run; they are collected here as
/// warnings with their (sheet, row) context.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ParseResult {
    pub file_path: String,
    pub parse_date: String,
    pub sheets_processed: Vec<String>,
    pub subjects: Vec<SubjectSummary>,
    pub streams: Vec<Stream>,
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
}

impl ParseResult {
    pub fn total_subjects(&self) -> usize {
        self.subjects.len()
    }

    pub fn total_streams(&self) -> usize {
        self.streams.len()
    }
}
