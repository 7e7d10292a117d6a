//! Stream extraction from subject blocks.
//!
//! One extractor per block; the four row layouts are handled by a single
//! dispatch on [`Pattern`]. Lecture extraction is identical in all four
//! layouts, practicals and labs differ.

use std::collections::{BTreeSet, HashMap, HashSet};

use crate::models::{Stream, StreamType, WeeklyHours};

use super::normalize::{normalize_group_name, normalize_instructor_name};
use super::parser::WorkRow;
use super::patterns::Pattern;

/// Extracts the streams of one subject block.
///
/// The counter is shared across blocks of a sheet so that stream ids stay
/// unique (and deterministic) within a parse.
pub struct StreamExtractor<'a> {
    subject: &'a str,
    sheet: &'a str,
    dead_groups: &'a BTreeSet<String>,
    counter: &'a mut u32,
    pub warnings: Vec<String>,
}

/// An in-progress merged stream (pattern 1b leader/append scan).
struct OpenStream {
    instructor: String,
    language: String,
    hours: u32,
    groups: Vec<String>,
    students: u32,
    rows: Vec<usize>,
}

impl<'a> StreamExtractor<'a> {
    pub fn new(
        subject: &'a str,
        sheet: &'a str,
        dead_groups: &'a BTreeSet<String>,
        counter: &'a mut u32,
    ) -> Self {
        StreamExtractor {
            subject,
            sheet,
            dead_groups,
            counter,
            warnings: Vec::new(),
        }
    }

    /// Extract all streams of the block according to its detected pattern.
    pub fn extract(&mut self, pattern: Pattern, rows: &[WorkRow]) -> Vec<Stream> {
        // Continuation rows leave the instructor cell blank; they belong to
        // the most recent named instructor of the block.
        let instructors = forward_fill_instructors(rows);

        let mut streams = self.extract_lectures(rows, &instructors);

        match pattern {
            Pattern::OneA => {
                streams.extend(self.extract_per_row(
                    rows,
                    &instructors,
                    StreamType::Practical,
                    practical_hours,
                    false,
                    false,
                ));
                streams.extend(self.extract_per_row(
                    rows,
                    &instructors,
                    StreamType::Lab,
                    lab_hours,
                    false,
                    false,
                ));
            }
            Pattern::OneB => {
                streams.extend(self.extract_merged(
                    rows,
                    &instructors,
                    StreamType::Practical,
                    practical_hours,
                ));
                streams.extend(self.extract_merged(rows, &instructors, StreamType::Lab, lab_hours));
            }
            Pattern::ImplicitSubgroup => {
                // practicals: only the first occurrence of each group counts,
                // later repeats are silently skipped
                streams.extend(self.extract_per_row(
                    rows,
                    &instructors,
                    StreamType::Practical,
                    practical_hours,
                    true,
                    false,
                ));
                // labs: every row with hours is its own subgroup stream
                streams.extend(self.extract_per_row(
                    rows,
                    &instructors,
                    StreamType::Lab,
                    lab_hours,
                    false,
                    true,
                ));
            }
            Pattern::ExplicitSubgroup => {
                streams.extend(self.extract_explicit(rows, &instructors));
            }
        }

        streams
    }

    /// Lecture streams: group the block rows by instructor and emit one
    /// stream per instructor that has a row with lecture hours. The group
    /// list is that instructor's rows in file order, students summed.
    fn extract_lectures(&mut self, rows: &[WorkRow], instructors: &[String]) -> Vec<Stream> {
        let mut order: Vec<String> = Vec::new();
        let mut by_instructor: HashMap<String, Vec<usize>> = HashMap::new();

        for (i, raw) in instructors.iter().enumerate() {
            let name = normalize_instructor_name(raw);
            if name.is_empty() {
                continue;
            }
            if !by_instructor.contains_key(&name) {
                order.push(name.clone());
            }
            by_instructor.entry(name).or_default().push(i);
        }

        let mut streams = Vec::new();
        for name in order {
            let indexes = &by_instructor[&name];
            let Some(&leader) = indexes.iter().find(|&&i| rows[i].lecture > 0) else {
                continue;
            };

            let mut groups: Vec<String> = Vec::new();
            let mut students = 0u32;
            let mut row_ids: Vec<usize> = Vec::new();
            for &i in indexes {
                let group = normalize_group_name(&rows[i].group);
                if group.is_empty() || groups.contains(&group) {
                    continue;
                }
                students += self.counted_students(&group, rows[i].students);
                groups.push(group);
                row_ids.push(rows[i].row);
            }
            if groups.is_empty() {
                continue;
            }

            let language = rows[leader].language.clone();
            let hours = rows[leader].lecture;
            if let Some(stream) = self.make_stream(
                StreamType::Lecture,
                &name,
                &language,
                hours,
                groups,
                students,
                row_ids,
                false,
                false,
            ) {
                streams.push(stream);
            }
        }
        streams
    }

    /// One stream per row with hours in the selected column (pattern 1a and
    /// both implicit-subgroup rules).
    fn extract_per_row(
        &mut self,
        rows: &[WorkRow],
        instructors: &[String],
        stream_type: StreamType,
        hours_of: fn(&WorkRow) -> u32,
        first_occurrence_only: bool,
        implicit_subgroup: bool,
    ) -> Vec<Stream> {
        let mut seen: HashSet<String> = HashSet::new();
        let mut streams = Vec::new();

        for (i, row) in rows.iter().enumerate() {
            let hours = hours_of(row);
            if hours == 0 {
                continue;
            }
            let group = normalize_group_name(&row.group);
            if group.is_empty() || instructors[i].is_empty() {
                continue;
            }
            if first_occurrence_only && !seen.insert(group.clone()) {
                continue;
            }

            let students = self.counted_students(&group, row.students);
            if let Some(stream) = self.make_stream(
                stream_type,
                &instructors[i],
                &row.language,
                hours,
                vec![group],
                students,
                vec![row.row],
                false,
                implicit_subgroup,
            ) {
                streams.push(stream);
            }
        }
        streams
    }

    /// Leader/append scan (pattern 1b): a row with hours starts a stream
    /// carrying its hour value; following blank-cell rows append their
    /// group; the next row with hours closes the previous stream.
    fn extract_merged(
        &mut self,
        rows: &[WorkRow],
        instructors: &[String],
        stream_type: StreamType,
        hours_of: fn(&WorkRow) -> u32,
    ) -> Vec<Stream> {
        let mut streams = Vec::new();
        let mut current: Option<OpenStream> = None;

        for (i, row) in rows.iter().enumerate() {
            let hours = hours_of(row);
            if hours > 0 {
                if let Some(open) = current.take() {
                    self.flush(stream_type, open, &mut streams);
                }
                let group = normalize_group_name(&row.group);
                let mut open = OpenStream {
                    instructor: instructors[i].clone(),
                    language: row.language.clone(),
                    hours,
                    groups: Vec::new(),
                    students: 0,
                    rows: Vec::new(),
                };
                if !group.is_empty() {
                    open.students = self.counted_students(&group, row.students);
                    open.groups.push(group);
                    open.rows.push(row.row);
                }
                current = Some(open);
            } else if let Some(open) = current.as_mut() {
                let group = normalize_group_name(&row.group);
                if !group.is_empty() && !open.groups.contains(&group) {
                    open.students += self.counted_students(&group, row.students);
                    open.groups.push(group);
                    open.rows.push(row.row);
                }
            }
        }

        if let Some(open) = current.take() {
            self.flush(stream_type, open, &mut streams);
        }
        streams
    }

    fn flush(&mut self, stream_type: StreamType, open: OpenStream, streams: &mut Vec<Stream>) {
        if open.groups.is_empty() || open.instructor.is_empty() {
            return;
        }
        if let Some(stream) = self.make_stream(
            stream_type,
            &open.instructor,
            &open.language,
            open.hours,
            open.groups,
            open.students,
            open.rows,
            false,
            false,
        ) {
            streams.push(stream);
        }
    }

    /// Explicit subgroups: each row is its own stream for whichever hour
    /// columns are positive. The raw group name (with its subgroup
    /// notation) is preserved.
    fn extract_explicit(&mut self, rows: &[WorkRow], instructors: &[String]) -> Vec<Stream> {
        let mut streams = Vec::new();

        for (i, row) in rows.iter().enumerate() {
            if row.group.is_empty() || instructors[i].is_empty() {
                continue;
            }
            let normalized = normalize_group_name(&row.group);
            let students = self.counted_students(&normalized, row.students);

            for (stream_type, hours) in [
                (StreamType::Practical, row.practical),
                (StreamType::Lab, row.lab),
            ] {
                if hours == 0 {
                    continue;
                }
                if let Some(stream) = self.make_stream(
                    stream_type,
                    &instructors[i],
                    &row.language,
                    hours,
                    vec![row.group.clone()],
                    students,
                    vec![row.row],
                    true,
                    false,
                ) {
                    streams.push(stream);
                }
            }
        }
        streams
    }

    /// Dead groups stay in the group list but count zero students.
    fn counted_students(&self, normalized_group: &str, students: u32) -> u32 {
        if self.dead_groups.contains(normalized_group) {
            0
        } else {
            students
        }
    }

    #[allow(clippy::too_many_arguments)]
    fn make_stream(
        &mut self,
        stream_type: StreamType,
        instructor: &str,
        language: &str,
        total_hours: u32,
        groups: Vec<String>,
        student_count: u32,
        rows: Vec<usize>,
        is_subgroup: bool,
        is_implicit_subgroup: bool,
    ) -> Option<Stream> {
        let hours = match WeeklyHours::from_total(total_hours) {
            Ok(hours) => hours,
            Err(err) => {
                let row = rows.first().copied().unwrap_or(0);
                let message = format!(
                    "sheet '{}' row {}: subject '{}': {}",
                    self.sheet, row, self.subject, err
                );
                log::warn!("{message}");
                self.warnings.push(message);
                return None;
            }
        };

        *self.counter += 1;
        let instructor = normalize_instructor_name(instructor);
        let id = self.stream_id(stream_type, &instructor);

        Some(Stream {
            id,
            subject: self.subject.to_string(),
            stream_type,
            instructor,
            language: language.to_string(),
            hours,
            groups,
            student_count,
            sheet: self.sheet.to_string(),
            rows,
            is_subgroup,
            is_implicit_subgroup,
        })
    }

    /// Counter-derived id: the same input always yields the same ids.
    fn stream_id(&self, stream_type: StreamType, instructor: &str) -> String {
        let subject: String = self.subject.chars().take(10).collect();
        let instr: String = instructor.chars().take(10).collect();
        let kind: String = stream_type.as_str().chars().take(3).collect();
        format!(
            "{}_{}_{}_{}_{}",
            self.sheet, subject, kind, instr, self.counter
        )
        .replace(' ', "_")
    }
}

fn practical_hours(row: &WorkRow) -> u32 {
    row.practical
}

fn lab_hours(row: &WorkRow) -> u32 {
    row.lab
}

/// Carry the last non-blank instructor cell down through the block.
fn forward_fill_instructors(rows: &[WorkRow]) -> Vec<String> {
    let mut filled = Vec::with_capacity(rows.len());
    let mut last = String::new();
    for row in rows {
        if !row.instructor.is_empty() {
            last = row.instructor.clone();
        }
        filled.push(last.clone());
    }
    filled
}
