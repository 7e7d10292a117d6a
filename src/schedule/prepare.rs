//! Stream preparation for Stage 1: filtering, shift derivation and the
//! priority order.

use std::collections::{BTreeSet, HashMap};

use crate::excel::normalize::{is_russian_group, normalize_instructor_name, parse_group_year};
use crate::models::{Stream, StreamType};

use super::config::SchedulerConfig;
use super::constants::{shift_for_year, SLOTS_PER_WEEK, SLOT_MINUTES};
use super::models::{LectureStream, Shift};

/// Stage 1 places multi-group lectures only.
pub const STAGE1_MIN_GROUPS: usize = 2;

/// Shift of a stream: the forced-second-shift set wins, otherwise the
/// year of the first group decides.
pub fn determine_shift(groups: &[String], second_shift_groups: &BTreeSet<String>) -> Shift {
    if groups.iter().any(|g| second_shift_groups.contains(g)) {
        return Shift::Second;
    }
    let year = groups.first().map(|g| parse_group_year(g)).unwrap_or(1);
    shift_for_year(year)
}

/// Practical + lab hours per subject, summed over both week kinds. Heavier
/// subjects are placed earlier to keep room flexibility.
pub fn build_subject_prac_lab_hours(streams: &[Stream]) -> HashMap<String, u32> {
    let mut hours: HashMap<String, u32> = HashMap::new();
    for stream in streams {
        if !matches!(stream.stream_type, StreamType::Practical | StreamType::Lab) {
            continue;
        }
        *hours.entry(stream.subject.clone()).or_default() +=
            stream.hours.odd_week + stream.hours.even_week;
    }
    hours
}

/// Weekly teaching minutes the availability config leaves open for the
/// instructor (65 slots of 50 minutes, minus the blocked ones).
pub fn instructor_available_minutes(instructor: &str, config: &SchedulerConfig) -> u32 {
    let name = normalize_instructor_name(instructor);
    let blocked: u32 = config
        .instructor_availability
        .iter()
        .find(|record| normalize_instructor_name(&record.name) == name)
        .map(|record| {
            record
                .weekly_unavailable
                .values()
                .map(|times| {
                    times
                        .iter()
                        .filter(|t| super::constants::time_to_slot(t).is_some())
                        .count() as u32
                })
                .sum()
        })
        .unwrap_or(0);
    (SLOTS_PER_WEEK.saturating_sub(blocked)) * SLOT_MINUTES
}

/// Select and prepare the lecture streams eligible for Stage 1: lectures
/// with at least two groups and positive hours.
pub fn filter_stage1_lectures(streams: &[Stream], config: &SchedulerConfig) -> Vec<LectureStream> {
    let prac_lab_hours = build_subject_prac_lab_hours(streams);

    let mut lectures = Vec::new();
    for stream in streams {
        if stream.stream_type != StreamType::Lecture {
            continue;
        }
        if stream.groups.len() < STAGE1_MIN_GROUPS {
            continue;
        }
        if stream.hours.odd_week == 0 && stream.hours.even_week == 0 {
            continue;
        }

        // rows with a blank language cell fall back to the group-code
        // markers: /г/ and /р/ mean a Russian-medium group
        let language = if stream.language.is_empty() {
            if stream.groups.iter().any(|g| is_russian_group(g)) {
                "орыс".to_string()
            } else {
                "каз".to_string()
            }
        } else {
            stream.language.clone()
        };

        lectures.push(LectureStream {
            id: stream.id.clone(),
            subject: stream.subject.clone(),
            instructor: stream.instructor.clone(),
            language,
            groups: stream.groups.clone(),
            student_count: stream.student_count,
            hours_odd_week: stream.hours.odd_week,
            hours_even_week: stream.hours.even_week,
            shift: determine_shift(&stream.groups, &config.second_shift_groups),
            sheet: stream.sheet.clone(),
            instructor_available_minutes: instructor_available_minutes(
                &stream.instructor,
                config,
            ),
            subject_prac_lab_hours: prac_lab_hours
                .get(&stream.subject)
                .copied()
                .unwrap_or(0),
            flexible: config.options.flexible_subjects.contains(&stream.subject),
        });
    }
    lectures
}

/// Order streams hardest-to-place first: non-flexible subjects before
/// flexible ones, tighter instructors first, heavier course footprints and
/// larger audiences first, stream id as the deterministic tiebreaker.
pub fn sort_streams_by_priority(streams: &mut [LectureStream]) {
    streams.sort_by(|a, b| {
        a.flexible
            .cmp(&b.flexible)
            .then_with(|| {
                a.instructor_available_minutes
                    .cmp(&b.instructor_available_minutes)
            })
            .then_with(|| b.subject_prac_lab_hours.cmp(&a.subject_prac_lab_hours))
            .then_with(|| b.student_count.cmp(&a.student_count))
            .then_with(|| a.id.cmp(&b.id))
    });
}
