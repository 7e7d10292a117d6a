use std::collections::BTreeSet;

use form1_timetable::excel::extract::StreamExtractor;
use form1_timetable::excel::parser::WorkRow;
use form1_timetable::excel::{detect_pattern, Pattern};
use form1_timetable::{Stream, StreamType};

fn row(group: &str, students: u32, lecture: u32, practical: u32, lab: u32, instructor: &str) -> WorkRow {
    WorkRow {
        subject: "Физика".to_string(),
        group: group.to_string(),
        language: "каз".to_string(),
        students,
        lecture,
        practical,
        lab,
        instructor: instructor.to_string(),
        row: 0,
    }
}

fn with_rows(mut rows: Vec<WorkRow>) -> Vec<WorkRow> {
    for (i, r) in rows.iter_mut().enumerate() {
        r.row = i;
    }
    rows
}

fn extract(rows: &[WorkRow]) -> (Vec<Stream>, Vec<String>) {
    let pattern = detect_pattern(rows);
    extract_with_pattern(pattern, rows)
}

fn extract_with_pattern(pattern: Pattern, rows: &[WorkRow]) -> (Vec<Stream>, Vec<String>) {
    let dead = BTreeSet::new();
    let mut counter = 0u32;
    let mut extractor = StreamExtractor::new("Физика", "стр", &dead, &mut counter);
    let streams = extractor.extract(pattern, rows);
    (streams, extractor.warnings)
}

fn of_type(streams: &[Stream], ty: StreamType) -> Vec<&Stream> {
    streams.iter().filter(|s| s.stream_type == ty).collect()
}

#[test]
fn test_1b_block_merges_groups_into_leader_streams() {
    // classic merged block: the rows without hours belong to the stream
    // opened by the previous row with hours
    let rows = with_rows(vec![
        row("СТР-21", 20, 30, 8, 7, "а.о. Петров П.П."),
        row("СТР-23", 18, 0, 0, 0, ""),
        row("СТР-25", 22, 0, 8, 7, ""),
        row("СТР-27", 19, 0, 0, 0, ""),
    ]);
    assert_eq!(detect_pattern(&rows), Pattern::OneB);

    let (streams, warnings) = extract(&rows);
    assert!(warnings.is_empty(), "{warnings:?}");

    let lectures = of_type(&streams, StreamType::Lecture);
    assert_eq!(lectures.len(), 1);
    assert_eq!(
        lectures[0].groups,
        vec!["СТР-21", "СТР-23", "СТР-25", "СТР-27"]
    );
    assert_eq!(lectures[0].student_count, 79);
    assert_eq!(lectures[0].hours.total, 30);

    let practicals = of_type(&streams, StreamType::Practical);
    assert_eq!(practicals.len(), 2);
    assert_eq!(practicals[0].groups, vec!["СТР-21", "СТР-23"]);
    assert_eq!(practicals[0].hours.total, 8);
    assert_eq!(practicals[1].groups, vec!["СТР-25", "СТР-27"]);
    assert_eq!(practicals[1].hours.total, 8);

    let labs = of_type(&streams, StreamType::Lab);
    assert_eq!(labs.len(), 2);
    assert_eq!(labs[0].groups, vec!["СТР-21", "СТР-23"]);
    assert_eq!(labs[0].hours.total, 7);
    assert_eq!(labs[1].groups, vec!["СТР-25", "СТР-27"]);
}

#[test]
fn test_1a_emits_one_stream_per_row() {
    let rows = with_rows(vec![
        row("СТР-21", 20, 30, 15, 0, "а.о. Петров П.П."),
        row("СТР-23", 18, 0, 15, 0, ""),
        row("СТР-25", 22, 0, 15, 0, ""),
    ]);
    assert_eq!(detect_pattern(&rows), Pattern::OneA);

    let (streams, _) = extract(&rows);
    let practicals = of_type(&streams, StreamType::Practical);
    assert_eq!(practicals.len(), 3);
    for (p, group) in practicals.iter().zip(["СТР-21", "СТР-23", "СТР-25"]) {
        assert_eq!(p.groups, vec![group]);
        assert_eq!(p.hours.total, 15);
    }
}

#[test]
fn test_different_instructor_always_starts_a_new_lecture_stream() {
    let rows = with_rows(vec![
        row("СТР-21", 20, 30, 0, 0, "а.о. Петров П.П."),
        row("СТР-23", 18, 0, 0, 0, ""),
        row("СТР-25", 22, 30, 0, 0, "доц. Ахметов А.А."),
        row("СТР-27", 19, 0, 0, 0, ""),
    ]);
    let (streams, _) = extract(&rows);

    let lectures = of_type(&streams, StreamType::Lecture);
    assert_eq!(lectures.len(), 2);
    assert_eq!(lectures[0].instructor, "Петров П.П.");
    assert_eq!(lectures[0].groups, vec!["СТР-21", "СТР-23"]);
    assert_eq!(lectures[1].instructor, "Ахметов А.А.");
    assert_eq!(lectures[1].groups, vec!["СТР-25", "СТР-27"]);
}

#[test]
fn test_implicit_subgroups_keep_first_practical_and_every_lab() {
    let rows = with_rows(vec![
        row("СТР-21", 20, 30, 15, 15, "а.о. Петров П.П."),
        row("СТР-21", 0, 0, 15, 15, ""),
    ]);
    assert_eq!(detect_pattern(&rows), Pattern::ImplicitSubgroup);

    let (streams, _) = extract(&rows);

    // practicals: only the first occurrence of the group code
    let practicals = of_type(&streams, StreamType::Practical);
    assert_eq!(practicals.len(), 1);
    assert_eq!(practicals[0].groups, vec!["СТР-21"]);
    assert!(!practicals[0].is_implicit_subgroup);

    // labs: every row with hours is its own subgroup stream
    let labs = of_type(&streams, StreamType::Lab);
    assert_eq!(labs.len(), 2);
    assert!(labs.iter().all(|s| s.is_implicit_subgroup));
    assert!(labs.iter().all(|s| s.groups == vec!["СТР-21"]));
}

#[test]
fn test_explicit_subgroups_keep_notation_and_flag() {
    let rows = with_rows(vec![
        row("СТР-21 /1/", 12, 30, 15, 7, "а.о. Петров П.П."),
        row("СТР-21 /2/", 12, 0, 15, 7, ""),
    ]);
    assert_eq!(detect_pattern(&rows), Pattern::ExplicitSubgroup);

    let (streams, _) = extract(&rows);

    let practicals = of_type(&streams, StreamType::Practical);
    assert_eq!(practicals.len(), 2);
    assert!(practicals.iter().all(|s| s.is_subgroup));
    assert_eq!(practicals[0].groups, vec!["СТР-21 /1/"]);
    assert_eq!(practicals[1].groups, vec!["СТР-21 /2/"]);

    let labs = of_type(&streams, StreamType::Lab);
    assert_eq!(labs.len(), 2);
    assert!(labs.iter().all(|s| s.is_subgroup));

    // the lecture stream sees the normalized group only once
    let lectures = of_type(&streams, StreamType::Lecture);
    assert_eq!(lectures.len(), 1);
    assert_eq!(lectures[0].groups, vec!["СТР-21"]);
}

#[test]
fn test_invalid_hours_skip_the_stream_with_a_warning() {
    // 5 % 15 = 5: no odd/even decomposition exists
    let rows = with_rows(vec![row("СТР-21", 20, 5, 0, 0, "а.о. Петров П.П.")]);
    let (streams, warnings) = extract(&rows);

    assert!(of_type(&streams, StreamType::Lecture).is_empty());
    assert_eq!(warnings.len(), 1);
    assert!(warnings[0].contains("Физика"), "{}", warnings[0]);
}

#[test]
fn test_dead_groups_count_zero_students_but_stay_listed() {
    let rows = with_rows(vec![
        row("СТР-21", 20, 30, 0, 0, "а.о. Петров П.П."),
        row("СТР-23", 18, 0, 0, 0, ""),
    ]);

    let dead: BTreeSet<String> = ["СТР-23".to_string()].into_iter().collect();
    let mut counter = 0u32;
    let mut extractor = StreamExtractor::new("Физика", "стр", &dead, &mut counter);
    let streams = extractor.extract(Pattern::OneB, &rows);

    let lectures = of_type(&streams, StreamType::Lecture);
    assert_eq!(lectures[0].groups, vec!["СТР-21", "СТР-23"]);
    assert_eq!(lectures[0].student_count, 20); // dead group contributes 0
}

#[test]
fn test_stream_ids_are_deterministic() {
    let rows = with_rows(vec![
        row("СТР-21", 20, 30, 8, 0, "а.о. Петров П.П."),
        row("СТР-23", 18, 0, 0, 0, ""),
    ]);
    let (first, _) = extract(&rows);
    let (second, _) = extract(&rows);
    let first_ids: Vec<&str> = first.iter().map(|s| s.id.as_str()).collect();
    let second_ids: Vec<&str> = second.iter().map(|s| s.id.as_str()).collect();
    assert_eq!(first_ids, second_ids);

    // ids are unique within the extraction
    let mut deduped = first_ids.clone();
    deduped.sort();
    deduped.dedup();
    assert_eq!(deduped.len(), first_ids.len());
}
