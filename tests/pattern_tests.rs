use form1_timetable::excel::parser::WorkRow;
use form1_timetable::excel::{detect_pattern, Pattern};

fn row(group: &str, lecture: u32, practical: u32, lab: u32) -> WorkRow {
    WorkRow {
        subject: "Математика".to_string(),
        group: group.to_string(),
        language: "каз".to_string(),
        students: 20,
        lecture,
        practical,
        lab,
        instructor: "доц. Иванов И.И.".to_string(),
        row: 0,
    }
}

#[test]
fn test_explicit_subgroup_wins_over_everything() {
    // subgroup notation decides even though the same group also repeats
    let rows = vec![
        row("СТР-21 /1/", 0, 15, 0),
        row("СТР-21 /2/", 0, 15, 0),
        row("СТР-21 /1/", 0, 15, 0),
    ];
    assert_eq!(detect_pattern(&rows), Pattern::ExplicitSubgroup);
}

#[test]
fn test_repeated_group_is_implicit_subgroup() {
    let rows = vec![
        row("СТР-21", 30, 15, 15),
        row("СТР-21", 0, 15, 15),
        row("СТР-23", 0, 15, 15),
    ];
    assert_eq!(detect_pattern(&rows), Pattern::ImplicitSubgroup);
}

#[test]
fn test_high_practical_fill_rate_is_1a() {
    // 3 of 3 rows have practical hours -> fill rate 1.0
    let rows = vec![
        row("СТР-21", 30, 15, 0),
        row("СТР-23", 0, 15, 0),
        row("СТР-25", 0, 15, 0),
    ];
    assert_eq!(detect_pattern(&rows), Pattern::OneA);
}

#[test]
fn test_low_practical_fill_rate_is_1b() {
    // 2 of 4 rows have practical hours -> fill rate 0.5, not above the bar
    let rows = vec![
        row("СТР-21", 30, 8, 0),
        row("СТР-23", 0, 0, 0),
        row("СТР-25", 0, 8, 0),
        row("СТР-27", 0, 0, 0),
    ];
    assert_eq!(detect_pattern(&rows), Pattern::OneB);
}

#[test]
fn test_block_without_groups_defaults_to_1a() {
    let rows = vec![row("", 30, 0, 0), row("", 0, 0, 0)];
    assert_eq!(detect_pattern(&rows), Pattern::OneA);
    assert_eq!(detect_pattern(&[]), Pattern::OneA);
}

#[test]
fn test_study_form_markers_are_not_subgroups() {
    let rows = vec![row("СТР-21/у/", 30, 15, 0), row("СТР-22/г/", 0, 15, 0)];
    assert_eq!(detect_pattern(&rows), Pattern::OneA);
}

#[test]
fn test_classifier_is_deterministic() {
    let rows = vec![
        row("СТР-21", 30, 8, 0),
        row("СТР-23", 0, 0, 0),
        row("СТР-25", 0, 8, 0),
        row("СТР-27", 0, 0, 0),
    ];
    let first = detect_pattern(&rows);
    for _ in 0..10 {
        assert_eq!(detect_pattern(&rows), first);
    }
}
