use calamine::Data;

use form1_timetable::excel::SheetGrid;
use form1_timetable::{Form1Parser, StreamType};

const INSTRUCTOR_COL: usize = 11;

fn s(text: &str) -> Data {
    Data::String(text.to_string())
}

fn n(value: f64) -> Data {
    Data::Float(value)
}

/// Build one data row in the fixed Form-1 column layout, instructor in
/// column 11.
fn data_row(
    number: &str,
    subject: &str,
    group: &str,
    students: f64,
    lecture: f64,
    practical: f64,
    lab: f64,
    instructor: &str,
) -> Vec<Data> {
    let mut row = vec![Data::Empty; INSTRUCTOR_COL + 1];
    row[0] = s(number);
    row[1] = s(subject);
    row[4] = s(group);
    row[6] = s("каз");
    row[7] = if students > 0.0 { n(students) } else { Data::Empty };
    row[8] = if lecture > 0.0 { n(lecture) } else { Data::Empty };
    row[9] = if practical > 0.0 { n(practical) } else { Data::Empty };
    row[10] = if lab > 0.0 { n(lab) } else { Data::Empty };
    row[INSTRUCTOR_COL] = s(instructor);
    row
}

/// Eleven filler rows so data starts at index 11, where the
/// instructor-column scan begins looking.
fn header_rows() -> SheetGrid {
    (0..11).map(|_| vec![Data::Empty]).collect()
}

fn parser_for(sheet: &str) -> Form1Parser {
    Form1Parser::new().with_sheet_names(vec![sheet.to_string()])
}

#[test]
fn test_parses_a_basic_sheet() {
    let mut grid = header_rows();
    grid.push(data_row("1", "Математика", "АРХ-21 О", 25.0, 30.0, 15.0, 0.0, "доц. Иванов И.И."));
    grid.push(data_row("2", "", "АРХ-23", 20.0, 0.0, 15.0, 0.0, ""));

    let sheets = vec![("тест".to_string(), grid)];
    let result = parser_for("тест").parse_sheets("workload.xlsx", &sheets);

    assert_eq!(result.sheets_processed, vec!["тест"]);
    assert!(result.warnings.is_empty(), "{:?}", result.warnings);
    assert_eq!(result.total_subjects(), 1);

    // subject forward-fill put both rows into one block; instructor column
    // was discovered from the "доц" marker
    let lectures: Vec<_> = result
        .streams
        .iter()
        .filter(|s| s.stream_type == StreamType::Lecture)
        .collect();
    assert_eq!(lectures.len(), 1);
    assert_eq!(lectures[0].subject, "Математика");
    assert_eq!(lectures[0].instructor, "Иванов И.И.");
    assert_eq!(lectures[0].groups, vec!["АРХ-21 О", "АРХ-23"]);
    assert_eq!(lectures[0].student_count, 45);

    let practicals = result
        .streams
        .iter()
        .filter(|s| s.stream_type == StreamType::Practical)
        .count();
    assert_eq!(practicals, 2);
}

#[test]
fn test_semester_marker_skips_one_header_row() {
    let mut grid = header_rows();
    // the marker row itself is a header; data begins on the next row
    grid.push({
        let mut row = vec![Data::Empty; INSTRUCTOR_COL + 1];
        row[0] = s("2 семестр");
        row
    });
    grid.push(data_row("1", "Физика", "СТР-11", 22.0, 15.0, 0.0, 0.0, "а.о. Петров П.П."));

    let sheets = vec![("тест".to_string(), grid)];
    let result = parser_for("тест").parse_sheets("workload.xlsx", &sheets);

    assert_eq!(result.total_streams(), 1);
    assert_eq!(result.streams[0].subject, "Физика");
}

#[test]
fn test_numeric_data_start_marker() {
    let mut grid = header_rows();
    // Excel stores the "1" marker as a number
    let mut row = data_row("", "Химия", "ЭЛ-11", 18.0, 15.0, 0.0, 0.0, "с.п. Омарова Ж.К.");
    row[0] = n(1.0);
    grid.push(row);

    let sheets = vec![("тест".to_string(), grid)];
    let result = parser_for("тест").parse_sheets("workload.xlsx", &sheets);
    assert_eq!(result.total_streams(), 1);
}

#[test]
fn test_known_instructor_column_is_used_when_in_range() {
    // sheet "эиб" has a known instructor column at index 25
    let mut grid: SheetGrid = (0..11).map(|_| vec![Data::Empty]).collect();
    let mut row = vec![Data::Empty; 27];
    row[0] = s("1");
    row[1] = s("Экономика");
    row[4] = s("ЭИБ-21");
    row[6] = s("орыс");
    row[7] = n(30.0);
    row[8] = n(30.0);
    // a decoy instructor marker left of the real column
    row[12] = s("доц. Ложный Л.Л.");
    row[25] = s("проф. Настоящий Н.Н.");
    grid.push(row);
    let mut second = vec![Data::Empty; 27];
    second[0] = s("2");
    second[4] = s("ЭИБ-23");
    second[7] = n(25.0);
    grid.push(second);

    let sheets = vec![("эиб".to_string(), grid)];
    let result = Form1Parser::new()
        .with_sheet_names(vec!["эиб".to_string()])
        .parse_sheets("workload.xlsx", &sheets);

    assert_eq!(result.streams.len(), 1);
    assert_eq!(result.streams[0].instructor, "Настоящий Н.Н.");
}

#[test]
fn test_failed_sheet_is_isolated() {
    // first sheet has no data-start marker at all; second one is fine
    let broken: SheetGrid = vec![vec![s("шапка")], vec![s("без маркера")]];
    let mut good = header_rows();
    good.push(data_row("1", "Физика", "СТР-11", 22.0, 15.0, 0.0, 0.0, "а.о. Петров П.П."));

    let sheets = vec![("стр".to_string(), broken), ("тест".to_string(), good)];
    let result = Form1Parser::new()
        .with_sheet_names(vec!["стр".to_string(), "тест".to_string()])
        .parse_sheets("workload.xlsx", &sheets);

    assert_eq!(result.sheets_processed, vec!["тест"]);
    assert_eq!(result.total_streams(), 1);
    assert_eq!(result.warnings.len(), 1);
    assert!(result.warnings[0].contains("стр"), "{}", result.warnings[0]);
}

#[test]
fn test_missing_sheet_is_a_warning_not_an_error() {
    let sheets: Vec<(String, SheetGrid)> = Vec::new();
    let result = parser_for("эиб").parse_sheets("workload.xlsx", &sheets);

    assert!(result.sheets_processed.is_empty());
    assert_eq!(result.warnings.len(), 1);
    assert!(result.warnings[0].contains("эиб"));
}

#[test]
fn test_invalid_group_code_skips_the_row() {
    let mut grid = header_rows();
    grid.push(data_row("1", "Математика", "АРХ-21", 25.0, 30.0, 0.0, 0.0, "доц. Иванов И.И."));
    // summary row: the group cell holds a word, not a group code
    grid.push(data_row("2", "", "итого", 45.0, 0.0, 0.0, 0.0, ""));

    let sheets = vec![("тест".to_string(), grid)];
    let result = parser_for("тест").parse_sheets("workload.xlsx", &sheets);

    assert_eq!(result.warnings.len(), 1);
    assert!(result.warnings[0].contains("итого"), "{}", result.warnings[0]);
    let lecture = &result.streams[0];
    assert_eq!(lecture.groups, vec!["АРХ-21"]);
}

#[test]
fn test_validate_reports_structure() {
    let mut good = header_rows();
    good.push(data_row("1", "Физика", "СТР-11", 22.0, 15.0, 0.0, 0.0, "а.о. Петров П.П."));
    let sheets = vec![("тест".to_string(), good)];

    let parser = Form1Parser::new().with_sheet_names(vec!["тест".to_string(), "эиб".to_string()]);
    let report = parser.validate(&sheets);

    assert!(report.valid);
    assert_eq!(report.sheets_found, vec!["тест"]);
    assert_eq!(report.sheets_missing, vec!["эиб"]);

    let empty: Vec<(String, SheetGrid)> = Vec::new();
    let report = parser.validate(&empty);
    assert!(!report.valid);
}
