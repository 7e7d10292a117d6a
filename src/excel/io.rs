use calamine::{open_workbook_auto, Data, Reader};
use std::path::Path;

use crate::error::ParseError;

/// One sheet as an in-memory cell grid. The parser only ever sees this
/// type, never the workbook file itself.
pub type SheetGrid = Vec<Vec<Data>>;

/// Convert a calamine `Data` cell to a trimmed string. Integral floats are
/// rendered without a decimal point so a numeric "1" matches the textual
/// data-start marker.
pub fn cell_to_string(c: &Data) -> String {
    match c {
        Data::String(s) => s.trim().to_string(),
        Data::Float(f) => {
            if (f.floor() - f).abs() < f64::EPSILON {
                format!("{}", *f as i64)
            } else {
                format!("{f}")
            }
        }
        Data::Int(i) => format!("{i}"),
        Data::Bool(b) => format!("{b}"),
        Data::Empty => String::new(),
        Data::Error(_) => String::new(),
        Data::DateTime(d) => d.to_string(),
        Data::DateTimeIso(s) => s.clone(),
        Data::DurationIso(s) => s.clone(),
    }
}

/// Convert a cell to a non-negative integer; anything unreadable counts
/// as zero (hour and student cells are frequently blank).
pub fn cell_to_u32(c: &Data) -> u32 {
    let v = match c {
        Data::Float(f) => *f as i64,
        Data::Int(i) => *i,
        Data::String(s) => s.trim().parse::<f64>().map(|f| f as i64).unwrap_or(0),
        Data::Bool(b) => i64::from(*b),
        _ => 0,
    };
    v.max(0) as u32
}

/// Read every sheet of a workbook into in-memory grids, in workbook order.
pub fn read_workbook<P: AsRef<Path>>(path: P) -> Result<Vec<(String, SheetGrid)>, ParseError> {
    let mut workbook = open_workbook_auto(path)?;
    let names = workbook.sheet_names().to_owned();

    let mut sheets = Vec::with_capacity(names.len());
    for name in names {
        match workbook.worksheet_range(&name) {
            Ok(range) => {
                let grid: SheetGrid = range.rows().map(|r| r.to_vec()).collect();
                sheets.push((name, grid));
            }
            Err(_) => {
                // unreadable sheets appear as empty grids; the parser will
                // report them as missing data rather than abort the run
                sheets.push((name, Vec::new()));
            }
        }
    }
    Ok(sheets)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn integral_floats_render_without_decimals() {
        assert_eq!(cell_to_string(&Data::Float(1.0)), "1");
        assert_eq!(cell_to_string(&Data::String("  1 ".into())), "1");
        assert_eq!(cell_to_u32(&Data::Float(30.0)), 30);
        assert_eq!(cell_to_u32(&Data::String("15".into())), 15);
        assert_eq!(cell_to_u32(&Data::Empty), 0);
        assert_eq!(cell_to_u32(&Data::Float(-3.0)), 0);
    }
}
