use thiserror::Error;

/// Errors raised while reading a Form-1 workbook.
///
/// Everything except `Workbook` is recoverable: the parser downgrades these
/// to warnings and keeps going with the remaining sheets or rows.
#[derive(Debug, Error)]
pub enum ParseError {
    #[error("sheet '{0}' not found in workbook")]
    SheetNotFound(String),

    #[error(
        "could not locate data start row in sheet '{0}': \
         expected marker '1', '2 семестр' or '2семестр' in column 0"
    )]
    DataStartNotFound(String),

    #[error(
        "could not locate instructor column in sheet '{0}': \
         no column contains instructor markers"
    )]
    InstructorColumnNotFound(String),

    #[error(
        "invalid total hours {0}: must satisfy 8×odd + 7×even = total \
         (remainder mod 15 must be 0, 7 or 8)"
    )]
    InvalidHours(u32),

    #[error("invalid data in sheet '{sheet}' row {row}: {message}")]
    InvalidData {
        sheet: String,
        row: usize,
        message: String,
    },

    #[error("invalid group code '{code}' in sheet '{sheet}' row {row}")]
    InvalidGroupCode {
        sheet: String,
        row: usize,
        code: String,
    },

    #[error("failed to open workbook: {0}")]
    Workbook(#[from] calamine::Error),
}

/// Fatal configuration problems. Unlike `ParseError` these abort the run
/// before any scheduling happens.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("duplicate room '{name}' at '{address}'")]
    DuplicateRoom { name: String, address: String },

    #[error("address '{0}' appears in more than one nearby-buildings group")]
    OverlappingNearbyGroups(String),

    #[error("invalid configuration JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("failed to read configuration file: {0}")]
    Io(#[from] std::io::Error),
}
