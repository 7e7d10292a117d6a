// Root of the `form1_timetable` crate.
// Re-exports the parser and scheduler entry points so callers can stay on
// the crate root for the common flow: parse a workbook, then schedule.

pub mod error;
pub mod excel;
pub mod models;
pub mod schedule;

pub use error::{ConfigError, ParseError};
pub use excel::parser::Form1Parser;
pub use models::{ParseResult, Stream, StreamType, SubjectSummary, WeeklyHours};
pub use schedule::config::{ScheduleOptions, SchedulerConfig};
pub use schedule::engine::Stage1Scheduler;
pub use schedule::models::{Room, ScheduleResult, UnscheduledReason};
