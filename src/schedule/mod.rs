//! The `schedule` module covers Stage-1 timetable generation.
//!
//! Submodules:
//! - `constants`: the weekly time grid and shift rules
//! - `models`: schedule data model and result types
//! - `config`: reference configuration and behavior switches
//! - `conflicts`: occupancy indexes and availability queries
//! - `rooms`: room selection under the four-tier priority policy
//! - `prepare`: stream filtering and the priority order
//! - `engine`: the greedy placement engine

pub mod config;
pub mod conflicts;
pub mod constants;
pub mod engine;
pub mod models;
pub mod prepare;
pub mod rooms;

pub use config::{ScheduleOptions, SchedulerConfig};
pub use conflicts::ConflictTracker;
pub use engine::Stage1Scheduler;
pub use models::{
    Assignment, Day, LectureStream, Room, ScheduleResult, ScheduleStatistics, Shift,
    UnscheduledReason, UnscheduledStream, WeekType,
};
pub use rooms::RoomManager;
