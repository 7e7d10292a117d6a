// Data model for schedule generation.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Working weekday.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Day {
    Monday,
    Tuesday,
    Wednesday,
    Thursday,
    Friday,
}

impl Day {
    pub const ALL: [Day; 5] = [
        Day::Monday,
        Day::Tuesday,
        Day::Wednesday,
        Day::Thursday,
        Day::Friday,
    ];

    /// Lecture days tried first for non-flexible subjects.
    pub const PRIMARY: [Day; 3] = [Day::Monday, Day::Tuesday, Day::Wednesday];
    /// Tried only after the primary days are exhausted.
    pub const FALLBACK: [Day; 2] = [Day::Thursday, Day::Friday];

    pub fn as_str(&self) -> &'static str {
        match self {
            Day::Monday => "monday",
            Day::Tuesday => "tuesday",
            Day::Wednesday => "wednesday",
            Day::Thursday => "thursday",
            Day::Friday => "friday",
        }
    }

    pub fn from_name(name: &str) -> Option<Day> {
        match name.trim().to_lowercase().as_str() {
            "monday" => Some(Day::Monday),
            "tuesday" => Some(Day::Tuesday),
            "wednesday" => Some(Day::Wednesday),
            "thursday" => Some(Day::Thursday),
            "friday" => Some(Day::Friday),
            _ => None,
        }
    }
}

/// Which weeks a reservation covers. The Stage-1 scheduler assigns `Both`
/// uniformly; the tag is carried for downstream consumers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WeekType {
    Odd,
    Even,
    Both,
}

/// Shift: first = slots 1–5, second = slots 6–13.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Shift {
    First,
    Second,
}

/// A schedulable room.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Room {
    pub name: String,
    pub capacity: u32,
    pub address: String,
    /// Special rooms are usable only through subject or instructor
    /// room declarations.
    #[serde(default)]
    pub is_special: bool,
}

/// A lecture stream prepared for Stage-1 placement, with the fields the
/// priority sort needs precomputed.
#[derive(Debug, Clone, Serialize)]
pub struct LectureStream {
    pub id: String,
    pub subject: String,
    pub instructor: String,
    pub language: String,
    pub groups: Vec<String>,
    pub student_count: u32,
    pub hours_odd_week: u32,
    pub hours_even_week: u32,
    pub shift: Shift,
    pub sheet: String,
    /// Weekly teaching minutes not blocked by the availability config.
    pub instructor_available_minutes: u32,
    /// Practical + lab hours of the subject across all its streams.
    pub subject_prac_lab_hours: u32,
    /// Flexible subjects may be placed on any weekday.
    pub flexible: bool,
}

impl LectureStream {
    /// Consecutive slots the stream needs in its heavier week.
    pub fn max_hours(&self) -> u32 {
        self.hours_odd_week.max(self.hours_even_week)
    }
}

/// Why a stream could not be placed. Ordered from most to least specific;
/// the engine reports the most specific reason seen during its search.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnscheduledReason {
    InstructorUnavailable,
    InstructorDayConstraint,
    InstructorConflict,
    GroupConflict,
    BuildingGapRequired,
    NoConsecutiveSlots,
    NoRoomAvailable,
    AllSlotsExhausted,
}

impl UnscheduledReason {
    /// Lower rank = more specific.
    pub fn rank(&self) -> u8 {
        match self {
            UnscheduledReason::InstructorUnavailable => 0,
            UnscheduledReason::InstructorDayConstraint => 1,
            UnscheduledReason::InstructorConflict => 2,
            UnscheduledReason::GroupConflict => 3,
            UnscheduledReason::BuildingGapRequired => 4,
            UnscheduledReason::NoConsecutiveSlots => 5,
            UnscheduledReason::NoRoomAvailable => 6,
            UnscheduledReason::AllSlotsExhausted => 7,
        }
    }
}

/// One scheduled slot of a stream.
#[derive(Debug, Clone, Serialize)]
pub struct Assignment {
    pub stream_id: String,
    pub subject: String,
    pub instructor: String,
    pub groups: Vec<String>,
    pub student_count: u32,
    pub day: Day,
    pub slot: u8,
    pub time: String,
    pub room: String,
    pub room_address: String,
    pub week_type: WeekType,
}

/// A stream the engine failed to place, with the most specific reason.
#[derive(Debug, Clone, Serialize)]
pub struct UnscheduledStream {
    pub stream_id: String,
    pub subject: String,
    pub instructor: String,
    pub groups: Vec<String>,
    pub student_count: u32,
    pub shift: Shift,
    pub reason: UnscheduledReason,
    pub details: String,
}

/// Aggregate numbers over the generated schedule. Maps are ordered so the
/// serialized result is deterministic.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ScheduleStatistics {
    pub total_assigned: usize,
    pub total_unscheduled: usize,
    pub by_day: BTreeMap<String, usize>,
    /// Percentage of the 65 weekly slots each room is reserved for.
    pub room_utilization: BTreeMap<String, f64>,
    /// Scheduled slot-hours per instructor.
    pub instructor_hours: BTreeMap<String, u32>,
}

/// Result of a Stage-1 scheduling run.
#[derive(Debug, Clone, Serialize)]
pub struct ScheduleResult {
    pub generation_date: String,
    pub stage: u8,
    pub assignments: Vec<Assignment>,
    pub unscheduled_stream_ids: Vec<String>,
    pub unscheduled_streams: Vec<UnscheduledStream>,
    pub statistics: ScheduleStatistics,
}

impl ScheduleResult {
    pub fn total_assigned(&self) -> usize {
        self.assignments.len()
    }

    pub fn total_unscheduled(&self) -> usize {
        self.unscheduled_streams.len()
    }
}
