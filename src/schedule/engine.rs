//! The Stage-1 placement engine.
//!
//! A deterministic, greedy, non-backtracking fold over the priority-ordered
//! lecture streams: once a stream is placed its reservations are never
//! undone; a stream with no valid position is reported with the most
//! specific failure reason seen during its search.

use chrono::Utc;

use crate::error::ConfigError;
use crate::excel::normalize::parse_group_year;
use crate::models::{Stream, StreamType};

use super::config::SchedulerConfig;
use super::conflicts::ConflictTracker;
use super::constants::{shift_slots, slot_time_range};
use super::models::{
    Assignment, Day, LectureStream, ScheduleResult, ScheduleStatistics, Shift, UnscheduledReason,
    UnscheduledStream, WeekType,
};
use super::prepare::{filter_stage1_lectures, sort_streams_by_priority};
use super::rooms::RoomManager;

/// Tracks the most specific failure reason over a stream's search.
struct FailureRecord {
    best: Option<(UnscheduledReason, String)>,
}

impl FailureRecord {
    fn new() -> Self {
        FailureRecord { best: None }
    }

    fn record(&mut self, reason: UnscheduledReason, details: String) {
        let better = match &self.best {
            Some((current, _)) => reason.rank() < current.rank(),
            None => true,
        };
        if better {
            self.best = Some((reason, details));
        }
    }

    fn into_best(self, fallback: (UnscheduledReason, String)) -> (UnscheduledReason, String) {
        self.best.unwrap_or(fallback)
    }
}

/// Stage-1 scheduler: places multi-group lectures into the weekly grid.
pub struct Stage1Scheduler {
    config: SchedulerConfig,
}

impl Stage1Scheduler {
    /// Validates the configuration up front; malformed reference data is
    /// the only fatal error of a scheduling run.
    pub fn new(config: SchedulerConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Stage1Scheduler { config })
    }

    /// Run the placement over parsed streams.
    pub fn schedule(&self, streams: &[Stream]) -> ScheduleResult {
        let mut tracker = ConflictTracker::new(&self.config);
        let mut rooms = RoomManager::new(&self.config);

        let mut lectures = filter_stage1_lectures(streams, &self.config);
        sort_streams_by_priority(&mut lectures);
        log::info!("stage 1: placing {} lecture streams", lectures.len());

        let mut assignments: Vec<Assignment> = Vec::new();
        let mut unscheduled_ids: Vec<String> = Vec::new();
        let mut unscheduled: Vec<UnscheduledStream> = Vec::new();

        for stream in &lectures {
            match self.place_stream(stream, &mut tracker, &mut rooms) {
                Ok(placed) => {
                    log::debug!(
                        "placed '{}' ({}) at {} slot {}",
                        stream.subject,
                        stream.id,
                        placed[0].day.as_str(),
                        placed[0].slot
                    );
                    assignments.extend(placed);
                }
                Err(failure) => {
                    log::debug!(
                        "unscheduled '{}' ({}): {:?}",
                        stream.subject,
                        stream.id,
                        failure.reason
                    );
                    unscheduled_ids.push(failure.stream_id.clone());
                    unscheduled.push(failure);
                }
            }
        }

        let statistics = compute_statistics(&assignments, unscheduled.len(), &rooms);
        log::info!(
            "stage 1 done: {} slots assigned, {} streams unscheduled",
            assignments.len(),
            unscheduled.len()
        );

        ScheduleResult {
            generation_date: Utc::now().to_rfc3339(),
            stage: 1,
            assignments,
            unscheduled_stream_ids: unscheduled_ids,
            unscheduled_streams: unscheduled,
            statistics,
        }
    }

    /// Try every (day, slot) position for one stream; reserve the first
    /// that passes all checks.
    fn place_stream(
        &self,
        stream: &LectureStream,
        tracker: &mut ConflictTracker,
        rooms: &mut RoomManager,
    ) -> Result<Vec<Assignment>, UnscheduledStream> {
        let hours = stream.max_hours().min(13) as u8;
        let extended = self.config.options.extend_first_shift_to_slot7;

        let mut failures = FailureRecord::new();
        let mut found_start = false;

        let slots = shift_slots(stream.shift, extended);
        if let Some(placed) =
            self.try_place(stream, hours, &slots, tracker, rooms, &mut failures, &mut found_start)
        {
            return Ok(placed);
        }

        // Third-year fallback: a failed first-shift stream may retry in
        // the second shift when the option is on.
        if self.config.options.third_year_second_shift_fallback
            && stream.shift == Shift::First
            && stream.groups.first().map(|g| parse_group_year(g)) == Some(3)
        {
            let slots = shift_slots(Shift::Second, extended);
            if let Some(placed) = self.try_place(
                stream,
                hours,
                &slots,
                tracker,
                rooms,
                &mut failures,
                &mut found_start,
            ) {
                return Ok(placed);
            }
        }

        let fallback = if found_start {
            (
                UnscheduledReason::AllSlotsExhausted,
                "all candidate positions exhausted".to_string(),
            )
        } else {
            (
                UnscheduledReason::NoConsecutiveSlots,
                format!("no run of {hours} consecutive slots fits the shift"),
            )
        };
        let (reason, details) = failures.into_best(fallback);

        Err(UnscheduledStream {
            stream_id: stream.id.clone(),
            subject: stream.subject.clone(),
            instructor: stream.instructor.clone(),
            groups: stream.groups.clone(),
            student_count: stream.student_count,
            shift: stream.shift,
            reason,
            details,
        })
    }

    /// One full search over the candidate (day, slot) grid for the given
    /// slot list. Commits the reservations on the first valid position.
    #[allow(clippy::too_many_arguments)]
    fn try_place(
        &self,
        stream: &LectureStream,
        hours: u8,
        slots: &[u8],
        tracker: &mut ConflictTracker,
        rooms: &mut RoomManager,
        failures: &mut FailureRecord,
        found_start: &mut bool,
    ) -> Option<Vec<Assignment>> {
        let last_slot = *slots.last()?;

        // Flexible subjects range over the whole week at once; everything
        // else exhausts Mon–Wed before touching Thu–Fri. Within a phase,
        // days with the lightest group load come first.
        let phases: Vec<Vec<Day>> = if stream.flexible {
            vec![Day::ALL.to_vec()]
        } else {
            vec![Day::PRIMARY.to_vec(), Day::FALLBACK.to_vec()]
        };

        for mut days in phases {
            days.sort_by_key(|d| tracker.groups_total_daily_load(&stream.groups, *d));

            for day in days {
                if let Err(details) =
                    tracker.check_instructor_day_constraint(&stream.instructor, day, &stream.groups)
                {
                    failures.record(UnscheduledReason::InstructorDayConstraint, details);
                    continue;
                }

                for &slot in slots {
                    if slot + hours - 1 > last_slot {
                        continue;
                    }
                    *found_start = true;

                    // The tentative address is resolved once per position;
                    // the room manager confirms availability over all H
                    // slots pessimistically.
                    let Some(room) = rooms.find_room(
                        stream,
                        StreamType::Lecture,
                        day,
                        slot,
                        hours,
                        WeekType::Both,
                    ) else {
                        failures.record(
                            UnscheduledReason::NoRoomAvailable,
                            format!(
                                "no room for {} students on {} slot {slot}",
                                stream.student_count,
                                day.as_str()
                            ),
                        );
                        continue;
                    };

                    let mut blocked = false;
                    for i in 0..hours {
                        let current = slot + i;
                        if let Err((reason, details)) = tracker.check_slot(
                            &stream.instructor,
                            &stream.groups,
                            day,
                            current,
                            WeekType::Both,
                        ) {
                            failures.record(reason, details);
                            blocked = true;
                            break;
                        }
                        if let Some((_, details)) = tracker.check_building_gap(
                            &stream.groups,
                            day,
                            current,
                            WeekType::Both,
                            &room.address,
                        ) {
                            failures.record(UnscheduledReason::BuildingGapRequired, details);
                            blocked = true;
                            break;
                        }
                    }
                    if blocked {
                        continue;
                    }

                    // Commit: reserve every slot and emit one assignment
                    // per slot. Nothing past this point can fail.
                    let mut placed = Vec::with_capacity(hours as usize);
                    for i in 0..hours {
                        let current = slot + i;
                        tracker.reserve(
                            &stream.instructor,
                            &stream.groups,
                            day,
                            current,
                            WeekType::Both,
                            &room.address,
                        );
                        rooms.reserve_room(&room.name, day, current, WeekType::Both);
                        placed.push(Assignment {
                            stream_id: stream.id.clone(),
                            subject: stream.subject.clone(),
                            instructor: stream.instructor.clone(),
                            groups: stream.groups.clone(),
                            student_count: stream.student_count,
                            day,
                            slot: current,
                            time: slot_time_range(current).unwrap_or_default(),
                            room: room.name.clone(),
                            room_address: room.address.clone(),
                            week_type: WeekType::Both,
                        });
                    }
                    return Some(placed);
                }
            }
        }

        None
    }
}

fn compute_statistics(
    assignments: &[Assignment],
    unscheduled: usize,
    rooms: &RoomManager,
) -> ScheduleStatistics {
    let mut statistics = ScheduleStatistics {
        total_assigned: assignments.len(),
        total_unscheduled: unscheduled,
        room_utilization: rooms.utilization(),
        ..ScheduleStatistics::default()
    };
    for assignment in assignments {
        *statistics
            .by_day
            .entry(assignment.day.as_str().to_string())
            .or_default() += 1;
        *statistics
            .instructor_hours
            .entry(assignment.instructor.clone())
            .or_default() += 1;
    }
    statistics
}
