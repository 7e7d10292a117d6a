//! Conflict tracking: per-resource occupancy indexes and availability
//! queries. All indexes are append-only during a run; there is no release
//! primitive.

use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};

use crate::excel::normalize::{normalize_instructor_name, parse_group_year};

use super::config::SchedulerConfig;
use super::constants::time_to_slot;
use super::models::{Day, UnscheduledReason, WeekType};

/// A `Both` reservation collides with `Odd` and `Even` ones and vice
/// versa; a specific week only collides with itself and `Both`.
fn week_variants(week: WeekType) -> &'static [WeekType] {
    match week {
        WeekType::Both => &[WeekType::Both, WeekType::Odd, WeekType::Even],
        WeekType::Odd => &[WeekType::Odd, WeekType::Both],
        WeekType::Even => &[WeekType::Even, WeekType::Both],
    }
}

/// Tracks who is reserved where.
///
/// Indexes:
/// - instructor and group occupancy per (day, slot, week type)
/// - lesson count per (group, day) for load balancing
/// - building address per (group, day, slot, week type) for travel-gap checks
pub struct ConflictTracker {
    instructor_slots: HashMap<(Day, u8, WeekType), HashSet<String>>,
    group_slots: HashMap<(Day, u8, WeekType), HashSet<String>>,
    group_day_load: HashMap<(String, Day), u32>,
    group_buildings: HashMap<(String, Day, u8, WeekType), String>,
    /// instructor → day → blocked slots, from the availability config.
    weekly_unavailable: HashMap<String, HashMap<Day, BTreeSet<u8>>>,
    /// Address sets whose members need no travel gap between them.
    nearby_groups: Vec<BTreeSet<String>>,
    /// instructor → year → allowed days.
    day_constraints: HashMap<String, BTreeMap<u8, Vec<Day>>>,
    one_day_per_week: HashSet<String>,
    days_used: HashMap<String, BTreeSet<Day>>,
    enforce_one_day: bool,
    dead_groups: BTreeSet<String>,
    skip_dead_groups: bool,
}

impl ConflictTracker {
    pub fn new(config: &SchedulerConfig) -> Self {
        let mut weekly_unavailable: HashMap<String, HashMap<Day, BTreeSet<u8>>> = HashMap::new();
        for record in &config.instructor_availability {
            let name = normalize_instructor_name(&record.name);
            if name.is_empty() {
                continue;
            }
            let by_day = weekly_unavailable.entry(name).or_default();
            for (day_name, times) in &record.weekly_unavailable {
                let Some(day) = Day::from_name(day_name) else {
                    continue;
                };
                let slots: BTreeSet<u8> = times.iter().filter_map(|t| time_to_slot(t)).collect();
                if !slots.is_empty() {
                    by_day.entry(day).or_default().extend(slots);
                }
            }
        }

        let mut day_constraints: HashMap<String, BTreeMap<u8, Vec<Day>>> = HashMap::new();
        let mut one_day_per_week = HashSet::new();
        for record in &config.instructor_days {
            let name = normalize_instructor_name(&record.name);
            if name.is_empty() {
                continue;
            }
            let years = day_constraints.entry(name.clone()).or_default();
            for (year, day_names) in &record.year_days {
                let Ok(year) = year.parse::<u8>() else {
                    continue;
                };
                let days: Vec<Day> = day_names.iter().filter_map(|d| Day::from_name(d)).collect();
                if !days.is_empty() {
                    years.insert(year, days);
                }
            }
            if record.one_day_per_week {
                one_day_per_week.insert(name);
            }
        }

        ConflictTracker {
            instructor_slots: HashMap::new(),
            group_slots: HashMap::new(),
            group_day_load: HashMap::new(),
            group_buildings: HashMap::new(),
            weekly_unavailable,
            nearby_groups: config.nearby_buildings.clone(),
            day_constraints,
            one_day_per_week,
            days_used: HashMap::new(),
            enforce_one_day: config.options.enforce_one_day_per_week,
            dead_groups: config.dead_groups.clone(),
            skip_dead_groups: config.options.dead_groups_skip_conflicts,
        }
    }

    /// True when the availability config blocks this (day, slot).
    pub fn is_weekly_unavailable(&self, instructor: &str, day: Day, slot: u8) -> bool {
        let name = normalize_instructor_name(instructor);
        self.weekly_unavailable
            .get(&name)
            .and_then(|by_day| by_day.get(&day))
            .is_some_and(|slots| slots.contains(&slot))
    }

    /// Instructor is free: not blocked by config and not already reserved.
    pub fn is_instructor_available(
        &self,
        instructor: &str,
        day: Day,
        slot: u8,
        week: WeekType,
    ) -> bool {
        if self.is_weekly_unavailable(instructor, day, slot) {
            return false;
        }
        let name = normalize_instructor_name(instructor);
        !week_variants(week).iter().any(|w| {
            self.instructor_slots
                .get(&(day, slot, *w))
                .is_some_and(|set| set.contains(&name))
        })
    }

    /// All groups of the list are free at (day, slot, week).
    pub fn are_groups_available(&self, groups: &[String], day: Day, slot: u8, week: WeekType) -> bool {
        groups
            .iter()
            .filter(|g| self.counts_for_conflicts(g))
            .all(|group| {
                !week_variants(week).iter().any(|w| {
                    self.group_slots
                        .get(&(day, slot, *w))
                        .is_some_and(|set| set.contains(group))
                })
            })
    }

    pub fn group_daily_load(&self, group: &str, day: Day) -> u32 {
        self.group_day_load
            .get(&(group.to_string(), day))
            .copied()
            .unwrap_or(0)
    }

    /// Sum of lessons the groups already have on this day.
    pub fn groups_total_daily_load(&self, groups: &[String], day: Day) -> u32 {
        groups.iter().map(|g| self.group_daily_load(g, day)).sum()
    }

    /// Where a group sits at (day, slot), if anywhere.
    pub fn group_building_at(
        &self,
        group: &str,
        day: Day,
        slot: u8,
        week: WeekType,
    ) -> Option<&str> {
        week_variants(week).iter().find_map(|w| {
            self.group_buildings
                .get(&(group.to_string(), day, slot, *w))
                .map(String::as_str)
        })
    }

    pub fn buildings_nearby(&self, a: &str, b: &str) -> bool {
        if a == b {
            return true;
        }
        self.nearby_groups
            .iter()
            .any(|group| group.contains(a) && group.contains(b))
    }

    /// Travel-gap rule: a group coming from (or going to) a non-nearby
    /// building in the adjacent slot needs an empty slot in between.
    /// Returns the offending group and a description on violation.
    pub fn check_building_gap(
        &self,
        groups: &[String],
        day: Day,
        slot: u8,
        week: WeekType,
        target_address: &str,
    ) -> Option<(String, String)> {
        if target_address.is_empty() {
            return None;
        }
        for group in groups {
            for adjacent in [slot.checked_sub(1), slot.checked_add(1)] {
                let Some(adjacent) = adjacent else { continue };
                if adjacent < 1 {
                    continue;
                }
                let Some(address) = self.group_building_at(group, day, adjacent, week) else {
                    continue;
                };
                if !self.buildings_nearby(target_address, address) {
                    let direction = if adjacent < slot { "previous" } else { "next" };
                    return Some((
                        group.clone(),
                        format!(
                            "group '{group}' is at '{address}' in the {direction} slot ({adjacent}), \
                             not nearby '{target_address}'; a travel gap is required"
                        ),
                    ));
                }
            }
        }
        None
    }

    /// Day constraints from the instructor-days config: the year taught
    /// must be among the instructor's allowed days; with the
    /// one-day-per-week option on, a second distinct day is rejected.
    pub fn check_instructor_day_constraint(
        &self,
        instructor: &str,
        day: Day,
        groups: &[String],
    ) -> Result<(), String> {
        let name = normalize_instructor_name(instructor);

        if let Some(years) = self.day_constraints.get(&name) {
            let year = groups.first().map(|g| parse_group_year(g)).unwrap_or(1);
            if let Some(allowed) = years.get(&year) {
                if !allowed.contains(&day) {
                    return Err(format!(
                        "instructor '{name}' does not teach year {year} on {}",
                        day.as_str()
                    ));
                }
            }
        }

        if self.enforce_one_day && self.one_day_per_week.contains(&name) {
            if let Some(used) = self.days_used.get(&name) {
                if !used.is_empty() && !used.contains(&day) {
                    return Err(format!(
                        "instructor '{name}' teaches on one day per week only"
                    ));
                }
            }
        }

        Ok(())
    }

    /// Availability of a single slot, reporting the most specific failure.
    pub fn check_slot(
        &self,
        instructor: &str,
        groups: &[String],
        day: Day,
        slot: u8,
        week: WeekType,
    ) -> Result<(), (UnscheduledReason, String)> {
        if self.is_weekly_unavailable(instructor, day, slot) {
            return Err((
                UnscheduledReason::InstructorUnavailable,
                format!(
                    "instructor '{instructor}' is unavailable on {} slot {slot} per weekly schedule",
                    day.as_str()
                ),
            ));
        }
        if !self.is_instructor_available(instructor, day, slot, week) {
            return Err((
                UnscheduledReason::InstructorConflict,
                format!(
                    "instructor '{instructor}' is already scheduled on {} slot {slot}",
                    day.as_str()
                ),
            ));
        }
        for group in groups {
            if !self.are_groups_available(std::slice::from_ref(group), day, slot, week) {
                return Err((
                    UnscheduledReason::GroupConflict,
                    format!(
                        "group '{group}' is already scheduled on {} slot {slot}",
                        day.as_str()
                    ),
                ));
            }
        }
        Ok(())
    }

    /// Mark every index for a placement the caller has already validated.
    /// Reservations are monotone: nothing is ever released.
    pub fn reserve(
        &mut self,
        instructor: &str,
        groups: &[String],
        day: Day,
        slot: u8,
        week: WeekType,
        address: &str,
    ) {
        let name = normalize_instructor_name(instructor);
        self.instructor_slots
            .entry((day, slot, week))
            .or_default()
            .insert(name.clone());
        self.days_used.entry(name).or_default().insert(day);

        for group in groups {
            if !self.counts_for_conflicts(group) {
                continue;
            }
            self.group_slots
                .entry((day, slot, week))
                .or_default()
                .insert(group.clone());
            *self
                .group_day_load
                .entry((group.clone(), day))
                .or_default() += 1;
            if !address.is_empty() {
                self.group_buildings
                    .insert((group.clone(), day, slot, week), address.to_string());
            }
        }
    }

    /// Dead groups normally occupy the indexes like any other group; the
    /// `dead_groups_skip_conflicts` option drops them out entirely.
    fn counts_for_conflicts(&self, group: &str) -> bool {
        !(self.skip_dead_groups && self.dead_groups.contains(group))
    }
}
