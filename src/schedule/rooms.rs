//! Room selection under the four-tier priority policy.

use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};

use crate::excel::normalize::{normalize_instructor_name, parse_specialty_code};
use crate::models::StreamType;

use super::config::{RoomPreferences, RoomSpot, SchedulerConfig, SpecialtyBuildings};
use super::constants::SLOTS_PER_WEEK;
use super::models::{Day, LectureStream, Room, WeekType};

fn week_variants(week: WeekType) -> &'static [WeekType] {
    match week {
        WeekType::Both => &[WeekType::Both, WeekType::Odd, WeekType::Even],
        WeekType::Odd => &[WeekType::Odd, WeekType::Both],
        WeekType::Even => &[WeekType::Even, WeekType::Both],
    }
}

/// Picks rooms for streams and keeps its own occupancy map, written only
/// by the placement engine through [`RoomManager::reserve_room`].
///
/// Tier order (first tier yielding candidates decides):
/// 1. subject-required rooms — strict, no fallthrough when declared
/// 2. instructor room preferences
/// 3. group-building preference (all groups share one declared specialty)
/// 4. general pool
pub struct RoomManager {
    rooms: Vec<Room>,
    subject_rooms: BTreeMap<String, RoomPreferences>,
    /// Keyed by normalized instructor name.
    instructor_rooms: BTreeMap<String, RoomPreferences>,
    group_buildings: BTreeMap<String, SpecialtyBuildings>,
    /// Declared addresses are exclusive: address → specialties allowed there.
    reserved_addresses: BTreeMap<String, BTreeSet<String>>,
    room_schedule: HashMap<(Day, u8, WeekType), HashSet<String>>,
}

impl RoomManager {
    pub fn new(config: &SchedulerConfig) -> Self {
        let mut reserved_addresses: BTreeMap<String, BTreeSet<String>> = BTreeMap::new();
        for (specialty, buildings) in &config.group_buildings {
            for spec in &buildings.addresses {
                if !spec.address.is_empty() {
                    reserved_addresses
                        .entry(spec.address.clone())
                        .or_default()
                        .insert(specialty.clone());
                }
            }
        }

        let instructor_rooms = config
            .instructor_rooms
            .iter()
            .map(|(name, prefs)| (normalize_instructor_name(name), prefs.clone()))
            .collect();

        RoomManager {
            rooms: config.rooms.clone(),
            subject_rooms: config.subject_rooms.clone(),
            instructor_rooms,
            group_buildings: config.group_buildings.clone(),
            reserved_addresses,
            room_schedule: HashMap::new(),
        }
    }

    /// Capacity slack granted when no exactly-fitting room exists: 50% for
    /// streams of ≤30 students, 20% at ≥100, linear in between.
    pub fn calculate_buffer(student_count: u32) -> u32 {
        let pct = if student_count <= 30 {
            0.5
        } else if student_count >= 100 {
            0.2
        } else {
            0.5 - ((student_count as f64 - 30.0) / 70.0) * 0.3
        };
        (student_count as f64 * pct) as u32
    }

    /// Find a room for `hours` consecutive slots starting at `slot`.
    ///
    /// Returns `None` when no tier yields an available room — including the
    /// strict case where the subject declares rooms and none of them is
    /// free.
    pub fn find_room(
        &self,
        stream: &LectureStream,
        class: StreamType,
        day: Day,
        slot: u8,
        hours: u8,
        week: WeekType,
    ) -> Option<Room> {
        // 1. Subject-required rooms: when declared, they are the only
        //    option for this subject.
        if let Some(prefs) = self.subject_rooms.get(&stream.subject) {
            let candidates = self.resolve_spots(prefs.for_class(class));
            if !candidates.is_empty() {
                return self
                    .pick_by_capacity(candidates, stream, day, slot, hours, week, true)
                    .cloned();
            }
        }

        // 2. Instructor preferences.
        let instructor = normalize_instructor_name(&stream.instructor);
        if let Some(prefs) = self.instructor_rooms.get(&instructor) {
            let candidates = self.resolve_spots(prefs.for_class(class));
            if let Some(room) =
                self.pick_by_capacity(candidates, stream, day, slot, hours, week, true)
            {
                return Some(room.clone());
            }
        }

        // 3. Group-building preference.
        let candidates = self.group_building_rooms(&stream.groups);
        if let Some(room) = self.pick_by_capacity(candidates, stream, day, slot, hours, week, false)
        {
            return Some(room.clone());
        }

        // 4. General pool.
        self.pick_by_capacity(self.rooms.iter().collect(), stream, day, slot, hours, week, false)
            .cloned()
    }

    /// Mark a room occupied at (day, slot, week).
    pub fn reserve_room(&mut self, room_name: &str, day: Day, slot: u8, week: WeekType) {
        self.room_schedule
            .entry((day, slot, week))
            .or_default()
            .insert(room_name.to_string());
    }

    pub fn is_room_available(&self, room_name: &str, day: Day, slot: u8, week: WeekType) -> bool {
        !week_variants(week).iter().any(|w| {
            self.room_schedule
                .get(&(day, slot, *w))
                .is_some_and(|set| set.contains(room_name))
        })
    }

    pub fn room_by_name(&self, name: &str) -> Option<&Room> {
        self.rooms.iter().find(|r| r.name == name)
    }

    /// Reserved-slot share per room, in percent of the 65 weekly slots.
    pub fn utilization(&self) -> BTreeMap<String, f64> {
        let mut counts: BTreeMap<String, u32> = BTreeMap::new();
        for names in self.room_schedule.values() {
            for name in names {
                *counts.entry(name.clone()).or_default() += 1;
            }
        }
        counts
            .into_iter()
            .map(|(name, count)| (name, f64::from(count) * 100.0 / f64::from(SLOTS_PER_WEEK)))
            .collect()
    }

    /// Resolve location entries to rooms: a named room must match exactly,
    /// an address-only entry admits every room at that address.
    fn resolve_spots(&self, spots: &[RoomSpot]) -> Vec<&Room> {
        let mut rooms = Vec::new();
        for spot in spots {
            if spot.room.is_empty() {
                rooms.extend(self.rooms.iter().filter(|r| r.address == spot.address));
            } else if let Some(room) = self
                .rooms
                .iter()
                .find(|r| r.name == spot.room && r.address == spot.address)
            {
                rooms.push(room);
            }
        }
        rooms
    }

    /// Rooms in the declared buildings of the stream's specialty. Applies
    /// only when every group shares the same specialty prefix.
    fn group_building_rooms(&self, groups: &[String]) -> Vec<&Room> {
        let Some(first) = groups.first() else {
            return Vec::new();
        };
        let specialty = parse_specialty_code(first);
        if specialty.is_empty()
            || groups
                .iter()
                .any(|g| parse_specialty_code(g) != specialty)
        {
            return Vec::new();
        }
        let Some(buildings) = self.group_buildings.get(&specialty) else {
            return Vec::new();
        };

        let mut rooms = Vec::new();
        for spec in &buildings.addresses {
            for room in self.rooms.iter().filter(|r| r.address == spec.address) {
                if spec.rooms.is_empty() || spec.rooms.contains(&room.name) {
                    rooms.push(room);
                }
            }
        }
        rooms
    }

    /// Exclusive-building rule: a declared address only admits streams
    /// whose specialties all declared it.
    fn address_allowed_for_groups(&self, address: &str, groups: &[String]) -> bool {
        let Some(allowed) = self.reserved_addresses.get(address) else {
            return true;
        };
        groups.iter().all(|group| {
            let specialty = parse_specialty_code(group);
            !specialty.is_empty() && allowed.contains(&specialty)
        })
    }

    fn is_occupied_any(&self, room: &Room, day: Day, slot: u8, hours: u8, week: WeekType) -> bool {
        (0..hours).any(|i| !self.is_room_available(&room.name, day, slot + i, week))
    }

    /// Selection inside a candidate set: the smallest room that fits, ties
    /// broken by name; with no plain fit, the largest room that fits with
    /// the capacity buffer.
    #[allow(clippy::too_many_arguments)]
    fn pick_by_capacity<'a>(
        &self,
        candidates: Vec<&'a Room>,
        stream: &LectureStream,
        day: Day,
        slot: u8,
        hours: u8,
        week: WeekType,
        allow_special: bool,
    ) -> Option<&'a Room> {
        let mut available: Vec<&Room> = candidates
            .into_iter()
            .filter(|r| allow_special || !r.is_special)
            .filter(|r| self.address_allowed_for_groups(&r.address, &stream.groups))
            .filter(|r| !self.is_occupied_any(r, day, slot, hours, week))
            .collect();
        if available.is_empty() {
            return None;
        }

        available.sort_by(|a, b| a.capacity.cmp(&b.capacity).then_with(|| a.name.cmp(&b.name)));

        // Preferred: smallest room with plain capacity.
        if let Some(room) = available
            .iter()
            .copied()
            .find(|r| r.capacity >= stream.student_count)
        {
            return Some(room);
        }

        // Buffer fallback: largest room that fits with the slack added.
        let buffer = Self::calculate_buffer(stream.student_count);
        available.sort_by(|a, b| b.capacity.cmp(&a.capacity).then_with(|| a.name.cmp(&b.name)));
        available
            .into_iter()
            .find(|r| r.capacity + buffer >= stream.student_count)
    }
}
