//! Scheduler configuration.
//!
//! Every input the scheduler consumes arrives as an in-memory structured
//! value; the `load_dir` helper only deserializes the reference JSON files
//! into those values. Missing files simply leave their section empty.

use std::collections::{BTreeMap, BTreeSet, HashSet};
use std::fs;
use std::path::Path;

use serde::Deserialize;

use crate::error::ConfigError;
use crate::models::StreamType;

use super::models::Room;

/// One allowed location: an address, optionally narrowed to a single room.
/// An empty room name admits every room at the address.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RoomSpot {
    pub address: String,
    #[serde(default)]
    pub room: String,
}

/// Room lists keyed by class type, with a `locations` list applying to all
/// types when no type-specific list is present.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RoomPreferences {
    #[serde(default)]
    pub locations: Vec<RoomSpot>,
    #[serde(default)]
    pub lecture: Vec<RoomSpot>,
    #[serde(default)]
    pub practice: Vec<RoomSpot>,
    #[serde(default)]
    pub lab: Vec<RoomSpot>,
}

impl RoomPreferences {
    /// Locations for a class type; falls back to the general list.
    pub fn for_class(&self, class: StreamType) -> &[RoomSpot] {
        let specific = match class {
            StreamType::Lecture => &self.lecture,
            StreamType::Practical => &self.practice,
            StreamType::Lab => &self.lab,
        };
        if specific.is_empty() {
            &self.locations
        } else {
            specific
        }
    }
}

/// Weekly unavailability of one instructor: day name → list of blocked
/// slot-start times ("HH:MM").
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AvailabilityRecord {
    pub name: String,
    #[serde(default)]
    pub weekly_unavailable: BTreeMap<String, Vec<String>>,
}

/// Day constraints of one instructor: study year → allowed day names.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct DayConstraintRecord {
    pub name: String,
    #[serde(default)]
    pub year_days: BTreeMap<String, Vec<String>>,
    #[serde(default)]
    pub one_day_per_week: bool,
}

/// Building declaration of one specialty.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct BuildingSpec {
    pub address: String,
    /// Optional room whitelist at this address.
    #[serde(default)]
    pub rooms: Vec<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SpecialtyBuildings {
    #[serde(default)]
    pub addresses: Vec<BuildingSpec>,
}

#[derive(Debug, Clone, Default, Deserialize)]
struct NearbyBuildingsFile {
    #[serde(default)]
    groups: Vec<NearbyGroup>,
}

#[derive(Debug, Clone, Default, Deserialize)]
struct NearbyGroup {
    #[serde(default)]
    addresses: Vec<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
struct NamedEntry {
    #[serde(default)]
    name: String,
}

/// Behavior switches. Each one covers a rule that is documented for the
/// source data but not active in the reference runs, so they all default
/// to off.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ScheduleOptions {
    /// Subjects free to use any weekday (physical education by default).
    pub flexible_subjects: BTreeSet<String>,
    /// Move a third-year day wholesale to second shift when first-shift
    /// placement fails on that day.
    pub third_year_second_shift_fallback: bool,
    /// Honor the `one_day_per_week` instructor flag.
    pub enforce_one_day_per_week: bool,
    /// Let first-shift streams spill into slots 6–7.
    pub extend_first_shift_to_slot7: bool,
    /// Drop dead groups from the conflict indexes entirely.
    pub dead_groups_skip_conflicts: bool,
}

impl Default for ScheduleOptions {
    fn default() -> Self {
        ScheduleOptions {
            flexible_subjects: ["Дене шынықтыру".to_string()].into_iter().collect(),
            third_year_second_shift_fallback: false,
            enforce_one_day_per_week: false,
            extend_first_shift_to_slot7: false,
            dead_groups_skip_conflicts: false,
        }
    }
}

/// All reference inputs of a scheduling run.
#[derive(Debug, Clone, Default)]
pub struct SchedulerConfig {
    pub rooms: Vec<Room>,
    pub dead_groups: BTreeSet<String>,
    pub second_shift_groups: BTreeSet<String>,
    pub instructor_availability: Vec<AvailabilityRecord>,
    pub instructor_rooms: BTreeMap<String, RoomPreferences>,
    pub instructor_days: Vec<DayConstraintRecord>,
    pub subject_rooms: BTreeMap<String, RoomPreferences>,
    pub group_buildings: BTreeMap<String, SpecialtyBuildings>,
    pub nearby_buildings: Vec<BTreeSet<String>>,
    pub options: ScheduleOptions,
}

impl SchedulerConfig {
    /// Reject configurations the scheduler cannot run on: duplicate rooms
    /// and nearby groups that overlap (the relation must stay transitive
    /// within each declared group).
    pub fn validate(&self) -> Result<(), ConfigError> {
        let mut seen_rooms = HashSet::new();
        for room in &self.rooms {
            if !seen_rooms.insert((room.name.as_str(), room.address.as_str())) {
                return Err(ConfigError::DuplicateRoom {
                    name: room.name.clone(),
                    address: room.address.clone(),
                });
            }
        }

        let mut seen_addresses = HashSet::new();
        for group in &self.nearby_buildings {
            for address in group {
                if !seen_addresses.insert(address.as_str()) {
                    return Err(ConfigError::OverlappingNearbyGroups(address.clone()));
                }
            }
        }
        Ok(())
    }

    /// Load the reference directory layout. Every file is optional.
    pub fn load_dir<P: AsRef<Path>>(dir: P) -> Result<Self, ConfigError> {
        let dir = dir.as_ref();
        let mut config = SchedulerConfig::default();

        if let Some(text) = read_optional(dir.join("rooms.json"))? {
            config.rooms = serde_json::from_str(&text)?;
        }
        if let Some(text) = read_optional(dir.join("dead-groups.json"))? {
            config.dead_groups = parse_name_set(&text)?;
        }
        if let Some(text) = read_optional(dir.join("groups-second-shift.json"))? {
            config.second_shift_groups = parse_name_set(&text)?;
        }
        if let Some(text) = read_optional(dir.join("instructor-availability.json"))? {
            config.instructor_availability = serde_json::from_str(&text)?;
        }
        if let Some(text) = read_optional(dir.join("instructor-rooms.json"))? {
            config.instructor_rooms = serde_json::from_str(&text)?;
        }
        if let Some(text) = read_optional(dir.join("instructor-days.json"))? {
            config.instructor_days = serde_json::from_str(&text)?;
        }
        if let Some(text) = read_optional(dir.join("subject-rooms.json"))? {
            config.subject_rooms = serde_json::from_str(&text)?;
        }
        if let Some(text) = read_optional(dir.join("group-buildings.json"))? {
            config.group_buildings = serde_json::from_str(&text)?;
        }
        if let Some(text) = read_optional(dir.join("nearby-buildings.json"))? {
            config.nearby_buildings = Self::nearby_from_json(&text)?;
        }
        if let Some(text) = read_optional(dir.join("options.json"))? {
            config.options = serde_json::from_str(&text)?;
        }

        config.validate()?;
        Ok(config)
    }

    /// Parse the nearby-buildings file shape (`{"groups": [{"addresses":
    /// [...]}]}`) into address sets.
    pub fn nearby_from_json(text: &str) -> Result<Vec<BTreeSet<String>>, ConfigError> {
        let file: NearbyBuildingsFile = serde_json::from_str(text)?;
        Ok(file
            .groups
            .into_iter()
            .map(|g| g.addresses.into_iter().collect::<BTreeSet<String>>())
            .filter(|set| !set.is_empty())
            .collect())
    }
}

fn read_optional(path: std::path::PathBuf) -> Result<Option<String>, ConfigError> {
    if path.exists() {
        Ok(Some(fs::read_to_string(path)?))
    } else {
        Ok(None)
    }
}

/// Accept either a plain list of names or a list of `{"name": ...}` records.
fn parse_name_set(text: &str) -> Result<BTreeSet<String>, ConfigError> {
    if let Ok(names) = serde_json::from_str::<Vec<String>>(text) {
        return Ok(names.into_iter().filter(|n| !n.is_empty()).collect());
    }
    let entries: Vec<NamedEntry> = serde_json::from_str(text)?;
    Ok(entries
        .into_iter()
        .map(|e| e.name)
        .filter(|n| !n.is_empty())
        .collect())
}
