//! The weekly time grid: 13 slots per day, two shifts.

use super::models::Shift;

/// Slots per weekday. Slot k runs (8+k):00 – (8+k):50.
pub const SLOTS_PER_DAY: u8 = 13;

/// Weekly slot capacity of one room (13 slots × 5 days).
pub const SLOTS_PER_WEEK: u32 = SLOTS_PER_DAY as u32 * 5;

/// Minutes of teaching per slot.
pub const SLOT_MINUTES: u32 = 50;

pub const FIRST_SHIFT_LAST_SLOT: u8 = 5;
/// First shift may spill into slots 6–7 when the boundary extension
/// option is enabled.
pub const FIRST_SHIFT_EXTENDED_LAST_SLOT: u8 = 7;

/// Slot start time, e.g. slot 1 → "09:00".
pub fn slot_start_time(slot: u8) -> Option<String> {
    if (1..=SLOTS_PER_DAY).contains(&slot) {
        Some(format!("{:02}:00", 8 + slot))
    } else {
        None
    }
}

/// Slot time range, e.g. slot 1 → "09:00-09:50".
pub fn slot_time_range(slot: u8) -> Option<String> {
    if (1..=SLOTS_PER_DAY).contains(&slot) {
        Some(format!("{0:02}:00-{0:02}:50", 8 + slot))
    } else {
        None
    }
}

/// Map a slot start time back to its slot number ("09:00" → 1).
pub fn time_to_slot(time: &str) -> Option<u8> {
    let (hours, _minutes) = time.trim().split_once(':')?;
    let hours: i32 = hours.parse().ok()?;
    let slot = hours - 8;
    if (1..=SLOTS_PER_DAY as i32).contains(&slot) {
        Some(slot as u8)
    } else {
        None
    }
}

/// Slot numbers of a shift, in order. `extended` widens the first shift to
/// slot 7 (boundary-extension option).
pub fn shift_slots(shift: Shift, extended: bool) -> Vec<u8> {
    match shift {
        Shift::First => {
            let last = if extended {
                FIRST_SHIFT_EXTENDED_LAST_SLOT
            } else {
                FIRST_SHIFT_LAST_SLOT
            };
            (1..=last).collect()
        }
        Shift::Second => (FIRST_SHIFT_LAST_SLOT + 1..=SLOTS_PER_DAY).collect(),
    }
}

/// Default shift by study year: year 1 first shift, year 2 second
/// (both mandatory), year 3 first, years 4–5 second.
pub fn shift_for_year(year: u8) -> Shift {
    match year {
        1 => Shift::First,
        2 => Shift::Second,
        3 => Shift::First,
        4 | 5 => Shift::Second,
        _ => Shift::First,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slot_times() {
        assert_eq!(slot_start_time(1).as_deref(), Some("09:00"));
        assert_eq!(slot_start_time(13).as_deref(), Some("21:00"));
        assert_eq!(slot_start_time(14), None);
        assert_eq!(slot_time_range(6).as_deref(), Some("14:00-14:50"));
        assert_eq!(time_to_slot("09:00"), Some(1));
        assert_eq!(time_to_slot("21:00"), Some(13));
        assert_eq!(time_to_slot("08:00"), None);
    }

    #[test]
    fn shift_slot_ranges() {
        assert_eq!(shift_slots(Shift::First, false), vec![1, 2, 3, 4, 5]);
        assert_eq!(shift_slots(Shift::First, true), vec![1, 2, 3, 4, 5, 6, 7]);
        assert_eq!(
            shift_slots(Shift::Second, false),
            vec![6, 7, 8, 9, 10, 11, 12, 13]
        );
    }
}
