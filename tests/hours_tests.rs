use form1_timetable::WeeklyHours;

#[test]
fn test_exact_multiples_split_evenly() {
    // 30 = 8×2 + 7×2
    let h = WeeklyHours::from_total(30).unwrap();
    assert_eq!((h.odd_week, h.even_week), (2, 2));

    // 15 = 8×1 + 7×1
    let h = WeeklyHours::from_total(15).unwrap();
    assert_eq!((h.odd_week, h.even_week), (1, 1));

    // 45 = 8×3 + 7×3
    let h = WeeklyHours::from_total(45).unwrap();
    assert_eq!((h.odd_week, h.even_week), (3, 3));
}

#[test]
fn test_remainder_eight_adds_an_odd_week_hour() {
    // 8 = 8×1 + 7×0
    let h = WeeklyHours::from_total(8).unwrap();
    assert_eq!((h.odd_week, h.even_week), (1, 0));

    // 38 = 8×3 + 7×2
    let h = WeeklyHours::from_total(38).unwrap();
    assert_eq!((h.odd_week, h.even_week), (3, 2));
}

#[test]
fn test_remainder_seven_adds_an_even_week_hour() {
    // 7 = 8×0 + 7×1
    let h = WeeklyHours::from_total(7).unwrap();
    assert_eq!((h.odd_week, h.even_week), (0, 1));

    // 37 = 8×2 + 7×3
    let h = WeeklyHours::from_total(37).unwrap();
    assert_eq!((h.odd_week, h.even_week), (2, 3));
}

#[test]
fn test_zero_hours_is_legal() {
    let h = WeeklyHours::from_total(0).unwrap();
    assert_eq!((h.total, h.odd_week, h.even_week), (0, 0, 0));
}

#[test]
fn test_unrepresentable_totals_are_rejected() {
    for total in [1, 5, 10, 16, 29, 100] {
        assert!(WeeklyHours::from_total(total).is_err(), "total={total}");
    }
}

#[test]
fn test_hours_law_holds_for_every_valid_total() {
    // every total that decomposes must satisfy 8×odd + 7×even = total
    for total in 0..=600 {
        if let Ok(h) = WeeklyHours::from_total(total) {
            assert_eq!(8 * h.odd_week + 7 * h.even_week, total, "total={total}");
        }
    }
}

#[test]
fn test_decomposition_is_idempotent() {
    let first = WeeklyHours::from_total(38).unwrap();
    let second = WeeklyHours::from_total(38).unwrap();
    assert_eq!(first, second);
}

#[test]
fn test_max_weekly() {
    let h = WeeklyHours::from_total(38).unwrap(); // odd 3, even 2
    assert_eq!(h.max_weekly(), 3);
}
