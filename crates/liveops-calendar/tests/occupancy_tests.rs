//! Tests for 30-minute occupancy slots built from occurrence dates.

use chrono::{NaiveDate, NaiveTime, TimeZone, Utc};
use liveops_calendar::{
    build_occupancy, occupancy_for_rule, ActiveRange, CalendarError, DateWindow, EventRule,
};

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn time(h: u32, m: u32) -> NaiveTime {
    NaiveTime::from_hms_opt(h, m, 0).unwrap()
}

#[test]
fn one_hour_event_marks_both_ends_inclusive() {
    let occupancy = build_occupancy(&[date(2024, 1, 1)], time(9, 0), 60);
    assert_eq!(
        occupancy.keys(),
        vec![
            "2024-01-01T09:00:00Z",
            "2024-01-01T09:30:00Z",
            "2024-01-01T10:00:00Z"
        ]
    );
}

#[test]
fn off_boundary_start_is_floored_to_slot() {
    let occupancy = build_occupancy(&[date(2024, 1, 1)], time(9, 15), 30);
    assert_eq!(
        occupancy.keys(),
        vec!["2024-01-01T09:00:00Z", "2024-01-01T09:30:00Z"]
    );
    assert!(occupancy.contains(Utc.with_ymd_and_hms(2024, 1, 1, 9, 40, 0).unwrap()));
    assert!(!occupancy.contains(Utc.with_ymd_and_hms(2024, 1, 1, 10, 0, 0).unwrap()));
}

#[test]
fn zero_duration_occupies_a_single_slot() {
    let occupancy = build_occupancy(&[date(2024, 1, 1)], time(12, 0), 0);
    assert_eq!(occupancy.len(), 1);
}

#[test]
fn overlapping_occurrences_are_deduplicated() {
    // 25h events on consecutive days overlap for one hour (three slot instants).
    let first = build_occupancy(&[date(2024, 1, 1)], time(9, 0), 25 * 60);
    let second = build_occupancy(&[date(2024, 1, 2)], time(9, 0), 25 * 60);
    let both = build_occupancy(&[date(2024, 1, 1), date(2024, 1, 2)], time(9, 0), 25 * 60);

    assert_eq!(first.len(), 51);
    assert_eq!(second.len(), 51);
    assert_eq!(both.len(), 99);
    assert!(both.len() < first.len() + second.len());
}

#[test]
fn ranges_collapse_contiguous_slots() {
    let overlapping = build_occupancy(&[date(2024, 1, 1), date(2024, 1, 2)], time(9, 0), 25 * 60);
    assert_eq!(
        overlapping.ranges(),
        vec![ActiveRange {
            start: Utc.with_ymd_and_hms(2024, 1, 1, 9, 0, 0).unwrap(),
            end: Utc.with_ymd_and_hms(2024, 1, 3, 10, 0, 0).unwrap(),
        }]
    );

    let separate = build_occupancy(&[date(2024, 1, 1), date(2024, 1, 3)], time(9, 0), 60);
    let ranges = separate.ranges();
    assert_eq!(ranges.len(), 2);
    assert_eq!(ranges[1].start, Utc.with_ymd_and_hms(2024, 1, 3, 9, 0, 0).unwrap());
    assert_eq!(ranges[1].end, Utc.with_ymd_and_hms(2024, 1, 3, 10, 0, 0).unwrap());
}

#[test]
fn by_day_splits_across_midnight() {
    let occupancy = build_occupancy(&[date(2024, 1, 1)], time(23, 30), 60);
    let days = occupancy.by_day();

    assert_eq!(days.len(), 2);
    assert_eq!(days[&date(2024, 1, 1)], vec![time(23, 30)]);
    assert_eq!(days[&date(2024, 1, 2)], vec![time(0, 0), time(0, 30)]);
}

#[test]
fn extend_unions_rules() {
    let mut row = build_occupancy(&[date(2024, 1, 1)], time(9, 0), 60);
    let other = build_occupancy(&[date(2024, 1, 1)], time(9, 30), 60);
    row.extend(&other);
    // 09:00, 09:30, 10:00, 10:30
    assert_eq!(row.len(), 4);
}

#[test]
fn occupancy_for_biweekly_rule() {
    let rule = EventRule::new("ev-1", date(2024, 1, 1), "0900", 60).every_weeks(2, &["Mon"]);
    let window = DateWindow::new(date(2024, 1, 1), date(2024, 2, 1));
    let occupancy = occupancy_for_rule(&rule, &window).unwrap();

    assert_eq!(occupancy.len(), 9);
    assert_eq!(occupancy.ranges().len(), 3);
    assert!(occupancy.contains(Utc.with_ymd_and_hms(2024, 1, 29, 10, 0, 0).unwrap()));
}

#[test]
fn occupancy_for_rule_rejects_bad_starting_time() {
    let rule = EventRule::new("ev-1", date(2024, 1, 1), "9:00", 60);
    let window = DateWindow::new(date(2024, 1, 1), date(2024, 1, 31));
    assert_eq!(
        occupancy_for_rule(&rule, &window).unwrap_err(),
        CalendarError::InvalidStartingTime("9:00".to_string())
    );
}

#[test]
fn span_past_the_last_representable_day_stops_at_range_end() {
    let occupancy = build_occupancy(&[NaiveDate::MAX], time(23, 30), 60);
    assert_eq!(occupancy.len(), 1);
    assert!(occupancy.contains(NaiveDate::MAX.and_time(time(23, 30)).and_utc()));
}
