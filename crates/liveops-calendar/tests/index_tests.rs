//! Tests for per-rule date lookup and day-cell fill spans.

use chrono::{NaiveDate, NaiveTime};
use liveops_calendar::{
    build_occurrence_index, compute_day_fill_span, expand, most_recent_occurrence, DateWindow,
    DayFillSpan, EventRule,
};

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn time(h: u32, m: u32) -> NaiveTime {
    NaiveTime::from_hms_opt(h, m, 0).unwrap()
}

fn assert_span(span: DayFillSpan, start: f64, end: f64) {
    assert!(
        (span.start_percent - start).abs() < 1e-9 && (span.end_percent - end).abs() < 1e-9,
        "expected {start}..{end}, got {span:?}"
    );
}

// ---------------------------------------------------------------------------
// Occurrence index
// ---------------------------------------------------------------------------

#[test]
fn index_answers_fires_on_per_rule() {
    let window = DateWindow::new(date(2024, 1, 1), date(2024, 1, 31));
    let weekly = EventRule::new("weekly", date(2024, 1, 1), "0900", 60).every_weeks(1, &["Fri"]);
    let once = EventRule::new("once", date(2024, 1, 10), "1200", 30);
    let weekly_dates = expand(&weekly, &window).unwrap();
    let once_dates = expand(&once, &window).unwrap();

    let index = build_occurrence_index([
        ("weekly", weekly_dates.as_slice()),
        ("once", once_dates.as_slice()),
    ]);

    assert_eq!(index.len(), 2);
    assert!(index.fires_on("weekly", date(2024, 1, 5)));
    assert!(index.fires_on("weekly", date(2024, 1, 26)));
    assert!(!index.fires_on("weekly", date(2024, 1, 10)));
    assert!(index.fires_on("once", date(2024, 1, 10)));
    assert!(!index.fires_on("missing", date(2024, 1, 10)));
    assert!(index.dates("weekly").unwrap().contains("2024-01-19"));
}

// ---------------------------------------------------------------------------
// Most recent occurrence
// ---------------------------------------------------------------------------

#[test]
fn most_recent_prefers_same_day() {
    let dates = [date(2024, 1, 1), date(2024, 1, 3), date(2024, 1, 5)];
    assert_eq!(most_recent_occurrence(&dates, date(2024, 1, 3)), Some(date(2024, 1, 3)));
    assert_eq!(most_recent_occurrence(&dates, date(2024, 1, 4)), Some(date(2024, 1, 3)));
    assert_eq!(most_recent_occurrence(&dates, date(2023, 12, 31)), None);
}

// ---------------------------------------------------------------------------
// Day fill spans
// ---------------------------------------------------------------------------

#[test]
fn same_day_event_fills_its_fraction() {
    let span = compute_day_fill_span(Some(date(2024, 1, 1)), date(2024, 1, 1), time(6, 0), 360);
    assert_span(span, 25.0, 50.0);
}

#[test]
fn event_crossing_midnight_is_clamped_on_both_days() {
    let occurrence = Some(date(2024, 1, 1));
    let first = compute_day_fill_span(occurrence, date(2024, 1, 1), time(22, 0), 240);
    assert_span(first, 22.0 / 24.0 * 100.0, 100.0);

    let second = compute_day_fill_span(occurrence, date(2024, 1, 2), time(22, 0), 240);
    assert_span(second, 0.0, 2.0 / 24.0 * 100.0);
}

#[test]
fn multi_day_event_fills_whole_middle_day() {
    let span = compute_day_fill_span(Some(date(2024, 1, 1)), date(2024, 1, 2), time(12, 0), 48 * 60);
    assert_span(span, 0.0, 100.0);
}

#[test]
fn no_intersection_yields_empty_span() {
    let ended = compute_day_fill_span(Some(date(2024, 1, 1)), date(2024, 1, 5), time(9, 0), 60);
    assert_eq!(ended, DayFillSpan::EMPTY);
    assert!(ended.is_empty());

    let none = compute_day_fill_span(None, date(2024, 1, 5), time(9, 0), 60);
    assert_eq!(none, DayFillSpan::EMPTY);
}

#[test]
fn event_ending_exactly_at_midnight_does_not_touch_next_day() {
    let span = compute_day_fill_span(Some(date(2024, 1, 1)), date(2024, 1, 2), time(23, 0), 60);
    assert_eq!(span, DayFillSpan::EMPTY);
}

#[test]
fn fill_span_on_last_representable_day() {
    let span = compute_day_fill_span(Some(NaiveDate::MAX), NaiveDate::MAX, time(1, 0), 60);
    assert_span(span, 100.0 / 24.0, 200.0 / 24.0);

    let overflowing = compute_day_fill_span(Some(NaiveDate::MAX), NaiveDate::MAX, time(23, 0), 120);
    // The end saturates at the last representable instant, 23:59.
    assert_span(overflowing, 2300.0 / 24.0, 1439.0 / 1440.0 * 100.0);
}
