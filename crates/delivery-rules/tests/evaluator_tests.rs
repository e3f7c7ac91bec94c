//! Tests for single-date availability evaluation.

use chrono::NaiveDate;
use delivery_rules::evaluator::{blocked_dates_between, evaluate, next_available};
use delivery_rules::{BlockReason, Configuration, DateRange, Decision};

// ── Helpers ─────────────────────────────────────────────────────────────────

fn date(s: &str) -> NaiveDate {
    s.parse().unwrap()
}

fn range(start: &str, end: &str) -> DateRange {
    DateRange::new(date(start), date(end)).unwrap()
}

fn config(days: &[u8], dates: &[&str], ranges: &[(&str, &str)]) -> Configuration {
    Configuration::from_parts(
        days.iter().copied(),
        dates.iter().map(|d| date(d)),
        ranges.iter().map(|(s, e)| range(s, e)),
    )
    .unwrap()
}

const MONDAY: &str = "2024-06-03";

// ── Past-date cutoff ────────────────────────────────────────────────────────

#[test]
fn empty_config_allows_today() {
    let cfg = Configuration::new();
    assert_eq!(evaluate(&cfg, date(MONDAY), date(MONDAY)), Decision::Available);
}

#[test]
fn yesterday_is_past() {
    let cfg = Configuration::new();
    assert_eq!(
        evaluate(&cfg, date("2024-06-02"), date(MONDAY)),
        Decision::Blocked(BlockReason::PastDate)
    );
}

#[test]
fn past_date_wins_over_every_other_rule() {
    // 2024-06-01 is a Saturday, explicitly blocked and inside a range.
    let cfg = config(&[6], &["2024-06-01"], &[("2024-05-30", "2024-06-02")]);
    assert_eq!(
        evaluate(&cfg, date("2024-06-01"), date(MONDAY)),
        Decision::Blocked(BlockReason::PastDate)
    );
}

// ── Weekday rules ───────────────────────────────────────────────────────────

#[test]
fn weekend_block_rejects_saturday() {
    // Scenario A: Sat/Sun blocked, Saturday after a Monday "today".
    let cfg = config(&[0, 6], &[], &[]);
    assert_eq!(
        evaluate(&cfg, date("2024-06-08"), date(MONDAY)),
        Decision::Blocked(BlockReason::BlockedWeekday)
    );
}

#[test]
fn weekend_block_allows_weekdays() {
    let cfg = config(&[0, 6], &[], &[]);
    for day in ["2024-06-03", "2024-06-04", "2024-06-05", "2024-06-06", "2024-06-07"] {
        assert_eq!(evaluate(&cfg, date(day), date(MONDAY)), Decision::Available, "{day}");
    }
}

#[test]
fn sunday_is_weekday_zero() {
    let cfg = config(&[0], &[], &[]);
    assert_eq!(
        evaluate(&cfg, date("2024-06-09"), date(MONDAY)),
        Decision::Blocked(BlockReason::BlockedWeekday)
    );
    assert_eq!(evaluate(&cfg, date("2024-06-10"), date(MONDAY)), Decision::Available);
}

#[test]
fn weekday_reported_before_specific_date() {
    let cfg = config(&[6], &["2024-06-08"], &[]);
    assert_eq!(
        evaluate(&cfg, date("2024-06-08"), date(MONDAY)),
        Decision::Blocked(BlockReason::BlockedWeekday)
    );
}

// ── Specific dates ──────────────────────────────────────────────────────────

#[test]
fn specific_date_blocks_only_that_day() {
    let cfg = config(&[], &["2024-12-25"], &[]);
    assert_eq!(
        evaluate(&cfg, date("2024-12-25"), date(MONDAY)),
        Decision::Blocked(BlockReason::BlockedDate)
    );
    assert_eq!(evaluate(&cfg, date("2024-12-24"), date(MONDAY)), Decision::Available);
    assert_eq!(evaluate(&cfg, date("2024-12-26"), date(MONDAY)), Decision::Available);
}

#[test]
fn specific_date_reported_before_range() {
    let cfg = config(&[], &["2024-07-04"], &[("2024-07-01", "2024-07-14")]);
    assert_eq!(
        evaluate(&cfg, date("2024-07-04"), date(MONDAY)),
        Decision::Blocked(BlockReason::BlockedDate)
    );
}

// ── Ranges ──────────────────────────────────────────────────────────────────

#[test]
fn range_bounds_are_inclusive() {
    // Scenario B.
    let cfg = config(&[], &[], &[("2024-07-01", "2024-07-14")]);
    assert_eq!(
        evaluate(&cfg, date("2024-07-01"), date(MONDAY)),
        Decision::Blocked(BlockReason::BlockedRange)
    );
    assert_eq!(
        evaluate(&cfg, date("2024-07-14"), date(MONDAY)),
        Decision::Blocked(BlockReason::BlockedRange)
    );
    assert_eq!(evaluate(&cfg, date("2024-06-30"), date(MONDAY)), Decision::Available);
    assert_eq!(evaluate(&cfg, date("2024-07-15"), date(MONDAY)), Decision::Available);
}

#[test]
fn single_day_range_blocks_its_day() {
    let cfg = config(&[], &[], &[("2024-08-15", "2024-08-15")]);
    assert_eq!(
        evaluate(&cfg, date("2024-08-15"), date(MONDAY)),
        Decision::Blocked(BlockReason::BlockedRange)
    );
}

#[test]
fn overlapping_ranges_are_harmless() {
    let cfg = config(
        &[],
        &[],
        &[("2024-07-01", "2024-07-10"), ("2024-07-05", "2024-07-20"), ("2024-07-05", "2024-07-20")],
    );
    assert_eq!(cfg.blocked_ranges().len(), 3);
    assert_eq!(
        evaluate(&cfg, date("2024-07-07"), date(MONDAY)),
        Decision::Blocked(BlockReason::BlockedRange)
    );
    assert_eq!(evaluate(&cfg, date("2024-07-21"), date(MONDAY)), Decision::Available);
}

#[test]
fn range_spanning_year_end() {
    let cfg = config(&[], &[], &[("2024-12-24", "2025-01-02")]);
    assert_eq!(
        evaluate(&cfg, date("2025-01-01"), date(MONDAY)),
        Decision::Blocked(BlockReason::BlockedRange)
    );
}

// ── Purity ──────────────────────────────────────────────────────────────────

#[test]
fn evaluation_is_repeatable() {
    let cfg = config(&[0, 6], &["2024-12-25"], &[("2024-07-01", "2024-07-14")]);
    let first = evaluate(&cfg, date("2024-07-03"), date(MONDAY));
    let second = evaluate(&cfg, date("2024-07-03"), date(MONDAY));
    assert_eq!(first, second);
}

#[test]
fn decision_accessors() {
    assert!(Decision::Available.is_available());
    assert_eq!(Decision::Available.reason(), None);
    let blocked = Decision::Blocked(BlockReason::BlockedRange);
    assert!(blocked.is_blocked());
    assert_eq!(blocked.reason(), Some(BlockReason::BlockedRange));
}

#[test]
fn decision_serializes_with_status_tag() {
    assert_eq!(
        serde_json::to_string(&Decision::Available).unwrap(),
        r#"{"status":"available"}"#
    );
    assert_eq!(
        serde_json::to_string(&Decision::Blocked(BlockReason::BlockedWeekday)).unwrap(),
        r#"{"status":"blocked","reason":"blocked_weekday"}"#
    );
}

// ── next_available ──────────────────────────────────────────────────────────

#[test]
fn next_available_skips_weekend() {
    let cfg = config(&[0, 6], &[], &[]);
    assert_eq!(
        next_available(&cfg, date("2024-06-08"), date(MONDAY), 30),
        Some(date("2024-06-10"))
    );
}

#[test]
fn next_available_never_returns_past_dates() {
    let cfg = Configuration::new();
    assert_eq!(
        next_available(&cfg, date("2024-01-01"), date(MONDAY), 30),
        Some(date(MONDAY))
    );
}

#[test]
fn next_available_skips_range_then_date() {
    let cfg = config(&[], &["2024-07-15"], &[("2024-07-01", "2024-07-14")]);
    assert_eq!(
        next_available(&cfg, date("2024-07-01"), date(MONDAY), 60),
        Some(date("2024-07-16"))
    );
}

#[test]
fn next_available_gives_up_when_everything_is_blocked() {
    let cfg = config(&[0, 1, 2, 3, 4, 5, 6], &[], &[]);
    assert_eq!(next_available(&cfg, date(MONDAY), date(MONDAY), 365), None);
}

#[test]
fn next_available_zero_horizon() {
    let cfg = Configuration::new();
    assert_eq!(next_available(&cfg, date(MONDAY), date(MONDAY), 0), None);
}

// ── blocked_dates_between ───────────────────────────────────────────────────

#[test]
fn blocked_dates_between_lists_reasons() {
    let cfg = config(&[0], &["2024-06-05"], &[("2024-06-07", "2024-06-08")]);
    let blocked = blocked_dates_between(&cfg, date("2024-06-01"), date("2024-06-09"), date(MONDAY));
    assert_eq!(
        blocked,
        vec![
            (date("2024-06-01"), BlockReason::PastDate),
            (date("2024-06-02"), BlockReason::PastDate),
            (date("2024-06-05"), BlockReason::BlockedDate),
            (date("2024-06-07"), BlockReason::BlockedRange),
            (date("2024-06-08"), BlockReason::BlockedRange),
            (date("2024-06-09"), BlockReason::BlockedWeekday),
        ]
    );
}

#[test]
fn blocked_dates_between_inverted_window_is_empty() {
    let cfg = config(&[0, 6], &[], &[]);
    assert!(blocked_dates_between(&cfg, date("2024-06-30"), date("2024-06-01"), date(MONDAY)).is_empty());
}
