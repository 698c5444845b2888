//! Date filter tests
//!
//! Filter dates are whole days in the operational timezone, so a window from
//! `d1` to `d2` covers local midnight of `d1` through the last microsecond of
//! `d2`, whatever timezone the server runs in.

use chrono::{DateTime, Duration, NaiveDate, TimeZone, Utc};
use chrono_tz::Tz;
use proptest::prelude::*;
use shared::{end_of_day, start_of_day, DateError, DateWindow, DEFAULT_TIMEZONE};

fn within(window: &DateWindow, instant: DateTime<Utc>) -> bool {
    window.start.map_or(true, |s| instant >= s) && window.end.map_or(true, |e| instant <= e)
}

#[test]
fn test_window_over_one_bogota_day() {
    let window = DateWindow::from_dates(Some("2024-12-23"), Some("2024-12-23"), DEFAULT_TIMEZONE).unwrap();

    let start = window.start.unwrap();
    let end = window.end.unwrap();
    assert_eq!(start.to_rfc3339(), "2024-12-23T05:00:00+00:00");
    assert!(within(&window, start));
    assert!(within(&window, end));
    assert!(!within(&window, end + Duration::microseconds(1)));
    assert!(!within(&window, start - Duration::microseconds(1)));
}

#[test]
fn test_sale_late_in_local_evening_belongs_to_that_day() {
    // 23:30 in Bogota on the 23rd is already the 24th in UTC
    let sale = DEFAULT_TIMEZONE
        .with_ymd_and_hms(2024, 12, 23, 23, 30, 0)
        .unwrap()
        .with_timezone(&Utc);

    let same_day = DateWindow::from_dates(Some("2024-12-23"), Some("2024-12-23"), DEFAULT_TIMEZONE).unwrap();
    let next_day = DateWindow::from_dates(Some("2024-12-24"), Some("2024-12-24"), DEFAULT_TIMEZONE).unwrap();

    assert!(within(&same_day, sale));
    assert!(!within(&next_day, sale));
}

#[test]
fn test_open_ended_windows() {
    let window = DateWindow::from_dates(None, Some(""), DEFAULT_TIMEZONE).unwrap();
    assert!(window.start.is_none() && window.end.is_none());

    let from_only = DateWindow::from_dates(Some("2024-01-01"), None, DEFAULT_TIMEZONE).unwrap();
    assert!(from_only.start.is_some());
    assert!(from_only.end.is_none());
}

#[test]
fn test_inverted_window_rejected() {
    assert_eq!(
        DateWindow::from_dates(Some("2024-02-10"), Some("2024-02-01"), DEFAULT_TIMEZONE),
        Err(DateError::EndBeforeStart)
    );
    assert!(matches!(
        DateWindow::from_dates(Some("yesterday"), None, DEFAULT_TIMEZONE),
        Err(DateError::InvalidFormat(_))
    ));
}

fn date_strategy() -> impl Strategy<Value = NaiveDate> {
    (0i64..3_650).prop_map(|days| NaiveDate::from_ymd_opt(2020, 1, 1).unwrap() + Duration::days(days))
}

fn timezone_strategy() -> impl Strategy<Value = Tz> {
    prop::sample::select(vec![
        chrono_tz::America::Bogota,
        chrono_tz::America::New_York,
        chrono_tz::Europe::Madrid,
        chrono_tz::Asia::Bangkok,
        chrono_tz::UTC,
    ])
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    /// Consecutive days tile the timeline without gaps or overlaps
    #[test]
    fn prop_days_are_contiguous(date in date_strategy(), tz in timezone_strategy()) {
        let end = end_of_day(date, tz);
        let next_start = start_of_day(date + Duration::days(1), tz);

        prop_assert!(start_of_day(date, tz) < end);
        prop_assert_eq!(end + Duration::microseconds(1), next_start);
    }

    /// A one-day window is never shorter than 22 hours or longer than 26
    #[test]
    fn prop_day_length_bounded(date in date_strategy(), tz in timezone_strategy()) {
        let length = end_of_day(date, tz) - start_of_day(date, tz);
        prop_assert!(length >= Duration::hours(22));
        prop_assert!(length <= Duration::hours(26));
    }
}
