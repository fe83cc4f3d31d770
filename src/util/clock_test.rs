use super::*;

use chrono::TimeZone;

#[test]
fn fixed_clock_reports_pinned_values() {
    let now = Utc.with_ymd_and_hms(2025, 3, 9, 6, 59, 0).unwrap();
    let clock = FixedClock::new(now, Some("America/New_York"));
    assert_eq!(clock.now(), now);
    assert_eq!(clock.detected_timezone().as_deref(), Some("America/New_York"));
}

#[test]
fn fixed_clock_can_report_no_zone() {
    let clock = FixedClock::new(Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap(), None);
    assert!(clock.detected_timezone().is_none());
}

#[test]
fn system_clock_detection_is_never_blank() {
    if let Some(tz) = SystemClock.detected_timezone() {
        assert!(!tz.is_empty());
    }
}
