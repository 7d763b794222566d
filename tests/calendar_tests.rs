use chrono::{Datelike, Duration, NaiveDate, Weekday};
use roster_tool::{
    CalendarError, SchoolDay, effective_session_date, parse_civil_date, resolve_school_day,
};

fn d(y: i32, m: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, day).unwrap()
}

#[test]
fn sunday_resolves_to_following_monday() {
    // 2024-03-03 is a Sunday, 2024-03-04 the Monday after it
    let sunday = d(2024, 3, 3);
    let monday = d(2024, 3, 4);
    assert_eq!(resolve_school_day(sunday), SchoolDay::Monday);
    assert_eq!(resolve_school_day(sunday), resolve_school_day(monday));
    assert_eq!(effective_session_date(sunday), monday);
}

#[test]
fn non_sunday_dates_resolve_to_their_own_weekday() {
    assert_eq!(resolve_school_day(d(2024, 3, 4)), SchoolDay::Monday);
    assert_eq!(resolve_school_day(d(2024, 3, 5)), SchoolDay::Tuesday);
    assert_eq!(resolve_school_day(d(2024, 3, 6)), SchoolDay::Wednesday);
    assert_eq!(resolve_school_day(d(2024, 3, 7)), SchoolDay::Thursday);
    assert_eq!(resolve_school_day(d(2024, 3, 8)), SchoolDay::Friday);
    assert_eq!(resolve_school_day(d(2024, 3, 9)), SchoolDay::Saturday);
}

#[test]
fn sunday_rollover_holds_across_consecutive_weeks() {
    // Sweep ten weeks; every Sunday must agree with the following day
    // and every other date must keep its own weekday.
    let mut date = d(2025, 1, 1);
    for _ in 0..70 {
        let next = date + Duration::days(1);
        if date.weekday() == Weekday::Sun {
            assert_eq!(resolve_school_day(date), resolve_school_day(next));
            assert_eq!(effective_session_date(date), next);
        } else {
            assert_eq!(effective_session_date(date), date);
        }
        date = next;
    }
}

#[test]
fn parse_civil_date_accepts_iso_and_trims() {
    assert_eq!(parse_civil_date("2024-03-05").unwrap(), d(2024, 3, 5));
    assert_eq!(parse_civil_date(" 2024-03-05 ").unwrap(), d(2024, 3, 5));
}

#[test]
fn parse_civil_date_rejects_malformed_input() {
    for input in ["2024-13-40", "05/03/2024", "yesterday", ""] {
        let err = parse_civil_date(input).unwrap_err();
        assert!(matches!(err, CalendarError::InvalidDate(_)), "{input}");
    }
}

#[test]
fn school_day_parses_short_and_full_names() {
    assert_eq!(SchoolDay::from_str("Mon"), Some(SchoolDay::Monday));
    assert_eq!(SchoolDay::from_str("wednesday"), Some(SchoolDay::Wednesday));
    assert_eq!(SchoolDay::from_str(" SAT "), Some(SchoolDay::Saturday));
    assert_eq!(SchoolDay::from_str("sunday"), None);
    assert_eq!(SchoolDay::from_str("someday"), None);
}

#[test]
fn school_days_order_monday_first() {
    for (idx, day) in SchoolDay::ALL.iter().enumerate() {
        assert_eq!(day.num_from_monday() as usize, idx);
    }
}
