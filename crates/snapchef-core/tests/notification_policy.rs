//! Integration tests for monthly engagement scheduling and the audit.

use chrono::{DateTime, Datelike, FixedOffset, TimeZone, Timelike, Utc};
use proptest::prelude::*;
use snapchef_core::notifications::{
    audit_pending, is_within_window, next_monthly_slot, InMemoryNotificationCenter, MonthKey,
    NotificationCategory, NotificationCenter, NotificationManager, NotificationPreferences,
    PendingNotification, SendTime,
};
use snapchef_core::Database;

fn tokyo(y: i32, m: u32, d: u32, h: u32, min: u32) -> DateTime<FixedOffset> {
    FixedOffset::east_opt(9 * 3600)
        .unwrap()
        .with_ymd_and_hms(y, m, d, h, min, 0)
        .unwrap()
}

#[test]
fn test_month_of_schedule_audit_rebuild_workflow() {
    let mut manager = NotificationManager::new(
        InMemoryNotificationCenter::new(),
        NotificationPreferences::default(),
    );
    let now = tokyo(2026, 3, 15, 10, 30);

    let slot = manager.schedule_monthly(&now).unwrap().unwrap();
    assert_eq!(slot.month, MonthKey::new(2026, 4).unwrap());
    assert_eq!(slot.fires_at, Utc.with_ymd_and_hms(2026, 4, 1, 1, 0, 0).unwrap());
    assert!(slot.newly_scheduled);

    manager
        .schedule_transactional(
            NotificationCategory::ChallengeReminder,
            "Daily challenge",
            "Leftover Transformation is live",
            Utc.with_ymd_and_hms(2026, 3, 16, 0, 0, 0).unwrap(),
        )
        .unwrap();

    let report = manager.refresh_audit(&now).clone();
    assert!(report.is_healthy);
    assert_eq!(report.pending_count, 2);
    assert_eq!(report.monthly_count, 1);
    assert_eq!(report.transactional_count, 1);
    assert_eq!(report.compliant_count(), 2);

    // A stray second monthly request breaks the cap; rebuild restores it.
    let mut center = manager.into_center();
    center
        .add(PendingNotification::monthly(
            MonthKey::new(2026, 5).unwrap(),
            "Extra",
            "",
            Utc.with_ymd_and_hms(2026, 5, 1, 13, 0, 0).unwrap(),
        ))
        .unwrap();
    let mut manager = NotificationManager::new(center, NotificationPreferences::default());
    assert!(!manager.refresh_audit(&now).is_healthy);

    let rebuilt = manager.rebuild(&now).unwrap();
    assert!(rebuilt.is_healthy, "{:?}", rebuilt.violations);
    assert_eq!(rebuilt.monthly_count, 1);
    assert_eq!(rebuilt.transactional_count, 1);
    assert_eq!(rebuilt.reserved_month, MonthKey::new(2026, 4));
}

#[test]
fn test_database_backed_schedule_survives_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("snapchef.db");
    let now = tokyo(2026, 12, 20, 9, 0);

    {
        let mut manager =
            NotificationManager::new(Database::open_at(&path).unwrap(), NotificationPreferences::default());
        let slot = manager.schedule_monthly(&now).unwrap().unwrap();
        assert_eq!(slot.identifier, "monthly-engagement-2027-01");
    }

    let mut manager =
        NotificationManager::new(Database::open_at(&path).unwrap(), NotificationPreferences::default());
    let again = manager.schedule_monthly(&now).unwrap().unwrap();
    assert!(!again.newly_scheduled);
    let report = manager.refresh_audit(&now);
    assert_eq!(report.monthly_count, 1);
    assert!(report.is_healthy);
}

#[test]
fn test_disabling_engagement_flags_leftover_request() {
    let mut manager = NotificationManager::new(
        InMemoryNotificationCenter::new(),
        NotificationPreferences::default(),
    );
    let now = tokyo(2026, 6, 2, 12, 0);
    manager.schedule_monthly(&now).unwrap();

    let prefs = NotificationPreferences {
        monthly_engagement: false,
        ..NotificationPreferences::default()
    };
    manager.set_preferences(prefs);
    let report = manager.refresh_audit(&now);
    assert!(!report.is_healthy);
    assert!(report.next_monthly_slot.is_none());

    let rebuilt = manager.rebuild(&now).unwrap();
    assert_eq!(rebuilt.monthly_count, 0);
    assert!(rebuilt.is_healthy);
}

#[test]
fn test_audit_of_nothing_is_healthy() {
    let now = tokyo(2026, 1, 1, 0, 0);
    let report = audit_pending(&[], &NotificationPreferences::default(), &now);
    assert!(report.is_healthy);
    assert_eq!(report.pending_count, 0);
    assert!(report.reserved_month.is_none());
}

proptest! {
    #[test]
    fn normalized_send_time_is_always_in_window(hour in -100i32..100, minute in -1000i32..1000) {
        let time = SendTime::normalized(hour, minute);
        prop_assert!(is_within_window(&time.as_naive_time()));
    }

    #[test]
    fn next_slot_is_first_of_month_and_strictly_future(
        secs in 946_684_800i64..4_102_444_800,
        offset_quarters in -48i32..=56,
        hour in 0i32..24,
        minute in 0i32..60,
    ) {
        let tz = FixedOffset::east_opt(offset_quarters * 900).unwrap();
        let now = tz.timestamp_opt(secs, 0).unwrap();
        let time = SendTime::normalized(hour, minute);
        let slot = next_monthly_slot(&now, time);

        prop_assert!(slot > now);
        prop_assert_eq!(slot.day(), 1);
        prop_assert_eq!(slot.hour(), time.hour());
        prop_assert_eq!(slot.minute(), time.minute());
        prop_assert!(slot - now <= chrono::Duration::days(32));
    }

    #[test]
    fn scheduling_month_after_month_keeps_one_monthly_request(
        start in 946_684_800i64..4_000_000_000,
        gaps_hours in proptest::collection::vec(1i64..24 * 45, 1..12),
    ) {
        let mut now = Utc.timestamp_opt(start, 0).unwrap();
        let mut manager = NotificationManager::new(
            InMemoryNotificationCenter::new(),
            NotificationPreferences::default(),
        );
        for gap in gaps_hours {
            let slot = manager.schedule_monthly(&now).unwrap().unwrap();
            prop_assert!(slot.fires_at > now);

            let report = manager.refresh_audit(&now);
            prop_assert_eq!(report.monthly_count, 1);
            prop_assert_eq!(report.reserved_month, Some(slot.month));
            prop_assert!(report.is_healthy, "{:?}", report.violations);

            now += chrono::Duration::hours(gap);
        }
    }
}
