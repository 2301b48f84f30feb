//! Notification service: reserves the monthly slot, audits, rebuilds.

use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::error::Result;

use super::audit::{audit_pending, NotificationAuditReport};
use super::center::NotificationCenter;
use super::policy::{next_monthly_slot, MonthKey};
use super::preferences::NotificationPreferences;
use super::request::{monthly_identifier, NotificationCategory, PendingNotification};

/// Rotating copy for the monthly engagement notification, indexed by month.
const ENGAGEMENT_MESSAGES: [(&str, &str); 4] = [
    (
        "What's in your fridge?",
        "Snap a photo and we'll turn it into dinner.",
    ),
    (
        "New month, new recipes",
        "Your fridge has ideas. Let SnapChef find them.",
    ),
    (
        "Leftovers looking lonely?",
        "Turn them into something new in under 30 minutes.",
    ),
    (
        "Your monthly cooking challenge is here",
        "Try a 5-ingredient meal and earn bonus points.",
    ),
];

/// Outcome of reserving the monthly slot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduledSlot {
    pub month: MonthKey,
    pub fires_at: DateTime<Utc>,
    pub identifier: String,
    /// False when the month was already reserved at this exact time and
    /// nothing changed.
    pub newly_scheduled: bool,
}

/// Owns the notification center and the user's notification preferences.
#[derive(Debug)]
pub struct NotificationManager<C: NotificationCenter> {
    center: C,
    prefs: NotificationPreferences,
    last_report: Option<NotificationAuditReport>,
}

impl<C: NotificationCenter> NotificationManager<C> {
    pub fn new(center: C, prefs: NotificationPreferences) -> Self {
        Self {
            center,
            prefs,
            last_report: None,
        }
    }

    pub fn preferences(&self) -> &NotificationPreferences {
        &self.prefs
    }

    pub fn set_preferences(&mut self, prefs: NotificationPreferences) {
        self.prefs = prefs;
    }

    pub fn center(&self) -> &C {
        &self.center
    }

    pub fn into_center(self) -> C {
        self.center
    }

    /// Most recent audit, if one has been run.
    pub fn last_report(&self) -> Option<&NotificationAuditReport> {
        self.last_report.as_ref()
    }

    /// Reserve the next monthly slot.
    ///
    /// Returns `None` when monthly engagement is switched off. Requests that
    /// already fired are dropped first. Reserving a month that already has
    /// its request pending at the same time adds nothing; a pending request
    /// at a stale time is moved to the current slot.
    pub fn schedule_monthly<Tz: TimeZone>(
        &mut self,
        now: &DateTime<Tz>,
    ) -> Result<Option<ScheduledSlot>> {
        self.prune_delivered(now.with_timezone(&Utc))?;
        if !self.prefs.allows(NotificationCategory::Engagement) {
            info!("monthly engagement disabled; nothing scheduled");
            return Ok(None);
        }

        let send_time = self.prefs.send_time();
        let slot = next_monthly_slot(now, send_time);
        let month = MonthKey::of(&slot.naive_local());
        let identifier = monthly_identifier(month);
        let fires_at = slot.with_timezone(&Utc);
        debug!(%month, %send_time, %fires_at, "computed monthly slot");

        let reserved_at = self
            .center
            .pending_requests()?
            .into_iter()
            .find(|r| r.identifier == identifier)
            .map(|r| r.next_trigger);
        match reserved_at {
            Some(Some(at)) if at == fires_at => {
                debug!(%identifier, "monthly slot already reserved");
                return Ok(Some(ScheduledSlot {
                    month,
                    fires_at,
                    identifier,
                    newly_scheduled: false,
                }));
            }
            Some(previous) => {
                info!(%identifier, ?previous, %fires_at, "moving reserved monthly slot");
            }
            None => {}
        }

        let (title, body) = engagement_message(month);
        self.center
            .add(PendingNotification::monthly(month, title, body, fires_at))?;
        info!(%identifier, %fires_at, "scheduled monthly engagement notification");

        Ok(Some(ScheduledSlot {
            month,
            fires_at,
            identifier,
            newly_scheduled: true,
        }))
    }

    /// Schedule a one-shot transactional notification if its category is
    /// enabled. Returns the new identifier.
    pub fn schedule_transactional(
        &mut self,
        category: NotificationCategory,
        title: &str,
        body: &str,
        fires_at: DateTime<Utc>,
    ) -> Result<Option<String>> {
        if category == NotificationCategory::Engagement {
            return Err(crate::error::ValidationError::InvalidValue {
                field: "category".into(),
                message: "engagement notifications are scheduled monthly".into(),
            }
            .into());
        }
        if !self.prefs.allows(category) {
            debug!(%category, "category disabled; skipping");
            return Ok(None);
        }

        let request = PendingNotification::transactional(category, title, body, fires_at);
        let identifier = request.identifier.clone();
        self.center.add(request)?;
        Ok(Some(identifier))
    }

    /// Re-run the audit against whatever is pending right now, after
    /// dropping requests that already fired.
    ///
    /// A center that cannot be read yields an empty report.
    pub fn refresh_audit<Tz: TimeZone>(&mut self, now: &DateTime<Tz>) -> &NotificationAuditReport {
        if let Err(e) = self.prune_delivered(now.with_timezone(&Utc)) {
            warn!(error = %e, "could not drop delivered notifications");
        }
        let report = match self.center.pending_requests() {
            Ok(pending) => audit_pending(&pending, &self.prefs, now),
            Err(e) => {
                warn!(error = %e, "notification audit failed; reporting empty audit");
                NotificationAuditReport::empty(now.with_timezone(&Utc))
            }
        };
        if !report.is_healthy {
            warn!(violations = report.violations.len(), "notification audit found violations");
        }
        self.last_report.insert(report)
    }

    /// Drop every pending monthly request, schedule the next slot from
    /// current preferences, and audit the result.
    pub fn rebuild<Tz: TimeZone>(&mut self, now: &DateTime<Tz>) -> Result<NotificationAuditReport> {
        self.prune_delivered(now.with_timezone(&Utc))?;
        let monthly: Vec<String> = self
            .center
            .pending_requests()?
            .into_iter()
            .filter(|r| r.is_monthly())
            .map(|r| r.identifier)
            .collect();
        if !monthly.is_empty() {
            info!(removed = monthly.len(), "removing pending monthly notifications");
            self.center.remove(&monthly)?;
        }

        self.schedule_monthly(now)?;
        Ok(self.refresh_audit(now).clone())
    }

    fn prune_delivered(&mut self, now: DateTime<Utc>) -> Result<()> {
        let removed = self.center.remove_delivered(now)?;
        if removed > 0 {
            debug!(removed, "dropped delivered notifications");
        }
        Ok(())
    }
}

fn engagement_message(month: MonthKey) -> (&'static str, &'static str) {
    ENGAGEMENT_MESSAGES[(month.month as usize - 1) % ENGAGEMENT_MESSAGES.len()]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::NotificationError;
    use crate::notifications::InMemoryNotificationCenter;

    fn utc(y: i32, m: u32, d: u32, h: u32, min: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, h, min, 0).unwrap()
    }

    fn manager() -> NotificationManager<InMemoryNotificationCenter> {
        NotificationManager::new(
            InMemoryNotificationCenter::new(),
            NotificationPreferences::default(),
        )
    }

    /// Center whose reads always fail.
    struct BrokenCenter;

    impl NotificationCenter for BrokenCenter {
        fn pending_requests(&self) -> std::result::Result<Vec<PendingNotification>, NotificationError> {
            Err(NotificationError::Unavailable("permission denied".into()))
        }

        fn add(&mut self, _request: PendingNotification) -> std::result::Result<(), NotificationError> {
            Ok(())
        }

        fn remove(&mut self, _identifiers: &[String]) -> std::result::Result<(), NotificationError> {
            Ok(())
        }
    }

    #[test]
    fn schedules_next_month_after_mid_month() {
        let mut mgr = manager();
        let slot = mgr
            .schedule_monthly(&utc(2026, 3, 15, 10, 30))
            .unwrap()
            .unwrap();

        assert_eq!(slot.month, MonthKey::new(2026, 4).unwrap());
        assert_eq!(slot.fires_at, utc(2026, 4, 1, 10, 0));
        assert!(slot.newly_scheduled);
        assert_eq!(mgr.center().len(), 1);
    }

    #[test]
    fn scheduling_twice_in_a_month_is_idempotent() {
        let mut mgr = manager();
        let now = utc(2026, 3, 15, 10, 30);
        mgr.schedule_monthly(&now).unwrap();
        let second = mgr.schedule_monthly(&now).unwrap().unwrap();

        assert!(!second.newly_scheduled);
        assert_eq!(mgr.center().len(), 1);
    }

    #[test]
    fn next_month_replaces_the_delivered_request() {
        let mut mgr = manager();
        let march = utc(2026, 3, 15, 10, 30);
        let april = utc(2026, 4, 15, 10, 30);

        let first = mgr.schedule_monthly(&march).unwrap().unwrap();
        let second = mgr.schedule_monthly(&april).unwrap().unwrap();

        assert_eq!(first.identifier, "monthly-engagement-2026-04");
        assert_eq!(second.identifier, "monthly-engagement-2026-05");
        assert!(second.newly_scheduled);
        assert_eq!(mgr.center().len(), 1);

        let report = mgr.refresh_audit(&april);
        assert_eq!(report.monthly_count, 1);
        assert_eq!(report.reserved_month, MonthKey::new(2026, 5));
        assert!(report.is_healthy, "{:?}", report.violations);
    }

    #[test]
    fn refresh_audit_drops_fired_requests() {
        let mut mgr = manager();
        mgr.schedule_monthly(&utc(2026, 3, 15, 10, 30)).unwrap();
        mgr.schedule_transactional(
            NotificationCategory::ChallengeReminder,
            "Challenge",
            "",
            utc(2026, 3, 16, 12, 0),
        )
        .unwrap();

        let report = mgr.refresh_audit(&utc(2026, 4, 2, 8, 0));
        assert_eq!(report.pending_count, 0);
        assert!(mgr.center().is_empty());
    }

    #[test]
    fn changed_send_time_moves_the_reserved_slot() {
        let mut mgr = manager();
        let now = utc(2026, 3, 15, 10, 30);
        mgr.schedule_monthly(&now).unwrap();

        mgr.set_preferences(NotificationPreferences {
            preferred_hour: 16,
            ..NotificationPreferences::default()
        });
        let moved = mgr.schedule_monthly(&now).unwrap().unwrap();

        assert!(moved.newly_scheduled);
        assert_eq!(moved.fires_at, utc(2026, 4, 1, 16, 0));
        let pending = mgr.center().pending_requests().unwrap();
        assert_eq!(pending.len(), 1);
        assert_eq!(pending[0].next_trigger, Some(utc(2026, 4, 1, 16, 0)));

        let again = mgr.schedule_monthly(&now).unwrap().unwrap();
        assert!(!again.newly_scheduled);
        assert_eq!(again.fires_at, pending[0].next_trigger.unwrap());
    }

    #[test]
    fn disabled_engagement_schedules_nothing() {
        let prefs = NotificationPreferences {
            monthly_engagement: false,
            ..NotificationPreferences::default()
        };
        let mut mgr = NotificationManager::new(InMemoryNotificationCenter::new(), prefs);

        assert_eq!(mgr.schedule_monthly(&utc(2026, 3, 15, 10, 30)).unwrap(), None);
        assert!(mgr.center().is_empty());
    }

    #[test]
    fn transactional_respects_category_toggle() {
        let prefs = NotificationPreferences {
            achievement_alerts: false,
            ..NotificationPreferences::default()
        };
        let mut mgr = NotificationManager::new(InMemoryNotificationCenter::new(), prefs);
        let at = utc(2026, 3, 15, 12, 0);

        let skipped = mgr
            .schedule_transactional(NotificationCategory::AchievementUnlocked, "Badge", "", at)
            .unwrap();
        let added = mgr
            .schedule_transactional(NotificationCategory::ChallengeReminder, "Challenge", "", at)
            .unwrap();

        assert!(skipped.is_none());
        assert!(added.is_some());
        assert_eq!(mgr.center().len(), 1);
    }

    #[test]
    fn engagement_cannot_be_scheduled_as_transactional() {
        let mut mgr = manager();
        let result = mgr.schedule_transactional(
            NotificationCategory::Engagement,
            "Spam",
            "",
            utc(2026, 3, 15, 12, 0),
        );
        assert!(result.is_err());
    }

    #[test]
    fn refresh_audit_swallows_center_failure() {
        let mut mgr = NotificationManager::new(BrokenCenter, NotificationPreferences::default());
        let report = mgr.refresh_audit(&utc(2026, 3, 15, 10, 30));

        assert_eq!(report.pending_count, 0);
        assert!(report.is_healthy);
        assert!(mgr.last_report().is_some());
    }

    #[test]
    fn rebuild_replaces_misplaced_monthly_requests() {
        let mut center = InMemoryNotificationCenter::new();
        // Two stray monthly requests, one at night.
        center
            .add(PendingNotification::monthly(
                MonthKey::new(2026, 4).unwrap(),
                "Old",
                "",
                utc(2026, 4, 1, 22, 0),
            ))
            .unwrap();
        center
            .add(PendingNotification::monthly(
                MonthKey::new(2026, 5).unwrap(),
                "Older",
                "",
                utc(2026, 5, 1, 10, 0),
            ))
            .unwrap();
        let mut mgr = NotificationManager::new(center, NotificationPreferences::default());
        let now = utc(2026, 3, 15, 10, 30);

        assert!(!mgr.refresh_audit(&now).is_healthy);

        let report = mgr.rebuild(&now).unwrap();
        assert!(report.is_healthy);
        assert_eq!(report.monthly_count, 1);
        assert_eq!(report.reserved_month, MonthKey::new(2026, 4));
        assert_eq!(report.items[0].next_trigger, Some(utc(2026, 4, 1, 10, 0)));
    }

    #[test]
    fn rebuild_keeps_transactional_requests() {
        let mut mgr = manager();
        let at = utc(2026, 3, 16, 12, 0);
        mgr.schedule_transactional(NotificationCategory::StreakReminder, "Streak", "", at)
            .unwrap();

        let report = mgr.rebuild(&utc(2026, 3, 15, 10, 30)).unwrap();
        assert_eq!(report.transactional_count, 1);
        assert_eq!(report.monthly_count, 1);
    }

    #[test]
    fn engagement_copy_rotates_by_month() {
        let jan = engagement_message(MonthKey::new(2026, 1).unwrap());
        let feb = engagement_message(MonthKey::new(2026, 2).unwrap());
        let may = engagement_message(MonthKey::new(2026, 5).unwrap());
        assert_ne!(jan, feb);
        assert_eq!(jan, may);
    }
}
