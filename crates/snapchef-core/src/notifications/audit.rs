//! Point-in-time audit of pending notifications against the monthly policy.

use chrono::{DateTime, NaiveDateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};

use super::policy::{self, MonthKey, WINDOW_END_HOUR, WINDOW_START_HOUR};
use super::preferences::NotificationPreferences;
use super::request::{DeliveryPolicy, NotificationCategory, PendingNotification};

/// One pending request as judged by the audit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuditedNotification {
    pub identifier: String,
    pub title: String,
    pub policy: DeliveryPolicy,
    pub next_trigger: Option<DateTime<Utc>>,
    /// `next_trigger` in the user's local wall time.
    pub local_trigger: Option<NaiveDateTime>,
    pub repeats: bool,
    pub within_window: bool,
    pub compliant: bool,
}

/// Snapshot comparing scheduled notifications with the monthly policy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NotificationAuditReport {
    pub generated_at: DateTime<Utc>,
    pub pending_count: usize,
    pub monthly_count: usize,
    pub transactional_count: usize,
    /// Month held by the pending monthly request, if any.
    pub reserved_month: Option<MonthKey>,
    /// Where the next monthly request belongs under current preferences.
    pub next_monthly_slot: Option<DateTime<Utc>>,
    pub items: Vec<AuditedNotification>,
    pub violations: Vec<String>,
    /// Pending items landing in quiet hours. Informational only.
    pub quiet_hours_conflicts: Vec<String>,
    pub is_healthy: bool,
}

impl NotificationAuditReport {
    /// Report used when the center cannot be read.
    pub fn empty(generated_at: DateTime<Utc>) -> Self {
        Self {
            generated_at,
            pending_count: 0,
            monthly_count: 0,
            transactional_count: 0,
            reserved_month: None,
            next_monthly_slot: None,
            items: Vec::new(),
            violations: Vec::new(),
            quiet_hours_conflicts: Vec::new(),
            is_healthy: true,
        }
    }

    pub fn compliant_count(&self) -> usize {
        self.items.iter().filter(|item| item.compliant).count()
    }
}

/// Audit `pending` as of `now`, evaluating trigger times in `now`'s zone.
pub fn audit_pending<Tz: TimeZone>(
    pending: &[PendingNotification],
    prefs: &NotificationPreferences,
    now: &DateTime<Tz>,
) -> NotificationAuditReport {
    let tz = now.timezone();
    let mut items = Vec::with_capacity(pending.len());
    let mut violations = Vec::new();
    let mut quiet_hours_conflicts = Vec::new();

    for request in pending {
        let local_trigger = request
            .next_trigger
            .map(|t| t.with_timezone(&tz).naive_local());
        let within_window = local_trigger
            .as_ref()
            .map(policy::is_within_window)
            .unwrap_or(false);

        let compliant = match request.policy {
            DeliveryPolicy::Transactional => true,
            DeliveryPolicy::MonthlyEngagement => local_trigger.is_some() && within_window,
        };

        if request.is_monthly() {
            match local_trigger {
                None => violations.push(format!(
                    "Monthly notification '{}' has no next trigger date",
                    request.identifier
                )),
                Some(local) if !within_window => violations.push(format!(
                    "Monthly notification '{}' fires at {}, outside {:02}:00-{:02}:00",
                    request.identifier,
                    local.format("%Y-%m-%d %H:%M"),
                    WINDOW_START_HOUR,
                    WINDOW_END_HOUR
                )),
                Some(_) => {}
            }
        }

        if let Some(local) = local_trigger {
            if prefs.quiet_hours.contains(&local) {
                quiet_hours_conflicts.push(format!(
                    "'{}' fires at {} during quiet hours",
                    request.identifier,
                    local.format("%H:%M")
                ));
            }
        }

        items.push(AuditedNotification {
            identifier: request.identifier.clone(),
            title: request.title.clone(),
            policy: request.policy,
            next_trigger: request.next_trigger,
            local_trigger,
            repeats: request.repeats,
            within_window,
            compliant,
        });
    }

    let monthly: Vec<&PendingNotification> = pending.iter().filter(|r| r.is_monthly()).collect();
    let monthly_count = monthly.len();
    if monthly_count > 1 {
        violations.push(format!(
            "{monthly_count} monthly notifications pending; at most 1 is allowed"
        ));
    }
    if monthly_count > 0 && !prefs.allows(NotificationCategory::Engagement) {
        violations.push(format!(
            "Monthly notifications are disabled but {monthly_count} still pending"
        ));
    }

    let reserved_month = monthly
        .iter()
        .filter_map(|r| {
            r.reserved_month().or_else(|| {
                r.next_trigger
                    .map(|t| MonthKey::of(&t.with_timezone(&tz).naive_local()))
            })
        })
        .min();

    let next_monthly_slot = prefs
        .allows(NotificationCategory::Engagement)
        .then(|| policy::next_monthly_slot(now, prefs.send_time()).with_timezone(&Utc));

    let is_healthy = violations.is_empty();
    NotificationAuditReport {
        generated_at: now.with_timezone(&Utc),
        pending_count: pending.len(),
        monthly_count,
        transactional_count: pending.len() - monthly_count,
        reserved_month,
        next_monthly_slot,
        items,
        violations,
        quiet_hours_conflicts,
        is_healthy,
    }
}
