//! Pending notification requests as seen by the notification center.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::policy::MonthKey;

/// Identifier prefix shared by every monthly engagement request.
pub const MONTHLY_IDENTIFIER_PREFIX: &str = "monthly-engagement-";

/// How a notification is allowed to be delivered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeliveryPolicy {
    /// Capped at one per calendar month, daytime window only.
    MonthlyEngagement,
    /// Triggered by something the user did; not capped.
    Transactional,
}

impl DeliveryPolicy {
    pub fn as_str(self) -> &'static str {
        match self {
            DeliveryPolicy::MonthlyEngagement => "monthly_engagement",
            DeliveryPolicy::Transactional => "transactional",
        }
    }
}

impl fmt::Display for DeliveryPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DeliveryPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "monthly_engagement" => Ok(DeliveryPolicy::MonthlyEngagement),
            "transactional" => Ok(DeliveryPolicy::Transactional),
            other => Err(format!("unknown delivery policy: {other}")),
        }
    }
}

/// User-facing notification categories, each toggled in settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationCategory {
    /// "New recipes are waiting" style nudges.
    Engagement,
    ChallengeReminder,
    StreakReminder,
    AchievementUnlocked,
}

impl NotificationCategory {
    pub fn as_str(self) -> &'static str {
        match self {
            NotificationCategory::Engagement => "engagement",
            NotificationCategory::ChallengeReminder => "challenge_reminder",
            NotificationCategory::StreakReminder => "streak_reminder",
            NotificationCategory::AchievementUnlocked => "achievement_unlocked",
        }
    }

    /// Delivery policy implied by the category.
    pub fn policy(self) -> DeliveryPolicy {
        match self {
            NotificationCategory::Engagement => DeliveryPolicy::MonthlyEngagement,
            _ => DeliveryPolicy::Transactional,
        }
    }
}

impl fmt::Display for NotificationCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for NotificationCategory {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "engagement" => Ok(NotificationCategory::Engagement),
            "challenge_reminder" => Ok(NotificationCategory::ChallengeReminder),
            "streak_reminder" => Ok(NotificationCategory::StreakReminder),
            "achievement_unlocked" => Ok(NotificationCategory::AchievementUnlocked),
            other => Err(format!("unknown notification category: {other}")),
        }
    }
}

/// A scheduled, not yet delivered notification.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PendingNotification {
    pub identifier: String,
    pub title: String,
    #[serde(default)]
    pub body: String,
    pub category: NotificationCategory,
    pub policy: DeliveryPolicy,
    /// When the trigger next fires; `None` if the center cannot tell.
    pub next_trigger: Option<DateTime<Utc>>,
    #[serde(default)]
    pub repeats: bool,
}

impl PendingNotification {
    /// Monthly engagement request reserving `month`.
    pub fn monthly(month: MonthKey, title: &str, body: &str, trigger: DateTime<Utc>) -> Self {
        Self {
            identifier: monthly_identifier(month),
            title: title.to_string(),
            body: body.to_string(),
            category: NotificationCategory::Engagement,
            policy: DeliveryPolicy::MonthlyEngagement,
            next_trigger: Some(trigger),
            repeats: false,
        }
    }

    /// One-shot request in a transactional category.
    pub fn transactional(
        category: NotificationCategory,
        title: &str,
        body: &str,
        trigger: DateTime<Utc>,
    ) -> Self {
        Self {
            identifier: format!("{}-{}", category.as_str(), uuid::Uuid::new_v4()),
            title: title.to_string(),
            body: body.to_string(),
            category,
            policy: category.policy(),
            next_trigger: Some(trigger),
            repeats: false,
        }
    }

    pub fn is_monthly(&self) -> bool {
        self.policy == DeliveryPolicy::MonthlyEngagement
    }

    /// A one-shot request whose trigger is at or before `now` has fired.
    pub fn is_delivered_by(&self, now: DateTime<Utc>) -> bool {
        !self.repeats && self.next_trigger.is_some_and(|t| t <= now)
    }

    /// Month reserved by this request, read from its identifier.
    pub fn reserved_month(&self) -> Option<MonthKey> {
        self.identifier
            .strip_prefix(MONTHLY_IDENTIFIER_PREFIX)
            .and_then(|rest| rest.parse().ok())
    }
}

/// Identifier of the monthly engagement request for `month`.
pub fn monthly_identifier(month: MonthKey) -> String {
    format!("{MONTHLY_IDENTIFIER_PREFIX}{month}")
}
