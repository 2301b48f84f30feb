//! Notification settings as edited on the settings screen.

use serde::{Deserialize, Serialize};

use super::policy::{QuietHoursPolicy, SendTime, DEFAULT_SEND_HOUR, DEFAULT_SEND_MINUTE};
use super::request::NotificationCategory;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotificationPreferences {
    /// Master switch.
    #[serde(default = "default_true")]
    pub enabled: bool,
    #[serde(default = "default_true")]
    pub monthly_engagement: bool,
    #[serde(default = "default_true")]
    pub challenge_reminders: bool,
    #[serde(default = "default_true")]
    pub streak_reminders: bool,
    #[serde(default = "default_true")]
    pub achievement_alerts: bool,
    /// Raw preferred hour; normalized before use.
    #[serde(default = "default_hour")]
    pub preferred_hour: i32,
    #[serde(default = "default_minute")]
    pub preferred_minute: i32,
    #[serde(default)]
    pub quiet_hours: QuietHoursPolicy,
}

fn default_true() -> bool {
    true
}
fn default_hour() -> i32 {
    DEFAULT_SEND_HOUR as i32
}
fn default_minute() -> i32 {
    DEFAULT_SEND_MINUTE as i32
}

impl Default for NotificationPreferences {
    fn default() -> Self {
        Self {
            enabled: true,
            monthly_engagement: true,
            challenge_reminders: true,
            streak_reminders: true,
            achievement_alerts: true,
            preferred_hour: default_hour(),
            preferred_minute: default_minute(),
            quiet_hours: QuietHoursPolicy::default(),
        }
    }
}

impl NotificationPreferences {
    /// The preferred time after window normalization.
    pub fn send_time(&self) -> SendTime {
        SendTime::normalized(self.preferred_hour, self.preferred_minute)
    }

    /// Whether `category` may be scheduled at all.
    pub fn allows(&self, category: NotificationCategory) -> bool {
        if !self.enabled {
            return false;
        }
        match category {
            NotificationCategory::Engagement => self.monthly_engagement,
            NotificationCategory::ChallengeReminder => self.challenge_reminders,
            NotificationCategory::StreakReminder => self.streak_reminders,
            NotificationCategory::AchievementUnlocked => self.achievement_alerts,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn master_switch_disables_every_category() {
        let prefs = NotificationPreferences {
            enabled: false,
            ..NotificationPreferences::default()
        };
        assert!(!prefs.allows(NotificationCategory::Engagement));
        assert!(!prefs.allows(NotificationCategory::AchievementUnlocked));
    }

    #[test]
    fn per_category_toggle() {
        let prefs = NotificationPreferences {
            streak_reminders: false,
            ..NotificationPreferences::default()
        };
        assert!(!prefs.allows(NotificationCategory::StreakReminder));
        assert!(prefs.allows(NotificationCategory::ChallengeReminder));
    }

    #[test]
    fn send_time_is_normalized() {
        let prefs = NotificationPreferences {
            preferred_hour: 22,
            preferred_minute: 15,
            ..NotificationPreferences::default()
        };
        assert_eq!(prefs.send_time(), SendTime::default());
    }

    #[test]
    fn missing_fields_take_defaults() {
        let prefs: NotificationPreferences = toml::from_str("preferred_hour = 14").unwrap();
        assert_eq!(prefs.preferred_hour, 14);
        assert_eq!(prefs.preferred_minute, 0);
        assert!(prefs.monthly_engagement);
        assert_eq!(prefs.quiet_hours.start_hour, 22);
    }
}
