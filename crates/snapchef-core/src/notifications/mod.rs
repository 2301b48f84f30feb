//! Notification scheduling and anti-spam auditing.
//!
//! Engagement notifications are capped at one per calendar month and must be
//! delivered on day 1 inside the 09:00-18:00 window. Transactional
//! notifications (challenge reminders, streak reminders, achievement alerts)
//! are not capped. [`NotificationManager`] reserves the monthly slot, audits
//! what the [`NotificationCenter`] actually has pending, and rebuilds the
//! schedule when the audit finds problems.

mod audit;
mod center;
mod manager;
mod policy;
mod preferences;
mod request;

pub use audit::{audit_pending, AuditedNotification, NotificationAuditReport};
pub use center::{InMemoryNotificationCenter, NotificationCenter};
pub use manager::{NotificationManager, ScheduledSlot};
pub use policy::{
    is_within_window, next_monthly_slot, slot_for_month, MonthKey, QuietHoursPolicy, SendTime,
    DEFAULT_SEND_HOUR, DEFAULT_SEND_MINUTE, WINDOW_END_HOUR, WINDOW_START_HOUR,
};
pub use preferences::NotificationPreferences;
pub use request::{
    monthly_identifier, DeliveryPolicy, NotificationCategory, PendingNotification,
    MONTHLY_IDENTIFIER_PREFIX,
};
