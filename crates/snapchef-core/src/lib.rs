//! # SnapChef Core Library
//!
//! This library provides the client-side logic of the SnapChef cooking app
//! that is worth testing on its own. Every operation is also available via
//! the standalone `snapchef` CLI binary.
//!
//! ## Architecture
//!
//! - **Notifications**: Monthly engagement slot reservation, the anti-spam
//!   audit of pending requests, and schedule rebuilds
//! - **Physics**: Fixed-step simulation of falling food emoji that bounce once
//!   off on-screen buttons
//! - **Gamification**: Points, levels, milestones, badges, streaks and the
//!   daily challenge, with streak data from cloud or local records
//! - **Storage**: SQLite activity log and notification store, TOML configuration
//!
//! ## Key Components
//!
//! - [`NotificationManager`]: Schedules and audits against a [`NotificationCenter`]
//! - [`FallingFoodManager`]: Owns and steps the falling emoji
//! - [`ProgressService`]: Logs activities and summarizes progress
//! - [`Database`]: Local persistence
//! - [`Config`]: Application configuration management

pub mod error;
pub mod gamification;
pub mod notifications;
pub mod physics;
pub mod storage;

pub use error::{ConfigError, CoreError, DatabaseError, NotificationError, ValidationError};
pub use gamification::{AuthState, PointAction, ProgressService, StreakSource};
pub use notifications::{
    NotificationAuditReport, NotificationCenter, NotificationManager, NotificationPreferences,
    PendingNotification,
};
pub use physics::{FallingFoodManager, PhysicsConfig, Rect};
pub use storage::{Config, Database};
