//! Cooking streaks and where their data comes from.
//!
//! A signed-in user's streak is computed from cloud records; a signed-out
//! user's from the local activity log. Both sit behind [`StreakSource`] and
//! [`streak_source_for`] picks one from an explicit [`AuthState`].

use std::collections::{BTreeSet, HashMap};
use std::path::PathBuf;

use chrono::{Duration, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::error::{CoreError, Result};
use crate::storage::Database;

/// Consecutive activity days ending today, or yesterday if today has none yet.
pub fn current_streak(days: &[NaiveDate], today: NaiveDate) -> u32 {
    let set: BTreeSet<NaiveDate> = days.iter().copied().collect();
    let mut cursor = if set.contains(&today) {
        today
    } else {
        let yesterday = today - Duration::days(1);
        if !set.contains(&yesterday) {
            return 0;
        }
        yesterday
    };

    let mut streak = 0;
    while set.contains(&cursor) {
        streak += 1;
        cursor -= Duration::days(1);
    }
    streak
}

/// Longest run of consecutive activity days.
pub fn longest_streak(days: &[NaiveDate]) -> u32 {
    let set: BTreeSet<NaiveDate> = days.iter().copied().collect();
    let mut longest = 0;
    let mut run = 0;
    let mut previous: Option<NaiveDate> = None;
    for day in set {
        run = match previous {
            Some(p) if day - p == Duration::days(1) => run + 1,
            _ => 1,
        };
        longest = longest.max(run);
        previous = Some(day);
    }
    longest
}

/// Daily bonus points for keeping a streak alive.
pub fn streak_bonus(streak_days: u32) -> u32 {
    match streak_days {
        d if d >= 30 => 50,
        d if d >= 14 => 25,
        d if d >= 7 => 15,
        d if d >= 3 => 10,
        _ => 0,
    }
}

/// Whether the app has a signed-in user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum AuthState {
    SignedIn { user_id: String },
    SignedOut,
}

impl AuthState {
    pub fn from_user_id(user_id: Option<&str>) -> Self {
        match user_id.map(str::trim) {
            Some(id) if !id.is_empty() => AuthState::SignedIn {
                user_id: id.to_string(),
            },
            _ => AuthState::SignedOut,
        }
    }
}

/// Read access to per-user records in the cloud store.
pub trait CloudRecords {
    /// Days on which `user_id` logged any activity. Unknown users have none.
    fn activity_days(&self, user_id: &str) -> Result<Vec<NaiveDate>>;
}

/// Cloud records held in memory.
#[derive(Debug, Clone, Default)]
pub struct InMemoryCloudRecords {
    days: HashMap<String, Vec<NaiveDate>>,
    offline: bool,
}

impl InMemoryCloudRecords {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, user_id: &str, day: NaiveDate) {
        self.days.entry(user_id.to_string()).or_default().push(day);
    }

    /// Make every fetch fail, as when the device has no connection.
    pub fn set_offline(&mut self, offline: bool) {
        self.offline = offline;
    }
}

impl CloudRecords for InMemoryCloudRecords {
    fn activity_days(&self, user_id: &str) -> Result<Vec<NaiveDate>> {
        if self.offline {
            return Err(CoreError::cloud("fetch activity", "network unavailable"));
        }
        Ok(self.days.get(user_id).cloned().unwrap_or_default())
    }
}

/// Cloud records read from a JSON snapshot: `{ "<user_id>": ["YYYY-MM-DD", ...] }`.
#[derive(Debug, Clone)]
pub struct SnapshotCloudRecords {
    path: PathBuf,
}

impl SnapshotCloudRecords {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl CloudRecords for SnapshotCloudRecords {
    fn activity_days(&self, user_id: &str) -> Result<Vec<NaiveDate>> {
        let content = std::fs::read_to_string(&self.path).map_err(|e| {
            snapshot_error(format!("cannot read {}", self.path.display()), e)
        })?;
        let mut users: HashMap<String, Vec<NaiveDate>> =
            serde_json::from_str(&content).map_err(|e| {
                snapshot_error(format!("malformed snapshot {}", self.path.display()), e)
            })?;
        Ok(users.remove(user_id).unwrap_or_default())
    }
}

fn snapshot_error(
    message: String,
    source: impl std::error::Error + Send + Sync + 'static,
) -> CoreError {
    CoreError::Cloud {
        operation: "fetch activity".to_string(),
        message,
        source: Some(Box::new(source)),
    }
}

/// Where activity days for streak computation come from.
pub trait StreakSource {
    /// Short name for logs and output.
    fn name(&self) -> &'static str;

    fn activity_days(&self) -> Result<Vec<NaiveDate>>;

    fn current_streak(&self, today: NaiveDate) -> Result<u32> {
        Ok(current_streak(&self.activity_days()?, today))
    }

    fn longest_streak(&self) -> Result<u32> {
        Ok(longest_streak(&self.activity_days()?))
    }
}

/// Streaks from the local SQLite activity log.
#[derive(Debug)]
pub struct LocalStreakSource<'a> {
    db: &'a Database,
}

impl<'a> LocalStreakSource<'a> {
    pub fn new(db: &'a Database) -> Self {
        Self { db }
    }
}

impl StreakSource for LocalStreakSource<'_> {
    fn name(&self) -> &'static str {
        "local"
    }

    fn activity_days(&self) -> Result<Vec<NaiveDate>> {
        self.db.activity_days()
    }
}

/// Streaks from a signed-in user's cloud records.
#[derive(Debug)]
pub struct RemoteStreakSource<R> {
    records: R,
    user_id: String,
}

impl<R: CloudRecords> RemoteStreakSource<R> {
    pub fn new(records: R, user_id: impl Into<String>) -> Self {
        Self {
            records,
            user_id: user_id.into(),
        }
    }
}

impl<R: CloudRecords> StreakSource for RemoteStreakSource<R> {
    fn name(&self) -> &'static str {
        "cloud"
    }

    fn activity_days(&self) -> Result<Vec<NaiveDate>> {
        self.records.activity_days(&self.user_id).map_err(|e| {
            tracing::warn!(user_id = %self.user_id, error = %e, "cloud streak fetch failed");
            e
        })
    }
}

/// Pick the streak source for `auth`.
pub fn streak_source_for<'a, R: CloudRecords + 'a>(
    auth: &AuthState,
    records: R,
    db: &'a Database,
) -> Box<dyn StreakSource + 'a> {
    match auth {
        AuthState::SignedIn { user_id } => Box::new(RemoteStreakSource::new(records, user_id.as_str())),
        AuthState::SignedOut => Box::new(LocalStreakSource::new(db)),
    }
}
