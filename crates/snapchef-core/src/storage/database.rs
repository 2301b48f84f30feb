//! SQLite-based local storage.
//!
//! Provides persistent storage for:
//! - The activity log that points, stats and the local streak are derived from
//! - Earned badges
//! - Pending notification requests (the local notification center)
//! - Key-value store for application state

use std::collections::HashMap;
use std::path::Path;

use chrono::{DateTime, NaiveDate, Utc};
use rusqlite::{params, Connection};
use serde::{Deserialize, Serialize};

use crate::error::{DatabaseError, NotificationError, Result};
use crate::gamification::{BadgeId, EarnedBadge, PointAction};
use crate::notifications::{NotificationCenter, PendingNotification};

use super::{data_dir, migrations};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActivityRecord {
    pub id: i64,
    pub action: PointAction,
    pub points: u32,
    pub occurred_at: DateTime<Utc>,
    /// The user's local calendar day when it happened.
    pub local_day: NaiveDate,
}

/// SQLite database for local app state.
#[derive(Debug)]
pub struct Database {
    conn: Connection,
}

impl Database {
    /// Open the database at `<data_dir>/snapchef.db`.
    ///
    /// Creates the database file and schema if they don't exist.
    pub fn open() -> Result<Self> {
        let path = data_dir()?.join("snapchef.db");
        Self::open_at(&path)
    }

    /// Open (or create) a database at an explicit path.
    pub fn open_at(path: &Path) -> Result<Self> {
        let conn = Connection::open(path).map_err(|source| DatabaseError::OpenFailed {
            path: path.to_path_buf(),
            source,
        })?;
        Self::with_connection(conn)
    }

    /// Open an in-memory database.
    pub fn open_memory() -> Result<Self> {
        Self::with_connection(Connection::open_in_memory()?)
    }

    fn with_connection(conn: Connection) -> Result<Self> {
        migrations::migrate(&conn)
            .map_err(|e| DatabaseError::MigrationFailed(e.to_string()))?;
        Ok(Self { conn })
    }

    /// Record an activity and the points it is worth.
    pub fn record_activity(
        &self,
        action: PointAction,
        occurred_at: DateTime<Utc>,
        local_day: NaiveDate,
    ) -> Result<ActivityRecord> {
        let points = action.points();
        self.conn.execute(
            "INSERT INTO activity_log (action, points, occurred_at, local_day)
             VALUES (?1, ?2, ?3, ?4)",
            params![
                action.as_str(),
                points,
                occurred_at.to_rfc3339(),
                local_day.to_string(),
            ],
        )?;
        Ok(ActivityRecord {
            id: self.conn.last_insert_rowid(),
            action,
            points,
            occurred_at,
            local_day,
        })
    }

    /// Activity log, oldest first.
    pub fn activities(&self) -> Result<Vec<ActivityRecord>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, action, points, occurred_at, local_day
             FROM activity_log ORDER BY occurred_at, id",
        )?;
        let rows = stmt.query_map([], |row| {
            Ok((
                row.get::<_, i64>(0)?,
                row.get::<_, String>(1)?,
                row.get::<_, u32>(2)?,
                row.get::<_, String>(3)?,
                row.get::<_, String>(4)?,
            ))
        })?;

        let mut records = Vec::new();
        for row in rows {
            let (id, action, points, occurred_at, local_day) = row?;
            let Ok(action) = action.parse::<PointAction>() else {
                tracing::warn!(id, %action, "skipping activity with unknown action");
                continue;
            };
            records.push(ActivityRecord {
                id,
                action,
                points,
                occurred_at: parse_timestamp(&occurred_at)?,
                local_day: parse_day(&local_day)?,
            });
        }
        Ok(records)
    }

    /// Distinct local days with any recorded activity, ascending.
    pub fn activity_days(&self) -> Result<Vec<NaiveDate>> {
        let mut stmt = self
            .conn
            .prepare("SELECT DISTINCT local_day FROM activity_log ORDER BY local_day")?;
        let rows = stmt.query_map([], |row| row.get::<_, String>(0))?;
        let mut days = Vec::new();
        for row in rows {
            days.push(parse_day(&row?)?);
        }
        Ok(days)
    }

    /// How many times each action was recorded.
    pub fn action_counts(&self) -> Result<HashMap<PointAction, u64>> {
        let mut stmt = self
            .conn
            .prepare("SELECT action, COUNT(*) FROM activity_log GROUP BY action")?;
        let rows = stmt.query_map([], |row| {
            Ok((row.get::<_, String>(0)?, row.get::<_, u64>(1)?))
        })?;
        let mut counts = HashMap::new();
        for row in rows {
            let (action, count) = row?;
            if let Ok(action) = action.parse::<PointAction>() {
                counts.insert(action, count);
            }
        }
        Ok(counts)
    }

    /// Whether `action` was already recorded on `local_day`.
    pub fn has_activity_on(&self, action: PointAction, local_day: NaiveDate) -> Result<bool> {
        let count: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM activity_log WHERE action = ?1 AND local_day = ?2",
            params![action.as_str(), local_day.to_string()],
            |row| row.get(0),
        )?;
        Ok(count > 0)
    }

    /// Activity points plus badge points.
    pub fn total_points(&self) -> Result<u64> {
        let total: i64 = self.conn.query_row(
            "SELECT (SELECT COALESCE(SUM(points), 0) FROM activity_log)
                  + (SELECT COALESCE(SUM(points), 0) FROM earned_badges)",
            [],
            |row| row.get(0),
        )?;
        Ok(total.max(0) as u64)
    }

    /// Store a badge. Returns false if it was already earned.
    pub fn record_badge(&self, badge: &EarnedBadge) -> Result<bool> {
        let inserted = self.conn.execute(
            "INSERT OR IGNORE INTO earned_badges (badge_id, points, earned_at) VALUES (?1, ?2, ?3)",
            params![badge.id.as_str(), badge.points, badge.earned_at.to_rfc3339()],
        )?;
        Ok(inserted > 0)
    }

    pub fn earned_badges(&self) -> Result<Vec<EarnedBadge>> {
        let mut stmt = self
            .conn
            .prepare("SELECT badge_id, earned_at FROM earned_badges ORDER BY earned_at, badge_id")?;
        let rows = stmt.query_map([], |row| {
            Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?))
        })?;
        let mut badges = Vec::new();
        for row in rows {
            let (id, earned_at) = row?;
            if let Ok(id) = id.parse::<BadgeId>() {
                badges.push(EarnedBadge::new(id, parse_timestamp(&earned_at)?));
            }
        }
        Ok(badges)
    }

    fn load_pending(&self) -> rusqlite::Result<Vec<(String, String, String, String, String, Option<String>, bool)>> {
        let mut stmt = self.conn.prepare(
            "SELECT identifier, title, body, category, policy, next_trigger, repeats
             FROM pending_notifications ORDER BY identifier",
        )?;
        let rows = stmt.query_map([], |row| {
            Ok((
                row.get(0)?,
                row.get(1)?,
                row.get(2)?,
                row.get(3)?,
                row.get(4)?,
                row.get(5)?,
                row.get(6)?,
            ))
        })?;
        rows.collect()
    }
}

impl NotificationCenter for Database {
    fn pending_requests(&self) -> std::result::Result<Vec<PendingNotification>, NotificationError> {
        let rows = self
            .load_pending()
            .map_err(|e| NotificationError::Unavailable(e.to_string()))?;

        rows.into_iter()
            .map(|(identifier, title, body, category, policy, next_trigger, repeats)| {
                let next_trigger = next_trigger
                    .map(|t| DateTime::parse_from_rfc3339(&t).map(|d| d.with_timezone(&Utc)))
                    .transpose()
                    .map_err(|e| NotificationError::Unavailable(format!("{identifier}: {e}")))?;
                Ok(PendingNotification {
                    category: category
                        .parse()
                        .map_err(|e: String| NotificationError::Unavailable(e))?,
                    policy: policy
                        .parse()
                        .map_err(|e: String| NotificationError::Unavailable(e))?,
                    identifier,
                    title,
                    body,
                    next_trigger,
                    repeats,
                })
            })
            .collect()
    }

    fn add(&mut self, request: PendingNotification) -> std::result::Result<(), NotificationError> {
        self.conn
            .execute(
                "INSERT OR REPLACE INTO pending_notifications
                 (identifier, title, body, category, policy, next_trigger, repeats)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
                params![
                    request.identifier,
                    request.title,
                    request.body,
                    request.category.as_str(),
                    request.policy.as_str(),
                    request.next_trigger.map(|t| t.to_rfc3339()),
                    request.repeats,
                ],
            )
            .map_err(|e| NotificationError::SchedulingFailed {
                identifier: request.identifier.clone(),
                message: e.to_string(),
            })?;
        Ok(())
    }

    fn remove(&mut self, identifiers: &[String]) -> std::result::Result<(), NotificationError> {
        let tx = self
            .conn
            .unchecked_transaction()
            .map_err(|e| NotificationError::RemovalFailed(e.to_string()))?;
        for id in identifiers {
            tx.execute(
                "DELETE FROM pending_notifications WHERE identifier = ?1",
                params![id],
            )
            .map_err(|e| NotificationError::RemovalFailed(e.to_string()))?;
        }
        tx.commit()
            .map_err(|e| NotificationError::RemovalFailed(e.to_string()))
    }
}

fn parse_timestamp(value: &str) -> Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value)
        .map(|d| d.with_timezone(&Utc))
        .map_err(|e| DatabaseError::QueryFailed(format!("bad timestamp '{value}': {e}")).into())
}

fn parse_day(value: &str) -> Result<NaiveDate> {
    value
        .parse::<NaiveDate>()
        .map_err(|e| DatabaseError::QueryFailed(format!("bad date '{value}': {e}")).into())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::notifications::{MonthKey, NotificationCategory};
    use chrono::TimeZone;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 10, d).unwrap()
    }

    fn at(d: u32, h: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 10, d, h, 0, 0).unwrap()
    }

    #[test]
    fn record_and_query_activity() {
        let db = Database::open_memory().unwrap();
        db.record_activity(PointAction::CookMeal, at(1, 18), day(1)).unwrap();
        db.record_activity(PointAction::ShareRecipe, at(1, 19), day(1)).unwrap();
        db.record_activity(PointAction::CookMeal, at(3, 18), day(3)).unwrap();

        assert_eq!(db.total_points().unwrap(), 50);
        assert_eq!(db.activity_days().unwrap(), vec![day(1), day(3)]);
        assert_eq!(db.action_counts().unwrap()[&PointAction::CookMeal], 2);
        assert!(db.has_activity_on(PointAction::ShareRecipe, day(1)).unwrap());
        assert!(!db.has_activity_on(PointAction::ShareRecipe, day(3)).unwrap());

        let log = db.activities().unwrap();
        assert_eq!(log.len(), 3);
        assert_eq!(log[0].action, PointAction::CookMeal);
        assert_eq!(log[2].local_day, day(3));
    }

    #[test]
    fn badges_are_stored_once_and_count_toward_points() {
        let db = Database::open_memory().unwrap();
        let badge = EarnedBadge::new(BadgeId::FirstMeal, at(2, 9));

        assert!(db.record_badge(&badge).unwrap());
        assert!(!db.record_badge(&badge).unwrap());
        assert_eq!(db.earned_badges().unwrap(), vec![badge]);
        assert_eq!(db.total_points().unwrap(), 50);
    }

    #[test]
    fn acts_as_notification_center() {
        let mut db = Database::open_memory().unwrap();
        let monthly = PendingNotification::monthly(
            MonthKey::new(2026, 11).unwrap(),
            "Fridge check",
            "Snap a photo",
            Utc.with_ymd_and_hms(2026, 11, 1, 10, 0, 0).unwrap(),
        );
        let mut reminder = PendingNotification::transactional(
            NotificationCategory::StreakReminder,
            "Streak",
            "",
            at(20, 12),
        );
        reminder.next_trigger = None;
        reminder.repeats = true;

        db.add(monthly.clone()).unwrap();
        db.add(reminder.clone()).unwrap();

        let pending = db.pending_requests().unwrap();
        assert_eq!(pending.len(), 2);
        assert!(pending.contains(&monthly));
        assert!(pending.contains(&reminder));

        db.remove(&[monthly.identifier.clone()]).unwrap();
        assert_eq!(db.pending_requests().unwrap(), vec![reminder]);

        db.remove_all().unwrap();
        assert!(db.pending_requests().unwrap().is_empty());
    }

    #[test]
    fn file_database_persists_between_opens() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("snapchef.db");
        {
            let db = Database::open_at(&path).unwrap();
            db.record_activity(PointAction::CookMeal, at(12, 19), day(12)).unwrap();
        }
        let db = Database::open_at(&path).unwrap();
        assert_eq!(db.activity_days().unwrap(), vec![day(12)]);
        assert_eq!(db.total_points().unwrap(), 20);
    }
}
