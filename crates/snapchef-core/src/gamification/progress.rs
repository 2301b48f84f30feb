//! Logging activities and reading back the user's progress.

use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use serde::Serialize;
use tracing::{debug, info};

use super::badges::{check_badges, EarnedBadge, UserStats};
use super::challenges::{daily_challenge, DailyChallenge};
use super::levels::{check_level_up, level_for, next_level, next_milestone, Level, Milestone};
use super::points::{PointAction, PointsLedger};
use super::streak::{streak_bonus, StreakSource};
use crate::error::{Result, ValidationError};
use crate::storage::{ActivityRecord, Database};

/// What logging one activity produced.
#[derive(Debug, Clone, Serialize)]
pub struct LogOutcome {
    pub activity: ActivityRecord,
    pub streak: u32,
    /// Set when this activity completed a 7- or 30-day streak.
    pub streak_award: Option<ActivityRecord>,
    pub new_badges: Vec<EarnedBadge>,
    pub level_up: Option<Level>,
    pub total_points: u64,
}

#[derive(Debug, Clone, Serialize)]
pub struct ProgressSummary {
    pub streak_source: &'static str,
    pub total_points: u64,
    pub points_today: u64,
    pub level: Level,
    pub next_level: Option<Level>,
    pub milestone: Milestone,
    pub streak: u32,
    pub longest_streak: u32,
    pub streak_bonus: u32,
    pub stats: UserStats,
    pub badges: Vec<EarnedBadge>,
    pub challenge: &'static DailyChallenge,
}

/// Records activities in the local log and derives points, levels, badges
/// and streaks. Streak data comes from whichever [`StreakSource`] the
/// caller picked for the current auth state.
pub struct ProgressService<'a> {
    db: &'a Database,
    streaks: Box<dyn StreakSource + 'a>,
}

impl<'a> ProgressService<'a> {
    pub fn new(db: &'a Database, streaks: Box<dyn StreakSource + 'a>) -> Self {
        Self { db, streaks }
    }

    pub fn streak_source(&self) -> &'static str {
        self.streaks.name()
    }

    /// Record `action` at `now` and award whatever it unlocks.
    ///
    /// Streak awards are granted automatically, at most once per local day,
    /// and cannot be logged directly.
    pub fn log<Tz: TimeZone>(&mut self, action: PointAction, now: &DateTime<Tz>) -> Result<LogOutcome> {
        if matches!(action, PointAction::MaintainStreak7 | PointAction::MaintainStreak30) {
            return Err(ValidationError::InvalidValue {
                field: "action".to_string(),
                message: format!("{action} is awarded automatically"),
            }
            .into());
        }

        let local_day = now.date_naive();
        let at = now.with_timezone(&Utc);
        let level_before = level_for(self.db.total_points()?);

        let activity = self.db.record_activity(action, at, local_day)?;
        let streak = self.streaks.current_streak(local_day)?;
        debug!(%action, %local_day, streak, source = self.streaks.name(), "activity recorded");

        let streak_award = match streak_milestone_action(streak) {
            Some(award) if !self.db.has_activity_on(award, local_day)? => {
                Some(self.db.record_activity(award, at, local_day)?)
            }
            _ => None,
        };

        let stats = self.stats(streak)?;
        let already: Vec<_> = self.db.earned_badges()?.into_iter().map(|b| b.id).collect();
        let new_badges = check_badges(&stats, &already, at);
        for badge in &new_badges {
            self.db.record_badge(badge)?;
        }

        let total_points = self.db.total_points()?;
        let level_up = check_level_up(level_before.level, total_points);
        if let Some(level) = level_up {
            info!(level = level.level, name = level.name, "level up");
        }
        for badge in &new_badges {
            info!(badge = %badge.id, points = badge.points, "badge earned");
        }

        Ok(LogOutcome {
            activity,
            streak,
            streak_award,
            new_badges,
            level_up,
            total_points,
        })
    }

    /// Current progress as of `today` (the user's local date).
    pub fn summary(&self, today: NaiveDate) -> Result<ProgressSummary> {
        let mut ledger = PointsLedger::new();
        for record in self.db.activities()? {
            ledger.add(record.points, record.local_day);
        }
        let badges = self.db.earned_badges()?;
        let badge_points: u64 = badges.iter().map(|b| u64::from(b.points)).sum();
        let total_points = ledger.total() + badge_points;

        let streak = self.streaks.current_streak(today)?;
        let longest_streak = self.streaks.longest_streak()?;
        let level = level_for(total_points);

        Ok(ProgressSummary {
            streak_source: self.streaks.name(),
            total_points,
            points_today: ledger.points_on(today),
            level,
            next_level: next_level(level.level),
            milestone: next_milestone(total_points),
            streak,
            longest_streak,
            streak_bonus: streak_bonus(streak),
            stats: self.stats(streak)?,
            badges,
            challenge: daily_challenge(&today),
        })
    }

    fn stats(&self, streak: u32) -> Result<UserStats> {
        let counts = self.db.action_counts()?;
        let count = |action: PointAction| counts.get(&action).copied().unwrap_or(0);

        Ok(UserStats {
            meals_created: count(PointAction::GenerateMeal) + count(PointAction::CookMeal),
            recipes_shared: count(PointAction::ShareRecipe),
            cooking_streak: streak,
            total_points: self.db.total_points()?,
            challenges_completed: count(PointAction::CompleteDailyChallenge)
                + count(PointAction::CompleteWeeklyChallenge),
            challenges_won: count(PointAction::WinContest),
            badges_earned: self.db.earned_badges()?.len() as u64,
            ..UserStats::default()
        }
        .with_estimates())
    }
}

fn streak_milestone_action(streak: u32) -> Option<PointAction> {
    match streak {
        7 => Some(PointAction::MaintainStreak7),
        30 => Some(PointAction::MaintainStreak30),
        _ => None,
    }
}
