//! Points, levels, badges, streaks and daily challenges.

mod badges;
mod challenges;
mod levels;
mod points;
mod progress;
mod streak;

pub use badges::{
    check_badges, Badge, BadgeId, EarnedBadge, Rarity, UserStats, BADGES, MONEY_SAVED_PER_MEAL,
    WASTE_PREVENTED_PER_MEAL,
};
pub use challenges::{daily_challenge, ChallengeKind, DailyChallenge, DAILY_CHALLENGES};
pub use levels::{check_level_up, level_for, next_level, next_milestone, Level, Milestone, LEVELS};
pub use points::{PointAction, PointsLedger};
pub use progress::{LogOutcome, ProgressService, ProgressSummary};
pub use streak::{
    current_streak, longest_streak, streak_bonus, streak_source_for, AuthState, CloudRecords,
    InMemoryCloudRecords, LocalStreakSource, RemoteStreakSource, SnapshotCloudRecords,
    StreakSource,
};
