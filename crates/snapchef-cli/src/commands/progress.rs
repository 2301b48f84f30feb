//! Points, streaks, badges and the daily challenge.

use chrono::{Local, NaiveDate};
use clap::Subcommand;
use snapchef_core::gamification::{
    daily_challenge, streak_source_for, AuthState, LogOutcome, PointAction, ProgressService,
    ProgressSummary, SnapshotCloudRecords,
};
use snapchef_core::storage::{data_dir, Config, Database};
use tracing::debug;

use super::{print_json, user_facing, Clock};

#[derive(Subcommand)]
pub enum ProgressAction {
    /// Record an activity (cook_meal, share_recipe, ...)
    Log {
        action: PointAction,
        #[arg(long)]
        now: Option<String>,
        #[arg(long)]
        json: bool,
    },
    /// Show points, level, streak and badges
    Show {
        #[arg(long)]
        now: Option<String>,
        #[arg(long)]
        json: bool,
    },
    /// Show the daily challenge
    Challenge {
        /// Day to show (YYYY-MM-DD), defaults to today
        #[arg(long)]
        date: Option<NaiveDate>,
        #[arg(long)]
        json: bool,
    },
}

pub fn run(action: ProgressAction) -> Result<(), Box<dyn std::error::Error>> {
    match action {
        ProgressAction::Log { action, now, json } => {
            let db = Database::open()?;
            let mut progress = open_progress(&db)?;
            let clock = Clock::from_arg(now.as_deref())?;
            let outcome =
                crate::with_clock!(clock, |now| progress.log(action, &now)).map_err(user_facing)?;
            if json {
                print_json(&outcome)?;
            } else {
                print_outcome(&outcome);
            }
        }
        ProgressAction::Show { now, json } => {
            let db = Database::open()?;
            let progress = open_progress(&db)?;
            let clock = Clock::from_arg(now.as_deref())?;
            let today = crate::with_clock!(clock, |now| now.date_naive());
            let summary = progress.summary(today).map_err(user_facing)?;
            if json {
                print_json(&summary)?;
            } else {
                print_summary(&summary);
            }
        }
        ProgressAction::Challenge { date, json } => {
            let day = date.unwrap_or_else(|| Local::now().date_naive());
            let challenge = daily_challenge(&day);
            if json {
                return print_json(challenge);
            }
            println!("{} ({} points) {}", challenge.name, challenge.points, challenge.hashtag);
            println!("{}", challenge.description);
            for rule in challenge.rules {
                println!("  - {rule}");
            }
        }
    }
    Ok(())
}

/// Progress service with the streak source the account settings call for.
fn open_progress(db: &Database) -> Result<ProgressService<'_>, Box<dyn std::error::Error>> {
    let config = Config::load()?;
    let auth = AuthState::from_user_id(config.account.user_id.as_deref());
    let snapshot = match config.account.cloud_snapshot {
        Some(path) => path,
        None => data_dir()?.join("cloud.json"),
    };
    debug!(?auth, snapshot = %snapshot.display(), "selecting streak source");
    let streaks = streak_source_for(&auth, SnapshotCloudRecords::new(snapshot), db);
    Ok(ProgressService::new(db, streaks))
}

fn print_outcome(outcome: &LogOutcome) {
    println!(
        "+{} points for {}",
        outcome.activity.points,
        outcome.activity.action.label()
    );
    if let Some(award) = &outcome.streak_award {
        println!("+{} points: {}-day streak!", award.points, outcome.streak);
    }
    for badge in &outcome.new_badges {
        let info = badge.badge();
        println!("{} Achievement unlocked: {} (+{})", info.icon, info.name, badge.points);
    }
    if let Some(level) = outcome.level_up {
        println!("Level up! You're now a {}", level.name);
    }
    println!("total: {} points, streak: {} day(s)", outcome.total_points, outcome.streak);
}

fn print_summary(summary: &ProgressSummary) {
    println!(
        "level {} {} - {} points ({} today)",
        summary.level.level, summary.level.name, summary.total_points, summary.points_today
    );
    if let Some(next) = summary.next_level {
        println!("next level: {} at {} points", next.name, next.min_points);
    }
    println!(
        "next milestone: {} ({} points to go, {:.0}%)",
        summary.milestone.reward,
        summary.milestone.points_needed,
        summary.milestone.progress * 100.0
    );
    println!(
        "streak: {} day(s), longest {}, bonus +{} ({})",
        summary.streak, summary.longest_streak, summary.streak_bonus, summary.streak_source
    );
    println!(
        "meals: {}, shared: {}, saved ${:.2}, waste prevented {:.1} lb",
        summary.stats.meals_created,
        summary.stats.recipes_shared,
        summary.stats.money_saved,
        summary.stats.food_waste_prevented
    );
    if summary.badges.is_empty() {
        println!("badges: none yet");
    } else {
        println!("badges:");
        for badge in &summary.badges {
            let info = badge.badge();
            println!("  {} {} ({:?})", info.icon, info.name, info.rarity);
        }
    }
    println!("today's challenge: {}", summary.challenge.name);
}
