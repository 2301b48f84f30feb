//! Notification scheduling and audit commands.

use chrono::{DateTime, TimeZone, Utc};
use clap::Subcommand;
use serde::Serialize;
use snapchef_core::notifications::{
    next_monthly_slot, MonthKey, NotificationAuditReport, NotificationCategory, NotificationCenter,
    NotificationManager, SendTime,
};
use snapchef_core::storage::{Config, Database};

use super::{print_json, Clock};

#[derive(Subcommand)]
pub enum NotifyAction {
    /// Show the normalized send time and where the next monthly slot falls
    Plan {
        /// Evaluate at this instant (RFC 3339) instead of the local clock
        #[arg(long)]
        now: Option<String>,
        #[arg(long)]
        json: bool,
    },
    /// Reserve the next monthly engagement slot
    Schedule {
        #[arg(long)]
        now: Option<String>,
        #[arg(long)]
        json: bool,
    },
    /// Audit pending notifications against the monthly policy
    Audit {
        #[arg(long)]
        now: Option<String>,
        #[arg(long)]
        json: bool,
    },
    /// Remove pending monthly notifications and schedule the next slot again
    Rebuild {
        #[arg(long)]
        now: Option<String>,
        #[arg(long)]
        json: bool,
    },
    /// List pending notifications
    List {
        #[arg(long)]
        json: bool,
    },
    /// Schedule a transactional notification
    Add {
        /// challenge_reminder, streak_reminder or achievement_unlocked
        category: NotificationCategory,
        title: String,
        #[arg(long, default_value = "")]
        body: String,
        /// Delivery time (RFC 3339)
        #[arg(long)]
        at: String,
    },
    /// Remove pending notifications
    Clear {
        /// Only remove monthly engagement notifications
        #[arg(long)]
        monthly_only: bool,
    },
}

#[derive(Serialize)]
struct Plan {
    preferred_hour: i32,
    preferred_minute: i32,
    send_time: String,
    month: MonthKey,
    next_slot: DateTime<Utc>,
    next_slot_local: String,
    engagement_enabled: bool,
}

pub fn run(action: NotifyAction) -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::load()?;
    let db = Database::open()?;
    let mut manager = NotificationManager::new(db, config.notifications.clone());

    match action {
        NotifyAction::Plan { now, json } => {
            let clock = Clock::from_arg(now.as_deref())?;
            let plan = crate::with_clock!(clock, |now| compute_plan(&config, &now));
            if json {
                print_json(&plan)?;
            } else {
                println!(
                    "preferred: {:02}:{:02} -> send at {}",
                    plan.preferred_hour, plan.preferred_minute, plan.send_time
                );
                println!("next slot: {} ({})", plan.next_slot_local, plan.next_slot.to_rfc3339());
                if !plan.engagement_enabled {
                    println!("monthly engagement is disabled; nothing will be scheduled");
                }
            }
        }
        NotifyAction::Schedule { now, json } => {
            let clock = Clock::from_arg(now.as_deref())?;
            let slot = crate::with_clock!(clock, |now| manager.schedule_monthly(&now))?;
            if json {
                print_json(&slot)?;
            } else {
                match slot {
                    Some(slot) if slot.newly_scheduled => {
                        println!("scheduled {} at {}", slot.identifier, slot.fires_at.to_rfc3339())
                    }
                    Some(slot) => println!("{} already reserved", slot.identifier),
                    None => println!("monthly engagement is disabled; nothing scheduled"),
                }
            }
        }
        NotifyAction::Audit { now, json } => {
            let clock = Clock::from_arg(now.as_deref())?;
            let report = crate::with_clock!(clock, |now| manager.refresh_audit(&now).clone());
            print_report(&report, json)?;
        }
        NotifyAction::Rebuild { now, json } => {
            let clock = Clock::from_arg(now.as_deref())?;
            let report = crate::with_clock!(clock, |now| manager.rebuild(&now))?;
            print_report(&report, json)?;
        }
        NotifyAction::List { json } => {
            let pending = manager.center().pending_requests()?;
            if json {
                print_json(&pending)?;
            } else if pending.is_empty() {
                println!("no pending notifications");
            } else {
                for request in &pending {
                    let trigger = request
                        .next_trigger
                        .map(|t| t.to_rfc3339())
                        .unwrap_or_else(|| "-".to_string());
                    println!(
                        "{}\t{}\t{}\t{}",
                        request.identifier, request.category, trigger, request.title
                    );
                }
            }
        }
        NotifyAction::Add {
            category,
            title,
            body,
            at,
        } => {
            let fires_at = DateTime::parse_from_rfc3339(&at)
                .map_err(|e| format!("invalid --at '{at}': {e} (expected RFC 3339)"))?
                .with_timezone(&Utc);
            match manager.schedule_transactional(category, &title, &body, fires_at)? {
                Some(identifier) => println!("scheduled {identifier}"),
                None => println!("{category} notifications are disabled; nothing scheduled"),
            }
        }
        NotifyAction::Clear { monthly_only } => {
            let mut db = manager.into_center();
            let ids: Vec<String> = db
                .pending_requests()?
                .into_iter()
                .filter(|r| !monthly_only || r.is_monthly())
                .map(|r| r.identifier)
                .collect();
            db.remove(&ids)?;
            println!("removed {} pending notification(s)", ids.len());
        }
    }
    Ok(())
}

fn compute_plan<Tz: TimeZone>(config: &Config, now: &DateTime<Tz>) -> Plan
where
    Tz::Offset: std::fmt::Display,
{
    let prefs = &config.notifications;
    let send_time: SendTime = prefs.send_time();
    let slot = next_monthly_slot(now, send_time);
    Plan {
        preferred_hour: prefs.preferred_hour,
        preferred_minute: prefs.preferred_minute,
        send_time: send_time.to_string(),
        month: MonthKey::of(&slot.naive_local()),
        next_slot: slot.with_timezone(&Utc),
        next_slot_local: slot.format("%Y-%m-%d %H:%M %:z").to_string(),
        engagement_enabled: prefs.allows(NotificationCategory::Engagement),
    }
}

fn print_report(
    report: &NotificationAuditReport,
    json: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    if json {
        return print_json(report);
    }

    println!(
        "pending: {} (monthly {}, transactional {})",
        report.pending_count, report.monthly_count, report.transactional_count
    );
    match report.reserved_month {
        Some(month) => println!("reserved month: {month}"),
        None => println!("reserved month: none"),
    }
    if let Some(slot) = report.next_monthly_slot {
        println!("next monthly slot: {}", slot.to_rfc3339());
    }
    for item in &report.items {
        let local = item
            .local_trigger
            .map(|t| t.format("%Y-%m-%d %H:%M").to_string())
            .unwrap_or_else(|| "-".to_string());
        let mark = if item.compliant { "ok" } else { "!!" };
        println!("  [{mark}] {} {} {}", item.identifier, item.policy, local);
    }
    if report.is_healthy {
        println!("status: healthy");
    } else {
        println!("status: {} violation(s)", report.violations.len());
        for violation in &report.violations {
            println!("  - {violation}");
        }
    }
    for conflict in &report.quiet_hours_conflicts {
        println!("  quiet hours: {conflict}");
    }
    Ok(())
}
