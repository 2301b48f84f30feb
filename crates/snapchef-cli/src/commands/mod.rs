pub mod config;
pub mod notify;
pub mod physics;
pub mod progress;

use chrono::{DateTime, FixedOffset, Local};
use serde::Serialize;

/// The instant commands evaluate against.
pub enum Clock {
    /// `--now` given on the command line; its offset is the user's zone.
    Fixed(DateTime<FixedOffset>),
    Local(DateTime<Local>),
}

impl Clock {
    pub fn from_arg(now: Option<&str>) -> Result<Self, Box<dyn std::error::Error>> {
        match now {
            Some(value) => {
                let parsed = DateTime::parse_from_rfc3339(value)
                    .map_err(|e| format!("invalid --now '{value}': {e} (expected RFC 3339)"))?;
                Ok(Clock::Fixed(parsed))
            }
            None => Ok(Clock::Local(Local::now())),
        }
    }
}

/// Evaluate `$body` with `$now` bound to the clock's `DateTime`, whatever its zone.
#[macro_export]
macro_rules! with_clock {
    ($clock:expr, |$now:ident| $body:expr) => {
        match $clock {
            $crate::commands::Clock::Fixed($now) => $body,
            $crate::commands::Clock::Local($now) => $body,
        }
    };
}

pub fn print_json<T: Serialize>(value: &T) -> Result<(), Box<dyn std::error::Error>> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// Cloud failures show the generic retry message; everything else as is.
pub fn user_facing(err: snapchef_core::CoreError) -> Box<dyn std::error::Error> {
    err.user_message().into()
}
