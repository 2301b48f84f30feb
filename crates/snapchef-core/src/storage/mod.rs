mod config;
pub mod database;
pub mod migrations;

pub use config::{AccountConfig, Config};
pub use database::{ActivityRecord, Database};

use std::path::PathBuf;

use crate::error::Result;

/// Returns `~/.config/snapchef[-dev]/` based on SNAPCHEF_ENV.
///
/// Set SNAPCHEF_ENV=dev to use development data directory. SNAPCHEF_DATA_DIR
/// overrides both.
///
/// # Errors
/// Returns an error if creating the directory fails.
pub fn data_dir() -> Result<PathBuf> {
    let dir = match std::env::var_os("SNAPCHEF_DATA_DIR") {
        Some(dir) if !dir.is_empty() => PathBuf::from(dir),
        _ => {
            let base_dir = dirs::home_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join(".config");

            let env = std::env::var("SNAPCHEF_ENV").unwrap_or_else(|_| "production".to_string());

            if env == "dev" {
                base_dir.join("snapchef-dev")
            } else {
                base_dir.join("snapchef")
            }
        }
    };

    std::fs::create_dir_all(&dir)?;
    Ok(dir)
}
