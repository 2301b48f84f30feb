//! Headless runs of the falling-food animation.

use clap::Subcommand;
use serde::Serialize;
use snapchef_core::physics::{
    FallingFoodEmoji, FallingFoodManager, PhysicsStats, Rect, MAX_ADVANCE_SECONDS,
};
use snapchef_core::storage::Config;

use super::print_json;

#[derive(Subcommand)]
pub enum PhysicsAction {
    /// Run the simulation for a while and report what happened
    Simulate {
        /// Simulated seconds (at most 600)
        #[arg(long, default_value_t = 5.0)]
        seconds: f64,
        /// RNG seed for a reproducible run
        #[arg(long)]
        seed: Option<u64>,
        /// Button rectangle glyphs can bounce off (repeatable)
        #[arg(long = "obstacle", value_name = "X,Y,W,H")]
        obstacles: Vec<Rect>,
        #[arg(long)]
        width: Option<f64>,
        #[arg(long)]
        height: Option<f64>,
        #[arg(long)]
        json: bool,
    },
}

#[derive(Serialize)]
struct SimulationReport<'a> {
    seconds: f64,
    steps: usize,
    stats: PhysicsStats,
    emojis: &'a [FallingFoodEmoji],
}

pub fn run(action: PhysicsAction) -> Result<(), Box<dyn std::error::Error>> {
    match action {
        PhysicsAction::Simulate {
            seconds,
            seed,
            obstacles,
            width,
            height,
            json,
        } => {
            if !(0.0..=MAX_ADVANCE_SECONDS).contains(&seconds) {
                return Err(format!(
                    "--seconds must be between 0 and {MAX_ADVANCE_SECONDS}, got {seconds}"
                )
                .into());
            }

            let mut config = Config::load()?.physics;
            if seed.is_some() {
                config.seed = seed;
            }
            if let Some(width) = width {
                config.screen_width = width;
            }
            if let Some(height) = height {
                config.screen_height = height;
            }

            let mut manager = FallingFoodManager::new(config)?;
            for (i, rect) in obstacles.into_iter().enumerate() {
                manager.register_obstacle(format!("button-{i}"), rect);
            }
            manager.start();
            let steps = manager.advance(seconds);

            let report = SimulationReport {
                seconds,
                steps,
                stats: manager.stats(),
                emojis: manager.emojis(),
            };
            if json {
                print_json(&report)?;
            } else {
                println!("simulated {seconds}s in {steps} steps");
                println!(
                    "spawned {}, bounced {}, despawned {}, on screen {}",
                    report.stats.spawned,
                    report.stats.bounced,
                    report.stats.despawned,
                    report.emojis.len()
                );
                for emoji in report.emojis {
                    println!(
                        "  #{} {} at ({:.1}, {:.1}) v=({:.1}, {:.1}){}",
                        emoji.id,
                        emoji.glyph,
                        emoji.position.x,
                        emoji.position.y,
                        emoji.velocity.x,
                        emoji.velocity.y,
                        if emoji.has_bounced { " bounced" } else { "" }
                    );
                }
            }
        }
    }
    Ok(())
}
