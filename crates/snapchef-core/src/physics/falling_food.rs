//! Falling food emoji simulation.
//!
//! Glyphs spawn above the top edge at random intervals, fall under gravity,
//! bounce once off any registered button rectangle they land on, and are
//! dropped after leaving the bottom of the screen. The simulation advances in
//! fixed 1/60 s steps regardless of how the caller's frame clock jitters.

use std::collections::BTreeMap;

use rand::prelude::*;
use rand_pcg::Mcg128Xsl64;
use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use crate::error::ValidationError;

use super::geometry::{Rect, Vec2};

/// Fixed simulation step.
pub const FRAME_DT: f64 = 1.0 / 60.0;

/// Gap left between a bounced glyph and the rectangle it bounced off.
const SNAP_GAP: f64 = 1.0;

/// Longest stretch of time a single [`FallingFoodManager::advance`] call
/// simulates. Anything beyond it is dropped.
pub const MAX_ADVANCE_SECONDS: f64 = 600.0;

/// Upper bound for initial speeds and bounce jitter, in points per second.
pub const MAX_SPEED: f64 = 10_000.0;

/// Upper bound for gravity, in points per second squared.
pub const MAX_GRAVITY: f64 = 100_000.0;

/// Upper bound for either spawn interval, in seconds.
pub const MAX_SPAWN_INTERVAL: f64 = 3_600.0;

pub const FOOD_GLYPHS: [&str; 12] = [
    "🍕", "🍔", "🌮", "🥗", "🍝", "🍣", "🥑", "🍩", "🥕", "🍎", "🧀", "🍳",
];

/// Tuning for the simulation. Units are points and seconds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PhysicsConfig {
    #[serde(default = "default_screen_width")]
    pub screen_width: f64,
    #[serde(default = "default_screen_height")]
    pub screen_height: f64,
    #[serde(default = "default_gravity")]
    pub gravity: f64,
    /// Fraction of vertical speed kept after a bounce.
    #[serde(default = "default_bounce_damping")]
    pub bounce_damping: f64,
    /// Max horizontal speed added (either way) on bounce.
    #[serde(default = "default_bounce_jitter")]
    pub bounce_jitter: f64,
    #[serde(default = "default_max_initial_vx")]
    pub max_initial_vx: f64,
    #[serde(default = "default_max_initial_vy")]
    pub max_initial_vy: f64,
    #[serde(default = "default_spawn_interval_min")]
    pub spawn_interval_min: f64,
    #[serde(default = "default_spawn_interval_max")]
    pub spawn_interval_max: f64,
    #[serde(default = "default_emoji_size")]
    pub emoji_size: f64,
    #[serde(default = "default_despawn_margin")]
    pub despawn_margin: f64,
    #[serde(default = "default_max_emojis")]
    pub max_emojis: usize,
    /// Fixed RNG seed for reproducible runs.
    #[serde(default)]
    pub seed: Option<u64>,
}

fn default_screen_width() -> f64 {
    390.0
}
fn default_screen_height() -> f64 {
    844.0
}
fn default_gravity() -> f64 {
    400.0
}
fn default_bounce_damping() -> f64 {
    0.6
}
fn default_bounce_jitter() -> f64 {
    80.0
}
fn default_max_initial_vx() -> f64 {
    40.0
}
fn default_max_initial_vy() -> f64 {
    60.0
}
fn default_spawn_interval_min() -> f64 {
    0.4
}
fn default_spawn_interval_max() -> f64 {
    1.2
}
fn default_emoji_size() -> f64 {
    32.0
}
fn default_despawn_margin() -> f64 {
    50.0
}
fn default_max_emojis() -> usize {
    24
}

impl Default for PhysicsConfig {
    fn default() -> Self {
        Self {
            screen_width: default_screen_width(),
            screen_height: default_screen_height(),
            gravity: default_gravity(),
            bounce_damping: default_bounce_damping(),
            bounce_jitter: default_bounce_jitter(),
            max_initial_vx: default_max_initial_vx(),
            max_initial_vy: default_max_initial_vy(),
            spawn_interval_min: default_spawn_interval_min(),
            spawn_interval_max: default_spawn_interval_max(),
            emoji_size: default_emoji_size(),
            despawn_margin: default_despawn_margin(),
            max_emojis: default_max_emojis(),
            seed: None,
        }
    }
}

impl PhysicsConfig {
    /// Reject values that would make the simulation meaningless.
    pub fn validate(&self) -> Result<(), ValidationError> {
        let invalid = |field: &str, message: &str| -> Result<(), ValidationError> {
            Err(ValidationError::InvalidValue {
                field: field.to_string(),
                message: message.to_string(),
            })
        };

        let within = |value: f64, max: f64| (0.0..=max).contains(&value);

        if !(self.screen_width > 0.0
            && self.screen_height > 0.0
            && self.screen_width.is_finite()
            && self.screen_height.is_finite())
        {
            return invalid("screen", "width and height must be positive and finite");
        }
        if !within(self.gravity, MAX_GRAVITY) {
            return invalid("gravity", "must be between 0 and 100000");
        }
        if !(0.0..=1.0).contains(&self.bounce_damping) {
            return invalid("bounce_damping", "must be between 0 and 1");
        }
        if !(within(self.bounce_jitter, MAX_SPEED)
            && within(self.max_initial_vx, MAX_SPEED)
            && within(self.max_initial_vy, MAX_SPEED))
        {
            return invalid(
                "velocity",
                "jitter and initial velocity limits must be between 0 and 10000",
            );
        }
        if !(self.spawn_interval_min > 0.0
            && self.spawn_interval_min <= self.spawn_interval_max
            && self.spawn_interval_max <= MAX_SPAWN_INTERVAL)
        {
            return invalid(
                "spawn_interval",
                "min must be positive and not greater than max, max at most 3600",
            );
        }
        if !(self.emoji_size > 0.0 && self.emoji_size.is_finite()) {
            return invalid("emoji_size", "must be positive");
        }
        if !self.despawn_margin.is_finite() {
            return invalid("despawn_margin", "must be finite");
        }
        Ok(())
    }
}

/// One decorative glyph. `position` is the glyph's center.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FallingFoodEmoji {
    pub id: u64,
    pub glyph: String,
    pub position: Vec2,
    pub velocity: Vec2,
    pub size: f64,
    pub has_bounced: bool,
}

impl FallingFoodEmoji {
    pub fn left(&self) -> f64 {
        self.position.x - self.size / 2.0
    }

    pub fn right(&self) -> f64 {
        self.position.x + self.size / 2.0
    }

    pub fn bottom(&self) -> f64 {
        self.position.y + self.size / 2.0
    }
}

/// Running totals since the manager was created.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PhysicsStats {
    pub steps: u64,
    pub spawned: u64,
    pub bounced: u64,
    pub despawned: u64,
}

/// Owns every live glyph and the rectangles they can bounce off.
#[derive(Debug)]
pub struct FallingFoodManager {
    config: PhysicsConfig,
    emojis: Vec<FallingFoodEmoji>,
    obstacles: BTreeMap<String, Rect>,
    rng: Mcg128Xsl64,
    spawn_countdown: f64,
    accumulator: f64,
    next_id: u64,
    running: bool,
    stats: PhysicsStats,
}

impl FallingFoodManager {
    pub fn new(config: PhysicsConfig) -> Result<Self, ValidationError> {
        config.validate()?;
        let rng = match config.seed {
            Some(seed) => Mcg128Xsl64::seed_from_u64(seed),
            None => Mcg128Xsl64::from_entropy(),
        };
        Ok(Self {
            config,
            emojis: Vec::new(),
            obstacles: BTreeMap::new(),
            rng,
            spawn_countdown: 0.0,
            accumulator: 0.0,
            next_id: 0,
            running: false,
            stats: PhysicsStats::default(),
        })
    }

    pub fn config(&self) -> &PhysicsConfig {
        &self.config
    }

    /// Begin spawning. The first glyph arrives after one random interval.
    pub fn start(&mut self) {
        if self.running {
            return;
        }
        self.running = true;
        self.spawn_countdown = self.next_spawn_interval();
        debug!(countdown = self.spawn_countdown, "falling food started");
    }

    /// Stop and drop every live glyph.
    pub fn stop(&mut self) {
        self.running = false;
        self.accumulator = 0.0;
        self.emojis.clear();
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Update the screen size after a layout change.
    pub fn resize(&mut self, width: f64, height: f64) -> Result<(), ValidationError> {
        let mut config = self.config.clone();
        config.screen_width = width;
        config.screen_height = height;
        config.validate()?;
        self.config = config;
        Ok(())
    }

    /// Register (or move) a button rectangle.
    pub fn register_obstacle(&mut self, id: impl Into<String>, rect: Rect) {
        self.obstacles.insert(id.into(), rect);
    }

    pub fn remove_obstacle(&mut self, id: &str) -> Option<Rect> {
        self.obstacles.remove(id)
    }

    pub fn clear_obstacles(&mut self) {
        self.obstacles.clear();
    }

    pub fn obstacles(&self) -> impl Iterator<Item = (&str, &Rect)> {
        self.obstacles.iter().map(|(id, rect)| (id.as_str(), rect))
    }

    pub fn emojis(&self) -> &[FallingFoodEmoji] {
        &self.emojis
    }

    pub fn stats(&self) -> PhysicsStats {
        self.stats
    }

    /// Feed wall-clock time; runs as many fixed steps as it covers, up to
    /// [`MAX_ADVANCE_SECONDS`] worth. Returns the number of steps taken.
    pub fn advance(&mut self, seconds: f64) -> usize {
        if !self.running || !(seconds > 0.0) {
            return 0;
        }
        if seconds > MAX_ADVANCE_SECONDS {
            debug!(seconds, max = MAX_ADVANCE_SECONDS, "advance clamped");
        }
        self.accumulator = (self.accumulator + seconds.min(MAX_ADVANCE_SECONDS)).min(MAX_ADVANCE_SECONDS);
        let mut steps = 0;
        // Small tolerance so 1.0 s is exactly 60 steps despite rounding.
        while self.accumulator + 1e-9 >= FRAME_DT {
            self.step();
            self.accumulator -= FRAME_DT;
            steps += 1;
        }
        self.accumulator = self.accumulator.max(0.0);
        steps
    }

    /// Run one fixed step: spawn, integrate, collide, despawn.
    pub fn step(&mut self) {
        if !self.running {
            return;
        }

        self.spawn_countdown -= FRAME_DT;
        if self.spawn_countdown <= 0.0 {
            self.spawn_random();
            self.spawn_countdown = self.next_spawn_interval();
        }

        let Self {
            config,
            emojis,
            obstacles,
            rng,
            stats,
            ..
        } = self;

        for emoji in emojis.iter_mut() {
            let prev_bottom = emoji.bottom();
            emoji.velocity.y += config.gravity * FRAME_DT;
            emoji.position += emoji.velocity * FRAME_DT;

            if emoji.has_bounced || emoji.velocity.y <= 0.0 {
                continue;
            }

            let new_bottom = emoji.bottom();
            // Topmost crossed rectangle wins.
            let hit = obstacles
                .values()
                .filter(|rect| {
                    rect.overlaps_horizontally(emoji.left(), emoji.right())
                        && prev_bottom <= rect.min_y()
                        && new_bottom >= rect.min_y()
                })
                .min_by(|a, b| a.min_y().total_cmp(&b.min_y()));
            if let Some(rect) = hit {
                emoji.velocity.y = -emoji.velocity.y * config.bounce_damping;
                if config.bounce_jitter > 0.0 {
                    emoji.velocity.x += rng.gen_range(-config.bounce_jitter..=config.bounce_jitter);
                }
                emoji.position.y = rect.min_y() - emoji.size / 2.0 - SNAP_GAP;
                emoji.has_bounced = true;
                stats.bounced += 1;
                trace!(id = emoji.id, top = rect.min_y(), "emoji bounced");
            }
        }

        let limit = config.screen_height + config.despawn_margin;
        let before = emojis.len();
        emojis.retain(|e| e.position.y <= limit);
        stats.despawned += (before - emojis.len()) as u64;
        stats.steps += 1;
    }

    /// Spawn a glyph at a random x above the top edge with random velocity.
    /// Returns `None` when the live cap is reached.
    pub fn spawn_random(&mut self) -> Option<u64> {
        if self.emojis.len() >= self.config.max_emojis {
            return None;
        }
        let half = self.config.emoji_size / 2.0;
        let x = if self.config.screen_width > self.config.emoji_size {
            self.rng.gen_range(half..=self.config.screen_width - half)
        } else {
            self.config.screen_width / 2.0
        };
        let vx = symmetric(&mut self.rng, self.config.max_initial_vx);
        let vy = if self.config.max_initial_vy > 0.0 {
            self.rng.gen_range(0.0..=self.config.max_initial_vy)
        } else {
            0.0
        };
        Some(self.spawn_at(x, Vec2::new(vx, vy)))
    }

    /// Spawn a glyph at horizontal position `x` just above the top edge.
    pub fn spawn_at(&mut self, x: f64, velocity: Vec2) -> u64 {
        let glyph = FOOD_GLYPHS
            .choose(&mut self.rng)
            .copied()
            .unwrap_or(FOOD_GLYPHS[0]);
        let id = self.next_id;
        self.next_id += 1;
        self.emojis.push(FallingFoodEmoji {
            id,
            glyph: glyph.to_string(),
            position: Vec2::new(x, -self.config.emoji_size),
            velocity,
            size: self.config.emoji_size,
            has_bounced: false,
        });
        self.stats.spawned += 1;
        id
    }

    fn next_spawn_interval(&mut self) -> f64 {
        self.rng
            .gen_range(self.config.spawn_interval_min..=self.config.spawn_interval_max)
    }
}

fn symmetric(rng: &mut Mcg128Xsl64, limit: f64) -> f64 {
    if limit > 0.0 {
        rng.gen_range(-limit..=limit)
    } else {
        0.0
    }
}
