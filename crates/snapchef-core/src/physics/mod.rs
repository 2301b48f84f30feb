//! Decorative falling-food physics.
//!
//! A tiny fixed-step simulation: food emoji fall under gravity and bounce
//! once off the buttons the UI registers. Nothing here affects app data; the
//! renderer just reads [`FallingFoodManager::emojis`] every frame.

mod falling_food;
mod geometry;

pub use falling_food::{
    FallingFoodEmoji, FallingFoodManager, PhysicsConfig, PhysicsStats, FOOD_GLYPHS, FRAME_DT,
    MAX_ADVANCE_SECONDS, MAX_GRAVITY, MAX_SPAWN_INTERVAL, MAX_SPEED,
};
pub use geometry::{Rect, Vec2};
