//! Longer falling-food runs across a screen full of buttons.

use proptest::prelude::*;
use snapchef_core::physics::{FallingFoodManager, PhysicsConfig, Rect, FRAME_DT};

fn button_screen(seed: u64) -> FallingFoodManager {
    let config = PhysicsConfig {
        seed: Some(seed),
        ..PhysicsConfig::default()
    };
    let mut manager = FallingFoodManager::new(config).unwrap();
    manager.register_obstacle("snap", Rect::new(40.0, 520.0, 310.0, 56.0));
    manager.register_obstacle("history", Rect::new(40.0, 600.0, 150.0, 44.0));
    manager.register_obstacle("profile", Rect::new(200.0, 600.0, 150.0, 44.0));
    manager.start();
    manager
}

#[test]
fn test_same_seed_same_scene() {
    let mut a = button_screen(42);
    let mut b = button_screen(42);
    assert_eq!(a.advance(10.0), 600);
    assert_eq!(b.advance(10.0), 600);
    assert_eq!(a.stats(), b.stats());
    assert_eq!(a.emojis(), b.emojis());
}

#[test]
fn test_thirty_second_scene_stays_within_limits() {
    let mut manager = button_screen(3);
    // Uneven frame times, like a real display link.
    for i in 0..1800 {
        let dt = if i % 3 == 0 { 2.0 * FRAME_DT } else { FRAME_DT / 2.0 };
        manager.advance(dt);
        assert!(manager.emojis().len() <= manager.config().max_emojis);
    }

    let stats = manager.stats();
    assert!(stats.spawned > 0);
    assert!(stats.bounced > 0);
    assert!(stats.despawned > 0);
    assert!(stats.bounced <= stats.spawned);
    assert_eq!(stats.spawned, stats.despawned + manager.emojis().len() as u64);
}

#[test]
fn test_stop_clears_scene_and_resize_moves_floor() {
    let mut manager = button_screen(9);
    manager.advance(2.0);
    assert!(!manager.emojis().is_empty());
    manager.stop();
    assert!(manager.emojis().is_empty());
    assert_eq!(manager.advance(5.0), 0);

    manager.resize(390.0, 200.0).unwrap();
    assert!(manager.resize(0.0, 200.0).is_err());
    manager.clear_obstacles();
    manager.start();
    manager.advance(10.0);
    let limit = 200.0 + manager.config().despawn_margin;
    assert!(manager.emojis().iter().all(|e| e.position.y <= limit));
}

proptest! {
    #[test]
    fn every_glyph_bounces_at_most_once(seed in any::<u64>(), seconds in 1.0f64..20.0) {
        let mut manager = button_screen(seed);
        let steps = manager.advance(seconds);
        let stats = manager.stats();

        prop_assert_eq!(stats.steps, steps as u64);
        prop_assert!(stats.bounced <= stats.spawned);
        prop_assert_eq!(stats.spawned, stats.despawned + manager.emojis().len() as u64);
        for emoji in manager.emojis() {
            if !emoji.has_bounced {
                prop_assert!(emoji.velocity.y >= 0.0);
            }
        }
    }
}
