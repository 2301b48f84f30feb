//! Chef levels and point milestones.

use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Level {
    pub level: u8,
    pub name: &'static str,
    pub min_points: u64,
}

pub const LEVELS: [Level; 10] = [
    Level { level: 1, name: "Novice Chef", min_points: 0 },
    Level { level: 2, name: "Home Cook", min_points: 100 },
    Level { level: 3, name: "Kitchen Expert", min_points: 300 },
    Level { level: 4, name: "Recipe Master", min_points: 600 },
    Level { level: 5, name: "Culinary Artist", min_points: 1000 },
    Level { level: 6, name: "Food Wizard", min_points: 1500 },
    Level { level: 7, name: "Master Chef", min_points: 2500 },
    Level { level: 8, name: "Celebrity Chef", min_points: 4000 },
    Level { level: 9, name: "Iron Chef", min_points: 6000 },
    Level { level: 10, name: "Legendary Chef", min_points: 10000 },
];

/// Highest level reached with `points`.
pub fn level_for(points: u64) -> Level {
    LEVELS
        .iter()
        .rev()
        .find(|l| points >= l.min_points)
        .copied()
        .unwrap_or(LEVELS[0])
}

/// The level after `level`, if any.
pub fn next_level(level: u8) -> Option<Level> {
    LEVELS.iter().find(|l| l.level > level).copied()
}

/// Highest level above `current_level` that `total_points` reaches.
pub fn check_level_up(current_level: u8, total_points: u64) -> Option<Level> {
    let reached = level_for(total_points);
    (reached.level > current_level).then_some(reached)
}

const MILESTONES: [(u64, &str); 6] = [
    (100, "Unlock recipe filters"),
    (250, "Custom meal preferences"),
    (500, "Priority support"),
    (1000, "Beta features access"),
    (2000, "VIP community status"),
    (5000, "SnapChef Ambassador"),
];

const FINAL_MILESTONE_POINTS: u64 = 10000;
const FINAL_MILESTONE_REWARD: &str = "Legendary Status";

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Milestone {
    pub reward: &'static str,
    pub total_points: u64,
    pub points_needed: u64,
    /// Fraction of the way there, 0.0 to 1.0.
    pub progress: f64,
}

/// The first milestone not yet reached.
pub fn next_milestone(points: u64) -> Milestone {
    MILESTONES
        .iter()
        .find(|(threshold, _)| points < *threshold)
        .map(|&(threshold, reward)| Milestone {
            reward,
            total_points: threshold,
            points_needed: threshold - points,
            progress: points as f64 / threshold as f64,
        })
        .unwrap_or(Milestone {
            reward: FINAL_MILESTONE_REWARD,
            total_points: FINAL_MILESTONE_POINTS,
            points_needed: 0,
            progress: 1.0,
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn level_thresholds() {
        assert_eq!(level_for(0).name, "Novice Chef");
        assert_eq!(level_for(99).level, 1);
        assert_eq!(level_for(100).name, "Home Cook");
        assert_eq!(level_for(2499).name, "Food Wizard");
        assert_eq!(level_for(50_000).name, "Legendary Chef");
    }

    #[test]
    fn level_up_returns_highest_new_level() {
        assert_eq!(check_level_up(1, 50), None);
        assert_eq!(check_level_up(1, 120).map(|l| l.level), Some(2));
        assert_eq!(check_level_up(1, 700).map(|l| l.name), Some("Recipe Master"));
        assert_eq!(check_level_up(4, 700), None);
    }

    #[test]
    fn next_level_after_top_is_none() {
        assert_eq!(next_level(1).map(|l| l.min_points), Some(100));
        assert_eq!(next_level(10), None);
    }

    #[test]
    fn next_milestone_calculation() {
        let milestone = next_milestone(150);
        assert_eq!(milestone.points_needed, 100);
        assert_eq!(milestone.total_points, 250);
        assert_eq!(milestone.reward, "Custom meal preferences");
        assert!((milestone.progress - 0.6).abs() < 1e-12);
    }

    #[test]
    fn exact_threshold_moves_to_next_milestone() {
        assert_eq!(next_milestone(100).total_points, 250);
    }

    #[test]
    fn max_milestone_reached() {
        let milestone = next_milestone(10000);
        assert_eq!(milestone.points_needed, 0);
        assert_eq!(milestone.total_points, 10000);
        assert_eq!(milestone.reward, "Legendary Status");
        assert_eq!(milestone.progress, 1.0);
    }
}
