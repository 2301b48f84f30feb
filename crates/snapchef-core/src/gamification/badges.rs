//! Achievement badges and the stats they are judged against.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Estimated savings per home-cooked meal, in dollars.
pub const MONEY_SAVED_PER_MEAL: f64 = 5.0;
/// Estimated food waste prevented per meal, in pounds.
pub const WASTE_PREVENTED_PER_MEAL: f64 = 0.5;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UserStats {
    pub meals_created: u64,
    pub recipes_shared: u64,
    pub cooking_streak: u32,
    pub total_points: u64,
    pub challenges_completed: u64,
    pub challenges_won: u64,
    pub badges_earned: u64,
    pub zero_waste_days: u32,
    pub max_recipe_views: u64,
    pub money_saved: f64,
    pub food_waste_prevented: f64,
}

impl UserStats {
    /// Fill the derived savings estimates from `meals_created`.
    pub fn with_estimates(mut self) -> Self {
        self.money_saved = self.meals_created as f64 * MONEY_SAVED_PER_MEAL;
        self.food_waste_prevented = self.meals_created as f64 * WASTE_PREVENTED_PER_MEAL;
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Rarity {
    Common,
    Uncommon,
    Rare,
    Epic,
    Legendary,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BadgeId {
    FirstMeal,
    WeekWarrior,
    SocialChef,
    ZeroHero,
    ViralSensation,
    MasterChef,
    PennyPincher,
    ChallengeChampion,
}

impl BadgeId {
    pub fn as_str(self) -> &'static str {
        self.badge().key
    }

    pub fn badge(self) -> &'static Badge {
        // BADGES is declared in BadgeId order.
        &BADGES[self as usize]
    }
}

impl fmt::Display for BadgeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BadgeId {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        BADGES
            .iter()
            .find(|b| b.key == s)
            .map(|b| b.id)
            .ok_or_else(|| format!("unknown badge: {s}"))
    }
}

#[derive(Debug, PartialEq, Serialize)]
pub struct Badge {
    pub id: BadgeId,
    #[serde(skip)]
    key: &'static str,
    pub name: &'static str,
    pub icon: &'static str,
    pub description: &'static str,
    pub points: u32,
    pub rarity: Rarity,
}

impl Badge {
    /// Whether `stats` satisfy this badge's condition.
    pub fn is_earned(&self, stats: &UserStats) -> bool {
        match self.id {
            BadgeId::FirstMeal => stats.meals_created >= 1,
            BadgeId::WeekWarrior => stats.cooking_streak >= 7,
            BadgeId::SocialChef => stats.recipes_shared >= 10,
            BadgeId::ZeroHero => stats.zero_waste_days >= 7,
            BadgeId::ViralSensation => stats.max_recipe_views >= 1000,
            BadgeId::MasterChef => stats.meals_created >= 100,
            BadgeId::PennyPincher => stats.money_saved >= 100.0,
            BadgeId::ChallengeChampion => stats.challenges_won >= 5,
        }
    }
}

pub static BADGES: [Badge; 8] = [
    Badge {
        id: BadgeId::FirstMeal,
        key: "first_meal",
        name: "First Meal",
        icon: "🍳",
        description: "Created your first meal",
        points: 50,
        rarity: Rarity::Common,
    },
    Badge {
        id: BadgeId::WeekWarrior,
        key: "week_warrior",
        name: "Week Warrior",
        icon: "📅",
        description: "7-day cooking streak",
        points: 100,
        rarity: Rarity::Rare,
    },
    Badge {
        id: BadgeId::SocialChef,
        key: "social_chef",
        name: "Social Chef",
        icon: "📱",
        description: "Shared 10 recipes",
        points: 75,
        rarity: Rarity::Uncommon,
    },
    Badge {
        id: BadgeId::ZeroHero,
        key: "zero_hero",
        name: "Zero Hero",
        icon: "♻️",
        description: "Zero waste for a week",
        points: 200,
        rarity: Rarity::Epic,
    },
    Badge {
        id: BadgeId::ViralSensation,
        key: "viral_sensation",
        name: "Viral Sensation",
        icon: "🔥",
        description: "Recipe got 1K+ views",
        points: 500,
        rarity: Rarity::Legendary,
    },
    Badge {
        id: BadgeId::MasterChef,
        key: "master_chef",
        name: "Master Chef",
        icon: "👨‍🍳",
        description: "Created 100 recipes",
        points: 300,
        rarity: Rarity::Epic,
    },
    Badge {
        id: BadgeId::PennyPincher,
        key: "penny_pincher",
        name: "Penny Pincher",
        icon: "💰",
        description: "Saved $100 on groceries",
        points: 150,
        rarity: Rarity::Rare,
    },
    Badge {
        id: BadgeId::ChallengeChampion,
        key: "challenge_champion",
        name: "Challenge Champion",
        icon: "🏆",
        description: "Won 5 challenges",
        points: 250,
        rarity: Rarity::Epic,
    },
];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EarnedBadge {
    pub id: BadgeId,
    pub points: u32,
    pub earned_at: DateTime<Utc>,
}

impl EarnedBadge {
    pub fn new(id: BadgeId, earned_at: DateTime<Utc>) -> Self {
        Self {
            id,
            points: id.badge().points,
            earned_at,
        }
    }

    pub fn badge(&self) -> &'static Badge {
        self.id.badge()
    }
}

/// Badges whose condition holds and that are not already in `earned`.
pub fn check_badges(stats: &UserStats, earned: &[BadgeId], now: DateTime<Utc>) -> Vec<EarnedBadge> {
    BADGES
        .iter()
        .filter(|b| b.is_earned(stats) && !earned.contains(&b.id))
        .map(|b| EarnedBadge::new(b.id, now))
        .collect()
}
