//! The daily cooking challenge.

use chrono::Datelike;
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ChallengeKind {
    IngredientLimit,
    TimeLimit,
    Cuisine,
    Leftover,
    Healthy,
}

#[derive(Debug, PartialEq, Serialize)]
pub struct DailyChallenge {
    pub kind: ChallengeKind,
    pub name: &'static str,
    pub description: &'static str,
    pub rules: &'static [&'static str],
    pub points: u32,
    pub hashtag: &'static str,
}

pub static DAILY_CHALLENGES: [DailyChallenge; 5] = [
    DailyChallenge {
        kind: ChallengeKind::IngredientLimit,
        name: "5-Ingredient Challenge",
        description: "Create a delicious meal using only 5 ingredients or less",
        rules: &[
            "Use maximum 5 ingredients",
            "Salt, pepper, and oil don't count",
            "Share the final result",
        ],
        points: 50,
        hashtag: "#5IngredientChallenge",
    },
    DailyChallenge {
        kind: ChallengeKind::TimeLimit,
        name: "15-Minute Meal Sprint",
        description: "Make a complete meal in 15 minutes or less",
        rules: &[
            "Total cook time under 15 minutes",
            "Must be a full meal",
            "Include prep time",
        ],
        points: 60,
        hashtag: "#15MinuteMeals",
    },
    DailyChallenge {
        kind: ChallengeKind::Cuisine,
        name: "Around the World",
        description: "Create a dish from a different cuisine using your fridge items",
        rules: &[
            "Choose any world cuisine",
            "Use authentic techniques",
            "Explain the inspiration",
        ],
        points: 70,
        hashtag: "#AroundTheWorldChallenge",
    },
    DailyChallenge {
        kind: ChallengeKind::Leftover,
        name: "Leftover Transformation",
        description: "Turn yesterday's leftovers into today's masterpiece",
        rules: &[
            "Use at least 50% leftovers",
            "Create something completely different",
            "No additional shopping",
        ],
        points: 80,
        hashtag: "#LeftoverMagic",
    },
    DailyChallenge {
        kind: ChallengeKind::Healthy,
        name: "Nutrition Champion",
        description: "Create a meal with all 5 food groups",
        rules: &[
            "Include protein, grains, vegetables, fruits, dairy",
            "Keep it under 500 calories",
            "Make it Instagram-worthy",
        ],
        points: 65,
        hashtag: "#HealthyEating",
    },
];

/// Challenge for `day`, chosen by day-of-year (1-based) modulo the challenge count.
pub fn daily_challenge<D: Datelike>(day: &D) -> &'static DailyChallenge {
    &DAILY_CHALLENGES[day.ordinal() as usize % DAILY_CHALLENGES.len()]
}
