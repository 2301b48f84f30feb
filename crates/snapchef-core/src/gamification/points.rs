//! Point awards and the running points ledger.

use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Actions that earn points.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PointAction {
    UploadPhoto,
    GenerateMeal,
    CookMeal,
    ShareRecipe,
    CompleteDailyChallenge,
    CompleteWeeklyChallenge,
    MaintainStreak7,
    MaintainStreak30,
    FirstRecipe,
    ReferralSignup,
    GetUpvote,
    WinContest,
}

impl PointAction {
    pub const ALL: [PointAction; 12] = [
        PointAction::UploadPhoto,
        PointAction::GenerateMeal,
        PointAction::CookMeal,
        PointAction::ShareRecipe,
        PointAction::CompleteDailyChallenge,
        PointAction::CompleteWeeklyChallenge,
        PointAction::MaintainStreak7,
        PointAction::MaintainStreak30,
        PointAction::FirstRecipe,
        PointAction::ReferralSignup,
        PointAction::GetUpvote,
        PointAction::WinContest,
    ];

    /// Points awarded for one occurrence.
    pub fn points(self) -> u32 {
        match self {
            PointAction::UploadPhoto => 5,
            PointAction::GenerateMeal => 10,
            PointAction::CookMeal => 20,
            PointAction::ShareRecipe => 10,
            PointAction::CompleteDailyChallenge => 50,
            PointAction::CompleteWeeklyChallenge => 200,
            PointAction::MaintainStreak7 => 100,
            PointAction::MaintainStreak30 => 500,
            PointAction::FirstRecipe => 50,
            PointAction::ReferralSignup => 50,
            PointAction::GetUpvote => 2,
            PointAction::WinContest => 300,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            PointAction::UploadPhoto => "upload_photo",
            PointAction::GenerateMeal => "generate_meal",
            PointAction::CookMeal => "cook_meal",
            PointAction::ShareRecipe => "share_recipe",
            PointAction::CompleteDailyChallenge => "complete_daily_challenge",
            PointAction::CompleteWeeklyChallenge => "complete_weekly_challenge",
            PointAction::MaintainStreak7 => "maintain_streak_7",
            PointAction::MaintainStreak30 => "maintain_streak_30",
            PointAction::FirstRecipe => "first_recipe",
            PointAction::ReferralSignup => "referral_signup",
            PointAction::GetUpvote => "get_upvote",
            PointAction::WinContest => "win_contest",
        }
    }

    /// "cook meal" style label for messages.
    pub fn label(self) -> String {
        self.as_str().replace('_', " ")
    }
}

impl fmt::Display for PointAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PointAction {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase().replace('-', "_");
        PointAction::ALL
            .into_iter()
            .find(|a| a.as_str() == normalized)
            .ok_or_else(|| format!("unknown action: {s}"))
    }
}

/// Running total plus the points earned on the most recent day.
///
/// The daily counter resets when an award arrives for a later day. Awards
/// for an earlier day only count toward the total.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PointsLedger {
    total: u64,
    today: u64,
    day: Option<NaiveDate>,
}

impl PointsLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Award the points for `action` on `day`. Returns the points added.
    pub fn award(&mut self, action: PointAction, day: NaiveDate) -> u32 {
        let points = action.points();
        self.add(points, day);
        points
    }

    /// Add a raw amount (badge rewards and the like).
    pub fn add(&mut self, points: u32, day: NaiveDate) {
        let points = u64::from(points);
        match self.day {
            Some(current) if current == day => self.today += points,
            Some(current) if day < current => {}
            _ => {
                self.day = Some(day);
                self.today = points;
            }
        }
        self.total += points;
    }

    pub fn total(&self) -> u64 {
        self.total
    }

    /// Points earned on `day`, zero if the ledger has moved past it or never reached it.
    pub fn points_on(&self, day: NaiveDate) -> u64 {
        if self.day == Some(day) {
            self.today
        } else {
            0
        }
    }
}
