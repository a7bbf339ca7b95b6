//! Badge reference data and unlock records.
//!
//! [`BadgeDefinition`] rows are immutable reference data seeded by a
//! migration; [`UnlockedBadge`] rows are append-only except for the
//! `highlighted` flag, which an explicit acknowledge action clears.

pub mod catalog;
pub mod evaluator;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Which counter a badge threshold applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BadgeCategory {
    /// Consecutive-day streak length
    Streak,
    /// Lifetime completion count
    Completion,
    /// Distinct habits completed on one day
    Variety,
    /// One-off milestones
    Achievement,
    /// Seasonal or special events
    Event,
}

impl BadgeCategory {
    /// Stable string form used in the database.
    pub fn as_str(&self) -> &'static str {
        match self {
            BadgeCategory::Streak => "streak",
            BadgeCategory::Completion => "completion",
            BadgeCategory::Variety => "variety",
            BadgeCategory::Achievement => "achievement",
            BadgeCategory::Event => "event",
        }
    }
}

/// Rarity tier of a badge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BadgeRarity {
    Common,
    Rare,
    Epic,
    Legendary,
}

impl BadgeRarity {
    /// Stable string form used in the database.
    pub fn as_str(&self) -> &'static str {
        match self {
            BadgeRarity::Common => "common",
            BadgeRarity::Rare => "rare",
            BadgeRarity::Epic => "epic",
            BadgeRarity::Legendary => "legendary",
        }
    }
}

/// Immutable badge reference data.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BadgeDefinition {
    /// Stable slug identifier, e.g. `streak-7`
    pub id: String,

    /// Display name
    pub name: String,

    /// Counter this badge's threshold applies to
    pub category: BadgeCategory,

    /// Rarity tier
    pub rarity: BadgeRarity,

    /// Counter value at which the badge unlocks
    pub threshold: u32,

    /// Hidden from listings until unlocked
    pub secret: bool,
}

/// A badge earned by the user, optionally scoped to one habit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UnlockedBadge {
    /// Unique identifier (UUID v4)
    pub id: String,

    /// The definition that unlocked
    pub badge_id: String,

    /// Habit the unlock belongs to, if habit-scoped
    pub habit_id: Option<String>,

    /// When the unlock happened
    pub unlocked_at: DateTime<Utc>,

    /// True until the user acknowledges the unlock
    pub highlighted: bool,

    /// Counter value at unlock time
    pub value_at_unlock: Option<u32>,
}

impl UnlockedBadge {
    /// Create a freshly unlocked, still-highlighted badge record.
    pub fn new(badge_id: impl Into<String>, habit_id: Option<String>, value: u32) -> Self {
        UnlockedBadge {
            id: Uuid::new_v4().to_string(),
            badge_id: badge_id.into(),
            habit_id,
            unlocked_at: Utc::now(),
            highlighted: true,
            value_at_unlock: Some(value),
        }
    }
}
