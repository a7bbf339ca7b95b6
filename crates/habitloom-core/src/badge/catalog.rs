//! Built-in badge catalog.
//!
//! Seeded into the database by a migration with stable slug ids, so
//! re-running the seed is a no-op and unlock rows keep pointing at the
//! same definitions across versions.

use super::{BadgeCategory, BadgeDefinition, BadgeRarity};

fn badge(
    id: &str,
    name: &str,
    category: BadgeCategory,
    rarity: BadgeRarity,
    threshold: u32,
    secret: bool,
) -> BadgeDefinition {
    BadgeDefinition {
        id: id.to_string(),
        name: name.to_string(),
        category,
        rarity,
        threshold,
        secret,
    }
}

/// The full built-in badge catalog.
pub fn default_definitions() -> Vec<BadgeDefinition> {
    use BadgeCategory::*;
    use BadgeRarity::*;

    vec![
        // Streak tiers
        badge("streak-3", "Warming Up", Streak, Common, 3, false),
        badge("streak-7", "One Week Strong", Streak, Common, 7, false),
        badge("streak-30", "Habit Formed", Streak, Rare, 30, false),
        badge("streak-100", "Century Streak", Streak, Epic, 100, false),
        badge("streak-365", "Year of Discipline", Streak, Legendary, 365, false),
        // Completion tiers
        badge("completion-1", "First Step", Completion, Common, 1, false),
        badge("completion-10", "Getting Going", Completion, Common, 10, false),
        badge("completion-50", "Half Century", Completion, Rare, 50, false),
        badge("completion-250", "Devoted", Completion, Epic, 250, false),
        badge("completion-1000", "Thousand Club", Completion, Legendary, 1000, false),
        // Variety tiers (distinct habits completed in one day)
        badge("variety-3", "Juggler", Variety, Common, 3, false),
        badge("variety-5", "Renaissance", Variety, Rare, 5, false),
        // Achievements
        badge("achievement-comeback", "Comeback", Achievement, Rare, 1, true),
        badge("achievement-perfect-week", "Perfect Week", Achievement, Epic, 7, false),
        // Events
        badge("event-first-light", "First Light", Event, Common, 1, true),
    ]
}
