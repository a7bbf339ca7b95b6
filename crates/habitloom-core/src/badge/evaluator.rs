//! Badge unlock evaluation.
//!
//! Pure selection over reference data: given the definitions of one
//! category and the unlocks that already exist, pick the single highest
//! tier the current counter value qualifies for. Only that tier unlocks;
//! intermediate tiers passed in the same jump stay locked. Re-evaluating
//! with the same inputs is a no-op, so the evaluator is safe to call
//! speculatively after any streak or counter change.

use super::{BadgeDefinition, UnlockedBadge};

/// The definition with the largest threshold `<= value`, if any.
pub fn best_qualifying<'a>(
    definitions: &'a [BadgeDefinition],
    value: u32,
) -> Option<&'a BadgeDefinition> {
    definitions
        .iter()
        .filter(|d| d.threshold <= value)
        .max_by_key(|d| d.threshold)
}

/// Evaluate a counter change against `definitions`.
///
/// Returns the definition that newly unlocks, or `None` when no tier
/// qualifies or the qualifying tier is already unlocked for this
/// (badge, habit) pair.
pub fn evaluate<'a>(
    definitions: &'a [BadgeDefinition],
    existing: &[UnlockedBadge],
    habit_id: Option<&str>,
    value: u32,
) -> Option<&'a BadgeDefinition> {
    let best = best_qualifying(definitions, value)?;
    let already_unlocked = existing
        .iter()
        .any(|u| u.badge_id == best.id && u.habit_id.as_deref() == habit_id);
    if already_unlocked {
        None
    } else {
        Some(best)
    }
}
