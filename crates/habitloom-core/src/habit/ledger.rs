//! Streak ledger: derives streak counters from the completion log.
//!
//! Both operations are pure over in-memory state: they take the habit, the
//! set of already-completed days, and the calendar day being changed, and
//! leave committing the result to the caller. `today` is always passed in
//! explicitly so the ledger stays deterministic under test.

use std::collections::BTreeSet;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::Habit;

/// Result of a ledger operation, returned to the caller alongside the
/// mutated habit.
///
/// `is_new_record` is derived at the moment the streak changes rather than
/// stored, so it can never drift out of sync with the counters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerOutcome {
    /// Whether the operation changed anything (false on idempotent no-ops)
    pub applied: bool,
    /// Current streak after the operation
    pub streak: u32,
    /// Whether this operation set a new best streak
    pub is_new_record: bool,
    /// Total completions after the operation
    pub total_completions: u32,
}

impl LedgerOutcome {
    fn unchanged(habit: &Habit) -> Self {
        LedgerOutcome {
            applied: false,
            streak: habit.current_streak,
            is_new_record: false,
            total_completions: habit.total_completions,
        }
    }
}

/// Record a completion for `day`.
///
/// Idempotent: if `history` already contains `day`, nothing changes. A
/// completion on the day after `last_completed` extends the streak; a later
/// day (first ever, or after a gap) restarts it at 1. Backfilling a day
/// older than `last_completed` only logs the entry: the current run and
/// `last_completed` are left alone. `best_streak` is a high-water mark and
/// only ever grows.
pub fn append_completion(
    habit: &mut Habit,
    history: &BTreeSet<NaiveDate>,
    day: NaiveDate,
    today: NaiveDate,
) -> LedgerOutcome {
    if history.contains(&day) {
        return LedgerOutcome::unchanged(habit);
    }

    let streak = match habit.last_completed {
        Some(last) if day.pred_opt() == Some(last) => habit.current_streak + 1,
        Some(last) if day < last => habit.current_streak,
        _ => 1,
    };
    let is_new_record = streak > habit.best_streak;

    habit.current_streak = streak;
    habit.best_streak = habit.best_streak.max(streak);
    habit.total_completions += 1;
    habit.last_completed = Some(habit.last_completed.map_or(day, |last| last.max(day)));
    // Backfilling a past day must not clear a flag set by today's entry.
    habit.completed_today = day == today || history.contains(&today);

    LedgerOutcome {
        applied: true,
        streak,
        is_new_record,
        total_completions: habit.total_completions,
    }
}

/// Remove the completion for `day`, if present.
///
/// The streak is recomputed from history rather than decremented blindly:
/// walk backward from `day - 1` counting the unbroken run of completed
/// days. `best_streak` is never reduced; `last_completed` becomes the most
/// recent remaining entry.
pub fn remove_completion(
    habit: &mut Habit,
    history: &BTreeSet<NaiveDate>,
    day: NaiveDate,
    today: NaiveDate,
) -> LedgerOutcome {
    if !history.contains(&day) {
        return LedgerOutcome::unchanged(habit);
    }

    let mut streak = 0u32;
    let mut cursor = day.pred_opt();
    while let Some(d) = cursor {
        if !history.contains(&d) {
            break;
        }
        streak += 1;
        cursor = d.pred_opt();
    }

    habit.current_streak = streak;
    // A run assembled by backfill may never have registered as the current
    // streak; the high-water mark still has to cover it.
    habit.best_streak = habit.best_streak.max(streak);
    habit.total_completions = habit.total_completions.saturating_sub(1);
    habit.last_completed = history.iter().rev().find(|d| **d != day).copied();
    habit.completed_today = day != today && history.contains(&today);

    LedgerOutcome {
        applied: true,
        streak,
        is_new_record: false,
        total_completions: habit.total_completions,
    }
}
