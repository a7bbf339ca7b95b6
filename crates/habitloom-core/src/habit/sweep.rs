//! Daily maintenance sweep.
//!
//! Invoked by an external scheduler once per local-midnight boundary, and
//! safe to run zero or more times for the same day or several days late.
//! Two independent phases over disjoint fields:
//!
//! - roll every habit's `completed_today` flag back to false
//! - zero `current_streak` where the gap since `last_completed` exceeds
//!   one day, leaving `best_streak`, `total_completions`, and
//!   `last_completed` untouched

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::store::{HabitStore, LogDelta};

/// What a sweep run touched.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SweepSummary {
    /// Habits examined
    pub examined: usize,
    /// Habits whose row changed and was committed
    pub updated: usize,
    /// Habits whose streak was reset by break detection
    pub streaks_broken: usize,
}

/// Run the sweep for the day boundary at `today`.
///
/// Idempotent: a second run for the same day finds nothing left to change
/// and commits nothing.
pub fn run<S: HabitStore>(store: &mut S, today: NaiveDate) -> Result<SweepSummary> {
    let mut summary = SweepSummary::default();

    for mut habit in store.list_habits(true)? {
        summary.examined += 1;
        let mut dirty = false;

        if habit.completed_today {
            habit.completed_today = false;
            dirty = true;
        }

        if let Some(last) = habit.last_completed {
            if (today - last).num_days() > 1 && habit.current_streak > 0 {
                // last_completed is deliberately preserved: the historical
                // record of the last real completion outlives the streak.
                habit.current_streak = 0;
                summary.streaks_broken += 1;
                dirty = true;
            }
        }

        if dirty {
            store.commit(&habit, LogDelta::None)?;
            summary.updated += 1;
        }
    }

    Ok(summary)
}
