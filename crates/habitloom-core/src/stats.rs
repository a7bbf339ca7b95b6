//! Read-only summaries layered on top of the engine's data.

use chrono::{Duration, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::store::HabitStore;

/// Per-habit summary for presentation layers.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HabitSummary {
    pub id: String,
    pub title: String,
    pub frequency: String,
    pub current_streak: u32,
    pub best_streak: u32,
    pub total_completions: u32,
    pub completed_today: bool,
    pub last_completed: Option<NaiveDate>,
    /// Completions over the last 30 days divided by 30
    pub completion_rate_30d: f64,
    pub badges_unlocked: usize,
}

/// Overview across all habits.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Overview {
    pub habits: usize,
    pub active: usize,
    pub archived: usize,
    pub completed_today: usize,
    pub total_completions: u64,
    pub best_streak: u32,
}

/// Build the summary for one habit.
pub fn habit_summary<S: HabitStore>(
    store: &S,
    habit_id: &str,
    today: NaiveDate,
) -> Result<HabitSummary> {
    let habit = store.habit(habit_id)?;
    let window_start = today - Duration::days(29);
    let recent = store.list_entries(habit_id, Some(window_start), Some(today))?;
    let badges = store.unlocked_badges(Some(habit_id))?;

    Ok(HabitSummary {
        id: habit.id,
        title: habit.title,
        frequency: habit.frequency.describe(),
        current_streak: habit.current_streak,
        best_streak: habit.best_streak,
        total_completions: habit.total_completions,
        completed_today: habit.completed_today,
        last_completed: habit.last_completed,
        completion_rate_30d: recent.len() as f64 / 30.0,
        badges_unlocked: badges.len(),
    })
}

/// Build the all-habits overview.
///
/// The completed-today count is derived from the log rather than the
/// per-habit flag, so it stays accurate for any `today` the caller asks
/// about.
pub fn overview<S: HabitStore>(store: &S, today: NaiveDate) -> Result<Overview> {
    let habits = store.list_habits(true)?;
    let mut summary = Overview {
        habits: habits.len(),
        ..Overview::default()
    };
    for habit in &habits {
        if habit.archived {
            summary.archived += 1;
        } else {
            summary.active += 1;
        }
        if store.completion_days(&habit.id)?.contains(&today) {
            summary.completed_today += 1;
        }
        summary.total_completions += u64::from(habit.total_completions);
        summary.best_streak = summary.best_streak.max(habit.best_streak);
    }
    Ok(summary)
}
