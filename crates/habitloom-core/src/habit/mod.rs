//! Habit model and the engine operations built on it.
//!
//! A [`Habit`] is any recurring item tracked by completion day: a daily
//! habit, a weekly check-in, or an every-N-days chore. Streak counters on
//! the habit are derived from its completion log by the [`ledger`] module
//! and committed through a [`crate::store::HabitStore`].

pub mod coordinator;
pub mod frequency;
pub mod ledger;
pub mod sweep;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub use coordinator::{CompletionOutcome, Coordinator, DuePolicy};
pub use frequency::FrequencyRule;
pub use ledger::LedgerOutcome;
pub use sweep::SweepSummary;

/// A tracked recurring item with derived streak state.
///
/// Streak fields (`current_streak`, `best_streak`, `total_completions`,
/// `completed_today`, `last_completed`) are maintained by the ledger and
/// must only be mutated through engine operations, never directly.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Habit {
    /// Unique identifier (UUID v4)
    pub id: String,

    /// Display title
    pub title: String,

    /// Configured cadence
    pub frequency: FrequencyRule,

    /// Consecutive completed calendar days ending at the latest completion
    pub current_streak: u32,

    /// High-water mark of `current_streak`; never reduced by an undo
    pub best_streak: u32,

    /// Count of completion log entries for this habit
    pub total_completions: u32,

    /// Whether a completion entry exists for the current calendar day
    pub completed_today: bool,

    /// Day of the most recent completion entry, if any
    pub last_completed: Option<NaiveDate>,

    /// Soft-delete flag; archived habits are never due
    pub archived: bool,

    /// Creation timestamp
    pub created_at: DateTime<Utc>,

    /// Optimistic concurrency version, bumped by the store on every commit
    pub version: i64,
}

impl Habit {
    /// Create a new habit with zeroed streak state.
    pub fn new(title: impl Into<String>, frequency: FrequencyRule) -> Self {
        Habit {
            id: Uuid::new_v4().to_string(),
            title: title.into(),
            frequency,
            current_streak: 0,
            best_streak: 0,
            total_completions: 0,
            completed_today: false,
            last_completed: None,
            archived: false,
            created_at: Utc::now(),
            version: 0,
        }
    }

    /// Whether this habit's cadence expects a completion on `day`.
    ///
    /// Archived habits are never due; everything else delegates to the
    /// pure [`FrequencyRule::is_due_on`].
    pub fn is_due_on(&self, day: NaiveDate) -> bool {
        !self.archived && self.frequency.is_due_on(day, self.last_completed)
    }
}

/// One completion of a habit on a calendar day.
///
/// Append/delete-only: created by the coordinator on mark-complete, deleted
/// on undo of the same day's entry, never mutated otherwise. At most one
/// entry exists per (habit, day).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompletionEntry {
    /// Unique identifier (UUID v4)
    pub id: String,

    /// Owning habit
    pub habit_id: String,

    /// Calendar day completed, in the habit's local time zone
    pub day: NaiveDate,

    /// Optional free-text note
    pub note: Option<String>,

    /// Optional mood/difficulty rating, 1..=5
    pub rating: Option<u8>,

    /// Creation timestamp
    pub created_at: DateTime<Utc>,
}

impl CompletionEntry {
    /// Create a new completion entry for `day`.
    pub fn new(habit_id: impl Into<String>, day: NaiveDate) -> Self {
        CompletionEntry {
            id: Uuid::new_v4().to_string(),
            habit_id: habit_id.into(),
            day,
            note: None,
            rating: None,
            created_at: Utc::now(),
        }
    }
}
