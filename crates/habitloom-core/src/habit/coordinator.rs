//! Completion coordinator.
//!
//! Orchestrates mark-complete and undo as atomic, idempotent operations:
//! read the habit and its history, run the ledger, commit habit + log delta
//! in one store transaction, then evaluate badge unlocks. The calendar day
//! is always passed in by the caller; the coordinator never reads a clock.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::badge::{evaluator, BadgeCategory, UnlockedBadge};
use crate::error::{HabitError, Result};
use crate::habit::{ledger, CompletionEntry, FrequencyRule};
use crate::store::{HabitStore, LogDelta};

/// Whether due-ness gates completion or only drives reminders.
///
/// Under `Advisory` (the default) every completion is accepted; under
/// `Strict`, a daily-cadence habit that is not due rejects with
/// [`HabitError::NotDue`]. Weekly/monthly/interval cadences are advisory
/// in both modes: their due-ness is a reminder target, not a gate.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DuePolicy {
    #[default]
    Advisory,
    Strict,
}

/// Result of a complete/undo operation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompletionOutcome {
    /// Current streak after the operation
    pub streak: u32,
    /// Whether the operation set a new best streak
    pub is_new_record: bool,
    /// Total completions after the operation
    pub total_completions: u32,
    /// Badges newly unlocked by this operation
    pub unlocked: Vec<UnlockedBadge>,
}

/// Orchestrates completion operations over a [`HabitStore`].
pub struct Coordinator<'a, S: HabitStore> {
    store: &'a mut S,
    policy: DuePolicy,
}

impl<'a, S: HabitStore> Coordinator<'a, S> {
    /// Create a coordinator with the advisory due policy.
    pub fn new(store: &'a mut S) -> Self {
        Coordinator {
            store,
            policy: DuePolicy::Advisory,
        }
    }

    /// Create a coordinator with an explicit due policy.
    pub fn with_policy(store: &'a mut S, policy: DuePolicy) -> Self {
        Coordinator { store, policy }
    }

    /// Mark a habit complete on `day` (today, or an explicit backfill
    /// date). `today` resolves the `completed_today` flag so a backfilled
    /// past day never claims the current calendar day.
    ///
    /// Idempotent: completing an already-completed day changes nothing and
    /// returns the current counters. On success commits the habit and the
    /// new log entry atomically, then evaluates streak and completion
    /// badges. A failed commit leaves no partial state; the caller retries
    /// the whole operation.
    pub fn complete_on(
        &mut self,
        habit_id: &str,
        day: NaiveDate,
        today: NaiveDate,
        note: Option<String>,
        rating: Option<u8>,
    ) -> Result<CompletionOutcome> {
        if let Some(r) = rating {
            if !(1..=5).contains(&r) {
                return Err(HabitError::InvalidRating(r));
            }
        }
        let mut habit = self.store.habit(habit_id)?;
        if habit.archived {
            return Err(HabitError::Archived(habit.title));
        }
        if self.policy == DuePolicy::Strict
            && habit.frequency == FrequencyRule::Daily
            && !habit.is_due_on(day)
        {
            return Err(HabitError::NotDue {
                habit: habit.title,
                day,
            });
        }

        let history = self.store.completion_days(habit_id)?;
        let outcome = ledger::append_completion(&mut habit, &history, day, today);
        if outcome.applied {
            let mut entry = CompletionEntry::new(habit_id, day);
            entry.note = note;
            entry.rating = rating;
            self.store.commit(&habit, LogDelta::Insert(entry))?;
        }

        let mut unlocked = Vec::new();
        for (category, value) in [
            (BadgeCategory::Streak, habit.current_streak),
            (BadgeCategory::Completion, habit.total_completions),
        ] {
            if let Some(badge) = self.evaluate(category, Some(habit_id), value)? {
                unlocked.push(badge);
            }
        }

        Ok(CompletionOutcome {
            streak: outcome.streak,
            is_new_record: outcome.is_new_record,
            total_completions: outcome.total_completions,
            unlocked,
        })
    }

    /// Undo the completion for `day`, if present. `today` resolves the
    /// `completed_today` flag: undoing a past day leaves today's entry and
    /// its flag intact.
    ///
    /// Idempotent when no entry exists. Badges already unlocked are never
    /// retracted; an undone streak only stops future unlocks.
    pub fn undo_on(
        &mut self,
        habit_id: &str,
        day: NaiveDate,
        today: NaiveDate,
    ) -> Result<CompletionOutcome> {
        let mut habit = self.store.habit(habit_id)?;
        let history = self.store.completion_days(habit_id)?;

        let outcome = ledger::remove_completion(&mut habit, &history, day, today);
        if outcome.applied {
            self.store.commit(&habit, LogDelta::Remove { day })?;
        }

        Ok(CompletionOutcome {
            streak: outcome.streak,
            is_new_record: false,
            total_completions: outcome.total_completions,
            unlocked: Vec::new(),
        })
    }

    /// Evaluate one badge category for a counter value, recording the
    /// unlock when a new tier qualifies.
    ///
    /// Safe to call speculatively: the store's uniqueness guarantee makes
    /// duplicate unlocks impossible even under concurrent evaluation.
    pub fn evaluate(
        &mut self,
        category: BadgeCategory,
        habit_id: Option<&str>,
        value: u32,
    ) -> Result<Option<UnlockedBadge>> {
        let definitions = self.store.badge_definitions(category)?;
        let existing = self.store.unlocked_badges(habit_id)?;
        match evaluator::evaluate(&definitions, &existing, habit_id, value) {
            Some(definition) => {
                let unlock = UnlockedBadge::new(
                    definition.id.clone(),
                    habit_id.map(str::to_string),
                    value,
                );
                self.store.record_unlock(&unlock)?;
                Ok(Some(unlock))
            }
            None => Ok(None),
        }
    }
}
