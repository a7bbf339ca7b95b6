//! Persistent store port.
//!
//! The engine talks to storage exclusively through [`HabitStore`]. The
//! SQLite adapter in [`crate::storage`] is the production implementation;
//! [`MemoryStore`] backs engine tests without touching disk.
//!
//! Every `commit` must apply the habit row and its log delta as one atomic
//! unit, guarded by the habit's optimistic `version`: a commit against a
//! stale version fails with [`HabitError::ConflictingUpdate`] and leaves
//! nothing changed.

use std::collections::{BTreeSet, HashMap};

use chrono::NaiveDate;

use crate::badge::{catalog, BadgeCategory, BadgeDefinition, UnlockedBadge};
use crate::error::{HabitError, Result};
use crate::habit::{CompletionEntry, Habit};

/// Change to the completion log carried by a commit.
#[derive(Debug, Clone, PartialEq)]
pub enum LogDelta {
    /// Habit-only update (sweep, CRUD)
    None,
    /// Record a new completion entry
    Insert(CompletionEntry),
    /// Delete the entry for a day
    Remove { day: NaiveDate },
}

/// Storage contract consumed by the engine.
pub trait HabitStore {
    /// Load a habit by id.
    fn habit(&self, id: &str) -> Result<Habit>;

    /// List habits, optionally including archived ones.
    fn list_habits(&self, include_archived: bool) -> Result<Vec<Habit>>;

    /// The set of days with a completion entry for a habit.
    fn completion_days(&self, habit_id: &str) -> Result<BTreeSet<NaiveDate>>;

    /// Completion entries for a habit within an optional day range,
    /// newest first.
    fn list_entries(
        &self,
        habit_id: &str,
        from: Option<NaiveDate>,
        to: Option<NaiveDate>,
    ) -> Result<Vec<CompletionEntry>>;

    /// Atomically persist a habit update and its log delta.
    ///
    /// The habit's `version` must match the stored row; on success the
    /// stored version is bumped by one.
    fn commit(&mut self, habit: &Habit, delta: LogDelta) -> Result<()>;

    /// Badge definitions of one category.
    fn badge_definitions(&self, category: BadgeCategory) -> Result<Vec<BadgeDefinition>>;

    /// Unlocked badges, optionally filtered to one habit's scope.
    fn unlocked_badges(&self, habit_id: Option<&str>) -> Result<Vec<UnlockedBadge>>;

    /// Record a badge unlock. Idempotent: a second unlock of the same
    /// (badge, habit) pair is silently dropped.
    fn record_unlock(&mut self, unlock: &UnlockedBadge) -> Result<()>;
}

/// In-memory [`HabitStore`] for tests, pre-seeded with the default badge
/// catalog.
#[derive(Debug, Default)]
pub struct MemoryStore {
    habits: HashMap<String, Habit>,
    entries: Vec<CompletionEntry>,
    definitions: Vec<BadgeDefinition>,
    unlocks: Vec<UnlockedBadge>,
}

impl MemoryStore {
    pub fn new() -> Self {
        MemoryStore {
            habits: HashMap::new(),
            entries: Vec::new(),
            definitions: catalog::default_definitions(),
            unlocks: Vec::new(),
        }
    }

    /// Insert a habit directly, returning its id.
    pub fn insert_habit(&mut self, habit: Habit) -> String {
        let id = habit.id.clone();
        self.habits.insert(id.clone(), habit);
        id
    }

    /// Replace the seeded badge catalog (for targeted evaluator tests).
    pub fn set_definitions(&mut self, definitions: Vec<BadgeDefinition>) {
        self.definitions = definitions;
    }
}

impl HabitStore for MemoryStore {
    fn habit(&self, id: &str) -> Result<Habit> {
        self.habits.get(id).cloned().ok_or(HabitError::NotFound {
            kind: "habit",
            id: id.to_string(),
        })
    }

    fn list_habits(&self, include_archived: bool) -> Result<Vec<Habit>> {
        let mut habits: Vec<Habit> = self
            .habits
            .values()
            .filter(|h| include_archived || !h.archived)
            .cloned()
            .collect();
        habits.sort_by(|a, b| a.created_at.cmp(&b.created_at));
        Ok(habits)
    }

    fn completion_days(&self, habit_id: &str) -> Result<BTreeSet<NaiveDate>> {
        Ok(self
            .entries
            .iter()
            .filter(|e| e.habit_id == habit_id)
            .map(|e| e.day)
            .collect())
    }

    fn list_entries(
        &self,
        habit_id: &str,
        from: Option<NaiveDate>,
        to: Option<NaiveDate>,
    ) -> Result<Vec<CompletionEntry>> {
        let mut entries: Vec<CompletionEntry> = self
            .entries
            .iter()
            .filter(|e| e.habit_id == habit_id)
            .filter(|e| from.map_or(true, |f| e.day >= f))
            .filter(|e| to.map_or(true, |t| e.day <= t))
            .cloned()
            .collect();
        entries.sort_by(|a, b| b.day.cmp(&a.day));
        Ok(entries)
    }

    fn commit(&mut self, habit: &Habit, delta: LogDelta) -> Result<()> {
        let stored = self
            .habits
            .get_mut(&habit.id)
            .ok_or(HabitError::NotFound {
                kind: "habit",
                id: habit.id.clone(),
            })?;
        if stored.version != habit.version {
            return Err(HabitError::ConflictingUpdate {
                habit_id: habit.id.clone(),
            });
        }
        *stored = habit.clone();
        stored.version += 1;
        match delta {
            LogDelta::None => {}
            LogDelta::Insert(entry) => self.entries.push(entry),
            LogDelta::Remove { day } => {
                self.entries.retain(|e| !(e.habit_id == habit.id && e.day == day));
            }
        }
        Ok(())
    }

    fn badge_definitions(&self, category: BadgeCategory) -> Result<Vec<BadgeDefinition>> {
        Ok(self
            .definitions
            .iter()
            .filter(|d| d.category == category)
            .cloned()
            .collect())
    }

    fn unlocked_badges(&self, habit_id: Option<&str>) -> Result<Vec<UnlockedBadge>> {
        Ok(self
            .unlocks
            .iter()
            .filter(|u| u.habit_id.as_deref() == habit_id)
            .cloned()
            .collect())
    }

    fn record_unlock(&mut self, unlock: &UnlockedBadge) -> Result<()> {
        let exists = self
            .unlocks
            .iter()
            .any(|u| u.badge_id == unlock.badge_id && u.habit_id == unlock.habit_id);
        if !exists {
            self.unlocks.push(unlock.clone());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::habit::FrequencyRule;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 3, d).unwrap()
    }

    #[test]
    fn test_commit_rejects_stale_version() {
        let mut store = MemoryStore::new();
        let id = store.insert_habit(Habit::new("Read", FrequencyRule::Daily));

        let first = store.habit(&id).unwrap();
        let second = first.clone();
        store.commit(&first, LogDelta::None).unwrap();

        let err = store.commit(&second, LogDelta::None).unwrap_err();
        assert!(matches!(err, HabitError::ConflictingUpdate { .. }));
    }

    #[test]
    fn test_commit_applies_log_delta() {
        let mut store = MemoryStore::new();
        let id = store.insert_habit(Habit::new("Read", FrequencyRule::Daily));

        let habit = store.habit(&id).unwrap();
        store
            .commit(&habit, LogDelta::Insert(CompletionEntry::new(&id, day(1))))
            .unwrap();
        assert_eq!(store.completion_days(&id).unwrap().len(), 1);

        let habit = store.habit(&id).unwrap();
        store.commit(&habit, LogDelta::Remove { day: day(1) }).unwrap();
        assert!(store.completion_days(&id).unwrap().is_empty());
    }

    #[test]
    fn test_record_unlock_is_idempotent() {
        let mut store = MemoryStore::new();
        let unlock = UnlockedBadge::new("streak-3", None, 3);
        store.record_unlock(&unlock).unwrap();
        store.record_unlock(&unlock).unwrap();
        assert_eq!(store.unlocked_badges(None).unwrap().len(), 1);
    }

    #[test]
    fn test_missing_habit_is_not_found() {
        let store = MemoryStore::new();
        let err = store.habit("nope").unwrap_err();
        assert!(matches!(err, HabitError::NotFound { kind: "habit", .. }));
    }
}
