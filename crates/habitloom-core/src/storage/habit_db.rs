//! SQLite-based storage for habits, completion logs, and badges.
//!
//! Implements the [`HabitStore`] port. Every commit runs as a single
//! transaction whose habit UPDATE is guarded by the optimistic `version`
//! column; zero affected rows surfaces a conflict for the caller to retry.
//! Row decoding fails loudly: a corrupt frequency JSON or date column is an
//! error at this boundary, never a silent default deep in the engine.

use std::collections::BTreeSet;

use chrono::{DateTime, NaiveDate, Utc};
use rusqlite::{params, Connection, OptionalExtension};

use super::data_dir;
use super::migrations;
use crate::badge::{BadgeCategory, BadgeDefinition, BadgeRarity, UnlockedBadge};
use crate::error::{DatabaseError, HabitError, Result};
use crate::habit::{CompletionEntry, FrequencyRule, Habit};
use crate::store::{HabitStore, LogDelta};

// === Helper Functions ===

/// Map a decode failure onto the rusqlite error channel so it surfaces as
/// `DatabaseError::CorruptRecord` through the blanket conversion.
fn corrupt(
    column: usize,
    err: impl std::error::Error + Send + Sync + 'static,
) -> rusqlite::Error {
    rusqlite::Error::FromSqlConversionFailure(column, rusqlite::types::Type::Text, Box::new(err))
}

/// Parse a frequency rule from its JSON column.
fn parse_frequency(column: usize, raw: &str) -> Result<FrequencyRule, rusqlite::Error> {
    serde_json::from_str(raw).map_err(|e| corrupt(column, e))
}

/// Format a frequency rule for database storage.
fn format_frequency(rule: &FrequencyRule) -> Result<String> {
    Ok(serde_json::to_string(rule)?)
}

/// Parse an ISO calendar day (`%Y-%m-%d`).
fn parse_day(column: usize, raw: &str) -> Result<NaiveDate, rusqlite::Error> {
    NaiveDate::parse_from_str(raw, "%Y-%m-%d").map_err(|e| corrupt(column, e))
}

/// Parse an RFC 3339 timestamp.
fn parse_datetime(column: usize, raw: &str) -> Result<DateTime<Utc>, rusqlite::Error> {
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| corrupt(column, e))
}

/// Parse a badge category from its database string.
fn parse_category(column: usize, raw: &str) -> Result<BadgeCategory, rusqlite::Error> {
    match raw {
        "streak" => Ok(BadgeCategory::Streak),
        "completion" => Ok(BadgeCategory::Completion),
        "variety" => Ok(BadgeCategory::Variety),
        "achievement" => Ok(BadgeCategory::Achievement),
        "event" => Ok(BadgeCategory::Event),
        other => Err(corrupt(
            column,
            std::io::Error::new(
                std::io::ErrorKind::InvalidData,
                format!("unknown badge category '{other}'"),
            ),
        )),
    }
}

/// Parse a badge rarity from its database string.
fn parse_rarity(column: usize, raw: &str) -> Result<BadgeRarity, rusqlite::Error> {
    match raw {
        "common" => Ok(BadgeRarity::Common),
        "rare" => Ok(BadgeRarity::Rare),
        "epic" => Ok(BadgeRarity::Epic),
        "legendary" => Ok(BadgeRarity::Legendary),
        other => Err(corrupt(
            column,
            std::io::Error::new(
                std::io::ErrorKind::InvalidData,
                format!("unknown badge rarity '{other}'"),
            ),
        )),
    }
}

/// Build a Habit from a `SELECT * FROM habits` row.
fn row_to_habit(row: &rusqlite::Row) -> Result<Habit, rusqlite::Error> {
    let frequency_raw: String = row.get(2)?;
    let created_raw: String = row.get(9)?;
    let last_completed = row
        .get::<_, Option<String>>(7)?
        .map(|raw| parse_day(7, &raw))
        .transpose()?;

    Ok(Habit {
        id: row.get(0)?,
        title: row.get(1)?,
        frequency: parse_frequency(2, &frequency_raw)?,
        current_streak: row.get(3)?,
        best_streak: row.get(4)?,
        total_completions: row.get(5)?,
        completed_today: row.get(6)?,
        last_completed,
        archived: row.get(8)?,
        created_at: parse_datetime(9, &created_raw)?,
        version: row.get(10)?,
    })
}

/// Build a CompletionEntry from a `SELECT * FROM completions` row.
fn row_to_entry(row: &rusqlite::Row) -> Result<CompletionEntry, rusqlite::Error> {
    let day_raw: String = row.get(2)?;
    let created_raw: String = row.get(5)?;
    Ok(CompletionEntry {
        id: row.get(0)?,
        habit_id: row.get(1)?,
        day: parse_day(2, &day_raw)?,
        note: row.get(3)?,
        rating: row.get(4)?,
        created_at: parse_datetime(5, &created_raw)?,
    })
}

/// Build a BadgeDefinition from a row.
fn row_to_definition(row: &rusqlite::Row) -> Result<BadgeDefinition, rusqlite::Error> {
    let category_raw: String = row.get(2)?;
    let rarity_raw: String = row.get(3)?;
    Ok(BadgeDefinition {
        id: row.get(0)?,
        name: row.get(1)?,
        category: parse_category(2, &category_raw)?,
        rarity: parse_rarity(3, &rarity_raw)?,
        threshold: row.get(4)?,
        secret: row.get(5)?,
    })
}

/// Build an UnlockedBadge from a row.
fn row_to_unlock(row: &rusqlite::Row) -> Result<UnlockedBadge, rusqlite::Error> {
    let unlocked_raw: String = row.get(3)?;
    Ok(UnlockedBadge {
        id: row.get(0)?,
        badge_id: row.get(1)?,
        habit_id: row.get(2)?,
        unlocked_at: parse_datetime(3, &unlocked_raw)?,
        highlighted: row.get(4)?,
        value_at_unlock: row.get(5)?,
    })
}

const HABIT_COLUMNS: &str = "id, title, frequency, current_streak, best_streak, \
     total_completions, completed_today, last_completed, archived, created_at, version";

/// SQLite database for habit storage.
///
/// Stores habits, completion log entries, badge definitions, and unlocked
/// badges.
pub struct HabitDb {
    conn: Connection,
}

impl HabitDb {
    /// Get a reference to the underlying SQLite connection.
    pub fn conn(&self) -> &Connection {
        &self.conn
    }

    /// Open the database at `~/.config/habitloom/habitloom.db`.
    ///
    /// Creates the database file and schema if they don't exist.
    ///
    /// # Errors
    /// Returns an error if the database cannot be opened or migrated.
    pub fn open() -> Result<Self> {
        let path = data_dir()
            .map_err(|e| {
                HabitError::Database(DatabaseError::MigrationFailed(e.to_string()))
            })?
            .join("habitloom.db");
        let conn = Connection::open(&path).map_err(|source| {
            HabitError::Database(DatabaseError::OpenFailed { path, source })
        })?;
        let db = Self { conn };
        db.migrate()?;
        Ok(db)
    }

    /// Open an in-memory database (for tests).
    pub fn open_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        let db = Self { conn };
        db.migrate()?;
        Ok(db)
    }

    fn migrate(&self) -> Result<()> {
        // Cascade deletes from habits to completions rely on this pragma.
        self.conn.execute_batch("PRAGMA foreign_keys = ON;")?;

        self.conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS habits (
                id                TEXT PRIMARY KEY,
                title             TEXT NOT NULL,
                frequency         TEXT NOT NULL,
                current_streak    INTEGER NOT NULL DEFAULT 0,
                best_streak       INTEGER NOT NULL DEFAULT 0,
                total_completions INTEGER NOT NULL DEFAULT 0,
                completed_today   INTEGER NOT NULL DEFAULT 0,
                last_completed    TEXT,
                archived          INTEGER NOT NULL DEFAULT 0,
                created_at        TEXT NOT NULL,
                version           INTEGER NOT NULL DEFAULT 0
            );

            CREATE TABLE IF NOT EXISTS completions (
                id         TEXT PRIMARY KEY,
                habit_id   TEXT NOT NULL REFERENCES habits(id) ON DELETE CASCADE,
                day        TEXT NOT NULL,
                note       TEXT,
                rating     INTEGER,
                created_at TEXT NOT NULL
            );

            CREATE TABLE IF NOT EXISTS badge_definitions (
                id        TEXT PRIMARY KEY,
                name      TEXT NOT NULL,
                category  TEXT NOT NULL,
                rarity    TEXT NOT NULL,
                threshold INTEGER NOT NULL,
                secret    INTEGER NOT NULL DEFAULT 0
            );

            CREATE TABLE IF NOT EXISTS unlocked_badges (
                id              TEXT PRIMARY KEY,
                badge_id        TEXT NOT NULL REFERENCES badge_definitions(id),
                habit_id        TEXT,
                unlocked_at     TEXT NOT NULL,
                highlighted     INTEGER NOT NULL DEFAULT 1,
                value_at_unlock INTEGER
            );

            -- One completion per (habit, calendar day)
            CREATE UNIQUE INDEX IF NOT EXISTS idx_completions_habit_day
                ON completions(habit_id, day);
            CREATE INDEX IF NOT EXISTS idx_completions_day ON completions(day);

            -- One unlock per (badge, habit) pair; NULL habit scope folds to ''
            CREATE UNIQUE INDEX IF NOT EXISTS idx_unlocked_badge_scope
                ON unlocked_badges(badge_id, IFNULL(habit_id, ''));",
        )?;

        // Run incremental migrations (badge catalog seed, future schema changes)
        migrations::migrate(&self.conn)
            .map_err(|e| DatabaseError::MigrationFailed(e.to_string()))?;

        Ok(())
    }

    // === Habit CRUD (outside the HabitStore port) ===

    /// Insert a new habit.
    pub fn insert_habit(&self, habit: &Habit) -> Result<()> {
        self.conn.execute(
            &format!("INSERT INTO habits ({HABIT_COLUMNS}) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)"),
            params![
                habit.id,
                habit.title,
                format_frequency(&habit.frequency)?,
                habit.current_streak,
                habit.best_streak,
                habit.total_completions,
                habit.completed_today,
                habit.last_completed.map(|d| d.to_string()),
                habit.archived,
                habit.created_at.to_rfc3339(),
                habit.version,
            ],
        )?;
        Ok(())
    }

    /// Rename a habit.
    pub fn rename_habit(&self, id: &str, title: &str) -> Result<()> {
        let updated = self.conn.execute(
            "UPDATE habits SET title = ?2, version = version + 1 WHERE id = ?1",
            params![id, title],
        )?;
        self.expect_habit_row(id, updated)
    }

    /// Change a habit's cadence.
    pub fn set_frequency(&self, id: &str, frequency: &FrequencyRule) -> Result<()> {
        let updated = self.conn.execute(
            "UPDATE habits SET frequency = ?2, version = version + 1 WHERE id = ?1",
            params![id, format_frequency(frequency)?],
        )?;
        self.expect_habit_row(id, updated)
    }

    /// Archive or unarchive a habit.
    pub fn set_archived(&self, id: &str, archived: bool) -> Result<()> {
        let updated = self.conn.execute(
            "UPDATE habits SET archived = ?2, version = version + 1 WHERE id = ?1",
            params![id, archived],
        )?;
        self.expect_habit_row(id, updated)
    }

    /// Hard-delete a habit and (via cascade) its completion log.
    pub fn delete_habit(&self, id: &str) -> Result<()> {
        let deleted = self.conn.execute("DELETE FROM habits WHERE id = ?1", params![id])?;
        self.expect_habit_row(id, deleted)
    }

    fn expect_habit_row(&self, id: &str, affected: usize) -> Result<()> {
        if affected == 0 {
            Err(HabitError::NotFound {
                kind: "habit",
                id: id.to_string(),
            })
        } else {
            Ok(())
        }
    }

    // === Badge queries (outside the HabitStore port) ===

    /// All badge definitions. Secret badges are included only when
    /// `include_secret` is set or they are already unlocked.
    pub fn list_definitions(&self, include_secret: bool) -> Result<Vec<BadgeDefinition>> {
        let mut stmt = self.conn.prepare(
            "SELECT d.id, d.name, d.category, d.rarity, d.threshold, d.secret
             FROM badge_definitions d
             WHERE ?1 OR d.secret = 0
                OR EXISTS (SELECT 1 FROM unlocked_badges u WHERE u.badge_id = d.id)
             ORDER BY d.category, d.threshold",
        )?;
        let rows = stmt.query_map(params![include_secret], row_to_definition)?;
        let mut definitions = Vec::new();
        for row in rows {
            definitions.push(row?);
        }
        Ok(definitions)
    }

    /// All unlocked badges, newest first.
    pub fn list_unlocks(&self) -> Result<Vec<UnlockedBadge>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, badge_id, habit_id, unlocked_at, highlighted, value_at_unlock
             FROM unlocked_badges ORDER BY unlocked_at DESC",
        )?;
        let rows = stmt.query_map([], row_to_unlock)?;
        let mut unlocks = Vec::new();
        for row in rows {
            unlocks.push(row?);
        }
        Ok(unlocks)
    }

    /// Clear the highlight flag on an unlocked badge.
    pub fn acknowledge_badge(&self, unlock_id: &str) -> Result<()> {
        let updated = self.conn.execute(
            "UPDATE unlocked_badges SET highlighted = 0 WHERE id = ?1",
            params![unlock_id],
        )?;
        if updated == 0 {
            return Err(HabitError::NotFound {
                kind: "unlocked badge",
                id: unlock_id.to_string(),
            });
        }
        Ok(())
    }
}

impl HabitStore for HabitDb {
    fn habit(&self, id: &str) -> Result<Habit> {
        let mut stmt = self
            .conn
            .prepare(&format!("SELECT {HABIT_COLUMNS} FROM habits WHERE id = ?1"))?;
        stmt.query_row(params![id], row_to_habit)
            .optional()?
            .ok_or(HabitError::NotFound {
                kind: "habit",
                id: id.to_string(),
            })
    }

    fn list_habits(&self, include_archived: bool) -> Result<Vec<Habit>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {HABIT_COLUMNS} FROM habits
             WHERE ?1 OR archived = 0
             ORDER BY created_at"
        ))?;
        let rows = stmt.query_map(params![include_archived], row_to_habit)?;
        let mut habits = Vec::new();
        for row in rows {
            habits.push(row?);
        }
        Ok(habits)
    }

    fn completion_days(&self, habit_id: &str) -> Result<BTreeSet<NaiveDate>> {
        let mut stmt = self
            .conn
            .prepare("SELECT day FROM completions WHERE habit_id = ?1")?;
        let rows = stmt.query_map(params![habit_id], |row| {
            let raw: String = row.get(0)?;
            parse_day(0, &raw)
        })?;
        let mut days = BTreeSet::new();
        for row in rows {
            days.insert(row?);
        }
        Ok(days)
    }

    fn list_entries(
        &self,
        habit_id: &str,
        from: Option<NaiveDate>,
        to: Option<NaiveDate>,
    ) -> Result<Vec<CompletionEntry>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, habit_id, day, note, rating, created_at
             FROM completions
             WHERE habit_id = ?1
               AND (?2 IS NULL OR day >= ?2)
               AND (?3 IS NULL OR day <= ?3)
             ORDER BY day DESC",
        )?;
        let rows = stmt.query_map(
            params![
                habit_id,
                from.map(|d| d.to_string()),
                to.map(|d| d.to_string())
            ],
            row_to_entry,
        )?;
        let mut entries = Vec::new();
        for row in rows {
            entries.push(row?);
        }
        Ok(entries)
    }

    fn commit(&mut self, habit: &Habit, delta: LogDelta) -> Result<()> {
        let frequency = format_frequency(&habit.frequency)?;
        let tx = self.conn.unchecked_transaction()?;

        let updated = tx.execute(
            "UPDATE habits SET
                title = ?2, frequency = ?3, current_streak = ?4, best_streak = ?5,
                total_completions = ?6, completed_today = ?7, last_completed = ?8,
                archived = ?9, version = version + 1
             WHERE id = ?1 AND version = ?10",
            params![
                habit.id,
                habit.title,
                frequency,
                habit.current_streak,
                habit.best_streak,
                habit.total_completions,
                habit.completed_today,
                habit.last_completed.map(|d| d.to_string()),
                habit.archived,
                habit.version,
            ],
        )?;
        if updated == 0 {
            // Dropping the transaction rolls back; distinguish a missing
            // habit from a stale version for the caller.
            let exists: bool = tx.query_row(
                "SELECT EXISTS(SELECT 1 FROM habits WHERE id = ?1)",
                params![habit.id],
                |row| row.get(0),
            )?;
            return Err(if exists {
                HabitError::ConflictingUpdate {
                    habit_id: habit.id.clone(),
                }
            } else {
                HabitError::NotFound {
                    kind: "habit",
                    id: habit.id.clone(),
                }
            });
        }

        match delta {
            LogDelta::None => {}
            LogDelta::Insert(entry) => {
                tx.execute(
                    "INSERT INTO completions (id, habit_id, day, note, rating, created_at)
                     VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                    params![
                        entry.id,
                        entry.habit_id,
                        entry.day.to_string(),
                        entry.note,
                        entry.rating,
                        entry.created_at.to_rfc3339(),
                    ],
                )?;
            }
            LogDelta::Remove { day } => {
                tx.execute(
                    "DELETE FROM completions WHERE habit_id = ?1 AND day = ?2",
                    params![habit.id, day.to_string()],
                )?;
            }
        }

        tx.commit()?;
        Ok(())
    }

    fn badge_definitions(&self, category: BadgeCategory) -> Result<Vec<BadgeDefinition>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, name, category, rarity, threshold, secret
             FROM badge_definitions WHERE category = ?1 ORDER BY threshold",
        )?;
        let rows = stmt.query_map(params![category.as_str()], row_to_definition)?;
        let mut definitions = Vec::new();
        for row in rows {
            definitions.push(row?);
        }
        Ok(definitions)
    }

    fn unlocked_badges(&self, habit_id: Option<&str>) -> Result<Vec<UnlockedBadge>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, badge_id, habit_id, unlocked_at, highlighted, value_at_unlock
             FROM unlocked_badges
             WHERE IFNULL(habit_id, '') = IFNULL(?1, '')
             ORDER BY unlocked_at DESC",
        )?;
        let rows = stmt.query_map(params![habit_id], row_to_unlock)?;
        let mut unlocks = Vec::new();
        for row in rows {
            unlocks.push(row?);
        }
        Ok(unlocks)
    }

    fn record_unlock(&mut self, unlock: &UnlockedBadge) -> Result<()> {
        // The unique scope index makes re-recording a no-op.
        self.conn.execute(
            "INSERT OR IGNORE INTO unlocked_badges
                 (id, badge_id, habit_id, unlocked_at, highlighted, value_at_unlock)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                unlock.id,
                unlock.badge_id,
                unlock.habit_id,
                unlock.unlocked_at.to_rfc3339(),
                unlock.highlighted,
                unlock.value_at_unlock,
            ],
        )?;
        Ok(())
    }
}
