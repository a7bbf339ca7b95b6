//! # Habitloom Core Library
//!
//! This library provides the core business logic for Habitloom, a habit and
//! recurring check-in tracker. It implements a CLI-first philosophy where all
//! operations are available via a standalone CLI binary, with any GUI being a
//! thin layer over the same core library.
//!
//! ## Architecture
//!
//! - **Frequency rules**: Pure due-date evaluation for daily, weekly,
//!   monthly, and interval cadences
//! - **Streak ledger**: Derives current/best streaks and completion counters
//!   from the completion log
//! - **Completion coordinator**: Atomic, idempotent mark-complete and undo
//!   operations, including badge evaluation
//! - **Daily sweep**: Idempotent day-boundary maintenance (flag roll-over and
//!   broken-streak detection)
//! - **Storage**: SQLite-based habit/log/badge persistence and TOML-based
//!   configuration
//!
//! ## Key Components
//!
//! - [`Habit`]: A tracked recurring item with streak counters
//! - [`Coordinator`]: Orchestrates complete/undo against a [`HabitStore`]
//! - [`HabitDb`]: SQLite persistence with optimistic per-habit versioning
//! - [`Config`]: Application configuration management

pub mod badge;
pub mod error;
pub mod habit;
pub mod stats;
pub mod storage;
pub mod store;

pub use badge::{BadgeCategory, BadgeDefinition, BadgeRarity, UnlockedBadge};
pub use error::{ConfigError, DatabaseError, HabitError, Result};
pub use habit::{
    CompletionEntry, CompletionOutcome, Coordinator, DuePolicy, FrequencyRule, Habit,
    LedgerOutcome, SweepSummary,
};
pub use stats::{HabitSummary, Overview};
pub use storage::{Config, HabitDb};
pub use store::{HabitStore, LogDelta, MemoryStore};
