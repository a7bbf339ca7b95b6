//! Habit management commands for CLI.

use std::collections::BTreeSet;

use chrono::NaiveDate;
use clap::Subcommand;
use habitloom_core::storage::{Config, HabitDb};
use habitloom_core::{Coordinator, FrequencyRule, Habit, HabitStore};

#[derive(Subcommand)]
pub enum HabitAction {
    /// Create a new habit
    Create {
        /// Habit title
        title: String,
        /// Cadence: daily | weekly:mon,wed | monthly:1,15 | every:3
        #[arg(long, default_value = "daily")]
        frequency: String,
    },
    /// List habits
    List {
        /// Include archived habits
        #[arg(long)]
        archived: bool,
    },
    /// Get habit details
    Get {
        /// Habit ID
        id: String,
    },
    /// Rename a habit
    Rename {
        /// Habit ID
        id: String,
        /// New title
        title: String,
    },
    /// Change a habit's cadence
    SetFrequency {
        /// Habit ID
        id: String,
        /// Cadence: daily | weekly:mon,wed | monthly:1,15 | every:3
        frequency: String,
    },
    /// Archive a habit (soft delete)
    Archive {
        /// Habit ID
        id: String,
    },
    /// Unarchive a habit
    Unarchive {
        /// Habit ID
        id: String,
    },
    /// Permanently delete a habit and its completion log
    Delete {
        /// Habit ID
        id: String,
    },
    /// Mark a habit complete
    Complete {
        /// Habit ID
        id: String,
        /// Calendar day (YYYY-MM-DD, default today)
        #[arg(long)]
        date: Option<NaiveDate>,
        /// Free-text note
        #[arg(long)]
        note: Option<String>,
        /// Mood/difficulty rating 1-5
        #[arg(long, value_parser = clap::value_parser!(u8).range(1..=5))]
        rating: Option<u8>,
    },
    /// Undo a completion
    Undo {
        /// Habit ID
        id: String,
        /// Calendar day (YYYY-MM-DD, default today)
        #[arg(long)]
        date: Option<NaiveDate>,
    },
}

/// Parse a CLI cadence string into a frequency rule.
pub fn parse_frequency_arg(raw: &str) -> Result<FrequencyRule, String> {
    if raw == "daily" {
        return Ok(FrequencyRule::Daily);
    }
    let (kind, rest) = raw
        .split_once(':')
        .ok_or_else(|| format!("invalid frequency '{raw}'"))?;
    match kind {
        "weekly" => {
            let days: BTreeSet<u8> = rest
                .split(',')
                .map(parse_weekday)
                .collect::<Result<_, _>>()?;
            Ok(FrequencyRule::WeeklyOnDays { days })
        }
        "monthly" => {
            let days: BTreeSet<u8> = rest
                .split(',')
                .map(|d| {
                    d.trim()
                        .parse::<u8>()
                        .ok()
                        .filter(|d| (1..=31).contains(d))
                        .ok_or_else(|| format!("invalid day of month '{d}'"))
                })
                .collect::<Result<_, _>>()?;
            Ok(FrequencyRule::MonthlyOnDays { days })
        }
        "every" => {
            let interval = rest
                .trim()
                .parse::<u32>()
                .ok()
                .filter(|n| *n >= 1)
                .ok_or_else(|| format!("invalid interval '{rest}'"))?;
            Ok(FrequencyRule::EveryNDays { interval })
        }
        other => Err(format!("unknown frequency kind '{other}'")),
    }
}

fn parse_weekday(raw: &str) -> Result<u8, String> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "sun" => Ok(0),
        "mon" => Ok(1),
        "tue" => Ok(2),
        "wed" => Ok(3),
        "thu" => Ok(4),
        "fri" => Ok(5),
        "sat" => Ok(6),
        other => Err(format!("invalid weekday '{other}'")),
    }
}

pub fn run(action: HabitAction) -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::load()?;
    let mut db = HabitDb::open()?;

    match action {
        HabitAction::Create { title, frequency } => {
            let rule = parse_frequency_arg(&frequency)?;
            let habit = Habit::new(title, rule);
            db.insert_habit(&habit)?;
            println!("{}", serde_json::to_string_pretty(&habit)?);
        }
        HabitAction::List { archived } => {
            let habits = db.list_habits(archived)?;
            println!("{}", serde_json::to_string_pretty(&habits)?);
        }
        HabitAction::Get { id } => {
            let habit = db.habit(&id)?;
            println!("{}", serde_json::to_string_pretty(&habit)?);
        }
        HabitAction::Rename { id, title } => {
            db.rename_habit(&id, &title)?;
            println!("renamed {id}");
        }
        HabitAction::SetFrequency { id, frequency } => {
            let rule = parse_frequency_arg(&frequency)?;
            db.set_frequency(&id, &rule)?;
            println!("updated {id}: {}", rule.describe());
        }
        HabitAction::Archive { id } => {
            db.set_archived(&id, true)?;
            println!("archived {id}");
        }
        HabitAction::Unarchive { id } => {
            db.set_archived(&id, false)?;
            println!("unarchived {id}");
        }
        HabitAction::Delete { id } => {
            db.delete_habit(&id)?;
            println!("deleted {id}");
        }
        HabitAction::Complete {
            id,
            date,
            note,
            rating,
        } => {
            let today = config.today();
            let day = date.unwrap_or(today);
            let mut coordinator =
                Coordinator::with_policy(&mut db, config.general.due_policy);
            let outcome = coordinator.complete_on(&id, day, today, note, rating)?;
            println!("{}", serde_json::to_string_pretty(&outcome)?);
            if config.notifications.badge_unlocks {
                for unlock in &outcome.unlocked {
                    eprintln!("badge unlocked: {}", unlock.badge_id);
                }
            }
        }
        HabitAction::Undo { id, date } => {
            let today = config.today();
            let day = date.unwrap_or(today);
            let mut coordinator = Coordinator::new(&mut db);
            let outcome = coordinator.undo_on(&id, day, today)?;
            println!("{}", serde_json::to_string_pretty(&outcome)?);
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_daily() {
        assert_eq!(parse_frequency_arg("daily").unwrap(), FrequencyRule::Daily);
    }

    #[test]
    fn test_parse_weekly() {
        let rule = parse_frequency_arg("weekly:mon,wed,fri").unwrap();
        assert_eq!(
            rule,
            FrequencyRule::WeeklyOnDays {
                days: [1u8, 3, 5].into_iter().collect()
            }
        );
    }

    #[test]
    fn test_parse_monthly() {
        let rule = parse_frequency_arg("monthly:1,15").unwrap();
        assert_eq!(
            rule,
            FrequencyRule::MonthlyOnDays {
                days: [1u8, 15].into_iter().collect()
            }
        );
    }

    #[test]
    fn test_parse_every() {
        let rule = parse_frequency_arg("every:3").unwrap();
        assert_eq!(rule, FrequencyRule::EveryNDays { interval: 3 });
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert!(parse_frequency_arg("hourly").is_err());
        assert!(parse_frequency_arg("weekly:funday").is_err());
        assert!(parse_frequency_arg("monthly:32").is_err());
        assert!(parse_frequency_arg("every:0").is_err());
    }
}
