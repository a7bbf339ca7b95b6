//! Statistics commands for CLI.

use clap::Subcommand;
use habitloom_core::stats;
use habitloom_core::storage::{Config, HabitDb};

#[derive(Subcommand)]
pub enum StatsAction {
    /// Per-habit summary
    Habit {
        /// Habit ID
        id: String,
    },
    /// All-habits overview
    Overview,
}

pub fn run(action: StatsAction) -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::load()?;
    let db = HabitDb::open()?;
    let today = config.today();

    match action {
        StatsAction::Habit { id } => {
            let summary = stats::habit_summary(&db, &id, today)?;
            println!("{}", serde_json::to_string_pretty(&summary)?);
        }
        StatsAction::Overview => {
            let overview = stats::overview(&db, today)?;
            println!("{}", serde_json::to_string_pretty(&overview)?);
        }
    }
    Ok(())
}
