//! Completion log commands for CLI.

use chrono::NaiveDate;
use clap::Subcommand;
use habitloom_core::storage::HabitDb;
use habitloom_core::HabitStore;

#[derive(Subcommand)]
pub enum LogAction {
    /// List completion entries for a habit, newest first
    List {
        /// Habit ID
        id: String,
        /// Earliest day to include (YYYY-MM-DD)
        #[arg(long)]
        from: Option<NaiveDate>,
        /// Latest day to include (YYYY-MM-DD)
        #[arg(long)]
        to: Option<NaiveDate>,
    },
    /// Show the set of completed days for a habit
    Days {
        /// Habit ID
        id: String,
    },
}

pub fn run(action: LogAction) -> Result<(), Box<dyn std::error::Error>> {
    let db = HabitDb::open()?;

    match action {
        LogAction::List { id, from, to } => {
            let entries = db.list_entries(&id, from, to)?;
            println!("{}", serde_json::to_string_pretty(&entries)?);
        }
        LogAction::Days { id } => {
            let days = db.completion_days(&id)?;
            println!("{}", serde_json::to_string_pretty(&days)?);
        }
    }
    Ok(())
}
