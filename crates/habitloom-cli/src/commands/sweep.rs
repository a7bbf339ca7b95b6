//! Daily maintenance sweep command for CLI.
//!
//! Intended to be invoked by a scheduler (cron, systemd timer) shortly
//! after local midnight; safe to re-run and safe to run late.

use chrono::NaiveDate;
use clap::Subcommand;
use habitloom_core::habit::sweep;
use habitloom_core::storage::{Config, HabitDb};

#[derive(Subcommand)]
pub enum SweepAction {
    /// Run the day-boundary sweep
    Run {
        /// Calendar day to sweep for (YYYY-MM-DD, default today)
        #[arg(long)]
        date: Option<NaiveDate>,
    },
}

pub fn run(action: SweepAction) -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::load()?;
    let mut db = HabitDb::open()?;

    match action {
        SweepAction::Run { date } => {
            let today = date.unwrap_or_else(|| config.today());
            let summary = sweep::run(&mut db, today)?;
            println!("{}", serde_json::to_string_pretty(&summary)?);
        }
    }
    Ok(())
}
