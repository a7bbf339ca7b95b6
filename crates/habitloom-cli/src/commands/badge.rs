//! Badge commands for CLI.

use clap::Subcommand;
use habitloom_core::storage::HabitDb;

#[derive(Subcommand)]
pub enum BadgeAction {
    /// List badge definitions (secret badges hidden until unlocked)
    Catalog {
        /// Include secret badges that are still locked
        #[arg(long)]
        all: bool,
    },
    /// List unlocked badges, newest first
    Unlocked,
    /// Acknowledge an unlocked badge, clearing its highlight
    Acknowledge {
        /// Unlocked badge ID
        id: String,
    },
}

pub fn run(action: BadgeAction) -> Result<(), Box<dyn std::error::Error>> {
    let db = HabitDb::open()?;

    match action {
        BadgeAction::Catalog { all } => {
            let definitions = db.list_definitions(all)?;
            println!("{}", serde_json::to_string_pretty(&definitions)?);
        }
        BadgeAction::Unlocked => {
            let unlocks = db.list_unlocks()?;
            println!("{}", serde_json::to_string_pretty(&unlocks)?);
        }
        BadgeAction::Acknowledge { id } => {
            db.acknowledge_badge(&id)?;
            println!("acknowledged {id}");
        }
    }
    Ok(())
}
