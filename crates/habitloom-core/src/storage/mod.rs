mod config;
pub mod habit_db;
pub mod migrations;

pub use config::Config;
pub use habit_db::HabitDb;

use std::path::PathBuf;

/// Returns `~/.config/habitloom[-dev]/` based on HABITLOOM_ENV.
///
/// Set HABITLOOM_ENV=dev to use the development data directory, or
/// HABITLOOM_DATA_DIR to point at an explicit directory (used by tests).
///
/// # Errors
/// Returns an error if creating the directory fails.
pub fn data_dir() -> Result<PathBuf, Box<dyn std::error::Error>> {
    if let Ok(dir) = std::env::var("HABITLOOM_DATA_DIR") {
        let dir = PathBuf::from(dir);
        std::fs::create_dir_all(&dir)?;
        return Ok(dir);
    }

    let base_dir = dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".config");

    let env = std::env::var("HABITLOOM_ENV").unwrap_or_else(|_| "production".to_string());

    let dir = if env == "dev" {
        base_dir.join("habitloom-dev")
    } else {
        base_dir.join("habitloom")
    };

    std::fs::create_dir_all(&dir)?;
    Ok(dir)
}
