pub mod badge;
pub mod config;
pub mod habit;
pub mod log;
pub mod stats;
pub mod sweep;
