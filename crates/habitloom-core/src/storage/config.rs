//! TOML-based application configuration.
//!
//! Stores user preferences including:
//! - The due policy (advisory or strict)
//! - The timezone offset used to resolve "today" as a calendar day
//! - Badge notification behavior
//!
//! Configuration is stored at `~/.config/habitloom/config.toml`.

use chrono::{Duration, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::error::ConfigError;
use crate::habit::DuePolicy;

use super::data_dir;

/// Engine-facing behavior settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneralConfig {
    /// Whether due-ness gates completion (`strict`) or only drives
    /// reminders (`advisory`).
    #[serde(default)]
    pub due_policy: DuePolicy,
    /// Offset in hours from UTC used to compute the local calendar day.
    #[serde(default)]
    pub timezone_offset_hours: i32,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            due_policy: DuePolicy::Advisory,
            timezone_offset_hours: 0,
        }
    }
}

/// Notification configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotificationsConfig {
    /// Announce newly unlocked badges in CLI output.
    #[serde(default = "default_true")]
    pub badge_unlocks: bool,
}

impl Default for NotificationsConfig {
    fn default() -> Self {
        Self { badge_unlocks: true }
    }
}

fn default_true() -> bool {
    true
}

/// Application configuration.
///
/// Serialized to/from TOML at `~/.config/habitloom/config.toml`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub general: GeneralConfig,
    #[serde(default)]
    pub notifications: NotificationsConfig,
}

impl Config {
    /// Path to the configuration file.
    pub fn path() -> Result<PathBuf, ConfigError> {
        let dir = data_dir().map_err(|e| ConfigError::LoadFailed {
            path: PathBuf::from("~/.config/habitloom"),
            message: e.to_string(),
        })?;
        Ok(dir.join("config.toml"))
    }

    /// Load the configuration, falling back to defaults when the file does
    /// not exist yet.
    pub fn load() -> Result<Self, ConfigError> {
        let path = Self::path()?;
        if !path.exists() {
            return Ok(Config::default());
        }
        let content = std::fs::read_to_string(&path).map_err(|e| ConfigError::LoadFailed {
            path: path.clone(),
            message: e.to_string(),
        })?;
        toml::from_str(&content).map_err(|e| ConfigError::ParseFailed(e.to_string()))
    }

    /// Save the configuration.
    pub fn save(&self) -> Result<(), ConfigError> {
        let path = Self::path()?;
        let content =
            toml::to_string_pretty(self).map_err(|e| ConfigError::ParseFailed(e.to_string()))?;
        std::fs::write(&path, content).map_err(|e| ConfigError::SaveFailed {
            path,
            message: e.to_string(),
        })
    }

    /// The current calendar day in the configured local time zone.
    ///
    /// This is the single place the wall clock is read; everything below
    /// the CLI boundary takes the day as an explicit parameter.
    pub fn today(&self) -> NaiveDate {
        (Utc::now() + Duration::hours(i64::from(self.general.timezone_offset_hours))).date_naive()
    }

    /// Get a config value as string by dot-separated key.
    pub fn get(&self, key: &str) -> Option<String> {
        let json = serde_json::to_value(self).ok()?;
        let val = Self::get_json_value_by_path(&json, key)?;
        match val {
            serde_json::Value::String(s) => Some(s.clone()),
            other => Some(other.to_string()),
        }
    }

    /// Set a config value by dot-separated key and persist the result.
    ///
    /// # Errors
    ///
    /// Returns an error if the key is unknown, the value cannot be parsed
    /// as the field's type, or the config cannot be saved.
    pub fn set(&mut self, key: &str, value: &str) -> Result<(), Box<dyn std::error::Error>> {
        let mut json = serde_json::to_value(&*self)?;
        Self::set_json_value_by_path(&mut json, key, value)?;
        *self = serde_json::from_value(json)?;
        self.save()?;
        Ok(())
    }

    fn get_json_value_by_path<'a>(
        root: &'a serde_json::Value,
        key: &str,
    ) -> Option<&'a serde_json::Value> {
        if key.is_empty() {
            return None;
        }

        let mut current = root;
        for part in key.split('.') {
            current = current.get(part)?;
        }
        Some(current)
    }

    fn set_json_value_by_path(
        root: &mut serde_json::Value,
        key: &str,
        value: &str,
    ) -> Result<(), Box<dyn std::error::Error>> {
        let mut parts = key.split('.').peekable();
        if parts.peek().is_none() {
            return Err("config key is empty".into());
        }

        let mut current = root;
        while let Some(part) = parts.next() {
            let is_leaf = parts.peek().is_none();
            if is_leaf {
                let obj = current
                    .as_object_mut()
                    .ok_or_else(|| format!("unknown config key: {key}"))?;
                let existing = obj
                    .get(part)
                    .ok_or_else(|| format!("unknown config key: {key}"))?;

                let new_value = match existing {
                    serde_json::Value::Bool(_) => serde_json::Value::Bool(value.parse::<bool>()?),
                    serde_json::Value::Number(_) => {
                        if let Ok(n) = value.parse::<i64>() {
                            serde_json::Value::Number(n.into())
                        } else {
                            return Err(format!("cannot parse '{value}' as number").into());
                        }
                    }
                    _ => serde_json::Value::String(value.into()),
                };

                obj.insert(part.to_string(), new_value);
                return Ok(());
            }

            current = current
                .get_mut(part)
                .ok_or_else(|| format!("unknown config key: {key}"))?;
        }

        Err(format!("unknown config key: {key}").into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.general.due_policy, DuePolicy::Advisory);
        assert_eq!(config.general.timezone_offset_hours, 0);
        assert!(config.notifications.badge_unlocks);
    }

    #[test]
    fn test_toml_round_trip() {
        let mut config = Config::default();
        config.general.due_policy = DuePolicy::Strict;
        config.general.timezone_offset_hours = 9;

        let toml_str = toml::to_string_pretty(&config).unwrap();
        let back: Config = toml::from_str(&toml_str).unwrap();

        assert_eq!(back.general.due_policy, DuePolicy::Strict);
        assert_eq!(back.general.timezone_offset_hours, 9);
    }

    #[test]
    fn test_get_by_dotted_key() {
        let config = Config::default();
        assert_eq!(config.get("general.due_policy").as_deref(), Some("advisory"));
        assert_eq!(config.get("general.timezone_offset_hours").as_deref(), Some("0"));
        assert_eq!(config.get("notifications.badge_unlocks").as_deref(), Some("true"));
        assert_eq!(config.get("general.nope"), None);
    }

    #[test]
    fn test_set_by_dotted_key_rejects_unknown_and_bad_type() {
        let config = Config::default();
        let mut json = serde_json::to_value(&config).unwrap();
        Config::set_json_value_by_path(&mut json, "general.timezone_offset_hours", "-5").unwrap();
        let back: Config = serde_json::from_value(json.clone()).unwrap();
        assert_eq!(back.general.timezone_offset_hours, -5);

        assert!(Config::set_json_value_by_path(&mut json, "general.bogus", "1").is_err());
        assert!(
            Config::set_json_value_by_path(&mut json, "notifications.badge_unlocks", "maybe")
                .is_err()
        );
    }

    #[test]
    fn test_partial_file_uses_field_defaults() {
        let config: Config = toml::from_str("[general]\ntimezone_offset_hours = -5\n").unwrap();
        assert_eq!(config.general.timezone_offset_hours, -5);
        assert_eq!(config.general.due_policy, DuePolicy::Advisory);
        assert!(config.notifications.badge_unlocks);
    }
}
