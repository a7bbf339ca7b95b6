//! Cadence rules and due-date evaluation.
//!
//! [`FrequencyRule::is_due_on`] is a pure function: no side effects, no
//! I/O, no ambient clock. Callers pass the calendar day explicitly.

use std::collections::BTreeSet;

use chrono::{Datelike, NaiveDate, Weekday};
use serde::{Deserialize, Serialize};

/// Configured cadence of a habit.
///
/// Weekday sets use 0=Sun ... 6=Sat, day-of-month sets use 1..=31. An empty
/// day set is treated as "never due" rather than an error, since it is only
/// reachable through stored data.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FrequencyRule {
    /// Due every day until completed
    Daily,
    /// Due on specific weekdays (0=Sun ... 6=Sat)
    WeeklyOnDays { days: BTreeSet<u8> },
    /// Due on specific days of the month (1..=31)
    MonthlyOnDays { days: BTreeSet<u8> },
    /// Due once `interval` calendar days have elapsed since the last completion
    EveryNDays { interval: u32 },
}

impl FrequencyRule {
    /// Whether this cadence expects a completion on `day`, given the day of
    /// the most recent completion.
    pub fn is_due_on(&self, day: NaiveDate, last_completed: Option<NaiveDate>) -> bool {
        match self {
            FrequencyRule::Daily => last_completed != Some(day),
            FrequencyRule::WeeklyOnDays { days } => {
                days.contains(&weekday_index(day.weekday()))
            }
            FrequencyRule::MonthlyOnDays { days } => days.contains(&(day.day() as u8)),
            FrequencyRule::EveryNDays { interval } => match last_completed {
                None => true,
                Some(last) => (day - last).num_days() >= i64::from(*interval),
            },
        }
    }

    /// Short human-readable cadence description.
    pub fn describe(&self) -> String {
        match self {
            FrequencyRule::Daily => "daily".to_string(),
            FrequencyRule::WeeklyOnDays { days } => {
                let names: Vec<&str> = days
                    .iter()
                    .filter_map(|d| weekday_name(*d))
                    .collect();
                format!("weekly on {}", names.join(", "))
            }
            FrequencyRule::MonthlyOnDays { days } => {
                let nums: Vec<String> = days.iter().map(|d| d.to_string()).collect();
                format!("monthly on day {}", nums.join(", "))
            }
            FrequencyRule::EveryNDays { interval } => format!("every {interval} days"),
        }
    }
}

/// Index of a weekday in the 0=Sun ... 6=Sat convention.
pub fn weekday_index(weekday: Weekday) -> u8 {
    weekday.num_days_from_sunday() as u8
}

fn weekday_name(index: u8) -> Option<&'static str> {
    match index {
        0 => Some("Sun"),
        1 => Some("Mon"),
        2 => Some("Tue"),
        3 => Some("Wed"),
        4 => Some("Thu"),
        5 => Some("Fri"),
        6 => Some("Sat"),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_daily_due_unless_completed_that_day() {
        let rule = FrequencyRule::Daily;
        let today = day(2026, 3, 2);
        assert!(rule.is_due_on(today, None));
        assert!(rule.is_due_on(today, Some(day(2026, 3, 1))));
        assert!(!rule.is_due_on(today, Some(today)));
    }

    #[test]
    fn test_weekly_matches_configured_weekdays() {
        let rule = FrequencyRule::WeeklyOnDays {
            days: [1u8, 3].into_iter().collect(), // Mon, Wed
        };
        assert!(rule.is_due_on(day(2026, 3, 2), None)); // Monday
        assert!(!rule.is_due_on(day(2026, 3, 3), None)); // Tuesday
        assert!(rule.is_due_on(day(2026, 3, 4), None)); // Wednesday
        // last_completed is irrelevant for weekly cadence
        assert!(rule.is_due_on(day(2026, 3, 2), Some(day(2026, 3, 2))));
    }

    #[test]
    fn test_monthly_matches_configured_days() {
        let rule = FrequencyRule::MonthlyOnDays {
            days: [1u8, 15].into_iter().collect(),
        };
        assert!(rule.is_due_on(day(2026, 3, 1), None));
        assert!(rule.is_due_on(day(2026, 3, 15), None));
        assert!(!rule.is_due_on(day(2026, 3, 16), None));
    }

    #[test]
    fn test_empty_day_set_is_never_due() {
        let weekly = FrequencyRule::WeeklyOnDays { days: BTreeSet::new() };
        let monthly = FrequencyRule::MonthlyOnDays { days: BTreeSet::new() };
        for d in 1..=28 {
            assert!(!weekly.is_due_on(day(2026, 2, d), None));
            assert!(!monthly.is_due_on(day(2026, 2, d), None));
        }
    }

    #[test]
    fn test_every_n_days_gap() {
        let rule = FrequencyRule::EveryNDays { interval: 3 };
        assert!(rule.is_due_on(day(2026, 3, 10), None));
        assert!(!rule.is_due_on(day(2026, 3, 10), Some(day(2026, 3, 8))));
        assert!(rule.is_due_on(day(2026, 3, 10), Some(day(2026, 3, 7))));
        assert!(rule.is_due_on(day(2026, 3, 10), Some(day(2026, 3, 1))));
    }

    #[test]
    fn test_is_due_on_is_pure() {
        let rule = FrequencyRule::EveryNDays { interval: 2 };
        let d = day(2026, 3, 10);
        let last = Some(day(2026, 3, 9));
        let first = rule.is_due_on(d, last);
        let second = rule.is_due_on(d, last);
        assert_eq!(first, second);
    }

    #[test]
    fn test_serde_round_trip() {
        let rule = FrequencyRule::WeeklyOnDays {
            days: [0u8, 6].into_iter().collect(),
        };
        let json = serde_json::to_string(&rule).unwrap();
        let back: FrequencyRule = serde_json::from_str(&json).unwrap();
        assert_eq!(rule, back);
    }

    #[test]
    fn test_describe() {
        assert_eq!(FrequencyRule::Daily.describe(), "daily");
        assert_eq!(
            FrequencyRule::EveryNDays { interval: 3 }.describe(),
            "every 3 days"
        );
        let rule = FrequencyRule::WeeklyOnDays {
            days: [1u8, 5].into_iter().collect(),
        };
        assert_eq!(rule.describe(), "weekly on Mon, Fri");
    }
}
