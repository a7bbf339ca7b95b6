//! End-to-end engine tests over the SQLite adapter.
//!
//! Exercises the coordinator, ledger, sweep, and badge evaluator through
//! the same store implementation production uses.

use chrono::NaiveDate;
use habitloom_core::habit::sweep;
use habitloom_core::{
    BadgeCategory, Coordinator, DuePolicy, FrequencyRule, Habit, HabitDb, HabitError, HabitStore,
};

fn day(d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 3, d).unwrap()
}

fn db_with_habit() -> (HabitDb, String) {
    let db = HabitDb::open_memory().unwrap();
    let habit = Habit::new("Morning pages", FrequencyRule::Daily);
    let id = habit.id.clone();
    db.insert_habit(&habit).unwrap();
    (db, id)
}

#[test]
fn test_first_completion_initializes_counters() {
    let (mut db, id) = db_with_habit();

    let outcome = Coordinator::new(&mut db)
        .complete_on(&id, day(1), day(1), None, None)
        .unwrap();

    assert_eq!(outcome.streak, 1);
    assert!(outcome.is_new_record);
    assert_eq!(outcome.total_completions, 1);

    let habit = db.habit(&id).unwrap();
    assert_eq!(habit.current_streak, 1);
    assert_eq!(habit.best_streak, 1);
    assert_eq!(habit.last_completed, Some(day(1)));
}

#[test]
fn test_three_consecutive_days() {
    let (mut db, id) = db_with_habit();
    let mut coordinator = Coordinator::new(&mut db);

    for d in 1..=3 {
        coordinator.complete_on(&id, day(d), day(d), None, None).unwrap();
    }

    let habit = db.habit(&id).unwrap();
    assert_eq!(habit.current_streak, 3);
    assert_eq!(habit.best_streak, 3);
    assert_eq!(habit.total_completions, 3);
}

#[test]
fn test_sweep_breaks_streak_but_preserves_history() {
    let (mut db, id) = db_with_habit();
    let mut coordinator = Coordinator::new(&mut db);
    coordinator.complete_on(&id, day(1), day(1), None, None).unwrap();
    coordinator.complete_on(&id, day(2), day(2), None, None).unwrap();

    // Device was off for days 3-4; sweep catches up on day 5.
    let summary = sweep::run(&mut db, day(5)).unwrap();
    assert_eq!(summary.streaks_broken, 1);

    let habit = db.habit(&id).unwrap();
    assert_eq!(habit.current_streak, 0);
    assert_eq!(habit.best_streak, 2);
    assert_eq!(habit.last_completed, Some(day(2)));
    assert!(!habit.completed_today);
}

#[test]
fn test_badge_unlocks_single_best_tier_only() {
    let (mut db, id) = db_with_habit();
    let mut coordinator = Coordinator::new(&mut db);

    // Reach a streak of 5: streak-3 unlocks, streak-7 does not, and no
    // intermediate "streak-5" tier exists to unlock.
    for d in 1..=5 {
        coordinator.complete_on(&id, day(d), day(d), None, None).unwrap();
    }

    let unlocks = db.unlocked_badges(Some(&id)).unwrap();
    let streak_badges: Vec<_> = unlocks
        .iter()
        .filter(|u| u.badge_id.starts_with("streak-"))
        .collect();
    assert_eq!(streak_badges.len(), 1);
    assert_eq!(streak_badges[0].badge_id, "streak-3");
    assert_eq!(streak_badges[0].value_at_unlock, Some(3));
    assert!(streak_badges[0].highlighted);
}

#[test]
fn test_repeated_evaluation_creates_one_unlock() {
    let (mut db, id) = db_with_habit();
    let mut coordinator = Coordinator::new(&mut db);
    for d in 1..=3 {
        coordinator.complete_on(&id, day(d), day(d), None, None).unwrap();
    }

    let mut coordinator = Coordinator::new(&mut db);
    coordinator
        .evaluate(BadgeCategory::Streak, Some(&id), 3)
        .unwrap();
    coordinator
        .evaluate(BadgeCategory::Streak, Some(&id), 3)
        .unwrap();

    let unlocks = db.unlocked_badges(Some(&id)).unwrap();
    let streak_unlocks = unlocks
        .iter()
        .filter(|u| u.badge_id == "streak-3")
        .count();
    assert_eq!(streak_unlocks, 1);
}

#[test]
fn test_complete_undo_round_trip_keeps_badges() {
    let (mut db, id) = db_with_habit();
    let mut coordinator = Coordinator::new(&mut db);
    coordinator.complete_on(&id, day(1), day(1), None, None).unwrap();
    coordinator.complete_on(&id, day(2), day(2), None, None).unwrap();
    let before = db.habit(&id).unwrap();
    let badges_before = db.unlocked_badges(Some(&id)).unwrap().len();

    let mut coordinator = Coordinator::new(&mut db);
    coordinator.complete_on(&id, day(3), day(3), None, None).unwrap();
    coordinator.undo_on(&id, day(3), day(3)).unwrap();

    let habit = db.habit(&id).unwrap();
    assert_eq!(habit.current_streak, before.current_streak);
    assert_eq!(habit.total_completions, before.total_completions);
    assert_eq!(habit.last_completed, before.last_completed);
    // The streak-3 badge earned before the undo is permanent.
    assert!(db.unlocked_badges(Some(&id)).unwrap().len() >= badges_before);
}

#[test]
fn test_complete_twice_same_day_is_idempotent() {
    let (mut db, id) = db_with_habit();
    let mut coordinator = Coordinator::new(&mut db);

    let first = coordinator.complete_on(&id, day(1), day(1), None, None).unwrap();
    let second = coordinator.complete_on(&id, day(1), day(1), None, None).unwrap();

    assert_eq!(first.streak, second.streak);
    assert_eq!(first.total_completions, second.total_completions);
    assert_eq!(db.completion_days(&id).unwrap().len(), 1);
}

#[test]
fn test_strict_policy_round_trip_allows_recompletion() {
    let (mut db, id) = db_with_habit();
    let mut coordinator = Coordinator::with_policy(&mut db, DuePolicy::Strict);

    coordinator.complete_on(&id, day(1), day(1), None, None).unwrap();
    let err = coordinator.complete_on(&id, day(1), day(1), None, None).unwrap_err();
    assert!(matches!(err, HabitError::NotDue { .. }));

    // Undo frees the slot again under the strict policy.
    coordinator.undo_on(&id, day(1), day(1)).unwrap();
    assert!(coordinator.complete_on(&id, day(1), day(1), None, None).is_ok());
}

#[test]
fn test_stale_habit_commit_surfaces_conflict() {
    let (mut db, id) = db_with_habit();

    // Simulate two concurrent callers reading the same version.
    let reader_a = db.habit(&id).unwrap();
    let reader_b = db.habit(&id).unwrap();

    db.commit(&reader_a, habitloom_core::LogDelta::None).unwrap();
    let err = db
        .commit(&reader_b, habitloom_core::LogDelta::None)
        .unwrap_err();

    assert!(matches!(err, HabitError::ConflictingUpdate { .. }));
}

#[test]
fn test_on_disk_database_persists_across_reopen() {
    let dir = tempfile::tempdir().unwrap();
    std::env::set_var("HABITLOOM_DATA_DIR", dir.path());

    let id = {
        let mut db = HabitDb::open().unwrap();
        let habit = Habit::new("Read", FrequencyRule::Daily);
        let id = habit.id.clone();
        db.insert_habit(&habit).unwrap();
        Coordinator::new(&mut db)
            .complete_on(&id, day(1), day(1), None, None)
            .unwrap();
        id
    };

    let db = HabitDb::open().unwrap();
    let habit = db.habit(&id).unwrap();
    assert_eq!(habit.total_completions, 1);
    assert_eq!(habit.last_completed, Some(day(1)));

    std::env::remove_var("HABITLOOM_DATA_DIR");
}

#[test]
fn test_weekly_habit_accepts_off_schedule_completion() {
    let db = HabitDb::open_memory().unwrap();
    let habit = Habit::new(
        "Weekly review",
        FrequencyRule::WeeklyOnDays {
            days: [1u8].into_iter().collect(), // Mondays
        },
    );
    let id = habit.id.clone();
    db.insert_habit(&habit).unwrap();
    let mut db = db;

    // 2026-03-03 is a Tuesday; advisory policy logs it anyway.
    let outcome = Coordinator::new(&mut db)
        .complete_on(&id, day(3), day(3), None, None)
        .unwrap();
    assert_eq!(outcome.streak, 1);
}
