use orbis_core::clock::ms_from_date;
use orbis_core::db::{open_db, open_db_in_memory};
use orbis_core::store::{FINANCES_KEY, HABITS_KEY, PROFILE_KEY, TASKS_KEY};
use orbis_core::{
    CollectionError, Completion, Dashboard, FinanceEntryCandidate, FixedClock, HabitCandidate,
    KeyValueStore, MemoryStore, ProfileCandidate, SequentialIds, SessionState, SqliteKvStore,
    StoreError, StoreOp, TaskCandidate,
};
use rust_decimal::Decimal;
use uuid::Uuid;

fn clock() -> FixedClock {
    FixedClock::at_date(2026, 10, 18)
}

fn populated() -> Dashboard<FixedClock, SequentialIds> {
    let mut dashboard = Dashboard::with_env(clock(), SequentialIds::new());
    dashboard
        .submit_onboarding(ProfileCandidate::new("TestUser", "Testar o sistema"))
        .unwrap();
    dashboard
        .create_task(TaskCandidate::new("Pay rent").due_at(ms_from_date(2026, 10, 25).unwrap()))
        .unwrap();
    let habit = dashboard.create_habit(HabitCandidate::new("Read")).unwrap();
    dashboard.complete_habit(habit.id).unwrap();
    dashboard
        .create_entry(FinanceEntryCandidate::income(
            Decimal::new(1000, 0),
            "Salary",
            ms_from_date(2026, 10, 1).unwrap(),
        ))
        .unwrap();
    dashboard
}

#[test]
fn memory_store_round_trip_resumes_in_overview() {
    let store = MemoryStore::new();
    let original = populated();
    original.save(&store).unwrap();
    assert_eq!(store.len(), 4);

    let restored = Dashboard::restore(&store, clock(), SequentialIds::starting_at(100)).unwrap();

    assert_eq!(restored.state(), SessionState::Overview);
    assert_eq!(restored.profile().unwrap().objective(), "Testar o sistema");
    assert_eq!(restored.list_tasks(), original.list_tasks());
    assert_eq!(restored.list_habits(), original.list_habits());
    assert_eq!(restored.list_entries(), original.list_entries());
    assert_eq!(restored.overview(), original.overview());
}

#[test]
fn missing_profile_restores_into_onboarding() {
    let store = MemoryStore::new();
    let mut dashboard = Dashboard::with_env(clock(), SequentialIds::new());
    dashboard.create_task(TaskCandidate::new("Before signup")).unwrap();
    dashboard.save(&store).unwrap();
    assert_eq!(store.get(PROFILE_KEY).unwrap(), None);

    let restored = Dashboard::restore(&store, clock(), SequentialIds::new()).unwrap();
    assert_eq!(restored.state(), SessionState::Onboarding);
    assert_eq!(restored.tasks().len(), 1);
}

#[test]
fn empty_store_restores_a_fresh_dashboard() {
    let store = MemoryStore::new();
    let restored = Dashboard::restore(&store, clock(), SequentialIds::new()).unwrap();

    assert_eq!(restored.state(), SessionState::Onboarding);
    assert!(restored.tasks().is_empty());
    assert!(restored.habits().is_empty());
    assert!(restored.ledger().is_empty());
}

#[test]
fn restored_ids_are_not_reissued() {
    let store = MemoryStore::new();
    let mut dashboard = Dashboard::with_env(clock(), SequentialIds::new());
    let gone = dashboard.create_task(TaskCandidate::new("gone")).unwrap();
    dashboard.delete_task(gone.id).unwrap();
    dashboard.save(&store).unwrap();

    let mut restored = Dashboard::restore(&store, clock(), SequentialIds::new()).unwrap();
    let fresh = restored.create_task(TaskCandidate::new("fresh")).unwrap();
    assert_ne!(fresh.id, gone.id);
    assert_eq!(fresh.id, Uuid::from_u128(2));
}

#[test]
fn habit_streak_survives_restore() {
    let store = MemoryStore::new();
    populated().save(&store).unwrap();

    let mut restored = Dashboard::restore(&store, clock(), SequentialIds::starting_at(50)).unwrap();
    let habit_id = restored.list_habits()[0].id;
    assert_eq!(
        restored.complete_habit(habit_id).unwrap(),
        Completion::AlreadyRecorded
    );

    restored.clock().advance_days(1);
    assert_eq!(
        restored.complete_habit(habit_id).unwrap(),
        Completion::Recorded { streak: 2 }
    );
}

#[test]
fn corrupt_json_is_reported_with_its_key() {
    let store = MemoryStore::new();
    store
        .put_all(&[(TASKS_KEY, "{not json".to_string())])
        .unwrap();

    match Dashboard::restore(&store, clock(), SequentialIds::new()) {
        Err(StoreError::Serialization { key, .. }) => assert_eq!(key, TASKS_KEY),
        Err(other) => panic!("unexpected error: {other}"),
        Ok(_) => panic!("corrupt data was accepted"),
    }
}

#[test]
fn stored_records_are_revalidated() {
    let store = MemoryStore::new();
    let bad_habit = r#"{"records":[{"id":"00000000-0000-0000-0000-000000000001","name":"Read","description":null,"monthly_goal":45,"streak_count":0,"last_completed_at":null,"completed_on":[]}]}"#;
    store
        .put_all(&[(HABITS_KEY, bad_habit.to_string())])
        .unwrap();

    match Dashboard::restore(&store, clock(), SequentialIds::new()) {
        Err(StoreError::InvalidData { key, .. }) => assert_eq!(key, HABITS_KEY),
        Err(other) => panic!("unexpected error: {other}"),
        Ok(_) => panic!("invalid habit was accepted"),
    }
}

#[test]
fn blank_stored_profile_is_rejected() {
    let store = MemoryStore::new();
    store
        .put_all(&[(PROFILE_KEY, r#"{"name":" ","objective":"x"}"#.to_string())])
        .unwrap();

    assert!(matches!(
        Dashboard::restore(&store, clock(), SequentialIds::new()),
        Err(StoreError::InvalidData { .. })
    ));
}

#[test]
fn sqlite_store_round_trip_across_connections() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("orbis.db");
    let original = populated();

    {
        let conn = open_db(&path).unwrap();
        original.save(&SqliteKvStore::new(&conn)).unwrap();
    }

    let conn = open_db(&path).unwrap();
    let store = SqliteKvStore::new(&conn);
    for key in [PROFILE_KEY, TASKS_KEY, HABITS_KEY, FINANCES_KEY] {
        assert!(store.get(key).unwrap().is_some(), "missing {key}");
    }

    let restored = Dashboard::restore(&store, clock(), SequentialIds::starting_at(100)).unwrap();
    assert_eq!(restored.state(), SessionState::Overview);
    assert_eq!(restored.aggregate(), original.aggregate());
    assert_eq!(restored.overview(), original.overview());
}

#[test]
fn sqlite_store_overwrites_and_removes_keys() {
    let conn = open_db_in_memory().unwrap();
    let store = SqliteKvStore::new(&conn);

    store
        .put_all(&[("orbis_tasks", "1".to_string()), ("orbis_habits", "2".to_string())])
        .unwrap();
    store.put_all(&[("orbis_tasks", "3".to_string())]).unwrap();
    assert_eq!(store.get("orbis_tasks").unwrap().as_deref(), Some("3"));

    store.remove("orbis_habits").unwrap();
    store.remove("orbis_habits").unwrap();
    assert_eq!(store.get("orbis_habits").unwrap(), None);
}

#[test]
fn sqlite_store_rejects_blank_key_atomically() {
    let conn = open_db_in_memory().unwrap();
    let store = SqliteKvStore::new(&conn);

    let err = store
        .put_all(&[("orbis_tasks", "1".to_string()), ("", "2".to_string())])
        .unwrap_err();
    assert!(matches!(err, StoreError::InvalidKey));
    assert_eq!(store.get("orbis_tasks").unwrap(), None);
}

#[test]
fn fresh_session_saved_over_onboarded_store_restores_into_onboarding() {
    let store = MemoryStore::new();
    populated().save(&store).unwrap();

    let fresh = Dashboard::with_env(clock(), SequentialIds::new());
    fresh.save(&store).unwrap();

    assert_eq!(store.get(PROFILE_KEY).unwrap(), None);
    let restored = Dashboard::restore(&store, clock(), SequentialIds::new()).unwrap();
    assert_eq!(restored.state(), SessionState::Onboarding);
    assert!(restored.profile().is_none());
    assert!(restored.tasks().is_empty());
}

#[test]
fn sqlite_save_without_profile_clears_the_stored_one() {
    let conn = open_db_in_memory().unwrap();
    let store = SqliteKvStore::new(&conn);
    populated().save(&store).unwrap();
    assert!(store.get(PROFILE_KEY).unwrap().is_some());

    Dashboard::with_env(clock(), SequentialIds::new())
        .save(&store)
        .unwrap();

    assert_eq!(store.get(PROFILE_KEY).unwrap(), None);
    let restored = Dashboard::restore(&store, clock(), SequentialIds::new()).unwrap();
    assert_eq!(restored.state(), SessionState::Onboarding);
}

#[test]
fn sqlite_apply_rolls_back_on_blank_key() {
    let conn = open_db_in_memory().unwrap();
    let store = SqliteKvStore::new(&conn);
    store.put_all(&[(PROFILE_KEY, "{}".to_string())]).unwrap();

    let err = store
        .apply(&[
            StoreOp::Remove { key: PROFILE_KEY },
            StoreOp::Put {
                key: " ",
                value: "x".to_string(),
            },
        ])
        .unwrap_err();
    assert!(matches!(err, StoreError::InvalidKey));
    assert_eq!(store.get(PROFILE_KEY).unwrap().as_deref(), Some("{}"));
}

#[test]
fn stored_habit_streak_must_match_its_history() {
    let store = MemoryStore::new();
    let forged = r#"{"records":[{"id":"00000000-0000-0000-0000-000000000001","name":"Read","description":null,"monthly_goal":30,"streak_count":9,"last_completed_at":null,"completed_on":[]}]}"#;
    store.put_all(&[(HABITS_KEY, forged.to_string())]).unwrap();

    match Dashboard::restore(&store, clock(), SequentialIds::new()) {
        Err(StoreError::InvalidData {
            key,
            source: CollectionError::Validation(errors),
        }) => {
            assert_eq!(key, HABITS_KEY);
            assert!(errors.field("streak_count").is_some());
        }
        Err(other) => panic!("unexpected error: {other}"),
        Ok(_) => panic!("inconsistent habit was accepted"),
    }
}
