use orbis_core::clock::ms_from_date;
use orbis_core::{
    CardMetrics, Completion, Dashboard, FinanceEntryCandidate, FixedClock, HabitCandidate,
    ModuleId, SequentialIds, TaskCandidate,
};
use rust_decimal::Decimal;

fn dashboard_on(year: i32, month: u32, day: u32) -> Dashboard<FixedClock, SequentialIds> {
    Dashboard::with_env(FixedClock::at_date(year, month, day), SequentialIds::new())
}

#[test]
fn empty_collections_produce_non_expandable_cards_in_sidebar_order() {
    let dashboard = dashboard_on(2026, 10, 18);
    let cards = dashboard.overview();

    let modules: Vec<ModuleId> = cards.iter().map(|card| card.module).collect();
    assert_eq!(modules, ModuleId::ALL.to_vec());
    assert!(cards.iter().all(|card| !card.expandable));
    assert_eq!(cards[0].summary_text, "0 open tasks");
    assert_eq!(cards[1].summary_text, "0 of 0 habits done today");
    assert_eq!(cards[2].summary_text, "Balance 0.00");
}

#[test]
fn task_card_reports_open_overdue_and_next_deadline() {
    let mut dashboard = dashboard_on(2026, 10, 18);
    let overdue = dashboard
        .create_task(TaskCandidate::new("File taxes").due_at(ms_from_date(2026, 10, 15).unwrap()))
        .unwrap();
    dashboard
        .create_task(TaskCandidate::new("Book dentist").due_at(ms_from_date(2026, 10, 20).unwrap()))
        .unwrap();
    let finished = dashboard
        .create_task(TaskCandidate::new("Old chore").due_at(ms_from_date(2026, 10, 1).unwrap()))
        .unwrap();
    dashboard.toggle_task(finished.id).unwrap();

    let card = dashboard.summarize(ModuleId::Tasks);
    assert!(card.expandable);
    assert_eq!(card.title, "Tasks");
    assert_eq!(card.summary_text, "2 open tasks, next due 2026-10-15, 1 overdue");
    match card.metrics {
        CardMetrics::Tasks {
            total,
            open,
            overdue: overdue_count,
            completion_rate,
            next_due,
        } => {
            assert_eq!((total, open, overdue_count), (3, 2, 1));
            assert_eq!(completion_rate, 33);
            assert_eq!(next_due.unwrap().task_id, overdue.id);
        }
        other => panic!("unexpected metrics: {other:?}"),
    }
}

#[test]
fn equal_deadlines_pick_the_first_inserted_task() {
    let mut dashboard = dashboard_on(2026, 10, 18);
    let due = ms_from_date(2026, 11, 1).unwrap();
    let first = dashboard
        .create_task(TaskCandidate::new("first").due_at(due))
        .unwrap();
    dashboard
        .create_task(TaskCandidate::new("second").due_at(due))
        .unwrap();

    match dashboard.summarize(ModuleId::Tasks).metrics {
        CardMetrics::Tasks { next_due, .. } => {
            assert_eq!(next_due.unwrap().task_id, first.id);
        }
        other => panic!("unexpected metrics: {other:?}"),
    }
}

#[test]
fn habit_card_counts_today_and_best_streak() {
    let mut dashboard = dashboard_on(2026, 10, 17);
    let reading = dashboard.create_habit(HabitCandidate::new("Read")).unwrap();
    dashboard.create_habit(HabitCandidate::new("Meditate")).unwrap();

    dashboard.complete_habit(reading.id).unwrap();
    dashboard.clock().advance_days(1);
    assert_eq!(
        dashboard.complete_habit(reading.id).unwrap(),
        Completion::Recorded { streak: 2 }
    );
    assert_eq!(
        dashboard.complete_habit(reading.id).unwrap(),
        Completion::AlreadyRecorded
    );

    let card = dashboard.summarize(ModuleId::Habits);
    assert_eq!(card.summary_text, "1 of 2 habits done today, best streak 2 days");
    assert_eq!(
        card.metrics,
        CardMetrics::Habits {
            total: 2,
            completed_today: 1,
            best_streak: 2,
        }
    );
}

#[test]
fn finance_card_shows_balance() {
    let mut dashboard = dashboard_on(2026, 10, 18);
    let at = ms_from_date(2026, 10, 2).unwrap();
    dashboard
        .create_entry(FinanceEntryCandidate::income(Decimal::new(100050, 2), "Salary", at))
        .unwrap();
    dashboard
        .create_entry(FinanceEntryCandidate::expense(Decimal::new(25, 1), "Coffee", at))
        .unwrap();

    let card = dashboard.summarize(ModuleId::Finances);
    assert!(card.expandable);
    assert_eq!(card.summary_text, "Balance 998.00");
}

#[test]
fn summarize_is_idempotent_and_tracks_mutations() {
    let mut dashboard = dashboard_on(2026, 10, 18);
    assert_eq!(
        dashboard.summarize(ModuleId::Habits),
        dashboard.summarize(ModuleId::Habits)
    );

    let habit = dashboard.create_habit(HabitCandidate::new("Walk")).unwrap();
    assert!(dashboard.summarize(ModuleId::Habits).expandable);

    dashboard.delete_habit(habit.id).unwrap();
    assert!(!dashboard.summarize(ModuleId::Habits).expandable);
}
