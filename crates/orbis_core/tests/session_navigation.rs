use orbis_core::{
    Dashboard, FixedClock, ModuleId, NavigationEvent, ProfileCandidate, SequentialIds,
    SessionError, SessionEvent, SessionState, TaskCandidate, Transition,
};

fn dashboard() -> Dashboard<FixedClock, SequentialIds> {
    Dashboard::with_env(FixedClock::at_date(2026, 10, 18), SequentialIds::new())
}

fn onboarded() -> Dashboard<FixedClock, SequentialIds> {
    let mut dashboard = dashboard();
    dashboard
        .submit_onboarding(ProfileCandidate::new("TestUser", "Testar o sistema"))
        .unwrap();
    dashboard
}

#[test]
fn onboarding_then_sidebar_then_collapse() {
    let mut dashboard = dashboard();
    assert_eq!(dashboard.state(), SessionState::Onboarding);

    let tasks: ModuleId = "tasks".parse().unwrap();
    let err = dashboard.expand_card(tasks).unwrap_err();
    assert!(matches!(err, SessionError::IllegalTransition { .. }));
    assert_eq!(dashboard.state(), SessionState::Onboarding);

    dashboard
        .submit_onboarding(ProfileCandidate::new("TestUser", "Testar o sistema"))
        .unwrap();
    assert_eq!(dashboard.state(), SessionState::Overview);
    assert_eq!(dashboard.profile().unwrap().name(), "TestUser");

    dashboard.select_sidebar(tasks).unwrap();
    assert_eq!(dashboard.state(), SessionState::ModuleDetail(ModuleId::Tasks));

    dashboard.collapse().unwrap();
    assert_eq!(dashboard.state(), SessionState::Overview);
}

#[test]
fn invalid_onboarding_keeps_field_errors_in_view() {
    let mut dashboard = dashboard();

    let err = dashboard
        .submit_onboarding(ProfileCandidate::new("", "Get fit"))
        .unwrap_err();
    assert!(matches!(err, SessionError::Validation(ref e) if e.len() == 1));

    let view = dashboard.view();
    assert_eq!(view.state, SessionState::Onboarding);
    assert_eq!(view.errors.len(), 1);
    assert_eq!(view.errors[0].field, "name");
    assert_eq!(view.errors[0].message(), "Required");
    assert!(dashboard.profile().is_none());

    dashboard
        .submit_onboarding(ProfileCandidate::new("Ana", "Get fit"))
        .unwrap();
    assert!(dashboard.view().errors.is_empty());
}

#[test]
fn second_submit_is_rejected_and_profile_kept() {
    let mut dashboard = onboarded();

    let err = dashboard
        .submit_onboarding(ProfileCandidate::new("Other", "Other goal"))
        .unwrap_err();
    assert!(matches!(
        err,
        SessionError::IllegalTransition {
            from: SessionState::Overview,
            event: SessionEvent::SubmitOnboarding,
        }
    ));
    assert_eq!(dashboard.profile().unwrap().name(), "TestUser");
}

#[test]
fn expanding_an_empty_card_is_a_no_op() {
    let mut dashboard = onboarded();

    assert!(!dashboard.summarize(ModuleId::Tasks).expandable);
    assert_eq!(
        dashboard.expand_card(ModuleId::Tasks).unwrap(),
        Transition::Unchanged
    );
    assert_eq!(dashboard.state(), SessionState::Overview);

    dashboard.create_task(TaskCandidate::new("Pay rent")).unwrap();
    assert_eq!(
        dashboard.expand_card(ModuleId::Tasks).unwrap(),
        Transition::Moved {
            from: SessionState::Overview,
            to: SessionState::ModuleDetail(ModuleId::Tasks),
        }
    );
}

#[test]
fn sidebar_ignores_expandability_and_is_idempotent() {
    let mut dashboard = onboarded();

    dashboard.select_sidebar(ModuleId::Habits).unwrap();
    assert_eq!(dashboard.state(), SessionState::ModuleDetail(ModuleId::Habits));

    assert_eq!(
        dashboard.select_sidebar(ModuleId::Habits).unwrap(),
        Transition::Unchanged
    );

    dashboard.select_sidebar(ModuleId::Finances).unwrap();
    assert_eq!(
        dashboard.state(),
        SessionState::ModuleDetail(ModuleId::Finances)
    );
}

#[test]
fn expand_from_detail_is_rejected_and_collapse_in_overview_is_a_no_op() {
    let mut dashboard = onboarded();
    assert_eq!(dashboard.collapse().unwrap(), Transition::Unchanged);

    dashboard.select_sidebar(ModuleId::Tasks).unwrap();
    let err = dashboard
        .navigate(NavigationEvent::ExpandCard(ModuleId::Habits))
        .unwrap_err();
    assert!(matches!(err, SessionError::IllegalTransition { .. }));
    assert_eq!(dashboard.state(), SessionState::ModuleDetail(ModuleId::Tasks));
}

#[test]
fn navigation_never_loses_collection_edits() {
    let mut dashboard = onboarded();
    let task = dashboard.create_task(TaskCandidate::new("Draft")).unwrap();

    dashboard.select_sidebar(ModuleId::Tasks).unwrap();
    dashboard.toggle_task(task.id).unwrap();
    dashboard.collapse().unwrap();
    dashboard.select_sidebar(ModuleId::Finances).unwrap();
    dashboard.collapse().unwrap();

    let tasks = dashboard.list_tasks();
    assert_eq!(tasks.len(), 1);
    assert!(tasks[0].done);
}

#[test]
fn onboarding_does_not_gate_collection_mutations() {
    let mut dashboard = dashboard();
    dashboard.create_task(TaskCandidate::new("Early bird")).unwrap();

    assert_eq!(dashboard.state(), SessionState::Onboarding);
    assert_eq!(dashboard.tasks().len(), 1);
}

#[test]
fn session_view_serializes_with_module_tag() {
    let mut dashboard = onboarded();
    dashboard.select_sidebar(ModuleId::Finances).unwrap();

    let json = serde_json::to_value(dashboard.view()).unwrap();
    assert_eq!(json["state"]["state"], "module_detail");
    assert_eq!(json["state"]["module"], "finances");
}
