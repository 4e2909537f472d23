//! Dashboard facade consumed by the presentation layer.
//!
//! # Responsibility
//! - Own the session state and the three module collections explicitly.
//! - Expose onboarding, CRUD, overview cards, finance summary and
//!   navigation as synchronous commands.
//! - Save and restore state through a `KeyValueStore`.
//!
//! # Invariants
//! - Navigation never touches collection contents, so switching between
//!   overview and detail views cannot lose edits.
//! - Derived views (cards, finance summary) are recomputed on every call.
//! - A restored dashboard resumes past onboarding iff a profile was stored.

use crate::clock::{Clock, SystemClock};
use crate::collection::{Collection, CollectionError, CollectionResult, CollectionSnapshot, Record};
use crate::finance::{self, FinanceSummary, SeriesPeriod};
use crate::ids::{IdGenerator, RandomIds, RecordId};
use crate::model::finance::{FinanceEntry, FinanceEntryCandidate, FinanceEntryPatch};
use crate::model::habit::{Completion, Habit, HabitCandidate, HabitPatch};
use crate::model::module::ModuleId;
use crate::model::profile::{Profile, ProfileCandidate};
use crate::model::task::{Task, TaskCandidate, TaskFilter, TaskPatch};
use crate::overview::{self, OverviewCard, OverviewSource};
use crate::session::{
    NavigationEvent, Session, SessionError, SessionState, SessionView, Transition,
};
use crate::store::{
    KeyValueStore, StoreError, StoreOp, StoreResult, FINANCES_KEY, HABITS_KEY, PROFILE_KEY,
    TASKS_KEY,
};
use crate::validation::validate_profile;
use log::info;
use serde::de::DeserializeOwned;
use serde::Serialize;

/// Single-user dashboard core.
pub struct Dashboard<C: Clock = SystemClock, G: IdGenerator = RandomIds> {
    session: Session,
    tasks: Collection<Task>,
    habits: Collection<Habit>,
    ledger: Collection<FinanceEntry>,
    series_period: SeriesPeriod,
    clock: C,
    ids: G,
}

impl Dashboard {
    /// Creates an empty dashboard on wall-clock time and random ids.
    pub fn new() -> Self {
        Self::with_env(SystemClock, RandomIds)
    }
}

impl Default for Dashboard {
    fn default() -> Self {
        Self::new()
    }
}

impl<C: Clock, G: IdGenerator> Dashboard<C, G> {
    /// Creates an empty dashboard, starting in onboarding.
    pub fn with_env(clock: C, ids: G) -> Self {
        Self {
            session: Session::new(),
            tasks: Collection::new(),
            habits: Collection::new(),
            ledger: Collection::new(),
            series_period: SeriesPeriod::default(),
            clock,
            ids,
        }
    }

    /// Sets the bucket period used by [`Dashboard::aggregate`].
    pub fn with_series_period(mut self, period: SeriesPeriod) -> Self {
        self.series_period = period;
        self
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }

    // ---- session -------------------------------------------------------

    pub fn submit_onboarding(&mut self, candidate: ProfileCandidate) -> Result<(), SessionError> {
        self.session.submit(candidate).map(|_| ())
    }

    pub fn profile(&self) -> Option<&Profile> {
        self.session.profile()
    }

    pub fn state(&self) -> SessionState {
        self.session.state()
    }

    /// Current view plus pending onboarding field errors.
    pub fn view(&self) -> SessionView {
        self.session.view()
    }

    pub fn navigate(&mut self, event: NavigationEvent) -> Result<Transition, SessionError> {
        let source = OverviewSource {
            tasks: &self.tasks,
            habits: &self.habits,
            ledger: &self.ledger,
        };
        let clock = &self.clock;
        self.session.navigate(event, |module| {
            overview::summarize(module, source, clock).expandable
        })
    }

    pub fn expand_card(&mut self, module: ModuleId) -> Result<Transition, SessionError> {
        self.navigate(NavigationEvent::ExpandCard(module))
    }

    pub fn select_sidebar(&mut self, module: ModuleId) -> Result<Transition, SessionError> {
        self.navigate(NavigationEvent::SelectSidebar(module))
    }

    pub fn collapse(&mut self) -> Result<Transition, SessionError> {
        self.navigate(NavigationEvent::Collapse)
    }

    // ---- derived views -------------------------------------------------

    pub fn summarize(&self, module: ModuleId) -> OverviewCard {
        overview::summarize(module, self.source(), &self.clock)
    }

    /// Every overview card in sidebar order.
    pub fn overview(&self) -> Vec<OverviewCard> {
        overview::summarize_all(self.source(), &self.clock)
    }

    pub fn aggregate(&self) -> FinanceSummary {
        finance::aggregate(self.ledger.iter(), self.series_period)
    }

    fn source(&self) -> OverviewSource<'_> {
        OverviewSource {
            tasks: &self.tasks,
            habits: &self.habits,
            ledger: &self.ledger,
        }
    }

    // ---- tasks ---------------------------------------------------------

    pub fn create_task(&mut self, candidate: TaskCandidate) -> CollectionResult<Task> {
        self.tasks.create(candidate, &mut self.ids)
    }

    pub fn update_task(&mut self, id: RecordId, patch: TaskPatch) -> CollectionResult<Task> {
        self.tasks.update(id, patch)
    }

    /// Flips the `done` flag of a task. Either way the task leaves the
    /// in-progress column.
    pub fn toggle_task(&mut self, id: RecordId) -> CollectionResult<Task> {
        let done = self.tasks.get(id)?.done;
        self.tasks
            .update(id, TaskPatch::default().done(!done).in_progress(false))
    }

    pub fn delete_task(&mut self, id: RecordId) -> CollectionResult<()> {
        self.tasks.delete(id)
    }

    pub fn list_tasks(&self) -> Vec<Task> {
        self.tasks.list()
    }

    /// Tasks matching `filter` as of the dashboard clock, in insertion order.
    pub fn list_tasks_by(&self, filter: TaskFilter) -> Vec<Task> {
        let now_ms = self.clock.now_ms();
        self.tasks
            .iter()
            .filter(|task| filter.matches(task, now_ms))
            .cloned()
            .collect()
    }

    pub fn tasks(&self) -> &Collection<Task> {
        &self.tasks
    }

    // ---- habits --------------------------------------------------------

    pub fn create_habit(&mut self, candidate: HabitCandidate) -> CollectionResult<Habit> {
        self.habits.create(candidate, &mut self.ids)
    }

    pub fn update_habit(&mut self, id: RecordId, patch: HabitPatch) -> CollectionResult<Habit> {
        self.habits.update(id, patch)
    }

    /// Records today's completion of a habit; repeated calls on the same day
    /// are no-ops.
    pub fn complete_habit(&mut self, id: RecordId) -> CollectionResult<Completion> {
        let now_ms = self.clock.now_ms();
        let completion = self
            .habits
            .modify(id, |habit| habit.record_completion(now_ms))?;
        match completion {
            Completion::Recorded { streak } => info!(
                "event=habit_complete module=habits status=ok id={} streak={}",
                id, streak
            ),
            Completion::AlreadyRecorded => {
                info!("event=habit_complete module=habits status=noop id={}", id)
            }
        }
        Ok(completion)
    }

    pub fn delete_habit(&mut self, id: RecordId) -> CollectionResult<()> {
        self.habits.delete(id)
    }

    pub fn list_habits(&self) -> Vec<Habit> {
        self.habits.list()
    }

    pub fn habits(&self) -> &Collection<Habit> {
        &self.habits
    }

    // ---- finances ------------------------------------------------------

    pub fn create_entry(
        &mut self,
        candidate: FinanceEntryCandidate,
    ) -> CollectionResult<FinanceEntry> {
        self.ledger.create(candidate, &mut self.ids)
    }

    pub fn update_entry(
        &mut self,
        id: RecordId,
        patch: FinanceEntryPatch,
    ) -> CollectionResult<FinanceEntry> {
        self.ledger.update(id, patch)
    }

    pub fn delete_entry(&mut self, id: RecordId) -> CollectionResult<()> {
        self.ledger.delete(id)
    }

    pub fn list_entries(&self) -> Vec<FinanceEntry> {
        self.ledger.list()
    }

    pub fn ledger(&self) -> &Collection<FinanceEntry> {
        &self.ledger
    }

    // ---- persistence ---------------------------------------------------

    /// Writes profile and collections to `store` in one atomic batch.
    ///
    /// Without a profile the stored one is removed in the same batch, so a
    /// restore never resumes past onboarding on behalf of another session.
    pub fn save(&self, store: &impl KeyValueStore) -> StoreResult<()> {
        let profile = match self.session.profile() {
            Some(profile) => StoreOp::Put {
                key: PROFILE_KEY,
                value: encode(PROFILE_KEY, &profile.to_candidate())?,
            },
            None => StoreOp::Remove { key: PROFILE_KEY },
        };
        let ops = [
            profile,
            StoreOp::Put {
                key: TASKS_KEY,
                value: encode(TASKS_KEY, &self.tasks.snapshot())?,
            },
            StoreOp::Put {
                key: HABITS_KEY,
                value: encode(HABITS_KEY, &self.habits.snapshot())?,
            },
            StoreOp::Put {
                key: FINANCES_KEY,
                value: encode(FINANCES_KEY, &self.ledger.snapshot())?,
            },
        ];

        store.apply(&ops)?;
        info!(
            "event=dashboard_save module=store status=ok tasks={} habits={} entries={} onboarded={}",
            self.tasks.len(),
            self.habits.len(),
            self.ledger.len(),
            self.session.is_onboarded()
        );
        Ok(())
    }

    /// Rebuilds a dashboard from `store`, re-validating every stored record.
    ///
    /// Missing keys restore as empty collections; a missing profile restores
    /// a session that is still in onboarding.
    pub fn restore(store: &impl KeyValueStore, clock: C, ids: G) -> StoreResult<Self> {
        let mut dashboard = Self::with_env(clock, ids);

        if let Some(candidate) = decode::<ProfileCandidate>(store, PROFILE_KEY)? {
            let valid = validate_profile(candidate).map_err(|err| StoreError::InvalidData {
                key: PROFILE_KEY.to_string(),
                source: CollectionError::Validation(err),
            })?;
            dashboard.session = Session::resumed(Profile::from_valid(valid));
        }
        dashboard.tasks = restore_collection(store, TASKS_KEY)?;
        dashboard.habits = restore_collection(store, HABITS_KEY)?;
        dashboard.ledger = restore_collection(store, FINANCES_KEY)?;

        info!(
            "event=dashboard_restore module=store status=ok tasks={} habits={} entries={} state={}",
            dashboard.tasks.len(),
            dashboard.habits.len(),
            dashboard.ledger.len(),
            dashboard.session.state()
        );
        Ok(dashboard)
    }
}

fn encode<T: Serialize>(key: &str, value: &T) -> StoreResult<String> {
    serde_json::to_string(value).map_err(|source| StoreError::Serialization {
        key: key.to_string(),
        source,
    })
}

fn decode<T: DeserializeOwned>(store: &impl KeyValueStore, key: &str) -> StoreResult<Option<T>> {
    let Some(raw) = store.get(key)? else {
        return Ok(None);
    };
    serde_json::from_str(&raw)
        .map(Some)
        .map_err(|source| StoreError::Serialization {
            key: key.to_string(),
            source,
        })
}

fn restore_collection<T>(store: &impl KeyValueStore, key: &str) -> StoreResult<Collection<T>>
where
    T: Record + DeserializeOwned,
{
    match decode::<CollectionSnapshot<T>>(store, key)? {
        Some(snapshot) => {
            Collection::from_snapshot(snapshot).map_err(|source| StoreError::InvalidData {
                key: key.to_string(),
                source,
            })
        }
        None => Ok(Collection::new()),
    }
}
