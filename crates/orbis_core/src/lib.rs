//! Core domain logic for the Orbis personal dashboard.
//! This crate is the single source of truth for business invariants.

pub mod clock;
pub mod collection;
pub mod config;
pub mod db;
pub mod finance;
pub mod ids;
pub mod logging;
pub mod model;
pub mod overview;
pub mod service;
pub mod session;
pub mod store;
pub mod validation;

pub use clock::{Clock, FixedClock, SystemClock};
pub use collection::{Collection, CollectionError, CollectionResult, CollectionSnapshot, Record};
pub use config::{ConfigError, CoreConfig};
pub use finance::{aggregate, balance, FinanceSummary, SeriesBucket, SeriesPeriod};
pub use ids::{IdGenerator, RandomIds, RecordId, SequentialIds};
pub use logging::{default_log_level, init_from_config, init_logging, logging_status, LoggingError};
pub use model::finance::{EntryKind, FinanceEntry, FinanceEntryCandidate, FinanceEntryPatch};
pub use model::habit::{Completion, Habit, HabitCandidate, HabitPatch};
pub use model::module::ModuleId;
pub use model::profile::{Profile, ProfileCandidate};
pub use model::task::{Task, TaskCandidate, TaskFilter, TaskPatch, TaskPriority, TaskStatus};
pub use overview::{summarize, summarize_all, CardMetrics, OverviewCard, OverviewSource};
pub use service::dashboard::Dashboard;
pub use session::{
    NavigationEvent, Session, SessionError, SessionEvent, SessionState, SessionView, Transition,
};
pub use store::{KeyValueStore, MemoryStore, SqliteKvStore, StoreError, StoreOp, StoreResult};
pub use validation::{
    parse_amount, validate, Candidate, FieldError, FieldErrorReason, RecordKind, Valid,
    ValidCandidate, ValidationErrors,
};

/// Minimal health-check API for early integration.
pub fn ping() -> &'static str {
    "pong"
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
