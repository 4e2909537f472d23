//! Domain records owned by the dashboard core.
//!
//! # Responsibility
//! - Define candidate (pre-validation) and record (post-validation, with
//!   assigned id) shapes for every record kind.
//! - Keep record-local lifecycle rules (habit streaks, task completion).
//!
//! # Invariants
//! - Records are only built from `Valid<_>` candidates.
//! - Tasks, habits and finance entries never reference each other.

pub mod finance;
pub mod habit;
pub mod module;
pub mod profile;
pub mod task;
