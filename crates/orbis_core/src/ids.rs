//! Record identifier generation.
//!
//! # Invariants
//! - Generated ids are never nil.
//! - Uniqueness across a collection lifetime is enforced by the collection,
//!   which retries on collision instead of trusting the generator.

use uuid::Uuid;

/// Stable identifier for every task, habit and finance entry.
///
/// Kept as a type alias to make semantic intent explicit in signatures.
pub type RecordId = Uuid;

/// Source of fresh record identifiers.
pub trait IdGenerator {
    fn next_id(&mut self) -> RecordId;
}

/// Random UUID v4 identifiers.
#[derive(Debug, Clone, Copy, Default)]
pub struct RandomIds;

impl IdGenerator for RandomIds {
    fn next_id(&mut self) -> RecordId {
        Uuid::new_v4()
    }
}

/// Deterministic, monotonically increasing identifiers.
///
/// Starts at `1` so the nil UUID is never produced.
#[derive(Debug, Clone)]
pub struct SequentialIds {
    next: u128,
}

impl SequentialIds {
    pub fn new() -> Self {
        Self::starting_at(1)
    }

    pub fn starting_at(first: u128) -> Self {
        Self {
            next: first.max(1),
        }
    }
}

impl Default for SequentialIds {
    fn default() -> Self {
        Self::new()
    }
}

impl IdGenerator for SequentialIds {
    fn next_id(&mut self) -> RecordId {
        let id = Uuid::from_u128(self.next);
        self.next = self.next.checked_add(1).unwrap_or(1);
        id
    }
}
