//! Generic in-memory domain collection.
//!
//! # Responsibility
//! - Own the records of one module (tasks, habits or finance entries).
//! - Provide validated create/update/delete and snapshot listing.
//!
//! # Invariants
//! - Every write path validates before committing; a failed write leaves the
//!   prior record untouched.
//! - Identifiers are unique for the collection lifetime and are never reused
//!   after deletion, so a stale id always resolves to `NotFound`.
//! - `list()` preserves insertion order.

use crate::ids::{IdGenerator, RecordId};
use crate::validation::{RecordKind, ValidationErrors};
use log::{info, warn};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::error::Error;
use std::fmt::{Display, Formatter};

const MAX_ID_ATTEMPTS: usize = 16;

pub type CollectionResult<T> = Result<T, CollectionError>;

/// Record stored in a [`Collection`].
pub trait Record: Clone {
    /// Pre-validation input shape.
    type Candidate;
    /// Partial update shape; `Default` is the empty patch.
    type Patch: Default;
    const KIND: RecordKind;

    fn id(&self) -> RecordId;

    /// Validates `candidate` and builds a record carrying `id`.
    fn from_candidate(id: RecordId, candidate: Self::Candidate) -> Result<Self, ValidationErrors>;

    /// Applies `patch` to a copy of this record and re-validates the result.
    fn patched(&self, patch: Self::Patch) -> Result<Self, ValidationErrors>;
}

/// Collection-level failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CollectionError {
    Validation(ValidationErrors),
    NotFound { kind: RecordKind, id: RecordId },
    /// Restored data contains the same id twice.
    DuplicateId { kind: RecordKind, id: RecordId },
    /// The id generator kept returning ids already issued by this collection.
    IdExhausted { kind: RecordKind },
}

impl Display for CollectionError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::NotFound { kind, id } => write!(f, "{kind} not found: {id}"),
            Self::DuplicateId { kind, id } => write!(f, "duplicate {kind} id: {id}"),
            Self::IdExhausted { kind } => {
                write!(f, "could not obtain a fresh {kind} id after {MAX_ID_ATTEMPTS} attempts")
            }
        }
    }
}

impl Error for CollectionError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            _ => None,
        }
    }
}

impl From<ValidationErrors> for CollectionError {
    fn from(value: ValidationErrors) -> Self {
        Self::Validation(value)
    }
}

/// Serializable collection state: live records plus retired ids.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CollectionSnapshot<T> {
    pub records: Vec<T>,
    #[serde(default)]
    pub retired: Vec<RecordId>,
}

/// Ordered store of records of one kind.
#[derive(Debug, Clone)]
pub struct Collection<T: Record> {
    records: Vec<T>,
    issued: HashSet<RecordId>,
}

impl<T: Record> Default for Collection<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Record> Collection<T> {
    pub fn new() -> Self {
        Self {
            records: Vec::new(),
            issued: HashSet::new(),
        }
    }

    /// Validates `candidate`, assigns a fresh id and appends the record.
    ///
    /// No id is consumed when validation fails.
    pub fn create(
        &mut self,
        candidate: T::Candidate,
        ids: &mut impl IdGenerator,
    ) -> CollectionResult<T> {
        let id = self.fresh_id(ids)?;
        let record = match T::from_candidate(id, candidate) {
            Ok(record) => record,
            Err(err) => {
                warn!(
                    "event=record_create module=collection status=rejected kind={} field_errors={}",
                    T::KIND,
                    err.len()
                );
                return Err(err.into());
            }
        };

        self.issued.insert(id);
        self.records.push(record.clone());
        info!(
            "event=record_create module=collection status=ok kind={} id={}",
            T::KIND,
            id
        );
        Ok(record)
    }

    /// Merges `patch` into the record `id` and commits only if the merged
    /// record is valid.
    pub fn update(&mut self, id: RecordId, patch: T::Patch) -> CollectionResult<T> {
        let index = self.position(id)?;
        let updated = match self.records[index].patched(patch) {
            Ok(record) => record,
            Err(err) => {
                warn!(
                    "event=record_update module=collection status=rejected kind={} id={} field_errors={}",
                    T::KIND,
                    id,
                    err.len()
                );
                return Err(err.into());
            }
        };

        self.records[index] = updated.clone();
        info!(
            "event=record_update module=collection status=ok kind={} id={}",
            T::KIND,
            id
        );
        Ok(updated)
    }

    /// Removes the record `id`. Its id stays retired.
    pub fn delete(&mut self, id: RecordId) -> CollectionResult<()> {
        let index = self.position(id)?;
        self.records.remove(index);
        info!(
            "event=record_delete module=collection status=ok kind={} id={}",
            T::KIND,
            id
        );
        Ok(())
    }

    pub fn get(&self, id: RecordId) -> CollectionResult<&T> {
        self.records
            .iter()
            .find(|record| record.id() == id)
            .ok_or(CollectionError::NotFound { kind: T::KIND, id })
    }

    /// Snapshot of all records in insertion order.
    pub fn list(&self) -> Vec<T> {
        self.records.clone()
    }

    pub fn iter(&self) -> impl Iterator<Item = &T> {
        self.records.iter()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Applies a validity-preserving in-place mutation to the record `id`.
    pub(crate) fn modify<R>(
        &mut self,
        id: RecordId,
        mutate: impl FnOnce(&mut T) -> R,
    ) -> CollectionResult<R> {
        let index = self.position(id)?;
        Ok(mutate(&mut self.records[index]))
    }

    pub fn snapshot(&self) -> CollectionSnapshot<T> {
        let live: HashSet<RecordId> = self.records.iter().map(Record::id).collect();
        let mut retired: Vec<RecordId> = self
            .issued
            .iter()
            .filter(|id| !live.contains(id))
            .copied()
            .collect();
        retired.sort_unstable();
        CollectionSnapshot {
            records: self.records.clone(),
            retired,
        }
    }

    /// Rebuilds a collection from a snapshot, re-validating every record.
    ///
    /// # Errors
    /// - `Validation` when a stored record no longer passes validation.
    /// - `DuplicateId` when two records, or a record and a retired id, share
    ///   an id.
    pub fn from_snapshot(snapshot: CollectionSnapshot<T>) -> CollectionResult<Self> {
        let mut collection = Self::new();
        for record in snapshot.records {
            let record = record.patched(T::Patch::default())?;
            let id = record.id();
            if !collection.issued.insert(id) {
                return Err(CollectionError::DuplicateId { kind: T::KIND, id });
            }
            collection.records.push(record);
        }
        for id in snapshot.retired {
            if !collection.issued.insert(id) {
                return Err(CollectionError::DuplicateId { kind: T::KIND, id });
            }
        }
        Ok(collection)
    }

    fn position(&self, id: RecordId) -> CollectionResult<usize> {
        self.records
            .iter()
            .position(|record| record.id() == id)
            .ok_or(CollectionError::NotFound { kind: T::KIND, id })
    }

    fn fresh_id(&self, ids: &mut impl IdGenerator) -> CollectionResult<RecordId> {
        for _ in 0..MAX_ID_ATTEMPTS {
            let id = ids.next_id();
            if !id.is_nil() && !self.issued.contains(&id) {
                return Ok(id);
            }
        }
        Err(CollectionError::IdExhausted { kind: T::KIND })
    }
}

#[cfg(test)]
mod tests {
    use super::{Collection, CollectionError};
    use crate::ids::{IdGenerator, RecordId, SequentialIds};
    use crate::model::task::{Task, TaskCandidate};
    use uuid::Uuid;

    struct StuckIds;

    impl IdGenerator for StuckIds {
        fn next_id(&mut self) -> RecordId {
            Uuid::from_u128(1)
        }
    }

    #[test]
    fn colliding_generator_is_retried_then_reported() {
        let mut tasks: Collection<Task> = Collection::new();
        tasks.create(TaskCandidate::new("first"), &mut StuckIds).unwrap();

        let err = tasks
            .create(TaskCandidate::new("second"), &mut StuckIds)
            .unwrap_err();
        assert!(matches!(err, CollectionError::IdExhausted { .. }));
        assert_eq!(tasks.len(), 1);
    }

    #[test]
    fn rejected_create_does_not_retire_an_id() {
        let mut tasks: Collection<Task> = Collection::new();
        let mut ids = SequentialIds::new();
        tasks.create(TaskCandidate::new("  "), &mut ids).unwrap_err();

        assert!(tasks.snapshot().retired.is_empty());
    }
}
