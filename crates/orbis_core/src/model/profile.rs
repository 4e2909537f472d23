//! Onboarding profile.
//!
//! # Invariants
//! - A profile exists if and only if the session has left onboarding.
//! - Profiles are immutable once committed.

use crate::validation::Valid;
use serde::{Deserialize, Serialize};

/// Raw onboarding form input.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfileCandidate {
    pub name: String,
    pub objective: String,
}

impl ProfileCandidate {
    pub fn new(name: impl Into<String>, objective: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            objective: objective.into(),
        }
    }
}

/// Committed user profile.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Profile {
    name: String,
    objective: String,
}

impl Profile {
    pub fn from_valid(candidate: Valid<ProfileCandidate>) -> Self {
        let ProfileCandidate { name, objective } = candidate.into_inner();
        Self { name, objective }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn objective(&self) -> &str {
        &self.objective
    }

    /// Returns the profile as form input, e.g. for re-validation on restore.
    pub fn to_candidate(&self) -> ProfileCandidate {
        ProfileCandidate::new(self.name.clone(), self.objective.clone())
    }
}
