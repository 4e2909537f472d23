//! Finance ledger entries.
//!
//! # Invariants
//! - `amount` is non-zero and its sign matches `kind`: income entries carry
//!   a positive amount, expense entries a negative one.
//! - Amounts are exact decimals; binary floating point is never used.

use crate::collection::Record;
use crate::ids::RecordId;
use crate::validation::{validate_finance_entry, RecordKind, ValidationErrors};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Direction of a ledger entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntryKind {
    Income,
    Expense,
}

/// Raw ledger form input. The sign of `amount` is ignored; `kind` decides it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FinanceEntryCandidate {
    pub amount: Decimal,
    pub kind: EntryKind,
    pub category: String,
    pub description: Option<String>,
    /// Unix epoch milliseconds.
    pub occurred_at: i64,
}

impl FinanceEntryCandidate {
    pub fn new(
        amount: Decimal,
        kind: EntryKind,
        category: impl Into<String>,
        occurred_at: i64,
    ) -> Self {
        Self {
            amount,
            kind,
            category: category.into(),
            description: None,
            occurred_at,
        }
    }

    pub fn income(amount: Decimal, category: impl Into<String>, occurred_at: i64) -> Self {
        Self::new(amount, EntryKind::Income, category, occurred_at)
    }

    pub fn expense(amount: Decimal, category: impl Into<String>, occurred_at: i64) -> Self {
        Self::new(amount, EntryKind::Expense, category, occurred_at)
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

/// Partial ledger entry update. `None` leaves the field unchanged.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FinanceEntryPatch {
    pub amount: Option<Decimal>,
    pub kind: Option<EntryKind>,
    pub category: Option<String>,
    pub description: Option<Option<String>>,
    pub occurred_at: Option<i64>,
}

impl FinanceEntryPatch {
    pub fn amount(mut self, amount: Decimal) -> Self {
        self.amount = Some(amount);
        self
    }

    pub fn kind(mut self, kind: EntryKind) -> Self {
        self.kind = Some(kind);
        self
    }

    pub fn category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    pub fn occurred_at(mut self, occurred_at: i64) -> Self {
        self.occurred_at = Some(occurred_at);
        self
    }
}

/// Validated ledger entry owned by the finance ledger.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FinanceEntry {
    pub id: RecordId,
    /// Signed contribution to the balance.
    pub amount: Decimal,
    pub kind: EntryKind,
    pub category: String,
    pub description: Option<String>,
    pub occurred_at: i64,
}

impl FinanceEntry {
    /// Signed contribution of this entry to the balance.
    pub fn contribution(&self) -> Decimal {
        self.amount
    }

    fn to_candidate(&self) -> FinanceEntryCandidate {
        FinanceEntryCandidate {
            amount: self.amount,
            kind: self.kind,
            category: self.category.clone(),
            description: self.description.clone(),
            occurred_at: self.occurred_at,
        }
    }
}

impl Record for FinanceEntry {
    type Candidate = FinanceEntryCandidate;
    type Patch = FinanceEntryPatch;
    const KIND: RecordKind = RecordKind::FinanceEntry;

    fn id(&self) -> RecordId {
        self.id
    }

    fn from_candidate(
        id: RecordId,
        candidate: FinanceEntryCandidate,
    ) -> Result<Self, ValidationErrors> {
        let valid = validate_finance_entry(candidate)?.into_inner();
        Ok(Self {
            id,
            amount: valid.amount,
            kind: valid.kind,
            category: valid.category,
            description: valid.description,
            occurred_at: valid.occurred_at,
        })
    }

    fn patched(&self, patch: FinanceEntryPatch) -> Result<Self, ValidationErrors> {
        let mut candidate = self.to_candidate();
        if let Some(amount) = patch.amount {
            candidate.amount = amount;
        }
        if let Some(kind) = patch.kind {
            candidate.kind = kind;
        }
        if let Some(category) = patch.category {
            candidate.category = category;
        }
        if let Some(description) = patch.description {
            candidate.description = description;
        }
        if let Some(occurred_at) = patch.occurred_at {
            candidate.occurred_at = occurred_at;
        }
        Self::from_candidate(self.id, candidate)
    }
}
