//! Validation engine for every record kind accepted by the dashboard core.
//!
//! # Responsibility
//! - Decide whether a candidate (profile, task, habit, finance entry) is
//!   well-formed before it may enter the session or a collection.
//! - Normalize accepted candidates (trimmed text, collapsed whitespace,
//!   kind-derived amount sign).
//! - Bound amount magnitudes so ledger sums stay within `Decimal` range.
//!
//! # Invariants
//! - Validation is pure: no logging, no clock, no id assignment.
//! - Every offending field yields its own `FieldError`; errors are never
//!   short-circuited after the first failure.
//! - `Valid<T>` can only be constructed inside this module, so collections
//!   cannot accept unchecked data.

use crate::clock::{datetime_from_ms, day_from_ms};
use crate::model::finance::{EntryKind, FinanceEntryCandidate};
use crate::model::habit::{HabitCandidate, MAX_MONTHLY_GOAL, MIN_MONTHLY_GOAL};
use crate::model::profile::ProfileCandidate;
use crate::model::task::TaskCandidate;
use chrono::NaiveDate;
use once_cell::sync::Lazy;
use regex::Regex;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::ops::Deref;
use std::str::FromStr;

static WHITESPACE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").expect("valid ws regex"));

/// Largest accepted entry magnitude, in whole currency units.
pub const MAX_AMOUNT_UNITS: i64 = 1_000_000_000_000;

/// Closed set of record kinds understood by the validation engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecordKind {
    Profile,
    Task,
    Habit,
    FinanceEntry,
}

impl RecordKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Profile => "profile",
            Self::Task => "task",
            Self::Habit => "habit",
            Self::FinanceEntry => "finance_entry",
        }
    }
}

impl Display for RecordKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Why one field was rejected.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FieldErrorReason {
    /// Field is missing or blank after trimming.
    Required,
    /// Field is present but its value is out of the accepted domain.
    InvalidValue(String),
}

/// One field-level validation failure, rendered next to its form field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldError {
    pub field: String,
    pub reason: FieldErrorReason,
}

impl FieldError {
    pub fn required(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            reason: FieldErrorReason::Required,
        }
    }

    pub fn invalid_value(field: impl Into<String>, detail: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            reason: FieldErrorReason::InvalidValue(detail.into()),
        }
    }

    /// User-facing message for this field.
    pub fn message(&self) -> &str {
        match &self.reason {
            FieldErrorReason::Required => "Required",
            FieldErrorReason::InvalidValue(detail) => detail.as_str(),
        }
    }
}

impl Display for FieldError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.field, self.message())
    }
}

/// Non-empty set of field errors for one candidate, at most one per field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationErrors {
    kind: RecordKind,
    errors: Vec<FieldError>,
}

impl ValidationErrors {
    pub fn kind(&self) -> RecordKind {
        self.kind
    }

    pub fn errors(&self) -> &[FieldError] {
        &self.errors
    }

    /// Returns the error recorded for `field`, if any.
    pub fn field(&self, field: &str) -> Option<&FieldError> {
        self.errors.iter().find(|error| error.field == field)
    }

    pub fn fields(&self) -> impl Iterator<Item = &str> {
        self.errors.iter().map(|error| error.field.as_str())
    }

    pub fn len(&self) -> usize {
        self.errors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }
}

impl Display for ValidationErrors {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "invalid {}:", self.kind)?;
        for (index, error) in self.errors.iter().enumerate() {
            let separator = if index == 0 { " " } else { "; " };
            write!(f, "{separator}{error}")?;
        }
        Ok(())
    }
}

impl Error for ValidationErrors {}

/// Proof that the wrapped candidate passed validation and was normalized.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Valid<T>(T);

impl<T> Valid<T> {
    pub fn into_inner(self) -> T {
        self.0
    }
}

impl<T> Deref for Valid<T> {
    type Target = T;

    fn deref(&self) -> &T {
        &self.0
    }
}

/// Kind-tagged candidate accepted by [`validate`].
#[derive(Debug, Clone, PartialEq)]
pub enum Candidate {
    Profile(ProfileCandidate),
    Task(TaskCandidate),
    Habit(HabitCandidate),
    FinanceEntry(FinanceEntryCandidate),
}

impl Candidate {
    pub fn kind(&self) -> RecordKind {
        match self {
            Self::Profile(_) => RecordKind::Profile,
            Self::Task(_) => RecordKind::Task,
            Self::Habit(_) => RecordKind::Habit,
            Self::FinanceEntry(_) => RecordKind::FinanceEntry,
        }
    }
}

/// Normalized counterpart of [`Candidate`].
#[derive(Debug, Clone, PartialEq)]
pub enum ValidCandidate {
    Profile(Valid<ProfileCandidate>),
    Task(Valid<TaskCandidate>),
    Habit(Valid<HabitCandidate>),
    FinanceEntry(Valid<FinanceEntryCandidate>),
}

/// Validates any kind-tagged candidate.
pub fn validate(candidate: Candidate) -> Result<ValidCandidate, ValidationErrors> {
    match candidate {
        Candidate::Profile(value) => validate_profile(value).map(ValidCandidate::Profile),
        Candidate::Task(value) => validate_task(value).map(ValidCandidate::Task),
        Candidate::Habit(value) => validate_habit(value).map(ValidCandidate::Habit),
        Candidate::FinanceEntry(value) => {
            validate_finance_entry(value).map(ValidCandidate::FinanceEntry)
        }
    }
}

pub fn validate_profile(
    candidate: ProfileCandidate,
) -> Result<Valid<ProfileCandidate>, ValidationErrors> {
    let mut errors = ErrorSink::new(RecordKind::Profile);
    let name = errors.required_text("name", &candidate.name);
    let objective = errors.required_text("objective", &candidate.objective);
    errors.finish(ProfileCandidate { name, objective })
}

pub fn validate_task(candidate: TaskCandidate) -> Result<Valid<TaskCandidate>, ValidationErrors> {
    let mut errors = ErrorSink::new(RecordKind::Task);
    let title = errors.required_text("title", &candidate.title);
    if let Some(due_at) = candidate.due_at {
        errors.timestamp("due_at", due_at);
    }
    errors.finish(TaskCandidate {
        title,
        description: optional_text(candidate.description),
        ..candidate
    })
}

pub fn validate_habit(
    candidate: HabitCandidate,
) -> Result<Valid<HabitCandidate>, ValidationErrors> {
    let mut errors = ErrorSink::new(RecordKind::Habit);
    let name = errors.required_text("name", &candidate.name);
    if !(MIN_MONTHLY_GOAL..=MAX_MONTHLY_GOAL).contains(&candidate.monthly_goal) {
        errors.push(FieldError::invalid_value(
            "monthly_goal",
            format!("must be between {MIN_MONTHLY_GOAL} and {MAX_MONTHLY_GOAL}"),
        ));
    }
    errors.finish(HabitCandidate {
        name,
        description: optional_text(candidate.description),
        ..candidate
    })
}

/// Checks that a habit's stored streak agrees with its completion history.
///
/// `last_completed_at` must fall on the latest day of `completed_on`, and
/// the `streak_count` days ending there must all be recorded. A habit never
/// completed carries no last day, no completions and a zero streak.
pub fn validate_habit_progress(
    streak_count: u32,
    last_completed_at: Option<i64>,
    completed_on: &BTreeSet<NaiveDate>,
) -> Result<(), ValidationErrors> {
    let mut errors = ErrorSink::new(RecordKind::Habit);
    let Some(last_ms) = last_completed_at else {
        if !completed_on.is_empty() {
            errors.push(FieldError::invalid_value(
                "last_completed_at",
                "missing while completions are recorded",
            ));
        }
        if streak_count != 0 {
            errors.push(FieldError::invalid_value(
                "streak_count",
                "must be zero for a habit never completed",
            ));
        }
        return errors.finish(()).map(|_| ());
    };

    let Some(last_day) = day_from_ms(last_ms) else {
        errors.timestamp("last_completed_at", last_ms);
        return errors.finish(()).map(|_| ());
    };
    if completed_on.last() != Some(&last_day) {
        errors.push(FieldError::invalid_value(
            "last_completed_at",
            "must fall on the latest completion day",
        ));
    }

    let covered = usize::try_from(streak_count).is_ok_and(|streak| streak <= completed_on.len());
    let run_recorded = covered
        && (1..streak_count)
            .try_fold(last_day, |day, _| {
                day.pred_opt().filter(|prev| completed_on.contains(prev))
            })
            .is_some();
    if streak_count == 0 || !run_recorded {
        errors.push(FieldError::invalid_value(
            "streak_count",
            "must count consecutive recorded days ending at the last completion",
        ));
    }
    errors.finish(()).map(|_| ())
}

pub fn validate_finance_entry(
    candidate: FinanceEntryCandidate,
) -> Result<Valid<FinanceEntryCandidate>, ValidationErrors> {
    let mut errors = ErrorSink::new(RecordKind::FinanceEntry);
    let category = errors.required_text("category", &candidate.category);
    if candidate.amount.is_zero() {
        errors.push(FieldError::invalid_value("amount", "must be non-zero"));
    } else if candidate.amount.abs() > Decimal::from(MAX_AMOUNT_UNITS) {
        errors.push(FieldError::invalid_value(
            "amount",
            format!("magnitude must not exceed {MAX_AMOUNT_UNITS}"),
        ));
    }
    errors.timestamp("occurred_at", candidate.occurred_at);

    let magnitude = candidate.amount.abs();
    let amount = match candidate.kind {
        EntryKind::Income => magnitude,
        EntryKind::Expense => -magnitude,
    };
    errors.finish(FinanceEntryCandidate {
        amount,
        category,
        description: optional_text(candidate.description),
        ..candidate
    })
}

/// Parses user-entered amount text (`"12.50"`, `"-3"`, `"1,25"`) into an
/// exact decimal.
///
/// # Errors
/// - `Required` when the text is blank.
/// - `InvalidValue` when the text is not a finite decimal number.
pub fn parse_amount(text: &str) -> Result<Decimal, FieldError> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Err(FieldError::required("amount"));
    }
    let normalized = trimmed.replace(',', ".");
    Decimal::from_str(&normalized)
        .map_err(|_| FieldError::invalid_value("amount", "must be a decimal number"))
}

/// Trims and collapses internal whitespace runs into single spaces.
pub fn normalize_text(value: &str) -> String {
    WHITESPACE_RE.replace_all(value.trim(), " ").into_owned()
}

fn optional_text(value: Option<String>) -> Option<String> {
    value
        .map(|text| normalize_text(&text))
        .filter(|text| !text.is_empty())
}

struct ErrorSink {
    kind: RecordKind,
    errors: Vec<FieldError>,
}

impl ErrorSink {
    fn new(kind: RecordKind) -> Self {
        Self {
            kind,
            errors: Vec::new(),
        }
    }

    fn push(&mut self, error: FieldError) {
        if self.errors.iter().all(|existing| existing.field != error.field) {
            self.errors.push(error);
        }
    }

    fn required_text(&mut self, field: &str, value: &str) -> String {
        let normalized = normalize_text(value);
        if normalized.is_empty() {
            self.push(FieldError::required(field));
        }
        normalized
    }

    fn timestamp(&mut self, field: &str, epoch_ms: i64) {
        if datetime_from_ms(epoch_ms).is_none() {
            self.push(FieldError::invalid_value(field, "timestamp out of range"));
        }
    }

    fn finish<T>(self, normalized: T) -> Result<Valid<T>, ValidationErrors> {
        if self.errors.is_empty() {
            Ok(Valid(normalized))
        } else {
            Err(ValidationErrors {
                kind: self.kind,
                errors: self.errors,
            })
        }
    }
}
