//! Habit records and their completion streaks.
//!
//! # Invariants
//! - `name` is non-empty after normalization.
//! - `monthly_goal` stays within `MIN_MONTHLY_GOAL..=MAX_MONTHLY_GOAL`.
//! - `streak_count` increments at most once per UTC day: a second completion
//!   on the same day is a no-op.
//! - `last_completed_at` always falls on the latest day in `completed_on`,
//!   and `streak_count` counts recorded consecutive days ending there.
//!   Patching (and therefore restoring a snapshot) rejects a habit whose
//!   history breaks this.

use crate::clock::day_from_ms;
use crate::collection::Record;
use crate::ids::RecordId;
use crate::validation::{validate_habit, validate_habit_progress, RecordKind, ValidationErrors};
use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

pub const MIN_MONTHLY_GOAL: u32 = 1;
pub const MAX_MONTHLY_GOAL: u32 = 31;
pub const DEFAULT_MONTHLY_GOAL: u32 = 30;

/// Raw habit form input.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HabitCandidate {
    pub name: String,
    pub description: Option<String>,
    /// Target number of completion days per calendar month.
    pub monthly_goal: u32,
}

impl HabitCandidate {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: None,
            monthly_goal: DEFAULT_MONTHLY_GOAL,
        }
    }

    pub fn monthly_goal(mut self, goal: u32) -> Self {
        self.monthly_goal = goal;
        self
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

/// Partial habit update. Streak state is not patchable.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HabitPatch {
    pub name: Option<String>,
    pub description: Option<Option<String>>,
    pub monthly_goal: Option<u32>,
}

impl HabitPatch {
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn monthly_goal(mut self, goal: u32) -> Self {
        self.monthly_goal = Some(goal);
        self
    }
}

/// Outcome of recording a completion.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Completion {
    /// First completion of the day; carries the new streak length.
    Recorded { streak: u32 },
    /// The current day was already recorded.
    AlreadyRecorded,
}

/// Validated habit owned by the habits collection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Habit {
    pub id: RecordId,
    pub name: String,
    pub description: Option<String>,
    pub monthly_goal: u32,
    pub streak_count: u32,
    /// Unix epoch milliseconds of the latest completion.
    pub last_completed_at: Option<i64>,
    pub completed_on: BTreeSet<NaiveDate>,
}

impl Habit {
    fn to_candidate(&self) -> HabitCandidate {
        HabitCandidate {
            name: self.name.clone(),
            description: self.description.clone(),
            monthly_goal: self.monthly_goal,
        }
    }

    /// Day of the latest completion.
    pub fn last_completed_day(&self) -> Option<NaiveDate> {
        self.last_completed_at.and_then(day_from_ms)
    }

    /// Whether a completion is recorded for `day`.
    pub fn is_completed_on(&self, day: NaiveDate) -> bool {
        self.completed_on.contains(&day)
    }

    /// Records a completion at `now_ms`.
    ///
    /// Consecutive days extend the streak; any gap restarts it at 1.
    pub fn record_completion(&mut self, now_ms: i64) -> Completion {
        let Some(today) = day_from_ms(now_ms) else {
            return Completion::AlreadyRecorded;
        };
        let last_day = self.last_completed_day();
        if last_day.is_some_and(|day| day >= today) || self.completed_on.contains(&today) {
            return Completion::AlreadyRecorded;
        }

        let continues_streak = last_day
            .and_then(|day| day.succ_opt())
            .is_some_and(|next| next == today);
        self.streak_count = if continues_streak {
            self.streak_count.saturating_add(1)
        } else {
            1
        };
        self.last_completed_at = Some(now_ms);
        self.completed_on.insert(today);
        Completion::Recorded {
            streak: self.streak_count,
        }
    }

    /// Streak as it stands on `today`: zero once a full day was missed.
    pub fn current_streak(&self, today: NaiveDate) -> u32 {
        match self.last_completed_day() {
            Some(day) if day == today || day.succ_opt() == Some(today) => self.streak_count,
            _ => 0,
        }
    }

    /// Completion days in the calendar month containing `today`.
    pub fn completions_in_month(&self, today: NaiveDate) -> usize {
        self.completed_on
            .iter()
            .filter(|day| day.year() == today.year() && day.month() == today.month())
            .count()
    }

    /// Monthly progress towards `monthly_goal`, in percent, capped at 100.
    pub fn month_rate(&self, today: NaiveDate) -> u32 {
        let done = u32::try_from(self.completions_in_month(today)).unwrap_or(u32::MAX);
        let goal = self.monthly_goal.max(MIN_MONTHLY_GOAL);
        (done.saturating_mul(100) / goal).min(100)
    }
}

impl Record for Habit {
    type Candidate = HabitCandidate;
    type Patch = HabitPatch;
    const KIND: RecordKind = RecordKind::Habit;

    fn id(&self) -> RecordId {
        self.id
    }

    fn from_candidate(id: RecordId, candidate: HabitCandidate) -> Result<Self, ValidationErrors> {
        let valid = validate_habit(candidate)?.into_inner();
        Ok(Self {
            id,
            name: valid.name,
            description: valid.description,
            monthly_goal: valid.monthly_goal,
            streak_count: 0,
            last_completed_at: None,
            completed_on: BTreeSet::new(),
        })
    }

    fn patched(&self, patch: HabitPatch) -> Result<Self, ValidationErrors> {
        let mut candidate = self.to_candidate();
        if let Some(name) = patch.name {
            candidate.name = name;
        }
        if let Some(description) = patch.description {
            candidate.description = description;
        }
        if let Some(goal) = patch.monthly_goal {
            candidate.monthly_goal = goal;
        }
        validate_habit_progress(self.streak_count, self.last_completed_at, &self.completed_on)?;
        let valid = validate_habit(candidate)?.into_inner();
        Ok(Self {
            name: valid.name,
            description: valid.description,
            monthly_goal: valid.monthly_goal,
            ..self.clone()
        })
    }
}
