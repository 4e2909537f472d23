//! Task records.
//!
//! # Invariants
//! - `title` is non-empty after normalization.
//! - `due_at`, when set, is a representable epoch-millisecond timestamp.
//! - `in_progress` is independent of `done`; status precedence is
//!   done, then overdue, then in progress, then pending.

use crate::collection::Record;
use crate::ids::RecordId;
use crate::validation::{validate_task, RecordKind, ValidationErrors};
use serde::{Deserialize, Serialize};

/// Task urgency shown as a badge in the task list.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskPriority {
    Low,
    #[default]
    Medium,
    High,
}

/// Raw task form input.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskCandidate {
    pub title: String,
    pub description: Option<String>,
    pub priority: TaskPriority,
    pub done: bool,
    #[serde(default)]
    pub in_progress: bool,
    /// Unix epoch milliseconds.
    pub due_at: Option<i64>,
}

impl TaskCandidate {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Self::default()
        }
    }

    pub fn due_at(mut self, epoch_ms: i64) -> Self {
        self.due_at = Some(epoch_ms);
        self
    }

    pub fn priority(mut self, priority: TaskPriority) -> Self {
        self.priority = priority;
        self
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn in_progress(mut self, in_progress: bool) -> Self {
        self.in_progress = in_progress;
        self
    }
}

/// Partial task update. `None` leaves the field unchanged.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskPatch {
    pub title: Option<String>,
    pub description: Option<Option<String>>,
    pub priority: Option<TaskPriority>,
    pub done: Option<bool>,
    pub in_progress: Option<bool>,
    pub due_at: Option<Option<i64>>,
}

impl TaskPatch {
    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn done(mut self, done: bool) -> Self {
        self.done = Some(done);
        self
    }

    pub fn in_progress(mut self, in_progress: bool) -> Self {
        self.in_progress = Some(in_progress);
        self
    }

    pub fn due_at(mut self, due_at: Option<i64>) -> Self {
        self.due_at = Some(due_at);
        self
    }

    pub fn priority(mut self, priority: TaskPriority) -> Self {
        self.priority = Some(priority);
        self
    }
}

/// Board column a task falls into at a given instant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    Pending,
    InProgress,
    Done,
    Overdue,
}

/// Task list filter tabs.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskFilter {
    #[default]
    All,
    /// Open and on schedule, started or not.
    Pending,
    InProgress,
    Done,
    Overdue,
}

impl TaskFilter {
    pub fn matches(self, task: &Task, now_ms: i64) -> bool {
        let status = task.status(now_ms);
        match self {
            Self::All => true,
            Self::Pending => matches!(status, TaskStatus::Pending | TaskStatus::InProgress),
            Self::InProgress => status == TaskStatus::InProgress,
            Self::Done => status == TaskStatus::Done,
            Self::Overdue => status == TaskStatus::Overdue,
        }
    }
}

/// Validated task owned by the tasks collection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    pub id: RecordId,
    pub title: String,
    pub description: Option<String>,
    pub priority: TaskPriority,
    pub done: bool,
    #[serde(default)]
    pub in_progress: bool,
    pub due_at: Option<i64>,
}

impl Task {
    fn to_candidate(&self) -> TaskCandidate {
        TaskCandidate {
            title: self.title.clone(),
            description: self.description.clone(),
            priority: self.priority,
            done: self.done,
            in_progress: self.in_progress,
            due_at: self.due_at,
        }
    }

    /// Whether the task is still open and its deadline has passed.
    pub fn is_overdue(&self, now_ms: i64) -> bool {
        !self.done && self.due_at.is_some_and(|due_at| due_at < now_ms)
    }

    pub fn status(&self, now_ms: i64) -> TaskStatus {
        if self.done {
            TaskStatus::Done
        } else if self.is_overdue(now_ms) {
            TaskStatus::Overdue
        } else if self.in_progress {
            TaskStatus::InProgress
        } else {
            TaskStatus::Pending
        }
    }
}

impl Record for Task {
    type Candidate = TaskCandidate;
    type Patch = TaskPatch;
    const KIND: RecordKind = RecordKind::Task;

    fn id(&self) -> RecordId {
        self.id
    }

    fn from_candidate(id: RecordId, candidate: TaskCandidate) -> Result<Self, ValidationErrors> {
        let valid = validate_task(candidate)?.into_inner();
        Ok(Self {
            id,
            title: valid.title,
            description: valid.description,
            priority: valid.priority,
            done: valid.done,
            in_progress: valid.in_progress,
            due_at: valid.due_at,
        })
    }

    fn patched(&self, patch: TaskPatch) -> Result<Self, ValidationErrors> {
        let mut candidate = self.to_candidate();
        if let Some(title) = patch.title {
            candidate.title = title;
        }
        if let Some(description) = patch.description {
            candidate.description = description;
        }
        if let Some(priority) = patch.priority {
            candidate.priority = priority;
        }
        if let Some(done) = patch.done {
            candidate.done = done;
        }
        if let Some(in_progress) = patch.in_progress {
            candidate.in_progress = in_progress;
        }
        if let Some(due_at) = patch.due_at {
            candidate.due_at = due_at;
        }
        Self::from_candidate(self.id, candidate)
    }
}
