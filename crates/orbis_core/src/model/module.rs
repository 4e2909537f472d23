//! Dashboard module identifiers.

use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};
use std::str::FromStr;

/// One independently navigable dashboard module.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ModuleId {
    Tasks,
    Habits,
    Finances,
}

impl ModuleId {
    /// All modules in sidebar order.
    pub const ALL: [ModuleId; 3] = [Self::Tasks, Self::Habits, Self::Finances];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Tasks => "tasks",
            Self::Habits => "habits",
            Self::Finances => "finances",
        }
    }

    /// Human-readable card title.
    pub fn title(self) -> &'static str {
        match self {
            Self::Tasks => "Tasks",
            Self::Habits => "Habits",
            Self::Finances => "Finances",
        }
    }
}

impl Display for ModuleId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when parsing an unknown module name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownModule(pub String);

impl Display for UnknownModule {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "unknown module `{}`; expected tasks|habits|finances", self.0)
    }
}

impl std::error::Error for UnknownModule {}

impl FromStr for ModuleId {
    type Err = UnknownModule;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "tasks" => Ok(Self::Tasks),
            "habits" => Ok(Self::Habits),
            "finances" => Ok(Self::Finances),
            other => Err(UnknownModule(other.to_string())),
        }
    }
}
