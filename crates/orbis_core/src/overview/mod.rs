//! Overview aggregator: one summary card per module.
//!
//! # Responsibility
//! - Project the live collections into compact overview cards.
//!
//! # Invariants
//! - Cards are recomputed on request and never stored.
//! - Summarizing never mutates a collection; two calls with no mutation in
//!   between return identical cards.
//! - `expandable` is true exactly when the module's collection is non-empty.

use crate::clock::{datetime_from_ms, Clock};
use crate::collection::Collection;
use crate::finance;
use crate::ids::RecordId;
use crate::model::finance::FinanceEntry;
use crate::model::habit::Habit;
use crate::model::module::ModuleId;
use crate::model::task::Task;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Borrowed view of every module collection.
#[derive(Debug, Clone, Copy)]
pub struct OverviewSource<'a> {
    pub tasks: &'a Collection<Task>,
    pub habits: &'a Collection<Habit>,
    pub ledger: &'a Collection<FinanceEntry>,
}

/// Typed figures behind a card's summary text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "module", rename_all = "snake_case")]
pub enum CardMetrics {
    Tasks {
        total: usize,
        open: usize,
        overdue: usize,
        /// Completed share of all tasks, in percent.
        completion_rate: u32,
        next_due: Option<NextDue>,
    },
    Habits {
        total: usize,
        completed_today: usize,
        best_streak: u32,
    },
    Finances {
        entries: usize,
        balance: Decimal,
    },
}

/// Earliest deadline among open tasks.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NextDue {
    pub task_id: RecordId,
    pub due_at: i64,
}

/// Compact summary of one module for the overview screen.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OverviewCard {
    pub module: ModuleId,
    pub title: String,
    pub summary_text: String,
    pub expandable: bool,
    pub metrics: CardMetrics,
}

/// Builds the card for `module`.
pub fn summarize(
    module: ModuleId,
    source: OverviewSource<'_>,
    clock: &impl Clock,
) -> OverviewCard {
    match module {
        ModuleId::Tasks => summarize_tasks(source.tasks, clock.now_ms()),
        ModuleId::Habits => summarize_habits(source.habits, clock.today()),
        ModuleId::Finances => summarize_finances(source.ledger),
    }
}

/// Builds every card in sidebar order.
pub fn summarize_all(source: OverviewSource<'_>, clock: &impl Clock) -> Vec<OverviewCard> {
    ModuleId::ALL
        .into_iter()
        .map(|module| summarize(module, source, clock))
        .collect()
}

pub fn summarize_tasks(tasks: &Collection<Task>, now_ms: i64) -> OverviewCard {
    let total = tasks.len();
    let open = tasks.iter().filter(|task| !task.done).count();
    let overdue = tasks.iter().filter(|task| task.is_overdue(now_ms)).count();
    let completion_rate = percent(total - open, total);

    // Strict comparison keeps the first-inserted task on equal deadlines.
    let mut next_due: Option<NextDue> = None;
    for task in tasks.iter().filter(|task| !task.done) {
        if let Some(due_at) = task.due_at {
            if next_due.as_ref().map_or(true, |best| due_at < best.due_at) {
                next_due = Some(NextDue {
                    task_id: task.id,
                    due_at,
                });
            }
        }
    }

    let mut summary_text = format!("{open} open {}", plural(open, "task", "tasks"));
    if let Some(label) = next_due.as_ref().and_then(|next| format_day(next.due_at)) {
        summary_text.push_str(&format!(", next due {label}"));
    }
    if overdue > 0 {
        summary_text.push_str(&format!(", {overdue} overdue"));
    }

    OverviewCard {
        module: ModuleId::Tasks,
        title: ModuleId::Tasks.title().to_string(),
        summary_text,
        expandable: total > 0,
        metrics: CardMetrics::Tasks {
            total,
            open,
            overdue,
            completion_rate,
            next_due,
        },
    }
}

pub fn summarize_habits(habits: &Collection<Habit>, today: NaiveDate) -> OverviewCard {
    let total = habits.len();
    let completed_today = habits
        .iter()
        .filter(|habit| habit.last_completed_day() == Some(today))
        .count();
    let best_streak = habits
        .iter()
        .map(|habit| habit.current_streak(today))
        .max()
        .unwrap_or(0);

    let mut summary_text = format!(
        "{completed_today} of {total} {} done today",
        plural(total, "habit", "habits")
    );
    if best_streak > 0 {
        summary_text.push_str(&format!(
            ", best streak {best_streak} {}",
            plural(best_streak as usize, "day", "days")
        ));
    }

    OverviewCard {
        module: ModuleId::Habits,
        title: ModuleId::Habits.title().to_string(),
        summary_text,
        expandable: total > 0,
        metrics: CardMetrics::Habits {
            total,
            completed_today,
            best_streak,
        },
    }
}

pub fn summarize_finances(ledger: &Collection<FinanceEntry>) -> OverviewCard {
    let balance = finance::balance(ledger.iter());
    let entries = ledger.len();

    OverviewCard {
        module: ModuleId::Finances,
        title: ModuleId::Finances.title().to_string(),
        summary_text: format!("Balance {:.2}", balance),
        expandable: entries > 0,
        metrics: CardMetrics::Finances { entries, balance },
    }
}

fn percent(part: usize, whole: usize) -> u32 {
    if whole == 0 {
        return 0;
    }
    let rounded = (part * 100 + whole / 2) / whole;
    u32::try_from(rounded).unwrap_or(100)
}

fn plural(count: usize, one: &'static str, many: &'static str) -> &'static str {
    if count == 1 {
        one
    } else {
        many
    }
}

fn format_day(epoch_ms: i64) -> Option<String> {
    datetime_from_ms(epoch_ms).map(|instant| instant.format("%Y-%m-%d").to_string())
}

#[cfg(test)]
mod tests {
    use super::percent;

    #[test]
    fn percent_rounds_half_up_and_handles_empty() {
        assert_eq!(percent(0, 0), 0);
        assert_eq!(percent(1, 3), 33);
        assert_eq!(percent(2, 3), 67);
        assert_eq!(percent(1, 2), 50);
    }
}
