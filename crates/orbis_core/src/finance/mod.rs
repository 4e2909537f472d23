//! Finance aggregation engine.
//!
//! # Responsibility
//! - Derive balance, income/expense totals, per-category totals and the
//!   time-bucketed chart series from the live ledger.
//!
//! # Invariants
//! - Summaries are recomputed from scratch on every call; nothing is cached.
//! - All sums use exact decimal arithmetic.
//! - Only buckets containing at least one entry appear in the series, in
//!   chronological order.

use crate::clock::day_from_ms;
use crate::model::finance::{EntryKind, FinanceEntry};
use chrono::{Datelike, NaiveDate};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt::{Display, Formatter};
use std::str::FromStr;

/// Calendar period used to bucket ledger entries for charts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SeriesPeriod {
    Day,
    #[default]
    Month,
    Year,
}

impl SeriesPeriod {
    /// First day of the bucket containing `day`.
    pub fn bucket_start(self, day: NaiveDate) -> NaiveDate {
        let start = match self {
            Self::Day => Some(day),
            Self::Month => day.with_day(1),
            Self::Year => NaiveDate::from_ymd_opt(day.year(), 1, 1),
        };
        start.unwrap_or(day)
    }

    /// Display label for the bucket starting at `start`.
    pub fn label(self, start: NaiveDate) -> String {
        match self {
            Self::Day => start.format("%Y-%m-%d").to_string(),
            Self::Month => start.format("%Y-%m").to_string(),
            Self::Year => start.format("%Y").to_string(),
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Day => "day",
            Self::Month => "month",
            Self::Year => "year",
        }
    }
}

impl Display for SeriesPeriod {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SeriesPeriod {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "day" => Ok(Self::Day),
            "month" => Ok(Self::Month),
            "year" => Ok(Self::Year),
            other => Err(format!(
                "unsupported series period `{other}`; expected day|month|year"
            )),
        }
    }
}

/// Total of one chart bucket.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeriesBucket {
    pub start: NaiveDate,
    pub label: String,
    pub total: Decimal,
}

/// Derived view over the ledger rendered by the finances screen.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FinanceSummary {
    /// Sum of all signed contributions.
    pub balance: Decimal,
    /// Sum of income contributions.
    pub income: Decimal,
    /// Magnitude of all expense contributions.
    pub expenses: Decimal,
    /// Signed total per category; categories without entries are absent.
    pub by_category: BTreeMap<String, Decimal>,
    pub series: Vec<SeriesBucket>,
}

/// Aggregates `entries` into a [`FinanceSummary`].
pub fn aggregate<'a>(
    entries: impl IntoIterator<Item = &'a FinanceEntry>,
    period: SeriesPeriod,
) -> FinanceSummary {
    let mut summary = FinanceSummary::default();
    let mut buckets: BTreeMap<NaiveDate, Decimal> = BTreeMap::new();

    for entry in entries {
        let contribution = entry.contribution();
        summary.balance += contribution;
        match entry.kind {
            EntryKind::Income => summary.income += contribution,
            EntryKind::Expense => summary.expenses += contribution.abs(),
        }
        *summary
            .by_category
            .entry(entry.category.clone())
            .or_insert(Decimal::ZERO) += contribution;

        if let Some(day) = day_from_ms(entry.occurred_at) {
            *buckets
                .entry(period.bucket_start(day))
                .or_insert(Decimal::ZERO) += contribution;
        }
    }

    summary.series = buckets
        .into_iter()
        .map(|(start, total)| SeriesBucket {
            start,
            label: period.label(start),
            total,
        })
        .collect();
    summary
}

/// Current balance of `entries`.
pub fn balance<'a>(entries: impl IntoIterator<Item = &'a FinanceEntry>) -> Decimal {
    entries
        .into_iter()
        .map(FinanceEntry::contribution)
        .sum()
}

#[cfg(test)]
mod tests {
    use super::SeriesPeriod;
    use chrono::NaiveDate;

    #[test]
    fn bucket_start_truncates_to_period() {
        let day = NaiveDate::from_ymd_opt(2026, 10, 18).unwrap();
        assert_eq!(SeriesPeriod::Day.bucket_start(day), day);
        assert_eq!(
            SeriesPeriod::Month.bucket_start(day),
            NaiveDate::from_ymd_opt(2026, 10, 1).unwrap()
        );
        assert_eq!(
            SeriesPeriod::Year.bucket_start(day),
            NaiveDate::from_ymd_opt(2026, 1, 1).unwrap()
        );
    }

    #[test]
    fn labels_follow_period_granularity() {
        let start = NaiveDate::from_ymd_opt(2026, 3, 1).unwrap();
        assert_eq!(SeriesPeriod::Month.label(start), "2026-03");
        assert_eq!(SeriesPeriod::Year.label(start), "2026");
        assert_eq!("MONTH".parse::<SeriesPeriod>().unwrap(), SeriesPeriod::Month);
    }
}
