//! CLI smoke entry point.
//!
//! # Responsibility
//! - Provide a minimal executable to verify `orbis_core` wiring end to end:
//!   config, logging, store, restore and derived views.
//! - Keep output deterministic for quick local sanity checks.

use log::error;
use orbis_core::db::{open_db, open_db_in_memory};
use orbis_core::{
    init_from_config, CoreConfig, Dashboard, RandomIds, SqliteKvStore, SystemClock,
};
use std::error::Error;
use std::process::ExitCode;

fn main() -> ExitCode {
    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!("event=cli_run module=cli status=error error={}", err);
            eprintln!("orbis: {err}");
            ExitCode::FAILURE
        }
    }
}

fn run() -> Result<(), Box<dyn Error>> {
    let config = CoreConfig::from_env()?;
    init_from_config(&config)?;

    println!("orbis_core ping={}", orbis_core::ping());
    println!("orbis_core version={}", orbis_core::core_version());

    let conn = match config.db_path.as_deref() {
        Some(path) => open_db(path)?,
        None => open_db_in_memory()?,
    };
    let store = SqliteKvStore::new(&conn);
    let dashboard = Dashboard::restore(&store, SystemClock, RandomIds)?
        .with_series_period(config.series_period);

    let view = dashboard.view();
    println!("state={}", view.state);
    if let Some(profile) = dashboard.profile() {
        println!("profile name={} objective={}", profile.name(), profile.objective());
    }

    for card in dashboard.overview() {
        println!(
            "card module={} expandable={} summary={}",
            card.module, card.expandable, card.summary_text
        );
    }

    let summary = dashboard.aggregate();
    println!(
        "finance balance={} income={} expenses={} categories={} buckets={}",
        summary.balance,
        summary.income,
        summary.expenses,
        summary.by_category.len(),
        summary.series.len()
    );
    Ok(())
}
