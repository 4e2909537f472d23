//! Use-case facade over the dashboard core.
//!
//! # Responsibility
//! - Compose session, collections, derived views and persistence into one
//!   command surface for the presentation layer.
//! - Keep presentation code decoupled from storage details.

pub mod dashboard;
