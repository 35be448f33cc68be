//! Shared domain layer for the attribution dashboard.
//!
//! Holds the event and derived-table models, the ingest error taxonomy,
//! command-line settings, timestamp parsing and number formatting used by the
//! data, runtime and binary crates.

pub mod error;
pub mod formatting;
pub mod models;
pub mod settings;
pub mod time_utils;
