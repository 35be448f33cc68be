//! Data ingestion layer for the attribution dashboard.
//!
//! Reads the tab-separated events file, coerces revenue and timestamps,
//! builds the derived attribution tables and runs the load-and-clean pipeline.

pub mod aggregator;
pub mod analysis;
pub mod cleaner;
pub mod reader;

pub use attribution_core as core;
