//! Runtime layer for the attribution dashboard.
//!
//! Owns the loaded dashboard session, memoizes its derived tables and reloads
//! the events file only when it changes on disk.

pub mod data_manager;
pub mod session;

pub use attribution_core as core;
pub use attribution_data as data;
