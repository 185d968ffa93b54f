//! Runtime layer for the payments dashboard.
//!
//! Holds the dashboard view state and runs data loads in the background so
//! the terminal event loop stays responsive.

pub mod orchestrator;
pub mod state;

pub use dashboard_core as core;
pub use dashboard_data as data;
