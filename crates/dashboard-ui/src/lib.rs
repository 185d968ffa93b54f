//! Terminal UI layer for the payments dashboard.
//!
//! Provides themes, the header and summary-card components, the period bar
//! chart, the transaction table, the masked payment-details popup, and the
//! main application event loop built on top of [`ratatui`].

pub mod app;
pub mod chart_view;
pub mod components;
pub mod detail_view;
pub mod table_view;
pub mod themes;

pub use dashboard_core as core;
