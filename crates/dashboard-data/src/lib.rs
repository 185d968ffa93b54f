//! Data layer for the payments dashboard.
//!
//! Fetches transactions and summary figures from the procedure API, falls
//! back to synthetic data when it is unavailable, and buckets transactions
//! into calendar periods.

pub mod aggregator;
pub mod client;
pub mod loader;
pub mod sample;

#[cfg(test)]
mod mock_server;

pub use dashboard_core as core;
