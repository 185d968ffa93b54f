//! Domain core for the payments admin dashboard.
//!
//! Holds the transaction and summary models, the period strategy used to
//! bucket transactions by month or quarter, currency formatting, masking of
//! card data, the local operator session store and CLI settings.

pub mod auth;
pub mod error;
pub mod formatting;
pub mod masking;
pub mod models;
pub mod periods;
pub mod settings;
pub mod time_utils;

pub use error::{DashboardError, Result};
