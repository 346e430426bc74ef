//! Qonto module
//!
//! HTTP client and query helpers for the Qonto third-party API

pub mod client;
pub mod query;

pub use client::{extract_error_message, QontoClient, QontoError};
pub use query::QueryParams;
