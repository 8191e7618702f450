//! Radar API — typed HTTP client for the Compliance Radar backend.
//!
//! This crate is the single point of contact with the backend REST API.
//! All requests flow through [`ApiClient`] to ensure one consistent base
//! URL, JSON content type, request timeout, response-schema validation,
//! and error logging.

pub mod client;
pub mod error;
pub mod params;

pub use client::{ApiClient, ApiConfig, Report};
pub use error::ApiError;
pub use params::{FindingListParams, ScanListParams, TrendParams};
