//! radar-tui: Terminal dashboard for the Compliance Radar backend.
//!
//! Renders environments, scans, findings, AI remediation plans, and trend
//! charts fetched over the backend REST API. All state here is view state:
//! the backend owns every score, count, and severity.

pub mod app;
pub mod chat;
pub mod config;
pub mod filters;
pub mod net;
pub mod settings;
pub mod state;
pub mod tui;
pub mod ui;
