//! radar-core: Shared types, theming, and error handling for the Compliance Radar client.
//!
//! This crate provides the foundational types used across the client:
//! - Entity types (Environment, Scan, Finding, etc.) mirroring the backend's REST payloads
//! - AI request/response types (remediation plans, assistant answers)
//! - The design-system color and score-tier mappings
//! - Common error types

pub mod error;
pub mod theme;
pub mod types;

pub use error::RadarError;
pub use types::{
    AiAnswer, AiQuestion, ComplianceTrend, ConformityScores, CreateScanRequest, CreateScanResponse,
    DashboardMetrics, Environment, EnvironmentDraft, EnvironmentType, Finding, FindingStatus,
    FindingsByResource, HealthStatus, Regulation, RegulationControl, RegulationControls,
    RemediationPlan, RemediationRequest, ReportFormat, ResourceBreakdown, RetryScanResponse,
    Scan, ScanStatus, Severity, SeverityBreakdown, TaskStatus, TrendPoint,
};
