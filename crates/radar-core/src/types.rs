//! Core entity types for the Compliance Radar client.
//!
//! These mirror the backend's REST payloads field for field. Every score,
//! count, and severity is backend-owned: the client parses it once at the
//! API boundary and redisplays it verbatim, never recomputing locally.

use std::collections::BTreeMap;
use std::fmt;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

// ── Environments ──────────────────────────────────────────────────

/// The kind of infrastructure target an environment points at.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum EnvironmentType {
    Kubernetes,
    Aws,
    Azure,
    Gcp,
}

impl EnvironmentType {
    pub const ALL: [EnvironmentType; 4] = [
        EnvironmentType::Kubernetes,
        EnvironmentType::Aws,
        EnvironmentType::Azure,
        EnvironmentType::Gcp,
    ];

    pub const fn as_str(self) -> &'static str {
        match self {
            EnvironmentType::Kubernetes => "kubernetes",
            EnvironmentType::Aws => "aws",
            EnvironmentType::Azure => "azure",
            EnvironmentType::Gcp => "gcp",
        }
    }

    /// Uppercase label used in tables and chips.
    pub const fn label(self) -> &'static str {
        match self {
            EnvironmentType::Kubernetes => "KUBERNETES",
            EnvironmentType::Aws => "AWS",
            EnvironmentType::Azure => "AZURE",
            EnvironmentType::Gcp => "GCP",
        }
    }
}

impl fmt::Display for EnvironmentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A monitored infrastructure target subject to scanning.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Environment {
    pub id: i64,
    pub name: String,
    #[serde(rename = "type")]
    pub env_type: EnvironmentType,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub last_scan: Option<DateTime<Utc>>,
}

/// Payload for creating or updating an environment.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct EnvironmentDraft {
    pub name: String,
    #[serde(rename = "type")]
    pub env_type: EnvironmentType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

// ── Scans ─────────────────────────────────────────────────────────

/// Lifecycle state of a scan. Transitions happen server-side; the client
/// only re-fetches, plus an explicit retry request for failed scans.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum ScanStatus {
    Pending,
    Running,
    Completed,
    Failed,
}

impl ScanStatus {
    pub const ALL: [ScanStatus; 4] = [
        ScanStatus::Pending,
        ScanStatus::Running,
        ScanStatus::Completed,
        ScanStatus::Failed,
    ];

    pub const fn as_str(self) -> &'static str {
        match self {
            ScanStatus::Pending => "pending",
            ScanStatus::Running => "running",
            ScanStatus::Completed => "completed",
            ScanStatus::Failed => "failed",
        }
    }

    /// A scan still making progress server-side.
    pub const fn is_active(self) -> bool {
        matches!(self, ScanStatus::Pending | ScanStatus::Running)
    }
}

impl fmt::Display for ScanStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Per-regulation conformity scores in `[0.0, 1.0]`, keyed by regulation
/// code (e.g. `"NIS2"`, `"ISO27001"`).
pub type ConformityScores = BTreeMap<String, f64>;

/// One execution pass producing findings and compliance scores for an
/// environment.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Scan {
    pub id: i64,
    pub environment_id: i64,
    #[serde(default)]
    pub environment_name: Option<String>,
    #[serde(default)]
    pub environment_type: Option<EnvironmentType>,
    pub status: ScanStatus,
    pub started_at: DateTime<Utc>,
    #[serde(default)]
    pub completed_at: Option<DateTime<Utc>>,
    /// Wall-clock duration in seconds, present once completed.
    #[serde(default)]
    pub duration: Option<i64>,
    #[serde(default)]
    pub overall_score: Option<f64>,
    #[serde(default)]
    pub conformity_scores: ConformityScores,
    #[serde(default)]
    pub total_findings: u32,
    #[serde(default)]
    pub critical_count: u32,
    #[serde(default)]
    pub high_count: u32,
    #[serde(default)]
    pub medium_count: u32,
    #[serde(default)]
    pub low_count: u32,
}

impl Scan {
    /// Display name, falling back to the environment id.
    pub fn environment_label(&self) -> String {
        match &self.environment_name {
            Some(name) => name.clone(),
            None => format!("Environment {}", self.environment_id),
        }
    }
}

/// Request body for `POST /api/v1/scans`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CreateScanRequest {
    pub environment_id: i64,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub scanners: Vec<String>,
}

/// Response from `POST /api/v1/scans`: the scan record id plus the async
/// task id driving it.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CreateScanResponse {
    pub scan_id: i64,
    pub task_id: String,
}

/// Response from `POST /api/v1/scans/{id}/retry`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RetryScanResponse {
    pub task_id: String,
}

/// Status of an async scan task, from `GET /api/v1/scans/status/{task_id}`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TaskStatus {
    pub status: String,
    #[serde(default)]
    pub progress: Option<f64>,
    #[serde(flatten)]
    pub extra: serde_json::Value,
}

// ── Findings ──────────────────────────────────────────────────────

/// Ordinal risk classification of a finding.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Critical,
    High,
    Medium,
    Low,
    Info,
}

impl Severity {
    pub const ALL: [Severity; 5] = [
        Severity::Critical,
        Severity::High,
        Severity::Medium,
        Severity::Low,
        Severity::Info,
    ];

    pub const fn as_str(self) -> &'static str {
        match self {
            Severity::Critical => "critical",
            Severity::High => "high",
            Severity::Medium => "medium",
            Severity::Low => "low",
            Severity::Info => "info",
        }
    }

    /// Ordinal rank: critical > high > medium > low > info.
    pub const fn rank(self) -> u8 {
        match self {
            Severity::Critical => 4,
            Severity::High => 3,
            Severity::Medium => 2,
            Severity::Low => 1,
            Severity::Info => 0,
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Status values the client writes back to findings.
///
/// The backend stores a free-form status string; this enum covers the
/// values the client itself sets via the status-update endpoints.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum FindingStatus {
    Open,
    Resolved,
    Accepted,
    FalsePositive,
}

impl FindingStatus {
    pub const fn as_str(self) -> &'static str {
        match self {
            FindingStatus::Open => "open",
            FindingStatus::Resolved => "resolved",
            FindingStatus::Accepted => "accepted",
            FindingStatus::FalsePositive => "false_positive",
        }
    }
}

impl fmt::Display for FindingStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single detected non-conformity from a scan.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Finding {
    pub id: i64,
    pub scan_id: i64,
    pub finding_hash: String,
    pub scanner: String,
    pub check_id: String,
    pub title: String,
    pub description: String,
    pub severity: Severity,
    #[serde(default)]
    pub resource_type: Option<String>,
    #[serde(default)]
    pub resource_id: Option<String>,
    /// Backend-owned status string (`open`, `resolved`, `accepted`, ...).
    pub status: String,
    #[serde(default)]
    pub remediation: Option<String>,
    #[serde(default)]
    pub ai_remediation: Option<String>,
    #[serde(default)]
    pub regulations: Vec<String>,
    /// Opaque raw scanner output; displayed as-is, never interpreted.
    #[serde(default)]
    pub raw_result: serde_json::Value,
    pub created_at: DateTime<Utc>,
}

// ── Dashboard ─────────────────────────────────────────────────────

/// One point of the compliance trend series.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TrendPoint {
    pub date: NaiveDate,
    pub scores: ConformityScores,
}

/// Finding counts per severity for one resource type.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct SeverityBreakdown {
    #[serde(default)]
    pub critical: u32,
    #[serde(default)]
    pub high: u32,
    #[serde(default)]
    pub medium: u32,
    #[serde(default)]
    pub low: u32,
}

/// Findings grouped by the resource type they were raised against.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ResourceBreakdown {
    pub resource_type: String,
    pub count: u32,
    pub severity_breakdown: SeverityBreakdown,
}

/// Aggregate dashboard read model, fully derived server-side.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DashboardMetrics {
    pub total_environments: u32,
    pub total_scans: u32,
    pub active_scans: u32,
    pub average_conformity_score: f64,
    pub critical_findings: u32,
    pub high_findings: u32,
    pub medium_findings: u32,
    pub low_findings: u32,
    #[serde(default)]
    pub recent_scans: Vec<Scan>,
    #[serde(default)]
    pub conformity_trend: Vec<TrendPoint>,
    #[serde(default)]
    pub findings_by_resource: Vec<ResourceBreakdown>,
}

impl DashboardMetrics {
    pub fn total_findings(&self) -> u32 {
        self.critical_findings + self.high_findings + self.medium_findings + self.low_findings
    }

    /// Placeholder "remediated this month" figure: 15% of total findings.
    ///
    /// The backend does not yet expose a remediated count, so the original
    /// dashboard estimated one client-side. Kept in a single function so a
    /// backend-sourced value can replace it without touching rendering.
    pub fn remediated_estimate(&self) -> u32 {
        (f64::from(self.total_findings()) * 0.15).round() as u32
    }
}

// ── AI ────────────────────────────────────────────────────────────

/// Request body for `POST /api/v1/ai/remediation`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RemediationRequest {
    pub finding_id: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub include_context: Option<bool>,
}

/// AI-generated remediation plan for one finding. Ephemeral: lives only
/// while the remediation dialog is open.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RemediationPlan {
    pub finding_id: i64,
    pub remediation_plan: String,
    #[serde(default)]
    pub terraform_code: Option<String>,
    #[serde(default)]
    pub helm_code: Option<String>,
    #[serde(default)]
    pub manual_steps: Vec<String>,
    pub risk_assessment: String,
    pub estimated_effort: String,
    pub ai_confidence: f64,
}

/// Request body for `POST /api/v1/ai/ask`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AiQuestion {
    pub question: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub context: Option<String>,
}

/// Answer from the AI assistant, with optional follow-up suggestions.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AiAnswer {
    pub answer: String,
    #[serde(default)]
    pub related_findings: Vec<Finding>,
    #[serde(default)]
    pub suggestions: Vec<String>,
}

// ── Regulations ───────────────────────────────────────────────────

/// A regulatory framework from the backend catalog.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Regulation {
    pub code: String,
    pub name: String,
    #[serde(default)]
    pub version: Option<String>,
    #[serde(default)]
    pub mandatory_for: Vec<String>,
    #[serde(default)]
    pub controls_count: Option<u32>,
}

/// One control within a regulation.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RegulationControl {
    pub control_id: String,
    pub title: String,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub priority: Option<Severity>,
    #[serde(default)]
    pub mapped_checks: Vec<String>,
}

/// Response from `GET /api/v1/regulations/{code}/controls`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RegulationControls {
    pub regulation: String,
    #[serde(default)]
    pub controls: Vec<RegulationControl>,
}

// ── Statistics & status ───────────────────────────────────────────

/// Response from `GET /api/v1/statistics/compliance-trend`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ComplianceTrend {
    #[serde(default)]
    pub trend: Vec<TrendPoint>,
}

/// Response from `GET /api/v1/statistics/findings-by-resource`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FindingsByResource {
    #[serde(default)]
    pub resources: Vec<ResourceBreakdown>,
}

/// Liveness probe response from `GET /health`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct HealthStatus {
    pub status: String,
    #[serde(default)]
    pub timestamp: Option<DateTime<Utc>>,
    #[serde(default)]
    pub version: Option<String>,
    #[serde(default)]
    pub services: BTreeMap<String, String>,
}

// ── Reports ───────────────────────────────────────────────────────

/// Export format for `GET /api/v1/reports/{scan_id}`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ReportFormat {
    Json,
    Pdf,
    Html,
}

impl ReportFormat {
    pub const fn as_str(self) -> &'static str {
        match self {
            ReportFormat::Json => "json",
            ReportFormat::Pdf => "pdf",
            ReportFormat::Html => "html",
        }
    }

    /// JSON is parsed; pdf/html come back as opaque bytes.
    pub const fn is_binary(self) -> bool {
        !matches!(self, ReportFormat::Json)
    }
}

impl fmt::Display for ReportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scan_deserializes_backend_payload() {
        let json = r#"{
            "id": 7,
            "environment_id": 2,
            "environment_name": "Production AWS",
            "environment_type": "aws",
            "status": "completed",
            "started_at": "2025-11-07T10:00:00Z",
            "completed_at": "2025-11-07T10:08:32Z",
            "duration": 512,
            "overall_score": 0.87,
            "conformity_scores": {"NIS2": 0.85, "ISO27001": 0.92},
            "total_findings": 43,
            "critical_count": 3,
            "high_count": 12,
            "medium_count": 28,
            "low_count": 0
        }"#;

        let scan: Scan = serde_json::from_str(json).unwrap();
        assert_eq!(scan.id, 7);
        assert_eq!(scan.status, ScanStatus::Completed);
        assert_eq!(scan.environment_type, Some(EnvironmentType::Aws));
        assert_eq!(scan.conformity_scores["NIS2"], 0.85);
        assert_eq!(scan.environment_label(), "Production AWS");
        assert!(!scan.status.is_active());
    }

    #[test]
    fn scan_tolerates_missing_optional_fields() {
        let json = r#"{
            "id": 9,
            "environment_id": 4,
            "status": "running",
            "started_at": "2025-11-07T10:00:00Z"
        }"#;

        let scan: Scan = serde_json::from_str(json).unwrap();
        assert_eq!(scan.overall_score, None);
        assert_eq!(scan.total_findings, 0);
        assert!(scan.conformity_scores.is_empty());
        assert_eq!(scan.environment_label(), "Environment 4");
        assert!(scan.status.is_active());
    }

    #[test]
    fn finding_round_trips() {
        let json = r#"{
            "id": 101,
            "scan_id": 7,
            "finding_hash": "a1b2c3",
            "scanner": "prowler",
            "check_id": "s3_bucket_public_access",
            "title": "S3 bucket allows public access",
            "description": "Bucket prod-data-backups is publicly readable.",
            "severity": "critical",
            "resource_type": "S3Bucket",
            "resource_id": "prod-data-backups",
            "status": "open",
            "regulations": ["NIS2", "RGPD"],
            "created_at": "2025-11-07T10:05:00Z"
        }"#;

        let finding: Finding = serde_json::from_str(json).unwrap();
        assert_eq!(finding.severity, Severity::Critical);
        assert_eq!(finding.regulations, vec!["NIS2", "RGPD"]);
        assert!(finding.raw_result.is_null());

        let back = serde_json::to_string(&finding).unwrap();
        let again: Finding = serde_json::from_str(&back).unwrap();
        assert_eq!(finding, again);
    }

    #[test]
    fn severity_ordering_by_rank() {
        assert!(Severity::Critical.rank() > Severity::High.rank());
        assert!(Severity::High.rank() > Severity::Medium.rank());
        assert!(Severity::Medium.rank() > Severity::Low.rank());
        assert!(Severity::Low.rank() > Severity::Info.rank());
    }

    #[test]
    fn enums_serialize_lowercase() {
        assert_eq!(
            serde_json::to_string(&ScanStatus::Completed).unwrap(),
            "\"completed\""
        );
        assert_eq!(
            serde_json::to_string(&EnvironmentType::Kubernetes).unwrap(),
            "\"kubernetes\""
        );
        assert_eq!(
            serde_json::to_string(&FindingStatus::FalsePositive).unwrap(),
            "\"false_positive\""
        );
    }

    #[test]
    fn remediated_estimate_is_fifteen_percent() {
        let metrics = DashboardMetrics {
            total_environments: 3,
            total_scans: 10,
            active_scans: 1,
            average_conformity_score: 0.8,
            critical_findings: 10,
            high_findings: 20,
            medium_findings: 50,
            low_findings: 20,
            recent_scans: Vec::new(),
            conformity_trend: Vec::new(),
            findings_by_resource: Vec::new(),
        };
        assert_eq!(metrics.total_findings(), 100);
        assert_eq!(metrics.remediated_estimate(), 15);
    }

    #[test]
    fn environment_draft_omits_empty_description() {
        let draft = EnvironmentDraft {
            name: "staging".to_string(),
            env_type: EnvironmentType::Gcp,
            description: None,
        };
        let json = serde_json::to_string(&draft).unwrap();
        assert_eq!(json, r#"{"name":"staging","type":"gcp"}"#);
    }

    #[test]
    fn trend_point_parses_date() {
        let json = r#"{"date": "2025-11-01", "scores": {"NIS2": 0.8}}"#;
        let point: TrendPoint = serde_json::from_str(json).unwrap();
        assert_eq!(point.date.to_string(), "2025-11-01");
    }
}
