//! Connection management and the typed Compliance Radar API client.

use std::time::Duration;

use reqwest::header::{HeaderMap, HeaderValue, CONTENT_TYPE};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use url::Url;

use radar_core::types::{
    AiAnswer, AiQuestion, ComplianceTrend, CreateScanRequest, CreateScanResponse,
    DashboardMetrics, Environment, EnvironmentDraft, Finding, FindingStatus, FindingsByResource,
    HealthStatus, Regulation, RegulationControls, RemediationPlan, RemediationRequest,
    ReportFormat, RetryScanResponse, Scan, TaskStatus,
};

use crate::error::ApiError;
use crate::params::{FindingListParams, ScanListParams, TrendParams};

/// Configuration for connecting to the backend.
#[derive(Debug, Clone, Deserialize)]
pub struct ApiConfig {
    /// Base URL of the backend, including scheme and port.
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Fixed per-request timeout in seconds.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_base_url() -> String {
    "http://localhost:8000".to_string()
}

fn default_timeout_secs() -> u64 {
    30
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

/// A report export: parsed JSON, or opaque bytes for pdf/html.
#[derive(Debug, Clone)]
pub enum Report {
    Json(serde_json::Value),
    Binary(Vec<u8>),
}

/// Wire shape of the regulation catalog response.
#[derive(Debug, Deserialize)]
struct RegulationCatalog {
    #[serde(default)]
    regulations: Vec<Regulation>,
}

/// Typed HTTP client for the Compliance Radar backend.
///
/// One method per backend operation; every response is parsed into its
/// schema type at this boundary. Non-success responses are logged here
/// and surfaced as [`ApiError::Status`] carrying the backend's error
/// payload; callers own user-facing messaging. No retries, no request
/// de-duplication. Clone is cheap (inner connection pool is shared).
#[derive(Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: Url,
}

impl ApiClient {
    /// Build a client with the given configuration.
    pub fn new(config: &ApiConfig) -> Result<Self, ApiError> {
        let base_url = Url::parse(&config.base_url)
            .map_err(|e| ApiError::Config(format!("invalid base URL {}: {e}", config.base_url)))?;

        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        let http = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        tracing::debug!(base_url = %base_url, "API client ready");
        Ok(Self { http, base_url })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    // ── Health & status ───────────────────────────────────────────

    /// Liveness probe.
    pub async fn health(&self) -> Result<HealthStatus, ApiError> {
        self.get_json("/health", &[]).await
    }

    /// Loosely-shaped system diagnostics.
    pub async fn system_status(&self) -> Result<serde_json::Value, ApiError> {
        self.get_json("/api/v1/status", &[]).await
    }

    // ── Dashboard ─────────────────────────────────────────────────

    /// Aggregate dashboard metrics.
    pub async fn dashboard_metrics(&self) -> Result<DashboardMetrics, ApiError> {
        self.get_json("/api/v1/dashboard", &[]).await
    }

    // ── Environments ──────────────────────────────────────────────

    pub async fn list_environments(&self) -> Result<Vec<Environment>, ApiError> {
        self.get_json("/api/v1/environments", &[]).await
    }

    pub async fn get_environment(&self, id: i64) -> Result<Environment, ApiError> {
        self.get_json(&format!("/api/v1/environments/{id}"), &[]).await
    }

    pub async fn create_environment(&self, draft: &EnvironmentDraft) -> Result<Environment, ApiError> {
        self.post_json("/api/v1/environments", draft).await
    }

    pub async fn update_environment(
        &self,
        id: i64,
        draft: &EnvironmentDraft,
    ) -> Result<Environment, ApiError> {
        self.put_json(&format!("/api/v1/environments/{id}"), draft).await
    }

    pub async fn delete_environment(&self, id: i64) -> Result<(), ApiError> {
        let path = format!("/api/v1/environments/{id}");
        let response = self.http.delete(self.endpoint(&path)?).send().await?;
        Self::check_status(&path, response).await?;
        Ok(())
    }

    // ── Scans ─────────────────────────────────────────────────────

    pub async fn list_scans(&self, params: &ScanListParams) -> Result<Vec<Scan>, ApiError> {
        self.get_json("/api/v1/scans", &params.to_query()).await
    }

    pub async fn get_scan(&self, id: i64) -> Result<Scan, ApiError> {
        self.get_json(&format!("/api/v1/scans/{id}"), &[]).await
    }

    /// Start a scan. Returns the new scan id and the async task driving it.
    pub async fn create_scan(&self, request: &CreateScanRequest) -> Result<CreateScanResponse, ApiError> {
        self.post_json("/api/v1/scans", request).await
    }

    /// Status of the async task behind a running scan.
    pub async fn scan_status(&self, task_id: &str) -> Result<TaskStatus, ApiError> {
        self.get_json(&format!("/api/v1/scans/status/{task_id}"), &[]).await
    }

    /// Re-run a failed scan.
    pub async fn retry_scan(&self, scan_id: i64) -> Result<RetryScanResponse, ApiError> {
        self.post_empty(&format!("/api/v1/scans/{scan_id}/retry")).await
    }

    // ── Findings ──────────────────────────────────────────────────

    pub async fn list_findings(&self, params: &FindingListParams) -> Result<Vec<Finding>, ApiError> {
        self.get_json("/api/v1/findings", &params.to_query()).await
    }

    pub async fn get_finding(&self, id: i64) -> Result<Finding, ApiError> {
        self.get_json(&format!("/api/v1/findings/{id}"), &[]).await
    }

    pub async fn update_finding_status(
        &self,
        id: i64,
        status: FindingStatus,
    ) -> Result<Finding, ApiError> {
        #[derive(Serialize)]
        struct Body {
            status: FindingStatus,
        }
        self.patch_json(&format!("/api/v1/findings/{id}/status"), &Body { status })
            .await
    }

    pub async fn bulk_update_findings(
        &self,
        finding_ids: &[i64],
        status: FindingStatus,
    ) -> Result<(), ApiError> {
        #[derive(Serialize)]
        struct Body<'a> {
            finding_ids: &'a [i64],
            status: FindingStatus,
        }
        let path = "/api/v1/findings/bulk-update";
        let response = self
            .http
            .post(self.endpoint(path)?)
            .json(&Body { finding_ids, status })
            .send()
            .await?;
        Self::check_status(path, response).await?;
        Ok(())
    }

    // ── AI ────────────────────────────────────────────────────────

    /// Generate an AI remediation plan for one finding.
    pub async fn generate_remediation(
        &self,
        request: &RemediationRequest,
    ) -> Result<RemediationPlan, ApiError> {
        self.post_json("/api/v1/ai/remediation", request).await
    }

    /// Free-form compliance Q&A.
    pub async fn ask(&self, question: &AiQuestion) -> Result<AiAnswer, ApiError> {
        self.post_json("/api/v1/ai/ask", question).await
    }

    /// Scan-level AI analysis; the payload shape is backend-defined.
    pub async fn analyze_scan(&self, scan_id: i64) -> Result<serde_json::Value, ApiError> {
        self.post_empty(&format!("/api/v1/ai/analyze/{scan_id}")).await
    }

    // ── Reports ───────────────────────────────────────────────────

    /// Export a scan report. JSON is parsed; pdf/html come back as bytes.
    pub async fn report(&self, scan_id: i64, format: ReportFormat) -> Result<Report, ApiError> {
        let path = format!("/api/v1/reports/{scan_id}");
        let mut url = self.endpoint(&path)?;
        url.query_pairs_mut().append_pair("format", format.as_str());

        let response = self.http.get(url).send().await?;
        let response = Self::check_status(&path, response).await?;

        if format.is_binary() {
            let bytes = response.bytes().await?;
            Ok(Report::Binary(bytes.to_vec()))
        } else {
            let body = response.text().await?;
            let value = serde_json::from_str(&body).map_err(|e| ApiError::Decode {
                endpoint: path,
                message: e.to_string(),
            })?;
            Ok(Report::Json(value))
        }
    }

    // ── Regulations ───────────────────────────────────────────────

    pub async fn list_regulations(&self) -> Result<Vec<Regulation>, ApiError> {
        let catalog: RegulationCatalog = self.get_json("/api/v1/regulations", &[]).await?;
        Ok(catalog.regulations)
    }

    pub async fn regulation_controls(&self, code: &str) -> Result<RegulationControls, ApiError> {
        self.get_json(&format!("/api/v1/regulations/{code}/controls"), &[])
            .await
    }

    // ── Statistics ────────────────────────────────────────────────

    pub async fn compliance_trend(&self, params: &TrendParams) -> Result<ComplianceTrend, ApiError> {
        self.get_json("/api/v1/statistics/compliance-trend", &params.to_query())
            .await
    }

    pub async fn findings_by_resource(&self) -> Result<FindingsByResource, ApiError> {
        self.get_json("/api/v1/statistics/findings-by-resource", &[])
            .await
    }

    // ── Request plumbing ──────────────────────────────────────────

    fn endpoint(&self, path: &str) -> Result<Url, ApiError> {
        self.base_url
            .join(path)
            .map_err(|e| ApiError::Config(format!("invalid endpoint path {path}: {e}")))
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<T, ApiError> {
        let mut url = self.endpoint(path)?;
        if !query.is_empty() {
            url.query_pairs_mut()
                .extend_pairs(query.iter().map(|(k, v)| (*k, v.as_str())));
        }
        let response = self.http.get(url).send().await?;
        Self::decode(path, response).await
    }

    async fn post_json<B: Serialize, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, ApiError> {
        let response = self.http.post(self.endpoint(path)?).json(body).send().await?;
        Self::decode(path, response).await
    }

    /// POST with no request body (retry, analyze).
    async fn post_empty<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        let response = self.http.post(self.endpoint(path)?).send().await?;
        Self::decode(path, response).await
    }

    async fn put_json<B: Serialize, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, ApiError> {
        let response = self.http.put(self.endpoint(path)?).json(body).send().await?;
        Self::decode(path, response).await
    }

    async fn patch_json<B: Serialize, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, ApiError> {
        let response = self.http.patch(self.endpoint(path)?).json(body).send().await?;
        Self::decode(path, response).await
    }

    /// Reject non-success statuses, logging them centrally.
    async fn check_status(
        path: &str,
        response: reqwest::Response,
    ) -> Result<reqwest::Response, ApiError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = response.text().await.unwrap_or_default();
        let message = error_detail(&body);
        tracing::error!(endpoint = path, status = status.as_u16(), %message, "API request failed");
        Err(ApiError::Status {
            status: status.as_u16(),
            message,
        })
    }

    /// Validate the status, then parse the body into its schema type.
    async fn decode<T: DeserializeOwned>(
        path: &str,
        response: reqwest::Response,
    ) -> Result<T, ApiError> {
        let response = Self::check_status(path, response).await?;
        let body = response.text().await?;
        serde_json::from_str(&body).map_err(|e| ApiError::Decode {
            endpoint: path.to_string(),
            message: e.to_string(),
        })
    }
}

/// Extract a human-readable message from a backend error body.
///
/// The backend wraps errors as `{"detail": ...}`; some handlers use
/// `{"message": ...}`. Anything else is passed through raw.
fn error_detail(body: &str) -> String {
    if let Ok(value) = serde_json::from_str::<serde_json::Value>(body) {
        for key in ["detail", "message", "error"] {
            if let Some(text) = value.get(key).and_then(|v| v.as_str()) {
                return text.to_string();
            }
        }
        // Structured but unrecognised; keep the payload for diagnostics.
        if !value.is_null() {
            return value.to_string();
        }
    }
    let trimmed = body.trim();
    if trimmed.is_empty() {
        "request failed".to_string()
    } else {
        trimmed.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_detail_prefers_fastapi_detail() {
        assert_eq!(
            error_detail(r#"{"detail": "Regulation not found"}"#),
            "Regulation not found"
        );
        assert_eq!(error_detail(r#"{"message": "boom"}"#), "boom");
        assert_eq!(error_detail(r#"{"error": "nope"}"#), "nope");
    }

    #[test]
    fn error_detail_falls_back_to_raw_body() {
        assert_eq!(error_detail("Internal Server Error"), "Internal Server Error");
        assert_eq!(error_detail("  "), "request failed");
        assert_eq!(error_detail(""), "request failed");
    }

    #[test]
    fn error_detail_keeps_unrecognised_structures() {
        assert_eq!(
            error_detail(r#"{"errors": ["a", "b"]}"#),
            r#"{"errors":["a","b"]}"#
        );
    }

    #[test]
    fn client_rejects_invalid_base_url() {
        let config = ApiConfig {
            base_url: "not a url".to_string(),
            timeout_secs: 30,
        };
        assert!(matches!(ApiClient::new(&config), Err(ApiError::Config(_))));
    }

    #[test]
    fn endpoint_joins_against_base() {
        let client = ApiClient::new(&ApiConfig::default()).unwrap();
        let url = client.endpoint("/api/v1/scans").unwrap();
        assert_eq!(url.as_str(), "http://localhost:8000/api/v1/scans");
    }

    #[test]
    fn default_config_points_at_local_backend() {
        let config = ApiConfig::default();
        assert_eq!(config.base_url, "http://localhost:8000");
        assert_eq!(config.timeout_secs, 30);
    }
}
