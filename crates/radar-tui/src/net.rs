//! Request dispatch.
//!
//! Every network call runs as one tokio task and resolves back into the
//! synchronous UI loop as a single message on an mpsc channel. Responses
//! carry the generation of the view that issued them; the loop discards
//! anything whose generation no longer matches, so a response can never
//! land in a view that has been navigated away from.

use std::sync::mpsc::Sender;

use tokio::runtime::Handle;
use tokio::task::JoinHandle;

use radar_api::{ApiClient, FindingListParams, ScanListParams};
use radar_core::types::{
    AiAnswer, AiQuestion, CreateScanRequest, CreateScanResponse, DashboardMetrics, Environment,
    EnvironmentDraft, Finding, FindingStatus, RemediationPlan, RemediationRequest,
    RetryScanResponse, Scan, TaskStatus,
};

/// Monotonic id of the issuing view. Bumped on every navigation.
pub type Generation = u64;

/// Whether a response is tied to the issuing view or to the whole app.
///
/// The assistant transcript outlives page navigation, so its answers are
/// app-scoped; everything else dies with its view.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scope {
    Page(Generation),
    App,
}

/// A completed network call, delivered to the UI loop.
#[derive(Debug)]
pub enum ApiEvent {
    Dashboard(Result<DashboardMetrics, String>),
    ScansPage(Result<(Vec<Scan>, Vec<Environment>), String>),
    ScanDetail(Result<(Scan, Vec<Finding>), String>),
    Environments(Result<Vec<Environment>, String>),
    ScanCreated(Result<CreateScanResponse, String>),
    ScanRetried {
        scan_id: i64,
        result: Result<RetryScanResponse, String>,
    },
    TaskPolled(Result<TaskStatus, String>),
    EnvironmentSaved(Result<Environment, String>),
    EnvironmentDeleted {
        id: i64,
        result: Result<(), String>,
    },
    FindingUpdated(Result<Finding, String>),
    BulkUpdated {
        count: usize,
        result: Result<(), String>,
    },
    Remediation(Result<(Finding, RemediationPlan), String>),
    Analysis(Result<serde_json::Value, String>),
    Answer(Result<AiAnswer, String>),
}

/// One delivered response.
#[derive(Debug)]
pub struct Envelope {
    pub scope: Scope,
    pub event: ApiEvent,
}

/// Spawns API calls on the tokio runtime and channels their results back.
#[derive(Clone)]
pub struct Dispatcher {
    handle: Handle,
    client: ApiClient,
    tx: Sender<Envelope>,
}

impl Dispatcher {
    pub fn new(handle: Handle, client: ApiClient, tx: Sender<Envelope>) -> Self {
        Self { handle, client, tx }
    }

    fn spawn<F>(&self, scope: Scope, fut: F) -> JoinHandle<()>
    where
        F: std::future::Future<Output = ApiEvent> + Send + 'static,
    {
        let tx = self.tx.clone();
        self.handle.spawn(async move {
            let event = fut.await;
            // The receiver only disappears on shutdown.
            let _ = tx.send(Envelope { scope, event });
        })
    }

    pub fn load_dashboard(&self, generation: Generation) -> JoinHandle<()> {
        let client = self.client.clone();
        self.spawn(Scope::Page(generation), async move {
            ApiEvent::Dashboard(client.dashboard_metrics().await.map_err(|e| e.to_string()))
        })
    }

    /// Scans page: scans and environments fetched concurrently.
    pub fn load_scans_page(&self, generation: Generation) -> JoinHandle<()> {
        let client = self.client.clone();
        self.spawn(Scope::Page(generation), async move {
            let scan_params = ScanListParams::default();
            let result = tokio::try_join!(
                client.list_scans(&scan_params),
                client.list_environments(),
            );
            ApiEvent::ScansPage(result.map_err(|e| e.to_string()))
        })
    }

    /// Scan details: the scan and its findings fetched concurrently.
    pub fn load_scan_detail(&self, generation: Generation, scan_id: i64) -> JoinHandle<()> {
        let client = self.client.clone();
        self.spawn(Scope::Page(generation), async move {
            let finding_params = FindingListParams::for_scan(scan_id);
            let result = tokio::try_join!(
                client.get_scan(scan_id),
                client.list_findings(&finding_params),
            );
            ApiEvent::ScanDetail(result.map_err(|e| e.to_string()))
        })
    }

    pub fn load_environments(&self, generation: Generation) -> JoinHandle<()> {
        let client = self.client.clone();
        self.spawn(Scope::Page(generation), async move {
            ApiEvent::Environments(client.list_environments().await.map_err(|e| e.to_string()))
        })
    }

    pub fn create_scan(&self, generation: Generation, environment_id: i64) -> JoinHandle<()> {
        let client = self.client.clone();
        self.spawn(Scope::Page(generation), async move {
            let request = CreateScanRequest {
                environment_id,
                scanners: Vec::new(),
            };
            ApiEvent::ScanCreated(client.create_scan(&request).await.map_err(|e| e.to_string()))
        })
    }

    pub fn retry_scan(&self, generation: Generation, scan_id: i64) -> JoinHandle<()> {
        let client = self.client.clone();
        self.spawn(Scope::Page(generation), async move {
            ApiEvent::ScanRetried {
                scan_id,
                result: client.retry_scan(scan_id).await.map_err(|e| e.to_string()),
            }
        })
    }

    pub fn poll_task(&self, generation: Generation, task_id: String) -> JoinHandle<()> {
        let client = self.client.clone();
        self.spawn(Scope::Page(generation), async move {
            ApiEvent::TaskPolled(client.scan_status(&task_id).await.map_err(|e| e.to_string()))
        })
    }

    pub fn save_environment(
        &self,
        generation: Generation,
        id: Option<i64>,
        draft: EnvironmentDraft,
    ) -> JoinHandle<()> {
        let client = self.client.clone();
        self.spawn(Scope::Page(generation), async move {
            let result = match id {
                Some(id) => client.update_environment(id, &draft).await,
                None => client.create_environment(&draft).await,
            };
            ApiEvent::EnvironmentSaved(result.map_err(|e| e.to_string()))
        })
    }

    pub fn delete_environment(&self, generation: Generation, id: i64) -> JoinHandle<()> {
        let client = self.client.clone();
        self.spawn(Scope::Page(generation), async move {
            ApiEvent::EnvironmentDeleted {
                id,
                result: client.delete_environment(id).await.map_err(|e| e.to_string()),
            }
        })
    }

    pub fn resolve_finding(&self, generation: Generation, finding_id: i64) -> JoinHandle<()> {
        let client = self.client.clone();
        self.spawn(Scope::Page(generation), async move {
            ApiEvent::FindingUpdated(
                client
                    .update_finding_status(finding_id, FindingStatus::Resolved)
                    .await
                    .map_err(|e| e.to_string()),
            )
        })
    }

    pub fn bulk_resolve(&self, generation: Generation, finding_ids: Vec<i64>) -> JoinHandle<()> {
        let client = self.client.clone();
        self.spawn(Scope::Page(generation), async move {
            ApiEvent::BulkUpdated {
                count: finding_ids.len(),
                result: client
                    .bulk_update_findings(&finding_ids, FindingStatus::Resolved)
                    .await
                    .map_err(|e| e.to_string()),
            }
        })
    }

    /// Re-fetch the finding, then request an AI remediation plan for it.
    pub fn request_remediation(&self, generation: Generation, finding_id: i64) -> JoinHandle<()> {
        let client = self.client.clone();
        self.spawn(Scope::Page(generation), async move {
            let result = async {
                let finding = client.get_finding(finding_id).await?;
                let plan = client
                    .generate_remediation(&RemediationRequest {
                        finding_id,
                        include_context: Some(true),
                    })
                    .await?;
                Ok::<_, radar_api::ApiError>((finding, plan))
            }
            .await;
            ApiEvent::Remediation(result.map_err(|e| e.to_string()))
        })
    }

    pub fn analyze_scan(&self, generation: Generation, scan_id: i64) -> JoinHandle<()> {
        let client = self.client.clone();
        self.spawn(Scope::Page(generation), async move {
            ApiEvent::Analysis(client.analyze_scan(scan_id).await.map_err(|e| e.to_string()))
        })
    }

    /// Ask the assistant. App-scoped: the transcript outlives navigation.
    pub fn ask(&self, question: String) -> JoinHandle<()> {
        let client = self.client.clone();
        self.spawn(Scope::App, async move {
            let question = AiQuestion {
                question,
                context: None,
            };
            ApiEvent::Answer(client.ask(&question).await.map_err(|e| e.to_string()))
        })
    }
}
