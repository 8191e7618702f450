//! Application model: pages, overlays, and event handling.
//!
//! Key handling and response application are pure state transitions that
//! return [`Effect`]s; the loop turns effects into dispatcher calls. This
//! keeps every transition unit-testable without a network or a terminal.

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use tokio::task::JoinHandle;

use radar_core::theme::{Mode, Palette};
use radar_core::types::{
    DashboardMetrics, Environment, EnvironmentDraft, EnvironmentType, Finding, RemediationPlan,
    Scan, ScanStatus, Severity,
};

use crate::chat::Transcript;
use crate::config::UiConfig;
use crate::filters::{self, FindingFilter, ScanFilter};
use crate::net::{ApiEvent, Dispatcher, Envelope, Generation, Scope};
use crate::settings::SettingsStore;
use crate::state::RemoteData;

/// Deferred network actions produced by state transitions.
#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    LoadDashboard,
    LoadScansPage,
    LoadScanDetail(i64),
    LoadEnvironments,
    CreateScan(i64),
    RetryScan(i64),
    PollTask(String),
    SaveEnvironment {
        id: Option<i64>,
        draft: EnvironmentDraft,
    },
    DeleteEnvironment(i64),
    ResolveFinding(i64),
    BulkResolve(Vec<i64>),
    RequestRemediation(i64),
    AnalyzeScan(i64),
    Ask(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Page {
    Dashboard,
    Scans,
    ScanDetails,
    Environments,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Overlay {
    None,
    Assistant,
    NewScan,
    EnvironmentForm,
    ConfirmDelete,
    Remediation,
    Analysis,
    Help,
}

// ── Page state ────────────────────────────────────────────────────

#[derive(Default)]
pub struct DashboardState {
    pub metrics: RemoteData<DashboardMetrics>,
    pub selected: usize,
}

#[derive(Default)]
pub struct ScansState {
    pub data: RemoteData<(Vec<Scan>, Vec<Environment>)>,
    pub filter: ScanFilter,
    pub selected: usize,
}

pub struct DetailState {
    pub scan_id: i64,
    pub task_id: Option<String>,
    pub data: RemoteData<(Scan, Vec<Finding>)>,
    pub filter: FindingFilter,
    pub selected: usize,
    pub expanded: bool,
    /// Latest async-task status line, when the task id is known.
    pub task_note: Option<String>,
}

impl DetailState {
    fn new(scan_id: i64, task_id: Option<String>) -> Self {
        Self {
            scan_id,
            task_id,
            data: RemoteData::Idle,
            filter: FindingFilter::default(),
            selected: 0,
            expanded: false,
            task_note: None,
        }
    }
}

#[derive(Default)]
pub struct EnvironmentsState {
    pub data: RemoteData<Vec<Environment>>,
    pub selected: usize,
}

// ── Overlay state ─────────────────────────────────────────────────

#[derive(Debug, Default)]
pub struct NewScanDialog {
    pub selected: usize,
    pub creating: bool,
    pub error: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormField {
    Name,
    Type,
    Description,
}

pub struct EnvironmentForm {
    pub editing: Option<i64>,
    pub name: String,
    pub type_index: usize,
    pub description: String,
    pub field: FormField,
    pub saving: bool,
    pub error: Option<String>,
}

impl EnvironmentForm {
    fn blank() -> Self {
        Self {
            editing: None,
            name: String::new(),
            type_index: 0,
            description: String::new(),
            field: FormField::Name,
            saving: false,
            error: None,
        }
    }

    fn for_environment(env: &Environment) -> Self {
        Self {
            editing: Some(env.id),
            name: env.name.clone(),
            type_index: EnvironmentType::ALL
                .iter()
                .position(|t| *t == env.env_type)
                .unwrap_or(0),
            description: env.description.clone().unwrap_or_default(),
            field: FormField::Name,
            saving: false,
            error: None,
        }
    }

    pub fn env_type(&self) -> EnvironmentType {
        EnvironmentType::ALL[self.type_index % EnvironmentType::ALL.len()]
    }

    fn draft(&self) -> EnvironmentDraft {
        let description = self.description.trim();
        EnvironmentDraft {
            name: self.name.trim().to_string(),
            env_type: self.env_type(),
            description: if description.is_empty() {
                None
            } else {
                Some(description.to_string())
            },
        }
    }
}

pub struct ConfirmDelete {
    pub id: i64,
    pub name: String,
    pub deleting: bool,
}

pub struct RemediationDialog {
    pub finding_id: i64,
    pub finding_title: String,
    pub data: RemoteData<(Finding, RemediationPlan)>,
    pub scroll: u16,
}

pub struct AnalysisDialog {
    pub scan_id: i64,
    pub data: RemoteData<serde_json::Value>,
    pub scroll: u16,
}

#[derive(Default)]
pub struct AssistantState {
    pub transcript: Transcript,
    pub input: String,
    pub waiting: bool,
}

// ── App ───────────────────────────────────────────────────────────

/// Ticks a notice stays on screen before auto-clearing.
const NOTICE_TICKS: u64 = 40;

pub struct App {
    pub ui: UiConfig,
    pub page: Page,
    pub overlay: Overlay,
    pub dashboard: DashboardState,
    pub scans: ScansState,
    pub detail: Option<DetailState>,
    pub environments: EnvironmentsState,
    pub assistant: AssistantState,
    pub new_scan: Option<NewScanDialog>,
    pub env_form: Option<EnvironmentForm>,
    pub confirm_delete: Option<ConfirmDelete>,
    pub remediation: Option<RemediationDialog>,
    pub analysis: Option<AnalysisDialog>,
    pub palette: Palette,
    pub tick: u64,
    pub should_quit: bool,
    settings: SettingsStore,
    notice: Option<(String, u64)>,
    open_new_scan_on_load: bool,
    generation: Generation,
    page_task: Option<JoinHandle<()>>,
}

impl App {
    pub fn new(ui: UiConfig, settings: SettingsStore) -> Self {
        let palette = Palette::for_mode(settings.mode());
        Self {
            ui,
            page: Page::Dashboard,
            overlay: Overlay::None,
            dashboard: DashboardState::default(),
            scans: ScansState::default(),
            detail: None,
            environments: EnvironmentsState::default(),
            assistant: AssistantState::default(),
            new_scan: None,
            env_form: None,
            confirm_delete: None,
            remediation: None,
            analysis: None,
            palette,
            tick: 0,
            should_quit: false,
            settings,
            notice: None,
            open_new_scan_on_load: false,
            generation: 0,
            page_task: None,
        }
    }

    /// Initial fetch on startup.
    pub fn start(&mut self) -> Vec<Effect> {
        self.open_dashboard()
    }

    pub fn generation(&self) -> Generation {
        self.generation
    }

    pub fn mode(&self) -> Mode {
        self.settings.mode()
    }

    pub fn notice(&self) -> Option<&str> {
        self.notice.as_ref().map(|(text, _)| text.as_str())
    }

    fn set_notice(&mut self, text: impl Into<String>) {
        self.notice = Some((text.into(), self.tick));
    }

    // ── Derived views ─────────────────────────────────────────────

    pub fn visible_scans(&self) -> Vec<&Scan> {
        self.scans
            .data
            .data()
            .map(|(scans, _)| self.scans.filter.apply(scans))
            .unwrap_or_default()
    }

    pub fn visible_findings(&self) -> Vec<&Finding> {
        self.detail
            .as_ref()
            .and_then(|d| d.data.data().map(|(_, findings)| d.filter.apply(findings)))
            .unwrap_or_default()
    }

    pub fn environment_list(&self) -> &[Environment] {
        self.environments.data.data().map(Vec::as_slice).unwrap_or(&[])
    }

    /// Environments known to the scans page (used by the new-scan dialog).
    pub fn scan_environments(&self) -> &[Environment] {
        self.scans
            .data
            .data()
            .map(|(_, envs)| envs.as_slice())
            .unwrap_or(&[])
    }

    // ── Navigation ────────────────────────────────────────────────

    /// Leave the current view: new generation, no overlays, no stale task.
    fn begin_page(&mut self) {
        self.generation += 1;
        if let Some(task) = self.page_task.take() {
            task.abort();
        }
        self.overlay = Overlay::None;
        self.new_scan = None;
        self.env_form = None;
        self.confirm_delete = None;
        self.remediation = None;
        self.analysis = None;
        self.notice = None;
        self.open_new_scan_on_load = false;
    }

    fn open_dashboard(&mut self) -> Vec<Effect> {
        self.begin_page();
        self.page = Page::Dashboard;
        self.detail = None;
        self.dashboard.metrics.begin();
        vec![Effect::LoadDashboard]
    }

    fn open_scans(&mut self) -> Vec<Effect> {
        self.begin_page();
        self.page = Page::Scans;
        self.detail = None;
        self.scans.data.begin();
        vec![Effect::LoadScansPage]
    }

    fn open_environments(&mut self) -> Vec<Effect> {
        self.begin_page();
        self.page = Page::Environments;
        self.detail = None;
        self.environments.data.begin();
        vec![Effect::LoadEnvironments]
    }

    fn open_scan_details(&mut self, scan_id: i64, task_id: Option<String>) -> Vec<Effect> {
        self.begin_page();
        self.page = Page::ScanDetails;
        let mut detail = DetailState::new(scan_id, task_id);
        detail.data.begin();
        self.detail = Some(detail);
        vec![Effect::LoadScanDetail(scan_id)]
    }

    fn refresh_current(&mut self) -> Vec<Effect> {
        match self.page {
            Page::Dashboard => {
                self.dashboard.metrics.begin();
                vec![Effect::LoadDashboard]
            }
            Page::Scans => {
                self.scans.data.begin();
                vec![Effect::LoadScansPage]
            }
            Page::Environments => {
                self.environments.data.begin();
                vec![Effect::LoadEnvironments]
            }
            Page::ScanDetails => match &mut self.detail {
                Some(detail) => {
                    detail.data.begin();
                    let mut effects = vec![Effect::LoadScanDetail(detail.scan_id)];
                    if let Some(task_id) = detail.task_id.clone() {
                        effects.push(Effect::PollTask(task_id));
                    }
                    effects
                }
                None => Vec::new(),
            },
        }
    }

    // ── Key handling ──────────────────────────────────────────────

    pub fn handle_key(&mut self, key: KeyEvent) -> Vec<Effect> {
        if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
            self.should_quit = true;
            return Vec::new();
        }

        match self.overlay {
            Overlay::Assistant => self.assistant_key(key),
            Overlay::NewScan => self.new_scan_key(key),
            Overlay::EnvironmentForm => self.env_form_key(key),
            Overlay::ConfirmDelete => self.confirm_delete_key(key),
            Overlay::Remediation => self.remediation_key(key),
            Overlay::Analysis => self.analysis_key(key),
            Overlay::Help => {
                self.overlay = Overlay::None;
                Vec::new()
            }
            Overlay::None => self.page_key(key),
        }
    }

    fn page_key(&mut self, key: KeyEvent) -> Vec<Effect> {
        match key.code {
            KeyCode::Char('q') => {
                self.should_quit = true;
                Vec::new()
            }
            KeyCode::Char('?') => {
                self.overlay = Overlay::Help;
                Vec::new()
            }
            KeyCode::Char('a') => {
                self.overlay = Overlay::Assistant;
                Vec::new()
            }
            KeyCode::Char('d') => {
                self.toggle_mode();
                Vec::new()
            }
            KeyCode::Char('r') => self.refresh_current(),
            KeyCode::Char('1') => self.open_dashboard(),
            KeyCode::Char('2') => self.open_scans(),
            KeyCode::Char('3') => self.open_environments(),
            KeyCode::Esc => self.dismiss_or_back(),
            _ => match self.page {
                Page::Dashboard => self.dashboard_key(key),
                Page::Scans => self.scans_key(key),
                Page::ScanDetails => self.detail_key(key),
                Page::Environments => self.environments_key(key),
            },
        }
    }

    fn dismiss_or_back(&mut self) -> Vec<Effect> {
        self.notice = None;
        let dismissed = match self.page {
            Page::Dashboard => dismiss(&mut self.dashboard.metrics),
            Page::Scans => dismiss(&mut self.scans.data),
            Page::Environments => dismiss(&mut self.environments.data),
            Page::ScanDetails => self
                .detail
                .as_mut()
                .map(|d| dismiss(&mut d.data))
                .unwrap_or(false),
        };
        if dismissed {
            return Vec::new();
        }
        if self.page == Page::ScanDetails {
            return self.open_scans();
        }
        Vec::new()
    }

    fn toggle_mode(&mut self) {
        match self.settings.toggle_mode() {
            Ok(mode) => self.palette = Palette::for_mode(mode),
            Err(e) => self.set_notice(format!("Failed to save settings: {e}")),
        }
    }

    fn dashboard_key(&mut self, key: KeyEvent) -> Vec<Effect> {
        let rows = self
            .dashboard
            .metrics
            .data()
            .map(|m| m.recent_scans.len().min(self.ui.recent_rows))
            .unwrap_or(0);
        match key.code {
            KeyCode::Down | KeyCode::Char('j') => {
                step(&mut self.dashboard.selected, rows, 1);
                Vec::new()
            }
            KeyCode::Up | KeyCode::Char('k') => {
                step(&mut self.dashboard.selected, rows, -1);
                Vec::new()
            }
            KeyCode::Enter => {
                let scan_id = self
                    .dashboard
                    .metrics
                    .data()
                    .and_then(|m| m.recent_scans.get(self.dashboard.selected))
                    .map(|s| s.id);
                match scan_id {
                    Some(id) => self.open_scan_details(id, None),
                    None => Vec::new(),
                }
            }
            KeyCode::Char('n') => {
                let effects = self.open_scans();
                self.open_new_scan_on_load = true;
                effects
            }
            _ => Vec::new(),
        }
    }

    fn scans_key(&mut self, key: KeyEvent) -> Vec<Effect> {
        let visible = self.visible_scans().len();
        match key.code {
            KeyCode::Down | KeyCode::Char('j') => {
                step(&mut self.scans.selected, visible, 1);
                Vec::new()
            }
            KeyCode::Up | KeyCode::Char('k') => {
                step(&mut self.scans.selected, visible, -1);
                Vec::new()
            }
            KeyCode::Enter => {
                let scan_id = self.visible_scans().get(self.scans.selected).map(|s| s.id);
                match scan_id {
                    Some(id) => self.open_scan_details(id, None),
                    None => Vec::new(),
                }
            }
            KeyCode::Char('s') => {
                self.scans.filter.status =
                    filters::cycle(self.scans.filter.status, &ScanStatus::ALL);
                self.scans.selected = 0;
                Vec::new()
            }
            KeyCode::Char('e') => {
                let ids: Vec<i64> = self
                    .scan_environments()
                    .iter()
                    .map(|e| e.id)
                    .collect();
                self.scans.filter.environment_id =
                    filters::cycle(self.scans.filter.environment_id, &ids);
                self.scans.selected = 0;
                Vec::new()
            }
            KeyCode::Char('c') => {
                self.scans.filter.clear();
                self.scans.selected = 0;
                Vec::new()
            }
            KeyCode::Char('n') => {
                self.open_new_scan_dialog();
                Vec::new()
            }
            KeyCode::Char('t') => {
                let failed = self
                    .visible_scans()
                    .get(self.scans.selected)
                    .filter(|s| s.status == ScanStatus::Failed)
                    .map(|s| s.id);
                match failed {
                    Some(id) => vec![Effect::RetryScan(id)],
                    None => {
                        self.set_notice("Only failed scans can be retried");
                        Vec::new()
                    }
                }
            }
            _ => Vec::new(),
        }
    }

    fn open_new_scan_dialog(&mut self) {
        self.new_scan = Some(NewScanDialog::default());
        self.overlay = Overlay::NewScan;
    }

    fn detail_key(&mut self, key: KeyEvent) -> Vec<Effect> {
        let visible = self.visible_findings().len();
        let selected_id = self
            .visible_findings()
            .get(self.detail.as_ref().map(|d| d.selected).unwrap_or(0))
            .map(|f| (f.id, f.title.clone()));
        let Some(detail) = &mut self.detail else {
            return Vec::new();
        };
        match key.code {
            KeyCode::Down | KeyCode::Char('j') => {
                step(&mut detail.selected, visible, 1);
                Vec::new()
            }
            KeyCode::Up | KeyCode::Char('k') => {
                step(&mut detail.selected, visible, -1);
                Vec::new()
            }
            KeyCode::Enter | KeyCode::Char(' ') => {
                detail.expanded = !detail.expanded;
                Vec::new()
            }
            KeyCode::Backspace | KeyCode::Char('b') => self.open_scans(),
            KeyCode::Char('s') => {
                detail.filter.severity = filters::cycle(detail.filter.severity, &Severity::ALL);
                detail.selected = 0;
                Vec::new()
            }
            KeyCode::Char('n') => {
                let scanners = detail
                    .data
                    .data()
                    .map(|(_, findings)| filters::unique_scanners(findings))
                    .unwrap_or_default();
                detail.filter.scanner = filters::cycle(detail.filter.scanner.clone(), &scanners);
                detail.selected = 0;
                Vec::new()
            }
            KeyCode::Char('g') => {
                let regulations = detail
                    .data
                    .data()
                    .map(|(_, findings)| filters::unique_regulations(findings))
                    .unwrap_or_default();
                detail.filter.regulation =
                    filters::cycle(detail.filter.regulation.clone(), &regulations);
                detail.selected = 0;
                Vec::new()
            }
            KeyCode::Char('c') => {
                detail.filter.clear();
                detail.selected = 0;
                Vec::new()
            }
            KeyCode::Char('f') => match selected_id {
                Some((id, title)) => {
                    let mut data = RemoteData::Idle;
                    data.begin();
                    self.remediation = Some(RemediationDialog {
                        finding_id: id,
                        finding_title: title,
                        data,
                        scroll: 0,
                    });
                    self.overlay = Overlay::Remediation;
                    vec![Effect::RequestRemediation(id)]
                }
                None => Vec::new(),
            },
            KeyCode::Char('m') => match selected_id {
                Some((id, _)) => vec![Effect::ResolveFinding(id)],
                None => Vec::new(),
            },
            KeyCode::Char('M') => {
                let ids: Vec<i64> = self.visible_findings().iter().map(|f| f.id).collect();
                if ids.is_empty() {
                    Vec::new()
                } else {
                    vec![Effect::BulkResolve(ids)]
                }
            }
            KeyCode::Char('A') => {
                let scan_id = detail.scan_id;
                let mut data = RemoteData::Idle;
                data.begin();
                self.analysis = Some(AnalysisDialog {
                    scan_id,
                    data,
                    scroll: 0,
                });
                self.overlay = Overlay::Analysis;
                vec![Effect::AnalyzeScan(scan_id)]
            }
            _ => Vec::new(),
        }
    }

    fn environments_key(&mut self, key: KeyEvent) -> Vec<Effect> {
        let count = self.environment_list().len();
        match key.code {
            KeyCode::Down | KeyCode::Char('j') => {
                step(&mut self.environments.selected, count, 1);
                Vec::new()
            }
            KeyCode::Up | KeyCode::Char('k') => {
                step(&mut self.environments.selected, count, -1);
                Vec::new()
            }
            KeyCode::Char('n') => {
                self.env_form = Some(EnvironmentForm::blank());
                self.overlay = Overlay::EnvironmentForm;
                Vec::new()
            }
            KeyCode::Char('e') => {
                if let Some(env) = self.environment_list().get(self.environments.selected) {
                    self.env_form = Some(EnvironmentForm::for_environment(env));
                    self.overlay = Overlay::EnvironmentForm;
                }
                Vec::new()
            }
            KeyCode::Char('x') | KeyCode::Delete => {
                if let Some(env) = self.environment_list().get(self.environments.selected) {
                    self.confirm_delete = Some(ConfirmDelete {
                        id: env.id,
                        name: env.name.clone(),
                        deleting: false,
                    });
                    self.overlay = Overlay::ConfirmDelete;
                }
                Vec::new()
            }
            KeyCode::Char('s') => {
                match self
                    .environment_list()
                    .get(self.environments.selected)
                    .map(|e| e.id)
                {
                    Some(id) => vec![Effect::CreateScan(id)],
                    None => Vec::new(),
                }
            }
            _ => Vec::new(),
        }
    }

    fn assistant_key(&mut self, key: KeyEvent) -> Vec<Effect> {
        if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('r') {
            self.assistant.transcript.reset();
            self.assistant.input.clear();
            return Vec::new();
        }
        match key.code {
            KeyCode::Esc => {
                // Transcript persists; only the overlay closes.
                self.overlay = Overlay::None;
                Vec::new()
            }
            KeyCode::Enter => {
                let question = self.assistant.input.trim().to_string();
                if question.is_empty() || self.assistant.waiting {
                    return Vec::new();
                }
                self.assistant.input.clear();
                self.send_question(question)
            }
            KeyCode::Backspace => {
                self.assistant.input.pop();
                Vec::new()
            }
            KeyCode::Char(c) => {
                // With an empty input, digits pick a suggested question.
                if self.assistant.input.is_empty() && !self.assistant.waiting {
                    if let Some(index) = c.to_digit(10) {
                        let suggestion = self
                            .assistant
                            .transcript
                            .current_suggestions()
                            .get(index.wrapping_sub(1) as usize)
                            .cloned();
                        if let Some(question) = suggestion {
                            return self.send_question(question);
                        }
                    }
                }
                self.assistant.input.push(c);
                Vec::new()
            }
            _ => Vec::new(),
        }
    }

    fn send_question(&mut self, question: String) -> Vec<Effect> {
        self.assistant.transcript.push_user(question.clone());
        self.assistant.waiting = true;
        vec![Effect::Ask(question)]
    }

    fn new_scan_key(&mut self, key: KeyEvent) -> Vec<Effect> {
        let env_ids: Vec<i64> = self.scan_environments().iter().map(|e| e.id).collect();
        let Some(dialog) = &mut self.new_scan else {
            return Vec::new();
        };
        match key.code {
            KeyCode::Esc => {
                if !dialog.creating {
                    self.new_scan = None;
                    self.overlay = Overlay::None;
                }
                Vec::new()
            }
            KeyCode::Down | KeyCode::Char('j') => {
                step(&mut dialog.selected, env_ids.len(), 1);
                Vec::new()
            }
            KeyCode::Up | KeyCode::Char('k') => {
                step(&mut dialog.selected, env_ids.len(), -1);
                Vec::new()
            }
            KeyCode::Enter => {
                if dialog.creating {
                    return Vec::new();
                }
                // Submit stays disabled until an environment exists to pick.
                match env_ids.get(dialog.selected) {
                    Some(&environment_id) => {
                        dialog.creating = true;
                        dialog.error = None;
                        vec![Effect::CreateScan(environment_id)]
                    }
                    None => Vec::new(),
                }
            }
            _ => Vec::new(),
        }
    }

    fn env_form_key(&mut self, key: KeyEvent) -> Vec<Effect> {
        let Some(form) = &mut self.env_form else {
            return Vec::new();
        };
        match key.code {
            KeyCode::Esc => {
                if !form.saving {
                    self.env_form = None;
                    self.overlay = Overlay::None;
                }
                Vec::new()
            }
            KeyCode::Tab | KeyCode::Down => {
                form.field = match form.field {
                    FormField::Name => FormField::Type,
                    FormField::Type => FormField::Description,
                    FormField::Description => FormField::Name,
                };
                Vec::new()
            }
            KeyCode::BackTab | KeyCode::Up => {
                form.field = match form.field {
                    FormField::Name => FormField::Description,
                    FormField::Type => FormField::Name,
                    FormField::Description => FormField::Type,
                };
                Vec::new()
            }
            KeyCode::Left | KeyCode::Right if form.field == FormField::Type => {
                let len = EnvironmentType::ALL.len();
                form.type_index = if key.code == KeyCode::Right {
                    (form.type_index + 1) % len
                } else {
                    (form.type_index + len - 1) % len
                };
                Vec::new()
            }
            KeyCode::Enter => {
                if form.saving {
                    return Vec::new();
                }
                if form.name.trim().is_empty() {
                    form.error = Some("Name is required".to_string());
                    return Vec::new();
                }
                form.saving = true;
                form.error = None;
                vec![Effect::SaveEnvironment {
                    id: form.editing,
                    draft: form.draft(),
                }]
            }
            KeyCode::Backspace => {
                match form.field {
                    FormField::Name => {
                        form.name.pop();
                    }
                    FormField::Description => {
                        form.description.pop();
                    }
                    FormField::Type => {}
                }
                Vec::new()
            }
            KeyCode::Char(c) => {
                match form.field {
                    FormField::Name => form.name.push(c),
                    FormField::Description => form.description.push(c),
                    FormField::Type => {
                        if c == ' ' {
                            form.type_index = (form.type_index + 1) % EnvironmentType::ALL.len();
                        }
                    }
                }
                Vec::new()
            }
            _ => Vec::new(),
        }
    }

    fn confirm_delete_key(&mut self, key: KeyEvent) -> Vec<Effect> {
        let Some(confirm) = &mut self.confirm_delete else {
            return Vec::new();
        };
        match key.code {
            KeyCode::Char('y') | KeyCode::Char('Y') => {
                if confirm.deleting {
                    return Vec::new();
                }
                confirm.deleting = true;
                vec![Effect::DeleteEnvironment(confirm.id)]
            }
            KeyCode::Char('n') | KeyCode::Esc => {
                if !confirm.deleting {
                    self.confirm_delete = None;
                    self.overlay = Overlay::None;
                }
                Vec::new()
            }
            _ => Vec::new(),
        }
    }

    fn remediation_key(&mut self, key: KeyEvent) -> Vec<Effect> {
        match key.code {
            KeyCode::Esc | KeyCode::Char('q') => {
                // Closing discards any in-flight plan for good.
                self.remediation = None;
                self.overlay = Overlay::None;
            }
            KeyCode::Down | KeyCode::Char('j') => {
                if let Some(dialog) = &mut self.remediation {
                    dialog.scroll = dialog.scroll.saturating_add(1);
                }
            }
            KeyCode::Up | KeyCode::Char('k') => {
                if let Some(dialog) = &mut self.remediation {
                    dialog.scroll = dialog.scroll.saturating_sub(1);
                }
            }
            _ => {}
        }
        Vec::new()
    }

    fn analysis_key(&mut self, key: KeyEvent) -> Vec<Effect> {
        match key.code {
            KeyCode::Esc | KeyCode::Char('q') => {
                self.analysis = None;
                self.overlay = Overlay::None;
            }
            KeyCode::Down | KeyCode::Char('j') => {
                if let Some(dialog) = &mut self.analysis {
                    dialog.scroll = dialog.scroll.saturating_add(1);
                }
            }
            KeyCode::Up | KeyCode::Char('k') => {
                if let Some(dialog) = &mut self.analysis {
                    dialog.scroll = dialog.scroll.saturating_sub(1);
                }
            }
            _ => {}
        }
        Vec::new()
    }

    // ── Ticks ─────────────────────────────────────────────────────

    pub fn on_tick(&mut self) -> Vec<Effect> {
        self.tick += 1;

        if let Some((_, stamp)) = &self.notice {
            if self.tick.saturating_sub(*stamp) > NOTICE_TICKS {
                self.notice = None;
            }
        }

        // Re-fetch while the scan is still making server-side progress.
        if self.page == Page::ScanDetails
            && self.overlay == Overlay::None
            && self.tick % self.ui.active_scan_refresh_ticks == 0
        {
            if let Some(detail) = &mut self.detail {
                let active = detail
                    .data
                    .data()
                    .map(|(scan, _)| scan.status.is_active())
                    .unwrap_or(false);
                if active && !detail.data.is_loading() {
                    detail.data.begin();
                    let mut effects = vec![Effect::LoadScanDetail(detail.scan_id)];
                    if let Some(task_id) = detail.task_id.clone() {
                        effects.push(Effect::PollTask(task_id));
                    }
                    return effects;
                }
            }
        }

        Vec::new()
    }

    // ── Response application ──────────────────────────────────────

    pub fn apply(&mut self, envelope: Envelope) -> Vec<Effect> {
        if let Scope::Page(generation) = envelope.scope {
            if generation != self.generation {
                tracing::debug!(
                    stale = generation,
                    current = self.generation,
                    "Dropping response from a torn-down view"
                );
                return Vec::new();
            }
        }

        match envelope.event {
            ApiEvent::Dashboard(result) => {
                self.dashboard.metrics.resolve(result);
                let rows = self
                    .dashboard
                    .metrics
                    .data()
                    .map(|m| m.recent_scans.len().min(self.ui.recent_rows))
                    .unwrap_or(0);
                clamp(&mut self.dashboard.selected, rows);
                Vec::new()
            }
            ApiEvent::ScansPage(result) => {
                self.scans.data.resolve(result);
                let visible = self.visible_scans().len();
                clamp(&mut self.scans.selected, visible);
                if self.open_new_scan_on_load {
                    self.open_new_scan_on_load = false;
                    if self.scans.data.error().is_none() {
                        self.open_new_scan_dialog();
                    }
                }
                Vec::new()
            }
            ApiEvent::ScanDetail(result) => {
                if let Some(detail) = &mut self.detail {
                    detail.data.resolve(result);
                }
                let visible = self.visible_findings().len();
                if let Some(detail) = &mut self.detail {
                    clamp(&mut detail.selected, visible);
                }
                Vec::new()
            }
            ApiEvent::Environments(result) => {
                self.environments.data.resolve(result);
                let count = self.environment_list().len();
                clamp(&mut self.environments.selected, count);
                Vec::new()
            }
            ApiEvent::ScanCreated(result) => match result {
                Ok(created) => {
                    self.new_scan = None;
                    let effects =
                        self.open_scan_details(created.scan_id, Some(created.task_id));
                    self.set_notice(format!("Scan #{} started", created.scan_id));
                    effects
                }
                Err(error) => {
                    match &mut self.new_scan {
                        Some(dialog) => {
                            dialog.creating = false;
                            dialog.error = Some(error);
                        }
                        None => self.set_notice(format!("Failed to start scan: {error}")),
                    }
                    Vec::new()
                }
            },
            ApiEvent::ScanRetried { scan_id, result } => match result {
                Ok(_) => {
                    self.set_notice(format!("Scan #{scan_id} queued for retry"));
                    self.scans.data.begin();
                    vec![Effect::LoadScansPage]
                }
                Err(error) => {
                    self.set_notice(format!("Retry failed: {error}"));
                    Vec::new()
                }
            },
            ApiEvent::TaskPolled(result) => {
                match result {
                    Ok(status) => {
                        if let Some(detail) = &mut self.detail {
                            detail.task_note = Some(status.status);
                        }
                    }
                    Err(e) => tracing::debug!(error = %e, "Task status poll failed"),
                }
                Vec::new()
            }
            ApiEvent::EnvironmentSaved(result) => match result {
                Ok(env) => {
                    self.env_form = None;
                    self.overlay = Overlay::None;
                    self.set_notice(format!("Environment '{}' saved", env.name));
                    self.environments.data.begin();
                    vec![Effect::LoadEnvironments]
                }
                Err(error) => {
                    if let Some(form) = &mut self.env_form {
                        form.saving = false;
                        form.error = Some(error);
                    }
                    Vec::new()
                }
            },
            ApiEvent::EnvironmentDeleted { id, result } => {
                self.confirm_delete = None;
                self.overlay = Overlay::None;
                match result {
                    Ok(()) => {
                        self.set_notice(format!("Environment #{id} deleted"));
                        self.environments.data.begin();
                        vec![Effect::LoadEnvironments]
                    }
                    Err(error) => {
                        self.environments.data.fail(error);
                        Vec::new()
                    }
                }
            }
            ApiEvent::FindingUpdated(result) => match result {
                Ok(updated) => {
                    let note = format!("Finding #{} marked {}", updated.id, updated.status);
                    if let Some(detail) = &mut self.detail {
                        if let Some((_, findings)) = detail.data.data_mut() {
                            if let Some(slot) = findings.iter_mut().find(|f| f.id == updated.id) {
                                *slot = updated;
                            }
                        }
                    }
                    self.set_notice(note);
                    Vec::new()
                }
                Err(error) => {
                    self.set_notice(format!("Failed to update finding: {error}"));
                    Vec::new()
                }
            },
            ApiEvent::BulkUpdated { count, result } => match result {
                Ok(()) => {
                    self.set_notice(format!("{count} findings resolved"));
                    match &mut self.detail {
                        Some(detail) => {
                            detail.data.begin();
                            vec![Effect::LoadScanDetail(detail.scan_id)]
                        }
                        None => Vec::new(),
                    }
                }
                Err(error) => {
                    self.set_notice(format!("Bulk update failed: {error}"));
                    Vec::new()
                }
            },
            ApiEvent::Remediation(result) => {
                if let Some(dialog) = &mut self.remediation {
                    dialog.data.resolve(result);
                }
                Vec::new()
            }
            ApiEvent::Analysis(result) => {
                if let Some(dialog) = &mut self.analysis {
                    dialog.data.resolve(result);
                }
                Vec::new()
            }
            ApiEvent::Answer(result) => {
                self.assistant.waiting = false;
                match result {
                    Ok(answer) => self.assistant.transcript.push_answer(answer),
                    Err(error) => self.assistant.transcript.push_error(&error),
                }
                Vec::new()
            }
        }
    }

    // ── Effect execution ──────────────────────────────────────────

    pub fn run_effects(&mut self, dispatcher: &Dispatcher, effects: Vec<Effect>) {
        for effect in effects {
            match effect {
                Effect::LoadDashboard => {
                    let task = dispatcher.load_dashboard(self.generation);
                    self.track_page_task(task);
                }
                Effect::LoadScansPage => {
                    let task = dispatcher.load_scans_page(self.generation);
                    self.track_page_task(task);
                }
                Effect::LoadScanDetail(scan_id) => {
                    let task = dispatcher.load_scan_detail(self.generation, scan_id);
                    self.track_page_task(task);
                }
                Effect::LoadEnvironments => {
                    let task = dispatcher.load_environments(self.generation);
                    self.track_page_task(task);
                }
                Effect::CreateScan(environment_id) => {
                    dispatcher.create_scan(self.generation, environment_id);
                }
                Effect::RetryScan(scan_id) => {
                    dispatcher.retry_scan(self.generation, scan_id);
                }
                Effect::PollTask(task_id) => {
                    dispatcher.poll_task(self.generation, task_id);
                }
                Effect::SaveEnvironment { id, draft } => {
                    dispatcher.save_environment(self.generation, id, draft);
                }
                Effect::DeleteEnvironment(id) => {
                    dispatcher.delete_environment(self.generation, id);
                }
                Effect::ResolveFinding(id) => {
                    dispatcher.resolve_finding(self.generation, id);
                }
                Effect::BulkResolve(ids) => {
                    dispatcher.bulk_resolve(self.generation, ids);
                }
                Effect::RequestRemediation(id) => {
                    dispatcher.request_remediation(self.generation, id);
                }
                Effect::AnalyzeScan(id) => {
                    dispatcher.analyze_scan(self.generation, id);
                }
                Effect::Ask(question) => {
                    dispatcher.ask(question);
                }
            }
        }
    }

    fn track_page_task(&mut self, task: JoinHandle<()>) {
        if let Some(previous) = self.page_task.replace(task) {
            previous.abort();
        }
    }
}

fn dismiss<T>(data: &mut RemoteData<T>) -> bool {
    if data.error().is_some() {
        data.dismiss_error();
        true
    } else {
        false
    }
}

fn clamp(selected: &mut usize, len: usize) {
    if len == 0 {
        *selected = 0;
    } else if *selected >= len {
        *selected = len - 1;
    }
}

fn step(selected: &mut usize, len: usize, delta: i64) {
    if len == 0 {
        *selected = 0;
        return;
    }
    let next = (*selected as i64 + delta).clamp(0, len as i64 - 1);
    *selected = next as usize;
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use radar_core::types::{AiAnswer, CreateScanResponse, ScanStatus};

    fn key(c: char) -> KeyEvent {
        KeyEvent::new(KeyCode::Char(c), KeyModifiers::NONE)
    }

    fn enter() -> KeyEvent {
        KeyEvent::new(KeyCode::Enter, KeyModifiers::NONE)
    }

    fn test_app() -> App {
        let dir = tempfile::tempdir().unwrap();
        let settings = SettingsStore::open(dir.path().join("settings.json"));
        let mut app = App::new(UiConfig::default(), settings);
        // keep tempdir alive long enough for any writes in the test
        std::mem::forget(dir);
        app.start();
        app
    }

    fn environment(id: i64, name: &str) -> Environment {
        Environment {
            id,
            name: name.to_string(),
            env_type: EnvironmentType::Aws,
            description: None,
            last_scan: None,
        }
    }

    fn scan(id: i64, environment_id: i64, status: ScanStatus) -> Scan {
        Scan {
            id,
            environment_id,
            environment_name: None,
            environment_type: None,
            status,
            started_at: Utc::now(),
            completed_at: None,
            duration: None,
            overall_score: None,
            conformity_scores: Default::default(),
            total_findings: 0,
            critical_count: 0,
            high_count: 0,
            medium_count: 0,
            low_count: 0,
        }
    }

    fn page_envelope(app: &App, event: ApiEvent) -> Envelope {
        Envelope {
            scope: Scope::Page(app.generation()),
            event,
        }
    }

    #[test]
    fn startup_loads_the_dashboard() {
        let dir = tempfile::tempdir().unwrap();
        let settings = SettingsStore::open(dir.path().join("settings.json"));
        let mut app = App::new(UiConfig::default(), settings);
        let effects = app.start();
        assert_eq!(effects, vec![Effect::LoadDashboard]);
        assert!(app.dashboard.metrics.is_loading());
    }

    #[test]
    fn stale_responses_are_discarded_after_navigation() {
        let mut app = test_app();
        let stale = page_envelope(
            &app,
            ApiEvent::ScansPage(Ok((vec![scan(1, 1, ScanStatus::Completed)], vec![]))),
        );

        // Navigating bumps the generation; the old response must not land.
        let effects = app.handle_key(key('2'));
        assert_eq!(effects, vec![Effect::LoadScansPage]);
        app.apply(stale);
        assert!(app.scans.data.is_loading());
        assert!(app.scans.data.data().is_none());

        // The current-generation response does land.
        let fresh = page_envelope(
            &app,
            ApiEvent::ScansPage(Ok((vec![scan(1, 1, ScanStatus::Completed)], vec![]))),
        );
        app.apply(fresh);
        assert_eq!(app.visible_scans().len(), 1);
    }

    #[test]
    fn scan_creation_requires_an_environment() {
        let mut app = test_app();
        app.handle_key(key('2'));
        app.apply(page_envelope(&app, ApiEvent::ScansPage(Ok((vec![], vec![])))));

        // Dialog with no environments: Enter must not submit.
        app.handle_key(key('n'));
        assert_eq!(app.overlay, Overlay::NewScan);
        assert_eq!(app.handle_key(enter()), Vec::new());

        // With an environment available, Enter submits for it.
        app.handle_key(KeyEvent::new(KeyCode::Esc, KeyModifiers::NONE));
        app.handle_key(key('r'));
        app.apply(page_envelope(
            &app,
            ApiEvent::ScansPage(Ok((vec![], vec![environment(42, "prod")]))),
        ));
        app.handle_key(key('n'));
        let effects = app.handle_key(enter());
        assert_eq!(effects, vec![Effect::CreateScan(42)]);
        assert!(app.new_scan.as_ref().unwrap().creating);
    }

    #[test]
    fn created_scan_navigates_to_its_details() {
        let mut app = test_app();
        app.handle_key(key('2'));
        app.apply(page_envelope(
            &app,
            ApiEvent::ScansPage(Ok((vec![], vec![environment(42, "prod")]))),
        ));
        app.handle_key(key('n'));
        app.handle_key(enter());

        let effects = app.apply(page_envelope(
            &app,
            ApiEvent::ScanCreated(Ok(CreateScanResponse {
                scan_id: 77,
                task_id: "task-abc".to_string(),
            })),
        ));

        assert_eq!(app.page, Page::ScanDetails);
        assert_eq!(effects, vec![Effect::LoadScanDetail(77)]);
        let detail = app.detail.as_ref().unwrap();
        assert_eq!(detail.scan_id, 77);
        assert_eq!(detail.task_id.as_deref(), Some("task-abc"));
    }

    #[test]
    fn failed_ask_appends_apology_and_clears_waiting() {
        let mut app = test_app();
        app.handle_key(key('a'));
        assert_eq!(app.overlay, Overlay::Assistant);

        for c in "help".chars() {
            app.handle_key(key(c));
        }
        let effects = app.handle_key(enter());
        assert_eq!(effects, vec![Effect::Ask("help".to_string())]);
        assert!(app.assistant.waiting);
        let before = app.assistant.transcript.len();

        app.apply(Envelope {
            scope: Scope::App,
            event: ApiEvent::Answer(Err("connection refused".to_string())),
        });

        assert!(!app.assistant.waiting);
        assert_eq!(app.assistant.transcript.len(), before + 1);
        let last = app.assistant.transcript.messages().last().unwrap();
        assert!(last.content.contains("I apologize"));
    }

    #[test]
    fn answer_appends_and_suggestions_become_selectable() {
        let mut app = test_app();
        app.handle_key(key('a'));
        for c in "hi".chars() {
            app.handle_key(key(c));
        }
        app.handle_key(enter());
        app.apply(Envelope {
            scope: Scope::App,
            event: ApiEvent::Answer(Ok(AiAnswer {
                answer: "Sure.".to_string(),
                related_findings: vec![],
                suggestions: vec!["Run a full audit".to_string()],
            })),
        });

        // Digit 1 on an empty input sends the first suggestion.
        let effects = app.handle_key(key('1'));
        assert_eq!(effects, vec![Effect::Ask("Run a full audit".to_string())]);
        let user_messages: Vec<_> = app
            .assistant
            .transcript
            .messages()
            .iter()
            .filter(|m| m.role == crate::chat::ChatRole::User)
            .collect();
        assert_eq!(user_messages.last().unwrap().content, "Run a full audit");
    }

    #[test]
    fn dark_mode_toggle_flips_palette_and_persists() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        let mut app = App::new(UiConfig::default(), SettingsStore::open(&path));
        app.start();

        assert_eq!(app.mode(), Mode::Light);
        app.handle_key(key('d'));
        assert_eq!(app.mode(), Mode::Dark);
        assert_eq!(app.palette, Palette::for_mode(Mode::Dark));

        // The preference survives a fresh store.
        let reopened = SettingsStore::open(&path);
        assert_eq!(reopened.mode(), Mode::Dark);

        app.handle_key(key('d'));
        assert_eq!(app.palette, Palette::for_mode(Mode::Light));
    }

    #[test]
    fn environment_form_validates_name_client_side() {
        let mut app = test_app();
        app.handle_key(key('3'));
        app.apply(page_envelope(&app, ApiEvent::Environments(Ok(vec![]))));

        app.handle_key(key('n'));
        assert_eq!(app.overlay, Overlay::EnvironmentForm);

        // Empty name: rejected before any request is issued.
        let effects = app.handle_key(enter());
        assert!(effects.is_empty());
        assert_eq!(
            app.env_form.as_ref().unwrap().error.as_deref(),
            Some("Name is required")
        );

        for c in "staging".chars() {
            app.handle_key(key(c));
        }
        let effects = app.handle_key(enter());
        match &effects[..] {
            [Effect::SaveEnvironment { id: None, draft }] => {
                assert_eq!(draft.name, "staging");
                assert_eq!(draft.env_type, EnvironmentType::Kubernetes);
            }
            other => panic!("unexpected effects: {other:?}"),
        }
    }

    #[test]
    fn delete_requires_explicit_confirmation() {
        let mut app = test_app();
        app.handle_key(key('3'));
        app.apply(page_envelope(
            &app,
            ApiEvent::Environments(Ok(vec![environment(5, "prod")])),
        ));

        app.handle_key(key('x'));
        assert_eq!(app.overlay, Overlay::ConfirmDelete);

        // 'n' cancels without issuing the request.
        let effects = app.handle_key(key('n'));
        assert!(effects.is_empty());
        assert_eq!(app.overlay, Overlay::None);

        app.handle_key(key('x'));
        let effects = app.handle_key(key('y'));
        assert_eq!(effects, vec![Effect::DeleteEnvironment(5)]);
    }

    #[test]
    fn scans_filter_narrows_visible_set() {
        let mut app = test_app();
        app.handle_key(key('2'));
        app.apply(page_envelope(
            &app,
            ApiEvent::ScansPage(Ok((
                vec![
                    scan(1, 1, ScanStatus::Completed),
                    scan(2, 1, ScanStatus::Failed),
                    scan(3, 2, ScanStatus::Pending),
                ],
                vec![environment(1, "a"), environment(2, "b")],
            ))),
        ));
        assert_eq!(app.visible_scans().len(), 3);

        // Cycle status: pending first.
        app.handle_key(key('s'));
        assert_eq!(app.scans.filter.status, Some(ScanStatus::Pending));
        assert_eq!(app.visible_scans().len(), 1);

        app.handle_key(key('c'));
        assert_eq!(app.visible_scans().len(), 3);
    }

    #[test]
    fn retry_only_applies_to_failed_scans() {
        let mut app = test_app();
        app.handle_key(key('2'));
        app.apply(page_envelope(
            &app,
            ApiEvent::ScansPage(Ok((
                vec![scan(1, 1, ScanStatus::Completed), scan(2, 1, ScanStatus::Failed)],
                vec![environment(1, "a")],
            ))),
        ));

        // Selection on the completed scan: no retry effect.
        assert!(app.handle_key(key('t')).is_empty());

        app.handle_key(key('j'));
        let effects = app.handle_key(key('t'));
        assert_eq!(effects, vec![Effect::RetryScan(2)]);
    }
}
