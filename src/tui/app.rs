//! TUI application state and logic.

use anyhow::Result;

use crate::api::types::*;
use crate::api::{ApiClient, DbQuery, ServerEvent};
use crate::config::AppConfig;
use crate::state::{
    CrawlMonitor, LogConsole, PredictionFilter, RouteFilter, SelectionState, is_valid_date,
};
use crate::state::analytics::valid_days_back;

/// Which list has keyboard focus inside the crawl view.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CrawlPane {
    Routes,
    Dates,
}

/// Current view (tab) being displayed.
#[derive(Debug, Clone, Copy)]
pub enum View {
    /// Selection lists, crawl controls, progress and log console.
    Crawl { pane: CrawlPane, selected: usize },
    /// Output file browser with preview, or database-backed rows.
    Files { selected: usize, db_mode: bool },
    /// Master route CRUD panel.
    Routes { selected: usize },
    /// Analytics report and training panel.
    Analytics,
    /// Prediction results and session history.
    Predictions { selected: usize },
}

impl Default for View {
    fn default() -> Self {
        View::Crawl {
            pane: CrawlPane::Routes,
            selected: 0,
        }
    }
}

impl View {
    pub fn tab_index(&self) -> usize {
        match self {
            View::Crawl { .. } => 0,
            View::Files { .. } => 1,
            View::Routes { .. } => 2,
            View::Analytics => 3,
            View::Predictions { .. } => 4,
        }
    }
}

/// Actions triggered by user input outside of a prompt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Quit,
    Tab(usize),
    NextTab,
    Up,
    Down,
    Select,
    Back,
    Refresh,
    SwitchPane,
    SelectAll,
    ClearAll,
    WorkersUp,
    WorkersDown,
    RunsUp,
    RunsDown,
    Start,
    Stop,
    ClearLogs,
    CycleLogFilter,
    ToggleDbMode,
    Download,
    Add,
    Rename,
    Delete,
    Duplicate,
    EditUrl,
    DropUrl,
    TestUrl,
    Search,
    CycleStatusFilter,
    Train,
    Predict,
    History,
    RunAnalytics,
    Compare,
}

/// Keystrokes routed to an open prompt instead of the keymap.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PromptKey {
    Char(char),
    Backspace,
    Submit,
    Cancel,
}

/// Pending modal interaction rendered over the active view.
#[derive(Debug, Clone)]
pub enum Prompt {
    Confirm {
        message: String,
        action: ConfirmAction,
    },
    Input {
        label: String,
        buffer: String,
        action: InputAction,
    },
}

#[derive(Debug, Clone)]
pub enum ConfirmAction {
    StartCrawl,
    StopCrawl,
    DeleteRoute(String),
}

#[derive(Debug, Clone)]
pub enum InputAction {
    /// `name origin destination [category]`
    AddRoute,
    RenameRoute(String),
    DuplicateRoute(String),
    /// route id + platform, buffer holds the URL template
    SetRouteUrl(String, String),
    /// route id, buffer holds `platform date`
    TestUrl(String),
    RouteSearch,
    /// buffer holds `[route] [from..to]`
    PredictionSearch,
    /// buffer holds `route date`
    AnalyticsQuery,
    /// buffer holds days_back
    TrainDays,
    /// buffer holds `days` or `start..end`, optional leading route
    PredictSpec,
    /// buffer holds `route_name date bus_name` facets, all optional
    DbQuerySpec,
}

/// Cached data fetched from the backend.
#[derive(Debug, Default)]
pub struct AppData {
    pub catalog: RouteCatalog,
    pub files: Vec<DataFile>,
    pub preview: Option<FilePreview>,
    pub db_rows: Vec<DbRow>,
    pub master_routes: Vec<MasterRoute>,
    /// Route id the URL map belongs to.
    pub route_urls: Option<(String, RouteUrlMap)>,
    pub formatted_url: Option<String>,
    pub analytics: Option<AnalyticsReport>,
    pub compare: Option<CompareReport>,
    pub train_status: Option<TrainStatus>,
    pub live_training: Option<TrainingProgress>,
    pub predictions: Vec<PredictionRow>,
    pub sessions: Vec<PredictionSession>,
}

/// Main TUI application state.
pub struct DashboardApp {
    client: ApiClient,
    pub config: AppConfig,
    pub view: View,
    pub data: AppData,
    pub selection: SelectionState,
    pub monitor: CrawlMonitor,
    pub console: LogConsole,
    pub route_filter: RouteFilter,
    pub prediction_filter: PredictionFilter,
    pub prompt: Option<Prompt>,
    pub running: bool,
    pub error: Option<String>,
}

impl DashboardApp {
    pub fn new(config: AppConfig) -> Self {
        let client = ApiClient::new(config.server_url.clone());
        let console = LogConsole::new(config.log_capacity);
        Self {
            client,
            config,
            view: View::default(),
            data: AppData::default(),
            selection: SelectionState::new(),
            monitor: CrawlMonitor::new(),
            console,
            route_filter: RouteFilter::default(),
            prediction_filter: PredictionFilter::default(),
            prompt: None,
            running: true,
            error: None,
        }
    }

    fn platform(&self) -> String {
        self.config.platform.clone()
    }

    /// Fetch initial data from the backend.
    pub async fn init(&mut self) -> Result<()> {
        self.error = None;

        match self.client.routes(Some(&self.platform())).await {
            Ok(catalog) => self.data.catalog = catalog,
            Err(e) => {
                // Unified servers scope the catalog per platform; fall
                // back to the flat form for single-platform servers.
                match self.client.routes(None).await {
                    Ok(catalog) => self.data.catalog = catalog,
                    Err(_) => self.error = Some(format!("Failed to connect: {}", e)),
                }
            }
        }

        self.refresh_status().await;
        self.refresh_files().await;
        Ok(())
    }

    /// Poll `/api/status` and feed the reducer.
    pub async fn refresh_status(&mut self) {
        match self.client.status().await {
            Ok(status) => {
                if let Some(crawl) = status.for_platform(&self.platform()) {
                    self.monitor.on_status(crawl);
                }
            }
            Err(e) => self.report_error(format!("Status poll failed: {}", e)),
        }
    }

    /// Poll the output file listing.
    pub async fn refresh_files(&mut self) {
        match self.client.data_files(Some(&self.platform())).await {
            Ok(files) => self.data.files = files,
            Err(_) => {
                // Single-platform servers list everything at /api/data
                if let Ok(files) = self.client.data_files(None).await {
                    self.data.files = files;
                }
            }
        }
    }

    /// Poll training status while a job runs.
    pub async fn refresh_training(&mut self) {
        if let Ok(status) = self.client.training_status().await {
            if !status.is_running {
                self.data.live_training = None;
            }
            self.data.train_status = Some(status);
        }
    }

    /// True while the training panel needs its 1s poll.
    pub fn training_active(&self) -> bool {
        self.data
            .train_status
            .as_ref()
            .is_some_and(|s| s.is_running)
    }

    pub async fn refresh_master_routes(&mut self) {
        match self.client.master_routes(false).await {
            Ok(routes) => self.data.master_routes = routes,
            Err(e) => self.report_error(format!("Failed to fetch routes: {}", e)),
        }
    }

    /// Handle a push-channel event.
    pub fn on_server_event(&mut self, event: ServerEvent) {
        match event {
            ServerEvent::Connect => {
                self.console.push(LogEntry {
                    message: "Connected to crawler server".to_string(),
                    level: LogLevel::Info,
                    timestamp: now_stamp(),
                    platform: None,
                });
            }
            ServerEvent::LogUpdate(entry) => self.console.push(entry),
            ServerEvent::ProgressUpdate(update) => {
                self.monitor.on_push_progress(&update);
            }
            ServerEvent::TaskStart(task) => {
                self.console.push(LogEntry {
                    message: match task.worker {
                        Some(w) => format!("[Worker {}] Started: {}", w, task.task),
                        None => format!("Started: {}", task.task),
                    },
                    level: LogLevel::Info,
                    timestamp: now_stamp(),
                    platform: task.platform,
                });
            }
            ServerEvent::TaskComplete(task) => {
                self.console.push(LogEntry {
                    message: match task.worker {
                        Some(w) => format!("[Worker {}] Completed: {}", w, task.task),
                        None => format!("Completed: {}", task.task),
                    },
                    level: LogLevel::Success,
                    timestamp: now_stamp(),
                    platform: task.platform,
                });
            }
            ServerEvent::TrainingProgress(progress) => {
                self.data.live_training = Some(progress);
            }
        }
    }

    /// Record a failure in the log console. Prior view state stays
    /// untouched; there are no retries.
    fn report_error(&mut self, message: String) {
        tracing::debug!(error = %message, "Request failed");
        self.console.push(LogEntry {
            message: message.clone(),
            level: LogLevel::Error,
            timestamp: now_stamp(),
            platform: None,
        });
        self.error = Some(message);
    }

    fn note(&mut self, message: String, level: LogLevel) {
        self.console.push(LogEntry {
            message,
            level,
            timestamp: now_stamp(),
            platform: None,
        });
    }

    /// Handle an action and update state accordingly.
    pub async fn handle_action(&mut self, action: Action) {
        self.error = None;
        match action {
            Action::Quit => self.running = false,
            Action::Tab(index) => self.switch_tab(index).await,
            Action::NextTab => {
                let next = (self.view.tab_index() + 1) % 5;
                self.switch_tab(next).await;
            }
            Action::Refresh => self.refresh_view().await,
            Action::Up => self.navigate(-1),
            Action::Down => self.navigate(1),
            Action::SwitchPane => {
                if let View::Crawl { pane, .. } = &self.view {
                    let next = match pane {
                        CrawlPane::Routes => CrawlPane::Dates,
                        CrawlPane::Dates => CrawlPane::Routes,
                    };
                    self.view = View::Crawl {
                        pane: next,
                        selected: 0,
                    };
                }
            }
            Action::Select => self.select_item().await,
            Action::Back => {
                self.data.preview = None;
                self.data.route_urls = None;
                self.data.formatted_url = None;
            }
            Action::SelectAll => self.bulk_select(true),
            Action::ClearAll => self.bulk_select(false),
            Action::WorkersUp => {
                self.selection.max_workers =
                    (self.selection.max_workers + 1).min(crate::state::selection::MAX_WORKERS);
            }
            Action::WorkersDown => {
                self.selection.max_workers = self
                    .selection
                    .max_workers
                    .saturating_sub(1)
                    .max(crate::state::selection::MIN_WORKERS);
            }
            Action::RunsUp => self.selection.runs_per_task += 1,
            Action::RunsDown => {
                self.selection.runs_per_task = self.selection.runs_per_task.saturating_sub(1).max(1);
            }
            Action::Start => self.request_start(),
            Action::Stop => self.request_stop(),
            Action::ClearLogs => self.console.clear(),
            Action::CycleLogFilter => self.cycle_log_filter(),
            Action::ToggleDbMode => {
                if let View::Files { selected, db_mode } = self.view {
                    self.view = View::Files {
                        selected,
                        db_mode: !db_mode,
                    };
                    if !db_mode {
                        self.prompt = Some(Prompt::Input {
                            label: "DB filter: [route_name] [date] [bus_name]".into(),
                            buffer: String::new(),
                            action: InputAction::DbQuerySpec,
                        });
                    }
                }
            }
            Action::Download => self.download_selected().await,
            Action::Add => {
                self.prompt = Some(Prompt::Input {
                    label: "New route: name origin destination [category]".into(),
                    buffer: String::new(),
                    action: InputAction::AddRoute,
                });
            }
            Action::Rename => {
                if let Some((id, name)) = self.selected_route_parts() {
                    self.prompt = Some(Prompt::Input {
                        label: format!("Rename {} to:", name),
                        buffer: name,
                        action: InputAction::RenameRoute(id),
                    });
                }
            }
            Action::Delete => {
                if let Some((id, name)) = self.selected_route_parts() {
                    self.prompt = Some(Prompt::Confirm {
                        message: format!("Delete route {}? (y/n)", name),
                        action: ConfirmAction::DeleteRoute(id),
                    });
                }
            }
            Action::Duplicate => {
                if let Some((id, name)) = self.selected_route_parts() {
                    self.prompt = Some(Prompt::Input {
                        label: format!("Duplicate {} as:", name),
                        buffer: format!("{} copy", name),
                        action: InputAction::DuplicateRoute(id),
                    });
                }
            }
            Action::EditUrl => {
                if let Some((id, name)) = self.selected_route_parts() {
                    let platform = self.platform();
                    self.prompt = Some(Prompt::Input {
                        label: format!("{} URL template for {}:", platform, name),
                        buffer: String::new(),
                        action: InputAction::SetRouteUrl(id, platform),
                    });
                }
            }
            Action::DropUrl => self.drop_selected_url().await,
            Action::TestUrl => {
                if let Some((id, _)) = self.selected_route_parts() {
                    self.prompt = Some(Prompt::Input {
                        label: "Test URL: platform date".into(),
                        buffer: format!("{} ", self.platform()),
                        action: InputAction::TestUrl(id),
                    });
                }
            }
            Action::Search => match self.view {
                View::Predictions { .. } => {
                    self.prompt = Some(Prompt::Input {
                        label: "Filter predictions: [route] [from..to]".into(),
                        buffer: self.prediction_filter.route.clone(),
                        action: InputAction::PredictionSearch,
                    });
                }
                _ => {
                    self.prompt = Some(Prompt::Input {
                        label: "Search routes:".into(),
                        buffer: self.route_filter.search.clone(),
                        action: InputAction::RouteSearch,
                    });
                }
            },
            Action::CycleStatusFilter => {
                self.route_filter.status = self.route_filter.status.next();
            }
            Action::Train => {
                self.prompt = Some(Prompt::Input {
                    label: "Train on how many days of history? (7-365)".into(),
                    buffer: "90".into(),
                    action: InputAction::TrainDays,
                });
            }
            Action::Predict => {
                self.prompt = Some(Prompt::Input {
                    label: "Predict: [route] days | start..end".into(),
                    buffer: String::new(),
                    action: InputAction::PredictSpec,
                });
            }
            Action::History => self.fetch_history().await,
            Action::RunAnalytics => {
                self.prompt = Some(Prompt::Input {
                    label: "Analytics: route date".into(),
                    buffer: String::new(),
                    action: InputAction::AnalyticsQuery,
                });
            }
            Action::Compare => match self.client.compare().await {
                Ok(report) => self.data.compare = Some(report),
                Err(e) => self.report_error(format!("Compare failed: {}", e)),
            },
        }
    }

    async fn switch_tab(&mut self, index: usize) {
        self.view = match index {
            0 => View::default(),
            1 => View::Files {
                selected: 0,
                db_mode: false,
            },
            2 => View::Routes { selected: 0 },
            3 => View::Analytics,
            _ => View::Predictions { selected: 0 },
        };
        self.refresh_view().await;
    }

    /// Refresh the data behind the current view.
    async fn refresh_view(&mut self) {
        match &self.view {
            View::Crawl { .. } => {
                let _ = self.init().await;
            }
            View::Files { .. } => self.refresh_files().await,
            View::Routes { .. } => self.refresh_master_routes().await,
            View::Analytics => self.refresh_training().await,
            View::Predictions { .. } => self.fetch_history().await,
        }
    }

    fn list_len(&self) -> usize {
        match &self.view {
            View::Crawl { pane, .. } => match pane {
                CrawlPane::Routes => self.data.catalog.routes.len(),
                CrawlPane::Dates => self.data.catalog.dates.len(),
            },
            View::Files { db_mode, .. } => {
                if *db_mode {
                    self.data.db_rows.len()
                } else {
                    self.data.files.len()
                }
            }
            View::Routes { .. } => self.filtered_route_count(),
            View::Analytics => 0,
            View::Predictions { .. } => self.data.sessions.len(),
        }
    }

    fn filtered_route_count(&self) -> usize {
        crate::state::filter_routes(&self.data.master_routes, &self.route_filter).len()
    }

    fn navigate(&mut self, delta: isize) {
        let len = self.list_len();
        let step = |selected: usize| -> usize {
            if len == 0 {
                return 0;
            }
            if delta < 0 {
                selected.saturating_sub(1)
            } else {
                (selected + 1).min(len - 1)
            }
        };
        self.view = match self.view {
            View::Crawl { pane, selected } => View::Crawl {
                pane,
                selected: step(selected),
            },
            View::Files { selected, db_mode } => View::Files {
                selected: step(selected),
                db_mode,
            },
            View::Routes { selected } => View::Routes {
                selected: step(selected),
            },
            View::Analytics => View::Analytics,
            View::Predictions { selected } => View::Predictions {
                selected: step(selected),
            },
        };
    }

    /// Enter/space on the focused item.
    async fn select_item(&mut self) {
        match self.view {
            View::Crawl { pane, selected } => match pane {
                CrawlPane::Routes => {
                    if let Some(route) = self.data.catalog.routes.get(selected).cloned() {
                        self.selection.toggle_route(&route);
                    }
                }
                CrawlPane::Dates => {
                    if let Some(date) = self.data.catalog.dates.get(selected).cloned() {
                        self.selection.toggle_date(&date);
                    }
                }
            },
            View::Files { selected, db_mode } => {
                if !db_mode {
                    if let Some(file) = self.data.files.get(selected) {
                        let filename = file.filename.clone();
                        match self.client.file_preview(&filename).await {
                            Ok(preview) => self.data.preview = Some(preview),
                            Err(e) => {
                                self.report_error(format!("Preview failed: {}", e))
                            }
                        }
                    }
                }
            }
            View::Routes { .. } => {
                if let Some(route) = self.selected_route() {
                    let id = route.id.clone();
                    match self.client.route_urls(&id).await {
                        Ok(urls) => self.data.route_urls = Some((id, urls)),
                        Err(e) => self.report_error(format!("Failed to fetch URLs: {}", e)),
                    }
                }
            }
            View::Analytics => {}
            View::Predictions { selected } => {
                if let Some(session) = self.data.sessions.get(selected) {
                    let id = session.id;
                    match self.client.prediction_session(id).await {
                        Ok(rows) => self.data.predictions = rows,
                        Err(e) => {
                            self.report_error(format!("Failed to fetch session: {}", e))
                        }
                    }
                }
            }
        }
    }

    /// Route under the cursor in the routes view, after filtering.
    pub fn selected_route(&self) -> Option<&MasterRoute> {
        let View::Routes { selected } = self.view else {
            return None;
        };
        crate::state::filter_routes(&self.data.master_routes, &self.route_filter)
            .get(selected)
            .copied()
    }

    /// Owned (id, name) of the route under the cursor, so prompts can
    /// be raised without holding a borrow on the route list.
    fn selected_route_parts(&self) -> Option<(String, String)> {
        self.selected_route()
            .map(|r| (r.id.clone(), r.name.clone()))
    }

    fn bulk_select(&mut self, select: bool) {
        if let View::Crawl { pane, .. } = &self.view {
            match (pane, select) {
                (CrawlPane::Routes, true) => {
                    let routes = self.data.catalog.routes.clone();
                    self.selection.select_all_routes(routes);
                }
                (CrawlPane::Routes, false) => self.selection.clear_routes(),
                (CrawlPane::Dates, true) => {
                    let dates = self.data.catalog.dates.clone();
                    self.selection.select_all_dates(dates);
                }
                (CrawlPane::Dates, false) => self.selection.clear_dates(),
            }
        }
    }

    /// Validate the selection and raise the start confirmation. No
    /// request leaves before the user confirms.
    fn request_start(&mut self) {
        if !self.monitor.control().start_enabled {
            self.report_error("Crawler is already running".to_string());
            return;
        }
        if let Err(e) = self.selection.validate_start() {
            self.report_error(e.to_string());
            return;
        }
        self.prompt = Some(Prompt::Confirm {
            message: format!(
                "Start {} tasks ({} routes x {} dates x {} runs)? (y/n)",
                self.selection.task_count(),
                self.selection.route_count(),
                self.selection.date_count(),
                self.selection.runs_per_task,
            ),
            action: ConfirmAction::StartCrawl,
        });
    }

    fn request_stop(&mut self) {
        if !self.monitor.control().stop_enabled {
            return;
        }
        self.prompt = Some(Prompt::Confirm {
            message: "Stop crawling? The server finishes current tasks. (y/n)".into(),
            action: ConfirmAction::StopCrawl,
        });
    }

    /// Feed a keystroke into the open prompt.
    pub async fn handle_prompt_key(&mut self, key: PromptKey) {
        let Some(prompt) = self.prompt.take() else {
            return;
        };
        match prompt {
            Prompt::Confirm { message, action } => match key {
                PromptKey::Char('y') | PromptKey::Char('Y') | PromptKey::Submit => {
                    self.confirm(action).await;
                }
                PromptKey::Char('n') | PromptKey::Char('N') | PromptKey::Cancel => {}
                _ => self.prompt = Some(Prompt::Confirm { message, action }),
            },
            Prompt::Input {
                label,
                mut buffer,
                action,
            } => match key {
                PromptKey::Char(c) => {
                    buffer.push(c);
                    self.prompt = Some(Prompt::Input {
                        label,
                        buffer,
                        action,
                    });
                }
                PromptKey::Backspace => {
                    buffer.pop();
                    self.prompt = Some(Prompt::Input {
                        label,
                        buffer,
                        action,
                    });
                }
                PromptKey::Submit => self.submit(action, buffer).await,
                PromptKey::Cancel => {}
            },
        }
    }

    /// Run a confirmed prompt action.
    pub async fn confirm(&mut self, action: ConfirmAction) {
        match action {
            ConfirmAction::StartCrawl => {
                let request = self.selection.to_request();
                match self.client.start(Some(&self.platform()), &request).await {
                    Ok(response) => {
                        self.monitor.on_start_accepted(response.total_tasks);
                        self.note(
                            format!("Crawling started: {} tasks", response.total_tasks),
                            LogLevel::Success,
                        );
                    }
                    Err(e) => self.report_error(format!("Start failed: {}", e)),
                }
            }
            ConfirmAction::StopCrawl => {
                match self.client.stop(Some(&self.platform())).await {
                    Ok(ack) => {
                        self.monitor.on_stop_requested();
                        self.note(ack.message, LogLevel::Warning);
                    }
                    Err(e) => self.report_error(format!("Stop failed: {}", e)),
                }
            }
            ConfirmAction::DeleteRoute(id) => {
                match self.client.delete_master_route(&id).await {
                    Ok(ack) => {
                        self.note(ack.message, LogLevel::Warning);
                        self.refresh_master_routes().await;
                    }
                    Err(e) => self.report_error(format!("Delete failed: {}", e)),
                }
            }
        }
    }

    /// Run a submitted input prompt.
    pub async fn submit(&mut self, action: InputAction, input: String) {
        let input = input.trim().to_string();
        match action {
            InputAction::AddRoute => self.add_route(&input).await,
            InputAction::RenameRoute(id) => {
                if input.is_empty() {
                    return;
                }
                match self.client.rename_master_route(&id, &input).await {
                    Ok(ack) => {
                        self.note(ack.message, LogLevel::Success);
                        self.refresh_master_routes().await;
                    }
                    Err(e) => self.report_error(format!("Rename failed: {}", e)),
                }
            }
            InputAction::DuplicateRoute(id) => self.duplicate_route(&id, &input).await,
            InputAction::SetRouteUrl(id, platform) => {
                if let Err(msg) = crate::state::validate_url_template(&platform, &input) {
                    self.report_error(msg);
                    return;
                }
                match self.client.set_route_url(&id, &platform, &input).await {
                    Ok(ack) => self.note(ack.message, LogLevel::Success),
                    Err(e) => self.report_error(format!("URL update failed: {}", e)),
                }
            }
            InputAction::TestUrl(id) => self.test_url(&id, &input).await,
            InputAction::RouteSearch => {
                self.route_filter.search = input;
                self.view = View::Routes { selected: 0 };
            }
            InputAction::PredictionSearch => self.set_prediction_filter(&input),
            InputAction::AnalyticsQuery => self.run_analytics(&input).await,
            InputAction::TrainDays => self.start_training(&input).await,
            InputAction::PredictSpec => self.run_prediction(&input).await,
            InputAction::DbQuerySpec => self.query_db(&input).await,
        }
    }

    async fn add_route(&mut self, input: &str) {
        let parts: Vec<&str> = input.split_whitespace().collect();
        if parts.len() < 3 {
            self.report_error("Expected: name origin destination [category]".to_string());
            return;
        }
        let route = NewRoute {
            name: parts[0].to_string(),
            origin: parts[1].to_string(),
            destination: parts[2].to_string(),
            category: parts.get(3).unwrap_or(&"intercity").to_string(),
        };
        match self.client.add_master_route(&route).await {
            Ok(ack) => {
                self.note(ack.message, LogLevel::Success);
                self.refresh_master_routes().await;
            }
            Err(e) => self.report_error(format!("Add failed: {}", e)),
        }
    }

    async fn duplicate_route(&mut self, id: &str, new_name: &str) {
        if new_name.is_empty() {
            return;
        }
        let Some(source) = self.data.master_routes.iter().find(|r| r.id == id) else {
            return;
        };
        let copy = NewRoute {
            name: new_name.to_string(),
            origin: source.origin.clone(),
            destination: source.destination.clone(),
            category: source.category.clone(),
        };
        match self.client.add_master_route(&copy).await {
            Ok(ack) => {
                self.note(ack.message, LogLevel::Success);
                self.refresh_master_routes().await;
            }
            Err(e) => self.report_error(format!("Duplicate failed: {}", e)),
        }
    }

    async fn drop_selected_url(&mut self) {
        let Some(route) = self.selected_route() else {
            return;
        };
        let id = route.id.clone();
        let platform = self.platform();
        match self.client.delete_route_url(&id, &platform).await {
            Ok(ack) => self.note(ack.message, LogLevel::Warning),
            Err(e) => self.report_error(format!("URL delete failed: {}", e)),
        }
    }

    async fn test_url(&mut self, id: &str, input: &str) {
        let parts: Vec<&str> = input.split_whitespace().collect();
        let [platform, date] = parts.as_slice() else {
            self.report_error("Expected: platform date".to_string());
            return;
        };
        if !is_valid_date(date) {
            self.report_error(format!("Invalid date: {date} (expected YYYY-MM-DD)"));
            return;
        }
        match self.client.format_url(id, platform, date).await {
            Ok(formatted) => self.data.formatted_url = Some(formatted.formatted_url),
            Err(e) => self.report_error(format!("URL test failed: {}", e)),
        }
    }

    async fn run_analytics(&mut self, input: &str) {
        let parts: Vec<&str> = input.split_whitespace().collect();
        let [route, date] = parts.as_slice() else {
            self.report_error("Expected: route date".to_string());
            return;
        };
        if !is_valid_date(date) {
            self.report_error(format!("Invalid date: {date} (expected YYYY-MM-DD)"));
            return;
        }
        match self.client.analytics(&self.platform(), route, date).await {
            Ok(report) => self.data.analytics = Some(report),
            Err(e) => self.report_error(format!("Analytics failed: {}", e)),
        }
    }

    async fn start_training(&mut self, input: &str) {
        let Ok(days_back) = input.parse::<u32>() else {
            self.report_error(format!("Not a number: {input}"));
            return;
        };
        if !valid_days_back(days_back) {
            self.report_error("days_back must be between 7 and 365".to_string());
            return;
        }
        match self.client.start_training(days_back).await {
            Ok(_) => {
                self.note(
                    format!("Training started on {days_back} days of history"),
                    LogLevel::Info,
                );
                self.refresh_training().await;
            }
            Err(e) => self.report_error(format!("Training failed to start: {}", e)),
        }
    }

    /// Parse `[route] days` or `[route] start..end` and POST the
    /// prediction request.
    async fn run_prediction(&mut self, input: &str) {
        let mut parts: Vec<&str> = input.split_whitespace().collect();
        let Some(spec) = parts.pop() else {
            self.report_error("Expected: [route] days | start..end".to_string());
            return;
        };
        let route = (!parts.is_empty()).then(|| parts.join(" "));

        let request = if let Some((start, end)) = spec.split_once("..") {
            if !is_valid_date(start) || !is_valid_date(end) {
                self.report_error("Range dates must be YYYY-MM-DD".to_string());
                return;
            }
            PredictRequest {
                route,
                days: None,
                start_date: Some(start.to_string()),
                end_date: Some(end.to_string()),
            }
        } else {
            let Ok(days) = spec.parse::<u32>() else {
                self.report_error(format!("Not a day count or range: {spec}"));
                return;
            };
            PredictRequest {
                route,
                days: Some(days),
                start_date: None,
                end_date: None,
            }
        };

        match self.client.predict(&request).await {
            Ok(response) => {
                self.note(
                    format!(
                        "Generated {} predictions (session {})",
                        response.total_predictions, response.session_id
                    ),
                    LogLevel::Success,
                );
                self.data.predictions = response.predictions;
            }
            Err(e) => self.report_error(format!("Prediction failed: {}", e)),
        }
    }

    /// Parse `[route] [from..to]` into the prediction filter. An
    /// empty input clears it.
    fn set_prediction_filter(&mut self, input: &str) {
        let mut filter = PredictionFilter::default();
        for part in input.split_whitespace() {
            if let Some((from, to)) = part.split_once("..") {
                filter.from = chrono::NaiveDate::parse_from_str(from, "%Y-%m-%d").ok();
                filter.to = chrono::NaiveDate::parse_from_str(to, "%Y-%m-%d").ok();
            } else if filter.route.is_empty() {
                filter.route = part.to_string();
            } else {
                filter.route.push(' ');
                filter.route.push_str(part);
            }
        }
        self.prediction_filter = filter;
        self.view = View::Predictions { selected: 0 };
    }

    async fn fetch_history(&mut self) {
        match self.client.prediction_history().await {
            Ok(sessions) => self.data.sessions = sessions,
            Err(e) => self.report_error(format!("Failed to fetch history: {}", e)),
        }
    }

    async fn query_db(&mut self, input: &str) {
        let parts: Vec<&str> = input.split_whitespace().collect();
        let query = DbQuery {
            platform: Some(self.platform()),
            route_name: parts.first().map(|s| s.to_string()),
            date: parts.get(1).map(|s| s.to_string()),
            bus_name: parts.get(2).map(|s| s.to_string()),
            limit: Some(200),
        };
        match self.client.db_rows(&query).await {
            Ok(rows) => self.data.db_rows = rows,
            Err(e) => self.report_error(format!("DB query failed: {}", e)),
        }
    }

    async fn download_selected(&mut self) {
        let View::Files { selected, db_mode } = self.view else {
            return;
        };
        if db_mode {
            return;
        }
        let Some(file) = self.data.files.get(selected) else {
            return;
        };
        let filename = file.filename.clone();
        let dir = std::path::PathBuf::from(&self.config.download_dir);
        match self.client.download(&filename, &dir).await {
            Ok(path) => self.note(
                format!("Downloaded {}", path.display()),
                LogLevel::Success,
            ),
            Err(e) => self.report_error(format!("Download failed: {}", e)),
        }
    }

    fn cycle_log_filter(&mut self) {
        let next = match self.console.filter() {
            None => Some("redbus".to_string()),
            Some("redbus") => Some("traveloka".to_string()),
            Some(_) => None,
        };
        self.console.set_filter(next);
    }
}

fn now_stamp() -> String {
    chrono::Local::now().format("%H:%M:%S").to_string()
}
