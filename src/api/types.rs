//! Response and request models for the crawl backend API.
//!
//! Everything here is a read-only snapshot deserialized from a fetch
//! response and discarded on the next refresh. Unknown fields are
//! ignored so the client tolerates server-side additions.

use std::collections::{BTreeMap, HashMap};

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Severity tag attached to server log events.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Info,
    Success,
    Warning,
    Error,
}

impl Default for LogLevel {
    fn default() -> Self {
        LogLevel::Info
    }
}

/// One server log line, shown in the dashboard console.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogEntry {
    pub message: String,
    #[serde(default)]
    pub level: LogLevel,
    #[serde(default)]
    pub timestamp: String,
    #[serde(default)]
    pub platform: Option<String>,
}

/// Cumulative crawl counters reported by `/api/status`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CrawlStats {
    #[serde(default)]
    pub total_scraped: u64,
    #[serde(default)]
    pub successful: u64,
    #[serde(default)]
    pub failed: u64,
    #[serde(default)]
    pub start_time: Option<String>,
    #[serde(default)]
    pub end_time: Option<String>,
}

/// Snapshot of one crawler's state.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CrawlStatus {
    #[serde(default)]
    pub is_running: bool,
    #[serde(default)]
    pub stats: CrawlStats,
    #[serde(default)]
    pub progress: f64,
    #[serde(default)]
    pub total_tasks: u64,
    #[serde(default)]
    pub completed_tasks: u64,
    #[serde(default)]
    pub current_tasks: Vec<String>,
}

/// `/api/status` payload: a flat status for single-platform servers, or
/// a per-platform map from the unified server.
#[derive(Debug, Clone)]
pub enum StatusResponse {
    Flat(CrawlStatus),
    PerPlatform(HashMap<String, CrawlStatus>),
}

impl StatusResponse {
    /// Resolve the status for a platform. The flat form matches any
    /// platform name; the map form requires an exact key.
    pub fn for_platform(&self, platform: &str) -> Option<&CrawlStatus> {
        match self {
            StatusResponse::Flat(status) => Some(status),
            StatusResponse::PerPlatform(map) => map.get(platform),
        }
    }
}

// Both forms are JSON objects and every CrawlStatus field is optional,
// so an untagged enum cannot tell them apart. The flat form always
// carries `is_running` at the top level; the per-platform map never
// does (its keys are platform names).
impl<'de> Deserialize<'de> for StatusResponse {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let value = Value::deserialize(deserializer)?;
        if value.get("is_running").is_some() {
            serde_json::from_value(value)
                .map(StatusResponse::Flat)
                .map_err(serde::de::Error::custom)
        } else {
            serde_json::from_value(value)
                .map(StatusResponse::PerPlatform)
                .map_err(serde::de::Error::custom)
        }
    }
}

/// One grouped route set from the unified server's per-platform
/// catalog: routes that share a date list.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RouteSet {
    #[serde(default)]
    pub index: u32,
    #[serde(default)]
    pub routes: Vec<String>,
    #[serde(default)]
    pub dates: Vec<String>,
}

/// Route/date catalog from `/api/routes[/platform]`.
///
/// Served either as a flat `{routes, dates}` object or as an array of
/// [`RouteSet`]s; the array form is flattened for the selection lists
/// with the original grouping kept in `sets`.
#[derive(Debug, Clone, Default)]
pub struct RouteCatalog {
    pub routes: Vec<String>,
    pub dates: Vec<String>,
    /// Non-empty only when the server served grouped route sets.
    pub sets: Vec<RouteSet>,
}

impl RouteCatalog {
    fn from_sets(sets: Vec<RouteSet>) -> Self {
        let mut routes: Vec<String> = Vec::new();
        let mut dates: Vec<String> = Vec::new();
        for set in &sets {
            for route in &set.routes {
                if !routes.contains(route) {
                    routes.push(route.clone());
                }
            }
            for date in &set.dates {
                if !dates.contains(date) {
                    dates.push(date.clone());
                }
            }
        }
        Self { routes, dates, sets }
    }
}

impl<'de> Deserialize<'de> for RouteCatalog {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        #[derive(Deserialize)]
        struct Flat {
            #[serde(default)]
            routes: Vec<String>,
            #[serde(default)]
            dates: Vec<String>,
        }

        let value = Value::deserialize(deserializer)?;
        if value.is_array() {
            let sets: Vec<RouteSet> =
                serde_json::from_value(value).map_err(serde::de::Error::custom)?;
            return Ok(RouteCatalog::from_sets(sets));
        }
        let flat: Flat = serde_json::from_value(value).map_err(serde::de::Error::custom)?;
        Ok(RouteCatalog {
            routes: flat.routes,
            dates: flat.dates,
            sets: Vec::new(),
        })
    }
}

/// Body for `POST /api/start[/platform]`.
#[derive(Debug, Clone, Serialize)]
pub struct StartRequest {
    pub routes: Vec<String>,
    pub dates: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_workers: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub runs_per_task: Option<u32>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StartResponse {
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub total_tasks: u64,
}

/// Generic `{message}` acknowledgement (stop, route mutations, ...).
#[derive(Debug, Clone, Deserialize)]
pub struct Ack {
    #[serde(default)]
    pub message: String,
}

/// Real-time progress pushed over the event channel.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProgressUpdate {
    #[serde(default)]
    pub progress: f64,
    #[serde(default)]
    pub completed: u64,
    #[serde(default)]
    pub total: u64,
    /// Single active task (single-worker servers).
    #[serde(default)]
    pub current_task: Option<String>,
    /// Active worker tasks (multi-worker servers).
    #[serde(default)]
    pub current_tasks: Vec<String>,
    #[serde(default)]
    pub platform: Option<String>,
}

impl ProgressUpdate {
    /// Active task list, merging the single- and multi-task forms.
    pub fn active_tasks(&self) -> Vec<&str> {
        if !self.current_tasks.is_empty() {
            self.current_tasks.iter().map(String::as_str).collect()
        } else {
            self.current_task.iter().map(String::as_str).collect()
        }
    }
}

/// Output file descriptor from `/api/data`.
#[derive(Debug, Clone, Deserialize)]
pub struct DataFile {
    pub filename: String,
    #[serde(default)]
    pub platform: Option<String>,
    #[serde(default)]
    pub size: u64,
    #[serde(default)]
    pub rows: u64,
    #[serde(default)]
    pub modified: String,
}

/// Aggregate stats included in a file preview.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PreviewStats {
    #[serde(default)]
    pub unique_buses: u64,
    #[serde(default)]
    pub unique_types: u64,
    #[serde(default)]
    pub avg_price: Option<f64>,
    #[serde(default)]
    pub min_price: Option<f64>,
    #[serde(default)]
    pub max_price: Option<f64>,
}

/// First rows of a data file plus aggregate stats.
#[derive(Debug, Clone, Deserialize)]
pub struct FilePreview {
    pub filename: String,
    #[serde(default)]
    pub rows: u64,
    #[serde(default)]
    pub columns: Vec<String>,
    #[serde(default)]
    pub preview: Vec<BTreeMap<String, Value>>,
    #[serde(default)]
    pub stats: PreviewStats,
}

/// A database-backed row from `/api/data/db`. Column set varies per
/// platform, so rows stay schemaless key/value maps.
pub type DbRow = BTreeMap<String, Value>;

/// Master route record managed by the route-manager panel.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MasterRoute {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub origin: String,
    #[serde(default)]
    pub destination: String,
    #[serde(default = "default_category")]
    pub category: String,
    #[serde(default = "default_active")]
    pub active: bool,
    /// Platform → whether a URL template is configured for this route.
    #[serde(default)]
    pub platforms: HashMap<String, bool>,
}

fn default_category() -> String {
    "intercity".to_string()
}

fn default_active() -> bool {
    true
}

/// Body for creating (or duplicating) a master route.
#[derive(Debug, Clone, Serialize)]
pub struct NewRoute {
    pub name: String,
    pub origin: String,
    pub destination: String,
    pub category: String,
}

/// Per-platform URL templates attached to a master route, keyed by
/// platform name.
pub type RouteUrlMap = HashMap<String, String>;

/// Acknowledgement for route-master mutations.
#[derive(Debug, Clone, Deserialize)]
pub struct RouteMutation {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub route_id: Option<String>,
    #[serde(default)]
    pub message: String,
}

/// `/api/routes/format-url` result: the URL template rendered for a
/// concrete date.
#[derive(Debug, Clone, Deserialize)]
pub struct FormattedUrl {
    pub formatted_url: String,
    #[serde(default)]
    pub platform: Option<String>,
    #[serde(default)]
    pub date: Option<String>,
}

/// One crawl session inside an analytics report.
#[derive(Debug, Clone, Deserialize)]
pub struct CrawlSession {
    #[serde(default)]
    pub crawl_number: u32,
    #[serde(default)]
    pub filename: String,
    #[serde(default)]
    pub crawl_time: String,
    #[serde(default)]
    pub total_buses: u64,
    #[serde(default)]
    pub companies: HashMap<String, u64>,
    #[serde(default)]
    pub bus_types: HashMap<String, u64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct AnalyticsSummary {
    #[serde(default)]
    pub bus_companies: HashMap<String, u64>,
    #[serde(default)]
    pub bus_types_by_company: HashMap<String, HashMap<String, u64>>,
    #[serde(default)]
    pub total_unique_buses: u64,
    #[serde(default)]
    pub total_unique_types: u64,
    #[serde(default)]
    pub crawl_times: Vec<String>,
}

/// `/api/analytics` report for one route + date.
#[derive(Debug, Clone, Deserialize)]
pub struct AnalyticsReport {
    pub platform: String,
    pub route: String,
    pub date: String,
    #[serde(default)]
    pub total_crawls: u64,
    #[serde(default)]
    pub crawl_sessions: Vec<CrawlSession>,
    #[serde(default)]
    pub summary: AnalyticsSummary,
}

/// Per-platform aggregates inside `/api/compare`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PlatformSummary {
    #[serde(default)]
    pub total_files: u64,
    #[serde(default)]
    pub total_records: u64,
    #[serde(default)]
    pub routes: HashMap<String, u64>,
    #[serde(default)]
    pub avg_price: f64,
    #[serde(default)]
    pub date_coverage: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RouteComparison {
    pub route: String,
    #[serde(default)]
    pub traveloka_records: u64,
    #[serde(default)]
    pub redbus_records: u64,
}

/// `/api/compare` cross-platform summary.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CompareReport {
    #[serde(default)]
    pub traveloka: PlatformSummary,
    #[serde(default)]
    pub redbus: PlatformSummary,
    #[serde(default)]
    pub comparison: Vec<RouteComparison>,
}

/// Body for `POST /api/train/start`.
#[derive(Debug, Clone, Serialize)]
pub struct TrainStartRequest {
    pub days_back: u32,
}

/// Error metrics reported after training finishes.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct TrainMetrics {
    pub mae: f64,
    pub rmse: f64,
    pub r2: f64,
}

/// Training outcome: either metrics or a server-side error string.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TrainResults {
    #[serde(default)]
    pub metrics: Option<TrainMetrics>,
    #[serde(default)]
    pub data_points: u64,
    #[serde(default)]
    pub days_back: u32,
    #[serde(default)]
    pub error: Option<String>,
}

/// `/api/train/status` snapshot, polled while a training job runs.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TrainStatus {
    #[serde(default)]
    pub is_running: bool,
    #[serde(default)]
    pub progress: f64,
    #[serde(default)]
    pub current_step: String,
    #[serde(default)]
    pub results: Option<TrainResults>,
    #[serde(default)]
    pub start_time: Option<String>,
    #[serde(default)]
    pub end_time: Option<String>,
}

/// Training progress pushed over the event channel.
#[derive(Debug, Clone, Deserialize)]
pub struct TrainingProgress {
    #[serde(default)]
    pub progress: f64,
    #[serde(default)]
    pub step: String,
}

/// Body for `POST /api/predict`. Either `days` or an explicit
/// `start_date`/`end_date` range, never both.
#[derive(Debug, Clone, Serialize)]
pub struct PredictRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub route: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub days: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_date: Option<String>,
}

/// One predicted departure row.
#[derive(Debug, Clone, Deserialize)]
pub struct PredictionRow {
    #[serde(default)]
    pub route_name: String,
    #[serde(default)]
    pub prediction_date: String,
    #[serde(default)]
    pub predicted_total: f64,
    #[serde(default)]
    pub predicted_vip: f64,
    #[serde(default)]
    pub predicted_executive: f64,
    #[serde(default)]
    pub predicted_other: f64,
    #[serde(default)]
    pub predicted_price: Option<f64>,
    #[serde(default)]
    pub predicted_departing_time: Option<String>,
    #[serde(default)]
    pub predicted_reaching_time: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PredictResponse {
    pub session_id: i64,
    #[serde(default)]
    pub days: Option<u32>,
    #[serde(default)]
    pub route: Option<String>,
    #[serde(default)]
    pub total_predictions: u64,
    #[serde(default)]
    pub predictions: Vec<PredictionRow>,
}

/// Stored prediction run from `/api/predictions/history`.
#[derive(Debug, Clone, Deserialize)]
pub struct PredictionSession {
    pub id: i64,
    #[serde(default)]
    pub prediction_start_date: String,
    #[serde(default)]
    pub prediction_end_date: String,
    #[serde(default)]
    pub created_at: String,
    #[serde(default)]
    pub total_predictions: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_flat_form_parses() {
        let json = r#"{
            "is_running": true,
            "stats": {"total_scraped": 120, "successful": 10, "failed": 2,
                      "start_time": "2025-12-01T08:00:00", "end_time": null},
            "progress": 40.0,
            "total_tasks": 30,
            "completed_tasks": 12,
            "current_tasks": ["Jakarta-Semarang 2025-12-05"]
        }"#;
        let status: StatusResponse = serde_json::from_str(json).unwrap();
        let flat = status.for_platform("redbus").unwrap();
        assert!(flat.is_running);
        assert_eq!(flat.stats.total_scraped, 120);
        assert_eq!(flat.completed_tasks, 12);
    }

    #[test]
    fn status_per_platform_form_parses() {
        let json = r#"{
            "redbus": {"is_running": false, "stats": {"successful": 4}},
            "traveloka": {"is_running": true, "stats": {"successful": 7}}
        }"#;
        let status: StatusResponse = serde_json::from_str(json).unwrap();
        assert!(!status.for_platform("redbus").unwrap().is_running);
        assert!(status.for_platform("traveloka").unwrap().is_running);
        assert!(status.for_platform("flixbus").is_none());
    }

    #[test]
    fn catalog_flat_form_parses() {
        let json = r#"{"routes": ["Jakarta-Semarang"], "dates": ["2025-12-05"]}"#;
        let catalog: RouteCatalog = serde_json::from_str(json).unwrap();
        assert_eq!(catalog.routes, vec!["Jakarta-Semarang"]);
        assert_eq!(catalog.dates, vec!["2025-12-05"]);
        assert!(catalog.sets.is_empty());
    }

    #[test]
    fn catalog_route_set_array_flattens() {
        let json = r#"[
            {"index": 0, "routes": ["Jakarta-Semarang", "Jakarta-Malang"],
             "dates": ["2025-12-05", "2025-12-06"]},
            {"index": 1, "routes": ["Jakarta-Malang", "Semarang-Solo"],
             "dates": ["2025-12-06", "2025-12-07"]}
        ]"#;
        let catalog: RouteCatalog = serde_json::from_str(json).unwrap();
        // Flattened without duplicates, grouping preserved
        assert_eq!(
            catalog.routes,
            vec!["Jakarta-Semarang", "Jakarta-Malang", "Semarang-Solo"]
        );
        assert_eq!(
            catalog.dates,
            vec!["2025-12-05", "2025-12-06", "2025-12-07"]
        );
        assert_eq!(catalog.sets.len(), 2);
        assert_eq!(catalog.sets[1].index, 1);
        assert_eq!(catalog.sets[1].routes, vec!["Jakarta-Malang", "Semarang-Solo"]);
    }

    #[test]
    fn progress_update_merges_task_forms() {
        let single: ProgressUpdate = serde_json::from_str(
            r#"{"progress": 50.0, "completed": 5, "total": 10,
                "current_task": "Jakarta-Malang 2025-12-10"}"#,
        )
        .unwrap();
        assert_eq!(single.active_tasks(), vec!["Jakarta-Malang 2025-12-10"]);

        let multi: ProgressUpdate = serde_json::from_str(
            r#"{"progress": 50.0, "completed": 5, "total": 10,
                "current_tasks": ["a", "b"], "current_task": "ignored"}"#,
        )
        .unwrap();
        assert_eq!(multi.active_tasks(), vec!["a", "b"]);
    }

    #[test]
    fn log_entry_defaults_missing_fields() {
        let entry: LogEntry =
            serde_json::from_str(r#"{"message": "scrape ok"}"#).unwrap();
        assert_eq!(entry.level, LogLevel::Info);
        assert!(entry.platform.is_none());
    }

    #[test]
    fn start_request_omits_unset_options() {
        let req = StartRequest {
            routes: vec!["Jakarta-Semarang".into()],
            dates: vec!["2025-12-05".into()],
            max_workers: None,
            runs_per_task: None,
        };
        let json = serde_json::to_string(&req).unwrap();
        assert!(!json.contains("max_workers"));
        assert!(!json.contains("runs_per_task"));
    }

    #[test]
    fn master_route_fills_defaults() {
        let route: MasterRoute = serde_json::from_str(
            r#"{"id": "jkt_smg", "name": "Jakarta-Semarang"}"#,
        )
        .unwrap();
        assert_eq!(route.category, "intercity");
        assert!(route.active);
    }

    #[test]
    fn train_results_accepts_error_form() {
        let results: TrainResults =
            serde_json::from_str(r#"{"error": "not enough data"}"#).unwrap();
        assert!(results.metrics.is_none());
        assert_eq!(results.error.as_deref(), Some("not enough data"));
    }
}
