//! HTTP client for the crawl backend.
//!
//! Thin typed wrapper over the server's JSON API. Failures are
//! surfaced, never retried; callers keep their previous snapshot when a
//! request fails.

use std::path::{Path, PathBuf};

use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::json;
use thiserror::Error;

use super::types::*;

/// Error returned by API client operations.
///
/// A `Server` error carries the backend's own `{error: message}`
/// payload verbatim so the UI can show it unmodified.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("Failed to parse response: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("{message}")]
    Server { status: u16, message: String },
    #[error("Failed to write download: {0}")]
    Io(#[from] std::io::Error),
}

pub type ApiResult<T> = Result<T, ApiError>;

/// Client for the crawl backend HTTP API.
#[derive(Clone)]
pub struct ApiClient {
    base_url: String,
    client: reqwest::Client,
}

impl ApiClient {
    /// Create a client for the backend at `base_url` (no trailing slash
    /// required).
    pub fn new(base_url: impl Into<String>) -> Self {
        let mut base_url = base_url.into();
        while base_url.ends_with('/') {
            base_url.pop();
        }
        Self {
            base_url,
            client: reqwest::Client::new(),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Decode a response, turning non-2xx statuses into `ApiError::Server`
    /// with the backend's error message when one is present.
    async fn decode<T: DeserializeOwned>(response: reqwest::Response) -> ApiResult<T> {
        let status = response.status();
        if status.is_success() {
            return Ok(response.json().await?);
        }

        let body = response.text().await.unwrap_or_default();
        let message = serde_json::from_str::<serde_json::Value>(&body)
            .ok()
            .and_then(|v| v.get("error").and_then(|e| e.as_str()).map(String::from))
            .unwrap_or_else(|| format!("Request failed with status {}", status));

        Err(ApiError::Server {
            status: status.as_u16(),
            message,
        })
    }

    async fn get<T: DeserializeOwned>(&self, path: &str) -> ApiResult<T> {
        let response = self.client.get(self.url(path)).send().await?;
        Self::decode(response).await
    }

    async fn get_query<T: DeserializeOwned, Q: Serialize + ?Sized>(
        &self,
        path: &str,
        query: &Q,
    ) -> ApiResult<T> {
        let response = self.client.get(self.url(path)).query(query).send().await?;
        Self::decode(response).await
    }

    async fn post<T: DeserializeOwned, B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &B,
    ) -> ApiResult<T> {
        let response = self.client.post(self.url(path)).json(body).send().await?;
        Self::decode(response).await
    }

    async fn put<T: DeserializeOwned, B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &B,
    ) -> ApiResult<T> {
        let response = self.client.put(self.url(path)).json(body).send().await?;
        Self::decode(response).await
    }

    async fn delete<T: DeserializeOwned>(&self, path: &str) -> ApiResult<T> {
        let response = self.client.delete(self.url(path)).send().await?;
        Self::decode(response).await
    }

    // ---- Crawl control ----

    /// Route/date catalog. Unified servers scope the catalog per
    /// platform, single-platform servers serve it at `/api/routes`.
    pub async fn routes(&self, platform: Option<&str>) -> ApiResult<RouteCatalog> {
        match platform {
            Some(p) => self.get(&format!("/api/routes/{p}")).await,
            None => self.get("/api/routes").await,
        }
    }

    pub async fn start(
        &self,
        platform: Option<&str>,
        request: &StartRequest,
    ) -> ApiResult<StartResponse> {
        let path = match platform {
            Some(p) => format!("/api/start/{p}"),
            None => "/api/start".to_string(),
        };
        self.post(&path, request).await
    }

    pub async fn stop(&self, platform: Option<&str>) -> ApiResult<Ack> {
        let path = match platform {
            Some(p) => format!("/api/stop/{p}"),
            None => "/api/stop".to_string(),
        };
        self.post(&path, &json!({})).await
    }

    pub async fn status(&self) -> ApiResult<StatusResponse> {
        self.get("/api/status").await
    }

    // ---- Data files ----

    /// List output files, optionally filtered (`redbus`, `traveloka`,
    /// `all`).
    pub async fn data_files(&self, filter: Option<&str>) -> ApiResult<Vec<DataFile>> {
        match filter {
            Some(f) => self.get(&format!("/api/data/{f}")).await,
            None => self.get("/api/data").await,
        }
    }

    pub async fn file_preview(&self, filename: &str) -> ApiResult<FilePreview> {
        self.get(&format!("/api/data/preview/{filename}")).await
    }

    /// Query the database-backed row store.
    pub async fn db_rows(&self, query: &DbQuery) -> ApiResult<Vec<DbRow>> {
        self.get_query("/api/data/db", query).await
    }

    /// Download a data file into `dest_dir`, returning the written path.
    pub async fn download(&self, filename: &str, dest_dir: &Path) -> ApiResult<PathBuf> {
        let response = self
            .client
            .get(self.url(&format!("/api/download/{filename}")))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(ApiError::Server {
                status: status.as_u16(),
                message: format!("Download failed with status {}", status),
            });
        }

        let bytes = response.bytes().await?;
        let dest = dest_dir.join(filename);
        tokio::fs::write(&dest, &bytes).await?;
        Ok(dest)
    }

    // ---- Route master ----

    pub async fn master_routes(&self, active_only: bool) -> ApiResult<Vec<MasterRoute>> {
        self.get_query("/api/routes/master", &[("active_only", active_only)])
            .await
    }

    pub async fn add_master_route(&self, route: &NewRoute) -> ApiResult<RouteMutation> {
        self.post("/api/routes/master", route).await
    }

    pub async fn rename_master_route(
        &self,
        route_id: &str,
        name: &str,
    ) -> ApiResult<RouteMutation> {
        self.put(
            &format!("/api/routes/master/{route_id}"),
            &json!({ "name": name }),
        )
        .await
    }

    pub async fn delete_master_route(&self, route_id: &str) -> ApiResult<RouteMutation> {
        self.delete(&format!("/api/routes/master/{route_id}")).await
    }

    pub async fn route_urls(&self, route_id: &str) -> ApiResult<RouteUrlMap> {
        self.get(&format!("/api/routes/{route_id}/urls")).await
    }

    pub async fn set_route_url(
        &self,
        route_id: &str,
        platform: &str,
        url: &str,
    ) -> ApiResult<RouteMutation> {
        self.post(
            &format!("/api/routes/{route_id}/urls/{platform}"),
            &json!({ "url": url }),
        )
        .await
    }

    pub async fn delete_route_url(
        &self,
        route_id: &str,
        platform: &str,
    ) -> ApiResult<RouteMutation> {
        self.delete(&format!("/api/routes/{route_id}/urls/{platform}"))
            .await
    }

    /// Ask the server to render a route's URL template for a date.
    pub async fn format_url(
        &self,
        route_id: &str,
        platform: &str,
        date: &str,
    ) -> ApiResult<FormattedUrl> {
        self.get_query(
            "/api/routes/format-url",
            &[("route_id", route_id), ("platform", platform), ("date", date)],
        )
        .await
    }

    // ---- Analytics, training, prediction ----

    pub async fn compare(&self) -> ApiResult<CompareReport> {
        self.get("/api/compare").await
    }

    pub async fn analytics(
        &self,
        platform: &str,
        route: &str,
        date: &str,
    ) -> ApiResult<AnalyticsReport> {
        self.get_query(
            "/api/analytics",
            &[("platform", platform), ("route", route), ("date", date)],
        )
        .await
    }

    pub async fn start_training(&self, days_back: u32) -> ApiResult<Ack> {
        self.post("/api/train/start", &TrainStartRequest { days_back })
            .await
    }

    pub async fn training_status(&self) -> ApiResult<TrainStatus> {
        self.get("/api/train/status").await
    }

    pub async fn predict(&self, request: &PredictRequest) -> ApiResult<PredictResponse> {
        self.post("/api/predict", request).await
    }

    pub async fn prediction_history(&self) -> ApiResult<Vec<PredictionSession>> {
        self.get("/api/predictions/history").await
    }

    pub async fn prediction_session(&self, session_id: i64) -> ApiResult<Vec<PredictionRow>> {
        self.get(&format!("/api/predictions/session/{session_id}"))
            .await
    }
}

/// Filter set for `/api/data/db`. `None` fields are left out of the
/// query string entirely.
#[derive(Debug, Clone, Default, Serialize)]
pub struct DbQuery {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub platform: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub route_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bus_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit: Option<u32>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn base_url_trailing_slashes_stripped() {
        let client = ApiClient::new("http://localhost:5002///");
        assert_eq!(client.url("/api/status"), "http://localhost:5002/api/status");
    }

    #[test]
    fn db_query_serializes_only_set_fields() {
        let query = DbQuery {
            platform: Some("redbus".into()),
            limit: Some(100),
            ..Default::default()
        };
        let encoded = serde_json::to_value(&query).unwrap();
        let obj = encoded.as_object().unwrap();
        assert_eq!(obj.len(), 2);
        assert_eq!(obj["platform"], "redbus");
        assert_eq!(obj["limit"], 100);
    }
}
