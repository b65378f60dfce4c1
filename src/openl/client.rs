//! HTTP client for communicating with the OpenL Studio REST service.
//!
//! Implements the [`RulesGateway`] trait over reqwest with Basic or
//! personal-access-token authentication.

use std::time::Duration;

use anyhow::Result;
use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use tracing::debug;

use super::error::BridgeError;
use super::models::{
    ExecutionSummary, ProjectInfo, ProjectStatus, SessionHeaders, StartRunOptions, StartedRun,
    SummaryPage, SummaryQuery, TableInfo, TableQuery,
};

/// Credentials for the remote service.
#[derive(Debug, Clone)]
pub enum RemoteAuth {
    None,
    Basic { username: String, password: String },
    Token(String),
}

impl RemoteAuth {
    pub fn mode(&self) -> &'static str {
        match self {
            RemoteAuth::None => "none",
            RemoteAuth::Basic { .. } => "basic",
            RemoteAuth::Token(_) => "token",
        }
    }
}

/// Remote operations the bridge consumes.
///
/// The gateway returns raw data and never touches session state; header
/// capture and affinity are the caller's concern.
#[async_trait]
pub trait RulesGateway: Send + Sync {
    async fn list_projects(&self) -> Result<Vec<ProjectInfo>, BridgeError>;

    async fn get_project(&self, project_id: &str) -> Result<ProjectInfo, BridgeError>;

    async fn set_project_status(
        &self,
        project_id: &str,
        status: ProjectStatus,
    ) -> Result<(), BridgeError>;

    async fn list_tables(
        &self,
        project_id: &str,
        query: &TableQuery,
    ) -> Result<Vec<TableInfo>, BridgeError>;

    /// Start an asynchronous test execution. Returns the accepted status
    /// and every response header, raw, for allow-list capture.
    async fn start_test_run(
        &self,
        project_id: &str,
        opts: &StartRunOptions,
    ) -> Result<StartedRun, BridgeError>;

    /// Fetch one page of the test summary, attaching the given session
    /// headers to the request.
    async fn fetch_test_summary(
        &self,
        project_id: &str,
        query: &SummaryQuery,
        session: &SessionHeaders,
    ) -> Result<SummaryPage, BridgeError>;
}

/// Reqwest-backed implementation of [`RulesGateway`].
#[derive(Clone)]
pub struct OpenlClient {
    client: Client,
    base_url: String,
    auth: RemoteAuth,
    /// Request header name the correlation id is sent back under.
    execution_id_header: String,
}

impl OpenlClient {
    /// Create a new client.
    ///
    /// # Arguments
    /// * `base_url` - Base URL of the rules service (e.g., "http://localhost:8080/web/rest")
    /// * `timeout_secs` - Per-request timeout in seconds
    /// * `auth` - Credentials to attach to every request
    /// * `execution_id_header` - Header name used for session correlation
    pub fn new(
        base_url: String,
        timeout_secs: u64,
        auth: RemoteAuth,
        execution_id_header: String,
    ) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()?;

        let base_url = base_url.trim_end_matches('/').to_string();

        Ok(Self {
            client,
            base_url,
            auth,
            execution_id_header,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn project_path(&self, project_id: &str) -> String {
        format!(
            "{}/projects/{}",
            self.base_url,
            urlencoding::encode(project_id)
        )
    }

    fn apply_auth(&self, request: RequestBuilder) -> RequestBuilder {
        match &self.auth {
            RemoteAuth::None => request,
            RemoteAuth::Basic { username, password } => {
                request.basic_auth(username, Some(password))
            }
            RemoteAuth::Token(token) => request.bearer_auth(token),
        }
    }

    fn transport_error(
        err: reqwest::Error,
        method: &'static str,
        endpoint: &str,
    ) -> BridgeError {
        if err.is_timeout() {
            BridgeError::Timeout {
                method,
                endpoint: endpoint.to_string(),
            }
        } else {
            BridgeError::RemoteRequestFailed {
                status: err.status().map(|s| s.as_u16()).unwrap_or(0),
                method,
                endpoint: endpoint.to_string(),
                message: err.to_string(),
            }
        }
    }

    /// Turn a non-success response into a `RemoteRequestFailed`.
    async fn response_error(
        response: Response,
        method: &'static str,
        endpoint: &str,
    ) -> BridgeError {
        let status = response.status().as_u16();
        let body = response.text().await.unwrap_or_default();
        BridgeError::remote(status, method, endpoint, &body)
    }

    async fn parse_json<T: serde::de::DeserializeOwned>(
        response: Response,
        method: &'static str,
        endpoint: &str,
    ) -> Result<T, BridgeError> {
        let status = response.status().as_u16();
        response.json().await.map_err(|e| BridgeError::RemoteRequestFailed {
            status,
            method,
            endpoint: endpoint.to_string(),
            message: format!("invalid response body: {}", e),
        })
    }
}

#[async_trait]
impl RulesGateway for OpenlClient {
    async fn list_projects(&self) -> Result<Vec<ProjectInfo>, BridgeError> {
        let url = format!("{}/projects", self.base_url);
        let response = self
            .apply_auth(self.client.get(&url))
            .header("Accept", "application/json")
            .send()
            .await
            .map_err(|e| Self::transport_error(e, "GET", &url))?;

        if !response.status().is_success() {
            return Err(Self::response_error(response, "GET", &url).await);
        }
        Self::parse_json(response, "GET", &url).await
    }

    async fn get_project(&self, project_id: &str) -> Result<ProjectInfo, BridgeError> {
        let url = self.project_path(project_id);
        let response = self
            .apply_auth(self.client.get(&url))
            .header("Accept", "application/json")
            .send()
            .await
            .map_err(|e| Self::transport_error(e, "GET", &url))?;

        if !response.status().is_success() {
            return Err(Self::response_error(response, "GET", &url).await);
        }
        Self::parse_json(response, "GET", &url).await
    }

    async fn set_project_status(
        &self,
        project_id: &str,
        status: ProjectStatus,
    ) -> Result<(), BridgeError> {
        let url = self.project_path(project_id);
        debug!("Setting project '{}' status to {}", project_id, status.as_str());

        let response = self
            .apply_auth(self.client.patch(&url))
            .json(&serde_json::json!({ "status": status.as_str() }))
            .send()
            .await
            .map_err(|e| Self::transport_error(e, "PATCH", &url))?;

        if !response.status().is_success() {
            return Err(Self::response_error(response, "PATCH", &url).await);
        }
        Ok(())
    }

    async fn list_tables(
        &self,
        project_id: &str,
        query: &TableQuery,
    ) -> Result<Vec<TableInfo>, BridgeError> {
        let url = format!("{}/tables", self.project_path(project_id));

        let mut params: Vec<(&str, String)> = Vec::new();
        if let Some(kind) = &query.kind {
            params.push(("kind", kind.clone()));
        }
        if let Some(name) = &query.name {
            params.push(("name", name.clone()));
        }

        let response = self
            .apply_auth(self.client.get(&url))
            .query(&params)
            .header("Accept", "application/json")
            .send()
            .await
            .map_err(|e| Self::transport_error(e, "GET", &url))?;

        if !response.status().is_success() {
            return Err(Self::response_error(response, "GET", &url).await);
        }
        Self::parse_json(response, "GET", &url).await
    }

    async fn start_test_run(
        &self,
        project_id: &str,
        opts: &StartRunOptions,
    ) -> Result<StartedRun, BridgeError> {
        let url = format!("{}/tests/run", self.project_path(project_id));

        let mut params: Vec<(&str, String)> = Vec::new();
        if let Some(table_id) = &opts.table_id {
            params.push(("tableId", table_id.clone()));
        }
        if let Some(ranges) = &opts.test_ranges {
            params.push(("testRanges", ranges.clone()));
        }

        let response = self
            .apply_auth(self.client.post(&url))
            .query(&params)
            .header("Accept", "application/json")
            .send()
            .await
            .map_err(|e| Self::transport_error(e, "POST", &url))?;

        if !response.status().is_success() {
            return Err(Self::response_error(response, "POST", &url).await);
        }

        let status = response.status().as_u16();
        let headers = response
            .headers()
            .iter()
            .map(|(name, value)| {
                (
                    name.as_str().to_string(),
                    value.to_str().unwrap_or_default().to_string(),
                )
            })
            .collect();

        debug!("Test run accepted for project '{}' ({})", project_id, status);
        Ok(StartedRun { status, headers })
    }

    async fn fetch_test_summary(
        &self,
        project_id: &str,
        query: &SummaryQuery,
        session: &SessionHeaders,
    ) -> Result<SummaryPage, BridgeError> {
        let url = format!("{}/tests/summary", self.project_path(project_id));

        let mut params: Vec<(&str, String)> = Vec::new();
        if let Some(page) = query.page {
            params.push(("page", page.to_string()));
        }
        if let Some(size) = query.size {
            params.push(("size", size.to_string()));
        }
        if let Some(failures) = query.failures {
            params.push(("failures", failures.to_string()));
        }
        if query.failures_only {
            params.push(("failuresOnly", "true".to_string()));
        }

        let mut request = self
            .apply_auth(self.client.get(&url))
            .query(&params)
            .header("Accept", "application/json");
        if let Some(execution_id) = &session.execution_id {
            request = request.header(self.execution_id_header.as_str(), execution_id);
        }
        if let Some(cookie) = &session.cookie {
            request = request.header("Cookie", cookie);
        }

        let response = request
            .send()
            .await
            .map_err(|e| Self::transport_error(e, "GET", &url))?;

        if !response.status().is_success() {
            return Err(Self::response_error(response, "GET", &url).await);
        }

        // 202 means the execution is still running; anything else that is
        // a success means the run has finished.
        let complete = response.status() != StatusCode::ACCEPTED;
        let summary: ExecutionSummary = Self::parse_json(response, "GET", &url).await?;

        Ok(SummaryPage { complete, summary })
    }
}
