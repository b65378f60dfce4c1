//! Fake OpenL REST service
//!
//! A small axum app that mimics the remote endpoints the bridge consumes,
//! records every hit (including session headers), and serves configurable
//! paged test results. Each test spawns its own isolated instance.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use axum::extract::{Path, Query, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, patch, post};
use axum::{Json, Router};
use serde_json::{json, Value};
use tokio::net::TcpListener;

/// Build one test-case row of the summary payload.
pub fn test_case(table_id: &str, tests: u64, failures: u64) -> Value {
    json!({
        "name": format!("{} tests", table_id),
        "tableId": table_id,
        "executionTimeMs": 7,
        "numberOfTests": tests,
        "numberOfFailures": failures,
        "testUnits": []
    })
}

/// One recorded summary fetch.
#[derive(Debug, Clone)]
pub struct SummaryHit {
    pub execution_id: Option<String>,
    pub cookie: Option<String>,
    pub accept: Option<String>,
    pub page: u32,
    pub size: u32,
    pub failures_only: bool,
}

#[derive(Debug, Clone)]
struct ActiveRun {
    execution_id: String,
    cookie_value: String,
    pending_polls: u32,
}

#[derive(Clone, Default)]
struct RemoteState {
    // project id -> status string
    projects: Arc<Mutex<HashMap<String, String>>>,
    tables: Arc<Mutex<Vec<Value>>>,
    cases: Arc<Mutex<Vec<Value>>>,
    polls_until_complete: Arc<Mutex<u32>>,
    runs_started: Arc<Mutex<u32>>,
    active_run: Arc<Mutex<Option<ActiveRun>>>,
    summary_hits: Arc<Mutex<Vec<SummaryHit>>>,
    status_patches: Arc<Mutex<Vec<(String, String)>>>,
}

/// Handle to a running fake service.
pub struct FakeOpenl {
    pub base_url: String,
    state: RemoteState,
    serve_handle: tokio::task::JoinHandle<()>,
}

pub struct FakeOpenlBuilder {
    state: RemoteState,
}

impl FakeOpenl {
    pub fn builder() -> FakeOpenlBuilder {
        FakeOpenlBuilder {
            state: RemoteState::default(),
        }
    }

    /// Number of summary fetches received so far.
    pub fn summary_hits(&self) -> usize {
        self.state.summary_hits.lock().unwrap().len()
    }

    /// Session headers and query of the most recent summary fetch.
    pub fn last_summary_hit(&self) -> SummaryHit {
        self.state
            .summary_hits
            .lock()
            .unwrap()
            .last()
            .cloned()
            .expect("no summary fetch was recorded")
    }

    /// Number of test-run starts received so far.
    pub fn runs_started(&self) -> u32 {
        *self.state.runs_started.lock().unwrap()
    }

    /// Recorded PATCH status changes as (project_id, status) pairs.
    pub fn status_patches(&self) -> Vec<(String, String)> {
        self.state.status_patches.lock().unwrap().clone()
    }
}

impl Drop for FakeOpenl {
    fn drop(&mut self) {
        self.serve_handle.abort();
    }
}

impl FakeOpenlBuilder {
    pub fn project(self, project_id: &str, status: &str) -> Self {
        self.state
            .projects
            .lock()
            .unwrap()
            .insert(project_id.to_string(), status.to_string());
        self
    }

    pub fn tables(self, tables: Vec<Value>) -> Self {
        *self.state.tables.lock().unwrap() = tables;
        self
    }

    /// Flat list of test-case rows; the service paginates them by `size`.
    pub fn cases(self, cases: Vec<Value>) -> Self {
        *self.state.cases.lock().unwrap() = cases;
        self
    }

    /// How many summary fetches answer 202 (still running) before the
    /// service reports the run as finished.
    pub fn polls_until_complete(self, polls: u32) -> Self {
        *self.state.polls_until_complete.lock().unwrap() = polls;
        self
    }

    pub async fn spawn(self) -> FakeOpenl {
        let state = self.state;

        let app = Router::new()
            .route("/projects", get(list_projects))
            .route("/projects/{project_id}", get(get_project))
            .route("/projects/{project_id}", patch(patch_project))
            .route("/projects/{project_id}/tables", get(list_tables))
            .route("/projects/{project_id}/tests/run", post(start_run))
            .route("/projects/{project_id}/tests/summary", get(get_summary))
            .with_state(state.clone());

        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind fake remote");
        let port = listener.local_addr().unwrap().port();

        let serve_handle = tokio::spawn(async move {
            axum::serve(listener, app).await.expect("fake remote died");
        });

        FakeOpenl {
            base_url: format!("http://127.0.0.1:{}", port),
            state,
            serve_handle,
        }
    }
}

// ============================================================================
// Handlers
// ============================================================================

async fn list_projects(State(state): State<RemoteState>) -> Json<Value> {
    let projects = state.projects.lock().unwrap();
    let mut list: Vec<Value> = projects
        .iter()
        .map(|(id, status)| json!({"id": id, "name": id, "status": status}))
        .collect();
    list.sort_by_key(|p| p["id"].as_str().unwrap_or_default().to_string());
    Json(json!(list))
}

async fn get_project(
    State(state): State<RemoteState>,
    Path(project_id): Path<String>,
) -> Response {
    let projects = state.projects.lock().unwrap();
    match projects.get(&project_id) {
        Some(status) => Json(json!({
            "id": project_id,
            "name": project_id,
            "status": status,
        }))
        .into_response(),
        None => (StatusCode::NOT_FOUND, "project not found").into_response(),
    }
}

async fn patch_project(
    State(state): State<RemoteState>,
    Path(project_id): Path<String>,
    Json(body): Json<Value>,
) -> Response {
    let status = body["status"].as_str().unwrap_or_default().to_string();
    state
        .status_patches
        .lock()
        .unwrap()
        .push((project_id.clone(), status.clone()));

    let mut projects = state.projects.lock().unwrap();
    match projects.get_mut(&project_id) {
        Some(current) => {
            *current = status;
            StatusCode::OK.into_response()
        }
        None => (StatusCode::NOT_FOUND, "project not found").into_response(),
    }
}

async fn list_tables(
    State(state): State<RemoteState>,
    Path(project_id): Path<String>,
) -> Response {
    if !state.projects.lock().unwrap().contains_key(&project_id) {
        return (StatusCode::NOT_FOUND, "project not found").into_response();
    }
    let tables = state.tables.lock().unwrap().clone();
    Json(json!(tables)).into_response()
}

async fn start_run(
    State(state): State<RemoteState>,
    Path(project_id): Path<String>,
) -> Response {
    {
        let projects = state.projects.lock().unwrap();
        match projects.get(&project_id) {
            None => return (StatusCode::NOT_FOUND, "project not found").into_response(),
            Some(status) if status != "OPENED" => {
                return (StatusCode::CONFLICT, "Project is not open").into_response();
            }
            Some(_) => {}
        }
    }

    let run_number = {
        let mut runs = state.runs_started.lock().unwrap();
        *runs += 1;
        *runs
    };

    let execution_id = format!("exec-{}", run_number);
    let cookie_value = format!("JSESSIONID=sess-{}", run_number);
    *state.active_run.lock().unwrap() = Some(ActiveRun {
        execution_id: execution_id.clone(),
        cookie_value: cookie_value.clone(),
        pending_polls: *state.polls_until_complete.lock().unwrap(),
    });

    (
        StatusCode::ACCEPTED,
        [
            ("x-test-execution-id", execution_id),
            ("set-cookie", format!("{}; Path=/; HttpOnly", cookie_value)),
        ],
        Json(json!({})),
    )
        .into_response()
}

async fn get_summary(
    State(state): State<RemoteState>,
    Path(project_id): Path<String>,
    Query(params): Query<HashMap<String, String>>,
    headers: HeaderMap,
) -> Response {
    if !state.projects.lock().unwrap().contains_key(&project_id) {
        return (StatusCode::NOT_FOUND, "project not found").into_response();
    }

    let page: u32 = params
        .get("page")
        .and_then(|p| p.parse().ok())
        .unwrap_or(0);
    let size: u32 = params
        .get("size")
        .and_then(|s| s.parse().ok())
        .unwrap_or(20);
    let failures_only = params.get("failuresOnly").map(|s| s.as_str()) == Some("true");

    let header_value = |name: &str| {
        headers
            .get(name)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string)
    };
    state.summary_hits.lock().unwrap().push(SummaryHit {
        execution_id: header_value("x-test-execution-id"),
        cookie: header_value("cookie"),
        accept: header_value("accept"),
        page,
        size,
        failures_only,
    });

    let still_running = {
        let mut run = state.active_run.lock().unwrap();
        match run.as_mut() {
            None => return (StatusCode::NOT_FOUND, "no test execution").into_response(),
            Some(run) => {
                if run.pending_polls > 0 {
                    run.pending_polls -= 1;
                    true
                } else {
                    false
                }
            }
        }
    };

    let all_cases: Vec<Value> = {
        let cases = state.cases.lock().unwrap();
        if failures_only {
            cases
                .iter()
                .filter(|c| c["numberOfFailures"].as_u64().unwrap_or(0) > 0)
                .cloned()
                .collect()
        } else {
            cases.clone()
        }
    };

    let number_of_tests: u64 = all_cases
        .iter()
        .map(|c| c["numberOfTests"].as_u64().unwrap_or(0))
        .sum();
    let number_of_failures: u64 = all_cases
        .iter()
        .map(|c| c["numberOfFailures"].as_u64().unwrap_or(0))
        .sum();

    let total = all_cases.len() as u32;
    let total_pages = if size == 0 { 0 } else { total.div_ceil(size) };
    let start = (page * size) as usize;
    let end = ((page + 1) * size).min(total) as usize;
    let page_cases: Vec<Value> = if start < all_cases.len() {
        all_cases[start..end].to_vec()
    } else {
        Vec::new()
    };

    let body = json!({
        "testCases": page_cases,
        "executionTimeMs": 42,
        "numberOfTests": number_of_tests,
        "numberOfFailures": number_of_failures,
        "pageNumber": page,
        "pageSize": size,
        "numberOfElements": (end.saturating_sub(start)) as u32,
        "totalPages": total_pages,
    });

    let status = if still_running {
        StatusCode::ACCEPTED
    } else {
        StatusCode::OK
    };
    (status, Json(body)).into_response()
}
