//! In-memory gateway fake for unit tests.
//!
//! Records every call and replays scripted responses, so tests can assert
//! both outcomes and the exact remote traffic (or its absence).

use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;

use async_trait::async_trait;

use crate::openl::{
    BridgeError, ProjectInfo, ProjectStatus, RulesGateway, SessionHeaders, StartRunOptions,
    StartedRun, SummaryPage, SummaryQuery, TableInfo, TableQuery,
};

/// One recorded gateway invocation.
#[derive(Debug, Clone)]
pub enum GatewayCall {
    ListProjects,
    GetProject(String),
    SetStatus(String, ProjectStatus),
    ListTables(String),
    StartRun {
        project: String,
        table: Option<String>,
        ranges: Option<String>,
    },
    FetchSummary {
        project: String,
        page: Option<u32>,
        size: Option<u32>,
        failures: Option<u32>,
        failures_only: bool,
        headers: SessionHeaders,
    },
}

/// A `StartedRun` carrying the standard session headers.
pub fn accepted_run(execution_id: &str, cookie: &str) -> StartedRun {
    StartedRun {
        status: 202,
        headers: vec![
            (
                "x-test-execution-id".to_string(),
                execution_id.to_string(),
            ),
            ("set-cookie".to_string(), format!("{}; Path=/; HttpOnly", cookie)),
        ],
    }
}

#[derive(Default)]
pub struct FakeGateway {
    projects: Mutex<HashMap<String, ProjectInfo>>,
    tables: Mutex<Vec<TableInfo>>,
    start_responses: Mutex<VecDeque<Result<StartedRun, BridgeError>>>,
    summary_responses: Mutex<VecDeque<Result<SummaryPage, BridgeError>>>,
    set_status_fails: Mutex<bool>,
    calls: Mutex<Vec<GatewayCall>>,
}

impl FakeGateway {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_project(&self, project_id: &str, status: ProjectStatus) {
        self.projects.lock().unwrap().insert(
            project_id.to_string(),
            ProjectInfo {
                id: project_id.to_string(),
                name: project_id.to_string(),
                status,
            },
        );
    }

    pub fn set_tables(&self, tables: Vec<TableInfo>) {
        *self.tables.lock().unwrap() = tables;
    }

    pub fn push_start(&self, response: Result<StartedRun, BridgeError>) {
        self.start_responses.lock().unwrap().push_back(response);
    }

    pub fn push_summary(&self, response: Result<SummaryPage, BridgeError>) {
        self.summary_responses.lock().unwrap().push_back(response);
    }

    pub fn fail_set_status(&self) {
        *self.set_status_fails.lock().unwrap() = true;
    }

    pub fn calls(&self) -> Vec<GatewayCall> {
        self.calls.lock().unwrap().clone()
    }

    fn record(&self, call: GatewayCall) {
        self.calls.lock().unwrap().push(call);
    }
}

#[async_trait]
impl RulesGateway for FakeGateway {
    async fn list_projects(&self) -> Result<Vec<ProjectInfo>, BridgeError> {
        self.record(GatewayCall::ListProjects);
        let mut projects: Vec<_> = self.projects.lock().unwrap().values().cloned().collect();
        projects.sort_by(|a, b| a.id.cmp(&b.id));
        Ok(projects)
    }

    async fn get_project(&self, project_id: &str) -> Result<ProjectInfo, BridgeError> {
        self.record(GatewayCall::GetProject(project_id.to_string()));
        self.projects
            .lock()
            .unwrap()
            .get(project_id)
            .cloned()
            .ok_or_else(|| {
                BridgeError::remote(404, "GET", format!("/projects/{}", project_id), "not found")
            })
    }

    async fn set_project_status(
        &self,
        project_id: &str,
        status: ProjectStatus,
    ) -> Result<(), BridgeError> {
        self.record(GatewayCall::SetStatus(project_id.to_string(), status));
        if *self.set_status_fails.lock().unwrap() {
            return Err(BridgeError::remote(
                403,
                "PATCH",
                format!("/projects/{}", project_id),
                "open refused",
            ));
        }
        if let Some(project) = self.projects.lock().unwrap().get_mut(project_id) {
            project.status = status;
        }
        Ok(())
    }

    async fn list_tables(
        &self,
        project_id: &str,
        _query: &TableQuery,
    ) -> Result<Vec<TableInfo>, BridgeError> {
        self.record(GatewayCall::ListTables(project_id.to_string()));
        Ok(self.tables.lock().unwrap().clone())
    }

    async fn start_test_run(
        &self,
        project_id: &str,
        opts: &StartRunOptions,
    ) -> Result<StartedRun, BridgeError> {
        self.record(GatewayCall::StartRun {
            project: project_id.to_string(),
            table: opts.table_id.clone(),
            ranges: opts.test_ranges.clone(),
        });
        self.start_responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| {
                Err(BridgeError::remote(
                    500,
                    "POST",
                    format!("/projects/{}/tests/run", project_id),
                    "no scripted start response",
                ))
            })
    }

    async fn fetch_test_summary(
        &self,
        project_id: &str,
        query: &SummaryQuery,
        session: &SessionHeaders,
    ) -> Result<SummaryPage, BridgeError> {
        self.record(GatewayCall::FetchSummary {
            project: project_id.to_string(),
            page: query.page,
            size: query.size,
            failures: query.failures,
            failures_only: query.failures_only,
            headers: session.clone(),
        });
        self.summary_responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| {
                Err(BridgeError::remote(
                    500,
                    "GET",
                    format!("/projects/{}/tests/summary", project_id),
                    "no scripted summary response",
                ))
            })
    }
}
