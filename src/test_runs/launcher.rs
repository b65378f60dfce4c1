//! Test-run initiation.
//!
//! Starts an asynchronous test execution on the remote service and
//! commits the captured session headers. A start that fails because the
//! project is closed triggers exactly one auto-open followed by exactly
//! one resubmission; any other failure propagates as-is. Retrying a start
//! beyond that would risk duplicate remote executions with different
//! session identities.

use std::sync::Arc;

use lazy_static::lazy_static;
use regex::Regex;
use tracing::{info, warn};

use crate::openl::{BridgeError, ProjectStatus, RulesGateway, StartRunOptions};

use super::session::SessionStore;

lazy_static! {
    /// Test-range expressions: comma-separated numbers or ranges, "1-3,5".
    static ref TEST_RANGES_RE: Regex = Regex::new(r"^\d+(-\d+)?(,\d+(-\d+)?)*$").unwrap();
}

/// Outcome of a start, surfaced to the caller.
#[derive(Debug, Clone)]
pub struct StartReport {
    pub project_id: String,
    pub table_id: Option<String>,
    pub test_ranges: Option<String>,
    /// Whether the project had to be opened before the run could start.
    pub auto_opened: bool,
    pub execution_id: Option<String>,
}

/// Starts test runs and commits their session state.
pub struct TestRunLauncher {
    gateway: Arc<dyn RulesGateway>,
    sessions: Arc<SessionStore>,
}

impl TestRunLauncher {
    pub fn new(gateway: Arc<dyn RulesGateway>, sessions: Arc<SessionStore>) -> Self {
        Self { gateway, sessions }
    }

    /// Start a test execution for a project, optionally scoped to one
    /// rule table and/or explicit test ranges.
    pub async fn start(
        &self,
        project_id: &str,
        table_id: Option<&str>,
        test_ranges: Option<&str>,
    ) -> Result<StartReport, BridgeError> {
        validate_project_id(project_id)?;
        if let Some(ranges) = test_ranges {
            validate_test_ranges(ranges)?;
        }

        let opts = StartRunOptions {
            table_id: table_id.map(str::to_string),
            test_ranges: test_ranges.map(str::to_string),
        };

        let mut auto_opened = false;
        let started = match self.gateway.start_test_run(project_id, &opts).await {
            Ok(started) => started,
            Err(err @ BridgeError::RemoteRequestFailed { .. }) => {
                if !self.project_is_closed(project_id).await {
                    return Err(err);
                }

                warn!(
                    "Project '{}' is not open, opening it before retrying the test start",
                    project_id
                );
                self.gateway
                    .set_project_status(project_id, ProjectStatus::Opened)
                    .await?;
                auto_opened = true;

                // Resubmit exactly once; a second failure propagates.
                self.gateway.start_test_run(project_id, &opts).await?
            }
            Err(err) => return Err(err),
        };

        let record = self.sessions.commit(project_id, &started.headers).await;

        info!(
            "Test run started for project '{}' (status={}, execution_id={:?}, auto_opened={})",
            project_id, started.status, record.headers.execution_id, auto_opened
        );

        Ok(StartReport {
            project_id: project_id.to_string(),
            table_id: opts.table_id,
            test_ranges: opts.test_ranges,
            auto_opened,
            execution_id: record.headers.execution_id,
        })
    }

    /// Whether the start failure can be explained by a closed project.
    /// A lookup failure here means the original start error stands.
    async fn project_is_closed(&self, project_id: &str) -> bool {
        match self.gateway.get_project(project_id).await {
            Ok(project) => project.status != ProjectStatus::Opened,
            Err(_) => false,
        }
    }
}

fn validate_project_id(project_id: &str) -> Result<(), BridgeError> {
    if project_id.trim().is_empty() {
        return Err(BridgeError::InvalidArgument(
            "project id must not be empty".to_string(),
        ));
    }
    Ok(())
}

fn validate_test_ranges(ranges: &str) -> Result<(), BridgeError> {
    if !TEST_RANGES_RE.is_match(ranges) {
        return Err(BridgeError::InvalidArgument(format!(
            "malformed test ranges '{}', expected e.g. \"1-3,5\"",
            ranges
        )));
    }
    Ok(())
}
