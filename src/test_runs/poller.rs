//! Result polling and aggregation.
//!
//! Every fetch reconstructs session affinity from the stored record:
//! correlation header, cookie, `Accept: application/json`. The poller
//! never mutates the session and makes no network call when no session
//! exists.

use std::sync::Arc;

use tracing::{debug, warn};

use crate::openl::{BridgeError, ExecutionSummary, RulesGateway, SummaryQuery, TestCaseSummary};

use super::session::{SessionRecord, SessionStore};

/// Page size used when the caller does not specify one.
pub const DEFAULT_PAGE_SIZE: u32 = 20;

/// Hard bound on the table scan, in case the remote neither reports
/// `totalPages` nor ever returns an empty page.
const MAX_TABLE_SCAN_PAGES: u32 = 200;

/// Aggregate counts for a cheap status check.
#[derive(Debug, Clone)]
pub struct RunSummary {
    pub number_of_tests: u32,
    pub number_of_failures: u32,
    pub number_of_passed: u32,
    pub execution_time_ms: Option<u64>,
    /// Whether the remote reported the execution as finished.
    pub complete: bool,
}

/// One page of results with display metadata.
#[derive(Debug, Clone)]
pub struct ResultsPage {
    pub summary: ExecutionSummary,
    pub complete: bool,
    /// 1-based position of the first summary on this page.
    pub display_start: u32,
    pub has_more: bool,
}

/// Cases of a single table, collected by walking pages.
#[derive(Debug, Clone)]
pub struct TableResults {
    pub table_id: String,
    pub cases: Vec<TestCaseSummary>,
    pub pages_scanned: u32,
    pub complete: bool,
}

/// Reads test results for committed sessions.
pub struct ResultsPoller {
    gateway: Arc<dyn RulesGateway>,
    sessions: Arc<SessionStore>,
}

impl ResultsPoller {
    pub fn new(gateway: Arc<dyn RulesGateway>, sessions: Arc<SessionStore>) -> Self {
        Self { gateway, sessions }
    }

    /// The session record for a project, or `NoActiveTestSession` without
    /// touching the network.
    async fn session_for(&self, project_id: &str) -> Result<SessionRecord, BridgeError> {
        self.sessions
            .get(project_id)
            .await
            .ok_or_else(|| BridgeError::NoActiveTestSession(project_id.to_string()))
    }

    /// One round trip, no pagination: aggregate counts only.
    pub async fn summary(
        &self,
        project_id: &str,
        failures_limit: Option<u32>,
    ) -> Result<RunSummary, BridgeError> {
        let record = self.session_for(project_id).await?;

        let query = SummaryQuery {
            failures: failures_limit,
            ..Default::default()
        };
        let page = self
            .gateway
            .fetch_test_summary(project_id, &query, &record.headers)
            .await?;

        Ok(RunSummary {
            number_of_tests: page.summary.number_of_tests,
            number_of_failures: page.summary.number_of_failures,
            number_of_passed: page.summary.number_of_passed(),
            execution_time_ms: page.summary.execution_time_ms,
            complete: page.complete,
        })
    }

    /// One page of table-level summaries; pagination parameters are
    /// forwarded verbatim to the remote endpoint.
    pub async fn results(
        &self,
        project_id: &str,
        page: Option<u32>,
        size: Option<u32>,
        failures_only: bool,
    ) -> Result<ResultsPage, BridgeError> {
        let record = self.session_for(project_id).await?;

        let query = SummaryQuery {
            page,
            size,
            failures: None,
            failures_only,
        };
        let fetched = self
            .gateway
            .fetch_test_summary(project_id, &query, &record.headers)
            .await?;

        let display_start = fetched.summary.display_start();
        let has_more = fetched.summary.has_more();
        Ok(ResultsPage {
            summary: fetched.summary,
            complete: fetched.complete,
            display_start,
            has_more,
        })
    }

    /// Walk pages from the given offset until a page contains cases for
    /// `table_id`, a page comes back empty, the remote-reported page count
    /// is exhausted, or the hard scan cap is hit. A table that never shows
    /// up yields an empty result, not an error.
    pub async fn results_by_table(
        &self,
        project_id: &str,
        table_id: &str,
        page: Option<u32>,
        size: Option<u32>,
    ) -> Result<TableResults, BridgeError> {
        let record = self.session_for(project_id).await?;

        let size = size.unwrap_or(DEFAULT_PAGE_SIZE);
        let mut current_page = page.unwrap_or(0);
        let mut pages_scanned = 0u32;
        let mut complete = false;

        loop {
            let query = SummaryQuery {
                page: Some(current_page),
                size: Some(size),
                ..Default::default()
            };
            let fetched = self
                .gateway
                .fetch_test_summary(project_id, &query, &record.headers)
                .await?;
            pages_scanned += 1;
            complete = fetched.complete;

            let cases: Vec<TestCaseSummary> = fetched
                .summary
                .test_cases
                .iter()
                .filter(|case| case.table_id == table_id)
                .cloned()
                .collect();

            if !cases.is_empty() {
                debug!(
                    "Found {} case(s) for table '{}' on page {}",
                    cases.len(),
                    table_id,
                    current_page
                );
                return Ok(TableResults {
                    table_id: table_id.to_string(),
                    cases,
                    pages_scanned,
                    complete,
                });
            }

            if fetched.summary.number_of_elements == 0 {
                break;
            }
            if let Some(total) = fetched.summary.total_pages {
                if current_page + 1 >= total {
                    break;
                }
            }
            if pages_scanned >= MAX_TABLE_SCAN_PAGES {
                warn!(
                    "Table scan for '{}' hit the {}-page cap without an empty page",
                    table_id, MAX_TABLE_SCAN_PAGES
                );
                break;
            }

            current_page += 1;
        }

        Ok(TableResults {
            table_id: table_id.to_string(),
            cases: Vec::new(),
            pages_scanned,
            complete,
        })
    }
}
