//! Data models for the remote rules service.
//!
//! DTOs mirror the JSON shapes of the OpenL Studio REST API (camelCase
//! fields); aggregate helpers live next to the types they describe.

use serde::{Deserialize, Serialize};

/// Lifecycle status of a remote project.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ProjectStatus {
    Opened,
    Closed,
    Editing,
    Archived,
}

impl ProjectStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProjectStatus::Opened => "OPENED",
            ProjectStatus::Closed => "CLOSED",
            ProjectStatus::Editing => "EDITING",
            ProjectStatus::Archived => "ARCHIVED",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "OPENED" => Some(ProjectStatus::Opened),
            "CLOSED" => Some(ProjectStatus::Closed),
            "EDITING" => Some(ProjectStatus::Editing),
            "ARCHIVED" => Some(ProjectStatus::Archived),
            _ => None,
        }
    }
}

/// One project as reported by the remote service.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectInfo {
    pub id: String,
    #[serde(default)]
    pub name: String,
    pub status: ProjectStatus,
}

/// One rule table of a project.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TableInfo {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub kind: Option<String>,
}

/// Filters for the table listing endpoint.
#[derive(Debug, Clone, Default)]
pub struct TableQuery {
    pub kind: Option<String>,
    pub name: Option<String>,
}

/// A single executed assertion within a test case. May be elided by the
/// remote service for brevity.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TestUnit {
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub expected: Option<serde_json::Value>,
    #[serde(default)]
    pub actual: Option<serde_json::Value>,
    #[serde(default)]
    pub failed: bool,
}

/// Aggregated pass/fail counts for one rule table's tests.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TestCaseSummary {
    #[serde(default)]
    pub name: String,
    pub table_id: String,
    #[serde(default)]
    pub execution_time_ms: Option<u64>,
    #[serde(default)]
    pub number_of_tests: u32,
    #[serde(default)]
    pub number_of_failures: u32,
    #[serde(default)]
    pub test_units: Vec<TestUnit>,
}

impl TestCaseSummary {
    pub fn number_of_passed(&self) -> u32 {
        self.number_of_tests.saturating_sub(self.number_of_failures)
    }
}

/// One page of aggregated test-table results.
///
/// Pagination fields describe the table-level summaries on this page, not
/// individual test units: one row may bundle several units.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExecutionSummary {
    #[serde(default)]
    pub test_cases: Vec<TestCaseSummary>,
    #[serde(default)]
    pub execution_time_ms: Option<u64>,
    #[serde(default)]
    pub number_of_tests: u32,
    #[serde(default)]
    pub number_of_failures: u32,
    #[serde(default)]
    pub page_number: u32,
    #[serde(default)]
    pub page_size: u32,
    #[serde(default)]
    pub number_of_elements: u32,
    #[serde(default)]
    pub total_pages: Option<u32>,
}

impl ExecutionSummary {
    pub fn number_of_passed(&self) -> u32 {
        self.number_of_tests.saturating_sub(self.number_of_failures)
    }

    /// 1-based position of the first summary on this page, for display.
    pub fn display_start(&self) -> u32 {
        self.page_number * self.page_size + 1
    }

    /// Whether more pages exist after this one. Falls back to a full-page
    /// heuristic when the remote omits `totalPages`.
    pub fn has_more(&self) -> bool {
        match self.total_pages {
            Some(total) => self.page_number + 1 < total,
            None => self.page_size > 0 && self.number_of_elements == self.page_size,
        }
    }
}

/// Session-affinity headers reconstructed on every poll.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionHeaders {
    /// Server-assigned execution/correlation identifier.
    pub execution_id: Option<String>,
    /// `name=value` cookie pair extracted from the start response.
    pub cookie: Option<String>,
}

/// Narrowing options for a test-run start.
#[derive(Debug, Clone, Default)]
pub struct StartRunOptions {
    pub table_id: Option<String>,
    pub test_ranges: Option<String>,
}

/// Raw outcome of a test-run start: status plus every response header,
/// for allow-list capture by the session store.
#[derive(Debug, Clone)]
pub struct StartedRun {
    pub status: u16,
    pub headers: Vec<(String, String)>,
}

/// Query parameters forwarded verbatim to the summary endpoint.
#[derive(Debug, Clone, Default)]
pub struct SummaryQuery {
    pub page: Option<u32>,
    pub size: Option<u32>,
    pub failures: Option<u32>,
    pub failures_only: bool,
}

/// One summary fetch: the parsed page plus whether the remote reported
/// the execution as finished (200) or still running (202).
#[derive(Debug, Clone)]
pub struct SummaryPage {
    pub complete: bool,
    pub summary: ExecutionSummary,
}
