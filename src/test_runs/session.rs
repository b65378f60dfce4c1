//! Session state holder.
//!
//! Process-wide storage of the correlation headers captured from a
//! test-start response, keyed by project id. The store is constructed
//! once in `main` and injected as an `Arc` into every component that
//! needs it; nothing else may mutate the records.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use tokio::sync::RwLock;
use tracing::debug;

use crate::openl::SessionHeaders;

/// Allow-list of response headers captured into a session record.
///
/// Only these named headers are ever extracted from a start response;
/// everything else the remote sends is ignored.
#[derive(Debug, Clone)]
pub struct HeaderCapture {
    /// Correlation/execution id header name (matched case-insensitively).
    pub execution_id_header: String,
    /// Cookie-bearing header name, normally `set-cookie`.
    pub cookie_header: String,
}

impl Default for HeaderCapture {
    fn default() -> Self {
        Self {
            execution_id_header: "x-test-execution-id".to_string(),
            cookie_header: "set-cookie".to_string(),
        }
    }
}

impl HeaderCapture {
    /// Extract the allow-listed headers from a raw header dump.
    ///
    /// Set-Cookie values are reduced to their leading `name=value` pair;
    /// attributes like `Path` and `HttpOnly` are request-irrelevant.
    pub fn extract(&self, headers: &[(String, String)]) -> SessionHeaders {
        let mut extracted = SessionHeaders::default();
        for (name, value) in headers {
            if name.eq_ignore_ascii_case(&self.execution_id_header) {
                extracted.execution_id = Some(value.clone());
            } else if name.eq_ignore_ascii_case(&self.cookie_header) {
                let pair = value.split(';').next().unwrap_or(value).trim();
                if !pair.is_empty() {
                    extracted.cookie = Some(pair.to_string());
                }
            }
        }
        extracted
    }
}

/// The locally cached session for one project's most recent test run.
#[derive(Debug, Clone)]
pub struct SessionRecord {
    pub project_id: String,
    pub headers: SessionHeaders,
    pub captured_at: DateTime<Utc>,
}

/// Keyed store of session records, one live record per project.
///
/// Overwrite semantics are last-writer-wins: starting a new test run for
/// a project discards the previous session's correlation state even if a
/// poll using the old record is still in flight. A poll holding a stale
/// record may succeed against a not-yet-expired remote session or fail;
/// callers are expected to serialize their own start-then-poll sequence
/// per project.
pub struct SessionStore {
    capture: HeaderCapture,
    sessions: RwLock<HashMap<String, SessionRecord>>,
}

impl SessionStore {
    pub fn new(capture: HeaderCapture) -> Self {
        Self {
            capture,
            sessions: RwLock::new(HashMap::new()),
        }
    }

    /// Extract the allow-listed headers and store them for the project,
    /// replacing any prior record. Returns the stored record.
    pub async fn commit(&self, project_id: &str, headers: &[(String, String)]) -> SessionRecord {
        let record = SessionRecord {
            project_id: project_id.to_string(),
            headers: self.capture.extract(headers),
            captured_at: Utc::now(),
        };

        debug!(
            "Committing test session for project '{}' (execution_id={:?})",
            project_id, record.headers.execution_id
        );

        let mut sessions = self.sessions.write().await;
        sessions.insert(project_id.to_string(), record.clone());
        record
    }

    /// The live record for a project, if a test run was started in this
    /// process. `None` is a valid state, not an error.
    pub async fn get(&self, project_id: &str) -> Option<SessionRecord> {
        let sessions = self.sessions.read().await;
        sessions.get(project_id).cloned()
    }

    /// All live records, for introspection.
    pub async fn active(&self) -> Vec<SessionRecord> {
        let sessions = self.sessions.read().await;
        let mut records: Vec<_> = sessions.values().cloned().collect();
        records.sort_by(|a, b| a.project_id.cmp(&b.project_id));
        records
    }
}

impl Default for SessionStore {
    fn default() -> Self {
        Self::new(HeaderCapture::default())
    }
}
