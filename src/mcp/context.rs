//! MCP Tool Execution Context
//!
//! Provides access to bridge components for tool implementations.

use std::sync::Arc;

use crate::config::BridgeConfig;
use crate::openl::RulesGateway;
use crate::test_runs::{ResultsPoller, SessionStore, TestRunLauncher};

/// Context provided to tool and resource handlers during execution
#[derive(Clone)]
pub struct ToolContext {
    /// Raw access to the remote rules service
    pub gateway: Arc<dyn RulesGateway>,

    /// Live test-session records
    pub sessions: Arc<SessionStore>,

    /// Test-run starter (commits sessions)
    pub launcher: Arc<TestRunLauncher>,

    /// Result fetches with session affinity
    pub poller: Arc<ResultsPoller>,

    /// Effective bridge configuration
    pub config: BridgeConfig,

    /// Server version info
    pub server_version: String,

    /// Server start time (for uptime calculation)
    pub start_time: std::time::Instant,
}
