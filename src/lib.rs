//! OpenL MCP Bridge Library
//!
//! This library exposes the internal modules for testing and potential reuse.

pub mod config;
pub mod mcp;
pub mod openl;
pub mod server;
pub mod test_runs;

// Re-export commonly used types for convenience
pub use config::{BridgeConfig, CaptureSettings, PollSettings, RemoteSettings};
pub use openl::{BridgeError, OpenlClient, RemoteAuth, RulesGateway};
pub use server::{make_app, run_server, RequestsLoggingLevel, ServerConfig};
pub use test_runs::{ResultsPoller, SessionStore, TestRunLauncher};
