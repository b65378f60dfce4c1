use axum::extract::FromRef;

use crate::config::BridgeConfig;
use crate::mcp::context::ToolContext;
use crate::mcp::handler::McpState;
use crate::openl::RulesGateway;
use crate::test_runs::{ResultsPoller, SessionStore, TestRunLauncher};
use std::sync::Arc;
use std::time::Instant;

use super::ServerConfig;

pub type GuardedGateway = Arc<dyn RulesGateway>;
pub type GuardedSessionStore = Arc<SessionStore>;
pub type GuardedMcpState = Arc<McpState>;

#[derive(Clone)]
pub struct ServerState {
    pub config: ServerConfig,
    pub bridge: BridgeConfig,
    pub start_time: Instant,
    pub gateway: GuardedGateway,
    pub sessions: GuardedSessionStore,
    pub launcher: Arc<TestRunLauncher>,
    pub poller: Arc<ResultsPoller>,
    pub hash: String,
    pub mcp_state: GuardedMcpState,
}

impl ServerState {
    /// Assemble the full state from the two injected roots: the gateway
    /// and the session store. Launcher and poller share both.
    pub fn new(
        config: ServerConfig,
        bridge: BridgeConfig,
        gateway: GuardedGateway,
        sessions: GuardedSessionStore,
        mcp_state: GuardedMcpState,
    ) -> Self {
        let launcher = Arc::new(TestRunLauncher::new(gateway.clone(), sessions.clone()));
        let poller = Arc::new(ResultsPoller::new(gateway.clone(), sessions.clone()));

        ServerState {
            config,
            bridge,
            start_time: Instant::now(),
            gateway,
            sessions,
            launcher,
            poller,
            hash: env!("GIT_HASH").to_string(),
            mcp_state,
        }
    }

    /// Context handed to tool and resource handlers.
    pub fn tool_context(&self) -> ToolContext {
        ToolContext {
            gateway: self.gateway.clone(),
            sessions: self.sessions.clone(),
            launcher: self.launcher.clone(),
            poller: self.poller.clone(),
            config: self.bridge.clone(),
            server_version: format!("{}-{}", env!("CARGO_PKG_VERSION"), self.hash),
            start_time: self.start_time,
        }
    }
}

impl FromRef<ServerState> for GuardedMcpState {
    fn from_ref(input: &ServerState) -> Self {
        input.mcp_state.clone()
    }
}

impl FromRef<ServerState> for ServerConfig {
    fn from_ref(input: &ServerState) -> Self {
        input.config.clone()
    }
}

impl FromRef<ServerState> for GuardedGateway {
    fn from_ref(input: &ServerState) -> Self {
        input.gateway.clone()
    }
}

impl FromRef<ServerState> for GuardedSessionStore {
    fn from_ref(input: &ServerState) -> Self {
        input.sessions.clone()
    }
}
