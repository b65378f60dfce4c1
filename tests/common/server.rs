//! Test server lifecycle management
//!
//! Spawns the bridge on a random port, wired to a fake remote service.
//! Poll settings are tightened so wait-loop tests finish in milliseconds.

use std::sync::Arc;

use tokio::net::TcpListener;

use openl_mcp_bridge::config::{
    BridgeConfig, CaptureSettings, PollSettings, RemoteSettings,
};
use openl_mcp_bridge::mcp::handler::create_mcp_state;
use openl_mcp_bridge::openl::{OpenlClient, RemoteAuth};
use openl_mcp_bridge::server::state::ServerState;
use openl_mcp_bridge::server::{make_app, RequestsLoggingLevel, ServerConfig};
use openl_mcp_bridge::test_runs::SessionStore;

/// Bridge server instance bound to an ephemeral port.
pub struct TestServer {
    /// Base URL for HTTP requests (e.g., "http://127.0.0.1:12345")
    pub base_url: String,

    /// The port the server is listening on
    pub port: u16,

    serve_handle: tokio::task::JoinHandle<()>,
}

impl TestServer {
    /// Spawn a bridge pointed at the given remote service URL.
    pub async fn spawn(remote_url: String) -> Self {
        Self::spawn_with(remote_url, false).await
    }

    /// Same, optionally in read-only mode.
    pub async fn spawn_with(remote_url: String, read_only: bool) -> Self {
        let bridge = BridgeConfig {
            remote: RemoteSettings {
                base_url: remote_url,
                timeout_secs: 5,
                auth: RemoteAuth::None,
            },
            capture: CaptureSettings::default(),
            poll: PollSettings {
                initial_delay_ms: 5,
                max_delay_ms: 20,
                backoff_multiplier: 2.0,
                max_wait_secs: 5,
            },
            read_only,
        };

        let gateway = Arc::new(
            OpenlClient::new(
                bridge.remote.base_url.clone(),
                bridge.remote.timeout_secs,
                bridge.remote.auth.clone(),
                bridge.capture.execution_id_header.clone(),
            )
            .expect("Failed to build gateway client"),
        );
        let sessions = Arc::new(SessionStore::new(bridge.capture.to_header_capture()));
        let mcp_state = Arc::new(create_mcp_state());

        let state = ServerState::new(
            ServerConfig {
                requests_logging_level: RequestsLoggingLevel::None,
                port: 0,
            },
            bridge,
            gateway,
            sessions,
            mcp_state,
        );
        let app = make_app(state);

        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind test server");
        let port = listener.local_addr().unwrap().port();

        let serve_handle = tokio::spawn(async move {
            axum::serve(listener, app).await.expect("test server died");
        });

        TestServer {
            base_url: format!("http://127.0.0.1:{}", port),
            port,
            serve_handle,
        }
    }

    /// WebSocket URL of the MCP endpoint.
    pub fn ws_url(&self) -> String {
        format!("ws://127.0.0.1:{}/v1/mcp", self.port)
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.serve_handle.abort();
    }
}
