//! WebSocket MCP client for end-to-end tests
//!
//! Wraps tokio-tungstenite with JSON-RPC framing. When message shapes
//! change, update only this file.

use futures::{SinkExt, StreamExt};
use serde_json::{json, Value};
use tokio::net::TcpStream;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{connect_async, MaybeTlsStream, WebSocketStream};

pub struct McpTestClient {
    ws: WebSocketStream<MaybeTlsStream<TcpStream>>,
    next_id: i64,
}

impl McpTestClient {
    /// Connect without initializing; for testing the lifecycle itself.
    pub async fn connect(ws_url: &str) -> Self {
        let (ws, _) = connect_async(ws_url)
            .await
            .expect("Failed to connect to MCP endpoint");
        Self { ws, next_id: 1 }
    }

    /// Connect and run the initialize handshake. Most tests start here.
    pub async fn connect_and_initialize(ws_url: &str) -> Self {
        let mut client = Self::connect(ws_url).await;

        let response = client
            .request(
                "initialize",
                json!({
                    "protocolVersion": "2024-11-05",
                    "capabilities": {},
                    "clientInfo": {"name": "e2e-tests", "version": "0.0.0"}
                }),
            )
            .await;
        assert!(
            response.get("result").is_some(),
            "initialize failed: {}",
            response
        );

        client
    }

    /// Send one JSON-RPC request and wait for its response.
    pub async fn request(&mut self, method: &str, params: Value) -> Value {
        let id = self.next_id;
        self.next_id += 1;

        let payload = json!({
            "jsonrpc": "2.0",
            "id": id,
            "method": method,
            "params": params,
        });
        self.ws
            .send(Message::text(payload.to_string()))
            .await
            .expect("Failed to send request");

        loop {
            let message = self
                .ws
                .next()
                .await
                .expect("Connection closed while waiting for response")
                .expect("WebSocket error");

            if let Message::Text(text) = message {
                let value: Value = serde_json::from_str(text.as_str()).expect("Invalid JSON");
                if value.get("id") == Some(&json!(id)) {
                    return value;
                }
            }
        }
    }

    /// Call a tool; returns the full JSON-RPC response.
    pub async fn call_tool(&mut self, name: &str, arguments: Value) -> Value {
        self.request(
            "tools/call",
            json!({"name": name, "arguments": arguments}),
        )
        .await
    }

    /// Call a tool that must succeed and parse its text content as JSON.
    pub async fn call_tool_json(&mut self, name: &str, arguments: Value) -> Value {
        let response = self.call_tool(name, arguments).await;
        let text = response["result"]["content"][0]["text"]
            .as_str()
            .unwrap_or_else(|| panic!("no text content in {}", response));
        serde_json::from_str(text).expect("tool text content is not JSON")
    }

    /// Names advertised by tools/list.
    pub async fn tool_names(&mut self) -> Vec<String> {
        let response = self.request("tools/list", json!({})).await;
        response["result"]["tools"]
            .as_array()
            .unwrap_or_else(|| panic!("no tools in {}", response))
            .iter()
            .map(|t| t["name"].as_str().unwrap().to_string())
            .collect()
    }
}
