//! Bridge configuration.
//!
//! CLI flags provide the basics; a TOML file adds credentials and tuning.
//! File values fill in whatever the CLI left unset.

mod file_config;

pub use file_config::FileConfig;

use crate::openl::RemoteAuth;
use crate::test_runs::{HeaderCapture, WaitPolicy};

/// Effective configuration of the bridge process.
#[derive(Debug, Clone)]
pub struct BridgeConfig {
    pub remote: RemoteSettings,
    pub capture: CaptureSettings,
    pub poll: PollSettings,
    /// Hide Write-category tools and refuse their invocation.
    pub read_only: bool,
}

impl BridgeConfig {
    /// Credential-free view for introspection surfaces.
    pub fn sanitized_json(&self) -> serde_json::Value {
        serde_json::json!({
            "remote": {
                "base_url": self.remote.base_url,
                "timeout_secs": self.remote.timeout_secs,
                "auth_mode": self.remote.auth.mode(),
            },
            "capture": {
                "execution_id_header": self.capture.execution_id_header,
                "cookie_header": self.capture.cookie_header,
            },
            "poll": {
                "initial_delay_ms": self.poll.initial_delay_ms,
                "max_delay_ms": self.poll.max_delay_ms,
                "backoff_multiplier": self.poll.backoff_multiplier,
                "max_wait_secs": self.poll.max_wait_secs,
            },
            "read_only": self.read_only,
        })
    }
}

/// Connection settings for the rules service.
#[derive(Debug, Clone)]
pub struct RemoteSettings {
    pub base_url: String,
    pub timeout_secs: u64,
    pub auth: RemoteAuth,
}

/// Allow-list of session headers to capture from a start response.
#[derive(Debug, Clone)]
pub struct CaptureSettings {
    pub execution_id_header: String,
    pub cookie_header: String,
}

impl Default for CaptureSettings {
    fn default() -> Self {
        let capture = HeaderCapture::default();
        Self {
            execution_id_header: capture.execution_id_header,
            cookie_header: capture.cookie_header,
        }
    }
}

impl CaptureSettings {
    pub fn to_header_capture(&self) -> HeaderCapture {
        HeaderCapture {
            execution_id_header: self.execution_id_header.clone(),
            cookie_header: self.cookie_header.clone(),
        }
    }
}

/// Wait-loop backoff settings.
#[derive(Debug, Clone)]
pub struct PollSettings {
    pub initial_delay_ms: u64,
    pub max_delay_ms: u64,
    pub backoff_multiplier: f64,
    pub max_wait_secs: u64,
}

impl Default for PollSettings {
    fn default() -> Self {
        let policy = WaitPolicy::default();
        Self {
            initial_delay_ms: policy.initial_delay_ms,
            max_delay_ms: policy.max_delay_ms,
            backoff_multiplier: policy.backoff_multiplier,
            max_wait_secs: policy.max_wait_secs,
        }
    }
}

impl PollSettings {
    /// Wait policy with an optional per-call override of the deadline.
    pub fn wait_policy(&self, max_wait_secs: Option<u64>) -> WaitPolicy {
        WaitPolicy {
            initial_delay_ms: self.initial_delay_ms,
            max_delay_ms: self.max_delay_ms,
            backoff_multiplier: self.backoff_multiplier,
            max_wait_secs: max_wait_secs.unwrap_or(self.max_wait_secs),
        }
    }
}
