use anyhow::{bail, Context, Result};
use serde::Deserialize;
use std::path::Path;

use crate::openl::RemoteAuth;

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
pub struct FileConfig {
    // Core settings (can override CLI)
    pub openl_url: Option<String>,
    pub timeout_secs: Option<u64>,
    pub port: Option<u16>,
    pub logging_level: Option<String>,
    pub read_only: Option<bool>,

    // Feature configs
    pub auth: Option<AuthConfig>,
    pub capture: Option<CaptureConfig>,
    pub poll: Option<PollConfig>,
}

#[derive(Debug, Deserialize, Default, Clone)]
#[serde(default)]
pub struct AuthConfig {
    pub username: Option<String>,
    pub password: Option<String>,
    pub token: Option<String>,
}

impl AuthConfig {
    /// Resolve to concrete credentials. A token and a username together
    /// are ambiguous and rejected.
    pub fn to_remote_auth(&self) -> Result<RemoteAuth> {
        match (&self.token, &self.username) {
            (Some(_), Some(_)) => {
                bail!("config error: set either auth.token or auth.username/password, not both")
            }
            (Some(token), None) => Ok(RemoteAuth::Token(token.clone())),
            (None, Some(username)) => {
                let password = self
                    .password
                    .clone()
                    .context("config error: auth.username set without auth.password")?;
                Ok(RemoteAuth::Basic {
                    username: username.clone(),
                    password,
                })
            }
            (None, None) => Ok(RemoteAuth::None),
        }
    }
}

#[derive(Debug, Deserialize, Default, Clone)]
#[serde(default)]
pub struct CaptureConfig {
    pub execution_id_header: Option<String>,
    pub cookie_header: Option<String>,
}

#[derive(Debug, Deserialize, Default, Clone)]
#[serde(default)]
pub struct PollConfig {
    pub initial_delay_ms: Option<u64>,
    pub max_delay_ms: Option<u64>,
    pub backoff_multiplier: Option<f64>,
    pub max_wait_secs: Option<u64>,
}

impl FileConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {:?}", path))?;
        toml::from_str(&content).with_context(|| format!("Failed to parse config file: {:?}", path))
    }
}
