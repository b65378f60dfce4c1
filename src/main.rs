use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, level_filters::LevelFilter};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use openl_mcp_bridge::config::{
    BridgeConfig, CaptureSettings, FileConfig, PollSettings, RemoteSettings,
};
use openl_mcp_bridge::mcp::handler::create_mcp_state;
use openl_mcp_bridge::openl::{OpenlClient, RemoteAuth};
use openl_mcp_bridge::server::state::ServerState;
use openl_mcp_bridge::server::{run_server, RequestsLoggingLevel, ServerConfig};
use openl_mcp_bridge::test_runs::SessionStore;

#[derive(Parser, Debug)]
struct CliArgs {
    /// Base URL of the OpenL Studio REST service. Can also be set as
    /// `openl_url` in the config file.
    #[clap(long)]
    pub openl_url: Option<String>,

    /// Path to a TOML config file (credentials, poll tuning).
    #[clap(long)]
    pub config: Option<PathBuf>,

    /// The port to listen on.
    #[clap(short, long, default_value_t = 3005)]
    pub port: u16,

    /// The level of logging to perform on each request.
    #[clap(long, default_value = "path")]
    pub logging_level: RequestsLoggingLevel,

    /// Timeout in seconds for remote requests.
    #[clap(long, default_value_t = 30)]
    pub timeout_secs: u64,

    /// Hide tools that modify remote state and refuse their invocation.
    #[clap(long, default_value_t = false)]
    pub read_only: bool,
}

fn resolve_config(cli_args: &CliArgs, file: FileConfig) -> Result<(BridgeConfig, ServerConfig)> {
    let base_url = cli_args
        .openl_url
        .clone()
        .or(file.openl_url)
        .context("no OpenL service URL: pass --openl-url or set openl_url in the config file")?;

    let auth = match &file.auth {
        Some(auth) => auth.to_remote_auth()?,
        None => RemoteAuth::None,
    };

    let mut capture = CaptureSettings::default();
    if let Some(file_capture) = file.capture {
        if let Some(header) = file_capture.execution_id_header {
            capture.execution_id_header = header;
        }
        if let Some(header) = file_capture.cookie_header {
            capture.cookie_header = header;
        }
    }

    let mut poll = PollSettings::default();
    if let Some(file_poll) = file.poll {
        if let Some(value) = file_poll.initial_delay_ms {
            poll.initial_delay_ms = value;
        }
        if let Some(value) = file_poll.max_delay_ms {
            poll.max_delay_ms = value;
        }
        if let Some(value) = file_poll.backoff_multiplier {
            poll.backoff_multiplier = value;
        }
        if let Some(value) = file_poll.max_wait_secs {
            poll.max_wait_secs = value;
        }
    }

    let bridge = BridgeConfig {
        remote: RemoteSettings {
            base_url,
            timeout_secs: file.timeout_secs.unwrap_or(cli_args.timeout_secs),
            auth,
        },
        capture,
        poll,
        read_only: file.read_only.unwrap_or(cli_args.read_only),
    };

    let requests_logging_level = match file.logging_level {
        Some(value) => clap::ValueEnum::from_str(&value, true)
            .map_err(|e| anyhow::anyhow!("config error: bad logging_level: {}", e))?,
        None => cli_args.logging_level.clone(),
    };

    let server = ServerConfig {
        requests_logging_level,
        port: file.port.unwrap_or(cli_args.port),
    };

    Ok((bridge, server))
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli_args = CliArgs::parse();

    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(
            EnvFilter::builder()
                .with_default_directive(LevelFilter::INFO.into())
                .with_env_var("LOG_LEVEL")
                .from_env_lossy(),
        )
        .try_init()
        .unwrap();

    let file_config = match &cli_args.config {
        Some(path) => FileConfig::load(path)?,
        None => FileConfig::default(),
    };

    let (bridge_config, server_config) = resolve_config(&cli_args, file_config)?;

    info!(
        "Connecting to OpenL service at {} (auth: {})",
        bridge_config.remote.base_url,
        bridge_config.remote.auth.mode()
    );

    let gateway = Arc::new(OpenlClient::new(
        bridge_config.remote.base_url.clone(),
        bridge_config.remote.timeout_secs,
        bridge_config.remote.auth.clone(),
        bridge_config.capture.execution_id_header.clone(),
    )?);

    let sessions = Arc::new(SessionStore::new(bridge_config.capture.to_header_capture()));
    let mcp_state = Arc::new(create_mcp_state());

    if bridge_config.read_only {
        info!("Running in read-only mode, write tools are disabled");
    }

    let state = ServerState::new(
        server_config.clone(),
        bridge_config,
        gateway,
        sessions,
        mcp_state,
    );

    let shutdown = tokio_util::sync::CancellationToken::new();
    let signal_shutdown = shutdown.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("Received SIGINT, shutting down");
            signal_shutdown.cancel();
        }
    });

    info!("Ready to serve at port {}!", server_config.port);
    run_server(state, shutdown).await
}
