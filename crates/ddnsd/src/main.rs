// # ddnsd - DDNS Daemon
//
// Thin integration layer: all synchronization logic lives in ddns-core,
// the provider and address source crates. The daemon is responsible for:
// 1. Parsing the command line
// 2. Initializing logging
// 3. Loading configuration (YAML file, then `DDNS_*` environment variables)
// 4. Building the address source, record store and metrics sink
// 5. Running one pass (`run`) or the retry loop (`serve`)
//
// ## Example
//
// ```bash
// export DDNS_URL=ifconfig.me/ip
// export DDNS_CLOUDFLARE_API_TOKEN=your_token
// export DDNS_CLOUDFLARE_ZONE_ID=your_zone
// export DDNS_CLOUDFLARE_RECORDS=example.com,www.example.com
//
// ddnsd serve
// ```

mod config;
mod prometheus;

use anyhow::{Context, Result};
use chrono::Utc;
use clap::{Parser, Subcommand};
use ddns_core::{
    AddressSource, AddressSourceConfig, DdnsConfig, MetricsSink, NoopMetricsSink, RecordStore,
    Scheduler, StaticAddressSource, Synchronizer,
};
use ddns_ip_http::UrlAddressSource;
use ddns_provider_cloudflare::CloudflareStore;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use tracing::{Level, error, info};
use tracing_subscriber::FmtSubscriber;

#[cfg(unix)]
use tokio::signal::unix::{SignalKind, signal};

const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Exit codes for different termination scenarios
///
/// These codes follow systemd conventions:
/// - 0: Clean shutdown
/// - 1: Configuration or startup error
/// - 2: Runtime error (unexpected)
#[derive(Debug, Clone, Copy)]
enum DdnsExitCode {
    /// Clean shutdown (normal exit)
    CleanShutdown = 0,
    /// Configuration error or startup failure
    ConfigError = 1,
    /// Runtime error (failed pass or metrics server failure)
    RuntimeError = 2,
}

impl From<DdnsExitCode> for ExitCode {
    fn from(code: DdnsExitCode) -> Self {
        ExitCode::from(code as u8)
    }
}

/// Keeps DNS A records pointed at this host's public address
#[derive(Debug, Parser)]
#[command(name = "ddnsd", version)]
struct Cli {
    /// Path to the YAML config file
    #[arg(long, global = true, default_value = "./config.yml")]
    config: PathBuf,

    /// Log level: trace, debug, info, warn, error
    #[arg(long, global = true, env = "DDNS_LOG_LEVEL", default_value = "info")]
    log_level: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Synchronize records forever, serving metrics when enabled
    Serve,
    /// Perform a single synchronization pass and exit
    Run,
}

fn parse_log_level(level: &str) -> Result<Level> {
    match level.to_lowercase().as_str() {
        "trace" => Ok(Level::TRACE),
        "debug" => Ok(Level::DEBUG),
        "info" => Ok(Level::INFO),
        "warn" => Ok(Level::WARN),
        "error" => Ok(Level::ERROR),
        _ => anyhow::bail!(
            "Log level '{}' is not valid. \
            Valid levels: trace, debug, info, warn, error",
            level
        ),
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let log_level = match parse_log_level(&cli.log_level) {
        Ok(level) => level,
        Err(e) => {
            eprintln!("Configuration error: {}", e);
            return DdnsExitCode::ConfigError.into();
        }
    };

    let subscriber = FmtSubscriber::builder().with_max_level(log_level).finish();

    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("Failed to set tracing subscriber: {}", e);
        return DdnsExitCode::ConfigError.into();
    }

    info!("Running ddnsd version {}", VERSION);

    let config = match config::load(&cli.config) {
        Ok(cfg) => cfg,
        Err(e) => {
            error!("Configuration error: {:#}", e);
            return DdnsExitCode::ConfigError.into();
        }
    };

    let rt = match tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
    {
        Ok(runtime) => runtime,
        Err(e) => {
            error!("Failed to create tokio runtime: {}", e);
            return DdnsExitCode::RuntimeError.into();
        }
    };

    let result = rt.block_on(async {
        match cli.command {
            Command::Serve => serve(config).await,
            Command::Run => run_once(config).await,
        }
    });

    result.into()
}

/// Build the synchronizer from validated configuration
fn build_synchronizer(config: &DdnsConfig, sink: Arc<dyn MetricsSink>) -> Result<Synchronizer> {
    let source: Box<dyn AddressSource> = match &config.address_source {
        Some(AddressSourceConfig::Static { address }) => {
            Box::new(StaticAddressSource::new(address.clone()))
        }
        Some(url_config @ AddressSourceConfig::Url { .. }) => Box::new(
            UrlAddressSource::from_config(url_config)
                .context("Failed to build url address source")?,
        ),
        None => anyhow::bail!("No address source was configured"),
    };

    let provider = config
        .provider
        .as_ref()
        .context("No DNS provider was configured")?;
    let store: Box<dyn RecordStore> = Box::new(
        CloudflareStore::from_config(provider).context("Failed to build Cloudflare store")?,
    );

    info!(
        "Using {} address source and {} provider for {} record(s)",
        source.source_name(),
        store.provider_name(),
        provider.records().len()
    );

    Ok(Synchronizer::new(source, store, sink))
}

/// Perform a single pass
async fn run_once(config: DdnsConfig) -> DdnsExitCode {
    let synchronizer = match build_synchronizer(&config, Arc::new(NoopMetricsSink)) {
        Ok(s) => s,
        Err(e) => {
            error!("Startup error: {:#}", e);
            return DdnsExitCode::ConfigError;
        }
    };

    match synchronizer.sync_once().await {
        Ok(report) => {
            info!(
                "Synchronized {} record(s) to {}, {} updated",
                report.records.len(),
                report.address,
                report.updated_count()
            );
            DdnsExitCode::CleanShutdown
        }
        Err(e) => {
            error!("Synchronization failed: {}", e);
            DdnsExitCode::RuntimeError
        }
    }
}

/// Run the retry loop until a shutdown signal arrives
async fn serve(config: DdnsConfig) -> DdnsExitCode {
    let handle = match prometheus::init_metrics() {
        Ok(h) => h,
        Err(e) => {
            error!("Startup error: {:#}", e);
            return DdnsExitCode::ConfigError;
        }
    };
    prometheus::record_startup(VERSION, Utc::now());

    let synchronizer = match build_synchronizer(&config, Arc::new(prometheus::PrometheusSink)) {
        Ok(s) => s,
        Err(e) => {
            error!("Startup error: {:#}", e);
            return DdnsExitCode::ConfigError;
        }
    };

    let metrics_server = if config.metrics_server.enable {
        let listen = config.metrics_server.listen_addr();
        let listener = match tokio::net::TcpListener::bind(&listen).await {
            Ok(l) => l,
            Err(e) => {
                error!("Could not listen on {}: {}", listen, e);
                return DdnsExitCode::ConfigError;
            }
        };
        info!("Metrics endpoint listening on {}", listen);
        Some(tokio::spawn(async move {
            axum::serve(listener, prometheus::router(handle)).await
        }))
    } else {
        None
    };

    let scheduler = Scheduler::new(
        synchronizer,
        config.wait_interval(),
        config.retry_interval(),
    );

    tokio::select! {
        never = scheduler.run() => match never {},
        result = async {
            match metrics_server {
                Some(task) => task.await,
                None => std::future::pending().await,
            }
        } => {
            match result {
                Ok(Ok(())) => error!("Metrics server stopped unexpectedly"),
                Ok(Err(e)) => error!("Metrics server error: {}", e),
                Err(e) => error!("Metrics server task failed: {}", e),
            }
            DdnsExitCode::RuntimeError
        }
        signal = wait_for_shutdown() => match signal {
            Ok(name) => {
                info!("Received shutdown signal: {}", name);
                info!("Shutting down daemon");
                DdnsExitCode::CleanShutdown
            }
            Err(e) => {
                error!("Shutdown error: {}", e);
                DdnsExitCode::RuntimeError
            }
        },
    }
}

/// Wait for shutdown signals (SIGTERM, SIGINT)
///
/// # Returns
///
/// Returns the name of the signal received.
#[cfg(unix)]
async fn wait_for_shutdown() -> Result<&'static str> {
    let mut sigterm = signal(SignalKind::terminate())
        .map_err(|e| anyhow::anyhow!("Failed to setup SIGTERM handler: {}", e))?;
    let mut sigint = signal(SignalKind::interrupt())
        .map_err(|e| anyhow::anyhow!("Failed to setup SIGINT handler: {}", e))?;

    Ok(tokio::select! {
        _ = sigterm.recv() => "SIGTERM",
        _ = sigint.recv() => "SIGINT",
    })
}

/// Wait for shutdown signals (SIGINT only)
///
/// Fallback implementation for non-Unix platforms.
#[cfg(not(unix))]
async fn wait_for_shutdown() -> Result<&'static str> {
    tokio::signal::ctrl_c()
        .await
        .map_err(|e| anyhow::anyhow!("Failed to wait for CTRL-C: {}", e))?;
    Ok("SIGINT")
}
