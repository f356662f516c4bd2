//! Gaugedash - Animated resource gauges for a remote metrics server
//!
//! Logs in to a host metrics server, polls its snapshot endpoint and shows
//! CPU, memory, disk and network load as eased gauges in the terminal.

mod client;
mod config;
mod core;
mod metrics;
mod ui;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing::Level;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use crate::client::{HttpTransport, SampleSource, Transport};
use crate::config::Config;
use crate::core::app::App;
use crate::core::dashboard::{CycleOutcome, DashboardController};
use crate::core::events::poll_tick_interval;
use crate::metrics::ChannelDescriptor;

#[derive(Parser)]
#[command(name = "gaugedash")]
#[command(author = "Gaugedash Contributors")]
#[command(version = "0.1.0")]
#[command(about = "Animated resource gauges for a remote metrics server", long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Configuration file path
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Server host, overrides the config file
    #[arg(long, env = "GAUGEDASH_HOST")]
    host: Option<String>,

    /// Server port, overrides the config file
    #[arg(long, env = "GAUGEDASH_PORT")]
    port: Option<u16>,

    /// Login id, overrides the config file
    #[arg(long, env = "GAUGEDASH_ID")]
    id: Option<String>,

    /// Login password, overrides the config file
    #[arg(long, env = "GAUGEDASH_PASSWORD", hide_env_values = true)]
    password: Option<String>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Write a default configuration file
    Init {
        /// Force overwrite existing configuration
        #[arg(short, long)]
        force: bool,
    },

    /// Fetch one snapshot and print every gauge as text
    Once {
        /// Give up after this many seconds without a snapshot
        #[arg(short, long, default_value = "10")]
        wait: u64,
    },

    /// Send a JSON body to a server path with the session headers
    Post {
        /// Request path, e.g. /v1/settings
        path: String,
        /// JSON body
        body: String,
    },
}

impl Cli {
    fn apply_overrides(&self, config: &mut Config) {
        if let Some(host) = &self.host {
            config.server.host = host.clone();
        }
        if let Some(port) = self.port {
            config.server.port = port;
        }
        if let Some(id) = &self.id {
            config.server.id = id.clone();
        }
        if let Some(password) = &self.password {
            config.server.password = password.clone();
        }
    }
}

fn setup_logging(verbosity: u8) -> Result<tracing_appender::non_blocking::WorkerGuard> {
    let level = match verbosity {
        0 => Level::WARN,
        1 => Level::INFO,
        2 => Level::DEBUG,
        _ => Level::TRACE,
    };

    let filter = EnvFilter::from_default_env().add_directive(level.into());

    // Log to a file so the TUI is never overwritten
    let log_dir = dirs::cache_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("gaugedash")
        .join("logs");

    std::fs::create_dir_all(&log_dir)?;

    let file_appender = tracing_appender::rolling::daily(&log_dir, "gaugedash.log");
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(non_blocking).with_ansi(false))
        .init();

    Ok(guard)
}

fn load_config(path: Option<PathBuf>) -> Result<Config> {
    let path = path.or_else(|| Config::default_path().filter(|p| p.exists()));
    match path {
        Some(path) => Config::load(&path)
            .with_context(|| format!("failed to read config {}", path.display())),
        None => Ok(Config::default()),
    }
}

/// Log in and return the transport, its base url and the sample source.
async fn connect(config: &Config) -> Result<(Arc<dyn Transport>, String, SampleSource)> {
    let http = HttpTransport::new(
        &config.server.scheme,
        &config.server.host,
        config.server.port,
        config.polling.timeout(),
    )?;
    let endpoint = http.base_url().to_string();
    let transport: Arc<dyn Transport> = Arc::new(http);
    let source = SampleSource::connect(
        transport.clone(),
        &config.credentials(),
        config.poll_settings(),
    )
    .await;
    Ok((transport, endpoint, source))
}

fn build_controller(config: &Config, source: SampleSource) -> DashboardController {
    DashboardController::with_descriptors(
        source,
        config.polling.path.clone(),
        ChannelDescriptor::standard_set(config.polling.disk_index, config.polling.network_index),
        config.display.easing,
    )
    .reset_peaks_on_reconnect(config.polling.reset_peaks_on_reconnect)
}

/// Poll until one snapshot lands, then print every channel.
async fn print_once(
    mut controller: DashboardController,
    wait: Duration,
    tick: Duration,
) -> Result<()> {
    let waited = tokio::time::timeout(wait, async {
        loop {
            match controller.data_cycle().await {
                Ok(CycleOutcome::Updated { .. }) => return Ok(()),
                Ok(CycleOutcome::NotDue | CycleOutcome::Transient { .. }) => {
                    tokio::time::sleep(tick).await;
                }
                Err(e) => return Err(e),
            }
        }
    })
    .await;

    let result = match waited {
        Ok(Ok(())) => {
            for channel in controller.channels() {
                println!("{:<20} {}", channel.label(), channel.value_text());
            }
            Ok(())
        }
        Ok(Err(e)) => Err(anyhow::Error::new(e).context("polling stopped")),
        Err(_) => Err(anyhow::anyhow!("no snapshot within {}s", wait.as_secs())),
    };

    controller.shutdown().await;
    result
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Keep the guard alive for the duration of the program
    let _logging_guard = setup_logging(cli.verbose)?;

    if let Some(Commands::Init { force }) = &cli.command {
        let path = match &cli.config {
            Some(path) => path.clone(),
            None => Config::default_path().context("no config directory on this platform")?,
        };
        return config::init_config(&path, *force);
    }

    let mut config = load_config(cli.config.clone())?;
    cli.apply_overrides(&mut config);
    config.validate()?;

    let (transport, endpoint, source) = connect(&config).await?;

    match cli.command {
        Some(Commands::Once { wait }) => {
            let tick = poll_tick_interval(config.poll_settings().interval);
            let controller = build_controller(&config, source);
            print_once(controller, Duration::from_secs(wait), tick).await?;
        }
        Some(Commands::Post { path, body }) => {
            let body: serde_json::Value =
                serde_json::from_str(&body).context("body is not valid JSON")?;
            source.post(&path, &body).await;
            source.teardown().await;
        }
        Some(Commands::Init { .. }) => {}
        None => {
            let controller = build_controller(&config, source);
            let app = App::new(controller, transport, endpoint, config)?;
            app.run().await?;
        }
    }

    Ok(())
}
