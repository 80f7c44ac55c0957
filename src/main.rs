//! Telegram Mass Sender CLI - main entry point

use clap::{Parser, Subcommand};
use std::fs::OpenOptions;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::time::Instant;
use tracing_subscriber::prelude::*;
use tracing_subscriber::{fmt, EnvFilter};

use telegram_sender::commands::{self, SendArgs};
use telegram_sender::sender::TracingReporter;
use telegram_sender::{metrics, Config};
use tracing::warn;

#[derive(Parser)]
#[command(name = "telegram_sender")]
#[command(about = "Telegram mass sender with randomized messages", long_about = None)]
#[command(version)]
struct Cli {
    /// Path to config.yml (default: ./config.yml, then ../config.yml)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Address to expose Prometheus metrics (e.g., 0.0.0.0:9898)
    #[arg(long, env = "METRICS_ADDR", global = true)]
    metrics_addr: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Send messages to all groups in cycles
    Run {
        /// Number of cycles: 1-998, 999 runs until Ctrl+C, 0 exits (prompted when omitted)
        #[arg(long)]
        cycles: Option<u32>,

        /// Concurrent workers, 1-10 (prompted when omitted)
        #[arg(short, long)]
        workers: Option<usize>,

        /// Groups file, one per line
        #[arg(short, long)]
        groups: Option<PathBuf>,

        /// Messages file, blank-line separated
        #[arg(short, long)]
        messages: Option<PathBuf>,

        /// Go through the motions without touching Telegram
        #[arg(long, default_value_t = false)]
        dry_run: bool,
    },

    /// Validate the groups and messages files
    Check {
        /// Groups file, one per line
        #[arg(short, long)]
        groups: Option<PathBuf>,

        /// Messages file, blank-line separated
        #[arg(short, long)]
        messages: Option<PathBuf>,
    },
}

impl Commands {
    fn name(&self) -> &'static str {
        match self {
            Commands::Run { .. } => "run",
            Commands::Check { .. } => "check",
        }
    }
}

/// Log to stdout and append plain-text lines to `log_file`.
fn init_logging(log_file: &Path) -> anyhow::Result<()> {
    let file_layer = match OpenOptions::new().create(true).append(true).open(log_file) {
        Ok(file) => Some(fmt::layer().with_ansi(false).with_writer(Mutex::new(file))),
        Err(err) => {
            eprintln!("⚠️ Cannot open log file {}: {}", log_file.display(), err);
            None
        }
    };

    tracing_subscriber::registry()
        .with(EnvFilter::from_default_env().add_directive("telegram_sender=info".parse()?))
        .with(fmt::layer())
        .with(file_layer)
        .init();
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env for local development
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();
    let config = Config::load(cli.config.as_deref())?;

    init_logging(&config.log_file)?;

    if let Some(addr) = cli.metrics_addr.as_deref() {
        match addr.parse::<SocketAddr>() {
            Ok(socket) => metrics::spawn_metrics_server(socket),
            Err(err) => warn!(%addr, "Invalid metrics address: {}", err),
        }
    }

    let command_name = cli.command.name();
    metrics::record_command_start(command_name);
    let start = Instant::now();
    let result = execute_command(cli.command, config).await;
    metrics::record_command_result(command_name, start.elapsed(), result.is_ok());
    result
}

async fn execute_command(command: Commands, config: Config) -> anyhow::Result<()> {
    match command {
        Commands::Run {
            cycles,
            workers,
            groups,
            messages,
            dry_run,
        } => {
            let args = SendArgs {
                cycles,
                workers,
                groups,
                messages,
                dry_run,
            };
            commands::send::run(config, args).await?;
        }
        Commands::Check { groups, messages } => {
            let groups = groups.unwrap_or_else(|| config.groups_file.clone());
            let messages = messages.unwrap_or_else(|| config.messages_file.clone());
            commands::check::run(&groups, &messages, &TracingReporter)?;
        }
    }

    Ok(())
}
