//! Kestrel - relays one contact's private messages to another.

mod app;

use std::path::PathBuf;
use std::time::Duration;

use clap::{Args, Parser, Subcommand};
use kestrel::{RelayConfig, RelayResult, DEFAULT_INTRODUCTION};
use observability::LogConfig;

/// Kestrel command-line interface.
#[derive(Parser)]
#[command(name = "kestrel")]
#[command(about = "Relay private messages from one contact to another")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    #[command(flatten)]
    overrides: Overrides,
}

/// Flags that override environment configuration.
#[derive(Args)]
struct Overrides {
    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, env = "KESTREL_LOG_LEVEL", global = true)]
    log_level: Option<String>,

    /// Append JSON logs to this file as well as stderr
    #[arg(long, env = "KESTREL_LOG_FILE", global = true)]
    log_file: Option<PathBuf>,

    /// Bot API token
    #[arg(long, env = "KESTREL_BOT_TOKEN", hide_env_values = true, global = true)]
    bot_token: Option<String>,

    /// Bot API base URL
    #[arg(long, env = "KESTREL_API_URL", global = true)]
    api_url: Option<String>,

    /// Contact whose messages are relayed (numeric id or @handle)
    #[arg(long, env = "KESTREL_SOURCE", global = true)]
    source: Option<String>,

    /// Contact that receives them (numeric id or @handle)
    #[arg(long, env = "KESTREL_DESTINATION", global = true)]
    destination: Option<String>,

    /// Max recent conversations scanned while warming
    #[arg(long, env = "KESTREL_PAGE_SIZE", global = true)]
    page_size: Option<usize>,

    /// Settle delay before re-probing a route, in milliseconds
    #[arg(long, env = "KESTREL_SETTLE_MS", global = true)]
    settle_ms: Option<u64>,

    /// Long-poll timeout, in seconds
    #[arg(long, env = "KESTREL_POLL_TIMEOUT_SECS", global = true)]
    poll_timeout_secs: Option<u64>,
}

impl Overrides {
    fn apply(self, mut config: RelayConfig) -> RelayConfig {
        if let Some(level) = self.log_level {
            config.log_level = level;
        }
        if let Some(path) = self.log_file {
            config.log_file = Some(path);
        }
        if let Some(token) = self.bot_token {
            config.bot_token = token;
        }
        if let Some(url) = self.api_url {
            config.api_base_url = url;
        }
        if let Some(source) = self.source {
            config.source = source;
        }
        if let Some(destination) = self.destination {
            config.destination = destination;
        }
        if let Some(page_size) = self.page_size {
            config.conversation_page_size = page_size;
        }
        if let Some(ms) = self.settle_ms {
            config.warm_settle_delay = Duration::from_millis(ms);
        }
        if let Some(secs) = self.poll_timeout_secs {
            config.poll_timeout = Duration::from_secs(secs);
        }
        config
    }
}

#[derive(Subcommand, Debug, PartialEq)]
enum Commands {
    /// Run the relay (default)
    Run,
    /// Check that the destination is reachable and warm its route
    Warm,
    /// Message the destination once so that a conversation exists
    InitContact {
        /// Introduction text to send
        #[arg(long, default_value = DEFAULT_INTRODUCTION)]
        notice: String,
    },
}

#[tokio::main]
async fn main() -> RelayResult<()> {
    let cli = Cli::parse();
    let config = cli.overrides.apply(RelayConfig::from_env());

    observability::init_with_config(LogConfig {
        service_name: "kestrel".into(),
        default_level: config.log_level.clone(),
        log_path: config.log_file.clone(),
        also_stderr: true,
    })?;

    if let Err(e) = config.validate() {
        tracing::error!(error = %e, "Invalid configuration");
        return Err(e);
    }

    match cli.command.unwrap_or(Commands::Run) {
        Commands::Run => app::run_relay(&config).await,
        Commands::Warm => app::warm_destination(&config).await,
        Commands::InitContact { notice } => app::init_contact(&config, &notice).await,
    }
}
