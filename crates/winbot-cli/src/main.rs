//! Winbot CLI — entry point.
//!
//! # Commands
//!
//! - `winbot list` — windows declared in the catalog
//! - `winbot render <NAME> [--ctx k=v]...` — assembled keyboard as JSON
//! - `winbot preview <NAME> [--ctx k=v]...` — dry-run send through the console transport
//! - `winbot send <NAME> --chat ID` — send through Telegram (feature `telegram`)
//! - `winbot status` — catalog and channel status

mod helpers;
mod status;
mod windows_cmd;

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};

// ─────────────────────────────────────────────
// CLI definition
// ─────────────────────────────────────────────

/// 🪟 Winbot — declarative chat windows
#[derive(Parser)]
#[command(name = "winbot", version, about, long_about = None)]
struct Cli {
    /// Window catalog (defaults to ~/.winbot/windows.json)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Enable debug logging
    #[arg(long, global = true, default_value_t = false)]
    logs: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List the windows in the catalog
    List,

    /// Print a window's assembled keyboard as JSON
    Render {
        /// Window name
        name: String,

        /// Template value, as key=value (repeatable)
        #[arg(long = "ctx", value_parser = helpers::parse_ctx)]
        ctx: Vec<(String, String)>,
    },

    /// Send a window through the console transport (nothing leaves the machine)
    Preview {
        /// Window name
        name: String,

        /// Template value, as key=value (repeatable)
        #[arg(long = "ctx", value_parser = helpers::parse_ctx)]
        ctx: Vec<(String, String)>,

        /// Chat id recorded in the preview
        #[arg(long, default_value = "0")]
        chat: String,
    },

    /// Send a window to a Telegram chat
    #[cfg(feature = "telegram")]
    Send {
        /// Window name
        name: String,

        /// Template value, as key=value (repeatable)
        #[arg(long = "ctx", value_parser = helpers::parse_ctx)]
        ctx: Vec<(String, String)>,

        /// Target chat id (defaults to telegram.defaultChatId)
        #[arg(long)]
        chat: Option<String>,
    },

    /// Show catalog and channel status
    Status,
}

// ─────────────────────────────────────────────
// Entrypoint
// ─────────────────────────────────────────────

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.logs);

    let config_path = cli.config.as_deref().map(helpers::expand_path);
    let config_path = config_path.as_deref();

    match cli.command {
        Commands::List => windows_cmd::list(config_path),
        Commands::Render { name, ctx } => windows_cmd::render(config_path, &name, ctx),
        Commands::Preview { name, ctx, chat } => {
            windows_cmd::preview(config_path, &name, ctx, &chat).await
        }
        #[cfg(feature = "telegram")]
        Commands::Send { name, ctx, chat } => {
            windows_cmd::send(config_path, &name, ctx, chat).await
        }
        Commands::Status => status::run(config_path),
    }
}

/// Initialize tracing/logging.
fn init_logging(verbose: bool) {
    use tracing_subscriber::EnvFilter;

    let filter = if verbose {
        EnvFilter::new("winbot=debug,winbot_core=debug,winbot_channels=debug,info")
    } else {
        EnvFilter::new("warn")
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .compact()
        .init();
}
