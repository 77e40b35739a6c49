//! trace-viz - native viewer for live agent traces.
//!
//! Opens a window that follows a trace events server over WebSocket and
//! draws the agent's calls as a graph.

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

mod commands;
mod config;

use commands::{config as config_cmd, viz};
use config::{validate_ws_url, Config};

/// Default log filter when `RUST_LOG` is unset.
const DEFAULT_FILTER: &str = "agent_trace_viz=info,agent_trace_core=info,trace_viz=info";

/// trace-viz - watch an agent's LLM, tool and MCP calls as they happen.
///
/// Run `trace-viz` to connect to the configured events server.
#[derive(Parser, Debug)]
#[command(
    name = "trace-viz",
    author,
    version,
    about = "Live graph viewer for agent traces",
    long_about = None
)]
struct Cli {
    /// Events server WebSocket URL (overrides config and TRACE_VIZ_WS_URL).
    #[arg(long, global = true)]
    url: Option<String>,

    /// Preload a sample trace before any event arrives.
    #[arg(long)]
    demo: bool,

    /// Start with the light theme.
    #[arg(long)]
    light: bool,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Suppress all output except errors
    #[arg(short, long, global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

/// Available CLI commands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Manage CLI configuration.
    #[command(subcommand)]
    Config(ConfigCommands),
}

/// Configuration commands.
#[derive(Subcommand, Debug)]
enum ConfigCommands {
    /// Show the effective configuration.
    Show,

    /// Print the config file location.
    Path,

    /// Save the events server URL to the config file.
    SetUrl {
        /// ws:// or wss:// URL.
        url: String,
    },
}

fn init_tracing(verbose: bool, quiet: bool) {
    let filter = if quiet {
        EnvFilter::new("error")
    } else if verbose {
        EnvFilter::new("agent_trace_viz=debug,agent_trace_core=debug,trace_viz=debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER))
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_target(false))
        .with(filter)
        .init();
}

fn main() -> Result<()> {
    // Load .env file if present (silently ignore if missing)
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();
    init_tracing(cli.verbose, cli.quiet);

    match cli.command {
        Some(Commands::Config(command)) => match command {
            ConfigCommands::Show => {
                let mut config = Config::load()?;
                if let Some(url) = cli.url {
                    config.ws_url = url;
                }
                config_cmd::show(&config)?;
            }
            ConfigCommands::Path => {
                config_cmd::path()?;
            }
            ConfigCommands::SetUrl { url } => {
                let mut config = Config::load_file()?;
                config_cmd::set_url(&mut config, &url)?;
            }
        },

        None => {
            let mut config = Config::load()?;
            if let Some(url) = cli.url {
                validate_ws_url(&url)?;
                config.ws_url = url;
            }
            if cli.light {
                config.dark_mode = false;
            }
            viz::execute(&config, cli.demo)?;
        }
    }

    Ok(())
}
