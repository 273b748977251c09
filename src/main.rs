//! mcp-demo-server: MCP demo server over stdio
//!
//! Exposes mock tools, file-backed resources and prompt templates to MCP
//! clients. Protocol messages go to stdout, logs go to stderr.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use tracing::{error, info, Level};
use tracing_subscriber::EnvFilter;

use mcp_demo_server::config::{self, Overrides};
use mcp_demo_server::mcp::server::McpServer;

/// MCP demo server exposing tools, resources and prompts over stdio.
#[derive(Parser, Debug)]
#[command(name = "mcp-demo-server")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to configuration file
    #[arg(value_name = "CONFIG_FILE", env = "MCP_DEMO_CONFIG")]
    config: Option<PathBuf>,

    /// Increase logging verbosity (-v for info, -vv for debug, -vvv for trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Decrease logging verbosity (only show errors)
    #[arg(short, long)]
    quiet: bool,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, env = "LOG_LEVEL")]
    log_level: Option<String>,

    /// JSON file backing the logs://system resource
    #[arg(long, env = "LOGS_PATH")]
    logs_path: Option<PathBuf>,

    /// JSON file backing the profiles://users resource
    #[arg(long, env = "PROFILES_PATH")]
    profiles_path: Option<PathBuf>,
}

/// Determines the log level from CLI arguments.
#[allow(clippy::match_same_arms)] // Explicit "warn" arm for clarity
fn get_log_level(verbose: u8, quiet: bool, config_level: &str) -> Level {
    if quiet {
        return Level::ERROR;
    }

    match verbose {
        0 => match config_level.to_lowercase().as_str() {
            "trace" => Level::TRACE,
            "debug" => Level::DEBUG,
            "info" => Level::INFO,
            "warn" => Level::WARN,
            "error" => Level::ERROR,
            _ => Level::WARN,
        },
        1 => Level::INFO,
        2 => Level::DEBUG,
        _ => Level::TRACE,
    }
}

/// Initialises the tracing subscriber for logging.
fn init_tracing(level: Level) {
    let filter = EnvFilter::from_default_env().add_directive(level.into());

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

/// Entry point for the mcp-demo-server.
fn main() -> ExitCode {
    let args = Args::parse();

    let overrides = Overrides {
        log_level: args.log_level,
        logs_path: args.logs_path,
        profiles_path: args.profiles_path,
    };

    let config_path = args.config.as_deref();
    let cfg = match config::resolve_config(config_path).and_then(|cfg| overrides.apply(cfg)) {
        Ok(cfg) => cfg,
        Err(e) => {
            eprintln!("Configuration error: {e}");
            return ExitCode::FAILURE;
        }
    };

    let log_level = get_log_level(args.verbose, args.quiet, &cfg.logging.level);
    init_tracing(log_level);

    info!(
        version = env!("CARGO_PKG_VERSION"),
        logs_path = %cfg.data.logs_path.display(),
        profiles_path = %cfg.data.profiles_path.display(),
        "Starting mcp-demo-server"
    );

    let mut server = match McpServer::from_config(&cfg) {
        Ok(server) => server,
        Err(e) => {
            error!(error = %e, "Invalid capability registration");
            return ExitCode::FAILURE;
        }
    };

    let runtime = match tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
    {
        Ok(runtime) => runtime,
        Err(e) => {
            error!(error = %e, "Failed to create Tokio runtime");
            return ExitCode::FAILURE;
        }
    };

    info!("MCP server ready, waiting for client connection...");

    match runtime.block_on(server.run()) {
        Ok(()) => {
            info!("Server shut down gracefully");
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!(error = %e, "Server error");
            ExitCode::FAILURE
        }
    }
}
