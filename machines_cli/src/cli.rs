//! CLI argument definitions and shared statics.

use clap::{ArgAction, Parser, Subcommand};
use std::path::PathBuf;
use std::sync::OnceLock;

/// Whether the user asked for JSON output (controls structured error output).
pub static JSON_MODE: OnceLock<bool> = OnceLock::new();

pub fn json_mode() -> bool {
    JSON_MODE.get().copied().unwrap_or(false)
}

#[derive(Parser, Debug)]
#[command(name = "machines", version, about = "Shared machines client")]
pub struct Cli {
    /// Path to config TOML; a missing file means defaults
    #[arg(long, value_name = "FILE", default_value = "machines.toml")]
    pub config: PathBuf,

    /// Override api.backend_url from the config
    #[arg(long, value_name = "URL")]
    pub backend_url: Option<String>,

    /// Talk to an in-process simulated backend instead of the network
    #[arg(long, action = ArgAction::SetTrue)]
    pub sim: bool,

    /// Print results and logs as JSON lines instead of text
    #[arg(long, action = ArgAction::SetTrue)]
    pub json: bool,

    /// Console log level (error|warn|info|debug|trace); defaults to logging.level, then warn
    #[arg(long = "log-level", value_name = "LEVEL")]
    pub log_level: Option<String>,

    /// Command to execute
    #[command(subcommand)]
    pub cmd: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Exchange phone and password for a session token
    Login {
        #[arg(long)]
        phone: String,
        #[arg(long)]
        password: String,
    },
    /// Forget the stored session token
    Logout,
    /// List every machine
    List {
        /// Emit CSV instead of a table
        #[arg(long, action = ArgAction::SetTrue)]
        csv: bool,
    },
    /// Show one machine with its status and available commands
    Show {
        #[arg(long)]
        id: Option<String>,
    },
    /// Start using a free machine
    Start {
        #[arg(long)]
        id: Option<String>,
    },
    /// Pause a machine in use
    Pause {
        #[arg(long)]
        id: Option<String>,
    },
    /// Resume a paused machine
    Resume {
        #[arg(long)]
        id: Option<String>,
    },
    /// Finish using a machine
    Finish {
        #[arg(long)]
        id: Option<String>,
    },
    /// End a parking session (the QR landing page)
    FinishSession {
        #[arg(long)]
        key: Option<String>,
        #[arg(long = "parking-name")]
        parking_name: Option<String>,
    },
    /// Open a front-end route, e.g. "/machine?id=m1"
    Open {
        #[arg(value_name = "ROUTE")]
        route: String,
    },
    /// Re-fetch one machine periodically until Ctrl-C
    Watch {
        #[arg(long)]
        id: Option<String>,
        /// Poll interval in milliseconds
        #[arg(long, value_name = "MS", default_value_t = 2000)]
        interval_ms: u64,
        /// Stop after this many snapshots
        #[arg(long, value_name = "N")]
        count: Option<u64>,
    },
}
