// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Ankit Kumar Pandey

//! ptplink CLI
//!
//! Operator tooling for the ptplink clock daemon bridge: query the
//! daemon's published clock state and push control messages to it.

use clap::{Parser, Subcommand};

mod commands;

/// ptplink - bridge to the PTP clock synchronization daemon
#[derive(Parser)]
#[command(name = "ptplink")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Configuration file path
    #[arg(short, long, default_value = "ptplink.yaml")]
    pub config: String,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Query the daemon's current master clock and time offset
    Status {
        /// Keep polling at this interval in milliseconds
        #[arg(short, long, value_name = "MS")]
        watch: Option<u64>,

        /// Emit machine-readable JSON instead of text
        #[arg(long)]
        json: bool,
    },

    /// Announce the timing peer list to the daemon
    Peers {
        /// Peer addresses; an empty list clears the daemon's peers
        addrs: Vec<std::net::IpAddr>,
    },

    /// Send a raw control message to the daemon
    Send {
        /// Message text, sent NUL-terminated in one datagram
        message: String,
    },

    /// Validate a configuration file
    Validate {
        /// Path to the configuration file
        file: String,
    },
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Initialize logging
    let log_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt().with_env_filter(log_level).init();

    // Dispatch to command handlers
    match cli.command {
        Commands::Status { watch, json } => commands::status::execute(&cli.config, watch, json),
        Commands::Peers { addrs } => commands::peers::execute(&cli.config, &addrs),
        Commands::Send { message } => commands::send::execute(&cli.config, &message),
        Commands::Validate { file } => commands::validate::execute(&file),
    }
}
