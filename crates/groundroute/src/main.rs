// SPDX-FileCopyrightText: 2026 Groundroute Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! groundroute - weighted routing in front of AI agent backends.
//!
//! This is the binary entry point.

mod check;
mod serve;
mod shutdown;
mod status;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use groundroute_config::GroundrouteConfig;

/// groundroute - weighted routing in front of AI agent backends.
#[derive(Parser, Debug)]
#[command(name = "groundroute", version, about, long_about = None)]
struct Cli {
    /// Read configuration from this file instead of the standard locations.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

/// Available subcommands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Start the routing service.
    Serve,
    /// Show routing health of a running instance.
    Status {
        /// Output as JSON.
        #[arg(long)]
        json: bool,
        /// Disable colors.
        #[arg(long)]
        plain: bool,
    },
    /// Validate configuration and exit.
    Check,
}

fn load_config(path: Option<&std::path::Path>) -> GroundrouteConfig {
    let loaded = match path {
        Some(path) => groundroute_config::load_and_validate_path(path),
        None => groundroute_config::load_and_validate(),
    };
    match loaded {
        Ok(config) => config,
        Err(errors) => {
            groundroute_config::render_errors(&errors);
            std::process::exit(1);
        }
    }
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    let config = load_config(cli.config.as_deref());

    let result = match cli.command {
        Some(Commands::Serve) => serve::run_serve(config).await,
        Some(Commands::Status { json, plain }) => status::run_status(&config, json, plain).await,
        Some(Commands::Check) => check::run_check(&config),
        None => {
            println!("groundroute: use --help for available commands");
            Ok(())
        }
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}
