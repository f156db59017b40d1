// SPDX-FileCopyrightText: 2026 Fanout Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Binary entry point for the fanout notification worker.

use clap::{Parser, Subcommand};

mod serve;

/// Fanout - notification fan-out worker.
#[derive(Parser, Debug)]
#[command(name = "fanout", version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

/// Available subcommands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Start the fan-out worker.
    Serve,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let config = match fanout_config::load() {
        Ok(config) => config,
        Err(err) => {
            eprintln!("fanout: {err}");
            std::process::exit(1);
        }
    };

    match cli.command {
        Some(Commands::Serve) => {
            if let Err(err) = serve::run_serve(config).await {
                tracing::error!(error = %err, "worker terminated");
                std::process::exit(1);
            }
        }
        None => {
            println!("fanout: use --help for available commands");
        }
    }
}
