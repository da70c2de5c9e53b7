// SPDX-FileCopyrightText: 2026 Livechat Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Livechat - replay and configuration tool for the live-chat thread engine.
//!
//! This is the binary entry point.

mod replay;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use livechat_config::{ConfigError, LiveChatConfig};
use livechat_core::ThreadId;

/// Livechat - replay recorded live-chat events against a thread view.
#[derive(Parser, Debug)]
#[command(name = "livechat", version, about, long_about = None)]
struct Cli {
    /// Explicit configuration file instead of the standard search path.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

/// Available subcommands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Validate configuration and report diagnostics.
    CheckConfig {
        /// Print the effective configuration as TOML.
        #[arg(long)]
        print: bool,
    },
    /// Replay a JSON-lines inbound event log against one thread.
    Replay {
        /// Event log, one inbound event per line.
        file: PathBuf,
        /// Id of the thread the log belongs to.
        #[arg(long)]
        thread_id: String,
        /// Treat the thread as freshly created (sends the conversation starter).
        #[arg(long)]
        created: bool,
    },
}

fn load_config(path: Option<&PathBuf>) -> Result<LiveChatConfig, Vec<ConfigError>> {
    match path {
        Some(path) => livechat_config::load_and_validate_path(path),
        None => livechat_config::load_and_validate(),
    }
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let config = match load_config(cli.config.as_ref()) {
        Ok(config) => config,
        Err(errors) => {
            livechat_config::render_errors(&errors);
            std::process::exit(1);
        }
    };

    init_tracing(&config.logging.log_level);

    match cli.command {
        Commands::CheckConfig { print } => {
            if print {
                match toml::to_string_pretty(&config) {
                    Ok(rendered) => print!("{rendered}"),
                    Err(e) => {
                        eprintln!("livechat: cannot render config: {e}");
                        std::process::exit(1);
                    }
                }
            }
            eprintln!(
                "livechat: config OK ({} contact fields, {} customer fields, refresh lookahead {}s)",
                config.channel.contact_custom_fields.len(),
                config.channel.customer_custom_fields.len(),
                config.auth.refresh_lookahead_secs,
            );
        }
        Commands::Replay {
            file,
            thread_id,
            created,
        } => {
            let options = replay::ReplayOptions {
                thread_id: ThreadId(thread_id),
                created,
            };
            if let Err(e) = replay::run(&file, options, config).await {
                eprintln!("livechat: replay failed: {e}");
                std::process::exit(1);
            }
        }
    }
}

/// Initializes the tracing subscriber with the given log level.
///
/// Logs go to stderr so replay output on stdout stays machine-readable.
fn init_tracing(log_level: &str) {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("livechat={log_level},warn")));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_thread_names(false)
        .init();
}
