//! alsf - Safari tab and URL actions for Alfred.
//!
//! Every invocation is a single command: list something for a Script
//! Filter, or perform one action. Results go to stdout as Alfred JSON;
//! logs go to stderr, which Alfred shows in its workflow debugger.

mod cli;
mod commands;
mod error;
mod feedback;

use alsf_core::env;
use clap::Parser;
use tracing::Level;
use tracing_subscriber::EnvFilter;

use crate::cli::Cli;
use crate::commands::Context;

// =============================================================================
// Logging
// =============================================================================

/// `RUST_LOG` if set; otherwise `info`, or `debug` while Alfred's debugger
/// is open.
fn init_logging() {
    let level = if std::env::var(env::DEBUG).as_deref() == Ok("1") {
        Level::DEBUG
    } else {
        Level::INFO
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::builder()
                .with_default_directive(level.into())
                .from_env_lossy(),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

// =============================================================================
// Entry Point
// =============================================================================

fn main() {
    init_logging();

    let cli = Cli::parse();
    let script_filter = cli.command.is_script_filter();
    tracing::debug!("{:?}", cli.command);

    let result = Context::load().and_then(|ctx| commands::execute(&ctx, cli.command));

    match result {
        Ok(Some(output)) => println!("{}", output),
        Ok(None) => {}
        Err(e) => {
            tracing::error!("{}", e);
            match commands::error_output(script_filter, &e) {
                Some(output) => println!("{}", output),
                None => {
                    eprintln!("Error: {}", e);
                    std::process::exit(1);
                }
            }
        }
    }
}
