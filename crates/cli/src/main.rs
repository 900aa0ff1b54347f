//! Storefront command line client

use std::{io, process};

use tracing::error;

use crate::{commands::Context, config::CliConfig};

mod commands;
mod config;
mod observability;
mod render;

#[tokio::main]
pub async fn main() {
    let config = CliConfig::load().unwrap_or_else(|e| e.exit());

    if let Err(e) = observability::init_subscriber(&config.logging) {
        #[expect(
            clippy::print_stderr,
            reason = "logging failed to initialise, must use eprintln"
        )]
        {
            eprintln!("{e}");
        }
    }

    let ctx = Context::new(&config);
    let mut out = io::stdout().lock();

    if let Err(e) = commands::run(config.command, &ctx, &mut out).await {
        error!(error = ?e, "command failed");

        #[expect(clippy::print_stderr, reason = "user-facing failure message")]
        {
            eprintln!("error: {e:#}");
        }

        #[expect(clippy::exit, reason = "non-zero status for failed commands")]
        process::exit(1);
    }
}
