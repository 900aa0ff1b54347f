//! Command line configuration

use std::path::PathBuf;

use clap::{Args, Parser, ValueEnum};
use rusty_money::iso::{self, Currency};
use storefront::api::DEFAULT_BASE_URL;

use crate::commands::Command;

/// Storefront command line client
#[derive(Debug, Parser)]
#[command(name = "storefront", about = "Storefront cart and catalog client", long_about = None)]
pub(crate) struct CliConfig {
    /// Backend settings.
    #[command(flatten)]
    pub api: ApiSettings,

    /// Local state settings.
    #[command(flatten)]
    pub storage: StorageSettings,

    /// Logging output settings.
    #[command(flatten)]
    pub logging: LoggingConfig,

    /// What to do.
    #[command(subcommand)]
    pub command: Command,
}

impl CliConfig {
    /// Load configuration from `.env`, the environment and arguments.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration cannot be parsed.
    pub(crate) fn load() -> Result<Self, clap::Error> {
        _ = dotenvy::dotenv();

        Self::try_parse()
    }
}

/// Backend settings.
#[derive(Debug, Args)]
pub(crate) struct ApiSettings {
    /// Base URL of the storefront API
    #[arg(long, env = "STOREFRONT_API_URL", default_value = DEFAULT_BASE_URL)]
    pub api_url: String,

    /// ISO 4217 code prices are shown in
    #[arg(long, env = "STOREFRONT_CURRENCY", default_value = "USD", value_parser = parse_currency)]
    pub currency: &'static Currency,
}

/// Local state settings.
#[derive(Debug, Args)]
pub(crate) struct StorageSettings {
    /// Directory holding the cart mirror and credentials
    #[arg(long, env = "STOREFRONT_DATA_DIR", default_value = ".storefront")]
    pub data_dir: PathBuf,
}

/// Log output format.
#[derive(Clone, Copy, Debug, ValueEnum)]
pub(crate) enum LogFormat {
    /// Compact, human-readable logs.
    Compact,

    /// Structured JSON logs.
    Json,
}

/// Logging settings.
#[derive(Debug, Args)]
pub(crate) struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, env = "RUST_LOG", default_value = "warn")]
    pub log_level: String,

    /// Log format (compact, json)
    #[arg(long, env = "LOG_FORMAT", value_enum, default_value_t = LogFormat::Compact)]
    pub log_format: LogFormat,
}

fn parse_currency(code: &str) -> Result<&'static Currency, String> {
    iso::find(&code.to_ascii_uppercase()).ok_or_else(|| format!("unknown currency code {code}"))
}
