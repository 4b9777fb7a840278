//! Tailfeed - live tail of growing time-series sources over HTTP
//!
//! # Usage
//!
//! ```bash
//! # Tail one resource with the line decoder
//! tailfeed tail --path cpu.txt --url http://localhost:8080/tail
//!
//! # Tail two binary resources sized for one hour at 1s per point
//! tailfeed tail -p a.bin -p b.bin --format binary --rate 1 --range 1h
//!
//! # Check that the datasource answers
//! tailfeed check --url http://localhost:8080/tail
//! ```

mod cmd;

use std::path::Path;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tailfeed_config::{Config, LogConfig, LogFormat, LogOutput};
use tracing_subscriber::fmt::writer::BoxMakeWriter;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

/// Tailfeed - live tail of growing time-series sources over HTTP
#[derive(Parser, Debug)]
#[command(name = "tailfeed")]
#[command(version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Path to configuration file (error if specified but not found)
    #[arg(short, long, global = true)]
    config: Option<std::path::PathBuf>,

    /// Log level (trace, debug, info, warn, error). Overrides config file.
    #[arg(short, long, global = true)]
    log_level: Option<String>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Stream one or more resources and print buffer updates
    Tail(cmd::tail::TailArgs),

    /// Check that the datasource answers
    Check(cmd::check::CheckArgs),
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = load_config(cli.config.as_deref())?;
    let log_level = resolve_log_level(cli.log_level.as_deref(), &config);
    init_logging(&log_level, &config.log)?;

    match cli.command {
        Command::Tail(args) => cmd::tail::run(args, &config).await,
        Command::Check(args) => cmd::check::run(args, &config).await,
    }
}

fn load_config(path: Option<&Path>) -> Result<Config> {
    Config::load(path).with_context(|| match path {
        Some(path) => format!("failed to load config from {}", path.display()),
        None => "failed to load default config".to_string(),
    })
}

/// Resolve the filter directive: CLI flag (used verbatim) > config file level
fn resolve_log_level(cli_level: Option<&str>, config: &Config) -> String {
    match cli_level {
        Some(level) => level.to_string(),
        None => config.log.level.filter_directive(),
    }
}

/// Initialize the tracing subscriber for logging
fn init_logging(level: &str, log: &LogConfig) -> Result<()> {
    let filter = EnvFilter::try_new(level)
        .or_else(|_| EnvFilter::try_new("info"))
        .map_err(|e| anyhow::anyhow!("invalid log level: {}", e))?;

    let (writer, ansi) = match log.output {
        LogOutput::Stdout => (
            BoxMakeWriter::new(std::io::stdout),
            atty::is(atty::Stream::Stdout),
        ),
        LogOutput::Stderr => (
            BoxMakeWriter::new(std::io::stderr),
            atty::is(atty::Stream::Stderr),
        ),
    };

    let layer = match log.format {
        LogFormat::Console => fmt::layer()
            .with_target(true)
            .with_thread_ids(false)
            .with_ansi(ansi)
            .with_writer(writer)
            .boxed(),
        LogFormat::Json => fmt::layer().json().with_writer(writer).boxed(),
    };

    tracing_subscriber::registry()
        .with(layer)
        .with(filter)
        .init();

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_cli_flag_overrides_config_level() {
        let config = Config::from_str("[log]\nlevel = \"warn\"").unwrap();
        assert_eq!(resolve_log_level(Some("trace"), &config), "trace");
        assert!(resolve_log_level(None, &config).contains("tailfeed_tap=warn"));
        assert!(resolve_log_level(None, &Config::default()).contains("tailfeed=info"));
    }

    #[test]
    fn test_cli_parses_global_flags_after_subcommand() {
        let cli = Cli::try_parse_from([
            "tailfeed",
            "tail",
            "--path",
            "cpu.txt",
            "--log-level",
            "debug",
        ])
        .unwrap();
        assert_eq!(cli.log_level.as_deref(), Some("debug"));
        assert!(matches!(cli.command, Command::Tail(_)));
    }

    #[test]
    fn test_no_config_path_uses_defaults() {
        let config = load_config(None).unwrap();
        assert_eq!(config.log.level, tailfeed_config::LogLevel::Info);
    }

    #[test]
    fn test_missing_config_file_is_an_error() {
        let err = load_config(Some(Path::new("/nonexistent/tailfeed.toml"))).unwrap_err();
        assert!(err.to_string().contains("failed to load config"));
    }
}
