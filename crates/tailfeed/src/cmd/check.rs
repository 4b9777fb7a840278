//! Check command - verify the datasource answers
//!
//! Issues `GET <url>?TEST=YES`. Any HTTP response counts as success; only a
//! bad URL or a connection failure is reported as an error.
//!
//! # Usage
//!
//! ```bash
//! tailfeed check
//! tailfeed check --url http://localhost:8080/tail --json
//! ```

use anyhow::{Context, Result};
use clap::Args;
use owo_colors::{OwoColorize, Style};
use serde::Serialize;

use tailfeed_config::Config;
use tailfeed_tap::{CheckStatus, HttpTransport, check_connectivity};

/// Check command arguments
#[derive(Args, Debug)]
pub struct CheckArgs {
    /// Datasource URL (overrides config file)
    #[arg(short, long)]
    pub url: Option<String>,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Debug, Serialize)]
struct CheckReport<'a> {
    url: &'a str,
    status: &'static str,
    http_status: u16,
    message: &'a str,
}

/// Run the check command
pub async fn run(args: CheckArgs, config: &Config) -> Result<()> {
    let url = args.url.as_deref().unwrap_or(&config.datasource.url);

    let transport = HttpTransport::with_connect_timeout(config.session.connect_timeout)
        .context("failed to create HTTP client")?;

    let status = check_connectivity(&transport, url)
        .await
        .with_context(|| format!("datasource check failed for {url}"))?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report(url, &status))?);
    } else {
        let ok = if atty::is(atty::Stream::Stdout) {
            Style::new().green()
        } else {
            Style::new()
        };
        println!(
            "{} {} (HTTP {})",
            status.message.style(ok),
            url,
            status.status
        );
    }

    Ok(())
}

fn report<'a>(url: &'a str, status: &'a CheckStatus) -> CheckReport<'a> {
    CheckReport {
        url,
        status: "success",
        http_status: status.status,
        message: &status.message,
    }
}
