//! Tail command - live buffer view of growing remote resources
//!
//! Starts one tail session per `--path`, prints every published state and
//! warns when a session stops receiving data.

mod output;
mod watchdog;

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use chrono::Utc;
use clap::Args;
use tracing::{info, warn};

use tailfeed_config::Config;
use tailfeed_protocol::Format;
use tailfeed_tap::{
    CapacityPolicy, DataSourceSettings, HttpTransport, Phase, SessionRegistry, TailQuery,
    TailRequest, TimeRange,
};

use output::{Formatter, OutputFormat};
use watchdog::StallWatchdog;

/// Tail command arguments
#[derive(Args, Debug)]
pub struct TailArgs {
    /// Resource path to tail (can be repeated)
    #[arg(short, long = "path", value_name = "PATH", required = true)]
    paths: Vec<String>,

    /// Wire format: line, binary (overrides config file)
    #[arg(short, long)]
    format: Option<Format>,

    /// Expected seconds per sample, used to size the buffer
    #[arg(short, long, value_name = "SECS")]
    rate: Option<f64>,

    /// Time window to keep, e.g. "1h" or "15m" (needs --rate)
    #[arg(long, value_name = "DURATION", value_parser = humantime::parse_duration)]
    range: Option<Duration>,

    /// Datasource URL (overrides config file)
    #[arg(short, long)]
    url: Option<String>,

    /// Prefix prepended to every path (overrides config file)
    #[arg(long)]
    prefix: Option<String>,

    /// Reserved head parameter, passed through unchanged
    #[arg(long)]
    head: Option<String>,

    /// Output format
    #[arg(short = 'o', long = "output", value_enum, default_value_t = OutputFormat::Text)]
    output: OutputFormat,

    /// Include the full buffered series in JSON output
    #[arg(long)]
    series: bool,

    /// Disable colored output
    #[arg(long)]
    no_color: bool,
}

/// Run the tail command
pub async fn run(args: TailArgs, config: &Config) -> Result<()> {
    let request = build_request(&args, config);

    let settings = DataSourceSettings {
        url: args
            .url
            .clone()
            .unwrap_or_else(|| config.datasource.url.clone()),
        prefix: args
            .prefix
            .clone()
            .or_else(|| config.datasource.prefix.clone()),
    };
    let policy = CapacityPolicy {
        default_capacity: config.session.default_capacity,
        max_capacity: config.session.max_capacity,
    };

    let transport = HttpTransport::with_connect_timeout(config.session.connect_timeout)
        .context("failed to create HTTP client")?;
    let registry = SessionRegistry::new(Arc::new(transport), settings, policy);

    let mut states = registry
        .query(&request)
        .context("failed to start tail sessions")?;

    for query in &request.targets {
        info!(id = %query.session_id(), format = %query.format, "{}", query.display_text());
    }

    // Enable color only if: stdout is TTY AND --no-color not set
    let use_color = atty::is(atty::Stream::Stdout) && !args.no_color;
    let formatter = Formatter::new(args.output)
        .with_color(use_color)
        .with_series(args.series);

    let mut watchdog = config.session.stall_timeout().map(StallWatchdog::new);
    let mut ticker = tokio::time::interval(
        watchdog
            .as_ref()
            .map(StallWatchdog::check_interval)
            .unwrap_or(Duration::from_secs(1)),
    );

    loop {
        tokio::select! {
            state = states.recv() => {
                match state {
                    Some(state) => formatter.print(&state),
                    // Every session has terminated
                    None => break,
                }
            }
            _ = ticker.tick(), if watchdog.is_some() => {
                if let Some(watchdog) = watchdog.as_mut() {
                    let sessions = registry
                        .handles()
                        .into_iter()
                        .filter(|handle| !handle.is_cancelled())
                        .map(|handle| (handle.id().to_string(), handle.activity()));
                    watchdog.check(sessions, Utc::now());
                }
            }
            _ = tokio::signal::ctrl_c() => {
                info!("interrupted, cancelling sessions");
                registry.cancel_all();
                break;
            }
        }
    }

    let outcomes = registry.wait_all().await;
    let total = outcomes.len();
    let mut failed = 0;
    for outcome in outcomes {
        let outcome = outcome?;
        info!(
            id = %outcome.id,
            phase = outcome.phase.as_str(),
            chunks = outcome.stats.chunk_count,
            samples = outcome.stats.sample_count,
            anomalies = outcome.stats.anomaly_count,
            "session finished"
        );
        if outcome.phase == Phase::Error {
            failed += 1;
        }
    }

    if failed > 0 {
        anyhow::bail!("{failed} of {total} tail sessions failed");
    }
    Ok(())
}

/// Build the query targets from CLI arguments
fn build_request(args: &TailArgs, config: &Config) -> TailRequest {
    let format = args.format.unwrap_or(config.session.format);

    let targets = args
        .paths
        .iter()
        .enumerate()
        .map(|(i, path)| {
            let mut query = TailQuery::new(ref_id(i), path).with_format(format);
            if let Some(rate) = args.rate {
                query = query.with_rate(rate);
            }
            if let Some(head) = &args.head {
                query = query.with_head(head);
            }
            query
        })
        .collect();

    let mut request = TailRequest::new(targets);
    match (args.range, args.rate) {
        (Some(range), Some(_)) => request = request.with_range(TimeRange::ending_now(range)),
        (Some(_), None) => warn!("--range has no effect without --rate"),
        _ => {}
    }
    request
}

/// Spreadsheet-style reference: A..Z, AA..AZ, ...
fn ref_id(index: usize) -> String {
    let mut n = index + 1;
    let mut out = Vec::new();
    while n > 0 {
        let rem = (n - 1) % 26;
        out.push(b'A' + rem as u8);
        n = (n - 1) / 26;
    }
    out.iter().rev().map(|&b| b as char).collect()
}
