//! Output formatting for published session states
//!
//! Text mode prints one summary line per state; JSON mode prints one compact
//! object per line, optionally with the whole buffered series.

use chrono::{DateTime, Utc};
use clap::ValueEnum;
use owo_colors::{OwoColorize, Style};
use serde::Serialize;

use tailfeed_protocol::Sample;
use tailfeed_tap::{ErrorInfo, Phase, SeriesSnapshot, SessionState};

/// Output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable summary lines
    Text,
    /// One JSON object per line
    Json,
}

/// Color styles for terminal output
struct ColorStyles {
    timestamp: Style,
    label: Style,
    phase: Style,
    error: Style,
}

impl ColorStyles {
    fn new(enabled: bool, phase: Phase) -> Self {
        if !enabled {
            return Self {
                timestamp: Style::new(),
                label: Style::new(),
                phase: Style::new(),
                error: Style::new(),
            };
        }
        Self {
            timestamp: Style::new().dimmed(),
            label: Style::new().dimmed(),
            phase: match phase {
                Phase::Streaming => Style::new(),
                Phase::Done => Style::new().green(),
                Phase::Error => Style::new().red(),
                Phase::Loading | Phase::Cancelled => Style::new().yellow(),
            },
            error: Style::new().red(),
        }
    }
}

/// One JSON output line
#[derive(Debug, Serialize)]
struct StateLine<'a> {
    id: &'a str,
    name: &'a str,
    phase: Phase,
    chunk_count: u64,
    last_activity: Option<DateTime<Utc>>,
    points: usize,
    capacity: Option<usize>,
    last: Option<Sample>,
    error: Option<&'a ErrorInfo>,
    #[serde(skip_serializing_if = "Option::is_none")]
    series: Option<&'a SeriesSnapshot>,
}

/// Output formatter
pub struct Formatter {
    format: OutputFormat,
    use_color: bool,
    series: bool,
}

impl Formatter {
    /// Create a new formatter
    pub fn new(format: OutputFormat) -> Self {
        Self {
            format,
            use_color: true,
            series: false,
        }
    }

    /// Enable or disable color output
    pub fn with_color(mut self, use_color: bool) -> Self {
        self.use_color = use_color;
        self
    }

    /// Include the full series in JSON output
    pub fn with_series(mut self, series: bool) -> Self {
        self.series = series;
        self
    }

    /// Print a state to stdout
    pub fn print(&self, state: &SessionState) {
        println!("{}", self.render(state));
    }

    /// Render a state as one output line
    pub fn render(&self, state: &SessionState) -> String {
        match self.format {
            OutputFormat::Text => self.render_text(state),
            OutputFormat::Json => self.render_json(state),
        }
    }

    fn render_text(&self, state: &SessionState) -> String {
        let styles = ColorStyles::new(self.use_color, state.phase);
        let time = state
            .last_activity
            .map(|t| t.format("%H:%M:%S%.3f").to_string())
            .unwrap_or_else(|| "--:--:--.---".to_string());

        let mut line = format!(
            "{} {} {}",
            time.style(styles.timestamp),
            state.id,
            state.phase.as_str().style(styles.phase)
        );

        if let Some(error) = &state.error {
            line.push(' ');
            line.push_str(&error.message.style(styles.error).to_string());
            return line;
        }

        line.push_str(&format!(
            " {}{}",
            "chunks=".style(styles.label),
            state.chunk_count
        ));

        if let Some(series) = &state.series {
            line.push_str(&format!(
                " {}{}/{}",
                "points=".style(styles.label),
                series.len(),
                series.capacity
            ));
            if let Some(last) = series.last() {
                line.push_str(&format!(
                    " {}{}@{}",
                    "last=".style(styles.label),
                    last.value,
                    last.timestamp.format("%Y-%m-%dT%H:%M:%S%.3fZ")
                ));
            }
        }

        line
    }

    fn render_json(&self, state: &SessionState) -> String {
        let line = StateLine {
            id: &state.id,
            name: &state.name,
            phase: state.phase,
            chunk_count: state.chunk_count,
            last_activity: state.last_activity,
            points: state.series.as_ref().map_or(0, SeriesSnapshot::len),
            capacity: state.series.as_ref().map(|s| s.capacity),
            last: state.series.as_ref().and_then(SeriesSnapshot::last),
            error: state.error.as_ref(),
            series: if self.series {
                state.series.as_ref()
            } else {
                None
            },
        };

        serde_json::to_string(&line)
            .unwrap_or_else(|e| format!(r#"{{"id":"{}","error":"{}"}}"#, state.id, e))
    }
}

#[cfg(test)]
#[path = "output_test.rs"]
mod tests;
