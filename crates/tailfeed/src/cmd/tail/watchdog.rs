//! Stall detection for running sessions
//!
//! A session counts as stalled when nothing arrived for longer than the
//! timeout. Sessions that never received a chunk are measured from the first
//! time the watchdog saw them. Each stall is reported once; a session that
//! resumes is reported again if it stalls later.

use std::collections::{HashMap, HashSet};
use std::time::Duration;

use chrono::{DateTime, Utc};
use tracing::{info, warn};

use tailfeed_tap::ActivityStats;

/// Tracks idle time per session
#[derive(Debug)]
pub struct StallWatchdog {
    timeout: Duration,
    /// First time each session was seen
    first_seen: HashMap<String, DateTime<Utc>>,
    /// Sessions currently reported as stalled
    stalled: HashSet<String>,
}

impl StallWatchdog {
    /// Create a watchdog with the given timeout
    pub fn new(timeout: Duration) -> Self {
        Self {
            timeout,
            first_seen: HashMap::new(),
            stalled: HashSet::new(),
        }
    }

    /// How often `check` should run
    pub fn check_interval(&self) -> Duration {
        (self.timeout / 4).max(Duration::from_millis(250))
    }

    /// Check sessions; returns IDs that became stalled during this call
    pub fn check(
        &mut self,
        sessions: impl IntoIterator<Item = (String, ActivityStats)>,
        now: DateTime<Utc>,
    ) -> Vec<String> {
        let mut newly_stalled = Vec::new();

        for (id, stats) in sessions {
            let since = match stats.last_activity {
                Some(last) => last,
                None => *self.first_seen.entry(id.clone()).or_insert(now),
            };
            let idle = (now - since).to_std().unwrap_or(Duration::ZERO);

            if idle > self.timeout {
                if !self.stalled.contains(&id) {
                    warn!(
                        id = %id,
                        idle_secs = idle.as_secs(),
                        chunks = stats.chunk_count,
                        "no data received, session may be stalled"
                    );
                    self.stalled.insert(id.clone());
                    newly_stalled.push(id);
                }
            } else if self.stalled.remove(&id) {
                info!(id = %id, "session resumed");
            }
        }

        newly_stalled
    }
}
