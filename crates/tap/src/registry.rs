//! Session fan-out for multi-target queries
//!
//! `SessionRegistry` starts one `StreamSession` per query target and merges
//! their published states into a single channel. Every session owns its own
//! buffer and cursor; the only shared piece is the unbounded channel, which
//! serializes interleaved publications without ever blocking a sender.
//!
//! # Architecture
//!
//! ```text
//! TailRequest
//!     │
//!     ├──→ StreamSession (fetch-A) ──┐
//!     ├──→ StreamSession (fetch-B) ──┼──→ merged StateReceiver
//!     └──→ StreamSession (fetch-C) ──┘
//! ```

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::RwLock;
use reqwest::Url;
use tokio::sync::mpsc;
use tracing::{debug, info};

use crate::buffer::CapacityPolicy;
use crate::error::{Result, TapError};
use crate::query::{DataSourceSettings, TailQuery, TailRequest, tail_url};
use crate::session::{
    ActivityStats, SessionHandle, SessionOutcome, SessionTask, StateReceiver, StreamSession,
};
use crate::transport::Transport;

/// Starts and tracks tail sessions for one datasource
pub struct SessionRegistry {
    /// Network seam shared by all sessions
    transport: Arc<dyn Transport>,
    /// Base URL and prefix
    settings: DataSourceSettings,
    /// Buffer sizing
    policy: CapacityPolicy,
    /// Running sessions by ID
    sessions: RwLock<HashMap<String, SessionTask>>,
}

impl SessionRegistry {
    /// Create a registry
    pub fn new(
        transport: Arc<dyn Transport>,
        settings: DataSourceSettings,
        policy: CapacityPolicy,
    ) -> Self {
        Self {
            transport,
            settings,
            policy,
            sessions: RwLock::new(HashMap::new()),
        }
    }

    /// Start one session per target
    ///
    /// Returns the merged state channel. All targets are validated before any
    /// session starts; a bad path or URL starts nothing.
    pub fn query(&self, request: &TailRequest) -> Result<StateReceiver> {
        let mut sessions = self.sessions.write();
        sessions.retain(|_, task| !task.is_finished());

        let mut planned: Vec<(String, &TailQuery, Url)> = Vec::with_capacity(request.targets.len());
        for query in &request.targets {
            let id = query.session_id();
            if sessions.contains_key(&id) || planned.iter().any(|(pid, _, _)| *pid == id) {
                return Err(TapError::DuplicateSession { id });
            }
            let url = tail_url(&self.settings, query)?;
            planned.push((id, query, url));
        }

        let (tx, rx) = mpsc::unbounded_channel();

        for (id, query, url) in planned {
            let capacity = self.policy.capacity_for(request.range.as_ref(), query.rate);
            debug!(%id, %url, capacity, format = %query.format, "starting session");

            let session = StreamSession::new(
                query,
                url,
                capacity,
                Arc::clone(&self.transport),
                tx.clone(),
            );
            sessions.insert(id, session.spawn());
        }

        info!(targets = request.targets.len(), "tail query started");
        Ok(rx)
    }

    /// Cancel one session by ID
    pub fn cancel(&self, id: &str) -> Result<()> {
        let sessions = self.sessions.read();
        let task = sessions
            .get(id)
            .ok_or_else(|| TapError::SessionNotFound { id: id.to_string() })?;
        task.handle().cancel();
        Ok(())
    }

    /// Cancel every running session
    pub fn cancel_all(&self) {
        let sessions = self.sessions.read();
        for task in sessions.values() {
            task.handle().cancel();
        }
        debug!(count = sessions.len(), "cancelled all sessions");
    }

    /// Get number of sessions still running
    pub fn session_count(&self) -> usize {
        self.sessions
            .read()
            .values()
            .filter(|task| !task.is_finished())
            .count()
    }

    /// Handles of sessions still running
    pub fn handles(&self) -> Vec<SessionHandle> {
        self.sessions
            .read()
            .values()
            .filter(|task| !task.is_finished())
            .map(|task| task.handle().clone())
            .collect()
    }

    /// Activity counters of one session
    pub fn activity(&self, id: &str) -> Option<ActivityStats> {
        self.sessions
            .read()
            .get(id)
            .map(|task| task.handle().activity())
    }

    /// Wait for every tracked session to terminate
    ///
    /// Drains the registry; outcomes are sorted by session ID.
    pub async fn wait_all(&self) -> Vec<Result<SessionOutcome>> {
        let mut tasks: Vec<(String, SessionTask)> = self.sessions.write().drain().collect();
        tasks.sort_by(|a, b| a.0.cmp(&b.0));

        let mut outcomes = Vec::with_capacity(tasks.len());
        for (_, task) in tasks {
            outcomes.push(task.wait().await);
        }
        outcomes
    }
}

impl std::fmt::Debug for SessionRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionRegistry")
            .field("settings", &self.settings)
            .field("policy", &self.policy)
            .field("sessions", &self.sessions.read().len())
            .finish()
    }
}

#[cfg(test)]
#[path = "registry_test.rs"]
mod tests;
