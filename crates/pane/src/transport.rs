// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The Pane Transport: owns a multiplexer session, the
//! logical-name-to-handle mapping, and the [`DaemonSupervisor`] riding on
//! top of it.

use crate::daemon::{CommandResponse, DaemonSupervisor};
use crate::error::{PaneError, Result};
use crate::mux::MuxDriver;
use hive_core::{DaemonState, Pane, PaneStats};
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

/// Owns one multiplexer session and the panes (workers) bound to it
/// 1:1 by configuration.
pub struct PaneTransport {
    mux: Arc<dyn MuxDriver>,
    session: String,
    handles: RwLock<HashMap<String, String>>,
    supervisor: DaemonSupervisor,
}

impl PaneTransport {
    pub fn new(mux: Arc<dyn MuxDriver>, session: impl Into<String>) -> Self {
        let supervisor = DaemonSupervisor::new(mux.clone());
        Self { mux, session: session.into(), handles: RwLock::new(HashMap::new()), supervisor }
    }

    pub fn session(&self) -> &str {
        &self.session
    }

    /// Create the session (if absent) with one window per logical pane
    /// name, recording `{logical_name -> pane_handle}`.
    pub async fn ensure_session(&self, logical_names: &[String]) -> Result<()> {
        let handles = self.mux.ensure_session(&self.session, logical_names).await?;
        self.handles.write().extend(handles);
        Ok(())
    }

    pub async fn destroy_session(&self) -> Result<()> {
        self.mux.destroy_session(&self.session).await?;
        self.handles.write().clear();
        Ok(())
    }

    fn handle(&self, logical_name: &str) -> Result<String> {
        self.handles
            .read()
            .get(logical_name)
            .cloned()
            .ok_or_else(|| PaneError::PaneNotFound(logical_name.to_string()))
    }

    /// A snapshot of the named pane's current state, if known.
    pub fn pane(&self, logical_name: &str) -> Option<Pane> {
        let handle = self.handles.read().get(logical_name)?.clone();
        Some(Pane {
            id: handle.clone(),
            logical_name: logical_name.to_string(),
            daemon_state: self.supervisor.state(&handle),
            stats: self.supervisor.stats(&handle),
        })
    }

    pub async fn send_line(&self, logical_name: &str, text: &str) -> Result<()> {
        self.mux.send_line(&self.handle(logical_name)?, text).await
    }

    pub async fn send_keys(&self, logical_name: &str, keys: &str) -> Result<()> {
        self.mux.send_keys(&self.handle(logical_name)?, keys).await
    }

    pub async fn capture(&self, logical_name: &str, tail_lines: u32) -> Result<String> {
        self.mux.capture(&self.handle(logical_name)?, tail_lines).await
    }

    pub async fn start_daemon(&self, logical_name: &str, command: &str, startup_timeout: Duration) -> Result<bool> {
        self.supervisor.start_daemon(&self.handle(logical_name)?, command, startup_timeout).await
    }

    pub async fn send_command_await(
        &self,
        logical_name: &str,
        command: &str,
        response_timeout: Duration,
    ) -> Result<CommandResponse> {
        self.supervisor.send_command_await(&self.handle(logical_name)?, command, response_timeout).await
    }

    pub async fn health_check(&self, logical_name: &str) -> Result<bool> {
        self.supervisor.health_check(&self.handle(logical_name)?).await
    }

    pub async fn stop_daemon(&self, logical_name: &str) -> Result<()> {
        self.supervisor.stop_daemon(&self.handle(logical_name)?).await
    }

    pub async fn restart_daemon(&self, logical_name: &str, command: &str, startup_timeout: Duration) -> Result<bool> {
        self.supervisor.restart_daemon(&self.handle(logical_name)?, command, startup_timeout).await
    }

    pub async fn start_all_daemons(&self, commands: &HashMap<String, String>, startup_timeout: Duration) -> Vec<(String, bool)> {
        let pairs: Vec<(String, String)> = {
            let handles = self.handles.read();
            commands
                .iter()
                .filter_map(|(name, cmd)| handles.get(name).map(|h| (h.clone(), cmd.clone())))
                .collect()
        };
        self.supervisor.start_all_daemons(&pairs, startup_timeout).await
    }

    pub async fn stop_all_daemons(&self) {
        let handles: Vec<String> = self.handles.read().values().cloned().collect();
        self.supervisor.stop_all_daemons(&handles).await;
    }

    pub fn daemon_state(&self, logical_name: &str) -> DaemonState {
        match self.handles.read().get(logical_name) {
            Some(handle) => self.supervisor.state(handle),
            None => DaemonState::Absent,
        }
    }

    pub fn stats(&self, logical_name: &str) -> PaneStats {
        match self.handles.read().get(logical_name) {
            Some(handle) => self.supervisor.stats(handle),
            None => PaneStats::default(),
        }
    }
}

#[cfg(test)]
#[path = "transport_tests.rs"]
mod tests;
