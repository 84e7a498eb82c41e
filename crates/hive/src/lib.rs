// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! `hive`: the façade crate. Constructs, in dependency order, the
//! Filesystem Substrate, Message Router, Sync Manager, Template Registry,
//! Pane Transport, and Coordination Loop — an explicit context value
//! constructed once per process and passed through, with no hidden
//! global state — and re-exports a thin aggregating surface over them.
//!
//! `Hive` itself never reaches back into a component's internals from
//! another component — every component receives its substrate by `Arc`
//! at construction and is otherwise independent.

pub mod error;
pub mod env;

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};

pub use error::{HiveError, Result};

pub use hive_comb::{FsSubstrate, MessageStats, Router, SyncManager};
pub use hive_coordinator::{
    CoordinationLoop, ParallelTask, QualityAssessor, RunCycleOptions, SendTaskOptions, WatchEvent, WatchLog,
};
#[cfg(any(test, feature = "test-support"))]
pub use hive_coordinator::StubAssessor;
pub use hive_core::{
    Barrier, CycleResult, Lock, Message, MessageId, MessageKind, Pane, PaneStats, Priority, QualityAssessment, Task,
    TaskId, TaskResult, TaskStatus,
};
pub use hive_pane::{DaemonState, MuxDriver, PaneTransport, TmuxDriver};
#[cfg(any(test, feature = "test-support"))]
pub use hive_pane::FakeMuxDriver;
pub use hive_template::{LintFinding, LintLevel, TemplateDiagnosis, TemplateKind, TemplateMatch, TemplateRegistry};

/// The coordination fabric for one fleet of workers: wires C1-C6 over a
/// single `.hive/` root directory.
pub struct Hive {
    fs: Arc<FsSubstrate>,
    router: Arc<Router>,
    sync: Arc<SyncManager>,
    templates: Arc<TemplateRegistry>,
    pane: Arc<PaneTransport>,
    coordination: Arc<CoordinationLoop>,
}

impl Hive {
    /// Construct a `Hive` rooted at `root`, driving a real `tmux` session
    /// named `session`. `assessor` is the pluggable `QualityAssessor` for
    /// `run_cycle` — production callers must supply a real one; the
    /// bundled implementation is a stub for tests.
    pub fn new(
        root: impl Into<PathBuf>,
        session: impl Into<String>,
        assessor: Arc<dyn QualityAssessor>,
    ) -> Result<Self> {
        Self::with_mux(root, Arc::new(TmuxDriver::new()), session, assessor)
    }

    /// Same as [`Self::new`], but with an injectable [`MuxDriver`] — the
    /// seam tests use to supply a `FakeMuxDriver` instead of a real `tmux`
    /// binary.
    pub fn with_mux(
        root: impl Into<PathBuf>,
        mux: Arc<dyn MuxDriver>,
        session: impl Into<String>,
        assessor: Arc<dyn QualityAssessor>,
    ) -> Result<Self> {
        let fs = Arc::new(FsSubstrate::new(root.into()));
        fs.ensure_structure()?;

        let router = Arc::new(Router::new(fs.clone()));
        let sync = Arc::new(SyncManager::new(fs.clone()));
        let templates = Arc::new(TemplateRegistry::with_defaults()?);
        let pane = Arc::new(PaneTransport::new(mux, session));
        let watch = Arc::new(WatchLog::new(fs.clone()));
        let coordination = Arc::new(CoordinationLoop::new(router.clone(), pane.clone(), watch, assessor));

        Ok(Self { fs, router, sync, templates, pane, coordination })
    }

    pub fn root(&self) -> &Path {
        self.fs.root()
    }

    // ---- C2: Message Router --------------------------------------------

    /// Place `message` into its recipient's inbox. Fails with
    /// [`HiveError::Comb`] wrapping [`hive_comb::CombError::Expired`] if
    /// its TTL has already elapsed.
    pub fn send(&self, message: &Message, now: DateTime<Utc>) -> Result<()> {
        Ok(self.router.send(message, now)?)
    }

    /// Collect every eligible message addressed to `worker`, strictly
    /// `(−priority, created_at)` ordered.
    pub fn receive(&self, worker: &str, now: DateTime<Utc>) -> Vec<Message> {
        self.router.receive(worker, now)
    }

    pub fn respond(
        &self,
        original: &Message,
        body: serde_json::Value,
        priority: Option<Priority>,
        now: DateTime<Utc>,
    ) -> Result<Message> {
        Ok(self.router.respond(original, body, priority, now, env::default_message_ttl())?)
    }

    pub fn notify(
        &self,
        from: &str,
        to: &str,
        body: serde_json::Value,
        priority: Option<Priority>,
        now: DateTime<Utc>,
    ) -> Result<Message> {
        Ok(self.router.notify(from, to, body, priority, now, env::default_message_ttl())?)
    }

    pub fn error(
        &self,
        from: &str,
        to: &str,
        msg: &str,
        details: Option<serde_json::Value>,
        now: DateTime<Utc>,
    ) -> Result<Message> {
        Ok(self.router.error(from, to, msg, details, now, env::default_message_ttl())?)
    }

    pub fn reap_expired_messages(&self, now: DateTime<Utc>) -> usize {
        self.router.reap_expired(now)
    }

    pub fn message_stats(&self) -> std::collections::HashMap<String, MessageStats> {
        self.router.stats()
    }

    // ---- C3: Sync Manager ------------------------------------------------

    pub fn acquire(&self, resource: &str, holder: &str, timeout: Duration) -> bool {
        self.sync.acquire(resource, holder, timeout)
    }

    pub fn release(&self, resource: &str, holder: &str) -> bool {
        self.sync.release(resource, holder)
    }

    pub fn is_locked(&self, resource: &str) -> bool {
        self.sync.is_locked(resource)
    }

    pub fn holder(&self, resource: &str) -> Option<String> {
        self.sync.holder(resource)
    }

    pub fn create_barrier(&self, name: &str, expected: u32) {
        self.sync.create_barrier(name, expected)
    }

    pub fn wait_at_barrier(&self, name: &str, worker: &str, timeout: Duration) -> bool {
        self.sync.wait_at_barrier(name, worker, timeout)
    }

    pub fn reap_expired_locks(&self) -> usize {
        self.sync.reap_expired()
    }

    pub fn force_release_by(&self, holder: &str) -> usize {
        self.sync.force_release_by(holder)
    }

    // ---- C4: Template Protocol --------------------------------------------

    pub fn detect(&self, line: &str) -> Option<TemplateMatch> {
        self.templates.detect(line)
    }

    pub fn detect_all(&self, line: &str) -> Vec<TemplateMatch> {
        self.templates.detect_all(line)
    }

    pub fn detect_with_diagnosis(&self, line: &str) -> (Option<TemplateMatch>, Option<TemplateDiagnosis>) {
        self.templates.detect_with_diagnosis(line)
    }

    pub fn validate_config(&self) -> Vec<LintFinding> {
        self.templates.validate_config()
    }

    pub fn validate_message(&self, line: &str) -> Vec<LintFinding> {
        self.templates.validate_message(line)
    }

    // ---- C5: Pane Transport -----------------------------------------------

    pub async fn ensure_session(&self, logical_names: &[String]) -> Result<()> {
        Ok(self.pane.ensure_session(logical_names).await?)
    }

    pub async fn destroy_session(&self) -> Result<()> {
        Ok(self.pane.destroy_session().await?)
    }

    pub async fn send_line(&self, logical_name: &str, text: &str) -> Result<()> {
        Ok(self.pane.send_line(logical_name, text).await?)
    }

    pub async fn send_keys(&self, logical_name: &str, keys: &str) -> Result<()> {
        Ok(self.pane.send_keys(logical_name, keys).await?)
    }

    pub async fn capture(&self, logical_name: &str, tail_lines: u32) -> Result<String> {
        Ok(self.pane.capture(logical_name, tail_lines).await?)
    }

    pub async fn start_daemon(&self, logical_name: &str, command: &str, startup_timeout: Duration) -> Result<bool> {
        Ok(self.pane.start_daemon(logical_name, command, startup_timeout).await?)
    }

    pub async fn send_command_await(
        &self,
        logical_name: &str,
        command: &str,
        response_timeout: Duration,
    ) -> Result<hive_pane::CommandResponse> {
        Ok(self.pane.send_command_await(logical_name, command, response_timeout).await?)
    }

    /// `health_check` itself does not loop — a caller drives the cadence,
    /// defaulting to [`env::health_check_interval`] (configurable,
    /// default 60s).
    pub async fn health_check(&self, logical_name: &str) -> Result<bool> {
        Ok(self.pane.health_check(logical_name).await?)
    }

    pub async fn stop_daemon(&self, logical_name: &str) -> Result<()> {
        Ok(self.pane.stop_daemon(logical_name).await?)
    }

    pub async fn restart_daemon(&self, logical_name: &str, command: &str, startup_timeout: Duration) -> Result<bool> {
        Ok(self.pane.restart_daemon(logical_name, command, startup_timeout).await?)
    }

    pub async fn start_all_daemons(
        &self,
        commands: &std::collections::HashMap<String, String>,
        startup_timeout: Duration,
    ) -> Vec<(String, bool)> {
        self.pane.start_all_daemons(commands, startup_timeout).await
    }

    pub async fn stop_all_daemons(&self) {
        self.pane.stop_all_daemons().await
    }

    pub fn pane(&self, logical_name: &str) -> Option<Pane> {
        self.pane.pane(logical_name)
    }

    // ---- C6: Coordination Loop --------------------------------------------

    pub async fn send_task(&self, worker: &str, instruction: serde_json::Value, opts: SendTaskOptions) -> TaskResult {
        self.coordination.send_task(worker, instruction, opts).await
    }

    pub async fn send_parallel(&self, tasks: Vec<ParallelTask>) -> Vec<TaskResult> {
        self.coordination.send_parallel(tasks).await
    }

    pub async fn run_cycle(&self, worker: &str, spec: serde_json::Value, opts: RunCycleOptions) -> CycleResult {
        self.coordination.run_cycle(worker, spec, opts).await
    }

    /// A clone of the coordination loop's cooperative cancellation token.
    pub fn cancellation_token(&self) -> tokio_util::sync::CancellationToken {
        self.coordination.cancellation_token()
    }

    /// Path to the newline-delimited JSON watch log a monitor tails.
    pub fn watch_log_path(&self) -> PathBuf {
        self.fs.path("logs/watch.jsonl")
    }
}

#[cfg(test)]
#[path = "lib_tests.rs"]
mod tests;
