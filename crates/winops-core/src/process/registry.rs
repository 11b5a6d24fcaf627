//! Shared store of background and promoted processes.
//!
//! The registry is the only shared mutable state in the crate. It is
//! constructed explicitly at host start and handed to callers by clone (the
//! inner map is behind an `Arc`); there is no ambient global. Entries leave the map
//! only through [`ProcessRegistry::remove`], never silently while running.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, RwLock};
use std::time::Duration;

use tokio::process::Child;
use tracing::{debug, info, warn};

use super::errors::ProcessError;
use super::output::{self, SharedCapture};
use super::probe;
use super::types::{OutputReport, ProcessStatus, ProcessSummary};

/// One tracked process. `child` holds the OS handle while the process may
/// still be running; the exit watcher reaps it exactly once.
pub struct ProcessEntry {
    pub summary: ProcessSummary,
    pub child: Option<Child>,
    pub stdout: SharedCapture,
    pub stderr: SharedCapture,
}

impl ProcessEntry {
    pub fn new(
        summary: ProcessSummary,
        child: Option<Child>,
        stdout: SharedCapture,
        stderr: SharedCapture,
    ) -> Self {
        Self {
            summary,
            child,
            stdout,
            stderr,
        }
    }
}

type SharedEntry = Arc<Mutex<ProcessEntry>>;

fn lock_entry(entry: &SharedEntry) -> MutexGuard<'_, ProcessEntry> {
    match entry.lock() {
        Ok(guard) => guard,
        // A panic while holding the lock leaves the entry usable; the
        // summary and buffers are plain data.
        Err(poisoned) => poisoned.into_inner(),
    }
}

/// Concurrency-safe mapping from opaque process id to tracked entry.
///
/// The outer map lock is held only for lookup and insert; each entry has
/// its own lock, so reading output from one process never blocks
/// terminating another.
#[derive(Clone, Default)]
pub struct ProcessRegistry {
    entries: Arc<RwLock<HashMap<String, SharedEntry>>>,
}

impl ProcessRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    fn read_map(&self) -> std::sync::RwLockReadGuard<'_, HashMap<String, SharedEntry>> {
        match self.entries.read() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    fn write_map(&self) -> std::sync::RwLockWriteGuard<'_, HashMap<String, SharedEntry>> {
        match self.entries.write() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    fn entry(&self, id: &str) -> Result<SharedEntry, ProcessError> {
        self.read_map()
            .get(id)
            .cloned()
            .ok_or_else(|| ProcessError::NotFound { id: id.to_string() })
    }

    fn entry_opt(&self, id: &str) -> Option<SharedEntry> {
        self.read_map().get(id).cloned()
    }

    /// Insert a freshly spawned entry. Ids are uuids, so a collision means
    /// a caller bug rather than exhaustion.
    pub fn register(&self, entry: ProcessEntry) -> Result<(), ProcessError> {
        let id = entry.summary.id.clone();
        let mut map = self.write_map();
        if map.contains_key(&id) {
            return Err(ProcessError::DuplicateId { id });
        }
        map.insert(id.clone(), Arc::new(Mutex::new(entry)));
        drop(map);

        debug!(event = "core.process.registered", id = %id);
        Ok(())
    }

    /// Snapshot of every tracked entry regardless of status, ordered by
    /// spawn time (ties broken by id).
    pub fn list(&self) -> Vec<ProcessSummary> {
        let entries: Vec<SharedEntry> = self.read_map().values().cloned().collect();

        let mut summaries: Vec<ProcessSummary> = entries
            .iter()
            .map(|entry| lock_entry(entry).summary.clone())
            .collect();
        summaries.sort_by(|a, b| {
            a.started_at
                .cmp(&b.started_at)
                .then_with(|| a.id.cmp(&b.id))
        });
        summaries
    }

    /// Currently buffered output plus status.
    ///
    /// With `consume` the buffers are drained up to the point read, so
    /// repeated polling never returns duplicate data. Status is never
    /// touched here.
    pub fn get_output(&self, id: &str, consume: bool) -> Result<OutputReport, ProcessError> {
        let entry = self.entry(id)?;
        let guard = lock_entry(&entry);

        let stdout = read_capture(&guard.stdout, consume);
        let stderr = read_capture(&guard.stderr, consume);
        Ok(OutputReport {
            id: id.to_string(),
            stdout,
            stderr,
            status: guard.summary.status,
        })
    }

    /// Current summary for one entry.
    pub fn get_summary(&self, id: &str) -> Result<ProcessSummary, ProcessError> {
        let entry = self.entry(id)?;
        let guard = lock_entry(&entry);
        Ok(guard.summary.clone())
    }

    /// Request OS-level termination of a running entry.
    ///
    /// The kill is best-effort: the status flips to `Terminated` once the
    /// request has been issued, even though actual process death may lag.
    /// Buffered output stays readable afterwards.
    pub fn terminate(&self, id: &str) -> Result<ProcessSummary, ProcessError> {
        let entry = self.entry(id)?;
        let mut guard = lock_entry(&entry);

        if guard.summary.status.is_terminal() {
            return Err(ProcessError::AlreadyTerminal {
                id: id.to_string(),
                status: guard.summary.status.as_str().to_string(),
            });
        }

        if let Some(child) = guard.child.as_mut() {
            // The child may have exited between polls; record that instead
            // of killing a pid the OS could already have reused.
            match child.try_wait() {
                Ok(Some(status)) => {
                    guard.summary.exit_code = status.code();
                    guard.summary.status = ProcessStatus::Completed;
                    guard.child = None;
                    return Err(ProcessError::AlreadyTerminal {
                        id: id.to_string(),
                        status: guard.summary.status.as_str().to_string(),
                    });
                }
                Ok(None) => {}
                Err(e) => {
                    warn!(event = "core.process.status_check_failed", id = %id, error = %e);
                }
            }

            if let Err(e) = child.start_kill() {
                return Err(ProcessError::TerminationFailed {
                    id: id.to_string(),
                    message: e.to_string(),
                });
            }
        }

        guard.summary.status = ProcessStatus::Terminated;
        info!(event = "core.process.terminate_requested", id = %id, pid = ?guard.summary.pid);
        Ok(guard.summary.clone())
    }

    /// Explicitly reap one entry out of the registry.
    pub fn remove(&self, id: &str) -> Result<ProcessSummary, ProcessError> {
        let entry = self
            .write_map()
            .remove(id)
            .ok_or_else(|| ProcessError::NotFound { id: id.to_string() })?;

        let guard = lock_entry(&entry);
        if !guard.summary.status.is_terminal() {
            let still_alive = guard.summary.pid.is_some_and(probe::is_process_running);
            warn!(
                event = "core.process.removed_while_live",
                id = %id,
                status = guard.summary.status.as_str(),
                still_alive,
                "Entry reaped before reaching a terminal status",
            );
        } else {
            info!(event = "core.process.removed", id = %id);
        }
        Ok(guard.summary.clone())
    }

    /// Number of tracked entries.
    pub fn count(&self) -> usize {
        self.read_map().len()
    }

    /// Spawn the per-entry watcher that notices child exit.
    ///
    /// Polls `try_wait` at the configured interval; when the child exits it
    /// records the exit code and moves a non-terminal status to
    /// `Completed`. A terminal status (e.g. `Terminated`) is never
    /// overwritten; transitions are monotonic.
    pub fn spawn_exit_watcher(
        &self,
        id: String,
        poll_interval: Duration,
    ) -> tokio::task::JoinHandle<()> {
        let registry = self.clone();
        tokio::spawn(async move {
            loop {
                tokio::time::sleep(poll_interval).await;

                let Some(entry) = registry.entry_opt(&id) else {
                    // Reaped out of the registry; nothing left to watch.
                    break;
                };

                let mut guard = lock_entry(&entry);
                let Some(child) = guard.child.as_mut() else {
                    break;
                };

                match child.try_wait() {
                    Ok(Some(status)) => {
                        guard.summary.exit_code = status.code();
                        if !guard.summary.status.is_terminal() {
                            guard.summary.status = ProcessStatus::Completed;
                        }
                        guard.child = None;
                        info!(
                            event = "core.process.exited",
                            id = %id,
                            exit_code = ?guard.summary.exit_code,
                            status = guard.summary.status.as_str(),
                        );
                        break;
                    }
                    Ok(None) => {}
                    Err(e) => {
                        warn!(event = "core.process.wait_failed", id = %id, error = %e);
                        if !guard.summary.status.is_terminal() {
                            guard.summary.status = ProcessStatus::Failed;
                        }
                        break;
                    }
                }
            }
        })
    }
}

fn read_capture(capture: &SharedCapture, consume: bool) -> String {
    let mut guard = output::lock_capture(capture);
    let bytes = if consume {
        guard.take()
    } else {
        guard.contents()
    };
    String::from_utf8_lossy(&bytes).into_owned()
}
