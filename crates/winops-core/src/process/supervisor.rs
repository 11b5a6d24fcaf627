//! Foreground wait logic: caller timeout, grace interval, promotion.
//!
//! A foreground launch waits for exit bounded by the smaller of the caller
//! timeout and the grace interval. Which bound fired decides the outcome:
//! the caller timeout kills the child; the grace interval promotes it into
//! the registry with whatever output has arrived so far, and the process
//! keeps running. A caller timeout longer than the grace interval stops
//! applying once the launch has been promoted.

use std::time::Duration;

use tokio::task::JoinHandle;
use tracing::{info, warn};

use crate::config::WinopsConfig;

use super::errors::ProcessError;
use super::launcher::SpawnedProcess;
use super::output::{self, SharedCapture};
use super::registry::{ProcessEntry, ProcessRegistry};
use super::types::{LaunchDisposition, LaunchReport, ProcessStatus};

/// Upper bound on post-exit cleanup waits (pipe drain, kill confirmation).
/// A grandchild holding the pipe open must not hang the caller.
const CLEANUP_GUARD: Duration = Duration::from_secs(2);

pub(crate) async fn supervise(
    mut spawned: SpawnedProcess,
    timeout_secs: Option<u64>,
    config: &WinopsConfig,
    registry: &ProcessRegistry,
) -> Result<LaunchReport, ProcessError> {
    let grace = config.grace_interval();
    let caller_bound = timeout_secs.map(Duration::from_secs);

    // The effective wait bound, and whether its expiry means "kill" (caller
    // timeout) or "promote" (grace interval).
    let (wait_bound, kill_on_expiry) = match caller_bound {
        Some(t) if t <= grace => (t, true),
        _ => (grace, false),
    };

    match tokio::time::timeout(wait_bound, spawned.child.wait()).await {
        Ok(Ok(exit_status)) => {
            drain_readers(spawned.reader_handles).await;
            spawned.summary.status = ProcessStatus::Completed;
            spawned.summary.exit_code = exit_status.code();

            info!(
                event = "core.process.completed",
                id = %spawned.summary.id,
                exit_code = ?spawned.summary.exit_code,
            );
            Ok(LaunchReport {
                stdout: snapshot(&spawned.stdout),
                stderr: snapshot(&spawned.stderr),
                summary: spawned.summary,
                disposition: LaunchDisposition::Completed,
            })
        }
        Ok(Err(e)) => {
            // Exit status collection failed; the child's state is unknown,
            // so issue a kill before reporting.
            let _ = spawned.child.start_kill();
            warn!(
                event = "core.process.wait_failed",
                id = %spawned.summary.id,
                error = %e,
            );
            Err(ProcessError::SpawnFailed {
                command: spawned.summary.command,
                message: format!("failed to collect exit status: {e}"),
            })
        }
        Err(_) if kill_on_expiry => {
            let id = spawned.summary.id.clone();
            if let Err(e) = spawned.child.start_kill() {
                return Err(ProcessError::TerminationFailed {
                    id,
                    message: e.to_string(),
                });
            }
            let exit_code = match tokio::time::timeout(CLEANUP_GUARD, spawned.child.wait()).await
            {
                Ok(Ok(status)) => status.code(),
                _ => None,
            };
            drain_readers(spawned.reader_handles).await;

            spawned.summary.status = ProcessStatus::Terminated;
            spawned.summary.exit_code = exit_code;
            warn!(
                event = "core.process.timeout_killed",
                id = %id,
                timeout_secs = ?timeout_secs,
            );
            Ok(LaunchReport {
                stdout: snapshot(&spawned.stdout),
                stderr: snapshot(&spawned.stderr),
                summary: spawned.summary,
                disposition: LaunchDisposition::Terminated,
            })
        }
        Err(_) => {
            // Grace expired: snapshot now, keep the child alive under the
            // registry. Readers detach and keep feeding the shared buffers.
            let stdout = snapshot(&spawned.stdout);
            let stderr = snapshot(&spawned.stderr);
            spawned.summary.status = ProcessStatus::TimedOutPartial;
            let summary = spawned.summary.clone();

            registry.register(ProcessEntry::new(
                spawned.summary,
                Some(spawned.child),
                spawned.stdout,
                spawned.stderr,
            ))?;
            registry.spawn_exit_watcher(summary.id.clone(), config.poll_interval());
            drop(spawned.reader_handles);

            warn!(
                event = "core.process.grace_promoted",
                id = %summary.id,
                grace_secs = config.grace_secs,
            );
            Ok(LaunchReport {
                summary,
                stdout,
                stderr,
                disposition: LaunchDisposition::TimedOutPartial,
            })
        }
    }
}

async fn drain_readers(handles: Vec<JoinHandle<()>>) {
    for handle in handles {
        // On guard expiry the handle drops and the reader detaches
        let _ = tokio::time::timeout(CLEANUP_GUARD, handle).await;
    }
}

fn snapshot(capture: &SharedCapture) -> String {
    let bytes = output::lock_capture(capture).contents();
    String::from_utf8_lossy(&bytes).into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::process::launcher;
    use crate::process::types::LaunchRequest;

    fn short_grace_config() -> WinopsConfig {
        WinopsConfig {
            grace_secs: 1,
            poll_interval_ms: 20,
            capture_buffer_bytes: 64 * 1024,
        }
    }

    fn sh_request(script: &str) -> LaunchRequest {
        LaunchRequest {
            args: vec!["-c".to_string(), script.to_string()],
            ..LaunchRequest::new("sh")
        }
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_fast_exit_completes_with_output() {
        let config = WinopsConfig::default();
        let registry = ProcessRegistry::new();
        let request = sh_request("printf out; printf err >&2");

        let report = launcher::launch(&request, &config, &registry).await.unwrap();
        assert_eq!(report.disposition, LaunchDisposition::Completed);
        assert_eq!(report.summary.status, ProcessStatus::Completed);
        assert_eq!(report.summary.exit_code, Some(0));
        assert_eq!(report.stdout, "out");
        assert_eq!(report.stderr, "err");
        // Foreground completion never touches the registry
        assert_eq!(registry.count(), 0);
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_nonzero_exit_is_still_completed() {
        let config = WinopsConfig::default();
        let registry = ProcessRegistry::new();
        let request = sh_request("exit 3");

        let report = launcher::launch(&request, &config, &registry).await.unwrap();
        assert_eq!(report.disposition, LaunchDisposition::Completed);
        assert_eq!(report.summary.exit_code, Some(3));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_caller_timeout_kills_child() {
        let config = short_grace_config();
        let registry = ProcessRegistry::new();
        let request = LaunchRequest {
            timeout_secs: Some(1),
            ..sh_request("printf before; sleep 10; printf after")
        };

        let report = launcher::launch(&request, &config, &registry).await.unwrap();
        assert_eq!(report.disposition, LaunchDisposition::Terminated);
        assert_eq!(report.summary.status, ProcessStatus::Terminated);
        assert_eq!(report.stdout, "before");
        // A killed launch is never handed to the registry
        assert_eq!(registry.count(), 0);
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_grace_expiry_promotes_to_registry() {
        let config = short_grace_config();
        let registry = ProcessRegistry::new();
        let request = sh_request("printf early; sleep 10");

        let report = launcher::launch(&request, &config, &registry).await.unwrap();
        assert_eq!(report.disposition, LaunchDisposition::TimedOutPartial);
        assert_eq!(report.summary.status, ProcessStatus::TimedOutPartial);
        assert_eq!(report.stdout, "early");

        assert_eq!(registry.count(), 1);
        let tracked = registry.get_summary(&report.summary.id).unwrap();
        assert_eq!(tracked.status, ProcessStatus::TimedOutPartial);

        registry.terminate(&report.summary.id).unwrap();
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_timeout_longer_than_grace_promotes_instead_of_killing() {
        let config = short_grace_config();
        let registry = ProcessRegistry::new();
        let request = LaunchRequest {
            timeout_secs: Some(600),
            ..sh_request("sleep 10")
        };

        let report = launcher::launch(&request, &config, &registry).await.unwrap();
        assert_eq!(report.disposition, LaunchDisposition::TimedOutPartial);
        assert_eq!(registry.count(), 1);

        registry.terminate(&report.summary.id).unwrap();
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_promoted_process_reaches_completed() {
        let config = short_grace_config();
        let registry = ProcessRegistry::new();
        let request = sh_request("sleep 2; printf late");

        let report = launcher::launch(&request, &config, &registry).await.unwrap();
        assert_eq!(report.disposition, LaunchDisposition::TimedOutPartial);
        let id = report.summary.id.clone();

        // The exit watcher should observe the exit shortly after second 2,
        // and the detached readers drain the final output into the registry
        let deadline = std::time::Instant::now() + Duration::from_secs(5);
        loop {
            let summary = registry.get_summary(&id).unwrap();
            let output = registry.get_output(&id, false).unwrap();
            if summary.status == ProcessStatus::Completed && output.stdout == "late" {
                assert_eq!(summary.exit_code, Some(0));
                break;
            }
            assert!(
                std::time::Instant::now() < deadline,
                "promoted process never reached completed with drained output"
            );
            tokio::time::sleep(Duration::from_millis(50)).await;
        }
    }
}
