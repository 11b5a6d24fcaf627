//! Boundary operations over process launch and the registry.
//!
//! Every operation here guards on the host platform first, then delegates
//! to the platform-neutral core and folds the result into an [`Outcome`].
//! Errors never escape as `Err` from this layer.

use tracing::{error, info, warn};

use crate::config::WinopsConfig;
use crate::outcome::{ErrorKind, Outcome};
use crate::platform;

use super::launcher;
use super::registry::ProcessRegistry;
use super::types::{
    LaunchDisposition, LaunchReport, LaunchRequest, OutputReport, ProcessSummary,
};

fn guard_platform<T>(operation: &'static str) -> Result<(), Outcome<T>> {
    if let Err(e) = platform::check() {
        warn!(
            event = "core.process.platform_rejected",
            operation,
            error = %e,
        );
        return Err(Outcome::failure(ErrorKind::from(&e), e.to_string()));
    }
    Ok(())
}

/// Launch a process and wait, register, kill, or promote it per the
/// request and the configured grace interval.
pub async fn launch(
    request: &LaunchRequest,
    config: &WinopsConfig,
    registry: &ProcessRegistry,
) -> Outcome<LaunchReport> {
    if let Err(outcome) = guard_platform("launch") {
        return outcome;
    }

    info!(
        event = "core.process.launch_started",
        command = %request.command,
        background = request.background,
        timeout_secs = ?request.timeout_secs,
    );

    match launcher::launch(request, config, registry).await {
        Ok(report) => {
            let id = report.summary.id.clone();
            info!(
                event = "core.process.launch_finished",
                id = %id,
                disposition = ?report.disposition,
            );
            match report.disposition {
                LaunchDisposition::Completed => {
                    let message = match report.summary.exit_code {
                        Some(code) => format!("Process exited with code {code}"),
                        None => "Process exited without an exit code".to_string(),
                    };
                    Outcome::success(report, message)
                }
                LaunchDisposition::Background => {
                    Outcome::success(report, format!("Started background process {id}"))
                }
                LaunchDisposition::TimedOutPartial => Outcome::partial(
                    report,
                    format!(
                        "No response after {}s; process {} continues in the background",
                        config.grace_secs, id
                    ),
                ),
                LaunchDisposition::Terminated => Outcome::partial(
                    report,
                    format!(
                        "Process {} terminated after the {}s timeout",
                        id,
                        request.timeout_secs.unwrap_or_default()
                    ),
                ),
            }
        }
        Err(e) => {
            error!(event = "core.process.launch_failed", error = %e);
            Outcome::failure(ErrorKind::from(&e), e.to_string())
        }
    }
}

/// List every tracked process, running or finished.
pub fn list_processes(registry: &ProcessRegistry) -> Outcome<Vec<ProcessSummary>> {
    if let Err(outcome) = guard_platform("list_processes") {
        return outcome;
    }

    let summaries = registry.list();
    let message = format!("{} tracked process(es)", summaries.len());
    info!(event = "core.process.list_completed", count = summaries.len());
    Outcome::success(summaries, message)
}

/// Read buffered output from a tracked process, optionally consuming it.
pub fn get_output(registry: &ProcessRegistry, id: &str, consume: bool) -> Outcome<OutputReport> {
    if let Err(outcome) = guard_platform("get_output") {
        return outcome;
    }

    match registry.get_output(id, consume) {
        Ok(report) => {
            info!(
                event = "core.process.output_read",
                id = %id,
                consume,
                stdout_bytes = report.stdout.len(),
                stderr_bytes = report.stderr.len(),
            );
            let message = format!("Process {} is {}", id, report.status.as_str());
            Outcome::success(report, message)
        }
        Err(e) => {
            warn!(event = "core.process.output_read_failed", id = %id, error = %e);
            Outcome::failure(ErrorKind::from(&e), e.to_string())
        }
    }
}

/// Request termination of a tracked process.
pub fn terminate(registry: &ProcessRegistry, id: &str) -> Outcome<ProcessSummary> {
    if let Err(outcome) = guard_platform("terminate") {
        return outcome;
    }

    match registry.terminate(id) {
        Ok(summary) => {
            info!(event = "core.process.terminate_completed", id = %id);
            Outcome::success(summary, format!("Termination requested for process {id}"))
        }
        Err(e) => {
            warn!(event = "core.process.terminate_failed", id = %id, error = %e);
            Outcome::failure(ErrorKind::from(&e), e.to_string())
        }
    }
}

/// Drop a finished process out of the registry.
pub fn reap(registry: &ProcessRegistry, id: &str) -> Outcome<ProcessSummary> {
    if let Err(outcome) = guard_platform("reap") {
        return outcome;
    }

    match registry.remove(id) {
        Ok(summary) => {
            info!(event = "core.process.reap_completed", id = %id);
            Outcome::success(summary, format!("Process {id} removed from the registry"))
        }
        Err(e) => {
            warn!(event = "core.process.reap_failed", id = %id, error = %e);
            Outcome::failure(ErrorKind::from(&e), e.to_string())
        }
    }
}
