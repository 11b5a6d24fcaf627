//! Executable resolution and child spawn.
//!
//! All request validation happens here, before any OS resource is created.
//! Stdout and stderr are always piped into bounded capture buffers; the
//! child never inherits the host's streams.

use std::path::{Path, PathBuf};
use std::process::Stdio;

use tokio::process::Command;
use tracing::info;
use uuid::Uuid;

use crate::config::WinopsConfig;

use super::errors::ProcessError;
use super::output::{self, SharedCapture};
use super::registry::{ProcessEntry, ProcessRegistry};
use super::supervisor;
use super::types::{
    LaunchDisposition, LaunchReport, LaunchRequest, ProcessStatus, ProcessSummary,
};

/// A freshly spawned child plus everything the supervisor needs to track
/// it. Internal to the process module.
pub(crate) struct SpawnedProcess {
    pub summary: ProcessSummary,
    pub child: tokio::process::Child,
    pub stdout: SharedCapture,
    pub stderr: SharedCapture,
    pub reader_handles: Vec<tokio::task::JoinHandle<()>>,
}

/// Resolve a command string to a concrete executable file.
///
/// Anything containing a path separator is treated as a filesystem path
/// and must point at an existing regular file; a bare name is looked up on
/// PATH.
pub(crate) fn resolve_executable(command: &str) -> Result<PathBuf, ProcessError> {
    let looks_like_path = command.contains('/') || command.contains('\\');
    if looks_like_path {
        let path = Path::new(command);
        if !path.exists() {
            return Err(ProcessError::ExecutableNotFound {
                path: command.to_string(),
            });
        }
        if !path.is_file() {
            return Err(ProcessError::NotAFile {
                path: command.to_string(),
            });
        }
        // Absolute form, so the default working directory (the executable's
        // parent) is well-defined even for relative inputs.
        path.canonicalize()
            .map_err(|_| ProcessError::ExecutableNotFound {
                path: command.to_string(),
            })
    } else {
        which::which(command).map_err(|_| ProcessError::ExecutableNotFound {
            path: command.to_string(),
        })
    }
}

/// Pick the child's working directory: the caller's choice if given
/// (validated), otherwise the directory containing the executable.
pub(crate) fn resolve_working_directory(
    requested: Option<&str>,
    executable: &Path,
) -> Result<PathBuf, ProcessError> {
    match requested {
        Some(dir) => {
            let path = Path::new(dir);
            if !path.is_dir() {
                return Err(ProcessError::InvalidWorkingDirectory {
                    path: dir.to_string(),
                });
            }
            Ok(path.to_path_buf())
        }
        None => Ok(executable
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from("."))),
    }
}

/// Validate the request, spawn the child, and wire up capture readers.
pub(crate) fn spawn(
    request: &LaunchRequest,
    config: &WinopsConfig,
) -> Result<SpawnedProcess, ProcessError> {
    let executable = resolve_executable(&request.command)?;
    let working_directory =
        resolve_working_directory(request.working_directory.as_deref(), &executable)?;

    let mut command = Command::new(&executable);
    command
        .args(&request.args)
        .current_dir(&working_directory)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        // The child must outlive promotion into the registry
        .kill_on_drop(false);
    // Command inherits the host environment; provided values win on
    // key collision.
    if let Some(environment) = &request.environment {
        command.envs(environment);
    }

    let mut child = command.spawn().map_err(|e| ProcessError::SpawnFailed {
        command: request.command.clone(),
        message: e.to_string(),
    })?;

    let id = Uuid::new_v4().to_string();
    let pid = child.id();

    let stdout_pipe = child.stdout.take().ok_or_else(|| ProcessError::CaptureFailed {
        id: id.clone(),
        message: "child stdout was not piped".to_string(),
    })?;
    let stderr_pipe = child.stderr.take().ok_or_else(|| ProcessError::CaptureFailed {
        id: id.clone(),
        message: "child stderr was not piped".to_string(),
    })?;

    let stdout = output::shared_capture(config.capture_buffer_bytes);
    let stderr = output::shared_capture(config.capture_buffer_bytes);
    let reader_handles = vec![
        output::spawn_stream_reader(id.clone(), "stdout", stdout_pipe, stdout.clone()),
        output::spawn_stream_reader(id.clone(), "stderr", stderr_pipe, stderr.clone()),
    ];

    let summary = ProcessSummary {
        id: id.clone(),
        pid,
        command: request.command.clone(),
        args: request.args.clone(),
        working_directory: working_directory.to_string_lossy().into_owned(),
        status: ProcessStatus::Running,
        exit_code: None,
        started_at: chrono::Utc::now().to_rfc3339(),
    };

    info!(
        event = "core.process.spawned",
        id = %id,
        pid = ?pid,
        command = %request.command,
        background = request.background,
    );

    Ok(SpawnedProcess {
        summary,
        child,
        stdout,
        stderr,
        reader_handles,
    })
}

/// Launch a process per the request.
///
/// Background launches register a handle and return immediately.
/// Foreground launches hand the child to the supervisor, which waits
/// against the caller timeout and the grace interval.
pub async fn launch(
    request: &LaunchRequest,
    config: &WinopsConfig,
    registry: &ProcessRegistry,
) -> Result<LaunchReport, ProcessError> {
    let spawned = spawn(request, config)?;

    if request.background {
        let summary = spawned.summary.clone();
        registry.register(ProcessEntry::new(
            spawned.summary,
            Some(spawned.child),
            spawned.stdout,
            spawned.stderr,
        ))?;
        registry.spawn_exit_watcher(summary.id.clone(), config.poll_interval());
        // Readers keep running detached, feeding the registry buffers
        drop(spawned.reader_handles);

        info!(event = "core.process.background_registered", id = %summary.id);
        return Ok(LaunchReport {
            summary,
            stdout: String::new(),
            stderr: String::new(),
            disposition: LaunchDisposition::Background,
        });
    }

    supervisor::supervise(spawned, request.timeout_secs, config, registry).await
}
