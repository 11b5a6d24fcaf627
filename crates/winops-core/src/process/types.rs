use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// Lifecycle state of one tracked process.
///
/// Transitions are monotonic: the terminal states (`Completed`,
/// `Terminated`, `Failed`) are never left. `TimedOutPartial` is not
/// terminal: a promoted foreground process keeps running and may still
/// reach `Completed` or `Terminated`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProcessStatus {
    Running,
    Completed,
    TimedOutPartial,
    Terminated,
    Failed,
}

impl ProcessStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            ProcessStatus::Completed | ProcessStatus::Terminated | ProcessStatus::Failed
        )
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ProcessStatus::Running => "running",
            ProcessStatus::Completed => "completed",
            ProcessStatus::TimedOutPartial => "timed_out_partial",
            ProcessStatus::Terminated => "terminated",
            ProcessStatus::Failed => "failed",
        }
    }
}

/// Typed launch parameters. Plain data; validation happens in the
/// launcher, before any spawn attempt.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LaunchRequest {
    /// Executable to run: absolute path, path relative to the current
    /// directory, or a bare name resolved on PATH.
    pub command: String,

    #[serde(default)]
    pub args: Vec<String>,

    /// Working directory for the child. Defaults to the directory
    /// containing the executable.
    #[serde(default)]
    pub working_directory: Option<String>,

    /// Extra environment variables, merged over the inherited environment.
    /// The merge policy is fixed: provided values win on key collision,
    /// everything else is inherited unchanged.
    #[serde(default)]
    pub environment: Option<HashMap<String, String>>,

    /// Overall execution bound in seconds. `None` means no caller bound;
    /// the grace interval still applies to foreground launches.
    #[serde(default)]
    pub timeout_secs: Option<u64>,

    /// Return immediately with a registered handle instead of waiting.
    #[serde(default)]
    pub background: bool,
}

impl LaunchRequest {
    pub fn new(command: impl Into<String>) -> Self {
        Self {
            command: command.into(),
            args: Vec::new(),
            working_directory: None,
            environment: None,
            timeout_secs: None,
            background: false,
        }
    }
}

/// Value-copied view of one tracked process. Raw OS handles never cross
/// this boundary; the opaque `id` (never a reused pid) is the key callers
/// hold on to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProcessSummary {
    /// Opaque unique identifier, assigned at spawn, stable for the tracked
    /// lifetime.
    pub id: String,
    /// OS pid. The OS may reuse it after exit; `id` never is.
    pub pid: Option<u32>,
    pub command: String,
    pub args: Vec<String>,
    pub working_directory: String,
    pub status: ProcessStatus,
    /// Present once the process reached `Completed` or `Terminated` and
    /// the exit status carried a code.
    pub exit_code: Option<i32>,
    /// RFC 3339 spawn timestamp.
    pub started_at: String,
}

/// Buffered output returned by a `get_output` poll.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputReport {
    pub id: String,
    pub stdout: String,
    pub stderr: String,
    pub status: ProcessStatus,
}

/// How one launch ended, from the caller's point of view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LaunchDisposition {
    /// The process exited before any deadline.
    Completed,
    /// The grace interval elapsed; output is partial and the process keeps
    /// running under the registry.
    TimedOutPartial,
    /// The caller timeout elapsed and the process was killed.
    Terminated,
    /// Background launch; the handle was registered without waiting.
    Background,
}

/// Result of one launch: the handle summary plus whatever output was
/// captured while the launcher had control.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LaunchReport {
    pub summary: ProcessSummary,
    pub stdout: String,
    pub stderr: String,
    pub disposition: LaunchDisposition,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_terminal_statuses() {
        assert!(ProcessStatus::Completed.is_terminal());
        assert!(ProcessStatus::Terminated.is_terminal());
        assert!(ProcessStatus::Failed.is_terminal());
        assert!(!ProcessStatus::Running.is_terminal());
        assert!(!ProcessStatus::TimedOutPartial.is_terminal());
    }

    #[test]
    fn test_status_serializes_snake_case() {
        let json = serde_json::to_string(&ProcessStatus::TimedOutPartial).unwrap();
        assert_eq!(json, "\"timed_out_partial\"");
    }

    #[test]
    fn test_launch_request_defaults() {
        let request: LaunchRequest =
            serde_json::from_str(r#"{"command": "notepad.exe"}"#).unwrap();
        assert_eq!(request.command, "notepad.exe");
        assert!(request.args.is_empty());
        assert!(request.working_directory.is_none());
        assert!(request.environment.is_none());
        assert!(request.timeout_secs.is_none());
        assert!(!request.background);
    }

    #[test]
    fn test_status_as_str_matches_serde() {
        for status in [
            ProcessStatus::Running,
            ProcessStatus::Completed,
            ProcessStatus::TimedOutPartial,
            ProcessStatus::Terminated,
            ProcessStatus::Failed,
        ] {
            let json = serde_json::to_string(&status).unwrap();
            assert_eq!(json, format!("\"{}\"", status.as_str()));
        }
    }
}
