//! Uniform result shape for every boundary operation.
//!
//! All operations terminate here: launches, window queries and registry
//! management all normalize into [`Outcome`] so a caller can branch on the
//! `status` tag and [`ErrorKind`] without string-matching messages.

use serde::Serialize;

use crate::platform::PlatformError;
use crate::process::errors::ProcessError;
use crate::windows::errors::WindowError;

/// Stable error taxonomy surfaced to callers.
///
/// The kind hides where a failure originated (platform probe, validation,
/// OS call) behind a fixed set of tags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    PlatformMismatch,
    ExecutableNotFound,
    InvalidWorkingDirectory,
    InvalidParameter,
    EnumerationFailure,
    SpawnFailure,
    TerminationFailure,
    NotFound,
}

/// Normalized result of one operation.
///
/// `Partial` is success-shaped: it carries real payload data plus the
/// reason the operation could not run to full completion (a foreground
/// launch that hit the grace interval, or one killed at its timeout).
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Outcome<T> {
    Success { payload: T, message: String },
    Partial { payload: T, reason: String },
    Failure { kind: ErrorKind, message: String },
}

impl<T> Outcome<T> {
    pub fn success(payload: T, message: impl Into<String>) -> Self {
        Outcome::Success {
            payload,
            message: message.into(),
        }
    }

    pub fn partial(payload: T, reason: impl Into<String>) -> Self {
        Outcome::Partial {
            payload,
            reason: reason.into(),
        }
    }

    pub fn failure(kind: ErrorKind, message: impl Into<String>) -> Self {
        Outcome::Failure {
            kind,
            message: message.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Outcome::Success { .. })
    }

    pub fn is_partial(&self) -> bool {
        matches!(self, Outcome::Partial { .. })
    }

    pub fn is_failure(&self) -> bool {
        matches!(self, Outcome::Failure { .. })
    }

    /// The error kind, if this outcome is a failure.
    pub fn error_kind(&self) -> Option<ErrorKind> {
        match self {
            Outcome::Failure { kind, .. } => Some(*kind),
            _ => None,
        }
    }

    /// The payload, if this outcome carries one.
    pub fn payload(&self) -> Option<&T> {
        match self {
            Outcome::Success { payload, .. } | Outcome::Partial { payload, .. } => Some(payload),
            Outcome::Failure { .. } => None,
        }
    }
}

impl From<&PlatformError> for ErrorKind {
    fn from(_: &PlatformError) -> Self {
        ErrorKind::PlatformMismatch
    }
}

impl From<&ProcessError> for ErrorKind {
    fn from(err: &ProcessError) -> Self {
        match err {
            ProcessError::ExecutableNotFound { .. } => ErrorKind::ExecutableNotFound,
            ProcessError::InvalidWorkingDirectory { .. } => ErrorKind::InvalidWorkingDirectory,
            ProcessError::NotAFile { .. }
            | ProcessError::AlreadyTerminal { .. }
            | ProcessError::DuplicateId { .. } => ErrorKind::InvalidParameter,
            ProcessError::SpawnFailed { .. } | ProcessError::CaptureFailed { .. } => {
                ErrorKind::SpawnFailure
            }
            ProcessError::TerminationFailed { .. } => ErrorKind::TerminationFailure,
            ProcessError::NotFound { .. } => ErrorKind::NotFound,
        }
    }
}

impl From<&WindowError> for ErrorKind {
    fn from(err: &WindowError) -> Self {
        match err {
            WindowError::EnumerationFailed { .. } => ErrorKind::EnumerationFailure,
            WindowError::InvalidQuery => ErrorKind::InvalidParameter,
            WindowError::UnsupportedPlatform => ErrorKind::PlatformMismatch,
        }
    }
}
