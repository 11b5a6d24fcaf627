use crate::errors::WinopsError;

#[derive(Debug, thiserror::Error)]
pub enum ProcessError {
    #[error("Executable not found: {path}")]
    ExecutableNotFound { path: String },

    #[error("Path is not a file: {path}")]
    NotAFile { path: String },

    #[error("Working directory not found or not a directory: {path}")]
    InvalidWorkingDirectory { path: String },

    #[error("Failed to spawn '{command}': {message}")]
    SpawnFailed { command: String, message: String },

    #[error("Failed to terminate process '{id}': {message}")]
    TerminationFailed { id: String, message: String },

    #[error("No tracked process with id '{id}'")]
    NotFound { id: String },

    #[error("Process '{id}' already finished with status '{status}'")]
    AlreadyTerminal { id: String, status: String },

    #[error("Duplicate process id '{id}'")]
    DuplicateId { id: String },

    #[error("Failed to capture output for process '{id}': {message}")]
    CaptureFailed { id: String, message: String },
}

impl WinopsError for ProcessError {
    fn error_code(&self) -> &'static str {
        match self {
            ProcessError::ExecutableNotFound { .. } => "PROCESS_EXECUTABLE_NOT_FOUND",
            ProcessError::NotAFile { .. } => "PROCESS_NOT_A_FILE",
            ProcessError::InvalidWorkingDirectory { .. } => "PROCESS_INVALID_WORKING_DIRECTORY",
            ProcessError::SpawnFailed { .. } => "PROCESS_SPAWN_FAILED",
            ProcessError::TerminationFailed { .. } => "PROCESS_TERMINATION_FAILED",
            ProcessError::NotFound { .. } => "PROCESS_NOT_FOUND",
            ProcessError::AlreadyTerminal { .. } => "PROCESS_ALREADY_TERMINAL",
            ProcessError::DuplicateId { .. } => "PROCESS_DUPLICATE_ID",
            ProcessError::CaptureFailed { .. } => "PROCESS_CAPTURE_FAILED",
        }
    }

    fn is_user_error(&self) -> bool {
        matches!(
            self,
            ProcessError::ExecutableNotFound { .. }
                | ProcessError::NotAFile { .. }
                | ProcessError::InvalidWorkingDirectory { .. }
                | ProcessError::NotFound { .. }
                | ProcessError::AlreadyTerminal { .. }
        )
    }
}
