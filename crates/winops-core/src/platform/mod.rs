//! Host capability probe.
//!
//! Every boundary operation consults [`check`] before touching native APIs.
//! The probe is a compile-time capability test: cheap, side-effect-free and
//! safe to call on every request.

use crate::errors::WinopsError;

#[derive(Debug, thiserror::Error)]
pub enum PlatformError {
    #[error("This operation requires a Windows host (running on '{current}')")]
    Unsupported { current: &'static str },
}

impl WinopsError for PlatformError {
    fn error_code(&self) -> &'static str {
        match self {
            PlatformError::Unsupported { .. } => "PLATFORM_MISMATCH",
        }
    }

    fn is_user_error(&self) -> bool {
        true
    }
}

/// Verify the host OS supports the native window and process APIs.
pub fn check() -> Result<(), PlatformError> {
    if cfg!(target_os = "windows") {
        Ok(())
    } else {
        Err(PlatformError::Unsupported {
            current: std::env::consts::OS,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[cfg(windows)]
    #[test]
    fn test_check_accepts_windows_host() {
        assert!(check().is_ok());
    }

    #[cfg(not(windows))]
    #[test]
    fn test_check_rejects_non_windows_host() {
        let err = check().unwrap_err();
        assert_eq!(err.error_code(), "PLATFORM_MISMATCH");
        assert!(err.to_string().contains(std::env::consts::OS));
    }

    #[test]
    fn test_check_is_repeatable() {
        // A capability probe, not a stateful init: repeated calls agree.
        assert_eq!(check().is_ok(), check().is_ok());
    }
}
