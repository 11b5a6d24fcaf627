use crate::errors::WinopsError;

#[derive(Debug, thiserror::Error)]
pub enum WindowError {
    #[error("Window enumeration failed: {message}")]
    EnumerationFailed { message: String },

    #[error("Either provide a 'title' to search for or set 'list_all'")]
    InvalidQuery,

    #[error("Window enumeration requires a Windows host")]
    UnsupportedPlatform,
}

impl WinopsError for WindowError {
    fn error_code(&self) -> &'static str {
        match self {
            WindowError::EnumerationFailed { .. } => "WINDOW_ENUMERATION_FAILED",
            WindowError::InvalidQuery => "WINDOW_INVALID_QUERY",
            WindowError::UnsupportedPlatform => "WINDOW_UNSUPPORTED_PLATFORM",
        }
    }

    fn is_user_error(&self) -> bool {
        matches!(self, WindowError::InvalidQuery)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_enumeration_failed_display() {
        let error = WindowError::EnumerationFailed {
            message: "EnumWindows failed with error code 5".to_string(),
        };
        assert_eq!(
            error.to_string(),
            "Window enumeration failed: EnumWindows failed with error code 5"
        );
        assert_eq!(error.error_code(), "WINDOW_ENUMERATION_FAILED");
        assert!(!error.is_user_error());
    }

    #[test]
    fn test_invalid_query_is_user_error() {
        assert!(WindowError::InvalidQuery.is_user_error());
        assert_eq!(WindowError::InvalidQuery.error_code(), "WINDOW_INVALID_QUERY");
    }
}
