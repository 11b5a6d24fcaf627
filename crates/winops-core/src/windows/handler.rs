//! Boundary operation for window discovery: guard, validate, enumerate,
//! filter, format.

use tracing::{info, warn};

use crate::outcome::{ErrorKind, Outcome};
use crate::platform;

use super::enumerate;
use super::errors::WindowError;
use super::filter::filter_records;
use super::types::{WindowQuery, WindowRecord};

/// A search needs a title; a listing does not.
pub(crate) fn validate_query(query: &WindowQuery) -> Result<(), WindowError> {
    if !query.list_all && query.title.is_none() {
        return Err(WindowError::InvalidQuery);
    }
    Ok(())
}

/// Find or list top-level windows matching the query.
///
/// The platform guard runs first so no native call is attempted on an
/// unsupported host. The enumeration pass is synchronous at the OS level,
/// so it is dispatched to the blocking pool rather than stalling other
/// tasks on the cooperative scheduler.
pub async fn find_windows(query: &WindowQuery) -> Outcome<Vec<WindowRecord>> {
    info!(
        event = "core.window.find_started",
        list_all = query.list_all,
        exact_match = query.exact_match,
        include_hidden = query.include_hidden,
    );

    if let Err(e) = platform::check() {
        warn!(event = "core.window.platform_rejected", error = %e);
        return Outcome::failure(ErrorKind::from(&e), e.to_string());
    }

    if let Err(e) = validate_query(query) {
        warn!(event = "core.window.query_rejected", error = %e);
        return Outcome::failure(ErrorKind::from(&e), e.to_string());
    }

    let include_hidden = query.include_hidden;
    let snapshot =
        match tokio::task::spawn_blocking(move || enumerate::enumerate_all(include_hidden)).await {
            Ok(Ok(records)) => records,
            Ok(Err(e)) => {
                warn!(event = "core.window.enumerate_failed", error = %e);
                return Outcome::failure(ErrorKind::from(&e), e.to_string());
            }
            Err(e) => {
                warn!(event = "core.window.enumerate_join_failed", error = %e);
                return Outcome::failure(
                    ErrorKind::EnumerationFailure,
                    format!("window enumeration task failed: {e}"),
                );
            }
        };

    let matched = filter_records(snapshot, query);
    let count = matched.len();
    info!(event = "core.window.find_completed", count = count);
    Outcome::success(matched, format!("Found {count} window(s)"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_rejects_titleless_search() {
        let err = validate_query(&WindowQuery::default()).unwrap_err();
        assert!(matches!(err, WindowError::InvalidQuery));
    }

    #[test]
    fn test_validate_accepts_list_all_without_title() {
        assert!(validate_query(&WindowQuery::all()).is_ok());
    }

    #[test]
    fn test_validate_accepts_titled_search() {
        assert!(validate_query(&WindowQuery::titled("Notepad")).is_ok());
    }

    #[cfg(not(windows))]
    #[tokio::test]
    async fn test_find_windows_rejects_non_windows_host() {
        let outcome = find_windows(&WindowQuery::all()).await;
        assert_eq!(outcome.error_kind(), Some(ErrorKind::PlatformMismatch));
    }

    #[cfg(windows)]
    #[tokio::test]
    async fn test_find_windows_lists_desktop() {
        let outcome = find_windows(&WindowQuery::all()).await;
        let records = outcome.payload().expect("listing should succeed");
        assert!(!records.is_empty());
        assert!(records.iter().all(|r| r.visible));
    }

    #[cfg(windows)]
    #[tokio::test]
    async fn test_find_windows_rejects_titleless_search() {
        let outcome = find_windows(&WindowQuery::default()).await;
        assert_eq!(outcome.error_kind(), Some(ErrorKind::InvalidParameter));
    }
}
