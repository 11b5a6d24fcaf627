//! One synchronous pass over the OS's top-level window set.
//!
//! Traversal order is whatever `EnumWindows` yields (top-to-bottom z-order
//! on current Windows versions); callers must not depend on more than
//! "deterministic for a given OS state".

use super::errors::WindowError;
use super::types::WindowRecord;

/// Walk all top-level windows and snapshot title, owning pid and
/// visibility for each.
///
/// When `include_hidden` is false, windows whose visibility flag is off are
/// dropped during the pass. A failure of the enumeration call itself (as
/// opposed to an empty window set) is `EnumerationFailed`, never a silent
/// partial list.
#[cfg(windows)]
pub fn enumerate_all(include_hidden: bool) -> Result<Vec<WindowRecord>, WindowError> {
    use tracing::info;
    use windows_sys::Win32::Foundation::{GetLastError, HWND, LPARAM};
    use windows_sys::Win32::UI::WindowsAndMessaging::{
        EnumWindows, GetWindowTextLengthW, GetWindowTextW, GetWindowThreadProcessId,
        IsWindowVisible,
    };

    struct EnumState {
        records: Vec<WindowRecord>,
        include_hidden: bool,
    }

    /// Title text for one window. Empty titles are valid; a zero length
    /// needs no text query at all.
    unsafe fn window_text(hwnd: HWND) -> String {
        let length = unsafe { GetWindowTextLengthW(hwnd) };
        if length <= 0 {
            return String::new();
        }
        let mut buffer = vec![0_u16; length as usize + 1];
        let copied = unsafe { GetWindowTextW(hwnd, buffer.as_mut_ptr(), buffer.len() as i32) };
        String::from_utf16_lossy(&buffer[..copied as usize])
    }

    unsafe extern "system" fn enum_callback(hwnd: HWND, lparam: LPARAM) -> i32 {
        let state = unsafe { &mut *(lparam as *mut EnumState) };

        let visible = unsafe { IsWindowVisible(hwnd) } != 0;
        if !visible && !state.include_hidden {
            return 1; // keep walking
        }

        let title = unsafe { window_text(hwnd) };

        let mut process_id: u32 = 0;
        unsafe { GetWindowThreadProcessId(hwnd, &mut process_id) };

        state.records.push(WindowRecord {
            handle: hwnd as isize,
            title,
            process_id,
            visible,
        });

        1 // continue enumeration even when a window yields empty data
    }

    let mut state = EnumState {
        records: Vec::new(),
        include_hidden,
    };

    let ok = unsafe {
        EnumWindows(
            Some(enum_callback),
            &mut state as *mut EnumState as LPARAM,
        )
    };
    if ok == 0 {
        let code = unsafe { GetLastError() };
        return Err(WindowError::EnumerationFailed {
            message: format!("EnumWindows failed with error code {code}"),
        });
    }

    info!(
        event = "core.window.enumerate_completed",
        include_hidden = include_hidden,
        count = state.records.len()
    );
    Ok(state.records)
}

/// The enumeration pass needs the Win32 window manager; on any other host
/// the platform guard rejects the request before this is reached.
#[cfg(not(windows))]
pub fn enumerate_all(_include_hidden: bool) -> Result<Vec<WindowRecord>, WindowError> {
    Err(WindowError::UnsupportedPlatform)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[cfg(windows)]
    #[test]
    fn test_enumerate_returns_snapshot() {
        // A desktop session always has at least one top-level window
        // (the shell), and every record must carry the reported flag.
        let records = enumerate_all(true).unwrap();
        assert!(!records.is_empty());

        let visible_only = enumerate_all(false).unwrap();
        assert!(visible_only.iter().all(|r| r.visible));
        assert!(visible_only.len() <= records.len());
    }

    #[cfg(not(windows))]
    #[test]
    fn test_enumerate_unsupported_off_windows() {
        let err = enumerate_all(false).unwrap_err();
        assert!(matches!(err, WindowError::UnsupportedPlatform));
    }
}
