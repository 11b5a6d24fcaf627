use serde::{Deserialize, Serialize};

/// Snapshot of one top-level window at enumeration time.
///
/// Valid only for the lifetime of the snapshot that produced it: the live
/// window set mutates concurrently, and `handle` values may be reused by
/// the OS once the underlying window is destroyed. Two enumeration calls
/// give independent snapshots with no identity guarantees between them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WindowRecord {
    /// Raw OS window identifier (HWND), carried as a plain integer.
    pub handle: isize,
    /// Decoded title text. Zero-length titles are valid and retained.
    pub title: String,
    /// OS identifier of the owning process.
    pub process_id: u32,
    /// Visibility flag as reported by the OS at enumeration time.
    pub visible: bool,
}

/// Search criteria for a find/list request.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct WindowQuery {
    /// Title to search for. Required unless `list_all` is set.
    #[serde(default)]
    pub title: Option<String>,
    /// Whole-title equality instead of substring containment.
    #[serde(default)]
    pub exact_match: bool,
    /// Compare titles byte-exact; when false both sides are lowercased.
    #[serde(default)]
    pub case_sensitive: bool,
    /// Keep windows whose visibility flag is false.
    #[serde(default)]
    pub include_hidden: bool,
    /// Return every enumerated window, ignoring `title`.
    #[serde(default)]
    pub list_all: bool,
}

impl WindowQuery {
    /// Query matching a title substring, everything else defaulted.
    pub fn titled(title: impl Into<String>) -> Self {
        Self {
            title: Some(title.into()),
            ..Self::default()
        }
    }

    /// Query listing every visible window.
    pub fn all() -> Self {
        Self {
            list_all: true,
            ..Self::default()
        }
    }
}
