//! winops-core: process launching and window discovery for a Windows desktop host
//!
//! This library provides the OS-facing core of winops: validating and
//! spawning external executables (foreground with a smart timeout, or
//! background under a shared registry) and enumerating/filtering the set of
//! currently open top-level windows. The protocol layer that dispatches
//! named tools sits above this crate and hands it already-validated, typed
//! requests.
//!
//! # Main Entry Points
//!
//! - [`process_ops`] - Launch, list, poll and terminate external processes
//! - [`window_ops`] - Enumerate and filter top-level windows
//! - [`config`] - Runtime configuration (grace interval, buffer sizes)
//! - [`outcome`] - The uniform success/partial/failure result shape

pub mod config;
pub mod errors;
pub mod logging;
pub mod outcome;
pub mod platform;
pub mod process;
pub mod windows;

// Re-export commonly used types at crate root for convenience
pub use config::WinopsConfig;
pub use outcome::{ErrorKind, Outcome};
pub use process::registry::ProcessRegistry;
pub use process::types::{
    LaunchDisposition, LaunchReport, LaunchRequest, OutputReport, ProcessStatus, ProcessSummary,
};
pub use windows::types::{WindowQuery, WindowRecord};

// Re-export handler modules as the primary API
pub use process::handler as process_ops;
pub use windows::handler as window_ops;

// Re-export logging initialization
pub use logging::init_logging;
