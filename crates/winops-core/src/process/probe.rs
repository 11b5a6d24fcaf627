//! OS-level liveness checks via sysinfo.
//!
//! Used to answer "is pid N still alive" for entries whose child handle has
//! already been reaped, without touching /proc or Win32 directly.

use std::sync::{LazyLock, Mutex};

use sysinfo::{Pid as SysinfoPid, ProcessesToUpdate, System};

// Shared system instance to avoid re-allocating sysinfo state per call
static SYSTEM: LazyLock<Mutex<System>> = LazyLock::new(|| Mutex::new(System::new()));

/// Check whether a process with the given PID is currently running.
pub fn is_process_running(pid: u32) -> bool {
    let mut system = match SYSTEM.lock() {
        Ok(guard) => guard,
        Err(poisoned) => poisoned.into_inner(),
    };
    let pid_obj = SysinfoPid::from_u32(pid);
    system.refresh_processes(ProcessesToUpdate::Some(&[pid_obj]), true);
    system.process(pid_obj).is_some()
}
