//! Cross-platform "is this PID still alive" probe shared by `start`,
//! `stop`, and `status` when the IPC port check alone isn't conclusive
//! (e.g. the daemon's listener thread died but the process didn't).

#[cfg(unix)]
pub fn is_alive(raw_pid: u32) -> bool {
    // Sending signal 0 checks for existence/permission without actually
    // signaling the process.
    unsafe { libc::kill(raw_pid as libc::pid_t, 0) == 0 }
}

#[cfg(not(unix))]
pub fn is_alive(_raw_pid: u32) -> bool {
    // Conservative default on platforms without a cheap liveness probe:
    // assume it's alive and let the IPC port check be the source of truth.
    true
}
