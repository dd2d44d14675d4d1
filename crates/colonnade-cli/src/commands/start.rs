use std::process::{Command, Stdio};

use colonnade_core::{ipc, pid};

pub fn execute() {
    if ipc::is_daemon_running() {
        println!("Colonnade is already running.");
        return;
    }

    // Clean up a stale PID file from a previous unclean shutdown.
    if let Ok(Some(existing_pid)) = pid::read_pid_file() {
        if super::process::is_alive(existing_pid) {
            println!("Colonnade process exists (PID: {existing_pid}) but is not responding.");
            return;
        }
        let _ = pid::remove_pid_file();
    }

    let exe = std::env::current_exe().expect("failed to get current executable path");

    // Spawn the daemon as a detached background process by re-running
    // ourselves with the hidden `daemon` subcommand. Dropping the child
    // handle (after acknowledging it with try_wait) lets the daemon
    // outlive this CLI invocation.
    let mut child = Command::new(exe)
        .arg("daemon")
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .spawn()
        .expect("failed to start daemon");

    let spawned_pid = child.id();
    let _ = child.try_wait();

    print_banner(spawned_pid);
}

/// Tips shown on startup, rotated by PID so users see a different
/// one each time they start the daemon.
const TIPS: &[&str] = &[
    "Run 'colonnade status' to check if the daemon is running",
    "Edit the config at <platform config dir>/colonnade/config.toml",
    "Run 'colonnade init' to write default config files",
    "Run 'colonnade debug list' to see all managed windows",
    "Run 'colonnade debug events' to watch window events live",
];

fn print_banner(pid: u32) {
    let d = "\x1b[90m"; // Dim gray — labels
    let w = "\x1b[1;97m"; // Bold bright white — values
    let r = "\x1b[0m"; // Reset
    let secs = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0);
    let tip = TIPS[secs as usize % TIPS.len()];

    super::banner::print_logo();
    println!();
    println!("  {d}Config{r}   <platform config dir>/colonnade/");
    println!("  {d}Daemon{r}   Started (PID: {w}{pid}{r})");
    println!("  {d}Tip{r}      {tip}");
    println!();
}
