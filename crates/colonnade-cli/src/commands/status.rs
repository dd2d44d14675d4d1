use colonnade_core::{ipc, pid};

pub fn execute() {
    if ipc::is_daemon_running() {
        println!("Colonnade is running.");
        return;
    }

    // Port isn't responding — check if a stale PID file was left behind
    // by a daemon that was killed without a clean shutdown.
    if let Ok(Some(found_pid)) = pid::read_pid_file() {
        if super::process::is_alive(found_pid) {
            println!("Colonnade process exists (PID: {found_pid}) but is not responding.");
        } else {
            let _ = pid::remove_pid_file();
            println!("Colonnade is not running (cleaned up stale PID file).");
        }
    } else {
        println!("Colonnade is not running.");
    }
}
