use colonnade_core::ipc::{self, ResponseStatus};
use colonnade_core::pid;

pub fn execute() {
    // Try graceful shutdown via IPC first.
    if ipc::is_daemon_running() {
        match ipc::send_command(&ipc::Command::Stop) {
            Ok(response) if response.status == ResponseStatus::Ok => {
                println!("Colonnade stopped. {}", response.message.unwrap_or_default());
                let _ = pid::remove_pid_file();
                return;
            }
            Ok(response) => {
                eprintln!("Error: {}", response.message.unwrap_or_else(|| "unknown error".into()));
                return;
            }
            Err(e) => eprintln!("IPC failed: {e}"),
        }
    }

    // Fallback: the port is unreachable but the process may still be
    // alive (e.g. its IPC listener thread crashed). Check the PID file.
    match pid::read_pid_file() {
        Ok(Some(found_pid)) if super::process::is_alive(found_pid) => {
            eprintln!("Colonnade process exists (PID: {found_pid}) but is not responding to IPC.");
            eprintln!("Kill it manually (e.g. `kill {found_pid}`) and remove its PID file.");
            std::process::exit(1);
        }
        _ => {
            let _ = pid::remove_pid_file();
            println!("Colonnade is not running.");
        }
    }
}
