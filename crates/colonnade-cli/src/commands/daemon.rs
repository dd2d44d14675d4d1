use colonnade_core::pid;

pub fn execute() {
    if let Err(e) = pid::write_pid_file() {
        eprintln!("Warning: failed to write PID file: {e}");
    }

    if let Err(e) = colonnade_memory::daemon::run() {
        eprintln!("Daemon error: {e:?}");
        let _ = pid::remove_pid_file();
        std::process::exit(1);
    }

    let _ = pid::remove_pid_file();
}
