use colonnade_core::ipc::{self, ResponseStatus};
use colonnade_core::Command as EngineCommand;

/// Sends a layout/focus command to the running daemon via IPC.
pub fn execute(command: EngineCommand) {
    if !ipc::is_daemon_running() {
        eprintln!("Colonnade is not running.");
        std::process::exit(1);
    }

    match ipc::send_command(&ipc::Command::Dispatch { command }) {
        Ok(response) => {
            if response.status == ResponseStatus::Ok {
                if let Some(msg) = response.message {
                    println!("{msg}");
                }
            } else {
                eprintln!("Error: {}", response.message.unwrap_or_else(|| "unknown error".into()));
                std::process::exit(1);
            }
        }
        Err(e) => {
            eprintln!("Failed to send command: {e}");
            std::process::exit(1);
        }
    }
}
