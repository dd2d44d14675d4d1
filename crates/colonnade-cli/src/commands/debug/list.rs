use comfy_table::presets::UTF8_FULL;
use comfy_table::{Cell, CellAlignment, ContentArrangement, Table};

use colonnade_core::ipc::{self, ResponseStatus};

pub fn execute() {
    if !ipc::is_daemon_running() {
        eprintln!("Colonnade is not running.");
        std::process::exit(1);
    }

    let response = match ipc::send_command(&ipc::Command::ListWindows) {
        Ok(response) => response,
        Err(e) => {
            eprintln!("Failed to query the daemon: {e}");
            std::process::exit(1);
        }
    };

    if response.status != ResponseStatus::Ok {
        eprintln!("Error: {}", response.message.unwrap_or_else(|| "unknown error".into()));
        std::process::exit(1);
    }

    let windows = response.windows.unwrap_or_default();

    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(vec![
            Cell::new("ID"),
            Cell::new("PID"),
            Cell::new("Title"),
            Cell::new("X").set_alignment(CellAlignment::Right),
            Cell::new("Y").set_alignment(CellAlignment::Right),
            Cell::new("Width").set_alignment(CellAlignment::Right),
            Cell::new("Height").set_alignment(CellAlignment::Right),
        ]);

    let count = windows.len();
    for window in &windows {
        table.add_row(vec![
            Cell::new(window.window_id),
            Cell::new(window.pid),
            Cell::new(window.title.clone().unwrap_or_default()),
            Cell::new(window.frame.x).set_alignment(CellAlignment::Right),
            Cell::new(window.frame.y).set_alignment(CellAlignment::Right),
            Cell::new(window.frame.width).set_alignment(CellAlignment::Right),
            Cell::new(window.frame.height).set_alignment(CellAlignment::Right),
        ]);
    }

    println!("{table}");
    println!("\n{count} windows found");
}
