use std::sync::mpsc;

use colonnade_core::ipc;

/// Watches window events in real time. Press Ctrl+C to stop.
pub fn execute() {
    if !ipc::is_daemon_running() {
        eprintln!("Colonnade is not running.");
        std::process::exit(1);
    }

    let mut reader = match ipc::subscribe_events() {
        Ok(reader) => reader,
        Err(e) => {
            eprintln!("Failed to subscribe to the daemon's event stream: {e}");
            std::process::exit(1);
        }
    };

    println!("Watching window events (press Ctrl+C to stop)...\n");

    let (event_tx, event_rx) = mpsc::channel();
    std::thread::spawn(move || {
        while let Ok(Some(event)) = ipc::read_event(&mut reader) {
            if event_tx.send(event).is_err() {
                return;
            }
        }
    });

    let (stop_tx, stop_rx) = mpsc::channel();
    ctrlc::set_handler(move || {
        let _ = stop_tx.send(());
    })
    .expect("failed to set Ctrl+C handler");

    loop {
        if stop_rx.try_recv().is_ok() {
            break;
        }

        match event_rx.recv_timeout(std::time::Duration::from_millis(100)) {
            Ok(event) => println!("{event:?}"),
            Err(mpsc::RecvTimeoutError::Timeout) => continue,
            Err(mpsc::RecvTimeoutError::Disconnected) => break,
        }
    }
}
