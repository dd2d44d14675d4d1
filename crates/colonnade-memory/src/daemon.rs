//! Wires a [`MemoryService`] to the core orchestrator and drives its single
//! controller thread, mirroring the teacher's own `daemon.rs` + `daemon_loop.rs`
//! split: one function that builds every collaborator and blocks, plus
//! helper threads that only ever send into the controller channel.

use std::net::TcpStream;
use std::sync::mpsc::Sender;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use colonnade_core::ipc::{self, IpcServer};
use colonnade_core::{
    AnimationClock, AxRef, ControllerMsg, ExternalWindowId, Monitor, MonitorId, Orchestrator, Pid,
    Rect, Settings, SizeConstraints, SystemClock, WindowResult, WindowService, WindowServiceEvent,
    WindowSnapshot, spawn_display_ticker,
};

use crate::MemoryService;

/// How often the event-poll thread drains `MemoryService::poll_events`.
const POLL_INTERVAL: Duration = Duration::from_millis(16);

/// Active `debug events` connections. The event pump pushes every polled
/// event onto each subscriber's channel; the per-subscriber IPC thread reads
/// its own channel and writes events to its own `TcpStream`, dropping itself
/// from the registry once the write side fails (client disconnected).
type SubscriberList = Arc<Mutex<Vec<Sender<WindowServiceEvent>>>>;

/// `Arc`-forwarding handle so the daemon keeps a handle to seed/inspect the
/// service after handing a `Box<dyn WindowService>` to the orchestrator --
/// implementing a foreign trait directly for `Arc<MemoryService>` would
/// need the orphan-rule carve-out this crate would rather not lean on.
#[derive(Debug, Clone)]
struct ServiceHandle(Arc<MemoryService>);

impl WindowService for ServiceHandle {
    fn query_all_visible(&self) -> WindowResult<Vec<WindowSnapshot>> {
        self.0.query_all_visible()
    }
    fn window_info(&self, window_id: ExternalWindowId) -> Option<WindowSnapshot> {
        self.0.window_info(window_id)
    }
    fn window_bounds(&self, ax_ref: AxRef) -> Option<Rect> {
        self.0.window_bounds(ax_ref)
    }
    fn window_title(&self, ax_ref: AxRef) -> Option<String> {
        self.0.window_title(ax_ref)
    }
    fn set_frame(&self, ax_ref: AxRef, rect: Rect) -> WindowResult<()> {
        self.0.set_frame(ax_ref, rect)
    }
    fn set_origin_via_compositor(&self, window_id: ExternalWindowId, point: (i32, i32)) -> WindowResult<()> {
        self.0.set_origin_via_compositor(window_id, point)
    }
    fn set_alpha(&self, window_id: ExternalWindowId, alpha: f32) -> WindowResult<()> {
        self.0.set_alpha(window_id, alpha)
    }
    fn raise(&self, ax_ref: AxRef) -> WindowResult<()> {
        self.0.raise(ax_ref)
    }
    fn focus(&self, pid: Pid, window_id: ExternalWindowId, ax_ref: AxRef) -> WindowResult<()> {
        self.0.focus(pid, window_id, ax_ref)
    }
    fn is_fullscreen(&self, ax_ref: AxRef) -> bool {
        self.0.is_fullscreen(ax_ref)
    }
    fn set_native_fullscreen(&self, ax_ref: AxRef, enabled: bool) -> WindowResult<()> {
        self.0.set_native_fullscreen(ax_ref, enabled)
    }
    fn size_constraints(&self, ax_ref: AxRef, current_size: Option<(i32, i32)>) -> SizeConstraints {
        self.0.size_constraints(ax_ref, current_size)
    }
    fn poll_events(&self) -> Vec<WindowServiceEvent> {
        self.0.poll_events()
    }
}

/// Runs the daemon against the in-memory reference service with default
/// settings and a single seeded monitor. Blocks until every sender on the
/// orchestrator's channel (including this function's own poll/tick threads)
/// is dropped, which in practice means until the process is killed.
pub fn run() -> WindowResult<()> {
    run_with_settings(Settings::default())
}

pub fn run_with_settings(settings: Settings) -> WindowResult<()> {
    let service = Arc::new(MemoryService::new());
    seed_demo_windows(&service);

    let (mut orchestrator, rx) =
        Orchestrator::new(Box::new(ServiceHandle(service.clone())), Arc::new(SystemClock::new()) as Arc<dyn AnimationClock>);
    orchestrator = orchestrator.with_settings(settings);
    let monitor = orchestrator.add_monitor(Monitor::new(1, "Main", Rect::new(0, 0, 1920, 1080), Rect::new(0, 0, 1920, 1080)));

    let subscribers: SubscriberList = Arc::new(Mutex::new(Vec::new()));

    spawn_ipc_server(orchestrator.sender(), service.clone(), subscribers.clone())?;
    spawn_event_pump(orchestrator.sender(), service, subscribers);
    spawn_ticker(orchestrator.sender(), monitor);

    colonnade_core::log_info!("colonnade-memory daemon: running with monitor {monitor}");
    orchestrator.run(rx);
    Ok(())
}

/// Binds the loopback IPC listener and forwards every accepted command into
/// the controller channel, mirroring the teacher's daemon thread that reads
/// `PipeServer::accept_command` in a loop. `Stop` replies then exits the
/// process directly -- there's no clean way to unblock `Orchestrator::run`
/// from outside its own channel without adding a dedicated shutdown message,
/// and a CLI-requested stop has no further cleanup to perform.
fn spawn_ipc_server(
    tx: std::sync::mpsc::Sender<ControllerMsg>,
    service: Arc<MemoryService>,
    subscribers: SubscriberList,
) -> WindowResult<()> {
    let server = IpcServer::bind().map_err(|e| {
        colonnade_core::CoreError::ExternalServiceFailure(format!("failed to bind IPC listener: {e}"))
    })?;

    std::thread::spawn(move || {
        loop {
            let (command, mut stream) = match server.accept_command() {
                Ok(pair) => pair,
                Err(e) => {
                    colonnade_core::log_warn!("ipc: failed to accept a command: {e}");
                    continue;
                }
            };

            match command {
                ipc::Command::Status => {
                    let _ = IpcServer::send_response(&mut stream, &ipc::Response::ok_with_message("running"));
                }
                ipc::Command::ListWindows => {
                    let response = match service.query_all_visible() {
                        Ok(windows) => ipc::Response::ok_with_windows(windows),
                        Err(e) => ipc::Response::error(format!("{e}")),
                    };
                    let _ = IpcServer::send_response(&mut stream, &response);
                }
                ipc::Command::Dispatch { command } => {
                    let sent = tx.send(ControllerMsg::Command(command)).is_ok();
                    let response = if sent {
                        ipc::Response::ok()
                    } else {
                        ipc::Response::error("daemon is shutting down")
                    };
                    let _ = IpcServer::send_response(&mut stream, &response);
                }
                ipc::Command::Stop => {
                    let _ = IpcServer::send_response(&mut stream, &ipc::Response::ok_with_message("stopped"));
                    std::process::exit(0);
                }
                ipc::Command::Subscribe => {
                    spawn_subscriber(stream, &subscribers);
                }
            }
        }
    });

    Ok(())
}

/// Registers a channel for one `debug events` connection and blocks this
/// thread forwarding events to it until the client disconnects, at which
/// point the channel is dropped from `subscribers` on the next broadcast.
fn spawn_subscriber(mut stream: TcpStream, subscribers: &SubscriberList) {
    let (event_tx, event_rx) = std::sync::mpsc::channel();
    subscribers.lock().expect("subscriber list poisoned").push(event_tx);

    std::thread::spawn(move || {
        for event in event_rx {
            if IpcServer::send_event(&mut stream, &event).is_err() {
                return;
            }
        }
    });
}

/// A couple of demo windows so a fresh daemon has something to lay out,
/// mirroring how a real backend would already have windows open by the
/// time the daemon attaches to it.
fn seed_demo_windows(service: &Arc<MemoryService>) {
    service.spawn_window_with(1000, Rect::new(100, 100, 900, 600), Some("Demo Window 1".to_string()), None);
    service.spawn_window_with(1001, Rect::new(1000, 100, 900, 600), Some("Demo Window 2".to_string()), None);
}

/// Drains `MemoryService::poll_events` on its own thread and forwards each
/// one into the controller channel, the same "helper threads only ever
/// send" shape `refresh::schedule_refresh`/`spawn_display_ticker` use.
fn spawn_event_pump(
    tx: std::sync::mpsc::Sender<ControllerMsg>,
    service: Arc<MemoryService>,
    subscribers: SubscriberList,
) -> std::thread::JoinHandle<()> {
    std::thread::spawn(move || loop {
        std::thread::sleep(POLL_INTERVAL);
        for event in service.poll_events() {
            if tx.send(ControllerMsg::Event(event.clone())).is_err() {
                return;
            }
            let mut subs = subscribers.lock().expect("subscriber list poisoned");
            subs.retain(|sub| sub.send(event.clone()).is_ok());
        }
    })
}

fn spawn_ticker(tx: std::sync::mpsc::Sender<ControllerMsg>, monitor: MonitorId) -> std::thread::JoinHandle<()> {
    let clock = Arc::new(SystemClock::new());
    spawn_display_ticker(tx, monitor, 60.0, move || clock.now())
}
