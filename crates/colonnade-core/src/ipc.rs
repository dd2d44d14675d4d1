//! CLI-to-daemon IPC (ambient, spec.md §6 non-goals exclude IPC transport
//! from the core engine, but the outer shell still needs one).
//!
//! Grounded on the teacher's `mosaico-core::ipc` (the serde-framed
//! `Command`/`Response` wire types) and `mosaico-windows::ipc` (the
//! transport): the teacher uses a Windows named pipe because that's the
//! only IPC primitive its platform crate has. This crate has no
//! platform-specific backend to lean on, so the transport here is a
//! loopback TCP socket instead -- the same one-request-per-connection
//! shape, just reachable the same way on every OS `std::net` supports.

use std::io::{BufRead, BufReader, Write};
use std::net::{TcpListener, TcpStream};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::command::Command as EngineCommand;
use crate::service::{WindowServiceEvent, WindowSnapshot};

/// Loopback port the daemon listens on. Chosen in the IANA ephemeral range
/// to avoid colliding with registered services.
pub const PORT: u16 = 47823;

fn addr() -> (&'static str, u16) {
    ("127.0.0.1", PORT)
}

/// A command sent from the CLI to the daemon.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "command")]
pub enum Command {
    /// Request the daemon to stop.
    Stop,
    /// Request the daemon's current status.
    Status,
    /// Dispatch a layout/focus command, the same surface `Orchestrator::dispatch` accepts.
    Dispatch { command: EngineCommand },
    /// Request a snapshot of every window the daemon currently manages.
    ListWindows,
    /// Open a long-lived connection that receives one JSON-framed
    /// `WindowServiceEvent` per line as they occur, until the client
    /// disconnects. Unlike every other variant this does not get a single
    /// [`Response`] back -- see [`read_event`].
    Subscribe,
}

/// A response sent from the daemon back to the CLI.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Response {
    pub status: ResponseStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    /// Populated only in reply to [`Command::ListWindows`].
    #[serde(skip_serializing_if = "Option::is_none")]
    pub windows: Option<Vec<WindowSnapshot>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResponseStatus {
    Ok,
    Error,
}

impl Response {
    pub fn ok() -> Self {
        Self { status: ResponseStatus::Ok, message: None, windows: None }
    }

    pub fn ok_with_message(message: impl Into<String>) -> Self {
        Self { status: ResponseStatus::Ok, message: Some(message.into()), windows: None }
    }

    pub fn ok_with_windows(windows: Vec<WindowSnapshot>) -> Self {
        Self { status: ResponseStatus::Ok, message: None, windows: Some(windows) }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self { status: ResponseStatus::Error, message: Some(message.into()), windows: None }
    }
}

/// A listener the daemon uses to accept CLI connections, one request per
/// connection, mirroring the teacher's `PipeServer`.
pub struct IpcServer {
    listener: TcpListener,
}

impl IpcServer {
    /// Binds the loopback listener. Fails if another daemon instance
    /// already owns the port.
    pub fn bind() -> std::io::Result<Self> {
        let (host, port) = addr();
        let listener = TcpListener::bind((host, port))?;
        Ok(Self { listener })
    }

    /// Blocks until a client connects, reads one command, and returns it
    /// along with the stream to reply on.
    pub fn accept_command(&self) -> std::io::Result<(Command, TcpStream)> {
        let (stream, _peer) = self.listener.accept()?;
        let mut reader = BufReader::new(stream.try_clone()?);
        let mut line = String::new();
        reader.read_line(&mut line)?;
        let command: Command = serde_json::from_str(line.trim())
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))?;
        Ok((command, stream))
    }

    /// Sends a response back over the stream returned by [`accept_command`].
    pub fn send_response(stream: &mut TcpStream, response: &Response) -> std::io::Result<()> {
        let json = serde_json::to_string(response)?;
        writeln!(stream, "{json}")?;
        stream.flush()
    }

    /// Writes one event as a JSON line to a `Subscribe` connection. Returns
    /// an error once the client has disconnected, which the caller uses to
    /// stop forwarding further events to this stream.
    pub fn send_event(stream: &mut TcpStream, event: &WindowServiceEvent) -> std::io::Result<()> {
        let json = serde_json::to_string(event)?;
        writeln!(stream, "{json}")?;
        stream.flush()
    }
}

/// Client side of [`Command::Subscribe`]: connects, sends the subscribe
/// request, and hands back a reader positioned to read one JSON-framed
/// `WindowServiceEvent` per line for as long as the daemon keeps the
/// connection open.
pub fn subscribe_events() -> std::io::Result<BufReader<TcpStream>> {
    let (host, port) = addr();
    let mut stream = TcpStream::connect((host, port))?;
    let json = serde_json::to_string(&Command::Subscribe)?;
    writeln!(stream, "{json}")?;
    stream.flush()?;
    Ok(BufReader::new(stream))
}

/// Reads the next event off a stream returned by [`subscribe_events`].
/// Returns `Ok(None)` once the daemon closes the connection.
pub fn read_event(reader: &mut BufReader<TcpStream>) -> std::io::Result<Option<WindowServiceEvent>> {
    let mut line = String::new();
    let bytes_read = reader.read_line(&mut line)?;
    if bytes_read == 0 {
        return Ok(None);
    }
    let event: WindowServiceEvent = serde_json::from_str(line.trim())
        .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))?;
    Ok(Some(event))
}

/// Sends a command to the daemon over the loopback socket and returns the
/// response. Used by the CLI (client side).
pub fn send_command(command: &Command) -> std::io::Result<Response> {
    let (host, port) = addr();
    let mut stream = TcpStream::connect((host, port))?;
    stream.set_read_timeout(Some(Duration::from_secs(2)))?;

    let json = serde_json::to_string(command)?;
    writeln!(stream, "{json}")?;
    stream.flush()?;

    let mut reader = BufReader::new(stream);
    let mut response_line = String::new();
    reader.read_line(&mut response_line)?;
    let response: Response = serde_json::from_str(response_line.trim())
        .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))?;
    Ok(response)
}

/// Checks whether the daemon's loopback port is accepting connections.
///
/// A connect-and-drop probe rather than a full request/response round
/// trip, matching the teacher's "don't consume a real connection just to
/// check liveness" intent (there `WaitNamedPipeW`, here a short-timeout
/// `connect`).
pub fn is_daemon_running() -> bool {
    let (host, port) = addr();
    TcpStream::connect_timeout(
        &std::net::SocketAddr::from((host.parse::<std::net::Ipv4Addr>().unwrap(), port)),
        Duration::from_millis(200),
    )
    .is_ok()
}
