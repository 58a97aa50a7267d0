//! Remote command adapter: newline-delimited JSON over TCP.
//!
//! Runs in a dedicated thread using `edge-executor` for cooperative
//! scheduling and `async-io-mini` reactor timers (no busy-spinning).
//! Four concurrent futures:
//!
//! 1. **Accept**: polls the listener every 50ms
//! 2. **Read**: polls every client every 10ms, splits lines, parses
//!    commands and pushes them into the [`InputQueue`]
//! 3. **Write**: wakes on [`StatusQueue`] and broadcasts each
//!    [`RigEvent`] as one JSON line to every client
//! 4. **Shutdown**: resolves when the shutdown flag is set
//!
//! ```text
//!  client ──{"command":"next"}\n──▶ read ──▶ InputQueue ──▶ control loop
//!  client ◀──{"event":"photo_captured",...}\n── write ◀── StatusQueue
//! ```
//!
//! The remote side never dispatches anything itself.  Commands reach the
//! input handler only via the control loop.

use core::cell::RefCell;
use core::time::Duration;
use std::io::{self, ErrorKind, Read, Write};
use std::net::{SocketAddr, TcpListener, TcpStream, ToSocketAddrs};
use std::rc::Rc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};

use log::{debug, info, warn};
use serde::Deserialize;
use serde_json::Value;

use crate::app::events::RigEvent;
use crate::app::ports::EventSink;
use crate::events::{InputEvent, InputQueue, StatusQueue};
use crate::input::{InputCommand, InputSource};

const READ_BUF_SIZE: usize = 1024;

/// A client that sends a longer line than this is disconnected.
pub const MAX_LINE_LEN: usize = 4096;

/// Concurrent client limit.
pub const MAX_CLIENTS: usize = 4;

// ── Protocol ──────────────────────────────────────────────────

/// One inbound line.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct RemoteCommand {
    pub command: InputCommand,
    #[serde(default)]
    pub context: Value,
}

impl RemoteCommand {
    pub fn into_event(self) -> InputEvent {
        InputEvent::Command {
            command: self.command,
            source: InputSource::Network,
            context: self.context,
        }
    }
}

/// Parse one protocol line (without the trailing newline).
pub fn parse_command_line(line: &str) -> Result<RemoteCommand, serde_json::Error> {
    serde_json::from_str(line.trim())
}

/// Encode one outbound event, newline included.
pub fn encode_event(event: &RigEvent) -> Result<String, serde_json::Error> {
    let mut line = serde_json::to_string(event)?;
    line.push('\n');
    Ok(line)
}

// ── Event sink ────────────────────────────────────────────────

/// [`EventSink`] that forwards events to remote clients.
#[derive(Clone)]
pub struct RemoteEventSink {
    queue: StatusQueue,
}

impl RemoteEventSink {
    pub fn new(queue: StatusQueue) -> Self {
        Self { queue }
    }
}

impl EventSink for RemoteEventSink {
    fn emit(&mut self, event: &RigEvent) {
        if !self.queue.push(event.clone()) {
            debug!("Status queue full, dropping {:?}", event);
        }
    }
}

// ── Per-client state ──────────────────────────────────────────

struct Client {
    id: u32,
    stream: TcpStream,
    line: Vec<u8>,
}

impl Client {
    /// Split complete lines out of `data` and queue their commands.
    /// Returns `false` if the client overflowed the line limit.
    fn feed(&mut self, data: &[u8], inbound: &InputQueue) -> bool {
        for &byte in data {
            if byte == b'\n' {
                let line = String::from_utf8_lossy(&self.line).into_owned();
                self.line.clear();
                if line.trim().is_empty() {
                    continue;
                }
                match parse_command_line(&line) {
                    Ok(cmd) => {
                        debug!("REMOTE[{}]: {}", self.id, cmd.command);
                        inbound.push(cmd.into_event());
                    }
                    Err(e) => warn!("REMOTE[{}]: malformed line dropped: {}", self.id, e),
                }
            } else {
                self.line.push(byte);
                if self.line.len() > MAX_LINE_LEN {
                    warn!("REMOTE[{}]: line too long", self.id);
                    return false;
                }
            }
        }
        true
    }
}

type SharedClients = Rc<RefCell<Vec<Client>>>;

// ── Async loops ───────────────────────────────────────────────

async fn accept_loop(listener: TcpListener, clients: SharedClients) {
    let mut next_id = 1u32;
    loop {
        match listener.accept() {
            Ok((stream, addr)) => {
                let mut list = clients.borrow_mut();
                if list.len() >= MAX_CLIENTS {
                    warn!("REMOTE: rejecting {}, {} clients connected", addr, MAX_CLIENTS);
                } else if let Err(e) = stream.set_nonblocking(true) {
                    warn!("REMOTE: cannot configure {}: {}", addr, e);
                } else {
                    info!("REMOTE: client {} connected from {}", next_id, addr);
                    list.push(Client {
                        id: next_id,
                        stream,
                        line: Vec::new(),
                    });
                    next_id += 1;
                }
            }
            Err(e) if e.kind() == ErrorKind::WouldBlock => {}
            Err(e) => warn!("REMOTE: accept failed: {}", e),
        }
        async_io_mini::Timer::after(Duration::from_millis(50)).await;
    }
}

async fn read_loop(clients: SharedClients, inbound: InputQueue) {
    let mut buf = [0u8; READ_BUF_SIZE];
    loop {
        clients.borrow_mut().retain_mut(|client| loop {
            match client.stream.read(&mut buf) {
                Ok(0) => {
                    info!("REMOTE: client {} disconnected", client.id);
                    break false;
                }
                Ok(n) => {
                    if !client.feed(&buf[..n], &inbound) {
                        break false;
                    }
                }
                Err(e) if e.kind() == ErrorKind::WouldBlock => break true,
                Err(e) if e.kind() == ErrorKind::Interrupted => {}
                Err(e) => {
                    warn!("REMOTE: client {} read error: {}", client.id, e);
                    break false;
                }
            }
        });
        async_io_mini::Timer::after(Duration::from_millis(10)).await;
    }
}

async fn write_loop(clients: SharedClients, outbound: StatusQueue) {
    loop {
        let event = outbound.next().await;
        let line = match encode_event(&event) {
            Ok(line) => line,
            Err(e) => {
                warn!("REMOTE: cannot encode {:?}: {}", event, e);
                continue;
            }
        };
        clients.borrow_mut().retain_mut(|client| {
            match write_line(&mut client.stream, line.as_bytes()) {
                Ok(()) => true,
                Err(e) => {
                    warn!("REMOTE: write to client {} failed: {}", client.id, e);
                    false
                }
            }
        });
    }
}

/// `write_all` for a non-blocking socket: retry briefly on `WouldBlock`.
fn write_line(stream: &mut TcpStream, mut data: &[u8]) -> io::Result<()> {
    let mut stalls = 0;
    while !data.is_empty() {
        match stream.write(data) {
            Ok(0) => return Err(ErrorKind::WriteZero.into()),
            Ok(n) => data = &data[n..],
            Err(e) if e.kind() == ErrorKind::WouldBlock && stalls < 100 => {
                stalls += 1;
                thread::sleep(Duration::from_millis(1));
            }
            Err(e) if e.kind() == ErrorKind::Interrupted => {}
            Err(e) => return Err(e),
        }
    }
    Ok(())
}

async fn wait_for_shutdown(shutdown: Arc<AtomicBool>) {
    while !shutdown.load(Ordering::Relaxed) {
        async_io_mini::Timer::after(Duration::from_millis(100)).await;
    }
}

// ── Server ────────────────────────────────────────────────────

pub struct RemoteServer {
    listener: TcpListener,
}

impl RemoteServer {
    pub fn bind(addr: impl ToSocketAddrs) -> io::Result<Self> {
        let listener = TcpListener::bind(addr)?;
        listener.set_nonblocking(true)?;
        Ok(Self { listener })
    }

    pub fn local_addr(&self) -> io::Result<SocketAddr> {
        self.listener.local_addr()
    }

    /// Start the I/O thread.  It exits once `shutdown` is set.
    pub fn spawn(
        self,
        inbound: InputQueue,
        outbound: StatusQueue,
        shutdown: Arc<AtomicBool>,
    ) -> io::Result<JoinHandle<()>> {
        thread::Builder::new()
            .name("remote".into())
            .spawn(move || self.run(inbound, outbound, shutdown))
    }

    fn run(self, inbound: InputQueue, outbound: StatusQueue, shutdown: Arc<AtomicBool>) {
        let executor: edge_executor::LocalExecutor<'_, 8> = edge_executor::LocalExecutor::new();
        let clients: SharedClients = Rc::new(RefCell::new(Vec::new()));

        if let Ok(addr) = self.listener.local_addr() {
            info!("REMOTE: listening on {}", addr);
        }

        executor
            .spawn(accept_loop(self.listener, clients.clone()))
            .detach();
        executor
            .spawn(read_loop(clients.clone(), inbound))
            .detach();
        executor
            .spawn(write_loop(clients.clone(), outbound))
            .detach();

        futures_lite::future::block_on(executor.run(wait_for_shutdown(shutdown)));
        info!("REMOTE: stopped");
    }
}
