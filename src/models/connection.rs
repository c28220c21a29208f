//! Server connection - owns the line stream to the game server.
//!
//! Architecture:
//! - A reader OS thread owns the [`GameSession`]; it is the only place the
//!   session is mutated. Every line is decoded and applied there, and the
//!   resulting events are forwarded over a channel.
//! - A writer OS thread drains a channel of outbound lines, so any thread may
//!   send without coordinating with the reader.
//! - Closing the stream ends the reader thread; there is no reconnect.

use std::io::{BufRead, BufReader, Write};
use std::net::{Shutdown, TcpStream};
use std::thread::{self, JoinHandle};

use crossbeam_channel::{Receiver, Sender, unbounded};
use tracing::{debug, error, info, warn};

use crate::domain::ClientMessage;
use crate::error::TransportError;
use crate::models::session::{GameSession, SessionEvent};

/// Messages sent from the connection threads to the presentation layer
#[derive(Debug, Clone, PartialEq)]
pub enum ConnectionEvent {
    /// An event produced by the game session
    Session(SessionEvent),
    /// The server closed the stream
    Closed,
    /// Reading failed; the session is over
    Failed(String),
    /// Writing a line failed; later sends will be rejected
    SendFailed(String),
}

/// Handle for sending lines to the server; cheap to clone
#[derive(Debug, Clone)]
pub struct LineSender {
    tx: Sender<String>,
}

impl LineSender {
    pub fn send(&self, msg: &ClientMessage) -> Result<(), TransportError> {
        self.send_line(msg.to_line())
    }

    /// Queue one line. Embedded line breaks are rejected since they would
    /// split it into several protocol messages.
    pub fn send_line(&self, line: String) -> Result<(), TransportError> {
        if line.contains(['\n', '\r']) {
            return Err(TransportError::LineBreak(line));
        }
        debug!(%line, "queueing outbound line");
        self.tx.send(line).map_err(|_| TransportError::SendFailed)
    }
}

/// Spawn the writer thread. Each queued line is written newline-terminated
/// and flushed. The thread stops on the first write failure.
pub fn spawn_writer<W>(writer: W, events: Sender<ConnectionEvent>) -> (LineSender, JoinHandle<()>)
where
    W: Write + Send + 'static,
{
    let (tx, rx) = unbounded::<String>();

    let handle = thread::spawn(move || {
        let mut writer = writer;
        while let Ok(line) = rx.recv() {
            let result = writeln!(writer, "{}", line).and_then(|_| writer.flush());
            if let Err(e) = result {
                error!(error = %e, "failed to write to server");
                let _ = events.send(ConnectionEvent::SendFailed(e.to_string()));
                break;
            }
        }
        debug!("writer thread finished");
    });

    (LineSender { tx }, handle)
}

/// Read lines until the stream ends, feeding each one through the session.
///
/// Returns `Ok(())` only if the event receiver went away. End of stream is
/// reported as [`TransportError::Closed`].
pub fn run_receive_loop<R: BufRead>(
    reader: R,
    session: &mut GameSession,
    events: &Sender<ConnectionEvent>,
) -> Result<(), TransportError> {
    let mut reader = reader;
    let mut buf = Vec::new();
    loop {
        buf.clear();
        match reader.read_until(b'\n', &mut buf) {
            Ok(0) => break,
            Ok(_) => {}
            Err(e) => {
                error!(error = %e, "failed to read from server");
                let _ = events.send(ConnectionEvent::Failed(e.to_string()));
                return Err(TransportError::Io(e));
            }
        }

        // Chat text is relayed byte for byte, so lines are not always UTF-8.
        let line = String::from_utf8_lossy(&buf);
        let line = line.trim_end_matches(['\n', '\r']);
        debug!(%line, "received");

        for event in session.handle_line(line) {
            if events.send(ConnectionEvent::Session(event)).is_err() {
                return Ok(());
            }
        }
    }

    info!("server closed the connection");
    let _ = events.send(ConnectionEvent::Closed);
    Err(TransportError::Closed)
}

/// A live connection to the game server
pub struct ServerConnection {
    /// The socket, kept to shut both halves down
    stream: TcpStream,
    /// Outbound queue; dropped on shutdown so the writer can drain and exit
    sender: Option<LineSender>,
    /// Events from the reader and writer threads
    events: Receiver<ConnectionEvent>,
    /// Writer thread handle
    writer: Option<JoinHandle<()>>,
    /// Reader thread handle; it owns the game session
    reader: Option<JoinHandle<Result<(), TransportError>>>,
}

impl ServerConnection {
    pub fn connect(host: &str, port: u16) -> Result<Self, TransportError> {
        info!(host, port, "connecting to server");
        let stream = TcpStream::connect((host, port))?;
        Self::from_stream(stream)
    }

    /// Start the reader and writer threads on an established stream
    pub fn from_stream(stream: TcpStream) -> Result<Self, TransportError> {
        let read_half = stream.try_clone()?;
        let write_half = stream.try_clone()?;

        let (event_tx, event_rx) = unbounded::<ConnectionEvent>();
        let (sender, writer) = spawn_writer(write_half, event_tx.clone());

        let reader = thread::spawn(move || {
            let mut session = GameSession::new();
            let result = run_receive_loop(BufReader::new(read_half), &mut session, &event_tx);
            if let Err(e) = &result {
                warn!(error = %e, "receive loop stopped");
            }
            result
        });

        Ok(Self {
            stream,
            sender: Some(sender),
            events: event_rx,
            writer: Some(writer),
            reader: Some(reader),
        })
    }

    pub fn events(&self) -> &Receiver<ConnectionEvent> {
        &self.events
    }

    pub fn send(&self, msg: &ClientMessage) -> Result<(), TransportError> {
        match &self.sender {
            Some(sender) => sender.send(msg),
            None => Err(TransportError::SendFailed),
        }
    }

    /// Flush queued lines, close the stream and wait for both threads
    pub fn shutdown(&mut self) {
        self.sender = None;
        if let Some(writer) = self.writer.take() {
            if writer.join().is_err() {
                error!("writer thread panicked");
            }
        }

        let Some(reader) = self.reader.take() else {
            return;
        };
        let _ = self.stream.shutdown(Shutdown::Both);
        if reader.join().is_err() {
            error!("reader thread panicked");
        }
    }
}

impl Drop for ServerConnection {
    fn drop(&mut self) {
        self.shutdown();
    }
}
