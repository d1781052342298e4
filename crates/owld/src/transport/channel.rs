//! Per-connection request handling.

use std::io::{self, Read, Write};
use std::net::{Shutdown, TcpStream};
use std::sync::Arc;
use std::time::{Duration, Instant};

use serde_json::Value;
use tracing::{debug, warn};

use crate::protocol::{self, reply};
use crate::queue::{CommandIdCounter, CommandQueue, PendingCommand, ReplySender};

use owl_config::DEFAULT_CLIENT_TIMEOUT_SECS;

use super::{ConnectionHandler, LISTENER_TARGET};

const CHUNK_SIZE: usize = 1024;
const DRAIN_TIMEOUT: Duration = Duration::from_millis(100);
const DRAIN_DEADLINE: Duration = Duration::from_millis(500);
const DRAIN_BUDGET: usize = 64 * 1024;

/// What the client sent before the connection stopped being read.
#[derive(Debug, PartialEq, Eq)]
enum Incoming {
    /// Bytes before the first terminator.
    Line(Vec<u8>),
    /// The buffer grew past the limit before a terminator arrived.
    TooLarge(usize),
    /// The client closed the connection before completing a line.
    Closed,
    /// The client sent nothing for longer than the read timeout.
    Idle,
}

/// Reads one request line, queues it and writes the reply.
///
/// Every connection carries exactly one request. Decode failures and
/// oversized requests are answered directly without reaching the queue.
/// Clients that stay silent past the client timeout are dropped unanswered.
#[derive(Debug)]
pub struct RequestChannel {
    queue: Arc<CommandQueue>,
    ids: Arc<CommandIdCounter>,
    max_msg_bytes: Option<usize>,
    client_timeout: Duration,
}

impl RequestChannel {
    #[must_use]
    pub fn new(
        queue: Arc<CommandQueue>,
        ids: Arc<CommandIdCounter>,
        max_msg_bytes: Option<usize>,
    ) -> Self {
        Self {
            queue,
            ids,
            max_msg_bytes,
            client_timeout: Duration::from_secs(DEFAULT_CLIENT_TIMEOUT_SECS),
        }
    }

    /// Bounds each read of request bytes by `timeout`.
    #[must_use]
    pub fn with_client_timeout(mut self, timeout: Duration) -> Self {
        self.client_timeout = timeout;
        self
    }

    fn serve(&self, stream: &mut TcpStream) -> io::Result<()> {
        let line = match read_request_line(stream, self.max_msg_bytes)? {
            Incoming::Line(line) => line,
            Incoming::TooLarge(size) => {
                let limit = self.max_msg_bytes.unwrap_or(size);
                warn!(
                    target: LISTENER_TARGET,
                    size,
                    limit,
                    "request exceeds the size limit"
                );
                return write_reply(stream, &reply::too_much_data(size, limit));
            }
            Incoming::Closed => {
                debug!(target: LISTENER_TARGET, "client closed without a complete request");
                return Ok(());
            }
            Incoming::Idle => {
                debug!(
                    target: LISTENER_TARGET,
                    timeout = ?self.client_timeout,
                    "dropping idle client"
                );
                return Ok(());
            }
        };

        let request = match protocol::decode(&line) {
            Ok(request) => request,
            Err(error) => {
                warn!(target: LISTENER_TARGET, %error, "ignored malformed command");
                return write_reply(stream, &reply::malformed_command(error.text()));
            }
        };

        let id = self.ids.next_id();
        debug!(
            target: LISTENER_TARGET,
            command_id = id.get(),
            method = request.method(),
            "queueing command"
        );
        let (sender, receiver) = ReplySender::channel();
        if self
            .queue
            .put(PendingCommand::new(id, request, sender))
            .is_err()
        {
            debug!(
                target: LISTENER_TARGET,
                command_id = id.get(),
                "queue closed, dropping command"
            );
            return Ok(());
        }

        match receiver.recv() {
            Ok(value) => write_reply(stream, &value),
            Err(_) => {
                debug!(
                    target: LISTENER_TARGET,
                    command_id = id.get(),
                    "daemon stopped before replying"
                );
                Ok(())
            }
        }
    }
}

impl ConnectionHandler for RequestChannel {
    fn handle(&self, mut stream: TcpStream) {
        if let Err(error) = stream.set_read_timeout(Some(self.client_timeout)) {
            warn!(
                target: LISTENER_TARGET,
                error = %error,
                "cannot bound client reads, dropping connection"
            );
            return;
        }
        if let Err(error) = self.serve(&mut stream) {
            warn!(
                target: LISTENER_TARGET,
                error = %error,
                "connection handler error"
            );
        }
        close(stream);
    }
}

fn read_request_line(stream: &mut impl Read, limit: Option<usize>) -> io::Result<Incoming> {
    let mut buffer = Vec::new();
    let mut chunk = [0_u8; CHUNK_SIZE];
    loop {
        let bytes_read = match read_chunk_with_retry(stream, &mut chunk) {
            Ok(read) => read,
            Err(error) if is_timeout(&error) => return Ok(Incoming::Idle),
            Err(error) => return Err(error),
        };
        if bytes_read == 0 {
            return Ok(Incoming::Closed);
        }

        let chunk = &chunk[..bytes_read];
        if let Some(pos) = chunk.iter().position(|byte| *byte == b'\n') {
            buffer.extend_from_slice(&chunk[..pos]);
            return Ok(match limit {
                Some(limit) if buffer.len() > limit => Incoming::TooLarge(buffer.len()),
                _ => Incoming::Line(buffer),
            });
        }

        buffer.extend_from_slice(chunk);
        if let Some(limit) = limit
            && buffer.len() > limit
        {
            return Ok(Incoming::TooLarge(buffer.len()));
        }
    }
}

fn read_chunk_with_retry(stream: &mut impl Read, chunk: &mut [u8]) -> io::Result<usize> {
    loop {
        match stream.read(chunk) {
            Ok(read) => return Ok(read),
            Err(error) if error.kind() == io::ErrorKind::Interrupted => {}
            Err(error) => return Err(error),
        }
    }
}

fn is_timeout(error: &io::Error) -> bool {
    matches!(error.kind(), io::ErrorKind::WouldBlock | io::ErrorKind::TimedOut)
}

fn write_reply(stream: &mut impl Write, value: &Value) -> io::Result<()> {
    stream.write_all(&protocol::encode(value))?;
    stream.flush()
}

/// Half-closes the socket and discards a bounded amount of unread input so a
/// well-behaved peer sees a clean end of stream rather than a reset.
fn close(mut stream: TcpStream) {
    drop(stream.shutdown(Shutdown::Write));
    if stream.set_read_timeout(Some(DRAIN_TIMEOUT)).is_ok() {
        let drained = drain(&mut stream, Instant::now() + DRAIN_DEADLINE, DRAIN_BUDGET);
        if drained >= DRAIN_BUDGET {
            debug!(target: LISTENER_TARGET, drained, "client kept sending after the reply");
        }
    }
}

/// Reads and discards input until end of stream, an error, `deadline` or
/// `budget` bytes, whichever comes first. Returns the bytes discarded.
fn drain(reader: &mut impl Read, deadline: Instant, budget: usize) -> usize {
    let mut sink = [0_u8; CHUNK_SIZE];
    let mut drained = 0;
    while drained < budget && Instant::now() < deadline {
        match reader.read(&mut sink) {
            Ok(0) | Err(_) => break,
            Ok(read) => drained += read,
        }
    }
    drained
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use rstest::rstest;

    use super::*;

    #[rstest]
    #[case::single_line(b"[\"echo\", 1]\n".as_slice(), Incoming::Line(b"[\"echo\", 1]".to_vec()))]
    #[case::bytes_after_terminator(
        b"[\"echo\"]\n[\"ignored\"]\n".as_slice(),
        Incoming::Line(b"[\"echo\"]".to_vec())
    )]
    #[case::eof_before_terminator(b"[\"echo\"".as_slice(), Incoming::Closed)]
    #[case::empty(b"".as_slice(), Incoming::Closed)]
    fn reads_up_to_the_first_terminator(#[case] input: &[u8], #[case] expected: Incoming) {
        let mut reader = Cursor::new(input.to_vec());
        assert_eq!(read_request_line(&mut reader, None).expect("read"), expected);
    }

    #[test]
    fn oversized_requests_stop_reading_early() {
        let mut reader = Cursor::new(vec![b'x'; 10 * CHUNK_SIZE]);
        let incoming = read_request_line(&mut reader, Some(1500)).expect("read");
        assert_eq!(incoming, Incoming::TooLarge(2 * CHUNK_SIZE));
        assert_eq!(reader.position(), 2 * CHUNK_SIZE as u64);
    }

    #[test]
    fn terminated_lines_over_the_limit_are_rejected() {
        let mut input = vec![b'x'; 20];
        input.push(b'\n');
        let mut reader = Cursor::new(input);
        assert_eq!(
            read_request_line(&mut reader, Some(10)).expect("read"),
            Incoming::TooLarge(20)
        );
    }

    #[test]
    fn lines_at_the_limit_are_accepted() {
        let mut reader = Cursor::new(b"0123456789\n".to_vec());
        assert_eq!(
            read_request_line(&mut reader, Some(10)).expect("read"),
            Incoming::Line(b"0123456789".to_vec())
        );
    }

    struct SilentReader;

    impl Read for SilentReader {
        fn read(&mut self, _buf: &mut [u8]) -> io::Result<usize> {
            Err(io::Error::from(io::ErrorKind::WouldBlock))
        }
    }

    #[test]
    fn silent_clients_are_reported_idle() {
        assert_eq!(
            read_request_line(&mut SilentReader, Some(64)).expect("read"),
            Incoming::Idle
        );
    }

    #[test]
    fn draining_a_streaming_client_stops_at_the_budget() {
        let deadline = Instant::now() + Duration::from_secs(5);
        let drained = drain(&mut io::repeat(b'x'), deadline, 4 * CHUNK_SIZE);
        assert_eq!(drained, 4 * CHUNK_SIZE);
    }

    #[test]
    fn draining_stops_at_the_deadline() {
        let started = Instant::now();
        let drained = drain(&mut io::repeat(b'x'), started, usize::MAX);
        assert_eq!(drained, 0);
    }

    #[test]
    fn draining_stops_at_end_of_stream() {
        let mut reader = Cursor::new(vec![b'x'; 10]);
        let deadline = Instant::now() + Duration::from_secs(5);
        assert_eq!(drain(&mut reader, deadline, DRAIN_BUDGET), 10);
    }

    #[test]
    fn replies_are_newline_terminated_json() {
        let mut written = Vec::new();
        write_reply(&mut written, &Value::from("hi")).expect("write");
        assert_eq!(written, b"\"hi\"\n");
    }
}
