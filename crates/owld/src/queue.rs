//! Thread-safe FIFO of pending commands and the command id counter.
//!
//! Connection threads push [`PendingCommand`]s as soon as a request line has
//! been decoded; the worker loop pops them one at a time. The queue can be
//! closed during shutdown, after which pushes are refused and the remaining
//! entries are handed back so their reply channels can be dropped.

use std::collections::VecDeque;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::{Condvar, Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};

use serde_json::Value;

use crate::protocol::Request;

/// Identifier assigned to each accepted command.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct CommandId(u64);

impl CommandId {
    #[must_use]
    pub const fn new(value: u64) -> Self {
        Self(value)
    }

    #[must_use]
    pub fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for CommandId {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(formatter, "{}", self.0)
    }
}

/// Hands out strictly increasing command ids starting at zero.
#[derive(Debug, Default)]
pub struct CommandIdCounter {
    next: AtomicU64,
}

impl CommandIdCounter {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the next id. Safe to call from any thread.
    pub fn next_id(&self) -> CommandId {
        CommandId(self.next.fetch_add(1, Ordering::Relaxed))
    }
}

/// One-shot reply path back to the connection that submitted a command.
#[derive(Debug)]
pub struct ReplySender {
    sender: Sender<Value>,
}

impl ReplySender {
    /// Creates a linked sender and receiver.
    #[must_use]
    pub fn channel() -> (Self, Receiver<Value>) {
        let (sender, receiver) = mpsc::channel();
        (Self { sender }, receiver)
    }

    /// Delivers the reply. Returns `false` when the connection has gone away.
    pub fn send(self, reply: Value) -> bool {
        self.sender.send(reply).is_ok()
    }
}

/// A decoded request waiting for the worker loop.
#[derive(Debug)]
pub struct PendingCommand {
    id: CommandId,
    request: Request,
    reply: ReplySender,
}

impl PendingCommand {
    #[must_use]
    pub fn new(id: CommandId, request: Request, reply: ReplySender) -> Self {
        Self { id, request, reply }
    }

    #[must_use]
    pub fn id(&self) -> CommandId {
        self.id
    }

    #[must_use]
    pub fn request(&self) -> &Request {
        &self.request
    }

    /// Consumes the command and delivers its reply.
    pub fn respond(self, reply: Value) -> bool {
        self.reply.send(reply)
    }
}

/// Error returned when pushing onto a closed queue. Carries the rejected item.
#[derive(Debug)]
pub struct QueueClosed<T>(pub T);

struct QueueState<T> {
    items: VecDeque<T>,
    closed: bool,
}

/// Multi-producer FIFO with blocking, time-bounded pops.
pub struct CommandQueue<T = PendingCommand> {
    state: Mutex<QueueState<T>>,
    ready: Condvar,
}

impl<T> Default for CommandQueue<T> {
    fn default() -> Self {
        Self {
            state: Mutex::new(QueueState {
                items: VecDeque::new(),
                closed: false,
            }),
            ready: Condvar::new(),
        }
    }
}

impl<T> fmt::Debug for CommandQueue<T> {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter
            .debug_struct("CommandQueue")
            .field("len", &self.len())
            .finish_non_exhaustive()
    }
}

impl<T> CommandQueue<T> {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, QueueState<T>> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Appends an item without blocking.
    ///
    /// # Errors
    ///
    /// Returns the item inside [`QueueClosed`] once [`close`](Self::close) has
    /// been called.
    pub fn put(&self, item: T) -> Result<(), QueueClosed<T>> {
        let mut state = self.lock();
        if state.closed {
            return Err(QueueClosed(item));
        }
        state.items.push_back(item);
        drop(state);
        self.ready.notify_one();
        Ok(())
    }

    /// Removes the oldest item, waiting up to `timeout` for one to arrive.
    pub fn pop(&self, timeout: Duration) -> Option<T> {
        let deadline = Instant::now() + timeout;
        let mut state = self.lock();
        loop {
            if let Some(item) = state.items.pop_front() {
                return Some(item);
            }
            if state.closed {
                return None;
            }
            let remaining = deadline.saturating_duration_since(Instant::now());
            if remaining.is_zero() {
                return None;
            }
            let (guard, _) = self
                .ready
                .wait_timeout(state, remaining)
                .unwrap_or_else(PoisonError::into_inner);
            state = guard;
        }
    }

    /// Removes the oldest item if one is queued.
    pub fn try_pop(&self) -> Option<T> {
        self.lock().items.pop_front()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.lock().items.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Refuses further pushes, wakes any waiter, and returns what was queued.
    pub fn close(&self) -> Vec<T> {
        let mut state = self.lock();
        state.closed = true;
        let drained = state.items.drain(..).collect();
        drop(state);
        self.ready.notify_all();
        drained
    }
}
