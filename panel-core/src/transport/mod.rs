//! Bounded serial transport primitives.
//!
//! The outbound side is an explicit fixed-capacity ring of message
//! references with one active message mid-transmission; [`OutboundQueue::next_byte`]
//! models the transmit-ready interrupt pulling one octet at a time, so the
//! enqueue path never blocks regardless of the caller's context. The inbound
//! side accumulates bytes into a bounded line buffer and resynchronizes on
//! the next terminator after an overflow. Both bounds are explicit: overflow
//! is a reported error, never silent corruption.

use heapless::{Deque, String, Vec};

/// Default number of messages that may wait behind the active one.
pub const OUTBOUND_CAPACITY: usize = 8;

/// Maximum number of bytes accepted on a single command line (excluding the
/// terminator).
pub const MAX_LINE_LEN: usize = 64;

/// Line terminator for both directions of the serial protocol.
pub const TERMINATOR: u8 = b'\n';

/// Error surfaced when the outbound ring cannot accept another message.
///
/// The newest message is the one dropped; everything already queued keeps
/// its slot and its ordering.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum EnqueueError {
    QueueFull,
}

/// Non-blocking, queued outbound channel.
///
/// Messages are `&'static str` references: ownership of the backing storage
/// is trivially stable for the duration of transmission, which is the
/// contract the transmit path relies on. Exactly one message is in flight at
/// a time and messages drain in enqueue order.
pub struct OutboundQueue<const N: usize = OUTBOUND_CAPACITY> {
    active: Option<Cursor>,
    pending: Deque<&'static str, N>,
}

#[derive(Copy, Clone, Debug)]
struct Cursor {
    message: &'static str,
    offset: usize,
}

impl<const N: usize> OutboundQueue<N> {
    pub const fn new() -> Self {
        Self {
            active: None,
            pending: Deque::new(),
        }
    }

    /// Queues `message` for transmission.
    ///
    /// Starts transmitting immediately when the channel is idle; otherwise
    /// the message waits behind the active one. Never blocks. A full ring
    /// drops this (newest) message and reports [`EnqueueError::QueueFull`].
    pub fn enqueue(&mut self, message: &'static str) -> Result<(), EnqueueError> {
        if self.active.is_none() {
            self.active = Some(Cursor { message, offset: 0 });
            return Ok(());
        }

        self.pending
            .push_back(message)
            .map_err(|_| EnqueueError::QueueFull)
    }

    /// Produces the next octet for the wire; models one firing of the
    /// transmit-ready interrupt.
    ///
    /// After the active message's last byte a terminator is emitted and the
    /// next pending message (if any) becomes active. `None` means the
    /// channel is idle and the interrupt should be disarmed.
    pub fn next_byte(&mut self) -> Option<u8> {
        let cursor = self.active.as_mut()?;
        let bytes = cursor.message.as_bytes();
        if cursor.offset < bytes.len() {
            let byte = bytes[cursor.offset];
            cursor.offset += 1;
            return Some(byte);
        }

        self.active = self
            .pending
            .pop_front()
            .map(|message| Cursor { message, offset: 0 });
        Some(TERMINATOR)
    }

    /// Returns `true` when no transmission is active or pending.
    pub fn is_idle(&self) -> bool {
        self.active.is_none()
    }

    /// Number of messages waiting behind the active one.
    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }

    /// Capacity of the waiting ring (excluding the active slot).
    pub const fn capacity(&self) -> usize {
        N
    }
}

impl<const N: usize> Default for OutboundQueue<N> {
    fn default() -> Self {
        Self::new()
    }
}

/// Error surfaced by the inbound line accumulator.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum LineError {
    /// The line exceeded [`MAX_LINE_LEN`]; it is discarded wholesale and the
    /// accumulator resynchronizes on the next terminator.
    Overflow,
    /// The completed line was not valid UTF-8 and was discarded.
    InvalidUtf8,
}

/// A completed command line, bounded and owned so it can cross a channel.
pub type CommandLine = String<MAX_LINE_LEN>;

/// Accumulates received bytes into terminator-delimited lines.
#[derive(Default)]
pub struct LineAccumulator {
    buffer: Vec<u8, MAX_LINE_LEN>,
    discarding: bool,
}

impl LineAccumulator {
    pub const fn new() -> Self {
        Self {
            buffer: Vec::new(),
            discarding: false,
        }
    }

    /// Feeds one received byte; models the receive interrupt.
    ///
    /// Returns `Ok(Some(line))` when `byte` completed a line. Carriage
    /// returns are ignored so `\r\n` hosts work unchanged. The overflow
    /// error is reported once, on the byte that no longer fits.
    pub fn push(&mut self, byte: u8) -> Result<Option<CommandLine>, LineError> {
        if byte == TERMINATOR {
            if self.discarding {
                self.discarding = false;
                return Ok(None);
            }
            let parsed = core::str::from_utf8(&self.buffer)
                .ok()
                .and_then(|line| CommandLine::try_from(line).ok());
            self.buffer.clear();
            return parsed.map(Some).ok_or(LineError::InvalidUtf8);
        }

        if self.discarding || byte == b'\r' {
            return Ok(None);
        }

        if self.buffer.push(byte).is_err() {
            self.buffer.clear();
            self.discarding = true;
            return Err(LineError::Overflow);
        }

        Ok(None)
    }

    /// Bytes currently buffered for the line in progress.
    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    /// Returns `true` when no partial line is buffered.
    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }
}
