//! Fixed-size queue message
//!
//! A message is copied by value into and out of the queue. Its payload is
//! a fixed buffer: text is truncated so the line terminator always fits,
//! and everything after the terminator is zero.

use core::fmt::{self, Write};

use crate::config::MESSAGE_BUFFER_SIZE;

/// Line terminator appended to text payloads
pub const LINE_TERMINATOR: u8 = b'\n';

/// Message kind tag (one byte on the wire)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum MessageId {
    /// Edge reported by the first button monitor
    Button1 = 1,
    /// Edge reported by the second button monitor
    Button2 = 2,
    /// Payload of the periodic transmitter
    Periodic = 3,
}

impl MessageId {
    #[inline]
    pub fn tag(self) -> u8 {
        self as u8
    }

    pub fn from_tag(tag: u8) -> Option<MessageId> {
        match tag {
            1 => Some(MessageId::Button1),
            2 => Some(MessageId::Button2),
            3 => Some(MessageId::Periodic),
            _ => None,
        }
    }
}

/// Queue record: `{ id: 1 byte tag, payload: MESSAGE_BUFFER_SIZE bytes }`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(C)]
pub struct Message {
    id: MessageId,
    payload: [u8; MESSAGE_BUFFER_SIZE],
}

impl Message {
    /// Build a text message
    ///
    /// At most `MESSAGE_BUFFER_SIZE - 1` bytes of `text` are kept; the
    /// terminator follows them and the remainder stays zero. Interior
    /// terminators and NULs become spaces, so every message is exactly one
    /// line and [`Message::text_bytes`] returns all of the kept text.
    pub fn text(id: MessageId, text: &str) -> Self {
        let mut payload = [0u8; MESSAGE_BUFFER_SIZE];
        let len = text.len().min(MESSAGE_BUFFER_SIZE - 1);
        for (slot, &b) in payload.iter_mut().zip(&text.as_bytes()[..len]) {
            *slot = match b {
                LINE_TERMINATOR | 0 => b' ',
                b => b,
            };
        }
        payload[len] = LINE_TERMINATOR;
        Message { id, payload }
    }

    /// Build a text message from format arguments
    ///
    /// Output beyond the buffer is dropped, same rule as [`Message::text`].
    pub fn from_fmt(id: MessageId, args: fmt::Arguments<'_>) -> Self {
        let mut text = Truncating::default();
        // Truncating never reports an error, it discards the overflow
        let _ = text.write_fmt(args);
        Self::text(id, text.0.as_str())
    }

    #[inline]
    pub fn id(&self) -> MessageId {
        self.id
    }

    /// Whole fixed-size buffer, padding included
    #[inline]
    pub fn payload(&self) -> &[u8; MESSAGE_BUFFER_SIZE] {
        &self.payload
    }

    /// Payload bytes up to and including the terminator
    pub fn text_bytes(&self) -> &[u8] {
        let end = self
            .payload
            .iter()
            .position(|&b| b == LINE_TERMINATOR || b == 0)
            .map(|i| if self.payload[i] == LINE_TERMINATOR { i + 1 } else { i })
            .unwrap_or(MESSAGE_BUFFER_SIZE);
        &self.payload[..end]
    }
}

/// String sink that keeps what fits and silently drops the rest
#[derive(Default)]
struct Truncating(heapless::String<{ MESSAGE_BUFFER_SIZE - 1 }>);

impl Write for Truncating {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        for ch in s.chars() {
            if self.0.push(ch).is_err() {
                break;
            }
        }
        Ok(())
    }
}
