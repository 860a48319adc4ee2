//! Fixed-capacity command line buffer.

use sensenode_core::COMMAND_BUFFER_CAPACITY;

use crate::error::CommandError;

/// Accumulates at most one undelimited command fragment between
/// processing cycles. Owned exclusively by the engine; fixed capacity,
/// no allocation.
pub struct CommandBuffer {
    data: [u8; COMMAND_BUFFER_CAPACITY],
    len: usize,
}

impl CommandBuffer {
    pub const fn new() -> Self {
        Self {
            data: [0; COMMAND_BUFFER_CAPACITY],
            len: 0,
        }
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn is_full(&self) -> bool {
        self.len == COMMAND_BUFFER_CAPACITY
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.data[..self.len]
    }

    /// Append one byte. Returns false when the buffer is already full;
    /// never writes past capacity.
    pub fn push(&mut self, byte: u8) -> bool {
        if self.is_full() {
            return false;
        }
        self.data[self.len] = byte;
        self.len += 1;
        true
    }

    pub fn clear(&mut self) {
        self.len = 0;
    }

    /// Drop the first `n` bytes, shifting any tail to the front. The
    /// tail is preserved for the next processing cycle.
    pub fn consume_front(&mut self, n: usize) {
        let n = n.min(self.len);
        self.data.copy_within(n..self.len, 0);
        self.len -= n;
    }

    /// Replace the buffer content with a caller-supplied script,
    /// typically several delimited commands seeded at startup.
    ///
    /// An oversized script is rejected whole rather than truncated:
    /// truncation would dispatch a corrupted final command.
    pub fn set(&mut self, script: &[u8]) -> Result<(), CommandError> {
        if script.len() > COMMAND_BUFFER_CAPACITY {
            return Err(CommandError::BufferOverflow);
        }
        self.data[..script.len()].copy_from_slice(script);
        self.len = script.len();
        Ok(())
    }
}

impl Default for CommandBuffer {
    fn default() -> Self {
        Self::new()
    }
}
