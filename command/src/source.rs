//! Byte Source Adapter contract.

/// A primary input channel delivering command bytes.
///
/// Implementations wrap whatever physical transport feeds the engine
/// (serial port, USB CDC, a stored boot script). `available` must be
/// non-blocking: the engine drains in a tight loop and relies on it to
/// report honestly when nothing is pending.
pub trait ByteSource {
    /// True when at least one byte can be read without blocking.
    fn available(&self) -> bool;

    /// Read the next byte, or `None` when the channel is momentarily empty.
    fn read_byte(&mut self) -> Option<u8>;

    /// True when the channel can never produce bytes again.
    ///
    /// Real firmware inputs stay open forever and keep the default.
    /// Script-backed and test sources report exhaustion so `run` can
    /// terminate instead of spinning.
    fn finished(&self) -> bool {
        false
    }
}

/// A source draining a fixed byte slice, for boot scripts and tests.
pub struct SliceSource<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> SliceSource<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        Self { data, pos: 0 }
    }

    /// Bytes not yet consumed.
    pub fn remaining(&self) -> usize {
        self.data.len() - self.pos
    }
}

impl<'a> ByteSource for SliceSource<'a> {
    fn available(&self) -> bool {
        self.pos < self.data.len()
    }

    fn read_byte(&mut self) -> Option<u8> {
        let b = *self.data.get(self.pos)?;
        self.pos += 1;
        Some(b)
    }

    fn finished(&self) -> bool {
        self.pos >= self.data.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slice_source_drains_in_order() {
        let mut src = SliceSource::new(b"ab");
        assert!(src.available());
        assert_eq!(src.read_byte(), Some(b'a'));
        assert_eq!(src.read_byte(), Some(b'b'));
        assert_eq!(src.read_byte(), None);
        assert!(!src.available());
        assert!(src.finished());
    }

    #[test]
    fn test_empty_slice_is_finished() {
        let src = SliceSource::new(b"");
        assert!(!src.available());
        assert!(src.finished());
    }
}
