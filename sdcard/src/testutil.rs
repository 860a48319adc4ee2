//! In-memory card transport for tests.

use sensenode_core::SECTOR_SIZE;

use crate::error::TransportError;
use crate::transport::{CardTransport, RawCardRegisters};

/// Inverse of `registers::bit_field`, for building register images.
fn set_bits(raw: &mut [u8], offset: usize, width: usize, value: u32) {
    for i in 0..width {
        let bit = offset + i;
        let b = ((value >> (width - 1 - i)) & 1) as u8;
        let mask = 1 << (7 - bit % 8);
        if b != 0 {
            raw[bit / 8] |= mask;
        } else {
            raw[bit / 8] &= !mask;
        }
    }
}

/// Deterministic non-repeating-per-sector fill pattern.
pub fn patterned(len: usize) -> Vec<u8> {
    (0..len).map(|i| (i % 251) as u8).collect()
}

/// RAM-backed transport with fault injection.
///
/// Capacity must be a multiple of 1024 sectors (reported via a v2.0
/// CSD) or a multiple of 4 below that (v1.0 CSD).
pub struct MemoryCard {
    sectors: u32,
    data: Vec<u8>,
    pub fail_init: Option<TransportError>,
    /// Fail the write after this many writes have succeeded.
    pub fail_write_after: Option<u32>,
    /// Refuse pre-erase hints.
    pub pre_erase_unsupported: bool,
    pub reads: u32,
    pub writes: u32,
}

impl MemoryCard {
    pub const MID: u8 = 0x42;

    pub fn new(sectors: u32) -> Self {
        assert!(
            sectors % 1024 == 0 || (sectors < 1024 && sectors % 4 == 0),
            "capacity not expressible in a test CSD"
        );
        Self {
            sectors,
            data: vec![0; sectors as usize * SECTOR_SIZE],
            fail_init: None,
            fail_write_after: None,
            pre_erase_unsupported: false,
            reads: 0,
            writes: 0,
        }
    }

    fn csd_image(&self) -> [u8; 16] {
        let mut raw = [0u8; 16];
        set_bits(&mut raw, 44, 4, 9); // READ_BL_LEN = 512
        if self.sectors >= 1024 {
            set_bits(&mut raw, 0, 2, 1); // CSD 2.0
            set_bits(&mut raw, 58, 22, self.sectors / 1024 - 1);
        } else {
            set_bits(&mut raw, 0, 2, 0); // CSD 1.0, C_SIZE_MULT = 0
            set_bits(&mut raw, 54, 12, self.sectors / 4 - 1);
        }
        raw
    }

    fn cid_image(&self) -> [u8; 16] {
        let mut raw = [0u8; 16];
        raw[0] = Self::MID;
        raw[1] = b'T';
        raw[2] = b'E';
        raw[3..8].copy_from_slice(b"MEMCD");
        raw[8] = 0x10;
        raw
    }

    fn span(&self, addr: u32) -> std::ops::Range<usize> {
        let start = addr as usize * SECTOR_SIZE;
        start..start + SECTOR_SIZE
    }
}

impl CardTransport for MemoryCard {
    fn init(&mut self) -> Result<RawCardRegisters, TransportError> {
        if let Some(e) = self.fail_init {
            return Err(e);
        }
        let ccs = if self.sectors >= 1024 { 0x40 } else { 0x00 };
        Ok(RawCardRegisters {
            csd: self.csd_image(),
            cid: self.cid_image(),
            ocr: [0x80 | ccs, 0xFF, 0x80, 0x00],
        })
    }

    fn read_sector(
        &mut self,
        addr: u32,
        buf: &mut [u8; SECTOR_SIZE],
    ) -> Result<(), TransportError> {
        self.reads += 1;
        buf.copy_from_slice(&self.data[self.span(addr)]);
        Ok(())
    }

    fn write_sector(
        &mut self,
        addr: u32,
        buf: &[u8; SECTOR_SIZE],
    ) -> Result<(), TransportError> {
        if let Some(n) = self.fail_write_after {
            if self.writes >= n {
                return Err(TransportError::Io);
            }
        }
        self.writes += 1;
        let span = self.span(addr);
        self.data[span].copy_from_slice(buf);
        Ok(())
    }

    fn pre_erase(&mut self, _sectors: u32) -> Result<(), TransportError> {
        if self.pre_erase_unsupported {
            return Err(TransportError::Unsupported);
        }
        Ok(())
    }

    fn erase(&mut self, first: u32, last: u32) -> Result<(), TransportError> {
        let start = first as usize * SECTOR_SIZE;
        let end = (last as usize + 1) * SECTOR_SIZE;
        self.data[start..end].fill(0xFF);
        Ok(())
    }
}
