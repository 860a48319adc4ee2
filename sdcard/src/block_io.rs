//! `gpt_disk_io::BlockIo` adapter over [`SdCard`].
//!
//! Lets GPT and filesystem code address the card through the common
//! block device trait without knowing about transports or init state.
//!
//! ```text
//! ┌────────────────────────────────────────┐
//! │    GPT / filesystem consumers          │
//! └───────────────────┬────────────────────┘
//!                     │ gpt_disk_io::BlockIo
//! ┌───────────────────▼────────────────────┐
//! │          SdBlockIo (this)              │
//! └───────────────────┬────────────────────┘
//!                     │ sector reads/writes
//! ┌───────────────────▼────────────────────┐
//! │               SdCard                   │
//! └────────────────────────────────────────┘
//! ```

use gpt_disk_io::BlockIo;
use gpt_disk_types::{BlockSize, Lba};
use sensenode_core::SECTOR_SIZE;

use crate::card::SdCard;
use crate::error::SdError;
use crate::transport::CardTransport;

/// The card address space is 32-bit sectors; an LBA beyond it can never
/// be valid and must not wrap into range when narrowed.
fn sector_addr(lba: Lba) -> Result<u32, SdError> {
    u32::try_from(lba.0).map_err(|_| SdError::InvalidRange)
}

/// Block device view of an initialised card.
pub struct SdBlockIo<'a, T: CardTransport> {
    card: &'a mut SdCard<T>,
}

impl<'a, T: CardTransport> SdBlockIo<'a, T> {
    /// Wrap an initialised card. Fails if `init` has not run.
    pub fn new(card: &'a mut SdCard<T>) -> Result<Self, SdError> {
        if !card.is_initialized() {
            return Err(SdError::NotInitialized);
        }
        Ok(Self { card })
    }
}

impl<'a, T: CardTransport> BlockIo for SdBlockIo<'a, T> {
    type Error = SdError;

    fn block_size(&self) -> BlockSize {
        BlockSize::BS_512
    }

    fn num_blocks(&mut self) -> Result<u64, Self::Error> {
        Ok(u64::from(self.card.capacity_sectors()))
    }

    fn read_blocks(&mut self, start_lba: Lba, dst: &mut [u8]) -> Result<(), Self::Error> {
        if dst.len() % SECTOR_SIZE != 0 {
            return Err(SdError::UnalignedLength);
        }
        let mut addr = sector_addr(start_lba)?;
        for chunk in dst.chunks_exact_mut(SECTOR_SIZE) {
            let mut sector = [0u8; SECTOR_SIZE];
            self.card.block_read(addr, &mut sector)?;
            chunk.copy_from_slice(&sector);
            addr += 1;
        }
        Ok(())
    }

    fn write_blocks(&mut self, start_lba: Lba, src: &[u8]) -> Result<(), Self::Error> {
        if src.len() % SECTOR_SIZE != 0 {
            return Err(SdError::UnalignedLength);
        }
        let mut addr = sector_addr(start_lba)?;
        for chunk in src.chunks_exact(SECTOR_SIZE) {
            let mut sector = [0u8; SECTOR_SIZE];
            sector.copy_from_slice(chunk);
            self.card.block_write(addr, &sector)?;
            addr += 1;
        }
        Ok(())
    }

    fn flush(&mut self) -> Result<(), Self::Error> {
        // Writes are committed when the transport call returns
        Ok(())
    }
}
