//! Card initialization and single-sector block I/O.

use sensenode_core::{log_event, SECTOR_SIZE};

use crate::error::{SdError, TransportError};
use crate::registers::{Cid, Csd, Ocr};
use crate::transport::CardTransport;

/// Decoded identity of an initialised card.
#[derive(Debug, Clone, Copy)]
pub struct CardInfo {
    pub cid: Cid,
    pub csd: Csd,
    pub ocr: Ocr,
    pub capacity_sectors: u32,
}

/// An SD card behind a [`CardTransport`].
///
/// All sector addresses are logical block addresses in
/// `[0, capacity_sectors)`; every access is range-checked before the
/// transport is touched. `init` must succeed before any I/O.
pub struct SdCard<T: CardTransport> {
    transport: T,
    info: Option<CardInfo>,
}

impl<T: CardTransport> SdCard<T> {
    pub fn new(transport: T) -> Self {
        Self {
            transport,
            info: None,
        }
    }

    /// Run the identification handshake and decode CID, CSD and OCR.
    ///
    /// A transport timeout here means the card never left the
    /// identification state and is reported as
    /// [`SdError::ProtocolTimeout`]; an undecodable CSD is a protocol
    /// mismatch.
    pub fn init(&mut self) -> Result<(), SdError> {
        let raw = self.transport.init().map_err(|e| match e {
            TransportError::Timeout => SdError::ProtocolTimeout,
            other => SdError::Transport(other),
        })?;

        let csd = Csd::parse(&raw.csd)
            .ok_or(SdError::Transport(TransportError::Protocol))?;
        let info = CardInfo {
            cid: Cid::parse(&raw.cid),
            csd,
            ocr: Ocr::parse(&raw.ocr),
            capacity_sectors: csd.capacity_sectors(),
        };
        self.info = Some(info);
        log_event!("sdcard: init complete");
        Ok(())
    }

    pub fn is_initialized(&self) -> bool {
        self.info.is_some()
    }

    fn require_init(&self) -> Result<&CardInfo, SdError> {
        self.info.as_ref().ok_or(SdError::NotInitialized)
    }

    /// Card capacity in sectors. Zero before `init`.
    pub fn capacity_sectors(&self) -> u32 {
        self.info.map_or(0, |i| i.capacity_sectors)
    }

    pub fn cid(&self) -> Result<Cid, SdError> {
        Ok(self.require_init()?.cid)
    }

    pub fn csd(&self) -> Result<Csd, SdError> {
        Ok(self.require_init()?.csd)
    }

    pub fn ocr(&self) -> Result<Ocr, SdError> {
        Ok(self.require_init()?.ocr)
    }

    pub(crate) fn check_range(&self, addr: u32, sectors: u32) -> Result<(), SdError> {
        let capacity = self.require_init()?.capacity_sectors;
        if addr >= capacity || sectors > capacity - addr {
            return Err(SdError::InvalidRange);
        }
        Ok(())
    }

    /// Read one sector.
    pub fn block_read(
        &mut self,
        addr: u32,
        buf: &mut [u8; SECTOR_SIZE],
    ) -> Result<(), SdError> {
        self.check_range(addr, 1)?;
        self.transport.read_sector(addr, buf)?;
        Ok(())
    }

    /// Write one sector.
    pub fn block_write(
        &mut self,
        addr: u32,
        buf: &[u8; SECTOR_SIZE],
    ) -> Result<(), SdError> {
        self.check_range(addr, 1)?;
        self.transport.write_sector(addr, buf)?;
        Ok(())
    }

    /// Erase the inclusive sector range `[first, last]`.
    pub fn erase(&mut self, first: u32, last: u32) -> Result<(), SdError> {
        if last < first {
            return Err(SdError::InvalidRange);
        }
        self.check_range(first, last - first + 1)?;
        self.transport.erase(first, last)?;
        Ok(())
    }

    pub(crate) fn transport_mut(&mut self) -> &mut T {
        &mut self.transport
    }
}
