//! Card Transport Adapter contract.

use sensenode_core::SECTOR_SIZE;

use crate::error::TransportError;

/// Raw register images captured during the identification handshake.
///
/// CSD and CID are the 16-byte block answers to CMD9/CMD10; OCR is the
/// 4-byte payload of the CMD58 R3 response. Decoding into typed
/// structures is this crate's job, not the transport's.
#[derive(Debug, Clone, Copy)]
pub struct RawCardRegisters {
    pub csd: [u8; 16],
    pub cid: [u8; 16],
    pub ocr: [u8; 4],
}

/// The physical card transport (SPI or SDIO), supplied by the platform.
///
/// Implementations own command framing, CRC, busy-polling and retry
/// policy. Everything here blocks the caller until the card answers or
/// the transport's own timeout fires; there is no asynchronous surface.
pub trait CardTransport {
    /// Run the power-up and identification sequence and capture the raw
    /// register images.
    fn init(&mut self) -> Result<RawCardRegisters, TransportError>;

    /// Read one full sector at `addr` (in sectors).
    fn read_sector(
        &mut self,
        addr: u32,
        buf: &mut [u8; SECTOR_SIZE],
    ) -> Result<(), TransportError>;

    /// Write one full sector at `addr` (in sectors).
    fn write_sector(
        &mut self,
        addr: u32,
        buf: &[u8; SECTOR_SIZE],
    ) -> Result<(), TransportError>;

    /// Hint that `sectors` consecutive writes follow (ACMD23 pre-erase).
    /// Cards honour this as an optimisation only.
    fn pre_erase(&mut self, sectors: u32) -> Result<(), TransportError> {
        let _ = sectors;
        Ok(())
    }

    /// Erase the inclusive sector range `[first, last]`
    /// (CMD32/CMD33/CMD38 sequence). Can take tens of seconds on some
    /// cards.
    fn erase(&mut self, first: u32, last: u32) -> Result<(), TransportError> {
        let _ = (first, last);
        Err(TransportError::Unsupported)
    }
}
