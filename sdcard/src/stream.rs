//! Streaming multiblock writes with a single-slot sector cache.
//!
//! A streaming session targets consecutive sector addresses. The
//! non-caching path ([`StreamWriter::write`]) demands sector-aligned
//! lengths; the caching path ([`StreamWriter::cache_write`]) accepts
//! arbitrary lengths and buffers the sub-sector remainder so callers
//! with odd-sized records (log entries, sample batches) never have to
//! buffer themselves.

use sensenode_core::{log_event, SECTOR_SIZE};

use crate::card::SdCard;
use crate::error::SdError;
use crate::transport::CardTransport;

/// Single-slot buffer holding a partially filled sector pending
/// completion.
///
/// Invariant: `fill < SECTOR_SIZE` whenever data is held. A sector that
/// fills up is flushed immediately, never cached.
struct SectorCache {
    buf: [u8; SECTOR_SIZE],
    fill: usize,
}

impl SectorCache {
    const fn new() -> Self {
        Self {
            buf: [0; SECTOR_SIZE],
            fill: 0,
        }
    }
}

/// A streaming write session over an initialised card.
///
/// Exactly one session can exist at a time: the session exclusively
/// borrows the card. The session state machine is
/// `Open -> Writing -> Open(next address)`; dropping the writer without
/// [`StreamWriter::close`] abandons any cached partial sector.
pub struct StreamWriter<'a, T: CardTransport> {
    card: &'a mut SdCard<T>,
    current: u32,
    cache: SectorCache,
}

impl<'a, T: CardTransport> StreamWriter<'a, T> {
    /// Open a session at sector `addr`. Does not touch the card.
    pub fn open(card: &'a mut SdCard<T>, addr: u32) -> Result<Self, SdError> {
        card.check_range(addr, 0)?;
        log_event!("sdcard: stream session open");
        Ok(Self {
            card,
            current: addr,
            cache: SectorCache::new(),
        })
    }

    /// Reposition the session at a new address.
    ///
    /// Book-keeping for the prior address is finalized first: a cached
    /// partial sector is flushed (zero-padded) before the move, so no
    /// pending data is silently dropped.
    pub fn reopen(&mut self, addr: u32) -> Result<(), SdError> {
        self.close()?;
        self.card.check_range(addr, 0)?;
        self.current = addr;
        Ok(())
    }

    /// Sector that will receive the next full-sector write.
    pub fn current_sector(&self) -> u32 {
        self.current
    }

    /// Bytes currently held in the sector cache.
    pub fn cached_len(&self) -> usize {
        self.cache.fill
    }

    /// Non-caching streaming write. `buf.len()` must be an exact
    /// multiple of the sector size.
    ///
    /// On a transport error the current sector reflects the last
    /// successfully completed sector; the caller decides whether to
    /// retry or abandon the session. Returns the current sector.
    pub fn write(&mut self, buf: &[u8]) -> Result<u32, SdError> {
        if buf.len() % SECTOR_SIZE != 0 {
            return Err(SdError::UnalignedLength);
        }
        let sectors = (buf.len() / SECTOR_SIZE) as u32;
        if sectors == 0 {
            return Ok(self.current);
        }
        self.card.check_range(self.current, sectors)?;

        if sectors > 1 {
            // Hint only: a transport that cannot pre-erase still writes
            if self.card.transport_mut().pre_erase(sectors).is_err() {
                log_event!("sdcard: pre-erase hint refused");
            }
        }
        self.write_full_sectors(buf)?;
        Ok(self.current)
    }

    /// Caching streaming write accepting arbitrary `buf.len()`.
    ///
    /// Tops up a held partial sector first, flushing it the moment it
    /// becomes exactly full; writes all remaining full sectors straight
    /// through; stashes a sub-sector remainder in the (then empty)
    /// cache. An empty `buf` is a no-op.
    pub fn cache_write(&mut self, buf: &[u8]) -> Result<u32, SdError> {
        if buf.is_empty() {
            return Ok(self.current);
        }

        // Everything this call will commit, including the sector a
        // cached remainder will eventually occupy, must fit the card.
        // Bytes that can never be flushed must not enter the cache.
        let total = self.cache.fill + buf.len();
        let mut span = (total / SECTOR_SIZE) as u32;
        if total % SECTOR_SIZE != 0 {
            span += 1;
        }
        self.card.check_range(self.current, span)?;

        let mut rest = buf;

        if self.cache.fill > 0 {
            let take = (SECTOR_SIZE - self.cache.fill).min(rest.len());
            self.cache.buf[self.cache.fill..self.cache.fill + take]
                .copy_from_slice(&rest[..take]);

            if self.cache.fill + take < SECTOR_SIZE {
                // Still partial; nothing reaches the card
                self.cache.fill += take;
                return Ok(self.current);
            }

            // Cache completed: flush before consuming the input. On
            // failure `fill` keeps its old value and the copied bytes
            // beyond it are dead scratch, so state stays consistent.
            let full = self.cache.buf;
            self.card.transport_mut().write_sector(self.current, &full)?;
            self.current += 1;
            self.cache.fill = 0;
            rest = &rest[take..];
        }

        let whole = rest.len() / SECTOR_SIZE * SECTOR_SIZE;
        self.write_full_sectors(&rest[..whole])?;
        rest = &rest[whole..];

        if !rest.is_empty() {
            self.cache.buf[..rest.len()].copy_from_slice(rest);
            self.cache.fill = rest.len();
        }
        Ok(self.current)
    }

    /// Flush a held partial sector, padded with zeroes to a full
    /// sector, and return the final current sector.
    ///
    /// Idempotent: closing with an empty cache is a no-op. Callers that
    /// stop after a final short `cache_write` must call this or the
    /// last partial sector never reaches the card.
    pub fn close(&mut self) -> Result<u32, SdError> {
        if self.cache.fill > 0 {
            self.card.check_range(self.current, 1)?;
            self.cache.buf[self.cache.fill..].fill(0);
            let full = self.cache.buf;
            self.card.transport_mut().write_sector(self.current, &full)?;
            self.current += 1;
            self.cache.fill = 0;
        }
        Ok(self.current)
    }

    /// Write sector-aligned `buf` at the current sector, advancing per
    /// completed sector. Range must be pre-checked.
    fn write_full_sectors(&mut self, buf: &[u8]) -> Result<(), SdError> {
        for chunk in buf.chunks_exact(SECTOR_SIZE) {
            let mut sector = [0u8; SECTOR_SIZE];
            sector.copy_from_slice(chunk);
            self.card
                .transport_mut()
                .write_sector(self.current, &sector)?;
            self.current += 1;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::TransportError;
    use crate::testutil::{patterned, MemoryCard};

    fn open_card(sectors: u32) -> SdCard<MemoryCard> {
        let mut card = SdCard::new(MemoryCard::new(sectors));
        card.init().unwrap();
        card
    }

    #[test]
    fn test_stream_write_round_trips() {
        let mut card = open_card(1024);
        let data = patterned(3 * SECTOR_SIZE);
        {
            let mut stream = StreamWriter::open(&mut card, 5).unwrap();
            assert_eq!(stream.write(&data).unwrap(), 8);
        }
        for i in 0..3 {
            let mut buf = [0u8; SECTOR_SIZE];
            card.block_read(5 + i as u32, &mut buf).unwrap();
            assert_eq!(buf[..], data[i * SECTOR_SIZE..(i + 1) * SECTOR_SIZE]);
        }
    }

    #[test]
    fn test_stream_write_rejects_unaligned() {
        let mut card = open_card(1024);
        let mut stream = StreamWriter::open(&mut card, 0).unwrap();
        assert_eq!(
            stream.write(&patterned(SECTOR_SIZE + 1)),
            Err(SdError::UnalignedLength)
        );
        assert_eq!(stream.current_sector(), 0);
    }

    #[test]
    fn test_stream_write_survives_refused_pre_erase() {
        let mut card = open_card(1024);
        card.transport_mut().pre_erase_unsupported = true;
        let data = patterned(3 * SECTOR_SIZE);
        {
            let mut stream = StreamWriter::open(&mut card, 0).unwrap();
            assert_eq!(stream.write(&data).unwrap(), 3);
        }
        let mut buf = [0u8; SECTOR_SIZE];
        card.block_read(2, &mut buf).unwrap();
        assert_eq!(buf[..], data[2 * SECTOR_SIZE..]);
    }

    #[test]
    fn test_stream_write_error_keeps_last_completed_sector() {
        let mut card = open_card(1024);
        // Fail the third sector write
        card.transport_mut().fail_write_after = Some(2);
        let mut stream = StreamWriter::open(&mut card, 10).unwrap();
        let err = stream.write(&patterned(4 * SECTOR_SIZE)).unwrap_err();
        assert_eq!(err, SdError::Transport(TransportError::Io));
        // Two sectors completed before the failure
        assert_eq!(stream.current_sector(), 12);
    }

    #[test]
    fn test_cache_write_flushes_exactly_one_sector() {
        // Sizes [3, 5, S-8, 2]: cumulative partial reaches S exactly,
        // then a 2-byte remainder stays cached for the next sector
        let mut card = open_card(1024);
        let mut stream = StreamWriter::open(&mut card, 0).unwrap();

        stream.cache_write(&patterned(3)).unwrap();
        assert_eq!(stream.cached_len(), 3);
        stream.cache_write(&patterned(5)).unwrap();
        assert_eq!(stream.cached_len(), 8);
        stream.cache_write(&patterned(SECTOR_SIZE - 8)).unwrap();
        // Exactly one sector flushed
        assert_eq!(stream.current_sector(), 1);
        assert_eq!(stream.cached_len(), 0);
        stream.cache_write(&patterned(2)).unwrap();
        assert_eq!(stream.current_sector(), 1);
        assert_eq!(stream.cached_len(), 2);

        assert_eq!(card.transport_mut().writes, 1);
    }

    #[test]
    fn test_cache_write_empty_is_noop() {
        let mut card = open_card(1024);
        let mut stream = StreamWriter::open(&mut card, 3).unwrap();
        stream.cache_write(&patterned(9)).unwrap();
        let before_cache = stream.cached_len();
        let before_sector = stream.current_sector();

        stream.cache_write(&[]).unwrap();

        assert_eq!(stream.cached_len(), before_cache);
        assert_eq!(stream.current_sector(), before_sector);
        assert_eq!(card.transport_mut().writes, 0);
    }

    #[test]
    fn test_cache_write_bulk_passthrough_and_remainder() {
        let mut card = open_card(1024);
        let data = patterned(2 * SECTOR_SIZE + 100);
        {
            let mut stream = StreamWriter::open(&mut card, 0).unwrap();
            stream.cache_write(&data).unwrap();
            assert_eq!(stream.current_sector(), 2);
            assert_eq!(stream.cached_len(), 100);
            assert_eq!(stream.close().unwrap(), 3);
        }
        // Full sectors byte-identical, remainder zero-padded
        let mut buf = [0u8; SECTOR_SIZE];
        card.block_read(0, &mut buf).unwrap();
        assert_eq!(buf[..], data[..SECTOR_SIZE]);
        card.block_read(2, &mut buf).unwrap();
        assert_eq!(buf[..100], data[2 * SECTOR_SIZE..]);
        assert!(buf[100..].iter().all(|&b| b == 0));
    }

    #[test]
    fn test_cache_straddles_sector_boundary() {
        let mut card = open_card(1024);
        let mut stream = StreamWriter::open(&mut card, 0).unwrap();
        // Partial fill, then a write that completes the cached sector
        // and carries a full sector plus remainder
        stream.cache_write(&patterned(100)).unwrap();
        stream.cache_write(&patterned(SECTOR_SIZE - 100 + SECTOR_SIZE + 7)).unwrap();
        assert_eq!(stream.current_sector(), 2);
        assert_eq!(stream.cached_len(), 7);
    }

    #[test]
    fn test_close_is_idempotent() {
        let mut card = open_card(1024);
        let mut stream = StreamWriter::open(&mut card, 0).unwrap();
        stream.cache_write(&patterned(10)).unwrap();
        assert_eq!(stream.close().unwrap(), 1);
        assert_eq!(stream.close().unwrap(), 1);
    }

    #[test]
    fn test_reopen_flushes_pending_partial() {
        let mut card = open_card(1024);
        {
            let mut stream = StreamWriter::open(&mut card, 0).unwrap();
            stream.cache_write(&patterned(10)).unwrap();
            stream.reopen(100).unwrap();
            assert_eq!(stream.current_sector(), 100);
            assert_eq!(stream.cached_len(), 0);
        }
        // The partial was committed at its original address
        let mut buf = [0u8; SECTOR_SIZE];
        card.block_read(0, &mut buf).unwrap();
        assert_eq!(buf[..10], patterned(10)[..]);
    }

    #[test]
    fn test_open_out_of_range() {
        let mut card = open_card(16);
        assert!(StreamWriter::open(&mut card, 16).is_err());
        assert!(StreamWriter::open(&mut card, 15).is_ok());
    }

    #[test]
    fn test_cache_write_range_checked_upfront() {
        let mut card = open_card(16);
        let mut stream = StreamWriter::open(&mut card, 15).unwrap();
        // One sector still fits
        stream.cache_write(&patterned(SECTOR_SIZE)).unwrap();
        assert_eq!(stream.current_sector(), 16);
        // The next full sector cannot; cache and sector untouched
        let err = stream.cache_write(&patterned(SECTOR_SIZE)).unwrap_err();
        assert_eq!(err, SdError::InvalidRange);
        assert_eq!(stream.current_sector(), 16);
        assert_eq!(stream.cached_len(), 0);
    }

    #[test]
    fn test_cache_write_rejects_uncommittable_remainder() {
        let mut card = open_card(16);
        let mut stream = StreamWriter::open(&mut card, 15).unwrap();
        stream.cache_write(&patterned(SECTOR_SIZE)).unwrap();
        assert_eq!(stream.current_sector(), 16);
        // A sub-sector write past the last sector could never flush;
        // it must be refused up front, not swallowed into the cache
        let err = stream.cache_write(&patterned(10)).unwrap_err();
        assert_eq!(err, SdError::InvalidRange);
        assert_eq!(stream.cached_len(), 0);
        assert_eq!(stream.close().unwrap(), 16);
    }
}
