//! SD card block and streaming I/O layer.
//!
//! A `no_std` storage layer for cards compatible with Physical Spec
//! version 2.00: all card read/write operations cover entire 512-byte
//! sectors and addresses are given in sectors.
//!
//! The physical wire protocol lives behind the [`CardTransport`] trait;
//! this crate owns everything above it: register decoding (CID/CSD/OCR),
//! capacity computation, range-checked single-sector access, and a
//! streaming multiblock write path with a single-slot sector cache that
//! decouples the caller's write granularity from the card's fixed sector
//! size.
//!
//! # Architecture
//!
//! ```text
//! ┌────────────────────────────────────────┐
//! │   Filesystem / logger above (optional) │
//! │        (uses BlockIo trait)            │
//! └───────────────────┬────────────────────┘
//!                     │ gpt_disk_io::BlockIo
//!                     ▼
//! ┌────────────────────────────────────────┐
//! │   SdCard / StreamWriter (this crate)   │
//! │  registers, range checks, sector cache │
//! └───────────────────┬────────────────────┘
//!                     │ CardTransport trait
//!                     ▼
//! ┌────────────────────────────────────────┐
//! │   SPI/SDIO transport (out of scope)    │
//! └────────────────────────────────────────┘
//! ```

#![cfg_attr(not(test), no_std)]

pub mod block_io;
pub mod card;
pub mod error;
pub mod registers;
pub mod stream;
pub mod transport;

pub use block_io::SdBlockIo;
pub use card::{CardInfo, SdCard};
pub use error::{SdError, TransportError};
pub use registers::{Cid, Csd, Ocr};
pub use stream::StreamWriter;
pub use transport::{CardTransport, RawCardRegisters};

#[cfg(test)]
pub(crate) mod testutil;
