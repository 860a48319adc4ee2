//! Command Dispatch Engine
//!
//! A `no_std` command line processor for firmware control channels.
//! Bytes arrive piecemeal over an untrusted primary input (serial,
//! file-backed, test harness); the engine accumulates them in a
//! fixed-capacity buffer, detects command boundaries, and dispatches each
//! complete command against an ordered table of parsers.
//!
//! # Architecture
//!
//! ```text
//! ┌────────────────────────────────────────┐
//! │            ByteSource                  │
//! │   (serial port, script, test stub)     │
//! └───────────────────┬────────────────────┘
//!                     │ non-blocking drain
//!                     ▼
//! ┌────────────────────────────────────────┐
//! │      CommandEngine + CommandBuffer     │
//! │   boundary scan, quote handling        │
//! └───────────────────┬────────────────────┘
//!                     │ first match wins
//!                     ▼
//! ┌────────────────────────────────────────┐
//! │     &mut [&mut dyn CommandParser]      │
//! │        (ordered parser table)          │
//! └────────────────────────────────────────┘
//! ```
//!
//! # Usage
//!
//! ```ignore
//! let mut engine = CommandEngine::new();
//! let exit = engine.run(&mut serial, &mut parsers);
//! ```

#![cfg_attr(not(test), no_std)]

pub mod buffer;
pub mod engine;
pub mod error;
pub mod parser;
pub mod source;

pub use buffer::CommandBuffer;
pub use engine::{ack_bytes, CommandEngine, DispatchOutcome, EngineExit};
pub use error::CommandError;
pub use parser::{CommandParser, ParserResult};
pub use source::{ByteSource, SliceSource};
