//! Shared definitions for the sensenode firmware core.
//!
//! This crate carries the constants that the command engine and the SD
//! storage layer agree on, plus the firmware event log. It is pure
//! `no_std` with no dependencies so that every other crate in the
//! workspace can depend on it without pulling anything in.

#![cfg_attr(not(test), no_std)]

pub mod logger;

/// Card-protocol sector size in bytes. All block I/O and streaming
/// size/alignment reasoning is relative to this constant.
pub const SECTOR_SIZE: usize = 512;

/// Capacity of the command line buffer. A single command, including its
/// delimiter, can never exceed this many bytes.
pub const COMMAND_BUFFER_CAPACITY: usize = 128;
