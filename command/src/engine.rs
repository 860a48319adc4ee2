//! Command accumulation and dispatch.
//!
//! The engine drains the primary input into its line buffer, detects
//! command boundaries, and hands complete commands to the parser table.
//! Delimiters are LF, CR and `;`. A `;` inside a double-quoted span is
//! literal text; the quote characters themselves never reach a parser.
//! CR and LF still delimit inside quotes, and a delimiter closes any
//! dangling quote so it cannot leak into the next command.

use sensenode_core::{log_event, COMMAND_BUFFER_CAPACITY};

use crate::buffer::CommandBuffer;
use crate::error::CommandError;
use crate::parser::{args_of, first_token, CommandParser, ParserResult};
use crate::source::ByteSource;

/// Outcome of dispatching one complete command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatchOutcome {
    /// A table entry claimed the command. `msgid` is the index of that
    /// entry, correlating the execution with its originating request.
    Executed { result: ParserResult, msgid: u8 },
    /// No table entry claimed the command; no msgid is assigned.
    Unrecognized,
}

/// Why the dispatch loop returned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineExit {
    /// A parser returned [`ParserResult::Quit`].
    Quit,
    /// The byte source reported permanent exhaustion.
    SourceExhausted,
}

/// Wire acknowledgement for a dispatch, in the classic firmware console
/// vocabulary. Emitting it is the caller's business.
pub fn ack_bytes(outcome: &DispatchOutcome) -> &'static [u8] {
    match outcome {
        DispatchOutcome::Executed {
            result: ParserResult::Ok | ParserResult::Quit,
            ..
        } => b"CMDOK\n",
        DispatchOutcome::Executed {
            result: ParserResult::Error,
            ..
        } => b"CMDERR\n",
        DispatchOutcome::Executed {
            result: ParserResult::Invalid,
            ..
        }
        | DispatchOutcome::Unrecognized => b"CMDINV\n",
    }
}

/// The command dispatch engine. Owns the line buffer; the parser table
/// and the byte source are supplied per call and never stored.
pub struct CommandEngine {
    buffer: CommandBuffer,
}

impl CommandEngine {
    pub const fn new() -> Self {
        Self {
            buffer: CommandBuffer::new(),
        }
    }

    /// Bytes currently held in the line buffer.
    pub fn pending(&self) -> &[u8] {
        self.buffer.as_bytes()
    }

    /// Seed the buffer with a script (one or more delimited commands),
    /// as if it had arrived from the byte source. Existing content is
    /// replaced. Oversized scripts are rejected whole.
    pub fn set(&mut self, script: &[u8]) -> Result<(), CommandError> {
        self.buffer.set(script)
    }

    /// Drain all presently-available bytes from `source` into the
    /// buffer. Non-blocking: stops when the source runs dry or the
    /// buffer reaches capacity; never waits for a delimiter.
    pub fn read_available<S: ByteSource>(&mut self, source: &mut S) {
        while !self.buffer.is_full() && source.available() {
            match source.read_byte() {
                Some(b) => {
                    // Capacity was checked above
                    let _ = self.buffer.push(b);
                }
                None => break,
            }
        }
    }

    /// One processing cycle: drain the source, then dispatch at most one
    /// complete command from the front of the buffer.
    ///
    /// Returns `Ok(None)` when no complete command is buffered yet. A
    /// buffer full of undelimited bytes is cleared and reported as
    /// [`CommandError::BufferOverflow`]; the engine accepts fresh input
    /// immediately afterwards.
    pub fn poll<S: ByteSource>(
        &mut self,
        source: &mut S,
        table: &mut [&mut dyn CommandParser],
    ) -> Result<Option<DispatchOutcome>, CommandError> {
        self.read_available(source);

        if self.buffer.is_empty() {
            return Ok(None);
        }

        // Scan for the first delimiter, tracking quote parity from the
        // start of the buffer. Quotes stay in place until extraction so
        // a fragment spanning several polls keeps its parity.
        let mut quote = false;
        for (i, &b) in self.buffer.as_bytes().iter().enumerate() {
            if b == b'"' {
                quote = !quote;
                continue;
            }
            if b == b'\n' || b == b'\r' || (b == b';' && !quote) {
                let outcome = if i == 0 {
                    // Empty segment: consume the delimiter, dispatch nothing
                    None
                } else {
                    let mut line = [0u8; COMMAND_BUFFER_CAPACITY];
                    let len = strip_quotes(&self.buffer.as_bytes()[..i], &mut line);
                    if len == 0 {
                        // Quotes only, no command text: same as empty
                        None
                    } else {
                        Some(Self::decode_exec(table, &line[..len]))
                    }
                };
                self.buffer.consume_front(i + 1);
                return Ok(outcome);
            }
        }

        if self.buffer.is_full() {
            // Full buffer, no delimiter: likely gibberish on the input.
            // Drop the fragment and resume from a clean buffer.
            self.buffer.clear();
            log_event!("command: buffer overflow, input dropped");
            return Err(CommandError::BufferOverflow);
        }

        // Delimiter not received yet; fragment stays pending
        Ok(None)
    }

    /// The top-level dispatch loop a firmware boots into.
    ///
    /// Never returns under normal operation. A parser returning
    /// [`ParserResult::Quit`] stops the loop; so does permanent source
    /// exhaustion, which only script-backed and test sources report.
    /// Overflow and unrecognized commands are absorbed and the loop
    /// continues.
    pub fn run<S: ByteSource>(
        &mut self,
        source: &mut S,
        table: &mut [&mut dyn CommandParser],
    ) -> EngineExit {
        loop {
            match self.poll(source, table) {
                Ok(Some(DispatchOutcome::Executed {
                    result: ParserResult::Quit,
                    ..
                })) => return EngineExit::Quit,
                Ok(Some(_)) => {}
                Ok(None) => {
                    if source.finished() {
                        return EngineExit::SourceExhausted;
                    }
                }
                // Overflow is already logged; keep accepting input
                Err(_) => {}
            }
        }
    }

    /// Identify the parser table entry claiming `line` and run it.
    ///
    /// A single linear pass in table order; the first entry whose match
    /// rule claims the command's first token wins and its index becomes
    /// the msgid.
    pub fn decode_exec(
        table: &mut [&mut dyn CommandParser],
        line: &[u8],
    ) -> DispatchOutcome {
        let token = first_token(line);
        for (idx, entry) in table.iter_mut().enumerate() {
            if entry.matches(token) {
                let result = entry.execute(args_of(line));
                return DispatchOutcome::Executed {
                    result,
                    msgid: idx as u8,
                };
            }
        }
        DispatchOutcome::Unrecognized
    }
}

impl Default for CommandEngine {
    fn default() -> Self {
        Self::new()
    }
}

/// Copy `src` into `dst` with quote characters removed; returns the
/// stripped length.
fn strip_quotes(src: &[u8], dst: &mut [u8]) -> usize {
    let mut len = 0;
    for &b in src {
        if b != b'"' {
            dst[len] = b;
            len += 1;
        }
    }
    len
}
