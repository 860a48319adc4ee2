/// Error type for command ingestion and dispatch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandError {
    /// The command buffer filled up without a delimiter, or a seeded
    /// script exceeds the buffer capacity. The offending bytes are
    /// dropped; the engine accepts fresh input afterwards.
    BufferOverflow,
    /// No parser table entry claimed the command.
    UnrecognizedCommand,
}

impl core::fmt::Display for CommandError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::BufferOverflow => write!(f, "command buffer overflow"),
            Self::UnrecognizedCommand => write!(f, "unrecognized command"),
        }
    }
}
