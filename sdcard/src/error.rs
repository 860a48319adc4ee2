/// Wire-level failure reported by a [`crate::CardTransport`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransportError {
    /// The card did not answer within the transport's retry budget.
    Timeout,
    /// The card answered with an unexpected or malformed response.
    Protocol,
    /// Data transfer failed (rejected data token, CRC failure, ...).
    Io,
    /// The transport does not implement this operation.
    Unsupported,
}

impl core::fmt::Display for TransportError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Timeout => write!(f, "card response timeout"),
            Self::Protocol => write!(f, "card protocol violation"),
            Self::Io => write!(f, "card data transfer failed"),
            Self::Unsupported => write!(f, "operation not supported by transport"),
        }
    }
}

/// Error type for the block and streaming I/O layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SdError {
    /// The transport failed during a read/write/erase.
    Transport(TransportError),
    /// Sector address outside `[0, capacity_sectors)`.
    InvalidRange,
    /// The identification handshake exceeded its retry budget.
    ProtocolTimeout,
    /// Operation attempted before a successful `init`.
    NotInitialized,
    /// Streaming write length is not a multiple of the sector size.
    UnalignedLength,
}

impl From<TransportError> for SdError {
    fn from(e: TransportError) -> Self {
        Self::Transport(e)
    }
}

impl core::fmt::Display for SdError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Transport(e) => write!(f, "transport error: {}", e),
            Self::InvalidRange => write!(f, "sector address out of range"),
            Self::ProtocolTimeout => write!(f, "card identification timed out"),
            Self::NotInitialized => write!(f, "card not initialized"),
            Self::UnalignedLength => write!(f, "length not sector aligned"),
        }
    }
}
