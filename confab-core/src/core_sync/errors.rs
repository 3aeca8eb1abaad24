/*
    errors.rs - Error types for the sync subsystem

    A session that hits any of these is closed; nothing here ever
    propagates past the owning session. Log operations have no error path
    of their own.
*/

use thiserror::Error;

/// Errors that end a sync session
#[derive(Debug, Error)]
pub enum SyncError {
    /// Connection-level I/O failure
    #[error("Transport error: {0}")]
    Transport(#[from] std::io::Error),

    /// The peer closed the connection
    #[error("Connection closed by peer")]
    Closed,

    /// A frame body over the configured cap: announced by the peer on
    /// receive, or a single entry too large to frame on send
    #[error("Frame of {got} bytes exceeds cap of {cap} bytes")]
    FrameTooLarge { got: usize, cap: usize },

    /// An inbound delta could not be decoded
    #[error("Malformed delta: {0}")]
    Decode(#[from] serde_json::Error),

    /// An inbound delta decoded cleanly but violates canonical order
    #[error("Delta entries not in canonical order")]
    NonCanonical,
}

/// Result type for sync operations
pub type SyncResult<T> = Result<T, SyncError>;

impl SyncError {
    /// True when the peer went away cleanly rather than misbehaving.
    pub fn is_clean_close(&self) -> bool {
        matches!(self, SyncError::Closed)
    }
}
