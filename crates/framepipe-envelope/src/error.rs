/// Errors that can occur during envelope encoding/decoding.
#[derive(Debug, thiserror::Error)]
pub enum EnvelopeError {
    /// The stream ended inside an envelope (partial length prefix or body).
    #[error("truncated stream (EOF inside an envelope)")]
    TruncatedStream,

    /// The body is not valid MessagePack or not a two-element `[tag, payload]`.
    #[error("protocol error: {0}")]
    Protocol(String),

    /// The envelope exceeds the configured maximum size.
    #[error("envelope too large ({size} bytes, max {max})")]
    PayloadTooLarge { size: usize, max: usize },

    /// An I/O error occurred while reading or writing envelopes.
    #[error("envelope I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The stream closed cleanly at an envelope boundary.
    #[error("stream closed")]
    StreamClosed,
}

pub type Result<T> = std::result::Result<T, EnvelopeError>;
