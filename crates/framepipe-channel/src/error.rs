/// Errors that can occur in frame channel operations.
#[derive(Debug, thiserror::Error)]
pub enum ChannelError {
    /// Envelope-level error.
    #[error("envelope error: {0}")]
    Envelope(#[from] framepipe_envelope::EnvelopeError),

    /// Structurally invalid payload for the expected slot.
    #[error("protocol error: {0}")]
    Protocol(String),
}

impl ChannelError {
    /// True if the peer closed its stream cleanly at an envelope boundary.
    pub fn is_closed(&self) -> bool {
        matches!(
            self,
            ChannelError::Envelope(framepipe_envelope::EnvelopeError::StreamClosed)
        )
    }
}

pub type Result<T> = std::result::Result<T, ChannelError>;
