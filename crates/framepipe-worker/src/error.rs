/// Errors that can terminate a worker run.
#[derive(Debug, thiserror::Error)]
pub enum WorkerError {
    /// Channel-level error (envelope framing or frame payload shape).
    #[error("channel error: {0}")]
    Channel(#[from] framepipe_channel::ChannelError),

    /// The image codec cannot interpret the carried bytes.
    #[error("image decode error: {0}")]
    Decode(#[source] image::ImageError),

    /// The image codec failed to produce encoded output.
    #[error("image encode error: {0}")]
    Encode(#[source] image::ImageError),

    /// A capability reported a domain failure.
    #[error("capability error: {0}")]
    Capability(String),
}

pub type Result<T> = std::result::Result<T, WorkerError>;
