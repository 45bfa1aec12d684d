//! Typed frame channel over the envelope protocol.
//!
//! Wraps one readable and one writable stream (conventionally the process's
//! stdin and stdout) and exposes the four message kinds the supervisor
//! conversation uses: log, frame-request, frame-data, frame-result.

pub mod channel;
pub mod error;
pub mod metadata;

pub use channel::{FrameChannel, FrameSink, StdioChannel};
pub use error::{ChannelError, Result};
pub use framepipe_envelope::EnvelopeError;
pub use metadata::FrameMetadata;
