use std::io;

use framepipe_channel::{ChannelError, EnvelopeError};
use framepipe_worker::WorkerError;

pub const SUCCESS: i32 = 0;
pub const FAILURE: i32 = 1;
pub const PERMISSION_DENIED: i32 = 50;
pub const DATA_INVALID: i32 = 60;
pub const TIMEOUT: i32 = 124;
pub const INTERNAL: i32 = 125;

fn io_error_code(err: &io::Error) -> i32 {
    match err.kind() {
        io::ErrorKind::PermissionDenied => PERMISSION_DENIED,
        io::ErrorKind::TimedOut | io::ErrorKind::WouldBlock => TIMEOUT,
        io::ErrorKind::BrokenPipe => FAILURE,
        _ => INTERNAL,
    }
}

/// Map a fatal worker error to the process exit code.
///
/// Clean end-of-stream never reaches here: the runtime turns it into an
/// `Ok` return and the process exits with `SUCCESS`.
pub fn worker_error_code(err: &WorkerError) -> i32 {
    match err {
        WorkerError::Channel(ChannelError::Envelope(envelope)) => match envelope {
            EnvelopeError::Io(io) => io_error_code(io),
            EnvelopeError::Protocol(_) | EnvelopeError::PayloadTooLarge { .. } => DATA_INVALID,
            EnvelopeError::TruncatedStream | EnvelopeError::StreamClosed => FAILURE,
        },
        WorkerError::Channel(ChannelError::Protocol(_)) => DATA_INVALID,
        WorkerError::Decode(_) | WorkerError::Encode(_) => DATA_INVALID,
        WorkerError::Capability(_) => FAILURE,
    }
}
