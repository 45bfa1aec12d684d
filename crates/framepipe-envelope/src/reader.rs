use std::io::{ErrorKind, Read};

use bytes::BytesMut;

use crate::codec::{decode_envelope, Envelope, EnvelopeConfig};
use crate::error::{EnvelopeError, Result};

const INITIAL_BUFFER_CAPACITY: usize = 8 * 1024;
const READ_CHUNK_SIZE: usize = 8 * 1024;

/// Reads complete envelopes from any `Read` stream.
///
/// Handles partial reads internally — callers always get complete envelopes.
pub struct EnvelopeReader<T> {
    inner: T,
    buf: BytesMut,
    config: EnvelopeConfig,
}

impl<T: Read> EnvelopeReader<T> {
    /// Create a new envelope reader with default configuration.
    pub fn new(inner: T) -> Self {
        Self::with_config(inner, EnvelopeConfig::default())
    }

    /// Create a new envelope reader with explicit configuration.
    pub fn with_config(inner: T, config: EnvelopeConfig) -> Self {
        Self {
            inner,
            buf: BytesMut::with_capacity(INITIAL_BUFFER_CAPACITY),
            config,
        }
    }

    /// Read the next complete envelope (blocking).
    ///
    /// EOF at an envelope boundary returns `Err(EnvelopeError::StreamClosed)`
    /// — the peer's orderly shutdown signal. EOF inside a partial length
    /// prefix or body returns `Err(EnvelopeError::TruncatedStream)`.
    pub fn read_envelope(&mut self) -> Result<Envelope> {
        loop {
            if let Some(envelope) = decode_envelope(&mut self.buf, self.config.max_envelope_size)? {
                tracing::trace!(
                    tag = envelope.tag,
                    payload_len = envelope.payload.len(),
                    "read envelope"
                );
                return Ok(envelope);
            }

            let mut chunk = [0u8; READ_CHUNK_SIZE];
            let read = match self.inner.read(&mut chunk) {
                Ok(n) => n,
                Err(err) if err.kind() == ErrorKind::Interrupted => continue,
                Err(err) => return Err(EnvelopeError::Io(err)),
            };

            if read == 0 {
                if self.buf.is_empty() {
                    return Err(EnvelopeError::StreamClosed);
                }
                return Err(EnvelopeError::TruncatedStream);
            }

            self.buf.extend_from_slice(&chunk[..read]);
        }
    }

    /// Borrow the underlying stream.
    pub fn get_ref(&self) -> &T {
        &self.inner
    }

    /// Mutably borrow the underlying stream.
    pub fn get_mut(&mut self) -> &mut T {
        &mut self.inner
    }

    /// Consume the reader and return the inner stream.
    pub fn into_inner(self) -> T {
        self.inner
    }

    /// Current envelope reader configuration.
    pub fn config(&self) -> &EnvelopeConfig {
        &self.config
    }
}
