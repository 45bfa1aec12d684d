use std::io::Cursor;

use bytes::{Buf, BufMut, BytesMut};
use rmpv::Value;

use crate::error::{EnvelopeError, Result};

/// Length prefix: 4-byte big-endian unsigned integer.
pub const LENGTH_PREFIX_SIZE: usize = 4;

/// Default maximum envelope body size: 64 MiB.
///
/// The protocol itself allows anything the 32-bit prefix can express; this
/// ceiling bounds allocation against a corrupt or hostile peer.
pub const DEFAULT_MAX_ENVELOPE: usize = 64 * 1024 * 1024;

/// One complete tagged message unit on the wire.
#[derive(Debug, Clone, PartialEq)]
pub struct Envelope {
    /// Discriminates the payload shape. See [`crate::tags`].
    pub tag: i64,
    /// The tagged payload sequence.
    pub payload: Vec<Value>,
}

impl Envelope {
    /// Create a new envelope.
    pub fn new(tag: i64, payload: Vec<Value>) -> Self {
        Self { tag, payload }
    }
}

/// Encode an envelope into the wire format.
///
/// Wire format:
/// ```text
/// ┌────────────────┬──────────────────────────────────────┐
/// │ Length (4B BE) │ msgpack of [tag: int, payload: array] │
/// └────────────────┴──────────────────────────────────────┘
/// ```
pub fn encode_envelope(tag: i64, payload: &[Value], dst: &mut BytesMut) -> Result<()> {
    let body = Value::Array(vec![Value::from(tag), Value::Array(payload.to_vec())]);

    let mut encoded = Vec::new();
    rmpv::encode::write_value(&mut encoded, &body)
        .map_err(|err| EnvelopeError::Io(std::io::Error::other(err)))?;

    if encoded.len() > u32::MAX as usize {
        return Err(EnvelopeError::PayloadTooLarge {
            size: encoded.len(),
            max: u32::MAX as usize,
        });
    }

    dst.reserve(LENGTH_PREFIX_SIZE + encoded.len());
    dst.put_u32(encoded.len() as u32);
    dst.put_slice(&encoded);
    Ok(())
}

/// Decode an envelope from a buffer.
///
/// Returns `Ok(None)` if the buffer doesn't contain a complete envelope yet.
/// On success, consumes the envelope bytes from the buffer.
pub fn decode_envelope(src: &mut BytesMut, max_envelope_size: usize) -> Result<Option<Envelope>> {
    if src.len() < LENGTH_PREFIX_SIZE {
        return Ok(None); // Need more data
    }

    let declared = u32::from_be_bytes(src[0..4].try_into().unwrap()) as usize;

    if declared > max_envelope_size {
        return Err(EnvelopeError::PayloadTooLarge {
            size: declared,
            max: max_envelope_size,
        });
    }

    let total = LENGTH_PREFIX_SIZE + declared;
    if src.len() < total {
        return Ok(None); // Need more data
    }

    src.advance(LENGTH_PREFIX_SIZE);
    let body = src.split_to(declared);

    let mut cursor = Cursor::new(&body[..]);
    let value = rmpv::decode::read_value(&mut cursor)
        .map_err(|err| EnvelopeError::Protocol(format!("invalid msgpack body: {err}")))?;

    if (cursor.position() as usize) < body.len() {
        return Err(EnvelopeError::Protocol(format!(
            "{} trailing bytes after msgpack body",
            body.len() - cursor.position() as usize
        )));
    }

    into_envelope(value).map(Some)
}

fn into_envelope(value: Value) -> Result<Envelope> {
    let Value::Array(items) = value else {
        return Err(EnvelopeError::Protocol(
            "envelope body is not an array".to_string(),
        ));
    };

    if items.len() != 2 {
        return Err(EnvelopeError::Protocol(format!(
            "expected [tag, payload], got {} elements",
            items.len()
        )));
    }

    let mut items = items.into_iter();
    let tag = items
        .next()
        .and_then(|v| v.as_i64())
        .ok_or_else(|| EnvelopeError::Protocol("envelope tag is not an integer".to_string()))?;

    let payload = match items.next() {
        Some(Value::Array(payload)) => payload,
        _ => {
            return Err(EnvelopeError::Protocol(
                "envelope payload is not an array".to_string(),
            ))
        }
    };

    Ok(Envelope { tag, payload })
}

/// Configuration for the envelope codec.
#[derive(Debug, Clone)]
pub struct EnvelopeConfig {
    /// Maximum envelope body size in bytes. Default: 64 MiB.
    pub max_envelope_size: usize,
}

impl Default for EnvelopeConfig {
    fn default() -> Self {
        Self {
            max_envelope_size: DEFAULT_MAX_ENVELOPE,
        }
    }
}
