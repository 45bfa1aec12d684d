//! Length-prefixed MessagePack envelope framing.
//!
//! Every message on the wire is framed as:
//! - A 4-byte big-endian payload length
//! - A MessagePack encoding of `[tag: integer, payload: array]`
//!
//! The payload's shape is determined solely by the tag; the codec itself is
//! independent of message semantics. No partial reads, no buffer management
//! in user code.

pub mod codec;
pub mod error;
pub mod reader;
pub mod tags;
pub mod writer;

pub use codec::{
    decode_envelope, encode_envelope, Envelope, EnvelopeConfig, DEFAULT_MAX_ENVELOPE,
    LENGTH_PREFIX_SIZE,
};
pub use error::{EnvelopeError, Result};
pub use reader::EnvelopeReader;
pub use tags::{FRAME_DATA, FRAME_REQUEST, FRAME_RESULT, LOG};
pub use writer::EnvelopeWriter;
