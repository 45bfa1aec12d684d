use bytes::Bytes;
use rmpv::Value;

use crate::error::{ChannelError, Result};

/// The metadata mapping carried by one frame-data envelope.
///
/// Holds the encoded image bytes plus whatever other fields the supervisor
/// attached (frame identifier, timestamp, ...), kept as opaque msgpack
/// values so results can propagate them back unchanged.
#[derive(Debug, Clone, PartialEq)]
pub struct FrameMetadata {
    jpeg: Bytes,
    fields: Vec<(Value, Value)>,
}

impl FrameMetadata {
    /// Extract frame metadata from an envelope payload.
    ///
    /// The first payload element must be a map containing at least a `jpeg`
    /// byte buffer. Remaining payload elements, if any, are ignored.
    pub fn from_payload(payload: &[Value]) -> Result<Self> {
        let first = payload.first().ok_or_else(|| {
            ChannelError::Protocol("frame payload is an empty sequence".to_string())
        })?;

        let fields = first
            .as_map()
            .ok_or_else(|| {
                ChannelError::Protocol("frame payload slot 0 is not a map".to_string())
            })?
            .to_vec();

        let jpeg = fields
            .iter()
            .find(|(key, _)| key.as_str() == Some("jpeg"))
            .and_then(|(_, value)| value.as_slice())
            .map(Bytes::copy_from_slice)
            .ok_or_else(|| {
                ChannelError::Protocol("frame metadata has no 'jpeg' byte buffer".to_string())
            })?;

        Ok(Self { jpeg, fields })
    }

    /// The encoded image carried by this frame.
    pub fn jpeg(&self) -> &[u8] {
        &self.jpeg
    }

    /// Look up a metadata field by name.
    pub fn field(&self, name: &str) -> Option<&Value> {
        self.fields
            .iter()
            .find(|(key, _)| key.as_str() == Some(name))
            .map(|(_, value)| value)
    }

    /// All metadata fields in wire order.
    pub fn fields(&self) -> &[(Value, Value)] {
        &self.fields
    }
}
