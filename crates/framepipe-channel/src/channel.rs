use std::io::{Read, Stdin, Stdout, Write};

use framepipe_envelope::{tags, EnvelopeConfig, EnvelopeReader, EnvelopeWriter};
use rmpv::Value;

use crate::error::Result;
use crate::metadata::FrameMetadata;

/// A frame channel over the process's standard input/output.
pub type StdioChannel = FrameChannel<Stdin, Stdout>;

/// The channel surface available to analysis code.
///
/// Everything except `receive_frame`: a capability may log, request extra
/// frames, and emit results, but the runtime alone drives the receive slot.
pub trait FrameSink {
    /// Write one complete log envelope, flushed immediately.
    fn send_log(&mut self, message: &str) -> Result<()>;

    /// Write one frame-request envelope, flushed immediately.
    fn request_frame(&mut self, count: u32) -> Result<()>;

    /// Write one frame-result envelope carrying a named output image.
    ///
    /// A no-op until the first frame has been received: a result always
    /// correlates with some current frame.
    fn emit_result(&mut self, tag: &str, image_bytes: &[u8]) -> Result<()>;

    /// The most recently received frame, if any.
    fn current_frame(&self) -> Option<&FrameMetadata>;
}

/// Typed send/receive operations over one stream pair.
///
/// Owns the underlying byte streams and the "current frame" slot. Every
/// send is one complete envelope on the wire, flushed before the call
/// returns; writes are observed by the peer in call order.
pub struct FrameChannel<R, W> {
    reader: EnvelopeReader<R>,
    writer: EnvelopeWriter<W>,
    current: Option<FrameMetadata>,
}

impl<R: Read, W: Write> FrameChannel<R, W> {
    /// Create a channel over a readable/writable stream pair.
    pub fn new(input: R, output: W) -> Self {
        Self::with_config(input, output, EnvelopeConfig::default())
    }

    /// Create a channel with an explicit envelope configuration.
    pub fn with_config(input: R, output: W, config: EnvelopeConfig) -> Self {
        Self {
            reader: EnvelopeReader::with_config(input, config.clone()),
            writer: EnvelopeWriter::with_config(output, config),
            current: None,
        }
    }

    /// Block until the next envelope arrives and record it as the current
    /// frame, replacing any previous one.
    ///
    /// The incoming tag is deliberately not checked: whatever arrives in
    /// this slot is treated as `[metadata_map, ...]`, matching the peer
    /// contract this protocol inherited. An unconventional tag is logged to
    /// stderr but accepted.
    pub fn receive_frame(&mut self) -> Result<FrameMetadata> {
        let envelope = self.reader.read_envelope()?;

        if envelope.tag != tags::FRAME_DATA {
            tracing::warn!(
                tag = envelope.tag,
                tag_name = tags::tag_name(envelope.tag),
                "unconventional tag in frame slot, accepting payload as frame metadata"
            );
        }

        let metadata = FrameMetadata::from_payload(&envelope.payload)?;
        self.current = Some(metadata.clone());
        Ok(metadata)
    }

    /// Consume the channel and return the underlying streams.
    pub fn into_inner(self) -> (R, W) {
        (self.reader.into_inner(), self.writer.into_inner())
    }
}

impl FrameChannel<Stdin, Stdout> {
    /// Create a channel over the conventional stdin/stdout pair.
    pub fn stdio() -> Self {
        Self::new(std::io::stdin(), std::io::stdout())
    }
}

impl<R: Read, W: Write> FrameSink for FrameChannel<R, W> {
    fn send_log(&mut self, message: &str) -> Result<()> {
        self.writer
            .write_envelope(tags::LOG, &[Value::from(message)])?;
        Ok(())
    }

    fn request_frame(&mut self, count: u32) -> Result<()> {
        self.writer
            .write_envelope(tags::FRAME_REQUEST, &[Value::from(count)])?;
        Ok(())
    }

    fn emit_result(&mut self, tag: &str, image_bytes: &[u8]) -> Result<()> {
        if self.current.is_none() {
            return Ok(());
        }

        self.writer.write_envelope(
            tags::FRAME_RESULT,
            &[Value::from(tag), Value::Binary(image_bytes.to_vec())],
        )?;
        Ok(())
    }

    fn current_frame(&self) -> Option<&FrameMetadata> {
        self.current.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;
    use std::os::unix::net::UnixStream;

    use framepipe_envelope::{EnvelopeError, EnvelopeReader, EnvelopeWriter};

    use super::*;
    use crate::error::ChannelError;

    fn wire_channel() -> (
        FrameChannel<UnixStream, UnixStream>,
        EnvelopeWriter<UnixStream>,
        EnvelopeReader<UnixStream>,
    ) {
        let (worker_in, supervisor_out) = UnixStream::pair().unwrap();
        let (supervisor_in, worker_out) = UnixStream::pair().unwrap();

        let channel = FrameChannel::new(worker_in, worker_out);
        let supervisor_writer = EnvelopeWriter::new(supervisor_out);
        let supervisor_reader = EnvelopeReader::new(supervisor_in);
        (channel, supervisor_writer, supervisor_reader)
    }

    fn frame_data_payload(jpeg: &[u8], id: i64) -> Vec<Value> {
        vec![Value::Map(vec![
            (Value::from("jpeg"), Value::Binary(jpeg.to_vec())),
            (Value::from("id"), Value::from(id)),
        ])]
    }

    #[test]
    fn send_log_wire_shape() {
        let (mut channel, _sw, mut sr) = wire_channel();

        channel.send_log("hello supervisor").unwrap();

        let envelope = sr.read_envelope().unwrap();
        assert_eq!(envelope.tag, tags::LOG);
        assert_eq!(envelope.payload, vec![Value::from("hello supervisor")]);
    }

    #[test]
    fn request_frame_wire_shape() {
        let (mut channel, _sw, mut sr) = wire_channel();

        channel.request_frame(1).unwrap();

        let envelope = sr.read_envelope().unwrap();
        assert_eq!(envelope.tag, tags::FRAME_REQUEST);
        assert_eq!(envelope.payload, vec![Value::from(1)]);
    }

    #[test]
    fn receive_frame_records_metadata() {
        let (mut channel, mut sw, _sr) = wire_channel();

        sw.write_envelope(tags::FRAME_DATA, &frame_data_payload(&[0xFF, 0xD8], 7))
            .unwrap();

        let metadata = channel.receive_frame().unwrap();
        assert_eq!(metadata.jpeg(), &[0xFF, 0xD8]);
        assert_eq!(metadata.field("id"), Some(&Value::from(7)));
        assert_eq!(channel.current_frame(), Some(&metadata));
    }

    #[test]
    fn receive_frame_ignores_tag() {
        let (mut channel, mut sw, _sr) = wire_channel();

        // Any tag is accepted in the frame slot.
        sw.write_envelope(99, &frame_data_payload(&[0x01], 1))
            .unwrap();

        let metadata = channel.receive_frame().unwrap();
        assert_eq!(metadata.jpeg(), &[0x01]);
    }

    #[test]
    fn receive_frame_replaces_current() {
        let (mut channel, mut sw, _sr) = wire_channel();

        sw.write_envelope(tags::FRAME_DATA, &frame_data_payload(&[0x01], 1))
            .unwrap();
        sw.write_envelope(tags::FRAME_DATA, &frame_data_payload(&[0x02], 2))
            .unwrap();

        channel.receive_frame().unwrap();
        channel.receive_frame().unwrap();

        let current = channel.current_frame().unwrap();
        assert_eq!(current.jpeg(), &[0x02]);
        assert_eq!(current.field("id"), Some(&Value::from(2)));
    }

    #[test]
    fn receive_frame_rejects_malformed_payload() {
        let (mut channel, mut sw, _sr) = wire_channel();

        sw.write_envelope(tags::FRAME_DATA, &[Value::from("not a map")])
            .unwrap();

        let err = channel.receive_frame().unwrap_err();
        assert!(matches!(err, ChannelError::Protocol(_)));
    }

    #[test]
    fn receive_frame_observes_clean_close() {
        let (mut channel, sw, _sr) = wire_channel();
        drop(sw);

        let err = channel.receive_frame().unwrap_err();
        assert!(err.is_closed());
        assert!(matches!(
            err,
            ChannelError::Envelope(EnvelopeError::StreamClosed)
        ));
    }

    #[test]
    fn emit_result_before_any_frame_is_noop() {
        let mut channel = FrameChannel::new(
            Cursor::new(Vec::<u8>::new()),
            Cursor::new(Vec::<u8>::new()),
        );

        channel.emit_result("foreground", &[1, 2, 3]).unwrap();

        let (_input, output) = channel.into_inner();
        assert!(output.into_inner().is_empty());
    }

    #[test]
    fn emit_result_wire_shape_after_frame() {
        let (mut channel, mut sw, mut sr) = wire_channel();

        sw.write_envelope(tags::FRAME_DATA, &frame_data_payload(&[0xFF], 3))
            .unwrap();
        channel.receive_frame().unwrap();

        channel.emit_result("foreground", &[0xDE, 0xAD]).unwrap();

        let envelope = sr.read_envelope().unwrap();
        assert_eq!(envelope.tag, tags::FRAME_RESULT);
        assert_eq!(
            envelope.payload,
            vec![Value::from("foreground"), Value::Binary(vec![0xDE, 0xAD])]
        );
    }

    #[test]
    fn sends_are_ordered_by_call_sequence() {
        let (mut channel, _sw, mut sr) = wire_channel();

        channel.send_log("first").unwrap();
        channel.request_frame(1).unwrap();
        channel.send_log("second").unwrap();

        assert_eq!(sr.read_envelope().unwrap().tag, tags::LOG);
        assert_eq!(sr.read_envelope().unwrap().tag, tags::FRAME_REQUEST);
        let last = sr.read_envelope().unwrap();
        assert_eq!(last.payload, vec![Value::from("second")]);
    }
}
