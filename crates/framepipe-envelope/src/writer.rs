use std::io::{ErrorKind, Write};

use bytes::BytesMut;
use rmpv::Value;

use crate::codec::{encode_envelope, Envelope, EnvelopeConfig};
use crate::error::{EnvelopeError, Result};

const INITIAL_BUFFER_CAPACITY: usize = 8 * 1024;

/// Writes complete envelopes to any `Write` stream.
///
/// Every envelope is written in full and flushed before the call returns:
/// the peer observes writes in call order, and a log or request is visible
/// without delay.
pub struct EnvelopeWriter<T> {
    inner: T,
    buf: BytesMut,
    config: EnvelopeConfig,
}

impl<T: Write> EnvelopeWriter<T> {
    /// Create a new envelope writer with default configuration.
    pub fn new(inner: T) -> Self {
        Self::with_config(inner, EnvelopeConfig::default())
    }

    /// Create a new envelope writer with explicit configuration.
    pub fn with_config(inner: T, config: EnvelopeConfig) -> Self {
        Self {
            inner,
            buf: BytesMut::with_capacity(INITIAL_BUFFER_CAPACITY),
            config,
        }
    }

    /// Encode, write, and flush one envelope (blocking).
    pub fn write_envelope(&mut self, tag: i64, payload: &[Value]) -> Result<()> {
        self.buf.clear();
        encode_envelope(tag, payload, &mut self.buf)?;

        let body_len = self.buf.len() - crate::codec::LENGTH_PREFIX_SIZE;
        if body_len > self.config.max_envelope_size {
            return Err(EnvelopeError::PayloadTooLarge {
                size: body_len,
                max: self.config.max_envelope_size,
            });
        }

        let mut offset = 0usize;
        while offset < self.buf.len() {
            match self.inner.write(&self.buf[offset..]) {
                Ok(0) => return Err(EnvelopeError::StreamClosed),
                Ok(n) => offset += n,
                Err(err) if err.kind() == ErrorKind::Interrupted => continue,
                Err(err) if err.kind() == ErrorKind::WouldBlock => continue,
                Err(err) => return Err(EnvelopeError::Io(err)),
            }
        }

        tracing::trace!(tag, body_len, "wrote envelope");
        self.flush()
    }

    /// Write a pre-built envelope.
    pub fn write(&mut self, envelope: &Envelope) -> Result<()> {
        self.write_envelope(envelope.tag, &envelope.payload)
    }

    /// Flush the underlying stream.
    pub fn flush(&mut self) -> Result<()> {
        loop {
            match self.inner.flush() {
                Ok(()) => return Ok(()),
                Err(err) if err.kind() == ErrorKind::Interrupted => continue,
                Err(err) if err.kind() == ErrorKind::WouldBlock => continue,
                Err(err) => return Err(EnvelopeError::Io(err)),
            }
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

    /// Consume the writer and return the inner stream.
    pub fn into_inner(self) -> T {
        self.inner
    }

    /// Current envelope writer configuration.
    pub fn config(&self) -> &EnvelopeConfig {
        &self.config
    }
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Arc;

    use bytes::BytesMut;
    use rmpv::Value;

    use super::*;
    use crate::codec::{decode_envelope, DEFAULT_MAX_ENVELOPE};

    #[test]
    fn write_single_envelope() {
        let cursor = Cursor::new(Vec::<u8>::new());
        let mut writer = EnvelopeWriter::new(cursor);

        writer.write_envelope(0, &[Value::from("hello")]).unwrap();

        let inner = writer.into_inner();
        let mut wire = BytesMut::from(inner.into_inner().as_slice());
        let envelope = decode_envelope(&mut wire, DEFAULT_MAX_ENVELOPE)
            .unwrap()
            .unwrap();
        assert_eq!(envelope.tag, 0);
        assert_eq!(envelope.payload, vec![Value::from("hello")]);
    }

    #[test]
    fn write_multiple_envelopes_in_order() {
        let cursor = Cursor::new(Vec::<u8>::new());
        let mut writer = EnvelopeWriter::new(cursor);

        writer.write_envelope(1, &[Value::from(1)]).unwrap();
        writer.write_envelope(0, &[Value::from("log")]).unwrap();
        writer
            .write_envelope(3, &[Value::from("fg"), Value::Binary(vec![9])])
            .unwrap();

        let inner = writer.into_inner();
        let mut wire = BytesMut::from(inner.into_inner().as_slice());

        let e1 = decode_envelope(&mut wire, DEFAULT_MAX_ENVELOPE)
            .unwrap()
            .unwrap();
        let e2 = decode_envelope(&mut wire, DEFAULT_MAX_ENVELOPE)
            .unwrap()
            .unwrap();
        let e3 = decode_envelope(&mut wire, DEFAULT_MAX_ENVELOPE)
            .unwrap()
            .unwrap();

        assert_eq!((e1.tag, e2.tag, e3.tag), (1, 0, 3));
        assert!(wire.is_empty());
    }

    #[test]
    fn write_prebuilt_envelope() {
        let cursor = Cursor::new(Vec::<u8>::new());
        let mut writer = EnvelopeWriter::new(cursor);

        let envelope = Envelope::new(0, vec![Value::from("prebuilt")]);
        writer.write(&envelope).unwrap();

        let inner = writer.into_inner();
        let mut wire = BytesMut::from(inner.into_inner().as_slice());
        let decoded = decode_envelope(&mut wire, DEFAULT_MAX_ENVELOPE)
            .unwrap()
            .unwrap();
        assert_eq!(decoded, envelope);
    }

    #[test]
    fn body_over_ceiling_rejected() {
        let cfg = EnvelopeConfig {
            max_envelope_size: 8,
        };
        let cursor = Cursor::new(Vec::<u8>::new());
        let mut writer = EnvelopeWriter::with_config(cursor, cfg);

        let err = writer
            .write_envelope(0, &[Value::Binary(vec![0u8; 64])])
            .unwrap_err();
        assert!(matches!(err, EnvelopeError::PayloadTooLarge { .. }));
    }

    #[test]
    fn each_envelope_is_flushed() {
        let sink = FlushTrackingWriter::default();
        let flag = Arc::clone(&sink.flushed);
        let mut writer = EnvelopeWriter::new(sink);

        writer.write_envelope(0, &[Value::from("x")]).unwrap();

        assert!(flag.load(Ordering::SeqCst));
    }

    #[test]
    fn stream_closed_when_write_returns_zero() {
        struct ZeroWriter;
        impl Write for ZeroWriter {
            fn write(&mut self, _buf: &[u8]) -> std::io::Result<usize> {
                Ok(0)
            }
            fn flush(&mut self) -> std::io::Result<()> {
                Ok(())
            }
        }

        let mut writer = EnvelopeWriter::new(ZeroWriter);
        let err = writer.write_envelope(0, &[Value::from("x")]).unwrap_err();
        assert!(matches!(err, EnvelopeError::StreamClosed));
    }

    #[test]
    fn handles_interrupted_write_and_flush() {
        let writer_impl = InterruptedWriteThenFlush {
            wrote_once: false,
            flush_interrupted: false,
            data: Vec::new(),
        };

        let mut writer = EnvelopeWriter::new(writer_impl);
        writer.write_envelope(1, &[Value::from(1)]).unwrap();

        let inner = writer.into_inner();
        assert!(!inner.data.is_empty());
    }

    #[derive(Default)]
    struct FlushTrackingWriter {
        flushed: Arc<AtomicBool>,
        data: Vec<u8>,
    }

    impl Write for FlushTrackingWriter {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.data.extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            self.flushed.store(true, Ordering::SeqCst);
            Ok(())
        }
    }

    struct InterruptedWriteThenFlush {
        wrote_once: bool,
        flush_interrupted: bool,
        data: Vec<u8>,
    }

    impl Write for InterruptedWriteThenFlush {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            if !self.wrote_once {
                self.wrote_once = true;
                return Err(std::io::Error::from(ErrorKind::Interrupted));
            }
            self.data.extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            if !self.flush_interrupted {
                self.flush_interrupted = true;
                return Err(std::io::Error::from(ErrorKind::Interrupted));
            }
            Ok(())
        }
    }
}
