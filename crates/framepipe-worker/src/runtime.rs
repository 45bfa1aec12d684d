use std::io::{Read, Write};
use std::time::Instant;

use framepipe_channel::{FrameChannel, FrameSink};

use crate::capability::{Capability, WorkerContext};
use crate::codec::{ImageCodec, JpegCodec};
use crate::error::Result;
use crate::state::StateBag;

/// The worker runtime: setup once, then a strict request/receive/handle
/// cycle until the supervisor closes its stream, then cleanup once.
///
/// Single-threaded, blocking. The only suspension point is the blocking
/// read awaiting the next envelope; the request written just before it is
/// the synchronization mechanism with the peer. A new frame is never
/// requested before the previous one has been consumed.
pub struct Worker<R, W> {
    channel: FrameChannel<R, W>,
    codec: Box<dyn ImageCodec>,
}

impl<R: Read, W: Write> Worker<R, W> {
    /// Create a worker over a channel with the default JPEG codec.
    pub fn new(channel: FrameChannel<R, W>) -> Self {
        Self::with_codec(channel, Box::new(JpegCodec))
    }

    /// Create a worker with an explicit image codec.
    pub fn with_codec(channel: FrameChannel<R, W>, codec: Box<dyn ImageCodec>) -> Self {
        Self { channel, codec }
    }

    /// Drive the full worker lifecycle.
    ///
    /// Runs `capability.setup` exactly once, then loops: request one frame,
    /// block for its arrival, decode its image bytes, invoke
    /// `capability.handle_frame` (measuring wall-clock elapsed time), and
    /// report the duration over the log channel. When the receive step
    /// observes a clean end-of-stream, `capability.cleanup` runs exactly
    /// once and the run finishes successfully; nothing is written after
    /// cleanup's message. Every other failure propagates unrecovered.
    pub fn run(&mut self, capability: &mut dyn Capability) -> Result<()> {
        let mut state = StateBag::new();

        {
            let mut ctx = WorkerContext::new(&mut state, &mut self.channel);
            capability.setup(&mut ctx)?;
        }
        tracing::debug!("worker setup complete");

        loop {
            self.channel.request_frame(1)?;

            let metadata = match self.channel.receive_frame() {
                Ok(metadata) => metadata,
                Err(err) if err.is_closed() => break,
                Err(err) => return Err(err.into()),
            };

            let frame = self.codec.decode(metadata.jpeg())?;

            let started = Instant::now();
            {
                let mut ctx = WorkerContext::new(&mut state, &mut self.channel);
                capability.handle_frame(&mut ctx, &frame)?;
            }
            let elapsed_ms = started.elapsed().as_secs_f64() * 1000.0;

            self.channel
                .send_log(&format!("Ran for :{elapsed_ms:.3} ms"))?;
            tracing::trace!(elapsed_ms, "handled frame");
        }

        let mut ctx = WorkerContext::new(&mut state, &mut self.channel);
        capability.cleanup(&mut ctx)?;
        tracing::debug!("worker cleanup complete");
        Ok(())
    }

    /// Consume the worker and return its channel.
    pub fn into_channel(self) -> FrameChannel<R, W> {
        self.channel
    }
}
