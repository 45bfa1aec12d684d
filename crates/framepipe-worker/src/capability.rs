use framepipe_channel::{FrameMetadata, FrameSink};
use image::GrayImage;

use crate::error::Result;
use crate::state::StateBag;

/// What the runtime hands a capability on every lifecycle call: the shared
/// state bag plus the channel's send surface.
pub struct WorkerContext<'a> {
    /// The worker's mutable key/value store.
    pub state: &'a mut StateBag,
    channel: &'a mut dyn FrameSink,
}

impl<'a> WorkerContext<'a> {
    pub(crate) fn new(state: &'a mut StateBag, channel: &'a mut dyn FrameSink) -> Self {
        Self { state, channel }
    }

    /// Send a log envelope to the supervisor.
    pub fn send_log(&mut self, message: &str) -> Result<()> {
        self.channel.send_log(message)?;
        Ok(())
    }

    /// Request additional frames beyond the runtime's own cycle.
    pub fn request_frame(&mut self, count: u32) -> Result<()> {
        self.channel.request_frame(count)?;
        Ok(())
    }

    /// Emit a named result image for the current frame.
    ///
    /// No-op if no frame has been received yet.
    pub fn emit_result(&mut self, tag: &str, image_bytes: &[u8]) -> Result<()> {
        self.channel.emit_result(tag, image_bytes)?;
        Ok(())
    }

    /// Metadata of the current frame, if one has been received.
    pub fn current_frame(&self) -> Option<&FrameMetadata> {
        self.channel.current_frame()
    }
}

/// A unit of pluggable analysis behavior, invoked by the runtime through a
/// fixed interface.
///
/// `setup` runs exactly once before the first frame; `handle_frame` runs
/// once per received frame with its decoded grayscale buffer and may emit
/// zero or more results; `cleanup` runs exactly once when the supervisor
/// closes the stream.
pub trait Capability {
    /// One-time initialization. Default: start from an empty state bag.
    fn setup(&mut self, ctx: &mut WorkerContext<'_>) -> Result<()> {
        ctx.state.clear();
        Ok(())
    }

    /// Per-frame analysis. Default: log the buffer's dimensions.
    fn handle_frame(&mut self, ctx: &mut WorkerContext<'_>, frame: &GrayImage) -> Result<()> {
        let (width, height) = frame.dimensions();
        ctx.send_log(&format!("frame size ({width}, {height})"))
    }

    /// Shutdown hook. Default: a farewell log message.
    fn cleanup(&mut self, ctx: &mut WorkerContext<'_>) -> Result<()> {
        ctx.send_log("cleaning up!")
    }
}
