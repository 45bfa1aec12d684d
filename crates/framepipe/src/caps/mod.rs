//! Concrete analysis capabilities selectable from the command line.

mod motion;

pub use motion::MotionDetector;

use framepipe_worker::Capability;

/// The stock capability: every trait default, so each frame just logs its
/// dimensions.
pub struct FrameDims;

impl Capability for FrameDims {}
