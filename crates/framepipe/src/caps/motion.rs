use framepipe_worker::{Capability, ImageCodec, JpegCodec, WorkerContext, WorkerError};
use image::GrayImage;

const STATE_KEY: &str = "fgbg";

/// Per-pixel running-average background model.
///
/// `apply` classifies each pixel as foreground when it deviates from the
/// learned background by more than the threshold, then folds the frame into
/// the background at the learning rate. A dimension change resets the model.
pub struct BackgroundModel {
    background: Vec<f32>,
    width: u32,
    height: u32,
}

impl BackgroundModel {
    pub fn new() -> Self {
        Self {
            background: Vec::new(),
            width: 0,
            height: 0,
        }
    }

    pub fn apply(&mut self, frame: &GrayImage, learning_rate: f32, threshold: f32) -> GrayImage {
        let (width, height) = frame.dimensions();
        if (width, height) != (self.width, self.height) {
            self.width = width;
            self.height = height;
            self.background = frame.pixels().map(|p| f32::from(p.0[0])).collect();
            return GrayImage::new(width, height);
        }

        let mut mask = GrayImage::new(width, height);
        for (i, (pixel, out)) in frame.pixels().zip(mask.pixels_mut()).enumerate() {
            let value = f32::from(pixel.0[0]);
            let bg = self.background[i];
            if (value - bg).abs() > threshold {
                out.0[0] = 255;
            }
            self.background[i] = bg + learning_rate * (value - bg);
        }
        mask
    }
}

impl Default for BackgroundModel {
    fn default() -> Self {
        Self::new()
    }
}

/// Motion detection via background subtraction.
///
/// Setup stores a fresh background model in the state bag; every frame
/// produces a foreground mask and emits it on the `"foreground"` result
/// channel.
pub struct MotionDetector {
    learning_rate: f32,
    threshold: f32,
    codec: JpegCodec,
}

impl MotionDetector {
    pub fn new(learning_rate: f32, threshold: f32) -> Self {
        Self {
            learning_rate,
            threshold,
            codec: JpegCodec,
        }
    }
}

impl Default for MotionDetector {
    fn default() -> Self {
        Self::new(0.05, 24.0)
    }
}

impl Capability for MotionDetector {
    fn setup(&mut self, ctx: &mut WorkerContext<'_>) -> Result<(), WorkerError> {
        ctx.state.clear();
        ctx.state.insert(STATE_KEY, BackgroundModel::new());
        Ok(())
    }

    fn handle_frame(
        &mut self,
        ctx: &mut WorkerContext<'_>,
        frame: &GrayImage,
    ) -> Result<(), WorkerError> {
        let mask = {
            let model = ctx
                .state
                .get_mut::<BackgroundModel>(STATE_KEY)
                .ok_or_else(|| {
                    WorkerError::Capability("background model missing from state".to_string())
                })?;
            model.apply(frame, self.learning_rate, self.threshold)
        };

        let jpeg = self.codec.encode(&mask)?;
        ctx.emit_result("foreground", &jpeg)
    }
}
