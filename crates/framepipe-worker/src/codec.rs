use std::io::Cursor;

use image::{GrayImage, ImageFormat};

use crate::error::{Result, WorkerError};

/// The opaque image codec collaborator: bytes in, pixel buffer out, and
/// back. Round-trips visually, not byte-for-byte.
pub trait ImageCodec {
    /// Decode compressed image bytes into a grayscale pixel buffer.
    fn decode(&self, bytes: &[u8]) -> Result<GrayImage>;

    /// Encode a grayscale pixel buffer into compressed image bytes.
    fn encode(&self, image: &GrayImage) -> Result<Vec<u8>>;
}

/// Default codec over the `image` crate's JPEG support.
#[derive(Debug, Default, Clone, Copy)]
pub struct JpegCodec;

impl ImageCodec for JpegCodec {
    fn decode(&self, bytes: &[u8]) -> Result<GrayImage> {
        let decoded = image::load_from_memory(bytes).map_err(WorkerError::Decode)?;
        Ok(decoded.to_luma8())
    }

    fn encode(&self, image: &GrayImage) -> Result<Vec<u8>> {
        let mut out = Cursor::new(Vec::new());
        image
            .write_to(&mut out, ImageFormat::Jpeg)
            .map_err(WorkerError::Encode)?;
        Ok(out.into_inner())
    }
}
