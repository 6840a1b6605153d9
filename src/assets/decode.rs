use std::path::Path;

use anyhow::Context;

use crate::foundation::core::Dimensions;
use crate::foundation::error::{ReelError, ReelResult};

/// Decoded still image as tightly packed straight-alpha RGBA8.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Frame {
    pub dims: Dimensions,
    pub rgba8: Vec<u8>,
}

impl Frame {
    pub fn new(dims: Dimensions, rgba8: Vec<u8>) -> ReelResult<Self> {
        if rgba8.len() != dims.rgba8_len() {
            return Err(ReelError::validation(format!(
                "frame buffer is {} bytes, expected {} for {dims}",
                rgba8.len(),
                dims.rgba8_len()
            )));
        }
        Ok(Self { dims, rgba8 })
    }

    /// Solid-colour frame, mostly useful in tests.
    pub fn solid(dims: Dimensions, rgba: [u8; 4]) -> Self {
        let mut rgba8 = Vec::with_capacity(dims.rgba8_len());
        for _ in 0..(dims.width as usize * dims.height as usize) {
            rgba8.extend_from_slice(&rgba);
        }
        Self { dims, rgba8 }
    }
}

/// Image-decode collaborator used by the assembler.
pub trait ImageDecoder: Send + Sync {
    /// Decode the image at `path` into RGBA8.
    fn decode(&self, path: &Path) -> ReelResult<Frame>;
}

/// Decoder backed by the `image` crate (PNG, JPEG, TIFF, BMP, ...).
#[derive(Clone, Copy, Debug, Default)]
pub struct FsImageDecoder;

impl ImageDecoder for FsImageDecoder {
    fn decode(&self, path: &Path) -> ReelResult<Frame> {
        let bytes =
            std::fs::read(path).with_context(|| format!("read image '{}'", path.display()))?;
        decode_image(&bytes)
    }
}

pub fn decode_image(bytes: &[u8]) -> ReelResult<Frame> {
    let dyn_img = image::load_from_memory(bytes).context("decode image from memory")?;
    let rgba = dyn_img.to_rgba8();
    let (width, height) = rgba.dimensions();
    Ok(Frame {
        dims: Dimensions::new(width, height),
        rgba8: rgba.into_raw(),
    })
}
