use std::fmt;

use crate::foundation::error::{ReelError, ReelResult};

/// Integer frames-per-second, validated to `[Fps::MIN, Fps::MAX]`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Fps(u32);

impl Fps {
    pub const MIN: u32 = 1;
    pub const MAX: u32 = 120;

    /// Create a validated FPS value.
    pub fn new(fps: u32) -> ReelResult<Self> {
        if !(Self::MIN..=Self::MAX).contains(&fps) {
            return Err(ReelError::validation(format!(
                "fps must be in [{}, {}], got {fps}",
                Self::MIN,
                Self::MAX
            )));
        }
        Ok(Self(fps))
    }

    pub fn get(self) -> u32 {
        self.0
    }

    /// Duration of one frame in seconds.
    pub fn frame_duration_secs(self) -> f64 {
        1.0 / f64::from(self.0)
    }
}

impl Default for Fps {
    fn default() -> Self {
        Self(30)
    }
}

impl fmt::Display for Fps {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Pixel dimensions of a decoded frame.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize,
)]
pub struct Dimensions {
    pub width: u32,
    pub height: u32,
}

impl Dimensions {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Byte length of one tightly packed RGBA8 frame at this size.
    pub fn rgba8_len(self) -> usize {
        (self.width as usize)
            .saturating_mul(self.height as usize)
            .saturating_mul(4)
    }

    /// Return `true` when both sides are even (required by 4:2:0 chroma subsampling).
    pub fn is_even(self) -> bool {
        self.width.is_multiple_of(2) && self.height.is_multiple_of(2)
    }
}

impl fmt::Display for Dimensions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

/// Encoder quality in `[0, 100]`, higher is better.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Quality(u8);

impl Quality {
    pub const MAX: u8 = 100;

    pub fn new(q: u32) -> ReelResult<Self> {
        if q > u32::from(Self::MAX) {
            return Err(ReelError::validation(format!(
                "quality must be in [0, {}], got {q}",
                Self::MAX
            )));
        }
        Ok(Self(q as u8))
    }

    pub fn get(self) -> u8 {
        self.0
    }

    /// Map onto an mpeg4/mjpeg quantizer scale: 100 -> 2 (best), 0 -> 31 (worst).
    pub fn qscale(self) -> u32 {
        let q = u32::from(self.0);
        31 - (q * 29 + 50) / 100
    }
}

impl Default for Quality {
    fn default() -> Self {
        Self(80)
    }
}
