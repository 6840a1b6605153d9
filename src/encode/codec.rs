use std::fmt;
use std::str::FromStr;

use crate::foundation::core::{Fps, Quality};
use crate::foundation::error::{ReelError, ReelResult};

/// Output container.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContainerFormat {
    #[default]
    Mp4,
    Avi,
    Mov,
    Webm,
}

impl ContainerFormat {
    pub fn extension(self) -> &'static str {
        match self {
            Self::Mp4 => "mp4",
            Self::Avi => "avi",
            Self::Mov => "mov",
            Self::Webm => "webm",
        }
    }

    /// Muxer name passed to `ffmpeg -f`. `webm` has no codec path of its own and is written as mp4.
    pub fn muxer(self) -> &'static str {
        match self {
            Self::Mp4 | Self::Webm => "mp4",
            Self::Avi => "avi",
            Self::Mov => "mov",
        }
    }
}

impl fmt::Display for ContainerFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

impl FromStr for ContainerFormat {
    type Err = ReelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "mp4" => Ok(Self::Mp4),
            "avi" => Ok(Self::Avi),
            "mov" => Ok(Self::Mov),
            "webm" => Ok(Self::Webm),
            other => Err(ReelError::validation(format!(
                "unknown container format '{other}'"
            ))),
        }
    }
}

/// Codec as requested by the user. The codec actually used is [`resolve_fourcc`]'s answer.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Codec {
    #[default]
    H264,
    Mjpg,
    Xvid,
    Vp9,
}

impl fmt::Display for Codec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::H264 => "H264",
            Self::Mjpg => "MJPG",
            Self::Xvid => "XVID",
            Self::Vp9 => "VP9",
        })
    }
}

impl FromStr for Codec {
    type Err = ReelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "H264" => Ok(Self::H264),
            "MJPG" => Ok(Self::Mjpg),
            "XVID" => Ok(Self::Xvid),
            "VP9" => Ok(Self::Vp9),
            other => Err(ReelError::validation(format!("unknown codec '{other}'"))),
        }
    }
}

/// Four-character code of the codec a writer is opened with.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum FourCc {
    /// Generic MPEG-4 Part 2.
    Mp4v,
    /// Motion JPEG.
    Mjpg,
    /// Xvid-tagged MPEG-4 Part 2.
    Xvid,
}

impl FourCc {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Mp4v => "mp4v",
            Self::Mjpg => "MJPG",
            Self::Xvid => "XVID",
        }
    }
}

impl fmt::Display for FourCc {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Map `(container, requested codec)` onto the codec the writer is actually opened with.
///
/// Only `avi` honours the request (`MJPG`, anything else becomes `XVID`). Every other container,
/// `webm` included, gets `mp4v`; `VP9` has no distinct path.
pub fn resolve_fourcc(format: ContainerFormat, requested: Codec) -> FourCc {
    match (format, requested) {
        (ContainerFormat::Avi, Codec::Mjpg) => FourCc::Mjpg,
        (ContainerFormat::Avi, _) => FourCc::Xvid,
        (ContainerFormat::Mp4 | ContainerFormat::Mov | ContainerFormat::Webm, _) => FourCc::Mp4v,
    }
}

fn default_fps() -> u32 {
    Fps::default().get()
}

fn default_quality() -> u32 {
    u32::from(Quality::default().get())
}

/// User-facing output configuration.
///
/// Stored as a plain record so that project files with missing fields still load.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct OutputSettings {
    #[serde(default)]
    pub format: ContainerFormat,
    #[serde(default = "default_fps")]
    pub fps: u32,
    #[serde(default)]
    pub codec: Codec,
    #[serde(default = "default_quality")]
    pub quality: u32,
}

impl Default for OutputSettings {
    fn default() -> Self {
        Self {
            format: ContainerFormat::default(),
            fps: default_fps(),
            codec: Codec::default(),
            quality: default_quality(),
        }
    }
}

impl OutputSettings {
    pub fn validate(&self) -> ReelResult<()> {
        Fps::new(self.fps)?;
        Quality::new(self.quality)?;
        Ok(())
    }

    pub fn fps(&self) -> ReelResult<Fps> {
        Fps::new(self.fps)
    }

    pub fn quality(&self) -> ReelResult<Quality> {
        Quality::new(self.quality)
    }

    pub fn fourcc(&self) -> FourCc {
        resolve_fourcc(self.format, self.codec)
    }
}
