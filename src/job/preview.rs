use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use anyhow::Context as _;

use crate::assemble::assembler::{AssemblyRequest, FailurePolicy};
use crate::encode::codec::{Codec, ContainerFormat, OutputSettings};
use crate::foundation::error::{ReelError, ReelResult};
use crate::frames::list::FrameSnapshot;

/// Opens a finished file with whatever the desktop considers the default player.
pub trait MediaLauncher: Send + Sync {
    fn open(&self, path: &Path) -> ReelResult<()>;
}

/// `open` on macOS, `start` on Windows, `xdg-open` elsewhere.
#[derive(Clone, Copy, Debug, Default)]
pub struct SystemLauncher;

impl MediaLauncher for SystemLauncher {
    fn open(&self, path: &Path) -> ReelResult<()> {
        let mut cmd = if cfg!(target_os = "macos") {
            Command::new("open")
        } else if cfg!(windows) {
            let mut c = Command::new("cmd");
            c.args(["/C", "start", ""]);
            c
        } else {
            Command::new("xdg-open")
        };
        cmd.arg(path)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null());

        // The player outlives us; only the launch itself is checked.
        cmd.spawn()
            .with_context(|| format!("launch default player for '{}'", path.display()))?;
        Ok(())
    }
}

/// Builds short, throwaway preview encodes.
///
/// A preview covers at most [`PreviewGenerator::MAX_FRAMES`] frames from the start of the
/// snapshot, is always an `mp4`, uses its own frame rate and always writes to the same
/// process-local temporary file.
#[derive(Clone, Debug)]
pub struct PreviewGenerator {
    out_path: PathBuf,
    max_frames: usize,
}

impl PreviewGenerator {
    pub const MAX_FRAMES: usize = 100;
    pub const MIN_FPS: u32 = 1;
    pub const MAX_FPS: u32 = 60;

    pub fn new(out_path: impl Into<PathBuf>) -> Self {
        Self {
            out_path: out_path.into(),
            max_frames: Self::MAX_FRAMES,
        }
    }

    /// `<temp_dir>/reelmaker_preview_<pid>.mp4`.
    pub fn default_path() -> PathBuf {
        std::env::temp_dir().join(format!("reelmaker_preview_{}.mp4", std::process::id()))
    }

    pub fn out_path(&self) -> &Path {
        &self.out_path
    }

    pub fn request(&self, frames: &FrameSnapshot, preview_fps: u32) -> ReelResult<AssemblyRequest> {
        if !(Self::MIN_FPS..=Self::MAX_FPS).contains(&preview_fps) {
            return Err(ReelError::validation(format!(
                "preview fps must be in [{}, {}], got {preview_fps}",
                Self::MIN_FPS,
                Self::MAX_FPS
            )));
        }
        let settings = OutputSettings {
            format: ContainerFormat::Mp4,
            fps: preview_fps,
            codec: Codec::H264,
            ..OutputSettings::default()
        };
        AssemblyRequest::from_settings(
            frames.head(self.max_frames),
            &settings,
            self.out_path.clone(),
            FailurePolicy::FailFast,
        )
    }
}

impl Default for PreviewGenerator {
    fn default() -> Self {
        Self::new(Self::default_path())
    }
}
