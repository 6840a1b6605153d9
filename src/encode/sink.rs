use std::path::{Path, PathBuf};
use std::sync::Arc;

use parking_lot::Mutex;

use crate::assets::decode::Frame;
use crate::encode::codec::{ContainerFormat, FourCc};
use crate::foundation::core::{Dimensions, Fps, Quality};
use crate::foundation::error::{ReelError, ReelResult};

/// Everything a writer needs to know before the first frame arrives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SinkConfig {
    /// Output file path.
    pub out_path: PathBuf,
    /// Container the file is muxed into.
    pub format: ContainerFormat,
    /// Resolved codec.
    pub fourcc: FourCc,
    /// Constant output frame rate.
    pub fps: Fps,
    /// Canonical frame size; every pushed frame has exactly this size.
    pub dims: Dimensions,
    pub quality: Quality,
}

/// An open frame writer.
///
/// Ordering contract: `push_frame` is called in playback order, one frame at a time. `end` is
/// called exactly once, after which the writer is released.
pub trait FrameSink: Send {
    /// Encode one frame.
    fn push_frame(&mut self, frame: &Frame) -> ReelResult<()>;
    /// Flush and release the writer.
    fn end(&mut self) -> ReelResult<()>;
}

/// Opens [`FrameSink`]s; the assembler's view of the encoding backend.
pub trait SinkFactory: Send + Sync {
    fn open(&self, cfg: &SinkConfig) -> ReelResult<Box<dyn FrameSink>>;
}

/// Check that `path` could be opened for writing without touching what is there.
///
/// The parent directory must already exist. An existing file is opened for writing but not
/// truncated; a missing one is created and removed again.
pub fn ensure_writable(path: &Path) -> ReelResult<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        let meta = std::fs::metadata(parent).map_err(|e| ReelError::io(parent, e))?;
        if !meta.is_dir() {
            return Err(ReelError::io(
                parent,
                std::io::Error::new(std::io::ErrorKind::NotADirectory, "not a directory"),
            ));
        }
    }

    if path.exists() {
        std::fs::OpenOptions::new()
            .write(true)
            .open(path)
            .map_err(|e| ReelError::io(path, e))?;
        return Ok(());
    }

    std::fs::OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(path)
        .map_err(|e| ReelError::io(path, e))?;
    std::fs::remove_file(path).map_err(|e| ReelError::io(path, e))
}

/// What an [`InMemorySink`] saw.
#[derive(Debug, Default, Clone)]
pub struct Recording {
    /// Configs of every opened sink, in open order.
    pub opened: Vec<SinkConfig>,
    /// Pushed frames in order.
    pub frames: Vec<Frame>,
    /// Number of `end` calls across all sinks.
    pub ends: usize,
}

/// Factory for in-memory sinks, for tests and dry runs.
///
/// The output path is probed with [`ensure_writable`] and then truncated to an empty file, so
/// path errors and leftovers behave the same as with a real encoder.
#[derive(Debug, Default, Clone)]
pub struct InMemorySinkFactory {
    recording: Arc<Mutex<Recording>>,
}

impl InMemorySinkFactory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Copy of everything recorded so far.
    pub fn recording(&self) -> Recording {
        self.recording.lock().clone()
    }
}

impl SinkFactory for InMemorySinkFactory {
    fn open(&self, cfg: &SinkConfig) -> ReelResult<Box<dyn FrameSink>> {
        ensure_writable(&cfg.out_path)?;
        std::fs::File::create(&cfg.out_path).map_err(|e| ReelError::io(&cfg.out_path, e))?;
        self.recording.lock().opened.push(cfg.clone());
        Ok(Box::new(InMemorySink {
            dims: cfg.dims,
            recording: Arc::clone(&self.recording),
            ended: false,
        }))
    }
}

/// Sink that records frames into a shared [`Recording`].
#[derive(Debug)]
pub struct InMemorySink {
    dims: Dimensions,
    recording: Arc<Mutex<Recording>>,
    ended: bool,
}

impl FrameSink for InMemorySink {
    fn push_frame(&mut self, frame: &Frame) -> ReelResult<()> {
        if self.ended {
            return Err(ReelError::validation("in-memory sink is already finalized"));
        }
        if frame.dims != self.dims {
            return Err(ReelError::validation(format!(
                "frame size mismatch: got {}, expected {}",
                frame.dims, self.dims
            )));
        }
        self.recording.lock().frames.push(frame.clone());
        Ok(())
    }

    fn end(&mut self) -> ReelResult<()> {
        self.ended = true;
        self.recording.lock().ends += 1;
        Ok(())
    }
}
