#![allow(dead_code)]

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};

use crossbeam_channel::{Receiver, Sender, unbounded};
use parking_lot::Mutex;
use reelmaker::{
    Dimensions, Frame, ImageDecoder, MediaLauncher, ReelError, ReelResult,
};

/// Decoder serving synthetic frames keyed by path.
///
/// Each frame is a solid colour whose red channel is its position in the fixture, so encode
/// order can be read back from the sink.
#[derive(Default)]
pub struct FakeDecoder {
    frames: HashMap<PathBuf, Option<Frame>>,
    pub calls: AtomicUsize,
}

impl FakeDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_frame(mut self, path: &str, dims: Dimensions) -> Self {
        let tag = self.frames.len() as u8;
        self.frames
            .insert(PathBuf::from(path), Some(Frame::solid(dims, [tag, 0, 0, 255])));
        self
    }

    pub fn with_unreadable(mut self, path: &str) -> Self {
        self.frames.insert(PathBuf::from(path), None);
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl ImageDecoder for FakeDecoder {
    fn decode(&self, path: &Path) -> ReelResult<Frame> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match self.frames.get(path) {
            Some(Some(frame)) => Ok(frame.clone()),
            Some(None) => Err(ReelError::validation("corrupt image data")),
            None => Err(ReelError::validation(format!(
                "no fixture for '{}'",
                path.display()
            ))),
        }
    }
}

/// Square frames `/frames/0000.png`, `/frames/0001.png`, ... all of size `side`.
pub fn uniform_paths(n: usize) -> Vec<String> {
    (0..n).map(|i| format!("/frames/{i:04}.png")).collect()
}

pub fn uniform_decoder(paths: &[String], side: u32) -> FakeDecoder {
    paths.iter().fold(FakeDecoder::new(), |d, p| {
        d.with_frame(p, Dimensions::new(side, side))
    })
}

/// Decoder that blocks on every call until the test lets it through.
///
/// Each call first announces itself on `entered`, then waits for one permit. Dropping the permit
/// sender releases every pending and future call.
pub struct GatedDecoder {
    inner: FakeDecoder,
    entered: Sender<PathBuf>,
    permits: Receiver<()>,
}

pub struct Gate {
    pub entered: Receiver<PathBuf>,
    pub permits: Sender<()>,
}

impl GatedDecoder {
    pub fn new(inner: FakeDecoder) -> (Self, Gate) {
        let (entered_tx, entered_rx) = unbounded();
        let (permit_tx, permit_rx) = unbounded();
        (
            Self {
                inner,
                entered: entered_tx,
                permits: permit_rx,
            },
            Gate {
                entered: entered_rx,
                permits: permit_tx,
            },
        )
    }
}

impl ImageDecoder for GatedDecoder {
    fn decode(&self, path: &Path) -> ReelResult<Frame> {
        let _ = self.entered.send(path.to_path_buf());
        let _ = self.permits.recv();
        self.inner.decode(path)
    }
}

/// Launcher that records what it was asked to open.
#[derive(Default)]
pub struct RecordingLauncher {
    pub opened: Mutex<Vec<PathBuf>>,
    pub fail: bool,
}

impl MediaLauncher for RecordingLauncher {
    fn open(&self, path: &Path) -> ReelResult<()> {
        self.opened.lock().push(path.to_path_buf());
        if self.fail {
            return Err(ReelError::validation("no default player configured"));
        }
        Ok(())
    }
}
