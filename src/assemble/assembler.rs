use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use crate::assets::decode::{Frame, ImageDecoder};
use crate::encode::codec::{ContainerFormat, FourCc, OutputSettings, resolve_fourcc};
use crate::encode::sink::{FrameSink, SinkConfig, SinkFactory};
use crate::foundation::core::{Dimensions, Fps, Quality};
use crate::foundation::error::{InputError, ReelError, ReelResult};
use crate::frames::list::{FrameSnapshot, ImageRef};

/// What to do with a frame that cannot be decoded or has the wrong size.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum FailurePolicy {
    /// Abort the whole run on the first bad frame.
    #[default]
    FailFast,
    /// Record a warning, skip the frame and keep going.
    SkipAndWarn,
}

/// Cooperative cancellation flag, checked once per frame.
#[derive(Clone, Debug, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ProgressUpdate {
    pub frames_written: usize,
    pub total: usize,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SkipReason {
    Unreadable(String),
    DimensionMismatch {
        expected: Dimensions,
        actual: Dimensions,
    },
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unreadable(reason) => write!(f, "unreadable image: {reason}"),
            Self::DimensionMismatch { expected, actual } => {
                write!(f, "size {actual} does not match {expected}")
            }
        }
    }
}

/// A frame dropped under [`FailurePolicy::SkipAndWarn`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FrameWarning {
    pub index: usize,
    pub path: PathBuf,
    pub reason: SkipReason,
}

impl fmt::Display for FrameWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "skipped frame {} ('{}'): {}",
            self.index,
            self.path.display(),
            self.reason
        )
    }
}

/// Receives progress as the assembler works. Both hooks default to no-ops.
pub trait AssemblyObserver {
    fn on_progress(&mut self, _update: ProgressUpdate) {}
    fn on_warning(&mut self, _warning: &FrameWarning) {}
}

/// Observer that ignores everything.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoopObserver;

impl AssemblyObserver for NoopObserver {}

/// One assembler run: frames, destination and encoding parameters.
#[derive(Clone, Debug)]
pub struct AssemblyRequest {
    pub frames: FrameSnapshot,
    pub out_path: PathBuf,
    pub format: ContainerFormat,
    pub fourcc: FourCc,
    pub fps: Fps,
    pub quality: Quality,
    pub policy: FailurePolicy,
}

impl AssemblyRequest {
    /// Validate `settings` and resolve the codec for its container.
    pub fn from_settings(
        frames: FrameSnapshot,
        settings: &OutputSettings,
        out_path: impl Into<PathBuf>,
        policy: FailurePolicy,
    ) -> ReelResult<Self> {
        settings.validate()?;
        Ok(Self {
            frames,
            out_path: out_path.into(),
            format: settings.format,
            fourcc: resolve_fourcc(settings.format, settings.codec),
            fps: settings.fps()?,
            quality: settings.quality()?,
            policy,
        })
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AssemblyOutcome {
    Completed,
    /// Stopped on request; the partial output file is left in place.
    Cancelled,
}

/// Result of a run that did not fail.
#[derive(Clone, Debug)]
pub struct AssemblyReport {
    pub outcome: AssemblyOutcome,
    pub out_path: PathBuf,
    pub fourcc: FourCc,
    /// Canonical (first-frame) size.
    pub dims: Dimensions,
    pub frames_written: usize,
    pub total: usize,
    pub warnings: Vec<FrameWarning>,
}

/// Decodes an ordered frame snapshot and encodes it into one output file.
///
/// Frames are processed strictly one at a time in snapshot order: decode, check against the
/// canonical size, encode, report progress, check for cancellation. The writer is released
/// exactly once on every exit path. A failed run removes the output file; a cancelled run keeps
/// what was written.
#[derive(Clone)]
pub struct VideoAssembler {
    decoder: Arc<dyn ImageDecoder>,
    sinks: Arc<dyn SinkFactory>,
}

impl VideoAssembler {
    pub fn new(decoder: Arc<dyn ImageDecoder>, sinks: Arc<dyn SinkFactory>) -> Self {
        Self { decoder, sinks }
    }

    #[tracing::instrument(
        skip_all,
        fields(frames = req.frames.len(), out = %req.out_path.display(), fourcc = %req.fourcc)
    )]
    pub fn run(
        &self,
        req: &AssemblyRequest,
        observer: &mut dyn AssemblyObserver,
        cancel: &CancelToken,
    ) -> ReelResult<AssemblyReport> {
        let total = req.frames.len();
        if total == 0 {
            return Err(InputError::NoFiles.into());
        }
        if total < 2 {
            return Err(InputError::TooFewFrames { found: total }.into());
        }

        let first = req.frames.get(0).ok_or(InputError::NoFiles)?;
        let first_frame = self.decode(0, first)?;
        let dims = first_frame.dims;
        tracing::info!(%dims, "canonical frame size");

        let cfg = SinkConfig {
            out_path: req.out_path.clone(),
            format: req.format,
            fourcc: req.fourcc,
            fps: req.fps,
            dims,
            quality: req.quality,
        };
        let mut sink = SinkGuard::new(self.sinks.open(&cfg)?);

        let tally = match self.encode_frames(req, first_frame, &mut sink, observer, cancel) {
            Ok(tally) => tally,
            Err(e) => {
                drop(sink);
                discard_partial(&req.out_path);
                return Err(e);
            }
        };
        if let Err(e) = sink.finish() {
            discard_partial(&req.out_path);
            return Err(e);
        }

        let outcome = if tally.cancelled {
            AssemblyOutcome::Cancelled
        } else {
            AssemblyOutcome::Completed
        };
        tracing::info!(
            ?outcome,
            frames_written = tally.frames_written,
            skipped = tally.warnings.len(),
            "assembly finished"
        );

        Ok(AssemblyReport {
            outcome,
            out_path: req.out_path.clone(),
            fourcc: req.fourcc,
            dims,
            frames_written: tally.frames_written,
            total,
            warnings: tally.warnings,
        })
    }

    fn encode_frames(
        &self,
        req: &AssemblyRequest,
        first_frame: Frame,
        sink: &mut SinkGuard,
        observer: &mut dyn AssemblyObserver,
        cancel: &CancelToken,
    ) -> ReelResult<Tally> {
        let total = req.frames.len();
        let dims = first_frame.dims;
        let mut first = Some(first_frame);
        let mut tally = Tally::default();

        for (index, image) in req.frames.iter().enumerate() {
            let frame = match first.take() {
                Some(f) => Some(f),
                None => self.checked_frame(index, image, dims, req.policy, &mut tally, observer)?,
            };

            if let Some(frame) = frame {
                sink.push(&frame)?;
                tally.frames_written += 1;
                observer.on_progress(ProgressUpdate {
                    frames_written: tally.frames_written,
                    total,
                });
            }

            if cancel.is_cancelled() && index + 1 < total {
                tracing::info!(index, "cancellation requested; stopping after this frame");
                tally.cancelled = true;
                break;
            }
        }

        Ok(tally)
    }

    /// Decode and size-check one frame. `Ok(None)` means it was skipped under `SkipAndWarn`.
    fn checked_frame(
        &self,
        index: usize,
        image: &ImageRef,
        dims: Dimensions,
        policy: FailurePolicy,
        tally: &mut Tally,
        observer: &mut dyn AssemblyObserver,
    ) -> ReelResult<Option<Frame>> {
        let reason = match self.decode(index, image) {
            Ok(frame) if frame.dims == dims => return Ok(Some(frame)),
            Ok(frame) => {
                if policy == FailurePolicy::FailFast {
                    return Err(ReelError::DimensionMismatch {
                        index,
                        expected: dims,
                        actual: frame.dims,
                    });
                }
                SkipReason::DimensionMismatch {
                    expected: dims,
                    actual: frame.dims,
                }
            }
            Err(e) => {
                if policy == FailurePolicy::FailFast {
                    return Err(e);
                }
                let reason = match e {
                    ReelError::Input(InputError::UnreadableImage { reason, .. }) => reason,
                    other => other.to_string(),
                };
                SkipReason::Unreadable(reason)
            }
        };

        let warning = FrameWarning {
            index,
            path: image.path().to_path_buf(),
            reason,
        };
        tracing::warn!("{warning}");
        observer.on_warning(&warning);
        tally.warnings.push(warning);
        Ok(None)
    }

    fn decode(&self, index: usize, image: &ImageRef) -> ReelResult<Frame> {
        self.decoder
            .decode(image.path())
            .map_err(|e| ReelError::unreadable(index, image.path(), format!("{e:#}")))
    }
}

#[derive(Default)]
struct Tally {
    frames_written: usize,
    warnings: Vec<FrameWarning>,
    cancelled: bool,
}

/// Owns the open writer and ends it exactly once: through `finish`, or on drop.
struct SinkGuard {
    sink: Option<Box<dyn FrameSink>>,
}

impl SinkGuard {
    fn new(sink: Box<dyn FrameSink>) -> Self {
        Self { sink: Some(sink) }
    }

    fn push(&mut self, frame: &Frame) -> ReelResult<()> {
        match self.sink.as_mut() {
            Some(sink) => sink.push_frame(frame),
            None => Err(ReelError::validation("frame sink already released")),
        }
    }

    fn finish(mut self) -> ReelResult<()> {
        match self.sink.take() {
            Some(mut sink) => sink.end(),
            None => Ok(()),
        }
    }
}

impl Drop for SinkGuard {
    fn drop(&mut self) {
        if let Some(mut sink) = self.sink.take()
            && let Err(e) = sink.end()
        {
            tracing::warn!("failed to release frame sink: {e}");
        }
    }
}

fn discard_partial(path: &std::path::Path) {
    match std::fs::remove_file(path) {
        Ok(()) => tracing::debug!(path = %path.display(), "removed partial output"),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
        Err(e) => tracing::warn!(path = %path.display(), "could not remove partial output: {e}"),
    }
}
