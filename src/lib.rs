//! Reelmaker turns an ordered list of still images into a single video file.
//!
//! The pieces, leaves first:
//!
//! - [`FrameList`]: ordered, deduplicated image list with selection and reordering
//! - [`VideoAssembler`]: decode, size-check and encode a [`FrameSnapshot`] in order
//! - [`PreviewGenerator`]: short, capped preview encodes to a temp file
//! - [`JobController`]: runs one assembler job at a time off-thread and reports over a channel
#![forbid(unsafe_code)]

mod foundation;

/// Snapshot-to-video assembly.
pub mod assemble;
/// Still-image decoding.
pub mod assets;
/// Codec resolution and frame sinks.
pub mod encode;
/// Ordered frame list.
pub mod frames;
/// Background job control and previews.
pub mod job;
pub mod project;
pub mod scan;

pub use crate::foundation::core::{Dimensions, Fps, Quality};
pub use crate::foundation::error::{InputError, ReelError, ReelResult};

pub use crate::assemble::assembler::{
    AssemblyObserver, AssemblyOutcome, AssemblyReport, AssemblyRequest, CancelToken,
    FailurePolicy, FrameWarning, NoopObserver, ProgressUpdate, SkipReason, VideoAssembler,
};
pub use crate::assets::decode::{Frame, FsImageDecoder, ImageDecoder};
pub use crate::encode::codec::{Codec, ContainerFormat, FourCc, OutputSettings, resolve_fourcc};
pub use crate::encode::ffmpeg::{FfmpegSinkFactory, FfmpegSinkOpts, is_ffmpeg_on_path};
pub use crate::encode::sink::{
    FrameSink, InMemorySinkFactory, Recording, SinkConfig, SinkFactory,
};
pub use crate::frames::list::{FrameList, FrameSnapshot, ImageRef, MoveDirection};
pub use crate::job::controller::{
    JobController, JobEvent, JobId, JobKind, JobOutcome, JobReport, JobStatus, JobTicket,
};
pub use crate::job::preview::{MediaLauncher, PreviewGenerator, SystemLauncher};
pub use crate::project::Project;
