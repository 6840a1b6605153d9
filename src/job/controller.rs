use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::thread;

use crossbeam_channel::{Receiver, Sender, unbounded};
use parking_lot::Mutex;

use crate::assemble::assembler::{
    AssemblyObserver, AssemblyOutcome, AssemblyRequest, CancelToken, FailurePolicy, FrameWarning,
    ProgressUpdate, VideoAssembler,
};
use crate::encode::codec::OutputSettings;
use crate::foundation::error::{ReelError, ReelResult};
use crate::frames::list::FrameSnapshot;
use crate::job::preview::{MediaLauncher, PreviewGenerator};

pub type JobId = u64;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum JobKind {
    Encode,
    Preview,
}

/// Lifecycle of one job: `Pending -> Running -> {Completed | Failed | Cancelled}`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum JobStatus {
    Pending,
    Running,
    Completed,
    Failed,
    Cancelled,
}

impl JobStatus {
    pub fn is_active(self) -> bool {
        matches!(self, Self::Pending | Self::Running)
    }

    pub fn is_terminal(self) -> bool {
        !self.is_active()
    }
}

#[derive(Debug)]
pub enum JobOutcome {
    Completed {
        frames_written: usize,
        warnings: Vec<FrameWarning>,
    },
    Cancelled {
        frames_written: usize,
    },
    Failed(ReelError),
}

/// Terminal message of a job.
#[derive(Debug)]
pub struct JobReport {
    pub id: JobId,
    pub kind: JobKind,
    pub out_path: PathBuf,
    pub outcome: JobOutcome,
}

impl JobReport {
    pub fn status(&self) -> JobStatus {
        match self.outcome {
            JobOutcome::Completed { .. } => JobStatus::Completed,
            JobOutcome::Cancelled { .. } => JobStatus::Cancelled,
            JobOutcome::Failed(_) => JobStatus::Failed,
        }
    }

    pub fn frames_written(&self) -> Option<usize> {
        match &self.outcome {
            JobOutcome::Completed { frames_written, .. }
            | JobOutcome::Cancelled { frames_written } => Some(*frames_written),
            JobOutcome::Failed(_) => None,
        }
    }
}

/// Messages from the worker to whoever owns the controller.
#[derive(Debug)]
pub enum JobEvent {
    Started {
        id: JobId,
        kind: JobKind,
        total: usize,
    },
    Progress {
        id: JobId,
        update: ProgressUpdate,
    },
    Warning {
        id: JobId,
        warning: FrameWarning,
    },
    Finished(JobReport),
    /// The preview was encoded but the player could not be started. Does not change job status.
    LaunchFailed {
        id: JobId,
        path: PathBuf,
        error: String,
    },
}

#[derive(Debug)]
struct JobState {
    id: JobId,
    kind: JobKind,
    status: JobStatus,
    frames_written: usize,
    cancel: CancelToken,
}

/// Handle to a started job.
#[derive(Debug)]
pub struct JobTicket {
    id: JobId,
    handle: thread::JoinHandle<()>,
}

impl JobTicket {
    pub fn id(&self) -> JobId {
        self.id
    }

    /// Block until the worker thread has exited.
    pub fn join(self) -> ReelResult<()> {
        self.handle
            .join()
            .map_err(|_| anyhow::anyhow!("job worker thread panicked").into())
    }
}

/// Runs at most one assembler job at a time on a background thread.
///
/// The caller never blocks: `start` snapshots the request and returns, and all progress and the
/// final result arrive as [`JobEvent`]s on [`JobController::events`].
pub struct JobController {
    assembler: VideoAssembler,
    launcher: Option<Arc<dyn MediaLauncher>>,
    preview: PreviewGenerator,
    state: Arc<Mutex<Option<JobState>>>,
    next_id: AtomicU64,
    tx: Sender<JobEvent>,
    rx: Receiver<JobEvent>,
}

impl JobController {
    pub fn new(assembler: VideoAssembler) -> Self {
        let (tx, rx) = unbounded();
        Self {
            assembler,
            launcher: None,
            preview: PreviewGenerator::default(),
            state: Arc::new(Mutex::new(None)),
            next_id: AtomicU64::new(1),
            tx,
            rx,
        }
    }

    /// Player used to open finished previews.
    pub fn with_launcher(mut self, launcher: Arc<dyn MediaLauncher>) -> Self {
        self.launcher = Some(launcher);
        self
    }

    pub fn with_preview_generator(mut self, preview: PreviewGenerator) -> Self {
        self.preview = preview;
        self
    }

    pub fn events(&self) -> &Receiver<JobEvent> {
        &self.rx
    }

    /// Status of the current job, or of the last one if none is running.
    pub fn status(&self) -> Option<JobStatus> {
        self.state.lock().as_ref().map(|s| s.status)
    }

    pub fn frames_written(&self) -> usize {
        self.state.lock().as_ref().map_or(0, |s| s.frames_written)
    }

    pub fn is_busy(&self) -> bool {
        self.status().is_some_and(JobStatus::is_active)
    }

    /// Ask the active job to stop after its current frame. Returns `false` when nothing is running.
    pub fn cancel(&self) -> bool {
        let state = self.state.lock();
        match state.as_ref() {
            Some(s) if s.status.is_active() => {
                tracing::info!(id = s.id, "cancel requested");
                s.cancel.cancel();
                true
            }
            _ => false,
        }
    }

    /// Start a full encode of `frames`.
    pub fn start_encode(
        &self,
        frames: FrameSnapshot,
        settings: &OutputSettings,
        out_path: impl Into<PathBuf>,
        policy: FailurePolicy,
    ) -> ReelResult<JobTicket> {
        let req = AssemblyRequest::from_settings(frames, settings, out_path, policy)?;
        self.start(req, JobKind::Encode)
    }

    /// Start a preview encode of the first frames of `frames` at `preview_fps`.
    pub fn start_preview(&self, frames: &FrameSnapshot, preview_fps: u32) -> ReelResult<JobTicket> {
        let req = self.preview.request(frames, preview_fps)?;
        self.start(req, JobKind::Preview)
    }

    /// Start `req` on a worker thread, or fail with [`ReelError::Busy`] if a job is active.
    pub fn start(&self, req: AssemblyRequest, kind: JobKind) -> ReelResult<JobTicket> {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let cancel = CancelToken::new();
        {
            let mut state = self.state.lock();
            if state.as_ref().is_some_and(|s| s.status.is_active()) {
                tracing::warn!(id, "rejected job start: another job is running");
                return Err(ReelError::Busy);
            }
            *state = Some(JobState {
                id,
                kind,
                status: JobStatus::Pending,
                frames_written: 0,
                cancel: cancel.clone(),
            });
        }

        let worker = Worker {
            id,
            kind,
            req,
            cancel,
            assembler: self.assembler.clone(),
            launcher: self.launcher.clone(),
            state: Arc::clone(&self.state),
            tx: self.tx.clone(),
        };

        let spawned = thread::Builder::new()
            .name(format!("reelmaker-job-{id}"))
            .spawn(move || worker.run());
        match spawned {
            Ok(handle) => Ok(JobTicket { id, handle }),
            Err(e) => {
                if let Some(s) = self.state.lock().as_mut() {
                    s.status = JobStatus::Failed;
                }
                Err(anyhow::anyhow!("failed to spawn job worker: {e}").into())
            }
        }
    }
}

struct Worker {
    id: JobId,
    kind: JobKind,
    req: AssemblyRequest,
    cancel: CancelToken,
    assembler: VideoAssembler,
    launcher: Option<Arc<dyn MediaLauncher>>,
    state: Arc<Mutex<Option<JobState>>>,
    tx: Sender<JobEvent>,
}

impl Worker {
    fn run(self) {
        self.set_status(JobStatus::Running);
        tracing::info!(id = self.id, kind = ?self.kind, frames = self.req.frames.len(), "job started");
        let _ = self.tx.send(JobEvent::Started {
            id: self.id,
            kind: self.kind,
            total: self.req.frames.len(),
        });

        let mut observer = ChannelObserver {
            id: self.id,
            tx: self.tx.clone(),
            state: Arc::clone(&self.state),
        };
        let result = self.assembler.run(&self.req, &mut observer, &self.cancel);

        let outcome = match result {
            Ok(report) => match report.outcome {
                AssemblyOutcome::Completed => JobOutcome::Completed {
                    frames_written: report.frames_written,
                    warnings: report.warnings,
                },
                AssemblyOutcome::Cancelled => JobOutcome::Cancelled {
                    frames_written: report.frames_written,
                },
            },
            Err(e) => {
                tracing::error!(id = self.id, "job failed: {e}");
                JobOutcome::Failed(e)
            }
        };

        let report = JobReport {
            id: self.id,
            kind: self.kind,
            out_path: self.req.out_path.clone(),
            outcome,
        };
        let status = report.status();
        self.set_status(status);
        tracing::info!(id = self.id, ?status, "job finished");
        let _ = self.tx.send(JobEvent::Finished(report));

        if self.kind == JobKind::Preview
            && status == JobStatus::Completed
            && let Some(launcher) = self.launcher.as_ref()
            && let Err(e) = launcher.open(&self.req.out_path)
        {
            tracing::warn!(id = self.id, "could not open preview: {e}");
            let _ = self.tx.send(JobEvent::LaunchFailed {
                id: self.id,
                path: self.req.out_path.clone(),
                error: e.to_string(),
            });
        }
    }

    fn set_status(&self, status: JobStatus) {
        if let Some(s) = self.state.lock().as_mut()
            && s.id == self.id
        {
            s.status = status;
        }
    }
}

struct ChannelObserver {
    id: JobId,
    tx: Sender<JobEvent>,
    state: Arc<Mutex<Option<JobState>>>,
}

impl AssemblyObserver for ChannelObserver {
    fn on_progress(&mut self, update: ProgressUpdate) {
        if let Some(s) = self.state.lock().as_mut()
            && s.id == self.id
        {
            s.frames_written = update.frames_written;
        }
        let _ = self.tx.send(JobEvent::Progress {
            id: self.id,
            update,
        });
    }

    fn on_warning(&mut self, warning: &FrameWarning) {
        let _ = self.tx.send(JobEvent::Warning {
            id: self.id,
            warning: warning.clone(),
        });
    }
}
