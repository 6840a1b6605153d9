use std::io::Read;
use std::path::PathBuf;
use std::process::{Child, ChildStdin, Command, Stdio};

use anyhow::anyhow;

use crate::assets::decode::Frame;
use crate::encode::codec::FourCc;
use crate::encode::sink::{FrameSink, SinkConfig, SinkFactory, ensure_writable};
use crate::foundation::error::{ReelError, ReelResult};

/// Options shared by every [`FfmpegSink`] a factory opens.
#[derive(Clone, Debug)]
pub struct FfmpegSinkOpts {
    /// `ffmpeg` executable, looked up on `PATH` when relative.
    pub ffmpeg_bin: PathBuf,
    /// Overwrite the output file if it already exists.
    pub overwrite: bool,
    /// Background colour used to flatten alpha (RGBA8, straight alpha).
    pub bg_rgba: [u8; 4],
}

impl Default for FfmpegSinkOpts {
    fn default() -> Self {
        Self {
            ffmpeg_bin: PathBuf::from("ffmpeg"),
            overwrite: true,
            bg_rgba: [0, 0, 0, 255],
        }
    }
}

/// Opens [`FfmpegSink`]s that stream raw frames into the system `ffmpeg`.
#[derive(Clone, Debug, Default)]
pub struct FfmpegSinkFactory {
    opts: FfmpegSinkOpts,
}

impl FfmpegSinkFactory {
    pub fn new(opts: FfmpegSinkOpts) -> Self {
        Self { opts }
    }
}

impl SinkFactory for FfmpegSinkFactory {
    fn open(&self, cfg: &SinkConfig) -> ReelResult<Box<dyn FrameSink>> {
        Ok(Box::new(FfmpegSink::spawn(self.opts.clone(), cfg.clone())?))
    }
}

/// A running `ffmpeg` child fed through stdin.
pub struct FfmpegSink {
    opts: FfmpegSinkOpts,
    cfg: SinkConfig,

    child: Option<Child>,
    stdin: Option<ChildStdin>,
    stderr_drain: Option<std::thread::JoinHandle<std::io::Result<Vec<u8>>>>,

    scratch: Vec<u8>,
}

impl FfmpegSink {
    fn spawn(opts: FfmpegSinkOpts, cfg: SinkConfig) -> ReelResult<Self> {
        if cfg.dims.width == 0 || cfg.dims.height == 0 {
            return Err(ReelError::validation(
                "ffmpeg sink width/height must be non-zero",
            ));
        }
        if !cfg.dims.is_even() {
            return Err(ReelError::codec_unsupported(format!(
                "{} needs even frame dimensions (4:2:0 chroma), got {}",
                cfg.fourcc, cfg.dims
            )));
        }

        if !opts.overwrite && cfg.out_path.exists() {
            return Err(ReelError::validation(format!(
                "output file '{}' already exists",
                cfg.out_path.display()
            )));
        }
        if !is_ffmpeg_available(&opts.ffmpeg_bin) {
            return Err(ReelError::codec_unsupported(format!(
                "ffmpeg is required for {} encoding, but '{}' could not be run",
                cfg.fourcc,
                opts.ffmpeg_bin.display()
            )));
        }
        // Last check before ffmpeg takes over the file.
        ensure_writable(&cfg.out_path)?;

        let mut cmd = Command::new(&opts.ffmpeg_bin);
        cmd.stdin(Stdio::piped())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .args(ffmpeg_args(&cfg))
            .arg(&cfg.out_path);

        let mut child = cmd
            .spawn()
            .map_err(|e| anyhow!("failed to spawn ffmpeg (is it installed and on PATH?): {e}"))?;

        let stdin = child
            .stdin
            .take()
            .ok_or_else(|| anyhow!("failed to open ffmpeg stdin (unexpected)"))?;
        let mut stderr = child
            .stderr
            .take()
            .ok_or_else(|| anyhow!("failed to open ffmpeg stderr (unexpected)"))?;
        let stderr_drain = std::thread::spawn(move || {
            let mut stderr_bytes = Vec::new();
            stderr.read_to_end(&mut stderr_bytes)?;
            Ok(stderr_bytes)
        });

        tracing::debug!(
            out = %cfg.out_path.display(),
            fourcc = %cfg.fourcc,
            dims = %cfg.dims,
            fps = %cfg.fps,
            "spawned ffmpeg"
        );

        Ok(Self {
            scratch: vec![0u8; cfg.dims.rgba8_len()],
            opts,
            cfg,
            child: Some(child),
            stdin: Some(stdin),
            stderr_drain: Some(stderr_drain),
        })
    }
}

impl FrameSink for FfmpegSink {
    fn push_frame(&mut self, frame: &Frame) -> ReelResult<()> {
        if frame.dims != self.cfg.dims {
            return Err(ReelError::validation(format!(
                "frame size mismatch: got {}, expected {}",
                frame.dims, self.cfg.dims
            )));
        }

        flatten_to_opaque_rgba8(&mut self.scratch, &frame.rgba8, self.opts.bg_rgba)?;

        let Some(stdin) = self.stdin.as_mut() else {
            return Err(ReelError::validation("ffmpeg sink is already finalized"));
        };

        use std::io::Write as _;
        stdin
            .write_all(&self.scratch)
            .map_err(|e| anyhow!("failed to write frame to ffmpeg stdin: {e}"))?;
        Ok(())
    }

    fn end(&mut self) -> ReelResult<()> {
        drop(self.stdin.take());
        let mut child = self
            .child
            .take()
            .ok_or_else(|| anyhow!("ffmpeg sink already finalized"))?;

        let status = child
            .wait()
            .map_err(|e| anyhow!("failed to wait for ffmpeg to finish: {e}"))?;

        let stderr_bytes = match self.stderr_drain.take() {
            Some(h) => h
                .join()
                .map_err(|_| anyhow!("ffmpeg stderr drain thread panicked"))?
                .map_err(|e| anyhow!("ffmpeg stderr read failed: {e}"))?,
            None => Vec::new(),
        };

        if !status.success() {
            let stderr = String::from_utf8_lossy(&stderr_bytes);
            return Err(classify_ffmpeg_failure(&status.to_string(), stderr.trim()));
        }
        Ok(())
    }
}

/// Arguments between `ffmpeg` and the output path.
pub(crate) fn ffmpeg_args(cfg: &SinkConfig) -> Vec<String> {
    let mut args: Vec<String> = [
        "-y",
        "-loglevel",
        "error",
        "-f",
        "rawvideo",
        "-pix_fmt",
        "rgba",
        "-s",
    ]
    .into_iter()
    .map(String::from)
    .collect();
    args.push(cfg.dims.to_string());
    // For rawvideo input, `-r` before `-i` sets the input frame rate.
    args.extend(["-r".to_string(), cfg.fps.to_string()]);
    args.extend(["-i", "pipe:0", "-an"].map(String::from));

    let (encoder, pix_fmt, tag) = match cfg.fourcc {
        FourCc::Mp4v => ("mpeg4", "yuv420p", None),
        FourCc::Mjpg => ("mjpeg", "yuvj420p", None),
        FourCc::Xvid => ("mpeg4", "yuv420p", Some("XVID")),
    };
    args.extend(["-c:v", encoder, "-pix_fmt", pix_fmt].map(String::from));
    if let Some(tag) = tag {
        args.extend(["-vtag".to_string(), tag.to_string()]);
    }
    args.extend(["-q:v".to_string(), cfg.quality.qscale().to_string()]);
    args.extend(["-f".to_string(), cfg.format.muxer().to_string()]);
    args
}

fn classify_ffmpeg_failure(status: &str, stderr: &str) -> ReelError {
    let rejected = [
        "not currently supported in container",
        "Unknown encoder",
        "Could not find tag for codec",
    ];
    if rejected.iter().any(|needle| stderr.contains(needle)) {
        return ReelError::codec_unsupported(format!("ffmpeg rejected the stream: {stderr}"));
    }
    ReelError::Other(anyhow!("ffmpeg exited with status {status}: {stderr}"))
}

fn flatten_to_opaque_rgba8(dst: &mut [u8], src: &[u8], bg_rgba: [u8; 4]) -> ReelResult<()> {
    if dst.len() != src.len() || !dst.len().is_multiple_of(4) {
        return Err(ReelError::validation(
            "flatten_to_opaque_rgba8 expects equal-length rgba8 buffers",
        ));
    }

    let bg_r = bg_rgba[0] as u16;
    let bg_g = bg_rgba[1] as u16;
    let bg_b = bg_rgba[2] as u16;

    for (d, s) in dst.chunks_exact_mut(4).zip(src.chunks_exact(4)) {
        let a = s[3] as u16;
        if a == 255 {
            d.copy_from_slice(s);
            continue;
        }

        let inv = 255u16 - a;
        let r = mul_div255(s[0] as u16, a) + mul_div255(bg_r, inv);
        let g = mul_div255(s[1] as u16, a) + mul_div255(bg_g, inv);
        let b = mul_div255(s[2] as u16, a) + mul_div255(bg_b, inv);

        d[0] = r.min(255) as u8;
        d[1] = g.min(255) as u8;
        d[2] = b.min(255) as u8;
        d[3] = 255;
    }

    Ok(())
}

fn mul_div255(x: u16, y: u16) -> u16 {
    (((u32::from(x) * u32::from(y)) + 127) / 255) as u16
}

/// Return `true` when `bin -version` runs successfully.
pub fn is_ffmpeg_available(bin: &std::path::Path) -> bool {
    Command::new(bin)
        .arg("-version")
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .map(|s| s.success())
        .unwrap_or(false)
}

/// Return `true` when `ffmpeg` can be invoked from `PATH`.
pub fn is_ffmpeg_on_path() -> bool {
    is_ffmpeg_available(std::path::Path::new("ffmpeg"))
}
