use std::path::{Path, PathBuf};
use std::sync::Arc;

use reelmaker::{
    AssemblyOutcome, AssemblyRequest, CancelToken, Codec, ContainerFormat, Dimensions,
    FailurePolicy, FfmpegSinkFactory, FfmpegSinkOpts, FourCc, FrameSnapshot, FsImageDecoder,
    NoopObserver, OutputSettings, ReelError, VideoAssembler, is_ffmpeg_on_path,
};

fn write_frames(dir: &Path, n: u32, w: u32, h: u32) -> Vec<PathBuf> {
    (0..n)
        .map(|i| {
            let path = dir.join(format!("f{i:02}.png"));
            image::RgbaImage::from_fn(w, h, |x, y| {
                image::Rgba([(x * 8) as u8, (y * 8) as u8, (i * 30) as u8, 255])
            })
            .save(&path)
            .unwrap();
            path
        })
        .collect()
}

fn assembler() -> VideoAssembler {
    VideoAssembler::new(
        Arc::new(FsImageDecoder),
        Arc::new(FfmpegSinkFactory::default()),
    )
}

fn encode(
    frames: &[PathBuf],
    format: ContainerFormat,
    codec: Codec,
    out: &Path,
) -> reelmaker::ReelResult<reelmaker::AssemblyReport> {
    let settings = OutputSettings {
        format,
        fps: 10,
        codec,
        ..OutputSettings::default()
    };
    let req = AssemblyRequest::from_settings(
        FrameSnapshot::from_paths(frames.iter().cloned()),
        &settings,
        out,
        FailurePolicy::FailFast,
    )?;
    assembler().run(&req, &mut NoopObserver, &CancelToken::new())
}

#[test]
fn pngs_encode_in_every_container() {
    if !is_ffmpeg_on_path() {
        eprintln!("skipping: ffmpeg not on PATH");
        return;
    }
    let dir = tempfile::tempdir().unwrap();
    let frames = write_frames(dir.path(), 3, 32, 24);

    for (format, codec, fourcc) in [
        (ContainerFormat::Mp4, Codec::H264, FourCc::Mp4v),
        (ContainerFormat::Mov, Codec::H264, FourCc::Mp4v),
        (ContainerFormat::Avi, Codec::Mjpg, FourCc::Mjpg),
        (ContainerFormat::Avi, Codec::H264, FourCc::Xvid),
    ] {
        let out = dir.path().join(format!("out_{fourcc}.{}", format.extension()));
        let report = encode(&frames, format, codec, &out).unwrap();
        assert_eq!(report.outcome, AssemblyOutcome::Completed);
        assert_eq!(report.fourcc, fourcc);
        assert_eq!(report.frames_written, 3);
        assert_eq!(report.dims, Dimensions::new(32, 24));
        assert!(std::fs::metadata(&out).unwrap().len() > 0, "{format:?}");
    }
}

#[test]
fn odd_sized_frames_are_unsupported_and_leave_nothing() {
    if !is_ffmpeg_on_path() {
        eprintln!("skipping: ffmpeg not on PATH");
        return;
    }
    let dir = tempfile::tempdir().unwrap();
    let frames = write_frames(dir.path(), 2, 31, 24);
    let out = dir.path().join("odd.mp4");

    let err = encode(&frames, ContainerFormat::Mp4, Codec::H264, &out).unwrap_err();
    assert!(matches!(err, ReelError::CodecUnsupported(_)), "{err}");
    assert!(!out.exists());
}

#[test]
fn corrupt_png_names_the_file() {
    let dir = tempfile::tempdir().unwrap();
    let mut frames = write_frames(dir.path(), 2, 16, 16);
    let bad = dir.path().join("broken.png");
    std::fs::write(&bad, b"\x89PNG not really").unwrap();
    frames.insert(0, bad);

    let err = encode(&frames, ContainerFormat::Mp4, Codec::H264, &dir.path().join("x.mp4"))
        .unwrap_err();
    assert_eq!(err.frame_index(), Some(0));
    assert!(err.to_string().contains("broken.png"), "{err}");
}

#[test]
fn failed_writer_open_keeps_previous_output() {
    let dir = tempfile::tempdir().unwrap();
    let frames = write_frames(dir.path(), 2, 16, 16);
    let out = dir.path().join("out.mp4");
    std::fs::write(&out, b"previous good video").unwrap();

    let settings = OutputSettings::default();
    let req = AssemblyRequest::from_settings(
        FrameSnapshot::from_paths(frames.iter().cloned()),
        &settings,
        &out,
        FailurePolicy::FailFast,
    )
    .unwrap();
    let asm = VideoAssembler::new(
        Arc::new(FsImageDecoder),
        Arc::new(FfmpegSinkFactory::new(FfmpegSinkOpts {
            ffmpeg_bin: PathBuf::from("/nonexistent/ffmpeg"),
            ..FfmpegSinkOpts::default()
        })),
    );

    let err = asm
        .run(&req, &mut NoopObserver, &CancelToken::new())
        .unwrap_err();
    assert!(matches!(err, ReelError::CodecUnsupported(_)), "{err}");
    assert_eq!(std::fs::read(&out).unwrap(), b"previous good video");
}

#[test]
fn missing_output_directory_is_not_created() {
    let dir = tempfile::tempdir().unwrap();
    let frames = write_frames(dir.path(), 2, 16, 16);
    let missing = dir.path().join("no_such_dir");

    let err = encode(
        &frames,
        ContainerFormat::Mp4,
        Codec::H264,
        &missing.join("out.mp4"),
    )
    .unwrap_err();
    if is_ffmpeg_on_path() {
        assert!(matches!(err, ReelError::Io { .. }), "{err}");
    }
    assert!(!missing.exists());
}
