use std::{
    path::PathBuf,
    process::ExitCode,
    sync::Arc,
};

use anyhow::Context as _;
use clap::{Parser, ValueEnum};
use reelmaker::{
    Codec, ContainerFormat, FailurePolicy, FfmpegSinkFactory, FsImageDecoder, InputError,
    JobController, JobEvent, JobOutcome, OutputSettings, ReelError, VideoAssembler,
};
use tracing_subscriber::EnvFilter;

/// Assemble a directory or list of still images into a video.
#[derive(Parser, Debug)]
#[command(name = "reelmaker", version)]
struct Cli {
    /// Directory to scan, or a newline-delimited file list.
    #[arg(long, short = 'i')]
    input: PathBuf,

    /// Output video path.
    #[arg(long, short = 'o')]
    output: PathBuf,

    /// Frames per second.
    #[arg(long, default_value_t = 30)]
    fps: u32,

    /// Output container.
    #[arg(long, value_enum, ignore_case = true, default_value_t = FormatChoice::Mp4)]
    format: FormatChoice,

    /// Requested codec (resolved against the container).
    #[arg(long, value_enum, ignore_case = true, default_value_t = CodecChoice::H264)]
    codec: CodecChoice,

    /// File-name glob restricting the directory scan, e.g. "frame_*.png".
    #[arg(long)]
    pattern: Option<String>,

    /// Encoder quality, 0 (smallest) to 100 (best).
    #[arg(long, default_value_t = 80)]
    quality: u32,

    /// Abort on the first unreadable or mis-sized frame instead of skipping it.
    #[arg(long)]
    fail_fast: bool,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum FormatChoice {
    Mp4,
    Avi,
    Mov,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum CodecChoice {
    #[value(name = "H264")]
    H264,
    #[value(name = "MJPG")]
    Mjpg,
    #[value(name = "XVID")]
    Xvid,
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("reelmaker=info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match run(cli) {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {e:#}");
            ExitCode::FAILURE
        }
    }
}

fn settings_from(cli: &Cli) -> OutputSettings {
    let format = match cli.format {
        FormatChoice::Mp4 => ContainerFormat::Mp4,
        FormatChoice::Avi => ContainerFormat::Avi,
        FormatChoice::Mov => ContainerFormat::Mov,
    };
    let codec = match cli.codec {
        CodecChoice::H264 => Codec::H264,
        CodecChoice::Mjpg => Codec::Mjpg,
        CodecChoice::Xvid => Codec::Xvid,
    };
    OutputSettings {
        format,
        fps: cli.fps,
        codec,
        quality: cli.quality,
    }
}

fn run(cli: Cli) -> anyhow::Result<ExitCode> {
    let settings = settings_from(&cli);
    settings.validate()?;

    let files = match reelmaker::scan::resolve_inputs(&cli.input, cli.pattern.as_deref()) {
        Ok(files) => files,
        Err(ReelError::Input(InputError::NoFiles)) => {
            eprintln!("Error: No input files found.");
            return Ok(ExitCode::FAILURE);
        }
        Err(e) => {
            return Err(e).with_context(|| format!("resolve input '{}'", cli.input.display()));
        }
    };
    println!("Found {} input files.", files.len());

    let policy = if cli.fail_fast {
        FailurePolicy::FailFast
    } else {
        FailurePolicy::SkipAndWarn
    };

    let assembler = VideoAssembler::new(
        Arc::new(FsImageDecoder),
        Arc::new(FfmpegSinkFactory::default()),
    );
    let controller = Arc::new(JobController::new(assembler));
    {
        let controller = Arc::clone(&controller);
        ctrlc::set_handler(move || {
            if controller.cancel() {
                eprintln!("Cancelling after the current frame...");
            }
        })
        .context("install Ctrl-C handler")?;
    }

    let names: Vec<String> = files
        .iter()
        .map(|p| {
            p.file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_else(|| p.display().to_string())
        })
        .collect();
    let frames = reelmaker::FrameSnapshot::from_paths(files);

    let ticket = controller.start_encode(frames, &settings, &cli.output, policy)?;

    let mut code = ExitCode::FAILURE;
    for event in controller.events().iter() {
        match event {
            JobEvent::Started { total, .. } => {
                tracing::info!(total, fourcc = %settings.fourcc(), "encoding");
            }
            JobEvent::Progress { update, .. } => {
                println!("Encoded frame {}/{}", update.frames_written, update.total);
            }
            JobEvent::Warning { warning, .. } => {
                let name = names.get(warning.index).map_or("?", String::as_str);
                println!("Warning: could not use image {name}: {}", warning.reason);
            }
            JobEvent::Finished(report) => {
                code = match report.outcome {
                    JobOutcome::Completed {
                        frames_written,
                        warnings,
                    } => {
                        println!(
                            "Video created successfully: {} ({frames_written} frames, {} skipped)",
                            report.out_path.display(),
                            warnings.len()
                        );
                        ExitCode::SUCCESS
                    }
                    JobOutcome::Cancelled { frames_written } => {
                        eprintln!(
                            "Cancelled after {frames_written} frames; partial output kept at {}",
                            report.out_path.display()
                        );
                        ExitCode::FAILURE
                    }
                    JobOutcome::Failed(e) => {
                        eprintln!("Error creating video: {e}");
                        ExitCode::FAILURE
                    }
                };
                break;
            }
            JobEvent::LaunchFailed { .. } => {}
        }
    }

    ticket.join()?;
    Ok(code)
}
