use std::{
    path::{Path, PathBuf},
    sync::Arc,
};

use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::Shell;
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};
use reframe::{
    AssembleOptions, CancellationToken, DimensionPolicy, ExtractOptions, FfmpegBackend,
    FfmpegLogLevel, FrameOrder, FrameRate, LogSink, ProgressCallback, ProgressInfo,
    RATE_RECORD_FILE_NAME, VideoCodec,
};
use serde_json::json;

const CLI_AFTER_HELP: &str = "Examples:\n  reframe extract input.mp4 --out frames --fps 10 --progress\n  reframe assemble frames --out output.mp4 --fps 10\n  reframe probe input.mp4 --json\n  reframe info frames\n  reframe completions zsh > _reframe";

#[derive(Debug, Parser)]
#[command(
    name = "reframe",
    version,
    about = "Split videos into JPEG frame sequences and assemble frame folders into videos",
    after_help = CLI_AFTER_HELP
)]
struct Cli {
    #[command(flatten)]
    global: GlobalOptions,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Parser, Clone, Default)]
struct GlobalOptions {
    /// Print one line per processed frame and enable info-level logging.
    #[arg(long, global = true)]
    verbose: bool,

    /// Show a progress bar.
    #[arg(long, global = true)]
    progress: bool,

    /// Allow overwriting existing output files.
    #[arg(long, global = true)]
    overwrite: bool,

    /// FFmpeg log level (quiet, panic, fatal, error, warning, info, verbose, debug, trace).
    #[arg(long, global = true)]
    log_level: Option<String>,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Decode a video into numbered JPEG frames.
    #[command(
        after_help = "Examples:\n  reframe extract input.mp4 --out frames --fps 10\n  reframe extract input.mp4 --out frames   # keep every frame"
    )]
    Extract {
        /// Input video path.
        input: PathBuf,
        /// Output directory for frame images.
        #[arg(long)]
        out: PathBuf,
        /// Frames per second to keep. Defaults to the source rate.
        #[arg(long)]
        fps: Option<String>,
        /// JPEG quality (1-100).
        #[arg(long, default_value_t = reframe::DEFAULT_JPEG_QUALITY)]
        quality: u8,
        /// Print the run summary as JSON.
        #[arg(long)]
        json: bool,
    },

    /// Encode a folder of JPEG frames into a video.
    #[command(
        after_help = "Examples:\n  reframe assemble frames --out output.mp4 --fps 10\n  reframe assemble frames --out output.avi --fourcc MJPG --numeric-order"
    )]
    Assemble {
        /// Directory containing *.jpg frames.
        input: PathBuf,
        /// Output video path; the container is chosen from the extension.
        #[arg(long)]
        out: PathBuf,
        /// Output frames per second. Defaults to the folder's FRAME_RATE.txt.
        #[arg(long)]
        fps: Option<String>,
        /// Four-character codec code (mp4v, avc1, hvc1, MJPG).
        #[arg(long, default_value = "mp4v")]
        fourcc: String,
        /// Order frames by the number in their name instead of by name.
        #[arg(long)]
        numeric_order: bool,
        /// Fail on frames whose size differs from the first frame.
        #[arg(long)]
        strict_dimensions: bool,
        /// Print the run summary as JSON.
        #[arg(long)]
        json: bool,
    },

    /// Print a video's frame rate, frame count, and size.
    #[command(visible_alias = "metadata")]
    Probe {
        /// Input video path.
        input: PathBuf,
        /// Output as machine-readable JSON.
        #[arg(long)]
        json: bool,
    },

    /// Summarise a frame directory.
    Info {
        /// Directory containing *.jpg frames.
        input: PathBuf,
        /// Output as machine-readable JSON.
        #[arg(long)]
        json: bool,
    },

    /// Generate shell completions.
    Completions {
        /// Target shell.
        shell: Shell,
    },
}

fn ensure_writable_path(path: &Path, overwrite: bool) -> Result<(), Box<dyn std::error::Error>> {
    if path.exists() {
        if overwrite {
            eprintln!(
                "{} {}",
                "warning:".yellow().bold(),
                format!("overwriting {}", path.display()).yellow()
            );
        } else {
            return Err(format!(
                "output already exists: {} (use --overwrite to replace)",
                path.display()
            )
            .into());
        }
    }
    Ok(())
}

fn apply_global_options(global: &GlobalOptions) -> Result<(), Box<dyn std::error::Error>> {
    let default_filter = if global.verbose { "info" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
        .init();

    if let Some(level) = &global.log_level {
        let parsed: FfmpegLogLevel = level
            .parse()
            .map_err(|_| format!("unsupported --log-level: {level}"))?;
        reframe::set_ffmpeg_log_level(parsed);
    }

    Ok(())
}

fn install_interrupt_handler() -> CancellationToken {
    let token = CancellationToken::new();
    let handler_token = token.clone();
    if let Err(error) = ctrlc::set_handler(move || {
        eprintln!("\n{}", "interrupted, stopping after the current frame".yellow());
        handler_token.cancel();
    }) {
        log::warn!("cannot install Ctrl-C handler: {error}");
    }
    token
}

/// Drives an indicatif bar from pipeline progress.
struct BarProgress {
    bar: ProgressBar,
}

impl ProgressCallback for BarProgress {
    fn on_progress(&self, info: &ProgressInfo) {
        if let Some(total) = info.total {
            self.bar.set_length(total.max(info.current));
        }
        self.bar.set_position(info.current);
    }
}

fn progress_bar(enabled: bool) -> Result<Option<ProgressBar>, Box<dyn std::error::Error>> {
    if !enabled {
        return Ok(None);
    }
    let bar = ProgressBar::new(0);
    let style = ProgressStyle::with_template("{spinner:.green} {bar:40.cyan/blue} {pos}/{len} {msg}")?;
    bar.set_style(style.progress_chars("##-"));
    Ok(Some(bar))
}

/// Prints per-frame lines above the bar (if any) when `--verbose` is set.
fn frame_log(verbose: bool, bar: Option<ProgressBar>) -> Option<Arc<dyn LogSink>> {
    if !verbose {
        return None;
    }
    Some(Arc::new(move |line: &str| match &bar {
        Some(bar) => bar.println(line),
        None => eprintln!("{line}"),
    }))
}

fn parse_rate(text: &str) -> Result<FrameRate, Box<dyn std::error::Error>> {
    text.parse::<FrameRate>()
        .map_err(|error| format!("--fps: {error}").into())
}

fn run() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    apply_global_options(&cli.global)?;
    let backend = FfmpegBackend::new();

    match cli.command {
        Commands::Extract {
            input,
            out,
            fps,
            quality,
            json,
        } => {
            let frame_rate = match fps {
                Some(text) => parse_rate(&text)?,
                None => {
                    let info = reframe::probe(&backend, &input)?;
                    info.default_frame_rate().ok_or_else(|| {
                        format!(
                            "{} does not report a frame rate; pass --fps",
                            input.display()
                        )
                    })?
                }
            };

            ensure_writable_path(&out.join(reframe::frame_file_name(0)), cli.global.overwrite)?;

            let bar = progress_bar(cli.global.progress)?;
            let mut options = ExtractOptions::new()
                .with_jpeg_quality(quality)
                .with_cancellation(install_interrupt_handler());
            if let Some(bar) = &bar {
                options = options.with_progress(Arc::new(BarProgress { bar: bar.clone() }));
            }
            if let Some(sink) = frame_log(cli.global.verbose, bar.clone()) {
                options = options.with_log(sink);
            }

            let report = reframe::extract_frames(&backend, &input, &out, frame_rate, &options)?;

            if let Some(bar) = bar {
                bar.finish_with_message("done");
            }

            if json {
                let payload = json!({
                    "frame_rate": frame_rate.get(),
                    "frame_interval": report.frame_interval,
                    "expected_frames": report.expected_frames,
                    "frames_decoded": report.frames_decoded,
                    "frames_written": report.frames_written,
                    "output_dir": report.output_dir,
                    "rate_record": report.rate_record,
                });
                println!("{}", serde_json::to_string_pretty(&payload)?);
            } else {
                println!(
                    "{} {}",
                    "success:".green().bold(),
                    format!(
                        "Extracted {} frame(s) to {} (every {} source frame(s))",
                        report.frames_written,
                        report.output_dir.display(),
                        report.frame_interval,
                    )
                    .green()
                );
            }
        }
        Commands::Assemble {
            input,
            out,
            fps,
            fourcc,
            numeric_order,
            strict_dimensions,
            json,
        } => {
            let frame_rate = match fps {
                Some(text) => parse_rate(&text)?,
                None => reframe::read_rate_record(&input)?.ok_or_else(|| {
                    format!(
                        "no --fps given and no {RATE_RECORD_FILE_NAME} in {}",
                        input.display()
                    )
                })?,
            };
            let codec = VideoCodec::from_fourcc(&fourcc)
                .ok_or_else(|| format!("unsupported --fourcc: {fourcc}"))?;

            ensure_writable_path(&out, cli.global.overwrite)?;

            let bar = progress_bar(cli.global.progress)?;
            let mut options = AssembleOptions::new()
                .with_codec(codec)
                .with_cancellation(install_interrupt_handler());
            if numeric_order {
                options = options.with_frame_order(FrameOrder::Numeric);
            }
            if strict_dimensions {
                options = options.with_dimension_policy(DimensionPolicy::Reject);
            }
            if let Some(bar) = &bar {
                options = options.with_progress(Arc::new(BarProgress { bar: bar.clone() }));
            }
            if let Some(sink) = frame_log(cli.global.verbose, bar.clone()) {
                options = options.with_log(sink);
            }

            let report = reframe::assemble_video(&backend, &input, frame_rate, &out, &options)?;

            if let Some(bar) = bar {
                bar.finish_with_message("done");
            }

            if json {
                let payload = json!({
                    "frames_written": report.frames_written,
                    "width": report.width,
                    "height": report.height,
                    "frame_rate": report.frame_rate.get(),
                    "codec": report.codec.fourcc(),
                    "output": report.output,
                });
                println!("{}", serde_json::to_string_pretty(&payload)?);
            } else {
                println!(
                    "{} {}",
                    "saved".green().bold(),
                    format!(
                        "{} ({} frame(s), {}x{}, {} fps)",
                        report.output.display(),
                        report.frames_written,
                        report.width,
                        report.height,
                        report.frame_rate,
                    )
                );
            }
        }
        Commands::Probe { input, json } => {
            let info = reframe::probe(&backend, &input)?;
            if json {
                let payload = json!({
                    "width": info.width,
                    "height": info.height,
                    "fps": info.frames_per_second,
                    "frame_count": info.frame_count,
                    "frame_count_estimated": info.frame_count_estimated,
                    "codec": info.codec,
                    "default_rate": info.default_frame_rate().map(FrameRate::get),
                });
                println!("{}", serde_json::to_string_pretty(&payload)?);
            } else {
                println!("Resolution: {}x{}", info.width, info.height);
                println!("Frame rate: {:.3}", info.frames_per_second);
                if info.frame_count_estimated {
                    println!("Frames: ~{} (estimated from duration)", info.frame_count);
                } else {
                    println!("Frames: {}", info.frame_count);
                }
                println!("Codec: {}", info.codec);
            }
        }
        Commands::Info { input, json } => {
            let frames = reframe::list_frames(&input, FrameOrder::Lexicographic)?;
            let rate = reframe::read_rate_record(&input)?;
            let gaps = frames
                .iter()
                .filter_map(|path| path.file_name()?.to_str().and_then(reframe::parse_ordinal))
                .enumerate()
                .filter(|(position, ordinal)| *position as u64 != *ordinal)
                .count();
            if json {
                let payload = json!({
                    "frames": frames.len(),
                    "first": frames.first(),
                    "last": frames.last(),
                    "frame_rate": rate.map(FrameRate::get),
                    "out_of_sequence": gaps,
                });
                println!("{}", serde_json::to_string_pretty(&payload)?);
            } else {
                println!("Frames: {}", frames.len());
                if let (Some(first), Some(last)) = (frames.first(), frames.last()) {
                    println!("First: {}", first.display());
                    println!("Last: {}", last.display());
                }
                match rate {
                    Some(rate) => println!("Recorded rate: {rate} fps"),
                    None => println!("Recorded rate: none"),
                }
                if gaps > 0 {
                    eprintln!(
                        "{} {}",
                        "warning:".yellow().bold(),
                        format!("{gaps} frame(s) are out of sequence").yellow()
                    );
                }
            }
        }
        Commands::Completions { shell } => {
            let mut command = Cli::command();
            clap_complete::generate(shell, &mut command, "reframe", &mut std::io::stdout());
        }
    }

    Ok(())
}

fn main() {
    if let Err(error) = run() {
        eprintln!("{} {error}", "error:".red().bold());
        std::process::exit(1);
    }
}
