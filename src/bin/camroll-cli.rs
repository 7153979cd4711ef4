use std::{
    path::{Path, PathBuf},
    sync::Arc,
};

use camroll::{
    CamrollError, ContainerName, DroppedFrame, ExportOptions, FfmpegLogLevel, ProgressCallback,
    ProgressInfo, VideoCodec,
};
use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::Shell;
use colored::Colorize;
use image::ImageFormat;
use indicatif::{ProgressBar, ProgressStyle};
use serde_json::json;

const CLI_AFTER_HELP: &str = "Examples:\n  camroll list run/*.bin --json\n  camroll images run/LHPG-1730122064.bin --format png --progress\n  camroll video run/*.bin --fps 60 --codec h264 --progress --verbose\n  camroll completions zsh > _camroll";

#[derive(Debug, Parser)]
#[command(
    name = "camroll",
    version,
    about = "Convert high-speed camera containers into images and video",
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
    /// Print every dropped frame and skipped file.
    #[arg(long, global = true)]
    verbose: bool,

    /// Show a progress bar.
    #[arg(long, global = true)]
    progress: bool,

    /// Worker thread count for decoding and image writes (defaults to available parallelism).
    #[arg(long, global = true)]
    threads: Option<usize>,

    /// FFmpeg log level (quiet, fatal, error, warning, info, debug).
    #[arg(long, global = true)]
    log_level: Option<String>,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Show the recording time embedded in each container name.
    #[command(
        about = "List containers with their start times",
        after_help = "Examples:\n  camroll list run/LHPG-1730122064.bin\n  camroll list run/*.bin --json"
    )]
    List {
        /// Container files.
        #[arg(required = true)]
        files: Vec<PathBuf>,

        /// Output as machine-readable JSON.
        #[arg(long)]
        json: bool,
    },

    /// Write every frame as an image named by its timestamp.
    #[command(
        about = "Export still images",
        after_help = "Examples:\n  camroll images run/LHPG-1730122064.bin\n  camroll images run/*.bin --out exports --format png"
    )]
    Images {
        /// Container files.
        #[arg(required = true)]
        files: Vec<PathBuf>,
        /// Output root; images go into its `photo` subfolder. Defaults to the
        /// first container's folder.
        #[arg(long)]
        out: Option<PathBuf>,
        /// Image format (jpg, png, bmp, tiff).
        #[arg(long, default_value = "jpg")]
        format: String,
    },

    /// Encode all frames, ordered by timestamp, into one video.
    #[command(
        about = "Export a video",
        after_help = "Examples:\n  camroll video run/*.bin\n  camroll video run/*.bin --fps 60 --codec h264 --ext mkv"
    )]
    Video {
        /// Container files.
        #[arg(required = true)]
        files: Vec<PathBuf>,
        /// Output root; the video goes into its `video` subfolder. Defaults
        /// to the first container's folder.
        #[arg(long)]
        out: Option<PathBuf>,
        /// Fixed output frame rate.
        #[arg(long, default_value_t = 30)]
        fps: u32,
        /// Codec (mpeg4, h264, h265).
        #[arg(long, default_value = "mpeg4")]
        codec: String,
        /// Container extension; selects the muxer.
        #[arg(long, default_value = "mp4")]
        ext: String,
        /// strftime pattern for the file name, applied to the first
        /// container's local start time.
        #[arg(long)]
        datetime_format: Option<String>,
    },

    /// Generate shell completion scripts.
    #[command(about = "Generate shell completions")]
    Completions {
        #[arg(value_enum)]
        shell: Shell,
    },
}

fn parse_image_format(value: &str) -> Option<ImageFormat> {
    match value.trim_start_matches('.').to_ascii_lowercase().as_str() {
        "jpg" | "jpeg" => Some(ImageFormat::Jpeg),
        "png" => Some(ImageFormat::Png),
        "bmp" => Some(ImageFormat::Bmp),
        "tif" | "tiff" => Some(ImageFormat::Tiff),
        _ => None,
    }
}

fn default_output_root(files: &[PathBuf]) -> PathBuf {
    files
        .first()
        .and_then(|file| file.parent())
        .filter(|parent| !parent.as_os_str().is_empty())
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from("."))
}

fn base_export_options(global: &GlobalOptions) -> ExportOptions {
    let mut options = ExportOptions::new();
    if let Some(threads) = global.threads {
        options = options.with_threads(threads);
    }
    if global.progress {
        options = options.with_progress(Arc::new(TerminalProgress::new()));
    }
    options
}

fn apply_global_options(global: &GlobalOptions) -> Result<(), Box<dyn std::error::Error>> {
    if let Some(level) = &global.log_level {
        let parsed = FfmpegLogLevel::from_name(level)
            .ok_or(format!("unsupported --log-level: {level}"))?;
        camroll::set_ffmpeg_log_level(parsed);
    }
    Ok(())
}

fn report_dropped(dropped: &[DroppedFrame], verbose: bool) {
    if dropped.is_empty() {
        return;
    }
    eprintln!(
        "{} {}",
        "warning:".yellow().bold(),
        format!("{} frames could not be decoded", dropped.len()).yellow()
    );
    if verbose {
        for frame in dropped {
            eprintln!("  {} #{}: {}", frame.container, frame.index, frame.reason);
        }
    }
}

/// Feeds progress snapshots into an `indicatif` bar.
struct TerminalProgress {
    bar: ProgressBar,
}

impl TerminalProgress {
    fn new() -> Self {
        let bar = ProgressBar::new(0);
        if let Ok(style) =
            ProgressStyle::with_template("{spinner:.green} {bar:40.cyan/blue} {pos}/{len} {msg}")
        {
            bar.set_style(style.progress_chars("##-"));
        }
        Self { bar }
    }
}

impl ProgressCallback for TerminalProgress {
    fn on_progress(&self, info: &ProgressInfo) {
        self.bar.set_length(info.total);
        self.bar.set_position(info.current);
        self.bar.set_message(info.label.clone());
        if info.total > 0 && info.current >= info.total {
            self.bar.finish();
        }
    }
}

fn run() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    apply_global_options(&cli.global)?;

    match cli.command {
        Commands::List { files, json } => {
            let rows: Vec<_> = files
                .iter()
                .map(|file| (file, ContainerName::from_path(file)))
                .collect();

            if json {
                let payload: Vec<_> = rows
                    .iter()
                    .map(|(file, parsed)| match parsed {
                        Ok(name) => json!({
                            "file": file.display().to_string(),
                            "prefix": name.prefix,
                            "unix_timestamp": name.unix_timestamp,
                            "local": name.datetime_local().map(|time| time.to_rfc3339()),
                        }),
                        Err(error) => json!({
                            "file": file.display().to_string(),
                            "error": error.to_string(),
                        }),
                    })
                    .collect();
                println!("{}", serde_json::to_string_pretty(&payload)?);
            } else {
                for (file, parsed) in rows {
                    match parsed {
                        Ok(name) => {
                            let local = name
                                .datetime_local()
                                .map(|time| time.format("%Y-%m-%d %H:%M:%S").to_string())
                                .unwrap_or_else(|| "out of range".to_string());
                            println!("{}  {}", local.green(), file.display());
                        }
                        Err(error) => {
                            eprintln!("{} {error}", "skipped:".yellow().bold());
                        }
                    }
                }
            }
        }
        Commands::Images { files, out, format } => {
            let image_format =
                parse_image_format(&format).ok_or(format!("unsupported --format: {format}"))?;
            let options = base_export_options(&cli.global).with_image_format(image_format);
            let root = out.unwrap_or_else(|| default_output_root(&files));

            let report = camroll::convert_to_images(&files, &root, &options)?;
            report_dropped(&report.dropped, cli.global.verbose);

            if cli.global.verbose {
                for path in &report.images.skipped {
                    eprintln!("{} {}", "exists:".dimmed(), path.display());
                }
            }
            println!(
                "{} {} images ({} already present) in {}",
                "saved".green().bold(),
                report.images.written.len(),
                report.images.skipped.len(),
                root.join(options.image_dir_name()).display()
            );
        }
        Commands::Video {
            files,
            out,
            fps,
            codec,
            ext,
            datetime_format,
        } => {
            let codec = VideoCodec::from_name(&codec).ok_or(format!("unsupported --codec: {codec}"))?;
            let mut options = base_export_options(&cli.global)
                .with_fps(fps)
                .with_codec(codec)
                .with_video_extension(ext);
            if let Some(pattern) = datetime_format {
                options = options.with_datetime_format(pattern);
            }
            let root = out.unwrap_or_else(|| default_output_root(&files));

            match camroll::convert_to_video(&files, &root, &options) {
                Ok(report) => {
                    report_dropped(&report.dropped, cli.global.verbose);
                    println!(
                        "{} {} ({} frames, {}x{} @ {} fps)",
                        "saved".green().bold(),
                        report.video.path.display(),
                        report.video.frames_written,
                        report.video.width,
                        report.video.height,
                        report.video.fps
                    );
                }
                Err(CamrollError::NoValidFrames) => {
                    return Err("no frame could be decoded; no video was written".into());
                }
                Err(error) => return Err(error.into()),
            }
        }
        Commands::Completions { shell } => {
            let mut command = Cli::command();
            clap_complete::generate(shell, &mut command, "camroll", &mut std::io::stdout());
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

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use clap::Parser;
    use image::ImageFormat;

    use super::{Cli, Commands, default_output_root, parse_image_format};

    #[test]
    fn parse_image_format_aliases() {
        assert_eq!(parse_image_format("jpg"), Some(ImageFormat::Jpeg));
        assert_eq!(parse_image_format(".JPEG"), Some(ImageFormat::Jpeg));
        assert_eq!(parse_image_format("png"), Some(ImageFormat::Png));
        assert_eq!(parse_image_format("tif"), Some(ImageFormat::Tiff));
        assert!(parse_image_format("gif").is_none());
    }

    #[test]
    fn output_root_defaults_to_first_container_folder() {
        let files = vec![PathBuf::from("run/LHPG-1.bin"), PathBuf::from("other/LHPG-2.bin")];
        assert_eq!(default_output_root(&files), PathBuf::from("run"));
        assert_eq!(default_output_root(&[PathBuf::from("LHPG-1.bin")]), PathBuf::from("."));
    }

    #[test]
    fn video_command_parses_with_global_flags() {
        let cli = Cli::try_parse_from([
            "camroll", "video", "a.bin", "b.bin", "--fps", "60", "--progress", "--threads", "2",
        ])
        .unwrap();
        assert!(cli.global.progress);
        assert_eq!(cli.global.threads, Some(2));
        match cli.command {
            Commands::Video { files, fps, .. } => {
                assert_eq!(files.len(), 2);
                assert_eq!(fps, 60);
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn list_requires_files() {
        assert!(Cli::try_parse_from(["camroll", "list"]).is_err());
    }
}
