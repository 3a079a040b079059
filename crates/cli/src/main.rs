use std::path::{Path, PathBuf};
use std::process;
use std::sync::Arc;

use clap::Parser;

use faceswap_core::pipeline::face_gate::FaceGate;
use faceswap_core::pipeline::frame_store::FrameStore;
use faceswap_core::pipeline::job_config::{default_worker_count, JobConfig};
use faceswap_core::pipeline::reassembler::VideoReassembler;
use faceswap_core::pipeline::swap_dispatcher::SwapDispatcher;
use faceswap_core::pipeline::swap_image_use_case::SwapImageUseCase;
use faceswap_core::pipeline::swap_video_use_case::SwapVideoUseCase;
use faceswap_core::shared::constants::{IMAGE_EXTENSIONS, VIDEO_EXTENSIONS};
use faceswap_core::shared::temp_artifacts::TempArtifacts;
use faceswap_core::swapping::domain::face_engine::FaceEngine;
use faceswap_core::swapping::infrastructure::command_engine::CommandSwapEngine;
use faceswap_core::video::domain::video_toolkit::VideoToolkit;
use faceswap_core::video::infrastructure::ffmpeg_toolkit::FfmpegToolkit;
use faceswap_core::visibility::domain::visibility_classifier::VisibilityClassifier;
use faceswap_core::visibility::infrastructure::command_classifier::CommandClassifier;

/// Face swapping for images and videos.
#[derive(Parser)]
#[command(name = "faceswap")]
struct Cli {
    /// Image containing the face to swap in.
    source: PathBuf,

    /// Target image or video to swap the face into.
    target: PathBuf,

    /// Swap engine executable.
    #[arg(long)]
    engine: PathBuf,

    /// Visibility classifier executable.
    #[arg(long)]
    classifier: PathBuf,

    /// Chunk frames across a CPU worker pool instead of one accelerated
    /// engine pass.
    #[arg(long)]
    cpu: bool,

    /// Worker threads used with --cpu.
    #[arg(long, default_value_t = default_worker_count())]
    workers: usize,

    /// Re-encode the target video at 30 fps before swapping.
    #[arg(long)]
    limit_fps: bool,

    /// Keep the extracted frames directory after the swap.
    #[arg(long)]
    keep_frames: bool,
}

fn main() {
    env_logger::init();

    if let Err(e) = run() {
        eprintln!("Error: {e}");
        process::exit(1);
    }
}

fn run() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    validate(&cli)?;

    let engine: Arc<dyn FaceEngine> = Arc::new(CommandSwapEngine::new(cli.engine.clone()));
    let classifier: Arc<dyn VisibilityClassifier> =
        Arc::new(CommandClassifier::new(cli.classifier.clone()));
    let artifacts = TempArtifacts::new();

    let output = if is_image(&cli.target) {
        let use_case = SwapImageUseCase::new(
            FaceGate::new(engine.clone(), classifier),
            SwapDispatcher::new(engine),
            artifacts,
        );
        use_case.execute(&cli.source, &cli.target)?
    } else {
        let toolkit: Arc<dyn VideoToolkit> = Arc::new(FfmpegToolkit::new());
        let config = JobConfig {
            accelerated: !cli.cpu,
            keep_frames: cli.keep_frames,
            worker_count: cli.workers,
        };
        let use_case = SwapVideoUseCase::new(
            FaceGate::new(engine.clone(), classifier),
            FrameStore::new(toolkit.clone()),
            SwapDispatcher::new(engine),
            VideoReassembler::new(toolkit.clone()),
            toolkit,
            config,
            artifacts,
        );
        use_case.execute(&cli.source, &cli.target, cli.limit_fps)?
    };

    log::info!("Output written to {}", output.display());
    println!("{}", output.display());
    Ok(())
}

fn validate(cli: &Cli) -> Result<(), Box<dyn std::error::Error>> {
    if !cli.source.exists() {
        return Err(format!("Source image not found: {}", cli.source.display()).into());
    }
    if !cli.target.exists() {
        return Err(format!("Target file not found: {}", cli.target.display()).into());
    }
    if !is_image(&cli.source) {
        return Err(format!("Source must be an image: {}", cli.source.display()).into());
    }
    if !is_image(&cli.target) && !is_video(&cli.target) {
        return Err(format!(
            "Target must be an image or a video: {}",
            cli.target.display()
        )
        .into());
    }
    if cli.workers == 0 {
        return Err("Workers must be at least 1".into());
    }
    Ok(())
}

fn is_image(path: &Path) -> bool {
    has_extension_in(path, IMAGE_EXTENSIONS)
}

fn is_video(path: &Path) -> bool {
    has_extension_in(path, VIDEO_EXTENSIONS)
}

fn has_extension_in(path: &Path, extensions: &[&str]) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| extensions.contains(&ext.to_lowercase().as_str()))
        .unwrap_or(false)
}
