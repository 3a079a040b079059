use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::pipeline::face_gate::FaceGate;
use crate::pipeline::frame_store::FrameStore;
use crate::pipeline::job_config::JobConfig;
use crate::pipeline::job_error::JobError;
use crate::pipeline::reassembler::VideoReassembler;
use crate::pipeline::swap_dispatcher::{DispatchMode, SwapDispatcher};
use crate::shared::constants::FPS_LIMIT;
use crate::shared::temp_artifacts::TempArtifacts;
use crate::video::domain::video_toolkit::VideoToolkit;

/// Full video swap job: detect the source face, optionally re-time the
/// target, explode it into frames, screen a sample, swap every frame,
/// reassemble, and remux the original audio.
///
/// The first failing stage ends the job; partially written frames and temp
/// copies are left on disk for inspection rather than cleaned up.
pub struct SwapVideoUseCase {
    gate: FaceGate,
    store: FrameStore,
    dispatcher: SwapDispatcher,
    reassembler: VideoReassembler,
    toolkit: Arc<dyn VideoToolkit>,
    config: JobConfig,
    artifacts: TempArtifacts,
}

impl SwapVideoUseCase {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        gate: FaceGate,
        store: FrameStore,
        dispatcher: SwapDispatcher,
        reassembler: VideoReassembler,
        toolkit: Arc<dyn VideoToolkit>,
        config: JobConfig,
        artifacts: TempArtifacts,
    ) -> Self {
        Self {
            gate,
            store,
            dispatcher,
            reassembler,
            toolkit,
            config,
            artifacts,
        }
    }

    pub fn execute(
        &self,
        source: &Path,
        target: &Path,
        limit_fps: bool,
    ) -> Result<PathBuf, JobError> {
        // Names and the working directory come from the original target
        // path, before any frame-rate override swaps in a temp copy.
        let (file_name, base_name) = target_names(target)?;
        let work_dir = target.parent().unwrap_or(Path::new("")).join(&base_name);

        let face = self.gate.source_face(source)?;

        log::info!("detecting frame rate of {}", target.display());
        let (_, exact_fps) = self.toolkit.detect_fps(target).map_err(JobError::Toolkit)?;

        let (work_video, fps) = if limit_fps {
            let copy = self.artifacts.video_output();
            log::info!("re-encoding at {FPS_LIMIT} fps");
            self.toolkit
                .set_fps(target, &copy, FPS_LIMIT)
                .map_err(JobError::Toolkit)?;
            (copy, f64::from(FPS_LIMIT))
        } else {
            (target.to_path_buf(), exact_fps)
        };

        let frames = self.store.extract(&work_video, &work_dir)?;
        self.gate.check_frames(&frames)?;

        self.dispatcher
            .swap_many(&face, &frames, DispatchMode::from_config(&self.config))?;

        self.reassembler.assemble(&work_dir, fps, &base_name)?;

        let artifact = self.artifacts.video_output();
        self.reassembler.attach_audio(
            &work_dir,
            &work_video,
            &file_name,
            self.config.keep_frames,
            &artifact,
        )?;

        log::info!("video saved as {}", artifact.display());
        Ok(artifact)
    }
}

fn target_names(target: &Path) -> Result<(String, String), JobError> {
    let file_name = target.file_name().and_then(|n| n.to_str());
    let base_name = target.file_stem().and_then(|s| s.to_str());
    match (file_name, base_name) {
        (Some(file_name), Some(base_name)) => Ok((file_name.to_string(), base_name.to_string())),
        _ => Err(std::io::Error::new(
            std::io::ErrorKind::InvalidInput,
            format!("target has no usable file name: {}", target.display()),
        )
        .into()),
    }
}
