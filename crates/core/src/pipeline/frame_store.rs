use std::path::Path;
use std::sync::Arc;

use crate::pipeline::job_error::JobError;
use crate::shared::frame_sequence::FrameSequence;
use crate::video::domain::video_toolkit::VideoToolkit;

/// Owns the explode-to-frames step of a video job: one working directory
/// per video, populated once, listed in numeric order.
pub struct FrameStore {
    toolkit: Arc<dyn VideoToolkit>,
}

impl FrameStore {
    pub fn new(toolkit: Arc<dyn VideoToolkit>) -> Self {
        Self { toolkit }
    }

    /// Decodes `video` into `out_dir`, creating the directory if needed.
    ///
    /// Extracting into an existing directory is not an error; producing no
    /// frames is.
    pub fn extract(&self, video: &Path, out_dir: &Path) -> Result<FrameSequence, JobError> {
        std::fs::create_dir_all(out_dir)?;
        log::info!(
            "extracting frames from {} into {}",
            video.display(),
            out_dir.display()
        );
        self.toolkit
            .extract_frames(video, out_dir)
            .map_err(JobError::Toolkit)?;

        let frames = self.list_ordered(out_dir)?;
        if frames.is_empty() {
            return Err(JobError::Extraction {
                dir: out_dir.to_path_buf(),
            });
        }
        Ok(frames)
    }

    /// Frames currently present in `dir`, in numeric order.
    pub fn list_ordered(&self, dir: &Path) -> Result<FrameSequence, JobError> {
        Ok(FrameSequence::scan(dir)?)
    }
}
