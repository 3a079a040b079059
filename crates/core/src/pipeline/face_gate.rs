use std::path::Path;
use std::sync::Arc;

use rand::prelude::IndexedRandom;

use crate::pipeline::job_error::JobError;
use crate::shared::constants::{
    IMAGE_VISIBILITY_THRESHOLD, VIDEO_VISIBILITY_THRESHOLD, VISIBILITY_SAMPLE_LIMIT,
};
use crate::shared::frame_sequence::FrameSequence;
use crate::swapping::domain::face_descriptor::FaceDescriptor;
use crate::swapping::domain::face_engine::FaceEngine;
use crate::visibility::domain::visibility_classifier::VisibilityClassifier;

/// Validation gate in front of every swap job: a usable source face must
/// exist, and the target must pass the visibility screen for its media
/// kind, before any pixel work is dispatched.
pub struct FaceGate {
    engine: Arc<dyn FaceEngine>,
    classifier: Arc<dyn VisibilityClassifier>,
}

impl FaceGate {
    pub fn new(engine: Arc<dyn FaceEngine>, classifier: Arc<dyn VisibilityClassifier>) -> Self {
        Self { engine, classifier }
    }

    /// Detects the face to swap in. Absence is terminal; nothing else runs.
    pub fn source_face(&self, source: &Path) -> Result<FaceDescriptor, JobError> {
        log::info!("detecting source face in {}", source.display());
        self.engine
            .detect_face(source)
            .map_err(JobError::SwapEngine)?
            .ok_or_else(|| JobError::NoSourceFace(source.to_path_buf()))
    }

    /// Screens a still target against the image threshold.
    pub fn check_target_image(&self, target: &Path) -> Result<(), JobError> {
        self.check_one(target, IMAGE_VISIBILITY_THRESHOLD)
    }

    /// Screens `min(len, limit)` frames against the video threshold.
    ///
    /// Sequences at or below the limit are checked exhaustively; larger
    /// ones by independent uniform draws, so one frame may be drawn twice.
    pub fn check_frames(&self, frames: &FrameSequence) -> Result<(), JobError> {
        let paths = frames.paths();
        let sample = paths.len().min(VISIBILITY_SAMPLE_LIMIT);
        log::info!("screening {sample} of {} frames", paths.len());

        if paths.len() <= VISIBILITY_SAMPLE_LIMIT {
            for path in paths {
                self.check_one(path, VIDEO_VISIBILITY_THRESHOLD)?;
            }
        } else {
            let mut rng = rand::rng();
            for _ in 0..VISIBILITY_SAMPLE_LIMIT {
                if let Some(path) = paths.choose(&mut rng) {
                    self.check_one(path, VIDEO_VISIBILITY_THRESHOLD)?;
                }
            }
        }
        Ok(())
    }

    /// Full admission for an image job; returns the face to swap in.
    pub fn admit_image(&self, source: &Path, target: &Path) -> Result<FaceDescriptor, JobError> {
        let face = self.source_face(source)?;
        self.check_target_image(target)?;
        Ok(face)
    }

    /// Full admission for a video job; returns the face to swap in.
    pub fn admit_video(
        &self,
        source: &Path,
        frames: &FrameSequence,
    ) -> Result<FaceDescriptor, JobError> {
        let face = self.source_face(source)?;
        self.check_frames(frames)?;
        Ok(face)
    }

    fn check_one(&self, image: &Path, threshold: f64) -> Result<(), JobError> {
        let score = self
            .classifier
            .score(image)
            .map_err(JobError::Classifier)?;
        log::debug!("visibility score {score:.2} for {}", image.display());
        if score > threshold {
            return Err(JobError::AmbiguousTarget {
                path: image.to_path_buf(),
                score,
                threshold,
            });
        }
        Ok(())
    }
}
