use std::path::{Path, PathBuf};

use crate::swapping::domain::face_descriptor::FaceDescriptor;

pub type EngineError = Box<dyn std::error::Error + Send + Sync>;

/// Pixel-level face swap collaborator.
///
/// Implementations own detection, embedding and compositing; the pipeline
/// only sequences calls and routes file paths. Engines are shared across
/// worker threads during pooled dispatch, hence `Send + Sync` and `&self`.
pub trait FaceEngine: Send + Sync {
    /// Finds the primary face in `image`, or `None` when no face is present.
    fn detect_face(&self, image: &Path) -> Result<Option<FaceDescriptor>, EngineError>;

    /// Swaps `face` into `target` and writes the composited result to `output`.
    fn swap_image(
        &self,
        face: &FaceDescriptor,
        target: &Path,
        output: &Path,
    ) -> Result<(), EngineError>;

    /// Swaps `face` into every listed frame, overwriting each file in place.
    fn swap_frames(&self, face: &FaceDescriptor, frames: &[PathBuf]) -> Result<(), EngineError>;
}
