use std::path::{Path, PathBuf};

use crate::pipeline::face_gate::FaceGate;
use crate::pipeline::job_error::JobError;
use crate::pipeline::swap_dispatcher::SwapDispatcher;
use crate::shared::temp_artifacts::TempArtifacts;

/// Single-image swap job: admit → swap → artifact path.
///
/// The artifact is written to a fresh uuid-named path under the temp root,
/// never over the inputs.
pub struct SwapImageUseCase {
    gate: FaceGate,
    dispatcher: SwapDispatcher,
    artifacts: TempArtifacts,
}

impl SwapImageUseCase {
    pub fn new(gate: FaceGate, dispatcher: SwapDispatcher, artifacts: TempArtifacts) -> Self {
        Self {
            gate,
            dispatcher,
            artifacts,
        }
    }

    pub fn execute(&self, source: &Path, target: &Path) -> Result<PathBuf, JobError> {
        let face = self.gate.admit_image(source, target)?;

        let output = self.artifacts.image_output();
        log::info!("swapping face into {}", target.display());
        self.dispatcher.swap_one(&face, target, &output)?;

        log::info!("image saved as {}", output.display());
        Ok(output)
    }
}
