use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::pipeline::job_config::JobConfig;
use crate::pipeline::job_error::JobError;
use crate::pipeline::worker_pool::WorkerPool;
use crate::shared::frame_sequence::FrameSequence;
use crate::swapping::domain::face_descriptor::FaceDescriptor;
use crate::swapping::domain::face_engine::FaceEngine;

/// How swap work reaches the engine. Selected by configuration, never
/// auto-detected.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DispatchMode {
    /// One engine pass over the whole sequence; the engine parallelizes
    /// internally.
    Accelerated,
    /// Contiguous chunks spread across a fixed-size worker pool.
    Pooled { workers: usize },
}

impl DispatchMode {
    pub fn from_config(config: &JobConfig) -> Self {
        if config.accelerated {
            Self::Accelerated
        } else {
            Self::Pooled {
                workers: config.worker_count,
            }
        }
    }
}

/// Hands swap work to the engine: single images directly, frame sequences
/// in the configured dispatch mode.
pub struct SwapDispatcher {
    engine: Arc<dyn FaceEngine>,
}

impl SwapDispatcher {
    pub fn new(engine: Arc<dyn FaceEngine>) -> Self {
        Self { engine }
    }

    /// Swaps `face` into `target`, writing the composite to `output`.
    pub fn swap_one(
        &self,
        face: &FaceDescriptor,
        target: &Path,
        output: &Path,
    ) -> Result<(), JobError> {
        self.engine
            .swap_image(face, target, output)
            .map_err(JobError::SwapEngine)
    }

    /// Swaps `face` into every frame, overwriting each file in place.
    ///
    /// Pooled mode opens a fresh pool for this one dispatch phase and
    /// closes it afterwards; pools are never reused. The first chunk error
    /// aborts the job, and frames already overwritten stay on disk.
    pub fn swap_many(
        &self,
        face: &FaceDescriptor,
        frames: &FrameSequence,
        mode: DispatchMode,
    ) -> Result<(), JobError> {
        match mode {
            DispatchMode::Accelerated => {
                log::info!("swapping {} frames in one accelerated pass", frames.len());
                self.engine
                    .swap_frames(face, frames.paths())
                    .map_err(JobError::SwapEngine)
            }
            DispatchMode::Pooled { workers } => self.swap_pooled(face, frames, workers),
        }
    }

    fn swap_pooled(
        &self,
        face: &FaceDescriptor,
        frames: &FrameSequence,
        workers: usize,
    ) -> Result<(), JobError> {
        let chunks = partition(frames.paths(), workers);
        log::info!(
            "swapping {} frames in {} chunks on {workers} workers",
            frames.len(),
            chunks.len()
        );

        let mut pool = WorkerPool::open(workers);
        let mut handles = Vec::with_capacity(chunks.len());
        for chunk in chunks {
            let engine = self.engine.clone();
            let face = face.clone();
            handles.push(pool.dispatch(move || engine.swap_frames(&face, &chunk))?);
        }

        // Every handle is waited so no worker outlives the phase; the first
        // error in dispatch order wins.
        let mut first_error = None;
        for handle in handles {
            if let Err(e) = handle.wait() {
                first_error.get_or_insert(e);
            }
        }
        pool.close();

        match first_error {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }
}

/// Splits `frames` into contiguous chunks of stride `len / workers`, with a
/// floor of one. The stride is fixed, so the trailing chunk keeps the
/// remainder: 23 frames over 4 workers gives [5, 5, 5, 5, 3].
pub fn partition(frames: &[PathBuf], workers: usize) -> Vec<Vec<PathBuf>> {
    if frames.is_empty() {
        return Vec::new();
    }
    let stride = (frames.len() / workers.max(1)).max(1);
    frames.chunks(stride).map(|chunk| chunk.to_vec()).collect()
}
