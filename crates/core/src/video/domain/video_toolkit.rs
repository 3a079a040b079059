use std::path::{Path, PathBuf};

pub type ToolkitError = Box<dyn std::error::Error + Send + Sync>;

/// Video utility collaborator: probing, re-timing, frame explosion and
/// reassembly.
///
/// Implementations handle container and codec details; the pipeline works
/// in whole files and frame directories.
pub trait VideoToolkit: Send + Sync {
    /// Returns the video's frame rate as `(rounded, exact)`.
    fn detect_fps(&self, video: &Path) -> Result<(u32, f64), ToolkitError>;

    /// Re-encodes `input` at `target_fps` into `output`, carrying the audio
    /// track through so the copy remains a valid audio source.
    fn set_fps(&self, input: &Path, output: &Path, target_fps: u32) -> Result<(), ToolkitError>;

    /// Decodes every frame of `video` into indexed images inside `out_dir`.
    fn extract_frames(&self, video: &Path, out_dir: &Path) -> Result<(), ToolkitError>;

    /// Encodes the ordered frame images in `frames_dir` into a silent video
    /// `<frames_dir>/<base_name>.mp4` at `fps`, returning its path.
    fn create_video(
        &self,
        base_name: &str,
        fps: f64,
        frames_dir: &Path,
    ) -> Result<PathBuf, ToolkitError>;

    /// Muxes the silent `<frames_dir>/<stem of original_filename>.mp4`
    /// with the audio of `original` into `output`, then removes
    /// `frames_dir` unless `keep_frames`.
    fn add_audio(
        &self,
        frames_dir: &Path,
        original: &Path,
        original_filename: &str,
        keep_frames: bool,
        output: &Path,
    ) -> Result<(), ToolkitError>;
}
