use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::pipeline::job_error::JobError;
use crate::video::domain::video_toolkit::VideoToolkit;

/// Rebuilds a watchable video from a directory of swapped frames: first a
/// silent assembly at the job's effective fps, then the original audio
/// track muxed on top.
pub struct VideoReassembler {
    toolkit: Arc<dyn VideoToolkit>,
}

impl VideoReassembler {
    pub fn new(toolkit: Arc<dyn VideoToolkit>) -> Self {
        Self { toolkit }
    }

    /// Encodes the silent video `<frames_dir>/<base_name>.mp4` at `fps` and
    /// returns its path.
    pub fn assemble(
        &self,
        frames_dir: &Path,
        fps: f64,
        base_name: &str,
    ) -> Result<PathBuf, JobError> {
        log::info!("assembling {base_name} at {fps:.2} fps");
        self.toolkit
            .create_video(base_name, fps, frames_dir)
            .map_err(JobError::Toolkit)
    }

    /// Muxes the audio of `original` onto the assembled video, writing the
    /// final artifact to `output`. The frames directory is removed after a
    /// successful mux unless `keep_frames`.
    pub fn attach_audio(
        &self,
        frames_dir: &Path,
        original: &Path,
        original_filename: &str,
        keep_frames: bool,
        output: &Path,
    ) -> Result<PathBuf, JobError> {
        log::info!("attaching audio from {}", original.display());
        self.toolkit
            .add_audio(frames_dir, original, original_filename, keep_frames, output)
            .map_err(JobError::Toolkit)?;
        Ok(output.to_path_buf())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    use crate::video::domain::video_toolkit::ToolkitError;

    // --- Stubs ---

    #[derive(Debug, Clone, PartialEq)]
    struct AddAudioCall {
        frames_dir: PathBuf,
        original: PathBuf,
        original_filename: String,
        keep_frames: bool,
        output: PathBuf,
    }

    struct StubToolkit {
        fail: bool,
        create_calls: Mutex<Vec<(String, f64, PathBuf)>>,
        add_audio_calls: Mutex<Vec<AddAudioCall>>,
    }

    impl StubToolkit {
        fn working() -> Arc<Self> {
            Arc::new(Self {
                fail: false,
                create_calls: Mutex::new(Vec::new()),
                add_audio_calls: Mutex::new(Vec::new()),
            })
        }

        fn failing() -> Arc<Self> {
            Arc::new(Self {
                fail: true,
                create_calls: Mutex::new(Vec::new()),
                add_audio_calls: Mutex::new(Vec::new()),
            })
        }
    }

    impl VideoToolkit for StubToolkit {
        fn detect_fps(&self, _video: &Path) -> Result<(u32, f64), ToolkitError> {
            Ok((30, 30.0))
        }

        fn set_fps(
            &self,
            _input: &Path,
            _output: &Path,
            _target_fps: u32,
        ) -> Result<(), ToolkitError> {
            Ok(())
        }

        fn extract_frames(&self, _video: &Path, _out_dir: &Path) -> Result<(), ToolkitError> {
            Ok(())
        }

        fn create_video(
            &self,
            base_name: &str,
            fps: f64,
            frames_dir: &Path,
        ) -> Result<PathBuf, ToolkitError> {
            if self.fail {
                return Err("encoder rejected frames".into());
            }
            self.create_calls.lock().unwrap().push((
                base_name.to_string(),
                fps,
                frames_dir.to_path_buf(),
            ));
            Ok(frames_dir.join(format!("{base_name}.mp4")))
        }

        fn add_audio(
            &self,
            frames_dir: &Path,
            original: &Path,
            original_filename: &str,
            keep_frames: bool,
            output: &Path,
        ) -> Result<(), ToolkitError> {
            if self.fail {
                return Err("mux failed".into());
            }
            self.add_audio_calls.lock().unwrap().push(AddAudioCall {
                frames_dir: frames_dir.to_path_buf(),
                original: original.to_path_buf(),
                original_filename: original_filename.to_string(),
                keep_frames,
                output: output.to_path_buf(),
            });
            Ok(())
        }
    }

    // --- Tests ---

    #[test]
    fn test_assemble_returns_silent_video_path() {
        let toolkit = StubToolkit::working();
        let reassembler = VideoReassembler::new(toolkit.clone());

        let silent = reassembler
            .assemble(Path::new("/work/clip"), 29.97, "clip")
            .unwrap();
        assert_eq!(silent, Path::new("/work/clip/clip.mp4"));

        let calls = toolkit.create_calls.lock().unwrap();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].0, "clip");
        assert_eq!(calls[0].1, 29.97);
    }

    #[test]
    fn test_attach_audio_forwards_keep_frames() {
        let toolkit = StubToolkit::working();
        let reassembler = VideoReassembler::new(toolkit.clone());

        let artifact = reassembler
            .attach_audio(
                Path::new("/work/clip"),
                Path::new("/in/clip.mp4"),
                "clip.mp4",
                true,
                Path::new("/tmp/out.mp4"),
            )
            .unwrap();
        assert_eq!(artifact, Path::new("/tmp/out.mp4"));

        let calls = toolkit.add_audio_calls.lock().unwrap();
        assert_eq!(
            calls[0],
            AddAudioCall {
                frames_dir: PathBuf::from("/work/clip"),
                original: PathBuf::from("/in/clip.mp4"),
                original_filename: "clip.mp4".to_string(),
                keep_frames: true,
                output: PathBuf::from("/tmp/out.mp4"),
            }
        );
    }

    #[test]
    fn test_toolkit_failures_map_to_toolkit_error() {
        let reassembler = VideoReassembler::new(StubToolkit::failing());

        let assemble_err = reassembler
            .assemble(Path::new("/work/clip"), 30.0, "clip")
            .unwrap_err();
        assert!(matches!(assemble_err, JobError::Toolkit(_)));

        let attach_err = reassembler
            .attach_audio(
                Path::new("/work/clip"),
                Path::new("/in/clip.mp4"),
                "clip.mp4",
                false,
                Path::new("/tmp/out.mp4"),
            )
            .unwrap_err();
        assert!(matches!(attach_err, JobError::Toolkit(_)));
    }
}
