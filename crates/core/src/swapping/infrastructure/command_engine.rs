use std::path::{Path, PathBuf};
use std::process::{Command, Output};

use crate::shared::temp_artifacts::TempArtifacts;
use crate::swapping::domain::face_descriptor::FaceDescriptor;
use crate::swapping::domain::face_engine::{EngineError, FaceEngine};

/// Exit code the engine executable uses to report "no face found".
const NO_FACE_EXIT_CODE: i32 = 2;

/// `FaceEngine` adapter driving an external engine executable.
///
/// Call contract:
/// - `<program> detect --image I --face-out F` writes a descriptor file
///   and exits 0, or exits 2 when the image contains no face.
/// - `<program> swap-image --face F --target T --output O` composites one
///   image.
/// - `<program> swap-frames --face F --frames L` overwrites every frame
///   listed in L (one path per line) in place.
///
/// Any other non-zero exit is an error; stderr is captured into the
/// message.
pub struct CommandSwapEngine {
    program: PathBuf,
    scratch: TempArtifacts,
}

impl CommandSwapEngine {
    pub fn new(program: PathBuf) -> Self {
        Self {
            program,
            scratch: TempArtifacts::new(),
        }
    }

    pub fn with_scratch(program: PathBuf, scratch: TempArtifacts) -> Self {
        Self { program, scratch }
    }

    fn write_descriptor(&self, face: &FaceDescriptor) -> Result<PathBuf, EngineError> {
        let path = self.scratch.unique("bin");
        std::fs::write(&path, face.bytes())
            .map_err(|e| -> EngineError { format!("writing face descriptor: {e}").into() })?;
        Ok(path)
    }

    fn run(&self, action: &str, args: &[&std::ffi::OsStr]) -> Result<Output, EngineError> {
        log::debug!("engine {action}: {}", self.program.display());
        let output = Command::new(&self.program)
            .arg(action)
            .args(args)
            .output()
            .map_err(|e| -> EngineError {
                format!("failed to run {}: {e}", self.program.display()).into()
            })?;
        Ok(output)
    }
}

impl FaceEngine for CommandSwapEngine {
    fn detect_face(&self, image: &Path) -> Result<Option<FaceDescriptor>, EngineError> {
        let face_out = self.scratch.unique("bin");
        let output = self.run(
            "detect",
            &[
                "--image".as_ref(),
                image.as_os_str(),
                "--face-out".as_ref(),
                face_out.as_os_str(),
            ],
        )?;
        if output.status.code() == Some(NO_FACE_EXIT_CODE) {
            return Ok(None);
        }
        if !output.status.success() {
            return Err(command_error("detect", &output));
        }
        let bytes = std::fs::read(&face_out)
            .map_err(|e| -> EngineError { format!("reading face descriptor: {e}").into() })?;
        let _ = std::fs::remove_file(&face_out);
        Ok(Some(FaceDescriptor::new(bytes)))
    }

    fn swap_image(
        &self,
        face: &FaceDescriptor,
        target: &Path,
        output_path: &Path,
    ) -> Result<(), EngineError> {
        let face_file = self.write_descriptor(face)?;
        let output = self.run(
            "swap-image",
            &[
                "--face".as_ref(),
                face_file.as_os_str(),
                "--target".as_ref(),
                target.as_os_str(),
                "--output".as_ref(),
                output_path.as_os_str(),
            ],
        );
        let _ = std::fs::remove_file(&face_file);
        let output = output?;
        if !output.status.success() {
            return Err(command_error("swap-image", &output));
        }
        Ok(())
    }

    fn swap_frames(&self, face: &FaceDescriptor, frames: &[PathBuf]) -> Result<(), EngineError> {
        let face_file = self.write_descriptor(face)?;
        let list_file = self.scratch.unique("txt");
        let mut lines = String::new();
        for path in frames {
            let path = path
                .to_str()
                .ok_or_else(|| -> EngineError { "frame path is not valid UTF-8".into() })?;
            lines.push_str(path);
            lines.push('\n');
        }
        std::fs::write(&list_file, lines)
            .map_err(|e| -> EngineError { format!("writing frame list: {e}").into() })?;
        let output = self.run(
            "swap-frames",
            &[
                "--face".as_ref(),
                face_file.as_os_str(),
                "--frames".as_ref(),
                list_file.as_os_str(),
            ],
        );
        let _ = std::fs::remove_file(&face_file);
        let _ = std::fs::remove_file(&list_file);
        let output = output?;
        if !output.status.success() {
            return Err(command_error("swap-frames", &output));
        }
        Ok(())
    }
}

fn command_error(action: &str, output: &Output) -> EngineError {
    let stderr = String::from_utf8_lossy(&output.stderr);
    format!(
        "engine {action} failed ({}): {}",
        output.status,
        stderr.trim()
    )
    .into()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    // --- Helpers ---

    #[cfg(unix)]
    fn install_fake_engine(dir: &Path, body: &str) -> PathBuf {
        use std::os::unix::fs::PermissionsExt;
        let path = dir.join("engine.sh");
        std::fs::write(&path, format!("#!/bin/sh\n{body}\n")).unwrap();
        let mut perms = std::fs::metadata(&path).unwrap().permissions();
        perms.set_mode(0o755);
        std::fs::set_permissions(&path, perms).unwrap();
        path
    }

    #[cfg(unix)]
    fn engine_with_body(dir: &Path, body: &str) -> CommandSwapEngine {
        let program = install_fake_engine(dir, body);
        CommandSwapEngine::with_scratch(program, TempArtifacts::with_root(dir.to_path_buf()))
    }

    // --- Tests ---

    #[cfg(unix)]
    #[test]
    fn test_detect_reads_descriptor_file() {
        let dir = tempdir().unwrap();
        let engine = engine_with_body(
            dir.path(),
            r#"[ "$1" = detect ] || exit 9; printf 'face-bytes' > "$5""#,
        );
        let image = dir.path().join("portrait.png");
        std::fs::write(&image, b"").unwrap();

        let descriptor = engine.detect_face(&image).unwrap().unwrap();
        assert_eq!(descriptor.bytes(), b"face-bytes");
    }

    #[cfg(unix)]
    #[test]
    fn test_detect_maps_exit_two_to_no_face() {
        let dir = tempdir().unwrap();
        let engine = engine_with_body(dir.path(), "exit 2");
        let image = dir.path().join("empty.png");
        std::fs::write(&image, b"").unwrap();

        assert!(engine.detect_face(&image).unwrap().is_none());
    }

    #[cfg(unix)]
    #[test]
    fn test_detect_failure_carries_stderr() {
        let dir = tempdir().unwrap();
        let engine = engine_with_body(dir.path(), r#"echo "model exploded" >&2; exit 1"#);
        let image = dir.path().join("broken.png");
        std::fs::write(&image, b"").unwrap();

        let err = engine.detect_face(&image).unwrap_err();
        assert!(err.to_string().contains("model exploded"));
    }

    #[cfg(unix)]
    #[test]
    fn test_swap_image_passes_descriptor_and_writes_output() {
        let dir = tempdir().unwrap();
        // Fails unless the descriptor file is non-empty, then marks the output.
        let engine = engine_with_body(
            dir.path(),
            r#"[ "$1" = swap-image ] || exit 9; [ -s "$3" ] || exit 8; printf 'swapped' > "$7""#,
        );
        let target = dir.path().join("target.png");
        std::fs::write(&target, b"").unwrap();
        let output = dir.path().join("out.png");

        let face = FaceDescriptor::new(vec![1, 2, 3]);
        engine.swap_image(&face, &target, &output).unwrap();
        assert_eq!(std::fs::read(&output).unwrap(), b"swapped");
    }

    #[cfg(unix)]
    #[test]
    fn test_swap_frames_overwrites_listed_paths() {
        let dir = tempdir().unwrap();
        let engine = engine_with_body(
            dir.path(),
            r#"[ "$1" = swap-frames ] || exit 9
while read -r frame; do printf 'done' > "$frame"; done < "$5""#,
        );
        let first = dir.path().join("0001.png");
        let second = dir.path().join("0002.png");
        std::fs::write(&first, b"raw").unwrap();
        std::fs::write(&second, b"raw").unwrap();

        let face = FaceDescriptor::new(vec![7]);
        engine
            .swap_frames(&face, &[first.clone(), second.clone()])
            .unwrap();
        assert_eq!(std::fs::read(&first).unwrap(), b"done");
        assert_eq!(std::fs::read(&second).unwrap(), b"done");
    }

    #[cfg(unix)]
    #[test]
    fn test_missing_program_is_an_error() {
        let dir = tempdir().unwrap();
        let engine = CommandSwapEngine::new(dir.path().join("absent-engine"));
        let image = dir.path().join("x.png");
        std::fs::write(&image, b"").unwrap();

        assert!(engine.detect_face(&image).is_err());
    }
}
