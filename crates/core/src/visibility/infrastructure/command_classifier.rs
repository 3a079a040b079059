use std::path::{Path, PathBuf};
use std::process::Command;

use crate::visibility::domain::visibility_classifier::{ClassifierError, VisibilityClassifier};

/// `VisibilityClassifier` adapter driving an external classifier executable.
///
/// Call contract: `<program> score --image I` prints a decimal in
/// `[0.0, 1.0]` on stdout and exits 0. Non-zero exits and unparseable
/// output are errors.
pub struct CommandClassifier {
    program: PathBuf,
}

impl CommandClassifier {
    pub fn new(program: PathBuf) -> Self {
        Self { program }
    }
}

impl VisibilityClassifier for CommandClassifier {
    fn score(&self, image: &Path) -> Result<f64, ClassifierError> {
        let output = Command::new(&self.program)
            .arg("score")
            .arg("--image")
            .arg(image)
            .output()
            .map_err(|e| -> ClassifierError {
                format!("failed to run {}: {e}", self.program.display()).into()
            })?;
        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(format!(
                "classifier failed ({}): {}",
                output.status,
                stderr.trim()
            )
            .into());
        }
        let stdout = String::from_utf8_lossy(&output.stdout);
        let score: f64 = stdout
            .trim()
            .parse()
            .map_err(|_| -> ClassifierError {
                format!("classifier printed no score: {:?}", stdout.trim()).into()
            })?;
        if !(0.0..=1.0).contains(&score) {
            return Err(format!("classifier score out of range: {score}").into());
        }
        Ok(score)
    }
}
