use std::path::Path;

pub type ClassifierError = Box<dyn std::error::Error + Send + Sync>;

/// Scores how much of an image is problematic to swap into.
///
/// Scores are in `[0.0, 1.0]`; the gate compares them against per-media
/// admission thresholds. Implementations wrap an external classifier model.
pub trait VisibilityClassifier: Send + Sync {
    fn score(&self, image: &Path) -> Result<f64, ClassifierError>;
}
