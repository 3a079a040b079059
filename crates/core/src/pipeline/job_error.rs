use std::path::PathBuf;

use thiserror::Error;

/// Terminal failure of a swap job. No kind is retried; the first failure
/// halts the job and surfaces to the caller.
#[derive(Error, Debug)]
pub enum JobError {
    #[error("no face found in source image {}", .0.display())]
    NoSourceFace(PathBuf),
    #[error(
        "target {} rejected: visibility score {:.2} exceeds threshold {}",
        .path.display(),
        .score,
        .threshold
    )]
    AmbiguousTarget {
        path: PathBuf,
        score: f64,
        threshold: f64,
    },
    #[error("no frames extracted into {}", .dir.display())]
    Extraction { dir: PathBuf },
    #[error("swap engine failed: {0}")]
    SwapEngine(#[source] Box<dyn std::error::Error + Send + Sync>),
    #[error("visibility classifier failed: {0}")]
    Classifier(#[source] Box<dyn std::error::Error + Send + Sync>),
    #[error("video toolkit failed: {0}")]
    Toolkit(#[source] Box<dyn std::error::Error + Send + Sync>),
    #[error("worker pool failure: {0}")]
    PoolWorker(String),
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_source_face_names_the_image() {
        let err = JobError::NoSourceFace(PathBuf::from("/in/portrait.png"));
        assert_eq!(err.to_string(), "no face found in source image /in/portrait.png");
    }

    #[test]
    fn test_ambiguous_target_reports_score_and_threshold() {
        let err = JobError::AmbiguousTarget {
            path: PathBuf::from("/in/frame_4.png"),
            score: 0.91,
            threshold: 0.8,
        };
        let message = err.to_string();
        assert!(message.contains("0.91"));
        assert!(message.contains("0.8"));
        assert!(message.contains("frame_4.png"));
    }

    #[test]
    fn test_swap_engine_keeps_source_chain() {
        let inner: Box<dyn std::error::Error + Send + Sync> = "gpu fell over".into();
        let err = JobError::SwapEngine(inner);
        assert!(std::error::Error::source(&err).is_some());
    }
}
