use std::path::{Path, PathBuf};

use uuid::Uuid;

/// Allocates uniquely named artifact paths under one root directory.
///
/// Names are the simple hex form of a fresh v4 uuid plus an extension, so
/// artifacts never collide within or across jobs. The default root is the
/// system temp directory.
#[derive(Clone, Debug)]
pub struct TempArtifacts {
    root: PathBuf,
}

impl TempArtifacts {
    pub fn new() -> Self {
        Self {
            root: std::env::temp_dir(),
        }
    }

    pub fn with_root(root: PathBuf) -> Self {
        Self { root }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn image_output(&self) -> PathBuf {
        self.unique("png")
    }

    pub fn video_output(&self) -> PathBuf {
        self.unique("mp4")
    }

    pub fn unique(&self, extension: &str) -> PathBuf {
        self.root
            .join(format!("{}.{extension}", Uuid::new_v4().simple()))
    }
}

impl Default for TempArtifacts {
    fn default() -> Self {
        Self::new()
    }
}
