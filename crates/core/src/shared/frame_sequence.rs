use std::io;
use std::path::{Path, PathBuf};

use crate::shared::constants::FRAME_EXTENSION;

/// An ordered sequence of frame image paths belonging to one video job.
///
/// Ordering is strictly numeric on the index embedded in each file stem,
/// never lexicographic: `frame_9.png` sorts before `frame_10.png`.
#[derive(Clone, Debug)]
pub struct FrameSequence {
    frames: Vec<PathBuf>,
}

impl FrameSequence {
    /// Collects the frame images in `dir`, sorted ascending by embedded index.
    ///
    /// Files whose stem carries no trailing integer are skipped with a
    /// warning; non-frame extensions are ignored.
    pub fn scan(dir: &Path) -> io::Result<Self> {
        let mut indexed: Vec<(u64, PathBuf)> = Vec::new();
        for entry in std::fs::read_dir(dir)? {
            let path = entry?.path();
            if !has_frame_extension(&path) {
                continue;
            }
            match frame_index(&path) {
                Some(index) => indexed.push((index, path)),
                None => log::warn!("skipping frame without numeric index: {}", path.display()),
            }
        }
        indexed.sort_by_key(|(index, _)| *index);
        Ok(Self {
            frames: indexed.into_iter().map(|(_, path)| path).collect(),
        })
    }

    pub fn paths(&self) -> &[PathBuf] {
        &self.frames
    }

    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }
}

/// Parses the frame index embedded in a path's file stem: the trailing run
/// of ASCII digits (`frame_0042` -> 42, `0001` -> 1).
pub fn frame_index(path: &Path) -> Option<u64> {
    let stem = path.file_stem()?.to_str()?;
    let prefix = stem.trim_end_matches(|c: char| c.is_ascii_digit());
    let digits = &stem[prefix.len()..];
    if digits.is_empty() {
        return None;
    }
    digits.parse().ok()
}

fn has_frame_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.eq_ignore_ascii_case(FRAME_EXTENSION))
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use tempfile::tempdir;

    fn touch(dir: &Path, name: &str) {
        std::fs::write(dir.join(name), b"").unwrap();
    }

    #[rstest]
    #[case("frame_0042.png", Some(42))]
    #[case("0001.png", Some(1))]
    #[case("shot7.png", Some(7))]
    #[case("frame.png", None)]
    #[case("12abc.png", None)]
    fn test_frame_index_parsing(#[case] name: &str, #[case] expected: Option<u64>) {
        assert_eq!(frame_index(Path::new(name)), expected);
    }

    #[test]
    fn test_scan_orders_numerically_not_lexicographically() {
        let dir = tempdir().unwrap();
        for name in ["frame_10.png", "frame_9.png", "frame_1.png", "frame_2.png"] {
            touch(dir.path(), name);
        }
        let sequence = FrameSequence::scan(dir.path()).unwrap();
        let names: Vec<_> = sequence
            .paths()
            .iter()
            .map(|p| p.file_name().unwrap().to_str().unwrap().to_string())
            .collect();
        assert_eq!(
            names,
            ["frame_1.png", "frame_2.png", "frame_9.png", "frame_10.png"]
        );
    }

    #[test]
    fn test_scan_handles_zero_padded_names() {
        let dir = tempdir().unwrap();
        for index in [3, 12, 1, 7] {
            touch(dir.path(), &format!("{index:04}.png"));
        }
        let sequence = FrameSequence::scan(dir.path()).unwrap();
        let indexes: Vec<_> = sequence
            .paths()
            .iter()
            .map(|p| frame_index(p).unwrap())
            .collect();
        assert_eq!(indexes, [1, 3, 7, 12]);
    }

    #[test]
    fn test_scan_skips_unindexed_files() {
        let dir = tempdir().unwrap();
        touch(dir.path(), "cover.png");
        touch(dir.path(), "frame_3.png");
        let sequence = FrameSequence::scan(dir.path()).unwrap();
        assert_eq!(sequence.len(), 1);
        assert_eq!(
            sequence.paths()[0].file_name().unwrap().to_str().unwrap(),
            "frame_3.png"
        );
    }

    #[test]
    fn test_scan_ignores_other_extensions() {
        let dir = tempdir().unwrap();
        touch(dir.path(), "0001.png");
        touch(dir.path(), "clip.mp4");
        touch(dir.path(), "notes.txt");
        let sequence = FrameSequence::scan(dir.path()).unwrap();
        assert_eq!(sequence.len(), 1);
    }

    #[test]
    fn test_scan_empty_directory_is_empty_sequence() {
        let dir = tempdir().unwrap();
        let sequence = FrameSequence::scan(dir.path()).unwrap();
        assert!(sequence.is_empty());
    }

    #[test]
    fn test_scan_missing_directory_is_error() {
        let dir = tempdir().unwrap();
        let missing = dir.path().join("absent");
        assert!(FrameSequence::scan(&missing).is_err());
    }
}
