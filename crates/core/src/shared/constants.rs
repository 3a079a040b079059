/// Target images at or below this visibility score are admitted for swapping.
pub const IMAGE_VISIBILITY_THRESHOLD: f64 = 0.7;

/// Sampled video frames at or below this visibility score are admitted.
/// Deliberately looser than the image threshold; do not unify them.
pub const VIDEO_VISIBILITY_THRESHOLD: f64 = 0.8;

/// Max number of frames sampled when screening a video.
pub const VISIBILITY_SAMPLE_LIMIT: usize = 10;

/// Frame rate applied when the caller asks to limit a video's fps.
pub const FPS_LIMIT: u32 = 30;

pub const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "bmp", "tiff", "tif", "webp"];

pub const VIDEO_EXTENSIONS: &[&str] = &["mp4", "mov", "mkv", "avi", "webm"];

/// Extension of the frame images a video is exploded into.
pub const FRAME_EXTENSION: &str = "png";
