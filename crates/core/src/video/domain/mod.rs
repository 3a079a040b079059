pub mod video_toolkit;
