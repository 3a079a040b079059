pub mod ffmpeg_toolkit;
