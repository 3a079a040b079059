pub mod constants;
pub mod frame_sequence;
pub mod temp_artifacts;
