pub mod face_gate;
pub mod frame_store;
pub mod job_config;
pub mod job_error;
pub mod reassembler;
pub mod swap_dispatcher;
pub mod swap_image_use_case;
pub mod swap_video_use_case;
pub mod worker_pool;
