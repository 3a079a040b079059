//! Face-swap orchestration over still images and video.
//!
//! The pixel-level swap engine and the visibility classifier are external
//! collaborators behind the `swapping` and `visibility` domain traits; this
//! crate sequences validation, frame extraction, dispatch and reassembly
//! around them.

pub mod pipeline;
pub mod shared;
pub mod swapping;
pub mod video;
pub mod visibility;
