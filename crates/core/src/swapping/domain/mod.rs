pub mod face_descriptor;
pub mod face_engine;
