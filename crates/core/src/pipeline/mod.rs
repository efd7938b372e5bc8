pub mod annotations;
pub mod events;
pub mod frame_pipeline;
