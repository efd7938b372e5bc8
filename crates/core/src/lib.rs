//! Live frame annotation pipeline.
//!
//! Ingests camera frames (color + depth + pose), schedules asynchronous
//! perceptual detectors with a single-in-flight gate per detector, fuses
//! 2-D detections with the depth map to recover 3-D world positions, and
//! forwards face crops to a throttled external identity service whose
//! results feed a label cache.
//!
//! Everything outside the pipeline (frame acquisition, overlay rendering,
//! detector backends, the recognition service) is a trait port.

pub mod detection;
pub mod localization;
pub mod pipeline;
pub mod recognition;
pub mod shared;
