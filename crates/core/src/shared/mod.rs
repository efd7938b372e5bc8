pub mod constants;
pub mod frame;
pub mod geometry;
pub mod viewport;

/// Correlates an asynchronous request with its completion event.
pub type RequestId = u64;
