pub mod infrastructure;
pub mod label_cache;
pub mod recognizer;
pub mod throttle;
