pub mod detector;
pub mod observation;
pub mod slot;
