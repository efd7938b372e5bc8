pub mod localizer;
pub mod unprojector;
