pub mod threaded_detector;
