pub mod http_recognizer;
pub mod threaded_recognizer;
