use std::time::Duration;

/// Minimum spacing between recognition batches; the identity service is
/// costly and rate-limited per session.
pub const RECOGNITION_MIN_INTERVAL: Duration = Duration::from_secs(1);

/// Similarity floor for identity matches, on the service's 0-100 scale.
pub const DEFAULT_SIMILARITY_THRESHOLD: f32 = 90.0;

/// Upper bound on ranked matches requested per crop.
pub const DEFAULT_MAX_MATCHES: usize = 2;

/// Fraction by which face crops are expanded around the detection box so
/// a tight detector box still captures the whole face.
pub const FACE_CROP_EXPANSION: f32 = 0.25;
