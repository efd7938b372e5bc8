use thiserror::Error;

use crate::shared::frame::ColorImage;
use crate::shared::viewport::ViewportRect;
use crate::shared::RequestId;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RecognitionError {
    #[error("recognition service failed: {0}")]
    Service(String),
    #[error("recognition worker is no longer running")]
    WorkerGone,
}

/// One face put forward for identity recognition: its on-screen box and
/// the expanded crop taken from the frame that produced it. Ephemeral,
/// owned by the batch.
#[derive(Clone, Debug)]
pub struct FaceRegion {
    pub bounds: ViewportRect,
    pub crop: ColorImage,
}

/// Request to the external identity service.
#[derive(Clone, Debug)]
pub struct RecognitionRequest {
    pub id: RequestId,
    /// Encoded crop bytes (PNG).
    pub image_bytes: Vec<u8>,
    pub collection_id: String,
    /// Similarity floor in the service's 0-100 scale.
    pub similarity_threshold: f32,
    pub max_results: usize,
}

/// A ranked identity candidate returned by the service. The service
/// applies the similarity threshold; candidates arrive best first.
#[derive(Clone, Debug, PartialEq)]
pub struct RecognitionMatch {
    pub identity: String,
    pub similarity: f32,
}

/// Completion message for one dispatched crop. An empty match list means
/// nobody in the collection cleared the threshold.
#[derive(Clone, Debug)]
pub struct RecognitionResult {
    pub id: RequestId,
    pub outcome: Result<Vec<RecognitionMatch>, RecognitionError>,
}

/// Port for the rate-limited external recognition call.
///
/// Fire-and-forget: results come back as pipeline events. No retry and no
/// backoff beyond the throttle in front of this port.
pub trait RecognitionService: Send {
    fn search(&mut self, request: RecognitionRequest) -> Result<(), RecognitionError>;
}
