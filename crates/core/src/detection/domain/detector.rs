use thiserror::Error;

use crate::detection::domain::observation::{DetectorKind, Observation};
use crate::shared::frame::ColorImage;
use crate::shared::RequestId;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DetectorError {
    #[error("detector backend failed: {0}")]
    Backend(String),
    #[error("detector worker is no longer running")]
    WorkerGone,
}

/// A request accepted by a detector slot.
///
/// The image travels with the request; everything else needed to interpret
/// the eventual result stays behind in the slot's attachments.
#[derive(Clone, Debug)]
pub struct DetectionRequest {
    pub id: RequestId,
    pub kind: DetectorKind,
    pub image: ColorImage,
}

/// Completion message for one accepted request, delivered exactly once
/// over the pipeline event channel regardless of outcome.
#[derive(Clone, Debug)]
pub struct DetectionResult {
    pub id: RequestId,
    pub kind: DetectorKind,
    pub outcome: Result<Vec<Observation>, DetectorError>,
}

/// Port for an opaque asynchronous detector.
///
/// `submit` must not block on the detection itself; the result comes back
/// later as a [`DetectionResult`] event on whatever thread the backend
/// runs on. A submission error means the request was never accepted and
/// will produce no result.
pub trait DetectorService: Send {
    fn submit(&mut self, request: DetectionRequest) -> Result<(), DetectorError>;
}
