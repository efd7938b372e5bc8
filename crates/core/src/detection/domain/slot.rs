use nalgebra::Affine2;

use crate::shared::frame::{CameraPose, ColorImage, DepthMap};
use crate::shared::RequestId;

/// Frame-derived context recorded when a request is accepted, needed to
/// interpret the eventual result.
///
/// The color image is retained only for detectors that crop from it
/// (faces); the depth map only for detectors whose results localize
/// (body pose). Nothing else of the frame outlives the submission.
#[derive(Clone, Debug)]
pub struct Attachments {
    pub image: Option<ColorImage>,
    pub depth: Option<DepthMap>,
    pub display_transform: Affine2<f32>,
    pub pose: CameraPose,
}

/// Admission gate allowing at most one outstanding request per detector.
///
/// The external detector has unbounded, variable latency; refusing new
/// submissions while one is in flight bounds queue growth and keeps the
/// overlay within one frame of staleness.
#[derive(Debug, Default)]
pub struct DetectorSlot {
    awaiting: Option<(RequestId, Attachments)>,
}

impl DetectorSlot {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_idle(&self) -> bool {
        self.awaiting.is_none()
    }

    /// Accepts a request if the slot is empty. Returns `false` and changes
    /// nothing while an earlier request is still in flight.
    pub fn begin(&mut self, id: RequestId, attachments: Attachments) -> bool {
        if self.awaiting.is_some() {
            return false;
        }
        self.awaiting = Some((id, attachments));
        true
    }

    /// Clears the slot and hands back the attachments for a completed
    /// request.
    ///
    /// The transition to idle happens before the caller can run any other
    /// side effect, so a failed or empty result can never wedge the
    /// detector. A result for an id the slot is not awaiting is refused
    /// and leaves the slot untouched.
    pub fn complete(&mut self, id: RequestId) -> Option<Attachments> {
        match self.awaiting.take() {
            Some((awaited, attachments)) if awaited == id => Some(attachments),
            other => {
                self.awaiting = other;
                None
            }
        }
    }

    /// Rolls back an accepted request whose submission failed.
    pub fn reset(&mut self) {
        self.awaiting = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nalgebra::Vector3;

    fn attachments() -> Attachments {
        Attachments {
            image: None,
            depth: None,
            display_transform: Affine2::identity(),
            pose: CameraPose {
                position: Vector3::zeros(),
                forward: Vector3::z(),
                up: Vector3::y(),
            },
        }
    }

    #[test]
    fn test_begins_only_when_idle() {
        let mut slot = DetectorSlot::new();
        assert!(slot.is_idle());
        assert!(slot.begin(1, attachments()));
        assert!(!slot.is_idle());
        assert!(!slot.begin(2, attachments()));
    }

    #[test]
    fn test_complete_returns_attachments_and_clears() {
        let mut slot = DetectorSlot::new();
        slot.begin(7, attachments());
        assert!(slot.complete(7).is_some());
        assert!(slot.is_idle());
        // Completing again is a no-op.
        assert!(slot.complete(7).is_none());
    }

    #[test]
    fn test_mismatched_id_is_refused() {
        let mut slot = DetectorSlot::new();
        slot.begin(7, attachments());
        assert!(slot.complete(8).is_none());
        // The in-flight request is still awaited.
        assert!(!slot.is_idle());
        assert!(slot.complete(7).is_some());
    }

    #[test]
    fn test_reset_rolls_back_accepted_request() {
        let mut slot = DetectorSlot::new();
        slot.begin(3, attachments());
        slot.reset();
        assert!(slot.is_idle());
        assert!(slot.begin(4, attachments()));
    }
}
