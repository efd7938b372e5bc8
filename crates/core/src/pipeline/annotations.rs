use nalgebra::{Point2, Vector3};

use crate::detection::domain::observation::JointName;
use crate::recognition::label_cache::LabelEntry;
use crate::shared::viewport::ViewportRect;

/// Everything the overlay needs to draw for the current frame.
///
/// A plain value handed to the renderer; the pipeline keeps the mutable
/// state behind it.
#[derive(Clone, Debug, Default)]
pub struct FrameAnnotations {
    /// Face boxes in viewport pixels, one per face in the latest result.
    pub face_boxes: Vec<ViewportRect>,
    /// Detected body joints in viewport pixels.
    pub joints: Vec<(JointName, Point2<f32>)>,
    /// Visible identity labels, sorted by identity.
    pub labels: Vec<LabelEntry>,
    /// World-space position of the tracked joint, when depth allowed it.
    pub marker: Option<Vector3<f32>>,
}
