use nalgebra::{Point2, Vector3};

use crate::detection::domain::slot::Attachments;
use crate::localization::unprojector::Unprojector;
use crate::shared::geometry::{plane_transform, Ray};
use crate::shared::viewport::ViewportSize;

/// Fuses a single 2-D detection point with the depth map to recover a
/// world position.
pub struct Localizer {
    unprojector: Box<dyn Unprojector>,
}

impl Localizer {
    pub fn new(unprojector: Box<dyn Unprojector>) -> Self {
        Self { unprojector }
    }

    /// `viewport_point` is the display-space point the unprojector expects;
    /// `detector_point` is the raw detector-space point, which shares the
    /// depth buffer's pixel orientation and is the one used for sampling.
    ///
    /// Returns `None` when the frame carried no depth map, the point
    /// cannot be unprojected, or the resulting ray is degenerate; callers
    /// hide the dependent marker. A zero or negative sampled distance is
    /// passed through unmodified.
    pub fn localize(
        &self,
        viewport_point: Point2<f32>,
        detector_point: Point2<f32>,
        attachments: &Attachments,
        viewport: ViewportSize,
    ) -> Option<Vector3<f32>> {
        let depth = attachments.depth.as_ref()?;

        let plane = plane_transform(&attachments.pose);
        let plane_world =
            self.unprojector
                .unproject(viewport_point, &plane, &attachments.pose, viewport)?;

        // Ray from the camera through the unprojected point; the sampled
        // depth says how far along it the detection sits.
        let ray = Ray::through(attachments.pose.position, plane_world).ok()?;
        let distance = depth.sample(detector_point);
        Some(ray.at(distance))
    }
}
