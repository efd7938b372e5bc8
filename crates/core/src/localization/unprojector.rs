use nalgebra::{Isometry3, Point2, Vector3};

use crate::shared::frame::CameraPose;
use crate::shared::geometry::normalized;
use crate::shared::viewport::ViewportSize;

/// Port for the camera collaborator that maps a viewport point onto a
/// reference plane in world space.
///
/// `None` means the point cannot be unprojected (no intersection within
/// the viewport, or an invalid pose); the caller hides whatever visual
/// depended on it.
pub trait Unprojector: Send {
    fn unproject(
        &self,
        viewport_point: Point2<f32>,
        plane: &Isometry3<f32>,
        pose: &CameraPose,
        viewport: ViewportSize,
    ) -> Option<Vector3<f32>>;
}

/// Symmetric-frustum unprojection.
///
/// Casts the camera ray through the viewport point and takes the point at
/// the reference plane's distance along that ray. The plane's local y axis
/// is its normal (see `plane_transform`); the plane may sit on either side
/// of the camera, so the intersection distance is taken absolute. The
/// plane is a distance reference, not a surface.
pub struct PinholeUnprojector {
    vertical_fov: f32,
}

impl PinholeUnprojector {
    /// 60 degrees, a typical phone camera vertical field of view.
    pub const DEFAULT_VERTICAL_FOV: f32 = std::f32::consts::FRAC_PI_3;

    pub fn new(vertical_fov: f32) -> Self {
        Self { vertical_fov }
    }
}

impl Default for PinholeUnprojector {
    fn default() -> Self {
        Self::new(Self::DEFAULT_VERTICAL_FOV)
    }
}

impl Unprojector for PinholeUnprojector {
    fn unproject(
        &self,
        viewport_point: Point2<f32>,
        plane: &Isometry3<f32>,
        pose: &CameraPose,
        viewport: ViewportSize,
    ) -> Option<Vector3<f32>> {
        if viewport.width <= 0.0 || viewport.height <= 0.0 {
            return None;
        }

        // Viewport pixels (top-left origin) to normalized device
        // coordinates with y up.
        let ndc_x = viewport_point.x / viewport.width * 2.0 - 1.0;
        let ndc_y = 1.0 - viewport_point.y / viewport.height * 2.0;

        let aspect = viewport.width / viewport.height;
        let tan_half = (self.vertical_fov * 0.5).tan();
        let right = pose.up.cross(&pose.forward);
        let direction = normalized(
            pose.forward + right * (ndc_x * tan_half * aspect) + pose.up * (ndc_y * tan_half),
        )
        .ok()?;

        let normal = plane.rotation * Vector3::y();
        let denom = normal.dot(&direction);
        if denom.abs() < 1e-6 {
            return None; // ray parallel to the plane
        }
        let t = normal.dot(&(plane.translation.vector - pose.position)) / denom;
        if t == 0.0 {
            return None;
        }
        Some(pose.position + direction * t.abs())
    }
}
