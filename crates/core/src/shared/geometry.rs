use nalgebra::{Isometry3, Translation3, UnitQuaternion, Vector3};
use thiserror::Error;

use crate::shared::frame::CameraPose;

#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum GeometryError {
    #[error("cannot normalize a zero-length vector")]
    DegenerateVector,
}

/// `v` scaled to unit length; a zero-magnitude input is degenerate.
pub fn normalized(v: Vector3<f32>) -> Result<Vector3<f32>, GeometryError> {
    let magnitude = v.norm();
    if magnitude == 0.0 {
        return Err(GeometryError::DegenerateVector);
    }
    Ok(v / magnitude)
}

/// A half-line from `origin` along a unit `direction`.
///
/// The direction is normalized on construction and on every mutation, so
/// callers can never observe a non-unit direction.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Ray {
    origin: Vector3<f32>,
    direction: Vector3<f32>,
}

impl Ray {
    pub fn new(origin: Vector3<f32>, direction: Vector3<f32>) -> Result<Self, GeometryError> {
        Ok(Self {
            origin,
            direction: normalized(direction)?,
        })
    }

    /// Ray from `origin` passing through `point`.
    pub fn through(origin: Vector3<f32>, point: Vector3<f32>) -> Result<Self, GeometryError> {
        Ok(Self {
            origin,
            direction: normalized(point - origin)?,
        })
    }

    pub fn origin(&self) -> Vector3<f32> {
        self.origin
    }

    pub fn direction(&self) -> Vector3<f32> {
        self.direction
    }

    pub fn set_direction(&mut self, direction: Vector3<f32>) -> Result<(), GeometryError> {
        self.direction = normalized(direction)?;
        Ok(())
    }

    /// Point at parameter `t` along the ray.
    pub fn at(&self, t: f32) -> Vector3<f32> {
        self.origin + self.direction * t
    }
}

/// Reference plane for unprojection: one unit from the camera along its
/// forward axis and perpendicular to it.
///
/// The plane lies in its local x/z axes with the local z axis following
/// the camera's up vector, which leaves the local y axis (the plane
/// normal) aligned with the camera's forward axis. Fixed, deterministic
/// construction.
pub fn plane_transform(pose: &CameraPose) -> Isometry3<f32> {
    Isometry3::from_parts(
        Translation3::from(pose.position - pose.forward),
        UnitQuaternion::face_towards(&pose.up, &pose.forward),
    )
}
