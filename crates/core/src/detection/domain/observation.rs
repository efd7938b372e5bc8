use nalgebra::Point2;

use crate::shared::viewport::NormalizedRect;

/// The perceptual detectors the pipeline schedules. Each kind owns an
/// independent single-in-flight slot and may be concurrently in flight.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum DetectorKind {
    Face,
    BodyPose,
}

/// Body joints the pose detector can report.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum JointName {
    Nose,
    Neck,
    Root,
    LeftEye,
    RightEye,
    LeftEar,
    RightEar,
    LeftShoulder,
    RightShoulder,
    LeftElbow,
    RightElbow,
    LeftWrist,
    RightWrist,
    LeftHip,
    RightHip,
    LeftKnee,
    RightKnee,
    LeftAnkle,
    RightAnkle,
}

/// A single detection in the detector's own normalized coordinate
/// convention (unit square, origin bottom-left). Must be translated via
/// the coordinate-transform chain before display or localization.
#[derive(Clone, Debug, PartialEq)]
pub enum Observation {
    Face {
        bounds: NormalizedRect,
        confidence: f32,
    },
    Joint {
        name: JointName,
        location: Point2<f32>,
        confidence: f32,
    },
}
