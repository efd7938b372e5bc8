use nalgebra::{Affine2, Point2};

/// On-screen viewport dimensions in display pixels.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ViewportSize {
    pub width: f32,
    pub height: f32,
}

impl ViewportSize {
    pub fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }
}

/// Axis-aligned rectangle in a detector's normalized output space
/// (unit square, origin bottom-left).
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct NormalizedRect {
    pub min: Point2<f32>,
    pub max: Point2<f32>,
}

impl NormalizedRect {
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            min: Point2::new(x, y),
            max: Point2::new(x + width, y + height),
        }
    }

    pub fn width(&self) -> f32 {
        self.max.x - self.min.x
    }

    pub fn height(&self) -> f32 {
        self.max.y - self.min.y
    }
}

/// Axis-aligned rectangle in display pixels (origin top-left).
///
/// Derived from a [`NormalizedRect`]; never mutated after creation.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ViewportRect {
    pub min: Point2<f32>,
    pub max: Point2<f32>,
}

impl ViewportRect {
    pub fn width(&self) -> f32 {
        self.max.x - self.min.x
    }

    pub fn height(&self) -> f32 {
        self.max.y - self.min.y
    }

    pub fn center(&self) -> Point2<f32> {
        Point2::new(
            (self.min.x + self.max.x) * 0.5,
            (self.min.y + self.max.y) * 0.5,
        )
    }
}

/// Detector space to display pixels.
///
/// The detector's origin is bottom-left, so the vertical axis flips first;
/// the display transform then maps the normalized frame into the normalized
/// viewport, and the result scales to pixels.
pub fn detector_point_to_viewport(
    point: Point2<f32>,
    display: &Affine2<f32>,
    viewport: ViewportSize,
) -> Point2<f32> {
    let flipped = Point2::new(point.x, 1.0 - point.y);
    let mapped = display * flipped;
    Point2::new(mapped.x * viewport.width, mapped.y * viewport.height)
}

/// Exact inverse of [`detector_point_to_viewport`] for invertible display
/// transforms.
pub fn viewport_point_to_detector(
    point: Point2<f32>,
    display: &Affine2<f32>,
    viewport: ViewportSize,
) -> Point2<f32> {
    let unscaled = Point2::new(point.x / viewport.width, point.y / viewport.height);
    let unmapped = display.inverse() * unscaled;
    Point2::new(unmapped.x, 1.0 - unmapped.y)
}

/// Transforms the min and max corners independently and rebuilds the rect
/// from component-wise extrema, so flipping transforms still produce a
/// well-formed rectangle.
pub fn detector_rect_to_viewport(
    rect: &NormalizedRect,
    display: &Affine2<f32>,
    viewport: ViewportSize,
) -> ViewportRect {
    let a = detector_point_to_viewport(rect.min, display, viewport);
    let b = detector_point_to_viewport(rect.max, display, viewport);
    ViewportRect {
        min: Point2::new(a.x.min(b.x), a.y.min(b.y)),
        max: Point2::new(a.x.max(b.x), a.y.max(b.y)),
    }
}
