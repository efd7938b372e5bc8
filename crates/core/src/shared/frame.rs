use std::io::Cursor;
use std::time::Duration;

use nalgebra::{Affine2, Point2, Vector3};
use ndarray::ArrayView3;

/// Contiguous RGB bytes in row-major order.
///
/// Format conversion happens at I/O boundaries only; the pipeline treats
/// pixel data as opaque except for cropping and transport encoding.
#[derive(Clone, Debug, PartialEq)]
pub struct ColorImage {
    data: Vec<u8>,
    width: u32,
    height: u32,
    channels: u8,
}

impl ColorImage {
    pub fn new(data: Vec<u8>, width: u32, height: u32, channels: u8) -> Self {
        debug_assert_eq!(
            data.len(),
            (width as usize) * (height as usize) * (channels as usize),
            "data length must equal width * height * channels"
        );
        Self {
            data,
            width,
            height,
            channels,
        }
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn channels(&self) -> u8 {
        self.channels
    }

    pub fn as_ndarray(&self) -> ArrayView3<'_, u8> {
        ArrayView3::from_shape(
            (
                self.height as usize,
                self.width as usize,
                self.channels as usize,
            ),
            &self.data,
        )
        .expect("ColorImage data length must match dimensions")
    }

    /// Copy of the pixel rectangle, clamped to the image bounds.
    ///
    /// Returns `None` when the clamped intersection is empty.
    pub fn crop(&self, x: i64, y: i64, width: i64, height: i64) -> Option<ColorImage> {
        let x0 = x.clamp(0, self.width as i64);
        let y0 = y.clamp(0, self.height as i64);
        let x1 = x.saturating_add(width).clamp(0, self.width as i64);
        let y1 = y.saturating_add(height).clamp(0, self.height as i64);
        if x1 <= x0 || y1 <= y0 {
            return None;
        }

        let ch = self.channels as usize;
        let src_stride = self.width as usize * ch;
        let (w, h) = ((x1 - x0) as usize, (y1 - y0) as usize);
        let mut data = Vec::with_capacity(w * h * ch);
        for row in y0 as usize..y1 as usize {
            let start = row * src_stride + x0 as usize * ch;
            data.extend_from_slice(&self.data[start..start + w * ch]);
        }
        Some(ColorImage {
            data,
            width: w as u32,
            height: h as u32,
            channels: self.channels,
        })
    }

    /// PNG-encode for transport to the recognition service.
    ///
    /// Returns `None` for non-RGB images or if encoding fails; callers
    /// skip the crop rather than failing the batch.
    pub fn encode_png(&self) -> Option<Vec<u8>> {
        if self.channels != 3 {
            return None;
        }
        let img = image::RgbImage::from_raw(self.width, self.height, self.data.clone())?;
        let mut bytes = Vec::new();
        img.write_to(&mut Cursor::new(&mut bytes), image::ImageFormat::Png)
            .ok()?;
        Some(bytes)
    }
}

/// Per-pixel distances in meters, sharing the detector image's raw pixel
/// orientation (not the display's).
#[derive(Clone, Debug, PartialEq)]
pub struct DepthMap {
    values: Vec<f32>,
    width: usize,
    height: usize,
}

impl DepthMap {
    pub fn new(values: Vec<f32>, width: usize, height: usize) -> Self {
        debug_assert!(width > 0 && height > 0, "depth map must be non-empty");
        debug_assert_eq!(
            values.len(),
            width * height,
            "value count must equal width * height"
        );
        Self {
            values,
            width,
            height,
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    /// Nearest-pixel lookup at a normalized coordinate.
    ///
    /// Each axis rounds `coord * dimension` to an integer index and clamps
    /// it into `[0, dim - 1]`, so out-of-range input silently reads the
    /// boundary pixel instead of indexing out of bounds.
    pub fn sample(&self, point: Point2<f32>) -> f32 {
        let x = ((point.x * self.width as f32).round() as i64).clamp(0, self.width as i64 - 1);
        let y = ((point.y * self.height as f32).round() as i64).clamp(0, self.height as i64 - 1);
        self.values[y as usize * self.width + x as usize]
    }
}

/// Camera pose at capture time. `forward` and `up` are unit axes of the
/// camera frame expressed in world space.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CameraPose {
    pub position: Vector3<f32>,
    pub forward: Vector3<f32>,
    pub up: Vector3<f32>,
}

/// One captured sensor frame.
///
/// Immutable once produced and owned by the pipeline invocation that
/// receives it; detector slots retain only the pieces their accepted
/// request needs to interpret the eventual result.
#[derive(Clone, Debug)]
pub struct Frame {
    pub color: ColorImage,
    pub depth: Option<DepthMap>,
    pub pose: CameraPose,
    /// Maps normalized detector output (after the vertical flip) into the
    /// normalized display viewport; accounts for the sensor-to-display
    /// rotation of the current device orientation.
    pub display_transform: Affine2<f32>,
    /// Capture time relative to session start.
    pub timestamp: Duration,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn gradient_image(width: u32, height: u32) -> ColorImage {
        let mut data = Vec::with_capacity((width * height * 3) as usize);
        for row in 0..height {
            for col in 0..width {
                data.extend_from_slice(&[row as u8, col as u8, 0]);
            }
        }
        ColorImage::new(data, width, height, 3)
    }

    #[test]
    fn test_image_construction_and_accessors() {
        let image = ColorImage::new(vec![0u8; 12], 2, 2, 3);
        assert_eq!(image.width(), 2);
        assert_eq!(image.height(), 2);
        assert_eq!(image.channels(), 3);
        assert_eq!(image.data().len(), 12);
    }

    #[test]
    fn test_as_ndarray_shape_and_access() {
        let image = gradient_image(4, 2);
        let arr = image.as_ndarray();
        assert_eq!(arr.shape(), &[2, 4, 3]); // (height, width, channels)
        assert_eq!(arr[[1, 3, 0]], 1); // row
        assert_eq!(arr[[1, 3, 1]], 3); // col
    }

    #[test]
    fn test_crop_interior() {
        let image = gradient_image(8, 8);
        let crop = image.crop(2, 3, 4, 2).unwrap();
        assert_eq!(crop.width(), 4);
        assert_eq!(crop.height(), 2);
        // First pixel of the crop is source pixel (col=2, row=3).
        assert_eq!(crop.data()[0], 3);
        assert_eq!(crop.data()[1], 2);
    }

    #[test]
    fn test_crop_clamps_to_bounds() {
        let image = gradient_image(8, 8);
        let crop = image.crop(-4, -4, 8, 8).unwrap();
        assert_eq!(crop.width(), 4);
        assert_eq!(crop.height(), 4);
        assert_eq!(crop.data()[0], 0);
    }

    #[test]
    fn test_crop_outside_returns_none() {
        let image = gradient_image(8, 8);
        assert!(image.crop(10, 0, 4, 4).is_none());
        assert!(image.crop(0, -5, 4, 5).is_none());
        assert!(image.crop(0, 0, 0, 4).is_none());
    }

    #[test]
    fn test_encode_png_roundtrips_dimensions() {
        let image = gradient_image(5, 4);
        let bytes = image.encode_png().unwrap();
        let decoded = image::load_from_memory(&bytes).unwrap();
        assert_eq!(decoded.width(), 5);
        assert_eq!(decoded.height(), 4);
    }

    #[test]
    fn test_encode_png_rejects_non_rgb() {
        let image = ColorImage::new(vec![0u8; 16], 2, 2, 4);
        assert!(image.encode_png().is_none());
    }

    // ── Depth sampling ───────────────────────────────────────────────

    fn depth_map_4x4() -> DepthMap {
        // Row-major values 0..16 so each pixel is identifiable.
        DepthMap::new((0..16).map(|v| v as f32).collect(), 4, 4)
    }

    #[test]
    fn test_sample_center() {
        let depth = depth_map_4x4();
        // (0.5, 0.5) rounds to pixel (2, 2) -> value 10.
        assert_eq!(depth.sample(Point2::new(0.5, 0.5)), 10.0);
    }

    #[rstest]
    #[case::origin(0.0, 0.0, 0.0)]
    #[case::far_corner(1.0, 1.0, 15.0)]
    #[case::below_range(-0.5, -0.5, 0.0)]
    #[case::above_range(2.0, 2.0, 15.0)]
    fn test_sample_clamps_to_boundary_pixels(#[case] x: f32, #[case] y: f32, #[case] expected: f32) {
        let depth = depth_map_4x4();
        assert_eq!(depth.sample(Point2::new(x, y)), expected);
    }

    #[test]
    fn test_sample_rounds_to_nearest_pixel() {
        let depth = depth_map_4x4();
        // 0.3 * 4 = 1.2 -> pixel 1; 0.4 * 4 = 1.6 -> pixel 2.
        assert_eq!(depth.sample(Point2::new(0.3, 0.0)), 1.0);
        assert_eq!(depth.sample(Point2::new(0.4, 0.0)), 2.0);
    }

    #[test]
    fn test_sample_single_pixel_map() {
        let depth = DepthMap::new(vec![2.5], 1, 1);
        assert_eq!(depth.sample(Point2::new(0.0, 0.0)), 2.5);
        assert_eq!(depth.sample(Point2::new(1.0, 1.0)), 2.5);
    }
}
