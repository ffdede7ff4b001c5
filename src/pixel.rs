use std::path::Path;

use glam::DVec2;
use image::RgbaImage;

use crate::error::Result;
use crate::types::{Circle, LineSegment};

/// Opacity bitmap of one raster frame.
///
/// Pixel `(x, y)` covers the square `[x, x + 1) x [y, y + 1)` in frame
/// coordinates, whose origin is the upper-left corner of the image.
#[derive(Clone, Debug, PartialEq)]
pub struct PixelMask {
    width: u32,
    height: u32,
    bits: Vec<bool>,
}

impl PixelMask {
    pub fn from_fn(width: u32, height: u32, mut opaque: impl FnMut(u32, u32) -> bool) -> Self {
        let mut bits = Vec::with_capacity(width as usize * height as usize);
        for y in 0..height {
            for x in 0..width {
                bits.push(opaque(x, y));
            }
        }
        Self { width, height, bits }
    }

    pub fn filled(width: u32, height: u32, opaque: bool) -> Self {
        Self { width, height, bits: vec![opaque; width as usize * height as usize] }
    }

    /// Any pixel with non-zero alpha is opaque.
    pub fn from_rgba(img: &RgbaImage) -> Self {
        Self::from_fn(img.width(), img.height(), |x, y| img.get_pixel(x, y).0[3] != 0)
    }

    /// Loads an image file and masks it by alpha.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let img = image::open(path.as_ref())?.to_rgba8();
        log::debug!(
            "loaded mask {} ({}x{})",
            path.as_ref().display(),
            img.width(),
            img.height()
        );
        Ok(Self::from_rgba(&img))
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn size(&self) -> DVec2 {
        DVec2::new(self.width as f64, self.height as f64)
    }

    /// Out-of-bounds pixels are transparent.
    pub fn is_opaque(&self, x: i64, y: i64) -> bool {
        if x < 0 || y < 0 || x >= self.width as i64 || y >= self.height as i64 {
            return false;
        }
        self.bits[y as usize * self.width as usize + x as usize]
    }

    pub fn opaque_count(&self) -> usize {
        self.bits.iter().filter(|b| **b).count()
    }
}

/// A mask placed in the world: centered on `center`, turned by `direction`
/// degrees and optionally mirrored, with the same transform order as shapes
/// (rotate, then mirror, then translate).
#[derive(Copy, Clone, Debug)]
pub struct MaskView<'a> {
    pub mask: &'a PixelMask,
    pub center: DVec2,
    pub direction: f64,
    pub mirror_h: bool,
    pub mirror_v: bool,
}

impl MaskView<'_> {
    /// World point to frame coordinates (upper-left origin, pixel units).
    pub fn to_frame(&self, p: DVec2) -> DVec2 {
        let mut local = p - self.center;
        if self.mirror_h {
            local.x = -local.x;
        }
        if self.mirror_v {
            local.y = -local.y;
        }
        if self.direction != 0.0 {
            local = DVec2::from_angle(-self.direction.to_radians()).rotate(local);
        }
        local + self.mask.size() * 0.5
    }

    /// Radius of the circle around `center` that holds the whole frame.
    pub fn circumradius(&self) -> f64 {
        self.mask.size().length() * 0.5
    }
}

/// Samples the single pixel containing the spot.
pub fn spot_hits_mask(p: DVec2, view: &MaskView) -> bool {
    let q = view.to_frame(p);
    view.mask.is_opaque(q.x.floor() as i64, q.y.floor() as i64)
}

/// True if an opaque pixel's index point (its upper-left corner) lies within
/// the circle.
pub fn circle_hits_mask(c: &Circle, view: &MaskView) -> bool {
    if (c.center - view.center).length() > view.circumradius() + c.radius {
        return false;
    }

    // Distances survive the rigid transform, so scan in frame coordinates
    let q = view.to_frame(c.center);
    let r2 = c.radius * c.radius;
    let x0 = (q.x - c.radius).ceil().max(0.0) as i64;
    let y0 = (q.y - c.radius).ceil().max(0.0) as i64;
    let x1 = ((q.x + c.radius).floor() as i64).min(view.mask.width() as i64 - 1);
    let y1 = ((q.y + c.radius).floor() as i64).min(view.mask.height() as i64 - 1);

    for y in y0..=y1 {
        for x in x0..=x1 {
            if !view.mask.is_opaque(x, y) {
                continue;
            }
            let d = DVec2::new(x as f64, y as f64) - q;
            if d.length_squared() <= r2 {
                return true;
            }
        }
    }
    false
}

/// Walks the segment in steps of about one pixel and samples each point.
pub fn line_hits_mask(l: &LineSegment, view: &MaskView) -> bool {
    let steps = l.length().round() as u64;
    if steps == 0 {
        return spot_hits_mask(l.start, view);
    }
    let d = l.vector();
    (0..=steps).any(|k| spot_hits_mask(l.start + d * (k as f64 / steps as f64), view))
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    fn view(mask: &PixelMask, center: DVec2, direction: f64) -> MaskView<'_> {
        MaskView { mask, center, direction, mirror_h: false, mirror_v: false }
    }

    // Opaque only in the left half: x in 0..5 of a 10x10 frame.
    fn left_half() -> PixelMask {
        PixelMask::from_fn(10, 10, |x, _| x < 5)
    }

    #[test]
    fn test_from_rgba_uses_alpha() {
        let mut img = RgbaImage::new(3, 2);
        img.put_pixel(1, 1, image::Rgba([0, 0, 0, 1]));
        img.put_pixel(2, 0, image::Rgba([255, 255, 255, 0]));
        let m = PixelMask::from_rgba(&img);
        assert_eq!(m.opaque_count(), 1);
        assert!(m.is_opaque(1, 1));
        assert!(!m.is_opaque(2, 0));
        assert!(!m.is_opaque(-1, 0));
        assert!(!m.is_opaque(3, 1));
    }

    #[test]
    fn test_to_frame_maps_center_and_rotation() {
        let m = left_half();
        let v = view(&m, DVec2::new(100.0, 50.0), 0.0);
        assert_eq!(v.to_frame(DVec2::new(100.0, 50.0)), DVec2::new(5.0, 5.0));
        assert_eq!(v.to_frame(DVec2::new(95.0, 45.0)), DVec2::ZERO);

        // Turned 90 degrees clockwise: the frame's +x axis points down
        let v = view(&m, DVec2::ZERO, 90.0);
        let q = v.to_frame(DVec2::new(0.0, 3.0));
        assert_abs_diff_eq!(q.x, 8.0, epsilon = 1e-9);
        assert_abs_diff_eq!(q.y, 5.0, epsilon = 1e-9);
    }

    #[test]
    fn test_spot_transparent_and_opaque_under_rotation() {
        let clear = PixelMask::filled(8, 8, false);
        let solid = PixelMask::filled(8, 8, true);
        for step in 0..12 {
            let dir = step as f64 * 30.0;
            let p = DVec2::new(1.3, -0.7);
            assert!(!spot_hits_mask(p, &view(&clear, DVec2::ZERO, dir)));
            assert!(spot_hits_mask(p, &view(&solid, DVec2::ZERO, dir)));
        }
    }

    #[test]
    fn test_spot_follows_rotation_and_mirror() {
        let m = left_half();
        let left = DVec2::new(-2.0, 0.5);
        let right = DVec2::new(2.0, 0.5);
        assert!(spot_hits_mask(left, &view(&m, DVec2::ZERO, 0.0)));
        assert!(!spot_hits_mask(right, &view(&m, DVec2::ZERO, 0.0)));
        // Half a turn swaps the sides
        assert!(!spot_hits_mask(left, &view(&m, DVec2::ZERO, 180.0)));
        assert!(spot_hits_mask(right, &view(&m, DVec2::ZERO, 180.0)));
        // So does a horizontal mirror
        let mirrored = MaskView { mirror_h: true, ..view(&m, DVec2::ZERO, 0.0) };
        assert!(spot_hits_mask(right, &mirrored));
        assert!(!spot_hits_mask(left, &mirrored));
    }

    #[test]
    fn test_circle_hits_mask() {
        let m = left_half();
        let v = view(&m, DVec2::ZERO, 0.0);
        // Nearest opaque pixel points sit at x = -1
        assert!(circle_hits_mask(&Circle::new(DVec2::new(2.0, 0.0), 3.05), &v));
        assert!(!circle_hits_mask(&Circle::new(DVec2::new(2.0, 0.0), 2.95), &v));
        // Outside the circumcircle
        assert!(!circle_hits_mask(&Circle::new(DVec2::new(-40.0, 0.0), 5.0), &v));
        // Circle covering the frame from outside its bounds
        assert!(circle_hits_mask(&Circle::new(DVec2::new(-8.0, 0.0), 4.0), &v));
    }

    #[test]
    fn test_circle_reaches_pixel_corner() {
        let m = PixelMask::from_fn(4, 4, |x, y| x == 0 && y == 0);
        let v = view(&m, DVec2::ZERO, 0.0);
        // Pixel (0, 0) is measured at its corner (-2, -2), 0.849 away
        assert!(circle_hits_mask(&Circle::new(DVec2::new(-2.6, -2.6), 0.85), &v));
        assert!(!circle_hits_mask(&Circle::new(DVec2::new(-2.6, -2.6), 0.8), &v));
        // Its center (-1.5, -1.5) would be inside this circle; the corner is not
        assert!(!circle_hits_mask(&Circle::new(DVec2::new(-1.0, -1.0), 0.8), &v));
    }

    #[test]
    fn test_line_hits_mask() {
        let m = left_half();
        let v = view(&m, DVec2::ZERO, 0.0);
        assert!(line_hits_mask(&LineSegment::new(DVec2::new(4.0, 0.5), DVec2::new(-4.0, 0.5)), &v));
        assert!(!line_hits_mask(&LineSegment::new(DVec2::new(0.5, -4.0), DVec2::new(0.5, 4.0)), &v));
        assert!(!line_hits_mask(&LineSegment::new(DVec2::new(-10.0, -10.0), DVec2::new(-20.0, -10.0)), &v));
        // Zero length samples the start point
        assert!(line_hits_mask(&LineSegment::new(DVec2::new(-1.0, 0.0), DVec2::new(-1.0, 0.0)), &v));
    }
}
