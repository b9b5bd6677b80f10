//! Raster render targets.
//!
//! A [`Surface`] is a row-major grid of [`Color`]s. A [`Pen`] is a cursor over
//! a surface used for sequential row/column writes. [`RendDesc`] maps pixel
//! indices to world-space points.

use crate::color::Color;
use crate::error::LayerError;
use crate::geometry::{Point, Rect};

/// A 2D grid of colors in row-major order.
#[derive(Debug, Clone, PartialEq)]
pub struct Surface {
    width: usize,
    height: usize,
    data: Vec<Color>,
}

impl Surface {
    /// Creates a transparent surface.
    ///
    /// Returns `LayerError::InvalidDimensions` if either dimension is zero or
    /// `width * height` overflows.
    pub fn new(width: usize, height: usize) -> Result<Self, LayerError> {
        Self::filled(width, height, Color::TRANSPARENT)
    }

    /// Creates a surface filled with `color`.
    pub fn filled(width: usize, height: usize, color: Color) -> Result<Self, LayerError> {
        let len = checked_area(width, height)?;
        Ok(Self {
            width,
            height,
            data: vec![color; len],
        })
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn data(&self) -> &[Color] {
        &self.data
    }

    pub fn data_mut(&mut self) -> &mut [Color] {
        &mut self.data
    }

    /// Resizes to `width x height` and clears to transparent.
    pub fn set_wh(&mut self, width: usize, height: usize) -> Result<(), LayerError> {
        let len = checked_area(width, height)?;
        self.width = width;
        self.height = height;
        self.data.clear();
        self.data.resize(len, Color::TRANSPARENT);
        Ok(())
    }

    pub fn fill(&mut self, color: Color) {
        self.data.fill(color);
    }

    /// Pixel at `(x, y)`, or `None` out of bounds.
    pub fn get(&self, x: usize, y: usize) -> Option<Color> {
        (x < self.width && y < self.height).then(|| self.data[y * self.width + x])
    }

    /// Writes a pixel. Out-of-bounds writes are ignored.
    pub fn set(&mut self, x: usize, y: usize, color: Color) {
        if x < self.width && y < self.height {
            self.data[y * self.width + x] = color;
        }
    }

    /// A pen positioned at the top-left pixel.
    pub fn begin(&mut self) -> Pen<'_> {
        Pen {
            surface: self,
            x: 0,
            y: 0,
        }
    }

    /// Nearest-pixel lookup at fractional pixel coordinates, clamped to the edges.
    pub fn sample_nearest(&self, fx: f64, fy: f64) -> Color {
        let x = clamp_index(fx.round(), self.width);
        let y = clamp_index(fy.round(), self.height);
        self.data[y * self.width + x]
    }

    /// Bilinear lookup at fractional pixel coordinates, clamped to the edges.
    ///
    /// Interpolates premultiplied colors so transparent neighbors do not bleed
    /// their (meaningless) color channels.
    pub fn sample_linear(&self, fx: f64, fy: f64) -> Color {
        let max_x = (self.width - 1) as f64;
        let max_y = (self.height - 1) as f64;
        let fx = if fx.is_nan() { 0.0 } else { fx.clamp(0.0, max_x) };
        let fy = if fy.is_nan() { 0.0 } else { fy.clamp(0.0, max_y) };
        let x0 = fx.floor() as usize;
        let y0 = fy.floor() as usize;
        let x1 = (x0 + 1).min(self.width - 1);
        let y1 = (y0 + 1).min(self.height - 1);
        let tx = fx - x0 as f64;
        let ty = fy - y0 as f64;

        let px = |x: usize, y: usize| self.data[y * self.width + x].premultiplied();
        let top = px(x0, y0).lerp(px(x1, y0), tx);
        let bottom = px(x0, y1).lerp(px(x1, y1), tx);
        Color::from_premultiplied(top.lerp(bottom, ty))
    }
}

fn checked_area(width: usize, height: usize) -> Result<usize, LayerError> {
    if width == 0 || height == 0 {
        return Err(LayerError::InvalidDimensions);
    }
    width
        .checked_mul(height)
        .ok_or(LayerError::InvalidDimensions)
}

fn clamp_index(v: f64, len: usize) -> usize {
    if v.is_nan() || v <= 0.0 {
        0
    } else {
        (v as usize).min(len - 1)
    }
}

/// A write cursor over a [`Surface`].
///
/// Movement never panics; reads and writes outside the surface are no-ops
/// returning transparent.
pub struct Pen<'a> {
    surface: &'a mut Surface,
    x: usize,
    y: usize,
}

impl Pen<'_> {
    pub fn x(&self) -> usize {
        self.x
    }

    pub fn y(&self) -> usize {
        self.y
    }

    pub fn get_value(&self) -> Color {
        self.surface.get(self.x, self.y).unwrap_or(Color::TRANSPARENT)
    }

    pub fn put_value(&mut self, color: Color) {
        self.surface.set(self.x, self.y, color);
    }

    pub fn inc_x(&mut self) {
        self.x += 1;
    }

    pub fn dec_x(&mut self, n: usize) {
        self.x = self.x.saturating_sub(n);
    }

    pub fn inc_y(&mut self) {
        self.y += 1;
    }
}

/// Render description: target size and the world-space window it covers.
///
/// Pixel `(x, y)` samples the world point `tl + (x * pw, y * ph)`. `pw` and
/// `ph` may be negative (e.g. y-up worlds with `tl.y > br.y`).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RendDesc {
    width: usize,
    height: usize,
    tl: Point,
    br: Point,
}

impl RendDesc {
    /// Returns `LayerError::InvalidDimensions` for zero or overflowing sizes.
    pub fn new(width: usize, height: usize, tl: Point, br: Point) -> Result<Self, LayerError> {
        checked_area(width, height)?;
        Ok(Self {
            width,
            height,
            tl,
            br,
        })
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn tl(&self) -> Point {
        self.tl
    }

    pub fn br(&self) -> Point {
        self.br
    }

    /// World-space width of one pixel.
    pub fn pw(&self) -> f64 {
        (self.br.x - self.tl.x) / self.width as f64
    }

    /// World-space height of one pixel.
    pub fn ph(&self) -> f64 {
        (self.br.y - self.tl.y) / self.height as f64
    }

    /// World point sampled by pixel `(x, y)`.
    pub fn point_at(&self, x: usize, y: usize) -> Point {
        Point::new(
            self.tl.x + x as f64 * self.pw(),
            self.tl.y + y as f64 * self.ph(),
        )
    }

    /// Fractional pixel coordinates of a world point (inverse of [`RendDesc::point_at`]).
    pub fn pixel_of(&self, p: Point) -> (f64, f64) {
        ((p.x - self.tl.x) / self.pw(), (p.y - self.tl.y) / self.ph())
    }

    /// The world-space rectangle covered.
    pub fn rect(&self) -> Rect {
        Rect::from_corners(self.tl, self.br)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_rejects_zero_and_overflow() {
        assert!(matches!(
            Surface::new(0, 4),
            Err(LayerError::InvalidDimensions)
        ));
        assert!(matches!(
            Surface::new(usize::MAX, 2),
            Err(LayerError::InvalidDimensions)
        ));
        assert!(RendDesc::new(4, 0, Point::ZERO, Point::ONE).is_err());
    }

    #[test]
    fn new_surface_is_transparent() {
        let s = Surface::new(3, 2).unwrap();
        assert_eq!(s.data().len(), 6);
        assert!(s.data().iter().all(|&c| c == Color::TRANSPARENT));
    }

    #[test]
    fn get_and_set_respect_bounds() {
        let mut s = Surface::new(2, 2).unwrap();
        s.set(1, 1, Color::WHITE);
        s.set(5, 5, Color::WHITE);
        assert_eq!(s.get(1, 1), Some(Color::WHITE));
        assert_eq!(s.get(2, 0), None);
    }

    #[test]
    fn set_wh_resizes_and_clears() {
        let mut s = Surface::filled(2, 2, Color::WHITE).unwrap();
        s.set_wh(3, 1).unwrap();
        assert_eq!((s.width(), s.height()), (3, 1));
        assert!(s.data().iter().all(|&c| c == Color::TRANSPARENT));
    }

    #[test]
    fn pen_walks_rows() {
        let mut s = Surface::new(3, 2).unwrap();
        let w = s.width();
        let h = s.height();
        {
            let mut pen = s.begin();
            let mut v = 0.0;
            for _ in 0..h {
                for _ in 0..w {
                    pen.put_value(Color::new(v, 0.0, 0.0, 1.0));
                    v += 1.0;
                    pen.inc_x();
                }
                pen.dec_x(w);
                pen.inc_y();
            }
        }
        let reds: Vec<f64> = s.data().iter().map(|c| c.r).collect();
        assert_eq!(reds, vec![0.0, 1.0, 2.0, 3.0, 4.0, 5.0]);
    }

    #[test]
    fn pen_out_of_bounds_is_harmless() {
        let mut s = Surface::new(1, 1).unwrap();
        let mut pen = s.begin();
        pen.inc_x();
        pen.put_value(Color::WHITE);
        assert_eq!(pen.get_value(), Color::TRANSPARENT);
        pen.dec_x(10);
        assert_eq!(pen.x(), 0);
    }

    #[test]
    fn sample_linear_interpolates_between_pixels() {
        let mut s = Surface::new(2, 1).unwrap();
        s.set(0, 0, Color::BLACK);
        s.set(1, 0, Color::WHITE);
        let mid = s.sample_linear(0.5, 0.0);
        assert!((mid.r - 0.5).abs() < 1e-12);
        assert_eq!(s.sample_linear(-4.0, 0.0), Color::BLACK);
        assert_eq!(s.sample_linear(9.0, 3.0), Color::WHITE);
    }

    #[test]
    fn sample_linear_ignores_color_of_transparent_neighbor() {
        let mut s = Surface::new(2, 1).unwrap();
        s.set(0, 0, Color::new(1.0, 0.0, 0.0, 1.0));
        s.set(1, 0, Color::new(0.0, 1.0, 0.0, 0.0));
        let mid = s.sample_linear(0.5, 0.0);
        assert!((mid.r - 1.0).abs() < 1e-12);
        assert!(mid.g.abs() < 1e-12);
        assert!((mid.a - 0.5).abs() < 1e-12);
    }

    #[test]
    fn sample_nearest_rounds() {
        let mut s = Surface::new(2, 1).unwrap();
        s.set(1, 0, Color::WHITE);
        assert_eq!(s.sample_nearest(0.6, 0.0), Color::WHITE);
        assert_eq!(s.sample_nearest(0.4, 0.0), Color::TRANSPARENT);
    }

    #[test]
    fn rend_desc_maps_pixels_to_world() {
        let d = RendDesc::new(4, 2, Point::new(-2.0, 1.0), Point::new(2.0, -1.0)).unwrap();
        assert_eq!(d.pw(), 1.0);
        assert_eq!(d.ph(), -1.0);
        assert_eq!(d.point_at(0, 0), Point::new(-2.0, 1.0));
        assert_eq!(d.point_at(3, 1), Point::new(1.0, 0.0));
        assert_eq!(d.pixel_of(Point::new(1.0, 0.0)), (3.0, 1.0));
    }
}
