//! Points and axis-aligned rectangles in world space.

use glam::DVec2;

/// A 2D world-space coordinate.
pub type Point = DVec2;

/// Axis-aligned rectangle. `min > max` on either axis means empty.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    pub min: Point,
    pub max: Point,
}

impl Rect {
    /// Builds the rectangle spanned by two opposite corners in any order.
    pub fn from_corners(a: Point, b: Point) -> Self {
        Self {
            min: a.min(b),
            max: a.max(b),
        }
    }

    /// The empty rectangle. Union with it is a no-op.
    pub fn zero() -> Self {
        Self {
            min: Point::splat(f64::INFINITY),
            max: Point::splat(f64::NEG_INFINITY),
        }
    }

    /// The unbounded rectangle covering the whole plane.
    pub fn full() -> Self {
        Self {
            min: Point::splat(f64::NEG_INFINITY),
            max: Point::splat(f64::INFINITY),
        }
    }

    /// Smallest rectangle containing all `points`; empty for no points.
    pub fn bounding(points: impl IntoIterator<Item = Point>) -> Self {
        points.into_iter().fold(Self::zero(), Rect::expand)
    }

    pub fn is_empty(&self) -> bool {
        !(self.min.x <= self.max.x && self.min.y <= self.max.y)
    }

    /// True if non-empty and all edges are finite.
    pub fn is_bounded(&self) -> bool {
        !self.is_empty() && self.min.is_finite() && self.max.is_finite()
    }

    pub fn width(&self) -> f64 {
        (self.max.x - self.min.x).max(0.0)
    }

    pub fn height(&self) -> f64 {
        (self.max.y - self.min.y).max(0.0)
    }

    /// Inclusive containment test.
    pub fn contains(&self, p: Point) -> bool {
        p.x >= self.min.x && p.x <= self.max.x && p.y >= self.min.y && p.y <= self.max.y
    }

    /// Grows the rectangle to include `p`. Non-finite points are ignored.
    pub fn expand(self, p: Point) -> Self {
        if !p.is_finite() {
            return self;
        }
        Self {
            min: self.min.min(p),
            max: self.max.max(p),
        }
    }

    pub fn union(self, other: Rect) -> Self {
        if self.is_empty() {
            return other;
        }
        if other.is_empty() {
            return self;
        }
        Self {
            min: self.min.min(other.min),
            max: self.max.max(other.max),
        }
    }

    pub fn intersect(self, other: Rect) -> Self {
        let r = Self {
            min: self.min.max(other.min),
            max: self.max.min(other.max),
        };
        if r.is_empty() {
            Self::zero()
        } else {
            r
        }
    }

    /// The four corners: min, (max.x, min.y), max, (min.x, max.y).
    pub fn corners(&self) -> [Point; 4] {
        [
            self.min,
            Point::new(self.max.x, self.min.y),
            self.max,
            Point::new(self.min.x, self.max.y),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_corners_orders_components() {
        let r = Rect::from_corners(Point::new(2.0, -1.0), Point::new(-2.0, 1.0));
        assert_eq!(r.min, Point::new(-2.0, -1.0));
        assert_eq!(r.max, Point::new(2.0, 1.0));
        assert_eq!(r.width(), 4.0);
        assert_eq!(r.height(), 2.0);
    }

    #[test]
    fn zero_is_empty_and_union_identity() {
        let r = Rect::from_corners(Point::ZERO, Point::ONE);
        assert!(Rect::zero().is_empty());
        assert_eq!(Rect::zero().union(r), r);
        assert_eq!(r.union(Rect::zero()), r);
        assert_eq!(Rect::zero().width(), 0.0);
    }

    #[test]
    fn full_is_not_bounded() {
        assert!(!Rect::full().is_empty());
        assert!(!Rect::full().is_bounded());
        assert!(Rect::full().contains(Point::new(1e300, -1e300)));
    }

    #[test]
    fn bounding_ignores_non_finite_points() {
        let r = Rect::bounding([
            Point::new(1.0, 2.0),
            Point::new(f64::NAN, 0.0),
            Point::new(-1.0, 5.0),
        ]);
        assert_eq!(r, Rect::from_corners(Point::new(-1.0, 2.0), Point::new(1.0, 5.0)));
    }

    #[test]
    fn intersect_disjoint_is_empty() {
        let a = Rect::from_corners(Point::ZERO, Point::ONE);
        let b = Rect::from_corners(Point::splat(2.0), Point::splat(3.0));
        assert!(a.intersect(b).is_empty());
        let c = Rect::from_corners(Point::splat(0.5), Point::splat(3.0));
        assert_eq!(
            a.intersect(c),
            Rect::from_corners(Point::splat(0.5), Point::ONE)
        );
    }

    #[test]
    fn contains_is_inclusive() {
        let r = Rect::from_corners(Point::ZERO, Point::ONE);
        assert!(r.contains(Point::ONE));
        assert!(r.contains(Point::ZERO));
        assert!(!r.contains(Point::new(1.0001, 0.5)));
    }
}
