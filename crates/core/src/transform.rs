//! Point transforms exposed by geometric layers.

use crate::geometry::{Point, Rect};

/// A reversible point mapping.
///
/// `perform` maps from the space below the layer into the space above it;
/// `unperform` is the inverse.
pub trait Transform: Send + Sync {
    fn perform(&self, p: Point) -> Point;

    fn unperform(&self, p: Point) -> Point;

    /// Bounding box of the mapped corners of `r`.
    ///
    /// Empty rectangles stay empty; unbounded ones map to [`Rect::full`].
    fn transform_rect(&self, r: Rect) -> Rect {
        if r.is_empty() {
            return Rect::zero();
        }
        if !r.is_bounded() {
            return Rect::full();
        }
        let mapped = Rect::bounding(r.corners().map(|c| self.perform(c)));
        if mapped.is_empty() {
            Rect::full()
        } else {
            mapped
        }
    }
}
