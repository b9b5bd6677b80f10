//! Rectangle-to-quadrilateral projective mappings.
//!
//! Built from Heckbert's unit-square-to-quad construction composed with the
//! inverse of the affine source-rectangle map. The forward matrix is scaled so
//! the mean homogeneous weight over the four source corners is `+1`, which
//! makes the weight of a source point read as its relative perspective depth.

use glam::{DMat3, DVec3};
use strata_core::{Point, Rect};

/// Destination corners. `tl`, `tr`, `br`, `bl` receive the source rectangle's
/// corners of the same name.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Quad {
    pub tl: Point,
    pub tr: Point,
    pub br: Point,
    pub bl: Point,
}

impl Quad {
    /// Corners in winding order: tl, tr, br, bl.
    pub fn corners(&self) -> [Point; 4] {
        [self.tl, self.tr, self.br, self.bl]
    }
}

/// A projective map and its inverse.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Homography {
    matrix: DMat3,
    inverse: DMat3,
    epsilon: f64,
}

impl Homography {
    /// The identity map.
    pub fn identity(epsilon: f64) -> Self {
        Self {
            matrix: DMat3::IDENTITY,
            inverse: DMat3::IDENTITY,
            epsilon,
        }
    }

    /// Solves the map taking the rectangle `src_tl..src_br` onto `dest`.
    ///
    /// Returns the reason as `Err` when the correspondence is degenerate: a
    /// source rectangle with zero width or height, three destination corners
    /// collinear within `epsilon` of the quad's squared extent, or a singular
    /// or non-finite matrix.
    pub fn rect_to_quad(
        src_tl: Point,
        src_br: Point,
        dest: &Quad,
        epsilon: f64,
    ) -> Result<Self, &'static str> {
        let corners = dest.corners();
        if !src_tl.is_finite() || !src_br.is_finite() || corners.iter().any(|c| !c.is_finite()) {
            return Err("non-finite corner");
        }
        let w = src_br.x - src_tl.x;
        let h = src_br.y - src_tl.y;
        if w.abs() <= epsilon || h.abs() <= epsilon {
            return Err("source rectangle has zero width or height");
        }

        let bounds = Rect::bounding(corners);
        let extent = bounds.width().max(bounds.height());
        if extent <= 0.0 {
            return Err("destination quad has no extent");
        }
        let tolerance = epsilon * extent * extent;
        for (i, j, k) in [(0, 1, 2), (1, 2, 3), (2, 3, 0), (3, 0, 1)] {
            let cross = (corners[j] - corners[i]).perp_dot(corners[k] - corners[i]);
            if cross.abs() <= tolerance {
                return Err("three destination corners are collinear");
            }
        }

        let square = square_to_quad(dest, tolerance)?;
        let unit = DMat3::from_cols(
            DVec3::new(1.0 / w, 0.0, 0.0),
            DVec3::new(0.0, 1.0 / h, 0.0),
            DVec3::new(-src_tl.x / w, -src_tl.y / h, 1.0),
        );
        let matrix = square * unit;

        let src_rect = Rect::from_corners(src_tl, src_br);
        let mean_weight = src_rect
            .corners()
            .iter()
            .map(|c| matrix.row(2).dot(DVec3::new(c.x, c.y, 1.0)))
            .sum::<f64>()
            / 4.0;
        if !mean_weight.is_finite() || mean_weight.abs() <= epsilon {
            return Err("source corners map to the vanishing line");
        }
        let matrix = matrix * (1.0 / mean_weight);

        let det = matrix.determinant();
        if !det.is_finite() || det == 0.0 {
            return Err("singular matrix");
        }
        let inverse = matrix.inverse();
        if !matrix.is_finite() || !inverse.is_finite() {
            return Err("non-finite matrix");
        }
        Ok(Self {
            matrix,
            inverse,
            epsilon,
        })
    }

    /// The forward matrix, normalized to a mean corner weight of one.
    pub fn matrix(&self) -> DMat3 {
        self.matrix
    }

    /// The backward matrix. Its product with [`Homography::matrix`] is the
    /// identity up to rounding.
    pub fn inverse_matrix(&self) -> DMat3 {
        self.inverse
    }

    /// Source point to destination point.
    pub fn forward(&self, p: Point) -> Point {
        apply(&self.matrix, p, self.epsilon)
    }

    /// Destination point to source point.
    pub fn backward(&self, p: Point) -> Point {
        apply(&self.inverse, p, self.epsilon)
    }

    /// Homogeneous weight of a source point under the forward map.
    pub fn forward_z(&self, p: Point) -> f64 {
        self.matrix.row(2).dot(DVec3::new(p.x, p.y, 1.0))
    }

    /// Homogeneous weight of a destination point under the backward map.
    ///
    /// Equals `1 / forward_z` of the corresponding source point.
    pub fn backward_z(&self, p: Point) -> f64 {
        self.inverse.row(2).dot(DVec3::new(p.x, p.y, 1.0))
    }
}

fn apply(m: &DMat3, p: Point, epsilon: f64) -> Point {
    let v = *m * DVec3::new(p.x, p.y, 1.0);
    let w = clamp_weight(v.z, epsilon);
    Point::new(v.x / w, v.y / w)
}

/// Pushes weights below `epsilon` in magnitude out to `±epsilon`.
fn clamp_weight(w: f64, epsilon: f64) -> f64 {
    if w.abs() >= epsilon {
        w
    } else if w < 0.0 {
        -epsilon
    } else {
        epsilon
    }
}

/// Heckbert's unit square to quad: (0,0)->tl, (1,0)->tr, (1,1)->br, (0,1)->bl.
fn square_to_quad(q: &Quad, tolerance: f64) -> Result<DMat3, &'static str> {
    let [p0, p1, p2, p3] = q.corners();
    let sx = p0.x - p1.x + p2.x - p3.x;
    let sy = p0.y - p1.y + p2.y - p3.y;

    let (a, b, c, d, e, f, g, h);
    if sx.abs() <= tolerance && sy.abs() <= tolerance {
        // parallelogram
        a = p1.x - p0.x;
        b = p2.x - p1.x;
        c = p0.x;
        d = p1.y - p0.y;
        e = p2.y - p1.y;
        f = p0.y;
        g = 0.0;
        h = 0.0;
    } else {
        let dx1 = p1.x - p2.x;
        let dx2 = p3.x - p2.x;
        let dy1 = p1.y - p2.y;
        let dy2 = p3.y - p2.y;
        let det = dx1 * dy2 - dx2 * dy1;
        if !det.is_finite() || det.abs() <= tolerance {
            return Err("singular square-to-quad system");
        }
        g = (sx * dy2 - dx2 * sy) / det;
        h = (dx1 * sy - sx * dy1) / det;
        a = p1.x - p0.x + g * p1.x;
        b = p3.x - p0.x + h * p3.x;
        c = p0.x;
        d = p1.y - p0.y + g * p1.y;
        e = p3.y - p0.y + h * p3.y;
        f = p0.y;
    }
    Ok(DMat3::from_cols(
        DVec3::new(a, d, g),
        DVec3::new(b, e, h),
        DVec3::new(c, f, 1.0),
    ))
}
