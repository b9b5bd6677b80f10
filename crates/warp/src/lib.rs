#![deny(unsafe_code)]
//! Projective warp layer.
//!
//! [`Warp`] maps a source rectangle onto an arbitrary destination
//! quadrilateral. Every destination point is pulled back through the inverse
//! homography and the layers below are sampled there. Points at or beyond the
//! vanishing line, or deeper than `horizon`, come out transparent.

pub mod homography;

use strata_core::{
    Color, Context, Hit, Layer, LayerError, ParamDesc, ParamEntry, ParamTable, ParamType,
    ParamValue, Point, ProgressCallback, Rect, RendDesc, SubProgress, Surface, Transform,
};
use tracing::debug;

pub use homography::{Homography, Quad};

/// Default degeneracy tolerance.
pub const DEFAULT_EPSILON: f64 = 1e-9;

/// Qualities at or above this resample with nearest-neighbor lookups.
const DRAFT_QUALITY: i32 = 8;

/// Upper bound on intermediate pixels, as a multiple of the target's.
const MAX_OVERSAMPLE: f64 = 4.0;

/// A perspective warp from a source rectangle to a destination quad.
#[derive(Debug, Clone, PartialEq)]
pub struct Warp {
    src_tl: Point,
    src_br: Point,
    dest: Quad,
    horizon: f64,
    clip: bool,
    epsilon: f64,
    homography: Homography,
    degenerate: bool,
}

fn finite_point(v: ParamValue) -> Result<Point, String> {
    let p = v.as_point().ok_or("expected a point")?;
    if !p.is_finite() {
        return Err("point components must be finite".to_string());
    }
    Ok(p)
}

macro_rules! point_param {
    ($name:literal, $local:literal, $desc:literal, $($field:tt)+) => {
        ParamEntry {
            desc: ParamDesc::new($name, $local, $desc, ParamType::Point),
            get: |w| ParamValue::Point(w.$($field)+),
            set: |w, v| {
                w.$($field)+ = finite_point(v)?;
                w.sync();
                Ok(())
            },
        }
    };
}

static PARAMS: ParamTable<Warp> = ParamTable::new(&[
    point_param!("src_tl", "Source TL", "Top left corner of the source to warp", src_tl),
    point_param!("src_br", "Source BR", "Bottom right corner of the source to warp", src_br),
    point_param!("dest_tl", "Dest TL", "Top left corner of the destination", dest.tl),
    point_param!("dest_tr", "Dest TR", "Top right corner of the destination", dest.tr),
    point_param!("dest_bl", "Dest BL", "Bottom left corner of the destination", dest.bl),
    point_param!("dest_br", "Dest BR", "Bottom right corner of the destination", dest.br),
    ParamEntry {
        desc: ParamDesc::new(
            "horizon",
            "Horizon",
            "Maximum perspective depth rendered",
            ParamType::Real,
        ),
        get: |w| ParamValue::Real(w.horizon),
        set: |w, v| {
            let horizon = v.as_real().ok_or("expected a real")?;
            if !(horizon > 0.0) {
                return Err("horizon must be positive".to_string());
            }
            w.horizon = horizon;
            Ok(())
        },
    },
    ParamEntry {
        desc: ParamDesc::new(
            "clip",
            "Clip",
            "Hide everything outside the source rectangle",
            ParamType::Bool,
        ),
        get: |w| ParamValue::Bool(w.clip),
        set: |w, v| {
            w.clip = v.as_bool().ok_or("expected a bool")?;
            Ok(())
        },
    },
]);

impl Default for Warp {
    fn default() -> Self {
        Self::new()
    }
}

impl Warp {
    /// A mild keystone: the top edge pulled in and raised.
    pub fn new() -> Self {
        let mut warp = Self {
            src_tl: Point::new(-2.0, 2.0),
            src_br: Point::new(2.0, -2.0),
            dest: Quad {
                tl: Point::new(-1.8, 2.1),
                tr: Point::new(1.8, 2.1),
                br: Point::new(2.2, -2.0),
                bl: Point::new(-2.2, -2.0),
            },
            horizon: 4.0,
            clip: true,
            epsilon: DEFAULT_EPSILON,
            homography: Homography::identity(DEFAULT_EPSILON),
            degenerate: true,
        };
        warp.sync();
        warp
    }

    /// A warp taking the rectangle `src_tl..src_br` onto `dest`.
    pub fn from_corners(src_tl: Point, src_br: Point, dest: Quad) -> Self {
        let mut warp = Self::new();
        warp.src_tl = src_tl;
        warp.src_br = src_br;
        warp.dest = dest;
        warp.sync();
        warp
    }

    /// The source rectangle, normalized so `min <= max`.
    pub fn src_rect(&self) -> Rect {
        Rect::from_corners(self.src_tl, self.src_br)
    }

    /// Destination corners.
    pub fn dest(&self) -> Quad {
        self.dest
    }

    /// Moves all four destination corners at once and re-solves the mapping.
    pub fn set_dest(&mut self, dest: Quad) {
        self.dest = dest;
        self.sync();
    }

    /// Replaces the source rectangle and re-solves the mapping.
    pub fn set_src(&mut self, tl: Point, br: Point) {
        self.src_tl = tl;
        self.src_br = br;
        self.sync();
    }

    /// Deepest relative perspective depth still rendered.
    pub fn horizon(&self) -> f64 {
        self.horizon
    }

    /// Whether points mapping outside the source rectangle are hidden.
    pub fn clip(&self) -> bool {
        self.clip
    }

    /// Turns clipping to the source rectangle on or off.
    pub fn set_clip(&mut self, clip: bool) {
        self.clip = clip;
    }

    /// Tolerance for degenerate corners and vanishing-line weights.
    pub fn epsilon(&self) -> f64 {
        self.epsilon
    }

    /// Sets the degeneracy tolerance and re-solves the mapping.
    pub fn set_epsilon(&mut self, epsilon: f64) -> Result<(), LayerError> {
        if !(epsilon > 0.0 && epsilon.is_finite()) {
            return Err(LayerError::InvalidParamValue {
                name: "epsilon".to_string(),
                reason: "epsilon must be positive and finite".to_string(),
            });
        }
        self.epsilon = epsilon;
        self.sync();
        Ok(())
    }

    /// True when the corners are degenerate and the layer passes points through.
    pub fn is_degenerate(&self) -> bool {
        self.degenerate
    }

    /// The solved mapping, the identity while degenerate.
    pub fn homography(&self) -> &Homography {
        &self.homography
    }

    /// Maps a source point into destination space.
    pub fn transform_forward(&self, p: Point) -> Point {
        self.homography.forward(p)
    }

    /// Maps a destination point back into source space.
    pub fn transform_backward(&self, p: Point) -> Point {
        self.homography.backward(p)
    }

    /// Perspective depth of a source point; one on average over the source
    /// corners.
    pub fn transform_forward_z(&self, p: Point) -> f64 {
        self.homography.forward_z(p)
    }

    /// Homogeneous weight of a destination point. At or below `epsilon` the
    /// point lies on or past the vanishing line.
    pub fn transform_backward_z(&self, p: Point) -> f64 {
        self.homography.backward_z(p)
    }

    fn sync(&mut self) {
        match Homography::rect_to_quad(self.src_tl, self.src_br, &self.dest, self.epsilon) {
            Ok(h) => {
                self.homography = h;
                self.degenerate = false;
            }
            Err(reason) => {
                debug!(reason, "warp corners degenerate, using identity");
                self.homography = Homography::identity(self.epsilon);
                self.degenerate = true;
            }
        }
    }

    /// The source point sampled for destination `pos`, or `None` if the point
    /// is past the horizon or clipped away.
    fn source_point(&self, pos: Point) -> Option<Point> {
        let w = self.transform_backward_z(pos);
        if w <= self.epsilon || 1.0 / w > self.horizon {
            return None;
        }
        let src = self.transform_backward(pos);
        if self.clip && !self.src_rect().contains(src) {
            return None;
        }
        Some(src)
    }

    /// Forward-maps a rectangle; `Rect::full()` when any corner crosses the
    /// vanishing line.
    fn map_rect(&self, r: Rect) -> Rect {
        if r.is_empty() {
            return Rect::zero();
        }
        if !r.is_bounded() {
            return Rect::full();
        }
        let corners = r.corners();
        if corners
            .iter()
            .any(|&c| self.transform_forward_z(c) <= self.epsilon)
        {
            return Rect::full();
        }
        Rect::bounding(corners.map(|c| self.transform_forward(c)))
    }

    /// Source-space region needed to render `desc`, or `None` if unbounded.
    fn source_region(&self, desc: &RendDesc) -> Option<Rect> {
        let corners = desc.rect().corners();
        let in_front = corners
            .iter()
            .all(|&c| self.transform_backward_z(c) > self.epsilon);
        if in_front {
            let region = Rect::bounding(corners.map(|c| self.transform_backward(c)));
            Some(if self.clip {
                region.intersect(self.src_rect())
            } else {
                region
            })
        } else if self.clip {
            Some(self.src_rect())
        } else {
            None
        }
    }

    fn render_per_pixel(
        &self,
        context: Context<'_>,
        surface: &mut Surface,
        desc: &RendDesc,
        progress: &mut dyn ProgressCallback,
    ) -> Result<(), LayerError> {
        debug!("warp source region unbounded, evaluating per pixel");
        let total = desc.height().max(1) as u64;
        let mut pen = surface.begin();
        for y in 0..desc.height() {
            for x in 0..desc.width() {
                pen.put_value(self.get_color(context, desc.point_at(x, y)));
                pen.inc_x();
            }
            pen.dec_x(desc.width());
            pen.inc_y();
            let done = 10000 * (y as u64 + 1) / total;
            if !progress.amount_complete(done, 10000) {
                return Err(LayerError::Cancelled);
            }
        }
        Ok(())
    }
}

/// Intermediate raster size for a source region seen through a `w x h` target.
///
/// The pixel count lands between the target's and `MAX_OVERSAMPLE` times it.
/// Each axis is at least two pixels and at most `MAX_OVERSAMPLE` times the
/// target's longer side, so a sliver of a region cannot blow up one axis.
fn intermediate_size(region: Rect, desc: &RendDesc) -> (usize, usize) {
    let target = (desc.width() * desc.height()) as f64;
    let budget = target * MAX_OVERSAMPLE;
    let side_cap = MAX_OVERSAMPLE * desc.width().max(desc.height()) as f64;
    let mut iw = region.width() / desc.pw().abs();
    let mut ih = region.height() / desc.ph().abs();
    let count = iw * ih;
    if count < target || count > budget {
        let wanted = count.clamp(target, budget);
        let scale = (wanted / count).sqrt();
        iw *= scale;
        ih *= scale;
    }
    let side = |v: f64| {
        if v.is_nan() {
            2.0
        } else {
            v.ceil().clamp(2.0, side_cap)
        }
    };
    let (mut iw, mut ih) = (side(iw), side(ih));
    // flooring an axis to two can push the product past the budget
    let fit = |a: f64, b: f64| a.min((budget / b).floor()).max(2.0);
    if iw >= ih {
        iw = fit(iw, ih);
        ih = fit(ih, iw);
    } else {
        ih = fit(ih, iw);
        iw = fit(iw, ih);
    }
    (iw as usize, ih as usize)
}

impl Layer for Warp {
    fn name(&self) -> &'static str {
        "warp"
    }

    fn param_vocab(&self) -> Vec<ParamDesc> {
        PARAMS.descs()
    }

    fn get_param(&self, key: &str) -> Result<ParamValue, LayerError> {
        PARAMS.get(self, key)
    }

    fn set_param(&mut self, key: &str, value: ParamValue) -> Result<(), LayerError> {
        PARAMS.set(self, key, value)
    }

    fn get_color(&self, context: Context<'_>, pos: Point) -> Color {
        if self.degenerate {
            return context.get_color(pos);
        }
        match self.source_point(pos) {
            Some(src) => context.get_color(src),
            None => Color::TRANSPARENT,
        }
    }

    fn accelerated_render(
        &self,
        context: Context<'_>,
        surface: &mut Surface,
        quality: i32,
        desc: &RendDesc,
        progress: &mut dyn ProgressCallback,
    ) -> Result<(), LayerError> {
        if self.degenerate {
            return context.accelerated_render(surface, quality, desc, progress);
        }
        surface.set_wh(desc.width(), desc.height())?;

        let region = match self.source_region(desc) {
            Some(r) if r.is_empty() => {
                // nothing visible: the cleared surface is the answer
                return if progress.amount_complete(10000, 10000) {
                    Ok(())
                } else {
                    Err(LayerError::Cancelled)
                };
            }
            Some(r) if r.width() > 0.0 && r.height() > 0.0 => r,
            _ => return self.render_per_pixel(context, surface, desc, progress),
        };

        let (iw, ih) = intermediate_size(region, desc);
        let step_x = region.width() / (iw - 1) as f64 * desc.pw().signum();
        let step_y = region.height() / (ih - 1) as f64 * desc.ph().signum();
        let sub_tl = Point::new(
            if step_x > 0.0 { region.min.x } else { region.max.x },
            if step_y > 0.0 { region.min.y } else { region.max.y },
        );
        let sub_br = sub_tl + Point::new(step_x * iw as f64, step_y * ih as f64);
        let sub_desc = RendDesc::new(iw, ih, sub_tl, sub_br)?;
        debug!(iw, ih, "warp resampling through intermediate surface");

        let mut source = Surface::new(iw, ih)?;
        {
            let mut sub = SubProgress::new(progress, 0, 9000, 10000);
            context.accelerated_render(&mut source, quality, &sub_desc, &mut sub)?;
        }

        let total = desc.height() as u64;
        let mut pen = surface.begin();
        for y in 0..desc.height() {
            for x in 0..desc.width() {
                let color = match self.source_point(desc.point_at(x, y)) {
                    Some(src) => {
                        let (fx, fy) = sub_desc.pixel_of(src);
                        if quality >= DRAFT_QUALITY {
                            source.sample_nearest(fx, fy)
                        } else {
                            source.sample_linear(fx, fy)
                        }
                    }
                    None => Color::TRANSPARENT,
                };
                pen.put_value(color);
                pen.inc_x();
            }
            pen.dec_x(desc.width());
            pen.inc_y();
            let done = 9000 + 1000 * (y as u64 + 1) / total.max(1);
            if !progress.amount_complete(done, 10000) {
                return Err(LayerError::Cancelled);
            }
        }
        Ok(())
    }

    fn hit_check(&self, context: Context<'_>, pos: Point) -> Option<Hit> {
        let src = if self.degenerate {
            pos
        } else {
            self.source_point(pos)?
        };
        context.hit_check(src).map(Hit::Below)
    }

    fn bounding_rect(&self) -> Rect {
        if self.degenerate || !self.clip {
            return Rect::full();
        }
        self.map_rect(self.src_rect())
    }

    fn full_bounding_rect(&self, context: Context<'_>) -> Rect {
        let under = context.full_bounding_rect();
        if self.degenerate {
            return under;
        }
        let under = if self.clip {
            under.intersect(self.src_rect())
        } else {
            under
        };
        self.map_rect(under)
    }

    fn transform(&self) -> Option<Box<dyn Transform>> {
        Some(Box::new(WarpTransform {
            homography: self.homography,
        }))
    }
}

/// The point mapping of a [`Warp`], detached from the layer.
#[derive(Debug, Clone, Copy)]
pub struct WarpTransform {
    homography: Homography,
}

impl Transform for WarpTransform {
    fn perform(&self, p: Point) -> Point {
        self.homography.forward(p)
    }

    fn unperform(&self, p: Point) -> Point {
        self.homography.backward(p)
    }

    fn transform_rect(&self, r: Rect) -> Rect {
        if r.is_empty() {
            return Rect::zero();
        }
        if !r.is_bounded() {
            return Rect::full();
        }
        let corners = r.corners();
        if corners.iter().any(|&c| self.homography.forward_z(c) <= 0.0) {
            return Rect::full();
        }
        Rect::bounding(corners.map(|c| self.homography.forward(c)))
    }
}
