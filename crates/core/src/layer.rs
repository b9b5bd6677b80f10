//! The contract every layer implements.
//!
//! A layer never sees the canvas directly. Each evaluation call receives a
//! [`Context`] describing everything beneath the layer; the layer asks it for
//! the color below and folds its own contribution in with [`blend`](crate::blend).
//!
//! The trait is object safe so a canvas can hold a heterogeneous stack of
//! `Box<dyn Layer>`.

use crate::color::Color;
use crate::context::Context;
use crate::error::LayerError;
use crate::geometry::{Point, Rect};
use crate::param::{ParamDesc, ParamValue};
use crate::progress::ProgressCallback;
use crate::surface::{RendDesc, Surface};
use crate::transform::Transform;

/// Result of a successful hit test.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Hit {
    /// The layer being tested was hit.
    This,
    /// A layer further down was hit; the index is its position in the stack.
    Below(usize),
}

/// A stackable, parameterized layer.
pub trait Layer: Send + Sync {
    /// The layer kind, e.g. `"warp"`.
    fn name(&self) -> &'static str;

    /// Descriptions of every settable parameter.
    fn param_vocab(&self) -> Vec<ParamDesc>;

    fn get_param(&self, key: &str) -> Result<ParamValue, LayerError>;

    /// Sets a parameter. On error the layer is left unchanged.
    fn set_param(&mut self, key: &str, value: ParamValue) -> Result<(), LayerError>;

    /// The composited color at `pos`, including everything in `context`.
    fn get_color(&self, context: Context<'_>, pos: Point) -> Color;

    /// Renders this layer composited over `context` into `surface`.
    ///
    /// The surface is resized to the description's dimensions. The default
    /// evaluates [`Layer::get_color`] once per pixel, reporting progress per
    /// row.
    fn accelerated_render(
        &self,
        context: Context<'_>,
        surface: &mut Surface,
        _quality: i32,
        desc: &RendDesc,
        progress: &mut dyn ProgressCallback,
    ) -> Result<(), LayerError> {
        surface.set_wh(desc.width(), desc.height())?;
        let total = desc.height() as u64;
        for y in 0..desc.height() {
            for x in 0..desc.width() {
                surface.set(x, y, self.get_color(context, desc.point_at(x, y)));
            }
            if !progress.amount_complete(y as u64 + 1, total) {
                return Err(LayerError::Cancelled);
            }
        }
        Ok(())
    }

    /// Which layer, if any, owns the point.
    fn hit_check(&self, context: Context<'_>, pos: Point) -> Option<Hit>;

    /// The region this layer alone can affect.
    fn bounding_rect(&self) -> Rect {
        Rect::full()
    }

    /// The region affected by this layer together with everything below.
    fn full_bounding_rect(&self, context: Context<'_>) -> Rect {
        self.bounding_rect().union(context.full_bounding_rect())
    }

    /// The point mapping this layer applies, if it is a geometric layer.
    fn transform(&self) -> Option<Box<dyn Transform>> {
        None
    }
}
