//! Evaluation context: an immutable view of the layers beneath the current one.
//!
//! A [`Context`] is a bottom-to-top slice of canvas entries plus the
//! evaluation time and the background color. Delegating to "everything below"
//! means evaluating the same slice without its topmost enabled entry, so no
//! layer ever holds a pointer to its neighbors.

use std::fmt;

use crate::canvas::CanvasLayer;
use crate::color::Color;
use crate::error::LayerError;
use crate::geometry::{Point, Rect};
use crate::layer::Hit;
use crate::progress::ProgressCallback;
use crate::surface::{RendDesc, Surface};
use crate::time::Time;

#[derive(Clone, Copy)]
pub struct Context<'a> {
    layers: &'a [CanvasLayer],
    time: Time,
    background: Color,
}

impl<'a> Context<'a> {
    pub fn new(layers: &'a [CanvasLayer], time: Time, background: Color) -> Self {
        Self {
            layers,
            time,
            background,
        }
    }

    /// A context with no layers: evaluates to `background` everywhere.
    pub fn empty(time: Time, background: Color) -> Self {
        Self::new(&[], time, background)
    }

    pub fn time(&self) -> Time {
        self.time
    }

    pub fn background(&self) -> Color {
        self.background
    }

    /// The same view evaluated at a different time.
    pub fn at_time(self, time: Time) -> Self {
        Self { time, ..self }
    }

    /// True if no enabled layer remains.
    pub fn is_empty(&self) -> bool {
        self.split_top().is_none()
    }

    /// The topmost enabled entry, its stack index and the context below it.
    fn split_top(&self) -> Option<(&'a CanvasLayer, usize, Context<'a>)> {
        let index = self.layers.iter().rposition(|l| l.is_enabled())?;
        let below = Context {
            layers: &self.layers[..index],
            ..*self
        };
        Some((&self.layers[index], index, below))
    }

    pub fn get_color(&self, pos: Point) -> Color {
        match self.split_top() {
            Some((top, _, below)) => top.layer().get_color(below, pos),
            None => self.background,
        }
    }

    /// Renders the whole view into `surface`, resizing it to `desc`.
    pub fn accelerated_render(
        &self,
        surface: &mut Surface,
        quality: i32,
        desc: &RendDesc,
        progress: &mut dyn ProgressCallback,
    ) -> Result<(), LayerError> {
        match self.split_top() {
            Some((top, _, below)) => {
                top.layer()
                    .accelerated_render(below, surface, quality, desc, progress)
            }
            None => {
                surface.set_wh(desc.width(), desc.height())?;
                surface.fill(self.background);
                Ok(())
            }
        }
    }

    /// Stack index of the layer owning `pos`, if any.
    pub fn hit_check(&self, pos: Point) -> Option<usize> {
        let (top, index, below) = self.split_top()?;
        match top.layer().hit_check(below, pos)? {
            Hit::This => Some(index),
            Hit::Below(i) => Some(i),
        }
    }

    pub fn full_bounding_rect(&self) -> Rect {
        match self.split_top() {
            Some((top, _, below)) => top.layer().full_bounding_rect(below),
            None => Rect::zero(),
        }
    }
}

impl fmt::Debug for Context<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Context")
            .field("layers", &self.layers.len())
            .field("time", &self.time)
            .field("background", &self.background)
            .finish()
    }
}
