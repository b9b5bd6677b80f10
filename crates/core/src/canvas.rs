//! Canvas and layer stack.
//!
//! A [`Canvas`] holds the render window (pixel size plus the world-space
//! rectangle it covers), a background color, and an ordered stack of named
//! [`CanvasLayer`]s. Layers are identified by unique names and composited
//! bottom-to-top (index 0 = bottom).

use std::fmt;

use tracing::debug;

use crate::color::Color;
use crate::context::Context;
use crate::error::LayerError;
use crate::geometry::Point;
use crate::layer::Layer;
use crate::progress::ProgressCallback;
use crate::surface::{RendDesc, Surface};
use crate::time::Time;

/// A single entry in the canvas stack: a named layer and its enabled flag.
pub struct CanvasLayer {
    name: String,
    layer: Box<dyn Layer>,
    enabled: bool,
}

impl CanvasLayer {
    /// Creates an enabled entry.
    pub fn new(name: impl Into<String>, layer: Box<dyn Layer>) -> Self {
        Self {
            name: name.into(),
            layer,
            enabled: true,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn layer(&self) -> &dyn Layer {
        self.layer.as_ref()
    }

    pub fn layer_mut(&mut self) -> &mut dyn Layer {
        self.layer.as_mut()
    }

    /// Disabled entries are skipped by every context.
    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }

    /// Returns the entry with the given enabled flag.
    pub fn with_enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }

    /// Unwraps the boxed layer.
    pub fn into_layer(self) -> Box<dyn Layer> {
        self.layer
    }
}

impl fmt::Debug for CanvasLayer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CanvasLayer")
            .field("name", &self.name)
            .field("kind", &self.layer.name())
            .field("enabled", &self.enabled)
            .finish()
    }
}

/// A render window, background color and ordered layer stack.
#[derive(Debug)]
pub struct Canvas {
    desc: RendDesc,
    background: Color,
    layers: Vec<CanvasLayer>,
}

impl Canvas {
    /// Creates an empty canvas of `width x height` pixels covering the world
    /// rectangle from `tl` to `br`, with a transparent background.
    ///
    /// Returns `LayerError::InvalidDimensions` if width or height is zero,
    /// or if `width * height` would overflow `usize`.
    pub fn new(width: usize, height: usize, tl: Point, br: Point) -> Result<Self, LayerError> {
        Ok(Self {
            desc: RendDesc::new(width, height, tl, br)?,
            background: Color::TRANSPARENT,
            layers: Vec::new(),
        })
    }

    pub fn width(&self) -> usize {
        self.desc.width()
    }

    pub fn height(&self) -> usize {
        self.desc.height()
    }

    /// The render description for the whole canvas.
    pub fn rend_desc(&self) -> RendDesc {
        self.desc
    }

    /// Moves the world-space window without changing the pixel size.
    pub fn set_view(&mut self, tl: Point, br: Point) -> Result<(), LayerError> {
        self.desc = RendDesc::new(self.desc.width(), self.desc.height(), tl, br)?;
        Ok(())
    }

    pub fn background(&self) -> Color {
        self.background
    }

    pub fn set_background(&mut self, background: Color) {
        self.background = background;
    }

    /// Returns the number of layers.
    pub fn layer_count(&self) -> usize {
        self.layers.len()
    }

    /// Returns a slice of all layers (bottom-to-top order).
    pub fn layers(&self) -> &[CanvasLayer] {
        &self.layers
    }

    /// Adds a layer to the top of the stack.
    ///
    /// Returns `LayerError::DuplicateLayerName` if a layer with the same
    /// name already exists.
    pub fn add_layer(&mut self, entry: CanvasLayer) -> Result<(), LayerError> {
        let has_duplicate = self.layers.iter().any(|l| l.name == entry.name);
        if has_duplicate {
            return Err(LayerError::DuplicateLayerName(entry.name));
        }
        self.layers.push(entry);
        Ok(())
    }

    /// Removes a layer by name and returns it.
    ///
    /// Returns `LayerError::LayerNotFound` if no layer with the given name exists.
    pub fn remove_layer(&mut self, name: &str) -> Result<CanvasLayer, LayerError> {
        let idx = self.index_of(name)?;
        Ok(self.layers.remove(idx))
    }

    /// Returns the entry with the given name.
    pub fn layer(&self, name: &str) -> Result<&CanvasLayer, LayerError> {
        self.layers
            .iter()
            .find(|l| l.name == name)
            .ok_or_else(|| LayerError::LayerNotFound(name.to_string()))
    }

    /// Returns the entry with the given name, mutably.
    pub fn layer_mut(&mut self, name: &str) -> Result<&mut CanvasLayer, LayerError> {
        self.layers
            .iter_mut()
            .find(|l| l.name == name)
            .ok_or_else(|| LayerError::LayerNotFound(name.to_string()))
    }

    pub fn set_enabled(&mut self, name: &str, enabled: bool) -> Result<(), LayerError> {
        self.layer_mut(name)?.set_enabled(enabled);
        Ok(())
    }

    /// Moves a layer to the given index in the stack.
    ///
    /// Index 0 is the bottom. If `index >= layer_count()`, the layer moves
    /// to the top.
    pub fn move_layer_to(&mut self, name: &str, index: usize) -> Result<(), LayerError> {
        let idx = self.index_of(name)?;
        let layer = self.layers.remove(idx);
        let target = index.min(self.layers.len());
        self.layers.insert(target, layer);
        Ok(())
    }

    /// Moves a layer one position up (toward the top). No-op at the top.
    pub fn move_layer_up(&mut self, name: &str) -> Result<(), LayerError> {
        let idx = self.index_of(name)?;
        if idx + 1 < self.layers.len() {
            self.layers.swap(idx, idx + 1);
        }
        Ok(())
    }

    /// Moves a layer one position down (toward the bottom). No-op at the bottom.
    pub fn move_layer_down(&mut self, name: &str) -> Result<(), LayerError> {
        let idx = self.index_of(name)?;
        if idx > 0 {
            self.layers.swap(idx, idx - 1);
        }
        Ok(())
    }

    /// A context over the whole stack at `time`.
    pub fn context(&self, time: Time) -> Context<'_> {
        Context::new(&self.layers, time, self.background)
    }

    /// The composited color at a world-space point.
    pub fn get_color(&self, pos: Point, time: Time) -> Color {
        self.context(time).get_color(pos)
    }

    /// Name of the topmost layer owning `pos`, if any.
    pub fn hit_check(&self, pos: Point, time: Time) -> Option<&str> {
        let index = self.context(time).hit_check(pos)?;
        self.layers.get(index).map(|l| l.name())
    }

    /// Renders the full stack into a new surface.
    #[tracing::instrument(
        skip_all,
        fields(
            width = self.desc.width(),
            height = self.desc.height(),
            layers = self.layers.len(),
            time = %time,
        )
    )]
    pub fn render(
        &self,
        time: Time,
        quality: i32,
        progress: &mut dyn ProgressCallback,
    ) -> Result<Surface, LayerError> {
        let mut surface = Surface::filled(self.desc.width(), self.desc.height(), self.background)?;
        match self
            .context(time)
            .accelerated_render(&mut surface, quality, &self.desc, progress)
        {
            Ok(()) => Ok(surface),
            Err(LayerError::Cancelled) => {
                debug!("render cancelled");
                Err(LayerError::Cancelled)
            }
            Err(e) => Err(e),
        }
    }

    /// Finds the index of a layer by name.
    fn index_of(&self, name: &str) -> Result<usize, LayerError> {
        self.layers
            .iter()
            .position(|l| l.name == name)
            .ok_or_else(|| LayerError::LayerNotFound(name.to_string()))
    }
}
