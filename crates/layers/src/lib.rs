#![deny(unsafe_code)]
//! Layer registry: maps layer kind names to implementations, builds canvases
//! from scene descriptions, and converts rendered surfaces to pixels.
//!
//! This crate sits between `strata-core` (which defines the `Layer` trait) and
//! the individual layer crates (`strata-warp`, `strata-noise`). The CLI depends
//! on it so kind dispatch lives in one place.

pub mod pixel;
pub mod scene;

#[cfg(feature = "png")]
pub mod snapshot;

use strata_core::{
    Color, Context, Hit, Layer, LayerError, ParamDesc, ParamValue, Point, ProgressCallback, Rect,
    RendDesc, SolidColor, Surface, Transform,
};
use strata_noise::NoiseGradient;
use strata_warp::Warp;

/// All available layer kind names.
const LAYER_NAMES: &[&str] = &["noise", "solid_color", "warp"];

/// Enumeration of all available layer kinds.
///
/// Wraps each layer implementation and delegates `Layer` trait methods.
/// Use [`LayerKind::from_name`] for string-based construction.
#[derive(Debug, Clone)]
pub enum LayerKind {
    /// Multi-octave noise mapped through a gradient.
    Noise(NoiseGradient),
    /// Constant color fill.
    SolidColor(SolidColor),
    /// Projective rectangle-to-quad warp.
    Warp(Warp),
}

macro_rules! delegate {
    ($self:expr, $layer:ident => $call:expr) => {
        match $self {
            LayerKind::Noise($layer) => $call,
            LayerKind::SolidColor($layer) => $call,
            LayerKind::Warp($layer) => $call,
        }
    };
}

impl LayerKind {
    /// Constructs a layer with default parameters by kind name.
    ///
    /// Returns `LayerError::UnknownLayerKind` if the name is not recognized.
    pub fn from_name(name: &str) -> Result<Self, LayerError> {
        match name {
            "noise" => Ok(LayerKind::Noise(NoiseGradient::new())),
            "solid_color" => Ok(LayerKind::SolidColor(SolidColor::default())),
            "warp" => Ok(LayerKind::Warp(Warp::new())),
            _ => Err(LayerError::UnknownLayerKind(name.to_string())),
        }
    }

    /// Returns a slice of all recognized layer kind names.
    pub fn list_layers() -> &'static [&'static str] {
        LAYER_NAMES
    }
}

impl Layer for LayerKind {
    fn name(&self) -> &'static str {
        delegate!(self, l => l.name())
    }

    fn param_vocab(&self) -> Vec<ParamDesc> {
        delegate!(self, l => l.param_vocab())
    }

    fn get_param(&self, key: &str) -> Result<ParamValue, LayerError> {
        delegate!(self, l => l.get_param(key))
    }

    fn set_param(&mut self, key: &str, value: ParamValue) -> Result<(), LayerError> {
        delegate!(self, l => l.set_param(key, value))
    }

    fn get_color(&self, context: Context<'_>, pos: Point) -> Color {
        delegate!(self, l => l.get_color(context, pos))
    }

    fn accelerated_render(
        &self,
        context: Context<'_>,
        surface: &mut Surface,
        quality: i32,
        desc: &RendDesc,
        progress: &mut dyn ProgressCallback,
    ) -> Result<(), LayerError> {
        delegate!(self, l => l.accelerated_render(context, surface, quality, desc, progress))
    }

    fn hit_check(&self, context: Context<'_>, pos: Point) -> Option<Hit> {
        delegate!(self, l => l.hit_check(context, pos))
    }

    fn bounding_rect(&self) -> Rect {
        delegate!(self, l => l.bounding_rect())
    }

    fn full_bounding_rect(&self, context: Context<'_>) -> Rect {
        delegate!(self, l => l.full_bounding_rect(context))
    }

    fn transform(&self) -> Option<Box<dyn Transform>> {
        delegate!(self, l => l.transform())
    }
}
