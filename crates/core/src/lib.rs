#![deny(unsafe_code)]
//! Core types and traits for the strata layered renderer.
//!
//! Provides the `Layer` trait and the `Context` chain evaluator, the
//! `Canvas` layer stack, `Color`/`BlendMethod`/`blend`, `Gradient`,
//! `Surface`/`Pen`/`RendDesc` raster targets, the seeded `RandomNoise` field,
//! typed parameter tables, progress callbacks, `Time`, and the `Scene`
//! description.

pub mod canvas;
pub mod color;
pub mod context;
pub mod error;
pub mod geometry;
pub mod gradient;
pub mod layer;
pub mod noise;
pub mod param;
pub mod progress;
pub mod scene;
pub mod solid;
pub mod surface;
pub mod time;
pub mod transform;

pub use canvas::{Canvas, CanvasLayer};
pub use color::{blend, BlendMethod, Color};
pub use context::Context;
pub use error::LayerError;
pub use geometry::{Point, Rect};
pub use gradient::{Gradient, GradientStop};
pub use layer::{Hit, Layer};
pub use noise::{RandomNoise, SmoothType};
pub use param::{ParamDesc, ParamEntry, ParamTable, ParamType, ParamValue};
pub use progress::{ProgressCallback, SilentProgress, SubProgress};
pub use scene::{Scene, SceneLayer};
pub use solid::SolidColor;
pub use surface::{Pen, RendDesc, Surface};
pub use time::Time;
pub use transform::Transform;
