//! Canvas construction from a [`Scene`] description.

use serde_json::Value;
use strata_core::{
    Canvas, CanvasLayer, Layer, LayerError, ParamValue, ProgressCallback, Scene, SceneLayer,
    Surface,
};
use tracing::debug;

use crate::LayerKind;

/// Instantiates every scene layer, applies its parameter overrides, and
/// stacks the results bottom-to-top on a new canvas.
pub fn build_canvas(scene: &Scene) -> Result<Canvas, LayerError> {
    scene.validate()?;
    let mut canvas = Canvas::new(scene.width, scene.height, scene.tl, scene.br)?;
    canvas.set_background(scene.background);
    for entry in &scene.layers {
        let layer = build_layer(entry)?;
        debug!(kind = %entry.kind, name = entry.display_name(), "layer added");
        canvas.add_layer(
            CanvasLayer::new(entry.display_name(), Box::new(layer)).with_enabled(entry.enabled),
        )?;
    }
    Ok(canvas)
}

/// Builds a single layer with its overrides applied.
pub fn build_layer(entry: &SceneLayer) -> Result<LayerKind, LayerError> {
    let mut layer = LayerKind::from_name(&entry.kind)?;
    apply_params(&mut layer, &entry.params)?;
    Ok(layer)
}

/// Sets each key of a JSON object as a parameter, converting the value with
/// the type the layer declares for that key.
pub fn apply_params(layer: &mut dyn Layer, params: &Value) -> Result<(), LayerError> {
    let object = match params {
        Value::Object(map) => map,
        Value::Null => return Ok(()),
        other => {
            return Err(LayerError::InvalidScene(format!(
                "layer params must be an object, got {other}"
            )))
        }
    };
    let vocab = layer.param_vocab();
    for (key, json) in object {
        let desc = vocab
            .iter()
            .find(|d| d.name == key.as_str())
            .ok_or_else(|| LayerError::UnknownParam(key.clone()))?;
        let value = ParamValue::from_json(key, json, desc.param_type)?;
        layer.set_param(key, value)?;
    }
    Ok(())
}

/// Builds the scene's canvas and renders it at the scene's time and quality.
pub fn render_scene(
    scene: &Scene,
    progress: &mut dyn ProgressCallback,
) -> Result<Surface, LayerError> {
    build_canvas(scene)?.render(scene.time, scene.quality, progress)
}
