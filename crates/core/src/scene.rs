//! Serializable scene description.
//!
//! A [`Scene`] captures everything needed to reproduce a render: canvas size,
//! world window, background, evaluation time, quality, and the layer stack
//! with per-layer parameter overrides. Layer instantiation lives with the
//! layer registry, which knows the concrete kinds.

use serde::{Deserialize, Serialize};

use crate::color::Color;
use crate::error::LayerError;
use crate::geometry::Point;
use crate::time::Time;

/// Default render quality: full supersampling and bilinear resampling.
pub const DEFAULT_QUALITY: i32 = 3;

/// One layer entry of a scene, bottom-to-top.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SceneLayer {
    /// Registry name of the layer kind, e.g. `"noise"`.
    pub kind: String,
    /// Unique name within the scene. Defaults to the kind.
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default = "default_enabled")]
    pub enabled: bool,
    /// Parameter overrides, keyed by parameter name.
    #[serde(default = "empty_object")]
    pub params: serde_json::Value,
}

impl SceneLayer {
    pub fn new(kind: &str) -> Self {
        Self {
            kind: kind.to_string(),
            name: None,
            enabled: true,
            params: empty_object(),
        }
    }

    /// The entry's stack name: its explicit name, else its kind.
    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or(&self.kind)
    }
}

/// Reproducible description of a render.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Scene {
    pub width: usize,
    pub height: usize,
    #[serde(default = "default_tl", with = "point_serde")]
    pub tl: Point,
    #[serde(default = "default_br", with = "point_serde")]
    pub br: Point,
    #[serde(default)]
    pub background: Color,
    #[serde(default)]
    pub time: Time,
    #[serde(default = "default_quality")]
    pub quality: i32,
    #[serde(default)]
    pub layers: Vec<SceneLayer>,
}

impl Scene {
    /// Creates a scene with no layers over the default window `(-2, 2)..(2, -2)`.
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            tl: default_tl(),
            br: default_br(),
            background: Color::TRANSPARENT,
            time: Time::ZERO,
            quality: DEFAULT_QUALITY,
            layers: Vec::new(),
        }
    }

    /// Validates that the scene has non-zero dimensions, that
    /// `width * height` does not overflow, and that the window is finite and
    /// non-degenerate.
    pub fn validate(&self) -> Result<(), LayerError> {
        if self.width == 0 || self.height == 0 {
            return Err(LayerError::InvalidDimensions);
        }
        self.width
            .checked_mul(self.height)
            .ok_or(LayerError::InvalidDimensions)?;
        if !self.tl.is_finite() || !self.br.is_finite() {
            return Err(LayerError::InvalidScene(
                "view corners must be finite".to_string(),
            ));
        }
        if self.tl.x == self.br.x || self.tl.y == self.br.y {
            return Err(LayerError::InvalidScene(
                "view window has zero width or height".to_string(),
            ));
        }
        if !self.time.is_valid() {
            return Err(LayerError::InvalidScene("time is NaN".to_string()));
        }
        Ok(())
    }
}

fn default_tl() -> Point {
    Point::new(-2.0, 2.0)
}

fn default_br() -> Point {
    Point::new(2.0, -2.0)
}

fn default_quality() -> i32 {
    DEFAULT_QUALITY
}

fn default_enabled() -> bool {
    true
}

fn empty_object() -> serde_json::Value {
    serde_json::Value::Object(serde_json::Map::new())
}

/// Points as `[x, y]` arrays.
mod point_serde {
    use super::Point;
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    pub fn serialize<S: Serializer>(p: &Point, serializer: S) -> Result<S::Ok, S::Error> {
        [p.x, p.y].serialize(serializer)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Point, D::Error> {
        let [x, y] = <[f64; 2]>::deserialize(deserializer)?;
        Ok(Point::new(x, y))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_creates_scene_with_defaults() {
        let s = Scene::new(320, 240);
        assert_eq!(s.width, 320);
        assert_eq!(s.height, 240);
        assert_eq!(s.tl, Point::new(-2.0, 2.0));
        assert_eq!(s.quality, DEFAULT_QUALITY);
        assert!(s.layers.is_empty());
    }

    #[test]
    fn minimal_json_fills_defaults() {
        let s: Scene = serde_json::from_str(
            r#"{"width": 8, "height": 4, "layers": [{"kind": "noise"}]}"#,
        )
        .unwrap();
        assert_eq!(s.br, Point::new(2.0, -2.0));
        assert_eq!(s.background, Color::TRANSPARENT);
        assert_eq!(s.time, Time::ZERO);
        assert_eq!(s.layers[0].display_name(), "noise");
        assert!(s.layers[0].enabled);
        assert_eq!(s.layers[0].params, serde_json::json!({}));
    }

    #[test]
    fn json_round_trip_with_layers() {
        let mut s = Scene::new(64, 64);
        s.background = Color::from_hex("#020210").unwrap();
        s.time = Time::from_seconds(1.5);
        let mut warp = SceneLayer::new("warp");
        warp.name = Some("perspective".to_string());
        warp.params = serde_json::json!({"horizon": 2.0, "clip": false});
        s.layers = vec![SceneLayer::new("noise"), warp];

        let json = serde_json::to_string_pretty(&s).unwrap();
        let restored: Scene = serde_json::from_str(&json).unwrap();
        assert_eq!(s, restored);
        assert_eq!(restored.layers[1].display_name(), "perspective");
    }

    #[test]
    fn points_serialize_as_pairs() {
        let v = serde_json::to_value(Scene::new(1, 1)).unwrap();
        assert_eq!(v["tl"], serde_json::json!([-2.0, 2.0]));
    }

    #[test]
    fn validate_succeeds_for_valid_scene() {
        assert!(Scene::new(512, 512).validate().is_ok());
    }

    #[test]
    fn validate_fails_for_bad_dimensions() {
        for (w, h) in [(0, 512), (512, 0), (usize::MAX, 2)] {
            assert!(matches!(
                Scene::new(w, h).validate(),
                Err(LayerError::InvalidDimensions)
            ));
        }
    }

    #[test]
    fn validate_fails_for_degenerate_window() {
        let mut s = Scene::new(4, 4);
        s.br.x = s.tl.x;
        assert!(matches!(s.validate(), Err(LayerError::InvalidScene(_))));
        let mut s = Scene::new(4, 4);
        s.tl.y = f64::INFINITY;
        assert!(s.validate().is_err());
    }
}
