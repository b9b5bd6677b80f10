//! Typed layer parameters.
//!
//! Every layer exposes its settings as string keys mapped to a tagged
//! [`ParamValue`]. A layer declares its vocabulary once, as a static
//! [`ParamTable`] of getter/setter function pointers, and the table performs
//! lookup and type checking on the layer's behalf.
//!
//! JSON conversion ([`ParamValue::from_json`]) is keyed by the declared
//! [`ParamType`], so scene files can use plain JSON scalars, `[x, y]` pairs,
//! hex color strings and gradient names.

use std::fmt;

use serde::Serialize;
use serde_json::{json, Value};

use crate::color::Color;
use crate::error::LayerError;
use crate::geometry::Point;
use crate::gradient::{Gradient, GradientStop};

/// The type tag of a parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ParamType {
    Real,
    Integer,
    Bool,
    Point,
    Color,
    Gradient,
    Enum,
}

impl ParamType {
    pub fn name(self) -> &'static str {
        match self {
            Self::Real => "real",
            Self::Integer => "integer",
            Self::Bool => "bool",
            Self::Point => "point",
            Self::Color => "color",
            Self::Gradient => "gradient",
            Self::Enum => "enum",
        }
    }
}

impl fmt::Display for ParamType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A parameter value.
#[derive(Debug, Clone, PartialEq)]
pub enum ParamValue {
    Real(f64),
    Integer(i64),
    Bool(bool),
    Point(Point),
    Color(Color),
    Gradient(Gradient),
    /// One of the parameter's declared `enum_values`.
    Enum(String),
}

impl ParamValue {
    pub fn param_type(&self) -> ParamType {
        match self {
            Self::Real(_) => ParamType::Real,
            Self::Integer(_) => ParamType::Integer,
            Self::Bool(_) => ParamType::Bool,
            Self::Point(_) => ParamType::Point,
            Self::Color(_) => ParamType::Color,
            Self::Gradient(_) => ParamType::Gradient,
            Self::Enum(_) => ParamType::Enum,
        }
    }

    pub fn as_real(&self) -> Option<f64> {
        match *self {
            Self::Real(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_integer(&self) -> Option<i64> {
        match *self {
            Self::Integer(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match *self {
            Self::Bool(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_point(&self) -> Option<Point> {
        match *self {
            Self::Point(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_color(&self) -> Option<Color> {
        match *self {
            Self::Color(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_gradient(&self) -> Option<&Gradient> {
        match self {
            Self::Gradient(g) => Some(g),
            _ => None,
        }
    }

    pub fn as_enum(&self) -> Option<&str> {
        match self {
            Self::Enum(s) => Some(s),
            _ => None,
        }
    }

    /// Converts a JSON value into a parameter of type `ty`.
    ///
    /// Accepted encodings:
    /// - real: any JSON number
    /// - integer: an integral JSON number
    /// - point: `[x, y]` or `{"x": .., "y": ..}`
    /// - color: a `#rrggbb` / `#rrggbbaa` string
    /// - gradient: a built-in gradient name, or an array of `{pos, color}` stops
    /// - enum: a string
    pub fn from_json(name: &str, value: &Value, ty: ParamType) -> Result<Self, LayerError> {
        let mismatch = || LayerError::ParamTypeMismatch {
            name: name.to_string(),
            expected: ty.name().to_string(),
            got: json_kind(value).to_string(),
        };
        let converted = match ty {
            ParamType::Real => value.as_f64().map(Self::Real),
            ParamType::Integer => value.as_i64().map(Self::Integer),
            ParamType::Bool => value.as_bool().map(Self::Bool),
            ParamType::Point => json_point(value).map(Self::Point),
            ParamType::Color => match value.as_str() {
                Some(hex) => Some(Self::Color(Color::from_hex(hex)?)),
                None => None,
            },
            ParamType::Gradient => match value {
                Value::String(s) => Some(Self::Gradient(Gradient::from_name(s)?)),
                Value::Array(_) => {
                    let stops: Vec<GradientStop> = serde_json::from_value(value.clone())
                        .map_err(|e| LayerError::InvalidGradient(e.to_string()))?;
                    Some(Self::Gradient(Gradient::new(stops)?))
                }
                _ => None,
            },
            ParamType::Enum => value.as_str().map(|s| Self::Enum(s.to_string())),
        };
        converted.ok_or_else(mismatch)
    }

    /// JSON form, readable by [`ParamValue::from_json`].
    pub fn to_json(&self) -> Value {
        match self {
            Self::Real(v) => json!(v),
            Self::Integer(v) => json!(v),
            Self::Bool(v) => json!(v),
            Self::Point(p) => json!([p.x, p.y]),
            Self::Color(c) => json!(c.to_hex()),
            Self::Gradient(g) => Value::Array(
                g.stops()
                    .iter()
                    .map(|s| json!({"pos": s.pos, "color": s.color.to_hex()}))
                    .collect(),
            ),
            Self::Enum(s) => json!(s),
        }
    }
}

fn json_point(value: &Value) -> Option<Point> {
    match value {
        Value::Array(items) if items.len() == 2 => {
            Some(Point::new(items[0].as_f64()?, items[1].as_f64()?))
        }
        Value::Object(map) => Some(Point::new(
            map.get("x")?.as_f64()?,
            map.get("y")?.as_f64()?,
        )),
        _ => None,
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Static description of one parameter.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ParamDesc {
    pub name: &'static str,
    /// Human-readable display name.
    pub local_name: &'static str,
    pub description: &'static str,
    pub param_type: ParamType,
    /// Accepted values for [`ParamType::Enum`] parameters; empty otherwise.
    pub enum_values: &'static [&'static str],
}

impl ParamDesc {
    pub const fn new(
        name: &'static str,
        local_name: &'static str,
        description: &'static str,
        param_type: ParamType,
    ) -> Self {
        Self {
            name,
            local_name,
            description,
            param_type,
            enum_values: &[],
        }
    }

    pub const fn with_enum_values(mut self, values: &'static [&'static str]) -> Self {
        self.enum_values = values;
        self
    }
}

/// One row of a [`ParamTable`].
///
/// `set` receives a value whose type already matches `desc.param_type`. It
/// returns `Err(reason)` to reject the value and must leave the layer
/// untouched when it does.
pub struct ParamEntry<L> {
    pub desc: ParamDesc,
    pub get: fn(&L) -> ParamValue,
    pub set: fn(&mut L, ParamValue) -> Result<(), String>,
}

/// A layer's full parameter vocabulary.
pub struct ParamTable<L: 'static> {
    entries: &'static [ParamEntry<L>],
}

impl<L: 'static> ParamTable<L> {
    pub const fn new(entries: &'static [ParamEntry<L>]) -> Self {
        Self { entries }
    }

    /// Descriptions in declaration order.
    pub fn descs(&self) -> Vec<ParamDesc> {
        self.entries.iter().map(|e| e.desc).collect()
    }

    pub fn desc(&self, key: &str) -> Option<&ParamDesc> {
        self.entries
            .iter()
            .find(|e| e.desc.name == key)
            .map(|e| &e.desc)
    }

    pub fn get(&self, layer: &L, key: &str) -> Result<ParamValue, LayerError> {
        let entry = self.entry(key)?;
        Ok((entry.get)(layer))
    }

    pub fn set(&self, layer: &mut L, key: &str, value: ParamValue) -> Result<(), LayerError> {
        let entry = self.entry(key)?;
        let expected = entry.desc.param_type;
        if value.param_type() != expected {
            return Err(LayerError::ParamTypeMismatch {
                name: key.to_string(),
                expected: expected.name().to_string(),
                got: value.param_type().name().to_string(),
            });
        }
        if let Some(choice) = value.as_enum() {
            if !entry.desc.enum_values.contains(&choice) {
                return Err(LayerError::InvalidParamValue {
                    name: key.to_string(),
                    reason: format!(
                        "'{choice}' is not one of: {}",
                        entry.desc.enum_values.join(", ")
                    ),
                });
            }
        }
        (entry.set)(layer, value).map_err(|reason| LayerError::InvalidParamValue {
            name: key.to_string(),
            reason,
        })
    }

    fn entry(&self, key: &str) -> Result<&ParamEntry<L>, LayerError> {
        self.entries
            .iter()
            .find(|e| e.desc.name == key)
            .ok_or_else(|| LayerError::UnknownParam(key.to_string()))
    }
}
