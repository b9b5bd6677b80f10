//! RGBA color type and blend arithmetic.
//!
//! Colors carry straight (non-premultiplied) alpha with `f64` components.
//! Components are not clamped: additive blending may push them above 1.
//! [`blend`] is the single compositing entry point every layer uses to fold
//! its own contribution over the color beneath it.

use crate::error::LayerError;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// Alpha values below this are treated as fully transparent when dividing.
const ALPHA_EPSILON: f64 = 1e-12;

/// RGBA color with straight alpha.
///
/// Serializes as a hex string: `"#rrggbb"` when opaque, `"#rrggbbaa"` otherwise.
/// The hex round-trip has 8-bit quantization.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Color {
    pub r: f64,
    pub g: f64,
    pub b: f64,
    pub a: f64,
}

impl Color {
    /// Fully transparent black, the color of "nothing below".
    pub const TRANSPARENT: Color = Color::new(0.0, 0.0, 0.0, 0.0);
    pub const BLACK: Color = Color::new(0.0, 0.0, 0.0, 1.0);
    pub const WHITE: Color = Color::new(1.0, 1.0, 1.0, 1.0);

    pub const fn new(r: f64, g: f64, b: f64, a: f64) -> Self {
        Self { r, g, b, a }
    }

    /// Returns the same color with a different alpha.
    pub fn with_alpha(self, a: f64) -> Self {
        Self { a, ..self }
    }

    /// Component-wise linear interpolation, `t = 0` gives `self`.
    pub fn lerp(self, other: Color, t: f64) -> Color {
        Color {
            r: self.r + (other.r - self.r) * t,
            g: self.g + (other.g - self.g) * t,
            b: self.b + (other.b - self.b) * t,
            a: self.a + (other.a - self.a) * t,
        }
    }

    /// Multiplies the color channels by alpha.
    pub fn premultiplied(self) -> Color {
        Color {
            r: self.r * self.a,
            g: self.g * self.a,
            b: self.b * self.a,
            a: self.a,
        }
    }

    /// Inverse of [`Color::premultiplied`]. Near-zero alpha yields transparent.
    pub fn from_premultiplied(c: Color) -> Color {
        if c.a.abs() < ALPHA_EPSILON {
            return Color::TRANSPARENT;
        }
        Color {
            r: c.r / c.a,
            g: c.g / c.a,
            b: c.b / c.a,
            a: c.a,
        }
    }

    /// Returns true if all four components are finite.
    pub fn is_finite(&self) -> bool {
        self.r.is_finite() && self.g.is_finite() && self.b.is_finite() && self.a.is_finite()
    }

    /// Quantizes to 8-bit RGBA with clamping.
    pub fn to_rgba8(self) -> [u8; 4] {
        let q = |c: f64| (c.clamp(0.0, 1.0) * 255.0).round() as u8;
        [q(self.r), q(self.g), q(self.b), q(self.a)]
    }

    /// Parses `"#rrggbb"`, `"#rrggbbaa"` or the same without `#` (case insensitive).
    ///
    /// Returns `LayerError::InvalidColor` for anything else.
    pub fn from_hex(hex: &str) -> Result<Color, LayerError> {
        let hex = hex.strip_prefix('#').unwrap_or(hex);
        if hex.len() != 6 && hex.len() != 8 {
            return Err(LayerError::InvalidColor(format!(
                "expected 6 or 8 hex digits, got {}",
                hex.len()
            )));
        }
        let component = |range: std::ops::Range<usize>, label: &str| {
            hex.get(range)
                .ok_or_else(|| LayerError::InvalidColor(format!("invalid {label} component")))
                .and_then(|s| {
                    u8::from_str_radix(s, 16).map_err(|e| {
                        LayerError::InvalidColor(format!("invalid {label} component: {e}"))
                    })
                })
                .map(|v| f64::from(v) / 255.0)
        };
        let r = component(0..2, "red")?;
        let g = component(2..4, "green")?;
        let b = component(4..6, "blue")?;
        let a = if hex.len() == 8 {
            component(6..8, "alpha")?
        } else {
            1.0
        };
        Ok(Color { r, g, b, a })
    }

    /// Formats as `"#rrggbb"` if opaque, `"#rrggbbaa"` otherwise.
    pub fn to_hex(self) -> String {
        let [r, g, b, a] = self.to_rgba8();
        if a == 255 {
            format!("#{r:02x}{g:02x}{b:02x}")
        } else {
            format!("#{r:02x}{g:02x}{b:02x}{a:02x}")
        }
    }
}

impl Default for Color {
    fn default() -> Self {
        Color::TRANSPARENT
    }
}

impl Serialize for Color {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for Color {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Color::from_hex(&s).map_err(serde::de::Error::custom)
    }
}

/// How a layer's color is folded over the color beneath it.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BlendMethod {
    /// Porter-Duff "over" with the layer alpha scaled by amount.
    #[default]
    Composite,
    /// Replace the color below, interpolated by amount. Amount 1 is a pass-through
    /// of the layer color.
    Straight,
    /// Like composite, but only where there is something below.
    Onto,
    /// Place the layer behind the color below.
    Behind,
    Screen,
    Multiply,
    Add,
    /// Cut the layer's alpha out of the color below.
    AlphaOver,
}

impl BlendMethod {
    /// All methods in declaration order.
    pub const ALL: [BlendMethod; 8] = [
        BlendMethod::Composite,
        BlendMethod::Straight,
        BlendMethod::Onto,
        BlendMethod::Behind,
        BlendMethod::Screen,
        BlendMethod::Multiply,
        BlendMethod::Add,
        BlendMethod::AlphaOver,
    ];

    /// The snake_case name used in parameters and scene files.
    pub fn name(self) -> &'static str {
        match self {
            BlendMethod::Composite => "composite",
            BlendMethod::Straight => "straight",
            BlendMethod::Onto => "onto",
            BlendMethod::Behind => "behind",
            BlendMethod::Screen => "screen",
            BlendMethod::Multiply => "multiply",
            BlendMethod::Add => "add",
            BlendMethod::AlphaOver => "alpha_over",
        }
    }

    /// Names of all methods, for parameter enum vocabularies.
    pub const NAMES: &'static [&'static str] = &[
        "composite",
        "straight",
        "onto",
        "behind",
        "screen",
        "multiply",
        "add",
        "alpha_over",
    ];
}

impl fmt::Display for BlendMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for BlendMethod {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        BlendMethod::ALL
            .into_iter()
            .find(|m| m.name() == s)
            .ok_or_else(|| format!("unknown blend method '{s}'"))
    }
}

/// Blends `a` (the layer's color) over `b` (the color below).
///
/// Pure function of its inputs. `amount` scales the layer's contribution;
/// `amount == 0` returns `b` for every method.
pub fn blend(a: Color, b: Color, amount: f64, method: BlendMethod) -> Color {
    match method {
        BlendMethod::Composite => composite(a, b, amount),
        BlendMethod::Straight => straight(a, b, amount),
        BlendMethod::Onto => {
            let c = composite(a, b, amount);
            if b.a.abs() < ALPHA_EPSILON {
                b
            } else {
                c.with_alpha(b.a)
            }
        }
        BlendMethod::Behind => composite(b, a.with_alpha(a.a * amount), 1.0),
        BlendMethod::Screen => {
            channel_op(a, b, amount, |s, d| 1.0 - (1.0 - s) * (1.0 - d))
        }
        BlendMethod::Multiply => channel_op(a, b, amount, |s, d| s * d),
        BlendMethod::Add => channel_op(a, b, amount, |s, d| s + d),
        BlendMethod::AlphaOver => {
            let cut = b.with_alpha(b.a * (1.0 - a.a));
            straight(cut, b, amount)
        }
    }
}

fn composite(src: Color, dst: Color, amount: f64) -> Color {
    let sa = src.a * amount;
    let keep = dst.a * (1.0 - sa);
    let out_a = sa + keep;
    if out_a.abs() < ALPHA_EPSILON {
        return Color::TRANSPARENT;
    }
    let mix = |s: f64, d: f64| (s * sa + d * keep) / out_a;
    Color {
        r: mix(src.r, dst.r),
        g: mix(src.g, dst.g),
        b: mix(src.b, dst.b),
        a: out_a,
    }
}

fn straight(src: Color, dst: Color, amount: f64) -> Color {
    let out_a = (src.a - dst.a) * amount + dst.a;
    if out_a.abs() < ALPHA_EPSILON {
        return Color::TRANSPARENT;
    }
    let mix = |s: f64, d: f64| ((s * src.a - d * dst.a) * amount + d * dst.a) / out_a;
    Color {
        r: mix(src.r, dst.r),
        g: mix(src.g, dst.g),
        b: mix(src.b, dst.b),
        a: out_a,
    }
}

/// Applies a per-channel operator, then fades it in by the layer's alpha times
/// amount. The alpha below is preserved.
fn channel_op(src: Color, dst: Color, amount: f64, op: impl Fn(f64, f64) -> f64) -> Color {
    let k = src.a * amount;
    let apply = |s: f64, d: f64| d + (op(s, d) - d) * k;
    Color {
        r: apply(src.r, dst.r),
        g: apply(src.g, dst.g),
        b: apply(src.b, dst.b),
        a: dst.a,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPSILON: f64 = 1e-9;

    fn approx_eq(a: Color, b: Color) -> bool {
        (a.r - b.r).abs() < EPSILON
            && (a.g - b.g).abs() < EPSILON
            && (a.b - b.b).abs() < EPSILON
            && (a.a - b.a).abs() < EPSILON
    }

    fn red() -> Color {
        Color::new(1.0, 0.0, 0.0, 1.0)
    }

    fn half_blue() -> Color {
        Color::new(0.0, 0.0, 1.0, 0.5)
    }

    // -- Hex parsing --

    #[test]
    fn from_hex_parses_rgb_with_hash() {
        let c = Color::from_hex("#ff0000").unwrap();
        assert!(approx_eq(c, red()));
    }

    #[test]
    fn from_hex_parses_rgba_without_hash() {
        let c = Color::from_hex("0000ff80").unwrap();
        assert!((c.a - 128.0 / 255.0).abs() < EPSILON);
        assert!((c.b - 1.0).abs() < EPSILON);
    }

    #[test]
    fn from_hex_rejects_bad_input() {
        assert!(Color::from_hex("#gggggg").is_err());
        assert!(Color::from_hex("#fff").is_err());
        assert!(Color::from_hex("").is_err());
        assert!(Color::from_hex("#ff00ff0").is_err());
    }

    #[test]
    fn to_hex_omits_alpha_when_opaque() {
        assert_eq!(red().to_hex(), "#ff0000");
        assert_eq!(Color::TRANSPARENT.to_hex(), "#00000000");
    }

    #[test]
    fn color_serializes_as_hex_string() {
        let json = serde_json::to_string(&red()).unwrap();
        assert_eq!(json, "\"#ff0000\"");
        let back: Color = serde_json::from_str("\"#00ff0080\"").unwrap();
        assert!((back.g - 1.0).abs() < EPSILON);
        assert!(serde_json::from_str::<Color>("\"nope\"").is_err());
    }

    #[test]
    fn premultiply_round_trip() {
        let c = Color::new(0.2, 0.4, 0.6, 0.5);
        assert!(approx_eq(Color::from_premultiplied(c.premultiplied()), c));
        assert_eq!(
            Color::from_premultiplied(Color::new(1.0, 1.0, 1.0, 0.0)),
            Color::TRANSPARENT
        );
    }

    // -- Blend methods --

    #[test]
    fn amount_zero_returns_color_below_for_every_method() {
        let below = Color::new(0.3, 0.6, 0.9, 0.7);
        for method in BlendMethod::ALL {
            let out = blend(red(), below, 0.0, method);
            assert!(approx_eq(out, below), "{method}: {out:?}");
        }
    }

    #[test]
    fn straight_with_full_amount_is_pass_through() {
        let out = blend(half_blue(), red(), 1.0, BlendMethod::Straight);
        assert!(approx_eq(out, half_blue()));
    }

    #[test]
    fn composite_opaque_over_anything_is_opaque() {
        let out = blend(red(), half_blue(), 1.0, BlendMethod::Composite);
        assert!(approx_eq(out, red()));
    }

    #[test]
    fn composite_half_alpha_over_opaque() {
        let out = blend(half_blue(), red(), 1.0, BlendMethod::Composite);
        assert!(approx_eq(out, Color::new(0.5, 0.0, 0.5, 1.0)));
    }

    #[test]
    fn composite_over_transparent_keeps_source() {
        let out = blend(half_blue(), Color::TRANSPARENT, 1.0, BlendMethod::Composite);
        assert!(approx_eq(out, half_blue()));
    }

    #[test]
    fn onto_keeps_alpha_below() {
        let out = blend(red(), half_blue(), 1.0, BlendMethod::Onto);
        assert!((out.a - 0.5).abs() < EPSILON);
        let nothing = blend(red(), Color::TRANSPARENT, 1.0, BlendMethod::Onto);
        assert_eq!(nothing.a, 0.0);
    }

    #[test]
    fn behind_keeps_opaque_color_below_on_top() {
        let out = blend(half_blue(), red(), 1.0, BlendMethod::Behind);
        assert!(approx_eq(out, red()));
    }

    #[test]
    fn multiply_with_white_is_identity() {
        let below = Color::new(0.3, 0.6, 0.9, 1.0);
        let out = blend(Color::WHITE, below, 1.0, BlendMethod::Multiply);
        assert!(approx_eq(out, below));
    }

    #[test]
    fn screen_with_black_is_identity() {
        let below = Color::new(0.3, 0.6, 0.9, 1.0);
        let out = blend(Color::BLACK, below, 1.0, BlendMethod::Screen);
        assert!(approx_eq(out, below));
    }

    #[test]
    fn add_sums_channels() {
        let out = blend(
            Color::new(0.25, 0.25, 0.25, 1.0),
            Color::new(0.5, 0.5, 0.5, 1.0),
            1.0,
            BlendMethod::Add,
        );
        assert!(approx_eq(out, Color::new(0.75, 0.75, 0.75, 1.0)));
    }

    #[test]
    fn alpha_over_cuts_out_below() {
        let out = blend(Color::WHITE, red(), 1.0, BlendMethod::AlphaOver);
        assert!(out.a.abs() < EPSILON);
    }

    #[test]
    fn blend_method_names_round_trip() {
        for method in BlendMethod::ALL {
            assert_eq!(method.name().parse::<BlendMethod>().unwrap(), method);
            let json = serde_json::to_string(&method).unwrap();
            assert_eq!(json, format!("\"{}\"", method.name()));
        }
        assert_eq!(BlendMethod::NAMES.len(), BlendMethod::ALL.len());
        assert!("darken".parse::<BlendMethod>().is_err());
    }

    mod proptests {
        use super::*;
        use proptest::prelude::*;

        fn unit() -> impl Strategy<Value = f64> {
            0.0_f64..=1.0
        }

        proptest! {
            #[test]
            fn composite_alpha_stays_in_unit_interval(
                sa in unit(), da in unit(), amount in unit(),
                r in unit(), g in unit(),
            ) {
                let out = blend(
                    Color::new(r, g, 0.5, sa),
                    Color::new(g, r, 0.5, da),
                    amount,
                    BlendMethod::Composite,
                );
                prop_assert!(out.is_finite());
                prop_assert!(out.a >= -EPSILON && out.a <= 1.0 + EPSILON, "alpha {}", out.a);
            }

            #[test]
            fn straight_never_produces_nan(
                sa in unit(), da in unit(), amount in unit(),
            ) {
                let out = blend(
                    Color::new(0.1, 0.2, 0.3, sa),
                    Color::new(0.4, 0.5, 0.6, da),
                    amount,
                    BlendMethod::Straight,
                );
                prop_assert!(out.is_finite());
            }
        }
    }
}
