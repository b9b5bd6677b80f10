//! Color gradients: a scalar position in [0, 1] mapped to a color.
//!
//! A [`Gradient`] is a sorted list of color stops with linear interpolation
//! between them and constant extension past the ends. [`Gradient::sample_spread`]
//! averages the gradient over a window, which is how supersampled layers
//! antialias sharp gradient edges.

use crate::color::Color;
use crate::error::LayerError;
use serde::{Deserialize, Serialize};

/// Windows narrower than this are sampled at their center.
const SPREAD_EPSILON: f64 = 1e-12;

/// A single gradient stop.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GradientStop {
    pub pos: f64,
    pub color: Color,
}

/// Ordered mapping from position to color.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<GradientStop>", into = "Vec<GradientStop>")]
pub struct Gradient {
    stops: Vec<GradientStop>,
}

/// Names accepted by [`Gradient::from_name`].
const GRADIENT_NAMES: &[&str] = &[
    "default",
    "ocean",
    "neon",
    "earth",
    "monochrome",
    "vapor",
    "fire",
];

impl Gradient {
    /// Creates a gradient from stops in any order.
    ///
    /// Requires at least one stop, and all positions must be finite.
    pub fn new(mut stops: Vec<GradientStop>) -> Result<Self, LayerError> {
        if stops.is_empty() {
            return Err(LayerError::InvalidGradient(
                "gradient requires at least 1 stop".to_string(),
            ));
        }
        if stops.iter().any(|s| !s.pos.is_finite()) {
            return Err(LayerError::InvalidGradient(
                "stop positions must be finite".to_string(),
            ));
        }
        stops.sort_by(|a, b| a.pos.total_cmp(&b.pos));
        Ok(Self { stops })
    }

    /// Two-stop gradient from `start` at 0 to `end` at 1.
    pub fn two_color(start: Color, end: Color) -> Self {
        Self {
            stops: vec![
                GradientStop {
                    pos: 0.0,
                    color: start,
                },
                GradientStop {
                    pos: 1.0,
                    color: end,
                },
            ],
        }
    }

    /// Evenly spaced stops parsed from hex colors.
    pub fn from_hex(hexes: &[&str]) -> Result<Self, LayerError> {
        let colors = hexes
            .iter()
            .map(|h| Color::from_hex(h))
            .collect::<Result<Vec<_>, _>>()?;
        Self::evenly_spaced(&colors)
    }

    /// Evenly spaced stops over [0, 1]. A single color covers the whole range.
    pub fn evenly_spaced(colors: &[Color]) -> Result<Self, LayerError> {
        let n = colors.len();
        let stops = colors
            .iter()
            .enumerate()
            .map(|(i, &color)| GradientStop {
                pos: if n > 1 {
                    i as f64 / (n - 1) as f64
                } else {
                    0.0
                },
                color,
            })
            .collect();
        Self::new(stops)
    }

    /// The stops, sorted by position.
    pub fn stops(&self) -> &[GradientStop] {
        &self.stops
    }

    /// Samples the gradient at `pos`. NaN samples as the first stop.
    pub fn sample(&self, pos: f64) -> Color {
        let pos = if pos.is_nan() { f64::NEG_INFINITY } else { pos };
        let first = self.stops[0];
        if pos <= first.pos {
            return first.color;
        }
        for pair in self.stops.windows(2) {
            let (lo, hi) = (pair[0], pair[1]);
            if pos < hi.pos {
                let width = hi.pos - lo.pos;
                if width <= 0.0 {
                    return hi.color;
                }
                return lo.color.lerp(hi.color, (pos - lo.pos) / width);
            }
        }
        self.stops[self.stops.len() - 1].color
    }

    /// Average color over `[pos - spread/2, pos + spread/2]`.
    ///
    /// The gradient is linear between consecutive stop positions, so a midpoint
    /// sum over those pieces is exact (including hard edges).
    pub fn sample_spread(&self, pos: f64, spread: f64) -> Color {
        if !(spread.abs() > SPREAD_EPSILON) || !pos.is_finite() || !spread.is_finite() {
            return self.sample(pos);
        }
        let half = spread.abs() * 0.5;
        let (lo, hi) = (pos - half, pos + half);

        let mut knots = Vec::with_capacity(self.stops.len() + 2);
        knots.push(lo);
        knots.extend(
            self.stops
                .iter()
                .map(|s| s.pos)
                .filter(|&p| p > lo && p < hi),
        );
        knots.push(hi);

        let mut sum = Color::new(0.0, 0.0, 0.0, 0.0);
        for pair in knots.windows(2) {
            let w = pair[1] - pair[0];
            if w <= 0.0 {
                continue;
            }
            let mid = self.sample(pair[0] + w * 0.5);
            sum.r += mid.r * w;
            sum.g += mid.g * w;
            sum.b += mid.b * w;
            sum.a += mid.a * w;
        }
        let width = hi - lo;
        Color::new(sum.r / width, sum.g / width, sum.b / width, sum.a / width)
    }

    // -- Built-in gradients --

    /// Looks up a built-in gradient by name.
    pub fn from_name(name: &str) -> Result<Self, LayerError> {
        let hexes: &[&str] = match name {
            "default" => return Ok(Self::default()),
            "ocean" => &["#001f3f", "#003366", "#005f73", "#0a9396", "#94d2bd"],
            "neon" => &["#ff00ff", "#00ff41", "#ffff00", "#ff0080", "#00ffff"],
            "earth" => &["#5c4033", "#8b6914", "#6b8e23", "#daa520", "#d2b48c"],
            "monochrome" => &["#000000", "#404040", "#808080", "#c0c0c0", "#ffffff"],
            "vapor" => &["#7b2d8e", "#c77dff", "#ff9ebb", "#80ced6", "#a0e7e5"],
            "fire" => &["#800000", "#cc0000", "#ff4500", "#ff8c00", "#ffd700"],
            _ => {
                return Err(LayerError::InvalidGradient(format!(
                    "unknown gradient '{name}'"
                )))
            }
        };
        Self::from_hex(hexes)
    }

    /// Names of all built-in gradients.
    pub fn list_names() -> &'static [&'static str] {
        GRADIENT_NAMES
    }
}

impl Default for Gradient {
    /// Opaque black to opaque white.
    fn default() -> Self {
        Self::two_color(Color::BLACK, Color::WHITE)
    }
}

impl TryFrom<Vec<GradientStop>> for Gradient {
    type Error = LayerError;

    fn try_from(stops: Vec<GradientStop>) -> Result<Self, Self::Error> {
        Self::new(stops)
    }
}

impl From<Gradient> for Vec<GradientStop> {
    fn from(g: Gradient) -> Self {
        g.stops
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

    fn gray(v: f64) -> Color {
        Color::new(v, v, v, 1.0)
    }

    #[test]
    fn new_with_no_stops_is_an_error() {
        assert!(Gradient::new(vec![]).is_err());
        assert!(Gradient::from_hex(&[]).is_err());
    }

    #[test]
    fn new_rejects_nan_position() {
        let stops = vec![GradientStop {
            pos: f64::NAN,
            color: Color::WHITE,
        }];
        assert!(Gradient::new(stops).is_err());
    }

    #[test]
    fn new_sorts_stops() {
        let g = Gradient::new(vec![
            GradientStop {
                pos: 1.0,
                color: Color::WHITE,
            },
            GradientStop {
                pos: 0.0,
                color: Color::BLACK,
            },
        ])
        .unwrap();
        assert_eq!(g.stops()[0].pos, 0.0);
        assert_eq!(g, Gradient::default());
    }

    #[test]
    fn default_gradient_is_linear_gray_ramp() {
        let g = Gradient::default();
        for t in [0.0, 0.25, 0.5, 0.75, 1.0] {
            assert!(approx_eq(g.sample(t), gray(t)), "t={t}");
        }
    }

    #[test]
    fn sample_clamps_outside_range_and_handles_nan() {
        let g = Gradient::default();
        assert!(approx_eq(g.sample(-3.0), Color::BLACK));
        assert!(approx_eq(g.sample(7.0), Color::WHITE));
        assert!(approx_eq(g.sample(f64::NAN), Color::BLACK));
    }

    #[test]
    fn single_stop_is_constant() {
        let g = Gradient::evenly_spaced(&[Color::WHITE]).unwrap();
        assert!(approx_eq(g.sample(0.3), Color::WHITE));
        assert!(approx_eq(g.sample_spread(0.3, 0.5), Color::WHITE));
    }

    #[test]
    fn zero_spread_matches_point_sample() {
        let g = Gradient::from_name("fire").unwrap();
        assert!(approx_eq(g.sample_spread(0.42, 0.0), g.sample(0.42)));
    }

    #[test]
    fn spread_on_linear_ramp_averages_to_center() {
        let g = Gradient::default();
        assert!(approx_eq(g.sample_spread(0.5, 0.2), gray(0.5)));
    }

    #[test]
    fn spread_over_sharp_edge_averages_both_sides() {
        // Hard edge at 0.5: black below, white above.
        let g = Gradient::new(vec![
            GradientStop {
                pos: 0.5,
                color: Color::BLACK,
            },
            GradientStop {
                pos: 0.5,
                color: Color::WHITE,
            },
        ])
        .unwrap();
        assert!(approx_eq(g.sample(0.49), Color::BLACK));
        assert!(approx_eq(g.sample(0.51), Color::WHITE));
        assert!(approx_eq(g.sample_spread(0.5, 0.2), gray(0.5)));
    }

    #[test]
    fn spread_past_the_end_uses_end_color() {
        let g = Gradient::default();
        // Window [0.9, 1.3]: ramp from 0.9 to 1.0, then constant white.
        let expected = (0.1 * 0.95 + 0.3 * 1.0) / 0.4;
        assert!(approx_eq(g.sample_spread(1.1, 0.4), gray(expected)));
    }

    #[test]
    fn all_named_gradients_construct() {
        for name in Gradient::list_names() {
            assert!(Gradient::from_name(name).is_ok(), "{name}");
        }
        assert!(Gradient::from_name("plaid").is_err());
    }

    #[test]
    fn serde_round_trip() {
        let g = Gradient::from_name("ocean").unwrap();
        let json = serde_json::to_string(&g).unwrap();
        let back: Gradient = serde_json::from_str(&json).unwrap();
        assert_eq!(back.stops().len(), g.stops().len());
        assert!(serde_json::from_str::<Gradient>("[]").is_err());
    }

    mod proptests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn spread_sample_stays_within_stop_hull(
                pos in -0.5_f64..1.5,
                spread in 0.0_f64..2.0,
            ) {
                let g = Gradient::from_name("monochrome").unwrap();
                let c = g.sample_spread(pos, spread);
                prop_assert!(c.is_finite());
                prop_assert!(c.r >= -EPSILON && c.r <= 1.0 + EPSILON, "r {}", c.r);
            }
        }
    }
}
