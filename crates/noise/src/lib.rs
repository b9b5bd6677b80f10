#![deny(unsafe_code)]
//! Multi-octave noise gradient layer.
//!
//! [`NoiseGradient`] sums octaves of [`RandomNoise`] at halving frequencies
//! and maps the result through a [`Gradient`]. Optional features: turbulence
//! (absolute value per octave), a second noise channel driving alpha, time
//! animation through `speed`, domain displacement, and supersampled edge
//! softening where the gradient is averaged over the local value spread.

use std::time::{SystemTime, UNIX_EPOCH};

use strata_core::{
    blend, BlendMethod, Color, Context, Gradient, Hit, Layer, LayerError, ParamDesc, ParamEntry,
    ParamTable, ParamType, ParamValue, Point, ProgressCallback, RandomNoise, RendDesc,
    SmoothType, SubProgress, Surface,
};
use tracing::debug;

/// Highest accepted `detail` (octave count).
pub const MAX_DETAIL: i64 = 30;

const DEFAULT_DETAIL: u32 = 4;

/// Qualities at or above this skip supersampling.
const DRAFT_QUALITY: i32 = 8;

/// Salt spacing between octaves.
const OCTAVE_SALT: i32 = 5;
/// Salt offset of the alpha channel within an octave.
const ALPHA_SALT: i32 = 3;
const DISPLACE_X_SALT: i32 = 1;
const DISPLACE_Y_SALT: i32 = 2;

/// Procedural noise mapped through a gradient.
#[derive(Debug, Clone, PartialEq)]
pub struct NoiseGradient {
    amount: f64,
    blend_method: BlendMethod,
    gradient: Gradient,
    random: RandomNoise,
    size: Point,
    smooth: SmoothType,
    detail: u32,
    speed: f64,
    turbulent: bool,
    do_alpha: bool,
    super_sample: bool,
    do_displacement: bool,
    displacement: Point,
}

/// Octave sums before they are mapped to a color.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
struct Octaves {
    amount: f64,
    /// Supersample neighbours along x and y; equal to `amount` when off.
    amount_x: f64,
    amount_y: f64,
    alpha: f64,
    supersampled: bool,
}

impl Octaves {
    fn spread(&self) -> f64 {
        let max = self.amount.max(self.amount_x).max(self.amount_y);
        let min = self.amount.min(self.amount_x).min(self.amount_y);
        max - min
    }
}

fn finite_real(v: &ParamValue, what: &str) -> Result<f64, String> {
    let r = v.as_real().ok_or("expected a real")?;
    if !r.is_finite() {
        return Err(format!("{what} must be finite"));
    }
    Ok(r)
}

fn finite_point(v: &ParamValue) -> Result<Point, String> {
    let p = v.as_point().ok_or("expected a point")?;
    if !p.is_finite() {
        return Err("point components must be finite".to_string());
    }
    Ok(p)
}

static PARAMS: ParamTable<NoiseGradient> = ParamTable::new(&[
    ParamEntry {
        desc: ParamDesc::new("amount", "Amount", "Opacity of the layer", ParamType::Real),
        get: |n| ParamValue::Real(n.amount),
        set: |n, v| {
            n.amount = finite_real(&v, "amount")?;
            Ok(())
        },
    },
    ParamEntry {
        desc: ParamDesc::new(
            "blend_method",
            "Blend Method",
            "How the noise combines with the layers below",
            ParamType::Enum,
        )
        .with_enum_values(BlendMethod::NAMES),
        get: |n| ParamValue::Enum(n.blend_method.name().to_string()),
        set: |n, v| {
            n.blend_method = v.as_enum().unwrap_or_default().parse::<BlendMethod>()?;
            Ok(())
        },
    },
    ParamEntry {
        desc: ParamDesc::new(
            "gradient",
            "Gradient",
            "Colors the noise value is mapped through",
            ParamType::Gradient,
        ),
        get: |n| ParamValue::Gradient(n.gradient.clone()),
        set: |n, v| {
            n.gradient = v.as_gradient().ok_or("expected a gradient")?.clone();
            Ok(())
        },
    },
    ParamEntry {
        desc: ParamDesc::new("seed", "RandomNoise Seed", "Seed of the noise field", ParamType::Integer),
        get: |n| ParamValue::Integer(i64::from(n.random.seed())),
        set: |n, v| {
            let seed = v.as_integer().ok_or("expected an integer")?;
            let seed = u32::try_from(seed).map_err(|_| "seed must fit in 32 bits unsigned")?;
            n.random.set_seed(seed);
            Ok(())
        },
    },
    ParamEntry {
        desc: ParamDesc::new("size", "Size", "Size of the coarsest octave's cells", ParamType::Point),
        get: |n| ParamValue::Point(n.size),
        set: |n, v| {
            let size = finite_point(&v)?;
            if size.x == 0.0 || size.y == 0.0 {
                return Err("size components must be non-zero".to_string());
            }
            n.size = size;
            Ok(())
        },
    },
    ParamEntry {
        desc: ParamDesc::new(
            "smooth",
            "Interpolation",
            "What type of interpolation to use",
            ParamType::Enum,
        )
        .with_enum_values(SmoothType::NAMES),
        get: |n| ParamValue::Enum(n.smooth.name().to_string()),
        set: |n, v| {
            let name = v.as_enum().unwrap_or_default();
            n.smooth = SmoothType::from_name(name)
                .ok_or_else(|| format!("unknown interpolation '{name}'"))?;
            Ok(())
        },
    },
    ParamEntry {
        desc: ParamDesc::new("detail", "Detail", "Number of octaves", ParamType::Integer),
        get: |n| ParamValue::Integer(i64::from(n.detail)),
        set: |n, v| {
            let detail = v.as_integer().ok_or("expected an integer")?;
            if !(0..=MAX_DETAIL).contains(&detail) {
                return Err(format!("detail must be in 0..={MAX_DETAIL}"));
            }
            n.detail = detail as u32;
            Ok(())
        },
    },
    ParamEntry {
        desc: ParamDesc::new("speed", "Animation Speed", "Noise time units per second", ParamType::Real),
        get: |n| ParamValue::Real(n.speed),
        set: |n, v| {
            n.speed = finite_real(&v, "speed")?;
            Ok(())
        },
    },
    ParamEntry {
        desc: ParamDesc::new("turbulent", "Turbulent", "Fold each octave to its absolute value", ParamType::Bool),
        get: |n| ParamValue::Bool(n.turbulent),
        set: |n, v| {
            n.turbulent = v.as_bool().ok_or("expected a bool")?;
            Ok(())
        },
    },
    ParamEntry {
        desc: ParamDesc::new("do_alpha", "Do Alpha", "Drive alpha from a second noise channel", ParamType::Bool),
        get: |n| ParamValue::Bool(n.do_alpha),
        set: |n, v| {
            n.do_alpha = v.as_bool().ok_or("expected a bool")?;
            Ok(())
        },
    },
    ParamEntry {
        desc: ParamDesc::new("super_sample", "Super Sampling", "Soften edges over the pixel footprint", ParamType::Bool),
        get: |n| ParamValue::Bool(n.super_sample),
        set: |n, v| {
            n.super_sample = v.as_bool().ok_or("expected a bool")?;
            Ok(())
        },
    },
    ParamEntry {
        desc: ParamDesc::new(
            "do_displacement",
            "Do Displacement",
            "Offset the sample point by two extra noise channels",
            ParamType::Bool,
        ),
        get: |n| ParamValue::Bool(n.do_displacement),
        set: |n, v| {
            n.do_displacement = v.as_bool().ok_or("expected a bool")?;
            Ok(())
        },
    },
    ParamEntry {
        desc: ParamDesc::new("displacement", "Displacement", "Displacement strength per axis", ParamType::Point),
        get: |n| ParamValue::Point(n.displacement),
        set: |n, v| {
            n.displacement = finite_point(&v)?;
            Ok(())
        },
    },
]);

impl Default for NoiseGradient {
    fn default() -> Self {
        Self::new()
    }
}

impl NoiseGradient {
    /// Seeded from the wall clock, so two layers made at different times differ.
    pub fn new() -> Self {
        let seed = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs() as u32)
            .unwrap_or(0);
        Self::with_seed(seed)
    }

    /// Default parameters with a fixed seed; equal seeds render identically.
    pub fn with_seed(seed: u32) -> Self {
        Self {
            amount: 1.0,
            blend_method: BlendMethod::Composite,
            gradient: Gradient::two_color(Color::BLACK, Color::WHITE),
            random: RandomNoise::new(seed),
            size: Point::ONE,
            smooth: SmoothType::Cosine,
            detail: DEFAULT_DETAIL,
            speed: 0.0,
            turbulent: false,
            do_alpha: false,
            super_sample: false,
            do_displacement: false,
            displacement: Point::ONE,
        }
    }

    /// The seed of the lattice generator.
    pub fn seed(&self) -> u32 {
        self.random.seed()
    }

    /// Color ramp sampled by the normalized noise value.
    pub fn gradient(&self) -> &Gradient {
        &self.gradient
    }

    fn is_solid(&self) -> bool {
        self.amount == 1.0 && self.blend_method == BlendMethod::Straight
    }

    fn octaves(&self, point: Point, pixel_size: f64, time: f64) -> Octaves {
        let phase = self.speed * time;
        let smooth = if self.speed == 0.0 && self.smooth == SmoothType::Spline {
            SmoothType::FastSpline
        } else {
            self.smooth
        };

        let mut point = point;
        if self.do_displacement {
            let p = point / self.size;
            let offset = Point::new(
                self.random.sample(smooth, DISPLACE_X_SALT, p.x, p.y, phase),
                self.random.sample(smooth, DISPLACE_Y_SALT, p.x, p.y, phase),
            );
            point += self.displacement * offset;
        }

        let scale = f64::from(1u32 << self.detail);
        let mut x = point.x / self.size.x * scale;
        let mut y = point.y / self.size.y * scale;
        let supersampled = self.super_sample && pixel_size != 0.0;
        let (mut x2, mut y2) = if supersampled {
            (
                (point.x + pixel_size) / self.size.x * scale,
                (point.y + pixel_size) / self.size.y * scale,
            )
        } else {
            (0.0, 0.0)
        };

        let detail = self.detail as i32;
        let mut o = Octaves {
            supersampled,
            ..Octaves::default()
        };
        let octave = |salt: i32, x: f64, y: f64, acc: f64| {
            (self.random.sample(smooth, salt, x, y, phase) + acc * 0.5).clamp(-1.0, 1.0)
        };
        for i in 0..detail.max(1) {
            let salt = OCTAVE_SALT * (detail - i);
            o.amount = octave(salt, x, y, o.amount);
            if supersampled {
                o.amount_x = octave(salt, x2, y, o.amount_x);
                o.amount_y = octave(salt, x, y2, o.amount_y);
                if self.turbulent {
                    o.amount_x = o.amount_x.abs();
                    o.amount_y = o.amount_y.abs();
                }
                x2 *= 0.5;
                y2 *= 0.5;
            }
            if self.do_alpha {
                o.alpha = octave(salt + ALPHA_SALT, x, y, o.alpha);
            }
            if self.turbulent {
                o.amount = o.amount.abs();
                o.alpha = o.alpha.abs();
            }
            x *= 0.5;
            y *= 0.5;
        }

        if !self.turbulent {
            let remap = |v: f64| v / 2.0 + 0.5;
            o.amount = remap(o.amount);
            o.alpha = remap(o.alpha);
            if supersampled {
                o.amount_x = remap(o.amount_x);
                o.amount_y = remap(o.amount_y);
            }
        }
        if !supersampled {
            o.amount_x = o.amount;
            o.amount_y = o.amount;
        }
        o
    }

    /// The raw noise color at `point`, before blending with the layers below.
    ///
    /// `pixel_size` is the supersampling footprint; zero disables it.
    pub fn color_func(&self, point: Point, pixel_size: f64, time: f64) -> Color {
        let o = self.octaves(point, pixel_size, time);
        let mut color = if o.supersampled {
            self.gradient.sample_spread(o.amount, o.spread())
        } else {
            self.gradient.sample(o.amount)
        };
        if self.do_alpha {
            color.a *= o.alpha;
        }
        color
    }
}

impl Layer for NoiseGradient {
    fn name(&self) -> &'static str {
        "noise"
    }

    fn param_vocab(&self) -> Vec<ParamDesc> {
        PARAMS.descs()
    }

    fn get_param(&self, key: &str) -> Result<ParamValue, LayerError> {
        PARAMS.get(self, key)
    }

    fn set_param(&mut self, key: &str, value: ParamValue) -> Result<(), LayerError> {
        PARAMS.set(self, key, value)
    }

    fn get_color(&self, context: Context<'_>, pos: Point) -> Color {
        let color = self.color_func(pos, 0.0, context.time().seconds());
        if self.is_solid() {
            return color;
        }
        blend(color, context.get_color(pos), self.amount, self.blend_method)
    }

    fn accelerated_render(
        &self,
        context: Context<'_>,
        surface: &mut Surface,
        quality: i32,
        desc: &RendDesc,
        progress: &mut dyn ProgressCallback,
    ) -> Result<(), LayerError> {
        if self.is_solid() {
            surface.set_wh(desc.width(), desc.height())?;
        } else {
            {
                let mut sub = SubProgress::new(progress, 0, 9500, 10000);
                context.accelerated_render(surface, quality, desc, &mut sub)?;
            }
            if self.amount == 0.0 {
                return Ok(());
            }
        }

        let pixel_size = if quality >= DRAFT_QUALITY {
            0.0
        } else {
            (desc.pw().abs() + desc.ph().abs()) * 0.5
        };
        let time = context.time().seconds();
        let solid = self.is_solid();
        let total = desc.height() as u64;
        let mut pen = surface.begin();
        for y in 0..desc.height() {
            for x in 0..desc.width() {
                let color = self.color_func(desc.point_at(x, y), pixel_size, time);
                if solid {
                    pen.put_value(color);
                } else {
                    let below = pen.get_value();
                    pen.put_value(blend(color, below, self.amount, self.blend_method));
                }
                pen.inc_x();
            }
            pen.dec_x(desc.width());
            pen.inc_y();
            let done = 9500 + 500 * (y as u64 + 1) / total.max(1);
            if !progress.amount_complete(done, 10000) {
                debug!(row = y, "noise render cancelled");
                return Err(LayerError::Cancelled);
            }
        }
        if !progress.amount_complete(10000, 10000) {
            return Err(LayerError::Cancelled);
        }
        Ok(())
    }

    fn hit_check(&self, context: Context<'_>, pos: Point) -> Option<Hit> {
        if self.blend_method == BlendMethod::Straight && self.amount >= 0.5 {
            return Some(Hit::This);
        }
        if self.amount == 0.0 {
            return context.hit_check(pos).map(Hit::Below);
        }
        if self.color_func(pos, 0.0, context.time().seconds()).a > 0.5 {
            Some(Hit::This)
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use strata_core::{CanvasLayer, SilentProgress, SolidColor, Time};

    fn seeded() -> NoiseGradient {
        NoiseGradient::with_seed(42)
    }

    fn set(n: &mut NoiseGradient, key: &str, value: ParamValue) {
        n.set_param(key, value).unwrap();
    }

    #[test]
    fn defaults_match_parameter_table() {
        let n = seeded();
        assert_eq!(n.get_param("amount").unwrap(), ParamValue::Real(1.0));
        assert_eq!(
            n.get_param("blend_method").unwrap(),
            ParamValue::Enum("composite".to_string())
        );
        assert_eq!(n.get_param("size").unwrap(), ParamValue::Point(Point::ONE));
        assert_eq!(
            n.get_param("smooth").unwrap(),
            ParamValue::Enum("cosine".to_string())
        );
        assert_eq!(n.get_param("detail").unwrap(), ParamValue::Integer(4));
        assert_eq!(n.get_param("seed").unwrap(), ParamValue::Integer(42));
        assert_eq!(n.get_param("do_displacement").unwrap(), ParamValue::Bool(false));
        assert_eq!(n.param_vocab().len(), 13);
    }

    #[test]
    fn golden_value_single_cosine_octave() {
        let mut n = seeded();
        set(&mut n, "detail", ParamValue::Integer(1));
        let c = n.color_func(Point::new(0.3, 0.7), 0.0, 0.0);
        let expected = 0.509_488_318_073_741_4;
        assert!((c.r - expected).abs() < 1e-9, "got {}", c.r);
        assert!((c.g - expected).abs() < 1e-9);
        assert_eq!(c.a, 1.0);
    }

    #[test]
    fn zero_detail_runs_one_octave() {
        let mut n = seeded();
        set(&mut n, "detail", ParamValue::Integer(0));
        let field = RandomNoise::new(42);
        for p in [Point::new(0.3, 0.7), Point::new(-1.25, 2.5), Point::new(4.0, -0.1)] {
            let c = n.color_func(p, 0.0, 0.0);
            let v = field.sample(SmoothType::Cosine, 0, p.x, p.y, 0.0) / 2.0 + 0.5;
            assert!((c.r - v).abs() < 1e-12);
            assert!((0.0..=1.0).contains(&c.r));
        }
    }

    #[test]
    fn still_noise_ignores_time() {
        let n = seeded();
        let p = Point::new(0.37, -1.2);
        assert_eq!(n.color_func(p, 0.0, 0.0), n.color_func(p, 0.0, 12.5));
    }

    #[test]
    fn speed_animates_over_time() {
        let mut n = seeded();
        set(&mut n, "speed", ParamValue::Real(1.0));
        let layers: Vec<CanvasLayer> = Vec::new();
        let early = Context::new(&layers, Time::ZERO, Color::TRANSPARENT);
        let late = early.at_time(Time::from_seconds(0.5));
        let changed = (0..16)
            .map(|i| Point::new(i as f64 * 0.31, i as f64 * -0.17))
            .any(|p| n.get_color(early, p) != n.get_color(late, p));
        assert!(changed);
    }

    #[test]
    fn spline_without_speed_uses_fast_spline() {
        let mut n = seeded();
        set(&mut n, "smooth", ParamValue::Enum("spline".to_string()));
        set(&mut n, "detail", ParamValue::Integer(0));
        let p = Point::new(0.8, 0.1);
        let field = RandomNoise::new(42);
        let v = field.sample(SmoothType::FastSpline, 0, p.x, p.y, 0.0) / 2.0 + 0.5;
        assert!((n.color_func(p, 0.0, 3.7).r - v).abs() < 1e-12);
    }

    #[test]
    fn fast_spline_is_not_selectable() {
        let mut n = seeded();
        let err = n
            .set_param("smooth", ParamValue::Enum("fast_spline".to_string()))
            .unwrap_err();
        assert!(matches!(err, LayerError::InvalidParamValue { .. }));
        assert_eq!(
            n.get_param("smooth").unwrap(),
            ParamValue::Enum("cosine".to_string())
        );
    }

    #[test]
    fn invalid_params_are_rejected() {
        let mut n = seeded();
        let before = n.clone();
        for (key, value) in [
            ("detail", ParamValue::Integer(31)),
            ("detail", ParamValue::Integer(-1)),
            ("size", ParamValue::Point(Point::new(0.0, 1.0))),
            ("seed", ParamValue::Integer(-5)),
            ("speed", ParamValue::Real(f64::INFINITY)),
        ] {
            assert!(
                matches!(
                    n.set_param(key, value),
                    Err(LayerError::InvalidParamValue { .. })
                ),
                "{key}"
            );
        }
        assert!(matches!(
            n.set_param("turbulent", ParamValue::Integer(1)),
            Err(LayerError::ParamTypeMismatch { .. })
        ));
        assert_eq!(n, before);
    }

    #[test]
    fn turbulence_folds_octaves() {
        let mut n = seeded();
        set(&mut n, "turbulent", ParamValue::Bool(true));
        for i in 0..32 {
            let p = Point::new(i as f64 * 0.13, i as f64 * 0.07 - 1.0);
            let c = n.color_func(p, 0.0, 0.0);
            assert!((0.0..=1.0).contains(&c.r));
        }
    }

    #[test]
    fn do_alpha_modulates_alpha() {
        let mut n = seeded();
        set(&mut n, "do_alpha", ParamValue::Bool(true));
        let alphas: Vec<f64> = (0..16)
            .map(|i| n.color_func(Point::new(i as f64 * 0.29, 0.4), 0.0, 0.0).a)
            .collect();
        assert!(alphas.iter().all(|a| (0.0..=1.0).contains(a)));
        assert!(alphas.iter().any(|&a| a < 1.0));
    }

    #[test]
    fn displacement_moves_the_pattern() {
        let mut n = seeded();
        let p = Point::new(0.45, 0.9);
        let plain = n.color_func(p, 0.0, 0.0);
        set(&mut n, "do_displacement", ParamValue::Bool(true));
        set(&mut n, "displacement", ParamValue::Point(Point::ZERO));
        assert_eq!(n.color_func(p, 0.0, 0.0), plain);
        set(&mut n, "displacement", ParamValue::Point(Point::new(0.7, 0.7)));
        let moved = (0..8)
            .map(|i| Point::new(i as f64 * 0.4, 0.9))
            .any(|q| {
                let mut still = n.clone();
                still.do_displacement = false;
                n.color_func(q, 0.0, 0.0) != still.color_func(q, 0.0, 0.0)
            });
        assert!(moved);
    }

    #[test]
    fn supersampling_stays_in_gradient_range() {
        let mut n = seeded();
        set(&mut n, "super_sample", ParamValue::Bool(true));
        for i in 0..16 {
            let p = Point::new(i as f64 * 0.21, -0.3);
            let o = n.octaves(p, 0.05, 0.0);
            assert!(o.supersampled);
            assert!(o.spread() >= 0.0);
            let c = n.color_func(p, 0.05, 0.0);
            assert!(c.is_finite() && (0.0..=1.0).contains(&c.r));
        }
        // zero footprint disables supersampling
        assert!(!n.octaves(Point::ZERO, 0.0, 0.0).supersampled);
    }

    #[test]
    fn zero_amount_render_matches_context() {
        let mut n = seeded();
        set(&mut n, "amount", ParamValue::Real(0.0));
        let layers = vec![CanvasLayer::new(
            "fill",
            Box::new(SolidColor::new(Color::new(0.3, 0.1, 0.9, 1.0))),
        )];
        let ctx = Context::new(&layers, Time::ZERO, Color::TRANSPARENT);
        let desc = RendDesc::new(5, 4, Point::new(-1.0, 1.0), Point::new(1.0, -1.0)).unwrap();

        let mut expected = Surface::new(1, 1).unwrap();
        ctx.accelerated_render(&mut expected, 3, &desc, &mut SilentProgress)
            .unwrap();

        let mut reports = Vec::new();
        let mut record = |done: u64, total: u64| {
            reports.push((done, total));
            true
        };
        let mut s = Surface::new(1, 1).unwrap();
        n.accelerated_render(ctx, &mut s, 3, &desc, &mut record)
            .unwrap();
        assert_eq!(s, expected);
        // the context pass ran and reported inside its sub-range
        assert!(!reports.is_empty());
        assert!(reports.iter().all(|&(done, total)| total == 10000 && done <= 9500));
    }

    #[test]
    fn render_matches_point_evaluation_without_supersampling() {
        let mut n = seeded();
        set(&mut n, "blend_method", ParamValue::Enum("straight".to_string()));
        let ctx = Context::empty(Time::ZERO, Color::TRANSPARENT);
        let desc = RendDesc::new(6, 6, Point::new(-2.0, 2.0), Point::new(2.0, -2.0)).unwrap();
        let mut s = Surface::new(1, 1).unwrap();
        n.accelerated_render(ctx, &mut s, 3, &desc, &mut SilentProgress)
            .unwrap();
        for y in 0..6 {
            for x in 0..6 {
                assert_eq!(
                    s.get(x, y).unwrap(),
                    n.get_color(ctx, desc.point_at(x, y))
                );
            }
        }
    }

    #[test]
    fn composite_render_blends_over_context() {
        let mut n = seeded();
        set(&mut n, "amount", ParamValue::Real(0.5));
        let layers = vec![CanvasLayer::new(
            "fill",
            Box::new(SolidColor::new(Color::new(1.0, 0.0, 0.0, 1.0))),
        )];
        let ctx = Context::new(&layers, Time::ZERO, Color::TRANSPARENT);
        let desc = RendDesc::new(4, 4, Point::new(-1.0, 1.0), Point::new(1.0, -1.0)).unwrap();
        let mut s = Surface::new(1, 1).unwrap();
        n.accelerated_render(ctx, &mut s, 3, &desc, &mut SilentProgress)
            .unwrap();
        for y in 0..4 {
            for x in 0..4 {
                let got = s.get(x, y).unwrap();
                let want = n.get_color(ctx, desc.point_at(x, y));
                assert!((got.r - want.r).abs() < 1e-12);
                assert!((got.g - want.g).abs() < 1e-12);
            }
        }
    }

    #[test]
    fn render_cancels_and_keeps_written_rows() {
        let mut n = seeded();
        set(&mut n, "blend_method", ParamValue::Enum("straight".to_string()));
        let ctx = Context::empty(Time::ZERO, Color::TRANSPARENT);
        let desc = RendDesc::new(4, 4, Point::new(-1.0, 1.0), Point::new(1.0, -1.0)).unwrap();
        let mut s = Surface::new(1, 1).unwrap();
        let mut first_row_only = |done: u64, _total: u64| done < 9700;
        assert!(matches!(
            n.accelerated_render(ctx, &mut s, 3, &desc, &mut first_row_only),
            Err(LayerError::Cancelled)
        ));
        assert_eq!(s.get(0, 0).unwrap(), n.get_color(ctx, desc.point_at(0, 0)));
        assert_eq!(s.get(0, 3).unwrap(), Color::TRANSPARENT);
    }

    #[test]
    fn hit_check_follows_amount_and_method() {
        let mut n = seeded();
        let layers = vec![CanvasLayer::new("fill", Box::new(SolidColor::default()))];
        let ctx = Context::new(&layers, Time::ZERO, Color::TRANSPARENT);

        set(&mut n, "blend_method", ParamValue::Enum("straight".to_string()));
        assert_eq!(n.hit_check(ctx, Point::ZERO), Some(Hit::This));

        set(&mut n, "amount", ParamValue::Real(0.0));
        assert_eq!(n.hit_check(ctx, Point::ZERO), Some(Hit::Below(0)));

        // opaque gradient without alpha noise always hits
        set(&mut n, "amount", ParamValue::Real(0.3));
        assert_eq!(n.hit_check(ctx, Point::ZERO), Some(Hit::This));

        set(&mut n, "do_alpha", ParamValue::Bool(true));
        let transparent = Gradient::two_color(Color::TRANSPARENT, Color::TRANSPARENT);
        set(&mut n, "gradient", ParamValue::Gradient(transparent));
        assert_eq!(n.hit_check(ctx, Point::ZERO), None);
    }

    mod proptests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn colors_are_finite_and_in_range(
                seed in any::<u32>(),
                x in -1e3_f64..1e3,
                y in -1e3_f64..1e3,
                detail in 0_i64..=MAX_DETAIL,
                turbulent in any::<bool>(),
                super_sample in any::<bool>(),
            ) {
                let mut n = NoiseGradient::with_seed(seed);
                n.set_param("detail", ParamValue::Integer(detail)).unwrap();
                n.set_param("turbulent", ParamValue::Bool(turbulent)).unwrap();
                n.set_param("super_sample", ParamValue::Bool(super_sample)).unwrap();
                let c = n.color_func(Point::new(x, y), 0.01, 0.0);
                prop_assert!(c.is_finite());
                prop_assert!((0.0..=1.0).contains(&c.r));
            }

            #[test]
            fn evaluation_is_deterministic(seed in any::<u32>(), x in -50.0_f64..50.0, y in -50.0_f64..50.0) {
                let a = NoiseGradient::with_seed(seed);
                let b = NoiseGradient::with_seed(seed);
                let p = Point::new(x, y);
                prop_assert_eq!(a.color_func(p, 0.0, 0.0), b.color_func(p, 0.0, 0.0));
            }
        }
    }
}
