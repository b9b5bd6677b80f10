//! Seeded coherent value noise.
//!
//! [`RandomNoise::lattice`] hashes integer coordinates to a value in [-1, 1];
//! [`RandomNoise::sample`] interpolates the lattice at real coordinates with
//! one of several [`SmoothType`] kernels. Everything here is a pure function
//! of the seed and the arguments.

use std::f64::consts::PI;

/// LCG multiplier and increment applied once to the coordinate hash.
const LCG_A: u32 = 1_664_525;
const LCG_C: u32 = 1_013_904_223;

/// Interpolation kernel for [`RandomNoise::sample`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SmoothType {
    /// Lattice value at the floor of each coordinate.
    Nearest,
    Linear,
    #[default]
    Cosine,
    /// Uniform cubic B-spline, with a raised-cosine blend between time slices.
    Spline,
    /// Catmull-Rom, with a linear blend between time slices.
    Cubic,
    /// B-spline evaluated at `floor(t)` only. Not user-selectable; layers
    /// substitute it for `Spline` when nothing animates.
    FastSpline,
}

impl SmoothType {
    /// Names accepted by [`SmoothType::from_name`].
    pub const NAMES: &'static [&'static str] = &["nearest", "linear", "cosine", "spline", "cubic"];

    pub fn name(self) -> &'static str {
        match self {
            Self::Nearest => "nearest",
            Self::Linear => "linear",
            Self::Cosine => "cosine",
            Self::Spline => "spline",
            Self::Cubic => "cubic",
            Self::FastSpline => "fast_spline",
        }
    }

    /// Parses a user-selectable kernel name. `fast_spline` is rejected.
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "nearest" => Some(Self::Nearest),
            "linear" => Some(Self::Linear),
            "cosine" => Some(Self::Cosine),
            "spline" => Some(Self::Spline),
            "cubic" => Some(Self::Cubic),
            _ => None,
        }
    }
}

/// A seeded lattice noise source.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RandomNoise {
    seed: u32,
}

impl RandomNoise {
    pub fn new(seed: u32) -> Self {
        Self { seed }
    }

    pub fn seed(&self) -> u32 {
        self.seed
    }

    pub fn set_seed(&mut self, seed: u32) {
        self.seed = seed;
    }

    /// Hashes a lattice point to [-1, 1].
    pub fn lattice(&self, salt: i32, x: i32, y: i32, t: i32) -> f64 {
        let h = (x.wrapping_add(y) as u32).wrapping_mul(21870)
            ^ (salt.wrapping_add(t) as u32).wrapping_mul(11213)
            ^ (salt.wrapping_add(x) as u32).wrapping_mul(36979)
            ^ (y.wrapping_add(self.seed as i32) as u32).wrapping_mul(31337);
        let next = h.wrapping_mul(LCG_A).wrapping_add(LCG_C);
        f64::from(next >> 16) / 65535.0 * 2.0 - 1.0
    }

    /// Interpolated noise at real coordinates, clamped to [-1, 1].
    ///
    /// Non-finite coordinates saturate to the lattice edge, so the result is
    /// always finite.
    pub fn sample(&self, smooth: SmoothType, salt: i32, x: f64, y: f64, t: f64) -> f64 {
        let (x0, fx) = split(x);
        let (y0, fy) = split(y);
        let (t0, ft) = split(t);
        let t1 = t0.wrapping_add(1);

        let v = match smooth {
            SmoothType::Nearest => self.lattice(salt, x0, y0, t0),
            SmoothType::Linear | SmoothType::Cosine => {
                let weight = |f: f64| {
                    if smooth == SmoothType::Linear {
                        f
                    } else {
                        (1.0 - (PI * f).cos()) * 0.5
                    }
                };
                let (wx, wy) = (weight(fx), weight(fy));
                let slice = |t: i32| {
                    let top = lerp(
                        self.lattice(salt, x0, y0, t),
                        self.lattice(salt, x0.wrapping_add(1), y0, t),
                        wx,
                    );
                    let bottom = lerp(
                        self.lattice(salt, x0, y0.wrapping_add(1), t),
                        self.lattice(salt, x0.wrapping_add(1), y0.wrapping_add(1), t),
                        wx,
                    );
                    lerp(top, bottom, wy)
                };
                if ft == 0.0 {
                    slice(t0)
                } else {
                    lerp(slice(t0), slice(t1), weight(ft))
                }
            }
            SmoothType::Cubic => {
                let (wx, wy) = (catmull_rom(fx), catmull_rom(fy));
                let a = self.patch(salt, x0, y0, t0, &wx, &wy);
                if ft == 0.0 {
                    a
                } else {
                    lerp(a, self.patch(salt, x0, y0, t1, &wx, &wy), ft)
                }
            }
            SmoothType::Spline => {
                let (wx, wy) = (b_spline(fx), b_spline(fy));
                let a = self.patch(salt, x0, y0, t0, &wx, &wy);
                if ft == 0.0 {
                    a
                } else {
                    let b = self.patch(salt, x0, y0, t1, &wx, &wy);
                    lerp(a, b, (1.0 - (PI * ft).cos()) * 0.5)
                }
            }
            SmoothType::FastSpline => {
                self.patch(salt, x0, y0, t0, &b_spline(fx), &b_spline(fy))
            }
        };
        v.clamp(-1.0, 1.0)
    }

    /// Weighted sum over the 4x4 lattice neighborhood `x0-1..=x0+2`, `y0-1..=y0+2`.
    fn patch(&self, salt: i32, x0: i32, y0: i32, t: i32, wx: &[f64; 4], wy: &[f64; 4]) -> f64 {
        let mut sum = 0.0;
        for (j, &w_y) in wy.iter().enumerate() {
            let y = y0.wrapping_add(j as i32 - 1);
            let mut row = 0.0;
            for (i, &w_x) in wx.iter().enumerate() {
                row += w_x * self.lattice(salt, x0.wrapping_add(i as i32 - 1), y, t);
            }
            sum += w_y * row;
        }
        sum
    }
}

/// Integer floor (saturating) and fractional part.
fn split(v: f64) -> (i32, f64) {
    let floor = v.floor();
    let frac = v - floor;
    let frac = if frac.is_finite() { frac } else { 0.0 };
    (floor as i32, frac)
}

fn lerp(a: f64, b: f64, w: f64) -> f64 {
    a + (b - a) * w
}

fn catmull_rom(f: f64) -> [f64; 4] {
    let f2 = f * f;
    let f3 = f2 * f;
    [
        (-f3 + 2.0 * f2 - f) * 0.5,
        (3.0 * f3 - 5.0 * f2 + 2.0) * 0.5,
        (-3.0 * f3 + 4.0 * f2 + f) * 0.5,
        (f3 - f2) * 0.5,
    ]
}

fn b_spline(f: f64) -> [f64; 4] {
    let f2 = f * f;
    let f3 = f2 * f;
    let g = 1.0 - f;
    [
        g * g * g / 6.0,
        (3.0 * f3 - 6.0 * f2 + 4.0) / 6.0,
        (-3.0 * f3 + 3.0 * f2 + 3.0 * f + 1.0) / 6.0,
        f3 / 6.0,
    ]
}
