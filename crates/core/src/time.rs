//! Animation time in seconds.
//!
//! Layers only ever consume a `Time` as an opaque phase scalar; the type
//! provides arithmetic, ordering and a compact human-readable display.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Add, AddAssign, Mul, Neg, Sub, SubAssign};

/// Differences smaller than this are rounded away when displaying.
const DISPLAY_EPSILON: f64 = 0.0005;

/// A point in animation time, in seconds.
#[derive(Debug, Clone, Copy, Default, PartialEq, PartialOrd, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Time(f64);

impl Time {
    pub const ZERO: Time = Time(0.0);

    pub const fn from_seconds(seconds: f64) -> Self {
        Self(seconds)
    }

    pub const fn seconds(self) -> f64 {
        self.0
    }

    /// False for NaN times.
    pub fn is_valid(self) -> bool {
        !self.0.is_nan()
    }

    /// Rounds to the nearest frame boundary at `fps`. Non-positive `fps` is a no-op.
    pub fn round(self, fps: f64) -> Self {
        if fps <= 0.0 {
            return self;
        }
        Self((self.0 * fps).round() / fps)
    }
}

impl From<f64> for Time {
    fn from(seconds: f64) -> Self {
        Self(seconds)
    }
}

impl Add for Time {
    type Output = Time;
    fn add(self, rhs: Time) -> Time {
        Time(self.0 + rhs.0)
    }
}

impl AddAssign for Time {
    fn add_assign(&mut self, rhs: Time) {
        self.0 += rhs.0;
    }
}

impl Sub for Time {
    type Output = Time;
    fn sub(self, rhs: Time) -> Time {
        Time(self.0 - rhs.0)
    }
}

impl SubAssign for Time {
    fn sub_assign(&mut self, rhs: Time) {
        self.0 -= rhs.0;
    }
}

impl Mul<f64> for Time {
    type Output = Time;
    fn mul(self, rhs: f64) -> Time {
        Time(self.0 * rhs)
    }
}

impl Neg for Time {
    type Output = Time;
    fn neg(self) -> Time {
        Time(-self.0)
    }
}

impl fmt::Display for Time {
    /// Formats as e.g. `"1h 2m 3.5s"`, omitting leading zero units.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if !self.is_valid() {
            return f.write_str("NaN");
        }
        if self.0.is_infinite() {
            return f.write_str(if self.0 > 0.0 { "EOT" } else { "SOT" });
        }
        let mut rest = self.0.abs();
        if (rest.ceil() - rest) < DISPLAY_EPSILON {
            rest = rest.ceil();
        }
        if self.0 < 0.0 {
            f.write_str("-")?;
        }
        let hours = (rest / 3600.0).floor();
        rest -= hours * 3600.0;
        let minutes = (rest / 60.0).floor();
        rest -= minutes * 60.0;
        if hours > 0.0 {
            write!(f, "{hours}h ")?;
        }
        if hours > 0.0 || minutes > 0.0 {
            write!(f, "{minutes}m ")?;
        }
        if (rest - rest.floor()) < DISPLAY_EPSILON {
            write!(f, "{}s", rest.floor())
        } else {
            let text = format!("{rest:.3}");
            write!(f, "{}s", text.trim_end_matches('0').trim_end_matches('.'))
        }
    }
}
