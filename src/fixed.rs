//! Fixed-point arithmetic
//!
//! The compositor core runs entirely on integers: world positions, scroll
//! rates and camera math all use a signed 16.16 fixed-point format, the same
//! split the original arcade SDKs used on 68k-class CPUs. Floats exist only
//! at the shell boundary (converting editor/demo input).

use serde::{Deserialize, Serialize};

/// Signed 16.16 fixed-point number.
///
/// 16 integer bits (range ±32767) and 16 fractional bits (~0.000015
/// resolution). Arithmetic wraps on overflow like the hardware it models.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Debug, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Fix(pub i32);

impl Fix {
    /// Number of fractional bits
    pub const SHIFT: u32 = 16;

    pub const ZERO: Fix = Fix(0);
    pub const ONE: Fix = Fix(1 << Fix::SHIFT);
    pub const HALF: Fix = Fix(1 << (Fix::SHIFT - 1));

    /// Create from a whole number
    #[inline]
    pub const fn from_int(v: i32) -> Fix {
        Fix(v << Fix::SHIFT)
    }

    /// Integer part, rounding toward negative infinity.
    ///
    /// Floor (not truncation) so that tile-grid math behaves consistently
    /// across zero: `Fix::from_f32(-0.5).to_int() == -1`.
    #[inline]
    pub const fn to_int(self) -> i32 {
        self.0 >> Fix::SHIFT
    }

    /// Fractional part as raw 16-bit value (always non-negative)
    #[inline]
    pub const fn frac(self) -> i32 {
        self.0 & 0xFFFF
    }

    #[inline]
    pub fn from_f32(v: f32) -> Fix {
        Fix((v * (1 << Fix::SHIFT) as f32) as i32)
    }

    #[inline]
    pub fn to_f32(self) -> f32 {
        self.0 as f32 / (1 << Fix::SHIFT) as f32
    }

    #[inline]
    pub const fn abs(self) -> Fix {
        Fix(self.0.abs())
    }

    #[inline]
    pub fn min(self, other: Fix) -> Fix {
        Fix(self.0.min(other.0))
    }

    #[inline]
    pub fn max(self, other: Fix) -> Fix {
        Fix(self.0.max(other.0))
    }

    #[inline]
    pub fn clamp(self, lo: Fix, hi: Fix) -> Fix {
        Fix(self.0.clamp(lo.0, hi.0))
    }

    /// Fixed × fixed with an i64 intermediate, so 16.16 × 16.16 cannot
    /// overflow before the shift back down.
    #[inline]
    pub fn mul(self, rhs: Fix) -> Fix {
        Fix(((self.0 as i64 * rhs.0 as i64) >> Fix::SHIFT) as i32)
    }

    /// Fixed ÷ fixed. Division by zero returns zero, matching the
    /// no-fatal-paths policy of the rest of the core.
    #[inline]
    pub fn div(self, rhs: Fix) -> Fix {
        if rhs.0 == 0 {
            return Fix::ZERO;
        }
        Fix((((self.0 as i64) << Fix::SHIFT) / rhs.0 as i64) as i32)
    }
}

impl std::ops::Add for Fix {
    type Output = Fix;
    #[inline]
    fn add(self, rhs: Fix) -> Fix {
        Fix(self.0.wrapping_add(rhs.0))
    }
}

impl std::ops::Sub for Fix {
    type Output = Fix;
    #[inline]
    fn sub(self, rhs: Fix) -> Fix {
        Fix(self.0.wrapping_sub(rhs.0))
    }
}

impl std::ops::Neg for Fix {
    type Output = Fix;
    #[inline]
    fn neg(self) -> Fix {
        Fix(self.0.wrapping_neg())
    }
}

impl std::ops::Mul for Fix {
    type Output = Fix;
    #[inline]
    fn mul(self, rhs: Fix) -> Fix {
        Fix::mul(self, rhs)
    }
}

impl std::ops::Div for Fix {
    type Output = Fix;
    #[inline]
    fn div(self, rhs: Fix) -> Fix {
        Fix::div(self, rhs)
    }
}

impl std::ops::AddAssign for Fix {
    #[inline]
    fn add_assign(&mut self, rhs: Fix) {
        self.0 = self.0.wrapping_add(rhs.0);
    }
}

impl std::ops::SubAssign for Fix {
    #[inline]
    fn sub_assign(&mut self, rhs: Fix) {
        self.0 = self.0.wrapping_sub(rhs.0);
    }
}

impl std::fmt::Display for Fix {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:.4}", self.to_f32())
    }
}
