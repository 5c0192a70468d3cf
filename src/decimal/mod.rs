//! Arbitrary precision decimal numbers for cost formulas
//!
//! Wraps dashu-float's `DBig` (significand × 10^exponent, `isize` exponent)
//! so values far beyond the native floating-point range stay exact enough for
//! cost curves, while `PosInf`/`NegInf`/`Nan` sentinels give the engine
//! IEEE-style propagation for division by zero, out-of-domain logarithms and
//! saturating overflow.

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use dashu_float::DBig;
use dashu_float::ops::Abs;
use dashu_int::IBig;
use num_traits::{One, Zero};
use thiserror::Error;

mod hyper;
mod transcendental;

pub use hyper::MAX_HYPER_HEIGHT;

/// Working precision for all finite values (decimal digits)
pub const PRECISION: usize = 40;

/// Error type for decimal construction
#[derive(Debug, Clone, Error)]
pub enum DecimalError {
    #[error("invalid decimal literal: {0}")]
    Parse(String),
}

#[derive(Debug, Clone)]
pub(crate) enum Repr {
    Finite(DBig),
    NegInf,
    PosInf,
    Nan,
}

/// Arbitrary precision decimal with infinity and NaN sentinels
///
/// Operations never panic; out-of-domain inputs produce `Nan` and results
/// whose exponent would overflow the backing representation saturate to
/// `±Infinity`.
#[derive(Debug, Clone)]
pub struct Decimal {
    pub(crate) repr: Repr,
}

/// Attach the working precision to a raw `DBig`
pub(crate) fn work(value: DBig) -> DBig {
    value.with_precision(PRECISION).value()
}

impl Decimal {
    pub(crate) fn finite(value: DBig) -> Self {
        Decimal {
            repr: Repr::Finite(work(value)),
        }
    }

    pub fn zero() -> Self {
        Decimal::finite(DBig::ZERO)
    }

    pub fn one() -> Self {
        Decimal::finite(DBig::ONE)
    }

    pub fn infinity() -> Self {
        Decimal { repr: Repr::PosInf }
    }

    pub fn neg_infinity() -> Self {
        Decimal { repr: Repr::NegInf }
    }

    pub fn nan() -> Self {
        Decimal { repr: Repr::Nan }
    }

    /// Euler's number at working precision
    pub fn e() -> Self {
        Decimal::one().exp()
    }

    pub fn from_f64(f: f64) -> Self {
        if f.is_nan() {
            return Decimal::nan();
        }
        if f.is_infinite() {
            return if f > 0.0 {
                Decimal::infinity()
            } else {
                Decimal::neg_infinity()
            };
        }
        // Shortest-round-trip formatting keeps integers and simple literals
        // exact without dragging in binary-fraction noise.
        let s = format!("{}", f);
        s.parse().unwrap_or_else(|_| Decimal::zero())
    }

    // ========== Predicates ==========

    pub fn is_nan(&self) -> bool {
        matches!(self.repr, Repr::Nan)
    }

    pub fn is_finite(&self) -> bool {
        matches!(self.repr, Repr::Finite(_))
    }

    pub fn is_infinite(&self) -> bool {
        matches!(self.repr, Repr::PosInf | Repr::NegInf)
    }

    pub fn is_zero(&self) -> bool {
        match &self.repr {
            Repr::Finite(v) => *v == DBig::ZERO,
            _ => false,
        }
    }

    pub fn is_negative(&self) -> bool {
        match &self.repr {
            Repr::Finite(v) => *v < DBig::ZERO,
            Repr::NegInf => true,
            _ => false,
        }
    }

    pub fn is_positive(&self) -> bool {
        match &self.repr {
            Repr::Finite(v) => *v > DBig::ZERO,
            Repr::PosInf => true,
            _ => false,
        }
    }

    /// Check if the value is an integer
    pub fn is_integer(&self) -> bool {
        match &self.repr {
            Repr::Finite(v) => *v == v.clone().floor(),
            _ => false,
        }
    }

    // ========== Sign and rounding ==========

    pub fn abs(&self) -> Decimal {
        match &self.repr {
            Repr::Finite(v) => Decimal::finite(Abs::abs(v.clone())),
            Repr::NegInf | Repr::PosInf => Decimal::infinity(),
            Repr::Nan => Decimal::nan(),
        }
    }

    /// Sign as a decimal: -1, 0 or 1 (NaN for NaN)
    pub fn signum(&self) -> Decimal {
        match &self.repr {
            Repr::Finite(v) => {
                if *v > DBig::ZERO {
                    Decimal::one()
                } else if *v < DBig::ZERO {
                    -Decimal::one()
                } else {
                    Decimal::zero()
                }
            }
            Repr::PosInf => Decimal::one(),
            Repr::NegInf => -Decimal::one(),
            Repr::Nan => Decimal::nan(),
        }
    }

    pub fn floor(&self) -> Decimal {
        match &self.repr {
            Repr::Finite(v) => Decimal::finite(v.clone().floor()),
            _ => self.clone(),
        }
    }

    pub fn ceil(&self) -> Decimal {
        match &self.repr {
            Repr::Finite(v) => Decimal::finite(v.clone().ceil()),
            _ => self.clone(),
        }
    }

    /// Round half away from zero
    pub fn round(&self) -> Decimal {
        match &self.repr {
            Repr::Finite(v) => {
                let half: DBig = work("0.5".parse().unwrap_or(DBig::ZERO));
                if *v < DBig::ZERO {
                    Decimal::finite((v.clone() - half).ceil())
                } else {
                    Decimal::finite((v.clone() + half).floor())
                }
            }
            _ => self.clone(),
        }
    }

    /// Round toward zero
    pub fn trunc(&self) -> Decimal {
        match &self.repr {
            Repr::Finite(v) => {
                if *v < DBig::ZERO {
                    Decimal::finite(v.clone().ceil())
                } else {
                    Decimal::finite(v.clone().floor())
                }
            }
            _ => self.clone(),
        }
    }

    pub fn recip(&self) -> Decimal {
        &Decimal::one() / self
    }

    // ========== Clamping ==========

    pub fn max(&self, other: &Decimal) -> Decimal {
        if self.is_nan() || other.is_nan() {
            return Decimal::nan();
        }
        if self >= other {
            self.clone()
        } else {
            other.clone()
        }
    }

    pub fn min(&self, other: &Decimal) -> Decimal {
        if self.is_nan() || other.is_nan() {
            return Decimal::nan();
        }
        if self <= other {
            self.clone()
        } else {
            other.clone()
        }
    }

    /// The operand with the larger absolute value
    pub fn max_abs(&self, other: &Decimal) -> Decimal {
        if self.is_nan() || other.is_nan() {
            return Decimal::nan();
        }
        if self.abs() >= other.abs() {
            self.clone()
        } else {
            other.clone()
        }
    }

    /// The operand with the smaller absolute value
    pub fn min_abs(&self, other: &Decimal) -> Decimal {
        if self.is_nan() || other.is_nan() {
            return Decimal::nan();
        }
        if self.abs() <= other.abs() {
            self.clone()
        } else {
            other.clone()
        }
    }

    pub fn clamp_min(&self, min: &Decimal) -> Decimal {
        self.max(min)
    }

    pub fn clamp_max(&self, max: &Decimal) -> Decimal {
        self.min(max)
    }

    pub fn clamp(&self, min: &Decimal, max: &Decimal) -> Decimal {
        self.max(min).min(max)
    }

    // ========== Conversions ==========

    /// Convert to f64 if the value fits, `None` otherwise
    pub fn try_to_f64(&self) -> Option<f64> {
        match &self.repr {
            Repr::Finite(v) => dbig_to_f64(v),
            _ => None,
        }
    }

    /// Convert to f64, saturating out-of-range magnitudes to `±INFINITY`
    pub fn to_f64(&self) -> f64 {
        match &self.repr {
            Repr::Finite(v) => dbig_to_f64(v).unwrap_or_else(|| {
                if *v < DBig::ZERO {
                    f64::NEG_INFINITY
                } else {
                    f64::INFINITY
                }
            }),
            Repr::PosInf => f64::INFINITY,
            Repr::NegInf => f64::NEG_INFINITY,
            Repr::Nan => f64::NAN,
        }
    }

    /// Relative-tolerance equality, for boundary checks on inverted values
    pub fn eq_tolerance(&self, other: &Decimal, tolerance: f64) -> bool {
        if self.is_nan() || other.is_nan() {
            return false;
        }
        if self.is_infinite() || other.is_infinite() {
            return self == other;
        }
        let diff = (self - other).abs();
        let scale = self.abs().max(&other.abs()).max(&Decimal::one());
        diff <= scale * Decimal::from_f64(tolerance)
    }
}

/// Mirror of the folio-style significand/exponent conversion
fn dbig_to_f64(value: &DBig) -> Option<f64> {
    use dashu_int::ops::BitTest;

    let (significand, exponent) = value.clone().into_repr().into_parts();
    if significand == IBig::ZERO {
        return Some(0.0);
    }

    let sig_f64: f64 = if significand.bit_len() <= 53 {
        let as_i64: Result<i64, _> = significand.clone().try_into();
        match as_i64 {
            Ok(i) => i as f64,
            Err(_) => return None,
        }
    } else {
        let extra_bits = significand.bit_len() - 53;
        let shifted = &significand >> extra_bits;
        let shifted_i64: i64 = shifted.try_into().ok()?;
        (shifted_i64 as f64) * 2_f64.powi(extra_bits as i32)
    };

    let result = if exponent == 0 {
        sig_f64
    } else if exponent > 0 && exponent <= 308 {
        sig_f64 * 10_f64.powi(exponent as i32)
    } else if exponent < 0 && exponent >= -340 {
        sig_f64 / 10_f64.powi((-exponent).min(308) as i32)
            / 10_f64.powi(((-exponent) - (-exponent).min(308)) as i32)
    } else {
        return None;
    };

    if result.is_finite() { Some(result) } else { None }
}

// ========== Construction traits ==========

impl From<i64> for Decimal {
    fn from(n: i64) -> Self {
        Decimal::finite(DBig::from(n))
    }
}

impl From<u32> for Decimal {
    fn from(n: u32) -> Self {
        Decimal::from(n as i64)
    }
}

impl From<i32> for Decimal {
    fn from(n: i32) -> Self {
        Decimal::from(n as i64)
    }
}

impl From<f64> for Decimal {
    fn from(f: f64) -> Self {
        Decimal::from_f64(f)
    }
}

impl FromStr for Decimal {
    type Err = DecimalError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        match s {
            "Infinity" | "inf" => return Ok(Decimal::infinity()),
            "-Infinity" | "-inf" => return Ok(Decimal::neg_infinity()),
            "NaN" => return Ok(Decimal::nan()),
            _ => {}
        }
        let inner: DBig = s
            .parse()
            .map_err(|_| DecimalError::Parse(s.to_string()))?;
        Ok(Decimal::finite(inner))
    }
}

// ========== Comparison ==========

impl PartialEq for Decimal {
    fn eq(&self, other: &Self) -> bool {
        match (&self.repr, &other.repr) {
            (Repr::Finite(a), Repr::Finite(b)) => a == b,
            (Repr::PosInf, Repr::PosInf) => true,
            (Repr::NegInf, Repr::NegInf) => true,
            // NaN != NaN
            _ => false,
        }
    }
}

impl PartialOrd for Decimal {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        match (&self.repr, &other.repr) {
            (Repr::Nan, _) | (_, Repr::Nan) => None,
            (Repr::Finite(a), Repr::Finite(b)) => a.partial_cmp(b),
            (Repr::NegInf, Repr::NegInf) => Some(Ordering::Equal),
            (Repr::PosInf, Repr::PosInf) => Some(Ordering::Equal),
            (Repr::NegInf, _) => Some(Ordering::Less),
            (_, Repr::NegInf) => Some(Ordering::Greater),
            (Repr::PosInf, _) => Some(Ordering::Greater),
            (_, Repr::PosInf) => Some(Ordering::Less),
        }
    }
}

// ========== Arithmetic ==========

impl std::ops::Neg for &Decimal {
    type Output = Decimal;

    fn neg(self) -> Decimal {
        match &self.repr {
            Repr::Finite(v) => Decimal::finite(-v.clone()),
            Repr::PosInf => Decimal::neg_infinity(),
            Repr::NegInf => Decimal::infinity(),
            Repr::Nan => Decimal::nan(),
        }
    }
}

impl std::ops::Neg for Decimal {
    type Output = Decimal;

    fn neg(self) -> Decimal {
        -&self
    }
}

impl std::ops::Add for &Decimal {
    type Output = Decimal;

    fn add(self, rhs: &Decimal) -> Decimal {
        match (&self.repr, &rhs.repr) {
            (Repr::Nan, _) | (_, Repr::Nan) => Decimal::nan(),
            (Repr::PosInf, Repr::NegInf) | (Repr::NegInf, Repr::PosInf) => Decimal::nan(),
            (Repr::PosInf, _) | (_, Repr::PosInf) => Decimal::infinity(),
            (Repr::NegInf, _) | (_, Repr::NegInf) => Decimal::neg_infinity(),
            (Repr::Finite(a), Repr::Finite(b)) => Decimal::finite(a + b),
        }
    }
}

impl std::ops::Sub for &Decimal {
    type Output = Decimal;

    fn sub(self, rhs: &Decimal) -> Decimal {
        self + &(-rhs)
    }
}

impl std::ops::Mul for &Decimal {
    type Output = Decimal;

    fn mul(self, rhs: &Decimal) -> Decimal {
        match (&self.repr, &rhs.repr) {
            (Repr::Nan, _) | (_, Repr::Nan) => Decimal::nan(),
            (Repr::Finite(a), Repr::Finite(b)) => Decimal::finite(a * b),
            // infinity times zero is indeterminate
            _ => {
                if self.is_zero() || rhs.is_zero() {
                    Decimal::nan()
                } else if self.is_negative() != rhs.is_negative() {
                    Decimal::neg_infinity()
                } else {
                    Decimal::infinity()
                }
            }
        }
    }
}

impl std::ops::Div for &Decimal {
    type Output = Decimal;

    fn div(self, rhs: &Decimal) -> Decimal {
        match (&self.repr, &rhs.repr) {
            (Repr::Nan, _) | (_, Repr::Nan) => Decimal::nan(),
            (Repr::Finite(a), Repr::Finite(b)) => {
                if *b == DBig::ZERO {
                    if *a == DBig::ZERO {
                        Decimal::nan()
                    } else if *a < DBig::ZERO {
                        Decimal::neg_infinity()
                    } else {
                        Decimal::infinity()
                    }
                } else {
                    Decimal::finite(a / b)
                }
            }
            // both infinite is indeterminate
            (Repr::PosInf | Repr::NegInf, Repr::PosInf | Repr::NegInf) => Decimal::nan(),
            (Repr::PosInf | Repr::NegInf, Repr::Finite(_)) => {
                if self.is_negative() != rhs.is_negative() {
                    Decimal::neg_infinity()
                } else {
                    Decimal::infinity()
                }
            }
            (Repr::Finite(_), Repr::PosInf | Repr::NegInf) => Decimal::zero(),
        }
    }
}

macro_rules! forward_value_binop {
    ($trait:ident, $method:ident) => {
        impl std::ops::$trait for Decimal {
            type Output = Decimal;

            fn $method(self, rhs: Decimal) -> Decimal {
                std::ops::$trait::$method(&self, &rhs)
            }
        }

        impl std::ops::$trait<&Decimal> for Decimal {
            type Output = Decimal;

            fn $method(self, rhs: &Decimal) -> Decimal {
                std::ops::$trait::$method(&self, rhs)
            }
        }

        impl std::ops::$trait<Decimal> for &Decimal {
            type Output = Decimal;

            fn $method(self, rhs: Decimal) -> Decimal {
                std::ops::$trait::$method(self, &rhs)
            }
        }
    };
}

forward_value_binop!(Add, add);
forward_value_binop!(Sub, sub);
forward_value_binop!(Mul, mul);
forward_value_binop!(Div, div);

impl Zero for Decimal {
    fn zero() -> Self {
        Decimal::zero()
    }

    fn is_zero(&self) -> bool {
        Decimal::is_zero(self)
    }
}

impl One for Decimal {
    fn one() -> Self {
        Decimal::one()
    }
}

// ========== Display ==========

impl fmt::Display for Decimal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.repr {
            Repr::Nan => write!(f, "NaN"),
            Repr::PosInf => write!(f, "Infinity"),
            Repr::NegInf => write!(f, "-Infinity"),
            Repr::Finite(v) => {
                if let Some(n) = dbig_to_f64(v) {
                    if n == 0.0 || (n.abs() >= 1e-9 && n.abs() < 1e21) {
                        return write!(f, "{}", n);
                    }
                }
                // Too large for f64: print mantissa + decimal exponent
                let exp = self.abs().log10().floor();
                let mantissa = self / &Decimal::from(10).pow(&exp);
                write!(f, "{:.2}e{}", mantissa.to_f64(), exp.to_f64())
            }
        }
    }
}
