//! Power, logarithm, trigonometric and hyperbolic families
//!
//! Everything with an exp/ln closed form is computed on the dashu backend at
//! working precision; sin/cos use the Taylor expansion after 2π range
//! reduction. asin/acos/atan go through f64 (their useful domain fits).

use dashu_float::DBig;
use dashu_float::ops::SquareRoot;
use dashu_int::IBig;

use super::{work, Decimal, Repr};

/// Largest exponent argument exp() accepts before saturating to infinity.
/// Keeps the result's decimal exponent inside the backing isize range.
const EXP_SATURATION: f64 = 1e18;

/// Magnitude (in decimal digits) past which angle reduction is meaningless
const TRIG_MAGNITUDE_LIMIT: f64 = 40.0;

const PI_STR: &str =
    "3.14159265358979323846264338327950288419716939937510582097494459230781640628620899";

fn pi_raw() -> DBig {
    work(PI_STR.parse().unwrap_or(DBig::ZERO))
}

/// π at working precision
pub fn pi() -> Decimal {
    Decimal::finite(pi_raw())
}

impl Decimal {
    /// Rough base-10 magnitude, for overflow guards only
    pub(crate) fn approx_log10(&self) -> f64 {
        use dashu_int::ops::BitTest;

        match &self.repr {
            Repr::Finite(v) => {
                let (sig, exp) = v.clone().into_repr().into_parts();
                if sig == IBig::ZERO {
                    return f64::NEG_INFINITY;
                }
                let digits = sig.bit_len() as f64 * std::f64::consts::LOG10_2;
                digits + exp as f64
            }
            Repr::PosInf | Repr::NegInf => f64::INFINITY,
            Repr::Nan => f64::NAN,
        }
    }

    // ========== Exponentials and logarithms ==========

    pub fn exp(&self) -> Decimal {
        match &self.repr {
            Repr::Nan => Decimal::nan(),
            Repr::PosInf => Decimal::infinity(),
            Repr::NegInf => Decimal::zero(),
            Repr::Finite(v) => {
                let x = self.to_f64();
                if x > EXP_SATURATION {
                    Decimal::infinity()
                } else if x < -EXP_SATURATION {
                    Decimal::zero()
                } else {
                    Decimal::finite(work(v.clone()).exp())
                }
            }
        }
    }

    pub fn ln(&self) -> Decimal {
        match &self.repr {
            Repr::Nan | Repr::NegInf => Decimal::nan(),
            Repr::PosInf => Decimal::infinity(),
            Repr::Finite(v) => {
                if *v < DBig::ZERO {
                    Decimal::nan()
                } else if *v == DBig::ZERO {
                    Decimal::neg_infinity()
                } else {
                    Decimal::finite(work(v.clone()).ln())
                }
            }
        }
    }

    pub fn log10(&self) -> Decimal {
        self.ln() / Decimal::from(10).ln()
    }

    pub fn log2(&self) -> Decimal {
        self.ln() / Decimal::from(2).ln()
    }

    /// Logarithm in an arbitrary base
    pub fn log(&self, base: &Decimal) -> Decimal {
        if base.is_nan() || !base.is_positive() || *base == Decimal::one() {
            return Decimal::nan();
        }
        self.ln() / base.ln()
    }

    /// log10 clamped to zero for non-positive inputs
    pub fn plog10(&self) -> Decimal {
        if self.is_positive() {
            self.log10()
        } else {
            Decimal::zero()
        }
    }

    pub fn abs_log10(&self) -> Decimal {
        self.abs().log10()
    }

    // ========== Powers ==========

    pub fn pow(&self, exponent: &Decimal) -> Decimal {
        if self.is_nan() || exponent.is_nan() {
            return Decimal::nan();
        }
        if exponent.is_zero() {
            return Decimal::one();
        }
        if self.is_zero() {
            return if exponent.is_negative() {
                Decimal::infinity()
            } else {
                Decimal::zero()
            };
        }
        if self.is_infinite() || exponent.is_infinite() {
            return pow_infinite(self, exponent);
        }

        // Exact square-and-multiply for reasonable integer exponents
        if exponent.is_integer() {
            let e = exponent.to_f64();
            if e.abs() <= 1e6 {
                return self.powi(e as i64);
            }
        }

        if self.is_negative() {
            // non-integer exponent of a negative base has no real value
            return Decimal::nan();
        }

        // Saturate before the backing exponent can overflow
        let magnitude = exponent.to_f64() * self.approx_log10();
        if magnitude > EXP_SATURATION {
            return Decimal::infinity();
        }
        if magnitude < -EXP_SATURATION {
            return Decimal::zero();
        }

        (exponent * self.ln()).exp()
    }

    fn powi(&self, mut n: i64) -> Decimal {
        let magnitude = self.approx_log10().abs() * n.abs() as f64;
        if magnitude > EXP_SATURATION {
            let positive = !self.is_negative() || n % 2 == 0;
            let grows = (self.approx_log10() > 0.0) == (n > 0);
            return match (grows, positive) {
                (true, true) => Decimal::infinity(),
                (true, false) => Decimal::neg_infinity(),
                (false, _) => Decimal::zero(),
            };
        }

        let invert = n < 0;
        n = n.abs();
        let mut base = self.clone();
        let mut result = Decimal::one();
        while n > 0 {
            if n & 1 == 1 {
                result = &result * &base;
            }
            base = &base * &base;
            n >>= 1;
        }
        if invert { result.recip() } else { result }
    }

    /// 10^x, exact when x is an integer in range
    pub fn pow10(&self) -> Decimal {
        if self.is_finite() && self.is_integer() {
            let e = self.to_f64();
            if e.abs() < 9.0e18 {
                return Decimal::finite(DBig::from_parts(IBig::ONE, e as isize));
            }
            return if e > 0.0 {
                Decimal::infinity()
            } else {
                Decimal::zero()
            };
        }
        Decimal::from(10).pow(self)
    }

    /// n-th root; odd integer roots of negative values are supported
    pub fn root(&self, degree: &Decimal) -> Decimal {
        if degree.is_nan() || degree.is_zero() {
            return Decimal::nan();
        }
        if self.is_negative() {
            let d = degree.to_f64();
            if degree.is_integer() && (d as i64) % 2 != 0 {
                return -(-self).root(degree);
            }
            return Decimal::nan();
        }
        self.pow(&degree.recip())
    }

    pub fn sqrt(&self) -> Decimal {
        match &self.repr {
            Repr::Nan | Repr::NegInf => Decimal::nan(),
            Repr::PosInf => Decimal::infinity(),
            Repr::Finite(v) => {
                if *v < DBig::ZERO {
                    Decimal::nan()
                } else {
                    Decimal::finite(work(v.clone()).sqrt())
                }
            }
        }
    }

    pub fn cbrt(&self) -> Decimal {
        self.root(&Decimal::from(3))
    }

    // ========== Trigonometric ==========

    pub fn sin(&self) -> Decimal {
        match reduced_angle(self) {
            Some(x) => {
                // Taylor: x - x³/3! + x⁵/5! - ...
                let x_squared = &x * &x;
                let mut sum = x.clone();
                let mut term = x;
                for k in 1..60i64 {
                    let denom = DBig::from((2 * k) * (2 * k + 1));
                    term = -&term * &x_squared / denom;
                    sum = &sum + &term;
                    if converged(&term) {
                        break;
                    }
                }
                Decimal::finite(sum)
            }
            None => Decimal::nan(),
        }
    }

    pub fn cos(&self) -> Decimal {
        match reduced_angle(self) {
            Some(x) => {
                let x_squared = &x * &x;
                let one = work(DBig::ONE);
                let mut sum = one.clone();
                let mut term = one;
                for k in 1..60i64 {
                    let denom = DBig::from((2 * k - 1) * (2 * k));
                    term = -&term * &x_squared / denom;
                    sum = &sum + &term;
                    if converged(&term) {
                        break;
                    }
                }
                Decimal::finite(sum)
            }
            None => Decimal::nan(),
        }
    }

    pub fn tan(&self) -> Decimal {
        self.sin() / self.cos()
    }

    pub fn asin(&self) -> Decimal {
        if self.is_nan() || self.abs() > Decimal::one() {
            return Decimal::nan();
        }
        Decimal::from_f64(self.to_f64().asin())
    }

    pub fn acos(&self) -> Decimal {
        if self.is_nan() || self.abs() > Decimal::one() {
            return Decimal::nan();
        }
        Decimal::from_f64(self.to_f64().acos())
    }

    pub fn atan(&self) -> Decimal {
        if self.is_nan() {
            return Decimal::nan();
        }
        // saturating to_f64 maps huge magnitudes to ±∞, and atan(±∞) = ±π/2
        Decimal::from_f64(self.to_f64().atan())
    }

    // ========== Hyperbolic ==========

    pub fn sinh(&self) -> Decimal {
        (self.exp() - (-self).exp()) / Decimal::from(2)
    }

    pub fn cosh(&self) -> Decimal {
        (self.exp() + (-self).exp()) / Decimal::from(2)
    }

    pub fn tanh(&self) -> Decimal {
        if self.is_nan() {
            return Decimal::nan();
        }
        // saturates well before exp(2x) can overflow to ∞/∞
        if *self > Decimal::from(40) {
            return Decimal::one();
        }
        if *self < Decimal::from(-40) {
            return -Decimal::one();
        }
        let e2x = (self * Decimal::from(2)).exp();
        (&e2x - Decimal::one()) / (&e2x + Decimal::one())
    }

    pub fn asinh(&self) -> Decimal {
        if self.is_negative() {
            // odd symmetry avoids catastrophic cancellation for x << 0
            return -(-self).asinh();
        }
        (self + (self * self + Decimal::one()).sqrt()).ln()
    }

    pub fn acosh(&self) -> Decimal {
        if self.is_nan() || *self < Decimal::one() {
            return Decimal::nan();
        }
        (self + (self * self - Decimal::one()).sqrt()).ln()
    }

    pub fn atanh(&self) -> Decimal {
        if self.is_nan() || self.abs() > Decimal::one() {
            return Decimal::nan();
        }
        ((Decimal::one() + self) / (Decimal::one() - self)).ln() / Decimal::from(2)
    }
}

fn pow_infinite(base: &Decimal, exponent: &Decimal) -> Decimal {
    if base.is_infinite() {
        if base.is_negative() {
            if exponent.is_integer() {
                let odd = (exponent.to_f64().rem_euclid(2.0) - 1.0).abs() < 0.5;
                return if exponent.is_negative() {
                    Decimal::zero()
                } else if odd {
                    Decimal::neg_infinity()
                } else {
                    Decimal::infinity()
                };
            }
            return Decimal::nan();
        }
        return if exponent.is_negative() {
            Decimal::zero()
        } else {
            Decimal::infinity()
        };
    }
    // exponent is infinite, base finite and non-zero
    let above_one = base.abs() > Decimal::one();
    let grows = above_one == exponent.is_positive();
    if base.abs() == Decimal::one() {
        Decimal::one()
    } else if base.is_negative() {
        Decimal::nan()
    } else if grows {
        Decimal::infinity()
    } else {
        Decimal::zero()
    }
}

/// Reduce an angle into [0, 2π); `None` when the input has no usable angle
fn reduced_angle(value: &Decimal) -> Option<DBig> {
    match &value.repr {
        Repr::Finite(v) => {
            if value.approx_log10() > TRIG_MAGNITUDE_LIMIT {
                return None;
            }
            let tau = pi_raw() * DBig::from(2);
            let turns = (v / &tau).floor();
            Some(v.clone() - turns * tau)
        }
        _ => None,
    }
}

/// Series term too small to change the sum at working precision
fn converged(term: &DBig) -> bool {
    use dashu_float::ops::Abs;
    Abs::abs(term.clone()) < work("1e-45".parse().unwrap_or(DBig::ZERO))
}
