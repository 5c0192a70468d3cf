//! Hyperoperations: tetration and friends
//!
//! Heights and iteration counts are native floats: every entry point converts
//! the decimal height through [`MAX_HYPER_HEIGHT`] before use, so any height
//! past the clamp behaves exactly like the clamp itself. Fractional heights
//! use the standard piecewise-linear approximation, chosen consistently for
//! `tetrate`/`slog`/`iterated_log` so they invert each other.

use super::{Decimal, Repr};

/// Ceiling applied to tetration heights, iteration counts and layer deltas
pub const MAX_HYPER_HEIGHT: f64 = f64::MAX;

/// Iteration guard for towers that neither explode nor converge quickly
const TOWER_ITERATION_CAP: u64 = 10_000;

/// Decimal exponent past which one more exponentiation must overflow
const EXPLOSION_MAGNITUDE: f64 = 1e18;

/// Convert a decimal height to a clamped native height
fn clamp_height(height: &Decimal) -> f64 {
    let h = height.to_f64();
    if h.is_nan() {
        return 0.0;
    }
    h.clamp(-MAX_HYPER_HEIGHT, MAX_HYPER_HEIGHT)
}

impl Decimal {
    /// Repeated exponentiation: `b^^h`, with `payload` seeding the tower
    pub fn tetrate(&self, height: &Decimal, payload: &Decimal) -> Decimal {
        if self.is_nan() || height.is_nan() || payload.is_nan() {
            return Decimal::nan();
        }
        if !self.is_positive() {
            return Decimal::nan();
        }
        if *self == Decimal::one() {
            return Decimal::one();
        }

        let mut h = clamp_height(height);
        if *payload != Decimal::one() {
            // fold the payload into the height so the pure tower applies
            let shift = payload.slog(self);
            if shift.is_nan() {
                return Decimal::nan();
            }
            h = (h + shift.to_f64()).clamp(-MAX_HYPER_HEIGHT, MAX_HYPER_HEIGHT);
        }

        if h <= -1.0 {
            return Decimal::nan();
        }
        let floor = h.floor();
        let frac = h - floor;
        if floor < 0.0 {
            // single linear segment below height zero
            return Decimal::from_f64(1.0 + h);
        }

        let mut value = if frac == 0.0 {
            Decimal::one()
        } else {
            self.pow(&Decimal::from_f64(frac))
        };
        let iterations = if floor > TOWER_ITERATION_CAP as f64 {
            TOWER_ITERATION_CAP
        } else {
            floor as u64
        };
        for _ in 0..iterations {
            let next = self.pow(&value);
            if next.is_infinite() || next.approx_log10() > EXPLOSION_MAGNITUDE {
                return Decimal::infinity();
            }
            if next == value {
                // converged onto the tower's fixed point
                return next;
            }
            value = next;
        }
        value
    }

    /// Super-logarithm: inverse of `tetrate` in the height argument
    pub fn slog(&self, base: &Decimal) -> Decimal {
        if self.is_nan() || base.is_nan() {
            return Decimal::nan();
        }
        if !base.is_positive() || *base == Decimal::one() {
            return Decimal::nan();
        }
        if !self.is_positive() {
            return Decimal::from(-1);
        }
        let mut value = self.clone();
        let mut count: i64 = 0;
        while value > Decimal::one() && count < 200 {
            value = value.log(base);
            count += 1;
            if value.is_nan() {
                return Decimal::nan();
            }
        }
        // value is now in (0, 1]; the linear segment finishes the height
        Decimal::from(count) - Decimal::one() + value
    }

    /// Apply `base^x` repeatedly, `height` times, starting from `payload`
    pub fn iterated_exp(&self, height: &Decimal, payload: &Decimal) -> Decimal {
        self.tetrate(height, payload)
    }

    /// Apply `log_base` repeatedly, `times` times
    pub fn iterated_log(&self, base: &Decimal, times: &Decimal) -> Decimal {
        if self.is_nan() || base.is_nan() || times.is_nan() {
            return Decimal::nan();
        }
        let times = Decimal::from_f64(clamp_height(times));
        let shifted = self.slog(base) - times;
        base.tetrate(&shifted, &Decimal::one())
    }

    /// Shift the value by `diff` "layers" of exponentiation in `base`
    pub fn layer_add(&self, diff: &Decimal, base: &Decimal) -> Decimal {
        if self.is_nan() || diff.is_nan() || base.is_nan() {
            return Decimal::nan();
        }
        let diff = Decimal::from_f64(clamp_height(diff));
        let shifted = self.slog(base) + diff;
        base.tetrate(&shifted, &Decimal::one())
    }

    /// `layer_add` in base 10
    pub fn layer_add_10(&self, diff: &Decimal) -> Decimal {
        self.layer_add(diff, &Decimal::from(10))
    }

    /// Principal branch of the Lambert W function
    pub fn lambert_w(&self) -> Decimal {
        if self.is_nan() || matches!(self.repr, Repr::NegInf) {
            return Decimal::nan();
        }
        if matches!(self.repr, Repr::PosInf) {
            return Decimal::infinity();
        }
        if self.is_zero() {
            return Decimal::zero();
        }
        if *self < Decimal::from_f64(-(-1.0f64).exp()) {
            return Decimal::nan();
        }

        if self.approx_log10() < 300.0 {
            return Decimal::from_f64(lambert_w_f64(self.to_f64()));
        }

        // Asymptotic expansion for huge arguments, then Halley refinement
        let l1 = self.ln();
        let l2 = l1.ln();
        let mut w = &l1 - &l2 + &l2 / &l1;
        for _ in 0..3 {
            let ew = w.exp();
            let f = &w * &ew - self;
            let denom = &ew * (&w + Decimal::one())
                - (&w + Decimal::from(2)) * &f / (Decimal::from(2) * &w + Decimal::from(2));
            w = &w - &(&f / &denom);
        }
        w
    }

    /// Super square root: inverse of `x^x`
    pub fn ssqrt(&self) -> Decimal {
        if self.is_nan() || self.is_negative() {
            return Decimal::nan();
        }
        if *self == Decimal::one() {
            return Decimal::one();
        }
        let l = self.ln();
        let w = l.lambert_w();
        if w.is_nan() || w.is_zero() {
            return Decimal::nan();
        }
        &l / &w
    }

    /// Repeated tetration
    pub fn pentate(&self, height: &Decimal) -> Decimal {
        if self.is_nan() || height.is_nan() {
            return Decimal::nan();
        }
        let mut n = clamp_height(height).floor();
        if n < 0.0 {
            return Decimal::nan();
        }
        if n > 16.0 {
            n = 16.0;
        }
        let mut value = Decimal::one();
        for _ in 0..n as u64 {
            value = self.tetrate(&value, &Decimal::one());
            if value.is_infinite() || value.is_nan() {
                return value;
            }
        }
        value
    }

    /// Gamma function (Lanczos for modest arguments, Stirling beyond)
    pub fn gamma(&self) -> Decimal {
        if self.is_nan() || matches!(self.repr, Repr::NegInf) {
            return Decimal::nan();
        }
        if matches!(self.repr, Repr::PosInf) {
            return Decimal::infinity();
        }
        if !self.is_positive() {
            // poles at 0 and the negative integers; the rest of the negative
            // axis is not needed by cost formulas
            return Decimal::nan();
        }
        if *self <= Decimal::from(20) {
            return Decimal::from_f64(gamma_f64(self.to_f64()));
        }
        // Stirling series on ln Γ
        let x = self;
        let tau = Decimal::from(2) * super::transcendental::pi();
        let ln_gamma = (x - Decimal::from_f64(0.5)) * x.ln() - x
            + (&tau / x).ln() / Decimal::from(2)
            + (Decimal::from(12) * x).recip()
            - (Decimal::from(360) * x.pow(&Decimal::from(3))).recip();
        ln_gamma.exp()
    }

    /// `x! = Γ(x + 1)`
    pub fn factorial(&self) -> Decimal {
        (self + Decimal::one()).gamma()
    }
}

fn lambert_w_f64(x: f64) -> f64 {
    let mut w = if x < 1.0 { x / (1.0 + x.max(0.0)) } else { x.ln() };
    for _ in 0..40 {
        let ew = w.exp();
        let f = w * ew - x;
        let step = f / (ew * (w + 1.0) - (w + 2.0) * f / (2.0 * w + 2.0));
        w -= step;
        if step.abs() < 1e-15 * (1.0 + w.abs()) {
            break;
        }
    }
    w
}

/// Lanczos approximation, g = 7
fn gamma_f64(x: f64) -> f64 {
    const C: [f64; 9] = [
        0.99999999999980993,
        676.5203681218851,
        -1259.1392167224028,
        771.32342877765313,
        -176.61502916214059,
        12.507343278686905,
        -0.13857109526572012,
        9.9843695780195716e-6,
        1.5056327351493116e-7,
    ];
    if x < 0.5 {
        std::f64::consts::PI / ((std::f64::consts::PI * x).sin() * gamma_f64(1.0 - x))
    } else {
        let x = x - 1.0;
        let mut a = C[0];
        for (i, &c) in C.iter().enumerate().skip(1) {
            a += c / (x + i as f64);
        }
        let t = x + 7.5;
        (2.0 * std::f64::consts::PI).sqrt() * t.powf(x + 0.5) * (-t).exp() * a
    }
}
