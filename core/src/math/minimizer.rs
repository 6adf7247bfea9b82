//! Bounded scalar minimization over a closed interval.
//!
//! The search engine only depends on [`ScalarMinimizer`]; the concrete method
//! is picked from configuration through [`MinimizerKind`].

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

const DEFAULT_MAX_EVALUATIONS: usize = 500;

/// Location and value of a local minimum.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Minimum {
    pub x: f64,
    pub value: f64,
    pub evaluations: usize,
    /// False when the evaluation budget ran out before the tolerance was met.
    pub converged: bool,
}

#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum MinimizerError {
    #[error("invalid bounds [{0}, {1}]")]
    InvalidBounds(f64, f64),
    #[error("tolerance must be positive, got {0}")]
    InvalidTolerance(f64),
    #[error("objective returned NaN near x = {0}")]
    NotANumber(f64),
}

/// Finds a local minimum of `f` inside `bounds` to within `tolerance` in x.
pub trait ScalarMinimizer: Send + Sync {
    fn minimize(
        &self,
        f: &dyn Fn(f64) -> f64,
        bounds: (f64, f64),
        tolerance: f64,
    ) -> Result<Minimum, MinimizerError>;
}

fn check_arguments(bounds: (f64, f64), tolerance: f64) -> Result<(), MinimizerError> {
    let (lower, upper) = bounds;
    if !lower.is_finite() || !upper.is_finite() || lower > upper {
        return Err(MinimizerError::InvalidBounds(lower, upper));
    }
    if !tolerance.is_finite() || tolerance <= 0.0 {
        return Err(MinimizerError::InvalidTolerance(tolerance));
    }
    Ok(())
}

/// Brent's bounded method: successive parabolic interpolation with a
/// golden-section fallback.
#[derive(Debug, Clone, Copy)]
pub struct BoundedBrent {
    pub max_evaluations: usize,
}

impl Default for BoundedBrent {
    fn default() -> Self {
        Self {
            max_evaluations: DEFAULT_MAX_EVALUATIONS,
        }
    }
}

impl ScalarMinimizer for BoundedBrent {
    fn minimize(
        &self,
        f: &dyn Fn(f64) -> f64,
        bounds: (f64, f64),
        tolerance: f64,
    ) -> Result<Minimum, MinimizerError> {
        check_arguments(bounds, tolerance)?;

        let sqrt_eps = f64::EPSILON.sqrt();
        let golden_mean = 0.5 * (3.0 - 5.0f64.sqrt());
        let (mut a, mut b) = bounds;

        // xf: best point, nfc: second best, fulc: previous second best.
        let mut fulc = a + golden_mean * (b - a);
        let mut nfc = fulc;
        let mut xf = fulc;
        let mut rat = 0.0f64;
        let mut e = 0.0f64;
        let mut fx = f(xf);
        let mut evaluations = 1;
        let mut ffulc = fx;
        let mut fnfc = fx;
        let mut fu = f64::INFINITY;
        let mut converged = true;

        let mut xm = 0.5 * (a + b);
        let mut tol1 = sqrt_eps * xf.abs() + tolerance / 3.0;
        let mut tol2 = 2.0 * tol1;

        while (xf - xm).abs() > tol2 - 0.5 * (b - a) {
            let mut golden = true;

            if e.abs() > tol1 {
                golden = false;
                let mut r = (xf - nfc) * (fx - ffulc);
                let mut q = (xf - fulc) * (fx - fnfc);
                let mut p = (xf - fulc) * q - (xf - nfc) * r;
                q = 2.0 * (q - r);
                if q > 0.0 {
                    p = -p;
                }
                q = q.abs();
                r = e;
                e = rat;

                let acceptable =
                    p.abs() < (0.5 * q * r).abs() && p > q * (a - xf) && p < q * (b - xf);
                if acceptable {
                    rat = p / q;
                    let x = xf + rat;
                    if (x - a) < tol2 || (b - x) < tol2 {
                        rat = tol1 * signum_or_one(xm - xf);
                    }
                } else {
                    golden = true;
                }
            }

            if golden {
                e = if xf >= xm { a - xf } else { b - xf };
                rat = golden_mean * e;
            }

            let x = xf + signum_or_one(rat) * rat.abs().max(tol1);
            fu = f(x);
            evaluations += 1;

            if fu <= fx {
                if x >= xf {
                    a = xf;
                } else {
                    b = xf;
                }
                fulc = nfc;
                ffulc = fnfc;
                nfc = xf;
                fnfc = fx;
                xf = x;
                fx = fu;
            } else {
                if x < xf {
                    a = x;
                } else {
                    b = x;
                }
                if fu <= fnfc || nfc == xf {
                    fulc = nfc;
                    ffulc = fnfc;
                    nfc = x;
                    fnfc = fu;
                } else if fu <= ffulc || fulc == xf || fulc == nfc {
                    fulc = x;
                    ffulc = fu;
                }
            }

            xm = 0.5 * (a + b);
            tol1 = sqrt_eps * xf.abs() + tolerance / 3.0;
            tol2 = 2.0 * tol1;

            if evaluations >= self.max_evaluations {
                converged = false;
                break;
            }
        }

        if xf.is_nan() || fx.is_nan() || fu.is_nan() {
            return Err(MinimizerError::NotANumber(xf));
        }

        Ok(Minimum {
            x: xf,
            value: fx,
            evaluations,
            converged,
        })
    }
}

fn signum_or_one(value: f64) -> f64 {
    if value < 0.0 {
        -1.0
    } else {
        1.0
    }
}

/// Plain golden-section search. Slower than Brent on smooth objectives but
/// never relies on a parabolic fit.
#[derive(Debug, Clone, Copy)]
pub struct GoldenSection {
    pub max_evaluations: usize,
}

impl Default for GoldenSection {
    fn default() -> Self {
        Self {
            max_evaluations: DEFAULT_MAX_EVALUATIONS,
        }
    }
}

impl ScalarMinimizer for GoldenSection {
    fn minimize(
        &self,
        f: &dyn Fn(f64) -> f64,
        bounds: (f64, f64),
        tolerance: f64,
    ) -> Result<Minimum, MinimizerError> {
        check_arguments(bounds, tolerance)?;

        let inv_phi = (5.0f64.sqrt() - 1.0) / 2.0;
        let (mut a, mut b) = bounds;
        let mut c = b - inv_phi * (b - a);
        let mut d = a + inv_phi * (b - a);
        let mut fc = f(c);
        let mut fd = f(d);
        let mut evaluations = 2;
        let mut converged = true;

        while (b - a) > tolerance {
            if evaluations >= self.max_evaluations {
                converged = false;
                break;
            }
            if fc < fd {
                b = d;
                d = c;
                fd = fc;
                c = b - inv_phi * (b - a);
                fc = f(c);
            } else {
                a = c;
                c = d;
                fc = fd;
                d = a + inv_phi * (b - a);
                fd = f(d);
            }
            evaluations += 1;
        }

        let (x, value) = if fc < fd { (c, fc) } else { (d, fd) };
        if value.is_nan() {
            return Err(MinimizerError::NotANumber(x));
        }

        Ok(Minimum {
            x,
            value,
            evaluations,
            converged,
        })
    }
}

/// Configuration-selectable minimization method.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MinimizerKind {
    #[default]
    Brent,
    Golden,
}

impl ScalarMinimizer for MinimizerKind {
    fn minimize(
        &self,
        f: &dyn Fn(f64) -> f64,
        bounds: (f64, f64),
        tolerance: f64,
    ) -> Result<Minimum, MinimizerError> {
        match self {
            MinimizerKind::Brent => BoundedBrent::default().minimize(f, bounds, tolerance),
            MinimizerKind::Golden => GoldenSection::default().minimize(f, bounds, tolerance),
        }
    }
}

impl fmt::Display for MinimizerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MinimizerKind::Brent => f.write_str("brent"),
            MinimizerKind::Golden => f.write_str("golden"),
        }
    }
}

impl FromStr for MinimizerKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "brent" | "bounded" => Ok(MinimizerKind::Brent),
            "golden" => Ok(MinimizerKind::Golden),
            other => Err(format!("unknown minimizer '{}' (expected brent or golden)", other)),
        }
    }
}
