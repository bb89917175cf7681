//! Romberg quadrature
//!
//! Composite trapezoidal estimates are refined by doubling the number of panels
//! on every pass; after each pass the last `K` estimates are extrapolated to zero
//! step size with Neville's algorithm (Richardson extrapolation in `h²`).
//!
//! The running trapezoidal sum is threaded explicitly from one refinement to the
//! next, so the integrator holds no state between calls and can be used from
//! any number of threads at once.
//!
//! # References
//! - Press, W.H. et al. (1992). "Numerical Recipes in C", 2nd ed., Section 4.3

use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::error::NumericsError;

/// Number of trapezoidal estimates used in each extrapolation (`K`)
pub const EXTRAPOLATION_POINTS: usize = 5;

/// Default relative convergence tolerance (not machine epsilon)
pub const MACHEPS: f64 = 1.0e-6;

/// Default refinement budget
pub const MAX_REFINEMENTS: usize = 100;

/// Convergence settings for [`romberg`]
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RombergSettings {
    /// Stop once `|error estimate| <= tolerance * |value|`
    pub tolerance: f64,
    /// Hard cap on trapezoidal refinements
    pub max_refinements: usize,
}

impl Default for RombergSettings {
    fn default() -> Self {
        Self {
            tolerance: MACHEPS,
            max_refinements: MAX_REFINEMENTS,
        }
    }
}

/// Converged integral
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Quadrature {
    pub value: f64,
    /// Magnitude of the last Neville correction
    pub error_estimate: f64,
    /// Trapezoidal refinements performed
    pub refinements: usize,
}

/// Value of a polynomial extrapolation plus its last correction term
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Extrapolation {
    pub value: f64,
    pub correction: f64,
}

/// One stage of the extended trapezoidal rule.
///
/// Stage 1 is the plain trapezoid on `[a, b]`. Stage `n > 1` adds `2^(n-2)`
/// interior points midway between those already sampled and folds them into
/// `previous`, the stage `n - 1` result.
pub fn trapezoid_stage<F>(integrand: &F, a: f64, b: f64, stage: usize, previous: f64) -> f64
where
    F: Fn(f64) -> f64,
{
    let width = b - a;
    if stage <= 1 {
        return 0.5 * width * (integrand(a) + integrand(b));
    }

    let new_points = 1_usize << (stage - 2);
    let spacing = width / new_points as f64;
    let sum: f64 = (0..new_points)
        .map(|i| integrand(a + (i as f64 + 0.5) * spacing))
        .sum();

    0.5 * (previous + width * sum / new_points as f64)
}

/// Evaluate at `x` the polynomial through `(xa[i], ya[i])` using Neville's algorithm.
///
/// # Errors
/// `NumericsError::CoincidentAbscissas` if two abscissas are equal.
pub fn neville(
    xa: &[f64; EXTRAPOLATION_POINTS],
    ya: &[f64; EXTRAPOLATION_POINTS],
    x: f64,
) -> Result<Extrapolation, NumericsError> {
    let points = EXTRAPOLATION_POINTS;

    let mut nearest = 0;
    let mut nearest_dist = (x - xa[0]).abs();
    for (i, xi) in xa.iter().enumerate().skip(1) {
        let dist = (x - xi).abs();
        if dist < nearest_dist {
            nearest = i;
            nearest_dist = dist;
        }
    }

    // Tableau columns: `up` corrections climb toward higher indices, `down` toward lower.
    let mut up = *ya;
    let mut down = *ya;
    let mut value = ya[nearest];
    let mut path = nearest as isize - 1;
    let mut correction = 0.0;

    for m in 1..points {
        for i in 0..points - m {
            let ho = xa[i] - x;
            let hp = xa[i + m] - x;
            let den = ho - hp;
            if den == 0.0 {
                return Err(NumericsError::CoincidentAbscissas);
            }
            let scale = (up[i + 1] - down[i]) / den;
            down[i] = hp * scale;
            up[i] = ho * scale;
        }
        correction = if 2 * (path + 1) < (points - m) as isize {
            up[(path + 1) as usize]
        } else {
            let term = down[path as usize];
            path -= 1;
            term
        };
        value += correction;
    }

    Ok(Extrapolation { value, correction })
}

/// Integrate `integrand` over `[a, b]` by Romberg's method.
///
/// # Errors
/// - `DegenerateInterval` when `a == b`; callers decide what a zero-width layer means
/// - `NonFinite` when a limit or an extrapolated estimate is NaN or infinite
/// - `NotConverged` when `settings.max_refinements` passes do not meet the tolerance
pub fn romberg<F>(
    a: f64,
    b: f64,
    settings: &RombergSettings,
    integrand: F,
) -> Result<Quadrature, NumericsError>
where
    F: Fn(f64) -> f64,
{
    if !a.is_finite() || !b.is_finite() {
        return Err(NumericsError::NonFinite {
            context: "integration limits",
        });
    }
    if a == b {
        return Err(NumericsError::DegenerateInterval { at: a });
    }

    // Stage n samples 2^(n-2) new points; beyond the word size the count is unrepresentable.
    let max_stage = settings.max_refinements.min(usize::BITS as usize + 1);
    let k = EXTRAPOLATION_POINTS;
    let mut estimates = Vec::with_capacity(max_stage);
    let mut steps = Vec::with_capacity(max_stage);
    let mut running = 0.0;
    let mut step = 1.0;
    let mut last = Extrapolation {
        value: 0.0,
        correction: f64::INFINITY,
    };

    for stage in 1..=max_stage {
        running = trapezoid_stage(&integrand, a, b, stage, running);
        estimates.push(running);
        steps.push(step);

        if stage >= k {
            let window = stage - k;
            let mut xa = [0.0; EXTRAPOLATION_POINTS];
            let mut ya = [0.0; EXTRAPOLATION_POINTS];
            xa.copy_from_slice(&steps[window..stage]);
            ya.copy_from_slice(&estimates[window..stage]);

            last = neville(&xa, &ya, 0.0)?;
            trace!(
                stage,
                value = last.value,
                correction = last.correction,
                "romberg refinement"
            );
            if !last.value.is_finite() || !last.correction.is_finite() {
                return Err(NumericsError::NonFinite {
                    context: "romberg extrapolation",
                });
            }
            if last.correction.abs() <= settings.tolerance * last.value.abs() {
                return Ok(Quadrature {
                    value: last.value,
                    error_estimate: last.correction.abs(),
                    refinements: stage,
                });
            }
        }
        step *= 0.25;
    }

    Err(NumericsError::NotConverged {
        refinements: max_stage,
        last_estimate: last.value,
        error_estimate: last.correction.abs(),
    })
}
