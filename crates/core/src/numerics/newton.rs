//! Safeguarded Newton-Raphson root finder
//!
//! Newton steps are taken while they stay inside the current bracket and shrink
//! the step at least as fast as bisection would; otherwise the bracket is
//! bisected. The bracket is tightened after every evaluation, so the iteration
//! cannot escape `[x1, x2]`.
//!
//! # References
//! - Press, W.H. et al. (1992). "Numerical Recipes in C", 2nd ed., Section 9.4 (`rtsafe`)

use tracing::{trace, warn};

use crate::error::NumericsError;

/// Iteration cap for the safeguarded Newton solve
pub const MAX_ITERATIONS: usize = 100;

/// A scalar equation `f(x) = 0` that can report its own derivative.
pub trait ImplicitEquation {
    /// Return `(f(x), f'(x))`
    fn evaluate(&self, x: f64) -> (f64, f64);
}

impl<F> ImplicitEquation for F
where
    F: Fn(f64) -> (f64, f64),
{
    fn evaluate(&self, x: f64) -> (f64, f64) {
        self(x)
    }
}

/// Outcome of a bracketed root solve
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RootOutcome {
    /// Step size dropped below tolerance (or the iterate stopped moving)
    Converged { root: f64, iterations: usize },
    /// Iteration budget exhausted; `last_estimate` is the final iterate
    FellBack {
        last_estimate: f64,
        iterations: usize,
    },
}

impl RootOutcome {
    /// The converged root, or `fallback` when the solve did not converge
    pub fn value_or(self, fallback: f64) -> f64 {
        match self {
            RootOutcome::Converged { root, .. } => root,
            RootOutcome::FellBack { .. } => fallback,
        }
    }

    pub fn is_converged(self) -> bool {
        matches!(self, RootOutcome::Converged { .. })
    }
}

/// Find a root of `equation` inside `[x1, x2]`.
///
/// `tolerance` is the absolute step size below which the iterate is accepted.
///
/// # Errors
/// - `NotBracketed` if `f(x1)` and `f(x2)` share a sign and neither is zero
/// - `NonFinite` if either end point evaluates to NaN
pub fn newton_safe<E>(
    equation: &E,
    x1: f64,
    x2: f64,
    tolerance: f64,
) -> Result<RootOutcome, NumericsError>
where
    E: ImplicitEquation + ?Sized,
{
    let (f_lower, _) = equation.evaluate(x1);
    let (f_upper, _) = equation.evaluate(x2);

    if f_lower.is_nan() || f_upper.is_nan() {
        return Err(NumericsError::NonFinite {
            context: "root bracket end point",
        });
    }
    if (f_lower > 0.0 && f_upper > 0.0) || (f_lower < 0.0 && f_upper < 0.0) {
        return Err(NumericsError::NotBracketed {
            lower: x1,
            upper: x2,
            f_lower,
            f_upper,
        });
    }
    if f_lower == 0.0 {
        return Ok(RootOutcome::Converged {
            root: x1,
            iterations: 0,
        });
    }
    if f_upper == 0.0 {
        return Ok(RootOutcome::Converged {
            root: x2,
            iterations: 0,
        });
    }

    // Orient so that f(neg_side) < 0 < f(pos_side).
    let (mut neg_side, mut pos_side) = if f_lower < 0.0 { (x1, x2) } else { (x2, x1) };

    let mut root = 0.5 * (x1 + x2);
    let mut step_before_last = (x2 - x1).abs();
    let mut step = step_before_last;
    let (mut f, mut df) = equation.evaluate(root);

    for iteration in 1..=MAX_ITERATIONS {
        let overflowed = !f.is_finite() || !df.is_finite();
        let newton_leaves_bracket =
            ((root - pos_side) * df - f) * ((root - neg_side) * df - f) > 0.0;
        let newton_too_slow = (2.0 * f).abs() > (step_before_last * df).abs();

        if overflowed || newton_leaves_bracket || newton_too_slow {
            step_before_last = step;
            step = 0.5 * (pos_side - neg_side);
            root = neg_side + step;
            if neg_side == root {
                return Ok(RootOutcome::Converged {
                    root,
                    iterations: iteration,
                });
            }
        } else {
            step_before_last = step;
            step = f / df;
            let previous = root;
            root -= step;
            if previous == root {
                return Ok(RootOutcome::Converged {
                    root,
                    iterations: iteration,
                });
            }
        }

        if step.abs() < tolerance {
            return Ok(RootOutcome::Converged {
                root,
                iterations: iteration,
            });
        }

        (f, df) = equation.evaluate(root);
        trace!(iteration, root, f, "newton step");
        if f < 0.0 {
            neg_side = root;
        } else {
            pos_side = root;
        }
    }

    warn!(
        last_estimate = root,
        "Maximum number of iterations exceeded in safeguarded Newton solve"
    );
    Ok(RootOutcome::FellBack {
        last_estimate: root,
        iterations: MAX_ITERATIONS,
    })
}
