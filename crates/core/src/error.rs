//! Error types for the blowing-snow model.
//!
//! Zero-flux outcomes (no snowpack, saturated air, shear below threshold) are
//! regular results, not errors. The variants here cover configuration mistakes,
//! invalid forcing and numerical failures inside the root solver or integrator.

use thiserror::Error;

/// Failures raised by the generic numerical kernels.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum NumericsError {
    /// `f(lower)` and `f(upper)` share a sign and neither is zero.
    #[error(
        "root must be bracketed: f({lower}) = {f_lower} and f({upper}) = {f_upper} share a sign"
    )]
    NotBracketed {
        lower: f64,
        upper: f64,
        f_lower: f64,
        f_upper: f64,
    },

    /// Romberg refinement budget exhausted before the tolerance was met.
    #[error(
        "too many steps in Romberg integration: {refinements} refinements, \
         last estimate {last_estimate} (error estimate {error_estimate})"
    )]
    NotConverged {
        refinements: usize,
        last_estimate: f64,
        error_estimate: f64,
    },

    /// Integration limits coincide.
    #[error("zero-width integration interval at {at}")]
    DegenerateInterval { at: f64 },

    /// Two extrapolation abscissas coincide.
    #[error("polynomial extrapolation requires distinct abscissas")]
    CoincidentAbscissas,

    /// A NaN or infinity escaped an evaluation.
    #[error("non-finite value encountered in {context}")]
    NonFinite { context: &'static str },
}

/// Rejected configuration values.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    #[error("wind_increments must be an even number from 2 to 1000, got {0}")]
    WindIncrements(usize),

    #[error("integration tolerance must be finite and positive, got {0}")]
    IntegrationTolerance(f64),

    #[error("max_refinements must be between {min} and {max}, got {got}")]
    MaxRefinements { min: usize, max: usize, got: usize },

    #[error("root tolerance must be finite and positive, got {0}")]
    RootTolerance(f64),
}

/// Umbrella error returned by the flux driver.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum BlowingSnowError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("invalid forcing: {0}")]
    InvalidForcing(String),

    /// The shear-stress equation could not be solved for this wind speed.
    #[error("shear stress solve failed at U10 = {wind_speed} m/s: {source}")]
    ShearStress {
        wind_speed: f64,
        #[source]
        source: NumericsError,
    },

    /// The suspension-layer integral failed for this wind speed.
    #[error("suspension layer integration failed at U10 = {wind_speed} m/s: {source}")]
    SuspensionIntegral {
        wind_speed: f64,
        #[source]
        source: NumericsError,
    },
}

impl BlowingSnowError {
    /// Create an invalid-forcing error naming the offending field.
    pub fn invalid_forcing(field: &str, message: &str) -> Self {
        Self::InvalidForcing(format!("{field}: {message}"))
    }

    /// The numerical failure underneath, if any.
    pub fn numerics(&self) -> Option<&NumericsError> {
        match self {
            Self::ShearStress { source, .. } | Self::SuspensionIntegral { source, .. } => {
                Some(source)
            }
            Self::Config(_) | Self::InvalidForcing(_) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_bracketed_message_names_bracket() {
        let err = NumericsError::NotBracketed {
            lower: 1.0,
            upper: 2.0,
            f_lower: 3.0,
            f_upper: 4.0,
        };
        let msg = err.to_string();
        assert!(msg.contains("f(1) = 3"), "{msg}");
        assert!(msg.contains("f(2) = 4"), "{msg}");
    }

    #[test]
    fn config_error_converts_into_umbrella() {
        let err: BlowingSnowError = ConfigError::WindIncrements(3).into();
        assert!(matches!(err, BlowingSnowError::Config(_)));
        assert!(err.numerics().is_none());
        assert!(err.to_string().contains("got 3"));
    }

    #[test]
    fn numerics_accessor_exposes_source() {
        let err = BlowingSnowError::SuspensionIntegral {
            wind_speed: 9.0,
            source: NumericsError::CoincidentAbscissas,
        };
        assert_eq!(err.numerics(), Some(&NumericsError::CoincidentAbscissas));
    }
}
