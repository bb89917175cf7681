//! Generic numerical kernels with no knowledge of snow physics

pub mod newton;
pub mod romberg;

pub use newton::{newton_safe, ImplicitEquation, RootOutcome};
pub use romberg::{romberg, Quadrature, RombergSettings};
