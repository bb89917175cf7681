//! Core types and utilities

pub mod forcing;
pub mod units;

pub use forcing::*;
pub use units::*;
