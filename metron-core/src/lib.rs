//! Metron Core - Fundamental types
//!
//! This crate provides the core types used throughout Metron:
//! - `Exponent`: Exact rational powers for units and dimensions
//! - `UnitError`: Structured errors with machine-readable codes

mod error;
mod exponent;

pub use error::{codes, UnitError};
pub use exponent::Exponent;

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::{Exponent, UnitError};
    pub use crate::error::codes;
}
