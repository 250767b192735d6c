//! Structured errors for the unit engine
//!
//! Every failure is deterministic and input-driven, so errors carry enough
//! context to identify the offending string without a retry path.

use thiserror::Error;

/// Standard error codes (machine-readable)
pub mod codes {
    pub const INVALID_UNIT: &str = "INVALID_UNIT";
    pub const UNIT_CONVERSION: &str = "UNIT_CONVERSION";
    pub const MISSING_BASIS: &str = "MISSING_BASIS";
    pub const INVALID_EXPONENT: &str = "INVALID_EXPONENT";
}

/// Error type for unit registration, parsing and conversion
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum UnitError {
    /// Malformed descriptor, unknown name, or unparseable expression
    #[error("invalid unit '{identifier}': {reason}")]
    InvalidUnit { identifier: String, reason: String },

    /// Dimension vectors of the two composites differ
    #[error("cannot convert {from} {from_dimensions} to {to} {to_dimensions}: dimensions do not match")]
    UnitConversion {
        from: String,
        from_dimensions: String,
        to: String,
        to_dimensions: String,
    },

    /// No basis unit has been resolved for the dimension
    #[error("no basis unit for dimension '{dimension}'")]
    MissingBasis { dimension: String },

    #[error("invalid exponent: {literal}")]
    InvalidExponent { literal: String },
}

impl UnitError {
    pub fn invalid_unit(identifier: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidUnit {
            identifier: identifier.into(),
            reason: reason.into(),
        }
    }

    pub fn unknown_unit(identifier: impl Into<String>) -> Self {
        Self::invalid_unit(identifier, "unknown unit")
    }

    pub fn missing_basis(dimension: impl Into<String>) -> Self {
        Self::MissingBasis { dimension: dimension.into() }
    }

    /// Machine-readable code for this error
    pub fn code(&self) -> &'static str {
        match self {
            Self::InvalidUnit { .. } => codes::INVALID_UNIT,
            Self::UnitConversion { .. } => codes::UNIT_CONVERSION,
            Self::MissingBasis { .. } => codes::MISSING_BASIS,
            Self::InvalidExponent { .. } => codes::INVALID_EXPONENT,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_unit_message() {
        let err = UnitError::unknown_unit("foo");
        assert_eq!(err.code(), codes::INVALID_UNIT);
        assert_eq!(err.to_string(), "invalid unit 'foo': unknown unit");
    }

    #[test]
    fn test_conversion_message_lists_dimensions() {
        let err = UnitError::UnitConversion {
            from: "m".to_string(),
            from_dimensions: "{length: 1}".to_string(),
            to: "s".to_string(),
            to_dimensions: "{time: 1}".to_string(),
        };
        let msg = err.to_string();
        assert!(msg.contains("{length: 1}"));
        assert!(msg.contains("{time: 1}"));
        assert_eq!(err.code(), codes::UNIT_CONVERSION);
    }
}
