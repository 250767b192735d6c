//! Metric-style prefix rules

use serde::Serialize;
use metron_core::UnitError;
use crate::definition::unreachable_key;

/// A multiplicative prefix applied to prefixable units at registration,
/// e.g. `("kilo", "k", 1e3)` turns `gram`/`g` into `kilogram`/`kg`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PrefixRule {
    /// Prepended to every name and the plural
    pub name: String,
    /// Prepended to every abbreviation
    pub abbreviation: String,
    /// Scale multiplier
    pub multiplier: f64,
}

impl PrefixRule {
    pub fn new(name: &str, abbreviation: &str, multiplier: f64) -> Self {
        PrefixRule {
            name: name.to_string(),
            abbreviation: abbreviation.to_string(),
            multiplier,
        }
    }

    /// Reject rules whose variants would be unreachable or not positively scaled
    pub fn validate(&self) -> Result<(), UnitError> {
        for part in [&self.name, &self.abbreviation] {
            if let Some(reason) = unreachable_key(part) {
                return Err(UnitError::invalid_unit(
                    &self.name,
                    format!("prefix '{}': {}", part, reason),
                ));
            }
        }
        if !self.multiplier.is_finite() || self.multiplier <= 0.0 {
            return Err(UnitError::invalid_unit(
                &self.name,
                format!("prefix multiplier must be a positive number, got {}", self.multiplier),
            ));
        }
        Ok(())
    }
}

impl<N: Into<String>, A: Into<String>> From<(N, A, f64)> for PrefixRule {
    fn from((name, abbreviation, multiplier): (N, A, f64)) -> Self {
        PrefixRule {
            name: name.into(),
            abbreviation: abbreviation.into(),
            multiplier,
        }
    }
}
