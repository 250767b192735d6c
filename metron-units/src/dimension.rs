//! Dimensional analysis types
//!
//! Dimensions are caller-defined names ("length", "mass", "currency", ...)
//! mapped to exact rational powers. No dimension exists until some unit
//! declares it.

use std::collections::BTreeMap;
use std::fmt;
use serde::Serialize;
use metron_core::Exponent;

/// Mapping from dimension name to a nonzero rational power
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct DimensionVector {
    powers: BTreeMap<String, Exponent>,
}

impl DimensionVector {
    /// Dimensionless vector (no entries)
    pub fn new() -> Self {
        Self::default()
    }

    /// Vector with a single dimension at power 1
    pub fn single(dimension: impl Into<String>) -> Self {
        let mut v = Self::new();
        v.add(dimension, &Exponent::ONE);
        v
    }

    pub fn is_dimensionless(&self) -> bool {
        self.powers.is_empty()
    }

    pub fn len(&self) -> usize {
        self.powers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.powers.is_empty()
    }

    /// Power of a dimension, `None` when absent
    pub fn get(&self, dimension: &str) -> Option<&Exponent> {
        self.powers.get(dimension)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Exponent)> {
        self.powers.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.powers.keys().map(|k| k.as_str())
    }

    /// Add `power` to a dimension, pruning the entry if it nets to zero
    pub fn add(&mut self, dimension: impl Into<String>, power: &Exponent) {
        let dimension = dimension.into();
        let total = match self.powers.get(&dimension) {
            Some(existing) => existing + power,
            None => power.clone(),
        };
        if total.is_zero() {
            self.powers.remove(&dimension);
        } else {
            self.powers.insert(dimension, total);
        }
    }

    /// Accumulate another vector scaled by `power`
    pub fn add_scaled(&mut self, other: &DimensionVector, power: &Exponent) {
        for (dimension, order) in &other.powers {
            self.add(dimension.as_str(), &(order * power));
        }
    }

    /// True when this vector is exactly `{dimension: 1}`
    pub fn is_exactly(&self, dimension: &str) -> bool {
        self.powers.len() == 1 && self.powers.get(dimension).is_some_and(|p| p.is_one())
    }

    /// Convertibility test: the (name, power) pairs shared by both vectors
    /// must be as many as the larger vector has.
    pub fn matches(&self, other: &DimensionVector) -> bool {
        let shared = self
            .powers
            .iter()
            .filter(|(dimension, power)| other.powers.get(*dimension) == Some(*power))
            .count();
        shared >= self.powers.len().max(other.powers.len())
    }
}

impl<K: Into<String>, V: Into<Exponent>> FromIterator<(K, V)> for DimensionVector {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut v = Self::new();
        for (dimension, power) in iter {
            v.add(dimension, &power.into());
        }
        v
    }
}

impl fmt::Display for DimensionVector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self
            .powers
            .iter()
            .map(|(dimension, power)| format!("{}: {}", dimension, power))
            .collect();
        write!(f, "{{{}}}", parts.join(", "))
    }
}
