//! Unit definitions: names, scale and dimensions of a single unit

use std::collections::BTreeMap;
use std::fmt;
use serde::{Deserialize, Serialize};
use metron_core::{Exponent, UnitError};
use crate::{DimensionVector, PrefixRule};

/// Characters that would make a name unreachable through the expression grammar
const RESERVED: [char; 3] = ['*', '/', '^'];

/// Reason a name, abbreviation or prefix cannot be reached by the tokenizer
pub(crate) fn unreachable_key(key: &str) -> Option<&'static str> {
    if key.is_empty() {
        Some("empty name or abbreviation")
    } else if key.chars().any(|c| RESERVED.contains(&c) || c.is_ascii_digit()) {
        Some("names may not contain digits, '*', '/' or '^'")
    } else if key.chars().any(char::is_whitespace) {
        Some("names may not contain whitespace")
    } else {
        None
    }
}

/// Represents a single physical unit with its scale and dimension vector
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UnitDefinition {
    /// Full names, the first is canonical (e.g. "metre", "meter")
    names: Vec<String>,
    /// Abbreviations, the first is canonical (e.g. "m")
    abbreviations: Vec<String>,
    /// Size relative to the registry's arbitrary reference basis
    scale: f64,
    /// Whether prefix rules are expanded for this unit
    prefixable: bool,
    plural: Option<String>,
    dimensions: DimensionVector,
}

impl UnitDefinition {
    /// Create a prefixable, dimensionless unit
    pub fn new(name: &str, scale: f64) -> Self {
        UnitDefinition {
            names: vec![name.to_string()],
            abbreviations: Vec::new(),
            scale,
            prefixable: true,
            plural: None,
            dimensions: DimensionVector::new(),
        }
    }

    /// Builder: add an alternative name
    pub fn with_name(mut self, name: &str) -> Self {
        self.names.push(name.to_string());
        self
    }

    /// Builder: add an abbreviation (the first one added is canonical)
    pub fn with_abbreviation(mut self, abbreviation: &str) -> Self {
        self.abbreviations.push(abbreviation.to_string());
        self
    }

    pub fn with_plural(mut self, plural: &str) -> Self {
        self.plural = Some(plural.to_string());
        self
    }

    /// Builder: add `power` to a dimension
    pub fn with_dimension(mut self, dimension: &str, power: impl Into<Exponent>) -> Self {
        self.dimensions.add(dimension, &power.into());
        self
    }

    pub fn with_dimensions(mut self, dimensions: DimensionVector) -> Self {
        self.dimensions = dimensions;
        self
    }

    pub fn prefixable(mut self, prefixable: bool) -> Self {
        self.prefixable = prefixable;
        self
    }

    /// Build from a JSON descriptor such as
    /// `{"names": "testunit", "abbr": "TU", "rel": 1e7, "length": 1, "prefixable": false}`.
    ///
    /// Dimensions may be given under `"dimensions"` or as extra numeric keys.
    pub fn from_descriptor(descriptor: &serde_json::Value) -> Result<Self, UnitError> {
        let identifier = descriptor_identifier(descriptor);
        if !descriptor.is_object() {
            return Err(UnitError::invalid_unit(identifier, "descriptor must be an object"));
        }

        let raw: RawDescriptor = serde_json::from_value(descriptor.clone())
            .map_err(|e| UnitError::invalid_unit(&identifier, e.to_string()))?;

        let mut dimensions = DimensionVector::new();
        match raw.dimensions {
            None => {}
            Some(serde_json::Value::Object(map)) => {
                for (dimension, power) in &map {
                    dimensions.add(dimension.as_str(), &descriptor_power(&identifier, dimension, power)?);
                }
            }
            Some(_) => {
                return Err(UnitError::invalid_unit(identifier, "dimensions must be a mapping"));
            }
        }
        for (dimension, power) in &raw.extra {
            dimensions.add(dimension.as_str(), &descriptor_power(&identifier, dimension, power)?);
        }

        Ok(UnitDefinition {
            names: raw.names.into_vec(),
            abbreviations: raw.abbr.map(OneOrMany::into_vec).unwrap_or_default(),
            scale: raw.rel.unwrap_or(1.0),
            prefixable: raw.prefixable,
            plural: raw.plural,
            dimensions,
        })
    }

    // ========== Accessors ==========

    /// Canonical name
    pub fn name(&self) -> &str {
        self.names.first().map(String::as_str).unwrap_or("")
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    /// Canonical abbreviation, if any
    pub fn abbreviation(&self) -> Option<&str> {
        self.abbreviations.first().map(String::as_str)
    }

    pub fn abbreviations(&self) -> &[String] {
        &self.abbreviations
    }

    pub fn plural(&self) -> Option<&str> {
        self.plural.as_deref()
    }

    /// Symbol used when rendering: canonical abbreviation, else canonical name
    pub fn symbol(&self) -> &str {
        self.abbreviation().unwrap_or_else(|| self.name())
    }

    pub fn scale(&self) -> f64 {
        self.scale
    }

    pub fn is_prefixable(&self) -> bool {
        self.prefixable
    }

    pub fn dimensions(&self) -> &DimensionVector {
        &self.dimensions
    }

    /// True when the dimension vector is exactly `{dimension: 1}`
    pub fn is_basis_for(&self, dimension: &str) -> bool {
        self.dimensions.is_exactly(dimension)
    }

    /// Every string this unit is indexed under
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.names
            .iter()
            .chain(self.abbreviations.iter())
            .chain(self.plural.iter())
            .map(String::as_str)
    }

    /// Check that the unit can be registered and reached by the parser
    pub fn validate(&self) -> Result<(), UnitError> {
        if self.names.is_empty() {
            return Err(UnitError::invalid_unit("", "unit has no names"));
        }
        for key in self.keys() {
            if let Some(reason) = unreachable_key(key) {
                let identifier = if key.is_empty() { self.name() } else { key };
                return Err(UnitError::invalid_unit(identifier, reason));
            }
        }
        if !self.scale.is_finite() || self.scale <= 0.0 {
            return Err(UnitError::invalid_unit(
                self.name(),
                format!("scale must be a positive number, got {}", self.scale),
            ));
        }
        Ok(())
    }

    /// Derive the non-prefixable variant produced by a prefix rule
    pub fn prefixed(&self, rule: &PrefixRule) -> UnitDefinition {
        UnitDefinition {
            names: self.names.iter().map(|n| format!("{}{}", rule.name, n)).collect(),
            abbreviations: self
                .abbreviations
                .iter()
                .map(|a| format!("{}{}", rule.abbreviation, a))
                .collect(),
            scale: self.scale * rule.multiplier,
            prefixable: false,
            plural: self.plural.as_ref().map(|p| format!("{}{}", rule.name, p)),
            dimensions: self.dimensions.clone(),
        }
    }
}

impl fmt::Display for UnitDefinition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

// ========== Descriptor parsing ==========

#[derive(Deserialize)]
#[serde(untagged)]
enum OneOrMany {
    One(String),
    Many(Vec<String>),
}

impl OneOrMany {
    fn into_vec(self) -> Vec<String> {
        match self {
            OneOrMany::One(s) => vec![s],
            OneOrMany::Many(v) => v,
        }
    }
}

fn default_prefixable() -> bool {
    true
}

#[derive(Deserialize)]
struct RawDescriptor {
    names: OneOrMany,
    #[serde(default)]
    abbr: Option<OneOrMany>,
    #[serde(default, alias = "scale")]
    rel: Option<f64>,
    #[serde(default = "default_prefixable")]
    prefixable: bool,
    #[serde(default)]
    plural: Option<String>,
    #[serde(default)]
    dimensions: Option<serde_json::Value>,
    #[serde(flatten)]
    extra: BTreeMap<String, serde_json::Value>,
}

fn descriptor_identifier(descriptor: &serde_json::Value) -> String {
    match descriptor.get("names") {
        Some(serde_json::Value::String(s)) => s.clone(),
        Some(serde_json::Value::Array(items)) => items
            .first()
            .and_then(|v| v.as_str())
            .unwrap_or("<descriptor>")
            .to_string(),
        _ => "<descriptor>".to_string(),
    }
}

fn descriptor_power(identifier: &str, dimension: &str, power: &serde_json::Value) -> Result<Exponent, UnitError> {
    let exponent = match power {
        serde_json::Value::Number(n) => match n.as_i64() {
            Some(i) => Some(Exponent::from_integer(i)),
            None => n.as_f64().and_then(Exponent::from_f64),
        },
        _ => None,
    };
    exponent.ok_or_else(|| {
        UnitError::invalid_unit(identifier, format!("power of dimension '{}' must be a number", dimension))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn metre() -> UnitDefinition {
        UnitDefinition::new("metre", 1.0)
            .with_name("meter")
            .with_abbreviation("m")
            .with_dimension("length", 1)
    }

    #[test]
    fn test_accessors() {
        let m = metre();
        assert_eq!(m.name(), "metre");
        assert_eq!(m.symbol(), "m");
        assert!(m.is_prefixable());
        assert!(m.is_basis_for("length"));
        assert_eq!(m.keys().collect::<Vec<_>>(), vec!["metre", "meter", "m"]);
    }

    #[test]
    fn test_symbol_falls_back_to_name() {
        let constant = UnitDefinition::new("constant", 1.0);
        assert_eq!(constant.symbol(), "constant");
        assert!(constant.dimensions().is_dimensionless());
    }

    #[test]
    fn test_prefixed() {
        let foot = UnitDefinition::new("foot", 0.3048)
            .with_abbreviation("ft")
            .with_plural("feet")
            .with_dimension("length", 1);
        let kilo = PrefixRule::new("kilo", "k", 1e3);
        let kft = foot.prefixed(&kilo);

        assert_eq!(kft.name(), "kilofoot");
        assert_eq!(kft.symbol(), "kft");
        assert_eq!(kft.plural(), Some("kilofeet"));
        assert!((kft.scale() - 304.8).abs() < 1e-9);
        assert!(!kft.is_prefixable());
        assert_eq!(kft.dimensions(), foot.dimensions());
    }

    #[test]
    fn test_whitespace_names_rejected() {
        match UnitDefinition::new("astronomical unit", 1.5e11).validate() {
            Err(UnitError::InvalidUnit { identifier, reason }) => {
                assert_eq!(identifier, "astronomical unit");
                assert!(reason.contains("whitespace"));
            }
            other => panic!("expected InvalidUnit, got {:?}", other),
        }
    }

    #[test]
    fn test_validate() {
        assert!(metre().validate().is_ok());
        assert!(UnitDefinition::new("m2", 1.0).validate().is_err());
        assert!(UnitDefinition::new("a*b", 1.0).validate().is_err());
        assert!(UnitDefinition::new("", 1.0).validate().is_err());
        assert!(UnitDefinition::new("zero", 0.0).validate().is_err());
        assert!(UnitDefinition::new("nan", f64::NAN).validate().is_err());
        assert!(UnitDefinition::new("ok", 1.0).with_abbreviation("").validate().is_err());
        assert!(UnitDefinition::new("light year", 1.0).validate().is_err());
        assert!(UnitDefinition::new("ok", 1.0).with_plural("o\tks").validate().is_err());
    }

    #[test]
    fn test_descriptor_with_flat_dimensions() {
        let unit = UnitDefinition::from_descriptor(&json!({
            "names": "testunit",
            "abbr": "TU",
            "rel": 1e7,
            "length": 1,
            "mass": 1,
            "prefixable": false
        }))
        .unwrap();

        assert_eq!(unit.name(), "testunit");
        assert_eq!(unit.symbol(), "TU");
        assert_eq!(unit.scale(), 1e7);
        assert!(!unit.is_prefixable());
        assert_eq!(unit.dimensions().get("mass"), Some(&Exponent::ONE));
        assert_eq!(unit.dimensions().len(), 2);
    }

    #[test]
    fn test_descriptor_with_dimension_map() {
        let unit = UnitDefinition::from_descriptor(&json!({
            "names": ["litre", "liter"],
            "abbr": "L",
            "scale": 0.001,
            "dimensions": {"length": 3}
        }))
        .unwrap();

        assert_eq!(unit.names(), &["litre".to_string(), "liter".to_string()]);
        assert!(unit.is_prefixable());
        assert_eq!(unit.dimensions().get("length"), Some(&Exponent::from(3)));
    }

    #[test]
    fn test_descriptor_fractional_power() {
        let unit = UnitDefinition::from_descriptor(&json!({
            "names": "rootmetre",
            "dimensions": {"length": 0.5}
        }))
        .unwrap();
        assert_eq!(unit.dimensions().get("length"), Some(&Exponent::new(1, 2).unwrap()));
    }

    #[test]
    fn test_malformed_descriptors() {
        let not_mapping = UnitDefinition::from_descriptor(&json!({
            "names": "bad",
            "dimensions": [1, 2]
        }));
        match not_mapping {
            Err(UnitError::InvalidUnit { identifier, reason }) => {
                assert_eq!(identifier, "bad");
                assert!(reason.contains("mapping"));
            }
            other => panic!("expected InvalidUnit, got {:?}", other),
        }

        assert!(UnitDefinition::from_descriptor(&json!("metre")).is_err());
        assert!(UnitDefinition::from_descriptor(&json!({"abbr": "m"})).is_err());
        assert!(UnitDefinition::from_descriptor(&json!({"names": "x", "length": "one"})).is_err());
    }
}
