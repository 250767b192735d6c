//! Metron Units - dimensional unit algebra
//!
//! A `UnitRegistry` holds unit definitions (with prefixed variants), the
//! basis unit chosen for each dimension, and a cache of parsed
//! expressions. A `CompositeUnit` is a product of unit powers built from
//! an expression like `"kg*m*s^-2"`, with exact rational exponents.
//!
//! ```ignore
//! let registry = UnitRegistry::new().with_prefix(("kilo", "k", 1e3));
//! registry.register(UnitDefinition::new("metre", 1.0).with_abbreviation("m").with_dimension("length", 1))?;
//! let km = registry.materialize("km")?;
//! assert_eq!(km.scale_to("m")?, 1000.0);
//! ```

mod composite;
mod definition;
mod diagnostic;
mod dimension;
mod input;
mod parse;
mod prefix;
mod registry;

pub use composite::CompositeUnit;
pub use definition::UnitDefinition;
pub use diagnostic::{Diagnostic, DiagnosticSink};
pub use dimension::DimensionVector;
pub use input::{UnitId, UnitInput};
pub use parse::{render_power, tokenize, Term, DIMENSIONLESS};
pub use prefix::PrefixRule;
pub use registry::{BasisTable, UnitRegistry};

pub use metron_core::{Exponent, UnitError};
