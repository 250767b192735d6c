//! Tagged inputs accepted by the registry

use std::collections::{BTreeMap, HashMap};
use std::rc::Rc;
use metron_core::Exponent;
use crate::{CompositeUnit, UnitDefinition};

/// Reference to a unit: a name/abbreviation to look up, or the unit itself
#[derive(Debug, Clone)]
pub enum UnitId {
    Name(String),
    Unit(Rc<UnitDefinition>),
}

impl From<&str> for UnitId {
    fn from(name: &str) -> Self {
        UnitId::Name(name.to_string())
    }
}

impl From<String> for UnitId {
    fn from(name: String) -> Self {
        UnitId::Name(name)
    }
}

impl From<&String> for UnitId {
    fn from(name: &String) -> Self {
        UnitId::Name(name.clone())
    }
}

impl From<Rc<UnitDefinition>> for UnitId {
    fn from(unit: Rc<UnitDefinition>) -> Self {
        UnitId::Unit(unit)
    }
}

impl From<&Rc<UnitDefinition>> for UnitId {
    fn from(unit: &Rc<UnitDefinition>) -> Self {
        UnitId::Unit(Rc::clone(unit))
    }
}

/// Everything a `CompositeUnit` can be built from
#[derive(Debug, Clone)]
pub enum UnitInput {
    /// Expression string, e.g. `"kg*m*s^-2"` (cached by the registry)
    Expression(String),
    /// Unit identifiers with their powers
    Powers(Vec<(UnitId, Exponent)>),
    /// A single unit at power 1
    Unit(Rc<UnitDefinition>),
    /// Copy of an existing composite
    Composite(CompositeUnit),
}

impl From<&str> for UnitInput {
    fn from(expression: &str) -> Self {
        UnitInput::Expression(expression.to_string())
    }
}

impl From<String> for UnitInput {
    fn from(expression: String) -> Self {
        UnitInput::Expression(expression)
    }
}

impl From<&String> for UnitInput {
    fn from(expression: &String) -> Self {
        UnitInput::Expression(expression.clone())
    }
}

impl From<Rc<UnitDefinition>> for UnitInput {
    fn from(unit: Rc<UnitDefinition>) -> Self {
        UnitInput::Unit(unit)
    }
}

impl From<&Rc<UnitDefinition>> for UnitInput {
    fn from(unit: &Rc<UnitDefinition>) -> Self {
        UnitInput::Unit(Rc::clone(unit))
    }
}

impl From<CompositeUnit> for UnitInput {
    fn from(composite: CompositeUnit) -> Self {
        UnitInput::Composite(composite)
    }
}

impl From<&CompositeUnit> for UnitInput {
    fn from(composite: &CompositeUnit) -> Self {
        UnitInput::Composite(composite.clone())
    }
}

fn collect_powers<K, V, I>(powers: I) -> UnitInput
where
    K: Into<UnitId>,
    V: Into<Exponent>,
    I: IntoIterator<Item = (K, V)>,
{
    UnitInput::Powers(powers.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
}

impl<K: Into<UnitId>, V: Into<Exponent>> From<Vec<(K, V)>> for UnitInput {
    fn from(powers: Vec<(K, V)>) -> Self {
        collect_powers(powers)
    }
}

impl<K: Into<UnitId>, V: Into<Exponent>, const N: usize> From<[(K, V); N]> for UnitInput {
    fn from(powers: [(K, V); N]) -> Self {
        collect_powers(powers)
    }
}

impl<K: Into<UnitId>, V: Into<Exponent>> From<HashMap<K, V>> for UnitInput {
    fn from(powers: HashMap<K, V>) -> Self {
        collect_powers(powers)
    }
}

impl<K: Into<UnitId>, V: Into<Exponent>> From<BTreeMap<K, V>> for UnitInput {
    fn from(powers: BTreeMap<K, V>) -> Self {
        collect_powers(powers)
    }
}
