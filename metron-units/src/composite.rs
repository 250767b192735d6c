//! Composite units - products of unit powers such as `kg*m/s^2`
//!
//! A `CompositeUnit` is an immutable value: every algebraic operation
//! returns a new instance. Clones share the same underlying instance
//! (and its conversion memo), which is what the registry cache hands out.

use std::cell::RefCell;
use std::cmp::Ordering;
use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::hash::{Hash, Hasher};
use std::ops::{Div, Mul};
use std::rc::Rc;
use serde::{Serialize, Serializer};
use metron_core::{Exponent, UnitError};
use crate::parse::{self, render_float_power, render_power, DIMENSIONLESS};
use crate::{DimensionVector, UnitDefinition, UnitId, UnitRegistry};

/// Map key giving units a total order: canonical name, symbol, then identity
#[derive(Clone)]
struct UnitKey(Rc<UnitDefinition>);

impl PartialEq for UnitKey {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}

impl Eq for UnitKey {}

impl Hash for UnitKey {
    fn hash<H: Hasher>(&self, state: &mut H) {
        Rc::as_ptr(&self.0).hash(state);
    }
}

impl PartialOrd for UnitKey {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for UnitKey {
    fn cmp(&self, other: &Self) -> Ordering {
        self.0
            .name()
            .cmp(other.0.name())
            .then_with(|| self.0.symbol().cmp(other.0.symbol()))
            .then_with(|| (Rc::as_ptr(&self.0) as usize).cmp(&(Rc::as_ptr(&other.0) as usize)))
    }
}

type Powers = BTreeMap<UnitKey, Exponent>;

/// Add `power` to a unit's entry, pruning it when it nets to zero
fn accumulate(powers: &mut Powers, unit: &Rc<UnitDefinition>, power: &Exponent) {
    let key = UnitKey(Rc::clone(unit));
    let total = match powers.get(&key) {
        Some(existing) => existing + power,
        None => power.clone(),
    };
    if total.is_zero() {
        powers.remove(&key);
    } else {
        powers.insert(key, total);
    }
}

/// State shared by clones of one composite instance
pub(crate) struct Shared {
    powers: Powers,
    /// Conversion factors keyed by the target's unit objects and powers.
    /// Keys hold their units alive, so identities are never reused.
    scale_memo: RefCell<HashMap<Powers, f64>>,
}

impl Shared {
    fn new(powers: Powers) -> Self {
        Shared {
            powers,
            scale_memo: RefCell::new(HashMap::new()),
        }
    }
}

/// Product of unit powers with exact rational exponents
#[derive(Clone)]
pub struct CompositeUnit {
    registry: UnitRegistry,
    shared: Rc<Shared>,
}

impl CompositeUnit {
    // ========== Construction ==========

    fn from_map(registry: &UnitRegistry, powers: Powers) -> Self {
        CompositeUnit {
            registry: registry.clone(),
            shared: Rc::new(Shared::new(powers)),
        }
    }

    pub(crate) fn from_shared(registry: UnitRegistry, shared: Rc<Shared>) -> Self {
        CompositeUnit { registry, shared }
    }

    pub(crate) fn shared(&self) -> Rc<Shared> {
        Rc::clone(&self.shared)
    }

    /// The dimensionless unit ("units")
    pub fn dimensionless(registry: &UnitRegistry) -> Self {
        Self::from_map(registry, Powers::new())
    }

    /// A single unit at power 1
    pub fn from_unit(registry: &UnitRegistry, unit: Rc<UnitDefinition>) -> Self {
        let mut powers = Powers::new();
        powers.insert(UnitKey(unit), Exponent::ONE);
        Self::from_map(registry, powers)
    }

    /// Units (by name or object) with their powers; repeated units add up
    pub fn from_powers<I, K, V>(registry: &UnitRegistry, powers: I) -> Result<Self, UnitError>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<UnitId>,
        V: Into<Exponent>,
    {
        let mut map = Powers::new();
        for (identifier, power) in powers {
            let unit = registry.resolve(identifier)?;
            accumulate(&mut map, &unit, &power.into());
        }
        Ok(Self::from_map(registry, map))
    }

    /// Parse an expression without consulting the registry cache
    pub fn parse(registry: &UnitRegistry, expression: &str) -> Result<Self, UnitError> {
        let mut map = Powers::new();
        for term in parse::tokenize(expression)? {
            let unit = registry.resolve(term.name.as_str()).map_err(|_| {
                UnitError::invalid_unit(&term.name, format!("unknown unit in '{}'", expression))
            })?;
            accumulate(&mut map, &unit, &term.power);
        }
        Ok(Self::from_map(registry, map))
    }

    /// Fresh instance with the same powers, bound to `registry`
    pub fn copy_into(&self, registry: &UnitRegistry) -> Self {
        Self::from_map(registry, self.shared.powers.clone())
    }

    // ========== Accessors ==========

    pub fn registry(&self) -> &UnitRegistry {
        &self.registry
    }

    /// Constituent units with their powers, in rendering order
    pub fn units(&self) -> impl Iterator<Item = (&Rc<UnitDefinition>, &Exponent)> {
        self.shared.powers.iter().map(|(key, power)| (&key.0, power))
    }

    /// Power of a specific unit object, `None` if it does not appear
    pub fn power_of(&self, unit: &Rc<UnitDefinition>) -> Option<&Exponent> {
        self.shared.powers.get(&UnitKey(Rc::clone(unit)))
    }

    /// True when no unit appears at all
    pub fn is_empty(&self) -> bool {
        self.shared.powers.is_empty()
    }

    /// True when the dimensions cancel out (e.g. `km/m`)
    pub fn is_dimensionless(&self) -> bool {
        self.dimensions().is_dimensionless()
    }

    /// True when both values are the same cached instance
    pub fn same_instance(a: &CompositeUnit, b: &CompositeUnit) -> bool {
        Rc::ptr_eq(&a.shared, &b.shared)
    }

    // ========== Algebra ==========

    pub fn multiply(&self, other: &CompositeUnit) -> CompositeUnit {
        let mut powers = self.shared.powers.clone();
        for (key, power) in &other.shared.powers {
            accumulate(&mut powers, &key.0, power);
        }
        Self::from_map(&self.registry, powers)
    }

    pub fn divide(&self, other: &CompositeUnit) -> CompositeUnit {
        let mut powers = self.shared.powers.clone();
        for (key, power) in &other.shared.powers {
            accumulate(&mut powers, &key.0, &-power);
        }
        Self::from_map(&self.registry, powers)
    }

    pub fn pow(&self, exponent: impl Into<Exponent>) -> CompositeUnit {
        let exponent = exponent.into();
        let powers = if exponent.is_zero() {
            Powers::new()
        } else {
            self.shared
                .powers
                .iter()
                .map(|(key, power)| (key.clone(), power * &exponent))
                .collect()
        };
        Self::from_map(&self.registry, powers)
    }

    pub fn inverse(&self) -> CompositeUnit {
        self.pow(-1)
    }

    /// Multiply in a single unit at the given power
    pub fn with_unit(&self, unit: &Rc<UnitDefinition>, power: impl Into<Exponent>) -> CompositeUnit {
        let mut powers = self.shared.powers.clone();
        accumulate(&mut powers, unit, &power.into());
        Self::from_map(&self.registry, powers)
    }

    // ========== Dimensions and scale ==========

    /// Dimension vector, recomputed from the current powers on every call
    pub fn dimensions(&self) -> DimensionVector {
        let mut dimensions = DimensionVector::new();
        for (key, power) in &self.shared.powers {
            dimensions.add_scaled(key.0.dimensions(), power);
        }
        dimensions
    }

    /// Size relative to the registry's reference basis: product of `scale^power`
    pub fn relative_scale(&self) -> f64 {
        self.shared
            .powers
            .iter()
            .map(|(key, power)| power.apply_to(key.0.scale()))
            .product()
    }

    /// Factor converting a magnitude in these units into `other`'s units.
    ///
    /// String targets are resolved through the registry. Fails with
    /// `UnitConversion` unless both dimension vectors are identical.
    pub fn scale_to(&self, other: impl Into<crate::UnitInput>) -> Result<f64, UnitError> {
        let other = self.registry.materialize(other)?;

        let mine = self.dimensions();
        let theirs = other.dimensions();
        if !mine.matches(&theirs) {
            return Err(UnitError::UnitConversion {
                from: self.to_string(),
                from_dimensions: mine.to_string(),
                to: other.to_string(),
                to_dimensions: theirs.to_string(),
            });
        }

        if let Some(factor) = self.shared.scale_memo.borrow().get(&other.shared.powers) {
            return Ok(*factor);
        }

        let factor = self.relative_scale() / other.relative_scale();
        self.shared
            .scale_memo
            .borrow_mut()
            .insert(other.shared.powers.clone(), factor);
        Ok(factor)
    }

    /// Express these units in the registry's basis units, e.g. `N` -> `kg*m/s^2`
    pub fn to_basis(&self) -> Result<CompositeUnit, UnitError> {
        let dimensions = self.dimensions();
        if dimensions.is_dimensionless() {
            return self.registry.materialize(DIMENSIONLESS);
        }

        let mut expression = String::new();
        for (dimension, power) in dimensions.iter() {
            let basis = self.registry.basis_for(dimension)?;
            expression.push_str(&format!("*{}^{}", basis.symbol(), render_float_power(power)));
        }
        self.registry.materialize(&expression[1..])
    }
}

// ========== Trait Implementations ==========

impl fmt::Display for CompositeUnit {
    /// Positive powers joined by `*`, then each negative power as `/unit^|p|`
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.shared.powers.is_empty() {
            return write!(f, "{}", DIMENSIONLESS);
        }

        let term = |unit: &UnitDefinition, power: &Exponent| {
            if power.is_one() {
                unit.symbol().to_string()
            } else {
                format!("{}^{}", unit.symbol(), render_power(power))
            }
        };

        let numerator: Vec<String> = self
            .units()
            .filter(|(_, power)| power.is_positive())
            .map(|(unit, power)| term(&**unit, power))
            .collect();
        write!(f, "{}", numerator.join("*"))?;

        for (unit, power) in self.units().filter(|(_, power)| power.is_negative()) {
            write!(f, "/{}", term(&**unit, &power.abs()))?;
        }
        Ok(())
    }
}

impl fmt::Debug for CompositeUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "CompositeUnit({})", self)
    }
}

/// Equality is by canonical rendering, not by unit identity
impl PartialEq for CompositeUnit {
    fn eq(&self, other: &Self) -> bool {
        self.to_string() == other.to_string()
    }
}

impl Eq for CompositeUnit {}

impl Serialize for CompositeUnit {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl Mul<&CompositeUnit> for &CompositeUnit {
    type Output = CompositeUnit;

    fn mul(self, rhs: &CompositeUnit) -> CompositeUnit {
        self.multiply(rhs)
    }
}

impl Mul for CompositeUnit {
    type Output = CompositeUnit;

    fn mul(self, rhs: CompositeUnit) -> CompositeUnit {
        self.multiply(&rhs)
    }
}

impl Div<&CompositeUnit> for &CompositeUnit {
    type Output = CompositeUnit;

    fn div(self, rhs: &CompositeUnit) -> CompositeUnit {
        self.divide(rhs)
    }
}

impl Div for CompositeUnit {
    type Output = CompositeUnit;

    fn div(self, rhs: CompositeUnit) -> CompositeUnit {
        self.divide(&rhs)
    }
}
