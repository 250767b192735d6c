//! Unit registry: catalog of definitions, basis table and parse cache
//!
//! A `UnitRegistry` is a cheap, reference-counted handle. Every
//! `CompositeUnit` keeps one so it can parse string operands and resolve
//! basis units later. The registry is single-threaded; callers that share
//! it across threads must serialize access themselves.

use std::cell::RefCell;
use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::rc::Rc;
use metron_core::UnitError;
use crate::composite::Shared;
use crate::diagnostic::{self, Diagnostic, DiagnosticSink};
use crate::{CompositeUnit, PrefixRule, UnitDefinition, UnitId, UnitInput};

/// Dimension name -> basis unit, `None` while unresolved
pub type BasisTable = BTreeMap<String, Option<Rc<UnitDefinition>>>;

/// Shared handle to a catalog of units
#[derive(Clone, Default)]
pub struct UnitRegistry {
    inner: Rc<RefCell<Catalog>>,
}

#[derive(Default)]
struct Catalog {
    /// Every name, abbreviation and plural -> definition (last write wins)
    units: HashMap<String, Rc<UnitDefinition>>,
    bases: BasisTable,
    prefixes: Vec<PrefixRule>,
    /// Exact expression string -> parsed composite
    cache: HashMap<String, Rc<Shared>>,
    sink: Option<DiagnosticSink>,
}

impl UnitRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    // ========== Configuration ==========

    /// Builder: add a prefix rule, applied to prefixable units registered afterwards
    pub fn with_prefix(self, rule: impl Into<PrefixRule>) -> Self {
        self.inner.borrow_mut().prefixes.push(rule.into());
        self
    }

    pub fn with_prefixes<I, R>(self, rules: I) -> Self
    where
        I: IntoIterator<Item = R>,
        R: Into<PrefixRule>,
    {
        self.inner
            .borrow_mut()
            .prefixes
            .extend(rules.into_iter().map(Into::into));
        self
    }

    /// Builder: receive unresolved/rejected basis notifications
    pub fn with_diagnostic_sink<F>(self, sink: F) -> Self
    where
        F: Fn(&Diagnostic) + 'static,
    {
        self.inner.borrow_mut().sink = Some(Rc::new(sink));
        self
    }

    pub fn prefixes(&self) -> Vec<PrefixRule> {
        self.inner.borrow().prefixes.clone()
    }

    // ========== Registration ==========

    /// Register a unit (and its prefixed variants), then report any
    /// dimension still lacking a basis unit
    pub fn register(&self, unit: UnitDefinition) -> Result<&Self, UnitError> {
        self.add(unit, true)
    }

    /// Register without the unresolved-basis scan, for bulk loading
    pub fn register_deferred(&self, unit: UnitDefinition) -> Result<&Self, UnitError> {
        self.add(unit, false)
    }

    /// Register a unit described by a JSON object
    pub fn register_descriptor(&self, descriptor: &serde_json::Value) -> Result<&Self, UnitError> {
        self.register(UnitDefinition::from_descriptor(descriptor)?)
    }

    fn add(&self, unit: UnitDefinition, validate: bool) -> Result<&Self, UnitError> {
        unit.validate()?;
        // Every prefixed variant must be valid before anything is indexed
        if unit.is_prefixable() {
            for rule in &self.inner.borrow().prefixes {
                rule.validate()?;
                unit.prefixed(rule).validate()?;
            }
        }
        let diagnostics = self.inner.borrow_mut().insert(unit, validate);
        self.emit(&diagnostics);
        Ok(self)
    }

    fn emit(&self, diagnostics: &[Diagnostic]) {
        if diagnostics.is_empty() {
            return;
        }
        // Release the borrow before calling out: the sink may query us
        let sink = self.inner.borrow().sink.clone();
        diagnostic::emit(sink.as_ref(), diagnostics);
    }

    // ========== Lookup ==========

    /// Resolve a unit object (returned unchanged) or a name/abbreviation
    pub fn resolve(&self, identifier: impl Into<UnitId>) -> Result<Rc<UnitDefinition>, UnitError> {
        match identifier.into() {
            UnitId::Unit(unit) => Ok(unit),
            UnitId::Name(name) => self
                .inner
                .borrow()
                .units
                .get(&name)
                .cloned()
                .ok_or_else(|| UnitError::unknown_unit(name)),
        }
    }

    pub fn has(&self, identifier: &str) -> bool {
        self.inner.borrow().units.contains_key(identifier)
    }

    /// All indexed names, abbreviations and plurals, sorted
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.inner.borrow().units.keys().cloned().collect();
        names.sort();
        names
    }

    /// All dimensions declared so far, sorted
    pub fn dimensions(&self) -> Vec<String> {
        self.inner.borrow().bases.keys().cloned().collect()
    }

    // ========== Basis ==========

    /// Current dimension -> basis mapping
    pub fn basis(&self) -> BasisTable {
        self.inner.borrow().bases.clone()
    }

    pub fn basis_for(&self, dimension: &str) -> Result<Rc<UnitDefinition>, UnitError> {
        self.inner
            .borrow()
            .bases
            .get(dimension)
            .cloned()
            .flatten()
            .ok_or_else(|| UnitError::missing_basis(dimension))
    }

    /// Install basis units. Every unit is resolved first, so an unknown
    /// name fails the whole call. A unit that is not exactly
    /// `{dimension: 1}` is rejected for that dimension only, through the
    /// diagnostic sink, and the previous basis is kept.
    pub fn set_basis<I, D, U>(&self, assignments: I) -> Result<&Self, UnitError>
    where
        I: IntoIterator<Item = (D, U)>,
        D: Into<String>,
        U: Into<UnitId>,
    {
        let mut resolved: Vec<(String, Rc<UnitDefinition>)> = Vec::new();
        for (dimension, unit) in assignments {
            resolved.push((dimension.into(), self.resolve(unit)?));
        }

        let mut diagnostics = Vec::new();
        {
            let mut catalog = self.inner.borrow_mut();
            for (dimension, unit) in resolved {
                if unit.is_basis_for(&dimension) {
                    tracing::debug!(dimension = %dimension, unit = unit.name(), "basis assigned");
                    catalog.bases.insert(dimension, Some(unit));
                } else {
                    diagnostics.push(Diagnostic::RejectedBasis {
                        dimension,
                        unit: unit.name().to_string(),
                    });
                }
            }
        }
        self.emit(&diagnostics);
        Ok(self)
    }

    // ========== Composite units ==========

    /// Build a composite unit. Expression strings are cached under the exact
    /// string given; semantically equal spellings get separate entries.
    pub fn materialize(&self, input: impl Into<UnitInput>) -> Result<CompositeUnit, UnitError> {
        match input.into() {
            UnitInput::Expression(expression) => {
                let cached = self.inner.borrow().cache.get(&expression).cloned();
                if let Some(shared) = cached {
                    return Ok(CompositeUnit::from_shared(self.clone(), shared));
                }
                tracing::debug!(expression = %expression, "unit cache miss");
                let composite = CompositeUnit::parse(self, &expression)?;
                self.inner
                    .borrow_mut()
                    .cache
                    .insert(expression, composite.shared());
                Ok(composite)
            }
            UnitInput::Powers(powers) => CompositeUnit::from_powers(self, powers),
            UnitInput::Unit(unit) => Ok(CompositeUnit::from_unit(self, unit)),
            UnitInput::Composite(composite) => Ok(composite.copy_into(self)),
        }
    }

    /// Number of cached expression strings
    pub fn cached_len(&self) -> usize {
        self.inner.borrow().cache.len()
    }

    /// True when both handles point at the same catalog
    pub fn ptr_eq(&self, other: &UnitRegistry) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }
}

impl Catalog {
    fn insert(&mut self, unit: UnitDefinition, validate: bool) -> Vec<Diagnostic> {
        let unit = Rc::new(unit);

        for key in unit.keys() {
            self.units.insert(key.to_string(), Rc::clone(&unit));
        }

        for dimension in unit.dimensions().names() {
            let basis = self.bases.entry(dimension.to_string()).or_insert(None);
            if basis.is_none() && unit.is_basis_for(dimension) {
                *basis = Some(Rc::clone(&unit));
            }
        }

        let mut diagnostics: Vec<Diagnostic> = Vec::new();
        if validate {
            diagnostics.extend(
                self.bases
                    .iter()
                    .filter(|(_, basis)| basis.is_none())
                    .map(|(dimension, _)| Diagnostic::UnresolvedBasis {
                        dimension: dimension.clone(),
                    }),
            );
        }

        let variants: Vec<UnitDefinition> = if unit.is_prefixable() {
            self.prefixes.iter().map(|rule| unit.prefixed(rule)).collect()
        } else {
            Vec::new()
        };
        tracing::debug!(unit = unit.name(), prefixed = variants.len(), "registered unit");
        for variant in variants {
            diagnostics.extend(self.insert(variant, false));
        }

        diagnostics
    }
}

impl fmt::Debug for UnitRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let catalog = self.inner.borrow();
        f.debug_struct("UnitRegistry")
            .field("units", &catalog.units.len())
            .field("dimensions", &catalog.bases.keys().collect::<Vec<_>>())
            .field("prefixes", &catalog.prefixes.len())
            .field("cached", &catalog.cache.len())
            .finish()
    }
}
