//! Non-fatal registry diagnostics
//!
//! Unresolved bases are expected while a catalog is still being populated,
//! so they are reported through an injectable sink instead of failing.

use std::fmt;
use std::rc::Rc;

/// A non-fatal notification raised while registering units or assigning bases
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Diagnostic {
    /// A known dimension still has no basis unit
    UnresolvedBasis { dimension: String },
    /// A basis assignment was refused because the unit is not exactly `{dimension: 1}`
    RejectedBasis { dimension: String, unit: String },
}

impl Diagnostic {
    pub fn dimension(&self) -> &str {
        match self {
            Diagnostic::UnresolvedBasis { dimension } => dimension,
            Diagnostic::RejectedBasis { dimension, .. } => dimension,
        }
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Diagnostic::UnresolvedBasis { dimension } => {
                write!(f, "dimension '{}' has no basis unit", dimension)
            }
            Diagnostic::RejectedBasis { dimension, unit } => {
                write!(f, "invalid unit ({}) for dimension ({})", unit, dimension)
            }
        }
    }
}

/// Callback receiving diagnostics
pub type DiagnosticSink = Rc<dyn Fn(&Diagnostic)>;

/// Log a diagnostic and forward it to the sink, if any
pub(crate) fn emit(sink: Option<&DiagnosticSink>, diagnostics: &[Diagnostic]) {
    for diagnostic in diagnostics {
        tracing::warn!(dimension = diagnostic.dimension(), "{}", diagnostic);
        if let Some(sink) = sink {
            sink(diagnostic);
        }
    }
}
