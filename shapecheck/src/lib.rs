//! Shapecheck
//!
//! Checks that the type a unit declares it returns, through an annotation such as
//! `[ResponseType(typeof(Car))]`, agrees with the types its exit points actually produce.

#![allow(clippy::uninlined_format_args)]
//!
//! ## Architecture
//!
//! Data flows one way, from the program model to the report:
//!
//! - **Compatibility Checker**: nominal, recursive `is_compatible(expected, actual)` over a
//!   [`TypeModel`], including the array to sequence-contract bridge
//! - **Consistency Aggregator**: per-unit collector of exit observations folded into a
//!   [`Verdict`] with the faulting exit points in discovery order
//! - **Remediation Generator**: maps a verdict to "replace the declared type" or
//!   "remove the annotation"
//! - **Analyzer**: selects units through a [`UnitFilter`], runs the pipeline per unit and
//!   builds a `miette` diagnostic for every inconsistent one
//!
//! The program model itself (types, units, exit points) lives in `shapecheck-model`.

pub mod aggregator;
pub mod analyzer;
pub mod compatibility;
pub mod config;
pub mod diagnostics;
pub mod error;
pub mod remediation;
pub mod selection;

// Re-export public API
pub use aggregator::{ConsistencyAggregator, ExitObservation, Verdict, VerdictStatus};
pub use analyzer::{Analyzer, UnitReport};
pub use compatibility::{is_compatible, CompatibilityChecker};
pub use config::{AnalyzerConfig, PayloadShape, Rule, Severity, DEFAULT_RULE_ID};
pub use diagnostics::{faulting_span, InconsistentAnnotation};
pub use error::{ConfigError, ShapecheckError};
pub use remediation::{
    Remediation, RemediationGenerator, RepresentativePolicy, API_CHANGE_WARNING, FIX_TITLE,
};
pub use selection::{AsyncResultFilter, Selection, UnitFilter};

pub use shapecheck_model::{TypeModel, TypeRef};

/// Fold the observed types of a unit's exit points, given in discovery order, into a verdict
pub fn analyze_unit<M, L, I>(model: &M, expected: TypeRef, exits: I) -> Verdict<L>
where
    M: TypeModel + ?Sized,
    L: Clone,
    I: IntoIterator<Item = (L, Option<TypeRef>)>,
{
    let mut aggregator = ConsistencyAggregator::new(model, expected);
    for (location, observed) in exits {
        aggregator.observe(location, observed);
    }
    aggregator.finalize()
}

/// Corrective action for a verdict, with the default warning text
pub fn suggest_remediation<L>(
    verdict: &Verdict<L>,
    expected: TypeRef,
    representative: Option<TypeRef>,
) -> Remediation {
    remediation::suggest(verdict, expected, representative)
}

#[cfg(test)]
mod tests;
