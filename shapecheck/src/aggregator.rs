//! Exit-point consistency aggregation
//!
//! One [`ConsistencyAggregator`] is created per analyzed unit. It records an
//! [`ExitObservation`] for every exit point the host discovers, in discovery order,
//! and folds them into a [`Verdict`] on request:
//!
//! - no observation carries a type: the unit is inconsistent and every exit point faults
//! - some typed observation is inconsistent: exactly those observations fault
//! - otherwise the unit is consistent
//!
//! Absent observations are not reported once any typed observation exists.

use crate::compatibility::CompatibilityChecker;
use crate::remediation::RepresentativePolicy;
use shapecheck_model::{TypeModel, TypeRef};
use tracing::debug;

/// What a single exit point produced, checked against the unit's expected type
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExitObservation<L> {
    location: L,
    observed: Option<TypeRef>,
    consistent: bool,
}

impl<L> ExitObservation<L> {
    pub fn location(&self) -> &L {
        &self.location
    }

    pub fn observed_type(&self) -> Option<TypeRef> {
        self.observed
    }

    pub fn has_type(&self) -> bool {
        self.observed.is_some()
    }

    pub fn is_consistent(&self) -> bool {
        self.consistent
    }
}

/// Overall outcome for a unit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VerdictStatus {
    Consistent,
    /// The declaration promises a type but no exit point produces a typed value
    NothingProduced,
    /// At least one exit point produces a type the declaration does not accept
    Mismatched,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Verdict<L> {
    status: VerdictStatus,
    faulting_locations: Vec<L>,
}

impl<L> Verdict<L> {
    pub fn consistent() -> Self {
        Self {
            status: VerdictStatus::Consistent,
            faulting_locations: Vec::new(),
        }
    }

    pub fn status(&self) -> VerdictStatus {
        self.status
    }

    pub fn is_consistent(&self) -> bool {
        self.status == VerdictStatus::Consistent
    }

    /// Faulting exit points in discovery order
    pub fn faulting_locations(&self) -> &[L] {
        &self.faulting_locations
    }

    /// Re-express the faulting locations, keeping status and order
    pub fn map_locations<U, F>(self, f: F) -> Verdict<U>
    where
        F: FnMut(L) -> U,
    {
        Verdict {
            status: self.status,
            faulting_locations: self.faulting_locations.into_iter().map(f).collect(),
        }
    }
}

/// Per-unit collector of exit observations
#[derive(Debug)]
pub struct ConsistencyAggregator<'m, M: TypeModel + ?Sized, L> {
    checker: CompatibilityChecker<'m, M>,
    expected: TypeRef,
    observations: Vec<ExitObservation<L>>,
}

impl<'m, M: TypeModel + ?Sized, L> ConsistencyAggregator<'m, M, L> {
    pub fn new(model: &'m M, expected: TypeRef) -> Self {
        Self {
            checker: CompatibilityChecker::new(model),
            expected,
            observations: Vec::new(),
        }
    }

    pub fn expected(&self) -> TypeRef {
        self.expected
    }

    /// Record one exit point. Locations are not deduplicated: observing the same
    /// location twice records it twice.
    pub fn observe(&mut self, location: L, observed: Option<TypeRef>) {
        let consistent = self.checker.exit_consistency(self.expected, observed);
        let model = self.checker.model();
        debug!(
            expected = %model.full_name(self.expected),
            observed = ?observed.map(|ty| model.full_name(ty)),
            consistent,
            "exit observed"
        );

        self.observations.push(ExitObservation {
            location,
            observed,
            consistent,
        });
    }

    pub fn observations(&self) -> &[ExitObservation<L>] {
        &self.observations
    }

    pub fn len(&self) -> usize {
        self.observations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.observations.is_empty()
    }

    /// Fold the observations into a verdict. Repeatable: without further
    /// observations every call yields the same verdict.
    pub fn finalize(&self) -> Verdict<L>
    where
        L: Clone,
    {
        let verdict = if self.observations.iter().all(|observation| !observation.has_type()) {
            Verdict {
                status: VerdictStatus::NothingProduced,
                faulting_locations: self.locations_where(|_| true),
            }
        } else if self.observations.iter().any(is_typed_mismatch) {
            Verdict {
                status: VerdictStatus::Mismatched,
                faulting_locations: self.locations_where(is_typed_mismatch),
            }
        } else {
            Verdict::consistent()
        };

        debug!(
            expected = %self.checker.model().full_name(self.expected),
            exits = self.observations.len(),
            status = ?verdict.status,
            faulting = verdict.faulting_locations.len(),
            "unit finalized"
        );
        verdict
    }

    /// Observed type the remediation should be based on
    pub fn representative(&self, policy: RepresentativePolicy) -> Option<TypeRef> {
        policy.pick(&self.observations)
    }

    fn locations_where<P>(&self, predicate: P) -> Vec<L>
    where
        L: Clone,
        P: Fn(&ExitObservation<L>) -> bool,
    {
        self.observations
            .iter()
            .filter(|observation| predicate(observation))
            .map(|observation| observation.location.clone())
            .collect()
    }
}

fn is_typed_mismatch<L>(observation: &ExitObservation<L>) -> bool {
    observation.has_type() && !observation.is_consistent()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_map_locations_keeps_status_and_order() {
        let verdict = Verdict {
            status: VerdictStatus::Mismatched,
            faulting_locations: vec![3, 1, 2],
        };

        let mapped = verdict.map_locations(|location| location * 10);
        assert_eq!(mapped.status(), VerdictStatus::Mismatched);
        assert_eq!(mapped.faulting_locations(), &[30, 10, 20]);
    }

    #[test]
    fn test_consistent_verdict_has_no_faults() {
        let verdict: Verdict<usize> = Verdict::consistent();
        assert!(verdict.is_consistent());
        assert!(verdict.faulting_locations().is_empty());
    }
}
