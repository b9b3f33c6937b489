//! Analyzer driver
//!
//! Runs the whole pipeline for each unit of a program: selection, observation of every
//! exit point through a fresh aggregator, verdict, remediation and diagnostic.

use crate::aggregator::{ConsistencyAggregator, Verdict};
use crate::config::{AnalyzerConfig, PayloadShape};
use crate::diagnostics::{faulting_span, InconsistentAnnotation};
use crate::remediation::{Remediation, RemediationGenerator};
use crate::selection::{Selection, UnitFilter};
use shapecheck_model::{ExitPoint, Program, Span, TypeModel, TypeRef, UnitDescriptor};
use tracing::debug;

/// Outcome of analyzing one selected unit
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnitReport {
    pub unit: String,
    pub expected: TypeRef,
    pub verdict: Verdict<Span>,
    pub representative: Option<TypeRef>,
    pub remediation: Remediation,
    /// `None` for consistent units and for annotations without a locatable type
    pub diagnostic: Option<InconsistentAnnotation>,
}

impl UnitReport {
    pub fn is_consistent(&self) -> bool {
        self.verdict.is_consistent()
    }
}

pub struct Analyzer<'m, M: TypeModel + ?Sized, F> {
    model: &'m M,
    config: AnalyzerConfig,
    filter: F,
    remediation: RemediationGenerator,
}

impl<'m, M, F> Analyzer<'m, M, F>
where
    M: TypeModel + ?Sized,
    F: UnitFilter<M>,
{
    pub fn new(model: &'m M, config: AnalyzerConfig, filter: F) -> Self {
        let remediation = RemediationGenerator::new(config.api_change_warning.clone());
        Self {
            model,
            config,
            filter,
            remediation,
        }
    }

    pub fn config(&self) -> &AnalyzerConfig {
        &self.config
    }

    /// Analyze every unit in order, skipping the ones the filter rejects
    pub fn analyze_program(&self, program: &Program) -> Vec<UnitReport> {
        debug!(program = %program.name, units = program.units.len(), "analyzing program");
        program
            .units
            .iter()
            .filter_map(|unit| self.analyze(unit))
            .collect()
    }

    /// `None` when the rule is disabled or the unit is not selected
    pub fn analyze(&self, unit: &UnitDescriptor) -> Option<UnitReport> {
        if !self.config.is_enabled() {
            debug!(rule = %self.config.rule.id, "rule disabled");
            return None;
        }

        let selection = self.filter.select(self.model, unit)?;
        Some(self.check(unit, selection))
    }

    fn check(&self, unit: &UnitDescriptor, selection: Selection) -> UnitReport {
        let expected = selection.expected;

        // Exit points are observed by position so faults can be traced back to them
        let mut aggregator = ConsistencyAggregator::new(self.model, expected);
        for (index, exit) in unit.exit_points.iter().enumerate() {
            aggregator.observe(index, self.observed_type(exit));
        }

        let verdict = aggregator.finalize();
        let representative = aggregator.representative(self.config.representative);
        let remediation = self.remediation.suggest(&verdict, expected, representative);

        let status = verdict.status();
        let span_of = |index: usize| faulting_span(status, &unit.exit_points[index]);
        let faulting: Vec<(Span, Option<TypeRef>)> = verdict
            .faulting_locations()
            .iter()
            .map(|&index| (span_of(index), aggregator.observations()[index].observed_type()))
            .collect();

        let diagnostic = if verdict.is_consistent() {
            None
        } else {
            self.diagnostic(&selection, representative, &remediation, &faulting)
        };

        let verdict = verdict.map_locations(span_of);
        debug!(
            unit = %unit.name,
            status = ?status,
            faulting = verdict.faulting_locations().len(),
            "unit analyzed"
        );

        UnitReport {
            unit: unit.name.clone(),
            expected,
            verdict,
            representative,
            remediation,
            diagnostic,
        }
    }

    fn observed_type(&self, exit: &ExitPoint) -> Option<TypeRef> {
        let produced = exit.produced?;
        match self.config.payload {
            PayloadShape::Direct => Some(produced),
            PayloadShape::WrappedSingleArgument => match self.model.type_arguments(produced) {
                [payload] => Some(*payload),
                _ => None,
            },
        }
    }

    fn diagnostic(
        &self,
        selection: &Selection,
        representative: Option<TypeRef>,
        remediation: &Remediation,
        faulting: &[(Span, Option<TypeRef>)],
    ) -> Option<InconsistentAnnotation> {
        let Some(anchor) = selection.annotation.argument_span else {
            debug!("annotation has no locatable type, nothing reported");
            return None;
        };

        let actual = representative
            .map(|ty| self.model.full_name(ty))
            .unwrap_or_else(|| self.config.absent_type_label.clone());
        let message = self
            .config
            .rule
            .format_message(&self.model.full_name(selection.expected), &actual);

        let mut diagnostic = InconsistentAnnotation::new(&self.config.rule, message, anchor);
        if let Some(help) = remediation.title(self.model) {
            diagnostic = diagnostic.with_help(help);
        }
        for (span, observed) in faulting {
            let label = match observed {
                Some(ty) => format!("returns {}", self.model.full_name(*ty)),
                None => "returns no typed value".to_string(),
            };
            diagnostic = diagnostic.with_fault(*span, label);
        }
        Some(diagnostic)
    }
}
