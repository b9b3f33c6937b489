//! Diagnostic reporting
//!
//! An inconsistent unit is reported once, anchored at the type inside its annotation,
//! with one secondary label per faulting exit point.

use crate::aggregator::VerdictStatus;
use crate::config::{Rule, Severity};
use miette::{Diagnostic, LabeledSpan};
use shapecheck_model::{ExitPoint, Span};
use std::fmt::Display;
use thiserror::Error;

/// Declared annotation disagrees with what the unit returns
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{message}")]
pub struct InconsistentAnnotation {
    message: String,
    rule_id: String,
    severity: Severity,
    help: Option<String>,
    anchor: Span,
    faults: Vec<(Span, String)>,
}

impl InconsistentAnnotation {
    pub fn new(rule: &Rule, message: impl Into<String>, anchor: Span) -> Self {
        Self {
            message: message.into(),
            rule_id: rule.id.clone(),
            severity: rule.severity,
            help: None,
            anchor,
            faults: Vec::new(),
        }
    }

    pub fn with_help(mut self, help: impl Into<String>) -> Self {
        self.help = Some(help.into());
        self
    }

    pub fn with_fault(mut self, span: Span, label: impl Into<String>) -> Self {
        self.faults.push((span, label.into()));
        self
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn rule_id(&self) -> &str {
        &self.rule_id
    }

    /// Location of the declared type inside the annotation
    pub fn anchor(&self) -> Span {
        self.anchor
    }

    pub fn faults(&self) -> &[(Span, String)] {
        &self.faults
    }
}

impl Diagnostic for InconsistentAnnotation {
    fn code<'a>(&'a self) -> Option<Box<dyn Display + 'a>> {
        Some(Box::new(&self.rule_id))
    }

    fn severity(&self) -> Option<miette::Severity> {
        Some(self.severity.into())
    }

    fn help<'a>(&'a self) -> Option<Box<dyn Display + 'a>> {
        self.help
            .as_ref()
            .map(|help| Box::new(help) as Box<dyn Display + 'a>)
    }

    fn labels(&self) -> Option<Box<dyn Iterator<Item = LabeledSpan> + '_>> {
        let anchor = LabeledSpan::new_with_span(Some("declared here".to_string()), self.anchor);
        let faults = self
            .faults
            .iter()
            .map(|(span, label)| LabeledSpan::new_with_span(Some(label.clone()), *span));
        Some(Box::new(std::iter::once(anchor).chain(faults)))
    }
}

/// Where a faulting exit point is pointed at: the producing invocation when nothing
/// typed was produced, the returned value when a wrong type was produced
pub fn faulting_span(status: VerdictStatus, exit: &ExitPoint) -> Span {
    match status {
        VerdictStatus::Mismatched => exit
            .argument
            .or(exit.invocation)
            .unwrap_or(exit.statement),
        VerdictStatus::NothingProduced | VerdictStatus::Consistent => {
            exit.invocation.unwrap_or(exit.statement)
        }
    }
}
