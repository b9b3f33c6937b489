//! Remediation suggestions
//!
//! Maps a unit's verdict to the corrective action offered to the user. The generator
//! only decides *what* to suggest; applying an edit to source is the host's job.

use crate::aggregator::{ExitObservation, Verdict};
use serde::{Deserialize, Serialize};
use shapecheck_model::{TypeModel, TypeRef};
use tracing::debug;

/// Shared title of every suggested fix, used as the batch-fix equivalence key
pub const FIX_TITLE: &str = "Synchronize annotation";

/// Attached to every suggestion: changing the annotation changes the unit's visible contract
pub const API_CHANGE_WARNING: &str = "WARNING: This action might change your public API.";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Remediation {
    None,
    RemoveAnnotation {
        warning: String,
    },
    ReplaceAnnotationWith {
        replacement: TypeRef,
        warning: String,
    },
}

impl Remediation {
    pub fn is_none(&self) -> bool {
        matches!(self, Self::None)
    }

    pub fn warning(&self) -> Option<&str> {
        match self {
            Self::None => None,
            Self::RemoveAnnotation { warning } | Self::ReplaceAnnotationWith { warning, .. } => {
                Some(warning)
            }
        }
    }

    /// User-facing description of the action, followed by its warning
    pub fn title<M: TypeModel + ?Sized>(&self, model: &M) -> Option<String> {
        match self {
            Self::None => None,
            Self::RemoveAnnotation { warning } => {
                Some(format!("Remove the declared type annotation.\n{warning}"))
            }
            Self::ReplaceAnnotationWith {
                replacement,
                warning,
            } => Some(format!(
                "Replace the declared type with the real return type {}.\n{warning}",
                model.name(*replacement)
            )),
        }
    }
}

/// Which exit point's type stands for the unit when several disagree
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RepresentativePolicy {
    /// Type of the last exit point, absent or not
    #[default]
    LastObserved,
    /// Type of the first exit point, absent or not
    FirstObserved,
    /// Last exit point that produced a type
    LastTyped,
}

impl RepresentativePolicy {
    pub fn pick<L>(self, observations: &[ExitObservation<L>]) -> Option<TypeRef> {
        match self {
            Self::LastObserved => observations.last()?.observed_type(),
            Self::FirstObserved => observations.first()?.observed_type(),
            Self::LastTyped => observations
                .iter()
                .rev()
                .find_map(ExitObservation::observed_type),
        }
    }
}

/// Suggestion generator carrying the warning text attached to every suggestion
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemediationGenerator {
    warning: String,
}

impl Default for RemediationGenerator {
    fn default() -> Self {
        Self::new(API_CHANGE_WARNING)
    }
}

impl RemediationGenerator {
    pub fn new(warning: impl Into<String>) -> Self {
        Self {
            warning: warning.into(),
        }
    }

    pub fn suggest<L>(
        &self,
        verdict: &Verdict<L>,
        expected: TypeRef,
        representative: Option<TypeRef>,
    ) -> Remediation {
        let remediation = if verdict.is_consistent() {
            Remediation::None
        } else {
            match representative {
                None => Remediation::RemoveAnnotation {
                    warning: self.warning.clone(),
                },
                Some(replacement) => Remediation::ReplaceAnnotationWith {
                    replacement,
                    warning: self.warning.clone(),
                },
            }
        };

        debug!(%expected, ?representative, ?remediation, "remediation suggested");
        remediation
    }
}

/// Suggest a remediation with the default warning text
pub fn suggest<L>(
    verdict: &Verdict<L>,
    expected: TypeRef,
    representative: Option<TypeRef>,
) -> Remediation {
    RemediationGenerator::default().suggest(verdict, expected, representative)
}
