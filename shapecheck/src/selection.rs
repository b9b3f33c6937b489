//! Unit selection
//!
//! Decides which units carry a declared expected type worth checking. Hosts inject the
//! decision as a [`UnitFilter`]; [`AsyncResultFilter`] covers the common case of an
//! asynchronous method returning a wrapped result and annotated with the type it
//! promises to return.

use shapecheck_model::{Annotation, TypeModel, TypeRef, UnitDescriptor, UnitKind};
use tracing::debug;

/// A unit accepted for analysis together with its governing annotation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selection {
    pub expected: TypeRef,
    pub annotation: Annotation,
}

/// Capability query: does this unit declare exactly one expected type worth checking?
pub trait UnitFilter<M: TypeModel + ?Sized> {
    fn select(&self, model: &M, unit: &UnitDescriptor) -> Option<Selection>;
}

impl<M, F> UnitFilter<M> for F
where
    M: TypeModel + ?Sized,
    F: Fn(&M, &UnitDescriptor) -> Option<Selection>,
{
    fn select(&self, model: &M, unit: &UnitDescriptor) -> Option<Selection> {
        self(model, unit)
    }
}

/// Selects asynchronous methods returning `wrapper<result>` (e.g. `Task<IHttpActionResult>`)
/// that carry exactly one `annotation` with a type argument.
///
/// Every comparison is made between root definitions, never by name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AsyncResultFilter {
    pub wrapper: TypeRef,
    pub result: TypeRef,
    pub annotation: TypeRef,
}

impl AsyncResultFilter {
    pub fn new(wrapper: TypeRef, result: TypeRef, annotation: TypeRef) -> Self {
        Self {
            wrapper,
            result,
            annotation,
        }
    }

    fn returns_wrapped_result<M: TypeModel + ?Sized>(&self, model: &M, unit: &UnitDescriptor) -> bool {
        let Some(return_type) = unit.return_type else {
            return false;
        };
        if model.definition(return_type) != model.definition(self.wrapper) {
            return false;
        }
        matches!(
            model.type_arguments(return_type),
            [argument] if model.definition(*argument) == model.definition(self.result)
        )
    }
}

impl<M: TypeModel + ?Sized> UnitFilter<M> for AsyncResultFilter {
    fn select(&self, model: &M, unit: &UnitDescriptor) -> Option<Selection> {
        if unit.kind != UnitKind::Method {
            debug!(unit = %unit.name, "skipped: not a method");
            return None;
        }

        if !unit.is_async {
            debug!(unit = %unit.name, "skipped: not asynchronous");
            return None;
        }

        if !self.returns_wrapped_result(model, unit) {
            debug!(unit = %unit.name, "skipped: does not return the wrapped result shape");
            return None;
        }

        let annotation_class = model.definition(self.annotation);
        let mut matching = unit
            .annotations
            .iter()
            .filter(|annotation| model.definition(annotation.class) == annotation_class);
        let (Some(annotation), None) = (matching.next(), matching.next()) else {
            debug!(unit = %unit.name, "skipped: needs exactly one expected-type annotation");
            return None;
        };

        let Some(expected) = annotation.type_argument else {
            debug!(unit = %unit.name, "skipped: annotation carries no type");
            return None;
        };

        debug!(unit = %unit.name, expected = %model.full_name(expected), "unit selected");
        Some(Selection {
            expected,
            annotation: annotation.clone(),
        })
    }
}
