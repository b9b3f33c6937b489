// Unit descriptors handed to the analyzer by the host compiler
//
// A unit is a function-like body governed by at most a handful of annotations.
// The host enumerates its exit points and resolves the type each one produces;
// the analyzer only ever reads these values.

use crate::span::Span;
use crate::types::TypeRef;

/// One return site of a unit
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExitPoint {
    /// The whole exit statement
    pub statement: Span,
    /// The producing invocation, e.g. `Ok(new Car())`
    pub invocation: Option<Span>,
    /// The value passed to the producing invocation, e.g. `new Car()`
    pub argument: Option<Span>,
    /// Type of the produced expression, `None` when the host could not type it
    pub produced: Option<TypeRef>,
}

impl ExitPoint {
    pub fn new(statement: Span, produced: Option<TypeRef>) -> Self {
        Self {
            statement,
            invocation: None,
            argument: None,
            produced,
        }
    }

    pub fn with_invocation(mut self, invocation: Span) -> Self {
        self.invocation = Some(invocation);
        self
    }

    pub fn with_argument(mut self, argument: Span) -> Self {
        self.argument = Some(argument);
        self
    }
}

/// An annotation applied to a unit, e.g. `[ResponseType(typeof(Car))]`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Annotation {
    /// Annotation class
    pub class: TypeRef,
    /// Type passed to the annotation, the declared expected type
    pub type_argument: Option<TypeRef>,
    /// Location of the type inside the annotation, where diagnostics are anchored
    pub argument_span: Option<Span>,
    pub span: Span,
}

impl Annotation {
    pub fn new(class: TypeRef, span: Span) -> Self {
        Self {
            class,
            type_argument: None,
            argument_span: None,
            span,
        }
    }

    pub fn with_type_argument(mut self, ty: TypeRef, argument_span: Span) -> Self {
        self.type_argument = Some(ty);
        self.argument_span = Some(argument_span);
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UnitKind {
    Method,
    /// Property accessors, lambdas, constructors and other code blocks
    Other,
}

/// A function-like body and everything the analyzer needs to know about it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnitDescriptor {
    pub name: String,
    pub kind: UnitKind,
    pub is_async: bool,
    pub return_type: Option<TypeRef>,
    pub annotations: Vec<Annotation>,
    pub exit_points: Vec<ExitPoint>,
    pub span: Span,
}

impl UnitDescriptor {
    pub fn method(name: impl Into<String>, span: Span) -> Self {
        Self {
            name: name.into(),
            kind: UnitKind::Method,
            is_async: false,
            return_type: None,
            annotations: Vec::new(),
            exit_points: Vec::new(),
            span,
        }
    }

    pub fn with_kind(mut self, kind: UnitKind) -> Self {
        self.kind = kind;
        self
    }

    pub fn asynchronous(mut self) -> Self {
        self.is_async = true;
        self
    }

    pub fn returning(mut self, ty: TypeRef) -> Self {
        self.return_type = Some(ty);
        self
    }

    pub fn annotated(mut self, annotation: Annotation) -> Self {
        self.annotations.push(annotation);
        self
    }

    pub fn exit(mut self, exit_point: ExitPoint) -> Self {
        self.exit_points.push(exit_point);
        self
    }
}

/// A batch of units from one compilation
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Program {
    pub name: String,
    pub units: Vec<UnitDescriptor>,
}

impl Program {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            units: Vec::new(),
        }
    }

    pub fn add_unit(&mut self, unit: UnitDescriptor) {
        self.units.push(unit);
    }
}
