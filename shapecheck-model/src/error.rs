// Shapecheck Model Error Handling
// Failures while building a type graph, reported through miette

use miette::Diagnostic;
use thiserror::Error;

/// Errors raised while declaring or constructing types in a [`crate::TypeGraph`]
#[derive(Error, Diagnostic, Debug, Clone, PartialEq, Eq)]
pub enum ModelError {
    #[error("Duplicate type: {type_name} is already declared")]
    #[diagnostic(
        code(shapecheck::model::duplicate_type),
        help("Each fully qualified type name can only be declared once")
    )]
    DuplicateType { type_name: String },

    #[error("Arity mismatch: {type_name} expects {expected} type arguments, found {found}")]
    #[diagnostic(
        code(shapecheck::model::arity_mismatch),
        help("Provide exactly one type argument per generic parameter")
    )]
    ArityMismatch {
        type_name: String,
        expected: usize,
        found: usize,
    },

    #[error("Not a definition: {type_name} is a constructed or derived type")]
    #[diagnostic(
        code(shapecheck::model::not_a_definition),
        help("Bases, contracts and constructions are attached to root definitions")
    )]
    NotADefinition { type_name: String },

    #[error("Inheritance cycle: {type_name} cannot inherit from {parent_name}")]
    #[diagnostic(
        code(shapecheck::model::cyclic_inheritance),
        help("{parent_name} already derives from {type_name}")
    )]
    CyclicInheritance {
        type_name: String,
        parent_name: String,
    },

    #[error("Invalid array contract: {type_name} takes {parameter_count} type parameters")]
    #[diagnostic(
        code(shapecheck::model::invalid_array_contract),
        help("Arrays can only implement contracts with zero or one type parameter")
    )]
    InvalidArrayContract {
        type_name: String,
        parameter_count: usize,
    },

    #[error("Unknown type: handle {index} does not belong to this graph ({len} types)")]
    #[diagnostic(
        code(shapecheck::model::unknown_type),
        help("Only pass handles returned by the same graph")
    )]
    UnknownType { index: usize, len: usize },

    #[error("Capacity exceeded: a graph holds at most {limit} types")]
    #[diagnostic(
        code(shapecheck::model::capacity_exceeded),
        help("Split the model across several graphs")
    )]
    CapacityExceeded { limit: usize },
}
