//! Type model queried by the analyzer
//!
//! The analyzer never builds types itself. Everything it needs to know about a type
//! (its definition, kind, base chain, contracts and type arguments) is answered by a
//! [`TypeModel`]. Hosts with their own compiler model implement the trait directly;
//! [`crate::TypeGraph`] is the in-memory implementation.

use std::fmt;

/// Handle to a type owned by a [`TypeModel`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TypeRef(u32);

impl TypeRef {
    /// Largest index a handle can address
    pub const MAX_INDEX: usize = u32::MAX as usize;

    /// Handle for `index`, which must not exceed [`TypeRef::MAX_INDEX`]
    pub fn from_index(index: usize) -> Self {
        debug_assert!(index <= Self::MAX_INDEX, "type index {index} out of range");
        Self(index as u32)
    }

    /// Handle for `index`, or `None` when it does not fit
    pub fn try_from_index(index: usize) -> Option<Self> {
        u32::try_from(index).ok().map(Self)
    }

    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for TypeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TypeRef({})", self.0)
    }
}

/// Storage category of a concrete type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TypeCategory {
    Value,
    Reference,
}

/// Structural shape of a type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TypeShape {
    /// Classes, structs and contracts, generic or not
    Named,
    /// `Element[]`, `Element[,]`, ...
    Array { element: TypeRef, rank: u32 },
    /// Generic parameter such as `T` in `List<T>`
    Parameter { ordinal: usize },
}

/// Read-only queries over a program's types
pub trait TypeModel {
    /// Original definition of a type (`List<Car>` -> `List<T>`).
    /// Definitions, arrays and non-generic types are their own definition.
    fn definition(&self, ty: TypeRef) -> TypeRef;

    /// `None` for generic parameters, which are neither value nor reference kind
    fn category(&self, ty: TypeRef) -> Option<TypeCategory>;

    fn shape(&self, ty: TypeRef) -> TypeShape;

    /// Ordered type arguments. A generic definition's arguments are its own parameters.
    fn type_arguments(&self, ty: TypeRef) -> &[TypeRef];

    fn is_generic(&self, ty: TypeRef) -> bool {
        !self.type_arguments(ty).is_empty()
    }

    /// Base type as declared on the type's definition
    fn base_type(&self, ty: TypeRef) -> Option<TypeRef>;

    /// Every contract the type implements, directly, through other contracts, or
    /// through its bases
    fn all_contracts(&self, ty: TypeRef) -> Vec<TypeRef>;

    /// Fully qualified display name, e.g. `System.Collections.Generic.List<TestNamespace.Car>`
    fn full_name(&self, ty: TypeRef) -> String;

    /// Simple name without namespace or type arguments, e.g. `List`
    fn name(&self, ty: TypeRef) -> String;
}

impl<M: TypeModel + ?Sized> TypeModel for &M {
    fn definition(&self, ty: TypeRef) -> TypeRef {
        (**self).definition(ty)
    }

    fn category(&self, ty: TypeRef) -> Option<TypeCategory> {
        (**self).category(ty)
    }

    fn shape(&self, ty: TypeRef) -> TypeShape {
        (**self).shape(ty)
    }

    fn type_arguments(&self, ty: TypeRef) -> &[TypeRef] {
        (**self).type_arguments(ty)
    }

    fn is_generic(&self, ty: TypeRef) -> bool {
        (**self).is_generic(ty)
    }

    fn base_type(&self, ty: TypeRef) -> Option<TypeRef> {
        (**self).base_type(ty)
    }

    fn all_contracts(&self, ty: TypeRef) -> Vec<TypeRef> {
        (**self).all_contracts(ty)
    }

    fn full_name(&self, ty: TypeRef) -> String {
        (**self).full_name(ty)
    }

    fn name(&self, ty: TypeRef) -> String {
        (**self).name(ty)
    }
}
