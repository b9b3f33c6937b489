//! Type compatibility checking
//!
//! Decides whether a type observed at an exit point satisfies the type declared by an
//! annotation. The check is binary and nominal:
//!
//! 1. Exact match (fast path)
//! 2. Absent actual types never satisfy a declaration
//! 3. Value and reference kinds never unify
//! 4. Generic and non-generic shapes never unify
//! 5. Non-generic types: the actual type's base chain or contract set must contain the
//!    expected type's definition
//! 6. Generic types: the outer definition must match as in (5), then the type arguments
//!    must pair up one to one and be compatible recursively
//! 7. Arrays bridge to single-argument generic sequence contracts when the array
//!    implements the contract and the element type derives from the argument.
//!    Non-generic declarations accept an array through its own base chain.
//!
//! All comparisons happen between root definitions, so `Auto` accepts a `Car`
//! deriving from it and `IEnumerable<T>` accepts any type implementing it.

use indexmap::IndexSet;
use shapecheck_model::{TypeCategory, TypeModel, TypeRef, TypeShape};
use tracing::trace;

/// Compatibility checker bound to a type model
#[derive(Debug)]
pub struct CompatibilityChecker<'m, M: TypeModel + ?Sized> {
    model: &'m M,
}

impl<M: TypeModel + ?Sized> Clone for CompatibilityChecker<'_, M> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<M: TypeModel + ?Sized> Copy for CompatibilityChecker<'_, M> {}

impl<'m, M: TypeModel + ?Sized> CompatibilityChecker<'m, M> {
    pub fn new(model: &'m M) -> Self {
        Self { model }
    }

    pub fn model(&self) -> &'m M {
        self.model
    }

    /// Whether `actual` satisfies a declaration of `expected`
    pub fn is_compatible(&self, expected: TypeRef, actual: Option<TypeRef>) -> bool {
        match actual {
            Some(actual) => self.compatible(expected, actual),
            None => {
                trace!(expected = %self.model.full_name(expected), "no actual type to compare");
                false
            }
        }
    }

    /// Consistency of a single exit point. A bare generic parameter at the top level
    /// cannot be classified and is accepted without comparison.
    pub fn exit_consistency(&self, expected: TypeRef, observed: Option<TypeRef>) -> bool {
        match observed {
            Some(ty) if matches!(self.model.shape(ty), TypeShape::Parameter { .. }) => {
                trace!(observed = %self.model.full_name(ty), "generic parameter exit is not checked");
                true
            }
            other => self.is_compatible(expected, other),
        }
    }

    fn compatible(&self, expected: TypeRef, actual: TypeRef) -> bool {
        if expected == actual {
            return true;
        }

        let result = match (self.model.shape(expected), self.model.shape(actual)) {
            (
                TypeShape::Array {
                    element: expected_element,
                    rank: expected_rank,
                },
                TypeShape::Array {
                    element: actual_element,
                    rank: actual_rank,
                },
            ) => expected_rank == actual_rank && self.compatible(expected_element, actual_element),
            (TypeShape::Array { .. }, _) => false,
            (_, TypeShape::Array { element, .. }) if self.model.is_generic(expected) => {
                self.bridges_array(expected, actual, element)
            }
            (_, TypeShape::Array { .. }) => self.derives_from(actual, expected),
            _ => self.compatible_named(expected, actual),
        };

        trace!(
            expected = %self.model.full_name(expected),
            actual = %self.model.full_name(actual),
            result,
            "compatibility"
        );
        result
    }

    fn compatible_named(&self, expected: TypeRef, actual: TypeRef) -> bool {
        let model = self.model;

        if opposite_categories(model.category(expected), model.category(actual)) {
            return false;
        }

        let expected_generic = model.is_generic(expected);
        if expected_generic != model.is_generic(actual) {
            return false;
        }

        // Outer shape first: List<Car> against IEnumerable<Car>, ICollection<Car>, ...
        if !self.derives_from(actual, expected) {
            return false;
        }

        if !expected_generic {
            return true;
        }

        let expected_arguments = model.type_arguments(expected);
        let actual_arguments = model.type_arguments(actual);
        if expected_arguments.len() != actual_arguments.len() {
            return false;
        }

        expected_arguments
            .iter()
            .zip(actual_arguments)
            .all(|(&expected_argument, &actual_argument)| {
                self.compatible(expected_argument, actual_argument)
            })
    }

    /// Arrays are not generic, yet they are routinely returned where a sequence
    /// contract is declared. `Seq<Auto>` accepts `Car[]` when arrays implement `Seq`
    /// and `Car` derives from `Auto`.
    fn bridges_array(&self, expected: TypeRef, array: TypeRef, element: TypeRef) -> bool {
        let model = self.model;

        let [argument] = model.type_arguments(expected) else {
            return false;
        };

        let sequence = model.definition(expected);
        let implements_sequence = model
            .all_contracts(array)
            .into_iter()
            .any(|contract| model.definition(contract) == sequence);
        if !implements_sequence {
            return false;
        }

        let wanted = model.definition(*argument);
        self.base_chain(element).any(|ty| ty == wanted)
    }

    /// `actual`'s base chain or contract set contains `expected`'s definition
    fn derives_from(&self, actual: TypeRef, expected: TypeRef) -> bool {
        let model = self.model;
        let target = model.definition(expected);

        if self.base_chain(actual).any(|ty| ty == target) {
            return true;
        }

        model
            .all_contracts(actual)
            .into_iter()
            .any(|contract| model.definition(contract) == target)
    }

    fn base_chain(&self, ty: TypeRef) -> BaseChain<'m, M> {
        BaseChain {
            model: self.model,
            next: Some(ty),
            seen: IndexSet::new(),
        }
    }
}

/// Convenience wrapper around [`CompatibilityChecker::is_compatible`]
pub fn is_compatible<M: TypeModel + ?Sized>(
    model: &M,
    expected: TypeRef,
    actual: Option<TypeRef>,
) -> bool {
    CompatibilityChecker::new(model).is_compatible(expected, actual)
}

fn opposite_categories(left: Option<TypeCategory>, right: Option<TypeCategory>) -> bool {
    matches!(
        (left, right),
        (Some(TypeCategory::Value), Some(TypeCategory::Reference))
            | (Some(TypeCategory::Reference), Some(TypeCategory::Value))
    )
}

/// Definitions from a type up through its bases. Stops at the first repeated
/// definition so a malformed external model cannot loop forever.
struct BaseChain<'m, M: TypeModel + ?Sized> {
    model: &'m M,
    next: Option<TypeRef>,
    seen: IndexSet<TypeRef>,
}

impl<M: TypeModel + ?Sized> Iterator for BaseChain<'_, M> {
    type Item = TypeRef;

    fn next(&mut self) -> Option<TypeRef> {
        let current = self.model.definition(self.next.take()?);
        if !self.seen.insert(current) {
            return None;
        }
        self.next = self.model.base_type(current);
        Some(current)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Hand-written model whose single type claims to be its own base
    struct SelfDerived;

    impl TypeModel for SelfDerived {
        fn definition(&self, ty: TypeRef) -> TypeRef {
            ty
        }

        fn category(&self, _ty: TypeRef) -> Option<TypeCategory> {
            Some(TypeCategory::Reference)
        }

        fn shape(&self, _ty: TypeRef) -> TypeShape {
            TypeShape::Named
        }

        fn type_arguments(&self, _ty: TypeRef) -> &[TypeRef] {
            &[]
        }

        fn base_type(&self, ty: TypeRef) -> Option<TypeRef> {
            Some(ty)
        }

        fn all_contracts(&self, _ty: TypeRef) -> Vec<TypeRef> {
            Vec::new()
        }

        fn full_name(&self, ty: TypeRef) -> String {
            format!("Looping{}", ty.index())
        }

        fn name(&self, ty: TypeRef) -> String {
            self.full_name(ty)
        }
    }

    #[test]
    fn test_cyclic_base_chain_terminates() {
        let model = SelfDerived;
        let checker = CompatibilityChecker::new(&model);

        assert!(!checker.is_compatible(TypeRef::from_index(0), Some(TypeRef::from_index(1))));
        assert!(checker.is_compatible(TypeRef::from_index(1), Some(TypeRef::from_index(1))));
    }

    /// Hand-written model where arrays implement a two-argument contract
    ///
    /// 0 `Pair<A, B>`, 1 `Car`, 2 `Car[]`, 3 `Pair<Car, Car>`, 4 `Seq<T>`, 5 `Seq<Car>`,
    /// 6 to 8 generic parameters. `Car[]` implements both `Pair<Car, Car>` and
    /// `Seq<Car>`.
    struct PairedArrays {
        arguments: Vec<Vec<TypeRef>>,
    }

    impl PairedArrays {
        fn new() -> Self {
            let ty = TypeRef::from_index;
            Self {
                arguments: vec![
                    vec![ty(7), ty(8)],
                    vec![],
                    vec![],
                    vec![ty(1), ty(1)],
                    vec![ty(6)],
                    vec![ty(1)],
                    vec![],
                    vec![],
                    vec![],
                ],
            }
        }
    }

    impl TypeModel for PairedArrays {
        fn definition(&self, ty: TypeRef) -> TypeRef {
            match ty.index() {
                3 => TypeRef::from_index(0),
                5 => TypeRef::from_index(4),
                _ => ty,
            }
        }

        fn category(&self, ty: TypeRef) -> Option<TypeCategory> {
            (ty.index() < 6).then_some(TypeCategory::Reference)
        }

        fn shape(&self, ty: TypeRef) -> TypeShape {
            match ty.index() {
                2 => TypeShape::Array {
                    element: TypeRef::from_index(1),
                    rank: 1,
                },
                index @ 6..=8 => TypeShape::Parameter { ordinal: index - 6 },
                _ => TypeShape::Named,
            }
        }

        fn type_arguments(&self, ty: TypeRef) -> &[TypeRef] {
            &self.arguments[ty.index()]
        }

        fn base_type(&self, _ty: TypeRef) -> Option<TypeRef> {
            None
        }

        fn all_contracts(&self, ty: TypeRef) -> Vec<TypeRef> {
            match ty.index() {
                2 => vec![TypeRef::from_index(3), TypeRef::from_index(5)],
                _ => Vec::new(),
            }
        }

        fn full_name(&self, ty: TypeRef) -> String {
            format!("Paired{}", ty.index())
        }

        fn name(&self, ty: TypeRef) -> String {
            self.full_name(ty)
        }
    }

    #[test]
    fn test_array_bridges_only_to_single_argument_contracts() {
        let model = PairedArrays::new();
        let checker = CompatibilityChecker::new(&model);
        let cars = Some(TypeRef::from_index(2));

        assert!(checker.is_compatible(TypeRef::from_index(5), cars));
        // Implemented, and Car matches both arguments, but arrays only bridge to Seq<T>
        assert!(!checker.is_compatible(TypeRef::from_index(3), cars));
    }

    #[test]
    fn test_opposite_categories() {
        assert!(opposite_categories(
            Some(TypeCategory::Value),
            Some(TypeCategory::Reference)
        ));
        assert!(!opposite_categories(Some(TypeCategory::Value), None));
        assert!(!opposite_categories(
            Some(TypeCategory::Reference),
            Some(TypeCategory::Reference)
        ));
    }
}
