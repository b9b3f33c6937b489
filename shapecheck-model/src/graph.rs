//! In-memory type graph
//!
//! [`TypeGraph`] is an arena of type entries addressed by [`TypeRef`]. Definitions are
//! declared once by full name; constructed generics and arrays are interned so that
//! the same construction always yields the same handle. Inheritance edges (bases and
//! implemented contracts) are mirrored in a petgraph graph so that an edge closing a
//! cycle is rejected when it is added, which keeps every base chain finite.

use crate::error::ModelError;
use crate::types::{TypeCategory, TypeModel, TypeRef, TypeShape};
use indexmap::{IndexMap, IndexSet};
use petgraph::algo::has_path_connecting;
use petgraph::graph::{DiGraph, NodeIndex};
use std::collections::HashMap;

/// Kind of a declared definition
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DeclKind {
    /// Reference type with an optional base class
    Class,
    /// Value type
    Struct,
    /// Interface-like capability set
    Contract,
}

/// Declaration of a new type definition
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeDecl {
    pub full_name: String,
    pub kind: DeclKind,
    pub parameters: Vec<String>,
}

impl TypeDecl {
    pub fn class(full_name: impl Into<String>) -> Self {
        Self::new(full_name, DeclKind::Class)
    }

    pub fn value(full_name: impl Into<String>) -> Self {
        Self::new(full_name, DeclKind::Struct)
    }

    pub fn contract(full_name: impl Into<String>) -> Self {
        Self::new(full_name, DeclKind::Contract)
    }

    fn new(full_name: impl Into<String>, kind: DeclKind) -> Self {
        Self {
            full_name: full_name.into(),
            kind,
            parameters: Vec::new(),
        }
    }

    /// Make the definition generic over the named parameters
    pub fn with_parameters<I, S>(mut self, parameters: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.parameters = parameters.into_iter().map(Into::into).collect();
        self
    }
}

#[derive(Debug, Clone)]
struct TypeEntry {
    /// Qualified name without type arguments
    full_name: String,
    kind: Option<DeclKind>,
    category: Option<TypeCategory>,
    shape: TypeShape,
    definition: TypeRef,
    arguments: Vec<TypeRef>,
    /// Only meaningful on definitions and arrays
    base: Option<TypeRef>,
    /// Directly implemented contracts, only meaningful on definitions and arrays
    contracts: Vec<TypeRef>,
}

/// Arena-backed [`TypeModel`] implementation
#[derive(Debug, Clone, Default)]
pub struct TypeGraph {
    entries: Vec<TypeEntry>,
    definitions: IndexMap<String, TypeRef>,
    constructed: IndexMap<(TypeRef, Vec<TypeRef>), TypeRef>,
    arrays: IndexMap<(TypeRef, u32), TypeRef>,
    inheritance: DiGraph<TypeRef, ()>,
    nodes: HashMap<TypeRef, NodeIndex>,
    array_base: Option<TypeRef>,
    array_contracts: Vec<TypeRef>,
}

impl TypeGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether `ty` was handed out by this graph
    pub fn contains(&self, ty: TypeRef) -> bool {
        ty.index() < self.entries.len()
    }

    /// Declare a new definition. Generic parameters are created alongside it and
    /// become the definition's type arguments.
    pub fn declare(&mut self, decl: TypeDecl) -> Result<TypeRef, ModelError> {
        if self.definitions.contains_key(&decl.full_name) {
            return Err(ModelError::DuplicateType {
                type_name: decl.full_name,
            });
        }

        let category = match decl.kind {
            DeclKind::Struct => TypeCategory::Value,
            DeclKind::Class | DeclKind::Contract => TypeCategory::Reference,
        };

        let definition = self.push(|definition| TypeEntry {
            full_name: decl.full_name.clone(),
            kind: Some(decl.kind),
            category: Some(category),
            shape: TypeShape::Named,
            definition,
            arguments: Vec::new(),
            base: None,
            contracts: Vec::new(),
        })?;

        let mut parameters = Vec::with_capacity(decl.parameters.len());
        for (ordinal, name) in decl.parameters.into_iter().enumerate() {
            parameters.push(self.push(|parameter| TypeEntry {
                full_name: name,
                kind: None,
                category: None,
                shape: TypeShape::Parameter { ordinal },
                definition: parameter,
                arguments: Vec::new(),
                base: None,
                contracts: Vec::new(),
            })?);
        }

        self.entries[definition.index()].arguments = parameters;
        self.definitions.insert(decl.full_name, definition);
        let node = self.inheritance.add_node(definition);
        self.nodes.insert(definition, node);

        Ok(definition)
    }

    /// Find a declared definition by its fully qualified name
    pub fn lookup(&self, full_name: &str) -> Option<TypeRef> {
        self.definitions.get(full_name).copied()
    }

    /// Generic parameter of a definition by position
    pub fn parameter(&self, definition: TypeRef, ordinal: usize) -> Option<TypeRef> {
        let entry = self.entries.get(definition.index())?;
        if entry.definition != definition {
            return None;
        }
        entry.arguments.get(ordinal).copied()
    }

    /// Set the base type of a definition, replacing any previous base. The base may
    /// be a constructed generic.
    pub fn set_base(&mut self, ty: TypeRef, base: TypeRef) -> Result<(), ModelError> {
        self.require_definition(ty)?;
        self.require_known(base)?;

        let previous = self.entry(ty).base;
        if let Some(previous) = previous {
            self.unlink(ty, previous);
        }

        if let Err(error) = self.link(ty, base) {
            if let Some(previous) = previous {
                self.restore_edge(ty, previous);
            }
            return Err(error);
        }

        self.entries[ty.index()].base = Some(base);
        Ok(())
    }

    /// Record that a definition implements a contract (possibly constructed,
    /// e.g. `List<T>` implements `IEnumerable<T>`)
    pub fn implement(&mut self, ty: TypeRef, contract: TypeRef) -> Result<(), ModelError> {
        self.require_definition(ty)?;
        self.require_known(contract)?;
        self.link(ty, contract)?;
        self.entries[ty.index()].contracts.push(contract);
        Ok(())
    }

    /// Construct a generic definition over concrete arguments
    pub fn construct(
        &mut self,
        definition: TypeRef,
        arguments: &[TypeRef],
    ) -> Result<TypeRef, ModelError> {
        self.require_definition(definition)?;
        for &argument in arguments {
            self.require_known(argument)?;
        }

        let entry = self.entry(definition);
        if entry.arguments.is_empty() || entry.arguments.len() != arguments.len() {
            return Err(ModelError::ArityMismatch {
                type_name: entry.full_name.clone(),
                expected: entry.arguments.len(),
                found: arguments.len(),
            });
        }

        // Constructing a definition over its own parameters is the definition itself
        if entry.arguments == arguments {
            return Ok(definition);
        }

        let key = (definition, arguments.to_vec());
        if let Some(existing) = self.constructed.get(&key) {
            return Ok(*existing);
        }

        let (full_name, kind, category) = (entry.full_name.clone(), entry.kind, entry.category);
        let constructed = self.push(|_| TypeEntry {
            full_name,
            kind,
            category,
            shape: TypeShape::Named,
            definition,
            arguments: arguments.to_vec(),
            base: None,
            contracts: Vec::new(),
        })?;
        self.constructed.insert(key, constructed);
        Ok(constructed)
    }

    /// Base type given to every array created afterwards (e.g. `System.Array`)
    pub fn set_array_base(&mut self, base: TypeRef) -> Result<(), ModelError> {
        self.require_definition(base)?;
        self.array_base = Some(base);
        Ok(())
    }

    /// Contract implemented by every array created afterwards. Single-parameter
    /// contracts are constructed over the array's element type.
    pub fn register_array_contract(&mut self, contract: TypeRef) -> Result<(), ModelError> {
        self.require_definition(contract)?;

        let entry = self.entry(contract);
        if entry.arguments.len() > 1 {
            return Err(ModelError::InvalidArrayContract {
                type_name: entry.full_name.clone(),
                parameter_count: entry.arguments.len(),
            });
        }

        self.array_contracts.push(contract);
        Ok(())
    }

    /// Array of `element` with the given rank (a rank of zero is treated as one)
    pub fn array_of(&mut self, element: TypeRef, rank: u32) -> Result<TypeRef, ModelError> {
        self.require_known(element)?;

        let rank = rank.max(1);
        if let Some(existing) = self.arrays.get(&(element, rank)) {
            return Ok(*existing);
        }

        let mut contracts = Vec::with_capacity(self.array_contracts.len());
        for contract in self.array_contracts.clone() {
            if self.entry(contract).arguments.is_empty() {
                contracts.push(contract);
            } else {
                contracts.push(self.construct(contract, &[element])?);
            }
        }

        let base = self.array_base;
        let array = self.push(|array| TypeEntry {
            full_name: String::new(),
            kind: None,
            category: Some(TypeCategory::Reference),
            shape: TypeShape::Array { element, rank },
            definition: array,
            arguments: Vec::new(),
            base,
            contracts,
        })?;
        self.arrays.insert((element, rank), array);
        Ok(array)
    }

    /// Whether a definition was declared as a contract. `false` for unknown handles.
    pub fn is_contract(&self, ty: TypeRef) -> bool {
        self.entries
            .get(ty.index())
            .is_some_and(|entry| entry.kind == Some(DeclKind::Contract))
    }

    /// Only valid for handles that passed `require_known`
    fn entry(&self, ty: TypeRef) -> &TypeEntry {
        &self.entries[ty.index()]
    }

    /// Append an entry built from the handle it will receive
    fn push<F>(&mut self, build: F) -> Result<TypeRef, ModelError>
    where
        F: FnOnce(TypeRef) -> TypeEntry,
    {
        let ty = TypeRef::try_from_index(self.entries.len()).ok_or(
            ModelError::CapacityExceeded {
                limit: TypeRef::MAX_INDEX,
            },
        )?;
        self.entries.push(build(ty));
        Ok(ty)
    }

    fn require_known(&self, ty: TypeRef) -> Result<(), ModelError> {
        if self.contains(ty) {
            Ok(())
        } else {
            Err(ModelError::UnknownType {
                index: ty.index(),
                len: self.entries.len(),
            })
        }
    }

    fn require_definition(&self, ty: TypeRef) -> Result<(), ModelError> {
        self.require_known(ty)?;
        let entry = self.entry(ty);
        if entry.definition != ty || entry.shape != TypeShape::Named {
            return Err(ModelError::NotADefinition {
                type_name: self.full_name(ty),
            });
        }
        Ok(())
    }

    fn edge_nodes(&self, ty: TypeRef, parent: TypeRef) -> Option<(NodeIndex, NodeIndex)> {
        let parent_definition = self.definition(parent);
        Some((
            *self.nodes.get(&ty)?,
            *self.nodes.get(&parent_definition)?,
        ))
    }

    /// Add an inheritance edge `ty -> parent`, refusing edges that close a cycle.
    /// Both handles must be known.
    fn link(&mut self, ty: TypeRef, parent: TypeRef) -> Result<(), ModelError> {
        let Some((child_node, parent_node)) = self.edge_nodes(ty, parent) else {
            return Err(ModelError::NotADefinition {
                type_name: self.full_name(parent),
            });
        };

        if child_node == parent_node
            || has_path_connecting(&self.inheritance, parent_node, child_node, None)
        {
            return Err(ModelError::CyclicInheritance {
                type_name: self.full_name(ty),
                parent_name: self.full_name(parent),
            });
        }

        self.inheritance.update_edge(child_node, parent_node, ());
        Ok(())
    }

    /// Drop the edge `ty -> parent` unless a contract of `ty` still needs it
    fn unlink(&mut self, ty: TypeRef, parent: TypeRef) {
        let parent_definition = self.definition(parent);
        let still_implemented = self
            .entry(ty)
            .contracts
            .iter()
            .any(|&contract| self.definition(contract) == parent_definition);
        if still_implemented {
            return;
        }

        if let Some((child_node, parent_node)) = self.edge_nodes(ty, parent) {
            if let Some(edge) = self.inheritance.find_edge(child_node, parent_node) {
                self.inheritance.remove_edge(edge);
            }
        }
    }

    fn restore_edge(&mut self, ty: TypeRef, parent: TypeRef) {
        if let Some((child_node, parent_node)) = self.edge_nodes(ty, parent) {
            self.inheritance.update_edge(child_node, parent_node, ());
        }
    }
}

/// Queries expect handles produced by this graph and panic on foreign ones
impl TypeModel for TypeGraph {
    fn definition(&self, ty: TypeRef) -> TypeRef {
        self.entry(ty).definition
    }

    fn category(&self, ty: TypeRef) -> Option<TypeCategory> {
        self.entry(ty).category
    }

    fn shape(&self, ty: TypeRef) -> TypeShape {
        self.entry(ty).shape
    }

    fn type_arguments(&self, ty: TypeRef) -> &[TypeRef] {
        &self.entry(ty).arguments
    }

    fn base_type(&self, ty: TypeRef) -> Option<TypeRef> {
        self.entry(self.definition(ty)).base
    }

    fn all_contracts(&self, ty: TypeRef) -> Vec<TypeRef> {
        let mut found = IndexSet::new();
        let mut expanded = IndexSet::new();
        let mut pending = vec![self.definition(ty)];

        while let Some(current) = pending.pop() {
            if !expanded.insert(current) {
                continue;
            }
            let entry = self.entry(current);
            for &contract in &entry.contracts {
                found.insert(contract);
                pending.push(self.definition(contract));
            }
            if let Some(base) = entry.base {
                pending.push(self.definition(base));
            }
        }

        found.into_iter().collect()
    }

    fn full_name(&self, ty: TypeRef) -> String {
        let entry = self.entry(ty);
        match entry.shape {
            TypeShape::Array { element, rank } => {
                let commas = ",".repeat(rank.saturating_sub(1) as usize);
                format!("{}[{}]", self.full_name(element), commas)
            }
            TypeShape::Parameter { .. } => entry.full_name.clone(),
            TypeShape::Named if entry.arguments.is_empty() => entry.full_name.clone(),
            TypeShape::Named => {
                let arguments: Vec<String> = entry
                    .arguments
                    .iter()
                    .map(|argument| self.full_name(*argument))
                    .collect();
                format!("{}<{}>", entry.full_name, arguments.join(", "))
            }
        }
    }

    fn name(&self, ty: TypeRef) -> String {
        let entry = self.entry(ty);
        match entry.shape {
            TypeShape::Array { element, rank } => {
                let commas = ",".repeat(rank.saturating_sub(1) as usize);
                format!("{}[{}]", self.name(element), commas)
            }
            TypeShape::Parameter { .. } => entry.full_name.clone(),
            TypeShape::Named => entry
                .full_name
                .rsplit('.')
                .next()
                .unwrap_or(&entry.full_name)
                .to_string(),
        }
    }
}
