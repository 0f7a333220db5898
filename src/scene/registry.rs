//! Type registry: maps a type name to its construction capability.

use rustc_hash::FxHashMap;
use serde_json::{Map, Value};

use super::builder::{Args, RawContext};
use super::error::BuildError;
use super::object::Node;

/// Builds a node from bound positional/named arguments.
pub type ConstructFn = fn(&mut Args<'_>) -> Result<Node, BuildError>;

/// Builds a node from its raw description, bypassing argument binding.
pub type FromRawFn = fn(&Map<String, Value>, &RawContext<'_>) -> Result<Node, BuildError>;

/// How a registered type is constructed.
#[derive(Clone, Copy)]
pub enum Factory {
    /// Positional-then-named argument binding.
    Construct(ConstructFn),
    /// The type owns its own deserialization.
    FromRaw(FromRawFn),
}

impl std::fmt::Debug for Factory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Construct(_) => f.write_str("Factory::Construct"),
            Self::FromRaw(_) => f.write_str("Factory::FromRaw"),
        }
    }
}

/// Registry of constructible types. Populated by plugins.
#[derive(Debug, Default)]
pub struct TypeRegistry {
    types: FxHashMap<String, Factory>,
}

impl TypeRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `name`. An existing entry is replaced (last writer wins).
    pub fn register_type(&mut self, name: impl Into<String>, factory: Factory) {
        self.types.insert(name.into(), factory);
    }

    /// Shorthand for `register_type(name, Factory::Construct(f))`.
    pub fn register(&mut self, name: &str, construct: ConstructFn) {
        self.register_type(name, Factory::Construct(construct));
    }

    pub fn get_type(&self, name: &str) -> Option<Factory> {
        self.types.get(name).copied()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.types.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }

    /// Registered names, sorted.
    pub fn type_names(&self) -> Vec<&str> {
        let mut names: Vec<_> = self.types.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }
}
