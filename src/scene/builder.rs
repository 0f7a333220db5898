//! Recursive JSON → object graph construction.
//!
//! A description is a JSON object with a `type` field naming a registered
//! type. Nested objects carrying their own `type` are built first and handed
//! to the outer constructor as resolved [`Node`]s.
//!
//! ```text
//! {"type": "Transform", "position": [1, 0, 0],
//!  "object": {"type": "Sphere", "radius": 2}}
//!        │
//!        ├─ "object" ──► build(Sphere) ──► Arg::Node
//!        └─ "position" ─► Arg::Value
//!                              │
//!                  Transform::construct(&mut Args)
//! ```
//!
//! Arguments bind positional-then-named: every parameter a constructor asks
//! for consumes the next `args` entry if one is left, otherwise the named
//! field of the same name. Anything left unconsumed is an error.

use std::collections::VecDeque;
use std::sync::Arc;

use indexmap::IndexMap;
use serde_json::Value;

use super::error::{BuildError, fragment};
use super::material::{Material, MaterialClass, MaterialTable};
use super::object::{Node, SceneObject};
use super::registry::{Factory, TypeRegistry};

/// Maximum nesting depth of a description.
pub const MAX_DEPTH: usize = 64;

/// Reserved keys that never become named arguments.
const TYPE_KEY: &str = "type";
const ARGS_KEY: &str = "args";

// ============================================================================
// ObjectBuilder
// ============================================================================

/// Builds typed nodes from JSON descriptions. Pure: no I/O, no mutation.
#[derive(Clone, Copy)]
pub struct ObjectBuilder<'a> {
    registry: &'a TypeRegistry,
    materials: &'a MaterialTable,
}

impl<'a> ObjectBuilder<'a> {
    /// `materials` resolves material references given by name.
    pub fn new(registry: &'a TypeRegistry, materials: &'a MaterialTable) -> Self {
        Self {
            registry,
            materials,
        }
    }

    /// Build a node from a description.
    pub fn build(&self, value: &Value) -> Result<Node, BuildError> {
        self.build_at(value, 0)
    }

    fn build_at(&self, value: &Value, depth: usize) -> Result<Node, BuildError> {
        if depth > MAX_DEPTH {
            return Err(BuildError::TooDeep { limit: MAX_DEPTH });
        }

        let Value::Object(fields) = value else {
            return Err(BuildError::NotAnObject {
                fragment: fragment(value),
            });
        };

        let Some(Value::String(type_name)) = fields.get(TYPE_KEY) else {
            return Err(BuildError::MissingType {
                fragment: fragment(value),
            });
        };

        let factory =
            self.registry
                .get_type(type_name)
                .ok_or_else(|| BuildError::UnknownType {
                    type_name: type_name.clone(),
                })?;

        match factory {
            Factory::FromRaw(from_raw) => {
                let cx = RawContext {
                    builder: *self,
                    depth,
                };
                from_raw(fields, &cx)
            }
            Factory::Construct(construct) => {
                let positional = match fields.get(ARGS_KEY) {
                    None | Some(Value::Null) => VecDeque::new(),
                    Some(Value::Array(items)) => items
                        .iter()
                        .map(|item| self.resolve(item, depth + 1))
                        .collect::<Result<_, _>>()?,
                    Some(other) => {
                        return Err(BuildError::MalformedArgs {
                            type_name: type_name.clone(),
                            fragment: fragment(other),
                        });
                    }
                };

                let mut named = IndexMap::with_capacity(fields.len());
                for (key, value) in fields {
                    if key == TYPE_KEY || key == ARGS_KEY {
                        continue;
                    }
                    named.insert(key.clone(), self.resolve(value, depth + 1)?);
                }

                let mut args = Args::new(type_name, positional, named, self.materials);
                let node = construct(&mut args)?;
                args.finish()?;
                Ok(node)
            }
        }
    }

    /// Resolve one argument value, building nested descriptions.
    fn resolve(&self, value: &Value, depth: usize) -> Result<Arg, BuildError> {
        match value {
            Value::Object(fields) if fields.contains_key(TYPE_KEY) => {
                Ok(Arg::Node(self.build_at(value, depth)?))
            }
            Value::Array(items) if items.iter().any(contains_description) => items
                .iter()
                .map(|item| self.resolve(item, depth + 1))
                .collect::<Result<_, _>>()
                .map(Arg::List),
            _ => Ok(Arg::Value(value.clone())),
        }
    }
}

/// Whether `value` holds a typed description anywhere inside it.
fn contains_description(value: &Value) -> bool {
    match value {
        Value::Object(fields) => fields.contains_key(TYPE_KEY),
        Value::Array(items) => items.iter().any(contains_description),
        _ => false,
    }
}

// ============================================================================
// RawContext
// ============================================================================

/// Handed to [`Factory::FromRaw`] constructors so they can build nested
/// descriptions with the same registry, materials and depth budget.
pub struct RawContext<'a> {
    builder: ObjectBuilder<'a>,
    depth: usize,
}

impl RawContext<'_> {
    pub fn build_nested(&self, value: &Value) -> Result<Node, BuildError> {
        self.builder.build_at(value, self.depth + 1)
    }

    pub fn materials(&self) -> &MaterialTable {
        self.builder.materials
    }
}

// ============================================================================
// Args
// ============================================================================

/// A resolved argument.
#[derive(Debug)]
pub enum Arg {
    /// Plain JSON (no nested descriptions inside).
    Value(Value),
    /// A nested description, already built.
    Node(Node),
    /// An array that contained nested descriptions.
    List(Vec<Arg>),
}

impl Arg {
    fn fragment(&self) -> String {
        match self {
            Self::Value(value) => fragment(value),
            Self::Node(node) => fragment(&node.to_value()),
            Self::List(items) => format!("[{} items]", items.len()),
        }
    }
}

/// Arguments bound to one constructor call.
pub struct Args<'a> {
    type_name: &'a str,
    positional: VecDeque<Arg>,
    given_positional: usize,
    named: IndexMap<String, Arg>,
    materials: &'a MaterialTable,
}

impl<'a> Args<'a> {
    pub fn new(
        type_name: &'a str,
        positional: VecDeque<Arg>,
        named: IndexMap<String, Arg>,
        materials: &'a MaterialTable,
    ) -> Self {
        Self {
            type_name,
            given_positional: positional.len(),
            positional,
            named,
            materials,
        }
    }

    pub fn empty(type_name: &'a str, materials: &'a MaterialTable) -> Self {
        Self::new(type_name, VecDeque::new(), IndexMap::new(), materials)
    }

    pub fn type_name(&self) -> &str {
        self.type_name
    }

    /// Take the next parameter: positional first, then by name.
    ///
    /// `null` counts as absent.
    pub fn take(&mut self, name: &str) -> Result<Option<Arg>, BuildError> {
        if let Some(arg) = self.positional.pop_front() {
            if self.named.contains_key(name) {
                return Err(BuildError::DuplicateArgument {
                    type_name: self.type_name.to_string(),
                    name: name.to_string(),
                });
            }
            return Ok(Some(arg));
        }
        Ok(match self.named.shift_remove(name) {
            Some(Arg::Value(Value::Null)) | None => None,
            Some(arg) => Some(arg),
        })
    }

    /// Take a plain JSON value.
    pub fn value(&mut self, name: &str) -> Result<Option<Value>, BuildError> {
        match self.take(name)? {
            None => Ok(None),
            Some(Arg::Value(value)) => Ok(Some(value)),
            Some(other) => Err(self.invalid(name, "a plain value", other.fragment())),
        }
    }

    pub fn f64(&mut self, name: &str) -> Result<f64, BuildError> {
        self.opt_f64(name)?.ok_or_else(|| self.missing(name))
    }

    pub fn f64_or(&mut self, name: &str, default: f64) -> Result<f64, BuildError> {
        Ok(self.opt_f64(name)?.unwrap_or(default))
    }

    pub fn opt_f64(&mut self, name: &str) -> Result<Option<f64>, BuildError> {
        match self.value(name)? {
            None => Ok(None),
            Some(Value::Number(n)) => match n.as_f64() {
                Some(v) if v.is_finite() => Ok(Some(v)),
                _ => Err(self.invalid(name, "a finite number", n.to_string())),
            },
            Some(other) => Err(self.invalid(name, "a number", fragment(&other))),
        }
    }

    pub fn u32_or(&mut self, name: &str, default: u32) -> Result<u32, BuildError> {
        match self.value(name)? {
            None => Ok(default),
            Some(Value::Number(n)) => n
                .as_u64()
                .and_then(|v| u32::try_from(v).ok())
                .ok_or_else(|| self.invalid(name, "a non-negative integer", n.to_string())),
            Some(other) => Err(self.invalid(name, "a non-negative integer", fragment(&other))),
        }
    }

    pub fn bool_or(&mut self, name: &str, default: bool) -> Result<bool, BuildError> {
        match self.value(name)? {
            None => Ok(default),
            Some(Value::Bool(b)) => Ok(b),
            Some(other) => Err(self.invalid(name, "a boolean", fragment(&other))),
        }
    }

    pub fn opt_string(&mut self, name: &str) -> Result<Option<String>, BuildError> {
        match self.value(name)? {
            None => Ok(None),
            Some(Value::String(s)) => Ok(Some(s)),
            Some(other) => Err(self.invalid(name, "a string", fragment(&other))),
        }
    }

    pub fn string(&mut self, name: &str) -> Result<String, BuildError> {
        self.opt_string(name)?.ok_or_else(|| self.missing(name))
    }

    pub fn string_or(&mut self, name: &str, default: &str) -> Result<String, BuildError> {
        Ok(self.opt_string(name)?.unwrap_or_else(|| default.to_string()))
    }

    /// A 3-component vector given as `[x, y, z]`.
    pub fn vec3_or(&mut self, name: &str, default: [f64; 3]) -> Result<[f64; 3], BuildError> {
        let Some(value) = self.value(name)? else {
            return Ok(default);
        };
        let components = number_row(&value)
            .filter(|row| row.len() == 3)
            .ok_or_else(|| self.invalid(name, "an array of 3 numbers", fragment(&value)))?;
        Ok([components[0], components[1], components[2]])
    }

    /// A list of points, each an array of numbers.
    pub fn points(&mut self, name: &str) -> Result<Vec<Vec<f64>>, BuildError> {
        let value = self.value(name)?.ok_or_else(|| self.missing(name))?;
        number_rows(&value)
            .ok_or_else(|| self.invalid(name, "an array of number arrays", fragment(&value)))
    }

    /// A nested scene object (not a material).
    pub fn object(&mut self, name: &str) -> Result<Box<dyn SceneObject>, BuildError> {
        match self.take(name)? {
            None => Err(self.missing(name)),
            Some(Arg::Node(Node::Object(object))) => Ok(object),
            Some(other) => Err(self.invalid(name, "a scene object description", other.fragment())),
        }
    }

    /// A material given by value (nested description) or by name.
    ///
    /// Falls back to `default` when absent. Name references must resolve
    /// against the materials table now; they never dangle.
    pub fn material_or(
        &mut self,
        name: &str,
        class: MaterialClass,
        default: impl FnOnce() -> Material,
    ) -> Result<Arc<Material>, BuildError> {
        let material = match self.take(name)? {
            None => return Ok(Arc::new(default())),
            Some(Arg::Node(Node::Material(material))) => material,
            Some(Arg::Value(Value::String(reference))) => self
                .materials
                .get(&reference)
                .cloned()
                .ok_or(BuildError::UnresolvedMaterial { name: reference })?,
            Some(other) => {
                return Err(self.invalid(
                    name,
                    "a material description or material name",
                    other.fragment(),
                ));
            }
        };

        if material.class() != class {
            return Err(self.invalid(name, class.label(), fragment(&material.to_value())));
        }
        Ok(material)
    }

    /// Ensure every argument was consumed.
    pub fn finish(&mut self) -> Result<(), BuildError> {
        if !self.positional.is_empty() {
            return Err(BuildError::TooManyPositional {
                type_name: self.type_name.to_string(),
                accepted: self.given_positional - self.positional.len(),
                given: self.given_positional,
            });
        }
        if let Some((name, _)) = self.named.first() {
            return Err(BuildError::UnexpectedArgument {
                type_name: self.type_name.to_string(),
                name: name.clone(),
            });
        }
        Ok(())
    }

    fn missing(&self, name: &str) -> BuildError {
        BuildError::MissingArgument {
            type_name: self.type_name.to_string(),
            name: name.to_string(),
        }
    }

    fn invalid(&self, name: &str, expected: &'static str, fragment: String) -> BuildError {
        BuildError::InvalidArgument {
            type_name: self.type_name.to_string(),
            name: name.to_string(),
            expected,
            fragment,
        }
    }
}

/// `[1, 2.5, 3]` → `vec![1.0, 2.5, 3.0]`.
pub fn number_row(value: &Value) -> Option<Vec<f64>> {
    value
        .as_array()?
        .iter()
        .map(|v| v.as_f64().filter(|f| f.is_finite()))
        .collect()
}

/// `[[1, 2], [3, 4]]` → rows of numbers.
pub fn number_rows(value: &Value) -> Option<Vec<Vec<f64>>> {
    value.as_array()?.iter().map(number_row).collect()
}
