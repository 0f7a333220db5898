//! Scene object abstraction and identifiers.

use std::any::Any;
use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::material::Material;

/// Identifier assigned by the Scene on insertion: `"<index>-<uuid>"`.
///
/// The uuid suffix keeps ids from colliding across reloads, where the
/// index restarts at zero.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ObjectId(String);

impl ObjectId {
    /// Create a fresh id for the object at `index`.
    pub fn generate(index: usize) -> Self {
        Self(format!("{}-{}", index, uuid::Uuid::new_v4()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Index prefix of the id.
    pub fn index(&self) -> Option<usize> {
        self.0.split_once('-')?.0.parse().ok()
    }
}

impl fmt::Display for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// An entity that can live in a [`Scene`](super::Scene).
///
/// Implementations serialize themselves to a JSON object tagged with their
/// registered type name under `type`, so that the output can be fed back
/// through the [`ObjectBuilder`](super::ObjectBuilder).
pub trait SceneObject: fmt::Debug + Send {
    /// Registered type name (the `type` tag).
    fn type_name(&self) -> &'static str;

    /// JSON description of this object, including the `type` field.
    fn to_value(&self) -> Value;

    /// Shared material, for objects that carry one.
    fn material(&self) -> Option<&Arc<Material>> {
        None
    }

    fn as_any(&self) -> &dyn Any;
}

impl dyn SceneObject + '_ {
    /// Downcast to a concrete object type.
    pub fn downcast_ref<T: SceneObject + 'static>(&self) -> Option<&T> {
        self.as_any().downcast_ref::<T>()
    }
}

/// Result of building a description: either a scene object or a material.
#[derive(Debug)]
pub enum Node {
    Object(Box<dyn SceneObject>),
    Material(Arc<Material>),
}

impl Node {
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::Object(object) => object.type_name(),
            Self::Material(material) => material.type_name(),
        }
    }

    pub fn to_value(&self) -> Value {
        match self {
            Self::Object(object) => object.to_value(),
            Self::Material(material) => material.to_value(),
        }
    }

    pub fn into_object(self) -> Option<Box<dyn SceneObject>> {
        match self {
            Self::Object(object) => Some(object),
            Self::Material(_) => None,
        }
    }
}

impl<T: SceneObject + 'static> From<T> for Node {
    fn from(object: T) -> Self {
        Self::Object(Box::new(object))
    }
}
