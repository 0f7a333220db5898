//! Scene model: registry, plugins, builder and the scene itself.
//!
//! # Architecture
//!
//! ```text
//! Plugin ──register──► TypeRegistry ──lookup──► ObjectBuilder
//!                                                    │
//!                     JSON description ──────────────┘
//!                                                    ▼
//!                                        Node (object | material)
//!                                                    │
//!                                                    ▼
//!                          Scene { objects, materials, plugins }
//! ```
//!
//! The scene is owned by exactly one task (the sync coordinator); nothing
//! here is shared or locked.

mod builder;
mod description;
mod error;
pub mod material;
mod object;
mod plugin;
mod registry;

pub use builder::{Args, ObjectBuilder, RawContext};
pub use description::SceneDescription;
pub use error::{BuildError, SceneError};
pub use material::{Material, MaterialClass, MaterialTable};
pub use object::{Node, ObjectId, SceneObject};
pub use plugin::{Plugin, PluginCatalog};
pub use registry::{Factory, TypeRegistry};

use std::path::Path;
use std::sync::Arc;

use indexmap::IndexMap;
use serde_json::{Map, Value, json};

use crate::plugins::{BaseMaterials, BaseShapes};
use crate::{debug, log};

/// What [`Scene::add`] inserted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Added {
    Object(ObjectId),
    Material(String),
}

pub struct Scene {
    registry: TypeRegistry,
    plugins: IndexMap<&'static str, Box<dyn Plugin>>,
    objects: IndexMap<ObjectId, Box<dyn SceneObject>>,
    materials: MaterialTable,
}

impl Default for Scene {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for Scene {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Scene")
            .field("plugins", &self.plugin_names())
            .field("objects", &self.objects.len())
            .field("materials", &self.materials.len())
            .finish()
    }
}

impl Scene {
    /// A scene with the base shapes and base materials loaded.
    pub fn new() -> Self {
        let mut scene = Self::empty();
        scene.load_plugin(Box::new(BaseShapes));
        scene.load_plugin(Box::new(BaseMaterials));
        scene
    }

    /// A scene with no plugins at all.
    pub fn empty() -> Self {
        Self {
            registry: TypeRegistry::new(),
            plugins: IndexMap::new(),
            objects: IndexMap::new(),
            materials: MaterialTable::default(),
        }
    }

    // ------------------------------------------------------------------------
    // Plugins
    // ------------------------------------------------------------------------

    /// Load a plugin. Returns `false` if one with the same name is already
    /// loaded, in which case `register` is not called again.
    pub fn load_plugin(&mut self, plugin: Box<dyn Plugin>) -> bool {
        let name = plugin.name();
        if self.plugins.contains_key(name) {
            return false;
        }
        plugin.register(&mut self.registry);
        debug!("scene"; "loaded plugin {}", name);
        self.plugins.insert(name, plugin);
        true
    }

    /// Load plugins by name from `catalog`. Unknown names are skipped with a
    /// warning.
    pub fn load_plugins<S: AsRef<str>>(&mut self, catalog: &PluginCatalog, names: &[S]) {
        for name in names {
            let name = name.as_ref();
            match catalog.create(name) {
                Some(plugin) => {
                    self.load_plugin(plugin);
                }
                None => log!("scene"; "unknown plugin `{}`, skipping", name),
            }
        }
    }

    pub fn plugin_names(&self) -> Vec<&'static str> {
        self.plugins.keys().copied().collect()
    }

    pub fn registry(&self) -> &TypeRegistry {
        &self.registry
    }

    // ------------------------------------------------------------------------
    // Contents
    // ------------------------------------------------------------------------

    /// Build a description against this scene's registry and materials.
    pub fn build(&self, value: &Value) -> Result<Node, BuildError> {
        ObjectBuilder::new(&self.registry, &self.materials).build(value)
    }

    /// Insert a built node.
    pub fn add(&mut self, node: Node) -> Added {
        match node {
            Node::Object(object) => {
                Added::Object(insert_object(&mut self.objects, object))
            }
            Node::Material(material) => {
                Added::Material(insert_material(&mut self.materials, material))
            }
        }
    }

    /// Build `type_name` from named fields and insert it.
    pub fn add_typed(
        &mut self,
        type_name: &str,
        fields: Map<String, Value>,
    ) -> Result<Added, SceneError> {
        let mut description = Map::with_capacity(fields.len() + 1);
        description.insert("type".into(), json!(type_name));
        description.extend(fields);
        let node = self.build(&Value::Object(description))?;
        Ok(self.add(node))
    }

    pub fn get(&self, id: &ObjectId) -> Option<&dyn SceneObject> {
        self.objects.get(id).map(|object| object.as_ref())
    }

    pub fn objects(&self) -> impl Iterator<Item = (&ObjectId, &dyn SceneObject)> {
        self.objects.iter().map(|(id, object)| (id, object.as_ref()))
    }

    pub fn material(&self, name: &str) -> Option<&Arc<Material>> {
        self.materials.get(name)
    }

    pub fn len(&self) -> usize {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    pub fn material_count(&self) -> usize {
        self.materials.len()
    }

    /// Remove all objects and materials. Plugins and registry stay.
    pub fn clear(&mut self) {
        self.objects.clear();
        self.materials.clear();
    }

    /// Replace the contents with `description`, all-or-nothing.
    ///
    /// Requested plugins are loaded first and stay loaded even if a build
    /// fails. Objects are built in order into a staging area, so material
    /// names resolve against materials declared earlier in the same file.
    /// Top-level `id` fields are ignored; objects always get fresh ids.
    pub fn load_description(
        &mut self,
        description: &SceneDescription,
        catalog: &PluginCatalog,
    ) -> Result<usize, SceneError> {
        self.load_plugins(catalog, description.plugins.as_slice());

        let mut objects = IndexMap::with_capacity(description.objects.len());
        let mut materials = MaterialTable::default();

        for (index, value) in description.objects.iter().enumerate() {
            let node = ObjectBuilder::new(&self.registry, &materials)
                .build(&strip_id(value))
                .map_err(|source| SceneError::Build { index, source })?;
            match node {
                Node::Object(object) => {
                    insert_object(&mut objects, object);
                }
                Node::Material(material) => {
                    insert_material(&mut materials, material);
                }
            }
        }

        self.objects = objects;
        self.materials = materials;
        Ok(self.objects.len())
    }

    // ------------------------------------------------------------------------
    // Serialization
    // ------------------------------------------------------------------------

    /// `{"plugins": [...], "objects": [objects..., materials...]}`.
    ///
    /// Objects carry their `id`; materials carry their table key as `name`,
    /// so the output loads back into an equivalent scene.
    pub fn serialize(&self) -> Value {
        let objects = self
            .objects
            .iter()
            .map(|(id, object)| with_leading(id.as_str(), "id", object.to_value()));
        let materials = self
            .materials
            .iter()
            .map(|(name, material)| with_leading(name, "name", material.to_value()));

        json!({
            "plugins": self.plugin_names(),
            "objects": objects.chain(materials).collect::<Vec<_>>(),
        })
    }

    /// Write [`serialize`](Self::serialize) as pretty JSON.
    pub fn save(&self, path: &Path) -> Result<(), SceneError> {
        let text = serde_json::to_string_pretty(&self.serialize())
            .map_err(|e| SceneError::Save(path.to_path_buf(), e.into()))?;
        std::fs::write(path, text).map_err(|e| SceneError::Save(path.to_path_buf(), e))
    }
}

fn insert_object(
    objects: &mut IndexMap<ObjectId, Box<dyn SceneObject>>,
    object: Box<dyn SceneObject>,
) -> ObjectId {
    let id = ObjectId::generate(objects.len());
    objects.insert(id.clone(), object);
    id
}

/// Key a material by its declared name, or `"<Type>-<n>"` if unnamed.
fn insert_material(materials: &mut MaterialTable, material: Arc<Material>) -> String {
    let key = match &material.name {
        Some(name) => name.clone(),
        None => {
            let mut n = materials.len();
            loop {
                let candidate = format!("{}-{}", material.type_name(), n);
                if !materials.contains_key(&candidate) {
                    break candidate;
                }
                n += 1;
            }
        }
    };
    materials.insert(key.clone(), material);
    key
}

/// Drop a top-level `id` field.
fn strip_id(value: &Value) -> std::borrow::Cow<'_, Value> {
    use std::borrow::Cow;
    match value {
        Value::Object(fields) if fields.contains_key("id") => {
            let mut fields = fields.clone();
            fields.shift_remove("id");
            Cow::Owned(Value::Object(fields))
        }
        _ => Cow::Borrowed(value),
    }
}

/// Put `key: text` first in a JSON object (replacing any existing entry).
fn with_leading(text: &str, key: &str, value: Value) -> Value {
    let Value::Object(fields) = value else {
        return value;
    };
    let mut out = Map::with_capacity(fields.len() + 1);
    out.insert(key.to_string(), json!(text));
    for (k, v) in fields {
        if k != key {
            out.insert(k, v);
        }
    }
    Value::Object(out)
}

#[cfg(test)]
mod tests;
