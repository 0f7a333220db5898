//! Plugins: named bundles of type registrations.

use super::registry::TypeRegistry;

/// A named bundle of types.
///
/// `register` must only add entries to the registry; the scene guarantees it
/// is called at most once per plugin name.
pub trait Plugin: Send + Sync {
    fn name(&self) -> &'static str;

    fn description(&self) -> &'static str;

    fn register(&self, registry: &mut TypeRegistry);
}

type PluginCtor = fn() -> Box<dyn Plugin>;

/// Plugins that a scene file may request by name.
pub struct PluginCatalog {
    entries: Vec<(&'static str, PluginCtor)>,
}

impl PluginCatalog {
    /// Catalog with every built-in plugin.
    pub fn builtin() -> Self {
        use crate::plugins::*;

        fn boxed<P: Plugin + Default + 'static>() -> Box<dyn Plugin> {
            Box::new(P::default())
        }

        Self {
            entries: vec![
                (BaseShapes::NAME, boxed::<BaseShapes>),
                (BaseMaterials::NAME, boxed::<BaseMaterials>),
                (Lights::NAME, boxed::<Lights>),
                (Volumes::NAME, boxed::<Volumes>),
                (Plotting::NAME, boxed::<Plotting>),
                (Polyhedra::NAME, boxed::<Polyhedra>),
            ],
        }
    }

    pub fn create(&self, name: &str) -> Option<Box<dyn Plugin>> {
        self.entries
            .iter()
            .find(|(n, _)| *n == name)
            .map(|(_, ctor)| ctor())
    }

    pub fn iter(&self) -> impl Iterator<Item = Box<dyn Plugin>> + '_ {
        self.entries.iter().map(|(_, ctor)| ctor())
    }
}
