//! `volum plugins`: list the built-in plugin catalog.

use owo_colors::OwoColorize;

use crate::scene::{PluginCatalog, TypeRegistry};

/// `(plugin name, description, registered type names)` for every plugin.
pub fn catalog_listing(catalog: &PluginCatalog) -> Vec<(&'static str, &'static str, Vec<String>)> {
    catalog
        .iter()
        .map(|plugin| {
            let mut registry = TypeRegistry::new();
            plugin.register(&mut registry);
            let types = registry
                .type_names()
                .into_iter()
                .map(str::to_string)
                .collect();
            (plugin.name(), plugin.description(), types)
        })
        .collect()
}

pub fn run_plugins() {
    for (name, description, types) in catalog_listing(&PluginCatalog::builtin()) {
        println!("{} {}", name.bold(), description.dimmed());
        println!("  {}", types.join(", "));
    }
}
