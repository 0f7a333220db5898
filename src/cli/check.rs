//! `volum check`: build a scene file once and report what it contains.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use indexmap::IndexMap;

use crate::config::RuntimeConfig;
use crate::log;
use crate::scene::{PluginCatalog, Scene, SceneDescription};
use crate::utils::plural::plural_count;

/// What a successfully built scene file holds.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckSummary {
    pub plugins: Vec<&'static str>,
    pub objects: usize,
    pub materials: usize,
    /// Object count per type, in first-seen order.
    pub types: IndexMap<&'static str, usize>,
}

/// Load and build `path` the way the server would.
pub fn check_file(path: &Path) -> Result<CheckSummary> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("Failed to read `{}`", path.display()))?;
    let description = SceneDescription::parse(&text)
        .with_context(|| format!("Invalid scene description in `{}`", path.display()))?;

    let mut scene = Scene::new();
    let objects = scene.load_description(&description, &PluginCatalog::builtin())?;

    let mut types = IndexMap::new();
    for (_, object) in scene.objects() {
        *types.entry(object.type_name()).or_insert(0) += 1;
    }

    Ok(CheckSummary {
        plugins: scene.plugin_names(),
        objects,
        materials: scene.material_count(),
        types,
    })
}

pub fn run_check(config: &RuntimeConfig) -> Result<()> {
    let path = &config.scene_path;
    let summary = check_file(path)?;

    log!(
        "check";
        "{}: {}, {}",
        path.display(),
        plural_count(summary.objects, "object"),
        plural_count(summary.materials, "material")
    );
    log!("check"; "plugins: {}", summary.plugins.join(", "));
    for (type_name, count) in &summary.types {
        println!("  {type_name:<16} {count}");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_check_file_summary() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("scene.json");
        fs::write(
            &path,
            r#"{
                "plugins": ["LightsPlugin"],
                "objects": [
                    {"type": "StandardMaterial", "name": "red", "color": "red"},
                    {"type": "Sphere", "radius": 1, "material": "red"},
                    {"type": "Sphere", "radius": 2},
                    {"type": "PointLight", "intensity": 1.5}
                ]
            }"#,
        )
        .unwrap();

        let summary = check_file(&path).unwrap();
        assert_eq!(summary.objects, 3);
        assert_eq!(summary.materials, 1);
        assert_eq!(summary.types.get("Sphere"), Some(&2));
        assert_eq!(summary.types.get("PointLight"), Some(&1));
        assert_eq!(summary.plugins.last(), Some(&"LightsPlugin"));
    }

    #[test]
    fn test_check_file_reports_build_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("scene.json");
        fs::write(&path, r#"[{"type": "Sphere", "radius": "big"}]"#).unwrap();

        let err = check_file(&path).unwrap_err();
        assert!(err.to_string().contains("object #0"), "{err}");
    }

    #[test]
    fn test_check_file_missing() {
        let err = check_file(Path::new("/surely/not/here.json")).unwrap_err();
        assert!(err.to_string().contains("Failed to read"));
    }
}
