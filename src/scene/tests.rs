use std::sync::atomic::{AtomicUsize, Ordering};

use serde_json::json;
use tempfile::TempDir;

use super::*;
use crate::objects::Sphere;

static COUNTING_CALLS: AtomicUsize = AtomicUsize::new(0);

struct Counting;

impl Plugin for Counting {
    fn name(&self) -> &'static str {
        "CountingPlugin"
    }

    fn description(&self) -> &'static str {
        "counts register calls"
    }

    fn register(&self, _registry: &mut TypeRegistry) {
        COUNTING_CALLS.fetch_add(1, Ordering::SeqCst);
    }
}

fn description(value: Value) -> SceneDescription {
    SceneDescription::from_value(value).unwrap()
}

#[test]
fn test_new_loads_base_plugins() {
    let scene = Scene::new();
    assert_eq!(
        scene.plugin_names(),
        vec!["BaseShapesPlugin", "BaseMaterialsPlugin"]
    );
    assert!(scene.registry().contains("Sphere"));
    assert!(scene.registry().contains("StandardMaterial"));
    assert!(!scene.registry().contains("PointLight"));
}

#[test]
fn test_load_plugin_idempotent() {
    let mut scene = Scene::empty();
    assert!(scene.load_plugin(Box::new(Counting)));
    assert!(!scene.load_plugin(Box::new(Counting)));
    assert_eq!(scene.plugin_names(), vec!["CountingPlugin"]);
    assert_eq!(COUNTING_CALLS.load(Ordering::SeqCst), 1);
}

#[test]
fn test_load_plugins_skips_unknown() {
    let mut scene = Scene::new();
    scene.load_plugins(&PluginCatalog::builtin(), &["LightsPlugin", "Bogus", "LightsPlugin"]);
    assert_eq!(
        scene.plugin_names(),
        vec!["BaseShapesPlugin", "BaseMaterialsPlugin", "LightsPlugin"]
    );
}

#[test]
fn test_add_assigns_ids() {
    let mut scene = Scene::new();
    let first = scene.add_typed("Sphere", json!({"radius": 1}).as_object().unwrap().clone());
    let second = scene.add_typed("Sphere", json!({"radius": 2}).as_object().unwrap().clone());

    let (Ok(Added::Object(first)), Ok(Added::Object(second))) = (first, second) else {
        panic!("expected objects");
    };
    assert!(first.as_str().starts_with("0-"));
    assert!(second.as_str().starts_with("1-"));
    assert_eq!(scene.len(), 2);

    let sphere = scene.get(&second).unwrap().downcast_ref::<Sphere>().unwrap();
    assert_eq!(sphere.radius, 2.0);
}

#[test]
fn test_add_typed_error() {
    let mut scene = Scene::new();
    let err = scene.add_typed("Nope", Map::new()).unwrap_err();
    assert!(matches!(err, SceneError::Construct(BuildError::UnknownType { .. })));
    assert!(scene.is_empty());
}

#[test]
fn test_add_material_naming() {
    let mut scene = Scene::new();
    let named = scene.add(Node::Material(Arc::new(Material::standard().named("steel"))));
    let unnamed = scene.add(Node::Material(Arc::new(Material::basic())));
    assert_eq!(named, Added::Material("steel".into()));
    assert_eq!(unnamed, Added::Material("BasicMaterial-1".into()));
    assert!(scene.material("steel").is_some());
    assert_eq!(scene.material_count(), 2);
}

#[test]
fn test_serialize_shape() {
    let mut scene = Scene::new();
    scene.add(Node::Material(Arc::new(Material::standard().named("steel"))));
    let sphere = scene.build(&json!({"type": "Sphere", "radius": 1, "material": "steel"})).unwrap();
    scene.add(sphere);

    let value = scene.serialize();
    assert_eq!(value["plugins"], json!(["BaseShapesPlugin", "BaseMaterialsPlugin"]));

    let objects = value["objects"].as_array().unwrap();
    assert_eq!(objects.len(), 2);
    // objects first, then materials
    assert_eq!(objects[0]["type"], "Sphere");
    assert!(objects[0]["id"].as_str().unwrap().starts_with("0-"));
    assert_eq!(objects[0]["material"]["name"], "steel");
    assert_eq!(objects[1]["type"], "StandardMaterial");
    assert_eq!(objects[1]["name"], "steel");

    // `id` comes first
    let first_key = objects[0].as_object().unwrap().keys().next().unwrap();
    assert_eq!(first_key, "id");
}

#[test]
fn test_clear_idempotent() {
    let mut scene = Scene::new();
    scene.add(Node::Material(Arc::new(Material::basic())));
    scene
        .add_typed("Sphere", json!({"radius": 1}).as_object().unwrap().clone())
        .unwrap();

    scene.clear();
    scene.clear();
    assert!(scene.is_empty());
    assert_eq!(scene.material_count(), 0);
    assert_eq!(scene.plugin_names().len(), 2);
}

#[test]
fn test_save_writes_pretty_json() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("scene.json");

    let mut scene = Scene::new();
    scene
        .add_typed("Sphere", json!({"radius": 1}).as_object().unwrap().clone())
        .unwrap();
    scene.save(&path).unwrap();

    let text = std::fs::read_to_string(&path).unwrap();
    assert!(text.contains('\n'));
    let value: Value = serde_json::from_str(&text).unwrap();
    assert_eq!(value, scene.serialize());
}

#[test]
fn test_save_to_missing_dir_fails() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("missing").join("scene.json");
    let err = Scene::new().save(&path).unwrap_err();
    assert!(matches!(err, SceneError::Save(..)));
}

// ============================================================================
// load_description
// ============================================================================

#[test]
fn test_load_description_resolves_earlier_materials() {
    let mut scene = Scene::new();
    let count = scene
        .load_description(
            &description(json!([
                {"type": "PhongMaterial", "name": "shiny"},
                {"type": "Sphere", "radius": 1, "material": "shiny"}
            ])),
            &PluginCatalog::builtin(),
        )
        .unwrap();
    assert_eq!(count, 1);
    assert_eq!(scene.material_count(), 1);
    let (_, sphere) = scene.objects().next().unwrap();
    assert_eq!(sphere.material().unwrap().type_name(), "PhongMaterial");
}

#[test]
fn test_load_description_all_or_nothing() {
    let mut scene = Scene::new();
    let catalog = PluginCatalog::builtin();
    scene
        .load_description(&description(json!([{"type": "Sphere", "radius": 1}])), &catalog)
        .unwrap();
    let before = scene.serialize();

    let err = scene
        .load_description(
            &description(json!([
                {"type": "Sphere", "radius": 5},
                {"type": "Sphere", "radius": 6},
                {"type": "Sphre", "radius": 7}
            ])),
            &catalog,
        )
        .unwrap_err();
    assert!(matches!(err, SceneError::Build { index: 2, .. }));
    assert_eq!(scene.serialize(), before);
}

#[test]
fn test_load_description_loads_plugins() {
    let mut scene = Scene::new();
    scene
        .load_description(
            &description(json!({
                "plugins": ["LightsPlugin"],
                "objects": [{"type": "PointLight", "intensity": 2}]
            })),
            &PluginCatalog::builtin(),
        )
        .unwrap();
    assert!(scene.plugin_names().contains(&"LightsPlugin"));
    assert_eq!(scene.len(), 1);
}

#[test]
fn test_serialize_round_trips() {
    let catalog = PluginCatalog::builtin();
    let mut scene = Scene::new();
    scene
        .load_description(
            &description(json!([
                {"type": "StandardMaterial", "name": "steel", "metalness": 0.9},
                {"type": "Transform", "position": [1, 2, 3],
                 "object": {"type": "Sphere", "radius": 2, "material": "steel"}},
                {"type": "LineDashedMaterial"}
            ])),
            &catalog,
        )
        .unwrap();
    let first = scene.serialize();

    let mut reloaded = Scene::new();
    reloaded
        .load_description(&SceneDescription::from_value(first.clone()).unwrap(), &catalog)
        .unwrap();
    let second = reloaded.serialize();

    let strip_ids = |value: &Value| -> Vec<Value> {
        value["objects"]
            .as_array()
            .unwrap()
            .iter()
            .map(|o| strip_id(o).into_owned())
            .collect()
    };
    assert_eq!(strip_ids(&first), strip_ids(&second));
    assert_eq!(first["plugins"], second["plugins"]);
}
