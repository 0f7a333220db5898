use serde_json::{Value, json};

use super::polyhedron::PolyhedronKind;
use super::*;
use crate::scene::{
    BuildError, MaterialTable, Node, ObjectBuilder, PluginCatalog, SceneObject, TypeRegistry,
};

fn registry() -> TypeRegistry {
    let mut registry = TypeRegistry::new();
    for plugin in PluginCatalog::builtin().iter() {
        plugin.register(&mut registry);
    }
    registry
}

fn build(value: &Value) -> Result<Node, BuildError> {
    let registry = registry();
    let materials = MaterialTable::default();
    ObjectBuilder::new(&registry, &materials).build(value)
}

/// One description per registered type.
fn samples() -> Vec<Value> {
    vec![
        json!({"type": "Box", "width": 1, "height": 2, "depth": 3}),
        json!({"type": "Sphere", "radius": 1.5, "width_segments": 8}),
        json!({"type": "Plane", "normal": [0, 1, 0]}),
        json!({"type": "Cylinder", "radius_top": 0, "radius_bottom": 1, "height": 2}),
        json!({"type": "Line", "points": [[0, 0], [1, 1], [2, 0]]}),
        json!({"type": "Transform", "rotation": [0, 1.57, 0],
               "object": {"type": "Box", "args": [1, 1, 1]}}),
        json!({"type": "BasicMaterial", "wireframe": true}),
        json!({"type": "StandardMaterial", "roughness": 0.1}),
        json!({"type": "PhongMaterial", "shininess": 80}),
        json!({"type": "LineBasicMaterial", "width": 2}),
        json!({"type": "LineDashedMaterial", "dash_size": 0.5}),
        json!({"type": "PointLight", "intensity": 3, "color": "#ffeedd"}),
        json!({"type": "Volume", "args": [1, 1, 1, "brain.nii"]}),
        json!({"type": "PlotImage", "x": [[0, 1]], "y": [[1, 0]], "double_sided": true}),
        json!({"type": "Tetrahedron", "radius": 1}),
        json!({"type": "Octahedron", "radius": 1, "detail": 2}),
        json!({"type": "Dodecahedron", "radius": 2}),
        json!({"type": "Icosahedron", "radius": 3,
               "material": {"type": "BasicMaterial", "color": "#000000"}}),
    ]
}

#[test]
fn test_samples_cover_registry() {
    let registry = registry();
    let mut covered: Vec<_> = samples()
        .iter()
        .map(|v| v["type"].as_str().unwrap().to_string())
        .collect();
    covered.sort();
    assert_eq!(covered, registry.type_names());
}

#[test]
fn test_round_trip_every_type() {
    for sample in samples() {
        let first = build(&sample).unwrap_or_else(|e| panic!("{sample}: {e}"));
        let value = first.to_value();
        assert_eq!(value["type"], sample["type"]);

        let second = build(&value).unwrap_or_else(|e| panic!("{value}: {e}"));
        assert_eq!(second.to_value(), value, "round trip changed {}", sample["type"]);
    }
}

#[test]
fn test_line_rejects_single_point() {
    let err = build(&json!({"type": "Line", "points": [[0, 0, 0]]})).unwrap_err();
    assert!(matches!(err, BuildError::InvalidArgument { .. }));
}

#[test]
fn test_line_rejects_mixed_dimensions() {
    let err = build(&json!({"type": "Line", "points": [[0, 0, 0], [1, 1]]})).unwrap_err();
    assert!(matches!(err, BuildError::InvalidArgument { .. }));
}

#[test]
fn test_line_defaults_to_line_material() {
    let node = build(&json!({"type": "Line", "points": [[0, 0], [3, 4], [3, 5]]})).unwrap();
    let object = node.into_object().unwrap();
    let line = object.downcast_ref::<Line>().unwrap();
    assert_eq!(line.points.len(), 3);
    assert_eq!(line.material.type_name(), "LineBasicMaterial");
}

#[test]
fn test_cylinder_rejects_zero_radii() {
    let err = build(&json!({
        "type": "Cylinder", "radius_top": 0, "radius_bottom": 0, "height": 1
    }))
    .unwrap_err();
    assert!(matches!(err, BuildError::InvalidArgument { .. }));
}

#[test]
fn test_plane_rejects_zero_normal() {
    let err = build(&json!({"type": "Plane", "normal": [0, 0, 0]})).unwrap_err();
    assert!(matches!(err, BuildError::InvalidArgument { .. }));
}

#[test]
fn test_polyhedron_type_names() {
    let node = build(&json!({"type": "Dodecahedron", "radius": 1})).unwrap();
    let object = node.into_object().unwrap();
    assert_eq!(object.type_name(), "Dodecahedron");
    let polyhedron = object.downcast_ref::<Polyhedron>().unwrap();
    assert_eq!(polyhedron.kind, PolyhedronKind::Dodecahedron);
    assert_eq!(polyhedron.detail, 0);
}

#[test]
fn test_point_light_defaults() {
    let node = build(&json!({"type": "PointLight", "args": [2]})).unwrap();
    let object = node.into_object().unwrap();
    let light = object.downcast_ref::<PointLight>().unwrap();
    assert_eq!(light.color, "white");
    assert!(light.material().is_none());
}

#[test]
fn test_plot_keeps_every_axes_entry() {
    let description = json!({
        "type": "PlotImage",
        "x": [[0, 1], [0, 2]],
        "y": [[1, 0], [2, 0]],
        "metadata": {"axes": [
            {"title": "left", "xlabel": "t", "ylabel": "a"},
            {"title": "right", "xlabel": "t", "ylabel": "b", "ylim": [0, 2]}
        ]}
    });
    let object = build(&description).unwrap().into_object().unwrap();
    let plot = object.downcast_ref::<PlotImage>().unwrap();
    assert_eq!(plot.axes.len(), 2);
    assert_eq!(plot.axes[1].ylim, Some([0.0, 2.0]));

    let value = object.to_value();
    let axes = value["metadata"]["axes"].as_array().unwrap();
    assert_eq!(axes.len(), 2);
    assert_eq!(axes[0]["title"], "left");
    assert_eq!(axes[1]["title"], "right");

    let rebuilt = build(&value).unwrap().into_object().unwrap();
    assert_eq!(rebuilt.to_value(), value);
}
