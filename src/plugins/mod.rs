//! Built-in plugins.
//!
//! | Plugin | Types |
//! |--------|-------|
//! | `BaseShapesPlugin` | Box, Sphere, Plane, Transform, Cylinder, Line |
//! | `BaseMaterialsPlugin` | Basic/Standard/Phong, LineBasic/LineDashed materials |
//! | `LightsPlugin` | PointLight |
//! | `VolumesPlugin` | Volume |
//! | `PlottingPlugin` | PlotImage |
//! | `PolyhedraPlugin` | Tetrahedron, Octahedron, Dodecahedron, Icosahedron |

use crate::objects::{
    BoxShape, Cylinder, Line, Plane, PlotImage, PointLight, Polyhedron, Sphere, Transform, Volume,
};
use crate::scene::material;
use crate::scene::{Factory, Plugin, TypeRegistry};

macro_rules! plugin {
    ($ty:ident, $name:literal, $description:literal, |$registry:ident| $body:block) => {
        #[derive(Debug, Default, Clone, Copy)]
        pub struct $ty;

        impl $ty {
            pub const NAME: &'static str = $name;
        }

        impl Plugin for $ty {
            fn name(&self) -> &'static str {
                Self::NAME
            }

            fn description(&self) -> &'static str {
                $description
            }

            fn register(&self, $registry: &mut TypeRegistry) $body
        }
    };
}

plugin!(
    BaseShapes,
    "BaseShapesPlugin",
    "Basic shapes: box, sphere, plane, cylinder, line and transform",
    |registry| {
        registry.register("Box", BoxShape::construct);
        registry.register("Sphere", Sphere::construct);
        registry.register("Plane", Plane::construct);
        registry.register("Transform", Transform::construct);
        registry.register("Cylinder", Cylinder::construct);
        registry.register("Line", Line::construct);
    }
);

plugin!(
    BaseMaterials,
    "BaseMaterialsPlugin",
    "Mesh and line materials",
    |registry| {
        registry.register("BasicMaterial", material::construct_basic);
        registry.register("StandardMaterial", material::construct_standard);
        registry.register("PhongMaterial", material::construct_phong);
        registry.register("LineBasicMaterial", material::construct_line_basic);
        registry.register("LineDashedMaterial", material::construct_line_dashed);
    }
);

plugin!(Lights, "LightsPlugin", "Point lights", |registry| {
    registry.register("PointLight", PointLight::construct);
});

plugin!(Volumes, "VolumesPlugin", "File-backed volumetric data", |registry| {
    registry.register("Volume", Volume::construct);
});

plugin!(Plotting, "PlottingPlugin", "2D plots placed in the scene", |registry| {
    registry.register_type("PlotImage", Factory::FromRaw(PlotImage::from_raw));
});

plugin!(
    Polyhedra,
    "PolyhedraPlugin",
    "Regular polyhedra",
    |registry| {
        registry.register("Tetrahedron", Polyhedron::construct_tetrahedron);
        registry.register("Octahedron", Polyhedron::construct_octahedron);
        registry.register("Dodecahedron", Polyhedron::construct_dodecahedron);
        registry.register("Icosahedron", Polyhedron::construct_icosahedron);
    }
);
