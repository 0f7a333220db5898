//! Mesh primitives: box, sphere, plane, cylinder.

use std::sync::Arc;

use serde_json::{Value, json};

use super::positive;
use crate::scene::{Args, BuildError, Material, MaterialClass, Node, SceneObject};

fn mesh_material(args: &mut Args<'_>) -> Result<Arc<Material>, BuildError> {
    args.material_or("material", MaterialClass::Mesh, Material::standard)
}

// ============================================================================
// Box
// ============================================================================

/// Axis-aligned box. Registered as `Box`.
#[derive(Debug, Clone)]
pub struct BoxShape {
    pub width: f64,
    pub height: f64,
    pub depth: f64,
    pub material: Arc<Material>,
}

impl BoxShape {
    pub fn construct(args: &mut Args<'_>) -> Result<Node, BuildError> {
        let width = args.f64("width")?;
        let width = positive(args, "width", width)?;
        let height = args.f64("height")?;
        let height = positive(args, "height", height)?;
        let depth = args.f64("depth")?;
        let depth = positive(args, "depth", depth)?;
        let material = mesh_material(args)?;
        Ok(Self {
            width,
            height,
            depth,
            material,
        }
        .into())
    }
}

impl SceneObject for BoxShape {
    scene_object_common!("Box");

    fn to_value(&self) -> Value {
        json!({
            "type": "Box",
            "width": self.width,
            "height": self.height,
            "depth": self.depth,
            "material": self.material.to_value(),
        })
    }

    fn material(&self) -> Option<&Arc<Material>> {
        Some(&self.material)
    }
}

// ============================================================================
// Sphere
// ============================================================================

#[derive(Debug, Clone)]
pub struct Sphere {
    pub radius: f64,
    pub width_segments: u32,
    pub height_segments: u32,
    pub material: Arc<Material>,
}

impl Sphere {
    pub fn construct(args: &mut Args<'_>) -> Result<Node, BuildError> {
        let radius = args.f64("radius")?;
        let radius = positive(args, "radius", radius)?;
        let width_segments = args.u32_or("width_segments", 32)?;
        let height_segments = args.u32_or("height_segments", 16)?;
        let material = mesh_material(args)?;
        Ok(Self {
            radius,
            width_segments,
            height_segments,
            material,
        }
        .into())
    }
}

impl SceneObject for Sphere {
    scene_object_common!("Sphere");

    fn to_value(&self) -> Value {
        json!({
            "type": "Sphere",
            "radius": self.radius,
            "width_segments": self.width_segments,
            "height_segments": self.height_segments,
            "material": self.material.to_value(),
        })
    }

    fn material(&self) -> Option<&Arc<Material>> {
        Some(&self.material)
    }
}

// ============================================================================
// Plane
// ============================================================================

/// Infinite plane through `position` with the given `normal`.
#[derive(Debug, Clone)]
pub struct Plane {
    pub position: [f64; 3],
    pub normal: [f64; 3],
    pub material: Arc<Material>,
}

impl Plane {
    pub fn construct(args: &mut Args<'_>) -> Result<Node, BuildError> {
        let position = args.vec3_or("position", [0.0, 0.0, 0.0])?;
        let normal = args.vec3_or("normal", [0.0, 0.0, 1.0])?;
        if normal.iter().all(|c| *c == 0.0) {
            return Err(BuildError::InvalidArgument {
                type_name: args.type_name().to_string(),
                name: "normal".into(),
                expected: "a non-zero vector",
                fragment: "[0,0,0]".into(),
            });
        }
        let material = mesh_material(args)?;
        Ok(Self {
            position,
            normal,
            material,
        }
        .into())
    }
}

impl SceneObject for Plane {
    scene_object_common!("Plane");

    fn to_value(&self) -> Value {
        json!({
            "type": "Plane",
            "position": self.position,
            "normal": self.normal,
            "material": self.material.to_value(),
        })
    }

    fn material(&self) -> Option<&Arc<Material>> {
        Some(&self.material)
    }
}

// ============================================================================
// Cylinder
// ============================================================================

/// Cylinder or truncated cone (`radius_top != radius_bottom`).
#[derive(Debug, Clone)]
pub struct Cylinder {
    pub radius_top: f64,
    pub radius_bottom: f64,
    pub height: f64,
    pub radial_segments: u32,
    pub material: Arc<Material>,
}

impl Cylinder {
    pub fn construct(args: &mut Args<'_>) -> Result<Node, BuildError> {
        let radius_top = args.f64("radius_top")?;
        let radius_bottom = args.f64("radius_bottom")?;
        let height = args.f64("height")?;
        let height = positive(args, "height", height)?;
        let radial_segments = args.u32_or("radial_segments", 64)?;
        let material = mesh_material(args)?;

        if radius_top < 0.0 || radius_bottom < 0.0 || radius_top + radius_bottom == 0.0 {
            return Err(BuildError::InvalidArgument {
                type_name: args.type_name().to_string(),
                name: "radius_top".into(),
                expected: "non-negative radii, not both zero",
                fragment: format!("[{radius_top}, {radius_bottom}]"),
            });
        }

        Ok(Self {
            radius_top,
            radius_bottom,
            height,
            radial_segments,
            material,
        }
        .into())
    }
}

impl SceneObject for Cylinder {
    scene_object_common!("Cylinder");

    fn to_value(&self) -> Value {
        json!({
            "type": "Cylinder",
            "radius_top": self.radius_top,
            "radius_bottom": self.radius_bottom,
            "height": self.height,
            "radial_segments": self.radial_segments,
            "material": self.material.to_value(),
        })
    }

    fn material(&self) -> Option<&Arc<Material>> {
        Some(&self.material)
    }
}
