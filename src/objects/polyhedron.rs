use std::sync::Arc;

use serde_json::{Value, json};

use super::positive;
use crate::scene::{Args, BuildError, Material, MaterialClass, Node, SceneObject};

/// The regular solids registered by the polyhedra plugin.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PolyhedronKind {
    Tetrahedron,
    Octahedron,
    Dodecahedron,
    Icosahedron,
}

impl PolyhedronKind {
    pub fn type_name(self) -> &'static str {
        match self {
            Self::Tetrahedron => "Tetrahedron",
            Self::Octahedron => "Octahedron",
            Self::Dodecahedron => "Dodecahedron",
            Self::Icosahedron => "Icosahedron",
        }
    }
}

/// A regular polyhedron inscribed in a sphere of `radius`.
///
/// `detail` > 0 subdivides faces on the viewer side.
#[derive(Debug, Clone)]
pub struct Polyhedron {
    pub kind: PolyhedronKind,
    pub radius: f64,
    pub detail: u32,
    pub material: Arc<Material>,
}

impl Polyhedron {
    fn construct_kind(kind: PolyhedronKind, args: &mut Args<'_>) -> Result<Node, BuildError> {
        let radius = args.f64("radius")?;
        let radius = positive(args, "radius", radius)?;
        let detail = args.u32_or("detail", 0)?;
        let material = args.material_or("material", MaterialClass::Mesh, Material::standard)?;
        Ok(Self {
            kind,
            radius,
            detail,
            material,
        }
        .into())
    }

    pub fn construct_tetrahedron(args: &mut Args<'_>) -> Result<Node, BuildError> {
        Self::construct_kind(PolyhedronKind::Tetrahedron, args)
    }

    pub fn construct_octahedron(args: &mut Args<'_>) -> Result<Node, BuildError> {
        Self::construct_kind(PolyhedronKind::Octahedron, args)
    }

    pub fn construct_dodecahedron(args: &mut Args<'_>) -> Result<Node, BuildError> {
        Self::construct_kind(PolyhedronKind::Dodecahedron, args)
    }

    pub fn construct_icosahedron(args: &mut Args<'_>) -> Result<Node, BuildError> {
        Self::construct_kind(PolyhedronKind::Icosahedron, args)
    }
}

impl SceneObject for Polyhedron {
    fn type_name(&self) -> &'static str {
        self.kind.type_name()
    }

    fn to_value(&self) -> Value {
        json!({
            "type": self.kind.type_name(),
            "radius": self.radius,
            "detail": self.detail,
            "material": self.material.to_value(),
        })
    }

    fn material(&self) -> Option<&Arc<Material>> {
        Some(&self.material)
    }

    fn as_any(&self) -> &dyn std::any::Any {
        self
    }
}
