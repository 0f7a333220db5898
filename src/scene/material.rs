//! Materials: named, shared appearance resources.
//!
//! A material is built like any other description (`{"type":
//! "StandardMaterial", "name": "steel", ...}`) and stored in the scene's
//! materials table. Objects refer to it by value or by name.

use std::sync::Arc;

use indexmap::IndexMap;
use serde_json::{Map, Value, json};

use super::builder::Args;
use super::error::BuildError;
use super::object::Node;

/// Default material color.
pub const DEFAULT_COLOR: &str = "#4ee050";
/// Default specular color of phong materials.
pub const SPECULAR_COLOR: &str = "#FFFFFF";

/// Scene materials by name, in insertion order.
pub type MaterialTable = IndexMap<String, Arc<Material>>;

/// What kind of geometry a material can be applied to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MaterialClass {
    Mesh,
    Line,
}

impl MaterialClass {
    pub fn label(self) -> &'static str {
        match self {
            Self::Mesh => "a mesh material",
            Self::Line => "a line material",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum MaterialKind {
    Basic {
        wireframe: bool,
    },
    Standard {
        wireframe: bool,
        roughness: f64,
        metalness: f64,
    },
    Phong {
        wireframe: bool,
        shininess: f64,
        specular_color: String,
    },
    LineBasic {
        width: f64,
    },
    LineDashed {
        width: f64,
        dash_size: f64,
        gap_size: f64,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub struct Material {
    pub name: Option<String>,
    pub color: String,
    pub texture: Option<String>,
    pub opacity: f64,
    pub kind: MaterialKind,
}

impl Material {
    fn with_kind(kind: MaterialKind) -> Self {
        Self {
            name: None,
            color: DEFAULT_COLOR.to_string(),
            texture: None,
            opacity: 1.0,
            kind,
        }
    }

    pub fn basic() -> Self {
        Self::with_kind(MaterialKind::Basic { wireframe: false })
    }

    pub fn standard() -> Self {
        Self::with_kind(MaterialKind::Standard {
            wireframe: false,
            roughness: 0.5,
            metalness: 0.5,
        })
    }

    pub fn line_basic() -> Self {
        Self::with_kind(MaterialKind::LineBasic { width: 1.0 })
    }

    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn type_name(&self) -> &'static str {
        match self.kind {
            MaterialKind::Basic { .. } => "BasicMaterial",
            MaterialKind::Standard { .. } => "StandardMaterial",
            MaterialKind::Phong { .. } => "PhongMaterial",
            MaterialKind::LineBasic { .. } => "LineBasicMaterial",
            MaterialKind::LineDashed { .. } => "LineDashedMaterial",
        }
    }

    pub fn class(&self) -> MaterialClass {
        match self.kind {
            MaterialKind::LineBasic { .. } | MaterialKind::LineDashed { .. } => {
                MaterialClass::Line
            }
            _ => MaterialClass::Mesh,
        }
    }

    pub fn to_value(&self) -> Value {
        let mut map = Map::new();
        map.insert("type".into(), json!(self.type_name()));
        if let Some(name) = &self.name {
            map.insert("name".into(), json!(name));
        }
        map.insert("color".into(), json!(self.color));
        if self.class() == MaterialClass::Mesh {
            map.insert("texture".into(), json!(self.texture));
        }
        map.insert("opacity".into(), json!(self.opacity));

        match &self.kind {
            MaterialKind::Basic { wireframe } => {
                map.insert("wireframe".into(), json!(wireframe));
            }
            MaterialKind::Standard {
                wireframe,
                roughness,
                metalness,
            } => {
                map.insert("wireframe".into(), json!(wireframe));
                map.insert("roughness".into(), json!(roughness));
                map.insert("metalness".into(), json!(metalness));
            }
            MaterialKind::Phong {
                wireframe,
                shininess,
                specular_color,
            } => {
                map.insert("wireframe".into(), json!(wireframe));
                map.insert("shininess".into(), json!(shininess));
                map.insert("specular_color".into(), json!(specular_color));
            }
            MaterialKind::LineBasic { width } => {
                map.insert("width".into(), json!(width));
            }
            MaterialKind::LineDashed {
                width,
                dash_size,
                gap_size,
            } => {
                map.insert("width".into(), json!(width));
                map.insert("dash_size".into(), json!(dash_size));
                map.insert("gap_size".into(), json!(gap_size));
            }
        }
        Value::Object(map)
    }
}

// ============================================================================
// Constructors (registered by the base materials plugin)
// ============================================================================

/// `color`, `texture` then `wireframe`: the common mesh material prefix.
fn mesh_common(args: &mut Args<'_>) -> Result<(String, Option<String>, bool), BuildError> {
    let color = args.string_or("color", DEFAULT_COLOR)?;
    let texture = args.opt_string("texture")?;
    let wireframe = args.bool_or("wireframe", false)?;
    Ok((color, texture, wireframe))
}

fn line_common(args: &mut Args<'_>) -> Result<(String, Option<String>, f64), BuildError> {
    let color = args.string_or("color", DEFAULT_COLOR)?;
    let texture = args.opt_string("texture")?;
    let width = args.f64_or("width", 1.0)?;
    Ok((color, texture, width))
}

fn finish(
    args: &mut Args<'_>,
    color: String,
    texture: Option<String>,
    kind: MaterialKind,
) -> Result<Node, BuildError> {
    let opacity = args.f64_or("opacity", 1.0)?;
    if !(0.0..=1.0).contains(&opacity) {
        return Err(BuildError::InvalidArgument {
            type_name: args.type_name().to_string(),
            name: "opacity".into(),
            expected: "a number between 0 and 1",
            fragment: opacity.to_string(),
        });
    }
    let name = args.opt_string("name")?;
    Ok(Node::Material(Arc::new(Material {
        name,
        color,
        texture,
        opacity,
        kind,
    })))
}

pub fn construct_basic(args: &mut Args<'_>) -> Result<Node, BuildError> {
    let (color, texture, wireframe) = mesh_common(args)?;
    finish(args, color, texture, MaterialKind::Basic { wireframe })
}

pub fn construct_standard(args: &mut Args<'_>) -> Result<Node, BuildError> {
    let (color, texture, wireframe) = mesh_common(args)?;
    let roughness = args.f64_or("roughness", 0.5)?;
    let metalness = args.f64_or("metalness", 0.5)?;
    let kind = MaterialKind::Standard {
        wireframe,
        roughness,
        metalness,
    };
    finish(args, color, texture, kind)
}

pub fn construct_phong(args: &mut Args<'_>) -> Result<Node, BuildError> {
    let (color, texture, wireframe) = mesh_common(args)?;
    let shininess = args.f64_or("shininess", 30.0)?;
    let specular_color = args.string_or("specular_color", SPECULAR_COLOR)?;
    let kind = MaterialKind::Phong {
        wireframe,
        shininess,
        specular_color,
    };
    finish(args, color, texture, kind)
}

pub fn construct_line_basic(args: &mut Args<'_>) -> Result<Node, BuildError> {
    let (color, texture, width) = line_common(args)?;
    finish(args, color, texture, MaterialKind::LineBasic { width })
}

pub fn construct_line_dashed(args: &mut Args<'_>) -> Result<Node, BuildError> {
    let (color, texture, width) = line_common(args)?;
    let dash_size = args.f64_or("dash_size", 3.0)?;
    let gap_size = args.f64_or("gap_size", 1.0)?;
    let kind = MaterialKind::LineDashed {
        width,
        dash_size,
        gap_size,
    };
    finish(args, color, texture, kind)
}
