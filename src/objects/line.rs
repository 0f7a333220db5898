use std::sync::Arc;

use serde_json::{Value, json};

use crate::scene::{Args, BuildError, Material, MaterialClass, Node, SceneObject};

/// Polyline through ordered points.
#[derive(Debug, Clone)]
pub struct Line {
    pub points: Vec<Vec<f64>>,
    pub material: Arc<Material>,
}

impl Line {
    pub fn construct(args: &mut Args<'_>) -> Result<Node, BuildError> {
        let points = args.points("points")?;
        let material = args.material_or("material", MaterialClass::Line, Material::line_basic)?;

        let invalid = |expected: &'static str| BuildError::InvalidArgument {
            type_name: args.type_name().to_string(),
            name: "points".into(),
            expected,
            fragment: format!("{points:?}"),
        };
        if points.len() < 2 {
            return Err(invalid("at least two points"));
        }
        let dim = points[0].len();
        if dim == 0 || points.iter().any(|p| p.len() != dim) {
            return Err(invalid("points of equal, non-zero dimension"));
        }

        Ok(Self { points, material }.into())
    }
}

impl SceneObject for Line {
    scene_object_common!("Line");

    fn to_value(&self) -> Value {
        json!({
            "type": "Line",
            "points": self.points,
            "material": self.material.to_value(),
        })
    }

    fn material(&self) -> Option<&Arc<Material>> {
        Some(&self.material)
    }
}
