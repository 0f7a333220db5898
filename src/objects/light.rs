use serde_json::{Value, json};

use crate::scene::{Args, BuildError, Node, SceneObject};

#[derive(Debug, Clone)]
pub struct PointLight {
    pub intensity: f64,
    pub color: String,
}

impl PointLight {
    pub fn construct(args: &mut Args<'_>) -> Result<Node, BuildError> {
        let intensity = args.f64("intensity")?;
        if intensity < 0.0 {
            return Err(BuildError::InvalidArgument {
                type_name: args.type_name().to_string(),
                name: "intensity".into(),
                expected: "a non-negative number",
                fragment: intensity.to_string(),
            });
        }
        let color = args.string_or("color", "white")?;
        Ok(Self { intensity, color }.into())
    }
}

impl SceneObject for PointLight {
    scene_object_common!("PointLight");

    fn to_value(&self) -> Value {
        json!({
            "type": "PointLight",
            "intensity": self.intensity,
            "color": self.color,
        })
    }
}
