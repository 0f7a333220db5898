use serde_json::{Value, json};

use crate::scene::{Args, BuildError, Node, SceneObject};

/// Position, rotation (Euler, radians) and scale applied to a child object.
#[derive(Debug)]
pub struct Transform {
    pub object: Box<dyn SceneObject>,
    pub position: [f64; 3],
    pub rotation: [f64; 3],
    pub scale: [f64; 3],
}

impl Transform {
    pub fn construct(args: &mut Args<'_>) -> Result<Node, BuildError> {
        let object = args.object("object")?;
        let position = args.vec3_or("position", [0.0; 3])?;
        let rotation = args.vec3_or("rotation", [0.0; 3])?;
        let scale = args.vec3_or("scale", [1.0; 3])?;
        Ok(Self {
            object,
            position,
            rotation,
            scale,
        }
        .into())
    }
}

impl SceneObject for Transform {
    scene_object_common!("Transform");

    // The child goes under `object`, the same key the constructor reads.
    fn to_value(&self) -> Value {
        json!({
            "type": "Transform",
            "object": self.object.to_value(),
            "position": self.position,
            "rotation": self.rotation,
            "scale": self.scale,
        })
    }
}
