use serde_json::{Value, json};

use super::positive;
use crate::scene::{Args, BuildError, Node, SceneObject};

/// Volumetric data loaded by the viewer from `file_path`.
#[derive(Debug, Clone)]
pub struct Volume {
    pub width: f64,
    pub height: f64,
    pub depth: f64,
    pub file_path: String,
}

impl Volume {
    pub fn construct(args: &mut Args<'_>) -> Result<Node, BuildError> {
        let width = args.f64("width")?;
        let width = positive(args, "width", width)?;
        let height = args.f64("height")?;
        let height = positive(args, "height", height)?;
        let depth = args.f64("depth")?;
        let depth = positive(args, "depth", depth)?;
        let file_path = args.string("file_path")?;
        Ok(Self {
            width,
            height,
            depth,
            file_path,
        }
        .into())
    }
}

impl SceneObject for Volume {
    scene_object_common!("Volume");

    fn to_value(&self) -> Value {
        json!({
            "type": "Volume",
            "file_path": self.file_path,
            "width": self.width,
            "height": self.height,
            "depth": self.depth,
        })
    }
}
