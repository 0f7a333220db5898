use serde::{Deserialize, Serialize};
use serde_json::{Map, Value, json};

use crate::scene::{BuildError, Node, RawContext, SceneObject};

/// Axis annotations of a plot.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlotAxes {
    pub title: String,
    pub xlabel: String,
    pub ylabel: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub xlim: Option<[f64; 2]>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ylim: Option<[f64; 2]>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct PlotMetadata {
    axes: Vec<PlotAxes>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct PlotFields {
    #[serde(rename = "type")]
    _type: String,
    #[serde(default)]
    x: Vec<Vec<f64>>,
    #[serde(default)]
    y: Vec<Vec<f64>>,
    #[serde(default)]
    metadata: PlotMetadata,
    #[serde(default = "default_width")]
    width: f64,
    #[serde(default = "default_height")]
    height: f64,
    #[serde(default)]
    double_sided: bool,
    // Rendered by the viewer; accepted so serialized plots reload.
    #[serde(default, rename = "image_data")]
    _image_data: Option<Value>,
}

fn default_width() -> f64 {
    5.0
}

fn default_height() -> f64 {
    4.0
}

/// A 2D line plot shown as a textured quad.
///
/// Each `(x[i], y[i])` pair is one series. `axes` holds one entry per
/// subplot, in description order.
#[derive(Debug, Clone)]
pub struct PlotImage {
    pub x: Vec<Vec<f64>>,
    pub y: Vec<Vec<f64>>,
    pub axes: Vec<PlotAxes>,
    pub width: f64,
    pub height: f64,
    pub double_sided: bool,
}

impl PlotImage {
    /// Owns its own deserialization: the series arrays are plain data and
    /// never pass through argument binding.
    pub fn from_raw(fields: &Map<String, Value>, _cx: &RawContext<'_>) -> Result<Node, BuildError> {
        let invalid = |expected: &'static str, fragment: String| BuildError::InvalidArgument {
            type_name: "PlotImage".into(),
            name: "description".into(),
            expected,
            fragment,
        };

        let raw: PlotFields = serde_json::from_value(Value::Object(fields.clone()))
            .map_err(|e| invalid("a plot description", e.to_string()))?;

        if raw.x.len() != raw.y.len() {
            return Err(invalid(
                "as many x series as y series",
                format!("{} x, {} y", raw.x.len(), raw.y.len()),
            ));
        }
        if let Some((i, _)) = raw
            .x
            .iter()
            .zip(&raw.y)
            .enumerate()
            .find(|(_, (x, y))| x.len() != y.len())
        {
            return Err(invalid("series of matching length", format!("series {i}")));
        }
        if raw.width <= 0.0 || raw.height <= 0.0 {
            return Err(invalid(
                "a positive width and height",
                format!("{}x{}", raw.width, raw.height),
            ));
        }

        Ok(Self {
            x: raw.x,
            y: raw.y,
            axes: raw.metadata.axes,
            width: raw.width,
            height: raw.height,
            double_sided: raw.double_sided,
        }
        .into())
    }
}

impl SceneObject for PlotImage {
    scene_object_common!("PlotImage");

    fn to_value(&self) -> Value {
        json!({
            "type": "PlotImage",
            "x": self.x,
            "y": self.y,
            "metadata": { "axes": self.axes },
            "width": self.width,
            "height": self.height,
            "double_sided": self.double_sided,
        })
    }
}
