//! Scene-description file format.
//!
//! Either a bare array of object descriptions or
//! `{"plugins": [...], "objects": [...]}`.

use serde::Deserialize;
use serde_json::Value;

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
struct Tagged {
    #[serde(default)]
    plugins: Vec<String>,
    #[serde(default)]
    objects: Vec<Value>,
}

/// A parsed scene file. Object descriptions stay untyped until built.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SceneDescription {
    pub plugins: Vec<String>,
    pub objects: Vec<Value>,
}

impl SceneDescription {
    pub fn parse(text: &str) -> Result<Self, serde_json::Error> {
        let value: Value = serde_json::from_str(text)?;
        Self::from_value(value)
    }

    pub fn from_value(value: Value) -> Result<Self, serde_json::Error> {
        if let Value::Array(objects) = value {
            return Ok(Self {
                plugins: Vec::new(),
                objects,
            });
        }
        let Tagged { plugins, objects } = serde_json::from_value(value)?;
        Ok(Self { plugins, objects })
    }
}
