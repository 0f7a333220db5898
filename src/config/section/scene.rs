//! `[scene]` section configuration.
//!
//! # Example
//!
//! ```toml
//! [scene]
//! path = "scene.json"          # Scene description file
//! generator = "make_scene.py"  # Script that rewrites the scene file (optional)
//! interpreter = "python3"      # Program used to run the generator (optional)
//! ```
//!
//! Relative paths are resolved against the directory holding `volum.toml`.

use serde::{Deserialize, Serialize};

/// Scene source settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SceneConfig {
    pub path: String,

    pub generator: Option<String>,

    /// Defaults to `python3` for `.py` generators; other scripts run directly.
    pub interpreter: Option<String>,
}

impl Default for SceneConfig {
    fn default() -> Self {
        Self {
            path: "scene.json".to_string(),
            generator: None,
            interpreter: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::config::test_parse_config;

    #[test]
    fn test_scene_config() {
        let config = test_parse_config(
            "[scene]\npath = \"out/scene.json\"\ngenerator = \"gen.py\"\ninterpreter = \"uv run python\"",
        );
        assert_eq!(config.scene.path, "out/scene.json");
        assert_eq!(config.scene.generator.as_deref(), Some("gen.py"));
        assert_eq!(config.scene.interpreter.as_deref(), Some("uv run python"));
    }

    #[test]
    fn test_scene_config_defaults() {
        let config = test_parse_config("");
        assert_eq!(config.scene.path, "scene.json");
        assert!(config.scene.generator.is_none());
        assert!(config.scene.interpreter.is_none());
    }
}
