//! Configuration management for `volum.toml`.
//!
//! # Module Structure
//!
//! ```text
//! config/
//! ├── section/       # Configuration section definitions
//! │   ├── scene      # [scene]
//! │   ├── serve      # [serve]
//! │   └── watch      # [watch]
//! ├── error          # ConfigError
//! ├── util           # config file lookup
//! └── mod.rs         # VolumConfig + RuntimeConfig (this file)
//! ```
//!
//! `VolumConfig` mirrors the file. `RuntimeConfig` is what the rest of the
//! program sees: file values merged with CLI flags, paths expanded and made
//! absolute. It is built once and shared as `Arc<RuntimeConfig>`.

mod error;
pub mod section;
mod util;

pub use error::ConfigError;
pub use section::{SceneConfig, ServeConfig, WatchConfig};

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::cli::{Cli, Commands, SceneArgs};
use crate::log;
use crate::utils::path::{expand_path, expand_path_in};
use util::find_config_file;

// ============================================================================
// file configuration
// ============================================================================

/// Root configuration structure representing volum.toml
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VolumConfig {
    /// Verbose logging
    #[serde(default)]
    pub debug: bool,

    #[serde(default)]
    pub scene: SceneConfig,

    #[serde(default)]
    pub serve: ServeConfig,

    #[serde(default)]
    pub watch: WatchConfig,
}

impl VolumConfig {
    /// Load configuration from file path with unknown field detection.
    fn from_path(path: &Path) -> Result<Self, ConfigError> {
        let content =
            fs::read_to_string(path).map_err(|err| ConfigError::Io(path.to_path_buf(), err))?;

        let (config, ignored) = Self::parse_with_ignored(&content)?;

        if !ignored.is_empty() {
            Self::print_unknown_fields_warning(&ignored, path);
        }

        Ok(config)
    }

    /// Parse TOML content, collecting any unknown fields.
    fn parse_with_ignored(content: &str) -> Result<(Self, Vec<String>), ConfigError> {
        let mut ignored = Vec::new();
        let deserializer = toml::Deserializer::new(content);
        let config = serde_ignored::deserialize(deserializer, |path: serde_ignored::Path| {
            ignored.push(path.to_string());
        })?;
        Ok((config, ignored))
    }

    fn print_unknown_fields_warning(fields: &[String], path: &Path) {
        let display_path = path
            .file_name()
            .map(|n| n.to_string_lossy())
            .unwrap_or_else(|| path.to_string_lossy());
        log!("warning"; "unknown fields in {}, ignoring:", display_path);
        for field in fields {
            eprintln!("- {}", field);
        }
    }
}

// ============================================================================
// runtime configuration
// ============================================================================

/// Resolved, read-only settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuntimeConfig {
    /// Absolute path of the scene description file
    pub scene_path: PathBuf,
    /// Absolute path of the generator script, if any
    pub generator: Option<PathBuf>,
    pub interpreter: Option<String>,
    pub debug: bool,
    pub serve: ServeConfig,
    pub watch: WatchConfig,
}

impl RuntimeConfig {
    /// Defaults for everything but the scene path.
    pub fn new(scene_path: PathBuf) -> Self {
        Self {
            scene_path,
            generator: None,
            interpreter: None,
            debug: false,
            serve: ServeConfig::default(),
            watch: WatchConfig::default(),
        }
    }

    /// Find and read the config file, then apply CLI flags.
    ///
    /// A missing config file is not an error; defaults apply.
    pub fn load(cli: &Cli) -> Result<Self> {
        let cwd = std::env::current_dir().context("Failed to get current working directory")?;

        let (file, root) = match find_config_file(&cli.config) {
            Some(path) => {
                let file = VolumConfig::from_path(&path)
                    .with_context(|| format!("Failed to load `{}`", path.display()))?;
                let root = path
                    .parent()
                    .map_or_else(|| cwd.clone(), Path::to_path_buf);
                (file, root)
            }
            None => (VolumConfig::default(), cwd),
        };

        Ok(Self::resolve(file, &root, cli)?)
    }

    /// Merge `file` (paths relative to `root`) with CLI flags (paths
    /// relative to the cwd).
    fn resolve(file: VolumConfig, root: &Path, cli: &Cli) -> Result<Self, ConfigError> {
        let empty = SceneArgs::default();
        let args = cli.scene_args().unwrap_or(&empty);

        let scene_path = match &args.scene_path {
            Some(raw) => expand_path(raw),
            None => expand_path_in(root, &file.scene.path),
        };
        let generator = match &args.generator {
            Some(raw) => Some(expand_path(raw)),
            None => file
                .scene
                .generator
                .as_deref()
                .map(|raw| expand_path_in(root, raw)),
        };
        let interpreter = args
            .interpreter
            .clone()
            .or(file.scene.interpreter)
            .filter(|s| !s.trim().is_empty());

        let mut serve = file.serve;
        if let Commands::Serve {
            host,
            port,
            ws_port,
            ..
        } = &cli.command
        {
            if let Some(host) = host {
                serve.interface = *host;
            }
            if let Some(port) = port {
                serve.port = *port;
            }
            if let Some(ws_port) = ws_port {
                serve.ws_port = *ws_port;
            }
        }

        let config = Self {
            scene_path,
            generator,
            interpreter,
            debug: file.debug || cli.verbose,
            serve,
            watch: file.watch,
        };
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.scene_path.is_dir() {
            return Err(ConfigError::SceneIsDirectory(self.scene_path.clone()));
        }
        if let Some(generator) = &self.generator
            && !generator.is_file()
        {
            return Err(ConfigError::GeneratorNotFound(generator.clone()));
        }
        if self.serve.port != 0 && self.serve.port == self.serve.ws_port {
            return Err(ConfigError::PortClash(self.serve.port));
        }
        if self.watch.retry_attempts == 0 {
            return Err(ConfigError::NoRetries);
        }
        Ok(())
    }
}

/// Parse a config snippet, failing on unknown fields.
#[cfg(test)]
pub fn test_parse_config(content: &str) -> VolumConfig {
    let (parsed, ignored) = VolumConfig::parse_with_ignored(content).unwrap();
    assert!(
        ignored.is_empty(),
        "test config has unknown fields: {:?}",
        ignored
    );
    parsed
}

// ============================================================================
// tests
// ============================================================================
