//! Errors raised while loading `volum.toml` and resolving the runtime config.

use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read `{}`", .0.display())]
    Io(PathBuf, #[source] std::io::Error),

    #[error("invalid volum.toml")]
    Toml(#[from] toml::de::Error),

    #[error("scene path `{}` is a directory", .0.display())]
    SceneIsDirectory(PathBuf),

    #[error("generator script `{}` not found", .0.display())]
    GeneratorNotFound(PathBuf),

    #[error("serve.port and serve.ws_port are both {0}")]
    PortClash(u16),

    #[error("watch.retry_attempts must be at least 1")]
    NoRetries,
}
