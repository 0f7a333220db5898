//! Scene error types.

use std::path::PathBuf;

use serde_json::Value;
use thiserror::Error;

/// Maximum characters of JSON shown in error messages.
const FRAGMENT_LIMIT: usize = 120;

/// Render a JSON value as a short fragment for diagnostics.
pub fn fragment(value: &Value) -> String {
    let text = value.to_string();
    if text.chars().count() <= FRAGMENT_LIMIT {
        return text;
    }
    let mut cut: String = text.chars().take(FRAGMENT_LIMIT).collect();
    cut.push('…');
    cut
}

// ============================================================================
// BuildError
// ============================================================================

/// Failure to turn one description into an object.
///
/// Fatal to the single build that produced it; never retried.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum BuildError {
    #[error("expected a JSON object, got `{fragment}`")]
    NotAnObject { fragment: String },

    #[error("missing string `type` field in `{fragment}`")]
    MissingType { fragment: String },

    #[error("unknown object type `{type_name}`")]
    UnknownType { type_name: String },

    #[error("`args` of `{type_name}` must be an array, got `{fragment}`")]
    MalformedArgs { type_name: String, fragment: String },

    #[error("description nested deeper than {limit} levels")]
    TooDeep { limit: usize },

    #[error("`{type_name}` is missing required argument `{name}`")]
    MissingArgument { type_name: String, name: String },

    #[error("`{type_name}` got argument `{name}` both positionally and by name")]
    DuplicateArgument { type_name: String, name: String },

    #[error("`{type_name}` got unexpected argument `{name}`")]
    UnexpectedArgument { type_name: String, name: String },

    #[error("`{type_name}` takes at most {accepted} positional arguments, got {given}")]
    TooManyPositional {
        type_name: String,
        accepted: usize,
        given: usize,
    },

    #[error("`{type_name}.{name}` expects {expected}, got `{fragment}`")]
    InvalidArgument {
        type_name: String,
        name: String,
        expected: &'static str,
        fragment: String,
    },

    #[error("material `{name}` is not defined")]
    UnresolvedMaterial { name: String },
}

impl BuildError {
    /// Short machine-friendly kind label.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::UnknownType { .. } => "registry",
            Self::UnresolvedMaterial { .. } => "material",
            _ => "build",
        }
    }
}

// ============================================================================
// SceneError
// ============================================================================

/// Scene-level failures (insertion, loading a description, saving).
#[derive(Debug, Error)]
pub enum SceneError {
    #[error("object #{index} failed to build: {source}")]
    Build {
        index: usize,
        #[source]
        source: BuildError,
    },

    #[error(transparent)]
    Construct(#[from] BuildError),

    #[error("failed to write scene to `{0}`")]
    Save(PathBuf, #[source] std::io::Error),
}
