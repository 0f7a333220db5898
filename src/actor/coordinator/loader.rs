//! Bounded-retry scene file loader.
//!
//! Writers (editors, generator scripts) can leave the file empty or
//! half-written for a moment. An empty or unparsable file is retried after a
//! short sleep; a missing file fails at once.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::time::Duration;

use thiserror::Error;

use crate::debug;
use crate::scene::SceneDescription;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub attempts: u32,
    pub backoff: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            attempts: 10,
            backoff: Duration::from_millis(500),
        }
    }
}

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("scene file `{}` does not exist", .0.display())]
    Missing(PathBuf),

    #[error("could not load `{}` after {attempts} attempts: {last}", path.display())]
    Exhausted {
        path: PathBuf,
        attempts: u32,
        last: String,
    },
}

/// Read and parse `path`, retrying transient failures per `policy`.
pub async fn load_with_retry(
    path: &Path,
    policy: RetryPolicy,
) -> Result<SceneDescription, LoadError> {
    let attempts = policy.attempts.max(1);
    let mut last = String::new();

    for attempt in 1..=attempts {
        match tokio::fs::read_to_string(path).await {
            Ok(text) if text.trim_ascii().is_empty() => {
                last = "file is empty".to_string();
            }
            Ok(text) => match SceneDescription::parse(&text) {
                Ok(description) => return Ok(description),
                Err(e) => last = format!("invalid scene description: {e}"),
            },
            Err(e) if e.kind() == ErrorKind::NotFound => {
                return Err(LoadError::Missing(path.to_path_buf()));
            }
            Err(e) => last = e.to_string(),
        }

        if attempt < attempts {
            debug!("sync"; "load attempt {}/{} failed: {}", attempt, attempts, last);
            tokio::time::sleep(policy.backoff).await;
        }
    }

    Err(LoadError::Exhausted {
        path: path.to_path_buf(),
        attempts,
        last,
    })
}
