//! Generator script execution.
//!
//! The generator is an external program that (re)writes the scene file.
//! It runs to completion on the coordinator before the next message is
//! handled; its write is then picked up by the watcher like any other edit.

use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::process::Stdio;

use thiserror::Error;
use tokio::process::Command;

use crate::debug;

/// Environment variable carrying the absolute scene path.
pub const ENV_SCENE_PATH: &str = "VOLUM_SCENE_PATH";
/// Environment variable carrying the absolute script path.
pub const ENV_SCRIPT_PATH: &str = "VOLUM_SCRIPT_PATH";

/// Lines of stderr kept in a failure report.
const STDERR_TAIL_LINES: usize = 20;

#[derive(Debug, Error)]
pub enum GeneratorError {
    #[error("failed to start `{program}`: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("generator {} exited with {}{}", script.display(), describe_status(*code), describe_stderr(stderr))]
    Failed {
        script: PathBuf,
        code: Option<i32>,
        stderr: String,
    },
}

fn describe_status(code: Option<i32>) -> String {
    match code {
        Some(code) => format!("status {code}"),
        None => "a signal".to_string(),
    }
}

fn describe_stderr(stderr: &str) -> String {
    if stderr.is_empty() {
        String::new()
    } else {
        format!(":\n{stderr}")
    }
}

/// Spawns the generator script and waits for it.
#[derive(Debug, Clone)]
pub struct GeneratorSupervisor {
    script: PathBuf,
    scene_path: PathBuf,
    /// Program plus leading args; empty means "execute the script itself".
    launcher: Vec<OsString>,
}

impl GeneratorSupervisor {
    /// `interpreter` may contain arguments (`"uv run python"`).
    pub fn new(script: PathBuf, scene_path: PathBuf, interpreter: Option<&str>) -> Self {
        let launcher = resolve_launcher(&script, interpreter);
        Self {
            script,
            scene_path,
            launcher,
        }
    }

    /// Human-readable command line, for logs.
    pub fn command_line(&self) -> String {
        let mut parts: Vec<String> = self
            .launcher
            .iter()
            .map(|s| s.to_string_lossy().into_owned())
            .collect();
        parts.push(self.script.display().to_string());
        parts.join(" ")
    }

    /// Run the script to completion.
    ///
    /// stdout is discarded; stderr is kept for the failure report.
    pub async fn run(&self) -> Result<(), GeneratorError> {
        let (program, args) = match self.launcher.split_first() {
            Some((program, rest)) => (program.clone(), rest.to_vec()),
            None => (self.script.clone().into_os_string(), Vec::new()),
        };

        let mut cmd = Command::new(&program);
        cmd.args(&args);
        if !self.launcher.is_empty() {
            cmd.arg(&self.script);
        }
        cmd.env(ENV_SCENE_PATH, &self.scene_path)
            .env(ENV_SCRIPT_PATH, &self.script)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .kill_on_drop(true);
        if let Some(dir) = self.script.parent().filter(|d| !d.as_os_str().is_empty()) {
            cmd.current_dir(dir);
        }

        debug!("generator"; "running `{}`", self.command_line());

        let output = cmd.output().await.map_err(|source| GeneratorError::Spawn {
            program: program.to_string_lossy().into_owned(),
            source,
        })?;

        if output.status.success() {
            return Ok(());
        }

        Err(GeneratorError::Failed {
            script: self.script.clone(),
            code: output.status.code(),
            stderr: stderr_tail(&output.stderr, STDERR_TAIL_LINES),
        })
    }
}

/// Configured interpreter, else `python3` for `.py`, else nothing.
fn resolve_launcher(script: &Path, interpreter: Option<&str>) -> Vec<OsString> {
    if let Some(interpreter) = interpreter {
        let parts: Vec<OsString> = interpreter.split_whitespace().map(OsString::from).collect();
        if !parts.is_empty() {
            return parts;
        }
    }

    let is_python = script
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("py"));
    if is_python {
        let python = which::which("python3")
            .or_else(|_| which::which("python"))
            .map(PathBuf::into_os_string)
            .unwrap_or_else(|_| OsString::from("python3"));
        return vec![python];
    }

    Vec::new()
}

/// Last `max_lines` lines of `bytes`, lossily decoded and trimmed.
fn stderr_tail(bytes: &[u8], max_lines: usize) -> String {
    let text = String::from_utf8_lossy(bytes);
    let lines: Vec<&str> = text.trim_end().lines().collect();
    let start = lines.len().saturating_sub(max_lines);
    lines[start..].join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn script(dir: &TempDir, name: &str, body: &str) -> PathBuf {
        let path = dir.path().join(name);
        std::fs::write(&path, body).unwrap();
        path
    }

    #[test]
    fn test_launcher_configured_interpreter() {
        let launcher = resolve_launcher(Path::new("gen.py"), Some("uv run python"));
        assert_eq!(launcher, vec!["uv", "run", "python"]);
    }

    #[test]
    fn test_launcher_blank_interpreter_ignored() {
        assert!(resolve_launcher(Path::new("gen.sh"), Some("  ")).is_empty());
    }

    #[test]
    fn test_launcher_python_script() {
        let launcher = resolve_launcher(Path::new("gen.py"), None);
        assert_eq!(launcher.len(), 1);
        assert!(launcher[0].to_string_lossy().contains("python"));
    }

    #[test]
    fn test_launcher_direct_execution() {
        assert!(resolve_launcher(Path::new("gen.sh"), None).is_empty());
    }

    #[test]
    fn test_stderr_tail() {
        let text = (1..=30).map(|i| format!("line {i}\n")).collect::<String>();
        let tail = stderr_tail(text.as_bytes(), 3);
        assert_eq!(tail, "line 28\nline 29\nline 30");
        assert_eq!(stderr_tail(b"", 3), "");
    }

    #[tokio::test]
    async fn test_run_success_writes_scene() {
        let dir = TempDir::new().unwrap();
        let scene = dir.path().join("scene.json");
        let gen_script = script(
            &dir,
            "gen.sh",
            "printf '[{\"type\": \"Sphere\"}]' > \"$VOLUM_SCENE_PATH\"\n",
        );

        let supervisor = GeneratorSupervisor::new(gen_script, scene.clone(), Some("sh"));
        supervisor.run().await.unwrap();

        let written = std::fs::read_to_string(&scene).unwrap();
        assert_eq!(written, r#"[{"type": "Sphere"}]"#);
    }

    #[tokio::test]
    async fn test_run_in_script_directory() {
        let dir = TempDir::new().unwrap();
        let gen_script = script(&dir, "gen.sh", "echo here > marker.txt\n");

        GeneratorSupervisor::new(gen_script, dir.path().join("scene.json"), Some("sh"))
            .run()
            .await
            .unwrap();

        assert!(dir.path().join("marker.txt").exists());
    }

    #[tokio::test]
    async fn test_run_failure_keeps_stderr() {
        let dir = TempDir::new().unwrap();
        let gen_script = script(&dir, "gen.sh", "echo 'bad radius' >&2\nexit 3\n");

        let err = GeneratorSupervisor::new(gen_script, dir.path().join("scene.json"), Some("sh"))
            .run()
            .await
            .unwrap_err();

        match &err {
            GeneratorError::Failed { code, stderr, .. } => {
                assert_eq!(*code, Some(3));
                assert_eq!(stderr, "bad radius");
            }
            other => panic!("unexpected error: {other}"),
        }
        assert!(err.to_string().contains("status 3"));
    }

    #[tokio::test]
    async fn test_run_spawn_failure() {
        let dir = TempDir::new().unwrap();
        let gen_script = script(&dir, "gen.sh", "exit 0\n");

        let err = GeneratorSupervisor::new(
            gen_script,
            dir.path().join("scene.json"),
            Some("volum-no-such-interpreter"),
        )
        .run()
        .await
        .unwrap_err();

        assert!(matches!(err, GeneratorError::Spawn { .. }));
    }

    #[test]
    fn test_command_line() {
        let direct = GeneratorSupervisor::new("/tmp/gen".into(), "/tmp/scene.json".into(), None);
        assert_eq!(direct.command_line(), "/tmp/gen");

        let wrapped =
            GeneratorSupervisor::new("/tmp/gen.sh".into(), "/tmp/scene.json".into(), Some("sh -e"));
        assert_eq!(wrapped.command_line(), "sh -e /tmp/gen.sh");
    }
}
