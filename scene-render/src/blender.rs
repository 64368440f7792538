//! Runs Blender headless on a generated script.

use std::path::{Path, PathBuf};
use std::process::Stdio;
use thiserror::Error;
use tokio::process::Command;

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("Failed to write render script {path}: {source}")]
    Script {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to launch Blender ({binary}): {source}")]
    Launch {
        binary: String,
        source: std::io::Error,
    },

    #[error("Blender exited with {status}: {stderr}")]
    Failed { status: String, stderr: String },
}

pub struct BlenderRunner {
    binary: String,
}

impl BlenderRunner {
    pub fn new(binary: impl Into<String>) -> Self {
        Self {
            binary: binary.into(),
        }
    }

    /// Arguments for a background run of `script`.
    pub fn args(script: &Path) -> Vec<String> {
        vec![
            "--background".to_string(),
            "--factory-startup".to_string(),
            "--python".to_string(),
            script.to_string_lossy().into_owned(),
        ]
    }

    /// Write `script` to a temp file and run Blender on it until it exits.
    pub async fn render(&self, script: &str, output: &Path) -> Result<PathBuf, RenderError> {
        let script_path = std::env::temp_dir().join(format!("scene-{}.py", uuid::Uuid::new_v4()));

        tokio::fs::write(&script_path, script)
            .await
            .map_err(|source| RenderError::Script {
                path: script_path.clone(),
                source,
            })?;

        tracing::info!(
            binary = %self.binary,
            script = %script_path.display(),
            output = %output.display(),
            "Starting Blender render"
        );

        let result = Command::new(&self.binary)
            .args(Self::args(&script_path))
            .stdin(Stdio::null())
            .output()
            .await;

        if let Err(e) = tokio::fs::remove_file(&script_path).await {
            tracing::warn!(script = %script_path.display(), error = %e, "Failed to remove render script");
        }

        let out = result.map_err(|source| RenderError::Launch {
            binary: self.binary.clone(),
            source,
        })?;

        if !out.status.success() {
            return Err(RenderError::Failed {
                status: out.status.to_string(),
                stderr: String::from_utf8_lossy(&out.stderr).trim().to_string(),
            });
        }

        tracing::debug!(stdout = %String::from_utf8_lossy(&out.stdout), "Blender output");
        tracing::info!(output = %output.display(), "Render finished");

        Ok(output.to_path_buf())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn runs_headless_with_factory_settings() {
        let args = BlenderRunner::args(Path::new("/tmp/scene.py"));
        assert_eq!(
            args,
            vec!["--background", "--factory-startup", "--python", "/tmp/scene.py"]
        );
    }

    #[tokio::test]
    async fn missing_binary_is_a_launch_error() {
        let runner = BlenderRunner::new("/nonexistent/blender-binary");
        let err = runner
            .render("import bpy\n", Path::new("/tmp/out.png"))
            .await
            .unwrap_err();
        assert!(matches!(err, RenderError::Launch { .. }));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn non_zero_exit_is_a_failure() {
        let runner = BlenderRunner::new("false");
        let err = runner
            .render("import bpy\n", Path::new("/tmp/out.png"))
            .await
            .unwrap_err();
        assert!(matches!(err, RenderError::Failed { .. }));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn zero_exit_is_success() {
        let runner = BlenderRunner::new("true");
        let output = runner
            .render("import bpy\n", Path::new("/tmp/out.png"))
            .await
            .unwrap();
        assert_eq!(output, PathBuf::from("/tmp/out.png"));
    }
}
