//! Subprocess adapter for the implementation under test
//!
//! Launches the subject program once per call as
//! `<program> <args...> <file path> <sheet index>`, takes stdout verbatim as the rendered
//! sheet and keeps the first stderr line carrying the timing prefix. All other stderr output
//! is ignored. There is no timeout: a hung child hangs the run.

use crate::adapter::{SheetAdapter, SheetRender};
use crate::config::SubjectConfig;
use crate::{Error, Result};
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use tokio::process::Command;

/// Adapter that renders a sheet in a fresh child process
pub struct SubprocessAdapter {
    name: String,
    command: PathBuf,
    args: Vec<String>,
    env: Vec<(String, String)>,
    timing_prefix: String,
}

impl SubprocessAdapter {
    /// Create a new subprocess adapter
    ///
    /// # Arguments
    /// * `name` - Report label (e.g. "turboxl")
    /// * `command` - Executable (e.g. "python3")
    /// * `args` - Arguments placed before the file path and sheet index
    /// * `env` - Extra environment variables for the child
    /// * `timing_prefix` - Stderr prefix of the timing diagnostic line
    pub fn new(
        name: impl Into<String>,
        command: impl Into<PathBuf>,
        args: Vec<String>,
        env: Vec<(String, String)>,
        timing_prefix: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            command: command.into(),
            args,
            env,
            timing_prefix: timing_prefix.into(),
        }
    }

    /// Build the adapter described by a [`SubjectConfig`]
    pub fn from_config(config: &SubjectConfig) -> Self {
        let env = if config.profile {
            vec![(config.profile_env.clone(), "1".to_string())]
        } else {
            vec![]
        };

        Self::new(
            config.name.clone(),
            config.program.clone(),
            config.args.clone(),
            env,
            config.timing_prefix.clone(),
        )
    }

    /// Execute the subject and return `(stdout, stderr)`
    async fn execute_subprocess(&self, file_path: &Path, sheet_index: usize) -> Result<(String, String)> {
        let mut cmd = Command::new(&self.command);
        cmd.args(&self.args);
        cmd.arg(file_path);
        cmd.arg(sheet_index.to_string());

        for (key, value) in &self.env {
            cmd.env(key, value);
        }

        cmd.stdin(Stdio::null());
        cmd.stdout(Stdio::piped());
        cmd.stderr(Stdio::piped());

        let child = cmd.spawn().map_err(|e| {
            Error::Subprocess(format!("Failed to spawn '{}': {}", self.command.display(), e))
        })?;

        let output = child
            .wait_with_output()
            .await
            .map_err(|e| Error::Subprocess(format!("Failed to wait for subprocess: {}", e)))?;

        let stderr = String::from_utf8_lossy(&output.stderr).to_string();

        if !output.status.success() {
            return Err(Error::Extraction {
                adapter: self.name.clone(),
                file: file_path.to_path_buf(),
                message: format!(
                    "Subprocess failed with exit code {:?}\nstderr: {}",
                    output.status.code(),
                    stderr
                ),
            });
        }

        let stdout = String::from_utf8(output.stdout).map_err(|e| Error::Extraction {
            adapter: self.name.clone(),
            file: file_path.to_path_buf(),
            message: format!("Subprocess output is not valid UTF-8: {}", e),
        })?;

        Ok((stdout, stderr))
    }
}

/// First line of `stderr` that starts with `prefix`
pub fn find_timing_line(stderr: &str, prefix: &str) -> Option<String> {
    stderr
        .lines()
        .find(|line| line.starts_with(prefix))
        .map(str::to_owned)
}

#[async_trait]
impl SheetAdapter for SubprocessAdapter {
    fn name(&self) -> &str {
        &self.name
    }

    async fn render(&self, file_path: &Path, sheet_index: usize) -> Result<SheetRender> {
        let (stdout, stderr) = self.execute_subprocess(file_path, sheet_index).await?;
        let diagnostics = find_timing_line(&stderr, &self.timing_prefix);

        tracing::debug!(
            adapter = %self.name,
            bytes = stdout.len(),
            has_timing = diagnostics.is_some(),
            "Subject process finished"
        );

        Ok(SheetRender {
            text: stdout,
            row_count: None,
            diagnostics,
        })
    }

    async fn setup(&self) -> Result<()> {
        which::which(&self.command).map_err(|e| {
            Error::Subprocess(format!("Command '{}' not found: {}", self.command.display(), e))
        })?;

        Ok(())
    }
}
