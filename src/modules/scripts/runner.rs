use async_trait::async_trait;
use std::path::PathBuf;
use std::process::Stdio;
use std::time::Duration;
use thiserror::Error;
use tokio::process::Command;
use tracing::{debug, warn};

use crate::core::config::ScriptsConfig;

#[derive(Debug, Error)]
pub enum ScriptError {
    #[error("script not found: {0}")]
    NotFound(String),

    #[error("failed to spawn {script}: {source}")]
    Spawn {
        script: String,
        #[source]
        source: std::io::Error,
    },

    #[error("script timed out after {0:?}")]
    TimedOut(Duration),

    #[error("script exited with status {code:?}: {stderr}")]
    Failed { code: Option<i32>, stderr: String },
}

/// Runs a named statistics script and returns its standard output
#[async_trait]
pub trait ScriptRunner: Send + Sync {
    /// Execute `script` with positional `args`.
    ///
    /// On success returns stdout with trailing whitespace removed.
    async fn run(&self, script: &str, args: &[String]) -> Result<String, ScriptError>;
}

/// Executes scripts from a directory as child processes
#[derive(Debug, Clone)]
pub struct ProcessScriptRunner {
    scripts_dir: PathBuf,
    timeout: Duration,
}

impl ProcessScriptRunner {
    pub fn new(scripts_dir: impl Into<PathBuf>, timeout: Duration) -> Self {
        Self {
            scripts_dir: scripts_dir.into(),
            timeout,
        }
    }

    pub fn from_config(config: &ScriptsConfig) -> Self {
        Self::new(config.dir.clone(), config.timeout)
    }
}

#[async_trait]
impl ScriptRunner for ProcessScriptRunner {
    async fn run(&self, script: &str, args: &[String]) -> Result<String, ScriptError> {
        let path = self.scripts_dir.join(script);

        if !tokio::fs::try_exists(&path).await.unwrap_or(false) {
            return Err(ScriptError::NotFound(path.display().to_string()));
        }

        debug!("Running script {} with args {:?}", path.display(), args);

        let child = Command::new(&path)
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            // Dropping the future on timeout must not leave the child running
            .kill_on_drop(true)
            .spawn()
            .map_err(|source| ScriptError::Spawn {
                script: script.to_string(),
                source,
            })?;

        let output = match tokio::time::timeout(self.timeout, child.wait_with_output()).await {
            Ok(result) => result.map_err(|source| ScriptError::Spawn {
                script: script.to_string(),
                source,
            })?,
            Err(_) => {
                warn!("Script {} timed out after {:?}", script, self.timeout);
                return Err(ScriptError::TimedOut(self.timeout));
            }
        };

        if !output.status.success() {
            return Err(ScriptError::Failed {
                code: output.status.code(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        let stdout = String::from_utf8_lossy(&output.stdout);
        debug!("Script {} produced {} bytes", script, stdout.len());

        Ok(stdout.trim_end().to_string())
    }
}
