use async_trait::async_trait;
use sqlx::sqlite::SqlitePoolOptions;
use sqlx::SqlitePool;
use std::path::Path;
use std::sync::Mutex;

use crate::modules::scripts::{ScriptError, ScriptRunner};

/// Fresh in-memory database with migrations applied.
///
/// Each in-memory connection is its own database, so the pool is pinned to
/// one connection that never expires.
pub async fn test_pool() -> SqlitePool {
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .idle_timeout(None)
        .max_lifetime(None)
        .connect("sqlite::memory:")
        .await
        .unwrap();

    crate::core::database::run_migrations(&pool).await.unwrap();

    pool
}

/// Canned result for [`StubScriptRunner`]
#[derive(Debug, Clone)]
pub enum StubOutcome {
    Output(String),
    Failure { code: i32, stderr: String },
    Missing,
}

/// Script runner that records its calls and replays a canned outcome
pub struct StubScriptRunner {
    outcome: StubOutcome,
    calls: Mutex<Vec<(String, Vec<String>)>>,
}

impl StubScriptRunner {
    pub fn returning(output: impl Into<String>) -> Self {
        Self::with_outcome(StubOutcome::Output(output.into()))
    }

    pub fn failing(code: i32, stderr: impl Into<String>) -> Self {
        Self::with_outcome(StubOutcome::Failure {
            code,
            stderr: stderr.into(),
        })
    }

    pub fn missing() -> Self {
        Self::with_outcome(StubOutcome::Missing)
    }

    fn with_outcome(outcome: StubOutcome) -> Self {
        Self {
            outcome,
            calls: Mutex::new(Vec::new()),
        }
    }

    /// `(script, args)` for every call so far
    pub fn calls(&self) -> Vec<(String, Vec<String>)> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl ScriptRunner for StubScriptRunner {
    async fn run(&self, script: &str, args: &[String]) -> Result<String, ScriptError> {
        self.calls
            .lock()
            .unwrap()
            .push((script.to_string(), args.to_vec()));

        match &self.outcome {
            StubOutcome::Output(output) => Ok(output.trim_end().to_string()),
            StubOutcome::Failure { code, stderr } => Err(ScriptError::Failed {
                code: Some(*code),
                stderr: stderr.clone(),
            }),
            StubOutcome::Missing => Err(ScriptError::NotFound(script.to_string())),
        }
    }
}

/// Write `content` straight into an upload directory, bypassing the service
pub fn put_upload(dir: &Path, filename: &str, content: &[u8]) {
    std::fs::write(dir.join(filename), content).unwrap();
}

/// Names of the entries in an upload directory, sorted
pub fn upload_dir_entries(dir: &Path) -> Vec<String> {
    let mut names: Vec<String> = std::fs::read_dir(dir)
        .unwrap()
        .map(|entry| entry.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    names.sort();
    names
}
