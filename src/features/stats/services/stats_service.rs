use std::path::Path;
use std::sync::Arc;
use tracing::{debug, warn};

use crate::core::error::{AppError, Result};
use crate::features::files::FileService;
use crate::modules::scripts::{parse_usage_line, parse_usage_lines, ScriptRunner, UserUsageRecord};
use crate::shared::constants::{
    FLAG_DESC, FLAG_MIN, MSG_FILENAME_REQUIRED, MSG_RANGE_NOT_INTEGER, MSG_RANGE_REQUIRED,
    SCRIPT_BETWEEN_MSGS, SCRIPT_MAX_MIN_SIZE, SCRIPT_ORDER_BY_USERNAME,
};

/// Mailbox statistics computed by external scripts over uploaded files
pub struct StatsService {
    runner: Arc<dyn ScriptRunner>,
    files: Arc<FileService>,
}

impl StatsService {
    pub fn new(runner: Arc<dyn ScriptRunner>, files: Arc<FileService>) -> Self {
        Self { runner, files }
    }

    /// User with the largest mailbox, or the smallest when `min` is set
    pub async fn max_min_size(&self, filename: Option<&str>, min: bool) -> Result<UserUsageRecord> {
        let filename = require_filename(filename)?;
        let path = self.files.locate(filename).await?;

        let mut args = vec![path_arg(&path)];
        if min {
            args.push(FLAG_MIN.to_string());
        }

        let output = self.run(SCRIPT_MAX_MIN_SIZE, &args).await?;

        let mut lines = output.lines().filter(|line| !line.trim().is_empty());
        let first = lines.next().ok_or_else(|| empty_output(SCRIPT_MAX_MIN_SIZE))?;
        if lines.next().is_some() {
            warn!(
                "{} printed more than one record, using the first",
                SCRIPT_MAX_MIN_SIZE
            );
        }

        Ok(parse_usage_line(first)?)
    }

    /// All users ordered by username, as sorted by the script
    pub async fn order_by_username(
        &self,
        filename: Option<&str>,
        desc: bool,
        username: Option<&str>,
    ) -> Result<Vec<UserUsageRecord>> {
        let filename = require_filename(filename)?;
        let path = self.files.locate(filename).await?;

        let mut args = vec![path_arg(&path)];
        if desc {
            args.push(FLAG_DESC.to_string());
        }

        let output = self.run(SCRIPT_ORDER_BY_USERNAME, &args).await?;
        if output.trim().is_empty() {
            return Err(empty_output(SCRIPT_ORDER_BY_USERNAME));
        }

        let records = parse_usage_lines(&output)?;
        Ok(filter_by_username(records, username))
    }

    /// Users whose inbox message count lies in `[low, high]`.
    ///
    /// Unlike the other queries, empty script output is a valid empty result.
    pub async fn between_msgs(
        &self,
        filename: Option<&str>,
        low: Option<&str>,
        high: Option<&str>,
        username: Option<&str>,
    ) -> Result<Vec<UserUsageRecord>> {
        let (filename, low, high) = match (filename.filter(|f| !f.is_empty()), low, high) {
            (Some(filename), Some(low), Some(high)) => (filename, low, high),
            _ => return Err(AppError::MissingParameter(MSG_RANGE_REQUIRED.to_string())),
        };

        let (low, high) = match (low.trim().parse::<i64>(), high.trim().parse::<i64>()) {
            (Ok(low), Ok(high)) => (low, high),
            _ => return Err(AppError::InvalidInput(MSG_RANGE_NOT_INTEGER.to_string())),
        };

        let path = self.files.locate(filename).await?;
        let args = vec![path_arg(&path), low.to_string(), high.to_string()];

        let output = self.run(SCRIPT_BETWEEN_MSGS, &args).await?;
        if output.trim().is_empty() {
            return Ok(Vec::new());
        }

        let records = parse_usage_lines(&output)?;
        Ok(filter_by_username(records, username))
    }

    async fn run(&self, script: &str, args: &[String]) -> Result<String> {
        debug!("Invoking {} with {:?}", script, args);
        Ok(self.runner.run(script, args).await?)
    }
}

fn require_filename(filename: Option<&str>) -> Result<&str> {
    filename
        .filter(|f| !f.is_empty())
        .ok_or_else(|| AppError::MissingParameter(MSG_FILENAME_REQUIRED.to_string()))
}

fn path_arg(path: &Path) -> String {
    path.to_string_lossy().into_owned()
}

fn empty_output(script: &str) -> AppError {
    AppError::Script(format!("{} produced no output", script))
}

/// Case-sensitive substring filter; an empty filter keeps everything
fn filter_by_username(records: Vec<UserUsageRecord>, username: Option<&str>) -> Vec<UserUsageRecord> {
    match username.filter(|u| !u.is_empty()) {
        Some(needle) => records
            .into_iter()
            .filter(|r| r.username.contains(needle))
            .collect(),
        None => records,
    }
}
