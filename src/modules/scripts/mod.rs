//! External statistics scripts
//!
//! Runs the text-processing scripts as child processes and parses their
//! line-oriented output into usage records.

mod output;
mod runner;

pub use output::{parse_usage_line, parse_usage_lines, LineFormatError, UserUsageRecord};
pub use runner::{ProcessScriptRunner, ScriptError, ScriptRunner};
