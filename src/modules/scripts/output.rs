//! Line contract for script output
//!
//! Every record is one line of at least five whitespace-separated tokens:
//!
//! ```text
//! <username> <folder> <numberMessages> <label> <size> [ignored...]
//! ```
//!
//! No quoting or escaping exists, so fields cannot contain whitespace.

use thiserror::Error;

const MIN_TOKENS: usize = 5;

/// One user's mailbox usage, as reported by a script
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserUsageRecord {
    pub username: String,
    pub folder: String,
    pub number_messages: u64,
    pub size: u64,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum LineFormatError {
    #[error("expected at least 5 tokens, found {found}: {line:?}")]
    TooFewTokens { found: usize, line: String },

    #[error("{field} is not a non-negative integer ({value:?}): {line:?}")]
    InvalidNumber {
        field: &'static str,
        value: String,
        line: String,
    },
}

/// Parse a single output line into a usage record
pub fn parse_usage_line(line: &str) -> Result<UserUsageRecord, LineFormatError> {
    let tokens: Vec<&str> = line.split_whitespace().collect();

    if tokens.len() < MIN_TOKENS {
        return Err(LineFormatError::TooFewTokens {
            found: tokens.len(),
            line: line.to_string(),
        });
    }

    // tokens[3] is a unit label ("size", "messages", ...) and is not checked
    Ok(UserUsageRecord {
        username: tokens[0].to_string(),
        folder: tokens[1].to_string(),
        number_messages: parse_count("numberMessages", tokens[2], line)?,
        size: parse_count("size", tokens[4], line)?,
    })
}

/// Parse every non-blank line of a script's output.
///
/// Fails on the first malformed line; callers never see partial results.
pub fn parse_usage_lines(output: &str) -> Result<Vec<UserUsageRecord>, LineFormatError> {
    output
        .lines()
        .filter(|line| !line.trim().is_empty())
        .map(parse_usage_line)
        .collect()
}

fn parse_count(field: &'static str, value: &str, line: &str) -> Result<u64, LineFormatError> {
    value
        .parse::<u64>()
        .map_err(|_| LineFormatError::InvalidNumber {
            field,
            value: value.to_string(),
            line: line.to_string(),
        })
}
