use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use lazy_static::lazy_static;
use regex::Regex;
use validator::ValidationError;

use crate::shared::constants::MSG_INVALID_FILENAME;

lazy_static! {
    /// Regex for validating uploaded file names
    /// Letters, digits, dot, underscore and hyphen only; no path separators
    /// - Valid: "test_file.txt", "mbox-2024.log", ".profile"
    /// - Invalid: "invalid@file.txt", "dir/file", "my file", ""
    pub static ref FILENAME_REGEX: Regex = Regex::new(r"^[A-Za-z0-9._-]+$").unwrap();
}

/// Character class check plus a ban on dot-only names (`.`, `..`), which
/// resolve to directories instead of entries of the upload directory
pub fn is_valid_filename(filename: &str) -> bool {
    FILENAME_REGEX.is_match(filename) && !filename.chars().all(|c| c == '.')
}

/// `validator` hook for uploaded file names
pub fn validate_filename(value: &str) -> Result<(), ValidationError> {
    if is_valid_filename(value) {
        Ok(())
    } else {
        let mut err = ValidationError::new("filename");
        err.message = Some(MSG_INVALID_FILENAME.into());
        Err(err)
    }
}

/// Parse an ISO-8601 timestamp.
///
/// Accepts RFC 3339 (`2024-12-11T10:00:00Z`, `2024-12-11T10:00:00.5+02:00`),
/// naive date-times taken as UTC (`2024-12-11T10:00:00`, `2024-12-11 10:00`)
/// and plain dates (`2024-12-11`, midnight UTC).
pub fn parse_iso8601(value: &str) -> Option<DateTime<Utc>> {
    let value = value.trim();

    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Some(dt.with_timezone(&Utc));
    }

    const NAIVE_FORMATS: [&str; 4] = [
        "%Y-%m-%dT%H:%M:%S%.f",
        "%Y-%m-%dT%H:%M",
        "%Y-%m-%d %H:%M:%S%.f",
        "%Y-%m-%d %H:%M",
    ];
    for format in NAIVE_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(value, format) {
            return Some(naive.and_utc());
        }
    }

    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

/// `validator` hook for ISO-8601 string fields
pub fn validate_iso8601(value: &str) -> Result<(), ValidationError> {
    match parse_iso8601(value) {
        Some(_) => Ok(()),
        None => {
            let mut err = ValidationError::new("iso8601");
            err.message = Some("Invalid date format.".into());
            Err(err)
        }
    }
}
