use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

use crate::features::files::models::{RecordState, StoredFile};
use crate::shared::constants::{DEFAULT_PAGE_SIZE, MAX_PAGE_SIZE};

// =============================================================================
// STORED FILE DTOs
// =============================================================================

/// Query params for listing stored files
#[derive(Debug, Clone, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct AdminFileQueryParams {
    /// Page number (1-indexed)
    #[serde(default = "default_page")]
    #[param(minimum = 1)]
    pub page: i64,
    /// Items per page
    #[serde(default = "default_page_size")]
    #[param(minimum = 1, maximum = 500)]
    pub page_size: i64,
    /// alive, dead or all (default: all)
    #[serde(default)]
    #[param(inline)]
    pub state: RecordState,
    /// Case-insensitive substring of the filename
    pub search: Option<String>,
}

impl AdminFileQueryParams {
    pub fn offset(&self) -> i64 {
        self.page
            .max(1)
            .saturating_sub(1)
            .saturating_mul(self.limit())
    }
    pub fn limit(&self) -> i64 {
        self.page_size.clamp(1, MAX_PAGE_SIZE)
    }
}

/// Admin view of a stored file record
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct AdminStoredFileDto {
    pub id: Uuid,
    pub filename: String,
    pub upload_date: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub deleted_at: Option<DateTime<Utc>>,
    pub is_deleted: bool,
}

impl From<StoredFile> for AdminStoredFileDto {
    fn from(file: StoredFile) -> Self {
        Self {
            is_deleted: file.is_deleted(),
            id: file.id,
            filename: file.filename,
            upload_date: file.upload_date,
            created_at: file.created_at,
            updated_at: file.updated_at,
            deleted_at: file.deleted_at,
        }
    }
}

// =============================================================================
// BULK ACTION DTOs
// =============================================================================

/// Action applied to a set of records at once
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BulkAction {
    SoftDelete,
    Restore,
    HardDelete,
}

impl FromStr for BulkAction {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "soft-delete" => Ok(BulkAction::SoftDelete),
            "restore" => Ok(BulkAction::Restore),
            "hard-delete" => Ok(BulkAction::HardDelete),
            other => Err(format!("Unknown action: {}", other)),
        }
    }
}

impl BulkAction {
    /// Admin message for `count` affected records
    pub fn message(&self, count: u64) -> String {
        match self {
            BulkAction::SoftDelete => format!("{} records marked as deleted.", count),
            BulkAction::Restore => format!("{} records restored.", count),
            BulkAction::HardDelete => format!("{} records permanently deleted.", count),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct BulkActionDto {
    #[validate(length(min = 1, message = "At least one id is required"))]
    pub ids: Vec<Uuid>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct BulkActionResponseDto {
    pub affected: u64,
    #[schema(example = "2 records marked as deleted.")]
    pub detail: String,
}

fn default_page() -> i64 {
    1
}

fn default_page_size() -> i64 {
    DEFAULT_PAGE_SIZE
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bulk_action_parse_and_message() {
        assert_eq!("soft-delete".parse(), Ok(BulkAction::SoftDelete));
        assert_eq!("restore".parse(), Ok(BulkAction::Restore));
        assert_eq!("hard-delete".parse(), Ok(BulkAction::HardDelete));
        assert!("purge".parse::<BulkAction>().is_err());

        assert_eq!(
            BulkAction::SoftDelete.message(2),
            "2 records marked as deleted."
        );
        assert_eq!(BulkAction::Restore.message(1), "1 records restored.");
        assert_eq!(
            BulkAction::HardDelete.message(0),
            "0 records permanently deleted."
        );
    }

    #[test]
    fn test_query_params_defaults() {
        let params: AdminFileQueryParams = serde_json::from_str("{}").unwrap();
        assert_eq!(params.state, RecordState::All);
        assert_eq!(params.offset(), 0);
        assert_eq!(params.limit(), DEFAULT_PAGE_SIZE);

        let params: AdminFileQueryParams =
            serde_json::from_str(r#"{"state": "dead", "page": 2, "page_size": 10}"#).unwrap();
        assert_eq!(params.state, RecordState::Dead);
        assert_eq!(params.offset(), 10);
    }

    #[test]
    fn test_query_params_huge_page_saturates() {
        let params: AdminFileQueryParams = serde_json::from_str(&format!(
            r#"{{"page": {}, "page_size": 500}}"#,
            i64::MAX
        ))
        .unwrap();
        assert_eq!(params.offset(), i64::MAX);
        assert_eq!(params.limit(), 500);

        let params: AdminFileQueryParams =
            serde_json::from_str(r#"{"page": -5, "page_size": 0}"#).unwrap();
        assert_eq!(params.offset(), 0);
        assert_eq!(params.limit(), 1);
    }
}
