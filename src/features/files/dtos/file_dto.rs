use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

use crate::features::files::models::StoredFile;
use crate::shared::validation::{validate_filename, validate_iso8601};

/// Public view of an uploaded file
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct StoredFileDto {
    #[validate(
        length(min = 1, message = "This field may not be blank."),
        custom(function = validate_filename)
    )]
    #[schema(example = "test_file.txt")]
    pub filename: String,

    /// ISO-8601 timestamp
    #[validate(custom(function = validate_iso8601))]
    #[schema(example = "2024-12-11T10:00:00+00:00")]
    pub upload_date: String,
}

impl From<&StoredFile> for StoredFileDto {
    fn from(file: &StoredFile) -> Self {
        Self {
            filename: file.filename.clone(),
            upload_date: file.upload_date.to_rfc3339(),
        }
    }
}

impl From<StoredFile> for StoredFileDto {
    fn from(file: StoredFile) -> Self {
        Self {
            upload_date: file.upload_date.to_rfc3339(),
            filename: file.filename,
        }
    }
}

/// Query params for `PUT /upload-file`
#[derive(Debug, Clone, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct UploadQuery {
    /// Target file name (`[A-Za-z0-9._-]+`)
    pub filename: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use uuid::Uuid;

    #[test]
    fn test_from_stored_file_renders_iso8601() {
        let upload_date = Utc.with_ymd_and_hms(2024, 12, 11, 10, 0, 0).unwrap();
        let file = StoredFile {
            id: Uuid::now_v7(),
            filename: "test_file.txt".to_string(),
            upload_date,
            created_at: upload_date,
            updated_at: upload_date,
            deleted_at: None,
        };

        let dto = StoredFileDto::from(&file);
        assert_eq!(dto.filename, "test_file.txt");
        assert_eq!(dto.upload_date, "2024-12-11T10:00:00+00:00");

        let json = serde_json::to_value(&dto).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "filename": "test_file.txt",
                "upload_date": "2024-12-11T10:00:00+00:00"
            })
        );
    }

    #[test]
    fn test_validate_accepts_valid_dto() {
        let dto = StoredFileDto {
            filename: "valid_file.txt".to_string(),
            upload_date: "2024-12-11T10:00:00Z".to_string(),
        };
        assert!(dto.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_bad_date() {
        let dto = StoredFileDto {
            filename: "valid_file.txt".to_string(),
            upload_date: "invalid-date".to_string(),
        };
        let errors = dto.validate().unwrap_err();
        assert!(errors.field_errors().contains_key("upload_date"));
    }

    #[test]
    fn test_validate_rejects_bad_filename() {
        for filename in ["", "invalid@file.txt", "a/b", ".", ".."] {
            let dto = StoredFileDto {
                filename: filename.to_string(),
                upload_date: "2024-12-11".to_string(),
            };
            let errors = dto.validate().unwrap_err();
            assert!(errors.field_errors().contains_key("filename"), "{filename:?}");
        }
    }
}
