use std::sync::Arc;
use uuid::Uuid;

use crate::core::error::{AppError, Result};
use crate::features::admin::dtos::*;
use crate::features::files::dtos::StoredFileDto;
use crate::features::files::StoredFileRepository;
use crate::shared::validation::parse_iso8601;

/// Service for the stored-file admin console.
///
/// Works on metadata only; the bytes on disk are never touched.
pub struct AdminService {
    repository: Arc<StoredFileRepository>,
}

impl AdminService {
    pub fn new(repository: Arc<StoredFileRepository>) -> Self {
        Self { repository }
    }

    // =========================================================================
    // STORED FILES
    // =========================================================================

    /// List records with state filter, search and pagination
    pub async fn list_files(
        &self,
        params: &AdminFileQueryParams,
    ) -> Result<(Vec<AdminStoredFileDto>, i64)> {
        let (rows, total) = self
            .repository
            .list(
                params.state,
                params.search.as_deref(),
                params.offset(),
                params.limit(),
            )
            .await?;

        let items = rows.into_iter().map(AdminStoredFileDto::from).collect();

        Ok((items, total))
    }

    /// Register metadata for a file with a known upload date
    pub async fn import_file(&self, dto: &StoredFileDto) -> Result<AdminStoredFileDto> {
        let upload_date = parse_iso8601(&dto.upload_date)
            .ok_or_else(|| AppError::InvalidInput("Invalid date format.".to_string()))?;

        let record = self.repository.import(&dto.filename, upload_date).await?;

        Ok(record.into())
    }

    pub async fn get_file(&self, id: Uuid) -> Result<AdminStoredFileDto> {
        self.repository
            .find_by_id(id)
            .await?
            .map(AdminStoredFileDto::from)
            .ok_or_else(|| not_found(id))
    }

    pub async fn soft_delete_file(&self, id: Uuid) -> Result<AdminStoredFileDto> {
        self.repository
            .soft_delete(id)
            .await?
            .map(AdminStoredFileDto::from)
            .ok_or_else(|| not_found(id))
    }

    pub async fn restore_file(&self, id: Uuid) -> Result<AdminStoredFileDto> {
        self.repository
            .restore(id)
            .await?
            .map(AdminStoredFileDto::from)
            .ok_or_else(|| not_found(id))
    }

    pub async fn hard_delete_file(&self, id: Uuid) -> Result<()> {
        if !self.repository.hard_delete(id).await? {
            return Err(not_found(id));
        }

        Ok(())
    }

    // =========================================================================
    // BULK ACTIONS
    // =========================================================================

    /// Apply `action` to every listed record; unknown ids are skipped
    pub async fn bulk_action(
        &self,
        action: BulkAction,
        ids: &[Uuid],
    ) -> Result<BulkActionResponseDto> {
        let affected = match action {
            BulkAction::SoftDelete => self.repository.soft_delete_many(ids).await?,
            BulkAction::Restore => self.repository.restore_many(ids).await?,
            BulkAction::HardDelete => self.repository.hard_delete_many(ids).await?,
        };

        Ok(BulkActionResponseDto {
            affected,
            detail: action.message(affected),
        })
    }
}

fn not_found(id: Uuid) -> AppError {
    AppError::NotFound(format!("Stored file with id {} not found", id))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::files::models::RecordState;
    use crate::shared::test_helpers::test_pool;

    async fn service() -> (AdminService, Arc<StoredFileRepository>) {
        let repository = Arc::new(StoredFileRepository::new(test_pool().await));
        (AdminService::new(Arc::clone(&repository)), repository)
    }

    fn params(state: RecordState, search: Option<&str>) -> AdminFileQueryParams {
        AdminFileQueryParams {
            page: 1,
            page_size: 50,
            state,
            search: search.map(str::to_string),
        }
    }

    #[tokio::test]
    async fn test_import_and_get() {
        let (service, _repository) = service().await;

        let dto = StoredFileDto {
            filename: "legacy.log".to_string(),
            upload_date: "2024-12-11T10:00:00Z".to_string(),
        };
        let imported = service.import_file(&dto).await.unwrap();
        assert_eq!(imported.upload_date.to_rfc3339(), "2024-12-11T10:00:00+00:00");
        assert!(!imported.is_deleted);

        let fetched = service.get_file(imported.id).await.unwrap();
        assert_eq!(fetched.filename, "legacy.log");

        let err = service.import_file(&dto).await.unwrap_err();
        assert!(matches!(err, AppError::Conflict(_)));
    }

    #[tokio::test]
    async fn test_single_record_lifecycle() {
        let (service, repository) = service().await;
        let record = repository.create("life.txt").await.unwrap();

        let dead = service.soft_delete_file(record.id).await.unwrap();
        assert!(dead.is_deleted);
        assert!(dead.deleted_at.is_some());

        let alive = service.restore_file(record.id).await.unwrap();
        assert!(!alive.is_deleted);

        service.hard_delete_file(record.id).await.unwrap();
        assert!(matches!(
            service.get_file(record.id).await.unwrap_err(),
            AppError::NotFound(_)
        ));
        assert!(matches!(
            service.hard_delete_file(record.id).await.unwrap_err(),
            AppError::NotFound(_)
        ));
        assert!(matches!(
            service.restore_file(record.id).await.unwrap_err(),
            AppError::NotFound(_)
        ));
    }

    #[tokio::test]
    async fn test_list_files_by_state() {
        let (service, repository) = service().await;

        let a = repository.create("a.txt").await.unwrap();
        repository.create("b.txt").await.unwrap();
        repository.soft_delete(a.id).await.unwrap();

        let (items, total) = service
            .list_files(&params(RecordState::Dead, None))
            .await
            .unwrap();
        assert_eq!(total, 1);
        assert_eq!(items[0].filename, "a.txt");
        assert!(items[0].is_deleted);

        let (items, total) = service
            .list_files(&params(RecordState::All, Some("B.T")))
            .await
            .unwrap();
        assert_eq!(total, 1);
        assert_eq!(items[0].filename, "b.txt");
    }

    #[tokio::test]
    async fn test_bulk_actions_report_counts() {
        let (service, repository) = service().await;

        let mut ids = Vec::new();
        for name in ["x.txt", "y.txt"] {
            ids.push(repository.create(name).await.unwrap().id);
        }

        let result = service
            .bulk_action(BulkAction::SoftDelete, &ids)
            .await
            .unwrap();
        assert_eq!(result.affected, 2);
        assert_eq!(result.detail, "2 records marked as deleted.");

        let result = service
            .bulk_action(BulkAction::Restore, &ids[..1])
            .await
            .unwrap();
        assert_eq!(result.detail, "1 records restored.");

        let result = service
            .bulk_action(BulkAction::HardDelete, &ids)
            .await
            .unwrap();
        assert_eq!(result.detail, "2 records permanently deleted.");
        assert!(repository.list_dead().await.unwrap().is_empty());
    }
}
