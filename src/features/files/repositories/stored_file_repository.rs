use chrono::{DateTime, Utc};
use sqlx::{QueryBuilder, Sqlite, SqlitePool};
use tracing::info;
use uuid::Uuid;

use crate::core::error::{AppError, Result};
use crate::features::files::models::{RecordState, StoredFile};

const COLUMNS: &str = "id, filename, upload_date, created_at, updated_at, deleted_at";

/// Convert database error to more specific AppError
fn handle_db_error(e: sqlx::Error, filename: &str) -> AppError {
    if let sqlx::Error::Database(db_err) = &e {
        if db_err.is_unique_violation() {
            return AppError::Conflict(format!(
                "A record for '{}' already exists (possibly soft-deleted)",
                filename
            ));
        }
    }

    AppError::Database(e)
}

/// Escape `%`, `_` and the escape char itself for a LIKE pattern using `ESCAPE '\'`
fn escape_like(term: &str) -> String {
    let mut escaped = String::with_capacity(term.len());
    for c in term.chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

/// Soft-delete aware store for uploaded file metadata.
///
/// All records live in one table; "alive" and "dead" views are filtered
/// queries on `deleted_at`.
pub struct StoredFileRepository {
    pool: SqlitePool,
}

impl StoredFileRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Register a new alive record uploaded now.
    ///
    /// Fails with `Conflict` when any record (alive or dead) already uses `filename`.
    pub async fn create(&self, filename: &str) -> Result<StoredFile> {
        self.insert(filename, None).await
    }

    /// Register a record with an explicit upload date
    pub async fn import(&self, filename: &str, upload_date: DateTime<Utc>) -> Result<StoredFile> {
        self.insert(filename, Some(upload_date)).await
    }

    async fn insert(
        &self,
        filename: &str,
        upload_date: Option<DateTime<Utc>>,
    ) -> Result<StoredFile> {
        let now = Utc::now();

        let record = sqlx::query_as::<_, StoredFile>(&format!(
            r#"
            INSERT INTO stored_files (id, filename, upload_date, created_at, updated_at, deleted_at)
            VALUES (?, ?, ?, ?, ?, NULL)
            RETURNING {COLUMNS}
            "#
        ))
        .bind(Uuid::now_v7())
        .bind(filename)
        .bind(upload_date.unwrap_or(now))
        .bind(now)
        .bind(now)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| handle_db_error(e, filename))?;

        info!(
            "Stored file registered: id={}, filename={}",
            record.id, record.filename
        );

        Ok(record)
    }

    /// Alive records ordered by filename
    pub async fn list_alive(&self) -> Result<Vec<StoredFile>> {
        self.list_by_state(RecordState::Alive).await
    }

    /// Soft-deleted records ordered by filename
    pub async fn list_dead(&self) -> Result<Vec<StoredFile>> {
        self.list_by_state(RecordState::Dead).await
    }

    async fn list_by_state(&self, state: RecordState) -> Result<Vec<StoredFile>> {
        let mut qb = QueryBuilder::<Sqlite>::new(format!("SELECT {COLUMNS} FROM stored_files"));
        push_filters(&mut qb, state, None);
        qb.push(" ORDER BY filename ASC");

        let records = qb
            .build_query_as::<StoredFile>()
            .fetch_all(&self.pool)
            .await?;

        Ok(records)
    }

    /// Filtered, paginated listing; returns the page and the total match count.
    ///
    /// `search` is a case-insensitive substring match on the filename.
    pub async fn list(
        &self,
        state: RecordState,
        search: Option<&str>,
        offset: i64,
        limit: i64,
    ) -> Result<(Vec<StoredFile>, i64)> {
        let search = search.map(str::trim).filter(|s| !s.is_empty());

        let mut count_qb = QueryBuilder::<Sqlite>::new("SELECT COUNT(*) FROM stored_files");
        push_filters(&mut count_qb, state, search);
        let total: i64 = count_qb
            .build_query_scalar::<i64>()
            .fetch_one(&self.pool)
            .await?;

        let mut qb = QueryBuilder::<Sqlite>::new(format!("SELECT {COLUMNS} FROM stored_files"));
        push_filters(&mut qb, state, search);
        qb.push(" ORDER BY filename ASC LIMIT ")
            .push_bind(limit)
            .push(" OFFSET ")
            .push_bind(offset);

        let records = qb
            .build_query_as::<StoredFile>()
            .fetch_all(&self.pool)
            .await?;

        Ok((records, total))
    }

    /// Whether an alive record exists for `filename`
    pub async fn exists(&self, filename: &str) -> Result<bool> {
        let count: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM stored_files WHERE filename = ? AND deleted_at IS NULL",
        )
        .bind(filename)
        .fetch_one(&self.pool)
        .await?;

        Ok(count > 0)
    }

    /// Lookup by id regardless of state
    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<StoredFile>> {
        let record = sqlx::query_as::<_, StoredFile>(&format!(
            "SELECT {COLUMNS} FROM stored_files WHERE id = ?"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(record)
    }

    /// Lookup by filename regardless of state
    pub async fn find_by_filename(&self, filename: &str) -> Result<Option<StoredFile>> {
        let record = sqlx::query_as::<_, StoredFile>(&format!(
            "SELECT {COLUMNS} FROM stored_files WHERE filename = ?"
        ))
        .bind(filename)
        .fetch_optional(&self.pool)
        .await?;

        Ok(record)
    }

    /// Mark a record as deleted; `None` if no such record
    pub async fn soft_delete(&self, id: Uuid) -> Result<Option<StoredFile>> {
        let now = Utc::now();

        let record = sqlx::query_as::<_, StoredFile>(&format!(
            r#"
            UPDATE stored_files
            SET deleted_at = ?, updated_at = ?
            WHERE id = ?
            RETURNING {COLUMNS}
            "#
        ))
        .bind(now)
        .bind(now)
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        if let Some(ref r) = record {
            info!("Stored file soft deleted: id={}, filename={}", r.id, r.filename);
        }

        Ok(record)
    }

    /// Clear `deleted_at`; `None` if no such record
    pub async fn restore(&self, id: Uuid) -> Result<Option<StoredFile>> {
        let record = sqlx::query_as::<_, StoredFile>(&format!(
            r#"
            UPDATE stored_files
            SET deleted_at = NULL, updated_at = ?
            WHERE id = ?
            RETURNING {COLUMNS}
            "#
        ))
        .bind(Utc::now())
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        if let Some(ref r) = record {
            info!("Stored file restored: id={}, filename={}", r.id, r.filename);
        }

        Ok(record)
    }

    /// Permanently remove a record; returns whether a row was deleted
    pub async fn hard_delete(&self, id: Uuid) -> Result<bool> {
        let result = sqlx::query("DELETE FROM stored_files WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;

        let deleted = result.rows_affected() > 0;
        if deleted {
            info!("Stored file hard deleted: id={}", id);
        }

        Ok(deleted)
    }

    pub async fn soft_delete_many(&self, ids: &[Uuid]) -> Result<u64> {
        if ids.is_empty() {
            return Ok(0);
        }

        let now = Utc::now();
        let mut qb = QueryBuilder::<Sqlite>::new("UPDATE stored_files SET deleted_at = ");
        qb.push_bind(now).push(", updated_at = ").push_bind(now);
        push_id_list(&mut qb, ids);

        let affected = qb.build().execute(&self.pool).await?.rows_affected();
        info!("Stored files soft deleted: count={}", affected);

        Ok(affected)
    }

    pub async fn restore_many(&self, ids: &[Uuid]) -> Result<u64> {
        if ids.is_empty() {
            return Ok(0);
        }

        let mut qb =
            QueryBuilder::<Sqlite>::new("UPDATE stored_files SET deleted_at = NULL, updated_at = ");
        qb.push_bind(Utc::now());
        push_id_list(&mut qb, ids);

        let affected = qb.build().execute(&self.pool).await?.rows_affected();
        info!("Stored files restored: count={}", affected);

        Ok(affected)
    }

    pub async fn hard_delete_many(&self, ids: &[Uuid]) -> Result<u64> {
        if ids.is_empty() {
            return Ok(0);
        }

        let mut qb = QueryBuilder::<Sqlite>::new("DELETE FROM stored_files");
        push_id_list(&mut qb, ids);

        let affected = qb.build().execute(&self.pool).await?.rows_affected();
        info!("Stored files hard deleted: count={}", affected);

        Ok(affected)
    }
}

fn push_filters(qb: &mut QueryBuilder<'_, Sqlite>, state: RecordState, search: Option<&str>) {
    qb.push(" WHERE 1 = 1");

    match state {
        RecordState::Alive => {
            qb.push(" AND deleted_at IS NULL");
        }
        RecordState::Dead => {
            qb.push(" AND deleted_at IS NOT NULL");
        }
        RecordState::All => {}
    }

    if let Some(term) = search {
        // SQLite LIKE is case-insensitive for ASCII
        qb.push(" AND filename LIKE ")
            .push_bind(format!("%{}%", escape_like(term)))
            .push(" ESCAPE '\\'");
    }
}

fn push_id_list(qb: &mut QueryBuilder<'_, Sqlite>, ids: &[Uuid]) {
    qb.push(" WHERE id IN (");
    let mut separated = qb.separated(", ");
    for id in ids {
        separated.push_bind(*id);
    }
    separated.push_unseparated(")");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::test_helpers::test_pool;

    async fn repository() -> StoredFileRepository {
        StoredFileRepository::new(test_pool().await)
    }

    #[test]
    fn test_escape_like() {
        assert_eq!(escape_like("100%_a\\b"), "100\\%\\_a\\\\b");
        assert_eq!(escape_like("plain.txt"), "plain.txt");
    }

    #[tokio::test]
    async fn test_create_sets_alive_record() {
        let repo = repository().await;

        let record = repo.create("testfile.txt").await.unwrap();
        assert_eq!(record.filename, "testfile.txt");
        assert!(record.deleted_at.is_none());
        assert_eq!(record.upload_date, record.created_at);
        assert!(repo.exists("testfile.txt").await.unwrap());
    }

    #[tokio::test]
    async fn test_create_duplicate_filename_conflicts() {
        let repo = repository().await;

        repo.create("unique.txt").await.unwrap();
        let err = repo.create("unique.txt").await.unwrap_err();
        assert!(matches!(err, AppError::Conflict(_)));
    }

    #[tokio::test]
    async fn test_uniqueness_includes_dead_records() {
        let repo = repository().await;

        let record = repo.create("gone.txt").await.unwrap();
        repo.soft_delete(record.id).await.unwrap();

        assert!(!repo.exists("gone.txt").await.unwrap());
        let err = repo.create("gone.txt").await.unwrap_err();
        assert!(matches!(err, AppError::Conflict(_)));
    }

    #[tokio::test]
    async fn test_list_alive_sorted_by_filename() {
        let repo = repository().await;

        for name in ["b.txt", "c.txt", "a.txt"] {
            repo.create(name).await.unwrap();
        }

        let names: Vec<String> = repo
            .list_alive()
            .await
            .unwrap()
            .into_iter()
            .map(|r| r.filename)
            .collect();
        assert_eq!(names, vec!["a.txt", "b.txt", "c.txt"]);
    }

    #[tokio::test]
    async fn test_soft_delete_restore_cycle() {
        let repo = repository().await;
        let record = repo.create("cycle.txt").await.unwrap();

        for _ in 0..2 {
            let dead = repo.soft_delete(record.id).await.unwrap().unwrap();
            assert!(dead.is_deleted());
            assert!(dead.updated_at >= record.updated_at);
            assert_eq!(dead.upload_date, record.upload_date);
            assert!(repo.list_alive().await.unwrap().is_empty());
            assert_eq!(repo.list_dead().await.unwrap().len(), 1);
            // still stored
            assert!(repo.find_by_id(record.id).await.unwrap().is_some());

            let alive = repo.restore(record.id).await.unwrap().unwrap();
            assert!(!alive.is_deleted());
            assert_eq!(alive.upload_date, record.upload_date);
            assert_eq!(repo.list_alive().await.unwrap().len(), 1);
            assert!(repo.list_dead().await.unwrap().is_empty());
        }
    }

    #[tokio::test]
    async fn test_hard_delete_is_permanent() {
        let repo = repository().await;
        let record = repo.create("doomed.txt").await.unwrap();

        assert!(repo.hard_delete(record.id).await.unwrap());
        assert!(repo.find_by_id(record.id).await.unwrap().is_none());
        assert!(repo.restore(record.id).await.unwrap().is_none());
        assert!(!repo.hard_delete(record.id).await.unwrap());

        // the filename is free again
        repo.create("doomed.txt").await.unwrap();
    }

    #[tokio::test]
    async fn test_mutations_on_missing_record() {
        let repo = repository().await;
        let id = Uuid::now_v7();

        assert!(repo.soft_delete(id).await.unwrap().is_none());
        assert!(repo.restore(id).await.unwrap().is_none());
        assert!(!repo.hard_delete(id).await.unwrap());
    }

    #[tokio::test]
    async fn test_import_keeps_given_upload_date() {
        let repo = repository().await;
        let upload_date = "2024-12-11T10:00:00Z".parse::<DateTime<Utc>>().unwrap();

        let record = repo.import("old.txt", upload_date).await.unwrap();
        assert_eq!(record.upload_date, upload_date);
        assert!(record.created_at > upload_date);

        let found = repo.find_by_filename("old.txt").await.unwrap().unwrap();
        assert_eq!(found.upload_date, upload_date);
    }

    #[tokio::test]
    async fn test_list_filters_search_and_pagination() {
        let repo = repository().await;

        let mut ids = Vec::new();
        for name in ["inbox_a.log", "inbox_b.log", "sent.log", "100%.log"] {
            ids.push(repo.create(name).await.unwrap().id);
        }
        repo.soft_delete(ids[1]).await.unwrap();

        let (all, total) = repo.list(RecordState::All, None, 0, 50).await.unwrap();
        assert_eq!(total, 4);
        assert_eq!(all.len(), 4);

        let (alive, total) = repo.list(RecordState::Alive, None, 0, 50).await.unwrap();
        assert_eq!(total, 3);
        assert!(alive.iter().all(|r| !r.is_deleted()));

        let (dead, _) = repo.list(RecordState::Dead, None, 0, 50).await.unwrap();
        assert_eq!(dead.len(), 1);
        assert_eq!(dead[0].filename, "inbox_b.log");

        let (found, total) = repo
            .list(RecordState::All, Some("INBOX"), 0, 50)
            .await
            .unwrap();
        assert_eq!(total, 2);
        assert_eq!(found[0].filename, "inbox_a.log");

        // wildcards in the search term are literal
        let (found, _) = repo.list(RecordState::All, Some("%"), 0, 50).await.unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].filename, "100%.log");

        let (page, total) = repo.list(RecordState::All, None, 1, 2).await.unwrap();
        assert_eq!(total, 4);
        assert_eq!(page.len(), 2);
    }

    #[tokio::test]
    async fn test_bulk_operations() {
        let repo = repository().await;

        let mut ids = Vec::new();
        for name in ["one.txt", "two.txt", "three.txt"] {
            ids.push(repo.create(name).await.unwrap().id);
        }

        assert_eq!(repo.soft_delete_many(&ids[..2]).await.unwrap(), 2);
        assert_eq!(repo.list_alive().await.unwrap().len(), 1);

        assert_eq!(repo.restore_many(&ids).await.unwrap(), 3);
        assert_eq!(repo.list_alive().await.unwrap().len(), 3);

        assert_eq!(repo.hard_delete_many(&[ids[0], Uuid::now_v7()]).await.unwrap(), 1);
        assert_eq!(repo.list(RecordState::All, None, 0, 50).await.unwrap().1, 2);

        assert_eq!(repo.soft_delete_many(&[]).await.unwrap(), 0);
    }
}
