use std::sync::Arc;

use axum::{extract::State, http::StatusCode, Json};
use uuid::Uuid;
use validator::Validate;

use crate::core::error::{AppError, Result};
use crate::core::extractor::{AppJson, AppPath, AppQuery};
use crate::features::admin::dtos::*;
use crate::features::admin::services::AdminService;
use crate::features::files::dtos::StoredFileDto;
use crate::shared::types::{ApiResponse, DetailResponse, Meta};

/// List stored files (paginated)
#[utoipa::path(
    get,
    path = "/admin/files",
    params(AdminFileQueryParams),
    responses(
        (status = 200, description = "List of stored files", body = ApiResponse<Vec<AdminStoredFileDto>>),
        (status = 401, description = "Unauthorized")
    ),
    tag = "admin",
    security(
        ("basic_auth" = [])
    )
)]
pub async fn list_files(
    State(service): State<Arc<AdminService>>,
    AppQuery(params): AppQuery<AdminFileQueryParams>,
) -> Result<Json<ApiResponse<Vec<AdminStoredFileDto>>>> {
    let (items, total) = service.list_files(&params).await?;

    Ok(Json(ApiResponse::success(
        Some(items),
        None,
        Some(Meta { total }),
    )))
}

/// Register an existing file
///
/// Creates metadata with an explicit upload date, e.g. for an orphan file on disk.
#[utoipa::path(
    post,
    path = "/admin/files",
    request_body = StoredFileDto,
    responses(
        (status = 201, description = "Record created", body = ApiResponse<AdminStoredFileDto>),
        (status = 400, description = "Validation error", body = DetailResponse),
        (status = 401, description = "Unauthorized"),
        (status = 409, description = "Filename already registered", body = DetailResponse)
    ),
    tag = "admin",
    security(
        ("basic_auth" = [])
    )
)]
pub async fn import_file(
    State(service): State<Arc<AdminService>>,
    AppJson(dto): AppJson<StoredFileDto>,
) -> Result<(StatusCode, Json<ApiResponse<AdminStoredFileDto>>)> {
    dto.validate()
        .map_err(|e| AppError::InvalidInput(e.to_string()))?;

    let record = service.import_file(&dto).await?;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success(
            Some(record),
            Some("Record created".to_string()),
            None,
        )),
    ))
}

/// Get a stored file record in any state
#[utoipa::path(
    get,
    path = "/admin/files/{id}",
    params(("id" = Uuid, Path, description = "Record id")),
    responses(
        (status = 200, description = "Stored file", body = ApiResponse<AdminStoredFileDto>),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Not found", body = DetailResponse)
    ),
    tag = "admin",
    security(
        ("basic_auth" = [])
    )
)]
pub async fn get_file(
    State(service): State<Arc<AdminService>>,
    AppPath(id): AppPath<Uuid>,
) -> Result<Json<ApiResponse<AdminStoredFileDto>>> {
    let record = service.get_file(id).await?;

    Ok(Json(ApiResponse::success(Some(record), None, None)))
}

/// Soft delete a stored file record
#[utoipa::path(
    post,
    path = "/admin/files/{id}/soft-delete",
    params(("id" = Uuid, Path, description = "Record id")),
    responses(
        (status = 200, description = "Record marked as deleted", body = ApiResponse<AdminStoredFileDto>),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Not found", body = DetailResponse)
    ),
    tag = "admin",
    security(
        ("basic_auth" = [])
    )
)]
pub async fn soft_delete_file(
    State(service): State<Arc<AdminService>>,
    AppPath(id): AppPath<Uuid>,
) -> Result<Json<ApiResponse<AdminStoredFileDto>>> {
    let record = service.soft_delete_file(id).await?;

    Ok(Json(ApiResponse::success(
        Some(record),
        Some("Record marked as deleted.".to_string()),
        None,
    )))
}

/// Restore a soft-deleted record
#[utoipa::path(
    post,
    path = "/admin/files/{id}/restore",
    params(("id" = Uuid, Path, description = "Record id")),
    responses(
        (status = 200, description = "Record restored", body = ApiResponse<AdminStoredFileDto>),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Not found", body = DetailResponse)
    ),
    tag = "admin",
    security(
        ("basic_auth" = [])
    )
)]
pub async fn restore_file(
    State(service): State<Arc<AdminService>>,
    AppPath(id): AppPath<Uuid>,
) -> Result<Json<ApiResponse<AdminStoredFileDto>>> {
    let record = service.restore_file(id).await?;

    Ok(Json(ApiResponse::success(
        Some(record),
        Some("Record restored.".to_string()),
        None,
    )))
}

/// Permanently delete a record
#[utoipa::path(
    delete,
    path = "/admin/files/{id}",
    params(("id" = Uuid, Path, description = "Record id")),
    responses(
        (status = 204, description = "Record permanently deleted"),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Not found", body = DetailResponse)
    ),
    tag = "admin",
    security(
        ("basic_auth" = [])
    )
)]
pub async fn hard_delete_file(
    State(service): State<Arc<AdminService>>,
    AppPath(id): AppPath<Uuid>,
) -> Result<StatusCode> {
    service.hard_delete_file(id).await?;

    Ok(StatusCode::NO_CONTENT)
}

/// Apply an action to several records
#[utoipa::path(
    post,
    path = "/admin/files/actions/{action}",
    params(("action" = String, Path, description = "soft-delete, restore or hard-delete")),
    request_body = BulkActionDto,
    responses(
        (status = 200, description = "Action applied", body = ApiResponse<BulkActionResponseDto>),
        (status = 400, description = "Validation error", body = DetailResponse),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Unknown action", body = DetailResponse)
    ),
    tag = "admin",
    security(
        ("basic_auth" = [])
    )
)]
pub async fn bulk_action(
    State(service): State<Arc<AdminService>>,
    AppPath(action): AppPath<String>,
    AppJson(dto): AppJson<BulkActionDto>,
) -> Result<Json<ApiResponse<BulkActionResponseDto>>> {
    let action: BulkAction = action.parse().map_err(AppError::NotFound)?;

    dto.validate()
        .map_err(|e| AppError::InvalidInput(e.to_string()))?;

    let result = service.bulk_action(action, &dto.ids).await?;
    let message = result.detail.clone();

    Ok(Json(ApiResponse::success(Some(result), Some(message), None)))
}

#[cfg(test)]
mod tests {
    use crate::core::middleware::basic_auth_middleware;
    use crate::features::admin::{routes, AdminService};
    use crate::features::files::StoredFileRepository;
    use crate::shared::test_helpers::test_pool;
    use axum::http::{header, HeaderValue, StatusCode};
    use axum::{middleware::from_fn, Router};
    use axum_test::TestServer;
    use base64::{engine::general_purpose::STANDARD, Engine};
    use serde_json::{json, Value};
    use std::sync::Arc;

    async fn server() -> (TestServer, Arc<StoredFileRepository>) {
        let repository = Arc::new(StoredFileRepository::new(test_pool().await));
        let service = Arc::new(AdminService::new(Arc::clone(&repository)));
        let app = Router::new().nest("/admin", routes(service));

        (TestServer::new(app).unwrap(), repository)
    }

    #[tokio::test]
    async fn test_list_and_record_actions() {
        let (server, repository) = server().await;
        let a = repository.create("a.txt").await.unwrap();
        repository.create("b.txt").await.unwrap();

        let response = server
            .post(&format!("/admin/files/{}/soft-delete", a.id))
            .await;
        response.assert_status_ok();
        let body: Value = response.json();
        assert_eq!(body["success"], true);
        assert_eq!(body["data"]["is_deleted"], true);

        let response = server
            .get("/admin/files")
            .add_query_param("state", "alive")
            .await;
        response.assert_status_ok();
        let body: Value = response.json();
        assert_eq!(body["meta"]["total"], 1);
        assert_eq!(body["data"][0]["filename"], "b.txt");

        let response = server.post(&format!("/admin/files/{}/restore", a.id)).await;
        response.assert_status_ok();

        let response = server.delete(&format!("/admin/files/{}", a.id)).await;
        response.assert_status(StatusCode::NO_CONTENT);

        let response = server.get(&format!("/admin/files/{}", a.id)).await;
        response.assert_status(StatusCode::NOT_FOUND);

        let response = server.get("/admin/files/not-a-uuid").await;
        response.assert_status(StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_import_validation_and_conflict() {
        let (server, _repository) = server().await;

        let response = server
            .post("/admin/files")
            .json(&json!({ "filename": "valid_file.txt", "upload_date": "invalid-date" }))
            .await;
        response.assert_status(StatusCode::BAD_REQUEST);

        let body = json!({ "filename": "valid_file.txt", "upload_date": "2024-12-11T10:00:00Z" });
        let response = server.post("/admin/files").json(&body).await;
        response.assert_status(StatusCode::CREATED);
        let created: Value = response.json();
        assert_eq!(created["data"]["filename"], "valid_file.txt");

        let response = server.post("/admin/files").json(&body).await;
        response.assert_status(StatusCode::CONFLICT);
    }

    #[tokio::test]
    async fn test_bulk_actions() {
        let (server, repository) = server().await;
        let ids: Vec<String> = vec![
            repository.create("one.txt").await.unwrap().id.to_string(),
            repository.create("two.txt").await.unwrap().id.to_string(),
        ];

        let response = server
            .post("/admin/files/actions/soft-delete")
            .json(&json!({ "ids": ids }))
            .await;
        response.assert_status_ok();
        let body: Value = response.json();
        assert_eq!(body["data"]["affected"], 2);
        assert_eq!(body["data"]["detail"], "2 records marked as deleted.");

        let response = server
            .post("/admin/files/actions/hard-delete")
            .json(&json!({ "ids": ids }))
            .await;
        let body: Value = response.json();
        assert_eq!(body["message"], "2 records permanently deleted.");

        let response = server
            .post("/admin/files/actions/purge")
            .json(&json!({ "ids": ids }))
            .await;
        response.assert_status(StatusCode::NOT_FOUND);

        let response = server
            .post("/admin/files/actions/restore")
            .json(&json!({ "ids": [] }))
            .await;
        response.assert_status(StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_basic_auth_enforced() {
        let repository = Arc::new(StoredFileRepository::new(test_pool().await));
        let service = Arc::new(AdminService::new(repository));
        let credentials = Arc::new("admin:secret".to_string());
        let app = Router::new().nest(
            "/admin",
            routes(service).layer(from_fn(basic_auth_middleware(credentials, "Admin"))),
        );
        let server = TestServer::new(app).unwrap();

        let response = server.get("/admin/files").await;
        response.assert_status(StatusCode::UNAUTHORIZED);
        assert!(response.headers().contains_key(header::WWW_AUTHENTICATE));

        let wrong = format!("Basic {}", STANDARD.encode("admin:nope"));
        let response = server
            .get("/admin/files")
            .add_header(header::AUTHORIZATION, HeaderValue::from_str(&wrong).unwrap())
            .await;
        response.assert_status(StatusCode::UNAUTHORIZED);

        let right = format!("Basic {}", STANDARD.encode("admin:secret"));
        let response = server
            .get("/admin/files")
            .add_header(header::AUTHORIZATION, HeaderValue::from_str(&right).unwrap())
            .await;
        response.assert_status_ok();
    }
}
