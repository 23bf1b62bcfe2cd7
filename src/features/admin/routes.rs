use std::sync::Arc;

use axum::{
    routing::{get, post},
    Router,
};

use crate::features::admin::handlers;
use crate::features::admin::services::AdminService;

/// Create admin routes; callers decide whether to put them behind basic auth
pub fn routes(admin_service: Arc<AdminService>) -> Router {
    Router::new()
        .route(
            "/files",
            get(handlers::list_files).post(handlers::import_file),
        )
        .route(
            "/files/{id}",
            get(handlers::get_file).delete(handlers::hard_delete_file),
        )
        .route("/files/{id}/soft-delete", post(handlers::soft_delete_file))
        .route("/files/{id}/restore", post(handlers::restore_file))
        .route("/files/actions/{action}", post(handlers::bulk_action))
        .with_state(admin_service)
}
