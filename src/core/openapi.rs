use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::features::admin::{dtos as admin_dtos, handlers as admin_handlers};
use crate::features::files::{dtos as files_dtos, handlers as files_handlers, models as files_models};
use crate::features::stats::{dtos as stats_dtos, handlers as stats_handlers};
use crate::shared::types::{ApiResponse, DetailResponse, Meta};

#[derive(OpenApi)]
#[openapi(
    paths(
        // Files
        files_handlers::upload_file,
        files_handlers::list_files,
        // Stats
        stats_handlers::max_min_size,
        stats_handlers::order_by_username,
        stats_handlers::between_msgs,
        // Admin
        admin_handlers::list_files,
        admin_handlers::import_file,
        admin_handlers::get_file,
        admin_handlers::soft_delete_file,
        admin_handlers::restore_file,
        admin_handlers::hard_delete_file,
        admin_handlers::bulk_action,
    ),
    components(
        schemas(
            DetailResponse,
            Meta,
            files_dtos::StoredFileDto,
            files_models::RecordState,
            stats_dtos::UserUsageDto,
            admin_dtos::AdminStoredFileDto,
            admin_dtos::BulkActionDto,
            admin_dtos::BulkActionResponseDto,
            ApiResponse<admin_dtos::AdminStoredFileDto>,
            ApiResponse<Vec<admin_dtos::AdminStoredFileDto>>,
            ApiResponse<admin_dtos::BulkActionResponseDto>,
        )
    ),
    tags(
        (name = "files", description = "File upload and listing"),
        (name = "stats", description = "Mailbox statistics computed by external scripts"),
        (name = "admin", description = "Stored file administration (soft delete, restore, hard delete)"),
    ),
    modifiers(&SecurityAddon),
    info(
        title = "Mailstat API",
        version = "0.1.0",
        description = "API documentation for Mailstat",
    )
)]
pub struct ApiDoc;

/// Adds the HTTP basic security scheme to the OpenAPI document
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "basic_auth",
                SecurityScheme::Http(HttpBuilder::new().scheme(HttpAuthScheme::Basic).build()),
            );
        }
    }
}

/// Modifier to override OpenAPI info from config
pub struct SwaggerInfoModifier {
    pub title: String,
    pub version: String,
    pub description: String,
}

impl Modify for SwaggerInfoModifier {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        openapi.info.title = self.title.clone();
        openapi.info.version = self.version.clone();
        openapi.info.description = Some(self.description.clone());
    }
}
