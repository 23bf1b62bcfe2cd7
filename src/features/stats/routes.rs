use axum::{routing::get, Router};
use std::sync::Arc;

use crate::features::stats::handlers::{between_msgs, max_min_size, order_by_username};
use crate::features::stats::services::StatsService;

/// Create routes for the stats feature
pub fn routes(stats_service: Arc<StatsService>) -> Router {
    Router::new()
        .route("/max-min-size", get(max_min_size))
        .route("/order-by-username", get(order_by_username))
        .route("/between-msgs", get(between_msgs))
        .with_state(stats_service)
}
