use axum::{extract::State, Json};
use std::sync::Arc;

use crate::core::error::AppError;
use crate::core::extractor::AppQuery;
use crate::features::stats::dtos::{
    BetweenMsgsQuery, MaxMinSizeQuery, OrderByUsernameQuery, UserUsageDto,
};
use crate::features::stats::services::StatsService;
use crate::shared::types::DetailResponse;

/// Get user with largest/smallest size
///
/// Returns the user with the largest mailbox, or the smallest one if `min` is given.
#[utoipa::path(
    get,
    path = "/max-min-size",
    tag = "stats",
    params(MaxMinSizeQuery),
    responses(
        (status = 200, description = "Matching user", body = UserUsageDto),
        (status = 400, description = "Missing filename", body = DetailResponse),
        (status = 404, description = "File or script not found", body = DetailResponse),
        (status = 500, description = "Script failed", body = DetailResponse)
    )
)]
pub async fn max_min_size(
    State(service): State<Arc<StatsService>>,
    AppQuery(query): AppQuery<MaxMinSizeQuery>,
) -> Result<Json<UserUsageDto>, AppError> {
    let record = service
        .max_min_size(query.filename.as_deref(), query.min.is_some())
        .await?;

    Ok(Json(record.into()))
}

/// Get list of users ordered by username
#[utoipa::path(
    get,
    path = "/order-by-username",
    tag = "stats",
    params(OrderByUsernameQuery),
    responses(
        (status = 200, description = "Users in script order", body = Vec<UserUsageDto>),
        (status = 400, description = "Missing filename", body = DetailResponse),
        (status = 404, description = "File or script not found", body = DetailResponse),
        (status = 500, description = "Script failed", body = DetailResponse)
    )
)]
pub async fn order_by_username(
    State(service): State<Arc<StatsService>>,
    AppQuery(query): AppQuery<OrderByUsernameQuery>,
) -> Result<Json<Vec<UserUsageDto>>, AppError> {
    let records = service
        .order_by_username(
            query.filename.as_deref(),
            query.desc.is_some(),
            query.username.as_deref(),
        )
        .await?;

    Ok(Json(records.into_iter().map(UserUsageDto::from).collect()))
}

/// Get users with number of messages between range
#[utoipa::path(
    get,
    path = "/between-msgs",
    tag = "stats",
    params(BetweenMsgsQuery),
    responses(
        (status = 200, description = "Users in range, possibly none", body = Vec<UserUsageDto>),
        (status = 400, description = "Missing or non-integer parameters", body = DetailResponse),
        (status = 404, description = "File or script not found", body = DetailResponse),
        (status = 500, description = "Script failed", body = DetailResponse)
    )
)]
pub async fn between_msgs(
    State(service): State<Arc<StatsService>>,
    AppQuery(query): AppQuery<BetweenMsgsQuery>,
) -> Result<Json<Vec<UserUsageDto>>, AppError> {
    let records = service
        .between_msgs(
            query.filename.as_deref(),
            query.low.as_deref(),
            query.high.as_deref(),
            query.username.as_deref(),
        )
        .await?;

    Ok(Json(records.into_iter().map(UserUsageDto::from).collect()))
}
