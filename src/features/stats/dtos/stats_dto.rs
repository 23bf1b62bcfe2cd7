use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::modules::scripts::UserUsageRecord;

/// One user's mailbox usage
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct UserUsageDto {
    #[schema(example = "user1")]
    pub username: String,
    #[schema(example = "inbox")]
    pub folder: String,
    #[serde(rename = "numberMessages")]
    #[schema(example = 10)]
    pub number_messages: u64,
    /// Size in bytes
    #[schema(example = 1024)]
    pub size: u64,
}

impl From<UserUsageRecord> for UserUsageDto {
    fn from(record: UserUsageRecord) -> Self {
        Self {
            username: record.username,
            folder: record.folder,
            number_messages: record.number_messages,
            size: record.size,
        }
    }
}

/// Query params for `GET /max-min-size`
#[derive(Debug, Clone, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct MaxMinSizeQuery {
    /// Name of the stored file to process
    pub filename: Option<String>,
    /// Return the smallest size instead of the largest (any value, even empty)
    pub min: Option<String>,
}

/// Query params for `GET /order-by-username`
#[derive(Debug, Clone, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct OrderByUsernameQuery {
    /// Name of the stored file to process
    pub filename: Option<String>,
    /// Sort descending (any value, even empty)
    pub desc: Option<String>,
    /// Keep users whose name contains this substring
    pub username: Option<String>,
}

/// Query params for `GET /between-msgs`
#[derive(Debug, Clone, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct BetweenMsgsQuery {
    /// Name of the stored file to process
    pub filename: Option<String>,
    /// Lower message count bound
    #[param(value_type = Option<i64>)]
    pub low: Option<String>,
    /// Upper message count bound
    #[param(value_type = Option<i64>)]
    pub high: Option<String>,
    /// Keep users whose name contains this substring
    pub username: Option<String>,
}
