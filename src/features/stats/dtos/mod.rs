mod stats_dto;
pub use stats_dto::*;
