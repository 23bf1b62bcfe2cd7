mod stats_service;
pub use stats_service::StatsService;
