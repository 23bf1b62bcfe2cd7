mod stats_handler;
pub use stats_handler::*;
