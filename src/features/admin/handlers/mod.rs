mod admin_handlers;
pub use admin_handlers::*;
