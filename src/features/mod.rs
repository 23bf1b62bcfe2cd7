pub mod admin;
pub mod files;
pub mod stats;
