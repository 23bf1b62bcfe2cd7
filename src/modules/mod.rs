//! Modules layer - Infrastructure components for external integrations
//!
//! Contains adapters for the external statistics scripts.

pub mod scripts;
