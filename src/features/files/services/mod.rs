mod file_service;

pub use file_service::{AuditReport, FileService, UploadOutcome};
