mod stored_file_repository;

pub use stored_file_repository::StoredFileRepository;
