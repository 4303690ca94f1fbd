mod in_memory_media_repository;
mod pg_media_repository;
mod pg_pool;

pub use in_memory_media_repository::InMemoryMediaRepository;
pub use pg_media_repository::PgMediaRepository;

pub use pg_pool::{create_pool, run_migrations};
