//! Database-backed implementations of the domain repositories.

pub mod model;
pub mod system_config_repository;

pub use system_config_repository::PgSystemConfigRepository;
