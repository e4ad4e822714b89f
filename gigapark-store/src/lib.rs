pub mod app_config;
pub mod json_repo;
pub mod redb_repo;

pub use app_config::{Config, StorageBackend};
pub use json_repo::JsonFileStore;
pub use redb_repo::RedbStore;
