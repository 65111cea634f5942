pub mod config;
pub mod database;
pub mod paths;
pub mod reconcile;
pub mod schema;
pub mod sqlite_split_repository;
pub mod sqlite_unit_of_work;

mod rows;

pub use crate::config::{AppConfig, ConfigError, DatabaseConfig};
pub use crate::paths::DocsplitPaths;
pub use crate::sqlite_split_repository::SqliteSplitRepository;
pub use crate::sqlite_unit_of_work::{SqliteUnitOfWork, SqliteUnitOfWorkFactory};
