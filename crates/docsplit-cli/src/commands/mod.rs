pub mod document;
pub mod init;
pub mod split;
pub mod utils;

use anyhow::{Context, Result};
use std::sync::Arc;

use docsplit_application::{PlaceholderRenderService, SplitService};
use docsplit_infrastructure::{AppConfig, SqliteUnitOfWorkFactory};

/// Connects to the configured database and wires the split service.
pub async fn open_service(config: &AppConfig) -> Result<SplitService> {
    let factory = SqliteUnitOfWorkFactory::open(&config.database)
        .await
        .with_context(|| {
            format!(
                "Failed to open database at {}",
                config.database.path.display()
            )
        })?;
    Ok(SplitService::new(
        Arc::new(factory),
        Arc::new(PlaceholderRenderService::new()),
    ))
}
