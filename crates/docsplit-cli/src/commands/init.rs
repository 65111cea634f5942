use anyhow::Result;
use serde_json::json;

use docsplit_infrastructure::AppConfig;
use docsplit_infrastructure::schema::SCHEMA_VERSION;

use super::utils::print_json;

pub fn run(config: &AppConfig) -> Result<()> {
    print_json(&json!({
        "database": config.database.path,
        "schema_version": SCHEMA_VERSION,
    }))
}
