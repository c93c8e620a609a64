use std::path::Path;

use floodgate_common::{FloodgateConfig, FloodgateError};
use sea_orm::{ConnectOptions, Database, DatabaseConnection};
use tracing::*;

use floodgate_db_migrations::migrate_database;

pub async fn connect_to_db(config: &FloodgateConfig) -> Result<DatabaseConnection, FloodgateError> {
    let mut url = url::Url::parse(&config.database_url.expose_secret()[..])?;

    if url.scheme() == "sqlite" && url.path() != ":memory:" {
        let path = Path::new(url.path());
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        url.set_query(Some("mode=rwc"));
    }

    let mut opt = ConnectOptions::new(url.to_string());
    opt.max_connections(config.pool_size)
        .connect_timeout(config.connect_timeout)
        .sqlx_logging(true);

    let connection = Database::connect(opt).await?;

    migrate_database(&connection).await?;
    debug!("Connected to the store and ran migrations");
    Ok(connection)
}
