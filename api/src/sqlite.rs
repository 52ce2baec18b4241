use std::{str::FromStr, time::Duration};

use anyhow::Result;
use axum::extract::FromRef;
use serde::Deserialize;
use sqlx::{
    migrate::MigrateDatabase,
    sqlite::{SqliteConnectOptions, SqlitePoolOptions},
    Sqlite, SqlitePool,
};

#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub url: String,
    pub max_connections: u32,
}

impl Settings {
    fn is_in_memory(&self) -> bool {
        self.url.contains(":memory:")
    }
}

/// Handle to the portal's tables, cheap to clone into each handler.
#[derive(Debug, Clone)]
pub struct Database(SqlitePool);

impl AsRef<SqlitePool> for Database {
    fn as_ref(&self) -> &SqlitePool {
        &self.0
    }
}

impl FromRef<crate::AppState> for Database {
    fn from_ref(app: &crate::AppState) -> Self {
        app.db.clone()
    }
}

pub async fn create_pool(settings: &Settings) -> Result<Database> {
    if !settings.is_in_memory() {
        match Sqlite::database_exists(&settings.url).await? {
            true => tracing::info!("Database already exists"),
            false => {
                tracing::info!("Creating database at {}", settings.url);
                Sqlite::create_database(&settings.url).await?
            }
        }
    }

    let options = SqliteConnectOptions::from_str(&settings.url)?.foreign_keys(true);
    let mut pool_options = SqlitePoolOptions::new().max_connections(settings.max_connections);
    if settings.is_in_memory() {
        // the database lives only as long as one of its connections
        pool_options = pool_options
            .min_connections(1)
            .idle_timeout(None::<Duration>)
            .max_lifetime(None::<Duration>);
    }
    let pool = pool_options.connect_with(options).await?;

    sqlx::migrate!("db/migrations").run(&pool).await?;

    Ok(Database(pool))
}
