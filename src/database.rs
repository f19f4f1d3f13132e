use color_eyre::{Result, eyre::Context};
use migration::MigratorTrait;
use sea_orm::{
    ConnectOptions, ConnectionTrait, Database as SeaDatabase, DatabaseConnection, EntityTrait,
    PaginatorTrait,
};
use std::path::Path;
use std::time::Duration;

use crate::entities;

/// Storage session shared by every request. Services receive it explicitly.
pub struct Database {
    pub conn: DatabaseConnection,
}

impl Database {
    /// Open or create a database at the given path
    pub async fn open(path: &Path) -> Result<Self> {
        log::debug!("Opening database at: {}", path.display());

        // Create parent directories if they don't exist
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent).context(format!(
                "Failed to create database directory: {}",
                parent.display()
            ))?;
        }

        let url = format!("sqlite://{}?mode=rwc", path.display());

        let mut opt = ConnectOptions::new(url);
        opt.max_connections(16)
            .min_connections(1)
            .connect_timeout(Duration::from_secs(8))
            .acquire_timeout(Duration::from_secs(8))
            .idle_timeout(Duration::from_secs(300))
            .sqlx_logging(false);

        let conn = SeaDatabase::connect(opt)
            .await
            .context(format!("Failed to open database: {}", path.display()))?;

        let database = Self::prepare(conn).await?;
        log::info!("Database ready at: {}", path.display());
        Ok(database)
    }

    /// Private in-memory database; one connection so every query sees the same data.
    #[cfg(test)]
    pub async fn in_memory() -> Result<Self> {
        let mut opt = ConnectOptions::new("sqlite::memory:");
        opt.max_connections(1)
            .min_connections(1)
            .sqlx_logging(false);

        let conn = SeaDatabase::connect(opt)
            .await
            .context("Failed to open in-memory database")?;

        Self::prepare(conn).await
    }

    async fn prepare(conn: DatabaseConnection) -> Result<Self> {
        // Shows rely on ON DELETE CASCADE
        conn.execute_unprepared("PRAGMA foreign_keys = ON")
            .await
            .context("Failed to enable foreign keys")?;

        log::debug!("Running database migrations");
        migration::Migrator::up(&conn, None)
            .await
            .context("Failed to run database migrations")?;

        Ok(Database { conn })
    }

    /// True when no venue, artist or show has been listed yet.
    pub async fn is_empty(&self) -> Result<bool> {
        let venues = entities::venue::Entity::find()
            .count(&self.conn)
            .await
            .context("Failed to count venues")?;
        let artists = entities::artist::Entity::find()
            .count(&self.conn)
            .await
            .context("Failed to count artists")?;
        let shows = entities::show::Entity::find()
            .count(&self.conn)
            .await
            .context("Failed to count shows")?;

        Ok(venues + artists + shows == 0)
    }
}
