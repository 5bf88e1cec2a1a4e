//! Database setup: file location, connection pool and migrations.

use log::{error, info};
use std::fs;
use std::path::Path;
use std::sync::Arc;

use diesel::connection::{Connection, SimpleConnection};
use diesel::r2d2::{self, ConnectionManager, Pool, PooledConnection};
use diesel::sqlite::SqliteConnection;
use diesel_migrations::{embed_migrations, EmbeddedMigrations, MigrationHarness};

use crate::errors::StorageError;
use socialboost_core::errors::Result;

const MIGRATIONS: EmbeddedMigrations = embed_migrations!();

/// File name of the catalog database inside the app data directory.
pub const DB_FILE_NAME: &str = "socialboost.db";

/// Environment variable overriding the database location.
pub const DATABASE_URL_ENV: &str = "DATABASE_URL";

pub type DbPool = r2d2::Pool<ConnectionManager<SqliteConnection>>;
pub type DbConnection = PooledConnection<ConnectionManager<SqliteConnection>>;

/// Prepares the database file under `app_data_dir` and returns its path.
pub fn init(app_data_dir: &str) -> Result<String> {
    let db_path = get_db_path(app_data_dir);

    if let Some(db_dir) = Path::new(&db_path).parent() {
        if !db_dir.as_os_str().is_empty() && !db_dir.exists() {
            fs::create_dir_all(db_dir).map_err(StorageError::from)?;
        }
    }

    {
        let mut conn = SqliteConnection::establish(&db_path).map_err(StorageError::from)?;
        conn.batch_execute(
            "
            PRAGMA journal_mode = WAL;
            PRAGMA busy_timeout = 30000;
            PRAGMA synchronous  = NORMAL;
        ",
        )
        .map_err(StorageError::from)?;
    }

    Ok(db_path)
}

pub fn create_pool(db_path: &str) -> Result<Arc<DbPool>> {
    let manager = ConnectionManager::<SqliteConnection>::new(db_path);
    let pool = r2d2::Pool::builder()
        .max_size(4)
        .min_idle(Some(1))
        .connection_timeout(std::time::Duration::from_secs(30))
        .connection_customizer(Box::new(ConnectionCustomizer))
        .build(manager)
        .map_err(StorageError::from)?;
    Ok(Arc::new(pool))
}

pub fn run_migrations(pool: &DbPool) -> Result<()> {
    info!("Running database migrations");
    let mut connection = get_connection(pool)?;

    let applied = connection
        .run_pending_migrations(MIGRATIONS)
        .map_err(|e| {
            error!("Database migration failed: {}", e);
            StorageError::MigrationFailed(e.to_string())
        })?;

    if applied.is_empty() {
        info!("No pending migrations to apply.");
    } else {
        info!("Applied the following migrations:");
        for migration_version in &applied {
            info!("  - {}", migration_version);
        }
    }

    Ok(())
}

/// Database path: `DATABASE_URL` when set, otherwise
/// `<app_data_dir>/socialboost.db`.
pub fn get_db_path(app_data_dir: &str) -> String {
    resolve_db_path(app_data_dir, std::env::var(DATABASE_URL_ENV).ok())
}

fn resolve_db_path(app_data_dir: &str, env_override: Option<String>) -> String {
    env_override
        .filter(|url| !url.trim().is_empty())
        .unwrap_or_else(|| {
            Path::new(app_data_dir)
                .join(DB_FILE_NAME)
                .to_string_lossy()
                .into_owned()
        })
}

pub fn get_connection(pool: &Pool<ConnectionManager<SqliteConnection>>) -> Result<DbConnection> {
    pool.get().map_err(|e| StorageError::from(e).into())
}

#[derive(Debug)]
struct ConnectionCustomizer;

impl r2d2::CustomizeConnection<SqliteConnection, r2d2::Error> for ConnectionCustomizer {
    fn on_acquire(&self, conn: &mut SqliteConnection) -> std::result::Result<(), r2d2::Error> {
        conn.batch_execute(
            "
            PRAGMA busy_timeout = 30000;
            PRAGMA synchronous = NORMAL;
        ",
        )
        .map_err(r2d2::Error::QueryError)?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_db_path_defaults_to_app_data_dir() {
        let path = resolve_db_path("/var/lib/socialboost", None);
        assert!(path.ends_with(DB_FILE_NAME));
        assert!(path.starts_with("/var/lib/socialboost"));
    }

    #[test]
    fn test_db_path_env_override_wins() {
        let path = resolve_db_path("/var/lib/socialboost", Some("/tmp/other.db".to_string()));
        assert_eq!(path, "/tmp/other.db");

        let blank = resolve_db_path("/data", Some("  ".to_string()));
        assert!(blank.ends_with(DB_FILE_NAME));
    }

    #[test]
    fn test_pool_and_migrations() {
        let dir = tempdir().unwrap();
        let db_path = dir.path().join("test.db").to_string_lossy().to_string();

        let pool = create_pool(&db_path).unwrap();
        run_migrations(&pool).unwrap();
        // Re-running is a no-op.
        run_migrations(&pool).unwrap();

        assert!(get_connection(&pool).is_ok());
    }
}
