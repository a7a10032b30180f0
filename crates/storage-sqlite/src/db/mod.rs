//! Connection pooling, bootstrap, and the single-writer actor.

pub mod write_actor;

use std::fs;
use std::path::Path;
use std::sync::Arc;

use diesel::prelude::*;
use diesel::r2d2::{ConnectionManager, Pool, PooledConnection};
use diesel::sql_query;
use diesel::sqlite::SqliteConnection;
use diesel_migrations::{embed_migrations, EmbeddedMigrations, MigrationHarness};
use wonfx_core::errors::{DatabaseError, Result};

use crate::errors::StorageError;

pub use write_actor::{spawn_writer, WriteHandle};

pub type DbPool = Pool<ConnectionManager<SqliteConnection>>;
pub type DbConnection = PooledConnection<ConnectionManager<SqliteConnection>>;

const MIGRATIONS: EmbeddedMigrations = embed_migrations!("migrations");

/// Ensure the database file and its parent directory exist.
///
/// Returns the path actually in use so callers can log it.
pub fn init(db_path: &str) -> Result<String> {
    let path = Path::new(db_path);
    if !path.exists() {
        if let Some(dir) = path.parent() {
            if !dir.as_os_str().is_empty() && !dir.exists() {
                fs::create_dir_all(dir)
                    .map_err(|e| DatabaseError::ConnectionFailed(e.to_string()))?;
            }
        }
        fs::File::create(path).map_err(|e| DatabaseError::ConnectionFailed(e.to_string()))?;
    }
    Ok(db_path.to_string())
}

/// Build the r2d2 connection pool over the SQLite file.
pub fn create_pool(db_path: &str) -> Result<Arc<DbPool>> {
    let manager = ConnectionManager::<SqliteConnection>::new(db_path);
    let pool = Pool::builder()
        .max_size(8)
        .build(manager)
        .map_err(|e| DatabaseError::PoolCreationFailed(e.to_string()))?;
    Ok(Arc::new(pool))
}

/// Check out a connection, converting pool errors to the core taxonomy.
pub fn get_connection(pool: &Arc<DbPool>) -> Result<DbConnection> {
    pool.get().map_err(|e| StorageError::PoolError(e).into())
}

/// Run pending embedded migrations and enable foreign-key enforcement.
pub fn run_migrations(pool: &Arc<DbPool>) -> Result<()> {
    let mut conn = get_connection(pool)?;
    sql_query("PRAGMA foreign_keys = ON")
        .execute(&mut conn)
        .map_err(StorageError::from)?;
    conn.run_pending_migrations(MIGRATIONS)
        .map_err(|e| DatabaseError::MigrationFailed(e.to_string()))?;
    log::debug!("Database migrations are up to date");
    Ok(())
}
