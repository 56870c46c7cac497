//! Database initialization, connection pooling, and lifecycle management.
//!
//! Uses SQLite in WAL mode with r2d2 connection pooling.
//! Runs integrity checks on startup and applies versioned migrations.

use std::path::Path;
use std::sync::Arc;

use r2d2::Pool;
use r2d2_sqlite::SqliteConnectionManager;
use rusqlite::Connection;
use tracing::{info, warn, error};

use hearth_core::error::{HearthError, HearthResult};
use hearth_core::config::StoreConfig;

use crate::document::Collection;
use crate::schema;
use crate::migrations;

type DbPool = Pool<SqliteConnectionManager>;

/// Database wrapper providing initialization, pooling, and lifecycle management.
#[derive(Clone)]
pub struct Database {
    pool: Arc<DbPool>,
}

impl Database {
    /// Initialize the database at the given path.
    ///
    /// This:
    /// 1. Creates the database file and parent directories if needed
    /// 2. Sets up connection pooling with per-connection pragmas
    /// 3. Runs integrity checks if configured
    /// 4. Creates the schema tables
    /// 5. Runs pending migrations
    pub fn init(db_path: &Path, config: &StoreConfig) -> HearthResult<Self> {
        if let Some(parent) = db_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        info!("initializing database at {}", db_path.display());

        let manager = SqliteConnectionManager::file(db_path);
        let pool = Pool::builder()
            .max_size(config.pool_size)
            .connection_customizer(Box::new(ConnectionCustomizer {
                wal_mode: config.wal_mode,
            }))
            .build(manager)
            .map_err(|e| HearthError::Pool(e.to_string()))?;

        let db = Self {
            pool: Arc::new(pool),
        };

        if config.integrity_check_on_startup {
            db.run_integrity_check()?;
        }

        {
            let conn = db.conn()?;
            schema::create_tables(&conn)?;
            migrations::run_migrations(&conn)?;
        }

        info!("database initialized successfully");
        Ok(db)
    }

    /// Get a connection from the pool.
    pub fn conn(&self) -> HearthResult<r2d2::PooledConnection<SqliteConnectionManager>> {
        self.pool.get().map_err(|e| HearthError::Pool(e.to_string()))
    }

    /// Run a SQLite integrity check.
    pub fn run_integrity_check(&self) -> HearthResult<()> {
        let conn = self.conn()?;
        let result: String = conn
            .query_row("PRAGMA integrity_check", [], |row| row.get(0))
            .map_err(|e| HearthError::Database(e.to_string()))?;

        if result != "ok" {
            error!("database integrity check failed: {result}");
            return Err(HearthError::IntegrityCheck(result));
        }

        info!("database integrity check passed");
        Ok(())
    }

    /// Document counts per collection plus the number of stored blobs.
    pub fn stats(&self) -> HearthResult<DatabaseStats> {
        let conn = self.conn()?;

        let count_collection = |collection: Collection| -> HearthResult<i64> {
            conn.query_row(
                "SELECT COUNT(*) FROM documents WHERE collection = ?1",
                [collection.as_str()],
                |row| row.get(0),
            )
            .map_err(|e| HearthError::Database(e.to_string()))
        };

        let blobs: i64 = conn
            .query_row("SELECT COUNT(*) FROM blobs", [], |row| row.get(0))
            .map_err(|e| HearthError::Database(e.to_string()))?;

        Ok(DatabaseStats {
            families: count_collection(Collection::Families)?,
            residences: count_collection(Collection::Residences)?,
            vehicles: count_collection(Collection::Vehicles)?,
            profiles: count_collection(Collection::Profiles)?,
            blobs,
        })
    }

    /// Reset the database by dropping and recreating all tables.
    pub fn reset(&self) -> HearthResult<()> {
        warn!("resetting database - all data will be lost");
        let conn = self.conn()?;
        schema::drop_tables(&conn)?;
        schema::create_tables(&conn)?;
        migrations::run_migrations(&conn)?;
        info!("database reset complete");
        Ok(())
    }
}

/// Row count statistics.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatabaseStats {
    pub families: i64,
    pub residences: i64,
    pub vehicles: i64,
    pub profiles: i64,
    pub blobs: i64,
}

impl std::fmt::Display for DatabaseStats {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "families={}, residences={}, vehicles={}, profiles={}, blobs={}",
            self.families, self.residences, self.vehicles, self.profiles, self.blobs
        )
    }
}

/// r2d2 connection customizer that applies PRAGMA settings.
#[derive(Debug)]
struct ConnectionCustomizer {
    wal_mode: bool,
}

impl r2d2::CustomizeConnection<Connection, rusqlite::Error> for ConnectionCustomizer {
    fn on_acquire(&self, conn: &mut Connection) -> Result<(), rusqlite::Error> {
        if self.wal_mode {
            conn.execute_batch("PRAGMA journal_mode=WAL;")?;
        }

        conn.execute_batch(
            "PRAGMA synchronous=NORMAL;
             PRAGMA temp_store=MEMORY;
             PRAGMA busy_timeout=5000;",
        )?;

        Ok(())
    }
}
