//! Database connection management.
//!
//! Wraps a single rusqlite Connection in a Mutex for thread-safe access,
//! and exposes an optional handle whose availability is checked per call.

use std::path::Path;
use std::sync::{Arc, Mutex};

use rusqlite::Connection;
use tracing::{error, info, warn};

use concierge_core::error::ConciergeError;

use crate::migrations;

/// Thread-safe SQLite database wrapper.
///
/// The connection is wrapped in a Mutex since rusqlite Connection is not Sync.
pub struct Database {
    conn: Mutex<Connection>,
}

impl Database {
    /// Open (or create) a database at the given path.
    ///
    /// Configures WAL mode, synchronous=NORMAL, and runs all pending
    /// migrations.
    pub fn new(path: &Path) -> Result<Self, ConciergeError> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let conn = Connection::open(path)
            .map_err(|e| ConciergeError::Storage(format!("Failed to open database: {}", e)))?;

        conn.execute_batch(
            "PRAGMA journal_mode = WAL;
             PRAGMA synchronous = NORMAL;
             PRAGMA busy_timeout = 5000;",
        )
        .map_err(|e| ConciergeError::Storage(format!("Failed to set pragmas: {}", e)))?;

        info!("Database opened at {}", path.display());
        Self::from_connection(conn)
    }

    /// Open an in-memory database (for testing).
    pub fn in_memory() -> Result<Self, ConciergeError> {
        let conn = Connection::open_in_memory()
            .map_err(|e| ConciergeError::Storage(format!("Failed to open in-memory db: {}", e)))?;
        Self::from_connection(conn)
    }

    fn from_connection(conn: Connection) -> Result<Self, ConciergeError> {
        let db = Self {
            conn: Mutex::new(conn),
        };
        db.with_conn(migrations::run_migrations)?;
        Ok(db)
    }

    /// Execute a closure with a reference to the underlying connection.
    ///
    /// The mutex is held for the duration of the closure.
    pub fn with_conn<F, T>(&self, f: F) -> Result<T, ConciergeError>
    where
        F: FnOnce(&Connection) -> Result<T, ConciergeError>,
    {
        let conn = self
            .conn
            .lock()
            .map_err(|e| ConciergeError::Storage(format!("Database lock poisoned: {}", e)))?;
        f(&conn)
    }

    /// Round-trip a trivial query to confirm the connection is usable.
    pub fn ping(&self) -> bool {
        self.with_conn(|conn| {
            conn.query_row("SELECT 1", [], |row| row.get::<_, i64>(0))
                .map_err(|e| ConciergeError::Storage(e.to_string()))
        })
        .is_ok()
    }
}

impl std::fmt::Debug for Database {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Database").finish()
    }
}

/// Connection handle built once at startup and passed to every store.
///
/// A disabled handle (no connection string, or the open failed) is a
/// normal state, not an error.
#[derive(Clone, Debug, Default)]
pub struct StoreHandle {
    db: Option<Arc<Database>>,
}

impl StoreHandle {
    /// Open the database named by `database_url`.
    ///
    /// Accepts a filesystem path, a `sqlite://` URL, or `:memory:`.
    /// Failures are logged and produce a disabled handle so that startup
    /// continues without persistence.
    pub fn open(database_url: Option<&str>) -> Self {
        let Some(url) = database_url.map(str::trim).filter(|u| !u.is_empty()) else {
            warn!("DATABASE_URL not provided; continuing without persistence");
            return Self::disabled();
        };

        let path = url.strip_prefix("sqlite://").unwrap_or(url);
        let opened = if path == ":memory:" {
            Database::in_memory()
        } else {
            Database::new(Path::new(path))
        };

        match opened {
            Ok(db) => Self::from_database(db),
            Err(e) => {
                error!(error = %e, "Database unavailable; continuing without persistence");
                Self::disabled()
            }
        }
    }

    /// A handle with no backing database.
    pub fn disabled() -> Self {
        Self { db: None }
    }

    pub fn from_database(db: Database) -> Self {
        Self {
            db: Some(Arc::new(db)),
        }
    }

    /// Whether a database is attached and currently answering queries.
    pub fn is_available(&self) -> bool {
        self.db.as_ref().is_some_and(|db| db.ping())
    }

    /// Whether a database was configured at all.
    pub fn is_configured(&self) -> bool {
        self.db.is_some()
    }

    pub fn database(&self) -> Option<&Arc<Database>> {
        self.db.as_ref()
    }

    /// The attached database, or a storage error if persistence is off.
    pub fn require(&self) -> Result<&Arc<Database>, ConciergeError> {
        self.db
            .as_ref()
            .ok_or_else(|| ConciergeError::Storage("persistence is not configured".to_string()))
    }
}
