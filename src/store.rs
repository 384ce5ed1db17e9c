// Employee store backed by a single SQLite table

use crate::export::{self, QuoteStyle};
use crate::error::{StoreError, StoreResult};
use crate::models::{COLUMNS, Employee};
use fs2::FileExt;
use rusqlite::{Connection, OptionalExtension, params};
use serde::{Deserialize, Serialize};
use std::fs::{self, OpenOptions};
use std::io;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};
use std::time::Duration;
use tracing::{debug, info, warn};
use uuid::Uuid;

/// Schema version this build writes to `PRAGMA user_version`
pub const SCHEMA_VERSION: u32 = 1;

pub const DB_FILE_NAME: &str = "employees.db";
pub const DEFAULT_EXPORT_FILE_NAME: &str = "employeesDB.csv";

const EXPORT_DIR_NAME: &str = "exports";
const EXPORT_LOCK_FILE_NAME: &str = ".export.lock";
const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

const SELECT_ALL: &str = "SELECT id, name, email FROM employees ORDER BY id";

struct Migration {
    version: u32,
    sql: &'static str,
}

const MIGRATIONS: &[Migration] = &[Migration {
    version: 1,
    sql: r#"
        CREATE TABLE IF NOT EXISTS employees (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            name TEXT NOT NULL,
            email TEXT NOT NULL
        );
        "#,
}];

/// What to do when the database was written by a different schema version
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SchemaPolicy {
    /// Apply pending migrations and keep existing rows; reject newer versions
    #[default]
    Migrate,
    /// Drop the table and start empty on any version mismatch
    Recreate,
}

/// Options for opening a [`Store`]
#[derive(Debug, Clone)]
pub struct StoreOptions {
    pub schema_policy: SchemaPolicy,
    /// Export directory; defaults to `exports/` inside the store directory
    pub export_dir: Option<PathBuf>,
    pub export_file_name: String,
    pub quote_style: QuoteStyle,
}

impl Default for StoreOptions {
    fn default() -> Self {
        Self {
            schema_policy: SchemaPolicy::default(),
            export_dir: None,
            export_file_name: DEFAULT_EXPORT_FILE_NAME.to_string(),
            quote_style: QuoteStyle::default(),
        }
    }
}

/// Result of a successful export
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportReport {
    /// Final location of the CSV file
    pub path: PathBuf,
    /// Number of data rows written (header excluded)
    pub rows: usize,
}

/// Persistent employee records in SQLite
///
/// A single connection is held behind a mutex; every operation takes the
/// guard for one statement or one table scan and releases it before returning.
pub struct Store {
    base_path: PathBuf,
    db_path: PathBuf,
    export_path: PathBuf,
    quote_style: QuoteStyle,
    db: Mutex<Connection>,
}

impl Store {
    /// Open or create a store in the given directory with default options
    pub fn open<P: AsRef<Path>>(path: P) -> StoreResult<Self> {
        Self::open_with(path, StoreOptions::default())
    }

    /// Open or create a store in the given directory
    ///
    /// Creates the directory and `employees.db` when missing, then brings the
    /// schema to [`SCHEMA_VERSION`] according to `options.schema_policy`.
    pub fn open_with<P: AsRef<Path>>(path: P, options: StoreOptions) -> StoreResult<Self> {
        let base_path = path.as_ref().to_path_buf();

        fs::create_dir_all(&base_path).map_err(|source| StoreError::Directory {
            path: base_path.clone(),
            source,
        })?;

        let db_path = base_path.join(DB_FILE_NAME);
        let open_err = |source: rusqlite::Error| StoreError::Open {
            path: db_path.clone(),
            source,
        };

        let mut db = Connection::open(&db_path).map_err(open_err)?;
        db.busy_timeout(BUSY_TIMEOUT).map_err(open_err)?;
        db.execute_batch("PRAGMA foreign_keys = ON;").map_err(open_err)?;

        // The file is read lazily, so a corrupt database first fails here
        Self::apply_schema(&mut db, options.schema_policy).map_err(|e| match e {
            StoreError::Query(source) => open_err(source),
            other => other,
        })?;

        let export_dir = options
            .export_dir
            .unwrap_or_else(|| base_path.join(EXPORT_DIR_NAME));
        let export_path = export_dir.join(&options.export_file_name);

        info!(path = ?db_path, "Opened employee store");

        Ok(Self {
            base_path,
            db_path,
            export_path,
            quote_style: options.quote_style,
            db: Mutex::new(db),
        })
    }

    /// Get the directory holding the database
    pub fn base_path(&self) -> &Path {
        &self.base_path
    }

    /// Get the path of the SQLite database file
    pub fn db_path(&self) -> &Path {
        &self.db_path
    }

    /// Get the destination used by [`Store::export_all`]
    pub fn export_path(&self) -> &Path {
        &self.export_path
    }

    fn conn(&self) -> StoreResult<MutexGuard<'_, Connection>> {
        self.db.lock().map_err(|_| StoreError::LockPoisoned)
    }

    fn user_version(db: &Connection) -> StoreResult<u32> {
        let version = db.query_row("PRAGMA user_version", [], |row| row.get::<_, u32>(0))?;
        Ok(version)
    }

    fn apply_schema(db: &mut Connection, policy: SchemaPolicy) -> StoreResult<()> {
        let current = Self::user_version(db)?;
        if current == SCHEMA_VERSION {
            debug!(version = current, "Schema is current");
            return Ok(());
        }

        let recreate = current != 0 && policy == SchemaPolicy::Recreate;
        if !recreate && current > SCHEMA_VERSION {
            return Err(StoreError::UnsupportedSchemaVersion {
                found: current,
                supported: SCHEMA_VERSION,
            });
        }

        let tx = db.transaction()?;

        let from = if recreate {
            warn!(
                found = current,
                expected = SCHEMA_VERSION,
                "Schema version mismatch, dropping employee table"
            );
            tx.execute_batch("DROP TABLE IF EXISTS employees;")?;
            0
        } else {
            current
        };

        for migration in MIGRATIONS.iter().filter(|m| m.version > from) {
            debug!(version = migration.version, "Applying schema migration");
            tx.execute_batch(migration.sql)?;
        }
        tx.execute_batch(&format!("PRAGMA user_version = {};", SCHEMA_VERSION))?;
        tx.commit()?;

        info!(from = current, to = SCHEMA_VERSION, "Schema updated");
        Ok(())
    }

    fn row_to_employee(row: &rusqlite::Row<'_>) -> rusqlite::Result<Employee> {
        Ok(Employee {
            id: row.get(0)?,
            name: row.get(1)?,
            email: row.get(2)?,
        })
    }

    // ========================================================================
    // CRUD API
    // ========================================================================

    /// Insert a new employee and return its assigned id
    ///
    /// Fields are stored as given; rejecting empty values is up to the caller.
    pub fn create(&self, name: &str, email: &str) -> StoreResult<i64> {
        let db = self.conn()?;
        db.execute(
            "INSERT INTO employees (name, email) VALUES (?1, ?2)",
            params![name, email],
        )?;
        let id = db.last_insert_rowid();

        debug!(id, "Created employee");
        Ok(id)
    }

    /// Read every employee, ordered by id
    pub fn read_all(&self) -> StoreResult<Vec<Employee>> {
        let db = self.conn()?;
        let mut stmt = db.prepare(SELECT_ALL)?;
        let employees = stmt
            .query_map([], Self::row_to_employee)?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        debug!(count = employees.len(), "Read employees");
        Ok(employees)
    }

    /// Get an employee by id
    pub fn get(&self, id: i64) -> StoreResult<Option<Employee>> {
        let db = self.conn()?;
        let employee = db
            .query_row(
                "SELECT id, name, email FROM employees WHERE id = ?1",
                [id],
                Self::row_to_employee,
            )
            .optional()?;
        Ok(employee)
    }

    /// Overwrite name and email of the employee with the given id
    ///
    /// Returns the number of rows changed; 0 means no such employee.
    pub fn update(&self, id: i64, name: &str, email: &str) -> StoreResult<usize> {
        let db = self.conn()?;
        let changed = db.execute(
            "UPDATE employees SET name = ?1, email = ?2 WHERE id = ?3",
            params![name, email, id],
        )?;

        debug!(id, changed, "Updated employee");
        Ok(changed)
    }

    /// Delete the employee with the given id
    ///
    /// Returns the number of rows removed; 0 means no such employee.
    pub fn delete(&self, id: i64) -> StoreResult<usize> {
        let db = self.conn()?;
        let removed = db.execute("DELETE FROM employees WHERE id = ?1", [id])?;

        debug!(id, removed, "Deleted employee");
        Ok(removed)
    }

    // ========================================================================
    // Export
    // ========================================================================

    /// Export the table to the configured export path
    pub fn export_all(&self) -> StoreResult<ExportReport> {
        self.export_to(&self.export_path)
    }

    /// Export the table as CSV to `path`
    ///
    /// The file is written to a temporary sibling and renamed into place, so
    /// on error the destination keeps its previous contents (or stays absent).
    pub fn export_to(&self, path: &Path) -> StoreResult<ExportReport> {
        let dir = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };
        let file_name = path
            .file_name()
            .and_then(|name| name.to_str())
            .ok_or_else(|| {
                StoreError::export(
                    path,
                    io::Error::new(io::ErrorKind::InvalidInput, "export path has no file name"),
                )
            })?;

        fs::create_dir_all(&dir).map_err(|e| StoreError::export(&dir, e))?;

        let lock_path = self.base_path.join(EXPORT_LOCK_FILE_NAME);
        let lock = OpenOptions::new()
            .create(true)
            .truncate(false)
            .write(true)
            .open(&lock_path)
            .map_err(|e| StoreError::export(&lock_path, e))?;

        // Released when `lock` is dropped
        lock.lock_exclusive().map_err(|e| StoreError::export(&lock_path, e))?;

        let temp_path = dir.join(format!(".{}.{}.tmp", file_name, Uuid::now_v7()));

        let result = self
            .write_export(&temp_path)
            .and_then(|rows| Self::persist_export(&temp_path, path).map(|()| rows));

        match result {
            Ok(rows) => {
                info!(path = ?path, rows, "Exported employees");
                Ok(ExportReport {
                    path: path.to_path_buf(),
                    rows,
                })
            }
            Err(e) => {
                if temp_path.exists() {
                    if let Err(rm_err) = fs::remove_file(&temp_path) {
                        warn!(path = ?temp_path, error = ?rm_err, "Failed to remove partial export");
                    }
                }
                Err(e)
            }
        }
    }

    fn write_export(&self, temp_path: &Path) -> StoreResult<usize> {
        let io_err = |e: io::Error| StoreError::export(temp_path, e);

        let file = OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(temp_path)
            .map_err(io_err)?;
        let mut writer = export::writer(file, self.quote_style);

        writer.write_record(COLUMNS).map_err(|e| io_err(e.into()))?;

        let mut count = 0;
        {
            let db = self.conn()?;
            let mut stmt = db.prepare(SELECT_ALL)?;
            let mut rows = stmt.query([])?;
            while let Some(row) = rows.next()? {
                let employee = Self::row_to_employee(row)?;
                writer
                    .write_record(employee.to_fields())
                    .map_err(|e| io_err(e.into()))?;
                count += 1;
            }
        }

        let file = writer.into_inner().map_err(|e| io_err(e.into_error()))?;
        file.sync_all().map_err(io_err)?;

        Ok(count)
    }

    fn persist_export(temp_path: &Path, path: &Path) -> StoreResult<()> {
        match fs::rename(temp_path, path) {
            Ok(()) => Ok(()),
            Err(err) => {
                // Some platforms refuse to rename over an existing file
                if path.is_file() {
                    fs::remove_file(path).map_err(|e| StoreError::export(path, e))?;
                    fs::rename(temp_path, path).map_err(|e| StoreError::export(path, e))?;
                    return Ok(());
                }
                Err(StoreError::export(path, err))
            }
        }
    }
}
