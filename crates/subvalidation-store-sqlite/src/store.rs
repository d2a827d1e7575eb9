// crates/subvalidation-store-sqlite/src/store.rs
// ============================================================================
// Module: SQLite Validation Store
// Description: Read-only SQLite connections and catalog query execution.
// Purpose: Serve validation read queries from an API manager database.
// Dependencies: subvalidation-core, rusqlite, serde, thiserror
// ============================================================================

//! ## Overview
//! [`SqliteConnectionProvider`] opens a fresh read-only connection per query
//! and [`SqliteQueryRunner`] executes catalog SQL on it, exposing the result
//! as a [`RowSource`]. The connection, statement, and cursor are locals of
//! [`SqliteQueryRunner::run_query`], so they are released on every return
//! path. Security posture: database contents are untrusted and decoded
//! fail-closed; caller input is only ever bound as parameters.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::path::Path;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use rusqlite::Connection;
use rusqlite::OpenFlags;
use rusqlite::params_from_iter;
use rusqlite::types::Value;
use rusqlite::types::ValueRef;
use serde::Deserialize;
use serde::Serialize;
use subvalidation_core::ColumnValue;
use subvalidation_core::QueryCatalog;
use subvalidation_core::QueryName;
use subvalidation_core::QueryParam;
use subvalidation_core::QueryRunner;
use subvalidation_core::ReadError;
use subvalidation_core::Row;
use subvalidation_core::RowSource;
use subvalidation_core::RowVisitor;
use thiserror::Error;

use crate::catalog::SqliteQueryCatalog;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Default busy timeout (ms).
const DEFAULT_BUSY_TIMEOUT_MS: u64 = 5_000;
/// Maximum length of a single path component.
const MAX_PATH_COMPONENT_LENGTH: usize = 255;
/// Maximum total path length.
const MAX_TOTAL_PATH_LENGTH: usize = 4096;

// ============================================================================
// SECTION: Config
// ============================================================================

/// Configuration for the `SQLite` validation store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SqliteStoreConfig {
    /// Path to the `SQLite` database file.
    pub path: PathBuf,
    /// Busy timeout in milliseconds.
    #[serde(default = "default_busy_timeout_ms")]
    pub busy_timeout_ms: u64,
}

impl SqliteStoreConfig {
    /// Creates a config for `path` with the default busy timeout.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            busy_timeout_ms: DEFAULT_BUSY_TIMEOUT_MS,
        }
    }
}

/// Returns the default busy timeout for `SQLite` connections.
const fn default_busy_timeout_ms() -> u64 {
    DEFAULT_BUSY_TIMEOUT_MS
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// `SQLite` store errors.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SqliteStoreError {
    /// Store I/O error.
    #[error("sqlite store io error: {0}")]
    Io(String),
    /// `SQLite` engine error.
    #[error("sqlite store db error: {0}")]
    Db(String),
    /// Invalid store configuration.
    #[error("sqlite store invalid config: {0}")]
    Invalid(String),
}

impl From<SqliteStoreError> for ReadError {
    fn from(error: SqliteStoreError) -> Self {
        Self::Connection(error.to_string())
    }
}

// ============================================================================
// SECTION: Connections
// ============================================================================

/// Supplies a connection for one query.
pub trait ConnectionProvider {
    /// Acquires a connection; it is dropped when the query completes.
    ///
    /// # Errors
    ///
    /// Returns [`SqliteStoreError`] when no connection can be opened.
    fn connection(&self) -> Result<Connection, SqliteStoreError>;
}

/// Opens a read-only connection to a database file per call.
#[derive(Debug, Clone)]
pub struct SqliteConnectionProvider {
    /// Store configuration.
    config: SqliteStoreConfig,
}

impl SqliteConnectionProvider {
    /// Creates a provider after checking the database path.
    ///
    /// # Errors
    ///
    /// Returns [`SqliteStoreError`] when the path is invalid or missing.
    pub fn new(config: SqliteStoreConfig) -> Result<Self, SqliteStoreError> {
        validate_store_path(&config.path)?;
        if !config.path.is_file() {
            return Err(SqliteStoreError::Io(format!(
                "database file not found: {}",
                config.path.display()
            )));
        }
        Ok(Self {
            config,
        })
    }

    /// Returns the provider configuration.
    #[must_use]
    pub const fn config(&self) -> &SqliteStoreConfig {
        &self.config
    }
}

impl ConnectionProvider for SqliteConnectionProvider {
    fn connection(&self) -> Result<Connection, SqliteStoreError> {
        open_connection(&self.config)
    }
}

// ============================================================================
// SECTION: Query Runner
// ============================================================================

/// Runs catalog queries on connections from a [`ConnectionProvider`].
pub struct SqliteQueryRunner<P = SqliteConnectionProvider> {
    /// Connection source.
    provider: P,
    /// SQL text per query.
    catalog: Arc<dyn QueryCatalog>,
}

impl SqliteQueryRunner<SqliteConnectionProvider> {
    /// Opens a runner over the database described by `config` using the
    /// built-in catalog.
    ///
    /// # Errors
    ///
    /// Returns [`SqliteStoreError`] when the database path is unusable.
    pub fn open(config: SqliteStoreConfig) -> Result<Self, SqliteStoreError> {
        let provider = SqliteConnectionProvider::new(config)?;
        Ok(Self::new(provider, Arc::new(SqliteQueryCatalog)))
    }
}

impl<P: ConnectionProvider> SqliteQueryRunner<P> {
    /// Creates a runner from a provider and catalog.
    #[must_use]
    pub fn new(provider: P, catalog: Arc<dyn QueryCatalog>) -> Self {
        Self {
            provider,
            catalog,
        }
    }
}

impl<P: ConnectionProvider> QueryRunner for SqliteQueryRunner<P> {
    fn run_query(
        &self,
        query: QueryName,
        params: &[QueryParam],
        visit: &mut RowVisitor<'_>,
    ) -> Result<(), ReadError> {
        let connection = self.provider.connection()?;
        let mut statement = connection
            .prepare(self.catalog.sql(query))
            .map_err(|err| ReadError::Query(format!("{query}: {err}")))?;
        let names: Vec<String> =
            statement.column_names().into_iter().map(str::to_string).collect();
        let values: Vec<Value> = params.iter().map(bind_value).collect();
        let rows = statement
            .query(params_from_iter(values))
            .map_err(|err| ReadError::Query(format!("{query}: {err}")))?;
        let mut source = SqliteRowSource {
            rows,
            current: SqliteRow {
                names,
                values: Vec::new(),
            },
        };
        visit(&mut source)
    }
}

// ============================================================================
// SECTION: Row Source
// ============================================================================

/// Decoded copy of the current result row.
struct SqliteRow {
    /// Result column names.
    names: Vec<String>,
    /// Decoded values, aligned with `names`.
    values: Vec<Result<ColumnValue, ReadError>>,
}

impl Row for SqliteRow {
    fn value(&self, column: &str) -> Result<ColumnValue, ReadError> {
        let missing = || ReadError::Column {
            column: column.to_string(),
            message: "not present in result".to_string(),
        };
        let index = self
            .names
            .iter()
            .position(|name| name.eq_ignore_ascii_case(column))
            .ok_or_else(missing)?;
        self.values.get(index).cloned().unwrap_or_else(|| Err(missing()))
    }
}

/// Forward-only cursor over a `rusqlite` result.
struct SqliteRowSource<'stmt> {
    /// Underlying cursor.
    rows: rusqlite::Rows<'stmt>,
    /// Row most recently handed out.
    current: SqliteRow,
}

impl RowSource for SqliteRowSource<'_> {
    fn next_row(&mut self) -> Result<Option<&dyn Row>, ReadError> {
        let Some(row) = self.rows.next().map_err(|err| ReadError::Source(err.to_string()))?
        else {
            return Ok(None);
        };
        self.current.values.clear();
        for (index, name) in self.current.names.iter().enumerate() {
            self.current.values.push(decode_column(row, index, name));
        }
        Ok(Some(&self.current))
    }
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Converts a query parameter into a bindable `SQLite` value.
fn bind_value(param: &QueryParam) -> Value {
    match param {
        QueryParam::Int(value) => Value::Integer(*value),
        QueryParam::Text(value) => Value::Text(value.clone()),
    }
}

/// Decodes column `index` of `row`.
fn decode_column(
    row: &rusqlite::Row<'_>,
    index: usize,
    name: &str,
) -> Result<ColumnValue, ReadError> {
    let value = row.get_ref(index).map_err(|err| ReadError::Column {
        column: name.to_string(),
        message: err.to_string(),
    })?;
    match value {
        ValueRef::Null => Ok(ColumnValue::Null),
        ValueRef::Integer(value) => Ok(ColumnValue::Integer(value)),
        ValueRef::Text(bytes) => std::str::from_utf8(bytes)
            .map(|text| ColumnValue::Text(text.to_string()))
            .map_err(|err| ReadError::decode(name, err.to_string())),
        ValueRef::Real(_) | ValueRef::Blob(_) => {
            Err(ReadError::decode(name, format!("unsupported {} value", value.data_type())))
        }
    }
}

/// Validates store paths for safety limits.
fn validate_store_path(path: &Path) -> Result<(), SqliteStoreError> {
    let path_string = path.display().to_string();
    if path_string.is_empty() {
        return Err(SqliteStoreError::Invalid("store path is empty".to_string()));
    }
    if path_string.len() > MAX_TOTAL_PATH_LENGTH {
        return Err(SqliteStoreError::Invalid("store path exceeds length limit".to_string()));
    }
    for component in path.components() {
        let name = component.as_os_str().to_string_lossy();
        if name.len() > MAX_PATH_COMPONENT_LENGTH {
            return Err(SqliteStoreError::Invalid(
                "store path contains an overlong component".to_string(),
            ));
        }
    }
    if path.exists() && path.is_dir() {
        return Err(SqliteStoreError::Invalid(
            "store path must be a file, not a directory".to_string(),
        ));
    }
    Ok(())
}

/// Opens a read-only `SQLite` connection.
fn open_connection(config: &SqliteStoreConfig) -> Result<Connection, SqliteStoreError> {
    let flags = OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX;
    let connection = Connection::open_with_flags(&config.path, flags)
        .map_err(|err| SqliteStoreError::Db(err.to_string()))?;
    apply_pragmas(&connection, config)?;
    Ok(connection)
}

/// Applies `SQLite` pragmas for read-only access.
fn apply_pragmas(
    connection: &Connection,
    config: &SqliteStoreConfig,
) -> Result<(), SqliteStoreError> {
    connection
        .execute_batch("PRAGMA query_only = ON;")
        .map_err(|err| SqliteStoreError::Db(err.to_string()))?;
    connection
        .busy_timeout(Duration::from_millis(config.busy_timeout_ms))
        .map_err(|err| SqliteStoreError::Db(err.to_string()))?;
    Ok(())
}

// ============================================================================
// SECTION: Tests
// ============================================================================
