// crates/subvalidation-core/src/runtime/memory.rs
// ============================================================================
// Module: In-Memory Query Runner
// Description: Canned row sources and query runner for tests and demos.
// Purpose: Exercise the reader without a database.
// Dependencies: crate::interfaces
// ============================================================================

//! ## Overview
//! [`MemoryQueryRunner`] serves canned rows per [`QueryName`], records every
//! call with its bound parameters, and can inject failures either before
//! the first row or after a fixed number of rows. It is intended for tests
//! and examples.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::HashMap;
use std::sync::Mutex;

use crate::interfaces::ColumnValue;
use crate::interfaces::QueryName;
use crate::interfaces::QueryParam;
use crate::interfaces::QueryRunner;
use crate::interfaces::ReadError;
use crate::interfaces::Row;
use crate::interfaces::RowSource;
use crate::interfaces::RowVisitor;

// ============================================================================
// SECTION: Rows
// ============================================================================

/// Row held in memory as ordered column/value pairs.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MemoryRow {
    /// Column values in insertion order.
    columns: Vec<(String, ColumnValue)>,
}

impl MemoryRow {
    /// Creates an empty row.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds or replaces `column`.
    #[must_use]
    pub fn with(mut self, column: &str, value: impl Into<ColumnValue>) -> Self {
        let value = value.into();
        if let Some(slot) = self.columns.iter_mut().find(|(name, _)| name == column) {
            slot.1 = value;
        } else {
            self.columns.push((column.to_string(), value));
        }
        self
    }
}

impl Row for MemoryRow {
    fn value(&self, column: &str) -> Result<ColumnValue, ReadError> {
        self.columns
            .iter()
            .find(|(name, _)| name == column)
            .map(|(_, value)| value.clone())
            .ok_or_else(|| ReadError::Column {
                column: column.to_string(),
                message: "not present in result".to_string(),
            })
    }
}

/// Forward-only cursor over in-memory rows.
#[derive(Debug, Clone, Default)]
pub struct MemoryRowSource {
    /// Rows served in order.
    rows: Vec<MemoryRow>,
    /// Index of the next row.
    position: usize,
    /// Fail instead of serving row number `n` (zero based).
    fail_after: Option<usize>,
}

impl MemoryRowSource {
    /// Creates a source over `rows`.
    #[must_use]
    pub fn new(rows: Vec<MemoryRow>) -> Self {
        Self {
            rows,
            position: 0,
            fail_after: None,
        }
    }

    /// Serves `count` rows, then fails on the next advance.
    #[must_use]
    pub const fn failing_after(mut self, count: usize) -> Self {
        self.fail_after = Some(count);
        self
    }

    /// Number of rows handed out so far.
    #[must_use]
    pub const fn consumed(&self) -> usize {
        self.position
    }
}

impl RowSource for MemoryRowSource {
    fn next_row(&mut self) -> Result<Option<&dyn Row>, ReadError> {
        if let Some(limit) = self.fail_after
            && self.position >= limit
        {
            return Err(ReadError::Source(format!("cursor failed after {limit} rows")));
        }
        let index = self.position;
        if index < self.rows.len() {
            self.position += 1;
        }
        Ok(self.rows.get(index).map(|row| row as &dyn Row))
    }
}

// ============================================================================
// SECTION: Query Runner
// ============================================================================

/// One query observed by [`MemoryQueryRunner`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedQuery {
    /// Query that was run.
    pub query: QueryName,
    /// Parameters bound to it.
    pub params: Vec<QueryParam>,
}

/// Canned outcome for one query.
#[derive(Debug, Clone)]
enum CannedResult {
    /// Serve rows, optionally failing after a prefix.
    Rows {
        /// Rows to serve.
        rows: Vec<MemoryRow>,
        /// Failure point, if any.
        fail_after: Option<usize>,
    },
    /// Fail before any row is produced.
    Fail(ReadError),
}

/// Query runner serving canned rows. Queries without canned rows return an
/// empty result.
#[derive(Debug, Default)]
pub struct MemoryQueryRunner {
    /// Canned outcomes by query.
    results: HashMap<QueryName, CannedResult>,
    /// Calls in arrival order.
    calls: Mutex<Vec<RecordedQuery>>,
}

impl MemoryQueryRunner {
    /// Creates a runner with no canned results.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Serves `rows` for `query`.
    #[must_use]
    pub fn with_rows(mut self, query: QueryName, rows: Vec<MemoryRow>) -> Self {
        self.results.insert(
            query,
            CannedResult::Rows {
                rows,
                fail_after: None,
            },
        );
        self
    }

    /// Serves the first `count` of `rows` for `query`, then fails.
    #[must_use]
    pub fn with_rows_failing_after(
        mut self,
        query: QueryName,
        rows: Vec<MemoryRow>,
        count: usize,
    ) -> Self {
        self.results.insert(
            query,
            CannedResult::Rows {
                rows,
                fail_after: Some(count),
            },
        );
        self
    }

    /// Fails `query` with `error` before producing rows.
    #[must_use]
    pub fn with_failure(mut self, query: QueryName, error: ReadError) -> Self {
        self.results.insert(query, CannedResult::Fail(error));
        self
    }

    /// Returns every call observed so far.
    #[must_use]
    pub fn calls(&self) -> Vec<RecordedQuery> {
        self.calls.lock().map(|calls| calls.clone()).unwrap_or_default()
    }
}

impl QueryRunner for MemoryQueryRunner {
    fn run_query(
        &self,
        query: QueryName,
        params: &[QueryParam],
        visit: &mut RowVisitor<'_>,
    ) -> Result<(), ReadError> {
        if let Ok(mut calls) = self.calls.lock() {
            calls.push(RecordedQuery {
                query,
                params: params.to_vec(),
            });
        }
        let mut source = match self.results.get(&query) {
            None => MemoryRowSource::default(),
            Some(CannedResult::Fail(error)) => return Err(error.clone()),
            Some(CannedResult::Rows {
                rows,
                fail_after,
            }) => {
                let source = MemoryRowSource::new(rows.clone());
                match fail_after {
                    Some(count) => source.failing_after(*count),
                    None => source,
                }
            }
        };
        visit(&mut source)
    }
}

// ============================================================================
// SECTION: Tests
// ============================================================================
