// crates/subvalidation-core/src/runtime/aggregate.rs
// ============================================================================
// Module: Row Aggregation
// Description: Fold query rows into parent entities and child collections.
// Purpose: Deduplicate parents by key while preserving arrival order.
// Dependencies: crate::interfaces
// ============================================================================

//! ## Overview
//! [`aggregate`] consumes a row source and returns one entity per distinct
//! parent key, in first-seen order. The first row for a key fixes the
//! parent's scalars; every row may contribute one child, appended in
//! arrival order. Later scalar values that disagree with the first row are
//! ignored.
//!
//! Errors raised by the source propagate unchanged and discard everything
//! aggregated so far; there is no partial-result contract.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::HashMap;

use crate::interfaces::Aggregate;
use crate::interfaces::FromRow;
use crate::interfaces::QueryName;
use crate::interfaces::QueryParam;
use crate::interfaces::QueryRunner;
use crate::interfaces::ReadError;
use crate::interfaces::RowSource;

// ============================================================================
// SECTION: Aggregation
// ============================================================================

/// Aggregates every row of `source` into parent entities.
///
/// # Errors
///
/// Returns the first [`ReadError`] raised by the source or a row mapping.
pub fn aggregate<T: Aggregate>(source: &mut dyn RowSource) -> Result<Vec<T>, ReadError> {
    let mut index: HashMap<T::Key, usize> = HashMap::new();
    let mut output: Vec<T> = Vec::new();
    while let Some(row) = source.next_row()? {
        let key = T::parent_key(row)?;
        let position = match index.get(&key) {
            Some(position) => *position,
            None => {
                output.push(T::from_first_row(row)?);
                let position = output.len() - 1;
                index.insert(key, position);
                position
            }
        };
        if let Some(child) = T::child_from_row(row)?
            && let Some(parent) = output.get_mut(position)
        {
            parent.attach_child(child);
        }
    }
    Ok(output)
}

/// Builds one parent entity from the first row of `source` only.
///
/// The remaining rows are left unread, so the result carries at most one
/// child. Use it for existence or header lookups; lookups that return the
/// entity with all its children, such as the reader's `api` and
/// `application`, go through [`aggregate`].
///
/// # Errors
///
/// Returns [`ReadError`] when the source or the row mapping fails.
pub fn aggregate_first<T: Aggregate>(source: &mut dyn RowSource) -> Result<Option<T>, ReadError> {
    let Some(row) = source.next_row()? else {
        return Ok(None);
    };
    let mut parent = T::from_first_row(row)?;
    if let Some(child) = T::child_from_row(row)? {
        parent.attach_child(child);
    }
    Ok(Some(parent))
}

/// Maps every row of `source` to a standalone entity.
///
/// # Errors
///
/// Returns the first [`ReadError`] raised by the source or a row mapping.
pub fn collect_rows<T: FromRow>(source: &mut dyn RowSource) -> Result<Vec<T>, ReadError> {
    let mut output = Vec::new();
    while let Some(row) = source.next_row()? {
        output.push(T::from_row(row)?);
    }
    Ok(output)
}

/// Maps the first row of `source` to a standalone entity.
///
/// # Errors
///
/// Returns [`ReadError`] when the source or the row mapping fails.
pub fn first_row<T: FromRow>(source: &mut dyn RowSource) -> Result<Option<T>, ReadError> {
    match source.next_row()? {
        Some(row) => T::from_row(row).map(Some),
        None => Ok(None),
    }
}

// ============================================================================
// SECTION: Query Helpers
// ============================================================================

/// Runs `query` and maps its row source with `map`.
///
/// # Errors
///
/// Returns [`ReadError`] when the runner or `map` fails, or when the runner
/// never hands over a row source.
pub fn query_with<R, T, F>(
    runner: &R,
    query: QueryName,
    params: &[QueryParam],
    mut map: F,
) -> Result<T, ReadError>
where
    R: QueryRunner + ?Sized,
    F: FnMut(&mut dyn RowSource) -> Result<T, ReadError>,
{
    let mut output: Option<T> = None;
    runner.run_query(query, params, &mut |source: &mut dyn RowSource| {
        output = Some(map(source)?);
        Ok(())
    })?;
    output.ok_or_else(|| ReadError::Source(format!("{query}: runner produced no row source")))
}
