// crates/subvalidation-store-sqlite/src/lib.rs
// ============================================================================
// Module: SQLite Validation Store
// Description: SQLite backend for the subscription validation reader.
// Purpose: Provide connections, query text, and row access over SQLite.
// Dependencies: subvalidation-core, rusqlite
// ============================================================================

//! ## Overview
//! This crate provides a [`QueryRunner`](subvalidation_core::QueryRunner)
//! that executes fixed catalog SQL against an API manager database opened
//! read-only. Security posture: storage contents are untrusted and every
//! column is decoded fail-closed.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod catalog;
pub mod store;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use catalog::REFERENCE_SCHEMA;
pub use catalog::SqliteQueryCatalog;
pub use store::ConnectionProvider;
pub use store::SqliteConnectionProvider;
pub use store::SqliteQueryRunner;
pub use store::SqliteStoreConfig;
pub use store::SqliteStoreError;
