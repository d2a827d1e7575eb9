// crates/subvalidation-core/src/lib.rs
// ============================================================================
// Module: Subscription Validation Core Library
// Description: Public API surface for the subscription validation store.
// Purpose: Expose entity types, collaborator interfaces, and read operations.
// Dependencies: crate::{core, interfaces, runtime}
// ============================================================================

//! ## Overview
//! Subscription validation core reads API-management entities (APIs,
//! subscriptions, applications, policies, key mappings, URL mappings) from a
//! relational store and aggregates result rows into entities for the
//! gateway's validation cache. It is backend-agnostic: connections, SQL
//! text, and tenant lookups arrive through the traits in [`interfaces`].

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod core;
pub mod interfaces;
pub mod runtime;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use core::*;

pub use interfaces::Aggregate;
pub use interfaces::ColumnValue;
pub use interfaces::FromRow;
pub use interfaces::QueryCatalog;
pub use interfaces::QueryName;
pub use interfaces::QueryParam;
pub use interfaces::QueryRunner;
pub use interfaces::ReadError;
pub use interfaces::Row;
pub use interfaces::RowSource;
pub use interfaces::RowVisitor;
pub use interfaces::TenantResolutionError;
pub use interfaces::TenantResolver;
pub use runtime::BestEffortLoader;
pub use runtime::FileLoadAuditSink;
pub use runtime::LoadAuditEvent;
pub use runtime::LoadAuditSink;
pub use runtime::LoadError;
pub use runtime::LoadOutcome;
pub use runtime::MemoryLoadAuditSink;
pub use runtime::MemoryQueryRunner;
pub use runtime::MemoryRow;
pub use runtime::MemoryRowSource;
pub use runtime::NoopLoadAuditSink;
pub use runtime::RecordedQuery;
pub use runtime::StaticTenantResolver;
pub use runtime::StderrLoadAuditSink;
pub use runtime::SubscriptionValidationReader;
pub use runtime::aggregate;
pub use runtime::aggregate_first;
pub use runtime::collect_rows;
pub use runtime::first_row;
pub use runtime::query_with;
