// crates/subvalidation-core/src/runtime/mod.rs
// ============================================================================
// Module: Subscription Validation Runtime
// Description: Aggregation, reader operations, and default collaborators.
// Purpose: Turn catalog query results into validation entities.
// Dependencies: crate::{core, interfaces}
// ============================================================================

//! ## Overview
//! The runtime is synchronous and holds no shared mutable state: every
//! operation builds its own aggregation index and returns owned values.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod aggregate;
pub mod audit;
pub mod best_effort;
pub mod memory;
pub mod reader;
pub mod tenant;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use aggregate::aggregate;
pub use aggregate::aggregate_first;
pub use aggregate::collect_rows;
pub use aggregate::first_row;
pub use aggregate::query_with;
pub use audit::FileLoadAuditSink;
pub use audit::LoadAuditEvent;
pub use audit::LoadAuditSink;
pub use audit::LoadOutcome;
pub use audit::MemoryLoadAuditSink;
pub use audit::NoopLoadAuditSink;
pub use audit::StderrLoadAuditSink;
pub use best_effort::BestEffortLoader;
pub use memory::MemoryQueryRunner;
pub use memory::MemoryRow;
pub use memory::MemoryRowSource;
pub use memory::RecordedQuery;
pub use reader::LoadError;
pub use reader::SubscriptionValidationReader;
pub use tenant::StaticTenantResolver;
