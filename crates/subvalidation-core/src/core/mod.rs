// crates/subvalidation-core/src/core/mod.rs
// ============================================================================
// Module: Subscription Validation Core Types
// Description: Identifiers and entity model.
// Purpose: Group the value types shared by every crate in the workspace.
// Dependencies: crate::core::{identifiers, model}
// ============================================================================

//! ## Overview
//! Value types only; no I/O happens in this module.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod identifiers;
pub mod model;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use identifiers::*;
pub use model::*;
