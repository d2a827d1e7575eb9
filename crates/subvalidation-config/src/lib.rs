// crates/subvalidation-config/src/lib.rs
// ============================================================================
// Module: Subscription Validation Config Library
// Description: Canonical config model and validation.
// Purpose: Single source of truth for subvalidation.toml semantics.
// Dependencies: subvalidation-core, subvalidation-store-sqlite, serde, toml
// ============================================================================

//! ## Overview
//! `subvalidation-config` defines the configuration model for the
//! subscription validation reader. Loading is strict and fail-closed, and the
//! validated config builds the store runner, tenant resolver, and audit sink.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod config;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use config::*;
