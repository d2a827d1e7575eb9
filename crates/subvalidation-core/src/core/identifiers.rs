// crates/subvalidation-core/src/core/identifiers.rs
// ============================================================================
// Module: Subscription Validation Identifiers
// Description: Typed identifiers for APIs, applications, and tenants.
// Purpose: Keep integer keys from different tables from being mixed up.
// Dependencies: serde
// ============================================================================

//! ## Overview
//! Store rows carry plain integer keys. These wrappers give each key family
//! its own type so an application id can never be bound where an API id is
//! expected. Identifiers serialize transparently as their raw value.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt;

use serde::Deserialize;
use serde::Serialize;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Default super tenant domain name.
pub const DEFAULT_SUPER_TENANT_DOMAIN: &str = "carbon.super";
/// Default super tenant identifier.
pub const DEFAULT_SUPER_TENANT_ID: i32 = -1234;

// ============================================================================
// SECTION: Identifier Types
// ============================================================================

/// API identifier (`AM_API.API_ID`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ApiId(i32);

impl ApiId {
    /// Creates a new API identifier.
    #[must_use]
    pub const fn new(id: i32) -> Self {
        Self(id)
    }

    /// Returns the raw identifier value.
    #[must_use]
    pub const fn get(self) -> i32 {
        self.0
    }
}

impl fmt::Display for ApiId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<i32> for ApiId {
    fn from(value: i32) -> Self {
        Self::new(value)
    }
}

/// Application identifier (`AM_APPLICATION.APPLICATION_ID`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ApplicationId(i32);

impl ApplicationId {
    /// Creates a new application identifier.
    #[must_use]
    pub const fn new(id: i32) -> Self {
        Self(id)
    }

    /// Returns the raw identifier value.
    #[must_use]
    pub const fn get(self) -> i32 {
        self.0
    }
}

impl fmt::Display for ApplicationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<i32> for ApplicationId {
    fn from(value: i32) -> Self {
        Self::new(value)
    }
}

/// Numeric tenant identifier as issued by the identity service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TenantId(i32);

impl TenantId {
    /// Creates a new tenant identifier.
    #[must_use]
    pub const fn new(id: i32) -> Self {
        Self(id)
    }

    /// Returns the raw identifier value.
    #[must_use]
    pub const fn get(self) -> i32 {
        self.0
    }
}

impl fmt::Display for TenantId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<i32> for TenantId {
    fn from(value: i32) -> Self {
        Self::new(value)
    }
}

/// Tenant domain name (for example `wso2.com`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TenantDomain(String);

impl TenantDomain {
    /// Creates a new tenant domain.
    #[must_use]
    pub fn new(domain: impl Into<String>) -> Self {
        Self(domain.into())
    }

    /// Returns the domain as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns true when the domain is empty or whitespace.
    #[must_use]
    pub fn is_blank(&self) -> bool {
        self.0.trim().is_empty()
    }

    /// Compares domains ignoring ASCII case.
    #[must_use]
    pub fn matches(&self, other: &str) -> bool {
        self.0.eq_ignore_ascii_case(other)
    }
}

impl fmt::Display for TenantDomain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<&str> for TenantDomain {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for TenantDomain {
    fn from(value: String) -> Self {
        Self::new(value)
    }
}

// ============================================================================
// SECTION: Super Tenant
// ============================================================================

/// Identity of the super tenant, which owns every API outside `/t/...`.
///
/// # Invariants
/// - `domain` is compared case-insensitively.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SuperTenant {
    /// Super tenant domain name.
    pub domain: TenantDomain,
    /// Super tenant identifier.
    pub id: TenantId,
}

impl SuperTenant {
    /// Returns true when `domain` names the super tenant.
    #[must_use]
    pub fn is_domain(&self, domain: &TenantDomain) -> bool {
        self.domain.matches(domain.as_str())
    }

    /// Returns true when `id` is the super tenant identifier.
    #[must_use]
    pub fn is_id(&self, id: TenantId) -> bool {
        self.id == id
    }
}

impl Default for SuperTenant {
    fn default() -> Self {
        Self {
            domain: TenantDomain::new(DEFAULT_SUPER_TENANT_DOMAIN),
            id: TenantId::new(DEFAULT_SUPER_TENANT_ID),
        }
    }
}
