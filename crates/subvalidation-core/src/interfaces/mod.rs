// crates/subvalidation-core/src/interfaces/mod.rs
// ============================================================================
// Module: Subscription Validation Interfaces
// Description: Collaborator contracts for row access, queries, and tenancy.
// Purpose: Keep the aggregation runtime independent of any database driver.
// Dependencies: crate::core, thiserror
// ============================================================================

//! ## Overview
//! The runtime never opens connections or writes SQL. It talks to four
//! collaborators through the traits in this module:
//! - [`RowSource`] / [`Row`]: a forward-only cursor over name-addressed columns.
//! - [`QueryCatalog`]: fixed query text keyed by [`QueryName`].
//! - [`QueryRunner`]: executes one named query with bound [`QueryParam`]s.
//! - [`TenantResolver`]: maps tenant domains to ids and back.
//!
//! Implementations must release every resource they acquire before
//! [`QueryRunner::run_query`] returns, on success and on failure.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt;

use thiserror::Error;

use crate::core::identifiers::TenantDomain;
use crate::core::identifiers::TenantId;

// ============================================================================
// SECTION: Read Errors
// ============================================================================

/// Errors raised while acquiring, executing, or reading a query result.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ReadError {
    /// Connection could not be acquired.
    #[error("connection error: {0}")]
    Connection(String),
    /// Query could not be prepared or executed.
    #[error("query error: {0}")]
    Query(String),
    /// Requested column is not part of the result.
    #[error("column {column}: {message}")]
    Column {
        /// Column name.
        column: String,
        /// Failure detail.
        message: String,
    },
    /// Column value could not be converted to the requested type.
    #[error("column {column} decode error: {message}")]
    Decode {
        /// Column name.
        column: String,
        /// Failure detail.
        message: String,
    },
    /// Row source failed while advancing.
    #[error("row source error: {0}")]
    Source(String),
}

impl ReadError {
    /// Returns a stable label for audit events.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Connection(_) => "connection",
            Self::Query(_) => "query",
            Self::Column {
                ..
            } => "column",
            Self::Decode {
                ..
            } => "decode",
            Self::Source(_) => "source",
        }
    }

    /// Builds a decode error for `column`.
    #[must_use]
    pub fn decode(column: &str, message: impl Into<String>) -> Self {
        Self::Decode {
            column: column.to_string(),
            message: message.into(),
        }
    }
}

// ============================================================================
// SECTION: Rows
// ============================================================================

/// A single column value as produced by a row source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ColumnValue {
    /// SQL `NULL`.
    Null,
    /// Integer value.
    Integer(i64),
    /// Text value.
    Text(String),
    /// Boolean value (drivers without a native boolean use [`Self::Integer`]).
    Boolean(bool),
}

impl ColumnValue {
    /// Returns a short type label used in decode errors.
    #[must_use]
    pub const fn type_label(&self) -> &'static str {
        match self {
            Self::Null => "null",
            Self::Integer(_) => "integer",
            Self::Text(_) => "text",
            Self::Boolean(_) => "boolean",
        }
    }
}

impl From<i64> for ColumnValue {
    fn from(value: i64) -> Self {
        Self::Integer(value)
    }
}

impl From<i32> for ColumnValue {
    fn from(value: i32) -> Self {
        Self::Integer(i64::from(value))
    }
}

impl From<bool> for ColumnValue {
    fn from(value: bool) -> Self {
        Self::Boolean(value)
    }
}

impl From<&str> for ColumnValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for ColumnValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl<T: Into<Self>> From<Option<T>> for ColumnValue {
    fn from(value: Option<T>) -> Self {
        value.map_or(Self::Null, Into::into)
    }
}

/// One row of a query result, addressed by column name.
///
/// Only [`Row::value`] is required; the typed accessors are derived from it.
pub trait Row {
    /// Returns the raw value stored in `column`.
    ///
    /// # Errors
    ///
    /// Returns [`ReadError::Column`] when the column is not in the result and
    /// [`ReadError::Decode`] when the driver value has no [`ColumnValue`] form.
    fn value(&self, column: &str) -> Result<ColumnValue, ReadError>;

    /// Reads a non-null 32-bit integer.
    ///
    /// # Errors
    ///
    /// Returns [`ReadError`] when the value is null, not an integer, or out
    /// of range.
    fn int(&self, column: &str) -> Result<i32, ReadError> {
        match self.value(column)? {
            ColumnValue::Integer(value) => i32::try_from(value)
                .map_err(|_| ReadError::decode(column, format!("integer {value} out of range"))),
            ColumnValue::Boolean(value) => Ok(i32::from(value)),
            other => Err(ReadError::decode(
                column,
                format!("expected integer, found {}", other.type_label()),
            )),
        }
    }

    /// Reads a non-null string.
    ///
    /// # Errors
    ///
    /// Returns [`ReadError`] when the value is null or not text.
    fn text(&self, column: &str) -> Result<String, ReadError> {
        self.opt_text(column)?
            .ok_or_else(|| ReadError::decode(column, "expected text, found null"))
    }

    /// Reads a nullable string.
    ///
    /// # Errors
    ///
    /// Returns [`ReadError`] when the value is neither null nor text.
    fn opt_text(&self, column: &str) -> Result<Option<String>, ReadError> {
        match self.value(column)? {
            ColumnValue::Null => Ok(None),
            ColumnValue::Text(value) => Ok(Some(value)),
            other => Err(ReadError::decode(
                column,
                format!("expected text, found {}", other.type_label()),
            )),
        }
    }

    /// Reads a boolean flag. `NULL` reads as `false`, integers as `!= 0`.
    ///
    /// # Errors
    ///
    /// Returns [`ReadError`] when a text value is not a recognized flag.
    fn boolean(&self, column: &str) -> Result<bool, ReadError> {
        match self.value(column)? {
            ColumnValue::Null => Ok(false),
            ColumnValue::Boolean(value) => Ok(value),
            ColumnValue::Integer(value) => Ok(value != 0),
            ColumnValue::Text(value) => match value.trim().to_ascii_lowercase().as_str() {
                "true" | "1" => Ok(true),
                "false" | "0" => Ok(false),
                _ => Err(ReadError::decode(column, format!("unrecognized boolean {value:?}"))),
            },
        }
    }
}

/// Forward-only cursor over the rows of one query result.
pub trait RowSource {
    /// Advances to the next row; `Ok(None)` once exhausted.
    ///
    /// # Errors
    ///
    /// Returns [`ReadError`] when the underlying cursor fails.
    fn next_row(&mut self) -> Result<Option<&dyn Row>, ReadError>;
}

// ============================================================================
// SECTION: Row Mapping
// ============================================================================

/// Maps one row to one standalone entity.
pub trait FromRow: Sized {
    /// Builds the entity from `row`.
    ///
    /// # Errors
    ///
    /// Returns [`ReadError`] when a required column is missing or malformed.
    fn from_row(row: &dyn Row) -> Result<Self, ReadError>;
}

/// Maps rows to a parent entity that owns a child collection.
///
/// Rows sharing [`Aggregate::parent_key`] fold into one entity: the first
/// row builds it, every row may contribute one child.
pub trait Aggregate: Sized {
    /// Parent key type; the sole deduplication key.
    type Key: Eq + std::hash::Hash;
    /// Child record type.
    type Child;

    /// Extracts the parent key from `row`.
    ///
    /// # Errors
    ///
    /// Returns [`ReadError`] when the key column is missing or malformed.
    fn parent_key(row: &dyn Row) -> Result<Self::Key, ReadError>;

    /// Builds the parent from the first row observed for its key.
    ///
    /// # Errors
    ///
    /// Returns [`ReadError`] when a required column is missing or malformed.
    fn from_first_row(row: &dyn Row) -> Result<Self, ReadError>;

    /// Builds the child carried by `row`, if any.
    ///
    /// # Errors
    ///
    /// Returns [`ReadError`] when a child column is malformed.
    fn child_from_row(row: &dyn Row) -> Result<Option<Self::Child>, ReadError>;

    /// Appends `child` to the parent's collection.
    fn attach_child(&mut self, child: Self::Child);
}

// ============================================================================
// SECTION: Queries
// ============================================================================

/// Named read queries served by a [`QueryCatalog`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum QueryName {
    /// Every API with its URL mappings.
    AllApis,
    /// Super tenant APIs (context NOT LIKE ?1).
    SuperTenantApis,
    /// Tenant APIs (context LIKE ?1).
    TenantApis,
    /// One API by version (?1) and context (?2).
    ApiByVersionContext,
    /// Every subscription.
    AllSubscriptions,
    /// Subscriptions for tenant id ?1.
    TenantSubscriptions,
    /// One subscription by API id (?1) and application id (?2).
    SubscriptionByApiApp,
    /// Every application with its attributes.
    AllApplications,
    /// Applications for tenant id ?1.
    TenantApplications,
    /// One application by id ?1.
    ApplicationById,
    /// Every application key mapping.
    AllKeyMappings,
    /// Key mappings for tenant id ?1.
    TenantKeyMappings,
    /// Key mapping by application id (?1) and key type (?2).
    KeyMappingByAppAndType,
    /// Key mapping by consumer key ?1.
    KeyMappingByConsumerKey,
    /// Every subscription policy.
    AllSubscriptionPolicies,
    /// Subscription policies for tenant id ?1.
    TenantSubscriptionPolicies,
    /// Subscription policy by name (?1) and tenant id (?2).
    SubscriptionPolicyByName,
    /// Every application policy.
    AllApplicationPolicies,
    /// Application policies for tenant id ?1.
    TenantApplicationPolicies,
    /// Application policy by name (?1) and tenant id (?2).
    ApplicationPolicyByName,
    /// Every API throttle policy.
    AllApiPolicies,
    /// API throttle policies for tenant id ?1.
    TenantApiPolicies,
    /// API throttle policy by name (?1) and tenant id (?2).
    ApiPolicyByName,
    /// Every URL mapping.
    AllUrlMappings,
    /// Super tenant URL mappings (context NOT LIKE ?1).
    SuperTenantUrlMappings,
    /// Tenant URL mappings (context LIKE ?1).
    TenantUrlMappings,
}

impl QueryName {
    /// Every query name, in declaration order.
    pub const ALL: [Self; 26] = [
        Self::AllApis,
        Self::SuperTenantApis,
        Self::TenantApis,
        Self::ApiByVersionContext,
        Self::AllSubscriptions,
        Self::TenantSubscriptions,
        Self::SubscriptionByApiApp,
        Self::AllApplications,
        Self::TenantApplications,
        Self::ApplicationById,
        Self::AllKeyMappings,
        Self::TenantKeyMappings,
        Self::KeyMappingByAppAndType,
        Self::KeyMappingByConsumerKey,
        Self::AllSubscriptionPolicies,
        Self::TenantSubscriptionPolicies,
        Self::SubscriptionPolicyByName,
        Self::AllApplicationPolicies,
        Self::TenantApplicationPolicies,
        Self::ApplicationPolicyByName,
        Self::AllApiPolicies,
        Self::TenantApiPolicies,
        Self::ApiPolicyByName,
        Self::AllUrlMappings,
        Self::SuperTenantUrlMappings,
        Self::TenantUrlMappings,
    ];

    /// Returns the stable snake-case label of the query.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::AllApis => "all_apis",
            Self::SuperTenantApis => "super_tenant_apis",
            Self::TenantApis => "tenant_apis",
            Self::ApiByVersionContext => "api_by_version_context",
            Self::AllSubscriptions => "all_subscriptions",
            Self::TenantSubscriptions => "tenant_subscriptions",
            Self::SubscriptionByApiApp => "subscription_by_api_app",
            Self::AllApplications => "all_applications",
            Self::TenantApplications => "tenant_applications",
            Self::ApplicationById => "application_by_id",
            Self::AllKeyMappings => "all_key_mappings",
            Self::TenantKeyMappings => "tenant_key_mappings",
            Self::KeyMappingByAppAndType => "key_mapping_by_app_and_type",
            Self::KeyMappingByConsumerKey => "key_mapping_by_consumer_key",
            Self::AllSubscriptionPolicies => "all_subscription_policies",
            Self::TenantSubscriptionPolicies => "tenant_subscription_policies",
            Self::SubscriptionPolicyByName => "subscription_policy_by_name",
            Self::AllApplicationPolicies => "all_application_policies",
            Self::TenantApplicationPolicies => "tenant_application_policies",
            Self::ApplicationPolicyByName => "application_policy_by_name",
            Self::AllApiPolicies => "all_api_policies",
            Self::TenantApiPolicies => "tenant_api_policies",
            Self::ApiPolicyByName => "api_policy_by_name",
            Self::AllUrlMappings => "all_url_mappings",
            Self::SuperTenantUrlMappings => "super_tenant_url_mappings",
            Self::TenantUrlMappings => "tenant_url_mappings",
        }
    }
}

impl fmt::Display for QueryName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Positional parameter bound to a catalog query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QueryParam {
    /// Integer parameter.
    Int(i64),
    /// Text parameter.
    Text(String),
}

impl From<i32> for QueryParam {
    fn from(value: i32) -> Self {
        Self::Int(i64::from(value))
    }
}

impl From<&str> for QueryParam {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for QueryParam {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

/// Supplies fixed, pre-written query text per [`QueryName`].
pub trait QueryCatalog: Send + Sync {
    /// Returns the parameterized SQL for `query`.
    fn sql(&self, query: QueryName) -> &str;
}

/// Visitor invoked with the row source of one executed query.
pub type RowVisitor<'a> = dyn FnMut(&mut dyn RowSource) -> Result<(), ReadError> + 'a;

/// Executes catalog queries and exposes their results as a [`RowSource`].
pub trait QueryRunner {
    /// Runs `query` with `params` bound positionally and passes the result
    /// rows to `visit` exactly once.
    ///
    /// # Errors
    ///
    /// Returns [`ReadError`] when the connection, the query, or the visitor
    /// fails. Resources are released before returning in every case.
    fn run_query(
        &self,
        query: QueryName,
        params: &[QueryParam],
        visit: &mut RowVisitor<'_>,
    ) -> Result<(), ReadError>;
}

// ============================================================================
// SECTION: Tenancy
// ============================================================================

/// Tenant resolution failures.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TenantResolutionError {
    /// No tenant is registered for the domain.
    #[error("unknown tenant domain: {0}")]
    UnknownDomain(String),
    /// No tenant is registered for the identifier.
    #[error("unknown tenant id: {0}")]
    UnknownTenantId(i32),
    /// The identity backend failed.
    #[error("tenant resolver backend error: {0}")]
    Backend(String),
}

/// Resolves tenant domains to numeric identifiers and back.
pub trait TenantResolver: Send + Sync {
    /// Returns the identifier registered for `domain`.
    ///
    /// # Errors
    ///
    /// Returns [`TenantResolutionError`] when the domain cannot be resolved.
    fn tenant_id(&self, domain: &TenantDomain) -> Result<TenantId, TenantResolutionError>;

    /// Returns the domain registered for `id`.
    ///
    /// # Errors
    ///
    /// Returns [`TenantResolutionError`] when the id cannot be resolved.
    fn tenant_domain(&self, id: TenantId) -> Result<TenantDomain, TenantResolutionError>;
}
