// crates/subvalidation-core/src/core/model.rs
// ============================================================================
// Module: Subscription Validation Model
// Description: Read-only entities loaded into the validation cache.
// Purpose: Define entity shapes and their row mappings.
// Dependencies: crate::interfaces, serde
// ============================================================================

//! ## Overview
//! Entities are plain values built fresh for every query. [`Api`] and
//! [`Application`] are parents that aggregate child rows; everything else is
//! built from exactly one row. Column names are the result aliases produced
//! by the query catalog.

// ============================================================================
// SECTION: Imports
// ============================================================================

use serde::Deserialize;
use serde::Serialize;

use crate::core::identifiers::ApiId;
use crate::core::identifiers::ApplicationId;
use crate::core::identifiers::TenantId;
use crate::interfaces::Aggregate;
use crate::interfaces::FromRow;
use crate::interfaces::ReadError;
use crate::interfaces::Row;

// ============================================================================
// SECTION: APIs
// ============================================================================

/// Published API together with its resources.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Api {
    /// API identifier.
    pub api_id: ApiId,
    /// API provider (publisher user name).
    pub provider: String,
    /// API name.
    pub name: String,
    /// API-level throttling tier.
    pub policy: Option<String>,
    /// API version.
    pub version: String,
    /// API context path.
    pub context: String,
    /// URL mappings in row arrival order.
    pub resources: Vec<UrlMapping>,
}

/// Resource (URL mapping) of an API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UrlMapping {
    /// HTTP verb.
    pub http_method: String,
    /// Authentication scheme.
    pub auth_scheme: Option<String>,
    /// Resource-level throttling tier.
    pub throttling_policy: Option<String>,
    /// URL template.
    pub url_pattern: Option<String>,
}

impl UrlMapping {
    /// Builds a mapping from `row` when it carries an HTTP method.
    fn from_optional_row(row: &dyn Row) -> Result<Option<Self>, ReadError> {
        let Some(http_method) = row.opt_text("HTTP_METHOD")? else {
            return Ok(None);
        };
        Ok(Some(Self {
            http_method,
            auth_scheme: row.opt_text("AUTH_SCHEME")?,
            throttling_policy: row.opt_text("THROTTLING_TIER")?,
            url_pattern: row.opt_text("URL_PATTERN")?,
        }))
    }
}

impl FromRow for UrlMapping {
    fn from_row(row: &dyn Row) -> Result<Self, ReadError> {
        Self::from_optional_row(row)?
            .ok_or_else(|| ReadError::decode("HTTP_METHOD", "expected text, found null"))
    }
}

impl Aggregate for Api {
    type Key = ApiId;
    type Child = UrlMapping;

    fn parent_key(row: &dyn Row) -> Result<ApiId, ReadError> {
        row.int("API_ID").map(ApiId::new)
    }

    fn from_first_row(row: &dyn Row) -> Result<Self, ReadError> {
        Ok(Self {
            api_id: Self::parent_key(row)?,
            provider: row.text("API_PROVIDER")?,
            name: row.text("API_NAME")?,
            policy: row.opt_text("API_TIER")?,
            version: row.text("API_VERSION")?,
            context: row.text("CONTEXT")?,
            resources: Vec::new(),
        })
    }

    fn child_from_row(row: &dyn Row) -> Result<Option<UrlMapping>, ReadError> {
        UrlMapping::from_optional_row(row)
    }

    fn attach_child(&mut self, child: UrlMapping) {
        self.resources.push(child);
    }
}

// ============================================================================
// SECTION: Applications
// ============================================================================

/// Consumer application with its attributes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Application {
    /// Application identifier.
    pub id: ApplicationId,
    /// Application throttling tier.
    pub policy: String,
    /// Owning subscriber's user name.
    pub subscriber_name: String,
    /// Token type issued for the application.
    pub token_type: Option<String>,
    /// Custom attributes in row arrival order.
    pub attributes: Vec<ApplicationAttribute>,
}

/// Name/value attribute attached to an application.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApplicationAttribute {
    /// Attribute name.
    pub name: String,
    /// Attribute value.
    pub value: Option<String>,
}

impl Aggregate for Application {
    type Key = ApplicationId;
    type Child = ApplicationAttribute;

    fn parent_key(row: &dyn Row) -> Result<ApplicationId, ReadError> {
        row.int("APP_ID").map(ApplicationId::new)
    }

    fn from_first_row(row: &dyn Row) -> Result<Self, ReadError> {
        Ok(Self {
            id: Self::parent_key(row)?,
            policy: row.text("TIER")?,
            subscriber_name: row.text("SUB_NAME")?,
            token_type: row.opt_text("TOKEN_TYPE")?,
            attributes: Vec::new(),
        })
    }

    fn child_from_row(row: &dyn Row) -> Result<Option<ApplicationAttribute>, ReadError> {
        let Some(name) = row.opt_text("ATTRIBUTE_NAME")? else {
            return Ok(None);
        };
        Ok(Some(ApplicationAttribute {
            name,
            value: row.opt_text("ATTRIBUTE_VALUE")?,
        }))
    }

    fn attach_child(&mut self, child: ApplicationAttribute) {
        self.attributes.push(child);
    }
}

// ============================================================================
// SECTION: Subscriptions and Keys
// ============================================================================

/// Subscription of an application to an API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Subscription {
    /// Subscription identifier.
    pub subscription_id: i32,
    /// Subscription throttling tier.
    pub policy_id: String,
    /// Subscribed API.
    pub api_id: ApiId,
    /// Subscribing application.
    pub app_id: ApplicationId,
    /// Subscription state (for example `UNBLOCKED`).
    pub state: String,
}

impl FromRow for Subscription {
    fn from_row(row: &dyn Row) -> Result<Self, ReadError> {
        Ok(Self {
            subscription_id: row.int("SUB_ID")?,
            policy_id: row.text("TIER")?,
            api_id: ApiId::new(row.int("API_ID")?),
            app_id: ApplicationId::new(row.int("APP_ID")?),
            state: row.text("STATUS")?,
        })
    }
}

/// OAuth consumer key issued to an application.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApplicationKeyMapping {
    /// Owning application.
    pub application_id: ApplicationId,
    /// Consumer key.
    pub consumer_key: String,
    /// Key type (for example `PRODUCTION`).
    pub key_type: String,
}

impl FromRow for ApplicationKeyMapping {
    fn from_row(row: &dyn Row) -> Result<Self, ReadError> {
        Ok(Self {
            application_id: ApplicationId::new(row.int("APPLICATION_ID")?),
            consumer_key: row.text("CONSUMER_KEY")?,
            key_type: row.text("KEY_TYPE")?,
        })
    }
}

// ============================================================================
// SECTION: Policies
// ============================================================================

/// Subscription-level throttling policy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubscriptionPolicy {
    /// Policy identifier.
    pub id: i32,
    /// Policy name.
    pub name: String,
    /// Quota type (for example `requestCount`).
    pub quota_type: String,
    /// Owning tenant.
    pub tenant_id: TenantId,
    /// Burst rate limit count.
    pub rate_limit_count: i32,
    /// Burst rate limit unit.
    pub rate_limit_time_unit: Option<String>,
    /// Whether requests stop once the quota is reached.
    pub stop_on_quota_reach: bool,
}

impl FromRow for SubscriptionPolicy {
    fn from_row(row: &dyn Row) -> Result<Self, ReadError> {
        Ok(Self {
            id: row.int("POLICY_ID")?,
            name: row.text("NAME")?,
            quota_type: row.text("QUOTA_TYPE")?,
            tenant_id: TenantId::new(row.int("TENANT_ID")?),
            rate_limit_count: row.int("RATE_LIMIT_COUNT")?,
            rate_limit_time_unit: row.opt_text("RATE_LIMIT_TIME_UNIT")?,
            stop_on_quota_reach: row.boolean("STOP_ON_QUOTA_REACH")?,
        })
    }
}

/// Application-level throttling policy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApplicationPolicy {
    /// Policy identifier.
    pub id: i32,
    /// Policy name.
    pub name: String,
    /// Quota type.
    pub quota_type: String,
    /// Owning tenant.
    pub tenant_id: TenantId,
}

impl FromRow for ApplicationPolicy {
    fn from_row(row: &dyn Row) -> Result<Self, ReadError> {
        let (id, name, quota_type, tenant_id) = policy_columns(row)?;
        Ok(Self {
            id,
            name,
            quota_type,
            tenant_id,
        })
    }
}

/// API-level (advanced) throttling policy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiPolicy {
    /// Policy identifier.
    pub id: i32,
    /// Policy name.
    pub name: String,
    /// Default quota type.
    pub quota_type: String,
    /// Owning tenant.
    pub tenant_id: TenantId,
}

impl FromRow for ApiPolicy {
    fn from_row(row: &dyn Row) -> Result<Self, ReadError> {
        let (id, name, quota_type, tenant_id) = policy_columns(row)?;
        Ok(Self {
            id,
            name,
            quota_type,
            tenant_id,
        })
    }
}

/// Reads the columns shared by every policy table.
fn policy_columns(row: &dyn Row) -> Result<(i32, String, String, TenantId), ReadError> {
    Ok((
        row.int("POLICY_ID")?,
        row.text("NAME")?,
        row.text("QUOTA_TYPE")?,
        TenantId::new(row.int("TENANT_ID")?),
    ))
}
