// crates/subvalidation-core/src/runtime/reader.rs
// ============================================================================
// Module: Subscription Validation Reader
// Description: Read operations for every validation entity kind.
// Purpose: Run catalog queries, aggregate rows, and report failures explicitly.
// Dependencies: crate::{core, interfaces, runtime}, thiserror
// ============================================================================

//! ## Overview
//! [`SubscriptionValidationReader`] is the strict read path. Each operation
//! runs one catalog query through the injected [`QueryRunner`], maps the
//! rows, records one [`LoadAuditEvent`], and returns either the entities or
//! a [`LoadError`]. An empty result is never used to signal failure, and a
//! tenant that cannot be resolved fails the operation instead of falling
//! back to a default id.
//!
//! Security posture: query text is fixed by the catalog; caller input only
//! ever reaches the store as bound parameters.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::sync::Arc;

use thiserror::Error;

use crate::core::identifiers::ApiId;
use crate::core::identifiers::ApplicationId;
use crate::core::identifiers::SuperTenant;
use crate::core::identifiers::TenantDomain;
use crate::core::identifiers::TenantId;
use crate::core::model::Api;
use crate::core::model::ApiPolicy;
use crate::core::model::Application;
use crate::core::model::ApplicationKeyMapping;
use crate::core::model::ApplicationPolicy;
use crate::core::model::Subscription;
use crate::core::model::SubscriptionPolicy;
use crate::core::model::UrlMapping;
use crate::interfaces::FromRow;
use crate::interfaces::QueryName;
use crate::interfaces::QueryParam;
use crate::interfaces::QueryRunner;
use crate::interfaces::ReadError;
use crate::interfaces::TenantResolutionError;
use crate::interfaces::TenantResolver;
use crate::runtime::aggregate::aggregate;
use crate::runtime::aggregate::collect_rows;
use crate::runtime::aggregate::first_row;
use crate::runtime::aggregate::query_with;
use crate::runtime::audit::LoadAuditEvent;
use crate::runtime::audit::LoadAuditSink;
use crate::runtime::audit::NoopLoadAuditSink;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Context prefix shared by every tenant API (`/t/{domain}/...`).
const TENANT_CONTEXT_PREFIX: &str = "/t";

/// Escape character declared by tenant LIKE queries.
const LIKE_ESCAPE: char = '\\';

// ============================================================================
// SECTION: Patterns
// ============================================================================

/// Escapes LIKE wildcards in `value` so it only matches itself.
fn escape_like(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for ch in value.chars() {
        if matches!(ch, '%' | '_' | LIKE_ESCAPE) {
            escaped.push(LIKE_ESCAPE);
        }
        escaped.push(ch);
    }
    escaped
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Errors returned by reader operations.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum LoadError {
    /// The store or a row mapping failed.
    #[error(transparent)]
    Read(#[from] ReadError),
    /// The tenant could not be resolved.
    #[error("tenant resolution failed for {tenant}: {source}")]
    TenantResolution {
        /// Tenant domain or id that was looked up.
        tenant: String,
        /// Resolver failure.
        source: TenantResolutionError,
    },
}

impl LoadError {
    /// Returns a stable label for audit events.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Read(err) => err.kind(),
            Self::TenantResolution {
                ..
            } => "tenant_resolution",
        }
    }
}

// ============================================================================
// SECTION: Entity Counts
// ============================================================================

/// Number of entities carried by an operation result.
trait EntityCount {
    /// Returns the entity count recorded in audit events.
    fn entity_count(&self) -> usize;
}

impl<T> EntityCount for Vec<T> {
    fn entity_count(&self) -> usize {
        self.len()
    }
}

impl<T> EntityCount for Option<T> {
    fn entity_count(&self) -> usize {
        usize::from(self.is_some())
    }
}

// ============================================================================
// SECTION: Reader
// ============================================================================

/// Strict reader over the validation store.
pub struct SubscriptionValidationReader<R> {
    /// Executes catalog queries.
    runner: R,
    /// Resolves tenant domains and ids.
    tenants: Arc<dyn TenantResolver>,
    /// Super tenant identity used for API and URL mapping filters.
    super_tenant: SuperTenant,
    /// Receives one event per operation.
    audit: Arc<dyn LoadAuditSink>,
}

impl<R: QueryRunner> SubscriptionValidationReader<R> {
    /// Creates a reader with the default super tenant and no audit output.
    #[must_use]
    pub fn new(runner: R, tenants: Arc<dyn TenantResolver>) -> Self {
        Self {
            runner,
            tenants,
            super_tenant: SuperTenant::default(),
            audit: Arc::new(NoopLoadAuditSink),
        }
    }

    /// Replaces the super tenant identity.
    #[must_use]
    pub fn with_super_tenant(mut self, super_tenant: SuperTenant) -> Self {
        self.super_tenant = super_tenant;
        self
    }

    /// Replaces the audit sink.
    #[must_use]
    pub fn with_audit_sink(mut self, audit: Arc<dyn LoadAuditSink>) -> Self {
        self.audit = audit;
        self
    }

    /// Returns the underlying query runner.
    #[must_use]
    pub const fn runner(&self) -> &R {
        &self.runner
    }

    /// Returns the configured super tenant.
    #[must_use]
    pub const fn super_tenant(&self) -> &SuperTenant {
        &self.super_tenant
    }

    // ------------------------------------------------------------------------
    // APIs
    // ------------------------------------------------------------------------

    /// Loads every API with its URL mappings.
    ///
    /// # Errors
    ///
    /// Returns [`LoadError::Read`] when the store fails.
    pub fn all_apis(&self) -> Result<Vec<Api>, LoadError> {
        self.observe("all_apis", None, || {
            Ok(query_with(&self.runner, QueryName::AllApis, &[], aggregate::<Api>)?)
        })
    }

    /// Loads the APIs deployed under `domain`.
    ///
    /// Super tenant APIs are those whose context does not start with `/t`;
    /// tenant APIs live under `/t/{domain}`. Wildcards in `domain` match
    /// literally.
    ///
    /// # Errors
    ///
    /// Returns [`LoadError::Read`] when the store fails.
    pub fn apis_for_tenant(&self, domain: &TenantDomain) -> Result<Vec<Api>, LoadError> {
        self.observe("apis_for_tenant", Some(domain.to_string()), || {
            let (query, pattern) = if self.super_tenant.is_domain(domain) {
                (QueryName::SuperTenantApis, format!("{TENANT_CONTEXT_PREFIX}%"))
            } else {
                let domain = escape_like(domain.as_str());
                (QueryName::TenantApis, format!("{TENANT_CONTEXT_PREFIX}/{domain}%"))
            };
            Ok(query_with(&self.runner, query, &[QueryParam::from(pattern)], aggregate::<Api>)?)
        })
    }

    /// Loads the API published at `context` with `version`.
    ///
    /// # Errors
    ///
    /// Returns [`LoadError::Read`] when the store fails.
    pub fn api(&self, version: &str, context: &str) -> Result<Option<Api>, LoadError> {
        self.observe("api", None, || {
            let params = [QueryParam::from(version), QueryParam::from(context)];
            let apis = query_with(
                &self.runner,
                QueryName::ApiByVersionContext,
                &params,
                aggregate::<Api>,
            )?;
            Ok(apis.into_iter().next())
        })
    }

    // ------------------------------------------------------------------------
    // Subscriptions
    // ------------------------------------------------------------------------

    /// Loads every subscription.
    ///
    /// # Errors
    ///
    /// Returns [`LoadError::Read`] when the store fails.
    pub fn all_subscriptions(&self) -> Result<Vec<Subscription>, LoadError> {
        self.all_rows("all_subscriptions", QueryName::AllSubscriptions)
    }

    /// Loads the subscriptions owned by `domain`.
    ///
    /// # Errors
    ///
    /// Returns [`LoadError`] when the tenant cannot be resolved or the store
    /// fails.
    pub fn subscriptions_for_tenant(
        &self,
        domain: &TenantDomain,
    ) -> Result<Vec<Subscription>, LoadError> {
        self.tenant_rows("subscriptions_for_tenant", QueryName::TenantSubscriptions, domain)
    }

    /// Loads the subscription of `app_id` to `api_id`.
    ///
    /// # Errors
    ///
    /// Returns [`LoadError::Read`] when the store fails.
    pub fn subscription(
        &self,
        api_id: ApiId,
        app_id: ApplicationId,
    ) -> Result<Option<Subscription>, LoadError> {
        self.observe("subscription", None, || {
            let params = [QueryParam::from(api_id.get()), QueryParam::from(app_id.get())];
            Ok(query_with(&self.runner, QueryName::SubscriptionByApiApp, &params, first_row)?)
        })
    }

    // ------------------------------------------------------------------------
    // Applications
    // ------------------------------------------------------------------------

    /// Loads every application with its attributes.
    ///
    /// # Errors
    ///
    /// Returns [`LoadError::Read`] when the store fails.
    pub fn all_applications(&self) -> Result<Vec<Application>, LoadError> {
        self.observe("all_applications", None, || {
            Ok(query_with(
                &self.runner,
                QueryName::AllApplications,
                &[],
                aggregate::<Application>,
            )?)
        })
    }

    /// Loads the applications owned by `domain`.
    ///
    /// # Errors
    ///
    /// Returns [`LoadError`] when the tenant cannot be resolved or the store
    /// fails.
    pub fn applications_for_tenant(
        &self,
        domain: &TenantDomain,
    ) -> Result<Vec<Application>, LoadError> {
        self.observe("applications_for_tenant", Some(domain.to_string()), || {
            let tenant_id = self.resolve_tenant(domain)?;
            Ok(query_with(
                &self.runner,
                QueryName::TenantApplications,
                &[QueryParam::from(tenant_id.get())],
                aggregate::<Application>,
            )?)
        })
    }

    /// Loads one application with its attributes.
    ///
    /// # Errors
    ///
    /// Returns [`LoadError::Read`] when the store fails.
    pub fn application(&self, app_id: ApplicationId) -> Result<Option<Application>, LoadError> {
        self.observe("application", None, || {
            let applications = query_with(
                &self.runner,
                QueryName::ApplicationById,
                &[QueryParam::from(app_id.get())],
                aggregate::<Application>,
            )?;
            Ok(applications.into_iter().next())
        })
    }

    // ------------------------------------------------------------------------
    // Key Mappings
    // ------------------------------------------------------------------------

    /// Loads every application key mapping.
    ///
    /// # Errors
    ///
    /// Returns [`LoadError::Read`] when the store fails.
    pub fn all_key_mappings(&self) -> Result<Vec<ApplicationKeyMapping>, LoadError> {
        self.all_rows("all_key_mappings", QueryName::AllKeyMappings)
    }

    /// Loads the key mappings owned by `domain`.
    ///
    /// # Errors
    ///
    /// Returns [`LoadError`] when the tenant cannot be resolved or the store
    /// fails.
    pub fn key_mappings_for_tenant(
        &self,
        domain: &TenantDomain,
    ) -> Result<Vec<ApplicationKeyMapping>, LoadError> {
        self.tenant_rows("key_mappings_for_tenant", QueryName::TenantKeyMappings, domain)
    }

    /// Loads the key mapping of `app_id` for `key_type`.
    ///
    /// # Errors
    ///
    /// Returns [`LoadError::Read`] when the store fails.
    pub fn key_mapping(
        &self,
        app_id: ApplicationId,
        key_type: &str,
    ) -> Result<Option<ApplicationKeyMapping>, LoadError> {
        self.observe("key_mapping", None, || {
            let params = [QueryParam::from(app_id.get()), QueryParam::from(key_type)];
            Ok(query_with(&self.runner, QueryName::KeyMappingByAppAndType, &params, first_row)?)
        })
    }

    /// Loads the key mapping that issued `consumer_key`.
    ///
    /// # Errors
    ///
    /// Returns [`LoadError::Read`] when the store fails.
    pub fn key_mapping_by_consumer_key(
        &self,
        consumer_key: &str,
    ) -> Result<Option<ApplicationKeyMapping>, LoadError> {
        self.observe("key_mapping_by_consumer_key", None, || {
            Ok(query_with(
                &self.runner,
                QueryName::KeyMappingByConsumerKey,
                &[QueryParam::from(consumer_key)],
                first_row,
            )?)
        })
    }

    // ------------------------------------------------------------------------
    // Policies
    // ------------------------------------------------------------------------

    /// Loads every subscription policy.
    ///
    /// # Errors
    ///
    /// Returns [`LoadError::Read`] when the store fails.
    pub fn all_subscription_policies(&self) -> Result<Vec<SubscriptionPolicy>, LoadError> {
        self.all_rows("all_subscription_policies", QueryName::AllSubscriptionPolicies)
    }

    /// Loads the subscription policies owned by `domain`.
    ///
    /// # Errors
    ///
    /// Returns [`LoadError`] when the tenant cannot be resolved or the store
    /// fails.
    pub fn subscription_policies_for_tenant(
        &self,
        domain: &TenantDomain,
    ) -> Result<Vec<SubscriptionPolicy>, LoadError> {
        self.tenant_rows(
            "subscription_policies_for_tenant",
            QueryName::TenantSubscriptionPolicies,
            domain,
        )
    }

    /// Loads the subscription policy `name` owned by `domain`.
    ///
    /// Returns `Ok(None)` without querying when either input is blank.
    ///
    /// # Errors
    ///
    /// Returns [`LoadError`] when the tenant cannot be resolved or the store
    /// fails.
    pub fn subscription_policy(
        &self,
        name: &str,
        domain: &TenantDomain,
    ) -> Result<Option<SubscriptionPolicy>, LoadError> {
        self.policy_by_name(
            "subscription_policy",
            QueryName::SubscriptionPolicyByName,
            name,
            domain,
        )
    }

    /// Loads every application policy.
    ///
    /// # Errors
    ///
    /// Returns [`LoadError::Read`] when the store fails.
    pub fn all_application_policies(&self) -> Result<Vec<ApplicationPolicy>, LoadError> {
        self.all_rows("all_application_policies", QueryName::AllApplicationPolicies)
    }

    /// Loads the application policies owned by `domain`.
    ///
    /// # Errors
    ///
    /// Returns [`LoadError`] when the tenant cannot be resolved or the store
    /// fails.
    pub fn application_policies_for_tenant(
        &self,
        domain: &TenantDomain,
    ) -> Result<Vec<ApplicationPolicy>, LoadError> {
        self.tenant_rows(
            "application_policies_for_tenant",
            QueryName::TenantApplicationPolicies,
            domain,
        )
    }

    /// Loads the application policy `name` owned by `domain`.
    ///
    /// Returns `Ok(None)` without querying when either input is blank.
    ///
    /// # Errors
    ///
    /// Returns [`LoadError`] when the tenant cannot be resolved or the store
    /// fails.
    pub fn application_policy(
        &self,
        name: &str,
        domain: &TenantDomain,
    ) -> Result<Option<ApplicationPolicy>, LoadError> {
        self.policy_by_name("application_policy", QueryName::ApplicationPolicyByName, name, domain)
    }

    /// Loads every API throttle policy.
    ///
    /// # Errors
    ///
    /// Returns [`LoadError::Read`] when the store fails.
    pub fn all_api_policies(&self) -> Result<Vec<ApiPolicy>, LoadError> {
        self.all_rows("all_api_policies", QueryName::AllApiPolicies)
    }

    /// Loads the API throttle policies owned by `domain`.
    ///
    /// # Errors
    ///
    /// Returns [`LoadError`] when the tenant cannot be resolved or the store
    /// fails.
    pub fn api_policies_for_tenant(
        &self,
        domain: &TenantDomain,
    ) -> Result<Vec<ApiPolicy>, LoadError> {
        self.tenant_rows("api_policies_for_tenant", QueryName::TenantApiPolicies, domain)
    }

    /// Loads the API throttle policy `name` owned by `domain`.
    ///
    /// Returns `Ok(None)` without querying when either input is blank.
    ///
    /// # Errors
    ///
    /// Returns [`LoadError`] when the tenant cannot be resolved or the store
    /// fails.
    pub fn api_policy(
        &self,
        name: &str,
        domain: &TenantDomain,
    ) -> Result<Option<ApiPolicy>, LoadError> {
        self.policy_by_name("api_policy", QueryName::ApiPolicyByName, name, domain)
    }

    // ------------------------------------------------------------------------
    // URL Mappings
    // ------------------------------------------------------------------------

    /// Loads every URL mapping.
    ///
    /// # Errors
    ///
    /// Returns [`LoadError::Read`] when the store fails.
    pub fn all_url_mappings(&self) -> Result<Vec<UrlMapping>, LoadError> {
        self.all_rows("all_url_mappings", QueryName::AllUrlMappings)
    }

    /// Loads the URL mappings of APIs owned by `tenant_id`.
    ///
    /// The super tenant gets mappings whose context has no `/t/` segment; a
    /// positive id gets mappings whose context contains its domain; any
    /// other id gets every mapping.
    ///
    /// # Errors
    ///
    /// Returns [`LoadError`] when the tenant domain cannot be resolved or the
    /// store fails.
    pub fn url_mappings_for_tenant(
        &self,
        tenant_id: TenantId,
    ) -> Result<Vec<UrlMapping>, LoadError> {
        self.observe("url_mappings_for_tenant", Some(tenant_id.to_string()), || {
            self.load_url_mappings(tenant_id)
        })
    }

    /// Loads the URL mappings of APIs owned by the tenant named `domain`.
    ///
    /// Resolves `domain` to its id first, then filters like
    /// [`Self::url_mappings_for_tenant`].
    ///
    /// # Errors
    ///
    /// Returns [`LoadError`] when the tenant cannot be resolved or the store
    /// fails.
    pub fn url_mappings_for_domain(
        &self,
        domain: &TenantDomain,
    ) -> Result<Vec<UrlMapping>, LoadError> {
        self.observe("url_mappings_for_domain", Some(domain.to_string()), || {
            let tenant_id = self.resolve_tenant(domain)?;
            self.load_url_mappings(tenant_id)
        })
    }

    // ------------------------------------------------------------------------
    // Helpers
    // ------------------------------------------------------------------------

    /// Runs `load`, records its outcome, and returns it unchanged.
    fn observe<T: EntityCount>(
        &self,
        operation: &'static str,
        tenant: Option<String>,
        load: impl FnOnce() -> Result<T, LoadError>,
    ) -> Result<T, LoadError> {
        let result = load();
        let event = match &result {
            Ok(value) => LoadAuditEvent::success(operation, tenant, value.entity_count()),
            Err(err) => LoadAuditEvent::failure(operation, tenant, err.kind(), err.to_string()),
        };
        self.audit.record(&event);
        result
    }

    /// Resolves `domain` to its tenant id.
    fn resolve_tenant(&self, domain: &TenantDomain) -> Result<TenantId, LoadError> {
        self.tenants.tenant_id(domain).map_err(|source| LoadError::TenantResolution {
            tenant: domain.to_string(),
            source,
        })
    }

    /// Runs the URL mapping query selected by `tenant_id`.
    fn load_url_mappings(&self, tenant_id: TenantId) -> Result<Vec<UrlMapping>, LoadError> {
        let (query, params) = if self.super_tenant.is_id(tenant_id) {
            (
                QueryName::SuperTenantUrlMappings,
                vec![QueryParam::from(format!("%{TENANT_CONTEXT_PREFIX}/%"))],
            )
        } else if tenant_id.get() > 0 {
            let domain = self.tenants.tenant_domain(tenant_id).map_err(|source| {
                LoadError::TenantResolution {
                    tenant: tenant_id.to_string(),
                    source,
                }
            })?;
            let pattern = format!("%{}%", escape_like(domain.as_str()));
            (QueryName::TenantUrlMappings, vec![QueryParam::from(pattern)])
        } else {
            (QueryName::AllUrlMappings, Vec::new())
        };
        Ok(query_with(&self.runner, query, &params, collect_rows)?)
    }

    /// Loads every row of an unparameterized standalone query.
    fn all_rows<T: FromRow>(
        &self,
        operation: &'static str,
        query: QueryName,
    ) -> Result<Vec<T>, LoadError> {
        self.observe(operation, None, || Ok(query_with(&self.runner, query, &[], collect_rows)?))
    }

    /// Loads every row of a standalone query scoped to `domain`'s tenant id.
    fn tenant_rows<T: FromRow>(
        &self,
        operation: &'static str,
        query: QueryName,
        domain: &TenantDomain,
    ) -> Result<Vec<T>, LoadError> {
        self.observe(operation, Some(domain.to_string()), || {
            let tenant_id = self.resolve_tenant(domain)?;
            Ok(query_with(&self.runner, query, &[QueryParam::from(tenant_id.get())], collect_rows)?)
        })
    }

    /// Loads a policy by name within `domain`'s tenant.
    fn policy_by_name<T: FromRow>(
        &self,
        operation: &'static str,
        query: QueryName,
        name: &str,
        domain: &TenantDomain,
    ) -> Result<Option<T>, LoadError> {
        self.observe(operation, Some(domain.to_string()), || {
            if name.trim().is_empty() || domain.is_blank() {
                return Ok(None);
            }
            let tenant_id = self.resolve_tenant(domain)?;
            let params = [QueryParam::from(name), QueryParam::from(tenant_id.get())];
            Ok(query_with(&self.runner, query, &params, first_row)?)
        })
    }
}
