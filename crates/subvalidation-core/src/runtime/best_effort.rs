// crates/subvalidation-core/src/runtime/best_effort.rs
// ============================================================================
// Module: Best-Effort Loader
// Description: Cache bulk-load facade that degrades failures to empty data.
// Purpose: Keep cache population running when one entity kind fails to load.
// Dependencies: crate::runtime::reader
// ============================================================================

//! ## Overview
//! [`BestEffortLoader`] mirrors every [`SubscriptionValidationReader`]
//! operation but returns an empty list or `None` when the read fails. The
//! reader has already recorded the failure in its audit sink, so nothing is
//! lost silently. Callers that must tell "no data" from "read failed" use
//! the reader directly.

// ============================================================================
// SECTION: Imports
// ============================================================================

use crate::core::identifiers::ApiId;
use crate::core::identifiers::ApplicationId;
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
use crate::interfaces::QueryRunner;
use crate::runtime::reader::SubscriptionValidationReader;

// ============================================================================
// SECTION: Loader
// ============================================================================

/// Failure-tolerant wrapper around [`SubscriptionValidationReader`].
pub struct BestEffortLoader<R> {
    /// Strict reader doing the work.
    reader: SubscriptionValidationReader<R>,
}

impl<R: QueryRunner> BestEffortLoader<R> {
    /// Wraps `reader`.
    #[must_use]
    pub const fn new(reader: SubscriptionValidationReader<R>) -> Self {
        Self {
            reader,
        }
    }

    /// Returns the wrapped reader.
    #[must_use]
    pub const fn reader(&self) -> &SubscriptionValidationReader<R> {
        &self.reader
    }

    /// Every API, or empty on failure.
    #[must_use]
    pub fn all_apis(&self) -> Vec<Api> {
        self.reader.all_apis().unwrap_or_default()
    }

    /// APIs of `domain`, or empty on failure.
    #[must_use]
    pub fn apis_for_tenant(&self, domain: &TenantDomain) -> Vec<Api> {
        self.reader.apis_for_tenant(domain).unwrap_or_default()
    }

    /// API by version and context, or `None` on failure.
    #[must_use]
    pub fn api(&self, version: &str, context: &str) -> Option<Api> {
        self.reader.api(version, context).unwrap_or_default()
    }

    /// Every subscription, or empty on failure.
    #[must_use]
    pub fn all_subscriptions(&self) -> Vec<Subscription> {
        self.reader.all_subscriptions().unwrap_or_default()
    }

    /// Subscriptions of `domain`, or empty on failure.
    #[must_use]
    pub fn subscriptions_for_tenant(&self, domain: &TenantDomain) -> Vec<Subscription> {
        self.reader.subscriptions_for_tenant(domain).unwrap_or_default()
    }

    /// Subscription of `app_id` to `api_id`, or `None` on failure.
    #[must_use]
    pub fn subscription(&self, api_id: ApiId, app_id: ApplicationId) -> Option<Subscription> {
        self.reader.subscription(api_id, app_id).unwrap_or_default()
    }

    /// Every application, or empty on failure.
    #[must_use]
    pub fn all_applications(&self) -> Vec<Application> {
        self.reader.all_applications().unwrap_or_default()
    }

    /// Applications of `domain`, or empty on failure.
    #[must_use]
    pub fn applications_for_tenant(&self, domain: &TenantDomain) -> Vec<Application> {
        self.reader.applications_for_tenant(domain).unwrap_or_default()
    }

    /// Application by id, or `None` on failure.
    #[must_use]
    pub fn application(&self, app_id: ApplicationId) -> Option<Application> {
        self.reader.application(app_id).unwrap_or_default()
    }

    /// Every key mapping, or empty on failure.
    #[must_use]
    pub fn all_key_mappings(&self) -> Vec<ApplicationKeyMapping> {
        self.reader.all_key_mappings().unwrap_or_default()
    }

    /// Key mappings of `domain`, or empty on failure.
    #[must_use]
    pub fn key_mappings_for_tenant(&self, domain: &TenantDomain) -> Vec<ApplicationKeyMapping> {
        self.reader.key_mappings_for_tenant(domain).unwrap_or_default()
    }

    /// Key mapping by application and key type, or `None` on failure.
    #[must_use]
    pub fn key_mapping(
        &self,
        app_id: ApplicationId,
        key_type: &str,
    ) -> Option<ApplicationKeyMapping> {
        self.reader.key_mapping(app_id, key_type).unwrap_or_default()
    }

    /// Key mapping by consumer key, or `None` on failure.
    #[must_use]
    pub fn key_mapping_by_consumer_key(&self, consumer_key: &str) -> Option<ApplicationKeyMapping> {
        self.reader.key_mapping_by_consumer_key(consumer_key).unwrap_or_default()
    }

    /// Every subscription policy, or empty on failure.
    #[must_use]
    pub fn all_subscription_policies(&self) -> Vec<SubscriptionPolicy> {
        self.reader.all_subscription_policies().unwrap_or_default()
    }

    /// Subscription policies of `domain`, or empty on failure.
    #[must_use]
    pub fn subscription_policies_for_tenant(
        &self,
        domain: &TenantDomain,
    ) -> Vec<SubscriptionPolicy> {
        self.reader.subscription_policies_for_tenant(domain).unwrap_or_default()
    }

    /// Subscription policy by name, or `None` on failure.
    #[must_use]
    pub fn subscription_policy(
        &self,
        name: &str,
        domain: &TenantDomain,
    ) -> Option<SubscriptionPolicy> {
        self.reader.subscription_policy(name, domain).unwrap_or_default()
    }

    /// Every application policy, or empty on failure.
    #[must_use]
    pub fn all_application_policies(&self) -> Vec<ApplicationPolicy> {
        self.reader.all_application_policies().unwrap_or_default()
    }

    /// Application policies of `domain`, or empty on failure.
    #[must_use]
    pub fn application_policies_for_tenant(&self, domain: &TenantDomain) -> Vec<ApplicationPolicy> {
        self.reader.application_policies_for_tenant(domain).unwrap_or_default()
    }

    /// Application policy by name, or `None` on failure.
    #[must_use]
    pub fn application_policy(
        &self,
        name: &str,
        domain: &TenantDomain,
    ) -> Option<ApplicationPolicy> {
        self.reader.application_policy(name, domain).unwrap_or_default()
    }

    /// Every API throttle policy, or empty on failure.
    #[must_use]
    pub fn all_api_policies(&self) -> Vec<ApiPolicy> {
        self.reader.all_api_policies().unwrap_or_default()
    }

    /// API throttle policies of `domain`, or empty on failure.
    #[must_use]
    pub fn api_policies_for_tenant(&self, domain: &TenantDomain) -> Vec<ApiPolicy> {
        self.reader.api_policies_for_tenant(domain).unwrap_or_default()
    }

    /// API throttle policy by name, or `None` on failure.
    #[must_use]
    pub fn api_policy(&self, name: &str, domain: &TenantDomain) -> Option<ApiPolicy> {
        self.reader.api_policy(name, domain).unwrap_or_default()
    }

    /// Every URL mapping, or empty on failure.
    #[must_use]
    pub fn all_url_mappings(&self) -> Vec<UrlMapping> {
        self.reader.all_url_mappings().unwrap_or_default()
    }

    /// URL mappings of `tenant_id`, or empty on failure.
    #[must_use]
    pub fn url_mappings_for_tenant(&self, tenant_id: TenantId) -> Vec<UrlMapping> {
        self.reader.url_mappings_for_tenant(tenant_id).unwrap_or_default()
    }

    /// URL mappings of the tenant named `domain`, or empty on failure.
    #[must_use]
    pub fn url_mappings_for_domain(&self, domain: &TenantDomain) -> Vec<UrlMapping> {
        self.reader.url_mappings_for_domain(domain).unwrap_or_default()
    }
}
