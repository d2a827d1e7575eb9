// crates/subvalidation-store-sqlite/src/catalog.rs
// ============================================================================
// Module: SQLite Query Catalog
// Description: Fixed SQL text for every validation read query.
// Purpose: Map query names to parameterized SQL over the API manager tables.
// Dependencies: subvalidation-core
// ============================================================================

//! ## Overview
//! Every query aliases its columns to the names the entity row mappings
//! read, so the same mapping code serves every variant of a query. Parent
//! queries order by parent id and then by child id so that rows for one
//! parent arrive together and children arrive in insertion order.
//!
//! Parameters are positional (`?1`, `?2`) and always bound, never spliced.

// ============================================================================
// SECTION: Imports
// ============================================================================

use subvalidation_core::QueryCatalog;
use subvalidation_core::QueryName;

// ============================================================================
// SECTION: Reference Schema
// ============================================================================

/// Tables and columns the catalog reads, as `SQLite` DDL.
///
/// Deployments own their schema; this is the minimum shape the queries
/// require and is what the test fixtures create.
pub const REFERENCE_SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS AM_SUBSCRIBER (
    SUBSCRIBER_ID INTEGER PRIMARY KEY,
    USER_ID TEXT NOT NULL,
    TENANT_ID INTEGER NOT NULL
);
CREATE TABLE IF NOT EXISTS AM_APPLICATION (
    APPLICATION_ID INTEGER PRIMARY KEY,
    NAME TEXT NOT NULL,
    SUBSCRIBER_ID INTEGER NOT NULL REFERENCES AM_SUBSCRIBER (SUBSCRIBER_ID),
    APPLICATION_TIER TEXT NOT NULL,
    TOKEN_TYPE TEXT
);
CREATE TABLE IF NOT EXISTS AM_APPLICATION_ATTRIBUTES (
    APPLICATION_ID INTEGER NOT NULL REFERENCES AM_APPLICATION (APPLICATION_ID),
    NAME TEXT NOT NULL,
    VALUE TEXT,
    TENANT_ID INTEGER NOT NULL,
    PRIMARY KEY (APPLICATION_ID, NAME)
);
CREATE TABLE IF NOT EXISTS AM_API (
    API_ID INTEGER PRIMARY KEY,
    API_PROVIDER TEXT NOT NULL,
    API_NAME TEXT NOT NULL,
    API_VERSION TEXT NOT NULL,
    CONTEXT TEXT NOT NULL,
    API_TIER TEXT
);
CREATE TABLE IF NOT EXISTS AM_API_URL_MAPPING (
    URL_MAPPING_ID INTEGER PRIMARY KEY,
    API_ID INTEGER NOT NULL REFERENCES AM_API (API_ID),
    HTTP_METHOD TEXT NOT NULL,
    AUTH_SCHEME TEXT,
    URL_PATTERN TEXT,
    THROTTLING_TIER TEXT
);
CREATE TABLE IF NOT EXISTS AM_SUBSCRIPTION (
    SUBSCRIPTION_ID INTEGER PRIMARY KEY,
    TIER_ID TEXT NOT NULL,
    API_ID INTEGER NOT NULL REFERENCES AM_API (API_ID),
    APPLICATION_ID INTEGER NOT NULL REFERENCES AM_APPLICATION (APPLICATION_ID),
    SUB_STATUS TEXT NOT NULL
);
CREATE TABLE IF NOT EXISTS AM_APPLICATION_KEY_MAPPING (
    APPLICATION_ID INTEGER NOT NULL REFERENCES AM_APPLICATION (APPLICATION_ID),
    CONSUMER_KEY TEXT NOT NULL UNIQUE,
    KEY_TYPE TEXT NOT NULL,
    PRIMARY KEY (APPLICATION_ID, KEY_TYPE)
);
CREATE TABLE IF NOT EXISTS AM_POLICY_SUBSCRIPTION (
    POLICY_ID INTEGER PRIMARY KEY,
    NAME TEXT NOT NULL,
    QUOTA_TYPE TEXT NOT NULL,
    TENANT_ID INTEGER NOT NULL,
    RATE_LIMIT_COUNT INTEGER NOT NULL DEFAULT 0,
    RATE_LIMIT_TIME_UNIT TEXT,
    STOP_ON_QUOTA_REACH INTEGER NOT NULL DEFAULT 0,
    UNIQUE (NAME, TENANT_ID)
);
CREATE TABLE IF NOT EXISTS AM_POLICY_APPLICATION (
    POLICY_ID INTEGER PRIMARY KEY,
    NAME TEXT NOT NULL,
    QUOTA_TYPE TEXT NOT NULL,
    TENANT_ID INTEGER NOT NULL,
    UNIQUE (NAME, TENANT_ID)
);
CREATE TABLE IF NOT EXISTS AM_API_THROTTLE_POLICY (
    POLICY_ID INTEGER PRIMARY KEY,
    NAME TEXT NOT NULL,
    DEFAULT_QUOTA_TYPE TEXT NOT NULL,
    TENANT_ID INTEGER NOT NULL,
    UNIQUE (NAME, TENANT_ID)
);
";

// ============================================================================
// SECTION: Query Fragments
// ============================================================================

/// API columns joined with their URL mappings.
macro_rules! api_select {
    () => {
        "SELECT API.API_ID AS API_ID, API.API_PROVIDER AS API_PROVIDER, \
         API.API_NAME AS API_NAME, API.API_TIER AS API_TIER, \
         API.API_VERSION AS API_VERSION, API.CONTEXT AS CONTEXT, \
         URL.HTTP_METHOD AS HTTP_METHOD, URL.AUTH_SCHEME AS AUTH_SCHEME, \
         URL.THROTTLING_TIER AS THROTTLING_TIER, URL.URL_PATTERN AS URL_PATTERN \
         FROM AM_API API \
         LEFT JOIN AM_API_URL_MAPPING URL ON URL.API_ID = API.API_ID"
    };
}

/// Ordering shared by every API query.
macro_rules! api_order {
    () => {
        " ORDER BY API.API_ID, URL.URL_MAPPING_ID"
    };
}

/// Application columns joined with subscriber and attributes.
macro_rules! application_select {
    () => {
        "SELECT APP.APPLICATION_ID AS APP_ID, APP.APPLICATION_TIER AS TIER, \
         SUB.USER_ID AS SUB_NAME, APP.TOKEN_TYPE AS TOKEN_TYPE, \
         ATTR.NAME AS ATTRIBUTE_NAME, ATTR.VALUE AS ATTRIBUTE_VALUE \
         FROM AM_APPLICATION APP \
         JOIN AM_SUBSCRIBER SUB ON SUB.SUBSCRIBER_ID = APP.SUBSCRIBER_ID \
         LEFT JOIN AM_APPLICATION_ATTRIBUTES ATTR ON ATTR.APPLICATION_ID = APP.APPLICATION_ID"
    };
}

/// Ordering shared by every application query.
macro_rules! application_order {
    () => {
        " ORDER BY APP.APPLICATION_ID, ATTR.NAME"
    };
}

/// Subscription columns.
macro_rules! subscription_select {
    () => {
        "SELECT SUBS.SUBSCRIPTION_ID AS SUB_ID, SUBS.TIER_ID AS TIER, \
         SUBS.API_ID AS API_ID, SUBS.APPLICATION_ID AS APP_ID, SUBS.SUB_STATUS AS STATUS \
         FROM AM_SUBSCRIPTION SUBS"
    };
}

/// Key mapping columns.
macro_rules! key_mapping_select {
    () => {
        "SELECT KM.APPLICATION_ID AS APPLICATION_ID, KM.CONSUMER_KEY AS CONSUMER_KEY, \
         KM.KEY_TYPE AS KEY_TYPE \
         FROM AM_APPLICATION_KEY_MAPPING KM"
    };
}

/// Subscription policy columns.
macro_rules! subscription_policy_select {
    () => {
        "SELECT POLICY_ID, NAME, QUOTA_TYPE, TENANT_ID, RATE_LIMIT_COUNT, \
         RATE_LIMIT_TIME_UNIT, STOP_ON_QUOTA_REACH \
         FROM AM_POLICY_SUBSCRIPTION"
    };
}

/// Application policy columns.
macro_rules! application_policy_select {
    () => {
        "SELECT POLICY_ID, NAME, QUOTA_TYPE, TENANT_ID FROM AM_POLICY_APPLICATION"
    };
}

/// API throttle policy columns.
macro_rules! api_policy_select {
    () => {
        "SELECT POLICY_ID, NAME, DEFAULT_QUOTA_TYPE AS QUOTA_TYPE, TENANT_ID \
         FROM AM_API_THROTTLE_POLICY"
    };
}

/// URL mapping columns joined with their API.
macro_rules! url_mapping_select {
    () => {
        "SELECT URL.HTTP_METHOD AS HTTP_METHOD, URL.AUTH_SCHEME AS AUTH_SCHEME, \
         URL.THROTTLING_TIER AS THROTTLING_TIER, URL.URL_PATTERN AS URL_PATTERN \
         FROM AM_API_URL_MAPPING URL \
         JOIN AM_API API ON API.API_ID = URL.API_ID"
    };
}

// ============================================================================
// SECTION: Catalog
// ============================================================================

/// Every API with its URL mappings.
const ALL_APIS: &str = concat!(api_select!(), api_order!());
/// Super tenant APIs.
const SUPER_TENANT_APIS: &str =
    concat!(api_select!(), " WHERE API.CONTEXT NOT LIKE ?1", api_order!());
/// Tenant APIs. The bound pattern escapes LIKE wildcards with `\`.
const TENANT_APIS: &str =
    concat!(api_select!(), " WHERE API.CONTEXT LIKE ?1 ESCAPE '\\'", api_order!());
/// One API by version and context.
const API_BY_VERSION_CONTEXT: &str =
    concat!(api_select!(), " WHERE API.API_VERSION = ?1 AND API.CONTEXT = ?2", api_order!());
/// Every subscription.
const ALL_SUBSCRIPTIONS: &str = concat!(subscription_select!(), " ORDER BY SUBS.SUBSCRIPTION_ID");
/// Tenant subscriptions.
const TENANT_SUBSCRIPTIONS: &str = concat!(
    subscription_select!(),
    " JOIN AM_APPLICATION APP ON APP.APPLICATION_ID = SUBS.APPLICATION_ID \
     JOIN AM_SUBSCRIBER SUB ON SUB.SUBSCRIBER_ID = APP.SUBSCRIBER_ID \
     WHERE SUB.TENANT_ID = ?1 ORDER BY SUBS.SUBSCRIPTION_ID"
);
/// One subscription by API and application.
const SUBSCRIPTION_BY_API_APP: &str =
    concat!(subscription_select!(), " WHERE SUBS.API_ID = ?1 AND SUBS.APPLICATION_ID = ?2");
/// Every application with its attributes.
const ALL_APPLICATIONS: &str = concat!(application_select!(), application_order!());
/// Tenant applications.
const TENANT_APPLICATIONS: &str =
    concat!(application_select!(), " WHERE SUB.TENANT_ID = ?1", application_order!());
/// One application by id.
const APPLICATION_BY_ID: &str =
    concat!(application_select!(), " WHERE APP.APPLICATION_ID = ?1", application_order!());
/// Every key mapping.
const ALL_KEY_MAPPINGS: &str =
    concat!(key_mapping_select!(), " ORDER BY KM.APPLICATION_ID, KM.KEY_TYPE");
/// Tenant key mappings.
const TENANT_KEY_MAPPINGS: &str = concat!(
    key_mapping_select!(),
    " JOIN AM_APPLICATION APP ON APP.APPLICATION_ID = KM.APPLICATION_ID \
     JOIN AM_SUBSCRIBER SUB ON SUB.SUBSCRIBER_ID = APP.SUBSCRIBER_ID \
     WHERE SUB.TENANT_ID = ?1 ORDER BY KM.APPLICATION_ID, KM.KEY_TYPE"
);
/// One key mapping by application and key type.
const KEY_MAPPING_BY_APP_AND_TYPE: &str =
    concat!(key_mapping_select!(), " WHERE KM.APPLICATION_ID = ?1 AND KM.KEY_TYPE = ?2");
/// One key mapping by consumer key.
const KEY_MAPPING_BY_CONSUMER_KEY: &str =
    concat!(key_mapping_select!(), " WHERE KM.CONSUMER_KEY = ?1");
/// Every subscription policy.
const ALL_SUBSCRIPTION_POLICIES: &str =
    concat!(subscription_policy_select!(), " ORDER BY POLICY_ID");
/// Tenant subscription policies.
const TENANT_SUBSCRIPTION_POLICIES: &str =
    concat!(subscription_policy_select!(), " WHERE TENANT_ID = ?1 ORDER BY POLICY_ID");
/// One subscription policy by name.
const SUBSCRIPTION_POLICY_BY_NAME: &str =
    concat!(subscription_policy_select!(), " WHERE NAME = ?1 AND TENANT_ID = ?2");
/// Every application policy.
const ALL_APPLICATION_POLICIES: &str = concat!(application_policy_select!(), " ORDER BY POLICY_ID");
/// Tenant application policies.
const TENANT_APPLICATION_POLICIES: &str =
    concat!(application_policy_select!(), " WHERE TENANT_ID = ?1 ORDER BY POLICY_ID");
/// One application policy by name.
const APPLICATION_POLICY_BY_NAME: &str =
    concat!(application_policy_select!(), " WHERE NAME = ?1 AND TENANT_ID = ?2");
/// Every API throttle policy.
const ALL_API_POLICIES: &str = concat!(api_policy_select!(), " ORDER BY POLICY_ID");
/// Tenant API throttle policies.
const TENANT_API_POLICIES: &str =
    concat!(api_policy_select!(), " WHERE TENANT_ID = ?1 ORDER BY POLICY_ID");
/// One API throttle policy by name.
const API_POLICY_BY_NAME: &str =
    concat!(api_policy_select!(), " WHERE NAME = ?1 AND TENANT_ID = ?2");
/// Every URL mapping.
const ALL_URL_MAPPINGS: &str = concat!(url_mapping_select!(), " ORDER BY URL.URL_MAPPING_ID");
/// Super tenant URL mappings.
const SUPER_TENANT_URL_MAPPINGS: &str = concat!(
    url_mapping_select!(),
    " WHERE API.CONTEXT NOT LIKE ?1 ORDER BY URL.URL_MAPPING_ID"
);
/// Tenant URL mappings. The bound pattern escapes LIKE wildcards with `\`.
const TENANT_URL_MAPPINGS: &str = concat!(
    url_mapping_select!(),
    " WHERE API.CONTEXT LIKE ?1 ESCAPE '\\' ORDER BY URL.URL_MAPPING_ID"
);

/// Query catalog over the reference schema.
#[derive(Debug, Clone, Copy, Default)]
pub struct SqliteQueryCatalog;

impl QueryCatalog for SqliteQueryCatalog {
    fn sql(&self, query: QueryName) -> &str {
        match query {
            QueryName::AllApis => ALL_APIS,
            QueryName::SuperTenantApis => SUPER_TENANT_APIS,
            QueryName::TenantApis => TENANT_APIS,
            QueryName::ApiByVersionContext => API_BY_VERSION_CONTEXT,
            QueryName::AllSubscriptions => ALL_SUBSCRIPTIONS,
            QueryName::TenantSubscriptions => TENANT_SUBSCRIPTIONS,
            QueryName::SubscriptionByApiApp => SUBSCRIPTION_BY_API_APP,
            QueryName::AllApplications => ALL_APPLICATIONS,
            QueryName::TenantApplications => TENANT_APPLICATIONS,
            QueryName::ApplicationById => APPLICATION_BY_ID,
            QueryName::AllKeyMappings => ALL_KEY_MAPPINGS,
            QueryName::TenantKeyMappings => TENANT_KEY_MAPPINGS,
            QueryName::KeyMappingByAppAndType => KEY_MAPPING_BY_APP_AND_TYPE,
            QueryName::KeyMappingByConsumerKey => KEY_MAPPING_BY_CONSUMER_KEY,
            QueryName::AllSubscriptionPolicies => ALL_SUBSCRIPTION_POLICIES,
            QueryName::TenantSubscriptionPolicies => TENANT_SUBSCRIPTION_POLICIES,
            QueryName::SubscriptionPolicyByName => SUBSCRIPTION_POLICY_BY_NAME,
            QueryName::AllApplicationPolicies => ALL_APPLICATION_POLICIES,
            QueryName::TenantApplicationPolicies => TENANT_APPLICATION_POLICIES,
            QueryName::ApplicationPolicyByName => APPLICATION_POLICY_BY_NAME,
            QueryName::AllApiPolicies => ALL_API_POLICIES,
            QueryName::TenantApiPolicies => TENANT_API_POLICIES,
            QueryName::ApiPolicyByName => API_POLICY_BY_NAME,
            QueryName::AllUrlMappings => ALL_URL_MAPPINGS,
            QueryName::SuperTenantUrlMappings => SUPER_TENANT_URL_MAPPINGS,
            QueryName::TenantUrlMappings => TENANT_URL_MAPPINGS,
        }
    }
}
