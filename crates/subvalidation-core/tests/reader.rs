//! Reader operation tests for subscription validation core.
// crates/subvalidation-core/tests/reader.rs
// ============================================================================
// Module: Subscription Validation Reader Tests
// Description: Query selection, parameter binding, errors, and audit events.
// Purpose: Verify the strict reader against an in-memory query runner.
// ============================================================================

#![allow(
    clippy::panic,
    clippy::print_stdout,
    clippy::print_stderr,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::use_debug,
    clippy::dbg_macro,
    clippy::panic_in_result_fn,
    clippy::unwrap_in_result,
    reason = "Test-only assertions and helpers are permitted."
)]

use std::sync::Arc;

use subvalidation_core::ApiId;
use subvalidation_core::ApplicationId;
use subvalidation_core::LoadError;
use subvalidation_core::LoadOutcome;
use subvalidation_core::MemoryLoadAuditSink;
use subvalidation_core::MemoryQueryRunner;
use subvalidation_core::MemoryRow;
use subvalidation_core::QueryName;
use subvalidation_core::QueryParam;
use subvalidation_core::ReadError;
use subvalidation_core::StaticTenantResolver;
use subvalidation_core::SubscriptionValidationReader;
use subvalidation_core::SuperTenant;
use subvalidation_core::TenantDomain;
use subvalidation_core::TenantId;
use subvalidation_core::TenantResolutionError;

// ============================================================================
// SECTION: Helpers
// ============================================================================

fn reader(
    runner: MemoryQueryRunner,
) -> (SubscriptionValidationReader<MemoryQueryRunner>, Arc<MemoryLoadAuditSink>) {
    let tenants = StaticTenantResolver::new(&SuperTenant::default())
        .with_tenant("wso2.com", TenantId::new(1))
        .with_tenant("acme.io", TenantId::new(2));
    let audit = Arc::new(MemoryLoadAuditSink::new());
    let reader = SubscriptionValidationReader::new(runner, Arc::new(tenants))
        .with_audit_sink(audit.clone());
    (reader, audit)
}

fn api_row(id: i32, method: &str) -> MemoryRow {
    MemoryRow::new()
        .with("API_ID", id)
        .with("API_PROVIDER", "admin")
        .with("API_NAME", "pizza")
        .with("API_TIER", Option::<&str>::None)
        .with("API_VERSION", "1.0.0")
        .with("CONTEXT", "/pizza/1.0.0")
        .with("HTTP_METHOD", method)
        .with("AUTH_SCHEME", "Any")
        .with("THROTTLING_TIER", "Unlimited")
        .with("URL_PATTERN", "/menu")
}

fn policy_row(id: i32, name: &str, tenant: i32) -> MemoryRow {
    MemoryRow::new()
        .with("POLICY_ID", id)
        .with("NAME", name)
        .with("QUOTA_TYPE", "requestCount")
        .with("TENANT_ID", tenant)
        .with("RATE_LIMIT_COUNT", 10)
        .with("RATE_LIMIT_TIME_UNIT", "min")
        .with("STOP_ON_QUOTA_REACH", 1)
}

fn key_row(app: i32, key: &str) -> MemoryRow {
    MemoryRow::new()
        .with("APPLICATION_ID", app)
        .with("CONSUMER_KEY", key)
        .with("KEY_TYPE", "PRODUCTION")
}

fn text(value: &str) -> QueryParam {
    QueryParam::Text(value.to_string())
}

// ============================================================================
// SECTION: APIs
// ============================================================================

#[test]
fn reader_all_apis_aggregates_resources() {
    let runner = MemoryQueryRunner::new().with_rows(
        QueryName::AllApis,
        vec![api_row(1, "GET"), api_row(1, "POST"), api_row(2, "GET")],
    );
    let (reader, audit) = reader(runner);
    let apis = reader.all_apis().unwrap();
    assert_eq!(apis.len(), 2);
    assert_eq!(apis[0].resources.len(), 2);
    assert_eq!(apis[1].resources.len(), 1);

    let events = audit.events();
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].operation, "all_apis");
    assert_eq!(events[0].outcome, LoadOutcome::Success);
    assert_eq!(events[0].entity_count, Some(2));
}

#[test]
fn reader_super_tenant_apis_exclude_tenant_contexts() {
    let (reader, _) = reader(MemoryQueryRunner::new());
    reader.apis_for_tenant(&TenantDomain::new("Carbon.Super")).unwrap();
    let calls = reader.runner().calls();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].query, QueryName::SuperTenantApis);
    assert_eq!(calls[0].params, vec![text("/t%")]);
}

#[test]
fn reader_tenant_apis_match_tenant_context_prefix() {
    let (reader, _) = reader(MemoryQueryRunner::new());
    reader.apis_for_tenant(&TenantDomain::new("wso2.com")).unwrap();
    let calls = reader.runner().calls();
    assert_eq!(calls[0].query, QueryName::TenantApis);
    assert_eq!(calls[0].params, vec![text("/t/wso2.com%")]);
}

#[test]
fn reader_tenant_apis_escape_like_wildcards() {
    let (reader, _) = reader(MemoryQueryRunner::new());
    reader.apis_for_tenant(&TenantDomain::new("%")).unwrap();
    reader.apis_for_tenant(&TenantDomain::new("wso2_com")).unwrap();
    reader.apis_for_tenant(&TenantDomain::new("a\\b")).unwrap();
    let params: Vec<QueryParam> =
        reader.runner().calls().into_iter().flat_map(|call| call.params).collect();
    assert_eq!(params, vec![text("/t/\\%%"), text("/t/wso2\\_com%"), text("/t/a\\\\b%")]);
}

#[test]
fn reader_api_lookup_returns_single_aggregated_api() {
    let runner = MemoryQueryRunner::new()
        .with_rows(QueryName::ApiByVersionContext, vec![api_row(4, "GET"), api_row(4, "PUT")]);
    let (reader, _) = reader(runner);
    let api = reader.api("1.0.0", "/pizza/1.0.0").unwrap().unwrap();
    assert_eq!(api.api_id, ApiId::new(4));
    assert_eq!(api.resources.len(), 2);
    let calls = reader.runner().calls();
    assert_eq!(calls[0].params, vec![text("1.0.0"), text("/pizza/1.0.0")]);
}

#[test]
fn reader_api_lookup_without_rows_is_none() {
    let (reader, audit) = reader(MemoryQueryRunner::new());
    assert!(reader.api("2.0.0", "/none").unwrap().is_none());
    assert_eq!(audit.events()[0].entity_count, Some(0));
}

// ============================================================================
// SECTION: Tenant Scoped Loads
// ============================================================================

#[test]
fn reader_tenant_subscriptions_bind_resolved_tenant_id() {
    let row = MemoryRow::new()
        .with("SUB_ID", 9)
        .with("TIER", "Gold")
        .with("API_ID", 4)
        .with("APP_ID", 6)
        .with("STATUS", "UNBLOCKED");
    let runner = MemoryQueryRunner::new().with_rows(QueryName::TenantSubscriptions, vec![row]);
    let (reader, _) = reader(runner);
    let subscriptions = reader.subscriptions_for_tenant(&TenantDomain::new("acme.io")).unwrap();
    assert_eq!(subscriptions.len(), 1);
    assert_eq!(subscriptions[0].app_id, ApplicationId::new(6));
    assert_eq!(reader.runner().calls()[0].params, vec![QueryParam::Int(2)]);
}

#[test]
fn reader_unknown_tenant_fails_without_querying() {
    let (reader, audit) = reader(MemoryQueryRunner::new());
    let err = reader.key_mappings_for_tenant(&TenantDomain::new("ghost.org")).unwrap_err();
    assert_eq!(
        err,
        LoadError::TenantResolution {
            tenant: "ghost.org".to_string(),
            source: TenantResolutionError::UnknownDomain("ghost.org".to_string()),
        }
    );
    assert!(reader.runner().calls().is_empty());

    let events = audit.events();
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].outcome, LoadOutcome::Failure);
    assert_eq!(events[0].error_kind, Some("tenant_resolution"));
    assert_eq!(events[0].tenant.as_deref(), Some("ghost.org"));
}

#[test]
fn reader_tenant_applications_bind_tenant_id() {
    let (reader, _) = reader(MemoryQueryRunner::new());
    let applications = reader.applications_for_tenant(&TenantDomain::new("wso2.com")).unwrap();
    assert!(applications.is_empty());
    let calls = reader.runner().calls();
    assert_eq!(calls[0].query, QueryName::TenantApplications);
    assert_eq!(calls[0].params, vec![QueryParam::Int(1)]);
}

// ============================================================================
// SECTION: Single Lookups
// ============================================================================

#[test]
fn reader_key_mapping_uses_first_row() {
    let rows = vec![key_row(3, "ck-1"), key_row(4, "ck-1")];
    let runner = MemoryQueryRunner::new().with_rows(QueryName::KeyMappingByConsumerKey, rows);
    let (reader, _) = reader(runner);
    let mapping = reader.key_mapping_by_consumer_key("ck-1").unwrap().unwrap();
    assert_eq!(mapping.application_id, ApplicationId::new(3));
}

#[test]
fn reader_key_mapping_by_app_binds_app_and_type() {
    let (reader, _) = reader(MemoryQueryRunner::new());
    assert!(reader.key_mapping(ApplicationId::new(3), "SANDBOX").unwrap().is_none());
    assert_eq!(reader.runner().calls()[0].params, vec![QueryParam::Int(3), text("SANDBOX")]);
}

#[test]
fn reader_subscription_lookup_binds_api_then_app() {
    let (reader, _) = reader(MemoryQueryRunner::new());
    assert!(reader.subscription(ApiId::new(10), ApplicationId::new(20)).unwrap().is_none());
    assert_eq!(
        reader.runner().calls()[0].params,
        vec![QueryParam::Int(10), QueryParam::Int(20)]
    );
}

// ============================================================================
// SECTION: Policies
// ============================================================================

#[test]
fn reader_subscription_policy_by_name_binds_name_and_tenant() {
    let runner = MemoryQueryRunner::new()
        .with_rows(QueryName::SubscriptionPolicyByName, vec![policy_row(1, "Gold", 1)]);
    let (reader, _) = reader(runner);
    let policy =
        reader.subscription_policy("Gold", &TenantDomain::new("wso2.com")).unwrap().unwrap();
    assert_eq!(policy.rate_limit_count, 10);
    assert!(policy.stop_on_quota_reach);
    assert_eq!(reader.runner().calls()[0].params, vec![text("Gold"), QueryParam::Int(1)]);
}

#[test]
fn reader_policy_lookup_with_blank_input_never_queries() {
    let (reader, audit) = reader(MemoryQueryRunner::new());
    assert!(reader.subscription_policy("", &TenantDomain::new("wso2.com")).unwrap().is_none());
    assert!(reader.application_policy("Gold", &TenantDomain::new("  ")).unwrap().is_none());
    assert!(reader.api_policy(" ", &TenantDomain::new("wso2.com")).unwrap().is_none());
    assert!(reader.runner().calls().is_empty());
    assert_eq!(audit.events().len(), 3);
}

#[test]
fn reader_api_policies_use_api_policy_query() {
    let runner = MemoryQueryRunner::new()
        .with_rows(QueryName::AllApiPolicies, vec![policy_row(7, "10KPerMin", -1234)])
        .with_rows(QueryName::AllApplicationPolicies, vec![policy_row(8, "50PerMin", -1234)]);
    let (reader, _) = reader(runner);
    let api_policies = reader.all_api_policies().unwrap();
    assert_eq!(api_policies.len(), 1);
    assert_eq!(api_policies[0].name, "10KPerMin");
    assert_eq!(reader.runner().calls()[0].query, QueryName::AllApiPolicies);
}

#[test]
fn reader_api_policy_by_name_is_implemented() {
    let runner = MemoryQueryRunner::new()
        .with_rows(QueryName::ApiPolicyByName, vec![policy_row(7, "10KPerMin", 2)]);
    let (reader, _) = reader(runner);
    let policy = reader.api_policy("10KPerMin", &TenantDomain::new("acme.io")).unwrap().unwrap();
    assert_eq!(policy.tenant_id, TenantId::new(2));
}

// ============================================================================
// SECTION: URL Mappings
// ============================================================================

#[test]
fn reader_url_mappings_for_super_tenant_exclude_tenant_paths() {
    let (reader, _) = reader(MemoryQueryRunner::new());
    reader.url_mappings_for_tenant(TenantId::new(-1234)).unwrap();
    let calls = reader.runner().calls();
    assert_eq!(calls[0].query, QueryName::SuperTenantUrlMappings);
    assert_eq!(calls[0].params, vec![text("%/t/%")]);
}

#[test]
fn reader_url_mappings_for_tenant_match_domain() {
    let (reader, _) = reader(MemoryQueryRunner::new());
    reader.url_mappings_for_tenant(TenantId::new(1)).unwrap();
    let calls = reader.runner().calls();
    assert_eq!(calls[0].query, QueryName::TenantUrlMappings);
    assert_eq!(calls[0].params, vec![text("%wso2.com%")]);
}

#[test]
fn reader_url_mappings_escape_resolved_domain() {
    let tenants = StaticTenantResolver::new(&SuperTenant::default())
        .with_tenant("my_org.io", TenantId::new(5));
    let reader = SubscriptionValidationReader::new(MemoryQueryRunner::new(), Arc::new(tenants));
    reader.url_mappings_for_tenant(TenantId::new(5)).unwrap();
    let calls = reader.runner().calls();
    assert_eq!(calls[0].params, vec![text("%my\\_org.io%")]);
}

#[test]
fn reader_url_mappings_for_other_ids_load_everything() {
    let (reader, _) = reader(MemoryQueryRunner::new());
    reader.url_mappings_for_tenant(TenantId::new(0)).unwrap();
    let calls = reader.runner().calls();
    assert_eq!(calls[0].query, QueryName::AllUrlMappings);
    assert!(calls[0].params.is_empty());
}

#[test]
fn reader_url_mappings_for_domain_resolve_then_filter() {
    let (reader, audit) = reader(MemoryQueryRunner::new());
    reader.url_mappings_for_domain(&TenantDomain::new("acme.io")).unwrap();
    reader.url_mappings_for_domain(&TenantDomain::new("carbon.super")).unwrap();
    let calls = reader.runner().calls();
    assert_eq!(calls[0].query, QueryName::TenantUrlMappings);
    assert_eq!(calls[0].params, vec![text("%acme.io%")]);
    assert_eq!(calls[1].query, QueryName::SuperTenantUrlMappings);

    let events = audit.events();
    assert_eq!(events.len(), 2);
    assert_eq!(events[0].operation, "url_mappings_for_domain");
    assert_eq!(events[0].tenant.as_deref(), Some("acme.io"));
}

#[test]
fn reader_url_mappings_for_unknown_domain_fail_and_audit() {
    let (reader, audit) = reader(MemoryQueryRunner::new());
    let err = reader.url_mappings_for_domain(&TenantDomain::new("ghost.org")).unwrap_err();
    assert_eq!(err.kind(), "tenant_resolution");
    assert!(reader.runner().calls().is_empty());

    let events = audit.events();
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].outcome, LoadOutcome::Failure);
    assert_eq!(events[0].error_kind, Some("tenant_resolution"));
}

#[test]
fn reader_url_mappings_for_unknown_tenant_id_fail() {
    let (reader, _) = reader(MemoryQueryRunner::new());
    let err = reader.url_mappings_for_tenant(TenantId::new(99)).unwrap_err();
    assert_eq!(err.kind(), "tenant_resolution");
    assert!(reader.runner().calls().is_empty());
}

// ============================================================================
// SECTION: Failures
// ============================================================================

#[test]
fn reader_surfaces_mid_stream_failure() {
    let rows = (1..=5).map(|id| api_row(id, "GET")).collect();
    let runner = MemoryQueryRunner::new().with_rows_failing_after(QueryName::AllApis, rows, 2);
    let (reader, audit) = reader(runner);
    let err = reader.all_apis().unwrap_err();
    assert!(matches!(err, LoadError::Read(ReadError::Source(_))));
    let events = audit.events();
    assert_eq!(events[0].error_kind, Some("source"));
    assert_eq!(events[0].entity_count, None);
}

#[test]
fn reader_surfaces_connection_failure() {
    let runner = MemoryQueryRunner::new().with_failure(
        QueryName::AllSubscriptions,
        ReadError::Connection("pool exhausted".to_string()),
    );
    let (reader, audit) = reader(runner);
    let err = reader.all_subscriptions().unwrap_err();
    assert_eq!(err.kind(), "connection");
    assert!(audit.events()[0].message.as_deref().unwrap().contains("pool exhausted"));
}

#[test]
fn reader_repeated_loads_are_equal() {
    let runner = MemoryQueryRunner::new()
        .with_rows(QueryName::AllKeyMappings, vec![key_row(1, "a"), key_row(2, "b")]);
    let (reader, _) = reader(runner);
    let first = reader.all_key_mappings().unwrap();
    let second = reader.all_key_mappings().unwrap();
    assert_eq!(first, second);
    assert_eq!(first.len(), 2);
}
