// crates/subvalidation-store-sqlite/tests/common/mod.rs
// ============================================================================
// Module: Common Test Fixtures
// Description: Seeded SQLite databases for validation store tests.
// Purpose: Provide a reusable multi-tenant API manager fixture.
// Dependencies: subvalidation-core, subvalidation-store-sqlite, rusqlite
// ============================================================================

//! ## Overview
//! Builds an on-disk database with the reference schema and a small dataset
//! spanning the super tenant (`carbon.super`, -1234), `wso2.com` (1), and
//! `acme.io` (2).

#![allow(dead_code, reason = "Shared test helpers may be unused in some cases.")]

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::path::PathBuf;
use std::sync::Arc;

use rusqlite::Connection;
use subvalidation_core::MemoryLoadAuditSink;
use subvalidation_core::StaticTenantResolver;
use subvalidation_core::SubscriptionValidationReader;
use subvalidation_core::SuperTenant;
use subvalidation_core::TenantId;
use subvalidation_store_sqlite::REFERENCE_SCHEMA;
use subvalidation_store_sqlite::SqliteQueryRunner;
use subvalidation_store_sqlite::SqliteStoreConfig;
use tempfile::TempDir;

// ============================================================================
// SECTION: Fixtures
// ============================================================================

/// Seed rows for the reference schema.
pub const SEED_SQL: &str = "
INSERT INTO AM_SUBSCRIBER VALUES (1, 'admin', -1234);
INSERT INTO AM_SUBSCRIBER VALUES (2, 'alice@wso2.com', 1);
INSERT INTO AM_SUBSCRIBER VALUES (3, 'bob@acme.io', 2);

INSERT INTO AM_APPLICATION VALUES (1, 'DefaultApplication', 1, 'Unlimited', 'JWT');
INSERT INTO AM_APPLICATION VALUES (2, 'AliceApp', 2, '50PerMin', NULL);
INSERT INTO AM_APPLICATION VALUES (3, 'BobApp', 3, 'Unlimited', 'OAUTH');

INSERT INTO AM_APPLICATION_ATTRIBUTES VALUES (1, 'owner', 'ops', -1234);
INSERT INTO AM_APPLICATION_ATTRIBUTES VALUES (1, 'env', 'prod', -1234);

INSERT INTO AM_API VALUES (1, 'admin', 'PizzaShack', '1.0.0', '/pizzashack/1.0.0', 'Unlimited');
INSERT INTO AM_API VALUES (2, 'admin', 'Orders', 'v1', '/orders/v1', NULL);
INSERT INTO AM_API VALUES (3, 'alice@wso2.com', 'Weather', '1.0', '/t/wso2.com/weather/1.0', 'Gold');
INSERT INTO AM_API VALUES (4, 'bob@acme.io', 'Maps', '2.0', '/t/acme.io/maps/2.0', NULL);

INSERT INTO AM_API_URL_MAPPING VALUES (1, 1, 'GET', 'Any', '/menu', 'Unlimited');
INSERT INTO AM_API_URL_MAPPING VALUES (2, 1, 'POST', 'Application User', '/order', 'Gold');
INSERT INTO AM_API_URL_MAPPING VALUES (3, 2, 'GET', 'Any', '/*', 'Unlimited');
INSERT INTO AM_API_URL_MAPPING VALUES (4, 3, 'GET', 'Any', '/today', NULL);

INSERT INTO AM_SUBSCRIPTION VALUES (1, 'Gold', 1, 1, 'UNBLOCKED');
INSERT INTO AM_SUBSCRIPTION VALUES (2, 'Unlimited', 3, 2, 'UNBLOCKED');
INSERT INTO AM_SUBSCRIPTION VALUES (3, 'Bronze', 4, 3, 'BLOCKED');

INSERT INTO AM_APPLICATION_KEY_MAPPING VALUES (1, 'ck-admin-prod', 'PRODUCTION');
INSERT INTO AM_APPLICATION_KEY_MAPPING VALUES (1, 'ck-admin-sand', 'SANDBOX');
INSERT INTO AM_APPLICATION_KEY_MAPPING VALUES (2, 'ck-alice', 'PRODUCTION');

INSERT INTO AM_POLICY_SUBSCRIPTION VALUES (1, 'Gold', 'requestCount', -1234, 10, 'min', 1);
INSERT INTO AM_POLICY_SUBSCRIPTION VALUES (2, 'Silver', 'requestCount', -1234, 0, NULL, 0);
INSERT INTO AM_POLICY_SUBSCRIPTION VALUES (3, 'Gold', 'bandwidthVolume', 1, 5, 'sec', 0);

INSERT INTO AM_POLICY_APPLICATION VALUES (1, '50PerMin', 'requestCount', -1234);
INSERT INTO AM_POLICY_APPLICATION VALUES (2, '10PerMin', 'requestCount', 1);

INSERT INTO AM_API_THROTTLE_POLICY VALUES (1, '10KPerMin', 'requestCount', -1234);
INSERT INTO AM_API_THROTTLE_POLICY VALUES (2, '50KPerMin', 'bandwidthVolume', 2);
";

/// Creates a seeded database and returns its directory guard and path.
pub fn seeded_database() -> (TempDir, PathBuf) {
    let dir = TempDir::new().expect("temp dir");
    let path = dir.path().join("apim.db");
    let connection = Connection::open(&path).expect("open fixture db");
    connection.execute_batch(REFERENCE_SCHEMA).expect("create schema");
    connection.execute_batch(SEED_SQL).expect("seed data");
    (dir, path)
}

/// Tenant resolver matching the seed data.
pub fn fixture_tenants() -> StaticTenantResolver {
    StaticTenantResolver::new(&SuperTenant::default())
        .with_tenant("wso2.com", TenantId::new(1))
        .with_tenant("acme.io", TenantId::new(2))
}

/// Strict reader over the seeded database plus its captured audit events.
pub fn fixture_reader(
    path: PathBuf,
) -> (SubscriptionValidationReader<SqliteQueryRunner>, Arc<MemoryLoadAuditSink>) {
    let runner = SqliteQueryRunner::open(SqliteStoreConfig::new(path)).expect("open runner");
    let audit = Arc::new(MemoryLoadAuditSink::new());
    let reader = SubscriptionValidationReader::new(runner, Arc::new(fixture_tenants()))
        .with_audit_sink(audit.clone());
    (reader, audit)
}
