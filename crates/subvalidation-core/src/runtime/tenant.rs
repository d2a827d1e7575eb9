// crates/subvalidation-core/src/runtime/tenant.rs
// ============================================================================
// Module: Static Tenant Resolver
// Description: Fixed domain/id table implementing the tenant resolver.
// Purpose: Resolve tenants without an identity service round trip.
// Dependencies: crate::core, crate::interfaces
// ============================================================================

//! ## Overview
//! [`StaticTenantResolver`] answers from a table supplied at construction,
//! typically from configuration. The super tenant is always registered.
//! Domain lookups ignore ASCII case.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::HashMap;

use crate::core::identifiers::SuperTenant;
use crate::core::identifiers::TenantDomain;
use crate::core::identifiers::TenantId;
use crate::interfaces::TenantResolutionError;
use crate::interfaces::TenantResolver;

// ============================================================================
// SECTION: Resolver
// ============================================================================

/// Tenant resolver backed by a fixed table.
#[derive(Debug, Clone)]
pub struct StaticTenantResolver {
    /// Lowercased domain to id.
    ids: HashMap<String, TenantId>,
    /// Id to domain as registered.
    domains: HashMap<TenantId, TenantDomain>,
}

impl StaticTenantResolver {
    /// Creates a resolver that knows only the super tenant.
    #[must_use]
    pub fn new(super_tenant: &SuperTenant) -> Self {
        let mut resolver = Self {
            ids: HashMap::new(),
            domains: HashMap::new(),
        };
        resolver.register(super_tenant.domain.clone(), super_tenant.id);
        resolver
    }

    /// Registers `domain` under `id`, replacing earlier entries for either.
    pub fn register(&mut self, domain: TenantDomain, id: TenantId) {
        let key = domain.as_str().to_ascii_lowercase();
        if let Some(previous_id) = self.ids.remove(&key) {
            self.domains.remove(&previous_id);
        }
        if let Some(previous_domain) = self.domains.remove(&id) {
            self.ids.remove(&previous_domain.as_str().to_ascii_lowercase());
        }
        self.ids.insert(key, id);
        self.domains.insert(id, domain);
    }

    /// Builder form of [`Self::register`].
    #[must_use]
    pub fn with_tenant(mut self, domain: impl Into<TenantDomain>, id: TenantId) -> Self {
        self.register(domain.into(), id);
        self
    }
}

impl TenantResolver for StaticTenantResolver {
    fn tenant_id(&self, domain: &TenantDomain) -> Result<TenantId, TenantResolutionError> {
        self.ids
            .get(&domain.as_str().to_ascii_lowercase())
            .copied()
            .ok_or_else(|| TenantResolutionError::UnknownDomain(domain.to_string()))
    }

    fn tenant_domain(&self, id: TenantId) -> Result<TenantDomain, TenantResolutionError> {
        self.domains
            .get(&id)
            .cloned()
            .ok_or_else(|| TenantResolutionError::UnknownTenantId(id.get()))
    }
}

// ============================================================================
// SECTION: Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolves_registered_domains_ignoring_case() {
        let resolver = StaticTenantResolver::new(&SuperTenant::default())
            .with_tenant("wso2.com", TenantId::new(1));
        assert_eq!(resolver.tenant_id(&TenantDomain::new("WSO2.com")), Ok(TenantId::new(1)));
        assert_eq!(
            resolver.tenant_id(&TenantDomain::new("Carbon.Super")),
            Ok(TenantId::new(-1234))
        );
        assert_eq!(resolver.tenant_domain(TenantId::new(1)), Ok(TenantDomain::new("wso2.com")));
    }

    #[test]
    fn reregistering_replaces_both_directions() {
        let mut resolver = StaticTenantResolver::new(&SuperTenant::default());
        resolver.register(TenantDomain::new("a.io"), TenantId::new(1));
        resolver.register(TenantDomain::new("A.io"), TenantId::new(2));
        assert_eq!(resolver.tenant_id(&TenantDomain::new("a.io")), Ok(TenantId::new(2)));
        assert_eq!(
            resolver.tenant_domain(TenantId::new(1)),
            Err(TenantResolutionError::UnknownTenantId(1))
        );

        resolver.register(TenantDomain::new("b.io"), TenantId::new(2));
        assert_eq!(resolver.tenant_domain(TenantId::new(2)), Ok(TenantDomain::new("b.io")));
        assert_eq!(
            resolver.tenant_id(&TenantDomain::new("a.io")),
            Err(TenantResolutionError::UnknownDomain("a.io".to_string()))
        );
    }

    #[test]
    fn unknown_entries_are_errors() {
        let resolver = StaticTenantResolver::new(&SuperTenant::default());
        assert_eq!(
            resolver.tenant_id(&TenantDomain::new("nope.org")),
            Err(TenantResolutionError::UnknownDomain("nope.org".to_string()))
        );
        assert_eq!(
            resolver.tenant_domain(TenantId::new(7)),
            Err(TenantResolutionError::UnknownTenantId(7))
        );
    }
}
