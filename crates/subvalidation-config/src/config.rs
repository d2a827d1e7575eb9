// crates/subvalidation-config/src/config.rs
// ============================================================================
// Module: Subscription Validation Configuration
// Description: Configuration loading and validation for the validation reader.
// Purpose: Provide strict, fail-closed config parsing with hard limits.
// Dependencies: subvalidation-core, subvalidation-store-sqlite, serde, toml
// ============================================================================

//! ## Overview
//! Configuration is loaded from a TOML file with strict size and path limits.
//! Missing or invalid configuration fails closed: a reader is never built
//! from a config that did not pass [`SubvalidationConfig::validate`].

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::HashSet;
use std::env;
use std::fs;
use std::path::Path;
use std::path::PathBuf;
use std::sync::Arc;

use serde::Deserialize;
use serde::Serialize;
use subvalidation_core::DEFAULT_SUPER_TENANT_DOMAIN;
use subvalidation_core::DEFAULT_SUPER_TENANT_ID;
use subvalidation_core::FileLoadAuditSink;
use subvalidation_core::LoadAuditSink;
use subvalidation_core::NoopLoadAuditSink;
use subvalidation_core::StaticTenantResolver;
use subvalidation_core::StderrLoadAuditSink;
use subvalidation_core::SubscriptionValidationReader;
use subvalidation_core::SuperTenant;
use subvalidation_core::TenantDomain;
use subvalidation_core::TenantId;
use subvalidation_store_sqlite::SqliteQueryRunner;
use subvalidation_store_sqlite::SqliteStoreConfig;
use thiserror::Error;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Default configuration filename when no path is specified.
const DEFAULT_CONFIG_NAME: &str = "subvalidation.toml";
/// Environment variable naming the config path.
pub const CONFIG_ENV_VAR: &str = "SUBVALIDATION_CONFIG";
/// Maximum size of a configuration file in bytes.
pub const MAX_CONFIG_FILE_SIZE: usize = 1024 * 1024;
/// Maximum length of a single path component.
const MAX_PATH_COMPONENT_LENGTH: usize = 255;
/// Maximum length of a full path.
const MAX_TOTAL_PATH_LENGTH: usize = 4096;
/// Maximum number of statically registered tenants.
pub const MAX_TENANTS: usize = 4096;
/// Maximum length of a tenant domain.
const MAX_TENANT_DOMAIN_LENGTH: usize = 253;

// ============================================================================
// SECTION: Root Config
// ============================================================================

/// Root configuration for the subscription validation reader.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SubvalidationConfig {
    /// `SQLite` store configuration.
    pub store: SqliteStoreConfig,
    /// Tenant identity configuration.
    #[serde(default)]
    pub tenancy: TenancyConfig,
    /// Load audit logging configuration.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl SubvalidationConfig {
    /// Loads configuration from disk using the default resolution rules.
    ///
    /// The path is taken from `path`, then [`CONFIG_ENV_VAR`], then
    /// `subvalidation.toml` in the working directory.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when loading or validation fails.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let resolved = resolve_path(path)?;
        validate_path(&resolved)?;
        let bytes = fs::read(&resolved).map_err(|err| ConfigError::Io(err.to_string()))?;
        if bytes.len() > MAX_CONFIG_FILE_SIZE {
            return Err(ConfigError::Invalid("config file exceeds size limit".to_string()));
        }
        let content = std::str::from_utf8(&bytes)
            .map_err(|_| ConfigError::Invalid("config file must be utf-8".to_string()))?;
        Self::from_toml(content)
    }

    /// Parses and validates configuration from TOML text.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when parsing or validation fails.
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let config: Self =
            toml::from_str(content).map_err(|err| ConfigError::Parse(err.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Validates the configuration for internal consistency.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when configuration is invalid.
    pub fn validate(&self) -> Result<(), ConfigError> {
        validate_path_string("store.path", &self.store.path.to_string_lossy())?;
        if self.store.busy_timeout_ms == 0 {
            return Err(ConfigError::Invalid(
                "store.busy_timeout_ms must be greater than zero".to_string(),
            ));
        }
        self.tenancy.validate()?;
        self.logging.validate()?;
        Ok(())
    }

    /// Builds a strict reader over the configured store.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when the store or audit sink cannot be opened.
    pub fn build_reader(
        &self,
    ) -> Result<SubscriptionValidationReader<SqliteQueryRunner>, ConfigError> {
        let runner = SqliteQueryRunner::open(self.store.clone())
            .map_err(|err| ConfigError::Store(err.to_string()))?;
        let reader = SubscriptionValidationReader::new(runner, Arc::new(self.tenancy.resolver()))
            .with_super_tenant(self.tenancy.super_tenant())
            .with_audit_sink(self.logging.audit_sink()?);
        Ok(reader)
    }
}

// ============================================================================
// SECTION: Tenancy
// ============================================================================

/// Tenant identity configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TenancyConfig {
    /// Domain of the super tenant.
    #[serde(default = "default_super_tenant_domain")]
    pub super_tenant_domain: String,
    /// Identifier of the super tenant.
    #[serde(default = "default_super_tenant_id")]
    pub super_tenant_id: i32,
    /// Statically registered tenants.
    #[serde(default)]
    pub tenants: Vec<TenantEntry>,
}

/// One statically registered tenant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TenantEntry {
    /// Tenant domain.
    pub domain: String,
    /// Tenant identifier; must be positive.
    pub id: i32,
}

impl Default for TenancyConfig {
    fn default() -> Self {
        Self {
            super_tenant_domain: default_super_tenant_domain(),
            super_tenant_id: default_super_tenant_id(),
            tenants: Vec::new(),
        }
    }
}

impl TenancyConfig {
    /// Returns the configured super tenant identity.
    #[must_use]
    pub fn super_tenant(&self) -> SuperTenant {
        SuperTenant {
            domain: TenantDomain::new(self.super_tenant_domain.trim()),
            id: TenantId::new(self.super_tenant_id),
        }
    }

    /// Builds a static resolver holding the super tenant and every entry.
    #[must_use]
    pub fn resolver(&self) -> StaticTenantResolver {
        let mut resolver = StaticTenantResolver::new(&self.super_tenant());
        for tenant in &self.tenants {
            resolver.register(TenantDomain::new(tenant.domain.trim()), TenantId::new(tenant.id));
        }
        resolver
    }

    /// Validates tenancy configuration.
    fn validate(&self) -> Result<(), ConfigError> {
        validate_domain("tenancy.super_tenant_domain", &self.super_tenant_domain)?;
        if self.super_tenant_id > 0 {
            return Err(ConfigError::Invalid(
                "tenancy.super_tenant_id must not be positive".to_string(),
            ));
        }
        if self.tenants.len() > MAX_TENANTS {
            return Err(ConfigError::Invalid("tenancy.tenants exceeds max entries".to_string()));
        }
        let mut domains = HashSet::new();
        let mut ids = HashSet::new();
        domains.insert(self.super_tenant_domain.trim().to_ascii_lowercase());
        ids.insert(self.super_tenant_id);
        for tenant in &self.tenants {
            validate_domain("tenancy.tenants.domain", &tenant.domain)?;
            if tenant.id <= 0 {
                return Err(ConfigError::Invalid(format!(
                    "tenancy.tenants.id for {} must be greater than zero",
                    tenant.domain
                )));
            }
            if !domains.insert(tenant.domain.trim().to_ascii_lowercase()) {
                return Err(ConfigError::Invalid(format!(
                    "duplicate tenant domain: {}",
                    tenant.domain
                )));
            }
            if !ids.insert(tenant.id) {
                return Err(ConfigError::Invalid(format!("duplicate tenant id: {}", tenant.id)));
            }
        }
        Ok(())
    }
}

/// Returns the default super tenant domain.
fn default_super_tenant_domain() -> String {
    DEFAULT_SUPER_TENANT_DOMAIN.to_string()
}

/// Returns the default super tenant identifier.
const fn default_super_tenant_id() -> i32 {
    DEFAULT_SUPER_TENANT_ID
}

// ============================================================================
// SECTION: Logging
// ============================================================================

/// Destination for load audit events.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuditSinkKind {
    /// JSON lines on stderr.
    #[default]
    Stderr,
    /// JSON lines appended to a file.
    File,
    /// Discard events.
    None,
}

/// Load audit logging configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LoggingConfig {
    /// Audit sink type.
    #[serde(default)]
    pub sink: AuditSinkKind,
    /// Log file path for the `file` sink.
    #[serde(default)]
    pub path: Option<PathBuf>,
}

impl LoggingConfig {
    /// Builds the configured audit sink.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] when the log file cannot be opened.
    pub fn audit_sink(&self) -> Result<Arc<dyn LoadAuditSink>, ConfigError> {
        match (self.sink, &self.path) {
            (AuditSinkKind::Stderr, _) => Ok(Arc::new(StderrLoadAuditSink)),
            (AuditSinkKind::None, _) => Ok(Arc::new(NoopLoadAuditSink)),
            (AuditSinkKind::File, Some(path)) => {
                let sink =
                    FileLoadAuditSink::new(path).map_err(|err| ConfigError::Io(err.to_string()))?;
                Ok(Arc::new(sink))
            }
            (AuditSinkKind::File, None) => {
                Err(ConfigError::Invalid("file logging sink requires path".to_string()))
            }
        }
    }

    /// Validates logging configuration.
    fn validate(&self) -> Result<(), ConfigError> {
        match (self.sink, &self.path) {
            (AuditSinkKind::File, Some(path)) => {
                validate_path_string("logging.path", &path.to_string_lossy())
            }
            (AuditSinkKind::File, None) => {
                Err(ConfigError::Invalid("file logging sink requires path".to_string()))
            }
            (_, Some(_)) => Err(ConfigError::Invalid(
                "logging.path is only valid for the file sink".to_string(),
            )),
            (_, None) => Ok(()),
        }
    }
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Configuration loading or validation errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// I/O failure while reading configuration.
    #[error("config io error: {0}")]
    Io(String),
    /// TOML parsing error.
    #[error("config parse error: {0}")]
    Parse(String),
    /// Invalid configuration data.
    #[error("invalid config: {0}")]
    Invalid(String),
    /// The configured store could not be opened.
    #[error("config store error: {0}")]
    Store(String),
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Resolves the config path from CLI or environment defaults.
fn resolve_path(path: Option<&Path>) -> Result<PathBuf, ConfigError> {
    if let Some(path) = path {
        return Ok(path.to_path_buf());
    }
    if let Ok(env_path) = env::var(CONFIG_ENV_VAR) {
        if env_path.len() > MAX_TOTAL_PATH_LENGTH {
            return Err(ConfigError::Invalid("config path exceeds max length".to_string()));
        }
        return Ok(PathBuf::from(env_path));
    }
    Ok(PathBuf::from(DEFAULT_CONFIG_NAME))
}

/// Validates the resolved path against length limits.
fn validate_path(path: &Path) -> Result<(), ConfigError> {
    let text = path.to_string_lossy();
    if text.len() > MAX_TOTAL_PATH_LENGTH {
        return Err(ConfigError::Invalid("config path exceeds max length".to_string()));
    }
    for component in path.components() {
        let value = component.as_os_str().to_string_lossy();
        if value.len() > MAX_PATH_COMPONENT_LENGTH {
            return Err(ConfigError::Invalid("config path component too long".to_string()));
        }
    }
    Ok(())
}

/// Validates a path string against length constraints.
fn validate_path_string(field: &str, value: &str) -> Result<(), ConfigError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ConfigError::Invalid(format!("{field} must be non-empty")));
    }
    if trimmed.len() > MAX_TOTAL_PATH_LENGTH {
        return Err(ConfigError::Invalid(format!("{field} exceeds max length")));
    }
    for component in Path::new(trimmed).components() {
        let component_value = component.as_os_str().to_string_lossy();
        if component_value.len() > MAX_PATH_COMPONENT_LENGTH {
            return Err(ConfigError::Invalid(format!("{field} path component too long")));
        }
    }
    Ok(())
}

/// Validates a tenant domain string.
fn validate_domain(field: &str, value: &str) -> Result<(), ConfigError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ConfigError::Invalid(format!("{field} must be non-empty")));
    }
    if trimmed.len() > MAX_TENANT_DOMAIN_LENGTH {
        return Err(ConfigError::Invalid(format!("{field} exceeds max length")));
    }
    if trimmed.contains(['/', '%', '_']) || trimmed.chars().any(char::is_whitespace) {
        return Err(ConfigError::Invalid(format!(
            "{field} contains reserved characters: {trimmed}"
        )));
    }
    Ok(())
}

// ============================================================================
// SECTION: Tests
// ============================================================================
