// crates/subvalidation-cli/src/main.rs
// ============================================================================
// Module: Subscription Validation CLI Entry Point
// Description: Command dispatcher for subscription validation reads.
// Purpose: Run any reader operation against a configured store and print JSON.
// Dependencies: clap, serde_json, subvalidation-config, subvalidation-core
// ============================================================================

//! ## Overview
//! The `subvalidation` binary loads `subvalidation.toml`, builds a strict
//! reader over the configured store, and prints the result of one read
//! operation as a single JSON line on stdout. Read failures are reported on
//! stderr with a failure exit code and are never printed as empty data.

// ============================================================================
// SECTION: Modules
// ============================================================================


// ============================================================================
// SECTION: Imports
// ============================================================================

use std::io::Write;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::Args;
use clap::Parser;
use clap::Subcommand;
use serde::Serialize;
use subvalidation_config::SubvalidationConfig;
use subvalidation_core::ApiId;
use subvalidation_core::ApplicationId;
use subvalidation_core::LoadError;
use subvalidation_core::QueryRunner;
use subvalidation_core::SubscriptionValidationReader;
use subvalidation_core::TenantDomain;
use thiserror::Error;

// ============================================================================
// SECTION: CLI Types
// ============================================================================

/// Top-level CLI definition.
#[derive(Parser, Debug)]
#[command(name = "subvalidation", version, disable_help_subcommand = true)]
struct Cli {
    /// Config file path (defaults to `SUBVALIDATION_CONFIG` or subvalidation.toml).
    #[arg(long, value_name = "PATH", global = true)]
    config: Option<PathBuf>,
    /// Selected subcommand to execute.
    #[command(subcommand)]
    command: Commands,
}

/// Supported CLI subcommands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Configuration utilities.
    Config {
        /// Selected config subcommand.
        #[command(subcommand)]
        command: ConfigCommand,
    },
    /// Read operations against the configured store.
    #[command(flatten)]
    Read(ReadCommand),
}

/// Read subcommands, one per reader operation family.
#[derive(Subcommand, Debug)]
enum ReadCommand {
    /// List APIs with their URL mappings.
    Apis(TenantFilter),
    /// Look up one API by version and context.
    Api(ApiLookup),
    /// List subscriptions.
    Subscriptions(TenantFilter),
    /// Look up the subscription of an application to an API.
    Subscription(SubscriptionLookup),
    /// List applications with their attributes.
    Applications(TenantFilter),
    /// Look up one application.
    Application(ApplicationLookup),
    /// List application key mappings.
    KeyMappings(TenantFilter),
    /// Look up one key mapping by application and key type, or by consumer key.
    KeyMapping(KeyMappingLookup),
    /// List subscription throttling policies.
    SubscriptionPolicies(TenantFilter),
    /// Look up one subscription policy by name.
    SubscriptionPolicy(PolicyLookup),
    /// List application throttling policies.
    ApplicationPolicies(TenantFilter),
    /// Look up one application policy by name.
    ApplicationPolicy(PolicyLookup),
    /// List API throttling policies.
    ApiPolicies(TenantFilter),
    /// Look up one API policy by name.
    ApiPolicy(PolicyLookup),
    /// List URL mappings.
    UrlMappings(TenantFilter),
}

/// Config subcommands.
#[derive(Subcommand, Debug)]
enum ConfigCommand {
    /// Validate a configuration file.
    Validate,
}

/// Optional tenant scope for list commands.
#[derive(Args, Debug)]
struct TenantFilter {
    /// Restrict results to this tenant domain.
    #[arg(long, value_name = "DOMAIN")]
    tenant: Option<String>,
}

/// Arguments for `api`.
#[derive(Args, Debug)]
struct ApiLookup {
    /// API version.
    #[arg(long, value_name = "VERSION")]
    api_version: String,
    /// API context path.
    #[arg(long, value_name = "CONTEXT")]
    context: String,
}

/// Arguments for `subscription`.
#[derive(Args, Debug)]
struct SubscriptionLookup {
    /// API identifier.
    #[arg(long)]
    api_id: i32,
    /// Application identifier.
    #[arg(long)]
    app_id: i32,
}

/// Arguments for `application`.
#[derive(Args, Debug)]
struct ApplicationLookup {
    /// Application identifier.
    #[arg(long)]
    app_id: i32,
}

/// Arguments for `key-mapping`.
#[derive(Args, Debug)]
struct KeyMappingLookup {
    /// Application identifier.
    #[arg(long, requires = "key_type", conflicts_with = "consumer_key")]
    app_id: Option<i32>,
    /// Key type such as PRODUCTION or SANDBOX.
    #[arg(long, requires = "app_id")]
    key_type: Option<String>,
    /// OAuth consumer key.
    #[arg(long, required_unless_present = "app_id")]
    consumer_key: Option<String>,
}

/// Arguments for policy lookups.
#[derive(Args, Debug)]
struct PolicyLookup {
    /// Policy name.
    #[arg(long)]
    name: String,
    /// Owning tenant domain.
    #[arg(long, value_name = "DOMAIN")]
    tenant: String,
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// CLI error wrapper for user-facing messages.
#[derive(Debug, Error)]
#[error("{message}")]
struct CliError {
    /// Human-readable error message.
    message: String,
}

impl CliError {
    /// Constructs a new [`CliError`].
    const fn new(message: String) -> Self {
        Self {
            message,
        }
    }
}

impl From<LoadError> for CliError {
    fn from(error: LoadError) -> Self {
        Self::new(format!("read failed ({}): {error}", error.kind()))
    }
}

/// CLI result alias for fallible operations.
type CliResult<T> = Result<T, CliError>;

// ============================================================================
// SECTION: Entry Point
// ============================================================================

/// CLI entry point returning an exit code.
fn main() -> ExitCode {
    match run(Cli::parse()) {
        Ok(code) => code,
        Err(err) => emit_error(&err.to_string()),
    }
}

/// Executes the CLI command dispatcher.
fn run(cli: Cli) -> CliResult<ExitCode> {
    let config = SubvalidationConfig::load(cli.config.as_deref())
        .map_err(|err| CliError::new(format!("failed to load config: {err}")))?;
    match cli.command {
        Commands::Config {
            command: ConfigCommand::Validate,
        } => write_stdout_line("config valid")
            .map_err(|err| CliError::new(output_error("stdout", &err)))?,
        Commands::Read(command) => {
            let reader = config
                .build_reader()
                .map_err(|err| CliError::new(format!("failed to open store: {err}")))?;
            execute(&reader, command)?;
        }
    }
    Ok(ExitCode::SUCCESS)
}

/// Runs one read command and prints its JSON result.
fn execute<R: QueryRunner>(
    reader: &SubscriptionValidationReader<R>,
    command: ReadCommand,
) -> CliResult<()> {
    match command {
        ReadCommand::Apis(filter) => match tenant(&filter) {
            Some(domain) => write_json(&reader.apis_for_tenant(&domain)?),
            None => write_json(&reader.all_apis()?),
        },
        ReadCommand::Api(lookup) => write_json(&reader.api(&lookup.api_version, &lookup.context)?),
        ReadCommand::Subscriptions(filter) => match tenant(&filter) {
            Some(domain) => write_json(&reader.subscriptions_for_tenant(&domain)?),
            None => write_json(&reader.all_subscriptions()?),
        },
        ReadCommand::Subscription(lookup) => write_json(
            &reader.subscription(ApiId::new(lookup.api_id), ApplicationId::new(lookup.app_id))?,
        ),
        ReadCommand::Applications(filter) => match tenant(&filter) {
            Some(domain) => write_json(&reader.applications_for_tenant(&domain)?),
            None => write_json(&reader.all_applications()?),
        },
        ReadCommand::Application(lookup) => {
            write_json(&reader.application(ApplicationId::new(lookup.app_id))?)
        }
        ReadCommand::KeyMappings(filter) => match tenant(&filter) {
            Some(domain) => write_json(&reader.key_mappings_for_tenant(&domain)?),
            None => write_json(&reader.all_key_mappings()?),
        },
        ReadCommand::KeyMapping(KeyMappingLookup {
            app_id,
            key_type,
            consumer_key,
        }) => match (app_id, key_type, consumer_key) {
            (Some(app_id), Some(key_type), _) => {
                write_json(&reader.key_mapping(ApplicationId::new(app_id), &key_type)?)
            }
            (_, _, Some(consumer_key)) => {
                write_json(&reader.key_mapping_by_consumer_key(&consumer_key)?)
            }
            _ => Err(CliError::new(
                "key-mapping requires --app-id with --key-type, or --consumer-key".to_string(),
            )),
        },
        ReadCommand::SubscriptionPolicies(filter) => match tenant(&filter) {
            Some(domain) => write_json(&reader.subscription_policies_for_tenant(&domain)?),
            None => write_json(&reader.all_subscription_policies()?),
        },
        ReadCommand::SubscriptionPolicy(lookup) => write_json(
            &reader.subscription_policy(&lookup.name, &TenantDomain::new(lookup.tenant))?,
        ),
        ReadCommand::ApplicationPolicies(filter) => match tenant(&filter) {
            Some(domain) => write_json(&reader.application_policies_for_tenant(&domain)?),
            None => write_json(&reader.all_application_policies()?),
        },
        ReadCommand::ApplicationPolicy(lookup) => write_json(
            &reader.application_policy(&lookup.name, &TenantDomain::new(lookup.tenant))?,
        ),
        ReadCommand::ApiPolicies(filter) => match tenant(&filter) {
            Some(domain) => write_json(&reader.api_policies_for_tenant(&domain)?),
            None => write_json(&reader.all_api_policies()?),
        },
        ReadCommand::ApiPolicy(lookup) => {
            write_json(&reader.api_policy(&lookup.name, &TenantDomain::new(lookup.tenant))?)
        }
        ReadCommand::UrlMappings(filter) => match tenant(&filter) {
            Some(domain) => write_json(&reader.url_mappings_for_domain(&domain)?),
            None => write_json(&reader.all_url_mappings()?),
        },
    }
}

// ============================================================================
// SECTION: Argument Helpers
// ============================================================================

/// Returns the requested tenant domain, if any.
fn tenant(filter: &TenantFilter) -> Option<TenantDomain> {
    filter.tenant.as_deref().map(TenantDomain::new)
}

// ============================================================================
// SECTION: Output Helpers
// ============================================================================

/// Serializes `value` as one JSON line on stdout.
fn write_json<T: Serialize>(value: &T) -> CliResult<()> {
    let payload = serde_json::to_string(value)
        .map_err(|err| CliError::new(format!("failed to serialize output: {err}")))?;
    write_stdout_line(&payload).map_err(|err| CliError::new(output_error("stdout", &err)))
}

/// Writes a single line to stdout.
fn write_stdout_line(message: &str) -> std::io::Result<()> {
    let mut stdout = std::io::stdout();
    writeln!(&mut stdout, "{message}")
}

/// Writes a single line to stderr.
fn write_stderr_line(message: &str) -> std::io::Result<()> {
    let mut stderr = std::io::stderr();
    writeln!(&mut stderr, "{message}")
}

/// Formats an output stream failure.
fn output_error(stream: &str, error: &std::io::Error) -> String {
    format!("failed to write to {stream}: {error}")
}

/// Emits an error message to stderr and returns a failure exit code.
fn emit_error(message: &str) -> ExitCode {
    let _ = write_stderr_line(message);
    ExitCode::FAILURE
}
