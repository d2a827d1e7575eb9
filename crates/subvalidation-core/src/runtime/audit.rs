// crates/subvalidation-core/src/runtime/audit.rs
// ============================================================================
// Module: Load Audit Logging
// Description: Structured audit events for validation data loads.
// Purpose: Emit one JSON-lines record per read operation.
// Dependencies: serde, serde_json
// ============================================================================

//! ## Overview
//! Every reader operation emits exactly one [`LoadAuditEvent`]: a success
//! with the number of entities returned, or a failure with the error kind
//! and message. Sinks decide where events go; the reader never formats
//! output itself.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fs::OpenOptions;
use std::io;
use std::io::Write;
use std::path::Path;
use std::sync::Mutex;
use std::time::SystemTime;
use std::time::UNIX_EPOCH;

use serde::Serialize;

// ============================================================================
// SECTION: Types
// ============================================================================

/// Outcome recorded for a load operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LoadOutcome {
    /// Operation returned data (possibly empty).
    Success,
    /// Operation failed.
    Failure,
}

/// Load audit event payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LoadAuditEvent {
    /// Event identifier.
    pub event: &'static str,
    /// Event timestamp (milliseconds since epoch).
    pub timestamp_ms: u128,
    /// Reader operation name.
    pub operation: &'static str,
    /// Tenant domain or id the operation was scoped to, if any.
    pub tenant: Option<String>,
    /// Operation outcome.
    pub outcome: LoadOutcome,
    /// Number of entities returned on success.
    pub entity_count: Option<usize>,
    /// Normalized error kind label on failure.
    pub error_kind: Option<&'static str>,
    /// Error message on failure.
    pub message: Option<String>,
}

impl LoadAuditEvent {
    /// Creates a success event with a consistent timestamp.
    #[must_use]
    pub fn success(operation: &'static str, tenant: Option<String>, entity_count: usize) -> Self {
        Self {
            event: "validation_load",
            timestamp_ms: now_ms(),
            operation,
            tenant,
            outcome: LoadOutcome::Success,
            entity_count: Some(entity_count),
            error_kind: None,
            message: None,
        }
    }

    /// Creates a failure event with a consistent timestamp.
    #[must_use]
    pub fn failure(
        operation: &'static str,
        tenant: Option<String>,
        error_kind: &'static str,
        message: String,
    ) -> Self {
        Self {
            event: "validation_load",
            timestamp_ms: now_ms(),
            operation,
            tenant,
            outcome: LoadOutcome::Failure,
            entity_count: None,
            error_kind: Some(error_kind),
            message: Some(message),
        }
    }
}

/// Milliseconds since the Unix epoch, zero if the clock is before it.
fn now_ms() -> u128 {
    SystemTime::now().duration_since(UNIX_EPOCH).unwrap_or_default().as_millis()
}

// ============================================================================
// SECTION: Sinks
// ============================================================================

/// Audit sink for load events.
pub trait LoadAuditSink: Send + Sync {
    /// Record an audit event.
    fn record(&self, event: &LoadAuditEvent);
}

/// Audit sink that logs JSON lines to stderr.
pub struct StderrLoadAuditSink;

impl LoadAuditSink for StderrLoadAuditSink {
    fn record(&self, event: &LoadAuditEvent) {
        if let Ok(payload) = serde_json::to_string(event) {
            let _ = writeln!(std::io::stderr(), "{payload}");
        }
    }
}

/// Audit sink that logs JSON lines to a file.
pub struct FileLoadAuditSink {
    /// File handle used for append-only logging.
    file: Mutex<std::fs::File>,
}

impl FileLoadAuditSink {
    /// Opens the audit log file in append mode.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be opened.
    pub fn new(path: &Path) -> io::Result<Self> {
        let file = OpenOptions::new().create(true).append(true).open(path)?;
        Ok(Self {
            file: Mutex::new(file),
        })
    }
}

impl LoadAuditSink for FileLoadAuditSink {
    fn record(&self, event: &LoadAuditEvent) {
        if let Ok(payload) = serde_json::to_string(event)
            && let Ok(mut file) = self.file.lock()
        {
            let _ = writeln!(file, "{payload}");
            let _ = file.flush();
        }
    }
}

/// No-op audit sink.
pub struct NoopLoadAuditSink;

impl LoadAuditSink for NoopLoadAuditSink {
    fn record(&self, _event: &LoadAuditEvent) {}
}

/// Audit sink that keeps events in memory.
#[derive(Default)]
pub struct MemoryLoadAuditSink {
    /// Recorded events in arrival order.
    events: Mutex<Vec<LoadAuditEvent>>,
}

impl MemoryLoadAuditSink {
    /// Creates an empty sink.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a copy of every recorded event.
    #[must_use]
    pub fn events(&self) -> Vec<LoadAuditEvent> {
        self.events.lock().map(|events| events.clone()).unwrap_or_default()
    }
}

impl LoadAuditSink for MemoryLoadAuditSink {
    fn record(&self, event: &LoadAuditEvent) {
        if let Ok(mut events) = self.events.lock() {
            events.push(event.clone());
        }
    }
}

// ============================================================================
// SECTION: Tests
// ============================================================================
