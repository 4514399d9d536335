//! Logging and tracing bootstrap
//!
//! Two concerns live here:
//!
//! - **Logs**: [`init_logging`] installs the process-wide `tracing-subscriber`
//!   formatter. Filter with `VITRINE_LOG` (e.g. `VITRINE_LOG=debug`).
//! - **Spans**: a [`Tracer`] is built once at startup from
//!   [`TelemetryConfig`] and handed to the gateway. Each backend call runs
//!   inside a [`SpanGuard`]; finished spans go to every configured exporter
//!   (console JSON lines, Zipkin collector).
//!
//! ```bash
//! # Print finished spans on stderr
//! VITRINE_CONSOLE_SPANS=1 vt products list
//!
//! # Ship spans to a local Zipkin
//! VITRINE_ZIPKIN_URL=http://localhost:9411/api/v2/spans vt products list
//! ```

mod export;
mod span;

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Once};

use anyhow::Result;
use tracing_subscriber::EnvFilter;

use crate::config::TelemetryConfig;

pub use export::{ConsoleExporter, MemoryExporter, SpanExporter, ZipkinExporter};
pub use span::{Endpoint, SpanGuard, SpanKind, SpanRecord, SpanStatus};

/// Environment variable holding the log filter
pub const LOG_ENV: &str = "VITRINE_LOG";

static INIT_LOGGING: Once = Once::new();

/// Install the global log subscriber (stderr, compact)
///
/// Only the first call has an effect.
pub fn init_logging(default_filter: &str) {
    INIT_LOGGING.call_once(|| {
        let filter = EnvFilter::try_from_env(LOG_ENV)
            .unwrap_or_else(|_| EnvFilter::new(default_filter));
        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .with_target(false)
            .compact()
            .try_init();
    });
}

/// Span factory bound to a service name and a set of exporters
pub struct Tracer {
    service_name: String,
    exporters: Vec<Arc<dyn SpanExporter>>,
    export_failed: AtomicBool,
}

impl std::fmt::Debug for Tracer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let names: Vec<&str> = self.exporters.iter().map(|e| e.name()).collect();
        f.debug_struct("Tracer")
            .field("service_name", &self.service_name)
            .field("exporters", &names)
            .finish()
    }
}

impl Tracer {
    /// Tracer without exporters; spans still show up in the logs
    pub fn new(service_name: impl Into<String>) -> Self {
        Self {
            service_name: service_name.into(),
            exporters: Vec::new(),
            export_failed: AtomicBool::new(false),
        }
    }

    pub fn with_exporter(mut self, exporter: Arc<dyn SpanExporter>) -> Self {
        self.exporters.push(exporter);
        self
    }

    /// Build the tracer described by the settings
    pub fn from_config(config: &TelemetryConfig) -> Result<Self> {
        let mut tracer = Self::new(&config.service_name);
        if let Some(url) = &config.zipkin_url {
            tracer = tracer.with_exporter(Arc::new(ZipkinExporter::new(url)?));
        }
        if config.console {
            tracer = tracer.with_exporter(Arc::new(ConsoleExporter));
        }
        tracing::debug!(?tracer, "tracer initialized");
        Ok(tracer)
    }

    pub fn service_name(&self) -> &str {
        &self.service_name
    }

    /// Open a client span in a fresh trace
    pub fn span(&self, name: &str) -> SpanGuard<'_> {
        SpanGuard::start(self, name, SpanKind::Client, span::new_trace_id(), None)
    }

    /// Run `f` inside a span whose status follows the returned `Result`
    pub fn in_span<T, E, F>(
        &self,
        name: &str,
        attributes: &[(&str, String)],
        f: F,
    ) -> std::result::Result<T, E>
    where
        E: std::fmt::Display,
        F: FnOnce(&mut SpanGuard<'_>) -> std::result::Result<T, E>,
    {
        let mut span = self.span(name);
        for (key, value) in attributes {
            span.set_attribute(*key, value);
        }
        let result = f(&mut span);
        match &result {
            Ok(_) => span.set_ok(),
            Err(e) => span.set_error(e.to_string()),
        }
        result
    }

    /// Hand a finished span to every exporter
    ///
    /// Failures never reach the caller. The first one is a warning, the
    /// rest go to debug logs.
    fn export(&self, record: SpanRecord) {
        let batch = [record];
        for exporter in &self.exporters {
            if let Err(e) = exporter.export(&batch) {
                if self.export_failed.swap(true, Ordering::Relaxed) {
                    tracing::debug!(exporter = exporter.name(), error = %e, "span export failed");
                } else {
                    tracing::warn!(exporter = exporter.name(), error = %e, "span export failed");
                }
            }
        }
    }
}
