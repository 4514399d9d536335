//! Span exporters

use std::io::Write;
use std::sync::Mutex;
use std::time::Duration;

use anyhow::{Context, Result};
use reqwest::blocking::Client;

use super::span::SpanRecord;

const ZIPKIN_CONNECT_TIMEOUT: Duration = Duration::from_millis(500);
const ZIPKIN_TIMEOUT: Duration = Duration::from_secs(2);

/// Destination for finished spans
pub trait SpanExporter: Send + Sync {
    /// Exporter name, for diagnostics
    fn name(&self) -> &str;

    fn export(&self, spans: &[SpanRecord]) -> Result<()>;
}

/// Writes each span as one JSON line on stderr
#[derive(Debug, Default)]
pub struct ConsoleExporter;

impl SpanExporter for ConsoleExporter {
    fn name(&self) -> &str {
        "console"
    }

    fn export(&self, spans: &[SpanRecord]) -> Result<()> {
        let stderr = std::io::stderr();
        let mut out = stderr.lock();
        for span in spans {
            writeln!(out, "{}", serde_json::to_string(span)?)?;
        }
        Ok(())
    }
}

/// Posts spans to a Zipkin collector (`POST /api/v2/spans`, JSON array body)
#[derive(Debug)]
pub struct ZipkinExporter {
    client: Client,
    url: String,
}

impl ZipkinExporter {
    pub fn new(url: &str) -> Result<Self> {
        let parsed = url::Url::parse(url).context("Invalid Zipkin collector URL")?;
        if !matches!(parsed.scheme(), "http" | "https") {
            anyhow::bail!("Zipkin collector URL must use http or https");
        }

        // Export runs on the caller's thread when a span closes
        let client = Client::builder()
            .connect_timeout(ZIPKIN_CONNECT_TIMEOUT)
            .timeout(ZIPKIN_TIMEOUT)
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            client,
            url: url.to_string(),
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

impl SpanExporter for ZipkinExporter {
    fn name(&self) -> &str {
        "zipkin"
    }

    fn export(&self, spans: &[SpanRecord]) -> Result<()> {
        let response = self
            .client
            .post(&self.url)
            .json(spans)
            .send()
            .context("Failed to reach Zipkin collector")?;

        let status = response.status();
        if !status.is_success() {
            anyhow::bail!("Zipkin collector rejected spans: HTTP {}", status.as_u16());
        }
        Ok(())
    }
}

/// Keeps finished spans in memory
///
/// Useful for embedding applications that ship spans themselves, and for tests.
#[derive(Debug, Default)]
pub struct MemoryExporter {
    spans: Mutex<Vec<SpanRecord>>,
}

impl MemoryExporter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Spans exported so far, in finishing order
    pub fn spans(&self) -> Vec<SpanRecord> {
        self.spans
            .lock()
            .map(|s| s.clone())
            .unwrap_or_default()
    }

    /// Drain the exported spans
    pub fn take(&self) -> Vec<SpanRecord> {
        self.spans
            .lock()
            .map(|mut s| std::mem::take(&mut *s))
            .unwrap_or_default()
    }
}

impl SpanExporter for MemoryExporter {
    fn name(&self) -> &str {
        "memory"
    }

    fn export(&self, spans: &[SpanRecord]) -> Result<()> {
        let mut stored = self
            .spans
            .lock()
            .map_err(|e| anyhow::anyhow!("Lock poisoned: {}", e))?;
        stored.extend_from_slice(spans);
        Ok(())
    }
}
