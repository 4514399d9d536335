//! Scoped spans
//!
//! A [`SpanGuard`] is opened by [`Tracer::span`](super::Tracer::span) and
//! finished when it drops, so every exit path (early `?` returns and
//! panics included) closes and exports the span exactly once.

use std::collections::BTreeMap;
use std::time::Instant;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::Tracer;

/// Zipkin span kind
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum SpanKind {
    Client,
    Internal,
}

/// Outcome recorded on a span
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SpanStatus {
    Unset,
    Ok,
    Error(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Endpoint {
    pub service_name: String,
}

/// A finished span, serialized in Zipkin v2 JSON format
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SpanRecord {
    pub trace_id: String,
    pub id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<String>,
    pub name: String,
    pub kind: SpanKind,
    /// Start time, microseconds since the unix epoch
    pub timestamp: i64,
    /// Microseconds
    pub duration: u64,
    pub local_endpoint: Endpoint,
    #[serde(default)]
    pub tags: BTreeMap<String, String>,
}

impl SpanRecord {
    pub fn tag(&self, key: &str) -> Option<&str> {
        self.tags.get(key).map(String::as_str)
    }

    pub fn is_error(&self) -> bool {
        self.tags.contains_key("error")
    }
}

/// 128-bit trace id, 32 lowercase hex chars
pub(crate) fn new_trace_id() -> String {
    Uuid::new_v4().simple().to_string()
}

/// 64-bit span id, 16 lowercase hex chars
pub(crate) fn new_span_id() -> String {
    let mut id = Uuid::new_v4().simple().to_string();
    id.truncate(16);
    id
}

/// An open span; finished on drop
pub struct SpanGuard<'a> {
    tracer: &'a Tracer,
    trace_id: String,
    span_id: String,
    parent_id: Option<String>,
    name: String,
    kind: SpanKind,
    timestamp: i64,
    started: Instant,
    tags: BTreeMap<String, String>,
    status: SpanStatus,
    _entered: tracing::span::EnteredSpan,
}

impl<'a> SpanGuard<'a> {
    pub(super) fn start(
        tracer: &'a Tracer,
        name: &str,
        kind: SpanKind,
        trace_id: String,
        parent_id: Option<String>,
    ) -> Self {
        let span_id = new_span_id();
        let entered = tracing::info_span!("span", op = %name, span_id = %span_id).entered();
        Self {
            tracer,
            trace_id,
            span_id,
            parent_id,
            name: name.to_string(),
            kind,
            timestamp: chrono::Utc::now().timestamp_micros(),
            started: Instant::now(),
            tags: BTreeMap::new(),
            status: SpanStatus::Unset,
            _entered: entered,
        }
    }

    /// Open a child span in the same trace
    pub fn child(&self, name: &str) -> SpanGuard<'a> {
        SpanGuard::start(
            self.tracer,
            name,
            SpanKind::Internal,
            self.trace_id.clone(),
            Some(self.span_id.clone()),
        )
    }

    pub fn set_attribute(&mut self, key: impl Into<String>, value: impl ToString) {
        self.tags.insert(key.into(), value.to_string());
    }

    pub fn set_ok(&mut self) {
        self.status = SpanStatus::Ok;
    }

    pub fn set_error(&mut self, message: impl Into<String>) {
        self.status = SpanStatus::Error(message.into());
    }

    pub fn status(&self) -> &SpanStatus {
        &self.status
    }

    pub fn trace_id(&self) -> &str {
        &self.trace_id
    }

    pub fn span_id(&self) -> &str {
        &self.span_id
    }

    /// B3 multi-header propagation for an outgoing request
    pub fn b3_headers(&self) -> Vec<(&'static str, String)> {
        let mut headers = vec![
            ("X-B3-TraceId", self.trace_id.clone()),
            ("X-B3-SpanId", self.span_id.clone()),
            ("X-B3-Sampled", "1".to_string()),
        ];
        if let Some(parent) = &self.parent_id {
            headers.push(("X-B3-ParentSpanId", parent.clone()));
        }
        headers
    }

    fn finish(&mut self) -> SpanRecord {
        if std::thread::panicking() && self.status == SpanStatus::Unset {
            self.status = SpanStatus::Error("panicked".to_string());
        }

        let mut tags = std::mem::take(&mut self.tags);
        match &self.status {
            SpanStatus::Unset => {}
            SpanStatus::Ok => {
                tags.insert("otel.status_code".to_string(), "OK".to_string());
            }
            SpanStatus::Error(message) => {
                tags.insert("otel.status_code".to_string(), "ERROR".to_string());
                tags.insert("error".to_string(), message.clone());
            }
        }

        SpanRecord {
            trace_id: self.trace_id.clone(),
            id: self.span_id.clone(),
            parent_id: self.parent_id.clone(),
            name: self.name.clone(),
            kind: self.kind,
            timestamp: self.timestamp,
            duration: u64::try_from(self.started.elapsed().as_micros()).unwrap_or(u64::MAX),
            local_endpoint: Endpoint {
                service_name: self.tracer.service_name().to_string(),
            },
            tags,
        }
    }
}

impl Drop for SpanGuard<'_> {
    fn drop(&mut self) {
        let record = self.finish();
        match &self.status {
            SpanStatus::Error(message) => {
                tracing::info!(
                    duration_us = record.duration,
                    error = %message,
                    "{} failed",
                    record.name
                )
            }
            _ => tracing::debug!(duration_us = record.duration, "{} finished", record.name),
        }
        self.tracer.export(record);
    }
}
