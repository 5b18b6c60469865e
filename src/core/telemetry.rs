//! Telemetry Port: span + counter/histogram/gauge abstraction with a
//! guaranteed no-op fallback.
//!
//! The port is built on `tracing` for spans (matching the rest of the crate's
//! logging) plus a small in-process metrics registry for counters,
//! histograms, and gauges. When no recorder is installed, every operation is
//! a no-op that still returns a safe, callable handle — no allocation beyond
//! the sentinel, and telemetry failures never propagate to callers.

use std::collections::HashMap;
use std::sync::Arc;

use dashmap::DashMap;
use parking_lot::Mutex;
use tracing::Span;

/// A single telemetry attribute value. Kept deliberately small: callers only
/// ever attach strings, bools, and numbers drawn from the semantic
/// vocabulary, never arbitrary structured data.
#[derive(Debug, Clone)]
pub enum AttrValue {
    Str(String),
    Bool(bool),
    Int(i64),
    Float(f64),
}

impl From<&str> for AttrValue {
    fn from(v: &str) -> Self {
        Self::Str(v.to_string())
    }
}
impl From<String> for AttrValue {
    fn from(v: String) -> Self {
        Self::Str(v)
    }
}
impl From<bool> for AttrValue {
    fn from(v: bool) -> Self {
        Self::Bool(v)
    }
}
impl From<i64> for AttrValue {
    fn from(v: i64) -> Self {
        Self::Int(v)
    }
}
impl From<f64> for AttrValue {
    fn from(v: f64) -> Self {
        Self::Float(v)
    }
}

impl std::fmt::Display for AttrValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Str(s) => write!(f, "{s}"),
            Self::Bool(b) => write!(f, "{b}"),
            Self::Int(i) => write!(f, "{i}"),
            Self::Float(v) => write!(f, "{v}"),
        }
    }
}

/// An ordered set of attributes for a span or metric emission.
pub type Attrs = Vec<(&'static str, AttrValue)>;

/// A scoped span handle. Ends the span (and, for real spans, records the
/// elapsed duration) when dropped, on every exit path including panics.
pub struct SpanGuard {
    _span: Span,
    _entered: Option<tracing::span::EnteredSpan>,
}

impl SpanGuard {
    /// Attach an additional attribute after span creation. Emitted as a
    /// debug-level event scoped to the span rather than a dynamic span
    /// field, since `tracing`'s field set is fixed at span-creation time.
    pub fn set_attribute(&self, key: &'static str, value: impl Into<AttrValue>) {
        let value = value.into();
        tracing::event!(parent: &self._span, tracing::Level::DEBUG, key, %value, "attribute set");
    }

    /// Record a structured event within this span.
    pub fn add_event(&self, name: &str) {
        tracing::event!(parent: &self._span, tracing::Level::DEBUG, event = name);
    }

    /// Mark the span as having ended in error, recording the exception.
    pub fn record_exception(&self, error: &(dyn std::error::Error + 'static)) {
        tracing::event!(parent: &self._span, tracing::Level::ERROR, error = %error, "exception recorded");
    }
}

/// A counter handle bound to a metric name.
pub struct Counter<'a> {
    port: &'a TelemetryPort,
    name: &'static str,
}

impl Counter<'_> {
    pub fn add(&self, value: u64, attrs: Attrs) {
        self.port.record_counter(self.name, value, attrs);
    }
}

/// A histogram handle bound to a metric name.
pub struct Histogram<'a> {
    port: &'a TelemetryPort,
    name: &'static str,
}

impl Histogram<'_> {
    pub fn record(&self, value: f64, attrs: Attrs) {
        self.port.record_histogram(self.name, value, attrs);
    }
}

/// A gauge handle bound to a metric name.
pub struct Gauge<'a> {
    port: &'a TelemetryPort,
    name: &'static str,
}

impl Gauge<'_> {
    pub fn set(&self, value: f64, attrs: Attrs) {
        self.port.record_gauge(self.name, value, attrs);
    }
}

#[derive(Debug, Default, Clone)]
struct MetricSample {
    count: u64,
    sum: f64,
    last: f64,
    by_attrs: HashMap<String, u64>,
}

/// In-process metrics registry. When `enabled` is false every recording call
/// is skipped entirely (the no-op fallback); tests and exporters that want
/// real numbers can read them back with `snapshot`.
#[derive(Debug, Default)]
struct Registry {
    enabled: bool,
    samples: DashMap<&'static str, MetricSample>,
}

/// The injectable telemetry port. A single process-wide instance is
/// permissible but must be constructed explicitly and threaded through the
/// engine — never reached through module-global state.
#[derive(Clone)]
pub struct TelemetryPort {
    registry: Arc<Mutex<Registry>>,
}

impl TelemetryPort {
    /// Build a port with an exporter/recorder attached (metrics retained).
    pub fn enabled() -> Self {
        Self {
            registry: Arc::new(Mutex::new(Registry {
                enabled: true,
                samples: DashMap::new(),
            })),
        }
    }

    /// Build a port whose metric operations are no-ops. Spans still flow
    /// through `tracing` (so `RUST_LOG`-based debugging keeps working), but
    /// no metric state is retained.
    pub fn noop() -> Self {
        Self {
            registry: Arc::new(Mutex::new(Registry {
                enabled: false,
                samples: DashMap::new(),
            })),
        }
    }

    /// Open a scoped span. The span ends when the returned guard is dropped,
    /// on every exit path. `name` is usually one of the constants in
    /// [`crate::core::vocabulary`], but per-criterion span names built by
    /// `span_validate`/`span_phase` are also accepted without requiring a
    /// leaked allocation.
    pub fn span(&self, name: impl Into<String>, attrs: Attrs) -> SpanGuard {
        let name = name.into();
        let span = tracing::info_span!("dod_span", name = %name);
        {
            let _enter = span.enter();
            for (key, value) in &attrs {
                tracing::debug!(key = *key, %value, "span attribute");
            }
        }
        let entered = span.clone().entered();
        SpanGuard {
            _span: span,
            _entered: Some(entered),
        }
    }

    /// Bind a counter handle.
    pub fn counter(&self, name: &'static str) -> Counter<'_> {
        Counter { port: self, name }
    }

    /// Bind a histogram handle.
    pub fn histogram(&self, name: &'static str) -> Histogram<'_> {
        Histogram { port: self, name }
    }

    /// Bind a gauge handle.
    pub fn gauge(&self, name: &'static str) -> Gauge<'_> {
        Gauge { port: self, name }
    }

    /// Record an exception against the current span. Never panics; a
    /// failure here is swallowed, per the telemetry contract.
    pub fn record_exception(&self, error: &(dyn std::error::Error + 'static), escaped: bool) {
        tracing::event!(tracing::Level::ERROR, error = %error, escaped, "exception recorded");
    }

    fn record_counter(&self, name: &'static str, value: u64, attrs: Attrs) {
        let reg = self.registry.lock();
        if !reg.enabled {
            return;
        }
        let mut sample = reg.samples.entry(name).or_default();
        sample.count += value;
        for (key, val) in attrs {
            *sample.by_attrs.entry(format!("{key}={val}")).or_insert(0) += value;
        }
    }

    fn record_histogram(&self, name: &'static str, value: f64, _attrs: Attrs) {
        let reg = self.registry.lock();
        if !reg.enabled {
            return;
        }
        let mut sample = reg.samples.entry(name).or_default();
        sample.count += 1;
        sample.sum += value;
    }

    fn record_gauge(&self, name: &'static str, value: f64, _attrs: Attrs) {
        let reg = self.registry.lock();
        if !reg.enabled {
            return;
        }
        let mut sample = reg.samples.entry(name).or_default();
        sample.last = value;
    }

    /// Read back the total recorded count for a counter/histogram, or the
    /// last value set for a gauge. Used by tests; exporters would read this
    /// on a scrape interval instead.
    pub fn snapshot_count(&self, name: &str) -> u64 {
        self.registry
            .lock()
            .samples
            .get(name)
            .map(|s| s.count)
            .unwrap_or(0)
    }

    /// Read back the last gauge value, if any was recorded.
    pub fn snapshot_gauge(&self, name: &str) -> Option<f64> {
        self.registry.lock().samples.get(name).map(|s| s.last)
    }
}

impl Default for TelemetryPort {
    fn default() -> Self {
        Self::noop()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn noop_port_never_panics() {
        let port = TelemetryPort::noop();
        let span = port.span("test", vec![("k", "v".into())]);
        span.set_attribute("k2", 1i64);
        port.counter("c").add(1, vec![]);
        port.histogram("h").record(1.0, vec![]);
        port.gauge("g").set(1.0, vec![]);
        assert_eq!(port.snapshot_count("c"), 0);
    }

    #[test]
    fn enabled_port_accumulates() {
        let port = TelemetryPort::enabled();
        port.counter("c").add(1, vec![]);
        port.counter("c").add(2, vec![]);
        assert_eq!(port.snapshot_count("c"), 3);

        port.gauge("g").set(42.0, vec![]);
        assert_eq!(port.snapshot_gauge("g"), Some(42.0));
    }

    #[test]
    fn record_exception_does_not_panic() {
        let port = TelemetryPort::noop();
        let err = std::io::Error::new(std::io::ErrorKind::Other, "boom");
        port.record_exception(&err, false);
    }
}
