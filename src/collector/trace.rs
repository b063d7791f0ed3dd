//! Per-operation trace events emitted by [`DocumentCollector`](super::DocumentCollector).
//!
//! Every event is logged as one JSON line at `trace` on the `docgate::trace` target.
//! Tests can additionally collect the typed events raised on their own thread with
//! [`capture`]; a current-thread tokio runtime keeps collector futures on that thread.

use serde::{Deserialize, Serialize};
use std::cell::RefCell;

pub const TRACE_TARGET: &str = "docgate::trace";

thread_local! {
    static CAPTURED: RefCell<Option<Vec<OpTrace>>> = const { RefCell::new(None) };
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CollectorOp {
    Find,
    FindAll,
    Count,
    Exists,
    Aggregate,
    Distinct,
}

/// What one collector call did.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OpTrace {
    pub op: CollectorOp,
    /// A non-empty scope was conjoined with the caller filter.
    pub scoped: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub page: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub limit: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub returned: Option<u64>,
}

impl OpTrace {
    #[must_use]
    pub fn new(op: CollectorOp, scoped: bool) -> Self {
        Self { op, scoped, page: None, limit: None, total: None, returned: None }
    }

    #[must_use]
    pub fn paged(mut self, page: u64, limit: u64) -> Self {
        self.page = Some(page);
        self.limit = Some(limit);
        self
    }

    #[must_use]
    pub fn total(mut self, total: u64) -> Self {
        self.total = Some(total);
        self
    }

    #[must_use]
    pub fn returned(mut self, n: usize) -> Self {
        self.returned = Some(u64::try_from(n).unwrap_or(u64::MAX));
        self
    }

    pub(crate) fn emit(self) {
        if log::log_enabled!(target: TRACE_TARGET, log::Level::Trace) {
            match serde_json::to_string(&self) {
                Ok(line) => log::trace!(target: TRACE_TARGET, "{line}"),
                Err(e) => log::warn!(target: TRACE_TARGET, "unserializable trace {self:?}: {e}"),
            }
        }
        CAPTURED.with(|c| {
            if let Some(buf) = c.borrow_mut().as_mut() {
                buf.push(self);
            }
        });
    }
}

/// Collects trace events raised on the current thread until dropped.
pub struct TraceCapture {
    _private: (),
}

/// Starts collecting trace events for the current thread, discarding any earlier capture.
#[must_use]
pub fn capture() -> TraceCapture {
    CAPTURED.with(|c| *c.borrow_mut() = Some(Vec::new()));
    TraceCapture { _private: () }
}

impl TraceCapture {
    /// Removes and returns the events collected so far.
    pub fn take(&self) -> Vec<OpTrace> {
        CAPTURED.with(|c| c.borrow_mut().as_mut().map(std::mem::take).unwrap_or_default())
    }

    pub fn ops(&self) -> Vec<CollectorOp> {
        CAPTURED.with(|c| c.borrow().iter().flatten().map(|t| t.op).collect())
    }
}

impl Drop for TraceCapture {
    fn drop(&mut self) {
        CAPTURED.with(|c| *c.borrow_mut() = None);
    }
}
