//! Readiness probe capability
//!
//! A probe answers one question: "can this process handle work right now?"
//! Probes are supplied by the embedding application and registered with
//! [`HealthCheck::add_readiness_probe`](crate::server::HealthCheck::add_readiness_probe)
//! before the health check runs.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Synchronous readiness capability
///
/// `is_ready` may be slow or block; it is always called from the blocking
/// pool, never from an async worker. A probe has no error channel: any
/// failure to determine readiness must be reported as `false`.
///
/// There is no per-probe timeout. A probe that never returns stalls every
/// later evaluation pass.
pub trait ReadinessProbe: Send + Sync {
    /// Report whether this probe's dependency is ready
    fn is_ready(&self) -> bool;

    /// Name used when logging a failed pass
    fn name(&self) -> &str {
        "probe"
    }
}

impl<P> ReadinessProbe for Arc<P>
where
    P: ReadinessProbe + ?Sized,
{
    fn is_ready(&self) -> bool {
        (**self).is_ready()
    }

    fn name(&self) -> &str {
        (**self).name()
    }
}

/// Probe backed by a closure, see [`from_fn`]
pub struct FnProbe<F> {
    name: Arc<str>,
    check: F,
}

/// Wrap a closure as a named probe
pub fn from_fn<F>(name: impl Into<Arc<str>>, check: F) -> FnProbe<F>
where
    F: Fn() -> bool + Send + Sync,
{
    FnProbe {
        name: name.into(),
        check,
    }
}

impl<F> ReadinessProbe for FnProbe<F>
where
    F: Fn() -> bool + Send + Sync,
{
    fn is_ready(&self) -> bool {
        (self.check)()
    }

    fn name(&self) -> &str {
        &self.name
    }
}

/// Probe the application flips itself
///
/// Clones share state, so one clone can be registered while another is kept
/// to mark the gate ready (e.g. once a cache is warmed).
#[derive(Debug, Clone)]
pub struct ManualProbe {
    name: Arc<str>,
    ready: Arc<AtomicBool>,
}

impl ManualProbe {
    /// Create a new manual probe (initially not ready)
    pub fn new(name: impl Into<Arc<str>>) -> Self {
        Self {
            name: name.into(),
            ready: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Set the reported readiness
    pub fn set_ready(&self, ready: bool) {
        self.ready.store(ready, Ordering::SeqCst);
    }
}

impl ReadinessProbe for ManualProbe {
    fn is_ready(&self) -> bool {
        self.ready.load(Ordering::SeqCst)
    }

    fn name(&self) -> &str {
        &self.name
    }
}
