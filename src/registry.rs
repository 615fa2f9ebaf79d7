//! Per-domain set of enabled profiling sessions
//!
//! Spans do not hold a reference to a particular session. When a span opens it
//! asks its registry which sessions are enabled at that moment and delivers its
//! datapoint to exactly those sessions when it closes. A process-wide registry
//! is available through [`ProfileRegistry::global`]; embedders that want
//! isolated profiling domains create their own.
//!
//! # Performance
//!
//! With no session enabled, opening a span costs a single atomic load.

use crate::datapoint::Datapoint;
use crate::error::Result;
use crate::source::ProfiledNode;
use crate::span::InstructionSpan;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, OnceLock, PoisonError, RwLock};

/// Pending datapoints of one session, shared with in-flight spans
#[derive(Debug, Default)]
pub(crate) struct Collector {
    datapoints: Mutex<Vec<Datapoint>>,
}

impl Collector {
    pub(crate) fn with_capacity(capacity: usize) -> Self {
        Self {
            datapoints: Mutex::new(Vec::with_capacity(capacity)),
        }
    }

    /// Append a datapoint after checking that its interval is well formed
    pub(crate) fn push(&self, datapoint: Datapoint) -> Result<()> {
        datapoint.elapsed()?;
        self.lock().push(datapoint);
        Ok(())
    }

    /// Take every pending datapoint, leaving the collector empty
    pub(crate) fn drain(&self) -> Vec<Datapoint> {
        std::mem::take(&mut *self.lock())
    }

    pub(crate) fn len(&self) -> usize {
        self.lock().len()
    }

    // A panic inside an instrumented unit must not stop the rest from being profiled.
    fn lock(&self) -> MutexGuard<'_, Vec<Datapoint>> {
        self.datapoints
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }
}

/// Collectors of the sessions enabled at one instant
///
/// Rebuilt on enable/disable; spans share it with a single refcount bump.
pub(crate) type Sinks = Arc<[Arc<Collector>]>;

/// Set of sessions that new spans report to
#[derive(Debug)]
pub struct ProfileRegistry {
    /// Mirrors `enabled.len()` for the lock-free fast path
    active: AtomicUsize,
    enabled: RwLock<Sinks>,
}

impl Default for ProfileRegistry {
    fn default() -> Self {
        Self {
            active: AtomicUsize::new(0),
            enabled: RwLock::new(Arc::from(Vec::new())),
        }
    }
}

impl ProfileRegistry {
    /// Create an isolated profiling domain
    pub fn new() -> Self {
        Self::default()
    }

    /// The process-wide profiling domain
    pub fn global() -> Arc<ProfileRegistry> {
        Self::global_ref().clone()
    }

    /// Borrowed handle to the process-wide domain, for the per-span path
    pub(crate) fn global_ref() -> &'static Arc<ProfileRegistry> {
        static GLOBAL: OnceLock<Arc<ProfileRegistry>> = OnceLock::new();
        GLOBAL.get_or_init(|| Arc::new(ProfileRegistry::new()))
    }

    /// Whether any session in this domain is enabled
    pub fn is_active(&self) -> bool {
        self.active.load(Ordering::Acquire) > 0
    }

    /// Number of enabled sessions in this domain
    pub fn active_sessions(&self) -> usize {
        self.active.load(Ordering::Acquire)
    }

    /// Run `f` inside a span for `node`, returning its result
    ///
    /// # Example
    /// ```
    /// use scriptprof::{ProfileRegistry, ScriptProfile, Source, SourceRange, SourceRef};
    /// use std::sync::Arc;
    ///
    /// let registry = Arc::new(ProfileRegistry::new());
    /// let mut profile = ScriptProfile::with_registry(registry.clone());
    /// let source = SourceRef::new(Source::new("a.script", "x = 1\n"));
    /// let line = SourceRange::for_line(source.clone(), 1).unwrap();
    ///
    /// profile.enable();
    /// let value = registry.measure(&line, || 40 + 2);
    /// profile.disable();
    ///
    /// assert_eq!(value, 42);
    /// assert_eq!(profile.dump_stats()[&source][&1].count, 1);
    /// ```
    pub fn measure<N, F, R>(&self, node: &N, f: F) -> R
    where
        N: ProfiledNode + ?Sized,
        F: FnOnce() -> R,
    {
        let _span = InstructionSpan::in_registry(self, node);
        f()
    }

    pub(crate) fn register(&self, collector: &Arc<Collector>) {
        let mut enabled = self.enabled.write().unwrap_or_else(PoisonError::into_inner);
        if !enabled.iter().any(|c| Arc::ptr_eq(c, collector)) {
            let mut next = enabled.to_vec();
            next.push(Arc::clone(collector));
            *enabled = Arc::from(next);
            self.active.store(enabled.len(), Ordering::Release);
            tracing::debug!(active = enabled.len(), "profile session registered");
        }
    }

    pub(crate) fn unregister(&self, collector: &Arc<Collector>) {
        let mut enabled = self.enabled.write().unwrap_or_else(PoisonError::into_inner);
        if enabled.iter().any(|c| Arc::ptr_eq(c, collector)) {
            let next: Vec<_> = enabled
                .iter()
                .filter(|c| !Arc::ptr_eq(c, collector))
                .cloned()
                .collect();
            *enabled = Arc::from(next);
            self.active.store(enabled.len(), Ordering::Release);
            tracing::debug!(active = enabled.len(), "profile session unregistered");
        }
    }

    /// Collectors of the sessions enabled right now
    pub(crate) fn enabled_collectors(&self) -> Sinks {
        Arc::clone(&self.enabled.read().unwrap_or_else(PoisonError::into_inner))
    }
}

/// Run `f` inside a span for `node` in the process-wide domain
pub fn measure<N, F, R>(node: &N, f: F) -> R
where
    N: ProfiledNode + ?Sized,
    F: FnOnce() -> R,
{
    ProfileRegistry::global_ref().measure(node, f)
}
