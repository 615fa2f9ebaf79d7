//! Profiling session: enable/disable window control and per-line aggregation
//!
//! A [`ScriptProfile`] collects datapoints only while it is enabled:
//!
//! ```
//! use scriptprof::{ProfileRegistry, ScriptProfile, Source, SourceRange, SourceRef};
//! use std::sync::Arc;
//!
//! let registry = Arc::new(ProfileRegistry::new());
//! let mut profile = ScriptProfile::with_registry(registry.clone());
//! let source = SourceRef::new(Source::new("a.script", "a = 1\nb = 2\n"));
//! let first = SourceRange::for_line(source.clone(), 1).unwrap();
//!
//! registry.measure(&first, || ()); // not recorded
//! profile.enable();
//! registry.measure(&first, || ());
//! profile.disable();
//!
//! let stats = profile.dump_stats();
//! assert_eq!(stats[&source][&1].count, 1);
//! ```
//!
//! Stats are aggregated per source unit, then by line number. Call
//! [`ScriptProfile::dump_stats`] after the profiled section has finished; spans
//! still open at that point are folded on the next call.

use crate::config::ProfileConfig;
use crate::datapoint::Datapoint;
use crate::error::Result;
use crate::registry::{Collector, ProfileRegistry};
use crate::source::SourceRef;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

/// Accumulated timing for one source line
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InstructionStats {
    /// Number of completed datapoints folded in
    pub count: u64,
    /// Sum of their elapsed times
    pub duration: Duration,
}

impl InstructionStats {
    pub fn record(&mut self, elapsed: Duration) {
        self.count += 1;
        self.duration += elapsed;
    }

    /// Mean duration per execution (zero when nothing was recorded)
    pub fn average(&self) -> Duration {
        match u32::try_from(self.count) {
            Ok(0) => Duration::ZERO,
            Ok(count) => self.duration / count,
            Err(_) => Duration::from_secs_f64(self.duration.as_secs_f64() / self.count as f64),
        }
    }
}

/// Stats for one source unit, keyed by line number
pub type LineMap = BTreeMap<usize, InstructionStats>;

/// Stats for every source unit seen by a session
pub type Stats = BTreeMap<SourceRef, LineMap>;

/// Fold `datapoints` into `stats`, returning how many were folded
///
/// Each datapoint counts once toward the line its source range starts on.
/// Malformed datapoints are skipped and logged.
pub fn aggregate<I>(stats: &mut Stats, datapoints: I) -> usize
where
    I: IntoIterator<Item = Datapoint>,
{
    let mut folded = 0;
    for datapoint in datapoints {
        let elapsed = match datapoint.elapsed() {
            Ok(elapsed) => elapsed,
            Err(e) => {
                tracing::error!("Skipping datapoint during aggregation: {}", e);
                continue;
            }
        };

        let range = datapoint.source_range();
        stats
            .entry(range.source().clone())
            .or_default()
            .entry(range.line())
            .or_default()
            .record(elapsed);
        folded += 1;
    }
    folded
}

/// A profiling session
///
/// Dropping the session disables it.
#[derive(Debug)]
pub struct ScriptProfile {
    registry: Arc<ProfileRegistry>,
    collector: Arc<Collector>,
    enabled: bool,
    stats: Stats,
}

impl ScriptProfile {
    /// Create a disabled session in the process-wide profiling domain
    pub fn new() -> Self {
        Self::with_registry(ProfileRegistry::global())
    }

    /// Create a disabled session in the given profiling domain
    pub fn with_registry(registry: Arc<ProfileRegistry>) -> Self {
        Self::build(registry, 0)
    }

    /// Create a session in the process-wide domain from configuration
    pub fn from_config(config: &ProfileConfig) -> Self {
        let mut profile = Self::build(ProfileRegistry::global(), config.initial_capacity);
        if config.enabled {
            profile.enable();
        }
        profile
    }

    fn build(registry: Arc<ProfileRegistry>, capacity: usize) -> Self {
        Self {
            registry,
            collector: Arc::new(Collector::with_capacity(capacity)),
            enabled: false,
            stats: Stats::new(),
        }
    }

    /// Start recording spans opened from now on
    pub fn enable(&mut self) {
        if !self.enabled {
            self.registry.register(&self.collector);
            self.enabled = true;
            tracing::debug!("script profile enabled");
        }
    }

    /// Stop recording spans opened from now on
    ///
    /// Spans already open keep recording and still report when they close.
    pub fn disable(&mut self) {
        if self.enabled {
            self.registry.unregister(&self.collector);
            self.enabled = false;
            tracing::debug!("script profile disabled");
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Hand a completed datapoint to this session
    ///
    /// Accepted whether or not the session is enabled.
    ///
    /// # Errors
    /// Returns `IncompleteDatapoint` or `NegativeElapsed` for a malformed
    /// datapoint; the session is left unchanged.
    pub fn add_datapoint(&self, datapoint: Datapoint) -> Result<()> {
        self.collector.push(datapoint)
    }

    /// Number of datapoints not yet folded into the stats
    pub fn pending_len(&self) -> usize {
        self.collector.len()
    }

    /// Fold pending datapoints into the stats and return them
    ///
    /// Should not be called from inside a profiled section. Repeated calls
    /// with nothing new recorded in between return the same stats.
    pub fn dump_stats(&mut self) -> &Stats {
        let pending = self.collector.drain();
        if !pending.is_empty() {
            let folded = aggregate(&mut self.stats, pending);
            tracing::trace!(folded, sources = self.stats.len(), "aggregated datapoints");
        }
        &self.stats
    }
}

impl Default for ScriptProfile {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for ScriptProfile {
    fn drop(&mut self) {
        self.disable();
        let pending = self.collector.len();
        if pending > 0 {
            tracing::warn!(pending, "script profile dropped with datapoints never aggregated");
        }
    }
}
