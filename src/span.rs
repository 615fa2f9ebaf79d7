//! Scoped measurement of one executed unit of work
//!
//! An [`InstructionSpan`] is opened immediately before the execution engine
//! runs a node and dropped when the node finishes. The sessions that are
//! enabled when the span opens receive its datapoint when it is dropped, on
//! every exit path, including `?` returns and panic unwinding. Disabling a
//! session while a span is open does not stop that span from reporting.
//!
//! ```
//! use scriptprof::{InstructionSpan, ProfileRegistry, ScriptProfile, Source, SourceRange, SourceRef};
//! use std::sync::Arc;
//!
//! let registry = Arc::new(ProfileRegistry::new());
//! let mut profile = ScriptProfile::with_registry(registry.clone());
//! let source = SourceRef::new(Source::new("a.script", "a = 1\nb = a\n"));
//! let node = SourceRange::for_line(source.clone(), 2).unwrap();
//!
//! profile.enable();
//! {
//!     let _span = InstructionSpan::in_registry(&registry, &node);
//!     // run the node
//! }
//! profile.disable();
//!
//! assert_eq!(profile.dump_stats()[&source][&2].count, 1);
//! ```

use crate::datapoint::Datapoint;
use crate::registry::{Collector, ProfileRegistry, Sinks};
use crate::source::ProfiledNode;
use std::sync::Arc;

/// Guard that records one datapoint between its creation and its drop
///
/// Not `Clone`: one span always stands for exactly one interval.
#[must_use = "the span measures until it is dropped; binding it to `_` drops it immediately"]
#[derive(Debug)]
pub struct InstructionSpan {
    recording: Option<Recording>,
}

#[derive(Debug)]
struct Recording {
    datapoint: Datapoint,
    /// Sessions that were enabled when the span opened
    sinks: Sinks,
}

impl InstructionSpan {
    /// Open a span for `node` in the process-wide profiling domain
    pub fn new<N: ProfiledNode + ?Sized>(node: &N) -> Self {
        Self::in_registry(ProfileRegistry::global_ref(), node)
    }

    /// Open a span for `node` in a specific profiling domain
    ///
    /// If no session in `registry` is enabled this records nothing, allocates
    /// nothing, and never asks `node` for its source range.
    pub fn in_registry<N: ProfiledNode + ?Sized>(registry: &ProfileRegistry, node: &N) -> Self {
        if !registry.is_active() {
            return Self::disabled();
        }

        let sinks = registry.enabled_collectors();
        if sinks.is_empty() {
            return Self::disabled();
        }

        Self {
            recording: Some(Recording {
                datapoint: Datapoint::new(node.source_range()),
                sinks,
            }),
        }
    }

    /// Whether this span will deliver a datapoint when dropped
    pub fn is_recording(&self) -> bool {
        self.recording.is_some()
    }

    fn disabled() -> Self {
        Self { recording: None }
    }
}

impl Drop for InstructionSpan {
    fn drop(&mut self) {
        let Some(Recording {
            mut datapoint,
            sinks,
        }) = self.recording.take()
        else {
            return;
        };

        datapoint.complete();

        let Some((last, rest)) = sinks.split_last() else {
            return;
        };
        for sink in rest {
            deliver(sink, datapoint.clone());
        }
        deliver(last, datapoint);
    }
}

fn deliver(sink: &Collector, datapoint: Datapoint) {
    if let Err(e) = sink.push(datapoint) {
        tracing::error!("Dropping span datapoint: {}", e);
    }
}
