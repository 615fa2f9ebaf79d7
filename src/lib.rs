//! scriptprof - per-line wall-clock profiling for interpreted scripts
//!
//! This library measures how much time an execution engine spends on each
//! source line of the script it runs. The engine wraps every executed node in
//! an [`InstructionSpan`]; a [`ScriptProfile`] collects the spans opened while
//! it is enabled and aggregates them by source unit, then by line number.
//! With no session enabled a span costs one atomic load.

pub mod config;
pub mod datapoint;
pub mod error;
pub mod profile;
pub mod registry;
pub mod source;
pub mod span;

pub use config::ProfileConfig;
pub use datapoint::Datapoint;
pub use error::ProfileError;
pub use profile::{aggregate, InstructionStats, LineMap, ScriptProfile, Stats};
pub use registry::{measure, ProfileRegistry};
pub use source::{ProfiledNode, Source, SourceRange, SourceRef};
pub use span::InstructionSpan;
