// Shared helpers for integration tests
//
// A tiny stand-in for an execution engine: each `Step` is one node of a
// script that sleeps for a fixed time when run.

#![allow(dead_code)]

use scriptprof::{InstructionSpan, ProfileRegistry, ProfiledNode, Source, SourceRange, SourceRef};
use std::thread;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

/// Install a test-friendly subscriber once; honours RUST_LOG
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

pub const A_SCRIPT: &str = "\
def main():
    load()
    total = 0
    for x in range(3):
        total += x
    print(total)
    return total
";

pub fn a_script() -> SourceRef {
    SourceRef::new(Source::new("a.script", A_SCRIPT))
}

/// Source with at least `lines` lines, so any line up to that number exists
pub fn numbered_source(name: &str, lines: usize) -> SourceRef {
    let text: String = (1..=lines).map(|i| format!("line_{}()\n", i)).collect();
    SourceRef::new(Source::new(name, text))
}

/// One executable node of a script
#[derive(Debug, Clone)]
pub struct Step {
    pub range: SourceRange,
    pub cost: Duration,
}

impl Step {
    pub fn on_line(source: &SourceRef, line: usize, cost: Duration) -> Self {
        Self {
            range: SourceRange::for_line(source.clone(), line).expect("line exists in source"),
            cost,
        }
    }
}

impl ProfiledNode for Step {
    fn source_range(&self) -> SourceRange {
        self.range.clone()
    }
}

/// Run each step inside a span, the way an interpreter loop would
pub fn run(registry: &ProfileRegistry, steps: &[Step]) {
    for step in steps {
        let _span = InstructionSpan::in_registry(registry, step);
        if !step.cost.is_zero() {
            thread::sleep(step.cost);
        }
    }
}
