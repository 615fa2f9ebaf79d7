//! One measured interval attributed to a source range

use crate::error::{ProfileError, Result};
use crate::source::SourceRange;
use std::time::{Duration, Instant};

/// Start/end timestamps of one executed unit of work
///
/// `start` is taken from the monotonic clock when the datapoint is created.
/// `end` stays unset until [`Datapoint::complete`] is called; a datapoint is
/// only accepted by a session once it is complete.
#[derive(Debug, Clone)]
pub struct Datapoint {
    source_range: SourceRange,
    start: Instant,
    end: Option<Instant>,
}

impl Datapoint {
    /// Start measuring `source_range` now
    pub fn new(source_range: SourceRange) -> Self {
        Self {
            source_range,
            start: Instant::now(),
            end: None,
        }
    }

    /// Build a datapoint from timestamps taken elsewhere
    pub fn from_parts(source_range: SourceRange, start: Instant, end: Option<Instant>) -> Self {
        Self {
            source_range,
            start,
            end,
        }
    }

    /// Stamp the end timestamp
    ///
    /// Only the first call has an effect; the interval is fixed once closed.
    pub fn complete(&mut self) {
        if self.end.is_none() {
            self.end = Some(Instant::now());
        }
    }

    pub fn source_range(&self) -> &SourceRange {
        &self.source_range
    }

    pub fn start(&self) -> Instant {
        self.start
    }

    pub fn end(&self) -> Option<Instant> {
        self.end
    }

    pub fn is_complete(&self) -> bool {
        self.end.is_some()
    }

    /// Time between start and end
    ///
    /// # Errors
    /// `IncompleteDatapoint` if the end is unset, `NegativeElapsed` if the end
    /// precedes the start.
    pub fn elapsed(&self) -> Result<Duration> {
        let end = self.end.ok_or_else(|| ProfileError::IncompleteDatapoint {
            location: self.source_range.to_string(),
        })?;
        end.checked_duration_since(self.start)
            .ok_or_else(|| ProfileError::NegativeElapsed {
                location: self.source_range.to_string(),
            })
    }
}
