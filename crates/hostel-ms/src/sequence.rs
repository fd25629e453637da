//! Named, monotonic counters used to number approved records.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use tracing::debug;

/// Counter consumed by student approval.
pub const STUDENT_SEQUENCE_CODE: &str = "hms.student.code";

/// Allocates the next value of a named counter.
///
/// Implementations must hand out strictly increasing values per code and never reuse one,
/// even when several callers allocate concurrently.
pub trait SequenceService: Send + Sync {
    fn next_value(&self, code: &str) -> Result<u64, SequenceError>;
}

#[derive(Debug, thiserror::Error)]
pub enum SequenceError {
    #[error("no sequence registered under code '{0}'")]
    Unknown(String),
    #[error("sequence '{0}' is exhausted")]
    Exhausted(String),
    #[error("sequence store unavailable: {0}")]
    Unavailable(String),
}

/// Process-local counters keyed by code.
#[derive(Debug, Default, Clone)]
pub struct InMemorySequence {
    counters: Arc<Mutex<HashMap<String, u64>>>,
}

impl InMemorySequence {
    /// Registers the counters this crate consumes, each starting at 1.
    pub fn standard() -> Self {
        Self::starting_at(1)
    }

    /// Standard counters with student numbering starting at `student_code_start`.
    pub fn starting_at(student_code_start: u64) -> Self {
        Self::with_counters([(STUDENT_SEQUENCE_CODE, student_code_start)])
    }

    /// Counters keyed by code; each value is the first one that code hands out.
    pub fn with_counters<'a, I>(counters: I) -> Self
    where
        I: IntoIterator<Item = (&'a str, u64)>,
    {
        let counters = counters
            .into_iter()
            .map(|(code, next)| (code.to_string(), next))
            .collect::<HashMap<_, _>>();
        Self {
            counters: Arc::new(Mutex::new(counters)),
        }
    }

    /// Value the next allocation would return, without consuming it.
    pub fn peek(&self, code: &str) -> Option<u64> {
        self.counters.lock().ok()?.get(code).copied()
    }
}

impl SequenceService for InMemorySequence {
    fn next_value(&self, code: &str) -> Result<u64, SequenceError> {
        let mut guard = self
            .counters
            .lock()
            .map_err(|_| SequenceError::Unavailable("sequence lock poisoned".to_string()))?;
        let slot = guard
            .get_mut(code)
            .ok_or_else(|| SequenceError::Unknown(code.to_string()))?;

        let value = *slot;
        *slot = value
            .checked_add(1)
            .ok_or_else(|| SequenceError::Exhausted(code.to_string()))?;

        debug!(code, value, "sequence value allocated");
        Ok(value)
    }
}
