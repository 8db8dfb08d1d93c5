use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::VecDeque;
use std::sync::Mutex;

const DEFAULT_CAPACITY: usize = 100;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    /// One source could not be fetched or parsed
    Source,
    /// A whole aggregation was abandoned
    Aggregation,
}

#[derive(Debug, Clone, Serialize)]
pub struct FetchFailure {
    pub kind: FailureKind,
    pub url: Option<String>,
    pub scope: String,
    pub error: String,
    pub at: DateTime<Utc>,
}

/// Bounded record of failures that were absorbed instead of returned.
#[derive(Debug)]
pub struct Diagnostics {
    capacity: usize,
    failures: Mutex<VecDeque<FetchFailure>>,
}

impl Diagnostics {
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            capacity: capacity.max(1),
            failures: Mutex::new(VecDeque::new()),
        }
    }

    pub fn record(&self, failure: FetchFailure) {
        let mut failures = self.failures.lock().unwrap_or_else(|e| e.into_inner());
        if failures.len() == self.capacity {
            failures.pop_back();
        }
        failures.push_front(failure);
    }

    /// Most recent first.
    pub fn recent(&self) -> Vec<FetchFailure> {
        let failures = self.failures.lock().unwrap_or_else(|e| e.into_inner());
        failures.iter().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.failures.lock().unwrap_or_else(|e| e.into_inner()).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for Diagnostics {
    fn default() -> Self {
        Self::new()
    }
}
