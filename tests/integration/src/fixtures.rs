//! Test fixtures and data generators
//!
//! Provides reusable request and response shapes for integration tests.

use std::sync::atomic::{AtomicI64, Ordering};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Counter for unique test data
static COUNTER: AtomicI64 = AtomicI64::new(1);

/// Get a unique suffix for test data
///
/// Mixed with the current time so that runs against a persistent database
/// do not collide.
pub fn unique_suffix() -> i64 {
    let base = Utc::now().timestamp_millis() % 10_000_000_000;
    base * 1_000 + COUNTER.fetch_add(1, Ordering::SeqCst)
}

/// `{"id": N}`
#[derive(Debug, Clone, Copy, Serialize)]
pub struct UserRef {
    pub id: i64,
}

impl UserRef {
    pub fn unique() -> Self {
        Self { id: unique_suffix() }
    }
}

/// `{"name": "..."}`, used in requests and responses
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SegmentRef {
    pub name: String,
}

impl SegmentRef {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }

    pub fn unique() -> Self {
        Self::new(format!("SEG_{}", unique_suffix()))
    }
}

/// Body of the user-segments endpoints
#[derive(Debug, Clone, Serialize)]
pub struct UserSegments {
    pub id: i64,
    pub segments: Vec<SegmentRef>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date_end: Option<DateTime<Utc>>,
}

impl UserSegments {
    pub fn new(id: i64, names: &[&str]) -> Self {
        Self {
            id,
            segments: names.iter().map(|n| SegmentRef::new(*n)).collect(),
            date_end: None,
        }
    }

    pub fn until(mut self, date_end: DateTime<Utc>) -> Self {
        self.date_end = Some(date_end);
        self
    }
}

/// Sorted segment names from a user-segments response
pub fn names_of(segments: &[SegmentRef]) -> Vec<String> {
    let mut names: Vec<String> = segments.iter().map(|s| s.name.clone()).collect();
    names.sort();
    names
}
