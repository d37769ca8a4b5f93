//! Segment identity
//!
//! A segment is identified by its name, normalized to uppercase at every
//! read and write boundary. The numeric surrogate key only exists to join
//! membership rows inside the store.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

/// Case-normalized segment name
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SegmentName(String);

impl SegmentName {
    /// Create a segment name, normalizing it to uppercase
    pub fn new(name: impl AsRef<str>) -> Self {
        Self(name.as_ref().to_uppercase())
    }

    /// Get the normalized name
    #[inline]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Display for SegmentName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for SegmentName {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

impl From<String> for SegmentName {
    fn from(name: String) -> Self {
        Self::new(name)
    }
}

impl AsRef<str> for SegmentName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl Serialize for SegmentName {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.0)
    }
}

// Names arriving over the wire are normalized on the way in
impl<'de> Deserialize<'de> for SegmentName {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        String::deserialize(deserializer).map(Self::new)
    }
}

/// Store-internal surrogate key of a segment
///
/// Handed out by the store when a name is resolved and handed back when a
/// membership row is written. Never leaves the engine/store seam.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SegmentKey(i64);

impl SegmentKey {
    #[inline]
    pub const fn new(id: i64) -> Self {
        Self(id)
    }

    #[inline]
    pub const fn into_inner(self) -> i64 {
        self.0
    }
}
