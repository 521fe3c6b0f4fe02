//! # Record Identifiers
//!
//! Every stored record (user, product, customer, sale) is addressed by a
//! [`RecordId`]: a UUID v4 that is parsed once at the boundary and carried
//! as a typed value from then on.
//!
//! ```text
//! "550e8400-e29b-41d4-a716-446655440000" ──parse──► RecordId ──► repository
//! "not-an-id"                            ──parse──► CoreError::InvalidReference
//! ```
//!
//! The stored and serialized form is the lowercase hyphenated string.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use ts_rs::TS;
use uuid::Uuid;

use crate::error::CoreError;

/// Validated identifier of a stored record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, TS)]
#[ts(export)]
pub struct RecordId(Uuid);

impl RecordId {
    /// Generates a fresh identifier for a new record.
    pub fn new() -> Self {
        RecordId(Uuid::new_v4())
    }

    /// Parses an identifier, failing with `InvalidReference` on bad input.
    ///
    /// ## Example
    /// ```rust
    /// use stockroom_core::RecordId;
    ///
    /// assert!(RecordId::parse("550e8400-e29b-41d4-a716-446655440000").is_ok());
    /// assert!(RecordId::parse("not-an-id").is_err());
    /// ```
    pub fn parse(raw: &str) -> Result<Self, CoreError> {
        Uuid::parse_str(raw.trim())
            .map(RecordId)
            .map_err(|_| CoreError::InvalidReference(raw.to_string()))
    }
}

impl Default for RecordId {
    fn default() -> Self {
        RecordId::new()
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.hyphenated())
    }
}

impl FromStr for RecordId {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        RecordId::parse(s)
    }
}

/// Used by `#[sqlx(try_from = "String")]` when decoding rows.
impl TryFrom<String> for RecordId {
    type Error = CoreError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        RecordId::parse(&value)
    }
}

impl Serialize for RecordId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for RecordId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        RecordId::parse(&raw).map_err(serde::de::Error::custom)
    }
}
