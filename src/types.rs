//! Core record types for bakerboard

use std::fmt;

use chrono::{DateTime, Duration, SubsecRound, Utc};
use serde::{Deserialize, Serialize};

/// Primary key type shared by every table
pub type RecordId = i64;

/// Timestamps are stored and served with microsecond precision
const TIMESTAMP_DIGITS: u16 = 6;

/// Current UTC time truncated to the stored precision
pub fn timestamp_now() -> DateTime<Utc> {
    Utc::now().trunc_subsecs(TIMESTAMP_DIGITS)
}

/// The record types managed by the store, used in error reporting
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordKind {
    Message,
    Bakery,
    BakedGood,
}

impl fmt::Display for RecordKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            RecordKind::Message => "Message",
            RecordKind::Bakery => "Bakery",
            RecordKind::BakedGood => "Baked good",
        };
        f.write_str(name)
    }
}

/// A chat message posted by a user
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Message {
    pub id: RecordId,
    pub body: String,
    pub username: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Message {
    /// Timestamp to record for the next mutation of this message.
    ///
    /// Always strictly later than the current `updated_at`, even when the
    /// clock has not advanced past it at the stored precision.
    pub fn next_update_time(&self) -> DateTime<Utc> {
        let now = timestamp_now();
        if now > self.updated_at {
            now
        } else {
            self.updated_at + Duration::microseconds(1)
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Bakery {
    pub id: RecordId,
    pub name: String,
}

/// A baked good, owned by exactly one bakery
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct BakedGood {
    pub id: RecordId,
    pub name: String,
    pub bakery_id: RecordId,
}
