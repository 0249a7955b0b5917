//! Conversational memory: a capacity-bounded, timestamp-ordered log with
//! similarity retrieval.

pub mod ring;
pub mod types;

pub use ring::MemoryRing;
pub use types::{MemoryDocument, MemoryEntry, MemoryMatch, MemoryStats};

/// Current wall-clock time as unix seconds with millisecond precision.
pub fn now_secs() -> f64 {
    chrono::Utc::now().timestamp_millis() as f64 / 1000.0
}
