//! Sample data fixtures for testing.
//!
//! Enable the `test-fixtures` feature to access these helpers.
//!
//! # Example
//!
//! ```ignore
//! // In your Cargo.toml:
//! // [dev-dependencies]
//! // sense-events = { path = "../sense-events", features = ["test-fixtures"] }
//!
//! use sense_events::fixtures;
//!
//! let sounds = fixtures::sample_sounds();
//! ```

use crate::{AcousticEvent, PartitionId};

/// Returns sample acoustic events from the fixtures file.
///
/// Contains 7 events inserted between steps 0 and 9 around the origin:
/// - 1 detonation at the origin (full intensity)
/// - 2 footsteps from entity 101
/// - 1 impact, 1 structural, 1 vocal from entity 202
/// - 1 combat noise far to the north-east
pub fn sample_sounds() -> Vec<AcousticEvent> {
    let jsonl = include_str!("../tests/fixtures/sample_sounds.jsonl");
    jsonl
        .lines()
        .filter(|l| !l.trim().is_empty())
        .map(|l| {
            AcousticEvent::from_jsonl(l).unwrap_or_else(|e| {
                panic!("Failed to parse sound line: {}\nError: {}", l, e)
            })
        })
        .collect()
}

/// The partition the fixtures are recorded in.
pub fn sample_partition() -> PartitionId {
    PartitionId::from("overworld")
}
