//! Decision Log
//!
//! Append-only JSONL log of perception transitions.

use bevy_ecs::prelude::*;
use std::collections::HashMap;
use std::fs::{File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::Path;

use sense_events::{DecisionRecord, Transition};

/// Resource for logging decisions to a JSONL file
#[derive(Resource)]
pub struct DecisionLog {
    writer: Option<BufWriter<File>>,
    record_count: u64,
    by_transition: HashMap<Transition, u64>,
}

impl DecisionLog {
    /// Create a new log writing to the specified path
    pub fn new(path: impl AsRef<Path>) -> std::io::Result<Self> {
        if let Some(parent) = path.as_ref().parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        let file = OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(true)
            .open(path)?;

        Ok(Self {
            writer: Some(BufWriter::new(file)),
            record_count: 0,
            by_transition: HashMap::new(),
        })
    }

    /// Create a log that only counts (for testing)
    pub fn null() -> Self {
        Self {
            writer: None,
            record_count: 0,
            by_transition: HashMap::new(),
        }
    }

    pub fn record_count(&self) -> u64 {
        self.record_count
    }

    /// Number of logged records with the given transition
    pub fn count(&self, transition: Transition) -> u64 {
        self.by_transition.get(&transition).copied().unwrap_or(0)
    }

    pub fn log(&mut self, record: &DecisionRecord) -> std::io::Result<()> {
        self.record_count += 1;
        *self.by_transition.entry(record.transition).or_default() += 1;
        if let Some(ref mut writer) = self.writer {
            let json = record.to_jsonl()?;
            writeln!(writer, "{}", json)?;
        }
        Ok(())
    }

    pub fn flush(&mut self) -> std::io::Result<()> {
        if let Some(ref mut writer) = self.writer {
            writer.flush()?;
        }
        Ok(())
    }
}

impl Drop for DecisionLog {
    fn drop(&mut self) {
        if let Err(e) = self.flush() {
            tracing::warn!("failed to flush decision log: {}", e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sense_events::{AgentKey, Channel, Coord, PerceptionTarget};
    use std::io::BufRead;
    use tempfile::tempdir;

    #[test]
    fn test_decision_logging() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("logs").join("decisions.jsonl");
        let mut log = DecisionLog::new(&path).unwrap();

        let record = DecisionRecord::new(12, AgentKey::from_u128(5), Transition::Acquired).with_target(
            PerceptionTarget::at_position(Coord::new(1.5, 64.5, 1.5), Channel::Heat, 0.4),
        );
        log.log(&record).unwrap();
        log.log(&DecisionRecord::new(30, AgentKey::from_u128(5), Transition::Reached))
            .unwrap();
        log.flush().unwrap();

        let file = File::open(&path).unwrap();
        let lines: Vec<String> = std::io::BufReader::new(file)
            .lines()
            .map(|l| l.unwrap())
            .collect();
        assert_eq!(lines.len(), 2);
        assert_eq!(DecisionRecord::from_jsonl(&lines[0]).unwrap(), record);
    }

    #[test]
    fn test_null_log_counts() {
        let mut log = DecisionLog::null();
        log.log(&DecisionRecord::new(1, AgentKey::from_u128(1), Transition::Lost))
            .unwrap();
        log.log(&DecisionRecord::new(2, AgentKey::from_u128(2), Transition::Lost))
            .unwrap();

        assert_eq!(log.record_count(), 2);
        assert_eq!(log.count(Transition::Lost), 2);
        assert_eq!(log.count(Transition::Acquired), 0);
    }
}
