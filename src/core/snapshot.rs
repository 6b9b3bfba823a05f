//! Snapshot store
//!
//! Holds the most recent process list. A snapshot is only ever replaced as a
//! whole; sort and filter read it and produce derived orderings.

use std::collections::HashSet;

use chrono::{DateTime, Local};
use tracing::warn;

use super::process::{Pid, ProcessRecord};

/// The latest process list plus bookkeeping about when it arrived
#[derive(Debug, Clone, Default)]
pub struct Snapshot {
    records: Vec<ProcessRecord>,
    /// Number of successful replacements since startup
    generation: u64,
    /// Wall-clock time of the last replacement
    taken_at: Option<DateTime<Local>>,
}

impl Snapshot {
    /// Create the empty startup snapshot
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the whole snapshot.
    ///
    /// Records with a pid already seen earlier in `records` are dropped so
    /// pids stay unique within a snapshot. Returns the number of dropped
    /// duplicates.
    pub fn replace(&mut self, records: Vec<ProcessRecord>) -> usize {
        let incoming = records.len();
        let mut seen: HashSet<Pid> = HashSet::with_capacity(incoming);
        let unique: Vec<ProcessRecord> = records
            .into_iter()
            .filter(|r| seen.insert(r.pid))
            .collect();

        let dropped = incoming - unique.len();
        if dropped > 0 {
            warn!(dropped, "duplicate pids dropped from process snapshot");
        }

        self.records = unique;
        self.generation += 1;
        self.taken_at = Some(Local::now());
        dropped
    }

    /// Records in source order
    pub fn records(&self) -> &[ProcessRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    #[cfg(test)]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn taken_at(&self) -> Option<DateTime<Local>> {
        self.taken_at
    }

    /// Find a record by pid
    pub fn find(&self, pid: Pid) -> Option<&ProcessRecord> {
        self.records.iter().find(|r| r.pid == pid)
    }

    pub fn contains(&self, pid: Pid) -> bool {
        self.find(pid).is_some()
    }
}
