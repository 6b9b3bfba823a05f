//! Linux platform implementation
//!
//! Reads the process list from the /proc filesystem. CPU usage is the change
//! in a process's user+system ticks since the previous sample, normalized by
//! the number of CPUs; a process seen for the first time reports 0.

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Instant;

use procfs::{CurrentSI, KernelStats};
use tracing::{debug, warn};

use super::ProcessSource;
use crate::core::{Metric, Pid, ProcessRecord, SourceError};

const UNKNOWN_USER: &str = "Unknown";
const UNKNOWN_NAME: &str = "Unknown Name";
const PARENT_NOT_FOUND: &str = "Not Found";

/// Users table for caching UID -> username mappings
#[derive(Debug, Default)]
struct UsersTable {
    users: HashMap<u32, Option<String>>,
}

impl UsersTable {
    /// Get username for a UID, caching the result
    fn get_username(&mut self, uid: u32) -> &str {
        self.users
            .entry(uid)
            .or_insert_with(|| {
                users::get_user_by_uid(uid).map(|u| u.name().to_string_lossy().to_string())
            })
            .as_deref()
            .unwrap_or(UNKNOWN_USER)
    }
}

/// Per-process tick counts from the previous sample
#[derive(Debug, Default)]
struct SamplerState {
    prev_ticks: HashMap<Pid, u64>,
    prev_sample: Option<Instant>,
    users: UsersTable,
}

/// One process as read from /proc/PID/stat, before parent names are known
struct RawProcess {
    pid: Pid,
    ppid: Pid,
    comm: String,
    ticks: u64,
    rss_pages: u64,
    uid: Option<u32>,
}

pub struct ProcfsSource {
    state: Mutex<SamplerState>,
    ticks_per_second: f64,
    page_size: u64,
    cpu_count: f64,
}

impl ProcfsSource {
    pub fn new() -> Self {
        let cpu_count = match KernelStats::current() {
            Ok(stats) if !stats.cpu_time.is_empty() => stats.cpu_time.len(),
            Ok(_) => 1,
            Err(e) => {
                warn!(error = %e, "could not read CPU count, assuming 1");
                1
            }
        };
        ProcfsSource {
            state: Mutex::new(SamplerState::default()),
            ticks_per_second: procfs::ticks_per_second() as f64,
            page_size: procfs::page_size(),
            cpu_count: cpu_count as f64,
        }
    }

    fn read_raw() -> Result<Vec<RawProcess>, SourceError> {
        let all_procs =
            procfs::process::all_processes().map_err(|e| SourceError::Read(e.to_string()))?;

        let mut raw = Vec::new();
        for proc_result in all_procs {
            // Processes can exit between listing and reading
            let proc = match proc_result {
                Ok(p) => p,
                Err(_) => continue,
            };
            let stat = match proc.stat() {
                Ok(s) => s,
                Err(_) => continue,
            };
            raw.push(RawProcess {
                pid: stat.pid,
                ppid: stat.ppid,
                comm: stat.comm,
                ticks: stat.utime + stat.stime,
                rss_pages: stat.rss,
                uid: proc.uid().ok(),
            });
        }
        Ok(raw)
    }

    /// CPU percentage for one process given the elapsed wall time
    fn cpu_percent(&self, ticks: u64, prev: Option<u64>, elapsed_secs: f64) -> f64 {
        match prev {
            Some(prev) if elapsed_secs > 0.0 && ticks >= prev => {
                let busy_secs = (ticks - prev) as f64 / self.ticks_per_second;
                (busy_secs / elapsed_secs * 100.0 / self.cpu_count).min(100.0)
            }
            _ => 0.0,
        }
    }
}

impl ProcessSource for ProcfsSource {
    fn fetch(&self) -> Result<Vec<ProcessRecord>, SourceError> {
        let raw = Self::read_raw()?;
        let now = Instant::now();

        let mut state = self
            .state
            .lock()
            .map_err(|_| SourceError::Read("sampler state lock poisoned".to_string()))?;
        let elapsed_secs = state
            .prev_sample
            .map(|t| now.duration_since(t).as_secs_f64())
            .unwrap_or(0.0);

        let names: HashMap<Pid, &str> = raw.iter().map(|p| (p.pid, p.comm.as_str())).collect();
        let mut next_ticks = HashMap::with_capacity(raw.len());
        let mut records = Vec::with_capacity(raw.len());

        for p in &raw {
            let cpu = self.cpu_percent(p.ticks, state.prev_ticks.get(&p.pid).copied(), elapsed_secs);
            next_ticks.insert(p.pid, p.ticks);

            let rss_mb = (p.rss_pages * self.page_size) as f64 / (1024.0 * 1024.0);
            let user = match p.uid {
                Some(uid) => state.users.get_username(uid).to_string(),
                None => UNKNOWN_USER.to_string(),
            };
            let name = if p.comm.is_empty() {
                UNKNOWN_NAME
            } else {
                p.comm.as_str()
            };
            let parent = names.get(&p.ppid).copied().unwrap_or(PARENT_NOT_FOUND);

            records.push(ProcessRecord {
                pid: p.pid,
                user,
                name: name.to_string(),
                parent: parent.to_string(),
                cpu: Metric::with_unit(cpu, 2, "%"),
                memory: Metric::with_unit(rss_mb, 1, "MB"),
            });
        }

        state.prev_ticks = next_ticks;
        state.prev_sample = Some(now);
        debug!(count = records.len(), "sampled /proc");
        Ok(records)
    }
}
