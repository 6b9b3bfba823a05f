//! Background jobs for host calls
//!
//! Fetching the process list and sending a kill both touch the OS and may
//! take a while, so they run on a helper thread. The event loop starts a job,
//! keeps drawing and reading input, and picks the outcome up on a later
//! iteration. At most one job of each kind is in flight.
//!
//! ```text
//! Event loop                      Helper thread
//! ──────────                      ─────────────
//! start_fetch() ────────────────► source.fetch()
//!   │                               │
//!   ├─► draw / read key             │
//!   ├─► fetch_in_flight()? (skip)   │
//!   │                               ▼
//!   └─► take_fetch() ◄──────────── Result<Vec<ProcessRecord>, _>
//! ```

use std::sync::Arc;
use std::thread::{self, JoinHandle};

use tracing::{debug, error};

use super::{ProcessSource, Terminator};
use crate::core::{Pid, ProcessRecord, SourceError, TerminateError};

/// One background computation producing a `T`
#[derive(Debug)]
pub struct BackgroundJob<T: Send + 'static> {
    /// Handle to the helper thread (if started and not yet collected)
    handle: Option<JoinHandle<T>>,
    name: &'static str,
}

impl<T: Send + 'static> BackgroundJob<T> {
    pub fn new(name: &'static str) -> Self {
        Self { handle: None, name }
    }

    /// Check if the job is currently running
    #[cfg(test)]
    pub fn is_running(&self) -> bool {
        self.handle.as_ref().is_some_and(|h| !h.is_finished())
    }

    /// Check if a job was started and its result has not been taken yet
    pub fn is_pending(&self) -> bool {
        self.handle.is_some()
    }

    /// Start `job` on a helper thread.
    ///
    /// Only starts if nothing is pending; returns whether it started.
    pub fn start<F>(&mut self, job: F) -> bool
    where
        F: FnOnce() -> T + Send + 'static,
    {
        if self.is_pending() {
            return false;
        }

        let spawned = thread::Builder::new()
            .name(format!("procview-{}", self.name))
            .spawn(job);
        match spawned {
            Ok(handle) => {
                debug!(job = self.name, "background job started");
                self.handle = Some(handle);
                true
            }
            Err(e) => {
                error!(job = self.name, error = %e, "failed to spawn background job");
                false
            }
        }
    }

    /// Try to take the finished result (non-blocking).
    /// Returns None if nothing was started or the job is still running.
    pub fn try_take(&mut self) -> Option<T> {
        let handle = self.handle.take()?;
        if !handle.is_finished() {
            // Still running, put handle back
            self.handle = Some(handle);
            return None;
        }
        match handle.join() {
            Ok(value) => Some(value),
            Err(_) => {
                error!(job = self.name, "background job panicked");
                None
            }
        }
    }
}

/// Outcome of one termination request
pub type TerminateOutcome = (Pid, Result<(), TerminateError>);

/// Runs fetches and terminations against the host off the event loop thread
pub struct HostWorker {
    source: Arc<dyn ProcessSource>,
    terminator: Arc<dyn Terminator>,
    fetch: BackgroundJob<Result<Vec<ProcessRecord>, SourceError>>,
    terminate: BackgroundJob<TerminateOutcome>,
}

impl HostWorker {
    pub fn new(source: Arc<dyn ProcessSource>, terminator: Arc<dyn Terminator>) -> Self {
        HostWorker {
            source,
            terminator,
            fetch: BackgroundJob::new("fetch"),
            terminate: BackgroundJob::new("terminate"),
        }
    }

    /// A fetch was started and its result has not been collected
    pub fn fetch_in_flight(&self) -> bool {
        self.fetch.is_pending()
    }

    /// Start a fetch; returns false if one is already outstanding
    pub fn start_fetch(&mut self) -> bool {
        let source = Arc::clone(&self.source);
        self.fetch.start(move || source.fetch())
    }

    pub fn take_fetch(&mut self) -> Option<Result<Vec<ProcessRecord>, SourceError>> {
        self.fetch.try_take()
    }

    #[cfg(test)]
    pub fn terminate_in_flight(&self) -> bool {
        self.terminate.is_pending()
    }

    /// Send the termination request for `pid` in the background
    pub fn start_terminate(&mut self, pid: Pid) -> bool {
        let terminator = Arc::clone(&self.terminator);
        self.terminate
            .start(move || (pid, terminator.terminate(pid)))
    }

    pub fn take_terminate(&mut self) -> Option<TerminateOutcome> {
        self.terminate.try_take()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    struct SlowSource {
        calls: AtomicUsize,
        delay: Duration,
    }

    impl ProcessSource for SlowSource {
        fn fetch(&self) -> Result<Vec<ProcessRecord>, SourceError> {
            let n = self.calls.fetch_add(1, Ordering::SeqCst);
            thread::sleep(self.delay);
            if n == 1 {
                return Err(SourceError::Read("boom".to_string()));
            }
            Ok(vec![ProcessRecord::new(
                1, "root", "init", "Not Found", "0.00 %", "1.0 MB",
            )])
        }
    }

    struct RefuseAll;

    impl Terminator for RefuseAll {
        fn terminate(&self, pid: Pid) -> Result<(), TerminateError> {
            Err(TerminateError::PermissionDenied(pid))
        }
    }

    fn worker(delay: Duration) -> HostWorker {
        HostWorker::new(
            Arc::new(SlowSource {
                calls: AtomicUsize::new(0),
                delay,
            }),
            Arc::new(RefuseAll),
        )
    }

    fn wait_for<T>(mut poll: impl FnMut() -> Option<T>) -> T {
        for _ in 0..200 {
            if let Some(v) = poll() {
                return v;
            }
            thread::sleep(Duration::from_millis(5));
        }
        panic!("background job did not finish");
    }

    #[test]
    fn test_job_lifecycle() {
        let mut job: BackgroundJob<i32> = BackgroundJob::new("test");

        // Initially not running
        assert!(!job.is_running());
        assert!(job.try_take().is_none());

        assert!(job.start(|| 7));
        assert_eq!(wait_for(|| job.try_take()), 7);

        // Results consumed
        assert!(!job.is_pending());
        assert!(job.try_take().is_none());
    }

    #[test]
    fn test_job_no_double_start() {
        let mut job: BackgroundJob<i32> = BackgroundJob::new("test");

        assert!(job.start(|| {
            thread::sleep(Duration::from_millis(100));
            1
        }));
        // Second start is ignored while the first is pending
        assert!(!job.start(|| 2));
        assert!(job.is_running());

        assert_eq!(wait_for(|| job.try_take()), 1);
    }

    #[test]
    fn test_finished_but_uncollected_is_still_pending() {
        let mut job: BackgroundJob<i32> = BackgroundJob::new("test");
        job.start(|| 3);
        thread::sleep(Duration::from_millis(50));
        assert!(!job.is_running());
        assert!(job.is_pending());
        assert!(!job.start(|| 4));
        assert_eq!(job.try_take(), Some(3));
    }

    #[test]
    fn test_panicking_job_yields_nothing() {
        let mut job: BackgroundJob<i32> = BackgroundJob::new("test");
        job.start(|| panic!("worker failure"));
        thread::sleep(Duration::from_millis(50));
        assert_eq!(job.try_take(), None);
        assert!(!job.is_pending());
    }

    #[test]
    fn test_fetch_results_and_errors() {
        let mut w = worker(Duration::from_millis(20));

        assert!(w.start_fetch());
        assert!(w.fetch_in_flight());
        assert!(!w.start_fetch());
        let first = wait_for(|| w.take_fetch());
        assert_eq!(first.map(|r| r.len()), Ok(1));
        assert!(!w.fetch_in_flight());

        assert!(w.start_fetch());
        let second = wait_for(|| w.take_fetch());
        assert_eq!(second, Err(SourceError::Read("boom".to_string())));
    }

    #[test]
    fn test_terminate_outcome_carries_pid() {
        let mut w = worker(Duration::ZERO);
        assert!(w.start_terminate(42));
        let (pid, result) = wait_for(|| w.take_terminate());
        assert_eq!(pid, 42);
        assert_eq!(result, Err(TerminateError::PermissionDenied(42)));
        assert!(!w.terminate_in_flight());
    }
}
