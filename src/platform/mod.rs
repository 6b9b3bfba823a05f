//! Platform-specific host capabilities
//!
//! This module provides the two things the view needs from the operating
//! system: a process list sampler and a way to terminate a process. Both
//! sit behind traits so the event loop can be driven by fakes in tests.

use std::sync::Arc;

use crate::core::{KillSignal, Pid, ProcessRecord, SourceError, TerminateError};

#[cfg(target_os = "linux")]
mod linux;

mod worker;

pub use worker::*;

/// Samples the current list of running processes
pub trait ProcessSource: Send + Sync {
    fn fetch(&self) -> Result<Vec<ProcessRecord>, SourceError>;
}

/// Asks the host to terminate a process
pub trait Terminator: Send + Sync {
    fn terminate(&self, pid: Pid) -> Result<(), TerminateError>;
}

/// Process source for the running platform
pub fn default_source() -> Arc<dyn ProcessSource> {
    #[cfg(target_os = "linux")]
    {
        Arc::new(linux::ProcfsSource::new())
    }
    #[cfg(not(target_os = "linux"))]
    {
        Arc::new(UnsupportedSource)
    }
}

#[cfg(not(target_os = "linux"))]
struct UnsupportedSource;

#[cfg(not(target_os = "linux"))]
impl ProcessSource for UnsupportedSource {
    fn fetch(&self) -> Result<Vec<ProcessRecord>, SourceError> {
        Err(SourceError::Unsupported)
    }
}

/// Terminates processes by sending a signal
#[derive(Debug, Clone, Copy)]
pub struct SignalTerminator {
    signal: KillSignal,
}

impl SignalTerminator {
    pub fn new(signal: KillSignal) -> Self {
        SignalTerminator { signal }
    }
}

impl Terminator for SignalTerminator {
    #[cfg(unix)]
    fn terminate(&self, pid: Pid) -> Result<(), TerminateError> {
        use nix::errno::Errno;
        use nix::sys::signal::{kill, Signal};
        use nix::unistd::Pid as NixPid;

        // 0 and negative pids address process groups
        if pid <= 0 {
            return Err(TerminateError::ProcessNotFound(pid));
        }
        let target = NixPid::from_raw(pid);
        let map_err = |e: Errno| match e {
            Errno::ESRCH => TerminateError::ProcessNotFound(pid),
            Errno::EPERM => TerminateError::PermissionDenied(pid),
            other => TerminateError::Signal {
                pid,
                reason: other.desc().to_string(),
            },
        };

        // Look the process up before signalling it
        kill(target, None).map_err(map_err)?;

        let signal = match self.signal {
            KillSignal::Kill => Signal::SIGKILL,
            KillSignal::Term => Signal::SIGTERM,
        };
        kill(target, signal).map_err(map_err)
    }

    #[cfg(not(unix))]
    fn terminate(&self, pid: Pid) -> Result<(), TerminateError> {
        let _ = (pid, self.signal);
        Err(TerminateError::Unsupported)
    }
}
