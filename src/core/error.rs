//! Error types for the two host capabilities: reading the process list and
//! terminating a process.
//!
//! Both are `Clone` because outcomes are produced on the background worker
//! and handed to the event loop by value.

use thiserror::Error;

use super::process::Pid;

/// Failure while sampling the process list
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum SourceError {
    #[error("failed to read process list: {0}")]
    Read(String),

    #[cfg(not(target_os = "linux"))]
    #[error("process listing is not supported on this platform")]
    Unsupported,
}

/// Failure while asking the host to terminate a process
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TerminateError {
    #[error("process {0} not found")]
    ProcessNotFound(Pid),

    #[error("permission denied for process {0}")]
    PermissionDenied(Pid),

    #[error("signal to process {pid} failed: {reason}")]
    Signal { pid: Pid, reason: String },

    #[cfg(not(unix))]
    #[error("terminating processes is not supported on this platform")]
    Unsupported,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages_name_the_pid() {
        assert_eq!(
            TerminateError::ProcessNotFound(42).to_string(),
            "process 42 not found"
        );
        let err = TerminateError::Signal {
            pid: 7,
            reason: "EINVAL".to_string(),
        };
        assert_eq!(err.to_string(), "signal to process 7 failed: EINVAL");
    }
}
