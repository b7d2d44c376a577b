//! Process record types

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::ScriptError;

/// Process identifier, allocated from a monotonic counter.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct Pid(pub u64);

impl fmt::Display for Pid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Process lifecycle status.
///
/// `Stopped` is transient: stop/kill/exit remove the record from the table.
/// `Error` is retained so the failure stays inspectable.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProcessStatus {
    Initializing,
    Running,
    Stopped,
    Error,
}

impl ProcessStatus {
    /// Get human-readable display name.
    pub fn name(&self) -> &'static str {
        match self {
            ProcessStatus::Initializing => "initializing",
            ProcessStatus::Running => "running",
            ProcessStatus::Stopped => "stopped",
            ProcessStatus::Error => "error",
        }
    }
}

/// One running (or failed) sandboxed program.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Process {
    pub pid: Pid,
    /// Display name: the trailing segment of the source path
    pub name: String,
    /// Source path the program was started from
    pub start_path: String,
    /// Start timestamp in milliseconds on the host clock
    pub start_time: u64,
    pub status: ProcessStatus,
    /// Failure payload, populated when status is `Error`
    pub error: Option<ScriptError>,
}

impl Process {
    /// Create a record in the `Initializing` state.
    pub fn new(pid: Pid, start_path: impl Into<String>, start_time: u64) -> Self {
        let start_path = start_path.into();
        let name = start_path
            .rsplit('/')
            .next()
            .unwrap_or(start_path.as_str())
            .to_string();
        Self {
            pid,
            name,
            start_path,
            start_time,
            status: ProcessStatus::Initializing,
            error: None,
        }
    }

    /// True while the program is executing or has pending callbacks.
    pub fn is_running(&self) -> bool {
        self.status == ProcessStatus::Running
    }
}
