//! Error types for the runtime layer

use thiserror::Error;

use slate_proc::Pid;
use slate_vfs::VfsError;

/// Errors from runtime operations.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum RuntimeError {
    /// The program source could not be read; no process was created.
    #[error("failed to read program source at {path}: {source}")]
    Source {
        path: String,
        #[source]
        source: VfsError,
    },

    /// The pid does not name a live process.
    #[error("no such process: {0}")]
    ProcessNotFound(Pid),
}
