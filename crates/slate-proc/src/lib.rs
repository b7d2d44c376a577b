//! Process table for Slate
//!
//! Pure state: process records, the status state machine, and the
//! structured error payload a failed program leaves behind. No I/O and no
//! engine dependency; the runtime drives all transitions.

mod error;
mod table;
mod types;

pub use error::ScriptError;
pub use table::ProcessTable;
pub use types::{Pid, Process, ProcessStatus};
