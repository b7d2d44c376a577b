//! Bus message wire type

use serde::{Deserialize, Serialize};

use slate_proc::ScriptError;

/// Structured payload crossing the bus as `{"type": ..., "data": ...}` JSON.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data", rename_all = "lowercase")]
pub enum BusMessage {
    /// Plain console output
    Log(String),
    /// Warning console output
    Warn(String),
    /// Runtime failure payload
    Error(ScriptError),
    /// Arbitrary payload posted by the program
    Message(serde_json::Value),
    /// Termination notice with the exit code
    Exit { code: i64 },
    /// Graceful-stop request; programs may listen and clean up
    #[serde(rename = "close-request")]
    CloseRequest,
}
