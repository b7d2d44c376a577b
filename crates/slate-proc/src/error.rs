//! Structured error payload for failed programs

use serde::{Deserialize, Serialize};

/// Normalized failure payload attached to a process in the `Error` state
/// and broadcast on the message bus.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScriptError {
    /// Error class, e.g. `SyntaxError` or `RuntimeError`
    pub name: String,
    pub message: String,
    /// Call-chain lines, innermost first
    pub stack: Vec<String>,
    /// 1-indexed source excerpt around the failure
    pub source: Vec<String>,
}

impl ScriptError {
    /// Create an error with an empty stack and source excerpt.
    pub fn new(name: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            message: message.into(),
            stack: Vec::new(),
            source: Vec::new(),
        }
    }

    /// Render the inspector text: name and message, the stack trace, and
    /// the numbered source excerpt.
    pub fn report(&self) -> String {
        let mut out = String::new();
        out.push_str(&self.name);
        out.push_str(": ");
        out.push_str(&self.message);
        out.push('\n');
        out.push('\n');
        out.push_str("Stack trace:\n");
        for line in &self.stack {
            out.push_str("  ");
            out.push_str(line);
            out.push('\n');
        }
        out.push('\n');
        out.push_str("Source:\n");
        for line in &self.source {
            out.push_str("  ");
            out.push_str(line);
            out.push('\n');
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_report_sections() {
        let error = ScriptError {
            name: "RuntimeError".to_string(),
            message: "boom".to_string(),
            stack: vec!["at tick (line 3)".to_string()],
            source: vec!["   3 | throw \"boom\";".to_string()],
        };
        let report = error.report();
        assert!(report.starts_with("RuntimeError: boom\n"));
        assert!(report.contains("Stack trace:\n"));
        assert!(report.contains("at tick (line 3)"));
        assert!(report.contains("Source:\n"));
        assert!(report.contains("3 | throw \"boom\";"));
    }

    #[test]
    fn test_serialization_round_trip() {
        let error = ScriptError::new("SyntaxError", "unexpected token");
        let json = serde_json::to_string(&error).unwrap();
        let restored: ScriptError = serde_json::from_str(&json).unwrap();
        assert_eq!(restored, error);
    }
}
