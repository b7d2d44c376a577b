//! Normalization of engine faults into structured error payloads

use rhai::{EvalAltResult, ParseError, Position};
use slate_proc::ScriptError;

/// Normalize a compile-time failure.
pub(crate) fn from_parse_error(err: &ParseError, source: &str) -> ScriptError {
    ScriptError {
        name: "SyntaxError".to_string(),
        message: err.to_string(),
        stack: Vec::new(),
        source: excerpt(source, err.1.line()),
    }
}

/// Normalize an execution failure.
///
/// Nested function-call frames become stack lines (innermost first); the
/// innermost fault determines the error class and message.
pub(crate) fn from_eval_error(err: &EvalAltResult, source: &str) -> ScriptError {
    let mut frames = Vec::new();
    let mut current: &EvalAltResult = err;
    while let EvalAltResult::ErrorInFunctionCall(fn_name, _, inner, pos) = current {
        frames.push(format!("at {} ({})", fn_name, describe(*pos)));
        current = inner.as_ref();
    }
    frames.reverse();
    frames.push(format!("at <script> ({})", describe(err.position())));

    let (name, message) = classify(current);
    let line = current.position().line().or_else(|| err.position().line());
    ScriptError {
        name,
        message,
        stack: frames,
        source: excerpt(source, line),
    }
}

fn classify(err: &EvalAltResult) -> (String, String) {
    match err {
        EvalAltResult::ErrorRuntime(value, _) => ("RuntimeError".to_string(), value.to_string()),
        EvalAltResult::ErrorVariableNotFound(name, _) => (
            "ReferenceError".to_string(),
            format!("variable not found: {name}"),
        ),
        EvalAltResult::ErrorFunctionNotFound(name, _) => (
            "ReferenceError".to_string(),
            format!("function not found: {name}"),
        ),
        other => ("RuntimeError".to_string(), other.to_string()),
    }
}

fn describe(position: Position) -> String {
    match position.line() {
        Some(line) => format!("line {line}"),
        None => "unknown".to_string(),
    }
}

/// 1-indexed source excerpt around the failing line.
fn excerpt(source: &str, line: Option<usize>) -> Vec<String> {
    let lines: Vec<&str> = source.lines().collect();
    if lines.is_empty() {
        return Vec::new();
    }
    let (start, end) = match line {
        Some(line) => {
            let line = line.clamp(1, lines.len());
            (line.saturating_sub(2).max(1), (line + 2).min(lines.len()))
        }
        None => (1, lines.len().min(3)),
    };
    (start..=end)
        .map(|n| format!("{:>4} | {}", n, lines[n - 1]))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_excerpt_windows_around_line() {
        let source = "a\nb\nc\nd\ne\nf";
        let lines = excerpt(source, Some(4));
        assert_eq!(lines.len(), 5); // lines 2..=6
        assert!(lines[0].contains("2 | b"));
        assert!(lines[4].contains("6 | f"));
    }

    #[test]
    fn test_excerpt_clamps_to_bounds() {
        let source = "only";
        let lines = excerpt(source, Some(99));
        assert_eq!(lines.len(), 1);
        assert!(lines[0].contains("1 | only"));
    }

    #[test]
    fn test_excerpt_without_position_shows_head() {
        let source = "a\nb\nc\nd";
        let lines = excerpt(source, None);
        assert_eq!(lines.len(), 3);
    }
}
