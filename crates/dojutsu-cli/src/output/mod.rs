//! Output formatting utilities for the CLI
//!
//! Turns daemon responses into terminal output: a key/value table for raw
//! responses, sectioned text for pipeline results, and coloured status
//! messages.

use serde_json::Value;
use tabled::{
    settings::{Style, Width},
    Table, Tabled,
};

use crate::ipc::{ByakuganResult, Response, RunResult, SkillCheck, VersionInfo};

/// Widest a value column gets before wrapping
const VALUE_WIDTH: usize = 80;

/// Format a raw response as a KEY/VALUE table
///
/// Rows are sorted by key.
pub fn format_response(response: &Response) -> String {
    #[derive(Tabled)]
    struct FieldRow {
        #[tabled(rename = "KEY")]
        key: String,
        #[tabled(rename = "VALUE")]
        value: String,
    }

    if response.fields().is_empty() {
        return "(empty response)".to_string();
    }

    let rows: Vec<FieldRow> = response
        .fields()
        .iter()
        .map(|(key, value)| FieldRow {
            key: key.clone(),
            value: format_value(value),
        })
        .collect();

    Table::new(rows)
        .with(Style::rounded())
        .with(Width::wrap(VALUE_WIDTH))
        .to_string()
}

/// Format a pipeline result in sections
pub fn format_run_result(result: &RunResult) -> String {
    let mut output = String::new();

    for (title, body) in [
        ("BYAKUGAN", &result.byakugan),
        ("MODE SAGE", &result.mode_sage),
        ("JOUGAN", &result.jougan),
        ("CODE", &result.execution),
    ] {
        if body.is_empty() {
            continue;
        }
        output.push_str(&format!("=== {} ===\n{}\n\n", title, body.trim_end()));
    }

    output.push_str(&format!("Time: {}", format_seconds(result.total_time)));
    if !result.timing.is_empty() {
        let steps: Vec<String> = result
            .timing
            .iter()
            .map(|(step, secs)| format!("{} {}", step, format_seconds(*secs)))
            .collect();
        output.push_str(&format!(" ({})", steps.join(", ")));
    }
    output.push('\n');

    if result.skills_used.is_empty() {
        output.push_str("Skills: none");
    } else {
        output.push_str(&format!("Skills: {}", result.skills_used.join(", ")));
    }

    output
}

/// Format a structural analysis result
pub fn format_byakugan(result: &ByakuganResult) -> String {
    format!(
        "=== BYAKUGAN ===\n{}\n\nTime: {}",
        result.byakugan.trim_end(),
        format_seconds(result.time)
    )
}

/// Format a skill scan verdict
pub fn format_skill_check(check: &SkillCheck) -> String {
    if check.safe {
        return "Skill looks safe: no malicious patterns found".to_string();
    }

    let mut output = format!(
        "Skill flagged: {} pattern(s) matched",
        check.violations.len()
    );
    for violation in &check.violations {
        output.push_str(&format!("\n  - {}", violation));
    }
    output
}

/// Format daemon version information
pub fn format_version(info: &VersionInfo) -> String {
    let mut output = format!("Daemon version: {}", info.version);
    if !info.package.is_empty() {
        output.push_str(&format!("\nPackage:        {}", info.package));
    }
    if !info.providers.is_empty() {
        output.push_str(&format!("\nProviders:      {}", info.providers.join(", ")));
    }
    output
}

/// Render a JSON value for a table cell
fn format_value(value: &Value) -> String {
    match value {
        Value::String(s) => truncate(s, 500),
        Value::Array(items) if items.iter().all(Value::is_string) => items
            .iter()
            .filter_map(Value::as_str)
            .collect::<Vec<_>>()
            .join(", "),
        Value::Null => "-".to_string(),
        other => other.to_string(),
    }
}

/// Format seconds in human-readable form
fn format_seconds(secs: f64) -> String {
    if secs < 60.0 {
        format!("{:.1}s", secs)
    } else {
        let whole = secs.round() as u64;
        format!("{}m {}s", whole / 60, whole % 60)
    }
}

/// Truncate a string with ellipsis if it has more than `max_chars` characters
fn truncate(s: &str, max_chars: usize) -> String {
    if s.chars().count() <= max_chars {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max_chars.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}

/// Print a success message in green with a checkmark prefix
pub fn print_success(msg: &str) {
    use crossterm::style::{Color, Print, ResetColor, SetForegroundColor};

    let mut stdout = std::io::stdout();
    let _ = crossterm::execute!(
        stdout,
        SetForegroundColor(Color::Green),
        Print("✓ "),
        ResetColor,
        Print(msg),
        Print("\n")
    );
}

/// Print an error message in red with an X prefix
///
/// Goes to stderr so stdout stays clean for `--json` output.
pub fn print_error(msg: &str) {
    use crossterm::style::{Color, Print, ResetColor, SetForegroundColor};

    let mut stderr = std::io::stderr();
    let _ = crossterm::execute!(
        stderr,
        SetForegroundColor(Color::Red),
        Print("✗ "),
        ResetColor,
        Print(msg),
        Print("\n")
    );
}

/// Print a warning message in yellow to stderr
pub fn print_warning(msg: &str) {
    use crossterm::style::{Color, Print, ResetColor, SetForegroundColor};

    let mut stderr = std::io::stderr();
    let _ = crossterm::execute!(
        stderr,
        SetForegroundColor(Color::Yellow),
        Print("⚠ "),
        ResetColor,
        Print(msg),
        Print("\n")
    );
}

/// Print an informational message in cyan to stderr
pub fn print_info(msg: &str) {
    use crossterm::style::{Color, Print, ResetColor, SetForegroundColor};

    let mut stderr = std::io::stderr();
    let _ = crossterm::execute!(
        stderr,
        SetForegroundColor(Color::Cyan),
        Print("ℹ "),
        ResetColor,
        Print(msg),
        Print("\n")
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use dojutsu_protocol::decode_response;
    use std::collections::BTreeMap;

    #[test]
    fn test_format_response_lists_fields() {
        let response =
            decode_response(br#"{"count": 42, "skills_used": ["rust", "axum"], "note": null}"#)
                .unwrap();
        let table = format_response(&response);
        assert!(table.contains("KEY"));
        assert!(table.contains("count"));
        assert!(table.contains("42"));
        assert!(table.contains("rust, axum"));
    }

    #[test]
    fn test_format_run_result_sections() {
        let mut timing = BTreeMap::new();
        timing.insert("byakugan".to_string(), 1.3);
        let result = RunResult {
            byakugan: "1. Router".to_string(),
            mode_sage: String::new(),
            jougan: "Looks fine".to_string(),
            execution: "fn main() {}".to_string(),
            skills_used: vec!["rust-axum".to_string()],
            timing,
            total_time: 75.0,
        };

        let text = format_run_result(&result);
        assert!(text.contains("=== BYAKUGAN ===\n1. Router"));
        assert!(!text.contains("MODE SAGE"));
        assert!(text.contains("=== CODE ===\nfn main() {}"));
        assert!(text.contains("Time: 1m 15s (byakugan 1.3s)"));
        assert!(text.ends_with("Skills: rust-axum"));
    }

    #[test]
    fn test_format_skill_check() {
        let safe = SkillCheck {
            safe: true,
            violations: vec![],
        };
        assert!(format_skill_check(&safe).contains("safe"));

        let flagged = SkillCheck {
            safe: false,
            violations: vec!["Pattern 3: eval".to_string()],
        };
        let text = format_skill_check(&flagged);
        assert!(text.contains("1 pattern(s)"));
        assert!(text.contains("- Pattern 3: eval"));
    }

    #[test]
    fn test_format_seconds() {
        assert_eq!(format_seconds(0.0), "0.0s");
        assert_eq!(format_seconds(9.74), "9.7s");
        assert_eq!(format_seconds(125.0), "2m 5s");
    }

    #[test]
    fn test_truncate_is_char_safe() {
        assert_eq!(truncate("short", 10), "short");
        assert_eq!(truncate("白眼白眼白眼白眼", 5), "白眼...");
    }
}
