//! Shared output formatting for lint results.

use anyhow::Result;
use friend_lint_core::{LintResult, Severity, Violation, ViolationDiagnostic};
use miette::NamedSource;
use std::path::Path;

use crate::OutputFormat;

/// Print lint results in the specified format.
///
/// `root` is the analyzed directory; finding paths are relative to it.
pub fn print(result: &LintResult, format: OutputFormat, root: &Path) -> Result<()> {
    match format {
        OutputFormat::Text => print_text(result),
        OutputFormat::Json => return print_json(result),
        OutputFormat::Compact => print_compact(result),
        OutputFormat::Pretty => print_pretty(result, root),
    }
    Ok(())
}

fn print_text(result: &LintResult) {
    let (errors, warnings) = result.count_by_severity();

    for violation in &result.violations {
        let severity_indicator = match violation.severity {
            Severity::Error => "\x1b[31merror\x1b[0m",
            Severity::Warning => "\x1b[33mwarning\x1b[0m",
        };

        println!(
            "{} {} at {}",
            violation.code, violation.rule, violation.location
        );
        println!("  {}: {}", severity_indicator, violation.message);
        for label in &violation.labels {
            println!("  = note: {} ({})", label.message, label.location);
        }
        if let Some(suggestion) = &violation.suggestion {
            println!("  = help: {}", suggestion.message);
        }
        println!();
    }

    let summary_color = if errors > 0 {
        "\x1b[31m"
    } else if warnings > 0 {
        "\x1b[33m"
    } else {
        "\x1b[32m"
    };

    println!("{}{}\x1b[0m", summary_color, result.summary());
}

fn print_json(result: &LintResult) -> Result<()> {
    let json = serde_json::to_string_pretty(result)?;
    println!("{json}");
    Ok(())
}

fn print_compact(result: &LintResult) {
    for violation in &result.violations {
        println!("{violation}");
    }
}

fn print_pretty(result: &LintResult, root: &Path) {
    for violation in &result.violations {
        println!("{}", render_pretty(violation, root));
    }
    println!("{}", result.summary());
}

/// Renders one finding with its source snippet, or as a plain line when the
/// file can no longer be read.
fn render_pretty(violation: &Violation, root: &Path) -> String {
    let file = &violation.location.file;
    match std::fs::read_to_string(root.join(file)) {
        Ok(content) => {
            let report = miette::Report::new(ViolationDiagnostic::from(violation))
                .with_source_code(NamedSource::new(file.display().to_string(), content));
            format!("{report:?}")
        }
        Err(e) => {
            tracing::debug!("Cannot read {} for snippet: {}", file.display(), e);
            violation.to_string()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use friend_lint_core::Location;
    use std::path::PathBuf;

    fn violation(file: &str) -> Violation {
        Violation::new(
            "FRIEND001",
            "friend-access",
            Severity::Error,
            Location::new(PathBuf::from(file), 1, 1).with_span(0, 6),
            "'Other' is not a friend of 'Secret'",
        )
    }

    #[test]
    fn pretty_falls_back_without_source() {
        let dir = tempfile::tempdir().expect("temp dir");
        let rendered = render_pretty(&violation("src/missing.rs"), dir.path());
        assert_eq!(
            rendered,
            "src/missing.rs:1:1: error [FRIEND001] 'Other' is not a friend of 'Secret'"
        );
    }

    #[test]
    fn pretty_includes_message_with_source() {
        let dir = tempfile::tempdir().expect("temp dir");
        std::fs::create_dir(dir.path().join("src")).expect("src dir");
        std::fs::write(dir.path().join("src/lib.rs"), "Secret { key: 1 }\n").expect("write");

        let rendered = render_pretty(&violation("src/lib.rs"), dir.path());
        assert!(rendered.contains("is not a friend of"));
        assert!(rendered.contains("src/lib.rs"));
    }
}
