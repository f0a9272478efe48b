//! Check command implementation.

use anyhow::{Context, Result};
use friend_lint_core::{Analyzer, Config, RuleBox};
use friend_lint_rules::all_rules;
use std::path::Path;

use crate::config_resolver::ConfigSource;
use crate::OutputFormat;

/// Runs the check command.
pub fn run(
    path: &Path,
    format: OutputFormat,
    rules_filter: Option<&str>,
    exclude: Vec<String>,
    source: &ConfigSource,
) -> Result<()> {
    let config = load_config(source)?;

    // Build analyzer
    let mut builder = Analyzer::builder().root(path).config(config);

    // Add exclude patterns
    for pattern in exclude {
        builder = builder.exclude(pattern);
    }

    let rules_to_add = match rules_filter {
        Some(filter) => {
            let names: Vec<&str> = filter.split(',').map(str::trim).collect();
            filter_rules(&names)
        }
        None => all_rules(),
    };

    for rule in rules_to_add {
        builder = builder.rule_box(rule);
    }

    let analyzer = builder.build().context("Failed to build analyzer")?;

    tracing::info!(
        "Analyzing {} with {} rule(s)",
        analyzer.root().display(),
        analyzer.rule_count()
    );

    let result = analyzer.analyze().context("Analysis failed")?;

    super::output::print(&result, format, analyzer.root())?;

    // Exit with error code if there are errors
    if result.has_errors() {
        std::process::exit(1);
    }

    Ok(())
}

fn load_config(source: &ConfigSource) -> Result<Config> {
    let Some(path) = source.path() else {
        return Ok(Config::default());
    };
    if source.is_global() {
        tracing::info!("Using global config: {}", path.display());
    }
    Config::from_file(path).with_context(|| format!("Failed to load config: {}", path.display()))
}

/// Selects rules by name or code; unknown entries are reported and skipped.
fn filter_rules(names: &[&str]) -> Vec<RuleBox> {
    let available = all_rules();

    for name in names {
        if !available
            .iter()
            .any(|rule| rule.name() == *name || rule.code() == *name)
        {
            tracing::warn!("Unknown rule: {}", name);
        }
    }

    available
        .into_iter()
        .filter(|rule| {
            names
                .iter()
                .any(|name| rule.name() == *name || rule.code() == *name)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn filter_by_name_or_code() {
        assert_eq!(filter_rules(&["friend-access"]).len(), 1);
        assert_eq!(filter_rules(&["FRIEND001"]).len(), 1);
        assert!(filter_rules(&["no-such-rule"]).is_empty());
    }

    #[test]
    fn default_source_uses_default_config() {
        let config = load_config(&ConfigSource::Default).expect("defaults");
        assert_eq!(config.friend.attribute, "friend");
    }

    #[test]
    fn unreadable_config_is_an_error() {
        let source = ConfigSource::Explicit("/nonexistent/friend-lint.toml".into());
        let err = load_config(&source).expect_err("missing file");
        assert!(err.to_string().contains("Failed to load config"));
    }
}
