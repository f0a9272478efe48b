//! Internal runner for `check!()` macro integration.
//!
//! This module is `#[doc(hidden)]` and not part of the public API.
//! It is called by the generated test function from `friend_lint::check!()`.

use friend_lint_core::{Analyzer, Config, Severity};
use std::path::{Path, PathBuf};

/// Config file names to search for, in priority order.
const CONFIG_CANDIDATES: &[&str] = &["friend-lint.toml", ".friend-lint.toml"];

/// Runs friend-lint analysis as part of `cargo test`.
///
/// Called by the `check!()` macro-generated test function.
/// Panics with a formatted report if violations are found.
///
/// # Panics
///
/// Panics if violations at or above `fail_on` severity are found,
/// or if the configuration cannot be loaded.
pub fn run_check(config_path: Option<&str>, fail_on: Option<&str>) {
    let root = find_project_root();
    let config = load_config(&root, config_path);
    let effective_fail_on = resolve_fail_on(fail_on, &config);

    let mut builder = Analyzer::builder()
        .root(config.analyzer.root.clone())
        .config(config);
    for rule in friend_lint_rules::all_rules() {
        builder = builder.rule_box(rule);
    }

    let analyzer = builder.build().unwrap_or_else(|e| {
        panic!("friend-lint: failed to build analyzer: {e}");
    });

    let result = analyzer.analyze().unwrap_or_else(|e| {
        panic!("friend-lint: analysis failed: {e}");
    });

    if result.has_violations_at(effective_fail_on) {
        let report = result.format_test_report(effective_fail_on);
        panic!("{report}");
    }
}

/// Loads the config named by the macro, else the first candidate found
/// under `root`, else the defaults.
fn load_config(root: &Path, explicit_path: Option<&str>) -> Config {
    let path = match explicit_path {
        Some(path) if Path::new(path).is_absolute() => Some(PathBuf::from(path)),
        Some(path) => Some(root.join(path)),
        None => CONFIG_CANDIDATES
            .iter()
            .map(|candidate| root.join(candidate))
            .find(|path| path.exists()),
    };

    let mut config = match path {
        Some(path) => Config::from_file(&path).unwrap_or_else(|e| {
            panic!("friend-lint: {e}");
        }),
        None => Config::default(),
    };
    // A configured root is relative to the workspace, not the test's cwd.
    if config.analyzer.root.is_relative() {
        config.analyzer.root = root.join(&config.analyzer.root);
    }
    config
}

/// Checks whether a `Cargo.toml` file defines a `[workspace]` section
/// by parsing as TOML, avoiding false positives from comments or strings.
fn has_workspace_section(cargo_toml: &Path) -> bool {
    let Ok(content) = std::fs::read_to_string(cargo_toml) else {
        return false;
    };
    let Ok(table) = content.parse::<toml::Table>() else {
        return false;
    };
    table.contains_key("workspace")
}

/// Finds the project root by walking up from `CARGO_MANIFEST_DIR` to the
/// workspace manifest.
fn find_project_root() -> PathBuf {
    let Ok(manifest_dir) = std::env::var("CARGO_MANIFEST_DIR") else {
        return std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
    };
    let manifest_path = PathBuf::from(manifest_dir);

    manifest_path
        .ancestors()
        .find(|dir| has_workspace_section(&dir.join("Cargo.toml")))
        .map_or_else(|| manifest_path.clone(), Path::to_path_buf)
}

/// Resolves the effective `fail_on` severity.
///
/// Priority: explicit macro arg > config file > default ("error").
fn resolve_fail_on(macro_arg: Option<&str>, config: &Config) -> Severity {
    let name = macro_arg.or(config.fail_on.as_deref()).unwrap_or("error");

    Severity::from_tag(name).unwrap_or_else(|| {
        panic!("friend-lint: unknown severity `{name}`. Valid values: error, warning")
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolve_fail_on_defaults_to_error() {
        let config = Config::default();
        assert_eq!(resolve_fail_on(None, &config), Severity::Error);
    }

    #[test]
    fn resolve_fail_on_from_config() {
        let mut config = Config::default();
        config.fail_on = Some("warning".to_string());
        assert_eq!(resolve_fail_on(None, &config), Severity::Warning);
    }

    #[test]
    fn resolve_fail_on_explicit_error_overrides_config() {
        let mut config = Config::default();
        config.fail_on = Some("warning".to_string());
        assert_eq!(resolve_fail_on(Some("error"), &config), Severity::Error);
    }

    #[test]
    #[should_panic(expected = "unknown severity")]
    fn resolve_fail_on_invalid_panics() {
        let config = Config::default();
        resolve_fail_on(Some("info"), &config);
    }

    #[test]
    fn load_config_prefers_first_candidate() {
        let dir = tempfile::tempdir().expect("temp dir");
        std::fs::write(dir.path().join("friend-lint.toml"), "fail_on = \"warning\"")
            .expect("write config");
        std::fs::write(dir.path().join(".friend-lint.toml"), "fail_on = \"error\"")
            .expect("write config");

        let config = load_config(dir.path(), None);
        assert_eq!(config.fail_on.as_deref(), Some("warning"));
        assert_eq!(config.analyzer.root, dir.path().join("."));
    }

    #[test]
    fn load_config_without_file_uses_defaults() {
        let dir = tempfile::tempdir().expect("temp dir");
        let config = load_config(dir.path(), None);
        assert!(config.fail_on.is_none());
        assert_eq!(config.analyzer.root, dir.path().join("."));
        assert_eq!(config.friend.attribute, "friend");
    }

    #[test]
    #[should_panic(expected = "friend-lint: Failed to read config file")]
    fn load_config_missing_explicit_file_panics() {
        let dir = tempfile::tempdir().expect("temp dir");
        load_config(dir.path(), Some("nope.toml"));
    }

    #[test]
    fn workspace_section_detection() {
        let dir = tempfile::tempdir().expect("temp dir");
        let manifest = dir.path().join("Cargo.toml");
        std::fs::write(&manifest, "# [workspace]\n[package]\nname = \"x\"\n").expect("write");
        assert!(!has_workspace_section(&manifest));

        std::fs::write(&manifest, "[workspace]\nmembers = []\n").expect("write");
        assert!(has_workspace_section(&manifest));
    }
}
