//! Init command implementation.

use anyhow::{bail, Context, Result};
use std::path::Path;

const CONFIG_FILE: &str = "friend-lint.toml";

const DEFAULT_CONFIG: &str = r#"# friend-lint configuration

# Severity at which `friend_lint::check!()` fails: "error" or "warning"
fail_on = "error"

[analyzer]
# Root directory to analyze (default: current directory)
# root = "./src"

# Glob patterns to exclude from analysis
exclude = [
    "**/target/**",
    "**/vendor/**",
]

# Worker threads evaluating usage sites (default: one per core)
# parallelism = 4

[friend]
# Attribute marking restricted types, e.g. #[friend(Vault)]
attribute = "friend"

[rules.friend-access]
enabled = true
"#;

/// Runs the init command.
pub fn run(force: bool) -> Result<()> {
    write_config(Path::new(CONFIG_FILE), force)?;

    println!("Created {CONFIG_FILE}");
    println!("\nNext steps:");
    println!("  1. Mark restricted types with #[friend_lint::friend(Friend, ...)]");
    println!("  2. Run: friend-lint check");

    Ok(())
}

fn write_config(path: &Path, force: bool) -> Result<()> {
    if path.exists() && !force {
        bail!(
            "Configuration file already exists at {}. Use --force to overwrite.",
            path.display()
        );
    }

    std::fs::write(path, DEFAULT_CONFIG)
        .with_context(|| format!("Failed to write {}", path.display()))
}
