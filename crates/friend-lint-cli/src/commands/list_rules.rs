//! List rules command implementation.

use friend_lint_rules::all_rules;
use friend_lint_rules::friend_access::{FRIEND_ERROR, FRIEND_WARNING};

/// Runs the list-rules command.
pub fn run() {
    println!("Available rules:\n");
    println!("{:<10} {:<25} Description", "Code", "Name");
    println!("{}", "-".repeat(80));

    for rule in all_rules() {
        println!(
            "{:<10} {:<25} {}",
            rule.code(),
            rule.name(),
            rule.description()
        );
    }

    println!("\nFindings:");
    for descriptor in [&FRIEND_ERROR, &FRIEND_WARNING] {
        println!(
            "  {} [{}] {} ({}): {}",
            descriptor.id,
            descriptor.default_severity,
            descriptor.title,
            descriptor.category,
            descriptor.message_format,
        );
    }

    println!("\nUse --rules to filter specific rules, e.g.:");
    println!("  friend-lint check --rules friend-access");
    println!("  friend-lint check --rules FRIEND001");
}
