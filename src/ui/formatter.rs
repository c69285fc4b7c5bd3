//! Pure formatting functions for UI output.
//!
//! Human-facing status goes to stderr so that stdout only carries the
//! machine-readable results (`VERSION: x.y.z`, the revision string).

use console::style;

use crate::cli::orchestration::ReleasePlan;

/// Format and print an error message in red.
pub fn display_error(message: &str) {
    eprintln!("{} {}", style("ERROR:").red().bold(), message);
}

/// Format and print a success message with green checkmark.
pub fn display_success(message: &str) {
    eprintln!("{} {}", style("✓").green(), message);
}

/// Format and print a status message with yellow arrow.
pub fn display_status(message: &str) {
    eprintln!("{} {}", style("→").yellow(), message);
}

/// Lines describing what a release will do, in execution order.
pub fn format_release_plan(plan: &ReleasePlan) -> Vec<String> {
    let mut lines = vec![
        format!("Version: {} -> {}", plan.current, plan.next),
        format!("Commit:  {}", plan.commit_message),
    ];
    if let (Some(remote), Some(branch)) = (&plan.remote, &plan.push_branch) {
        lines.push(format!("Push:    {} to {}", branch, remote));
    }
    lines.push(format!("Tag:     {} ({})", plan.tag_name, plan.tag_message));
    match &plan.remote {
        Some(remote) => lines.push(format!("Push:    {} to {}", plan.tag_name, remote)),
        None => lines.push("Push:    skipped".to_string()),
    }
    lines
}

/// Display the release plan.
///
/// # Arguments
/// * `plan` - The computed release plan
/// * `dry_run` - Whether the plan is only being previewed
pub fn display_release_plan(plan: &ReleasePlan, dry_run: bool) {
    let title = if dry_run {
        "Release plan (dry run)"
    } else {
        "Release plan"
    };
    eprintln!("\n{}", style(title).bold());
    for line in format_release_plan(plan) {
        eprintln!("  {}", line);
    }
    eprintln!();
}

/// Display the command to push a tag that was created but not pushed.
pub fn display_manual_push_instruction(tag: &str, remote: &str) {
    eprintln!(
        "\n{} To push this tag later, run:\n  {}",
        style("→").yellow(),
        style(format!("git push {} {}", remote, tag)).cyan()
    );
}
