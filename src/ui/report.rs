//! Report and task list rendering

use crate::report::{Report, ReportEntry, TaskStatus};
use crate::task::Registry;
use colored::Colorize;
use std::fmt::Write as _;
use std::time::Duration;

/// Render a report as a table with a total row
pub fn render_report(report: &Report) -> String {
    let width = report
        .iter()
        .map(|e| e.task_name.len())
        .chain(std::iter::once("Task".len()))
        .max()
        .unwrap_or(4)
        + 2;

    let mut out = String::new();
    let rule = "-".repeat(width + 32);
    let _ = writeln!(out, "{:<width$}{:<16}{}", "Task", "Duration", "Status");
    let _ = writeln!(out, "{rule}");

    for entry in report {
        let _ = writeln!(
            out,
            "{:<width$}{:<16}{}",
            entry.task_name,
            format_duration(entry.duration),
            status_label(entry)
        );
    }

    let _ = writeln!(out, "{rule}");
    let _ = writeln!(out, "{:<width$}{}", "Total:", format_duration(report.total_duration()));
    out
}

/// Print a report to stdout
pub fn print_report(report: &Report) {
    print!("{}", render_report(report));
}

fn status_label(entry: &ReportEntry) -> String {
    let label = match &entry.reason {
        Some(reason) if entry.status != TaskStatus::Executed => format!("{} ({})", entry.status, reason),
        _ => entry.status.to_string(),
    };
    match entry.status {
        TaskStatus::Executed => label.green().to_string(),
        TaskStatus::Skipped => label.yellow().to_string(),
        TaskStatus::Failed => label.red().to_string(),
        TaskStatus::DryRun => label.cyan().to_string(),
    }
}

/// `hh:mm:ss.fff`
pub fn format_duration(duration: Duration) -> String {
    let millis = duration.as_millis();
    let (secs, millis) = (millis / 1000, millis % 1000);
    format!("{:02}:{:02}:{:02}.{:03}", secs / 3600, (secs / 60) % 60, secs % 60, millis)
}

/// Render registered tasks with descriptions and dependencies
pub fn render_task_list(registry: &Registry) -> String {
    let width = registry.names().map(str::len).max().unwrap_or(0) + 2;
    let mut out = String::new();

    for task in registry.iter() {
        let _ = write!(out, "{:<width$}", task.name.bold());
        if let Some(description) = &task.description {
            let _ = write!(out, "{description}");
        }
        if !task.dependencies.is_empty() {
            let _ = write!(out, " {}", format!("[depends: {}]", task.dependencies.join(", ")).dimmed());
        }
        out.push('\n');
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::EntryCategory;

    #[test]
    fn test_format_duration() {
        assert_eq!(format_duration(Duration::from_millis(3_723_045)), "01:02:03.045");
        assert_eq!(format_duration(Duration::ZERO), "00:00:00.000");
    }

    #[test]
    fn test_render_report_lists_every_entry() {
        colored::control::set_override(false);

        let mut report = Report::new();
        report.add_executed("Clean", EntryCategory::Task, Duration::from_millis(10));
        report.add_skipped("Publish", "not on CI");
        report.add_failed("Test", EntryCategory::Task, Duration::from_millis(5), "boom");

        let rendered = render_report(&report);
        assert!(rendered.contains("Clean"));
        assert!(rendered.contains("Skipped (not on CI)"));
        assert!(rendered.contains("Failed (boom)"));
        assert!(rendered.contains("Total:"));
        assert!(rendered.contains("00:00:00.015"));
    }

    #[test]
    fn test_render_task_list() {
        colored::control::set_override(false);

        let mut registry = Registry::new();
        registry.register("Clean").unwrap().description("Remove artifacts");
        registry.register("Build").unwrap().is_dependent_on("Clean");

        let listing = render_task_list(&registry);
        let lines: Vec<&str> = listing.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].contains("Remove artifacts"));
        assert!(lines[1].contains("[depends: Clean]"));
    }
}
