//! Run report
//!
//! Append-only record of what happened to every visited task. Rendering lives
//! in [`crate::ui`].

use std::fmt;
use std::time::Duration;

/// Where in the run an entry was produced
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntryCategory {
    Setup,
    Task,
    Teardown,
}

/// Outcome of a report entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TaskStatus {
    Executed,
    Skipped,
    Failed,
    /// Planned but simulated by a dry run
    DryRun,
}

impl TaskStatus {
    /// Whether user code actually ran for this entry
    pub fn is_executed(&self) -> bool {
        matches!(self, TaskStatus::Executed | TaskStatus::Failed)
    }
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            TaskStatus::Executed => "Executed",
            TaskStatus::Skipped => "Skipped",
            TaskStatus::Failed => "Failed",
            TaskStatus::DryRun => "Would execute",
        };
        f.write_str(label)
    }
}

/// One row of the report
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportEntry {
    pub task_name: String,
    pub category: EntryCategory,
    pub status: TaskStatus,
    pub duration: Duration,
    /// Skip or failure reason
    pub reason: Option<String>,
}

/// Ordered per-run record
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Report {
    entries: Vec<ReportEntry>,
}

impl Report {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, entry: ReportEntry) {
        self.entries.push(entry);
    }

    pub fn add_executed(&mut self, task_name: &str, category: EntryCategory, duration: Duration) {
        self.add(ReportEntry {
            task_name: task_name.to_string(),
            category,
            status: TaskStatus::Executed,
            duration,
            reason: None,
        });
    }

    pub fn add_skipped(&mut self, task_name: &str, reason: impl Into<String>) {
        self.add(ReportEntry {
            task_name: task_name.to_string(),
            category: EntryCategory::Task,
            status: TaskStatus::Skipped,
            duration: Duration::ZERO,
            reason: Some(reason.into()),
        });
    }

    pub fn add_failed(
        &mut self,
        task_name: &str,
        category: EntryCategory,
        duration: Duration,
        reason: impl Into<String>,
    ) {
        self.add(ReportEntry {
            task_name: task_name.to_string(),
            category,
            status: TaskStatus::Failed,
            duration,
            reason: Some(reason.into()),
        });
    }

    pub fn add_dry_run(&mut self, task_name: &str, category: EntryCategory) {
        self.add(ReportEntry {
            task_name: task_name.to_string(),
            category,
            status: TaskStatus::DryRun,
            duration: Duration::ZERO,
            reason: None,
        });
    }

    pub fn entries(&self) -> &[ReportEntry] {
        &self.entries
    }

    pub fn iter(&self) -> std::slice::Iter<'_, ReportEntry> {
        self.entries.iter()
    }

    pub fn get(&self, task_name: &str) -> Option<&ReportEntry> {
        self.entries.iter().find(|e| e.task_name == task_name)
    }

    /// Entries of the task category only
    pub fn tasks(&self) -> impl Iterator<Item = &ReportEntry> {
        self.entries
            .iter()
            .filter(|e| e.category == EntryCategory::Task)
    }

    /// Sum of entry durations, not a wall-clock span
    pub fn total_duration(&self) -> Duration {
        self.entries.iter().map(|e| e.duration).sum()
    }

    pub fn has_failures(&self) -> bool {
        self.entries.iter().any(|e| e.status == TaskStatus::Failed)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<'a> IntoIterator for &'a Report {
    type Item = &'a ReportEntry;
    type IntoIter = std::slice::Iter<'a, ReportEntry>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_total_duration_is_sum_of_entries() {
        let mut report = Report::new();
        report.add_executed("Setup", EntryCategory::Setup, Duration::from_millis(5));
        report.add_executed("Build", EntryCategory::Task, Duration::from_millis(20));
        report.add_skipped("Deploy", "not on CI");
        report.add_failed("Test", EntryCategory::Task, Duration::from_millis(7), "boom");

        assert_eq!(report.total_duration(), Duration::from_millis(32));
        assert_eq!(report.len(), 4);
        assert!(report.has_failures());
        assert_eq!(report.tasks().count(), 3);
    }

    #[test]
    fn test_entries_keep_insertion_order() {
        let mut report = Report::new();
        report.add_dry_run("Clean", EntryCategory::Task);
        report.add_dry_run("Build", EntryCategory::Task);

        let names: Vec<&str> = report.iter().map(|e| e.task_name.as_str()).collect();
        assert_eq!(names, vec!["Clean", "Build"]);
        assert_eq!(report.get("Build").map(|e| e.status), Some(TaskStatus::DryRun));
        assert!(!report.has_failures());
    }

    #[test]
    fn test_skipped_entry_has_zero_duration_and_reason() {
        let mut report = Report::new();
        report.add_skipped("Publish", "Criteria not met");

        let entry = report.get("Publish").unwrap();
        assert_eq!(entry.duration, Duration::ZERO);
        assert_eq!(entry.reason.as_deref(), Some("Criteria not met"));
        assert!(!entry.status.is_executed());
    }

    #[test]
    fn test_status_labels() {
        assert_eq!(TaskStatus::DryRun.to_string(), "Would execute");
        assert_eq!(TaskStatus::Failed.to_string(), "Failed");
    }
}
