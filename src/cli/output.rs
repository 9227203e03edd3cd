//! Output formatting for CLI commands.
//!
//! This module provides formatting utilities for displaying
//! information to the user in various formats.

use colored::Colorize;
use serde::Serialize;
use std::fmt::Write;
use tabled::{Table, Tabled};

use crate::planner::{ExecutionSummary, PlanItem, ResourceKind, UNSET};

use super::commands::OutputFormat;

/// Output formatter for CLI.
#[derive(Debug)]
pub struct OutputFormatter {
    /// Output format.
    format: OutputFormat,
}

/// One changed field of a plan item.
#[derive(Tabled)]
struct PlanChangeRow {
    #[tabled(rename = "Type")]
    resource_type: String,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Cluster")]
    cluster: String,
    #[tabled(rename = "Field")]
    field: String,
    #[tabled(rename = "Current")]
    current: String,
    #[tabled(rename = "Desired")]
    desired: String,
}

impl OutputFormatter {
    /// Creates a new output formatter.
    #[must_use]
    pub const fn new(format: OutputFormat) -> Self {
        Self { format }
    }

    /// Formats a plan for display.
    #[must_use]
    pub fn format_plan(&self, items: &[PlanItem]) -> String {
        match self.format {
            OutputFormat::Json => serde_json::to_string_pretty(&PlanJson {
                changes: items.iter().filter(|i| i.diff.has_changes()).count(),
                total_resources: items.len(),
                items,
            })
            .unwrap_or_default(),
            OutputFormat::Text => Self::format_plan_text(items),
        }
    }

    fn format_plan_text(items: &[PlanItem]) -> String {
        if items.is_empty() {
            return format!(
                "{} No quota changes needed. All resources match desired state.\n",
                "✓".green()
            );
        }

        let rows: Vec<PlanChangeRow> = items
            .iter()
            .flat_map(|item| {
                item.diff.changes().map(move |(field, change)| PlanChangeRow {
                    resource_type: Self::format_kind(item.resource_type),
                    name: item.resource_name.clone(),
                    cluster: item.cluster_id.clone(),
                    field: field.label().to_string(),
                    current: change.old.clone().unwrap_or_else(|| UNSET.to_string()),
                    desired: change.new.clone().unwrap_or_else(|| UNSET.to_string()),
                })
            })
            .collect();

        let mut output = String::from("\nQuota Plan\n\n");
        output.push_str(&Table::new(rows).to_string());
        output.push('\n');

        let changes = items.iter().filter(|i| i.diff.has_changes()).count();
        let _ = writeln!(
            output,
            "\nExecution Plan: {} change(s) needed out of {} resource(s)",
            changes.to_string().yellow(),
            items.len()
        );

        output
    }

    /// Formats an execution summary.
    #[must_use]
    pub fn format_summary(&self, summary: &ExecutionSummary, dry_run: bool) -> String {
        match self.format {
            OutputFormat::Json => serde_json::to_string_pretty(&SummaryJson { dry_run, summary })
                .unwrap_or_default(),
            OutputFormat::Text => {
                let mut output = String::new();
                if dry_run {
                    let _ = writeln!(output, "{} No changes applied.", "[DRY RUN]".cyan());
                    return output;
                }

                let status = if summary.all_succeeded() {
                    format!("{} All changes applied", "✓".green())
                } else {
                    format!("{} Some changes failed", "✗".red())
                };
                let _ = writeln!(output, "{status}\n\n{summary}");
                output
            }
        }
    }

    /// Formats a message reporting a written file.
    #[must_use]
    pub fn format_report_written(&self, path: &std::path::Path) -> String {
        let message = format!("Report written to {}", path.display());
        match self.format {
            OutputFormat::Json => {
                let json = serde_json::json!({ "status": "success", "message": message });
                serde_json::to_string_pretty(&json).unwrap_or_default()
            }
            OutputFormat::Text => format!("{} {message}", "✓".green()),
        }
    }

    /// Formats a resource kind with color.
    fn format_kind(kind: ResourceKind) -> String {
        match kind {
            ResourceKind::Project => "project".blue().to_string(),
            ResourceKind::Namespace => "namespace".magenta().to_string(),
        }
    }
}

// JSON serialization helpers

#[derive(Serialize)]
struct PlanJson<'a> {
    changes: usize,
    total_resources: usize,
    items: &'a [PlanItem],
}

#[derive(Serialize)]
struct SummaryJson<'a> {
    dry_run: bool,
    #[serde(flatten)]
    summary: &'a ExecutionSummary,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::planner::{ExecutionResult, QuotaDiff};
    use crate::quota::QuotaValue;

    fn item() -> PlanItem {
        let current = QuotaValue::new().with_cpu_limit("1000m");
        let desired = QuotaValue::new()
            .with_cpu_limit("2000m")
            .with_memory_limit("4Gi");
        PlanItem {
            resource_type: ResourceKind::Project,
            resource_id: String::from("c-1:p-a"),
            resource_name: String::from("team-a"),
            cluster_id: String::from("c-1"),
            project_id: None,
            diff: QuotaDiff::compute(&current, &desired),
            current,
            desired,
        }
    }

    #[test]
    fn test_plan_text() {
        colored::control::set_override(false);
        let text = OutputFormatter::new(OutputFormat::Text).format_plan(&[item()]);

        for header in ["Type", "Name", "Cluster", "Field", "Current", "Desired"] {
            assert!(text.contains(header));
        }
        assert!(text.contains("CPU Limit"));
        assert!(text.contains("1000m"));
        assert!(text.contains("Memory Limit"));
        assert!(text.contains(UNSET));
        assert!(text.contains("Execution Plan: 1 change(s) needed out of 1 resource(s)"));
    }

    #[test]
    fn test_empty_plan_text() {
        let text = OutputFormatter::new(OutputFormat::Text).format_plan(&[]);
        assert!(text.contains("No quota changes needed"));
    }

    #[test]
    fn test_plan_json() {
        let text = OutputFormatter::new(OutputFormat::Json).format_plan(&[item()]);
        let json: serde_json::Value = serde_json::from_str(&text).unwrap();
        assert_eq!(json["changes"], 1);
        assert_eq!(json["total_resources"], 1);
        assert_eq!(json["items"][0]["resource_type"], "project");
        assert_eq!(json["items"][0]["desired"]["memory_limit"], "4Gi");
        assert_eq!(json["items"][0]["diff"]["cpu_limit"]["old"], "1000m");
    }

    #[test]
    fn test_summary_formats() {
        let results = vec![ExecutionResult {
            success: false,
            plan_item: item(),
            error: Some(String::from("boom")),
        }];
        let summary = ExecutionSummary::summarize(&results);

        let text = OutputFormatter::new(OutputFormat::Text).format_summary(&summary, false);
        assert!(text.contains("Failed: 1"));
        assert!(text.contains("- project 'team-a': boom"));

        let dry = OutputFormatter::new(OutputFormat::Text).format_summary(&summary, true);
        assert!(dry.contains("No changes applied."));

        let json = OutputFormatter::new(OutputFormat::Json).format_summary(&summary, false);
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["failed"], 1);
        assert_eq!(value["dry_run"], false);
        assert_eq!(value["failures"][0]["error"], "boom");
    }

    #[test]
    fn test_report_written() {
        let path = std::path::Path::new("out.html");
        let text = OutputFormatter::new(OutputFormat::Json).format_report_written(path);
        assert!(text.contains("Report written to out.html"));
    }
}
