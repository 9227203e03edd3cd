//! Plan executor for applying quota plans.
//!
//! Items are applied one at a time, in plan order. A failing item is
//! recorded and the batch moves on to the next one.

use serde::Serialize;
use tracing::{Instrument, error, info, info_span};

use crate::error::Result;
use crate::rancher::QuotaBackend;

use super::plan::{PlanItem, ResourceKind};

/// Executor for quota plans.
#[derive(Debug)]
pub struct Executor<'a, B: QuotaBackend + ?Sized> {
    /// State backend.
    backend: &'a B,
}

/// Result of applying a single plan item.
#[derive(Debug, Clone, Serialize)]
pub struct ExecutionResult {
    /// Whether the item was applied.
    pub success: bool,
    /// Item that was executed.
    pub plan_item: PlanItem,
    /// Error message (if failed).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// A failed item in an execution summary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FailureEntry {
    /// Resource kind.
    pub resource_type: ResourceKind,
    /// Resource display name.
    pub resource_name: String,
    /// Error message.
    pub error: String,
}

/// Totals over a batch of execution results.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ExecutionSummary {
    /// Number of items executed.
    pub total: usize,
    /// Number of items applied.
    pub successful: usize,
    /// Number of items that failed.
    pub failed: usize,
    /// Failed items in execution order.
    pub failures: Vec<FailureEntry>,
}

impl<'a, B: QuotaBackend + ?Sized> Executor<'a, B> {
    /// Creates a new executor.
    #[must_use]
    pub const fn new(backend: &'a B) -> Self {
        Self { backend }
    }

    /// Executes every item, in order.
    ///
    /// In dry-run mode nothing is sent to the backend and every item is
    /// reported as successful.
    pub async fn execute(&self, items: &[PlanItem], dry_run: bool) -> Vec<ExecutionResult> {
        info!(
            dry_run,
            "Executing plan with {} item(s)",
            items.len()
        );

        let mut results = Vec::with_capacity(items.len());
        for item in items {
            let span = info_span!(
                "apply",
                cluster = %item.cluster_id,
                resource = %item.resource_id,
            );
            let result = self.execute_item(item, dry_run).instrument(span).await;
            results.push(result);
        }
        results
    }

    async fn execute_item(&self, item: &PlanItem, dry_run: bool) -> ExecutionResult {
        if dry_run {
            info!("[DRY RUN] Would update {}", item.description());
            return ExecutionResult {
                success: true,
                plan_item: item.clone(),
                error: None,
            };
        }

        match self.apply(item).await {
            Ok(()) => {
                info!("Updated {}", item.description());
                ExecutionResult {
                    success: true,
                    plan_item: item.clone(),
                    error: None,
                }
            }
            Err(e) => {
                if e.is_api() {
                    error!("Failed to update {}: {e}", item.description());
                } else {
                    error!(error = ?e, "Unexpected error updating {}", item.description());
                }
                ExecutionResult {
                    success: false,
                    plan_item: item.clone(),
                    error: Some(e.to_string()),
                }
            }
        }
    }

    async fn apply(&self, item: &PlanItem) -> Result<()> {
        let wire = item.desired.to_wire();
        match item.resource_type {
            ResourceKind::Project => {
                self.backend.update_project(&item.resource_id, &wire).await?;
            }
            ResourceKind::Namespace => {
                self.backend.update_namespace(&item.resource_id, &wire).await?;
            }
        }
        Ok(())
    }
}

impl ExecutionSummary {
    /// Summarizes a batch of results.
    #[must_use]
    pub fn summarize(results: &[ExecutionResult]) -> Self {
        let failures: Vec<FailureEntry> = results
            .iter()
            .filter(|r| !r.success)
            .map(|r| FailureEntry {
                resource_type: r.plan_item.resource_type,
                resource_name: r.plan_item.resource_name.clone(),
                error: r.error.clone().unwrap_or_default(),
            })
            .collect();

        Self {
            total: results.len(),
            successful: results.len() - failures.len(),
            failed: failures.len(),
            failures,
        }
    }

    /// Returns true if every item succeeded.
    #[must_use]
    pub const fn all_succeeded(&self) -> bool {
        self.failed == 0
    }
}

impl std::fmt::Display for FailureEntry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} '{}': {}",
            self.resource_type, self.resource_name, self.error
        )
    }
}

impl std::fmt::Display for ExecutionSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Execution Summary:")?;
        writeln!(f, "  Total: {}", self.total)?;
        writeln!(f, "  Successful: {}", self.successful)?;
        write!(f, "  Failed: {}", self.failed)?;
        if !self.failures.is_empty() {
            write!(f, "\nFailures:")?;
            for failure in &self.failures {
                write!(f, "\n  - {failure}")?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::planner::QuotaDiff;
    use crate::quota::QuotaValue;
    use crate::rancher::memory::InMemoryBackend;

    fn item(kind: ResourceKind, id: &str, name: &str, desired: QuotaValue) -> PlanItem {
        let current = QuotaValue::new();
        PlanItem {
            resource_type: kind,
            resource_id: id.to_string(),
            resource_name: name.to_string(),
            cluster_id: String::from("c-1"),
            project_id: (kind == ResourceKind::Namespace).then(|| String::from("c-1:p-a")),
            diff: QuotaDiff::compute(&current, &desired),
            current,
            desired,
        }
    }

    fn backend() -> InMemoryBackend {
        InMemoryBackend::new()
            .with_cluster("c-1", "prod")
            .with_project("c-1:p-a", "team-a", QuotaValue::new())
            .with_project("c-1:p-b", "team-b", QuotaValue::new())
            .with_namespace("c-1:p-a", "web", QuotaValue::new())
    }

    fn items() -> Vec<PlanItem> {
        vec![
            item(
                ResourceKind::Project,
                "c-1:p-a",
                "team-a",
                QuotaValue::new().with_cpu_limit("2000m"),
            ),
            item(
                ResourceKind::Project,
                "c-1:p-b",
                "team-b",
                QuotaValue::new().with_memory_limit("4Gi"),
            ),
            item(
                ResourceKind::Namespace,
                "c-1:web",
                "web",
                QuotaValue::new().with_cpu_limit("500m"),
            ),
        ]
    }

    #[tokio::test]
    async fn test_apply_all() {
        let backend = backend();
        let results = Executor::new(&backend).execute(&items(), false).await;

        assert!(results.iter().all(|r| r.success));
        assert_eq!(backend.updates(), ["c-1:p-a", "c-1:p-b", "c-1:web"]);

        let ns = backend.get_namespace("c-1:web").await.unwrap();
        assert_eq!(ns.quota.cpu_limit(), Some("500m"));
    }

    #[tokio::test]
    async fn test_dry_run_does_not_write() {
        let backend = backend();
        let results = Executor::new(&backend).execute(&items(), true).await;

        assert_eq!(results.len(), 3);
        assert!(results.iter().all(|r| r.success && r.error.is_none()));
        assert!(backend.updates().is_empty());
    }

    #[tokio::test]
    async fn test_failure_does_not_abort_batch() {
        let backend = backend().failing("update_project", "c-1:p-b");
        let results = Executor::new(&backend).execute(&items(), false).await;

        assert!(results[0].success);
        assert!(!results[1].success);
        assert!(results[1].error.as_deref().unwrap().contains("503"));
        assert!(results[2].success);
        assert_eq!(backend.updates(), ["c-1:p-a", "c-1:web"]);

        let summary = ExecutionSummary::summarize(&results);
        assert_eq!(summary.total, 3);
        assert_eq!(summary.successful, 2);
        assert_eq!(summary.failed, 1);
        assert!(!summary.all_succeeded());
        assert_eq!(summary.failures[0].resource_name, "team-b");
    }

    #[tokio::test]
    async fn test_missing_resource_is_captured() {
        let backend = InMemoryBackend::new();
        let results = Executor::new(&backend).execute(&items()[2..], false).await;
        assert!(!results[0].success);
        assert!(results[0].error.is_some());
    }

    #[tokio::test]
    async fn test_summary_display() {
        let backend = backend().failing("update_namespace", "c-1:web");
        let results = Executor::new(&backend).execute(&items(), false).await;
        let text = ExecutionSummary::summarize(&results).to_string();

        assert!(text.starts_with("Execution Summary:\n  Total: 3\n  Successful: 2\n  Failed: 1"));
        assert!(text.contains("\nFailures:\n  - namespace 'web': "));
    }

    #[test]
    fn test_empty_summary() {
        let summary = ExecutionSummary::summarize(&[]);
        assert_eq!(summary, ExecutionSummary::default());
        assert!(summary.all_succeeded());
        assert_eq!(
            summary.to_string(),
            "Execution Summary:\n  Total: 0\n  Successful: 0\n  Failed: 0"
        );
    }
}
