//! Plan construction.
//!
//! The planner walks the configuration in declaration order, reads the live
//! quota of every selected project and namespace, and emits one
//! [`PlanItem`] per resource whose quota differs from the desired one.

use indexmap::IndexMap;
use serde::Serialize;
use tracing::{Instrument, debug, error, info, info_span, warn};

use crate::config::{ClusterConfig, InstanceConfig, ProjectConfig};
use crate::error::{ErrorKind, Result};
use crate::quota::QuotaValue;
use crate::rancher::{Project, QuotaBackend};

use super::diff::QuotaDiff;

/// Kind of resource a plan item targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ResourceKind {
    /// A Rancher project.
    Project,
    /// A namespace inside a project.
    Namespace,
}

impl std::fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Project => "project",
            Self::Namespace => "namespace",
        };
        write!(f, "{s}")
    }
}

/// One resource whose quota must change.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PlanItem {
    /// Resource kind.
    pub resource_type: ResourceKind,
    /// Project ID or composite namespace ID.
    pub resource_id: String,
    /// Display name.
    pub resource_name: String,
    /// Owning cluster ID.
    pub cluster_id: String,
    /// Owning project ID (namespaces only).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub project_id: Option<String>,
    /// Observed quota.
    pub current: QuotaValue,
    /// Desired quota.
    pub desired: QuotaValue,
    /// Field-wise difference.
    pub diff: QuotaDiff,
}

impl PlanItem {
    /// Returns a human-readable description of the change.
    #[must_use]
    pub fn description(&self) -> String {
        format!("{} '{}'", self.resource_type, self.resource_name)
    }
}

impl std::fmt::Display for PlanItem {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "  {}:", self.description())?;
        write!(f, "{}", self.diff)
    }
}

/// Which part of the configuration to plan.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PlanSelection {
    /// Cluster IDs to include; empty means all.
    pub cluster_ids: Vec<String>,
    /// Project names to include; empty means all.
    pub project_names: Vec<String>,
    /// Include every project regardless of `project_names`.
    pub all_projects: bool,
}

impl PlanSelection {
    fn includes_cluster(&self, cluster_id: &str) -> bool {
        self.cluster_ids.is_empty() || self.cluster_ids.iter().any(|id| id == cluster_id)
    }

    fn includes_project(&self, name: &str) -> bool {
        self.all_projects
            || self.project_names.is_empty()
            || self.project_names.iter().any(|n| n == name)
    }
}

/// Builds plans from configuration and live state.
#[derive(Debug)]
pub struct Planner<'a, B: QuotaBackend + ?Sized> {
    /// State backend.
    backend: &'a B,
    /// Resolved configuration.
    config: &'a InstanceConfig,
}

impl<'a, B: QuotaBackend + ?Sized> Planner<'a, B> {
    /// Creates a new planner.
    #[must_use]
    pub const fn new(backend: &'a B, config: &'a InstanceConfig) -> Self {
        Self { backend, config }
    }

    /// Builds the plan for the selected clusters and projects.
    ///
    /// Items come out in configuration order: per cluster, per project, the
    /// project item first, then its namespace items.
    ///
    /// # Errors
    ///
    /// Returns an error if a cluster cannot be read or a project lookup
    /// fails. Namespace listing failures only skip that project's namespaces.
    pub async fn create_plan(&self, selection: &PlanSelection) -> Result<Vec<PlanItem>> {
        let mut items = Vec::new();

        for (label, cluster) in &self.config.clusters {
            if !selection.includes_cluster(&cluster.cluster_id) {
                debug!(cluster = %cluster.cluster_id, "Cluster not selected");
                continue;
            }

            let span = info_span!("cluster", cluster = %cluster.cluster_id);
            self.plan_cluster(label, cluster, selection, &mut items)
                .instrument(span)
                .await?;
        }

        info!(items = items.len(), "Plan created");
        Ok(items)
    }

    async fn plan_cluster(
        &self,
        label: &str,
        cluster: &ClusterConfig,
        selection: &PlanSelection,
        items: &mut Vec<PlanItem>,
    ) -> Result<()> {
        info!("Processing cluster: {label} ({})", cluster.cluster_id);

        if let Err(e) = self.backend.get_cluster(&cluster.cluster_id).await {
            error!("Failed to access cluster: {e}");
            return Err(e);
        }

        for (project_name, project_config) in &cluster.projects {
            if !selection.includes_project(project_name) {
                continue;
            }

            let span = info_span!("project", project = %project_name);
            self.plan_project(&cluster.cluster_id, project_name, project_config, items)
                .instrument(span)
                .await?;
        }

        Ok(())
    }

    async fn plan_project(
        &self,
        cluster_id: &str,
        project_name: &str,
        project_config: &ProjectConfig,
        items: &mut Vec<PlanItem>,
    ) -> Result<()> {
        info!("Processing project: {project_name}");

        let project = match self.backend.find_project_by_name(cluster_id, project_name).await {
            Ok(Some(project)) => project,
            Ok(None) => {
                warn!("Project '{project_name}' not found in cluster");
                return Ok(());
            }
            Err(e) => {
                error!("Failed to process project '{project_name}': {e}");
                return Err(e);
            }
        };

        if !project_config.project_quota.is_empty() {
            let diff = QuotaDiff::compute(&project.quota, &project_config.project_quota);
            if diff.has_changes() {
                items.push(PlanItem {
                    resource_type: ResourceKind::Project,
                    resource_id: project.id.clone(),
                    resource_name: project.name.clone(),
                    cluster_id: cluster_id.to_string(),
                    project_id: None,
                    current: project.quota.clone(),
                    desired: project_config.project_quota.clone(),
                    diff,
                });
            } else {
                debug!("Project '{}' quota already matches desired state", project.name);
            }
        }

        if !project_config.namespace_quotas.is_empty() {
            self.plan_namespaces(cluster_id, &project, &project_config.namespace_quotas, items)
                .await?;
        }

        Ok(())
    }

    async fn plan_namespaces(
        &self,
        cluster_id: &str,
        project: &Project,
        desired: &IndexMap<String, QuotaValue>,
        items: &mut Vec<PlanItem>,
    ) -> Result<()> {
        let namespaces = match self.backend.list_namespaces(&project.id).await {
            Ok(namespaces) => namespaces,
            Err(e) if e.kind() == ErrorKind::Configuration => return Err(e),
            Err(e) => {
                warn!("Failed to list namespaces for project '{}': {e}", project.name);
                return Ok(());
            }
        };

        for (name, desired_quota) in desired {
            let _entered = info_span!("namespace", namespace = %name).entered();

            if desired_quota.is_empty() {
                debug!("Skipping empty quota for namespace '{name}'");
                continue;
            }

            let Some(namespace) = namespaces.iter().find(|ns| &ns.name == name) else {
                warn!("Namespace '{name}' not found in project '{}'", project.name);
                continue;
            };

            let diff = QuotaDiff::compute(&namespace.quota, desired_quota);
            if !diff.has_changes() {
                debug!("Namespace '{name}' quota already matches desired state");
                continue;
            }

            items.push(PlanItem {
                resource_type: ResourceKind::Namespace,
                resource_id: namespace.id.clone(),
                resource_name: name.clone(),
                cluster_id: cluster_id.to_string(),
                project_id: Some(project.id.clone()),
                current: namespace.quota.clone(),
                desired: desired_quota.clone(),
                diff,
            });
        }

        Ok(())
    }
}
