//! Collection of live quota data for the report.

use serde::Serialize;
use tracing::{Instrument, info, info_span, warn};

use crate::error::Result;
use crate::rancher::{Cluster, Namespace, Project, QuotaBackend};

/// Quota data for one cluster.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ClusterQuotaData {
    /// Cluster ID.
    pub cluster_id: String,
    /// Cluster display name.
    pub cluster_name: String,
    /// Projects with their namespaces.
    pub projects: Vec<ProjectQuotaData>,
}

/// Quota data for one project.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProjectQuotaData {
    /// Project with its full quota.
    pub project: Project,
    /// Namespaces of the project.
    pub namespaces: Vec<Namespace>,
}

/// Collects quotas for the given clusters, or every cluster when empty.
///
/// Project and namespace failures are logged and skipped. A cluster whose
/// projects cannot be listed is kept with no projects.
///
/// # Errors
///
/// Returns an error if the cluster list or a selected cluster cannot be read.
pub async fn collect_quota_data<B: QuotaBackend + ?Sized>(
    backend: &B,
    cluster_ids: &[String],
) -> Result<Vec<ClusterQuotaData>> {
    let clusters: Vec<Cluster> = if cluster_ids.is_empty() {
        backend.list_clusters().await?
    } else {
        let mut selected = Vec::with_capacity(cluster_ids.len());
        for id in cluster_ids {
            selected.push(backend.get_cluster(id).await?);
        }
        selected
    };

    let mut data = Vec::with_capacity(clusters.len());
    for cluster in clusters {
        let span = info_span!("cluster", cluster = %cluster.id);
        data.push(collect_cluster(backend, cluster).instrument(span).await);
    }
    Ok(data)
}

async fn collect_cluster<B: QuotaBackend + ?Sized>(
    backend: &B,
    cluster: Cluster,
) -> ClusterQuotaData {
    let cluster_name = cluster.display_name().to_string();
    info!("Collecting quotas for cluster: {cluster_name}");

    let mut data = ClusterQuotaData {
        cluster_id: cluster.id,
        cluster_name,
        projects: Vec::new(),
    };

    let projects = match backend.list_projects(&data.cluster_id).await {
        Ok(projects) => projects,
        Err(e) => {
            warn!("Failed to list projects for {}: {e}", data.cluster_name);
            return data;
        }
    };

    for listed in projects {
        // Listings may omit the quota, so fetch each project by ID.
        let project = match backend.get_project(&listed.id).await {
            Ok(project) => project,
            Err(e) => {
                warn!(project = %listed.name, "Failed to get project {}: {e}", listed.name);
                continue;
            }
        };

        let namespaces = backend
            .list_namespaces(&project.id)
            .await
            .unwrap_or_else(|e| {
                warn!(
                    project = %project.name,
                    "Failed to list namespaces for project {}: {e}", project.name
                );
                Vec::new()
            });

        data.projects.push(ProjectQuotaData {
            project,
            namespaces,
        });
    }

    data
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::quota::QuotaValue;
    use crate::rancher::memory::InMemoryBackend;

    fn backend() -> InMemoryBackend {
        InMemoryBackend::new()
            .with_cluster("c-1", "prod")
            .with_cluster("c-2", "staging")
            .with_project("c-1:p-a", "team-a", QuotaValue::new().with_cpu_limit("2"))
            .with_project("c-1:p-b", "team-b", QuotaValue::new())
            .with_project("c-2:p-c", "team-c", QuotaValue::new())
            .with_namespace("c-1:p-a", "web", QuotaValue::new().with_memory_limit("1Gi"))
            .with_namespace("c-1:p-a", "api", QuotaValue::new())
    }

    #[tokio::test]
    async fn test_collect_all_clusters() {
        let data = collect_quota_data(&backend(), &[]).await.unwrap();

        assert_eq!(data.len(), 2);
        assert_eq!(data[0].cluster_name, "prod");
        assert_eq!(data[0].projects.len(), 2);
        assert_eq!(data[0].projects[0].project.quota.cpu_limit(), Some("2"));
        assert_eq!(data[0].projects[0].namespaces.len(), 2);
        assert_eq!(data[1].projects[0].project.name, "team-c");
    }

    #[tokio::test]
    async fn test_collect_selected_cluster() {
        let data = collect_quota_data(&backend(), &[String::from("c-2")])
            .await
            .unwrap();
        assert_eq!(data.len(), 1);
        assert_eq!(data[0].cluster_id, "c-2");
    }

    #[tokio::test]
    async fn test_failures_are_skipped() {
        let backend = backend()
            .failing("list_projects", "c-2")
            .failing("get_project", "c-1:p-b")
            .failing("list_namespaces", "c-1:p-a");
        let data = collect_quota_data(&backend, &[]).await.unwrap();

        assert_eq!(data[0].projects.len(), 1);
        assert!(data[0].projects[0].namespaces.is_empty());
        assert!(data[1].projects.is_empty());
    }

    #[tokio::test]
    async fn test_cluster_list_failure_is_fatal() {
        let backend = backend().failing("list_clusters", "");
        assert!(collect_quota_data(&backend, &[]).await.is_err());
    }
}
