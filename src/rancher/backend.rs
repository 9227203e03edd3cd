//! Backend trait over the Rancher state client.
//!
//! Planning, execution and reporting depend on this trait rather than on the
//! HTTP client, so they can run against an in-memory backend.

use async_trait::async_trait;
use serde_json::Value;

use crate::error::Result;

use super::types::{Cluster, Namespace, Project};

/// Read and write access to cluster, project and namespace quotas.
#[async_trait]
pub trait QuotaBackend: Send + Sync {
    /// Fetches one cluster.
    async fn get_cluster(&self, cluster_id: &str) -> Result<Cluster>;

    /// Lists every cluster visible to the credentials.
    async fn list_clusters(&self) -> Result<Vec<Cluster>>;

    /// Lists the projects of a cluster.
    async fn list_projects(&self, cluster_id: &str) -> Result<Vec<Project>>;

    /// Fetches one project with its full quota.
    async fn get_project(&self, project_id: &str) -> Result<Project>;

    /// Writes a project's quota.
    ///
    /// `quota_wire` holds resource fields as produced by
    /// [`QuotaValue::to_wire`](crate::quota::QuotaValue::to_wire).
    async fn update_project(&self, project_id: &str, quota_wire: &Value) -> Result<Project>;

    /// Lists the namespaces belonging to a project.
    async fn list_namespaces(&self, project_id: &str) -> Result<Vec<Namespace>>;

    /// Fetches one namespace by composite ID.
    async fn get_namespace(&self, namespace_id: &str) -> Result<Namespace>;

    /// Writes a namespace's quota, given in the same form as for projects.
    async fn update_namespace(&self, namespace_id: &str, quota_wire: &Value) -> Result<Namespace>;

    /// Finds the first project of a cluster whose display name matches exactly.
    async fn find_project_by_name(&self, cluster_id: &str, name: &str) -> Result<Option<Project>> {
        Ok(self
            .list_projects(cluster_id)
            .await?
            .into_iter()
            .find(|project| project.name == name))
    }
}
