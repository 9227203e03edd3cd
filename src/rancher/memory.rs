//! In-memory [`QuotaBackend`] for tests, with per-operation failure injection.

use async_trait::async_trait;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Mutex;

use crate::error::{ApiError, QuotaError, Result};
use crate::quota::QuotaValue;

use super::backend::QuotaBackend;
use super::types::{Cluster, Namespace, Project, namespace_id, project_cluster_id};

/// Builds the error an injected failure returns, from `"<operation> <id>"`.
type Failure = fn(String) -> QuotaError;

#[derive(Debug, Default)]
struct State {
    clusters: Vec<Cluster>,
    projects: Vec<Project>,
    namespaces: Vec<Namespace>,
    failing: HashMap<(&'static str, String), Failure>,
    updates: Vec<String>,
}

/// Backend holding clusters, projects and namespaces in memory.
#[derive(Debug, Default)]
pub struct InMemoryBackend {
    state: Mutex<State>,
}

impl InMemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_cluster(self, id: &str, name: &str) -> Self {
        self.state.lock().unwrap().clusters.push(Cluster {
            id: id.to_string(),
            name: name.to_string(),
        });
        self
    }

    pub fn with_project(self, project_id: &str, name: &str, quota: QuotaValue) -> Self {
        let cluster_id = project_cluster_id(project_id).unwrap_or_default().to_string();
        self.state.lock().unwrap().projects.push(Project {
            id: project_id.to_string(),
            name: name.to_string(),
            cluster_id,
            quota,
        });
        self
    }

    pub fn with_namespace(self, project_id: &str, name: &str, quota: QuotaValue) -> Self {
        let cluster_id = project_cluster_id(project_id).unwrap_or_default().to_string();
        self.state.lock().unwrap().namespaces.push(Namespace {
            id: namespace_id(&cluster_id, name),
            name: name.to_string(),
            cluster_id,
            project_id: Some(project_id.to_string()),
            quota,
        });
        self
    }

    /// Makes `operation` fail for the given ID with a persistent 503.
    pub fn failing(self, operation: &'static str, id: &str) -> Self {
        self.failing_with(operation, id, unavailable)
    }

    /// Makes `operation` fail for the given ID with the error `failure` builds.
    pub fn failing_with(self, operation: &'static str, id: &str, failure: Failure) -> Self {
        self.state
            .lock()
            .unwrap()
            .failing
            .insert((operation, id.to_string()), failure);
        self
    }

    /// IDs passed to successful update calls, in order.
    pub fn updates(&self) -> Vec<String> {
        self.state.lock().unwrap().updates.clone()
    }

    fn check(&self, operation: &'static str, id: &str) -> Result<()> {
        let failure = self
            .state
            .lock()
            .unwrap()
            .failing
            .get(&(operation, id.to_string()))
            .copied();
        failure.map_or(Ok(()), |failure| Err(failure(format!("{operation} {id}"))))
    }
}

fn unavailable(message: String) -> QuotaError {
    ApiError::RequestFailed {
        attempts: 3,
        message: format!("503 Service Unavailable: {message}"),
    }
    .into()
}

fn not_found(resource: &str) -> QuotaError {
    ApiError::NotFound {
        resource: resource.to_string(),
    }
    .into()
}

#[async_trait]
impl QuotaBackend for InMemoryBackend {
    async fn get_cluster(&self, cluster_id: &str) -> Result<Cluster> {
        self.check("get_cluster", cluster_id)?;
        let state = self.state.lock().unwrap();
        state
            .clusters
            .iter()
            .find(|c| c.id == cluster_id)
            .cloned()
            .ok_or_else(|| not_found(cluster_id))
    }

    async fn list_clusters(&self) -> Result<Vec<Cluster>> {
        self.check("list_clusters", "")?;
        Ok(self.state.lock().unwrap().clusters.clone())
    }

    async fn list_projects(&self, cluster_id: &str) -> Result<Vec<Project>> {
        self.check("list_projects", cluster_id)?;
        let state = self.state.lock().unwrap();
        Ok(state
            .projects
            .iter()
            .filter(|p| p.cluster_id == cluster_id)
            .cloned()
            .collect())
    }

    async fn get_project(&self, project_id: &str) -> Result<Project> {
        self.check("get_project", project_id)?;
        let state = self.state.lock().unwrap();
        state
            .projects
            .iter()
            .find(|p| p.id == project_id)
            .cloned()
            .ok_or_else(|| not_found(project_id))
    }

    async fn update_project(&self, project_id: &str, quota_wire: &Value) -> Result<Project> {
        self.check("update_project", project_id)?;
        let quota = QuotaValue::from_wire(quota_wire)?;
        let mut state = self.state.lock().unwrap();
        let project = state
            .projects
            .iter_mut()
            .find(|p| p.id == project_id)
            .ok_or_else(|| not_found(project_id))?;
        project.quota = quota;
        let updated = project.clone();
        state.updates.push(project_id.to_string());
        Ok(updated)
    }

    async fn list_namespaces(&self, project_id: &str) -> Result<Vec<Namespace>> {
        self.check("list_namespaces", project_id)?;
        let state = self.state.lock().unwrap();
        Ok(state
            .namespaces
            .iter()
            .filter(|n| n.project_id.as_deref() == Some(project_id))
            .cloned()
            .collect())
    }

    async fn get_namespace(&self, namespace_id: &str) -> Result<Namespace> {
        self.check("get_namespace", namespace_id)?;
        let state = self.state.lock().unwrap();
        state
            .namespaces
            .iter()
            .find(|n| n.id == namespace_id)
            .cloned()
            .ok_or_else(|| not_found(namespace_id))
    }

    async fn update_namespace(&self, namespace_id: &str, quota_wire: &Value) -> Result<Namespace> {
        self.check("update_namespace", namespace_id)?;
        let quota = QuotaValue::from_wire(quota_wire)?;
        let mut state = self.state.lock().unwrap();
        let namespace = state
            .namespaces
            .iter_mut()
            .find(|n| n.id == namespace_id)
            .ok_or_else(|| not_found(namespace_id))?;
        namespace.quota = quota;
        let updated = namespace.clone();
        state.updates.push(namespace_id.to_string());
        Ok(updated)
    }
}
