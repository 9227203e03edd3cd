//! Rancher and Kubernetes resource types.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::warn;

use crate::error::ApiError;
use crate::quota::QuotaValue;

/// Annotation linking a namespace to its Rancher project.
pub const PROJECT_ID_ANNOTATION: &str = "field.cattle.io/projectId";

/// Annotation holding a namespace's JSON-encoded quota body.
pub const RESOURCE_QUOTA_ANNOTATION: &str = "field.cattle.io/resourceQuota";

/// A Rancher-managed cluster.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cluster {
    /// Cluster ID (e.g. `c-abc12`).
    pub id: String,
    /// Display name.
    #[serde(default)]
    pub name: String,
}

impl Cluster {
    /// Name to show, falling back to the ID.
    #[must_use]
    pub fn display_name(&self) -> &str {
        if self.name.is_empty() { &self.id } else { &self.name }
    }
}

/// A Rancher project with its observed quota.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Project {
    /// Project ID (`<cluster>:<project>`).
    pub id: String,
    /// Display name.
    pub name: String,
    /// Owning cluster ID.
    pub cluster_id: String,
    /// Observed quota.
    pub quota: QuotaValue,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ProjectResource {
    id: String,
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    cluster_id: Option<String>,
    #[serde(default)]
    spec: Option<ProjectSpec>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ProjectSpec {
    #[serde(default)]
    display_name: Option<String>,
    #[serde(default)]
    cluster_name: Option<String>,
}

impl Project {
    /// Decodes a project from a Rancher API resource.
    ///
    /// The name is taken from `spec.displayName`, then `name`, then the ID.
    ///
    /// # Errors
    ///
    /// Returns an error if the resource has no ID or a malformed quota.
    pub fn from_resource(resource: &Value) -> Result<Self, ApiError> {
        let raw: ProjectResource = serde_json::from_value(resource.clone())
            .map_err(|e| ApiError::invalid_response(format!("Malformed project: {e}")))?;
        let spec = raw.spec.unwrap_or_default();

        let name = spec
            .display_name
            .filter(|n| !n.is_empty())
            .or_else(|| raw.name.filter(|n| !n.is_empty()))
            .unwrap_or_else(|| raw.id.clone());
        let cluster_id = raw
            .cluster_id
            .filter(|c| !c.is_empty())
            .or(spec.cluster_name)
            .unwrap_or_default();

        Ok(Self {
            quota: QuotaValue::from_wire(resource)?,
            id: raw.id,
            name,
            cluster_id,
        })
    }
}

/// A namespace with its project association and observed quota.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Namespace {
    /// Composite ID (`<cluster>:<namespace>`).
    pub id: String,
    /// Namespace name.
    pub name: String,
    /// Owning cluster ID.
    pub cluster_id: String,
    /// Owning project ID, from the project annotation.
    pub project_id: Option<String>,
    /// Observed quota, from the quota annotation.
    pub quota: QuotaValue,
}

/// Kubernetes namespace object as served by a cluster API.
pub type NamespaceObject = k8s_openapi::api::core::v1::Namespace;

fn annotation<'a>(object: &'a NamespaceObject, key: &str) -> Option<&'a str> {
    object
        .metadata
        .annotations
        .as_ref()
        .and_then(|annotations| annotations.get(key))
        .map(String::as_str)
}

/// Project annotation value of a namespace object, if any.
#[must_use]
pub fn namespace_project_id(object: &NamespaceObject) -> Option<&str> {
    annotation(object, PROJECT_ID_ANNOTATION)
}

impl Namespace {
    /// Builds a namespace from a cluster object.
    ///
    /// An unparsable quota annotation is logged and read as an empty quota.
    #[must_use]
    pub fn from_object(cluster_id: &str, object: &NamespaceObject) -> Self {
        let name = object.metadata.name.clone().unwrap_or_default();
        let quota =
            annotation(object, RESOURCE_QUOTA_ANNOTATION).map_or_else(QuotaValue::new, |raw| {
                parse_quota_annotation(raw).unwrap_or_else(|e| {
                    warn!(namespace = %name, "Ignoring unparsable quota annotation: {e}");
                    QuotaValue::new()
                })
            });

        Self {
            id: namespace_id(cluster_id, &name),
            project_id: namespace_project_id(object).map(String::from),
            cluster_id: cluster_id.to_string(),
            name,
            quota,
        }
    }
}

fn parse_quota_annotation(raw: &str) -> Result<QuotaValue, ApiError> {
    let value: Value = serde_json::from_str(raw)
        .map_err(|e| ApiError::invalid_response(format!("Invalid JSON: {e}")))?;
    QuotaValue::from_wire(&value)
}

/// Builds a composite namespace ID.
#[must_use]
pub fn namespace_id(cluster_id: &str, name: &str) -> String {
    format!("{cluster_id}:{name}")
}

/// Splits a composite namespace ID into cluster ID and name.
///
/// # Errors
///
/// Returns an error if either part is missing.
pub fn split_namespace_id(id: &str) -> Result<(&str, &str), ApiError> {
    match id.split_once(':') {
        Some((cluster, name)) if !cluster.is_empty() && !name.is_empty() => Ok((cluster, name)),
        _ => Err(ApiError::InvalidRequest {
            message: format!("Invalid namespace ID '{id}', expected <cluster>:<name>"),
        }),
    }
}

/// Cluster part of a project ID (`<cluster>:<project>`).
#[must_use]
pub fn project_cluster_id(project_id: &str) -> Option<&str> {
    project_id
        .split_once(':')
        .map(|(cluster, _)| cluster)
        .filter(|c| !c.is_empty())
}
