//! Rancher control-plane client.
//!
//! Talks to the Rancher v3 API for clusters and projects, and reaches each
//! cluster's Kubernetes API through a generated kubeconfig for namespaces.

use async_trait::async_trait;
use reqwest::{Client, Method, RequestBuilder};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::{Value, json};
use std::time::Duration;
use tracing::{debug, info};

use crate::error::{ApiError, QuotaError, Result};
use crate::quota::RESOURCE_QUOTA_KEY;

use super::backend::QuotaBackend;
use super::kubeconfig::cluster_config;
use super::kubernetes::KubernetesClient;
use super::retry::RetryPolicy;
use super::types::{
    Cluster, Namespace, Project, namespace_project_id, project_cluster_id, split_namespace_id,
};

/// Default request timeout in seconds.
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Connection options for [`RancherClient`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClientOptions {
    /// Whether TLS certificates are verified.
    pub verify_tls: bool,
    /// Per-request timeout.
    pub timeout: Duration,
    /// Retry policy for control-plane calls.
    pub retry: RetryPolicy,
}

impl Default for ClientOptions {
    fn default() -> Self {
        Self {
            verify_tls: true,
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            retry: RetryPolicy::default(),
        }
    }
}

/// Rancher API list envelope.
#[derive(Debug, Deserialize)]
struct Collection<T> {
    #[serde(default = "Vec::new")]
    data: Vec<T>,
}

/// Response of the `generateKubeconfig` action.
#[derive(Debug, Deserialize)]
struct GeneratedKubeconfig {
    #[serde(default)]
    config: Option<String>,
}

/// Rancher API client.
#[derive(Debug)]
pub struct RancherClient {
    /// HTTP client.
    client: Client,
    /// Instance base URL without trailing slash.
    base_url: String,
    /// API token.
    token: String,
    /// Connection options.
    options: ClientOptions,
}

impl RancherClient {
    /// Creates a new Rancher API client.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be created.
    pub fn new(base_url: &str, token: &str, options: ClientOptions) -> Result<Self> {
        let client = Client::builder()
            .timeout(options.timeout)
            .danger_accept_invalid_certs(!options.verify_tls)
            .build()
            .map_err(|e| ApiError::network(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            token: token.to_string(),
            options,
        })
    }

    /// Returns the instance base URL.
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn request(&self, method: &Method, endpoint: &str, body: Option<&Value>) -> RequestBuilder {
        let builder = self
            .client
            .request(method.clone(), format!("{}{endpoint}", self.base_url))
            .bearer_auth(&self.token);
        match body {
            Some(body) => builder.json(body),
            None => builder,
        }
    }

    /// Sends a request with retries and decodes the JSON response.
    async fn call<T: DeserializeOwned>(
        &self,
        method: Method,
        endpoint: &str,
        body: Option<&Value>,
    ) -> Result<T> {
        debug!(%method, endpoint, "Rancher API request");
        let response = self
            .options
            .retry
            .send(endpoint, || self.request(&method, endpoint, body))
            .await?;

        response.json().await.map_err(|e| {
            ApiError::invalid_response(format!("Failed to parse response from {endpoint}: {e}"))
                .into()
        })
    }

    /// Generates a kubeconfig for a cluster.
    ///
    /// # Errors
    ///
    /// Returns an error if the action fails or returns no config.
    pub async fn generate_kubeconfig(&self, cluster_id: &str) -> Result<String> {
        let endpoint = format!("/v3/clusters/{cluster_id}?action=generateKubeconfig");
        let generated: GeneratedKubeconfig =
            self.call(Method::POST, &endpoint, Some(&json!({}))).await?;
        generated
            .config
            .filter(|c| !c.is_empty())
            .ok_or_else(|| {
                ApiError::invalid_response("Kubeconfig not returned from generateKubeconfig").into()
            })
    }

    /// Builds a client for a cluster's API from a freshly generated kubeconfig.
    ///
    /// Nothing is cached: every namespace operation fetches its own kubeconfig.
    async fn kubernetes(&self, cluster_id: &str) -> Result<KubernetesClient> {
        let kubeconfig = self.generate_kubeconfig(cluster_id).await?;
        let config =
            cluster_config(&kubeconfig, self.options.verify_tls, self.options.timeout).await?;
        debug!(cluster = cluster_id, server = %config.cluster_url, "Created cluster API client");
        KubernetesClient::new(config)
    }
}

/// Extracts the quota body from resource fields, `{}` when absent.
fn quota_body(quota_wire: &Value) -> Value {
    quota_wire
        .get(RESOURCE_QUOTA_KEY)
        .cloned()
        .unwrap_or_else(|| json!({}))
}

#[async_trait]
impl QuotaBackend for RancherClient {
    async fn get_cluster(&self, cluster_id: &str) -> Result<Cluster> {
        self.call(Method::GET, &format!("/v3/clusters/{cluster_id}"), None)
            .await
    }

    async fn list_clusters(&self) -> Result<Vec<Cluster>> {
        let collection: Collection<Cluster> = self.call(Method::GET, "/v3/clusters", None).await?;
        Ok(collection.data)
    }

    async fn list_projects(&self, cluster_id: &str) -> Result<Vec<Project>> {
        let endpoint = format!("/v3/projects?clusterId={cluster_id}");
        let collection: Collection<Value> = self.call(Method::GET, &endpoint, None).await?;
        collection
            .data
            .iter()
            .map(|resource| Project::from_resource(resource).map_err(QuotaError::from))
            .collect()
    }

    async fn get_project(&self, project_id: &str) -> Result<Project> {
        let resource: Value = self
            .call(Method::GET, &format!("/v3/projects/{project_id}"), None)
            .await?;
        Ok(Project::from_resource(&resource)?)
    }

    async fn update_project(&self, project_id: &str, quota_wire: &Value) -> Result<Project> {
        let endpoint = format!("/v3/projects/{project_id}");
        let mut current: Value = self.call(Method::GET, &endpoint, None).await?;

        let (Some(resource), Some(fields)) = (current.as_object_mut(), quota_wire.as_object())
        else {
            return Err(ApiError::invalid_response(format!(
                "Expected JSON objects when updating {endpoint}"
            ))
            .into());
        };
        for (key, value) in fields {
            resource.insert(key.clone(), value.clone());
        }

        let updated: Value = self.call(Method::PUT, &endpoint, Some(&current)).await?;
        info!(project = project_id, "Updated project quota");
        Ok(Project::from_resource(&updated)?)
    }

    async fn list_namespaces(&self, project_id: &str) -> Result<Vec<Namespace>> {
        let Some(cluster_id) = project_cluster_id(project_id) else {
            debug!(project = project_id, "Project ID has no cluster part, no namespaces");
            return Ok(Vec::new());
        };

        let objects = self.kubernetes(cluster_id).await?.list_namespaces().await?;
        Ok(objects
            .iter()
            .filter(|object| namespace_project_id(object) == Some(project_id))
            .map(|object| Namespace::from_object(cluster_id, object))
            .collect())
    }

    async fn get_namespace(&self, namespace_id: &str) -> Result<Namespace> {
        let (cluster_id, name) = split_namespace_id(namespace_id)?;
        let object = self
            .kubernetes(cluster_id)
            .await?
            .get_namespace(name)
            .await?
            .ok_or_else(|| ApiError::NotFound {
                resource: format!("namespace {namespace_id}"),
            })?;
        Ok(Namespace::from_object(cluster_id, &object))
    }

    async fn update_namespace(&self, namespace_id: &str, quota_wire: &Value) -> Result<Namespace> {
        let (cluster_id, name) = split_namespace_id(namespace_id)?;
        let updated = self
            .kubernetes(cluster_id)
            .await?
            .patch_quota_annotation(name, &quota_body(quota_wire))
            .await?;
        info!(namespace = namespace_id, "Updated namespace quota");
        Ok(Namespace::from_object(cluster_id, &updated))
    }
}
