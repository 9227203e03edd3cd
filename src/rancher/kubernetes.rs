//! Kubernetes API client for one downstream cluster.
//!
//! Namespace quotas live in a namespace annotation, so this client only reads
//! namespaces and patches that annotation. Every call is a single attempt.

use kube::api::{ListParams, Patch, PatchParams};
use kube::{Api, Client, Config};
use reqwest::StatusCode;
use serde_json::{Value, json};
use std::fmt;
use tracing::debug;

use crate::error::{ApiError, QuotaError, Result};

use super::retry::status_error;
use super::types::{NamespaceObject, RESOURCE_QUOTA_ANNOTATION};

/// Client for a cluster's core v1 namespace API.
#[derive(Clone)]
pub struct KubernetesClient {
    namespaces: Api<NamespaceObject>,
    server: String,
}

impl fmt::Debug for KubernetesClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KubernetesClient")
            .field("server", &self.server)
            .finish_non_exhaustive()
    }
}

impl KubernetesClient {
    /// Creates a client from a kubeconfig-derived configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying client cannot be created.
    pub fn new(config: Config) -> Result<Self> {
        let server = config.cluster_url.to_string();
        let client = Client::try_from(config)
            .map_err(|e| ApiError::network(format!("Failed to create cluster client: {e}")))?;

        Ok(Self {
            namespaces: Api::all(client),
            server,
        })
    }

    /// Lists all namespaces in the cluster.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the response is malformed.
    pub async fn list_namespaces(&self) -> Result<Vec<NamespaceObject>> {
        let list = self
            .namespaces
            .list(&ListParams::default())
            .await
            .map_err(|e| api_error("/api/v1/namespaces", &e))?;
        debug!(count = list.items.len(), "Listed namespaces");
        Ok(list.items)
    }

    /// Reads one namespace; `None` if it does not exist.
    ///
    /// # Errors
    ///
    /// Returns an error for any failure other than not-found.
    pub async fn get_namespace(&self, name: &str) -> Result<Option<NamespaceObject>> {
        self.namespaces
            .get_opt(name)
            .await
            .map_err(|e| api_error(&format!("/api/v1/namespaces/{name}"), &e).into())
    }

    /// Writes a namespace's quota annotation, leaving the rest untouched.
    ///
    /// `quota_body` is the encoded quota body; it is stored as a JSON string.
    ///
    /// # Errors
    ///
    /// Returns an error if the patch is rejected.
    pub async fn patch_quota_annotation(
        &self,
        name: &str,
        quota_body: &Value,
    ) -> Result<NamespaceObject> {
        let encoded = serde_json::to_string(quota_body)
            .map_err(|e| QuotaError::internal(format!("Failed to encode quota: {e}")))?;
        let patch = json!({
            "metadata": {"annotations": {RESOURCE_QUOTA_ANNOTATION: encoded}}
        });

        let patched = self
            .namespaces
            .patch(name, &PatchParams::default(), &Patch::Merge(&patch))
            .await
            .map_err(|e| api_error(&format!("/api/v1/namespaces/{name}"), &e))?;
        debug!(namespace = name, "Patched quota annotation");
        Ok(patched)
    }
}

/// Maps a cluster API failure onto the shared error categories.
fn api_error(resource: &str, error: &kube::Error) -> ApiError {
    match error {
        kube::Error::Api(status) => match StatusCode::from_u16(status.code) {
            Ok(code) => status_error(code, resource, status.message.clone()),
            Err(_) => ApiError::invalid_response(format!(
                "Unknown status {} from {resource}",
                status.code
            )),
        },
        kube::Error::SerdeError(e) => {
            ApiError::invalid_response(format!("Failed to parse response from {resource}: {e}"))
        }
        other => ApiError::RequestFailed {
            attempts: 1,
            message: format!("Request failed: {other}"),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rancher::kubeconfig::cluster_config;
    use crate::rancher::types::namespace_project_id;
    use std::time::Duration;
    use wiremock::matchers::{body_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    async fn client_for(server: &MockServer) -> KubernetesClient {
        let kubeconfig = format!(
            "apiVersion: v1\nkind: Config\ncurrent-context: c\nclusters:\n- name: c\n  cluster:\n    server: {}\nusers:\n- name: u\n  user:\n    token: kube-token\ncontexts:\n- name: c\n  context:\n    cluster: c\n    user: u\n",
            server.uri()
        );
        let config = cluster_config(&kubeconfig, true, Duration::from_secs(5))
            .await
            .unwrap();
        KubernetesClient::new(config).unwrap()
    }

    fn namespace(name: &str, annotations: &Value) -> Value {
        json!({
            "apiVersion": "v1",
            "kind": "Namespace",
            "metadata": {"name": name, "annotations": annotations}
        })
    }

    #[tokio::test]
    async fn test_list_namespaces() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/v1/namespaces"))
            .and(header("authorization", "Bearer kube-token"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "apiVersion": "v1",
                "kind": "NamespaceList",
                "metadata": {},
                "items": [
                    namespace("web", &json!({"field.cattle.io/projectId": "c-1:p-1"})),
                    namespace("kube-system", &json!({}))
                ]
            })))
            .mount(&server)
            .await;

        let namespaces = client_for(&server).await.list_namespaces().await.unwrap();
        assert_eq!(namespaces.len(), 2);
        assert_eq!(namespace_project_id(&namespaces[0]), Some("c-1:p-1"));
        assert_eq!(namespace_project_id(&namespaces[1]), None);
    }

    #[tokio::test]
    async fn test_get_missing_namespace() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/v1/namespaces/ghost"))
            .respond_with(ResponseTemplate::new(404).set_body_json(json!({
                "apiVersion": "v1",
                "kind": "Status",
                "status": "Failure",
                "message": "namespaces \"ghost\" not found",
                "reason": "NotFound",
                "code": 404
            })))
            .expect(1)
            .mount(&server)
            .await;

        let client = client_for(&server).await;
        assert!(client.get_namespace("ghost").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_server_error_is_not_retried() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(500))
            .expect(1)
            .mount(&server)
            .await;

        let err = client_for(&server).await.list_namespaces().await.unwrap_err();
        assert!(matches!(
            err,
            QuotaError::Api(ApiError::RequestFailed { attempts: 1, .. })
        ));
    }

    #[tokio::test]
    async fn test_forbidden_maps_to_authorization() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(403))
            .expect(1)
            .mount(&server)
            .await;

        let err = client_for(&server).await.list_namespaces().await.unwrap_err();
        assert!(matches!(
            err,
            QuotaError::Api(ApiError::AuthorizationFailed { .. })
        ));
    }

    #[tokio::test]
    async fn test_patch_quota_annotation() {
        let server = MockServer::start().await;
        Mock::given(method("PATCH"))
            .and(path("/api/v1/namespaces/web"))
            .and(header("content-type", "application/merge-patch+json"))
            .and(body_json(json!({
                "metadata": {"annotations": {
                    "field.cattle.io/resourceQuota": r#"{"limit":{"cpu":"500m"}}"#
                }}
            })))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(namespace("web", &json!({}))),
            )
            .expect(1)
            .mount(&server)
            .await;

        let patched = client_for(&server)
            .await
            .patch_quota_annotation("web", &json!({"limit": {"cpu": "500m"}}))
            .await
            .unwrap();
        assert_eq!(patched.metadata.name.as_deref(), Some("web"));
    }
}
