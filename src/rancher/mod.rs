//! Rancher state client.
//!
//! This module provides:
//! - The Rancher v3 API client for clusters and projects
//! - A per-cluster Kubernetes client for namespace quota annotations
//! - Kubeconfig decoding and the shared retry policy
//! - The [`QuotaBackend`] trait the planner, executor and report build on

mod backend;
mod client;
mod kubeconfig;
mod kubernetes;
#[cfg(test)]
pub(crate) mod memory;
mod retry;
mod types;

pub use backend::QuotaBackend;
pub use client::{ClientOptions, DEFAULT_TIMEOUT_SECS, RancherClient};
pub use kubeconfig::cluster_config;
pub use kubernetes::KubernetesClient;
pub use retry::{DEFAULT_MAX_ATTEMPTS, RetryPolicy};
pub use types::{
    Cluster, Namespace, NamespaceObject, PROJECT_ID_ANNOTATION, Project,
    RESOURCE_QUOTA_ANNOTATION, namespace_id, namespace_project_id, project_cluster_id,
    split_namespace_id,
};
