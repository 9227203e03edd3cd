//! Configuration model types.
//!
//! This module defines the structs that map to the quota configuration file.
//! Maps keep declaration order, which is also the order plans are built in.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::quota::QuotaValue;
use crate::rancher::{ClientOptions, DEFAULT_MAX_ATTEMPTS, DEFAULT_TIMEOUT_SECS, RetryPolicy};

/// The root of the configuration file, before token resolution.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct QuotaConfig {
    /// Rancher instance URL.
    #[serde(default)]
    pub url: String,
    /// Literal API token.
    #[serde(default)]
    pub token: Option<String>,
    /// Name of an environment variable holding the API token.
    #[serde(default)]
    pub token_ref: Option<String>,
    /// Disables TLS certificate verification.
    #[serde(default)]
    pub insecure_skip_verify: bool,
    /// Per-request timeout in seconds.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    /// Attempt ceiling for control-plane calls.
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,
    /// Clusters keyed by a local label.
    #[serde(default)]
    pub clusters: IndexMap<String, ClusterConfig>,
}

/// Desired quotas for one cluster.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct ClusterConfig {
    /// Rancher cluster ID.
    #[serde(default)]
    pub cluster_id: String,
    /// Projects keyed by display name.
    #[serde(default)]
    pub projects: IndexMap<String, ProjectConfig>,
}

/// Desired quotas for one project and its namespaces.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct ProjectConfig {
    /// Quota for the project itself.
    #[serde(default)]
    pub project_quota: QuotaValue,
    /// Quotas for namespaces, keyed by namespace name.
    #[serde(default)]
    pub namespace_quotas: IndexMap<String, QuotaValue>,
}

/// A fully resolved instance configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstanceConfig {
    /// Rancher instance URL.
    pub url: String,
    /// Resolved API token.
    pub token: String,
    /// Whether TLS certificates are verified.
    pub verify_tls: bool,
    /// Per-request timeout in seconds.
    pub timeout_secs: u64,
    /// Attempt ceiling for control-plane calls.
    pub max_attempts: u32,
    /// Clusters keyed by a local label.
    pub clusters: IndexMap<String, ClusterConfig>,
}

const fn default_timeout_secs() -> u64 {
    DEFAULT_TIMEOUT_SECS
}

const fn default_max_attempts() -> u32 {
    DEFAULT_MAX_ATTEMPTS
}

impl InstanceConfig {
    /// Client options derived from this configuration.
    #[must_use]
    pub fn client_options(&self) -> ClientOptions {
        ClientOptions {
            verify_tls: self.verify_tls,
            timeout: Duration::from_secs(self.timeout_secs),
            retry: RetryPolicy::default().with_max_attempts(self.max_attempts),
        }
    }
}
