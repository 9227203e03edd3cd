//! Configuration validation for quota configurations.
//!
//! This module checks a parsed configuration before any network call is
//! made, so that configuration mistakes fail fast.

use crate::error::{ConfigError, QuotaError, Result};
use std::collections::HashMap;
use tracing::{debug, warn};

use super::spec::{ClusterConfig, QuotaConfig};

/// Maximum length of a Kubernetes namespace name.
const MAX_NAMESPACE_LEN: usize = 63;

/// Validator for quota configurations.
#[derive(Debug, Default)]
pub struct ConfigValidator;

/// Validation result containing all errors found.
#[derive(Debug, Default)]
pub struct ValidationResult {
    /// List of validation errors.
    pub errors: Vec<ValidationError>,
    /// List of warnings (non-fatal issues).
    pub warnings: Vec<String>,
}

/// A single validation error.
#[derive(Debug)]
pub struct ValidationError {
    /// The field path that failed validation.
    pub field: String,
    /// The error message.
    pub message: String,
}

impl ConfigValidator {
    /// Creates a new validator.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    /// Validates a quota configuration.
    ///
    /// # Errors
    ///
    /// Returns the first error found, if any.
    pub fn validate(&self, config: &QuotaConfig) -> Result<ValidationResult> {
        let mut result = ValidationResult::default();

        Self::validate_instance(config, &mut result);
        Self::validate_clusters(config, &mut result);

        for warning in &result.warnings {
            warn!("{warning}");
        }

        if result.errors.is_empty() {
            debug!("Configuration validation passed");
            Ok(result)
        } else {
            let first_error = &result.errors[0];
            Err(QuotaError::Config(ConfigError::ValidationError {
                message: first_error.message.clone(),
                field: Some(first_error.field.clone()),
            }))
        }
    }

    fn validate_instance(config: &QuotaConfig, result: &mut ValidationResult) {
        if config.url.trim().is_empty() {
            result.errors.push(ValidationError {
                field: String::from("url"),
                message: String::from("Config must contain 'url' field"),
            });
        } else if !(config.url.starts_with("https://") || config.url.starts_with("http://")) {
            result.errors.push(ValidationError {
                field: String::from("url"),
                message: format!("URL '{}' must start with http:// or https://", config.url),
            });
        } else if config.url.starts_with("http://") {
            result
                .warnings
                .push(format!("URL '{}' is not using TLS", config.url));
        }

        if config.timeout_secs == 0 {
            result.errors.push(ValidationError {
                field: String::from("timeout_secs"),
                message: String::from("Timeout must be at least 1 second"),
            });
        }

        if config.max_attempts == 0 {
            result.errors.push(ValidationError {
                field: String::from("max_attempts"),
                message: String::from("At least one attempt is required"),
            });
        }
    }

    fn validate_clusters(config: &QuotaConfig, result: &mut ValidationResult) {
        if config.clusters.is_empty() {
            result
                .warnings
                .push(String::from("No clusters defined in configuration"));
        }

        let mut seen_ids: HashMap<&str, &str> = HashMap::new();
        for (label, cluster) in &config.clusters {
            if cluster.cluster_id.trim().is_empty() {
                result.errors.push(ValidationError {
                    field: format!("clusters.{label}.cluster_id"),
                    message: format!("Cluster '{label}' must have 'cluster_id'"),
                });
                continue;
            }

            if let Some(previous) = seen_ids.insert(&cluster.cluster_id, label) {
                result.warnings.push(format!(
                    "Clusters '{previous}' and '{label}' both target cluster ID '{}'",
                    cluster.cluster_id
                ));
            }

            Self::validate_projects(label, cluster, result);
        }
    }

    fn validate_projects(label: &str, cluster: &ClusterConfig, result: &mut ValidationResult) {
        for (project_name, project) in &cluster.projects {
            let nothing_to_enforce = project.project_quota.is_empty()
                && project.namespace_quotas.values().all(|q| q.is_empty());
            if nothing_to_enforce {
                result.warnings.push(format!(
                    "Project '{project_name}' in cluster '{label}' declares no quotas"
                ));
            }

            for (namespace, quota) in &project.namespace_quotas {
                if !is_valid_namespace_name(namespace) {
                    result.errors.push(ValidationError {
                        field: format!(
                            "clusters.{label}.projects.{project_name}.namespace_quotas.{namespace}"
                        ),
                        message: format!(
                            "Namespace name '{namespace}' is invalid. Must be a lowercase DNS label."
                        ),
                    });
                } else if quota.is_empty() && !project.project_quota.is_empty() {
                    result.warnings.push(format!(
                        "Namespace '{namespace}' in project '{project_name}' has an empty quota and will be skipped"
                    ));
                }
            }
        }
    }
}

/// Checks if a name is a valid Kubernetes namespace name (RFC 1123 label).
fn is_valid_namespace_name(name: &str) -> bool {
    if name.is_empty() || name.len() > MAX_NAMESPACE_LEN {
        return false;
    }

    if !name
        .chars()
        .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-')
    {
        return false;
    }

    !name.starts_with('-') && !name.ends_with('-')
}

impl ValidationResult {
    /// Returns true if validation passed (no errors).
    #[must_use]
    pub const fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}
