//! Kubeconfig decoding.
//!
//! Rancher generates a kubeconfig per cluster; only the current context is
//! used, and only bearer-token users are supported.

use kube::Config;
use kube::config::{KubeConfigOptions, Kubeconfig};
use std::time::Duration;

use crate::error::{ApiError, ConfigError, Result};

/// Builds the cluster API configuration described by a kubeconfig document.
///
/// Without a `current-context` the first context is used. When `verify_tls`
/// is false certificates are not checked, whatever the kubeconfig says.
///
/// # Errors
///
/// Returns an invalid-response error for malformed documents and a
/// configuration error when the user authenticates without a token.
pub async fn cluster_config(content: &str, verify_tls: bool, timeout: Duration) -> Result<Config> {
    let kubeconfig = Kubeconfig::from_yaml(content)
        .map_err(|e| ApiError::invalid_response(format!("Invalid kubeconfig format: {e}")))?;
    let context = usable_context(&kubeconfig)?;

    let options = KubeConfigOptions {
        context: Some(context),
        ..KubeConfigOptions::default()
    };
    let mut config = Config::from_custom_kubeconfig(kubeconfig, &options)
        .await
        .map_err(|e| ApiError::invalid_response(format!("Unusable kubeconfig: {e}")))?;

    if !verify_tls {
        config.accept_invalid_certs = true;
    }
    config.connect_timeout = Some(timeout);
    config.read_timeout = Some(timeout);
    Ok(config)
}

/// Picks the context to connect with and checks its cluster and user.
fn usable_context(kubeconfig: &Kubeconfig) -> Result<String> {
    let named = match kubeconfig.current_context.as_deref() {
        Some(name) => kubeconfig.contexts.iter().find(|c| c.name == name),
        None => kubeconfig.contexts.first(),
    }
    .ok_or_else(|| ApiError::invalid_response("Kubeconfig has no usable context"))?;
    let context = named.context.as_ref().ok_or_else(|| {
        ApiError::invalid_response(format!("Kubeconfig context '{}' is empty", named.name))
    })?;

    let cluster = kubeconfig
        .clusters
        .iter()
        .find(|c| c.name == context.cluster)
        .ok_or_else(|| {
            ApiError::invalid_response(format!(
                "Kubeconfig context references unknown cluster '{}'",
                context.cluster
            ))
        })?;
    let has_server = cluster
        .cluster
        .as_ref()
        .and_then(|c| c.server.as_deref())
        .is_some_and(|s| !s.is_empty());
    if !has_server {
        return Err(ApiError::invalid_response("Kubeconfig cluster has no server URL").into());
    }

    let user_name = context.user.as_deref().unwrap_or_default();
    let user = kubeconfig
        .auth_infos
        .iter()
        .find(|u| u.name == user_name)
        .and_then(|u| u.auth_info.as_ref())
        .ok_or_else(|| {
            ApiError::invalid_response(format!(
                "Kubeconfig context references unknown user '{user_name}'"
            ))
        })?;

    if user.token.is_some() || user.token_file.is_some() {
        return Ok(named.name.clone());
    }
    let message = if user.client_certificate.is_some() || user.client_certificate_data.is_some() {
        "client certificate authentication is not supported"
    } else {
        "kubeconfig user has no bearer token"
    };
    Err(ConfigError::UnsupportedAuth {
        message: message.to_string(),
    }
    .into())
}
