//! Configuration parser for loading quota configuration files.
//!
//! This module handles loading configuration from YAML files, the optional
//! `.env` file next to them, and resolving the API token and TLS settings
//! from the environment.

use crate::error::{ConfigError, QuotaError, Result};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use super::spec::{InstanceConfig, QuotaConfig};

/// Environment variable that disables TLS verification when truthy.
pub const INSECURE_ENV_VAR: &str = "RANCHER_INSECURE_SKIP_VERIFY";

/// Configuration parser for loading quota configuration.
#[derive(Debug, Default)]
pub struct ConfigParser {
    /// Base path for locating the `.env` file.
    base_path: Option<PathBuf>,
    /// Environment variable that overrides the configured token source.
    token_env_var: Option<String>,
}

impl ConfigParser {
    /// Creates a new configuration parser.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            base_path: None,
            token_env_var: None,
        }
    }

    /// Sets the base path for locating the `.env` file.
    #[must_use]
    pub fn with_base_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.base_path = Some(path.into());
        self
    }

    /// Reads the token from this environment variable instead of the file.
    #[must_use]
    pub fn with_token_env_var(mut self, name: Option<String>) -> Self {
        self.token_env_var = name.filter(|n| !n.is_empty());
        self
    }

    /// Loads configuration from a YAML file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load_file(&self, path: impl AsRef<Path>) -> Result<QuotaConfig> {
        let path = path.as_ref();
        info!("Loading configuration from: {}", path.display());

        if !path.exists() {
            return Err(QuotaError::Config(ConfigError::FileNotFound {
                path: path.to_path_buf(),
            }));
        }

        let content = std::fs::read_to_string(path).map_err(|e| {
            QuotaError::Config(ConfigError::ParseError {
                message: format!("Failed to read file: {e}"),
                location: Some(path.display().to_string()),
            })
        })?;

        self.parse_yaml(&content, Some(path))
    }

    /// Parses configuration from a YAML string.
    ///
    /// # Errors
    ///
    /// Returns an error if the YAML is invalid.
    pub fn parse_yaml(&self, content: &str, source: Option<&Path>) -> Result<QuotaConfig> {
        debug!("Parsing YAML configuration");

        let config: QuotaConfig = serde_yaml::from_str(content).map_err(|e| {
            let location = source.map(|p| p.display().to_string());
            QuotaError::Config(ConfigError::ParseError {
                message: format!("YAML parse error: {e}"),
                location,
            })
        })?;

        debug!(
            clusters = config.clusters.len(),
            "Parsed configuration for {}", config.url
        );
        Ok(config)
    }

    /// Loads the .env file if present.
    ///
    /// # Errors
    ///
    /// Returns an error if the .env file exists but cannot be loaded.
    pub fn load_dotenv(&self) -> Result<()> {
        let env_path = self
            .base_path
            .as_ref()
            .map_or_else(|| PathBuf::from(".env"), |p| p.join(".env"));

        if env_path.exists() {
            info!("Loading environment from: {}", env_path.display());
            dotenvy::from_path(&env_path).map_err(|e| {
                QuotaError::Config(ConfigError::ParseError {
                    message: format!("Failed to load .env file: {e}"),
                    location: Some(env_path.display().to_string()),
                })
            })?;
        } else {
            debug!(".env file not found at: {}", env_path.display());
        }

        Ok(())
    }

    /// Resolves the token and TLS settings from the process environment.
    ///
    /// # Errors
    ///
    /// Returns an error if no token can be resolved.
    pub fn resolve(&self, config: QuotaConfig) -> Result<InstanceConfig> {
        self.resolve_with(config, |name| std::env::var(name).ok())
    }

    /// Resolves the token and TLS settings using `lookup` for variables.
    ///
    /// The first configured token source wins: the override variable, then
    /// `token_ref`, then the literal `token`.
    ///
    /// # Errors
    ///
    /// Returns an error if the chosen source yields no token.
    pub fn resolve_with<F>(&self, config: QuotaConfig, lookup: F) -> Result<InstanceConfig>
    where
        F: Fn(&str) -> Option<String>,
    {
        let (token, source) = if let Some(name) = &self.token_env_var {
            (lookup(name), format!("environment variable {name}"))
        } else if let Some(name) = &config.token_ref {
            (lookup(name), format!("environment variable {name} (token_ref)"))
        } else {
            (config.token.clone(), String::from("literal token"))
        };

        let token = token.filter(|t| !t.is_empty()).ok_or_else(|| {
            QuotaError::Config(ConfigError::MissingToken {
                message: format!(
                    "{source} is empty or unset; provide 'token' or 'token_ref' in the config, or --token-env-var"
                ),
            })
        })?;
        debug!("Using API token {} from {source}", mask_secret(&token));

        let env_insecure = lookup(INSECURE_ENV_VAR).is_some_and(|v| is_truthy(&v));
        if config.insecure_skip_verify || env_insecure {
            info!("TLS certificate verification disabled");
        }

        Ok(InstanceConfig {
            url: config.url,
            token,
            verify_tls: !(config.insecure_skip_verify || env_insecure),
            timeout_secs: config.timeout_secs,
            max_attempts: config.max_attempts,
            clusters: config.clusters,
        })
    }
}

fn is_truthy(value: &str) -> bool {
    matches!(value.trim().to_ascii_lowercase().as_str(), "1" | "true" | "yes")
}

/// Masks a secret for logging, keeping the first and last four characters.
#[must_use]
pub fn mask_secret(secret: &str) -> String {
    let chars: Vec<char> = secret.chars().collect();
    if chars.len() < 8 {
        return String::from("***");
    }
    let head: String = chars[..4].iter().collect();
    let tail: String = chars[chars.len() - 4..].iter().collect();
    format!("{head}***{tail}")
}

/// Default configuration file names to search for.
pub const DEFAULT_CONFIG_FILES: &[&str] = &[
    "quotactl.yaml",
    "quotactl.yml",
    "quotas.yaml",
    "quotas.yml",
];

/// Finds the configuration file in the current directory or parent directories.
///
/// # Errors
///
/// Returns an error if no configuration file is found.
pub fn find_config_file(start_dir: impl AsRef<Path>) -> Result<PathBuf> {
    let start = start_dir.as_ref();
    let mut current = start.to_path_buf();

    loop {
        for filename in DEFAULT_CONFIG_FILES {
            let config_path = current.join(filename);
            if config_path.exists() {
                info!("Found configuration file: {}", config_path.display());
                return Ok(config_path);
            }
        }

        if !current.pop() {
            break;
        }
    }

    Err(QuotaError::Config(ConfigError::FileNotFound {
        path: start.join(DEFAULT_CONFIG_FILES[0]),
    }))
}
