//! Configuration module for the quota reconciler.
//!
//! This module handles all configuration-related functionality:
//! - Parsing and deserializing the quota configuration file
//! - Resolving the API token and TLS settings from the environment
//! - Validation of configuration values

mod parser;
mod spec;
mod validator;

pub use parser::{
    ConfigParser, DEFAULT_CONFIG_FILES, INSECURE_ENV_VAR, find_config_file, mask_secret,
};
pub use spec::{ClusterConfig, InstanceConfig, ProjectConfig, QuotaConfig};
pub use validator::{ConfigValidator, ValidationError, ValidationResult};
