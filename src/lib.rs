// ============================================================================
// Strict linting - Dangerous or non-idiomatic practices are forbidden
// ============================================================================

#![deny(warnings)]                    // All warnings are treated as errors
#![deny(unsafe_code)]                 // Unsafe code is forbidden
#![deny(missing_docs)]                // All public items must be documented
#![deny(dead_code)]                   // Unused code is forbidden
#![deny(non_camel_case_types)]        // Types must follow CamelCase convention

// Additional strictness - Leave nothing unchecked
#![deny(unused_imports)]              // Unused imports are forbidden
#![deny(unused_variables)]            // Unused variables are forbidden
#![deny(unused_must_use)]             // Must handle Result and Option explicitly
#![deny(non_snake_case)]              // Variables and functions must be snake_case
#![deny(non_upper_case_globals)]      // Constants must be UPPER_CASE
#![deny(nonstandard_style)]           // Non-standard code style is forbidden
#![forbid(unsafe_op_in_unsafe_fn)]    // Unsafe ops in unsafe fns are forbidden

// Clippy lints (warnings only)
#![warn(clippy::all)]                 // All standard Clippy lints
#![warn(clippy::pedantic)]            // Very strict Clippy lints
#![warn(clippy::nursery)]             // Experimental lints
#![warn(clippy::unwrap_used)]         // unwrap() warning
#![warn(clippy::expect_used)]         // expect() warning
#![warn(clippy::panic)]               // panic!() warning
#![warn(clippy::print_stdout)]        // println!() warning
#![warn(clippy::todo)]                // TODO warning
#![warn(clippy::unimplemented)]       // unimplemented!() warning
#![warn(clippy::missing_const_for_fn)] // Force const when possible
#![warn(clippy::unwrap_in_result)]    // unwrap() in Result warning
#![warn(clippy::module_inception)]    // Module with same name as crate warning
#![warn(clippy::redundant_clone)]     // Useless clones warning
#![warn(clippy::shadow_unrelated)]    // Shadowing unrelated variables warning
#![warn(clippy::too_many_arguments)]  // Limit function arguments
#![warn(clippy::cognitive_complexity)] // Limit cognitive complexity

// Safety and robustness lints
#![deny(overflowing_literals)]        // Overflowing literals are forbidden
#![deny(arithmetic_overflow)]         // Arithmetic overflow is forbidden

// ============================================================================
// Crate Documentation
// ============================================================================

//! # quotactl
//!
//! Declarative, idempotent reconciliation of Rancher project and namespace
//! resource quotas.
//!
//! ## Overview
//!
//! quotactl reads the desired CPU and memory quotas of Rancher projects and
//! namespaces from a YAML file and converges the live state towards it:
//!
//! - Plan: compare every configured quota with what Rancher reports
//! - Dry run: print the plan without writing anything
//! - Apply: write each changed quota, isolating per-item failures
//! - Report: render the live quotas of every cluster as an HTML page
//!
//! Project quotas go through the Rancher v3 API. Namespace quotas live in a
//! namespace annotation and are written through each cluster's Kubernetes
//! API, using a kubeconfig generated by Rancher.
//!
//! ## Modules
//!
//! - [`config`]: Configuration parsing, token resolution and validation
//! - [`quota`]: Quota values and their wire format
//! - [`rancher`]: Rancher and Kubernetes API clients
//! - [`planner`]: Diff computation, planning and execution
//! - [`report`]: HTML quota report
//! - [`cli`]: Command-line interface
//!
//! ## Example
//!
//! ```yaml
//! url: https://rancher.example.com
//! token_ref: RANCHER_TOKEN
//! clusters:
//!   prod:
//!     cluster_id: c-abc12
//!     projects:
//!       team-a:
//!         project_quota:
//!           cpu_limit: 4000m
//!           memory_limit: 8Gi
//!         namespace_quotas:
//!           web:
//!             cpu_limit: 1000m
//! ```

// ============================================================================
// Modules
// ============================================================================

pub mod cli;
pub mod config;
pub mod error;
pub mod planner;
pub mod quota;
pub mod rancher;
pub mod report;

// ============================================================================
// Re-exports
// ============================================================================

pub use cli::{Cli, Commands, OutputFormatter};
pub use config::{ConfigParser, ConfigValidator, InstanceConfig, QuotaConfig};
pub use error::{ErrorKind, QuotaError, Result};
pub use planner::{ExecutionSummary, Executor, PlanItem, Planner, QuotaDiff};
pub use quota::{QuotaField, QuotaValue};
pub use rancher::{QuotaBackend, RancherClient};
pub use report::generate_report;
