//! Planning module for quota reconciliation.
//!
//! This module compares desired and observed quotas, produces the ordered
//! list of changes, and applies it.

mod diff;
mod executor;
mod plan;

pub use diff::{FieldChange, QuotaDiff, UNSET};
pub use executor::{ExecutionResult, ExecutionSummary, Executor, FailureEntry};
pub use plan::{PlanItem, PlanSelection, Planner, ResourceKind};
