//! Diff engine for comparing current and desired quotas.
//!
//! Comparison is literal: each field differs when the current and desired
//! strings differ, including when one side is absent. A desired value that
//! leaves a field unset therefore clears that field on apply.

use serde::Serialize;

use crate::quota::{QuotaField, QuotaValue};

/// Change of a single quota field.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FieldChange {
    /// Whether the field differs.
    pub changed: bool,
    /// Current value (only recorded when changed).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub old: Option<String>,
    /// Desired value (only recorded when changed).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub new: Option<String>,
}

/// Field-wise difference between two quotas.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct QuotaDiff {
    /// CPU limit change.
    pub cpu_limit: FieldChange,
    /// Memory limit change.
    pub memory_limit: FieldChange,
    /// CPU reservation change.
    pub cpu_reservation: FieldChange,
    /// Memory reservation change.
    pub memory_reservation: FieldChange,
}

impl QuotaDiff {
    /// Computes the difference from `current` to `desired`.
    #[must_use]
    pub fn compute(current: &QuotaValue, desired: &QuotaValue) -> Self {
        let change = |field: QuotaField| {
            let old = current.get(field);
            let new = desired.get(field);
            if old == new {
                FieldChange::default()
            } else {
                FieldChange {
                    changed: true,
                    old: old.map(String::from),
                    new: new.map(String::from),
                }
            }
        };

        Self {
            cpu_limit: change(QuotaField::CpuLimit),
            memory_limit: change(QuotaField::MemoryLimit),
            cpu_reservation: change(QuotaField::CpuReservation),
            memory_reservation: change(QuotaField::MemoryReservation),
        }
    }

    /// Returns the change for one field.
    #[must_use]
    pub const fn field(&self, field: QuotaField) -> &FieldChange {
        match field {
            QuotaField::CpuLimit => &self.cpu_limit,
            QuotaField::MemoryLimit => &self.memory_limit,
            QuotaField::CpuReservation => &self.cpu_reservation,
            QuotaField::MemoryReservation => &self.memory_reservation,
        }
    }

    /// Returns true if any field differs.
    #[must_use]
    pub const fn has_changes(&self) -> bool {
        self.cpu_limit.changed
            || self.memory_limit.changed
            || self.cpu_reservation.changed
            || self.memory_reservation.changed
    }

    /// Iterates over the changed fields in display order.
    pub fn changes(&self) -> impl Iterator<Item = (QuotaField, &FieldChange)> {
        QuotaField::ALL
            .into_iter()
            .map(|field| (field, self.field(field)))
            .filter(|(_, change)| change.changed)
    }
}

/// Placeholder shown for an absent value.
pub const UNSET: &str = "(unset)";

impl std::fmt::Display for FieldChange {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} → {}",
            self.old.as_deref().unwrap_or(UNSET),
            self.new.as_deref().unwrap_or(UNSET)
        )
    }
}

impl std::fmt::Display for QuotaDiff {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for (field, change) in self.changes() {
            writeln!(f, "    {field}: {change}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_changes() {
        let quota = QuotaValue::new().with_cpu_limit("2000m").with_memory_limit("4Gi");
        let diff = QuotaDiff::compute(&quota, &quota);
        assert!(!diff.has_changes());
        assert_eq!(diff, QuotaDiff::default());
        assert_eq!(diff.changes().count(), 0);
    }

    #[test]
    fn test_single_field_change() {
        let current = QuotaValue::new().with_cpu_limit("1000m");
        let desired = QuotaValue::new().with_cpu_limit("2000m");
        let diff = QuotaDiff::compute(&current, &desired);

        assert!(diff.has_changes());
        assert!(diff.cpu_limit.changed);
        assert_eq!(diff.cpu_limit.old.as_deref(), Some("1000m"));
        assert_eq!(diff.cpu_limit.new.as_deref(), Some("2000m"));
        assert!(!diff.memory_limit.changed);
        assert!(diff.memory_limit.old.is_none());
    }

    #[test]
    fn test_absent_desired_clears_field() {
        let current = QuotaValue::new().with_cpu_limit("1000m").with_memory_limit("2Gi");
        let desired = QuotaValue::new().with_cpu_limit("1000m");
        let diff = QuotaDiff::compute(&current, &desired);

        assert!(diff.memory_limit.changed);
        assert_eq!(diff.memory_limit.old.as_deref(), Some("2Gi"));
        assert!(diff.memory_limit.new.is_none());
    }

    #[test]
    fn test_literal_magnitudes_differ() {
        let diff = QuotaDiff::compute(
            &QuotaValue::new().with_cpu_limit("1"),
            &QuotaValue::new().with_cpu_limit("1000m"),
        );
        assert!(diff.has_changes());
    }

    #[test]
    fn test_display_lines() {
        let diff = QuotaDiff::compute(
            &QuotaValue::new().with_cpu_limit("1000m"),
            &QuotaValue::new()
                .with_cpu_limit("2000m")
                .with_memory_reservation("1Gi"),
        );
        assert_eq!(
            diff.to_string(),
            "    CPU Limit: 1000m → 2000m\n    Memory Reservation: (unset) → 1Gi\n"
        );
    }
}
