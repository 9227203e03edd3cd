//! Quota values and their Rancher wire encoding.
//!
//! A [`QuotaValue`] holds up to four opaque magnitude strings (CPU and memory
//! limits and reservations). Magnitudes are compared as plain strings: `"1"`
//! and `"1000m"` are different values.
//!
//! On the wire a quota looks like:
//!
//! ```json
//! {"resourceQuota": {"limit": {"cpu": "2000m", "memory": "4Gi"},
//!                    "reservation": {"cpu": "1000m", "memory": "2Gi"}}}
//! ```
//!
//! Decoding also accepts the legacy Rancher keys `limitsCpu`, `limitsMemory`,
//! `requestsCpu` and `requestsMemory` under `limit`, preferring the canonical
//! keys when both are present.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

use crate::error::ApiError;

/// Key wrapping the quota body in project and namespace resources.
pub const RESOURCE_QUOTA_KEY: &str = "resourceQuota";

/// One of the four quota dimensions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum QuotaField {
    /// CPU limit.
    CpuLimit,
    /// Memory limit.
    MemoryLimit,
    /// CPU reservation.
    CpuReservation,
    /// Memory reservation.
    MemoryReservation,
}

impl QuotaField {
    /// All fields in display order.
    pub const ALL: [Self; 4] = [
        Self::CpuLimit,
        Self::MemoryLimit,
        Self::CpuReservation,
        Self::MemoryReservation,
    ];

    /// Human-readable label.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::CpuLimit => "CPU Limit",
            Self::MemoryLimit => "Memory Limit",
            Self::CpuReservation => "CPU Reservation",
            Self::MemoryReservation => "Memory Reservation",
        }
    }
}

impl std::fmt::Display for QuotaField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// Desired or observed quota for a project or namespace.
///
/// A field is either absent or a non-empty magnitude string; empty strings are
/// normalized to absent on every construction path.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuotaValue {
    #[serde(default, deserialize_with = "magnitude", skip_serializing_if = "Option::is_none")]
    cpu_limit: Option<String>,
    #[serde(default, deserialize_with = "magnitude", skip_serializing_if = "Option::is_none")]
    memory_limit: Option<String>,
    #[serde(default, deserialize_with = "magnitude", skip_serializing_if = "Option::is_none")]
    cpu_reservation: Option<String>,
    #[serde(default, deserialize_with = "magnitude", skip_serializing_if = "Option::is_none")]
    memory_reservation: Option<String>,
}

impl QuotaValue {
    /// Creates an empty quota.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            cpu_limit: None,
            memory_limit: None,
            cpu_reservation: None,
            memory_reservation: None,
        }
    }

    /// Returns a copy with the CPU limit set.
    #[must_use]
    pub fn with_cpu_limit(mut self, value: impl Into<String>) -> Self {
        self.cpu_limit = non_empty(Some(value.into()));
        self
    }

    /// Returns a copy with the memory limit set.
    #[must_use]
    pub fn with_memory_limit(mut self, value: impl Into<String>) -> Self {
        self.memory_limit = non_empty(Some(value.into()));
        self
    }

    /// Returns a copy with the CPU reservation set.
    #[must_use]
    pub fn with_cpu_reservation(mut self, value: impl Into<String>) -> Self {
        self.cpu_reservation = non_empty(Some(value.into()));
        self
    }

    /// Returns a copy with the memory reservation set.
    #[must_use]
    pub fn with_memory_reservation(mut self, value: impl Into<String>) -> Self {
        self.memory_reservation = non_empty(Some(value.into()));
        self
    }

    /// CPU limit, if set.
    #[must_use]
    pub fn cpu_limit(&self) -> Option<&str> {
        self.cpu_limit.as_deref()
    }

    /// Memory limit, if set.
    #[must_use]
    pub fn memory_limit(&self) -> Option<&str> {
        self.memory_limit.as_deref()
    }

    /// CPU reservation, if set.
    #[must_use]
    pub fn cpu_reservation(&self) -> Option<&str> {
        self.cpu_reservation.as_deref()
    }

    /// Memory reservation, if set.
    #[must_use]
    pub fn memory_reservation(&self) -> Option<&str> {
        self.memory_reservation.as_deref()
    }

    /// Returns the value of one field.
    #[must_use]
    pub fn get(&self, field: QuotaField) -> Option<&str> {
        match field {
            QuotaField::CpuLimit => self.cpu_limit(),
            QuotaField::MemoryLimit => self.memory_limit(),
            QuotaField::CpuReservation => self.cpu_reservation(),
            QuotaField::MemoryReservation => self.memory_reservation(),
        }
    }

    /// Returns true when no field is set.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.cpu_limit.is_none()
            && self.memory_limit.is_none()
            && self.cpu_reservation.is_none()
            && self.memory_reservation.is_none()
    }

    /// Encodes the quota body (`{"limit": .., "reservation": ..}`).
    ///
    /// Empty parts are omitted, so an empty quota encodes as `{}`.
    #[must_use]
    pub fn wire_body(&self) -> Value {
        let limit = WireLimit {
            cpu: self.cpu_limit.clone(),
            memory: self.memory_limit.clone(),
            ..WireLimit::default()
        };
        let reservation = WireReservation {
            cpu: self.cpu_reservation.clone(),
            memory: self.memory_reservation.clone(),
        };
        let body = WireQuota {
            limit: (!limit.is_empty()).then_some(limit),
            reservation: (!reservation.is_empty()).then_some(reservation),
        };
        serde_json::to_value(body).unwrap_or_else(|_| Value::Object(Map::new()))
    }

    /// Encodes the quota as resource fields (`{"resourceQuota": body}`).
    ///
    /// Returns an empty object when nothing is set.
    #[must_use]
    pub fn to_wire(&self) -> Value {
        let mut fields = Map::new();
        if !self.is_empty() {
            fields.insert(RESOURCE_QUOTA_KEY.to_string(), self.wire_body());
        }
        Value::Object(fields)
    }

    /// Decodes a quota from a resource or a bare quota body.
    ///
    /// The body is looked up under `resourceQuota`, then under
    /// `spec.resourceQuota`, and finally the value itself is read as a body.
    ///
    /// # Errors
    ///
    /// Returns an error if the body is not shaped like a quota.
    pub fn from_wire(resource: &Value) -> Result<Self, ApiError> {
        let body = locate_body(resource);
        let wire: WireQuota = serde_json::from_value(body.clone())
            .map_err(|e| ApiError::invalid_response(format!("Malformed quota: {e}")))?;

        let limit = wire.limit.unwrap_or_default();
        let reservation = wire.reservation.unwrap_or_default();

        Ok(Self {
            cpu_limit: non_empty(limit.cpu).or_else(|| non_empty(limit.limits_cpu)),
            memory_limit: non_empty(limit.memory).or_else(|| non_empty(limit.limits_memory)),
            cpu_reservation: non_empty(reservation.cpu).or_else(|| non_empty(limit.requests_cpu)),
            memory_reservation: non_empty(reservation.memory)
                .or_else(|| non_empty(limit.requests_memory)),
        })
    }
}

impl std::fmt::Display for QuotaValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.is_empty() {
            return write!(f, "(no quota)");
        }
        let mut first = true;
        for field in QuotaField::ALL {
            if let Some(value) = self.get(field) {
                if !first {
                    write!(f, ", ")?;
                }
                write!(f, "{field}={value}")?;
                first = false;
            }
        }
        Ok(())
    }
}

/// Finds the quota body inside a resource.
fn locate_body(resource: &Value) -> &Value {
    resource
        .get(RESOURCE_QUOTA_KEY)
        .filter(|v| is_present(v))
        .or_else(|| {
            resource
                .get("spec")
                .and_then(|spec| spec.get(RESOURCE_QUOTA_KEY))
                .filter(|v| is_present(v))
        })
        .unwrap_or(resource)
}

fn is_present(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Object(map) => !map.is_empty(),
        _ => true,
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}

/// Accepts magnitudes written as strings or bare numbers.
fn magnitude<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Magnitude {
        Text(String),
        Integer(i64),
        Float(f64),
    }

    let value = Option::<Magnitude>::deserialize(deserializer)?;
    Ok(non_empty(value.map(|m| match m {
        Magnitude::Text(s) => s,
        Magnitude::Integer(i) => i.to_string(),
        Magnitude::Float(x) => x.to_string(),
    })))
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct WireQuota {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    limit: Option<WireLimit>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    reservation: Option<WireReservation>,
}

#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct WireLimit {
    #[serde(default, deserialize_with = "magnitude", skip_serializing_if = "Option::is_none")]
    cpu: Option<String>,
    #[serde(default, deserialize_with = "magnitude", skip_serializing_if = "Option::is_none")]
    memory: Option<String>,
    #[serde(default, deserialize_with = "magnitude", skip_serializing_if = "Option::is_none")]
    limits_cpu: Option<String>,
    #[serde(default, deserialize_with = "magnitude", skip_serializing_if = "Option::is_none")]
    limits_memory: Option<String>,
    #[serde(default, deserialize_with = "magnitude", skip_serializing_if = "Option::is_none")]
    requests_cpu: Option<String>,
    #[serde(default, deserialize_with = "magnitude", skip_serializing_if = "Option::is_none")]
    requests_memory: Option<String>,
}

impl WireLimit {
    const fn is_empty(&self) -> bool {
        self.cpu.is_none() && self.memory.is_none()
    }
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct WireReservation {
    #[serde(default, deserialize_with = "magnitude", skip_serializing_if = "Option::is_none")]
    cpu: Option<String>,
    #[serde(default, deserialize_with = "magnitude", skip_serializing_if = "Option::is_none")]
    memory: Option<String>,
}

impl WireReservation {
    const fn is_empty(&self) -> bool {
        self.cpu.is_none() && self.memory.is_none()
    }
}
