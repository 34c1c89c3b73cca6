//! Plan feature limits.
//!
//! Plans carry a free-form JSON object of features. Numeric entries are
//! limits (`max_services`, `max_shops`, ...). Other entries are kept as-is
//! and passed through to the backend. A missing limit or a negative value
//! means unlimited.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

use super::service::ServiceType;

/// Feature key for the cross-service total.
pub const MAX_SERVICES: &str = "max_services";

/// Resolved numeric limit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Limit {
    Unlimited,
    AtMost(u32),
}

impl Limit {
    /// Whether `count` existing instances already exhaust this limit.
    #[must_use]
    pub const fn is_reached(self, count: u32) -> bool {
        match self {
            Self::Unlimited => false,
            Self::AtMost(max) => count >= max,
        }
    }
}

impl std::fmt::Display for Limit {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Unlimited => f.write_str("unlimited"),
            Self::AtMost(max) => write!(f, "{max}"),
        }
    }
}

/// Feature map attached to a plan.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PlanFeatures(BTreeMap<String, JsonValue>);

impl PlanFeatures {
    /// Build from a JSON object. Non-object values yield an empty map.
    #[must_use]
    pub fn from_json(value: JsonValue) -> Self {
        match value {
            JsonValue::Object(map) => Self(map.into_iter().collect()),
            _ => Self::default(),
        }
    }

    /// The features as a JSON object.
    #[must_use]
    pub fn to_json(&self) -> JsonValue {
        JsonValue::Object(self.0.clone().into_iter().collect())
    }

    /// Built-in free plan used when nothing better is cached: one service
    /// in total and one of each type.
    #[must_use]
    pub fn free() -> Self {
        let mut map = BTreeMap::new();
        map.insert(MAX_SERVICES.to_owned(), JsonValue::from(1));
        for service in ServiceType::ALL {
            map.insert(service.limit_key().to_owned(), JsonValue::from(1));
        }
        Self(map)
    }

    /// Set a numeric limit. Negative values mean unlimited.
    #[must_use]
    pub fn with_limit(mut self, key: &str, value: i64) -> Self {
        self.0.insert(key.to_owned(), JsonValue::from(value));
        self
    }

    /// Resolve a numeric limit by key.
    ///
    /// Integers and integer-valued strings are accepted since backends are
    /// not consistent about JSON number encoding.
    #[must_use]
    pub fn limit(&self, key: &str) -> Limit {
        let raw = match self.0.get(key) {
            Some(JsonValue::Number(n)) => n.as_i64(),
            Some(JsonValue::String(s)) => s.trim().parse::<i64>().ok(),
            _ => None,
        };
        match raw {
            Some(n) if n >= 0 => Limit::AtMost(u32::try_from(n).unwrap_or(u32::MAX)),
            _ => Limit::Unlimited,
        }
    }

    /// Limit on the total number of services across all types.
    #[must_use]
    pub fn total_limit(&self) -> Limit {
        self.limit(MAX_SERVICES)
    }

    /// Limit for one service type.
    #[must_use]
    pub fn service_limit(&self, service: ServiceType) -> Limit {
        self.limit(service.limit_key())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_and_negative_limits_are_unlimited() {
        let features = PlanFeatures::default().with_limit(MAX_SERVICES, -1);
        assert_eq!(features.total_limit(), Limit::Unlimited);
        assert_eq!(features.service_limit(ServiceType::Shop), Limit::Unlimited);
    }

    #[test]
    fn test_string_limits_are_parsed() {
        let features = PlanFeatures::from_json(serde_json::json!({ "max_shops": "3" }));
        assert_eq!(features.service_limit(ServiceType::Shop), Limit::AtMost(3));
    }

    #[test]
    fn test_free_plan_caps_everything_at_one() {
        let free = PlanFeatures::free();
        assert_eq!(free.total_limit(), Limit::AtMost(1));
        for service in ServiceType::ALL {
            assert_eq!(free.service_limit(service), Limit::AtMost(1));
        }
    }

    #[test]
    fn test_non_object_json_is_empty() {
        let features = PlanFeatures::from_json(serde_json::json!([1, 2]));
        assert_eq!(features, PlanFeatures::default());
    }

    #[test]
    fn test_limit_is_reached() {
        assert!(Limit::AtMost(1).is_reached(1));
        assert!(!Limit::AtMost(2).is_reached(1));
        assert!(!Limit::Unlimited.is_reached(u32::MAX));
    }
}
