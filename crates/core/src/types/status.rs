//! Status enums stored as text both locally and on the wire.

use serde::{Deserialize, Serialize};

/// Lifecycle status of a subscription.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum SubscriptionStatus {
    #[default]
    Active,
    Canceled,
    Expired,
}

impl SubscriptionStatus {
    /// Text form used in storage.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Canceled => "canceled",
            Self::Expired => "expired",
        }
    }
}

impl std::fmt::Display for SubscriptionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for SubscriptionStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "active" => Ok(Self::Active),
            "canceled" | "cancelled" => Ok(Self::Canceled),
            "expired" => Ok(Self::Expired),
            _ => Err(format!("invalid subscription status: {s}")),
        }
    }
}

/// A guest's answer to an invitation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RsvpStatus {
    Attending,
    Declined,
    Maybe,
}

impl RsvpStatus {
    /// Text form used in storage.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Attending => "attending",
            Self::Declined => "declined",
            Self::Maybe => "maybe",
        }
    }
}

impl std::fmt::Display for RsvpStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for RsvpStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "attending" => Ok(Self::Attending),
            "declined" => Ok(Self::Declined),
            "maybe" => Ok(Self::Maybe),
            _ => Err(format!("invalid rsvp status: {s}")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_subscription_status_accepts_both_spellings() {
        assert_eq!("canceled".parse(), Ok(SubscriptionStatus::Canceled));
        assert_eq!("cancelled".parse(), Ok(SubscriptionStatus::Canceled));
        assert!("paused".parse::<SubscriptionStatus>().is_err());
    }

    #[test]
    fn test_rsvp_status_serde_is_snake_case() {
        let json = serde_json::to_string(&RsvpStatus::Attending).unwrap();
        assert_eq!(json, "\"attending\"");
    }
}
