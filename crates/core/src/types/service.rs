//! Service types a user can create.

use serde::{Deserialize, Serialize};

use crate::types::{CvId, InvitationId, MenuId, PortfolioId, ShopId};

/// One of the five creatable micro-service kinds.
///
/// Each kind is gated separately by the owner's subscription plan.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ServiceType {
    /// Digital restaurant menu.
    Menu,
    /// Work portfolio.
    Portfolio,
    /// Curriculum vitae.
    Cv,
    /// Product catalogue.
    Shop,
    /// Event invitation with RSVP.
    Invitation,
}

impl ServiceType {
    /// Every service type in display order.
    pub const ALL: [Self; 5] = [
        Self::Menu,
        Self::Portfolio,
        Self::Cv,
        Self::Shop,
        Self::Invitation,
    ];

    /// Wire name, also used as the storage folder for uploaded images.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Menu => "menu",
            Self::Portfolio => "portfolio",
            Self::Cv => "cv",
            Self::Shop => "shop",
            Self::Invitation => "invitation",
        }
    }

    /// Plan feature key capping how many of this type an owner may have.
    #[must_use]
    pub const fn limit_key(self) -> &'static str {
        match self {
            Self::Menu => "max_menus",
            Self::Portfolio => "max_portfolios",
            Self::Cv => "max_cvs",
            Self::Shop => "max_shops",
            Self::Invitation => "max_invitations",
        }
    }
}

impl std::fmt::Display for ServiceType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for ServiceType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "menu" => Ok(Self::Menu),
            "portfolio" => Ok(Self::Portfolio),
            "cv" => Ok(Self::Cv),
            "shop" => Ok(Self::Shop),
            "invitation" => Ok(Self::Invitation),
            _ => Err(format!("invalid service type: {s}")),
        }
    }
}

/// A reference to one service instance, typed by its kind.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "service", content = "id", rename_all = "snake_case")]
pub enum ServiceRef {
    Menu(MenuId),
    Portfolio(PortfolioId),
    Cv(CvId),
    Shop(ShopId),
    Invitation(InvitationId),
}

impl ServiceRef {
    #[must_use]
    pub const fn service_type(&self) -> ServiceType {
        match self {
            Self::Menu(_) => ServiceType::Menu,
            Self::Portfolio(_) => ServiceType::Portfolio,
            Self::Cv(_) => ServiceType::Cv,
            Self::Shop(_) => ServiceType::Shop,
            Self::Invitation(_) => ServiceType::Invitation,
        }
    }

    /// The referenced row id.
    #[must_use]
    pub fn id(&self) -> &str {
        match self {
            Self::Menu(id) => id.as_str(),
            Self::Portfolio(id) => id.as_str(),
            Self::Cv(id) => id.as_str(),
            Self::Shop(id) => id.as_str(),
            Self::Invitation(id) => id.as_str(),
        }
    }
}

impl std::fmt::Display for ServiceRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.service_type(), self.id())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_service_type_round_trips_through_str() {
        for service in ServiceType::ALL {
            assert_eq!(service.as_str().parse::<ServiceType>(), Ok(service));
        }
        assert!("blog".parse::<ServiceType>().is_err());
    }

    #[test]
    fn test_service_ref_knows_its_type() {
        let reference = ServiceRef::Shop(ShopId::new("s1"));
        assert_eq!(reference.service_type(), ServiceType::Shop);
        assert_eq!(reference.to_string(), "shop/s1");
    }

    #[test]
    fn test_limit_keys() {
        assert_eq!(ServiceType::Shop.limit_key(), "max_shops");
        assert_eq!(ServiceType::Cv.limit_key(), "max_cvs");
    }
}
