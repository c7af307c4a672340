//! Common enums shared by server and clients

use serde::{Deserialize, Serialize};

/// Account role
///
/// Assigned once at registration; there is no promotion flow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Places orders and picks them up
    Buyer,
    /// Manages the catalog and serves orders
    Seller,
}

/// Error returned when parsing an unknown role string
#[derive(Debug, thiserror::Error)]
#[error("unknown role: {0}")]
pub struct InvalidRole(pub String);

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Buyer => "buyer",
            Role::Seller => "seller",
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Role {
    type Err = InvalidRole;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "buyer" => Ok(Role::Buyer),
            "seller" => Ok(Role::Seller),
            other => Err(InvalidRole(other.to_string())),
        }
    }
}

impl Default for Role {
    /// Registration defaults to buyer when no role is given
    fn default() -> Self {
        Role::Buyer
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_round_trip() {
        assert_eq!("seller".parse::<Role>().unwrap(), Role::Seller);
        assert_eq!(Role::Buyer.to_string(), "buyer");
        assert!("admin".parse::<Role>().is_err());
    }

    #[test]
    fn test_role_serde_lowercase() {
        let json = serde_json::to_string(&Role::Seller).unwrap();
        assert_eq!(json, "\"seller\"");
        let role: Role = serde_json::from_str("\"buyer\"").unwrap();
        assert_eq!(role, Role::Buyer);
    }
}
