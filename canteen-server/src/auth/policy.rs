//! Authorization Policy
//!
//! 统一的授权入口：`(user, resource, action) -> allow | deny`。
//! 商品目录和订单账本都只通过这一个函数做角色与归属判断，
//! 不在各个 handler 里散落角色分支。

use shared::Role;

use crate::auth::CurrentUser;
use crate::utils::AppError;

/// What the caller wants to do with the resource
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Read,
    Create,
    Update,
    Delete,
    /// Order status transition (including pickup completion)
    Transition,
}

/// The resource being touched, with just enough context to decide ownership
#[derive(Debug, Clone, Copy)]
pub enum Resource<'a> {
    /// A catalog entry; `owner` is the owning seller's id when known
    Catalog { owner: Option<&'a str> },
    /// A ledger entry; `buyer` is the owning buyer's id
    Ledger { buyer: &'a str },
    /// The pickup scan endpoint (no concrete order resolved yet)
    Pickup,
}

/// Decide whether `user` may perform `action` on `resource`
///
/// # 规则
///
/// | 资源 | 操作 | 规则 |
/// |------|------|------|
/// | Catalog | Read | 任何已认证用户 |
/// | Catalog | Create | seller |
/// | Catalog | Update/Delete | seller，且是归属卖家 (无归属的条目任何卖家可管理) |
/// | Ledger | Create | buyer |
/// | Ledger | Read | seller 任意；buyer 仅限本人订单 |
/// | Ledger | Transition | seller |
/// | Pickup | Transition | seller |
pub fn authorize(user: &CurrentUser, resource: Resource<'_>, action: Action) -> Result<(), AppError> {
    match (resource, action) {
        // ========== Catalog ==========
        (Resource::Catalog { .. }, Action::Read) => Ok(()),
        (Resource::Catalog { .. }, Action::Create) => user.require_role(Role::Seller),
        (Resource::Catalog { owner }, Action::Update | Action::Delete) => {
            user.require_role(Role::Seller)?;
            match owner {
                Some(owner) if owner != user.id => Err(AppError::forbidden(
                    "Product belongs to another seller".to_string(),
                )),
                _ => Ok(()),
            }
        }
        (Resource::Catalog { .. }, Action::Transition) => {
            Err(AppError::forbidden("Products have no status".to_string()))
        }

        // ========== Ledger ==========
        (Resource::Ledger { .. }, Action::Create) => user.require_role(Role::Buyer),
        (Resource::Ledger { buyer }, Action::Read) => {
            if user.is_seller() || buyer == user.id {
                Ok(())
            } else {
                Err(AppError::forbidden(
                    "Order belongs to another buyer".to_string(),
                ))
            }
        }
        (Resource::Ledger { .. }, Action::Transition) => user.require_role(Role::Seller),
        (Resource::Ledger { .. }, Action::Update | Action::Delete) => Err(AppError::forbidden(
            "Orders are immutable apart from status".to_string(),
        )),

        // ========== Pickup ==========
        (Resource::Pickup, Action::Transition) => user.require_role(Role::Seller),
        (Resource::Pickup, _) => Err(AppError::forbidden("Sellers scan pickups".to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn buyer(id: &str) -> CurrentUser {
        CurrentUser {
            id: id.to_string(),
            username: "buyer".to_string(),
            role: Role::Buyer,
        }
    }

    fn seller(id: &str) -> CurrentUser {
        CurrentUser {
            id: id.to_string(),
            username: "seller".to_string(),
            role: Role::Seller,
        }
    }

    #[test]
    fn test_catalog_read_open_to_all_roles() {
        let resource = Resource::Catalog { owner: None };
        assert!(authorize(&buyer("user:b"), resource, Action::Read).is_ok());
        assert!(authorize(&seller("user:s"), resource, Action::Read).is_ok());
    }

    #[test]
    fn test_catalog_mutation_is_seller_only() {
        let resource = Resource::Catalog { owner: None };
        assert!(authorize(&buyer("user:b"), resource, Action::Create).is_err());
        assert!(authorize(&seller("user:s"), resource, Action::Create).is_ok());
        assert!(authorize(&buyer("user:b"), resource, Action::Delete).is_err());
    }

    #[test]
    fn test_catalog_ownership_enforced_between_sellers() {
        let resource = Resource::Catalog {
            owner: Some("user:s1"),
        };
        assert!(authorize(&seller("user:s1"), resource, Action::Update).is_ok());
        assert!(authorize(&seller("user:s2"), resource, Action::Update).is_err());
        // Unowned (seeded) entries are manageable by any seller
        let unowned = Resource::Catalog { owner: None };
        assert!(authorize(&seller("user:s2"), unowned, Action::Delete).is_ok());
    }

    #[test]
    fn test_ledger_create_is_buyer_only() {
        let resource = Resource::Ledger { buyer: "user:b" };
        assert!(authorize(&buyer("user:b"), resource, Action::Create).is_ok());
        assert!(authorize(&seller("user:s"), resource, Action::Create).is_err());
    }

    #[test]
    fn test_ledger_read_scoped_to_owner_for_buyers() {
        let resource = Resource::Ledger { buyer: "user:b1" };
        assert!(authorize(&buyer("user:b1"), resource, Action::Read).is_ok());
        assert!(authorize(&buyer("user:b2"), resource, Action::Read).is_err());
        // The scanning seller does not own the order but may read it
        assert!(authorize(&seller("user:s"), resource, Action::Read).is_ok());
    }

    #[test]
    fn test_ledger_transition_is_seller_only() {
        let resource = Resource::Ledger { buyer: "user:b1" };
        assert!(authorize(&seller("user:s"), resource, Action::Transition).is_ok());
        assert!(authorize(&buyer("user:b1"), resource, Action::Transition).is_err());
    }

    #[test]
    fn test_pickup_scan_is_seller_only() {
        assert!(authorize(&seller("user:s"), Resource::Pickup, Action::Transition).is_ok());
        assert!(authorize(&buyer("user:b"), Resource::Pickup, Action::Transition).is_err());
    }
}
