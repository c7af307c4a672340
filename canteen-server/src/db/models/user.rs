//! User Model

use super::serde_helpers;
use serde::{Deserialize, Serialize};
use shared::{Role, UserInfo};
use surrealdb::RecordId;

/// User ID type
pub type UserId = RecordId;

/// User account matching the `user` table
///
/// 角色注册后不可变更，账号不支持删除
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        with = "serde_helpers::option_record_id"
    )]
    pub id: Option<UserId>,
    pub username: String,
    #[serde(skip_serializing)]
    pub hash_pass: String,
    pub role: Role,
    /// Unix micros
    pub created_at: i64,
}

/// Create user payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserCreate {
    pub username: String,
    pub password: String,
    pub role: Role,
}

impl User {
    /// Verify password using argon2
    pub fn verify_password(&self, password: &str) -> Result<bool, argon2::password_hash::Error> {
        use argon2::{
            Argon2,
            password_hash::{PasswordHash, PasswordVerifier},
        };

        let parsed_hash = PasswordHash::new(&self.hash_pass)?;
        Ok(Argon2::default()
            .verify_password(password.as_bytes(), &parsed_hash)
            .is_ok())
    }

    /// Hash password using argon2
    pub fn hash_password(password: &str) -> Result<String, argon2::password_hash::Error> {
        use argon2::{
            Argon2,
            password_hash::{PasswordHasher, SaltString, rand_core::OsRng},
        };

        let salt = SaltString::generate(&mut OsRng);
        let argon2 = Argon2::default();
        let password_hash = argon2.hash_password(password.as_bytes(), &salt)?;
        Ok(password_hash.to_string())
    }

    /// Public view without credential material
    pub fn to_user_info(&self) -> UserInfo {
        UserInfo {
            id: self.id.as_ref().map(|t| t.to_string()).unwrap_or_default(),
            username: self.username.clone(),
            role: self.role,
            created_at: self.created_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_password_hash_and_verify() {
        let hash = User::hash_password("secret1").expect("hash failed");
        let user = User {
            id: None,
            username: "alice".to_string(),
            hash_pass: hash,
            role: Role::Buyer,
            created_at: 0,
        };

        assert!(user.verify_password("secret1").unwrap());
        assert!(!user.verify_password("wrong").unwrap());
    }

    #[test]
    fn test_hash_is_salted() {
        let a = User::hash_password("secret1").unwrap();
        let b = User::hash_password("secret1").unwrap();
        assert_ne!(a, b);
    }
}
