//! User Repository

use std::time::Duration;

use super::{BaseRepository, RepoError, RepoResult};
use crate::db::models::{User, UserCreate};
use surrealdb::engine::local::Db;
use surrealdb::{RecordId, Surreal};

const USER_TABLE: &str = "user";

#[derive(Clone)]
pub struct UserRepository {
    base: BaseRepository,
}

impl UserRepository {
    pub fn new(db: Surreal<Db>) -> Self {
        Self {
            base: BaseRepository::new(db),
        }
    }

    pub fn with_timeout(db: Surreal<Db>, op_timeout: Duration) -> Self {
        Self {
            base: BaseRepository::with_timeout(db, op_timeout),
        }
    }

    /// Find user by id
    pub async fn find_by_id(&self, id: &str) -> RepoResult<Option<User>> {
        let thing: RecordId = id
            .parse()
            .map_err(|_| RepoError::Validation(format!("Invalid ID: {}", id)))?;
        let user: Option<User> = self.base.run(self.base.db().select(thing)).await?;
        Ok(user)
    }

    /// Find user by username
    pub async fn find_by_username(&self, username: &str) -> RepoResult<Option<User>> {
        let username_owned = username.to_string();
        let users: Vec<User> = self
            .base
            .run(async {
                self.base
                    .db()
                    .query("SELECT * FROM user WHERE username = $username LIMIT 1")
                    .bind(("username", username_owned))
                    .await?
                    .take(0)
            })
            .await?;
        Ok(users.into_iter().next())
    }

    /// Create a new account
    ///
    /// 只存 argon2 哈希，明文密码不落库
    pub async fn create(&self, data: UserCreate) -> RepoResult<User> {
        // Check duplicate username
        if self.find_by_username(&data.username).await?.is_some() {
            return Err(RepoError::Duplicate(format!(
                "Username '{}' already exists",
                data.username
            )));
        }

        // Hash password
        let hash_pass = User::hash_password(&data.password)
            .map_err(|e| RepoError::Database(format!("Failed to hash password: {}", e)))?;

        let username = data.username.clone();
        let created_at = chrono::Utc::now().timestamp_micros();

        let created: Option<User> = self
            .base
            .run(async {
                self.base
                    .db()
                    .query(
                        r#"CREATE user SET
                            username = $username,
                            hash_pass = $hash_pass,
                            role = $role,
                            created_at = $created_at
                        RETURN AFTER"#,
                    )
                    .bind(("username", username))
                    .bind(("hash_pass", hash_pass))
                    .bind(("role", data.role))
                    .bind(("created_at", created_at))
                    .await?
                    .take(0)
            })
            .await
            // The unique index backs up the probe when two registrations race
            .map_err(|e| match e {
                RepoError::Database(msg) if msg.contains("user_username") => {
                    RepoError::Duplicate(format!("Username '{}' already exists", data.username))
                }
                other => other,
            })?;

        created.ok_or_else(|| RepoError::Database(format!("Failed to create {}", USER_TABLE)))
    }
}
