//! Users repository for database operations

use async_trait::async_trait;
use sqlx::{Pool, Postgres, Row};

use crate::{
    error::AppResult,
    models::{Permission, User},
};

use super::UserRepository;

#[derive(Clone)]
pub struct UsersRepository {
    pool: Pool<Postgres>,
}

impl UsersRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserRepository for UsersRepository {
    /// Get user by ID, with granted permissions
    async fn get(&self, id: i32) -> AppResult<Option<User>> {
        let row = sqlx::query(
            r#"
            SELECT u.id, u.username, u.first_name, u.last_name, u.email, u.is_staff,
                   COALESCE(
                       ARRAY_AGG(p.codename::text) FILTER (WHERE p.codename IS NOT NULL),
                       '{}'::text[]
                   ) AS permissions
            FROM users u
            LEFT JOIN user_permissions up ON up.user_id = u.id
            LEFT JOIN permissions p ON p.id = up.permission_id
            WHERE u.id = $1
            GROUP BY u.id
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(|row| {
            let codenames: Vec<String> = row.get("permissions");
            User {
                id: row.get("id"),
                username: row.get("username"),
                first_name: row.get("first_name"),
                last_name: row.get("last_name"),
                email: row.get("email"),
                is_staff: row.get("is_staff"),
                permissions: codenames
                    .iter()
                    .filter_map(|c| Permission::from_codename(c))
                    .collect(),
            }
        }))
    }
}
