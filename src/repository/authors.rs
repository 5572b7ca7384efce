//! Authors repository for database operations

use async_trait::async_trait;
use sqlx::{Pool, Postgres};

use crate::{
    error::AppResult,
    models::{Author, AuthorInput},
};

use super::{AuthorRepository, PageRequest};

const AUTHOR_COLUMNS: &str = "id, first_name, last_name, date_of_birth, date_of_death";

#[derive(Clone)]
pub struct AuthorsRepository {
    pool: Pool<Postgres>,
}

impl AuthorsRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl AuthorRepository for AuthorsRepository {
    async fn count(&self) -> AppResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM authors")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }

    async fn list(&self, page: PageRequest) -> AppResult<(Vec<Author>, i64)> {
        let total = self.count().await?;

        let authors = sqlx::query_as::<_, Author>(&format!(
            "SELECT {} FROM authors ORDER BY last_name, first_name, id LIMIT $1 OFFSET $2",
            AUTHOR_COLUMNS
        ))
        .bind(page.limit())
        .bind(page.offset())
        .fetch_all(&self.pool)
        .await?;

        Ok((authors, total))
    }

    async fn get(&self, id: i32) -> AppResult<Option<Author>> {
        let author = sqlx::query_as::<_, Author>(&format!(
            "SELECT {} FROM authors WHERE id = $1",
            AUTHOR_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(author)
    }

    async fn create(&self, input: &AuthorInput) -> AppResult<Author> {
        let author = sqlx::query_as::<_, Author>(&format!(
            r#"
            INSERT INTO authors (first_name, last_name, date_of_birth, date_of_death)
            VALUES ($1, $2, $3, $4)
            RETURNING {}
            "#,
            AUTHOR_COLUMNS
        ))
        .bind(&input.first_name)
        .bind(&input.last_name)
        .bind(input.date_of_birth)
        .bind(input.date_of_death)
        .fetch_one(&self.pool)
        .await?;
        Ok(author)
    }

    async fn update(&self, id: i32, input: &AuthorInput) -> AppResult<Option<Author>> {
        let author = sqlx::query_as::<_, Author>(&format!(
            r#"
            UPDATE authors
            SET first_name = $1, last_name = $2, date_of_birth = $3, date_of_death = $4
            WHERE id = $5
            RETURNING {}
            "#,
            AUTHOR_COLUMNS
        ))
        .bind(&input.first_name)
        .bind(&input.last_name)
        .bind(input.date_of_birth)
        .bind(input.date_of_death)
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(author)
    }

    async fn delete(&self, id: i32) -> AppResult<bool> {
        // books.author_id is ON DELETE SET NULL
        let result = sqlx::query("DELETE FROM authors WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
