//! Genres and languages repositories for database operations

use async_trait::async_trait;
use sqlx::{Pool, Postgres};

use crate::{
    error::AppResult,
    models::{Genre, GenreInput, Language, LanguageInput},
};

use super::{GenreRepository, LanguageRepository};

#[derive(Clone)]
pub struct GenresRepository {
    pool: Pool<Postgres>,
}

impl GenresRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl GenreRepository for GenresRepository {
    async fn list(&self) -> AppResult<Vec<Genre>> {
        let genres = sqlx::query_as::<_, Genre>("SELECT id, name FROM genres ORDER BY id")
            .fetch_all(&self.pool)
            .await?;
        Ok(genres)
    }

    async fn get(&self, id: i32) -> AppResult<Option<Genre>> {
        let genre = sqlx::query_as::<_, Genre>("SELECT id, name FROM genres WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(genre)
    }

    async fn create(&self, input: &GenreInput) -> AppResult<Genre> {
        let genre = sqlx::query_as::<_, Genre>(
            "INSERT INTO genres (name) VALUES ($1) RETURNING id, name",
        )
        .bind(&input.name)
        .fetch_one(&self.pool)
        .await?;
        Ok(genre)
    }

    async fn update(&self, id: i32, input: &GenreInput) -> AppResult<Option<Genre>> {
        let genre = sqlx::query_as::<_, Genre>(
            "UPDATE genres SET name = $1 WHERE id = $2 RETURNING id, name",
        )
        .bind(&input.name)
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(genre)
    }

    async fn delete(&self, id: i32) -> AppResult<bool> {
        // book_genres rows go with it (ON DELETE CASCADE)
        let result = sqlx::query("DELETE FROM genres WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}

#[derive(Clone)]
pub struct LanguagesRepository {
    pool: Pool<Postgres>,
}

impl LanguagesRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl LanguageRepository for LanguagesRepository {
    async fn list(&self) -> AppResult<Vec<Language>> {
        let languages = sqlx::query_as::<_, Language>("SELECT id, name FROM languages ORDER BY id")
            .fetch_all(&self.pool)
            .await?;
        Ok(languages)
    }

    async fn get(&self, id: i32) -> AppResult<Option<Language>> {
        let language =
            sqlx::query_as::<_, Language>("SELECT id, name FROM languages WHERE id = $1")
                .bind(id)
                .fetch_optional(&self.pool)
                .await?;
        Ok(language)
    }

    async fn create(&self, input: &LanguageInput) -> AppResult<Language> {
        let language = sqlx::query_as::<_, Language>(
            "INSERT INTO languages (name) VALUES ($1) RETURNING id, name",
        )
        .bind(&input.name)
        .fetch_one(&self.pool)
        .await?;
        Ok(language)
    }

    async fn update(&self, id: i32, input: &LanguageInput) -> AppResult<Option<Language>> {
        let language = sqlx::query_as::<_, Language>(
            "UPDATE languages SET name = $1 WHERE id = $2 RETURNING id, name",
        )
        .bind(&input.name)
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(language)
    }

    async fn delete(&self, id: i32) -> AppResult<bool> {
        // books.language_id is ON DELETE SET NULL
        let result = sqlx::query("DELETE FROM languages WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
