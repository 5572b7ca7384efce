//! Books repository for database operations

use std::collections::HashMap;

use async_trait::async_trait;
use sqlx::{Pool, Postgres, Row, Transaction};

use crate::{
    error::{AppError, AppResult},
    models::{author::display_name, Book, BookInput, BookListing, Genre},
};

use super::{BookRepository, PageRequest};

const BOOK_COLUMNS: &str = "id, title, summary, imprint, isbn, author_id, language_id";

#[derive(Clone)]
pub struct BooksRepository {
    pool: Pool<Postgres>,
}

impl BooksRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// Genres of each listed book, in genre id order
    async fn genres_by_book(&self, book_ids: &[i32]) -> AppResult<HashMap<i32, Vec<Genre>>> {
        let mut genres: HashMap<i32, Vec<Genre>> = HashMap::new();
        if book_ids.is_empty() {
            return Ok(genres);
        }

        let rows = sqlx::query(
            r#"
            SELECT bg.book_id, g.id, g.name
            FROM book_genres bg
            JOIN genres g ON g.id = bg.genre_id
            WHERE bg.book_id = ANY($1)
            ORDER BY g.id
            "#,
        )
        .bind(book_ids.to_vec())
        .fetch_all(&self.pool)
        .await?;

        for row in rows {
            genres.entry(row.get("book_id")).or_default().push(Genre {
                id: row.get("id"),
                name: row.get("name"),
            });
        }

        Ok(genres)
    }

    async fn with_genres(&self, mut books: Vec<Book>) -> AppResult<Vec<Book>> {
        let ids: Vec<i32> = books.iter().map(|b| b.id).collect();
        let mut genres = self.genres_by_book(&ids).await?;
        for book in &mut books {
            book.genres = genres.remove(&book.id).unwrap_or_default();
        }
        Ok(books)
    }

    async fn replace_genres(
        tx: &mut Transaction<'_, Postgres>,
        book_id: i32,
        genre_ids: &[i32],
    ) -> AppResult<()> {
        sqlx::query("DELETE FROM book_genres WHERE book_id = $1")
            .bind(book_id)
            .execute(&mut **tx)
            .await?;

        if !genre_ids.is_empty() {
            sqlx::query(
                r#"
                INSERT INTO book_genres (book_id, genre_id)
                SELECT $1, UNNEST($2::int[])
                ON CONFLICT DO NOTHING
                "#,
            )
            .bind(book_id)
            .bind(genre_ids.to_vec())
            .execute(&mut **tx)
            .await?;
        }

        Ok(())
    }
}

#[async_trait]
impl BookRepository for BooksRepository {
    async fn count(&self) -> AppResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM books")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }

    async fn list(&self, page: PageRequest) -> AppResult<(Vec<BookListing>, i64)> {
        let total = self.count().await?;

        let rows = sqlx::query(
            r#"
            SELECT b.id, b.title, b.isbn, b.author_id,
                   a.first_name, a.last_name, l.name AS language_name
            FROM books b
            LEFT JOIN authors a ON a.id = b.author_id
            LEFT JOIN languages l ON l.id = b.language_id
            ORDER BY b.id
            LIMIT $1 OFFSET $2
            "#,
        )
        .bind(page.limit())
        .bind(page.offset())
        .fetch_all(&self.pool)
        .await?;

        let ids: Vec<i32> = rows.iter().map(|row| row.get("id")).collect();
        let mut genres = self.genres_by_book(&ids).await?;

        let listings = rows
            .into_iter()
            .map(|row| {
                let id: i32 = row.get("id");
                let first_name: Option<String> = row.get("first_name");
                let last_name: Option<String> = row.get("last_name");
                BookListing {
                    id,
                    title: row.get("title"),
                    isbn: row.get("isbn"),
                    author_id: row.get("author_id"),
                    author_name: last_name.map(|last| display_name(&last, &first_name.unwrap_or_default())),
                    language_name: row.get("language_name"),
                    genres: genres.remove(&id).unwrap_or_default(),
                }
            })
            .collect();

        Ok((listings, total))
    }

    async fn get(&self, id: i32) -> AppResult<Option<Book>> {
        let book = sqlx::query_as::<_, Book>(&format!(
            "SELECT {} FROM books WHERE id = $1",
            BOOK_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        match book {
            Some(book) => Ok(self.with_genres(vec![book]).await?.pop()),
            None => Ok(None),
        }
    }

    async fn list_by_author(&self, author_id: i32) -> AppResult<Vec<Book>> {
        let books = sqlx::query_as::<_, Book>(&format!(
            "SELECT {} FROM books WHERE author_id = $1 ORDER BY id",
            BOOK_COLUMNS
        ))
        .bind(author_id)
        .fetch_all(&self.pool)
        .await?;

        self.with_genres(books).await
    }

    async fn create(&self, input: &BookInput) -> AppResult<Book> {
        let mut tx = self.pool.begin().await?;

        let book = sqlx::query_as::<_, Book>(&format!(
            r#"
            INSERT INTO books (title, summary, imprint, isbn, author_id, language_id)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING {}
            "#,
            BOOK_COLUMNS
        ))
        .bind(&input.title)
        .bind(&input.summary)
        .bind(&input.imprint)
        .bind(&input.isbn)
        .bind(input.author_id)
        .bind(input.language_id)
        .fetch_one(&mut *tx)
        .await?;

        Self::replace_genres(&mut tx, book.id, &input.genre_ids).await?;
        tx.commit().await?;

        self.with_genres(vec![book])
            .await?
            .pop()
            .ok_or_else(|| AppError::Internal("Created book vanished".to_string()))
    }

    async fn update(&self, id: i32, input: &BookInput) -> AppResult<Option<Book>> {
        let mut tx = self.pool.begin().await?;

        let book = sqlx::query_as::<_, Book>(&format!(
            r#"
            UPDATE books
            SET title = $1, summary = $2, imprint = $3, isbn = $4, author_id = $5, language_id = $6
            WHERE id = $7
            RETURNING {}
            "#,
            BOOK_COLUMNS
        ))
        .bind(&input.title)
        .bind(&input.summary)
        .bind(&input.imprint)
        .bind(&input.isbn)
        .bind(input.author_id)
        .bind(input.language_id)
        .bind(id)
        .fetch_optional(&mut *tx)
        .await?;

        let Some(book) = book else {
            tx.rollback().await?;
            return Ok(None);
        };

        Self::replace_genres(&mut tx, book.id, &input.genre_ids).await?;
        tx.commit().await?;

        Ok(self.with_genres(vec![book]).await?.pop())
    }

    async fn delete(&self, id: i32) -> AppResult<bool> {
        // book_instances.book_id is ON DELETE SET NULL, book_genres cascades
        let result = sqlx::query("DELETE FROM books WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
