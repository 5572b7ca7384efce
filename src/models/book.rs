//! Book (catalog title) model and related types.
//!
//! A book is a title in the catalog, not a physical copy; copies are
//! [`BookInstance`](super::book_instance::BookInstance) records.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use validator::Validate;

use super::author::Author;
use super::book_instance::BookInstanceView;
use super::genre::{Genre, Language};

/// Book model from database, with its genres attached
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Book {
    pub id: i32,
    pub title: String,
    /// Brief description of the book
    pub summary: String,
    /// Publisher imprint
    pub imprint: String,
    /// 13 character ISBN
    pub isbn: String,
    pub author_id: Option<i32>,
    pub language_id: Option<i32>,
    #[sqlx(skip)]
    pub genres: Vec<Genre>,
}

impl Book {
    pub fn display_genre(&self) -> String {
        display_genre(&self.genres)
    }
}

impl std::fmt::Display for Book {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.title)
    }
}

/// Genre names joined for list display
pub fn display_genre(genres: &[Genre]) -> String {
    genres
        .iter()
        .map(|g| g.name.as_str())
        .collect::<Vec<_>>()
        .join(", ")
}

/// Book entry for paginated lists, with author and language resolved
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct BookListing {
    pub id: i32,
    pub title: String,
    pub isbn: String,
    pub author_id: Option<i32>,
    /// "Last, First" display name of the author
    pub author_name: Option<String>,
    pub language_name: Option<String>,
    pub genres: Vec<Genre>,
}

/// Book with everything shown on its detail page
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct BookDetail {
    pub book: Book,
    pub author: Option<Author>,
    pub language: Option<Language>,
    pub instances: Vec<BookInstanceView>,
}

/// Create or update book request
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct BookInput {
    #[validate(length(min = 1, max = 200, message = "Title must be 1 to 200 characters"))]
    pub title: String,
    #[validate(length(min = 1, max = 1000, message = "Summary must be 1 to 1000 characters"))]
    pub summary: String,
    #[validate(length(min = 1, max = 30, message = "Imprint must be 1 to 30 characters"))]
    pub imprint: String,
    #[validate(length(min = 1, max = 13, message = "ISBN must be 1 to 13 characters"))]
    pub isbn: String,
    pub author_id: Option<i32>,
    pub language_id: Option<i32>,
    #[serde(default)]
    pub genre_ids: Vec<i32>,
}
