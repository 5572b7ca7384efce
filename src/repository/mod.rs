//! Repository layer for catalog storage.
//!
//! Each entity has its own data-access trait. [`Repository::new`] wires the
//! PostgreSQL implementations; [`Repository::in_memory`] wires a process-local
//! [`memory::MemoryStore`] implementing the same traits.

pub mod authors;
pub mod book_instances;
pub mod books;
pub mod genres;
pub mod memory;
pub mod users;

use std::sync::Arc;

use async_trait::async_trait;
use chrono::NaiveDate;
use sqlx::{Pool, Postgres};
use uuid::Uuid;

use crate::{
    error::AppResult,
    models::{
        Author, AuthorInput, Book, BookInput, BookInstance, BookInstanceInput,
        BookInstanceRecord, BookListing, Genre, GenreInput, Language, LanguageInput, LoanStatus,
        User,
    },
};

/// One page of a list, 1-based
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub page: i64,
    pub per_page: i64,
}

impl PageRequest {
    pub fn new(page: i64, per_page: i64) -> Self {
        Self { page, per_page }
    }

    pub fn offset(&self) -> i64 {
        self.page.max(1).saturating_sub(1).saturating_mul(self.per_page)
    }

    pub fn limit(&self) -> i64 {
        self.per_page
    }
}

/// Restriction on `due_back`; `until` is exclusive
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DueBackBound {
    Between { from: NaiveDate, until: NaiveDate },
    IsNull,
    NotNull,
}

impl DueBackBound {
    pub fn matches(&self, due_back: Option<NaiveDate>) -> bool {
        match (self, due_back) {
            (DueBackBound::Between { from, until }, Some(due)) => *from <= due && due < *until,
            (DueBackBound::Between { .. }, None) => false,
            (DueBackBound::IsNull, due) => due.is_none(),
            (DueBackBound::NotNull, due) => due.is_some(),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum InstanceOrder {
    /// id, status, due_back
    #[default]
    Natural,
    /// due_back ascending, undated last
    DueBack,
}

/// Filter for copy lists
#[derive(Debug, Clone, Default)]
pub struct InstanceFilter {
    pub status: Option<LoanStatus>,
    pub borrower_id: Option<i32>,
    pub due_back: Option<DueBackBound>,
    pub order: InstanceOrder,
}

impl InstanceFilter {
    /// Copies currently lent out, optionally to one borrower
    pub fn on_loan(borrower_id: Option<i32>) -> Self {
        Self {
            status: Some(LoanStatus::OnLoan),
            borrower_id,
            due_back: None,
            order: InstanceOrder::DueBack,
        }
    }

    pub fn matches(&self, instance: &BookInstance) -> bool {
        self.status.map_or(true, |s| instance.status == s)
            && self
                .borrower_id
                .map_or(true, |b| instance.borrower_id == Some(b))
            && self.due_back.map_or(true, |d| d.matches(instance.due_back))
    }
}

#[async_trait]
pub trait GenreRepository: Send + Sync {
    async fn list(&self) -> AppResult<Vec<Genre>>;
    async fn get(&self, id: i32) -> AppResult<Option<Genre>>;
    async fn create(&self, input: &GenreInput) -> AppResult<Genre>;
    async fn update(&self, id: i32, input: &GenreInput) -> AppResult<Option<Genre>>;
    /// Also drops the genre from every book
    async fn delete(&self, id: i32) -> AppResult<bool>;
}

#[async_trait]
pub trait LanguageRepository: Send + Sync {
    async fn list(&self) -> AppResult<Vec<Language>>;
    async fn get(&self, id: i32) -> AppResult<Option<Language>>;
    async fn create(&self, input: &LanguageInput) -> AppResult<Language>;
    async fn update(&self, id: i32, input: &LanguageInput) -> AppResult<Option<Language>>;
    /// Clears `language_id` on the books written in it
    async fn delete(&self, id: i32) -> AppResult<bool>;
}

#[async_trait]
pub trait AuthorRepository: Send + Sync {
    async fn count(&self) -> AppResult<i64>;
    /// Ordered by last name, first name
    async fn list(&self, page: PageRequest) -> AppResult<(Vec<Author>, i64)>;
    async fn get(&self, id: i32) -> AppResult<Option<Author>>;
    async fn create(&self, input: &AuthorInput) -> AppResult<Author>;
    async fn update(&self, id: i32, input: &AuthorInput) -> AppResult<Option<Author>>;
    /// Clears `author_id` on the author's books
    async fn delete(&self, id: i32) -> AppResult<bool>;
}

#[async_trait]
pub trait BookRepository: Send + Sync {
    async fn count(&self) -> AppResult<i64>;
    /// Ordered by id
    async fn list(&self, page: PageRequest) -> AppResult<(Vec<BookListing>, i64)>;
    async fn get(&self, id: i32) -> AppResult<Option<Book>>;
    async fn list_by_author(&self, author_id: i32) -> AppResult<Vec<Book>>;
    async fn create(&self, input: &BookInput) -> AppResult<Book>;
    async fn update(&self, id: i32, input: &BookInput) -> AppResult<Option<Book>>;
    /// Clears `book_id` on the book's copies
    async fn delete(&self, id: i32) -> AppResult<bool>;
}

#[async_trait]
pub trait BookInstanceRepository: Send + Sync {
    async fn count(&self) -> AppResult<i64>;
    async fn count_by_status(&self, status: LoanStatus) -> AppResult<i64>;
    async fn get(&self, id: Uuid) -> AppResult<Option<BookInstanceRecord>>;
    /// Copies of one book in natural order
    async fn list_by_book(&self, book_id: i32) -> AppResult<Vec<BookInstanceRecord>>;
    async fn list(
        &self,
        filter: &InstanceFilter,
        page: PageRequest,
    ) -> AppResult<(Vec<BookInstanceRecord>, i64)>;
    async fn create(&self, input: &BookInstanceInput) -> AppResult<BookInstance>;
    async fn update(&self, id: Uuid, input: &BookInstanceInput) -> AppResult<Option<BookInstance>>;
    /// Changes `due_back` and nothing else
    async fn set_due_back(&self, id: Uuid, due_back: NaiveDate) -> AppResult<Option<BookInstance>>;
    async fn delete(&self, id: Uuid) -> AppResult<bool>;
}

#[async_trait]
pub trait UserRepository: Send + Sync {
    async fn get(&self, id: i32) -> AppResult<Option<User>>;
}

/// Main repository struct holding one data-access object per entity
#[derive(Clone)]
pub struct Repository {
    pub genres: Arc<dyn GenreRepository>,
    pub languages: Arc<dyn LanguageRepository>,
    pub authors: Arc<dyn AuthorRepository>,
    pub books: Arc<dyn BookRepository>,
    pub book_instances: Arc<dyn BookInstanceRepository>,
    pub users: Arc<dyn UserRepository>,
}

impl Repository {
    /// Create a new repository with the given database pool
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self {
            genres: Arc::new(genres::GenresRepository::new(pool.clone())),
            languages: Arc::new(genres::LanguagesRepository::new(pool.clone())),
            authors: Arc::new(authors::AuthorsRepository::new(pool.clone())),
            books: Arc::new(books::BooksRepository::new(pool.clone())),
            book_instances: Arc::new(book_instances::BookInstancesRepository::new(pool.clone())),
            users: Arc::new(users::UsersRepository::new(pool)),
        }
    }

    /// Back every entity with the same in-memory store
    pub fn in_memory(store: memory::MemoryStore) -> Self {
        let store = Arc::new(store);
        Self {
            genres: store.clone(),
            languages: store.clone(),
            authors: store.clone(),
            books: store.clone(),
            book_instances: store.clone(),
            users: store,
        }
    }
}
