//! Catalog browsing service: home counts, book and author pages

use std::sync::Arc;

use serde::Serialize;
use utoipa::ToSchema;

use crate::{
    clock::Clock,
    error::{AppError, AppResult},
    models::{Author, AuthorDetail, BookDetail, BookInstanceView, BookListing, LoanStatus},
    repository::{PageRequest, Repository},
};

use super::{Page, PAGE_SIZE};

/// Figures shown on the home page
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct HomeCounts {
    pub num_books: i64,
    pub num_instances: i64,
    /// Copies with status Available
    pub num_available: i64,
    pub num_authors: i64,
}

#[derive(Clone)]
pub struct CatalogService {
    repository: Repository,
    clock: Arc<dyn Clock>,
}

impl CatalogService {
    pub fn new(repository: Repository, clock: Arc<dyn Clock>) -> Self {
        Self { repository, clock }
    }

    pub async fn home_counts(&self) -> AppResult<HomeCounts> {
        Ok(HomeCounts {
            num_books: self.repository.books.count().await?,
            num_instances: self.repository.book_instances.count().await?,
            num_available: self
                .repository
                .book_instances
                .count_by_status(LoanStatus::Available)
                .await?,
            num_authors: self.repository.authors.count().await?,
        })
    }

    pub async fn list_books(&self, page: i64) -> AppResult<Page<BookListing>> {
        let request = PageRequest::new(page, PAGE_SIZE);
        let (books, total) = self.repository.books.list(request).await?;
        Page::new(books, total, request)
    }

    /// Book with author, language, genres and copies
    pub async fn get_book_detail(&self, id: i32) -> AppResult<BookDetail> {
        let book = self
            .repository
            .books
            .get(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Book with id {} not found", id)))?;

        let author = match book.author_id {
            Some(author_id) => self.repository.authors.get(author_id).await?,
            None => None,
        };
        let language = match book.language_id {
            Some(language_id) => self.repository.languages.get(language_id).await?,
            None => None,
        };

        let today = self.clock.today();
        let instances = self
            .repository
            .book_instances
            .list_by_book(book.id)
            .await?
            .into_iter()
            .map(|record| BookInstanceView::new(record, today))
            .collect();

        Ok(BookDetail {
            book,
            author,
            language,
            instances,
        })
    }

    pub async fn list_authors(&self, page: i64) -> AppResult<Page<Author>> {
        let request = PageRequest::new(page, PAGE_SIZE);
        let (authors, total) = self.repository.authors.list(request).await?;
        Page::new(authors, total, request)
    }

    /// Author with their books
    pub async fn get_author_detail(&self, id: i32) -> AppResult<AuthorDetail> {
        let author = self
            .repository
            .authors
            .get(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Author with id {} not found", id)))?;

        let books = self.repository.books.list_by_author(author.id).await?;

        Ok(AuthorDetail { author, books })
    }
}
