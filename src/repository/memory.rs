//! In-process store implementing every repository trait.
//!
//! Mirrors the relational behavior of the PostgreSQL schema: the same
//! orderings, and references cleared (not cascaded) when a parent row is
//! deleted. Used by the test suite and by `database.url = "memory"`.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

use async_trait::async_trait;
use chrono::NaiveDate;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::{
    error::AppResult,
    models::{
        author::author_order,
        book_instance::{instance_order, loan_order},
        Author, AuthorInput, Book, BookInput, BookInstance, BookInstanceInput,
        BookInstanceRecord, BookListing, Genre, GenreInput, Language, LanguageInput, LoanStatus,
        User,
    },
};

use super::{
    AuthorRepository, BookInstanceRepository, BookRepository, GenreRepository, InstanceFilter,
    InstanceOrder, LanguageRepository, PageRequest, UserRepository,
};

#[derive(Default)]
struct Tables {
    users: BTreeMap<i32, User>,
    genres: BTreeMap<i32, Genre>,
    languages: BTreeMap<i32, Language>,
    authors: BTreeMap<i32, Author>,
    /// Stored without genres; `book_genres` holds the links
    books: BTreeMap<i32, Book>,
    book_genres: BTreeSet<(i32, i32)>,
    instances: BTreeMap<Uuid, BookInstance>,
    last_genre_id: i32,
    last_language_id: i32,
    last_author_id: i32,
    last_book_id: i32,
}

fn next_id(last: &mut i32) -> i32 {
    *last += 1;
    *last
}

fn paginate<T>(items: Vec<T>, page: PageRequest) -> (Vec<T>, i64) {
    let total = items.len() as i64;
    let items = items
        .into_iter()
        .skip(page.offset() as usize)
        .take(page.limit() as usize)
        .collect();
    (items, total)
}

impl Tables {
    fn genres_of(&self, book_id: i32) -> Vec<Genre> {
        self.book_genres
            .range((book_id, i32::MIN)..=(book_id, i32::MAX))
            .filter_map(|(_, genre_id)| self.genres.get(genre_id).cloned())
            .collect()
    }

    fn book(&self, book: &Book) -> Book {
        Book {
            genres: self.genres_of(book.id),
            ..book.clone()
        }
    }

    fn listing(&self, book: &Book) -> BookListing {
        let author = book.author_id.and_then(|id| self.authors.get(&id));
        BookListing {
            id: book.id,
            title: book.title.clone(),
            isbn: book.isbn.clone(),
            author_id: author.map(|a| a.id),
            author_name: author.map(|a| a.display_name()),
            language_name: book
                .language_id
                .and_then(|id| self.languages.get(&id))
                .map(|l| l.name.clone()),
            genres: self.genres_of(book.id),
        }
    }

    fn record(&self, instance: &BookInstance) -> BookInstanceRecord {
        BookInstanceRecord {
            instance: instance.clone(),
            book_title: instance
                .book_id
                .and_then(|id| self.books.get(&id))
                .map(|b| b.title.clone()),
            borrower_username: instance
                .borrower_id
                .and_then(|id| self.users.get(&id))
                .map(|u| u.username.clone()),
        }
    }

    fn set_genres(&mut self, book_id: i32, genre_ids: &[i32]) {
        self.book_genres.retain(|(b, _)| *b != book_id);
        for genre_id in genre_ids {
            if self.genres.contains_key(genre_id) {
                self.book_genres.insert((book_id, *genre_id));
            }
        }
    }
}

/// Shared in-memory catalog; clones see the same data
#[derive(Clone, Default)]
pub struct MemoryStore {
    tables: Arc<RwLock<Tables>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Users are managed by the identity provider; this seeds one locally
    pub async fn insert_user(&self, user: User) {
        self.tables.write().await.users.insert(user.id, user);
    }

    /// Removes a user and clears them as borrower
    pub async fn delete_user(&self, id: i32) -> bool {
        let mut tables = self.tables.write().await;
        for instance in tables.instances.values_mut() {
            if instance.borrower_id == Some(id) {
                instance.borrower_id = None;
            }
        }
        tables.users.remove(&id).is_some()
    }
}

#[async_trait]
impl GenreRepository for MemoryStore {
    async fn list(&self) -> AppResult<Vec<Genre>> {
        Ok(self.tables.read().await.genres.values().cloned().collect())
    }

    async fn get(&self, id: i32) -> AppResult<Option<Genre>> {
        Ok(self.tables.read().await.genres.get(&id).cloned())
    }

    async fn create(&self, input: &GenreInput) -> AppResult<Genre> {
        let mut tables = self.tables.write().await;
        let genre = Genre {
            id: next_id(&mut tables.last_genre_id),
            name: input.name.clone(),
        };
        tables.genres.insert(genre.id, genre.clone());
        Ok(genre)
    }

    async fn update(&self, id: i32, input: &GenreInput) -> AppResult<Option<Genre>> {
        let mut tables = self.tables.write().await;
        Ok(tables.genres.get_mut(&id).map(|genre| {
            genre.name = input.name.clone();
            genre.clone()
        }))
    }

    async fn delete(&self, id: i32) -> AppResult<bool> {
        let mut tables = self.tables.write().await;
        tables.book_genres.retain(|(_, g)| *g != id);
        Ok(tables.genres.remove(&id).is_some())
    }
}

#[async_trait]
impl LanguageRepository for MemoryStore {
    async fn list(&self) -> AppResult<Vec<Language>> {
        Ok(self.tables.read().await.languages.values().cloned().collect())
    }

    async fn get(&self, id: i32) -> AppResult<Option<Language>> {
        Ok(self.tables.read().await.languages.get(&id).cloned())
    }

    async fn create(&self, input: &LanguageInput) -> AppResult<Language> {
        let mut tables = self.tables.write().await;
        let language = Language {
            id: next_id(&mut tables.last_language_id),
            name: input.name.clone(),
        };
        tables.languages.insert(language.id, language.clone());
        Ok(language)
    }

    async fn update(&self, id: i32, input: &LanguageInput) -> AppResult<Option<Language>> {
        let mut tables = self.tables.write().await;
        Ok(tables.languages.get_mut(&id).map(|language| {
            language.name = input.name.clone();
            language.clone()
        }))
    }

    async fn delete(&self, id: i32) -> AppResult<bool> {
        let mut tables = self.tables.write().await;
        if tables.languages.remove(&id).is_none() {
            return Ok(false);
        }
        for book in tables.books.values_mut() {
            if book.language_id == Some(id) {
                book.language_id = None;
            }
        }
        Ok(true)
    }
}

#[async_trait]
impl AuthorRepository for MemoryStore {
    async fn count(&self) -> AppResult<i64> {
        Ok(self.tables.read().await.authors.len() as i64)
    }

    async fn list(&self, page: PageRequest) -> AppResult<(Vec<Author>, i64)> {
        let mut authors: Vec<Author> = self.tables.read().await.authors.values().cloned().collect();
        authors.sort_by(author_order);
        Ok(paginate(authors, page))
    }

    async fn get(&self, id: i32) -> AppResult<Option<Author>> {
        Ok(self.tables.read().await.authors.get(&id).cloned())
    }

    async fn create(&self, input: &AuthorInput) -> AppResult<Author> {
        let mut tables = self.tables.write().await;
        let author = Author {
            id: next_id(&mut tables.last_author_id),
            first_name: input.first_name.clone(),
            last_name: input.last_name.clone(),
            date_of_birth: input.date_of_birth,
            date_of_death: input.date_of_death,
        };
        tables.authors.insert(author.id, author.clone());
        Ok(author)
    }

    async fn update(&self, id: i32, input: &AuthorInput) -> AppResult<Option<Author>> {
        let mut tables = self.tables.write().await;
        Ok(tables.authors.get_mut(&id).map(|author| {
            author.first_name = input.first_name.clone();
            author.last_name = input.last_name.clone();
            author.date_of_birth = input.date_of_birth;
            author.date_of_death = input.date_of_death;
            author.clone()
        }))
    }

    async fn delete(&self, id: i32) -> AppResult<bool> {
        let mut tables = self.tables.write().await;
        if tables.authors.remove(&id).is_none() {
            return Ok(false);
        }
        for book in tables.books.values_mut() {
            if book.author_id == Some(id) {
                book.author_id = None;
            }
        }
        Ok(true)
    }
}

#[async_trait]
impl BookRepository for MemoryStore {
    async fn count(&self) -> AppResult<i64> {
        Ok(self.tables.read().await.books.len() as i64)
    }

    async fn list(&self, page: PageRequest) -> AppResult<(Vec<BookListing>, i64)> {
        let tables = self.tables.read().await;
        let listings = tables.books.values().map(|b| tables.listing(b)).collect();
        Ok(paginate(listings, page))
    }

    async fn get(&self, id: i32) -> AppResult<Option<Book>> {
        let tables = self.tables.read().await;
        Ok(tables.books.get(&id).map(|b| tables.book(b)))
    }

    async fn list_by_author(&self, author_id: i32) -> AppResult<Vec<Book>> {
        let tables = self.tables.read().await;
        Ok(tables
            .books
            .values()
            .filter(|b| b.author_id == Some(author_id))
            .map(|b| tables.book(b))
            .collect())
    }

    async fn create(&self, input: &BookInput) -> AppResult<Book> {
        let mut tables = self.tables.write().await;
        let book = Book {
            id: next_id(&mut tables.last_book_id),
            title: input.title.clone(),
            summary: input.summary.clone(),
            imprint: input.imprint.clone(),
            isbn: input.isbn.clone(),
            author_id: input.author_id,
            language_id: input.language_id,
            genres: Vec::new(),
        };
        tables.books.insert(book.id, book.clone());
        tables.set_genres(book.id, &input.genre_ids);
        Ok(tables.book(&book))
    }

    async fn update(&self, id: i32, input: &BookInput) -> AppResult<Option<Book>> {
        let mut tables = self.tables.write().await;
        let Some(book) = tables.books.get_mut(&id) else {
            return Ok(None);
        };
        book.title = input.title.clone();
        book.summary = input.summary.clone();
        book.imprint = input.imprint.clone();
        book.isbn = input.isbn.clone();
        book.author_id = input.author_id;
        book.language_id = input.language_id;
        let book = book.clone();
        tables.set_genres(id, &input.genre_ids);
        Ok(Some(tables.book(&book)))
    }

    async fn delete(&self, id: i32) -> AppResult<bool> {
        let mut tables = self.tables.write().await;
        if tables.books.remove(&id).is_none() {
            return Ok(false);
        }
        tables.book_genres.retain(|(b, _)| *b != id);
        for instance in tables.instances.values_mut() {
            if instance.book_id == Some(id) {
                instance.book_id = None;
            }
        }
        Ok(true)
    }
}

#[async_trait]
impl BookInstanceRepository for MemoryStore {
    async fn count(&self) -> AppResult<i64> {
        Ok(self.tables.read().await.instances.len() as i64)
    }

    async fn count_by_status(&self, status: LoanStatus) -> AppResult<i64> {
        let tables = self.tables.read().await;
        Ok(tables.instances.values().filter(|i| i.status == status).count() as i64)
    }

    async fn get(&self, id: Uuid) -> AppResult<Option<BookInstanceRecord>> {
        let tables = self.tables.read().await;
        Ok(tables.instances.get(&id).map(|i| tables.record(i)))
    }

    async fn list_by_book(&self, book_id: i32) -> AppResult<Vec<BookInstanceRecord>> {
        let tables = self.tables.read().await;
        let mut instances: Vec<&BookInstance> = tables
            .instances
            .values()
            .filter(|i| i.book_id == Some(book_id))
            .collect();
        instances.sort_by(|a, b| instance_order(a, b));
        Ok(instances.into_iter().map(|i| tables.record(i)).collect())
    }

    async fn list(
        &self,
        filter: &InstanceFilter,
        page: PageRequest,
    ) -> AppResult<(Vec<BookInstanceRecord>, i64)> {
        let tables = self.tables.read().await;
        let mut instances: Vec<&BookInstance> =
            tables.instances.values().filter(|i| filter.matches(i)).collect();
        match filter.order {
            InstanceOrder::Natural => instances.sort_by(|a, b| instance_order(a, b)),
            InstanceOrder::DueBack => instances.sort_by(|a, b| loan_order(a, b)),
        }
        let records = instances.into_iter().map(|i| tables.record(i)).collect();
        Ok(paginate(records, page))
    }

    async fn create(&self, input: &BookInstanceInput) -> AppResult<BookInstance> {
        let mut tables = self.tables.write().await;
        let instance = BookInstance {
            id: input.id.unwrap_or_else(Uuid::new_v4),
            book_id: input.book_id,
            due_back: input.due_back,
            status: input.status,
            borrower_id: input.borrower_id,
        };
        tables.instances.insert(instance.id, instance.clone());
        Ok(instance)
    }

    async fn update(&self, id: Uuid, input: &BookInstanceInput) -> AppResult<Option<BookInstance>> {
        let mut tables = self.tables.write().await;
        Ok(tables.instances.get_mut(&id).map(|instance| {
            instance.book_id = input.book_id;
            instance.due_back = input.due_back;
            instance.status = input.status;
            instance.borrower_id = input.borrower_id;
            instance.clone()
        }))
    }

    async fn set_due_back(&self, id: Uuid, due_back: NaiveDate) -> AppResult<Option<BookInstance>> {
        let mut tables = self.tables.write().await;
        Ok(tables.instances.get_mut(&id).map(|instance| {
            instance.due_back = Some(due_back);
            instance.clone()
        }))
    }

    async fn delete(&self, id: Uuid) -> AppResult<bool> {
        Ok(self.tables.write().await.instances.remove(&id).is_some())
    }
}

#[async_trait]
impl UserRepository for MemoryStore {
    async fn get(&self, id: i32) -> AppResult<Option<User>> {
        Ok(self.tables.read().await.users.get(&id).cloned())
    }
}
