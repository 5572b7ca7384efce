//! Staff console: change lists and create/update/delete for every entity

use std::sync::Arc;

use uuid::Uuid;
use validator::Validate;

use crate::{
    admin::{
        registry, AuthorAdminRow, BookAdminRow, BookInstanceAdminRow, DefaultAdminRow,
        DueBackFilter, ModelAdmin,
    },
    clock::Clock,
    error::{AppError, AppResult},
    models::{
        Author, AuthorDetail, AuthorInput, Book, BookDetail, BookInput, BookInstance,
        BookInstanceInput, BookInstanceView, Genre, GenreInput, Language, LanguageInput,
        LoanStatus,
    },
    repository::{InstanceFilter, PageRequest, Repository},
};

use super::{catalog::CatalogService, Page, ADMIN_PAGE_SIZE};

/// Change list filters on copies
#[derive(Debug, Clone, Copy, Default)]
pub struct BookInstanceListFilter {
    pub status: Option<LoanStatus>,
    pub due_back: Option<DueBackFilter>,
}

/// Page over a list the store returns whole
fn page_of<T>(items: Vec<T>, page: i64) -> AppResult<Page<T>> {
    let request = PageRequest::new(page, ADMIN_PAGE_SIZE);
    let total = items.len() as i64;
    let items = items
        .into_iter()
        .skip(request.offset() as usize)
        .take(request.limit() as usize)
        .collect();
    Page::new(items, total, request)
}

fn not_found(entity: &str, id: impl std::fmt::Display) -> AppError {
    AppError::NotFound(format!("{} with id {} not found", entity, id))
}

#[derive(Clone)]
pub struct AdminService {
    repository: Repository,
    clock: Arc<dyn Clock>,
    catalog: CatalogService,
}

impl AdminService {
    pub fn new(repository: Repository, clock: Arc<dyn Clock>, catalog: CatalogService) -> Self {
        Self {
            repository,
            clock,
            catalog,
        }
    }

    pub fn models(&self) -> Vec<ModelAdmin> {
        registry()
    }

    // Genres

    pub async fn list_genres(&self, page: i64) -> AppResult<Page<DefaultAdminRow>> {
        let genres = self.repository.genres.list().await?;
        Ok(page_of(genres, page)?.map(DefaultAdminRow::from))
    }

    pub async fn get_genre(&self, id: i32) -> AppResult<Genre> {
        self.repository
            .genres
            .get(id)
            .await?
            .ok_or_else(|| not_found("Genre", id))
    }

    pub async fn create_genre(&self, input: GenreInput) -> AppResult<Genre> {
        input.validate()?;
        let genre = self.repository.genres.create(&input).await?;
        tracing::info!("Genre {} created: {}", genre.id, genre.name);
        Ok(genre)
    }

    pub async fn update_genre(&self, id: i32, input: GenreInput) -> AppResult<Genre> {
        input.validate()?;
        self.repository
            .genres
            .update(id, &input)
            .await?
            .ok_or_else(|| not_found("Genre", id))
    }

    pub async fn delete_genre(&self, id: i32) -> AppResult<()> {
        if !self.repository.genres.delete(id).await? {
            return Err(not_found("Genre", id));
        }
        tracing::info!("Genre {} deleted", id);
        Ok(())
    }

    // Languages

    pub async fn list_languages(&self, page: i64) -> AppResult<Page<DefaultAdminRow>> {
        let languages = self.repository.languages.list().await?;
        Ok(page_of(languages, page)?.map(DefaultAdminRow::from))
    }

    pub async fn get_language(&self, id: i32) -> AppResult<Language> {
        self.repository
            .languages
            .get(id)
            .await?
            .ok_or_else(|| not_found("Language", id))
    }

    pub async fn create_language(&self, input: LanguageInput) -> AppResult<Language> {
        input.validate()?;
        let language = self.repository.languages.create(&input).await?;
        tracing::info!("Language {} created: {}", language.id, language.name);
        Ok(language)
    }

    pub async fn update_language(&self, id: i32, input: LanguageInput) -> AppResult<Language> {
        input.validate()?;
        self.repository
            .languages
            .update(id, &input)
            .await?
            .ok_or_else(|| not_found("Language", id))
    }

    /// Books written in the language keep existing, without a language
    pub async fn delete_language(&self, id: i32) -> AppResult<()> {
        if !self.repository.languages.delete(id).await? {
            return Err(not_found("Language", id));
        }
        tracing::info!("Language {} deleted", id);
        Ok(())
    }

    // Authors

    pub async fn list_authors(&self, page: i64) -> AppResult<Page<AuthorAdminRow>> {
        let request = PageRequest::new(page, ADMIN_PAGE_SIZE);
        let (authors, total) = self.repository.authors.list(request).await?;
        Ok(Page::new(authors, total, request)?.map(AuthorAdminRow::from))
    }

    /// Author with the inline list of their books
    pub async fn get_author(&self, id: i32) -> AppResult<AuthorDetail> {
        self.catalog.get_author_detail(id).await
    }

    pub async fn create_author(&self, input: AuthorInput) -> AppResult<Author> {
        input.validate()?;
        let author = self.repository.authors.create(&input).await?;
        tracing::info!("Author {} created: {}", author.id, author);
        Ok(author)
    }

    pub async fn update_author(&self, id: i32, input: AuthorInput) -> AppResult<Author> {
        input.validate()?;
        self.repository
            .authors
            .update(id, &input)
            .await?
            .ok_or_else(|| not_found("Author", id))
    }

    /// The author's books keep existing, without an author
    pub async fn delete_author(&self, id: i32) -> AppResult<()> {
        if !self.repository.authors.delete(id).await? {
            return Err(not_found("Author", id));
        }
        tracing::info!("Author {} deleted", id);
        Ok(())
    }

    // Books

    pub async fn list_books(&self, page: i64) -> AppResult<Page<BookAdminRow>> {
        let request = PageRequest::new(page, ADMIN_PAGE_SIZE);
        let (books, total) = self.repository.books.list(request).await?;
        Ok(Page::new(books, total, request)?.map(BookAdminRow::from))
    }

    /// Book with the inline list of its copies
    pub async fn get_book(&self, id: i32) -> AppResult<BookDetail> {
        self.catalog.get_book_detail(id).await
    }

    async fn check_book_references(&self, input: &BookInput) -> AppResult<()> {
        if let Some(author_id) = input.author_id {
            if self.repository.authors.get(author_id).await?.is_none() {
                return Err(AppError::BadRequest(format!("Unknown author {}", author_id)));
            }
        }
        if let Some(language_id) = input.language_id {
            if self.repository.languages.get(language_id).await?.is_none() {
                return Err(AppError::BadRequest(format!("Unknown language {}", language_id)));
            }
        }
        for genre_id in &input.genre_ids {
            if self.repository.genres.get(*genre_id).await?.is_none() {
                return Err(AppError::BadRequest(format!("Unknown genre {}", genre_id)));
            }
        }
        Ok(())
    }

    pub async fn create_book(&self, input: BookInput) -> AppResult<Book> {
        input.validate()?;
        self.check_book_references(&input).await?;
        let book = self.repository.books.create(&input).await?;
        tracing::info!("Book {} created: {}", book.id, book.title);
        Ok(book)
    }

    pub async fn update_book(&self, id: i32, input: BookInput) -> AppResult<Book> {
        input.validate()?;
        self.check_book_references(&input).await?;
        self.repository
            .books
            .update(id, &input)
            .await?
            .ok_or_else(|| not_found("Book", id))
    }

    /// Copies of the book keep existing, without a book
    pub async fn delete_book(&self, id: i32) -> AppResult<()> {
        if !self.repository.books.delete(id).await? {
            return Err(not_found("Book", id));
        }
        tracing::info!("Book {} deleted", id);
        Ok(())
    }

    // Book instances

    pub async fn list_book_instances(
        &self,
        filter: BookInstanceListFilter,
        page: i64,
    ) -> AppResult<Page<BookInstanceAdminRow>> {
        let today = self.clock.today();
        let filter = InstanceFilter {
            status: filter.status,
            due_back: filter.due_back.map(|f| f.bound(today)),
            ..Default::default()
        };
        let request = PageRequest::new(page, ADMIN_PAGE_SIZE);
        let (records, total) = self.repository.book_instances.list(&filter, request).await?;
        Ok(Page::new(records, total, request)?.map(BookInstanceAdminRow::from))
    }

    pub async fn get_book_instance(&self, id: Uuid) -> AppResult<BookInstanceView> {
        let record = self
            .repository
            .book_instances
            .get(id)
            .await?
            .ok_or_else(|| not_found("Book instance", id))?;
        Ok(BookInstanceView::new(record, self.clock.today()))
    }

    async fn check_instance_references(&self, input: &BookInstanceInput) -> AppResult<()> {
        if let Some(book_id) = input.book_id {
            if self.repository.books.get(book_id).await?.is_none() {
                return Err(AppError::BadRequest(format!("Unknown book {}", book_id)));
            }
        }
        if let Some(borrower_id) = input.borrower_id {
            if self.repository.users.get(borrower_id).await?.is_none() {
                return Err(AppError::BadRequest(format!("Unknown borrower {}", borrower_id)));
            }
        }
        Ok(())
    }

    pub async fn create_book_instance(&self, input: BookInstanceInput) -> AppResult<BookInstance> {
        if let Some(id) = input.id {
            if self.repository.book_instances.get(id).await?.is_some() {
                return Err(AppError::BadRequest(format!("Book instance {} already exists", id)));
            }
        }
        self.check_instance_references(&input).await?;
        let instance = self.repository.book_instances.create(&input).await?;
        tracing::info!("Book instance {} created", instance.id);
        Ok(instance)
    }

    pub async fn update_book_instance(
        &self,
        id: Uuid,
        input: BookInstanceInput,
    ) -> AppResult<BookInstance> {
        self.check_instance_references(&input).await?;
        self.repository
            .book_instances
            .update(id, &input)
            .await?
            .ok_or_else(|| not_found("Book instance", id))
    }

    pub async fn delete_book_instance(&self, id: Uuid) -> AppResult<()> {
        if !self.repository.book_instances.delete(id).await? {
            return Err(not_found("Book instance", id));
        }
        tracing::info!("Book instance {} deleted", id);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::fixtures::{author, book_input, Fixture, PATRON};
    use chrono::Duration;

    #[tokio::test]
    async fn test_delete_author_keeps_books() {
        let fixture = Fixture::seeded().await;
        let admin = &fixture.services.admin;

        admin.delete_author(fixture.herbert).await.unwrap();

        let book = fixture.repository.books.get(fixture.dune).await.unwrap().unwrap();
        assert_eq!(book.author_id, None);
        assert!(matches!(
            admin.delete_author(fixture.herbert).await,
            Err(AppError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_delete_language_keeps_books() {
        let fixture = Fixture::seeded().await;
        fixture
            .services
            .admin
            .delete_language(fixture.english)
            .await
            .unwrap();
        let book = fixture.repository.books.get(fixture.dune).await.unwrap().unwrap();
        assert_eq!(book.language_id, None);
    }

    #[tokio::test]
    async fn test_delete_book_keeps_copies() {
        let fixture = Fixture::seeded().await;
        fixture.services.admin.delete_book(fixture.dune).await.unwrap();
        let copy = fixture
            .services
            .admin
            .get_book_instance(fixture.patron_copy)
            .await
            .unwrap();
        assert_eq!(copy.book_id, None);
        assert_eq!(copy.book_title, None);
    }

    #[tokio::test]
    async fn test_create_book_checks_references() {
        let fixture = Fixture::seeded().await;
        let admin = &fixture.services.admin;

        let result = admin
            .create_book(BookInput {
                author_id: Some(999),
                ..book_input("Children of Dune")
            })
            .await;
        assert!(matches!(result, Err(AppError::BadRequest(_))));

        let result = admin
            .create_book(BookInput {
                genre_ids: vec![999],
                ..book_input("Children of Dune")
            })
            .await;
        assert!(matches!(result, Err(AppError::BadRequest(_))));

        let book = admin
            .create_book(BookInput {
                author_id: Some(fixture.herbert),
                genre_ids: vec![fixture.science_fiction],
                ..book_input("Children of Dune")
            })
            .await
            .unwrap();
        assert_eq!(book.display_genre(), "Science Fiction");
    }

    #[tokio::test]
    async fn test_invalid_input_rejected() {
        let fixture = Fixture::seeded().await;
        let admin = &fixture.services.admin;

        let result = admin
            .create_book(BookInput {
                isbn: "97804411727190".into(),
                ..book_input("Dune Messiah")
            })
            .await;
        assert!(matches!(result, Err(AppError::Validation(_))));

        let result = admin.create_author(author("", "Herbert")).await;
        assert!(matches!(result, Err(AppError::Validation(_))));

        let result = admin.create_genre(GenreInput { name: String::new() }).await;
        assert!(matches!(result, Err(AppError::Validation(_))));
    }

    #[tokio::test]
    async fn test_duplicate_instance_id_rejected() {
        let fixture = Fixture::seeded().await;
        let result = fixture
            .services
            .admin
            .create_book_instance(BookInstanceInput {
                id: Some(fixture.available_copy),
                book_id: Some(fixture.dune),
                ..Default::default()
            })
            .await;
        assert!(matches!(result, Err(AppError::BadRequest(_))));
    }

    #[tokio::test]
    async fn test_instance_borrower_must_exist() {
        let fixture = Fixture::seeded().await;
        let admin = &fixture.services.admin;

        let result = admin
            .create_book_instance(BookInstanceInput {
                borrower_id: Some(999),
                ..Default::default()
            })
            .await;
        assert!(matches!(result, Err(AppError::BadRequest(_))));

        let copy = admin
            .create_book_instance(BookInstanceInput {
                book_id: Some(fixture.dispossessed),
                status: LoanStatus::OnLoan,
                borrower_id: Some(PATRON),
                due_back: Some(fixture.today),
                id: None,
            })
            .await
            .unwrap();
        assert_eq!(copy.status, LoanStatus::OnLoan);
    }

    #[tokio::test]
    async fn test_instance_filters() {
        let fixture = Fixture::seeded().await;
        let admin = &fixture.services.admin;

        let on_loan = admin
            .list_book_instances(
                BookInstanceListFilter {
                    status: Some(LoanStatus::OnLoan),
                    due_back: None,
                },
                1,
            )
            .await
            .unwrap();
        assert_eq!(on_loan.total, 2);

        let no_date = admin
            .list_book_instances(
                BookInstanceListFilter {
                    status: None,
                    due_back: Some(DueBackFilter::NoDate),
                },
                1,
            )
            .await
            .unwrap();
        assert_eq!(no_date.total, 2);

        let past_week = admin
            .list_book_instances(
                BookInstanceListFilter {
                    status: None,
                    due_back: Some(DueBackFilter::Past7Days),
                },
                1,
            )
            .await
            .unwrap();
        let ids: Vec<Uuid> = past_week.items.iter().map(|r| r.id).collect();
        assert_eq!(ids, vec![fixture.patron_copy]);

        fixture
            .add_copy(
                fixture.dune,
                LoanStatus::Reserved,
                Some(fixture.today + Duration::days(400)),
                None,
            )
            .await;
        let this_year = admin
            .list_book_instances(
                BookInstanceListFilter {
                    status: None,
                    due_back: Some(DueBackFilter::ThisYear),
                },
                1,
            )
            .await
            .unwrap();
        assert_eq!(this_year.total, 2);
    }

    #[tokio::test]
    async fn test_change_list_rows() {
        let fixture = Fixture::seeded().await;
        let admin = &fixture.services.admin;

        let books = admin.list_books(1).await.unwrap();
        assert_eq!(books.per_page, ADMIN_PAGE_SIZE);
        assert_eq!(books.items[0].author.as_deref(), Some("Herbert, Frank"));
        assert_eq!(books.items[0].language.as_deref(), Some("English"));
        assert_eq!(books.items[0].display_genre, "Science Fiction");

        let genres = admin.list_genres(1).await.unwrap();
        assert_eq!(genres.items[0].display, "Science Fiction");

        assert!(matches!(admin.list_genres(2).await, Err(AppError::NotFound(_))));
    }
}
