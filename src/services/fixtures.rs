//! Seeded in-memory catalog shared by service tests

use std::sync::Arc;

use chrono::{Duration, NaiveDate};
use uuid::Uuid;

use crate::{
    clock::FixedClock,
    models::{
        AuthorInput, BookInput, BookInstanceInput, GenreInput, LanguageInput, LoanStatus,
        Permission, User,
    },
    repository::{memory::MemoryStore, Repository},
};

use super::Services;

pub const PATRON: i32 = 1;
pub const OTHER_PATRON: i32 = 2;
pub const LIBRARIAN: i32 = 3;

pub struct Fixture {
    pub store: MemoryStore,
    pub repository: Repository,
    pub services: Services,
    pub today: NaiveDate,
    pub herbert: i32,
    pub le_guin: i32,
    pub english: i32,
    pub science_fiction: i32,
    pub dune: i32,
    pub dispossessed: i32,
    /// Dune, lent to PATRON, two days overdue
    pub patron_copy: Uuid,
    /// Dune, lent to OTHER_PATRON, due in five days
    pub other_copy: Uuid,
    pub available_copy: Uuid,
    pub maintenance_copy: Uuid,
}

fn user(id: i32, username: &str, is_staff: bool, permissions: Vec<Permission>) -> User {
    User {
        id,
        username: username.to_string(),
        first_name: String::new(),
        last_name: String::new(),
        email: format!("{}@example.org", username),
        is_staff,
        permissions,
    }
}

impl Fixture {
    pub fn empty() -> Self {
        let today = NaiveDate::from_ymd_opt(2024, 1, 10).unwrap();
        let store = MemoryStore::new();
        let repository = Repository::in_memory(store.clone());
        let services = Services::new(repository.clone(), Arc::new(FixedClock(today)));
        Self {
            store,
            repository,
            services,
            today,
            herbert: 0,
            le_guin: 0,
            english: 0,
            science_fiction: 0,
            dune: 0,
            dispossessed: 0,
            patron_copy: Uuid::nil(),
            other_copy: Uuid::nil(),
            available_copy: Uuid::nil(),
            maintenance_copy: Uuid::nil(),
        }
    }

    pub async fn seeded() -> Self {
        let mut fixture = Self::empty();
        let repo = fixture.repository.clone();

        fixture.store.insert_user(user(PATRON, "patron", false, vec![])).await;
        fixture.store.insert_user(user(OTHER_PATRON, "reader", false, vec![])).await;
        fixture
            .store
            .insert_user(user(LIBRARIAN, "librarian", true, vec![Permission::CanMarkReturned]))
            .await;

        fixture.herbert = repo.authors.create(&author("Frank", "Herbert")).await.unwrap().id;
        fixture.le_guin = repo.authors.create(&author("Ursula", "Le Guin")).await.unwrap().id;
        fixture.english = repo
            .languages
            .create(&LanguageInput { name: "English".into() })
            .await
            .unwrap()
            .id;
        fixture.science_fiction = repo
            .genres
            .create(&GenreInput { name: "Science Fiction".into() })
            .await
            .unwrap()
            .id;

        fixture.dune = repo
            .books
            .create(&BookInput {
                author_id: Some(fixture.herbert),
                language_id: Some(fixture.english),
                genre_ids: vec![fixture.science_fiction],
                ..book_input("Dune")
            })
            .await
            .unwrap()
            .id;
        fixture.dispossessed = repo
            .books
            .create(&BookInput {
                author_id: Some(fixture.le_guin),
                ..book_input("The Dispossessed")
            })
            .await
            .unwrap()
            .id;

        let today = fixture.today;
        fixture.patron_copy = fixture
            .add_copy(fixture.dune, LoanStatus::OnLoan, Some(today - Duration::days(2)), Some(PATRON))
            .await;
        fixture.other_copy = fixture
            .add_copy(fixture.dune, LoanStatus::OnLoan, Some(today + Duration::days(5)), Some(OTHER_PATRON))
            .await;
        fixture.available_copy = fixture
            .add_copy(fixture.dune, LoanStatus::Available, None, None)
            .await;
        fixture.maintenance_copy = fixture
            .add_copy(fixture.dispossessed, LoanStatus::Maintenance, None, None)
            .await;

        fixture
    }

    pub async fn add_book(&self, title: &str, author_id: Option<i32>) -> i32 {
        self.repository
            .books
            .create(&BookInput {
                author_id,
                ..book_input(title)
            })
            .await
            .unwrap()
            .id
    }

    pub async fn add_copy(
        &self,
        book_id: i32,
        status: LoanStatus,
        due_back: Option<NaiveDate>,
        borrower_id: Option<i32>,
    ) -> Uuid {
        self.repository
            .book_instances
            .create(&BookInstanceInput {
                id: None,
                book_id: Some(book_id),
                due_back,
                status,
                borrower_id,
            })
            .await
            .unwrap()
            .id
    }
}

pub fn author(first_name: &str, last_name: &str) -> AuthorInput {
    AuthorInput {
        first_name: first_name.to_string(),
        last_name: last_name.to_string(),
        date_of_birth: None,
        date_of_death: None,
    }
}

pub fn book_input(title: &str) -> BookInput {
    BookInput {
        title: title.to_string(),
        summary: format!("Summary of {}", title),
        imprint: "Ace".to_string(),
        isbn: "9780441172719".to_string(),
        author_id: None,
        language_id: None,
        genre_ids: vec![],
    }
}
