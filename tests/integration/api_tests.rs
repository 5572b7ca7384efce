//! API integration tests: the full router over the in-memory store

use std::sync::Arc;

use axum::{
    body::Body,
    http::{header, Request, StatusCode},
    Router,
};
use chrono::{Duration, NaiveDate};
use serde_json::{json, Value};
use tower::ServiceExt;
use uuid::Uuid;

use local_library_server::{
    api,
    clock::FixedClock,
    config::AppConfig,
    models::{
        AuthorInput, BookInput, BookInstanceInput, LanguageInput, LoanStatus, Permission, User,
        UserClaims,
    },
    repository::{memory::MemoryStore, Repository},
    services::Services,
    AppState,
};

const PATRON: i32 = 1;
const LIBRARIAN: i32 = 2;
const STAFF: i32 = 3;

struct TestApp {
    router: Router,
    repository: Repository,
    secret: String,
    today: NaiveDate,
    dune: i32,
    herbert: i32,
    patron_copy: Uuid,
    librarian_copy: Uuid,
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

async fn setup() -> TestApp {
    let today = NaiveDate::from_ymd_opt(2024, 1, 10).unwrap();
    let store = MemoryStore::new();
    let repository = Repository::in_memory(store.clone());

    store.insert_user(user(PATRON, "patron", false, vec![])).await;
    store
        .insert_user(user(LIBRARIAN, "librarian", false, vec![Permission::CanMarkReturned]))
        .await;
    store.insert_user(user(STAFF, "admin", true, vec![])).await;

    let herbert = repository
        .authors
        .create(&AuthorInput {
            first_name: "Frank".into(),
            last_name: "Herbert".into(),
            date_of_birth: NaiveDate::from_ymd_opt(1920, 10, 8),
            date_of_death: NaiveDate::from_ymd_opt(1986, 2, 11),
        })
        .await
        .unwrap()
        .id;
    let english = repository
        .languages
        .create(&LanguageInput { name: "English".into() })
        .await
        .unwrap()
        .id;
    let dune = repository
        .books
        .create(&BookInput {
            title: "Dune".into(),
            summary: "Desert planet.".into(),
            imprint: "Chilton".into(),
            isbn: "9780441172719".into(),
            author_id: Some(herbert),
            language_id: Some(english),
            genre_ids: vec![],
        })
        .await
        .unwrap()
        .id;

    let copy = |status, due_back, borrower_id| BookInstanceInput {
        id: None,
        book_id: Some(dune),
        due_back,
        status,
        borrower_id,
    };
    let patron_copy = repository
        .book_instances
        .create(&copy(LoanStatus::OnLoan, Some(today - Duration::days(1)), Some(PATRON)))
        .await
        .unwrap()
        .id;
    let librarian_copy = repository
        .book_instances
        .create(&copy(LoanStatus::OnLoan, Some(today + Duration::days(7)), Some(LIBRARIAN)))
        .await
        .unwrap()
        .id;
    repository
        .book_instances
        .create(&copy(LoanStatus::Available, None, None))
        .await
        .unwrap();

    let config = AppConfig::default();
    let secret = config.auth.jwt_secret.clone();
    let services = Services::new(repository.clone(), Arc::new(FixedClock(today)));
    let router = api::router(AppState {
        config: Arc::new(config),
        services: Arc::new(services),
    });

    TestApp {
        router,
        repository,
        secret,
        today,
        dune,
        herbert,
        patron_copy,
        librarian_copy,
    }
}

impl TestApp {
    fn token(&self, user_id: i32, is_staff: bool, permissions: &[Permission]) -> String {
        let now = chrono::Utc::now().timestamp();
        let claims = UserClaims {
            sub: format!("user{}", user_id),
            user_id,
            is_staff,
            permissions: permissions.iter().map(|p| p.as_str().to_string()).collect(),
            exp: now + 3600,
            iat: now,
        };
        tokio_test::assert_ok!(claims.create_token(&self.secret))
    }

    fn patron_token(&self) -> String {
        self.token(PATRON, false, &[])
    }

    fn librarian_token(&self) -> String {
        self.token(LIBRARIAN, false, &[Permission::CanMarkReturned])
    }

    fn staff_token(&self) -> String {
        self.token(STAFF, true, &[])
    }

    async fn send(&self, request: Request<Body>) -> (StatusCode, axum::http::HeaderMap, Value) {
        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let headers = response.headers().clone();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or(Value::Null)
        };
        (status, headers, body)
    }

    async fn get(&self, uri: &str, token: Option<&str>) -> (StatusCode, Value) {
        let mut request = Request::get(uri);
        if let Some(token) = token {
            request = request.header(header::AUTHORIZATION, format!("Bearer {}", token));
        }
        let (status, _, body) = self.send(request.body(Body::empty()).unwrap()).await;
        (status, body)
    }

    async fn renew(&self, id: Uuid, date: &str, token: Option<&str>) -> (StatusCode, axum::http::HeaderMap, Value) {
        let mut request = Request::post(format!("/api/v1/book-instances/{}/renew", id))
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded");
        if let Some(token) = token {
            request = request.header(header::AUTHORIZATION, format!("Bearer {}", token));
        }
        self.send(request.body(Body::from(format!("renewal_date={}", date))).unwrap())
            .await
    }

    async fn due_back(&self, id: Uuid) -> Option<NaiveDate> {
        self.repository
            .book_instances
            .get(id)
            .await
            .unwrap()
            .unwrap()
            .instance
            .due_back
    }
}

#[tokio::test]
async fn test_health_check() {
    let app = setup().await;
    let (status, body) = app.get("/api/v1/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");

    let (status, body) = app.get("/api/v1/ready", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ready");
}

#[tokio::test]
async fn test_home_counts() {
    let app = setup().await;
    let (status, body) = app.get("/api/v1/home", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body,
        json!({
            "num_books": 1,
            "num_instances": 3,
            "num_available": 1,
            "num_authors": 1
        })
    );
}

#[tokio::test]
async fn test_book_list_and_detail() {
    let app = setup().await;

    let (status, body) = app.get("/api/v1/books", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["total"], 1);
    assert_eq!(body["num_pages"], 1);
    assert_eq!(body["items"][0]["author_name"], "Herbert, Frank");

    let (status, body) = app.get(&format!("/api/v1/books/{}", app.dune), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["book"]["title"], "Dune");
    assert_eq!(body["language"]["name"], "English");
    assert_eq!(body["instances"].as_array().unwrap().len(), 3);

    let (status, body) = app.get("/api/v1/books/999", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "NotFound");
}

#[tokio::test]
async fn test_author_detail() {
    let app = setup().await;
    let (status, body) = app.get(&format!("/api/v1/authors/{}", app.herbert), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["author"]["date_of_birth"], "1920-10-08");
    assert_eq!(body["books"][0]["title"], "Dune");
}

#[tokio::test]
async fn test_invalid_page() {
    let app = setup().await;
    let (status, _) = app.get("/api/v1/authors?page=2", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    let (status, _) = app.get("/api/v1/books?page=0", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    let (status, _) = app.get("/api/v1/books?page=1", None).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_huge_page_is_invalid() {
    let app = setup().await;
    let huge = i64::MAX;
    let (status, body) = app.get(&format!("/api/v1/books?page={}", huge), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], format!("Invalid page ({})", huge));

    let (status, _) = app.get(&format!("/api/v1/authors?page={}", huge), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    let (status, _) = app
        .get(&format!("/api/v1/loans/all?page={}", huge), Some(&app.librarian_token()))
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    let (status, _) = app
        .get(&format!("/api/v1/admin/book-instances?page={}", huge), Some(&app.staff_token()))
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_my_loans_requires_login() {
    let app = setup().await;
    let (status, body) = app.get("/api/v1/loans/mine", None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["code"], 2);

    let (status, _) = app.get("/api/v1/loans/mine", Some("not-a-token")).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_my_loans_lists_only_own_copies() {
    let app = setup().await;
    let (status, body) = app.get("/api/v1/loans/mine", Some(&app.patron_token())).await;
    assert_eq!(status, StatusCode::OK);
    let items = body["items"].as_array().unwrap();
    assert_eq!(items.len(), 1);
    assert_eq!(items[0]["id"], app.patron_copy.to_string());
    assert_eq!(items[0]["status"], "on_loan");
    assert_eq!(items[0]["is_overdue"], true);
}

#[tokio::test]
async fn test_all_loans_requires_permission() {
    let app = setup().await;

    let (status, body) = app.get("/api/v1/loans/all", None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["code"], 3);

    let (status, _) = app.get("/api/v1/loans/all", Some(&app.patron_token())).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, body) = app.get("/api/v1/loans/all", Some(&app.librarian_token())).await;
    assert_eq!(status, StatusCode::OK);
    let ids: Vec<&str> = body["items"]
        .as_array()
        .unwrap()
        .iter()
        .map(|i| i["id"].as_str().unwrap())
        .collect();
    assert_eq!(
        ids,
        vec![app.patron_copy.to_string(), app.librarian_copy.to_string()]
    );
}

#[tokio::test]
async fn test_renew_checks_permission_first() {
    let app = setup().await;
    let unknown = Uuid::new_v4();

    let (status, _) = app
        .get(&format!("/api/v1/book-instances/{}/renew", unknown), Some(&app.patron_token()))
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _, _) = app.renew(unknown, "2024-01-20", None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _, _) = app
        .renew(unknown, "2024-01-20", Some(&app.librarian_token()))
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_renewal_form_default_date() {
    let app = setup().await;
    let (status, body) = app
        .get(
            &format!("/api/v1/book-instances/{}/renew", app.patron_copy),
            Some(&app.librarian_token()),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["renewal_date"], "2024-01-31");
    assert_eq!(body["book_instance"]["id"], app.patron_copy.to_string());
    assert_eq!(body["errors"], json!([]));
}

#[tokio::test]
async fn test_renew_redirects_to_all_loans() {
    let app = setup().await;
    let new_date = app.today + Duration::weeks(4);

    let (status, headers, _) = app
        .renew(app.patron_copy, &new_date.to_string(), Some(&app.librarian_token()))
        .await;
    assert_eq!(status, StatusCode::SEE_OTHER);
    assert_eq!(headers[header::LOCATION], "/api/v1/loans/all");
    assert_eq!(app.due_back(app.patron_copy).await, Some(new_date));

    let (_, body) = app.get("/api/v1/loans/mine", Some(&app.patron_token())).await;
    assert_eq!(body["items"][0]["status"], "on_loan");
    assert_eq!(body["items"][0]["borrower_id"], PATRON);
}

#[tokio::test]
async fn test_renew_accepts_two_digit_year() {
    let app = setup().await;
    let (status, _, _) = app
        .renew(app.patron_copy, "01/20/24", Some(&app.librarian_token()))
        .await;
    assert_eq!(status, StatusCode::SEE_OTHER);
    assert_eq!(
        app.due_back(app.patron_copy).await,
        NaiveDate::from_ymd_opt(2024, 1, 20)
    );
}

#[tokio::test]
async fn test_renew_rejects_past_date() {
    let app = setup().await;
    let before = app.due_back(app.patron_copy).await;

    let (status, _, body) = app
        .renew(app.patron_copy, "2024-01-09", Some(&app.librarian_token()))
        .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["errors"], json!(["Invalid date - renewal in past"]));
    assert_eq!(body["renewal_date"], "2024-01-09");
    assert_eq!(app.due_back(app.patron_copy).await, before);

    let (status, _, body) = app
        .renew(app.patron_copy, "2024-02-08", Some(&app.librarian_token()))
        .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(
        body["errors"],
        json!(["Invalid date - renewal more than 4 weeks ahead"])
    );
    assert_eq!(app.due_back(app.patron_copy).await, before);
}

#[tokio::test]
async fn test_admin_requires_staff() {
    let app = setup().await;
    let (status, _) = app.get("/api/v1/admin/models", None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = app
        .get("/api/v1/admin/models", Some(&app.librarian_token()))
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, body) = app.get("/api/v1/admin/models", Some(&app.staff_token())).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_array().unwrap().len(), 5);
}

#[tokio::test]
async fn test_admin_instance_list_filters() {
    let app = setup().await;
    let token = app.staff_token();

    let (status, body) = app
        .get("/api/v1/admin/book-instances?status=on_loan", Some(&token))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["total"], 2);
    assert_eq!(body["per_page"], 100);

    let (status, body) = app
        .get("/api/v1/admin/book-instances?due_back=no_date", Some(&token))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["total"], 1);
    let row = body["items"][0].as_object().unwrap();
    let mut keys: Vec<&str> = row.keys().map(|k| k.as_str()).collect();
    keys.sort();
    assert_eq!(keys, vec!["book", "borrower", "due_back", "id", "pk", "status"]);
}

#[tokio::test]
async fn test_admin_delete_author_keeps_books() {
    let app = setup().await;
    let token = app.staff_token();

    let request = Request::delete(format!("/api/v1/admin/authors/{}", app.herbert))
        .header(header::AUTHORIZATION, format!("Bearer {}", token))
        .body(Body::empty())
        .unwrap();
    let (status, _, _) = app.send(request).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, body) = app.get(&format!("/api/v1/books/{}", app.dune), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["book"]["author_id"], Value::Null);
    assert_eq!(body["author"], Value::Null);
}

#[tokio::test]
async fn test_admin_create_book_validates() {
    let app = setup().await;
    let token = app.staff_token();

    let create = |body: Value| {
        Request::post("/api/v1/admin/books")
            .header(header::AUTHORIZATION, format!("Bearer {}", token))
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    };

    let (status, _, body) = app
        .send(create(json!({
            "title": "Dune Messiah",
            "summary": "Sequel.",
            "imprint": "Putnam",
            "isbn": "9780593098233",
            "author_id": app.herbert,
            "language_id": null
        })))
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["title"], "Dune Messiah");

    let (status, _, _) = app
        .send(create(json!({
            "title": "Unknown",
            "summary": "Nobody wrote it.",
            "imprint": "None",
            "isbn": "0000000000000",
            "author_id": 999,
            "language_id": null
        })))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}
