//! API handlers for the catalog REST endpoints

pub mod admin;
pub mod catalog;
pub mod health;
pub mod loans;
pub mod openapi;

use axum::{
    async_trait,
    extract::FromRequestParts,
    http::{header::AUTHORIZATION, request::Parts},
    routing::get,
    Router,
};
use serde::{Deserialize, Serialize};
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use utoipa::{IntoParams, ToSchema};

use crate::{
    error::AppError,
    models::{Caller, UserClaims},
    services::Page,
    AppState,
};

/// Identity of the caller from the optional bearer token.
///
/// No header gives an anonymous caller; a malformed or invalid token is
/// rejected with 401.
#[async_trait]
impl FromRequestParts<AppState> for Caller {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let Some(auth_header) = parts.headers.get(AUTHORIZATION) else {
            return Ok(Caller::anonymous());
        };

        let auth_header = auth_header
            .to_str()
            .map_err(|_| AppError::Authentication("Invalid authorization header".to_string()))?;

        let token = auth_header
            .strip_prefix("Bearer ")
            .ok_or_else(|| AppError::Authentication("Invalid authorization header format".to_string()))?;

        let claims = UserClaims::from_token(token, &state.config.auth.jwt_secret)
            .map_err(|e| AppError::Authentication(e.to_string()))?;

        Ok(Caller(Some(claims)))
    }
}

/// Paginated response wrapper
#[derive(Serialize, ToSchema)]
pub struct PaginatedResponse<T>
where
    T: for<'a> ToSchema<'a>,
{
    /// Items of this page
    pub items: Vec<T>,
    /// Total number of items
    pub total: i64,
    /// Current page number
    pub page: i64,
    /// Items per page
    pub per_page: i64,
    pub num_pages: i64,
}

impl<T> From<Page<T>> for PaginatedResponse<T>
where
    T: for<'a> ToSchema<'a>,
{
    fn from(page: Page<T>) -> Self {
        Self {
            num_pages: page.num_pages(),
            items: page.items,
            total: page.total,
            page: page.page,
            per_page: page.per_page,
        }
    }
}

/// `?page=` query parameter
#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct PageQuery {
    /// Page number (default: 1)
    pub page: Option<i64>,
}

impl PageQuery {
    pub fn page(&self) -> i64 {
        self.page.unwrap_or(1)
    }
}

/// Build the application router with all routes
pub fn router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let api_v1 = Router::new()
        // Health check
        .route("/health", get(health::health_check))
        .route("/ready", get(health::readiness_check))
        // Catalog
        .route("/home", get(catalog::home))
        .route("/books", get(catalog::list_books))
        .route("/books/:id", get(catalog::get_book))
        .route("/authors", get(catalog::list_authors))
        .route("/authors/:id", get(catalog::get_author))
        // Loans
        .route("/loans/mine", get(loans::my_loans))
        .route("/loans/all", get(loans::all_loans))
        .route(
            "/book-instances/:id/renew",
            get(loans::renewal_form).post(loans::renew_book_instance),
        )
        // Admin
        .route("/admin/models", get(admin::list_models))
        .route("/admin/genres", get(admin::list_genres).post(admin::create_genre))
        .route(
            "/admin/genres/:id",
            get(admin::get_genre)
                .put(admin::update_genre)
                .delete(admin::delete_genre),
        )
        .route("/admin/languages", get(admin::list_languages).post(admin::create_language))
        .route(
            "/admin/languages/:id",
            get(admin::get_language)
                .put(admin::update_language)
                .delete(admin::delete_language),
        )
        .route("/admin/authors", get(admin::list_authors).post(admin::create_author))
        .route(
            "/admin/authors/:id",
            get(admin::get_author)
                .put(admin::update_author)
                .delete(admin::delete_author),
        )
        .route("/admin/books", get(admin::list_books).post(admin::create_book))
        .route(
            "/admin/books/:id",
            get(admin::get_book)
                .put(admin::update_book)
                .delete(admin::delete_book),
        )
        .route(
            "/admin/book-instances",
            get(admin::list_book_instances).post(admin::create_book_instance),
        )
        .route(
            "/admin/book-instances/:id",
            get(admin::get_book_instance)
                .put(admin::update_book_instance)
                .delete(admin::delete_book_instance),
        )
        .with_state(state);

    Router::new()
        .nest("/api/v1", api_v1)
        .merge(openapi::create_openapi_router())
        .layer(TraceLayer::new_for_http())
        .layer(CompressionLayer::new())
        .layer(cors)
}
