//! OpenAPI documentation

use axum::Router;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::api::{admin, catalog, health, loans};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Local Library API",
        version = "1.0.0",
        description = "Library catalog, loans and staff console REST API"
    ),
    servers(
        (url = "/api/v1", description = "API v1")
    ),
    paths(
        // Health
        health::health_check,
        health::readiness_check,
        // Catalog
        catalog::home,
        catalog::list_books,
        catalog::get_book,
        catalog::list_authors,
        catalog::get_author,
        // Loans
        loans::my_loans,
        loans::all_loans,
        loans::renewal_form,
        loans::renew_book_instance,
        // Admin
        admin::list_models,
        admin::list_genres,
        admin::get_genre,
        admin::create_genre,
        admin::update_genre,
        admin::delete_genre,
        admin::list_languages,
        admin::get_language,
        admin::create_language,
        admin::update_language,
        admin::delete_language,
        admin::list_authors,
        admin::get_author,
        admin::create_author,
        admin::update_author,
        admin::delete_author,
        admin::list_books,
        admin::get_book,
        admin::create_book,
        admin::update_book,
        admin::delete_book,
        admin::list_book_instances,
        admin::get_book_instance,
        admin::create_book_instance,
        admin::update_book_instance,
        admin::delete_book_instance,
    ),
    components(
        schemas(
            // Catalog
            crate::models::Author,
            crate::models::AuthorDetail,
            crate::models::AuthorInput,
            crate::models::Book,
            crate::models::BookDetail,
            crate::models::BookInput,
            crate::models::BookListing,
            crate::models::Genre,
            crate::models::GenreInput,
            crate::models::Language,
            crate::models::LanguageInput,
            crate::services::catalog::HomeCounts,
            // Loans
            crate::models::BookInstance,
            crate::models::BookInstanceInput,
            crate::models::BookInstanceView,
            crate::models::LoanStatus,
            crate::forms::RenewBookForm,
            crate::forms::RenewalFormView,
            // Admin
            crate::admin::ModelAdmin,
            crate::admin::Fieldset,
            crate::admin::DefaultAdminRow,
            crate::admin::AuthorAdminRow,
            crate::admin::BookAdminRow,
            crate::admin::BookInstanceAdminRow,
            crate::admin::DueBackFilter,
            // Health
            health::HealthResponse,
            // Errors
            crate::error::ErrorResponse,
        )
    ),
    tags(
        (name = "health", description = "Health check endpoints"),
        (name = "catalog", description = "Public catalog browsing"),
        (name = "loans", description = "Borrowed books and renewals"),
        (name = "admin", description = "Staff console")
    )
)]
pub struct ApiDoc;

/// Create the OpenAPI documentation router
pub fn create_openapi_router() -> Router {
    Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
}
