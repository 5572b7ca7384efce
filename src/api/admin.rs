//! Staff console endpoints. Every handler requires a staff token.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use utoipa::IntoParams;
use uuid::Uuid;

use crate::{
    admin::{
        AuthorAdminRow, BookAdminRow, BookInstanceAdminRow, DefaultAdminRow, DueBackFilter,
        ModelAdmin,
    },
    error::AppResult,
    models::{
        Author, AuthorDetail, AuthorInput, Book, BookDetail, BookInput, BookInstance,
        BookInstanceInput, BookInstanceView, Caller, Genre, GenreInput, Language, LanguageInput,
        LoanStatus,
    },
    services::admin::BookInstanceListFilter,
    AppState,
};

use super::{PageQuery, PaginatedResponse};

/// Copy change list query
#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct BookInstanceQuery {
    /// Page number (default: 1)
    pub page: Option<i64>,
    /// available, maintenance, reserved or on_loan
    pub status: Option<LoanStatus>,
    /// today, past_7_days, this_month, this_year, no_date or has_date
    pub due_back: Option<DueBackFilter>,
}

/// Admin registration of every model
#[utoipa::path(
    get,
    path = "/admin/models",
    tag = "admin",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Model admin descriptors", body = Vec<ModelAdmin>),
        (status = 401, description = "Not authenticated"),
        (status = 403, description = "Staff only")
    )
)]
pub async fn list_models(
    State(state): State<AppState>,
    caller: Caller,
) -> AppResult<Json<Vec<ModelAdmin>>> {
    caller.require_staff()?;
    Ok(Json(state.services.admin.models()))
}

// Genres

#[utoipa::path(
    get,
    path = "/admin/genres",
    tag = "admin",
    security(("bearer_auth" = [])),
    params(PageQuery),
    responses(
        (status = 200, description = "Genre change list", body = PaginatedResponse<DefaultAdminRow>),
        (status = 403, description = "Staff only")
    )
)]
pub async fn list_genres(
    State(state): State<AppState>,
    caller: Caller,
    Query(query): Query<PageQuery>,
) -> AppResult<Json<PaginatedResponse<DefaultAdminRow>>> {
    caller.require_staff()?;
    let page = state.services.admin.list_genres(query.page()).await?;
    Ok(Json(page.into()))
}

#[utoipa::path(
    get,
    path = "/admin/genres/{id}",
    tag = "admin",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Genre ID")),
    responses(
        (status = 200, description = "Genre", body = Genre),
        (status = 404, description = "Genre not found")
    )
)]
pub async fn get_genre(
    State(state): State<AppState>,
    caller: Caller,
    Path(id): Path<i32>,
) -> AppResult<Json<Genre>> {
    caller.require_staff()?;
    Ok(Json(state.services.admin.get_genre(id).await?))
}

#[utoipa::path(
    post,
    path = "/admin/genres",
    tag = "admin",
    security(("bearer_auth" = [])),
    request_body = GenreInput,
    responses(
        (status = 201, description = "Genre created", body = Genre),
        (status = 400, description = "Invalid input")
    )
)]
pub async fn create_genre(
    State(state): State<AppState>,
    caller: Caller,
    Json(input): Json<GenreInput>,
) -> AppResult<(StatusCode, Json<Genre>)> {
    caller.require_staff()?;
    let genre = state.services.admin.create_genre(input).await?;
    Ok((StatusCode::CREATED, Json(genre)))
}

#[utoipa::path(
    put,
    path = "/admin/genres/{id}",
    tag = "admin",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Genre ID")),
    request_body = GenreInput,
    responses(
        (status = 200, description = "Genre updated", body = Genre),
        (status = 404, description = "Genre not found")
    )
)]
pub async fn update_genre(
    State(state): State<AppState>,
    caller: Caller,
    Path(id): Path<i32>,
    Json(input): Json<GenreInput>,
) -> AppResult<Json<Genre>> {
    caller.require_staff()?;
    Ok(Json(state.services.admin.update_genre(id, input).await?))
}

#[utoipa::path(
    delete,
    path = "/admin/genres/{id}",
    tag = "admin",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Genre ID")),
    responses(
        (status = 204, description = "Genre deleted"),
        (status = 404, description = "Genre not found")
    )
)]
pub async fn delete_genre(
    State(state): State<AppState>,
    caller: Caller,
    Path(id): Path<i32>,
) -> AppResult<StatusCode> {
    caller.require_staff()?;
    state.services.admin.delete_genre(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

// Languages

#[utoipa::path(
    get,
    path = "/admin/languages",
    tag = "admin",
    security(("bearer_auth" = [])),
    params(PageQuery),
    responses(
        (status = 200, description = "Language change list", body = PaginatedResponse<DefaultAdminRow>),
        (status = 403, description = "Staff only")
    )
)]
pub async fn list_languages(
    State(state): State<AppState>,
    caller: Caller,
    Query(query): Query<PageQuery>,
) -> AppResult<Json<PaginatedResponse<DefaultAdminRow>>> {
    caller.require_staff()?;
    let page = state.services.admin.list_languages(query.page()).await?;
    Ok(Json(page.into()))
}

#[utoipa::path(
    get,
    path = "/admin/languages/{id}",
    tag = "admin",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Language ID")),
    responses(
        (status = 200, description = "Language", body = Language),
        (status = 404, description = "Language not found")
    )
)]
pub async fn get_language(
    State(state): State<AppState>,
    caller: Caller,
    Path(id): Path<i32>,
) -> AppResult<Json<Language>> {
    caller.require_staff()?;
    Ok(Json(state.services.admin.get_language(id).await?))
}

#[utoipa::path(
    post,
    path = "/admin/languages",
    tag = "admin",
    security(("bearer_auth" = [])),
    request_body = LanguageInput,
    responses(
        (status = 201, description = "Language created", body = Language),
        (status = 400, description = "Invalid input")
    )
)]
pub async fn create_language(
    State(state): State<AppState>,
    caller: Caller,
    Json(input): Json<LanguageInput>,
) -> AppResult<(StatusCode, Json<Language>)> {
    caller.require_staff()?;
    let language = state.services.admin.create_language(input).await?;
    Ok((StatusCode::CREATED, Json(language)))
}

#[utoipa::path(
    put,
    path = "/admin/languages/{id}",
    tag = "admin",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Language ID")),
    request_body = LanguageInput,
    responses(
        (status = 200, description = "Language updated", body = Language),
        (status = 404, description = "Language not found")
    )
)]
pub async fn update_language(
    State(state): State<AppState>,
    caller: Caller,
    Path(id): Path<i32>,
    Json(input): Json<LanguageInput>,
) -> AppResult<Json<Language>> {
    caller.require_staff()?;
    Ok(Json(state.services.admin.update_language(id, input).await?))
}

#[utoipa::path(
    delete,
    path = "/admin/languages/{id}",
    tag = "admin",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Language ID")),
    responses(
        (status = 204, description = "Language deleted; its books lose their language"),
        (status = 404, description = "Language not found")
    )
)]
pub async fn delete_language(
    State(state): State<AppState>,
    caller: Caller,
    Path(id): Path<i32>,
) -> AppResult<StatusCode> {
    caller.require_staff()?;
    state.services.admin.delete_language(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

// Authors

#[utoipa::path(
    get,
    path = "/admin/authors",
    tag = "admin",
    security(("bearer_auth" = [])),
    params(PageQuery),
    responses(
        (status = 200, description = "Author change list", body = PaginatedResponse<AuthorAdminRow>),
        (status = 403, description = "Staff only")
    )
)]
pub async fn list_authors(
    State(state): State<AppState>,
    caller: Caller,
    Query(query): Query<PageQuery>,
) -> AppResult<Json<PaginatedResponse<AuthorAdminRow>>> {
    caller.require_staff()?;
    let page = state.services.admin.list_authors(query.page()).await?;
    Ok(Json(page.into()))
}

#[utoipa::path(
    get,
    path = "/admin/authors/{id}",
    tag = "admin",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Author ID")),
    responses(
        (status = 200, description = "Author with inline books", body = AuthorDetail),
        (status = 404, description = "Author not found")
    )
)]
pub async fn get_author(
    State(state): State<AppState>,
    caller: Caller,
    Path(id): Path<i32>,
) -> AppResult<Json<AuthorDetail>> {
    caller.require_staff()?;
    Ok(Json(state.services.admin.get_author(id).await?))
}

#[utoipa::path(
    post,
    path = "/admin/authors",
    tag = "admin",
    security(("bearer_auth" = [])),
    request_body = AuthorInput,
    responses(
        (status = 201, description = "Author created", body = Author),
        (status = 400, description = "Invalid input")
    )
)]
pub async fn create_author(
    State(state): State<AppState>,
    caller: Caller,
    Json(input): Json<AuthorInput>,
) -> AppResult<(StatusCode, Json<Author>)> {
    caller.require_staff()?;
    let author = state.services.admin.create_author(input).await?;
    Ok((StatusCode::CREATED, Json(author)))
}

#[utoipa::path(
    put,
    path = "/admin/authors/{id}",
    tag = "admin",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Author ID")),
    request_body = AuthorInput,
    responses(
        (status = 200, description = "Author updated", body = Author),
        (status = 404, description = "Author not found")
    )
)]
pub async fn update_author(
    State(state): State<AppState>,
    caller: Caller,
    Path(id): Path<i32>,
    Json(input): Json<AuthorInput>,
) -> AppResult<Json<Author>> {
    caller.require_staff()?;
    Ok(Json(state.services.admin.update_author(id, input).await?))
}

#[utoipa::path(
    delete,
    path = "/admin/authors/{id}",
    tag = "admin",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Author ID")),
    responses(
        (status = 204, description = "Author deleted; their books lose their author"),
        (status = 404, description = "Author not found")
    )
)]
pub async fn delete_author(
    State(state): State<AppState>,
    caller: Caller,
    Path(id): Path<i32>,
) -> AppResult<StatusCode> {
    caller.require_staff()?;
    state.services.admin.delete_author(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

// Books

#[utoipa::path(
    get,
    path = "/admin/books",
    tag = "admin",
    security(("bearer_auth" = [])),
    params(PageQuery),
    responses(
        (status = 200, description = "Book change list", body = PaginatedResponse<BookAdminRow>),
        (status = 403, description = "Staff only")
    )
)]
pub async fn list_books(
    State(state): State<AppState>,
    caller: Caller,
    Query(query): Query<PageQuery>,
) -> AppResult<Json<PaginatedResponse<BookAdminRow>>> {
    caller.require_staff()?;
    let page = state.services.admin.list_books(query.page()).await?;
    Ok(Json(page.into()))
}

#[utoipa::path(
    get,
    path = "/admin/books/{id}",
    tag = "admin",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Book ID")),
    responses(
        (status = 200, description = "Book with inline copies", body = BookDetail),
        (status = 404, description = "Book not found")
    )
)]
pub async fn get_book(
    State(state): State<AppState>,
    caller: Caller,
    Path(id): Path<i32>,
) -> AppResult<Json<BookDetail>> {
    caller.require_staff()?;
    Ok(Json(state.services.admin.get_book(id).await?))
}

#[utoipa::path(
    post,
    path = "/admin/books",
    tag = "admin",
    security(("bearer_auth" = [])),
    request_body = BookInput,
    responses(
        (status = 201, description = "Book created", body = Book),
        (status = 400, description = "Invalid input or unknown reference")
    )
)]
pub async fn create_book(
    State(state): State<AppState>,
    caller: Caller,
    Json(input): Json<BookInput>,
) -> AppResult<(StatusCode, Json<Book>)> {
    caller.require_staff()?;
    let book = state.services.admin.create_book(input).await?;
    Ok((StatusCode::CREATED, Json(book)))
}

#[utoipa::path(
    put,
    path = "/admin/books/{id}",
    tag = "admin",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Book ID")),
    request_body = BookInput,
    responses(
        (status = 200, description = "Book updated", body = Book),
        (status = 400, description = "Invalid input or unknown reference"),
        (status = 404, description = "Book not found")
    )
)]
pub async fn update_book(
    State(state): State<AppState>,
    caller: Caller,
    Path(id): Path<i32>,
    Json(input): Json<BookInput>,
) -> AppResult<Json<Book>> {
    caller.require_staff()?;
    Ok(Json(state.services.admin.update_book(id, input).await?))
}

#[utoipa::path(
    delete,
    path = "/admin/books/{id}",
    tag = "admin",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Book ID")),
    responses(
        (status = 204, description = "Book deleted; its copies lose their book"),
        (status = 404, description = "Book not found")
    )
)]
pub async fn delete_book(
    State(state): State<AppState>,
    caller: Caller,
    Path(id): Path<i32>,
) -> AppResult<StatusCode> {
    caller.require_staff()?;
    state.services.admin.delete_book(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

// Book instances

#[utoipa::path(
    get,
    path = "/admin/book-instances",
    tag = "admin",
    security(("bearer_auth" = [])),
    params(BookInstanceQuery),
    responses(
        (status = 200, description = "Copy change list", body = PaginatedResponse<BookInstanceAdminRow>),
        (status = 403, description = "Staff only")
    )
)]
pub async fn list_book_instances(
    State(state): State<AppState>,
    caller: Caller,
    Query(query): Query<BookInstanceQuery>,
) -> AppResult<Json<PaginatedResponse<BookInstanceAdminRow>>> {
    caller.require_staff()?;
    let filter = BookInstanceListFilter {
        status: query.status,
        due_back: query.due_back,
    };
    let page = state
        .services
        .admin
        .list_book_instances(filter, query.page.unwrap_or(1))
        .await?;
    Ok(Json(page.into()))
}

#[utoipa::path(
    get,
    path = "/admin/book-instances/{id}",
    tag = "admin",
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "Book instance ID")),
    responses(
        (status = 200, description = "Book instance", body = BookInstanceView),
        (status = 404, description = "Book instance not found")
    )
)]
pub async fn get_book_instance(
    State(state): State<AppState>,
    caller: Caller,
    Path(id): Path<Uuid>,
) -> AppResult<Json<BookInstanceView>> {
    caller.require_staff()?;
    Ok(Json(state.services.admin.get_book_instance(id).await?))
}

#[utoipa::path(
    post,
    path = "/admin/book-instances",
    tag = "admin",
    security(("bearer_auth" = [])),
    request_body = BookInstanceInput,
    responses(
        (status = 201, description = "Book instance created", body = BookInstance),
        (status = 400, description = "Duplicate id or unknown reference")
    )
)]
pub async fn create_book_instance(
    State(state): State<AppState>,
    caller: Caller,
    Json(input): Json<BookInstanceInput>,
) -> AppResult<(StatusCode, Json<BookInstance>)> {
    caller.require_staff()?;
    let instance = state.services.admin.create_book_instance(input).await?;
    Ok((StatusCode::CREATED, Json(instance)))
}

#[utoipa::path(
    put,
    path = "/admin/book-instances/{id}",
    tag = "admin",
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "Book instance ID")),
    request_body = BookInstanceInput,
    responses(
        (status = 200, description = "Book instance updated", body = BookInstance),
        (status = 400, description = "Unknown reference"),
        (status = 404, description = "Book instance not found")
    )
)]
pub async fn update_book_instance(
    State(state): State<AppState>,
    caller: Caller,
    Path(id): Path<Uuid>,
    Json(input): Json<BookInstanceInput>,
) -> AppResult<Json<BookInstance>> {
    caller.require_staff()?;
    Ok(Json(state.services.admin.update_book_instance(id, input).await?))
}

#[utoipa::path(
    delete,
    path = "/admin/book-instances/{id}",
    tag = "admin",
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "Book instance ID")),
    responses(
        (status = 204, description = "Book instance deleted"),
        (status = 404, description = "Book instance not found")
    )
)]
pub async fn delete_book_instance(
    State(state): State<AppState>,
    caller: Caller,
    Path(id): Path<Uuid>,
) -> AppResult<StatusCode> {
    caller.require_staff()?;
    state.services.admin.delete_book_instance(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
