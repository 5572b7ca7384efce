//! Public catalog endpoints: home page, books and authors

use axum::{
    extract::{Path, Query, State},
    Json,
};

use crate::{
    error::AppResult,
    models::{Author, AuthorDetail, BookDetail, BookListing},
    services::catalog::HomeCounts,
    AppState,
};

use super::{PageQuery, PaginatedResponse};

/// Library counts for the home page
#[utoipa::path(
    get,
    path = "/home",
    tag = "catalog",
    responses(
        (status = 200, description = "Catalog counts", body = HomeCounts)
    )
)]
pub async fn home(State(state): State<AppState>) -> AppResult<Json<HomeCounts>> {
    let counts = state.services.catalog.home_counts().await?;
    Ok(Json(counts))
}

/// List books, 10 per page
#[utoipa::path(
    get,
    path = "/books",
    tag = "catalog",
    params(PageQuery),
    responses(
        (status = 200, description = "Page of books", body = PaginatedResponse<BookListing>),
        (status = 404, description = "Invalid page")
    )
)]
pub async fn list_books(
    State(state): State<AppState>,
    Query(query): Query<PageQuery>,
) -> AppResult<Json<PaginatedResponse<BookListing>>> {
    let page = state.services.catalog.list_books(query.page()).await?;
    Ok(Json(page.into()))
}

/// Book details with its copies
#[utoipa::path(
    get,
    path = "/books/{id}",
    tag = "catalog",
    params(
        ("id" = i32, Path, description = "Book ID")
    ),
    responses(
        (status = 200, description = "Book details", body = BookDetail),
        (status = 404, description = "Book not found")
    )
)]
pub async fn get_book(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> AppResult<Json<BookDetail>> {
    let book = state.services.catalog.get_book_detail(id).await?;
    Ok(Json(book))
}

/// List authors by name, 10 per page
#[utoipa::path(
    get,
    path = "/authors",
    tag = "catalog",
    params(PageQuery),
    responses(
        (status = 200, description = "Page of authors", body = PaginatedResponse<Author>),
        (status = 404, description = "Invalid page")
    )
)]
pub async fn list_authors(
    State(state): State<AppState>,
    Query(query): Query<PageQuery>,
) -> AppResult<Json<PaginatedResponse<Author>>> {
    let page = state.services.catalog.list_authors(query.page()).await?;
    Ok(Json(page.into()))
}

/// Author details with their books
#[utoipa::path(
    get,
    path = "/authors/{id}",
    tag = "catalog",
    params(
        ("id" = i32, Path, description = "Author ID")
    ),
    responses(
        (status = 200, description = "Author details", body = AuthorDetail),
        (status = 404, description = "Author not found")
    )
)]
pub async fn get_author(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> AppResult<Json<AuthorDetail>> {
    let author = state.services.catalog.get_author_detail(id).await?;
    Ok(Json(author))
}
