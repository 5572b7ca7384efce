//! Loan endpoints: borrowed-copy lists and due-date renewal

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
    Form, Json,
};
use uuid::Uuid;

use crate::{
    error::AppResult,
    forms::{RenewBookForm, RenewalFormView},
    models::{BookInstanceView, Caller, Permission},
    services::loans::RenewOutcome,
    AppState,
};

use super::{PageQuery, PaginatedResponse};

/// Where a successful renewal sends the librarian
pub const RENEWED_REDIRECT: &str = "/api/v1/loans/all";

/// Copies on loan to the current user
#[utoipa::path(
    get,
    path = "/loans/mine",
    tag = "loans",
    security(("bearer_auth" = [])),
    params(PageQuery),
    responses(
        (status = 200, description = "Caller's loans, soonest due first", body = PaginatedResponse<BookInstanceView>),
        (status = 401, description = "Not authenticated"),
        (status = 404, description = "Invalid page")
    )
)]
pub async fn my_loans(
    State(state): State<AppState>,
    caller: Caller,
    Query(query): Query<PageQuery>,
) -> AppResult<Json<PaginatedResponse<BookInstanceView>>> {
    let claims = caller.require_authenticated()?;

    let page = state
        .services
        .loans
        .borrowed_by(claims.user_id, query.page())
        .await?;
    Ok(Json(page.into()))
}

/// Every copy currently on loan
#[utoipa::path(
    get,
    path = "/loans/all",
    tag = "loans",
    security(("bearer_auth" = [])),
    params(PageQuery),
    responses(
        (status = 200, description = "All loans, soonest due first", body = PaginatedResponse<BookInstanceView>),
        (status = 403, description = "Missing can_mark_returned permission"),
        (status = 404, description = "Invalid page")
    )
)]
pub async fn all_loans(
    State(state): State<AppState>,
    caller: Caller,
    Query(query): Query<PageQuery>,
) -> AppResult<Json<PaginatedResponse<BookInstanceView>>> {
    caller.require_permission(Permission::CanMarkReturned)?;

    let page = state.services.loans.all_borrowed(query.page()).await?;
    Ok(Json(page.into()))
}

/// Renewal form with the suggested due date
#[utoipa::path(
    get,
    path = "/book-instances/{id}/renew",
    tag = "loans",
    security(("bearer_auth" = [])),
    params(
        ("id" = Uuid, Path, description = "Book instance ID")
    ),
    responses(
        (status = 200, description = "Renewal form", body = RenewalFormView),
        (status = 403, description = "Missing can_mark_returned permission"),
        (status = 404, description = "Book instance not found")
    )
)]
pub async fn renewal_form(
    State(state): State<AppState>,
    caller: Caller,
    Path(id): Path<Uuid>,
) -> AppResult<Json<RenewalFormView>> {
    caller.require_permission(Permission::CanMarkReturned)?;

    let form = state.services.loans.renewal_form(id).await?;
    Ok(Json(form))
}

/// Submit a new due date
#[utoipa::path(
    post,
    path = "/book-instances/{id}/renew",
    tag = "loans",
    security(("bearer_auth" = [])),
    params(
        ("id" = Uuid, Path, description = "Book instance ID")
    ),
    request_body(content = RenewBookForm, content_type = "application/x-www-form-urlencoded"),
    responses(
        (status = 303, description = "Renewed, redirect to all loans"),
        (status = 403, description = "Missing can_mark_returned permission"),
        (status = 404, description = "Book instance not found"),
        (status = 422, description = "Date rejected", body = RenewalFormView)
    )
)]
pub async fn renew_book_instance(
    State(state): State<AppState>,
    caller: Caller,
    Path(id): Path<Uuid>,
    form: Option<Form<RenewBookForm>>,
) -> AppResult<Response> {
    caller.require_permission(Permission::CanMarkReturned)?;

    let form = form.map(|Form(form)| form).unwrap_or_default();
    match state.services.loans.renew(id, form).await? {
        RenewOutcome::Renewed(_) => Ok(Redirect::to(RENEWED_REDIRECT).into_response()),
        RenewOutcome::Rejected(view) => {
            Ok((StatusCode::UNPROCESSABLE_ENTITY, Json(view)).into_response())
        }
    }
}
