//! Loan management endpoints

use axum::{
    extract::{Path, Query, State},
    Json,
};
use chrono::NaiveDate;
use serde::Deserialize;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::{
    error::AppResult,
    models::{book_instance::BookInstanceDetails, PageQuery},
};

use super::{books::PaginatedResponse, AuthenticatedUser};

/// Borrow / renew request. When due_back is omitted the server suggests
/// today plus three weeks, then validates it like any other date.
#[derive(Debug, Deserialize, ToSchema)]
pub struct LoanRequest {
    /// Requested due date (YYYY-MM-DD)
    pub due_back: Option<NaiveDate>,
}

/// Borrow a copy for the authenticated user
#[utoipa::path(
    post,
    path = "/instances/{id}/borrow",
    tag = "loans",
    security(("bearer_auth" = [])),
    params(
        ("id" = Uuid, Path, description = "Copy ID")
    ),
    request_body = LoanRequest,
    responses(
        (status = 200, description = "Copy borrowed", body = BookInstanceDetails),
        (status = 404, description = "Copy not found"),
        (status = 422, description = "Copy unavailable, borrower over a limit, or date outside the four-week window")
    )
)]
pub async fn borrow_instance(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<Uuid>,
    Json(request): Json<LoanRequest>,
) -> AppResult<Json<BookInstanceDetails>> {
    let instance = state
        .services
        .loans
        .borrow(id, claims.user_id, request.due_back)
        .await?;

    Ok(Json(instance))
}

/// Return a borrowed copy
#[utoipa::path(
    post,
    path = "/instances/{id}/return",
    tag = "loans",
    security(("bearer_auth" = [])),
    params(
        ("id" = Uuid, Path, description = "Copy ID")
    ),
    responses(
        (status = 200, description = "Copy returned", body = BookInstanceDetails),
        (status = 403, description = "Not the borrower and not a librarian"),
        (status = 404, description = "Copy not found"),
        (status = 422, description = "Copy is not on loan")
    )
)]
pub async fn return_instance(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<Uuid>,
) -> AppResult<Json<BookInstanceDetails>> {
    let instance = state
        .services
        .loans
        .return_copy(id, claims.user_id, claims.is_librarian())
        .await?;

    Ok(Json(instance))
}

/// Renew a loan, setting a new due date
#[utoipa::path(
    post,
    path = "/instances/{id}/renew",
    tag = "loans",
    security(("bearer_auth" = [])),
    params(
        ("id" = Uuid, Path, description = "Copy ID")
    ),
    request_body = LoanRequest,
    responses(
        (status = 200, description = "Loan renewed", body = BookInstanceDetails),
        (status = 403, description = "Mark-returned capability required"),
        (status = 404, description = "Copy not found"),
        (status = 422, description = "Date outside the four-week window")
    )
)]
pub async fn renew_instance(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<Uuid>,
    Json(request): Json<LoanRequest>,
) -> AppResult<Json<BookInstanceDetails>> {
    claims.require_mark_returned()?;

    let instance = state.services.loans.renew(id, request.due_back).await?;

    Ok(Json(instance))
}

/// List the authenticated user's borrowed copies, soonest due first
#[utoipa::path(
    get,
    path = "/loans/my",
    tag = "loans",
    security(("bearer_auth" = [])),
    params(PageQuery),
    responses(
        (status = 200, description = "Borrowed copies", body = PaginatedResponse<BookInstanceDetails>),
        (status = 401, description = "Not authenticated")
    )
)]
pub async fn my_loans(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Query(query): Query<PageQuery>,
) -> AppResult<Json<PaginatedResponse<BookInstanceDetails>>> {
    let (instances, total) = state
        .services
        .loans
        .get_user_loans(claims.user_id, &query)
        .await?;

    Ok(Json(PaginatedResponse {
        items: instances,
        total,
        page: query.page.unwrap_or(1),
        per_page: query.per_page.unwrap_or(10),
    }))
}

/// List all borrowed copies across the library
#[utoipa::path(
    get,
    path = "/loans/all",
    tag = "loans",
    security(("bearer_auth" = [])),
    params(PageQuery),
    responses(
        (status = 200, description = "All borrowed copies", body = PaginatedResponse<BookInstanceDetails>),
        (status = 403, description = "Mark-returned capability required")
    )
)]
pub async fn all_loans(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Query(query): Query<PageQuery>,
) -> AppResult<Json<PaginatedResponse<BookInstanceDetails>>> {
    claims.require_mark_returned()?;

    let (instances, total) = state.services.loans.get_all_loans(&query).await?;

    Ok(Json(PaginatedResponse {
        items: instances,
        total,
        page: query.page.unwrap_or(1),
        per_page: query.per_page.unwrap_or(10),
    }))
}
