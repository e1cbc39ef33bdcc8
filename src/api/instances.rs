//! Book copy endpoints

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use uuid::Uuid;
use validator::Validate;

use crate::{
    error::AppResult,
    models::{
        book_instance::{BookInstance, BookInstanceDetails, CreateBookInstance, UpdateBookInstance},
        PageQuery,
    },
};

use super::{books::PaginatedResponse, AuthenticatedUser};

/// List copies with pagination
#[utoipa::path(
    get,
    path = "/instances",
    tag = "instances",
    params(PageQuery),
    responses(
        (status = 200, description = "List of copies", body = PaginatedResponse<BookInstanceDetails>)
    )
)]
pub async fn list_instances(
    State(state): State<crate::AppState>,
    Query(query): Query<PageQuery>,
) -> AppResult<Json<PaginatedResponse<BookInstanceDetails>>> {
    let (instances, total) = state.services.catalog.list_instances(&query).await?;

    Ok(Json(PaginatedResponse {
        items: instances,
        total,
        page: query.page.unwrap_or(1),
        per_page: query.per_page.unwrap_or(10),
    }))
}

/// Get copy details by ID
#[utoipa::path(
    get,
    path = "/instances/{id}",
    tag = "instances",
    params(
        ("id" = Uuid, Path, description = "Copy ID")
    ),
    responses(
        (status = 200, description = "Copy details", body = BookInstanceDetails),
        (status = 404, description = "Copy not found")
    )
)]
pub async fn get_instance(
    State(state): State<crate::AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<BookInstanceDetails>> {
    let instance = state.services.catalog.get_instance(id).await?;
    Ok(Json(instance))
}

/// Create a new copy
#[utoipa::path(
    post,
    path = "/instances",
    tag = "instances",
    security(("bearer_auth" = [])),
    request_body = CreateBookInstance,
    responses(
        (status = 201, description = "Copy created", body = BookInstance),
        (status = 400, description = "Invalid input"),
        (status = 403, description = "Librarian privileges required"),
        (status = 404, description = "Book or language not found")
    )
)]
pub async fn create_instance(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Json(instance): Json<CreateBookInstance>,
) -> AppResult<(StatusCode, Json<BookInstance>)> {
    claims.require_librarian()?;
    instance.validate()?;

    let created = state.services.catalog.create_instance(instance).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

/// Update the imprint and language of a copy
#[utoipa::path(
    put,
    path = "/instances/{id}",
    tag = "instances",
    security(("bearer_auth" = [])),
    params(
        ("id" = Uuid, Path, description = "Copy ID")
    ),
    request_body = UpdateBookInstance,
    responses(
        (status = 200, description = "Copy updated", body = BookInstance),
        (status = 404, description = "Copy not found")
    )
)]
pub async fn update_instance(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<Uuid>,
    Json(instance): Json<UpdateBookInstance>,
) -> AppResult<Json<BookInstance>> {
    claims.require_librarian()?;
    instance.validate()?;

    let updated = state.services.catalog.update_instance(id, instance).await?;
    Ok(Json(updated))
}

/// Delete a copy
#[utoipa::path(
    delete,
    path = "/instances/{id}",
    tag = "instances",
    security(("bearer_auth" = [])),
    params(
        ("id" = Uuid, Path, description = "Copy ID")
    ),
    responses(
        (status = 204, description = "Copy deleted"),
        (status = 404, description = "Copy not found")
    )
)]
pub async fn delete_instance(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<Uuid>,
) -> AppResult<StatusCode> {
    claims.require_librarian()?;

    state.services.catalog.delete_instance(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
