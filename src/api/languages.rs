//! Language endpoints

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use validator::Validate;

use crate::{
    error::AppResult,
    models::{
        language::{CreateLanguage, Language},
        PageQuery,
    },
};

use super::{books::PaginatedResponse, AuthenticatedUser};

/// List languages with pagination
#[utoipa::path(
    get,
    path = "/languages",
    tag = "languages",
    params(PageQuery),
    responses(
        (status = 200, description = "List of languages", body = PaginatedResponse<Language>)
    )
)]
pub async fn list_languages(
    State(state): State<crate::AppState>,
    Query(query): Query<PageQuery>,
) -> AppResult<Json<PaginatedResponse<Language>>> {
    let (languages, total) = state.services.catalog.list_languages(&query).await?;

    Ok(Json(PaginatedResponse {
        items: languages,
        total,
        page: query.page.unwrap_or(1),
        per_page: query.per_page.unwrap_or(10),
    }))
}

/// Get language by ID
#[utoipa::path(
    get,
    path = "/languages/{id}",
    tag = "languages",
    params(
        ("id" = i32, Path, description = "Language ID")
    ),
    responses(
        (status = 200, description = "Language details", body = Language),
        (status = 404, description = "Language not found")
    )
)]
pub async fn get_language(
    State(state): State<crate::AppState>,
    Path(id): Path<i32>,
) -> AppResult<Json<Language>> {
    let language = state.services.catalog.get_language(id).await?;
    Ok(Json(language))
}

/// Create a new language
#[utoipa::path(
    post,
    path = "/languages",
    tag = "languages",
    security(("bearer_auth" = [])),
    request_body = CreateLanguage,
    responses(
        (status = 201, description = "Language created", body = Language),
        (status = 400, description = "Invalid input"),
        (status = 409, description = "Language name already exists")
    )
)]
pub async fn create_language(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Json(language): Json<CreateLanguage>,
) -> AppResult<(StatusCode, Json<Language>)> {
    claims.require_librarian()?;
    language.validate()?;

    let created = state.services.catalog.create_language(language).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

/// Rename an existing language
#[utoipa::path(
    put,
    path = "/languages/{id}",
    tag = "languages",
    security(("bearer_auth" = [])),
    params(
        ("id" = i32, Path, description = "Language ID")
    ),
    request_body = CreateLanguage,
    responses(
        (status = 200, description = "Language updated", body = Language),
        (status = 404, description = "Language not found"),
        (status = 409, description = "Language name already exists")
    )
)]
pub async fn update_language(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<i32>,
    Json(language): Json<CreateLanguage>,
) -> AppResult<Json<Language>> {
    claims.require_librarian()?;
    language.validate()?;

    let updated = state.services.catalog.update_language(id, language).await?;
    Ok(Json(updated))
}

/// Delete a language
#[utoipa::path(
    delete,
    path = "/languages/{id}",
    tag = "languages",
    security(("bearer_auth" = [])),
    params(
        ("id" = i32, Path, description = "Language ID")
    ),
    responses(
        (status = 204, description = "Language deleted"),
        (status = 404, description = "Language not found"),
        (status = 409, description = "Language is still referenced by copies")
    )
)]
pub async fn delete_language(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<i32>,
) -> AppResult<StatusCode> {
    claims.require_librarian()?;

    state.services.catalog.delete_language(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
