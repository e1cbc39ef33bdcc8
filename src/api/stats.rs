//! Statistics endpoints

use std::sync::atomic::Ordering;

use axum::{extract::State, Json};
use serde::Serialize;
use utoipa::ToSchema;

use crate::error::AppResult;

/// Catalog summary counts
#[derive(Serialize, ToSchema)]
pub struct CatalogSummary {
    /// Total number of books
    pub num_books: i64,
    /// Total number of copies
    pub num_instances: i64,
    /// Copies currently available for loan
    pub num_instances_available: i64,
    /// Total number of authors
    pub num_authors: i64,
    /// Times this summary has been requested since startup
    pub num_visits: u64,
}

/// Catalog summary with visit counter
#[utoipa::path(
    get,
    path = "/summary",
    tag = "stats",
    responses(
        (status = 200, description = "Catalog summary", body = CatalogSummary)
    )
)]
pub async fn get_summary(State(state): State<crate::AppState>) -> AppResult<Json<CatalogSummary>> {
    let num_visits = state.visits.fetch_add(1, Ordering::Relaxed) + 1;

    let mut summary = state.services.stats.summary().await?;
    summary.num_visits = num_visits;

    Ok(Json(summary))
}
