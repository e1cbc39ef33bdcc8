//! Book (catalog title) model and related types

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use validator::Validate;

use super::genre::Genre;

/// Book with joined author and genres for the detail view
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct BookDetails {
    pub id: i32,
    pub title: String,
    pub author_id: Option<i32>,
    /// "Last, First" of the author, when one is set
    pub author_name: Option<String>,
    pub summary: String,
    pub isbn: String,
    pub genres: Vec<Genre>,
    /// Total copies of this title
    pub nb_instances: i64,
    /// Copies currently available for loan
    pub nb_available: i64,
}

/// Short book representation for lists
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct BookShort {
    pub id: i32,
    pub title: String,
    pub author_name: Option<String>,
    pub isbn: String,
    pub nb_instances: i64,
    pub nb_available: i64,
}

/// Create / full-update book request
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateBook {
    #[validate(length(min = 1, max = 200, message = "Title must be 1-200 characters"))]
    pub title: String,
    pub author_id: Option<i32>,
    #[validate(length(max = 1000, message = "Summary must be at most 1000 characters"))]
    pub summary: String,
    #[validate(length(min = 1, max = 13, message = "ISBN must be 1-13 characters"))]
    pub isbn: String,
    /// Genres assigned to the title; an update replaces the full set
    #[serde(default)]
    pub genre_ids: Vec<i32>,
}
