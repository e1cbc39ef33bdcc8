//! Data models for the Xulambis catalog

pub mod author;
pub mod book;
pub mod book_instance;
pub mod genre;
pub mod language;
pub mod user;

use serde::Deserialize;
use utoipa::{IntoParams, ToSchema};

// Re-export commonly used types
pub use author::Author;
pub use book::{BookDetails, BookShort};
pub use book_instance::{BookInstance, BookInstanceDetails, LoanStatus};
pub use genre::Genre;
pub use language::Language;
pub use user::{AccountType, User, UserClaims, UserDetails};

/// Pagination query parameters shared by all listing endpoints
#[derive(Debug, Default, Clone, Copy, Deserialize, IntoParams, ToSchema)]
pub struct PageQuery {
    pub page: Option<i64>,
    pub per_page: Option<i64>,
}
