//! OpenAPI documentation

use axum::Router;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::api::{auth, authors, books, genres, health, instances, languages, loans, stats, users};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Xulambis API",
        version = "1.0.0",
        description = "Library Catalog REST API"
    ),
    servers(
        (url = "/api/v1", description = "API v1")
    ),
    paths(
        // Health
        health::health_check,
        health::readiness_check,
        // Auth
        auth::login,
        auth::me,
        // Authors
        authors::list_authors,
        authors::get_author,
        authors::create_author,
        authors::update_author,
        authors::delete_author,
        // Books
        books::list_books,
        books::get_book,
        books::create_book,
        books::update_book,
        books::delete_book,
        // Genres
        genres::list_genres,
        genres::get_genre,
        genres::create_genre,
        genres::update_genre,
        genres::delete_genre,
        // Languages
        languages::list_languages,
        languages::get_language,
        languages::create_language,
        languages::update_language,
        languages::delete_language,
        // Instances
        instances::list_instances,
        instances::get_instance,
        instances::create_instance,
        instances::update_instance,
        instances::delete_instance,
        // Loans
        loans::borrow_instance,
        loans::return_instance,
        loans::renew_instance,
        loans::my_loans,
        loans::all_loans,
        // Users
        users::create_user,
        users::get_user,
        // Stats
        stats::get_summary,
    ),
    components(
        schemas(
            // Auth
            auth::LoginRequest,
            auth::LoginResponse,
            // Authors
            crate::models::author::Author,
            crate::models::author::CreateAuthor,
            // Books
            crate::models::book::BookDetails,
            crate::models::book::BookShort,
            crate::models::book::CreateBook,
            // Genres
            crate::models::genre::Genre,
            crate::models::genre::CreateGenre,
            // Languages
            crate::models::language::Language,
            crate::models::language::CreateLanguage,
            // Instances
            crate::models::book_instance::BookInstance,
            crate::models::book_instance::BookInstanceDetails,
            crate::models::book_instance::CreateBookInstance,
            crate::models::book_instance::UpdateBookInstance,
            crate::models::book_instance::LoanStatus,
            // Users
            crate::models::user::User,
            crate::models::user::UserDetails,
            crate::models::user::CreateUser,
            crate::models::user::AccountType,
            // Loans
            loans::LoanRequest,
            // Stats
            stats::CatalogSummary,
            // Health
            health::HealthResponse,
            // Errors
            crate::error::ErrorResponse,
        )
    ),
    tags(
        (name = "health", description = "Health check endpoints"),
        (name = "auth", description = "Authentication endpoints"),
        (name = "authors", description = "Author management"),
        (name = "books", description = "Book management"),
        (name = "genres", description = "Genre management"),
        (name = "languages", description = "Language management"),
        (name = "instances", description = "Book copy management"),
        (name = "loans", description = "Loan circulation"),
        (name = "users", description = "User management"),
        (name = "stats", description = "Statistics")
    )
)]
pub struct ApiDoc;

/// Create the OpenAPI documentation router
pub fn create_openapi_router() -> Router {
    Router::new().merge(SwaggerUi::new("/docs").url("/api-docs/openapi.json", ApiDoc::openapi()))
}
