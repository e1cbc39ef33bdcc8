//! Statistics service

use crate::{api::stats::CatalogSummary, error::AppResult, repository::Repository};

#[derive(Clone)]
pub struct StatsService {
    repository: Repository,
}

impl StatsService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    /// Headline catalog counts. The visit counter is filled in by the
    /// handler, which owns it.
    pub async fn summary(&self) -> AppResult<CatalogSummary> {
        let pool = &self.repository.pool;

        let num_books: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM books")
            .fetch_one(pool)
            .await?;

        let num_instances: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM book_instances")
            .fetch_one(pool)
            .await?;

        let num_instances_available: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM book_instances WHERE status = 'a'")
                .fetch_one(pool)
                .await?;

        let num_authors: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM authors")
            .fetch_one(pool)
            .await?;

        Ok(CatalogSummary {
            num_books,
            num_instances,
            num_instances_available,
            num_authors,
            num_visits: 0,
        })
    }

    /// Connectivity probe for the readiness endpoint
    pub async fn ping_database(&self) -> AppResult<()> {
        sqlx::query_scalar::<_, i32>("SELECT 1")
            .fetch_one(&self.repository.pool)
            .await?;
        Ok(())
    }
}
