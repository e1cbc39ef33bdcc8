//! Languages repository

use sqlx::{Pool, Postgres};

use crate::{
    error::{AppError, AppResult},
    models::{language::CreateLanguage, Language, PageQuery},
};

#[derive(Clone)]
pub struct LanguagesRepository {
    pool: Pool<Postgres>,
}

impl LanguagesRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// List languages with pagination
    pub async fn list(&self, query: &PageQuery) -> AppResult<(Vec<Language>, i64)> {
        let page = query.page.unwrap_or(1);
        let per_page = query.per_page.unwrap_or(10);
        let offset = (page - 1) * per_page;

        let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM languages")
            .fetch_one(&self.pool)
            .await?;

        let languages = sqlx::query_as::<_, Language>(&format!(
            "SELECT * FROM languages ORDER BY name LIMIT {} OFFSET {}",
            per_page, offset
        ))
        .fetch_all(&self.pool)
        .await?;

        Ok((languages, total))
    }

    /// Get language by ID
    pub async fn get_by_id(&self, id: i32) -> AppResult<Language> {
        sqlx::query_as::<_, Language>("SELECT * FROM languages WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Language {} not found", id)))
    }

    /// Check if a language name already exists, ignoring case
    pub async fn name_exists(&self, name: &str, exclude_id: Option<i32>) -> AppResult<bool> {
        let exists: bool = if let Some(id) = exclude_id {
            sqlx::query_scalar(
                "SELECT EXISTS(SELECT 1 FROM languages WHERE LOWER(name) = LOWER($1) AND id != $2)",
            )
            .bind(name)
            .bind(id)
            .fetch_one(&self.pool)
            .await?
        } else {
            sqlx::query_scalar(
                "SELECT EXISTS(SELECT 1 FROM languages WHERE LOWER(name) = LOWER($1))",
            )
            .bind(name)
            .fetch_one(&self.pool)
            .await?
        };
        Ok(exists)
    }

    /// Create a new language
    pub async fn create(&self, language: &CreateLanguage) -> AppResult<Language> {
        let row = sqlx::query_as::<_, Language>(
            "INSERT INTO languages (name) VALUES ($1) RETURNING *",
        )
        .bind(&language.name)
        .fetch_one(&self.pool)
        .await?;
        Ok(row)
    }

    /// Rename a language
    pub async fn update(&self, id: i32, language: &CreateLanguage) -> AppResult<Language> {
        sqlx::query_as::<_, Language>("UPDATE languages SET name = $1 WHERE id = $2 RETURNING *")
            .bind(&language.name)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Language {} not found", id)))
    }

    /// Count copies referencing a language
    pub async fn count_instances(&self, language_id: i32) -> AppResult<i64> {
        let count: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM book_instances WHERE language_id = $1")
                .bind(language_id)
                .fetch_one(&self.pool)
                .await?;
        Ok(count)
    }

    /// Delete a language
    pub async fn delete(&self, id: i32) -> AppResult<()> {
        let result = sqlx::query("DELETE FROM languages WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Language {} not found", id)));
        }
        Ok(())
    }
}
