//! Book instances (copies) repository

use chrono::Utc;
use sqlx::{postgres::PgRow, Pool, Postgres, Row};
use uuid::Uuid;

use crate::{
    error::{AppError, AppResult},
    models::{
        book_instance::{BookInstance, BookInstanceDetails, CreateBookInstance, UpdateBookInstance},
        LoanStatus, PageQuery,
    },
};

#[derive(Clone)]
pub struct InstancesRepository {
    pool: Pool<Postgres>,
}

const DETAILS_SELECT: &str = r#"
    SELECT bi.id, bi.book_id, bi.imprint, bi.language_id, bi.status,
           bi.due_back, bi.borrower_id,
           b.title as book_title,
           l.name as language,
           u.username as borrower_username
    FROM book_instances bi
    LEFT JOIN books b ON b.id = bi.book_id
    LEFT JOIN languages l ON l.id = bi.language_id
    LEFT JOIN users u ON u.id = bi.borrower_id
"#;

impl InstancesRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    fn details_from_row(row: &PgRow, today: chrono::NaiveDate) -> BookInstanceDetails {
        let due_back: Option<chrono::NaiveDate> = row.get("due_back");
        BookInstanceDetails {
            id: row.get("id"),
            book_id: row.get("book_id"),
            book_title: row.get("book_title"),
            imprint: row.get("imprint"),
            language: row.get("language"),
            status: row.get("status"),
            due_back,
            borrower_id: row.get("borrower_id"),
            borrower_username: row.get("borrower_username"),
            is_overdue: due_back.map(|d| d < today).unwrap_or(false),
        }
    }

    /// List all copies with pagination, ordered by due date
    pub async fn list(&self, query: &PageQuery) -> AppResult<(Vec<BookInstanceDetails>, i64)> {
        let page = query.page.unwrap_or(1);
        let per_page = query.per_page.unwrap_or(10);
        let offset = (page - 1) * per_page;

        let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM book_instances")
            .fetch_one(&self.pool)
            .await?;

        let rows = sqlx::query(&format!(
            "{} ORDER BY bi.due_back LIMIT {} OFFSET {}",
            DETAILS_SELECT, per_page, offset
        ))
        .fetch_all(&self.pool)
        .await?;

        let today = Utc::now().date_naive();
        let instances = rows
            .iter()
            .map(|r| Self::details_from_row(r, today))
            .collect();

        Ok((instances, total))
    }

    /// Get a copy by ID
    pub async fn get_by_id(&self, id: Uuid) -> AppResult<BookInstance> {
        sqlx::query_as::<_, BookInstance>("SELECT * FROM book_instances WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Book instance {} not found", id)))
    }

    /// Get a copy with joined display fields
    pub async fn get_details(&self, id: Uuid) -> AppResult<BookInstanceDetails> {
        let row = sqlx::query(&format!("{} WHERE bi.id = $1", DETAILS_SELECT))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Book instance {} not found", id)))?;

        Ok(Self::details_from_row(&row, Utc::now().date_naive()))
    }

    /// Create a new copy; it starts out available
    pub async fn create(&self, instance: &CreateBookInstance) -> AppResult<BookInstance> {
        let id = Uuid::new_v4();

        let row = sqlx::query_as::<_, BookInstance>(
            r#"
            INSERT INTO book_instances (id, book_id, imprint, language_id, status)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(instance.book_id)
        .bind(&instance.imprint)
        .bind(instance.language_id)
        .bind(LoanStatus::Available)
        .fetch_one(&self.pool)
        .await?;

        Ok(row)
    }

    /// Edit the imprint and language of a copy. Status, borrower and due
    /// date are owned by the circulation flow and never touched here.
    pub async fn update(&self, id: Uuid, instance: &UpdateBookInstance) -> AppResult<BookInstance> {
        sqlx::query_as::<_, BookInstance>(
            r#"
            UPDATE book_instances
            SET imprint = $1, language_id = $2
            WHERE id = $3
            RETURNING *
            "#,
        )
        .bind(&instance.imprint)
        .bind(instance.language_id)
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Book instance {} not found", id)))
    }

    /// Persist the circulation state of a copy after a transition
    pub async fn save_circulation(&self, instance: &BookInstance) -> AppResult<()> {
        let result = sqlx::query(
            r#"
            UPDATE book_instances
            SET status = $1, borrower_id = $2, due_back = $3
            WHERE id = $4
            "#,
        )
        .bind(instance.status)
        .bind(instance.borrower_id)
        .bind(instance.due_back)
        .bind(instance.id)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!(
                "Book instance {} not found",
                instance.id
            )));
        }
        Ok(())
    }

    /// Delete a copy
    pub async fn delete(&self, id: Uuid) -> AppResult<()> {
        let result = sqlx::query("DELETE FROM book_instances WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Book instance {} not found", id)));
        }
        Ok(())
    }

    /// All copies assigned to a user as borrower, in any status. This is
    /// the loan snapshot the eligibility rules run over.
    pub async fn get_loans_for(&self, user_id: i32) -> AppResult<Vec<BookInstance>> {
        let loans = sqlx::query_as::<_, BookInstance>(
            "SELECT * FROM book_instances WHERE borrower_id = $1 ORDER BY due_back",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(loans)
    }

    /// Copies currently on loan to a user, ordered by due date
    pub async fn list_borrowed_by(
        &self,
        user_id: i32,
        query: &PageQuery,
    ) -> AppResult<(Vec<BookInstanceDetails>, i64)> {
        let page = query.page.unwrap_or(1);
        let per_page = query.per_page.unwrap_or(10);
        let offset = (page - 1) * per_page;

        let total: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM book_instances WHERE borrower_id = $1 AND status = 'o'",
        )
        .bind(user_id)
        .fetch_one(&self.pool)
        .await?;

        let rows = sqlx::query(&format!(
            "{} WHERE bi.borrower_id = $1 AND bi.status = 'o' ORDER BY bi.due_back LIMIT {} OFFSET {}",
            DETAILS_SELECT, per_page, offset
        ))
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        let today = Utc::now().date_naive();
        let instances = rows
            .iter()
            .map(|r| Self::details_from_row(r, today))
            .collect();

        Ok((instances, total))
    }

    /// All copies on loan to anyone, ordered by due date
    pub async fn list_all_borrowed(
        &self,
        query: &PageQuery,
    ) -> AppResult<(Vec<BookInstanceDetails>, i64)> {
        let page = query.page.unwrap_or(1);
        let per_page = query.per_page.unwrap_or(10);
        let offset = (page - 1) * per_page;

        let total: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM book_instances WHERE borrower_id IS NOT NULL AND status = 'o'",
        )
        .fetch_one(&self.pool)
        .await?;

        let rows = sqlx::query(&format!(
            "{} WHERE bi.borrower_id IS NOT NULL AND bi.status = 'o' ORDER BY bi.due_back LIMIT {} OFFSET {}",
            DETAILS_SELECT, per_page, offset
        ))
        .fetch_all(&self.pool)
        .await?;

        let today = Utc::now().date_naive();
        let instances = rows
            .iter()
            .map(|r| Self::details_from_row(r, today))
            .collect();

        Ok((instances, total))
    }
}
