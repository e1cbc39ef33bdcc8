//! Books repository

use sqlx::{Pool, Postgres, Row};

use crate::{
    error::{AppError, AppResult},
    models::{
        book::{BookDetails, BookShort, CreateBook},
        Genre, PageQuery,
    },
};

#[derive(Clone)]
pub struct BooksRepository {
    pool: Pool<Postgres>,
}

impl BooksRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// List books with pagination, ordered by title
    pub async fn list(&self, query: &PageQuery) -> AppResult<(Vec<BookShort>, i64)> {
        let page = query.page.unwrap_or(1);
        let per_page = query.per_page.unwrap_or(10);
        let offset = (page - 1) * per_page;

        let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM books")
            .fetch_one(&self.pool)
            .await?;

        let books = sqlx::query_as::<_, BookShort>(&format!(
            r#"
            SELECT b.id, b.title, b.isbn,
                   a.last_name || ', ' || a.first_name as author_name,
                   (SELECT COUNT(*) FROM book_instances bi
                    WHERE bi.book_id = b.id) as nb_instances,
                   (SELECT COUNT(*) FROM book_instances bi
                    WHERE bi.book_id = b.id AND bi.status = 'a') as nb_available
            FROM books b
            LEFT JOIN authors a ON a.id = b.author_id
            ORDER BY b.title
            LIMIT {} OFFSET {}
            "#,
            per_page, offset
        ))
        .fetch_all(&self.pool)
        .await?;

        Ok((books, total))
    }

    /// Get book details by ID, with author, genres and copy counts
    pub async fn get_details(&self, id: i32) -> AppResult<BookDetails> {
        let row = sqlx::query(
            r#"
            SELECT b.id, b.title, b.author_id, b.summary, b.isbn,
                   a.last_name || ', ' || a.first_name as author_name,
                   (SELECT COUNT(*) FROM book_instances bi
                    WHERE bi.book_id = b.id) as nb_instances,
                   (SELECT COUNT(*) FROM book_instances bi
                    WHERE bi.book_id = b.id AND bi.status = 'a') as nb_available
            FROM books b
            LEFT JOIN authors a ON a.id = b.author_id
            WHERE b.id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Book {} not found", id)))?;

        let genres = self.get_book_genres(id).await?;

        Ok(BookDetails {
            id: row.get("id"),
            title: row.get("title"),
            author_id: row.get("author_id"),
            author_name: row.get("author_name"),
            summary: row.get("summary"),
            isbn: row.get("isbn"),
            genres,
            nb_instances: row.get("nb_instances"),
            nb_available: row.get("nb_available"),
        })
    }

    /// Load all genres for a book via the book_genres junction table
    async fn get_book_genres(&self, book_id: i32) -> AppResult<Vec<Genre>> {
        let genres = sqlx::query_as::<_, Genre>(
            r#"
            SELECT g.id, g.name
            FROM book_genres bg
            JOIN genres g ON g.id = bg.genre_id
            WHERE bg.book_id = $1
            ORDER BY g.name
            "#,
        )
        .bind(book_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(genres)
    }

    /// Replace all genres for a book: delete existing rows then insert new ones
    async fn sync_genres(&self, book_id: i32, genre_ids: &[i32]) -> AppResult<()> {
        sqlx::query("DELETE FROM book_genres WHERE book_id = $1")
            .bind(book_id)
            .execute(&self.pool)
            .await?;

        for genre_id in genre_ids {
            sqlx::query(
                r#"
                INSERT INTO book_genres (book_id, genre_id)
                VALUES ($1, $2)
                ON CONFLICT DO NOTHING
                "#,
            )
            .bind(book_id)
            .bind(genre_id)
            .execute(&self.pool)
            .await?;
        }

        Ok(())
    }

    /// Check if an ISBN already exists
    pub async fn isbn_exists(&self, isbn: &str, exclude_id: Option<i32>) -> AppResult<bool> {
        let exists: bool = if let Some(id) = exclude_id {
            sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM books WHERE isbn = $1 AND id != $2)")
                .bind(isbn)
                .bind(id)
                .fetch_one(&self.pool)
                .await?
        } else {
            sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM books WHERE isbn = $1)")
                .bind(isbn)
                .fetch_one(&self.pool)
                .await?
        };
        Ok(exists)
    }

    /// Create a new book with its genre links
    pub async fn create(&self, book: &CreateBook) -> AppResult<BookDetails> {
        let id = sqlx::query_scalar::<_, i32>(
            r#"
            INSERT INTO books (title, author_id, summary, isbn)
            VALUES ($1, $2, $3, $4)
            RETURNING id
            "#,
        )
        .bind(&book.title)
        .bind(book.author_id)
        .bind(&book.summary)
        .bind(&book.isbn)
        .fetch_one(&self.pool)
        .await?;

        self.sync_genres(id, &book.genre_ids).await?;

        self.get_details(id).await
    }

    /// Update a book, replacing all fields and the genre set
    pub async fn update(&self, id: i32, book: &CreateBook) -> AppResult<BookDetails> {
        let result = sqlx::query(
            r#"
            UPDATE books
            SET title = $1, author_id = $2, summary = $3, isbn = $4
            WHERE id = $5
            "#,
        )
        .bind(&book.title)
        .bind(book.author_id)
        .bind(&book.summary)
        .bind(&book.isbn)
        .bind(id)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Book {} not found", id)));
        }

        self.sync_genres(id, &book.genre_ids).await?;

        self.get_details(id).await
    }

    /// Count copies of a book
    pub async fn count_instances(&self, book_id: i32) -> AppResult<i64> {
        let count: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM book_instances WHERE book_id = $1")
                .bind(book_id)
                .fetch_one(&self.pool)
                .await?;
        Ok(count)
    }

    /// Delete a book and its genre links
    pub async fn delete(&self, id: i32) -> AppResult<()> {
        sqlx::query("DELETE FROM book_genres WHERE book_id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        let result = sqlx::query("DELETE FROM books WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Book {} not found", id)));
        }
        Ok(())
    }
}
