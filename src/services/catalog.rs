//! Catalog management service
//!
//! CRUD orchestration for authors, books, genres, languages and copies.
//! Uniqueness probes and delete pre-checks live here so the handlers stay
//! thin and the repository stays free of business rules.

use uuid::Uuid;

use crate::{
    error::{AppError, AppResult},
    models::{
        author::{Author, CreateAuthor},
        book::{BookDetails, BookShort, CreateBook},
        book_instance::{BookInstance, BookInstanceDetails, CreateBookInstance, UpdateBookInstance},
        genre::{CreateGenre, Genre},
        language::{CreateLanguage, Language},
        PageQuery,
    },
    repository::Repository,
};

#[derive(Clone)]
pub struct CatalogService {
    repository: Repository,
}

impl CatalogService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    // ---- Authors ----

    pub async fn list_authors(&self, query: &PageQuery) -> AppResult<(Vec<Author>, i64)> {
        self.repository.authors.list(query).await
    }

    pub async fn get_author(&self, id: i32) -> AppResult<Author> {
        self.repository.authors.get_by_id(id).await
    }

    pub async fn create_author(&self, author: CreateAuthor) -> AppResult<Author> {
        let created = self.repository.authors.create(&author).await?;
        tracing::info!("Created author {} ({})", created.display_name(), created.id);
        Ok(created)
    }

    /// Full replace of an author record
    pub async fn update_author(&self, id: i32, author: CreateAuthor) -> AppResult<Author> {
        self.repository.authors.update(id, &author).await
    }

    /// Delete an author. Refused while books still reference them.
    pub async fn delete_author(&self, id: i32) -> AppResult<()> {
        let nb_books = self.repository.authors.count_books(id).await?;
        if nb_books > 0 {
            return Err(AppError::Conflict {
                field: None,
                message: format!("Author has {} book(s) and cannot be deleted", nb_books),
            });
        }
        self.repository.authors.delete(id).await
    }

    // ---- Books ----

    pub async fn list_books(&self, query: &PageQuery) -> AppResult<(Vec<BookShort>, i64)> {
        self.repository.books.list(query).await
    }

    pub async fn get_book(&self, id: i32) -> AppResult<BookDetails> {
        self.repository.books.get_details(id).await
    }

    pub async fn create_book(&self, book: CreateBook) -> AppResult<BookDetails> {
        if self.repository.books.isbn_exists(&book.isbn, None).await? {
            return Err(AppError::duplicate("isbn", "A book with this ISBN already exists"));
        }
        if let Some(author_id) = book.author_id {
            self.repository.authors.get_by_id(author_id).await?;
        }
        let created = self.repository.books.create(&book).await?;
        tracing::info!("Created book '{}' ({})", created.title, created.id);
        Ok(created)
    }

    /// Full replace of a book record, genres included
    pub async fn update_book(&self, id: i32, book: CreateBook) -> AppResult<BookDetails> {
        if self.repository.books.isbn_exists(&book.isbn, Some(id)).await? {
            return Err(AppError::duplicate("isbn", "A book with this ISBN already exists"));
        }
        if let Some(author_id) = book.author_id {
            self.repository.authors.get_by_id(author_id).await?;
        }
        self.repository.books.update(id, &book).await
    }

    /// Delete a book. Refused while copies of it exist.
    pub async fn delete_book(&self, id: i32) -> AppResult<()> {
        let nb_copies = self.repository.books.count_instances(id).await?;
        if nb_copies > 0 {
            return Err(AppError::Conflict {
                field: None,
                message: format!("Book has {} copy(ies) and cannot be deleted", nb_copies),
            });
        }
        self.repository.books.delete(id).await
    }

    // ---- Genres ----

    pub async fn list_genres(&self, query: &PageQuery) -> AppResult<(Vec<Genre>, i64)> {
        self.repository.genres.list(query).await
    }

    pub async fn get_genre(&self, id: i32) -> AppResult<Genre> {
        self.repository.genres.get_by_id(id).await
    }

    pub async fn create_genre(&self, genre: CreateGenre) -> AppResult<Genre> {
        if self.repository.genres.name_exists(&genre.name, None).await? {
            return Err(AppError::duplicate("name", "A genre with this name already exists"));
        }
        self.repository.genres.create(&genre).await
    }

    pub async fn update_genre(&self, id: i32, genre: CreateGenre) -> AppResult<Genre> {
        if self.repository.genres.name_exists(&genre.name, Some(id)).await? {
            return Err(AppError::duplicate("name", "A genre with this name already exists"));
        }
        self.repository.genres.update(id, &genre).await
    }

    pub async fn delete_genre(&self, id: i32) -> AppResult<()> {
        self.repository.genres.delete(id).await
    }

    // ---- Languages ----

    pub async fn list_languages(&self, query: &PageQuery) -> AppResult<(Vec<Language>, i64)> {
        self.repository.languages.list(query).await
    }

    pub async fn get_language(&self, id: i32) -> AppResult<Language> {
        self.repository.languages.get_by_id(id).await
    }

    pub async fn create_language(&self, language: CreateLanguage) -> AppResult<Language> {
        if self.repository.languages.name_exists(&language.name, None).await? {
            return Err(AppError::duplicate("name", "A language with this name already exists"));
        }
        self.repository.languages.create(&language).await
    }

    pub async fn update_language(&self, id: i32, language: CreateLanguage) -> AppResult<Language> {
        if self.repository.languages.name_exists(&language.name, Some(id)).await? {
            return Err(AppError::duplicate("name", "A language with this name already exists"));
        }
        self.repository.languages.update(id, &language).await
    }

    /// Delete a language. Refused while copies still reference it.
    pub async fn delete_language(&self, id: i32) -> AppResult<()> {
        let nb_copies = self.repository.languages.count_instances(id).await?;
        if nb_copies > 0 {
            return Err(AppError::Conflict {
                field: None,
                message: format!("Language is used by {} copy(ies) and cannot be deleted", nb_copies),
            });
        }
        self.repository.languages.delete(id).await
    }

    // ---- Copies ----

    pub async fn list_instances(&self, query: &PageQuery) -> AppResult<(Vec<BookInstanceDetails>, i64)> {
        self.repository.instances.list(query).await
    }

    pub async fn get_instance(&self, id: Uuid) -> AppResult<BookInstanceDetails> {
        self.repository.instances.get_details(id).await
    }

    pub async fn create_instance(&self, instance: CreateBookInstance) -> AppResult<BookInstance> {
        if let Some(book_id) = instance.book_id {
            self.repository.books.get_details(book_id).await?;
        }
        if let Some(language_id) = instance.language_id {
            self.repository.languages.get_by_id(language_id).await?;
        }
        let created = self.repository.instances.create(&instance).await?;
        tracing::info!("Created copy {} of book {:?}", created.id, created.book_id);
        Ok(created)
    }

    /// Edit the imprint and language of a copy. Circulation fields are
    /// only ever changed through the loan flows.
    pub async fn update_instance(&self, id: Uuid, instance: UpdateBookInstance) -> AppResult<BookInstance> {
        if let Some(language_id) = instance.language_id {
            self.repository.languages.get_by_id(language_id).await?;
        }
        self.repository.instances.update(id, &instance).await
    }

    pub async fn delete_instance(&self, id: Uuid) -> AppResult<()> {
        self.repository.instances.delete(id).await
    }
}
