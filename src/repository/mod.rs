//! Repository layer: the storage handle every request goes through
//!
//! [`LibraryStore`] is implemented by [`Repository`] (PostgreSQL) and by
//! [`MemoryRepository`] (in-process). Every multi-step write, in particular
//! the loan transitions, is applied atomically by the implementation.

pub mod authors;
pub mod books;
pub mod loans;
pub mod memory;

use async_trait::async_trait;
use sqlx::{Pool, Postgres};

use crate::{
    error::AppResult,
    models::{Author, Book, CreateAuthor, CreateBook, Loan, NewLoan, UpdateAuthor, UpdateBook},
};

pub use memory::MemoryRepository;

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait LibraryStore: Send + Sync {
    /// Round-trip to the store
    async fn ping(&self) -> AppResult<()>;

    async fn author_list(&self) -> AppResult<Vec<Author>>;
    async fn author_get_by_id(&self, id: i32) -> AppResult<Author>;
    async fn author_create(&self, data: &CreateAuthor) -> AppResult<Author>;
    async fn author_update(&self, id: i32, data: &UpdateAuthor) -> AppResult<Author>;
    /// Fails with `HasDependents` while the author still owns books
    async fn author_delete(&self, id: i32) -> AppResult<()>;
    async fn author_books(&self, id: i32) -> AppResult<Vec<Book>>;

    async fn book_list(&self) -> AppResult<Vec<Book>>;
    async fn book_get_by_id(&self, id: i32) -> AppResult<Book>;
    /// Fails with a business-rule error if the author does not exist
    async fn book_create(&self, data: &CreateBook) -> AppResult<Book>;
    async fn book_update(&self, id: i32, data: &UpdateBook) -> AppResult<Book>;
    /// Fails with `HasDependents` while loans reference the book
    async fn book_delete(&self, id: i32) -> AppResult<()>;

    async fn loan_list(&self) -> AppResult<Vec<Loan>>;
    async fn loan_get_by_id(&self, id: i32) -> AppResult<Loan>;
    /// Available -> Loaned: marks the book unavailable and inserts the loan
    async fn loan_create(&self, loan: &NewLoan) -> AppResult<Loan>;
    /// Loaned -> Available: deletes the loan and frees its book if it still exists
    async fn loan_delete(&self, id: i32) -> AppResult<Loan>;
}

/// PostgreSQL-backed store
#[derive(Clone)]
pub struct Repository {
    pub pool: Pool<Postgres>,
}

impl Repository {
    /// Create a new repository with the given database pool
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl LibraryStore for Repository {
    async fn ping(&self) -> AppResult<()> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }

    async fn author_list(&self) -> AppResult<Vec<Author>> {
        self.authors_list().await
    }

    async fn author_get_by_id(&self, id: i32) -> AppResult<Author> {
        self.authors_get_by_id(id).await
    }

    async fn author_create(&self, data: &CreateAuthor) -> AppResult<Author> {
        self.authors_create(data).await
    }

    async fn author_update(&self, id: i32, data: &UpdateAuthor) -> AppResult<Author> {
        self.authors_update(id, data).await
    }

    async fn author_delete(&self, id: i32) -> AppResult<()> {
        self.authors_delete(id).await
    }

    async fn author_books(&self, id: i32) -> AppResult<Vec<Book>> {
        self.authors_books(id).await
    }

    async fn book_list(&self) -> AppResult<Vec<Book>> {
        self.books_list().await
    }

    async fn book_get_by_id(&self, id: i32) -> AppResult<Book> {
        self.books_get_by_id(id).await
    }

    async fn book_create(&self, data: &CreateBook) -> AppResult<Book> {
        self.books_create(data).await
    }

    async fn book_update(&self, id: i32, data: &UpdateBook) -> AppResult<Book> {
        self.books_update(id, data).await
    }

    async fn book_delete(&self, id: i32) -> AppResult<()> {
        self.books_delete(id).await
    }

    async fn loan_list(&self) -> AppResult<Vec<Loan>> {
        self.loans_list().await
    }

    async fn loan_get_by_id(&self, id: i32) -> AppResult<Loan> {
        self.loans_get_by_id(id).await
    }

    async fn loan_create(&self, loan: &NewLoan) -> AppResult<Loan> {
        self.loans_create(loan).await
    }

    async fn loan_delete(&self, id: i32) -> AppResult<Loan> {
        self.loans_delete(id).await
    }
}
