//! Book domain methods on Repository

use sqlx::{Postgres, Transaction};

use super::Repository;
use crate::{
    error::{AppError, AppResult, BusinessRule},
    models::{Book, CreateBook, UpdateBook},
};

/// Lock the author row so it cannot be deleted before the book is written
async fn lock_author(tx: &mut Transaction<'_, Postgres>, author_id: i32) -> AppResult<()> {
    let author: Option<i32> =
        sqlx::query_scalar("SELECT id FROM authors WHERE id = $1 FOR SHARE")
            .bind(author_id)
            .fetch_optional(&mut **tx)
            .await?;
    match author {
        Some(_) => Ok(()),
        None => Err(AppError::BusinessRule(BusinessRule::AuthorNotFound)),
    }
}

impl Repository {
    /// List all books
    pub async fn books_list(&self) -> AppResult<Vec<Book>> {
        let rows = sqlx::query_as::<_, Book>(
            "SELECT id, title, author_id, available FROM books ORDER BY id",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    /// Get book by ID
    pub async fn books_get_by_id(&self, id: i32) -> AppResult<Book> {
        sqlx::query_as::<_, Book>(
            "SELECT id, title, author_id, available FROM books WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Book {} not found", id)))
    }

    /// Create book for an existing author; new books are available
    pub async fn books_create(&self, data: &CreateBook) -> AppResult<Book> {
        let mut tx = self.pool.begin().await?;
        lock_author(&mut tx, data.author_id).await?;

        let row = sqlx::query_as::<_, Book>(
            r#"
            INSERT INTO books (title, author_id, available)
            VALUES ($1, $2, TRUE)
            RETURNING id, title, author_id, available
            "#,
        )
        .bind(&data.title)
        .bind(data.author_id)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(row)
    }

    /// Update title and/or author
    pub async fn books_update(&self, id: i32, data: &UpdateBook) -> AppResult<Book> {
        let mut tx = self.pool.begin().await?;

        let exists: Option<i32> =
            sqlx::query_scalar("SELECT id FROM books WHERE id = $1 FOR UPDATE")
                .bind(id)
                .fetch_optional(&mut *tx)
                .await?;
        if exists.is_none() {
            return Err(AppError::NotFound(format!("Book {} not found", id)));
        }

        if let Some(author_id) = data.author_id {
            lock_author(&mut tx, author_id).await?;
        }

        let row = sqlx::query_as::<_, Book>(
            r#"
            UPDATE books
            SET title = COALESCE($2, title), author_id = COALESCE($3, author_id)
            WHERE id = $1
            RETURNING id, title, author_id, available
            "#,
        )
        .bind(id)
        .bind(&data.title)
        .bind(data.author_id)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(row)
    }

    /// Delete book unless loans still reference it
    pub async fn books_delete(&self, id: i32) -> AppResult<()> {
        let mut tx = self.pool.begin().await?;

        let exists: Option<i32> =
            sqlx::query_scalar("SELECT id FROM books WHERE id = $1 FOR UPDATE")
                .bind(id)
                .fetch_optional(&mut *tx)
                .await?;
        if exists.is_none() {
            return Err(AppError::NotFound(format!("Book {} not found", id)));
        }

        let loans: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM loans WHERE book_id = $1")
            .bind(id)
            .fetch_one(&mut *tx)
            .await?;
        if loans > 0 {
            return Err(AppError::HasDependents(format!(
                "Book {} still has {} loan(s)",
                id, loans
            )));
        }

        sqlx::query("DELETE FROM books WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(())
    }
}
