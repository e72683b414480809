//! Loan domain methods on Repository
//!
//! Both transitions lock the book row (`FOR UPDATE`) inside one transaction.
//! Two racing loan creations on the same book therefore serialize: the second
//! re-reads the row after the first commits and sees `available = false`.
//! Any early return drops the transaction, which rolls it back.

use super::Repository;
use crate::{
    error::{AppError, AppResult},
    models::{Book, Loan, NewLoan},
};

const LOAN_COLUMNS: &str = "id, book_id, user_name, loan_date, returned";

impl Repository {
    /// List all loans
    pub async fn loans_list(&self) -> AppResult<Vec<Loan>> {
        let rows = sqlx::query_as::<_, Loan>(&format!(
            "SELECT {} FROM loans ORDER BY id",
            LOAN_COLUMNS
        ))
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    /// Get loan by ID
    pub async fn loans_get_by_id(&self, id: i32) -> AppResult<Loan> {
        sqlx::query_as::<_, Loan>(&format!("SELECT {} FROM loans WHERE id = $1", LOAN_COLUMNS))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Loan {} not found", id)))
    }

    /// Lend a book: flag it unavailable and record the loan
    pub async fn loans_create(&self, loan: &NewLoan) -> AppResult<Loan> {
        let mut tx = self.pool.begin().await?;

        let book = sqlx::query_as::<_, Book>(
            "SELECT id, title, author_id, available FROM books WHERE id = $1 FOR UPDATE",
        )
        .bind(loan.book_id)
        .fetch_optional(&mut *tx)
        .await?;
        let book = Book::ensure_loanable(book)?;

        sqlx::query("UPDATE books SET available = FALSE WHERE id = $1")
            .bind(book.id)
            .execute(&mut *tx)
            .await?;

        let row = sqlx::query_as::<_, Loan>(&format!(
            r#"
            INSERT INTO loans (book_id, user_name, loan_date, returned)
            VALUES ($1, $2, $3, FALSE)
            RETURNING {}
            "#,
            LOAN_COLUMNS
        ))
        .bind(book.id)
        .bind(&loan.user_name)
        .bind(loan.loan_date)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(row)
    }

    /// Return a book: delete the loan and flag the book available again
    pub async fn loans_delete(&self, id: i32) -> AppResult<Loan> {
        let mut tx = self.pool.begin().await?;

        let loan = sqlx::query_as::<_, Loan>(&format!(
            "SELECT {} FROM loans WHERE id = $1 FOR UPDATE",
            LOAN_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Loan {} not found", id)))?;

        // No-op when the book is gone
        sqlx::query("UPDATE books SET available = TRUE WHERE id = $1")
            .bind(loan.book_id)
            .execute(&mut *tx)
            .await?;

        sqlx::query("DELETE FROM loans WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(loan)
    }
}
