//! Loan management service
//!
//! A book is either available (no loan row) or loaned (exactly one loan row,
//! `available = false`). Creating a loan and deleting it are the only two
//! transitions; the store applies each one atomically.

use crate::{
    error::AppResult,
    models::{CreateLoan, Loan, NewLoan},
};

use super::Store;

#[derive(Clone)]
pub struct LoansService {
    store: Store,
}

impl LoansService {
    pub fn new(store: Store) -> Self {
        Self { store }
    }

    pub async fn list(&self) -> AppResult<Vec<Loan>> {
        self.store.loan_list().await
    }

    pub async fn get_by_id(&self, id: i32) -> AppResult<Loan> {
        self.store.loan_get_by_id(id).await
    }

    /// Lend a book to a borrower
    pub async fn create_loan(&self, request: CreateLoan) -> AppResult<Loan> {
        let loan = NewLoan::from(request);
        let created = self.store.loan_create(&loan).await?;
        tracing::info!(loan_id = created.id, book_id = created.book_id, "Book loaned");
        Ok(created)
    }

    /// Return a book by deleting its loan
    pub async fn return_loan(&self, id: i32) -> AppResult<()> {
        let loan = self.store.loan_delete(id).await?;
        tracing::info!(loan_id = loan.id, book_id = loan.book_id, "Book returned");
        Ok(())
    }
}
