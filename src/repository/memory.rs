//! In-memory store
//!
//! Keeps every table in one `BTreeMap` per entity behind a single lock, so
//! each operation (including both loan transitions) is applied as one unit
//! and ids come out in insertion order. Used by the `memory` backend and
//! by tests.

use async_trait::async_trait;
use std::collections::BTreeMap;
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use super::LibraryStore;
use crate::{
    error::{AppError, AppResult, BusinessRule},
    models::{Author, Book, CreateAuthor, CreateBook, Loan, NewLoan, UpdateAuthor, UpdateBook},
};

#[derive(Default)]
struct MemoryData {
    authors: BTreeMap<i32, Author>,
    books: BTreeMap<i32, Book>,
    loans: BTreeMap<i32, Loan>,
    last_author_id: i32,
    last_book_id: i32,
    last_loan_id: i32,
}

#[derive(Clone, Default)]
pub struct MemoryRepository {
    data: Arc<RwLock<MemoryData>>,
}

impl MemoryRepository {
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> AppResult<RwLockReadGuard<'_, MemoryData>> {
        self.data
            .read()
            .map_err(|_| AppError::Internal("memory store lock poisoned".to_string()))
    }

    fn write(&self) -> AppResult<RwLockWriteGuard<'_, MemoryData>> {
        self.data
            .write()
            .map_err(|_| AppError::Internal("memory store lock poisoned".to_string()))
    }
}

fn author_not_found(id: i32) -> AppError {
    AppError::NotFound(format!("Author {} not found", id))
}

fn book_not_found(id: i32) -> AppError {
    AppError::NotFound(format!("Book {} not found", id))
}

fn loan_not_found(id: i32) -> AppError {
    AppError::NotFound(format!("Loan {} not found", id))
}

#[async_trait]
impl LibraryStore for MemoryRepository {
    async fn ping(&self) -> AppResult<()> {
        self.read().map(|_| ())
    }

    async fn author_list(&self) -> AppResult<Vec<Author>> {
        Ok(self.read()?.authors.values().cloned().collect())
    }

    async fn author_get_by_id(&self, id: i32) -> AppResult<Author> {
        self.read()?
            .authors
            .get(&id)
            .cloned()
            .ok_or_else(|| author_not_found(id))
    }

    async fn author_create(&self, data: &CreateAuthor) -> AppResult<Author> {
        let mut guard = self.write()?;
        guard.last_author_id += 1;
        let author = Author {
            id: guard.last_author_id,
            name: data.name.clone(),
        };
        guard.authors.insert(author.id, author.clone());
        Ok(author)
    }

    async fn author_update(&self, id: i32, data: &UpdateAuthor) -> AppResult<Author> {
        let mut guard = self.write()?;
        let author = guard.authors.get_mut(&id).ok_or_else(|| author_not_found(id))?;
        if let Some(name) = &data.name {
            author.name = name.clone();
        }
        Ok(author.clone())
    }

    async fn author_delete(&self, id: i32) -> AppResult<()> {
        let mut guard = self.write()?;
        if !guard.authors.contains_key(&id) {
            return Err(author_not_found(id));
        }
        let books = guard.books.values().filter(|b| b.author_id == id).count();
        if books > 0 {
            return Err(AppError::HasDependents(format!(
                "Author {} still has {} book(s)",
                id, books
            )));
        }
        guard.authors.remove(&id);
        Ok(())
    }

    async fn author_books(&self, id: i32) -> AppResult<Vec<Book>> {
        let guard = self.read()?;
        if !guard.authors.contains_key(&id) {
            return Err(author_not_found(id));
        }
        Ok(guard
            .books
            .values()
            .filter(|b| b.author_id == id)
            .cloned()
            .collect())
    }

    async fn book_list(&self) -> AppResult<Vec<Book>> {
        Ok(self.read()?.books.values().cloned().collect())
    }

    async fn book_get_by_id(&self, id: i32) -> AppResult<Book> {
        self.read()?
            .books
            .get(&id)
            .cloned()
            .ok_or_else(|| book_not_found(id))
    }

    async fn book_create(&self, data: &CreateBook) -> AppResult<Book> {
        let mut guard = self.write()?;
        if !guard.authors.contains_key(&data.author_id) {
            return Err(AppError::BusinessRule(BusinessRule::AuthorNotFound));
        }
        guard.last_book_id += 1;
        let book = Book {
            id: guard.last_book_id,
            title: data.title.clone(),
            author_id: data.author_id,
            available: true,
        };
        guard.books.insert(book.id, book.clone());
        Ok(book)
    }

    async fn book_update(&self, id: i32, data: &UpdateBook) -> AppResult<Book> {
        let mut guard = self.write()?;
        if !guard.books.contains_key(&id) {
            return Err(book_not_found(id));
        }
        if let Some(author_id) = data.author_id {
            if !guard.authors.contains_key(&author_id) {
                return Err(AppError::BusinessRule(BusinessRule::AuthorNotFound));
            }
        }
        let book = guard.books.get_mut(&id).ok_or_else(|| book_not_found(id))?;
        if let Some(title) = &data.title {
            book.title = title.clone();
        }
        if let Some(author_id) = data.author_id {
            book.author_id = author_id;
        }
        Ok(book.clone())
    }

    async fn book_delete(&self, id: i32) -> AppResult<()> {
        let mut guard = self.write()?;
        if !guard.books.contains_key(&id) {
            return Err(book_not_found(id));
        }
        let loans = guard.loans.values().filter(|l| l.book_id == id).count();
        if loans > 0 {
            return Err(AppError::HasDependents(format!(
                "Book {} still has {} loan(s)",
                id, loans
            )));
        }
        guard.books.remove(&id);
        Ok(())
    }

    async fn loan_list(&self) -> AppResult<Vec<Loan>> {
        Ok(self.read()?.loans.values().cloned().collect())
    }

    async fn loan_get_by_id(&self, id: i32) -> AppResult<Loan> {
        self.read()?
            .loans
            .get(&id)
            .cloned()
            .ok_or_else(|| loan_not_found(id))
    }

    async fn loan_create(&self, loan: &NewLoan) -> AppResult<Loan> {
        let mut guard = self.write()?;
        let book = Book::ensure_loanable(guard.books.get(&loan.book_id).cloned())?;

        guard.last_loan_id += 1;
        let row = Loan {
            id: guard.last_loan_id,
            book_id: book.id,
            user_name: loan.user_name.clone(),
            loan_date: loan.loan_date,
            returned: false,
        };
        guard.loans.insert(row.id, row.clone());
        if let Some(book) = guard.books.get_mut(&row.book_id) {
            book.available = false;
        }
        Ok(row)
    }

    async fn loan_delete(&self, id: i32) -> AppResult<Loan> {
        let mut guard = self.write()?;
        let loan = guard.loans.remove(&id).ok_or_else(|| loan_not_found(id))?;
        if let Some(book) = guard.books.get_mut(&loan.book_id) {
            book.available = true;
        }
        Ok(loan)
    }
}
