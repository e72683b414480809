//! Data models for Libris

pub mod author;
pub mod book;
pub mod loan;

pub use author::{Author, AuthorWithBooks, CreateAuthor, UpdateAuthor};
pub use book::{Book, CreateBook, UpdateBook};
pub use loan::{normalize_user_name, CreateLoan, Loan, NewLoan};
