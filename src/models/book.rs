//! Book model and related types

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use validator::Validate;

use crate::error::{AppError, AppResult, BusinessRule};

/// Book row
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Book {
    pub id: i32,
    pub title: String,
    pub author_id: i32,
    /// False while a loan references this book
    pub available: bool,
}

impl Book {
    /// Check that `book` (as looked up for a new loan) can be lent out.
    ///
    /// A missing book and an unavailable book are distinct business-rule
    /// violations; both leave the store untouched.
    pub fn ensure_loanable(book: Option<Book>) -> AppResult<Book> {
        match book {
            None => Err(AppError::BusinessRule(BusinessRule::BookNotFound)),
            Some(book) if !book.available => {
                Err(AppError::BusinessRule(BusinessRule::BookNotAvailable))
            }
            Some(book) => Ok(book),
        }
    }
}

/// Create book request
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct CreateBook {
    #[validate(length(min = 1, max = 200, message = "Title must be 1-200 characters"))]
    pub title: String,
    #[validate(range(min = 1, message = "author_id must be positive"))]
    pub author_id: i32,
}

/// Update book request. Availability is driven by loans only.
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct UpdateBook {
    #[validate(length(min = 1, max = 200, message = "Title must be 1-200 characters"))]
    pub title: Option<String>,
    #[validate(range(min = 1, message = "author_id must be positive"))]
    pub author_id: Option<i32>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn book(available: bool) -> Book {
        Book {
            id: 1,
            title: "Rayuela".into(),
            author_id: 1,
            available,
        }
    }

    #[test]
    fn loanable_only_when_present_and_available() {
        assert!(Book::ensure_loanable(Some(book(true))).is_ok());
        assert!(matches!(
            Book::ensure_loanable(Some(book(false))),
            Err(AppError::BusinessRule(BusinessRule::BookNotAvailable))
        ));
        assert!(matches!(
            Book::ensure_loanable(None),
            Err(AppError::BusinessRule(BusinessRule::BookNotFound))
        ));
    }

    #[test]
    fn create_book_constraints() {
        let ok = CreateBook { title: "R".into(), author_id: 3 };
        assert!(ok.validate().is_ok());

        let bad = CreateBook { title: String::new(), author_id: 0 };
        let errors = bad.validate().unwrap_err();
        let fields = errors.field_errors();
        assert!(fields.contains_key("title"));
        assert!(fields.contains_key("author_id"));
    }

    #[test]
    fn unknown_fields_do_not_reach_availability() {
        let update: UpdateBook =
            serde_json::from_str(r#"{"title": "Ficciones", "available": false}"#).unwrap();
        assert_eq!(update.title.as_deref(), Some("Ficciones"));
        assert_eq!(update.author_id, None);
    }
}
