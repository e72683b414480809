//! Loan model and related types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use validator::{Validate, ValidationError};

/// Loan row. Returning a book deletes its loan, so `returned` stays false.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Loan {
    pub id: i32,
    pub book_id: i32,
    pub user_name: String,
    pub loan_date: DateTime<Utc>,
    pub returned: bool,
}

/// Create loan request
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct CreateLoan {
    #[validate(range(min = 1, message = "book_id must be positive"))]
    pub book_id: i32,
    #[validate(custom(function = validate_user_name))]
    pub user_name: String,
}

/// Length bound applies to the name as stored, i.e. after trimming
fn validate_user_name(user_name: &str) -> Result<(), ValidationError> {
    let len = user_name.trim().chars().count();
    if (2..=100).contains(&len) {
        Ok(())
    } else {
        let mut error = ValidationError::new("length");
        error.message = Some("User name must be 2-100 characters".into());
        Err(error)
    }
}

/// Loan ready to be written: borrower name already normalized
#[derive(Debug, Clone)]
pub struct NewLoan {
    pub book_id: i32,
    pub user_name: String,
    pub loan_date: DateTime<Utc>,
}

impl From<CreateLoan> for NewLoan {
    fn from(request: CreateLoan) -> Self {
        Self {
            book_id: request.book_id,
            user_name: normalize_user_name(&request.user_name),
            loan_date: Utc::now(),
        }
    }
}

/// Trim and title-case a borrower name.
///
/// A letter starts a word when the previous character is not a letter, so
/// `"o'brien-smith"` becomes `"O'Brien-Smith"`.
pub fn normalize_user_name(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut prev_is_letter = false;
    for c in raw.trim().chars() {
        if c.is_alphabetic() {
            if prev_is_letter {
                out.extend(c.to_lowercase());
            } else {
                out.extend(c.to_uppercase());
            }
            prev_is_letter = true;
        } else {
            out.push(c);
            prev_is_letter = false;
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn title_cases_lowercase_input() {
        assert_eq!(normalize_user_name("ana garcia"), "Ana Garcia");
    }

    #[test]
    fn already_title_cased_is_unchanged() {
        assert_eq!(normalize_user_name("Ana Garcia"), "Ana Garcia");
        let once = normalize_user_name("mARÍA lÓpez");
        assert_eq!(once, "María López");
        assert_eq!(normalize_user_name(&once), once);
    }

    #[test]
    fn trims_and_lowers_the_rest() {
        assert_eq!(normalize_user_name("   CARLOS   MENDOZA "), "Carlos   Mendoza");
    }

    #[test]
    fn punctuation_and_digits_start_new_words() {
        assert_eq!(normalize_user_name("o'brien-smith"), "O'Brien-Smith");
        assert_eq!(normalize_user_name("user2name"), "User2Name");
    }

    #[test]
    fn new_loan_normalizes_request() {
        let loan: NewLoan = CreateLoan {
            book_id: 4,
            user_name: " juan pérez ".into(),
        }
        .into();
        assert_eq!(loan.book_id, 4);
        assert_eq!(loan.user_name, "Juan Pérez");
    }

    #[test]
    fn user_name_bounds() {
        let short = CreateLoan { book_id: 1, user_name: "a".into() };
        assert!(short.validate().is_err());
        let zero_book = CreateLoan { book_id: 0, user_name: "Ana".into() };
        assert!(zero_book.validate().is_err());
    }

    #[test]
    fn user_name_bounds_apply_after_trimming() {
        for blank in ["   ", " a ", "\t\n"] {
            let request = CreateLoan { book_id: 1, user_name: blank.into() };
            let errors = request.validate().unwrap_err();
            assert_eq!(errors.field_errors()["user_name"][0].code, "length");
        }

        let padded = CreateLoan { book_id: 1, user_name: format!("  {}  ", "x".repeat(100)) };
        assert!(padded.validate().is_ok());
        let long = CreateLoan { book_id: 1, user_name: "x".repeat(101) };
        assert!(long.validate().is_err());
    }
}
