//! OpenAPI documentation

use axum::Router;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::api::{authors, books, health, loans, pages};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Libris API",
        version = "1.0.0",
        description = "Library loans record service REST API"
    ),
    paths(
        pages::index,
        health::health_check,
        // Authors
        authors::list_authors,
        authors::get_author,
        authors::get_author_books,
        authors::create_author,
        authors::update_author,
        authors::delete_author,
        // Books
        books::list_books,
        books::get_book,
        books::create_book,
        books::update_book,
        books::delete_book,
        // Loans
        loans::list_loans,
        loans::get_loan,
        loans::create_loan,
        loans::delete_loan,
    ),
    components(
        schemas(
            crate::models::Author,
            crate::models::AuthorWithBooks,
            crate::models::CreateAuthor,
            crate::models::UpdateAuthor,
            crate::models::Book,
            crate::models::CreateBook,
            crate::models::UpdateBook,
            crate::models::Loan,
            crate::models::CreateLoan,
            health::HealthResponse,
            crate::error::ErrorResponse,
            crate::error::FieldError,
        )
    ),
    tags(
        (name = "pages", description = "Landing page"),
        (name = "health", description = "Health check"),
        (name = "authors", description = "Author management"),
        (name = "books", description = "Book management"),
        (name = "loans", description = "Lending and returns")
    )
)]
pub struct ApiDoc;

/// Create the OpenAPI documentation router
pub fn create_openapi_router() -> Router {
    Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
}
