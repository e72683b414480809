//! In-process API tests over the memory backend

use std::sync::Arc;

use axum::{
    body::{to_bytes, Body},
    http::{header, Method, Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use tower::ServiceExt;

use libris_server::{api, repository::MemoryRepository, AppConfig, AppState};

fn app() -> Router {
    app_with_assets("static")
}

fn app_with_assets(dir: &str) -> Router {
    let mut config = AppConfig::default();
    config.assets.dir = dir.to_string();
    api::router(AppState::new(config, Arc::new(MemoryRepository::new())))
}

async fn send(app: &Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).into_owned()))
    };
    (status, value)
}

async fn create_author(app: &Router, name: &str) -> i64 {
    let (status, body) = send(app, Method::POST, "/authors", Some(json!({ "name": name }))).await;
    assert_eq!(status, StatusCode::CREATED);
    body["id"].as_i64().expect("No author ID")
}

async fn create_book(app: &Router, title: &str, author_id: i64) -> i64 {
    let (status, body) = send(
        app,
        Method::POST,
        "/books",
        Some(json!({ "title": title, "author_id": author_id })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    body["id"].as_i64().expect("No book ID")
}

#[tokio::test]
async fn test_health_check() {
    let app = app();
    let (status, body) = send(&app, Method::GET, "/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["database"], "connected");
}

#[tokio::test]
async fn test_landing_page() {
    let app = app();
    let request = Request::builder().uri("/").body(Body::empty()).unwrap();
    let response = app.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    assert!(String::from_utf8_lossy(&bytes).contains("<h1>Libris</h1>"));

    let (status, _) = send(&app, Method::GET, "/static/style.css", None).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_landing_page_missing() {
    let app = app_with_assets("does-not-exist");
    let (status, body) = send(&app, Method::GET, "/", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "NoSuchData");
}

#[tokio::test]
async fn test_author_crud() {
    let app = app();

    let (status, body) = send(&app, Method::POST, "/authors", Some(json!({ "name": "Isabel Allende" }))).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["name"], "Isabel Allende");
    let id = body["id"].as_i64().unwrap();

    let other = create_author(&app, "Isabel Allende").await;
    assert_ne!(id, other);

    let (status, body) = send(&app, Method::GET, &format!("/authors/{}", id), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "id": id, "name": "Isabel Allende" }));

    let (status, body) = send(
        &app,
        Method::PUT,
        &format!("/authors/{}", id),
        Some(json!({ "name": "Isabel Allende Llona" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["name"], "Isabel Allende Llona");

    let (status, body) = send(&app, Method::GET, "/authors", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_array().unwrap().len(), 2);

    let (status, _) = send(&app, Method::DELETE, &format!("/authors/{}", id), None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, _) = send(&app, Method::GET, &format!("/authors/{}", id), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_validation_lists_every_field() {
    let app = app();

    let (status, body) = send(&app, Method::POST, "/books", Some(json!({ "title": "", "author_id": 0 }))).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    let fields: Vec<&str> = body["details"]
        .as_array()
        .unwrap()
        .iter()
        .map(|f| f["field"].as_str().unwrap())
        .collect();
    assert_eq!(fields, vec!["author_id", "title"]);

    let (status, body) = send(&app, Method::POST, "/authors", Some(json!({ "name": "A" }))).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["details"][0]["field"], "name");

    // Missing field and wrong type never reach the store
    let (status, _) = send(&app, Method::POST, "/loans", Some(json!({ "user_name": "Ana" }))).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    let (status, _) = send(&app, Method::POST, "/authors", Some(json!({ "name": 12 }))).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);

    let (_, body) = send(&app, Method::GET, "/authors", None).await;
    assert!(body.as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_malformed_path_id_is_a_validation_error() {
    let app = app();

    let (status, body) = send(&app, Method::GET, "/books/abc", None).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["error"], "BadValue");
    assert_eq!(body["details"][0]["field"], "id");

    // Out of range for i32
    let (status, body) = send(&app, Method::DELETE, "/loans/3000000000", None).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["details"][0]["field"], "id");

    let (status, _) = send(&app, Method::PUT, "/authors/x", Some(json!({ "name": "Ana" }))).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn test_blank_user_name_is_rejected() {
    let app = app();
    let author = create_author(&app, "Ernesto Sabato").await;
    let book = create_book(&app, "El túnel", author).await;

    let (status, body) = send(&app, Method::POST, "/loans", Some(json!({ "book_id": book, "user_name": "   " }))).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["details"][0]["field"], "user_name");

    let (_, book) = send(&app, Method::GET, &format!("/books/{}", book), None).await;
    assert_eq!(book["available"], true);
}

#[tokio::test]
async fn test_book_requires_existing_author() {
    let app = app();
    let (status, body) = send(&app, Method::POST, "/books", Some(json!({ "title": "Huérfano", "author_id": 99 }))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Author not found");

    let (_, body) = send(&app, Method::GET, "/books", None).await;
    assert!(body.as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_author_books_and_book_update() {
    let app = app();
    let garcia = create_author(&app, "Gabriel García Márquez").await;
    let allende = create_author(&app, "Isabel Allende").await;
    let book = create_book(&app, "Cien años de soledad", garcia).await;
    create_book(&app, "Crónica de una muerte anunciada", garcia).await;

    let (status, body) = send(&app, Method::GET, &format!("/authors/{}/books", garcia), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["name"], "Gabriel García Márquez");
    assert_eq!(body["books"].as_array().unwrap().len(), 2);

    let (status, body) = send(
        &app,
        Method::PUT,
        &format!("/books/{}", book),
        Some(json!({ "author_id": allende })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["author_id"], allende);
    assert_eq!(body["title"], "Cien años de soledad");
    assert_eq!(body["available"], true);

    let (status, _) = send(&app, Method::PUT, &format!("/books/{}", book), Some(json!({ "author_id": 500 }))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    let (status, _) = send(&app, Method::PUT, "/books/500", Some(json!({ "title": "X" }))).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    let (status, _) = send(&app, Method::GET, "/authors/500/books", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_unavailable_book_cannot_be_loaned() {
    let app = app();
    let author = create_author(&app, "Gabriel García Márquez").await;
    let book = create_book(&app, "Libro prestado", author).await;

    let (status, _) = send(&app, Method::POST, "/loans", Some(json!({ "book_id": book, "user_name": "María López" }))).await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, body) = send(&app, Method::POST, "/loans", Some(json!({ "book_id": book, "user_name": "Pedro Páramo" }))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Book is not available");
    assert_eq!(body["error"], "BookNotAvailable");

    let (_, loans) = send(&app, Method::GET, "/loans", None).await;
    assert_eq!(loans.as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_loan_for_missing_book() {
    let app = app();
    let (status, body) = send(&app, Method::POST, "/loans", Some(json!({ "book_id": 12, "user_name": "Ana" }))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Book not found");

    let (_, loans) = send(&app, Method::GET, "/loans", None).await;
    assert!(loans.as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_delete_missing_ids() {
    let app = app();
    for uri in ["/authors/1", "/books/1", "/loans/1"] {
        let (status, body) = send(&app, Method::DELETE, uri, None).await;
        assert_eq!(status, StatusCode::NOT_FOUND, "{}", uri);
        assert!(body["message"].as_str().unwrap().contains("not found"));
    }
}

#[tokio::test]
async fn test_delete_with_dependents_is_rejected() {
    let app = app();
    let author = create_author(&app, "Jorge Luis Borges").await;
    let book = create_book(&app, "Ficciones", author).await;
    let (_, loan) = send(&app, Method::POST, "/loans", Some(json!({ "book_id": book, "user_name": "ana" }))).await;
    let loan_id = loan["id"].as_i64().unwrap();

    let (status, body) = send(&app, Method::DELETE, &format!("/authors/{}", author), None).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"], "HasDependents");
    let (status, _) = send(&app, Method::DELETE, &format!("/books/{}", book), None).await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, _) = send(&app, Method::DELETE, &format!("/loans/{}", loan_id), None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    let (status, _) = send(&app, Method::DELETE, &format!("/books/{}", book), None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    let (status, _) = send(&app, Method::DELETE, &format!("/authors/{}", author), None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
}

#[tokio::test]
async fn test_full_loan_flow() {
    let app = app();

    let author_id = create_author(&app, "Mario Vargas Llosa").await;

    let (status, book) = send(
        &app,
        Method::POST,
        "/books",
        Some(json!({ "title": "La ciudad y los perros", "author_id": author_id })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(book["available"], true);
    let book_id = book["id"].as_i64().unwrap();

    let (status, loan) = send(
        &app,
        Method::POST,
        "/loans",
        Some(json!({ "book_id": book_id, "user_name": "ana garcia" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(loan["user_name"], "Ana Garcia");
    assert_eq!(loan["returned"], false);
    assert!(loan["loan_date"].is_string());
    let loan_id = loan["id"].as_i64().unwrap();

    let (_, book) = send(&app, Method::GET, &format!("/books/{}", book_id), None).await;
    assert_eq!(book["available"], false);

    let (status, loan) = send(&app, Method::GET, &format!("/loans/{}", loan_id), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(loan["book_id"], book_id);
    assert_eq!(loan["user_name"], "Ana Garcia");

    let (status, _) = send(&app, Method::DELETE, &format!("/loans/{}", loan_id), None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (_, book) = send(&app, Method::GET, &format!("/books/{}", book_id), None).await;
    assert_eq!(book["available"], true);

    let (status, _) = send(&app, Method::GET, &format!("/loans/{}", loan_id), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, loan) = send(
        &app,
        Method::POST,
        "/loans",
        Some(json!({ "book_id": book_id, "user_name": "Carlos Mendoza" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(loan["user_name"], "Carlos Mendoza");
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_loans_on_one_book() {
    let app = app();
    let author = create_author(&app, "Juan Rulfo").await;
    let book = create_book(&app, "Pedro Páramo", author).await;

    let handles: Vec<_> = (0..12)
        .map(|i| {
            let app = app.clone();
            tokio::spawn(async move {
                send(
                    &app,
                    Method::POST,
                    "/loans",
                    Some(json!({ "book_id": book, "user_name": format!("reader {}", i) })),
                )
                .await
            })
        })
        .collect();

    let mut created = 0;
    for handle in handles {
        let (status, body) = handle.await.unwrap();
        if status == StatusCode::CREATED {
            created += 1;
        } else {
            assert_eq!(status, StatusCode::BAD_REQUEST);
            assert_eq!(body["message"], "Book is not available");
        }
    }
    assert_eq!(created, 1);

    let (_, loans) = send(&app, Method::GET, "/loans", None).await;
    assert_eq!(loans.as_array().unwrap().len(), 1);
    let (_, book) = send(&app, Method::GET, &format!("/books/{}", book), None).await;
    assert_eq!(book["available"], false);
}

#[tokio::test]
async fn test_openapi_document() {
    let app = app();
    let (status, body) = send(&app, Method::GET, "/api-docs/openapi.json", None).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["paths"]["/loans/{id}"].is_object());
}
