//! Book service

use crate::{
    error::AppResult,
    models::{Book, CreateBook, UpdateBook},
};

use super::Store;

#[derive(Clone)]
pub struct BooksService {
    store: Store,
}

impl BooksService {
    pub fn new(store: Store) -> Self {
        Self { store }
    }

    pub async fn list(&self) -> AppResult<Vec<Book>> {
        self.store.book_list().await
    }

    pub async fn get_by_id(&self, id: i32) -> AppResult<Book> {
        self.store.book_get_by_id(id).await
    }

    pub async fn create(&self, data: &CreateBook) -> AppResult<Book> {
        let book = self.store.book_create(data).await?;
        tracing::info!(book_id = book.id, author_id = book.author_id, "Book created");
        Ok(book)
    }

    pub async fn update(&self, id: i32, data: &UpdateBook) -> AppResult<Book> {
        self.store.book_update(id, data).await
    }

    pub async fn delete(&self, id: i32) -> AppResult<()> {
        self.store.book_delete(id).await?;
        tracing::info!(book_id = id, "Book deleted");
        Ok(())
    }
}
