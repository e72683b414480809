//! Author service

use crate::{
    error::AppResult,
    models::{Author, AuthorWithBooks, CreateAuthor, UpdateAuthor},
};

use super::Store;

#[derive(Clone)]
pub struct AuthorsService {
    store: Store,
}

impl AuthorsService {
    pub fn new(store: Store) -> Self {
        Self { store }
    }

    pub async fn list(&self) -> AppResult<Vec<Author>> {
        self.store.author_list().await
    }

    pub async fn get_by_id(&self, id: i32) -> AppResult<Author> {
        self.store.author_get_by_id(id).await
    }

    pub async fn create(&self, data: &CreateAuthor) -> AppResult<Author> {
        let author = self.store.author_create(data).await?;
        tracing::info!(author_id = author.id, "Author created");
        Ok(author)
    }

    pub async fn update(&self, id: i32, data: &UpdateAuthor) -> AppResult<Author> {
        self.store.author_update(id, data).await
    }

    pub async fn delete(&self, id: i32) -> AppResult<()> {
        self.store.author_delete(id).await?;
        tracing::info!(author_id = id, "Author deleted");
        Ok(())
    }

    /// Author with the books it owns
    pub async fn with_books(&self, id: i32) -> AppResult<AuthorWithBooks> {
        let author = self.store.author_get_by_id(id).await?;
        let books = self.store.author_books(id).await?;
        Ok(AuthorWithBooks::new(author, books))
    }
}
