//! Business logic services

pub mod authors;
pub mod books;
pub mod loans;

use std::sync::Arc;

use crate::{error::AppResult, repository::LibraryStore};

/// Storage handle shared by every service
pub type Store = Arc<dyn LibraryStore>;

/// Container for all services
#[derive(Clone)]
pub struct Services {
    store: Store,
    pub authors: authors::AuthorsService,
    pub books: books::BooksService,
    pub loans: loans::LoansService,
}

impl Services {
    /// Create all services over the given store
    pub fn new(store: Store) -> Self {
        Self {
            authors: authors::AuthorsService::new(store.clone()),
            books: books::BooksService::new(store.clone()),
            loans: loans::LoansService::new(store.clone()),
            store,
        }
    }

    /// Check that the store answers
    pub async fn ping(&self) -> AppResult<()> {
        self.store.ping().await
    }
}
