//! The caller's borrowed books

use std::collections::BTreeSet;

use crate::client::ApiClient;
use crate::error::ApiResult;
use crate::models::book::Book;

#[derive(Clone)]
pub struct MyBooksRepository {
    client: ApiClient,
}

impl MyBooksRepository {
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }

    /// Books currently borrowed by the logged-in caller
    pub async fn list(&self) -> ApiResult<Vec<Book>> {
        self.client.get("/mybooks").await
    }

    /// Recompute the BorrowedSet: the ids of the caller's borrowed books.
    ///
    /// This is a cache, not a source of truth; it must be refreshed after
    /// every borrow/return mutation before rendering affordances.
    pub async fn borrowed_ids(&self) -> ApiResult<BTreeSet<String>> {
        let books = self.list().await?;
        Ok(books.into_iter().map(|book| book.id).collect())
    }
}
