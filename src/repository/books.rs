//! Public catalog operations: list, search, borrow, return

use reqwest::Method;

use crate::client::ApiClient;
use crate::error::ApiResult;
use crate::models::book::Book;

#[derive(Clone)]
pub struct BooksRepository {
    client: ApiClient,
}

impl BooksRepository {
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }

    /// Fetch the full catalog
    pub async fn list(&self) -> ApiResult<Vec<Book>> {
        self.client.get("/books").await
    }

    /// Search the catalog.
    ///
    /// An empty or whitespace-only query is equivalent to listing everything;
    /// in that case no `query` parameter is sent and the list endpoint is hit
    /// instead.
    pub async fn search(&self, query: &str) -> ApiResult<Vec<Book>> {
        let trimmed = query.trim();
        if trimmed.is_empty() {
            return self.list().await;
        }
        self.client
            .get_with_query("/books/search", &[("query", trimmed)])
            .await
    }

    /// Fetch a single book
    pub async fn get(&self, book_id: &str) -> ApiResult<Book> {
        self.client.get(&format!("/books/{}", book_id)).await
    }

    /// Borrow a book. Pure pass-through: no local snapshot is touched, the
    /// caller must re-fetch.
    pub async fn borrow(&self, book_id: &str) -> ApiResult<()> {
        self.client
            .request(Method::POST, &format!("/books/{}/borrow", book_id), None)
            .await?;
        Ok(())
    }

    /// Return a borrowed book. Same pass-through rule as [`Self::borrow`].
    pub async fn return_book(&self, book_id: &str) -> ApiResult<()> {
        self.client
            .request(Method::POST, &format!("/books/{}/return", book_id), None)
            .await?;
        Ok(())
    }
}
