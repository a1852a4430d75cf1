//! Admin catalog management

use reqwest::Method;
use validator::Validate;

use crate::client::{decode, ApiClient};
use crate::error::{ApiError, ApiResult};
use crate::models::book::{Book, BookInput};

#[derive(Clone)]
pub struct AdminBooksRepository {
    client: ApiClient,
}

impl AdminBooksRepository {
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }

    /// Create a new book. The payload is validated locally first.
    pub async fn create(&self, input: &BookInput) -> ApiResult<Book> {
        input.validate()?;
        let body = serde_json::to_value(input).map_err(|e| ApiError::Decode(e.to_string()))?;
        decode(
            self.client
                .request(Method::POST, "/admin/books", Some(&body))
                .await?,
        )
    }

    /// Replace an existing book's fields
    pub async fn update(&self, book_id: &str, input: &BookInput) -> ApiResult<Book> {
        input.validate()?;
        let body = serde_json::to_value(input).map_err(|e| ApiError::Decode(e.to_string()))?;
        decode(
            self.client
                .request(
                    Method::PUT,
                    &format!("/admin/books/{}", book_id),
                    Some(&body),
                )
                .await?,
        )
    }

    /// Delete a book from the catalog
    pub async fn delete(&self, book_id: &str) -> ApiResult<()> {
        self.client
            .request(Method::DELETE, &format!("/admin/books/{}", book_id), None)
            .await?;
        Ok(())
    }
}
