//! Book model and related types

use serde::{Deserialize, Serialize};
use validator::Validate;

/// A catalog entry as returned by the server.
///
/// Snapshots are read-only on the client; `available_copies` is authoritative
/// only on the server and is never adjusted locally after a borrow or return.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Book {
    pub id: String,
    pub title: String,
    pub author: String,
    pub genre: String,
    pub isbn: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub total_copies: u32,
    pub available_copies: u32,
}

impl Book {
    /// At least one copy on the shelf
    pub fn is_available(&self) -> bool {
        self.available_copies > 0
    }
}

/// Payload for creating or updating a book through the admin endpoints.
///
/// The same shape is sent for both operations; updates replace every field.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct BookInput {
    #[validate(length(min = 1, message = "Book title is required"))]
    pub title: String,
    #[validate(length(min = 1, message = "Author name is required"))]
    pub author: String,
    #[validate(length(min = 1, message = "Genre is required"))]
    pub genre: String,
    #[validate(length(min = 10, message = "Valid ISBN is required (at least 10 characters)"))]
    pub isbn: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[validate(range(min = 1, message = "Total copies must be at least 1"))]
    pub total_copies: u32,
}
