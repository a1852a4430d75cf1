//! Typed repositories over the API client.
//!
//! One repository per resource family; each holds a clone of the shared
//! [`ApiClient`](crate::client::ApiClient) and stays a thin pass-through:
//! errors propagate unchanged and no repository mutates local book snapshots.

pub mod admin_books;
pub mod admin_users;
pub mod auth;
pub mod books;
pub mod my_books;

use crate::client::ApiClient;

/// Container for all resource repositories
#[derive(Clone)]
pub struct Repository {
    pub auth: auth::AuthRepository,
    pub books: books::BooksRepository,
    pub my_books: my_books::MyBooksRepository,
    pub admin_books: admin_books::AdminBooksRepository,
    pub admin_users: admin_users::AdminUsersRepository,
}

impl Repository {
    /// Create all repositories over the given client
    pub fn new(client: ApiClient) -> Self {
        Self {
            auth: auth::AuthRepository::new(client.clone()),
            books: books::BooksRepository::new(client.clone()),
            my_books: my_books::MyBooksRepository::new(client.clone()),
            admin_books: admin_books::AdminBooksRepository::new(client.clone()),
            admin_users: admin_users::AdminUsersRepository::new(client),
        }
    }
}
