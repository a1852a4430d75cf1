//! Data models for the Biblio client

pub mod book;
pub mod user;

pub use book::{Book, BookInput};
pub use user::{AdminUser, LoginRequest, LoginResponse, Role, RoleChange, SignupRequest};
