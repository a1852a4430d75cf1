//! ViewState reconciliation.
//!
//! The single place where borrow/return/edit affordances are derived and
//! where post-mutation refresh decisions are made. Every grid in the UI goes
//! through these functions instead of re-implementing the rules per view.

use std::collections::BTreeSet;

use crate::models::book::Book;
use crate::models::user::{AdminUser, Role};

/// Actions a view may offer on a single book row
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct BookAffordances {
    pub can_borrow: bool,
    pub can_return: bool,
    pub can_edit: bool,
    pub can_delete: bool,
}

/// Derive the affordances for one book row.
///
/// Rules: copies available shows Borrow; no copies but the caller holds one
/// shows Return; no copies held by someone else shows neither. Admins
/// additionally get Edit/Delete regardless of availability.
pub fn affordances(book: &Book, role: Option<Role>, borrowed: &BTreeSet<String>) -> BookAffordances {
    let is_admin = role == Some(Role::Admin);
    if book.is_available() {
        BookAffordances {
            can_borrow: true,
            can_return: false,
            can_edit: is_admin,
            can_delete: is_admin,
        }
    } else {
        BookAffordances {
            can_borrow: false,
            can_return: borrowed.contains(&book.id),
            can_edit: is_admin,
            can_delete: is_admin,
        }
    }
}

/// A completed mutation that may invalidate fetched collections
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mutation {
    Borrow,
    Return,
    BookCreated,
    BookUpdated,
    BookDeleted,
    UserRoleChanged,
    UserDeleted,
}

/// Which read queries must be re-issued after a mutation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RefreshPlan {
    /// The active book list or search results
    pub books: bool,
    /// The caller's borrowed books (and thus the BorrowedSet)
    pub my_books: bool,
    /// The admin user list
    pub users: bool,
    /// Dashboard aggregate counts
    pub counts: bool,
}

/// The refresh policy: what to re-fetch after each kind of mutation.
pub fn refresh_after(mutation: Mutation) -> RefreshPlan {
    match mutation {
        Mutation::Borrow | Mutation::Return => RefreshPlan {
            books: true,
            my_books: true,
            users: false,
            counts: true,
        },
        Mutation::BookCreated | Mutation::BookUpdated | Mutation::BookDeleted => RefreshPlan {
            books: true,
            my_books: false,
            users: false,
            counts: true,
        },
        Mutation::UserRoleChanged | Mutation::UserDeleted => RefreshPlan {
            books: false,
            my_books: false,
            users: true,
            counts: true,
        },
    }
}

/// Dashboard aggregates
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DashboardCounts {
    pub total_books: usize,
    pub available_copies: u64,
    pub borrowed_by_me: usize,
    /// Present for admins only
    pub total_users: Option<usize>,
}

/// Recompute the dashboard counts from freshly fetched collections.
pub fn dashboard_counts(
    books: &[Book],
    my_books: &[Book],
    users: Option<&[AdminUser]>,
) -> DashboardCounts {
    DashboardCounts {
        total_books: books.len(),
        available_copies: books.iter().map(|b| u64::from(b.available_copies)).sum(),
        borrowed_by_me: my_books.len(),
        total_users: users.map(<[AdminUser]>::len),
    }
}
