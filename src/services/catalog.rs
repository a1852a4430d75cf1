//! Catalog workflow service.
//!
//! Runs a mutation, then executes the reconciler's refresh plan so callers
//! get back a consistent snapshot instead of re-implementing the re-fetch
//! rules per screen.

use std::collections::BTreeSet;

use crate::error::ApiResult;
use crate::models::book::{Book, BookInput};
use crate::models::user::{AdminUser, Role};
use crate::repository::Repository;
use crate::services::view_state::{
    dashboard_counts, refresh_after, DashboardCounts, Mutation, RefreshPlan,
};

/// Freshly fetched state after a mutation, per the refresh plan.
///
/// Fields the plan did not touch stay `None`; the view keeps whatever it
/// already had for those.
#[derive(Debug, Default)]
pub struct ViewSnapshot {
    /// The active book list: search results when a query is active,
    /// otherwise the full catalog
    pub books: Option<Vec<Book>>,
    /// The caller's recomputed BorrowedSet
    pub borrowed: Option<BTreeSet<String>>,
    pub users: Option<Vec<AdminUser>>,
    pub counts: Option<DashboardCounts>,
}

#[derive(Clone)]
pub struct CatalogService {
    repository: Repository,
}

impl CatalogService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    /// Borrow a book and re-fetch what the mutation invalidated.
    ///
    /// `active_query` is the search box content, if a search is displayed;
    /// the refreshed book list respects it.
    pub async fn borrow(&self, book_id: &str, active_query: Option<&str>) -> ApiResult<ViewSnapshot> {
        self.repository.books.borrow(book_id).await?;
        self.refresh(refresh_after(Mutation::Borrow), active_query)
            .await
    }

    /// Return a borrowed book and re-fetch what the mutation invalidated.
    pub async fn return_book(
        &self,
        book_id: &str,
        active_query: Option<&str>,
    ) -> ApiResult<ViewSnapshot> {
        self.repository.books.return_book(book_id).await?;
        self.refresh(refresh_after(Mutation::Return), active_query)
            .await
    }

    /// Admin: add a book to the catalog
    pub async fn create_book(
        &self,
        input: &BookInput,
        active_query: Option<&str>,
    ) -> ApiResult<(Book, ViewSnapshot)> {
        let book = self.repository.admin_books.create(input).await?;
        let snapshot = self
            .refresh(refresh_after(Mutation::BookCreated), active_query)
            .await?;
        Ok((book, snapshot))
    }

    /// Admin: update a book
    pub async fn update_book(
        &self,
        book_id: &str,
        input: &BookInput,
        active_query: Option<&str>,
    ) -> ApiResult<(Book, ViewSnapshot)> {
        let book = self.repository.admin_books.update(book_id, input).await?;
        let snapshot = self
            .refresh(refresh_after(Mutation::BookUpdated), active_query)
            .await?;
        Ok((book, snapshot))
    }

    /// Admin: delete a book
    pub async fn delete_book(
        &self,
        book_id: &str,
        active_query: Option<&str>,
    ) -> ApiResult<ViewSnapshot> {
        self.repository.admin_books.delete(book_id).await?;
        self.refresh(refresh_after(Mutation::BookDeleted), active_query)
            .await
    }

    /// Admin: change a user's role
    pub async fn change_user_role(&self, user_id: &str, new_role: Role) -> ApiResult<ViewSnapshot> {
        self.repository
            .admin_users
            .change_role(user_id, new_role)
            .await?;
        self.refresh(refresh_after(Mutation::UserRoleChanged), None)
            .await
    }

    /// Admin: delete a user
    pub async fn delete_user(&self, user_id: &str) -> ApiResult<ViewSnapshot> {
        self.repository.admin_users.delete(user_id).await?;
        self.refresh(refresh_after(Mutation::UserDeleted), None)
            .await
    }

    /// Load the dashboard without a preceding mutation.
    pub async fn dashboard(&self) -> ApiResult<DashboardCounts> {
        let snapshot = self
            .refresh(
                RefreshPlan {
                    books: false,
                    my_books: false,
                    users: false,
                    counts: true,
                },
                None,
            )
            .await?;
        // counts is always present when requested
        Ok(snapshot.counts.unwrap_or_default())
    }

    async fn refresh(&self, plan: RefreshPlan, active_query: Option<&str>) -> ApiResult<ViewSnapshot> {
        let is_admin = self
            .repository
            .auth
            .current_session()
            .map(|s| s.is_admin())
            .unwrap_or(false);
        let query = active_query.map(str::trim).filter(|q| !q.is_empty());

        let mut snapshot = ViewSnapshot::default();

        // Counts always derive from the full catalog, even when the
        // displayed list is filtered by a search.
        let full_catalog = if plan.counts || (plan.books && query.is_none()) {
            Some(self.repository.books.list().await?)
        } else {
            None
        };

        if plan.books {
            snapshot.books = match query {
                Some(q) => Some(self.repository.books.search(q).await?),
                None => full_catalog.clone(),
            };
        }

        let my_books = if plan.my_books || plan.counts {
            Some(self.repository.my_books.list().await?)
        } else {
            None
        };
        if plan.my_books {
            snapshot.borrowed = my_books
                .as_ref()
                .map(|books| books.iter().map(|b| b.id.clone()).collect());
        }

        let users = if plan.users || (plan.counts && is_admin) {
            Some(self.repository.admin_users.list().await?)
        } else {
            None
        };

        if plan.counts {
            snapshot.counts = Some(dashboard_counts(
                full_catalog.as_deref().unwrap_or(&[]),
                my_books.as_deref().unwrap_or(&[]),
                users.as_deref(),
            ));
        }
        if plan.users {
            snapshot.users = users;
        }

        Ok(snapshot)
    }
}
