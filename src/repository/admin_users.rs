//! Admin user management.
//!
//! Both mutating operations enforce the self-protection rule locally: an
//! admin may not change their own role or delete their own account, and the
//! guard fires before any network traffic.

use reqwest::Method;

use crate::client::{decode, ApiClient};
use crate::error::{ApiError, ApiResult};
use crate::models::user::{AdminUser, Role, RoleChange};

#[derive(Clone)]
pub struct AdminUsersRepository {
    client: ApiClient,
}

impl AdminUsersRepository {
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }

    /// List all accounts
    pub async fn list(&self) -> ApiResult<Vec<AdminUser>> {
        self.client.get("/admin/users").await
    }

    /// Change another user's role.
    pub async fn change_role(&self, user_id: &str, new_role: Role) -> ApiResult<AdminUser> {
        self.guard_not_self(user_id, "You cannot change your own role")?;
        let body = serde_json::to_value(RoleChange { new_role })
            .map_err(|e| ApiError::Decode(e.to_string()))?;
        decode(
            self.client
                .request(
                    Method::PUT,
                    &format!("/admin/users/{}", user_id),
                    Some(&body),
                )
                .await?,
        )
    }

    /// Delete another user's account.
    pub async fn delete(&self, user_id: &str) -> ApiResult<()> {
        self.guard_not_self(user_id, "You cannot delete your own account")?;
        self.client
            .request(Method::DELETE, &format!("/admin/users/{}", user_id), None)
            .await?;
        Ok(())
    }

    fn guard_not_self(&self, user_id: &str, message: &str) -> ApiResult<()> {
        if let Some(session) = self.client.session().get() {
            if session.user_id == user_id {
                return Err(ApiError::Forbidden(message.to_string()));
            }
        }
        Ok(())
    }
}
