//! Auth and user-management passthrough.
//!
//! Opaque to the synchronizer core; the host only uses the login result
//! to decide whether the synchronizer is allowed to run.

use reqwest::StatusCode;
use tracing::info;

use viewer_common::{ViewerError, ViewerResult};

use crate::client::PollutionClient;
use crate::types::{LoginRequest, NewUser, Session, UserRecord};

impl PollutionClient {
    /// Authenticate against the auth service.
    pub async fn login(&self, login: &str, password: &str) -> ViewerResult<Session> {
        let response = self
            .http
            .post(self.url("/login"))
            .json(&LoginRequest { login, password })
            .send()
            .await
            .map_err(ViewerError::http)?;

        if response.status() == StatusCode::UNAUTHORIZED {
            let message = response.text().await.unwrap_or_default();
            return Err(ViewerError::Unauthorized(message));
        }

        let session: Session = Self::check_status(response)
            .await?
            .json()
            .await
            .map_err(|e| ViewerError::Decode(e.to_string()))?;

        info!(name = %session.name, role = %session.role, "Authenticated");
        Ok(session)
    }

    /// Create a user via the user service.
    pub async fn create_user(&self, user: &NewUser) -> ViewerResult<()> {
        let response = self
            .http
            .post(self.url("/create_user"))
            .json(user)
            .send()
            .await
            .map_err(ViewerError::http)?;

        Self::check_status(response).await?;
        Ok(())
    }

    /// List known users.
    pub async fn list_users(&self) -> ViewerResult<Vec<UserRecord>> {
        self.get_json(&self.url("/users")).await
    }

    /// Delete a user by login.
    pub async fn delete_user(&self, login: &str) -> ViewerResult<()> {
        let response = self
            .http
            .delete(format!("{}/users/{}", self.base, login))
            .send()
            .await
            .map_err(ViewerError::http)?;

        Self::check_status(response).await?;
        Ok(())
    }
}
