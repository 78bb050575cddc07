//! Account endpoints.
//!
//! `login` and `register` are the only two calls that create a session:
//! on success they store the access token and the owning user id, which
//! re-arms the one-shot 401 redirect for the new session. `logout` is
//! local-only; the backend keeps no session state to tear down.

use serde::Serialize;
use tracing::info;

use crate::error::Result;
use crate::gateway::RequestGateway;
use crate::types::AuthResponse;

#[derive(Serialize)]
struct Credentials<'a> {
    email: &'a str,
    password: &'a str,
}

/// Client for `/api/auth/*`.
pub struct AuthApi<'g> {
    gateway: &'g RequestGateway,
}

impl<'g> AuthApi<'g> {
    pub fn new(gateway: &'g RequestGateway) -> Self {
        Self { gateway }
    }

    /// Exchange credentials for a session.
    pub async fn login(&self, email: &str, password: &str) -> Result<AuthResponse> {
        let resp: AuthResponse = self
            .gateway
            .post_json("/api/auth/login", &Credentials { email, password })
            .await?;
        self.remember(&resp).await?;
        info!(user_id = %resp.user.id, "logged in");
        Ok(resp)
    }

    /// Create an account; the backend logs the new user straight in.
    pub async fn register(&self, email: &str, password: &str) -> Result<AuthResponse> {
        let resp: AuthResponse = self
            .gateway
            .post_json("/api/auth/register", &Credentials { email, password })
            .await?;
        self.remember(&resp).await?;
        info!(user_id = %resp.user.id, "registered");
        Ok(resp)
    }

    /// End the local session. Never fails; there is nothing remote to undo.
    pub async fn logout(&self) {
        self.gateway.session().logout().await;
    }

    async fn remember(&self, resp: &AuthResponse) -> Result<()> {
        let session = self.gateway.session();
        session.set_token(&resp.access_token).await?;
        session.set_user_id(&resp.user.id.to_string()).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn credentials_serialize_to_the_wire_shape() {
        let body = serde_json::to_value(Credentials {
            email: "a@b.test",
            password: "hunter2",
        })
        .unwrap();
        assert_eq!(
            body,
            serde_json::json!({"email": "a@b.test", "password": "hunter2"})
        );
    }
}
