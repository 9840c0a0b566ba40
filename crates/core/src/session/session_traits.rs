//! Auth gateway trait.
//!
//! Token issuance and verification belong to the backend's auth service; the
//! client only exchanges credentials for a [`Session`] and reads the profile.

use async_trait::async_trait;

use super::session_model::{Profile, ProfileUpdate, Session, SignUp, User};
use crate::errors::GatewayResult;

#[async_trait]
pub trait AuthGateway: Send + Sync {
    async fn sign_in_with_password(&self, email: &str, password: &str) -> GatewayResult<Session>;

    /// Registers a new user. Returns `None` when the backend requires email
    /// confirmation before issuing a session.
    async fn sign_up(&self, sign_up: &SignUp) -> GatewayResult<Option<Session>>;

    /// Revokes the session identified by `access_token`.
    async fn sign_out(&self, access_token: &str) -> GatewayResult<()>;

    async fn reset_password(&self, email: &str) -> GatewayResult<()>;

    /// Resolves the user behind an access token.
    async fn get_user(&self, access_token: &str) -> GatewayResult<User>;

    async fn get_profile(&self, access_token: &str, user_id: &str) -> GatewayResult<Profile>;

    async fn update_profile(
        &self,
        access_token: &str,
        user_id: &str,
        update: &ProfileUpdate,
    ) -> GatewayResult<()>;
}
